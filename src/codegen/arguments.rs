//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::collections::HashSet;

use thin_vec::ThinVec;

use crate::codegen::config::Dialect;
use crate::statement::BufferId;

//--------------------------------------------------------------------------------------------------

pub const INDEX_TYPE: &str = "unsigned int";

pub fn generate_value_kernel_argument(scalartype: &str, name: &str) -> String {
	format!("{scalartype} {name},")
}

pub fn generate_pointer_kernel_argument(address_space: &str, scalartype: &str, name: &str) -> String {
	if address_space.is_empty() {
		format!("{scalartype}* {name},")
	} else {
		format!("{address_space} {scalartype}* {name},")
	}
}

//--------------------------------------------------------------------------------------------------

/// What the launcher has to bind to a parameter when the kernel is invoked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgBinding {
	Buffer(BufferId),
	UInt(u32),
	Value(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KernelParam {
	pub name: String,
	pub binding: ArgBinding,
}

/// Parameter list of one kernel.
///
/// `declared` is the argument-dedup set: a name enters the parameter list at most once,
/// no matter how many mapped objects refer to it. Declarations are kept both as source
/// text and as an ordered list of bindings, so the two always agree on order.
#[derive(Debug, Clone, Default)]
pub struct KernelArguments {
	dialect: Dialect,
	declared: HashSet<String>,
	source: String,
	params: ThinVec<KernelParam>,
}

impl KernelArguments {
	pub fn new(dialect: Dialect) -> Self {
		Self {
			dialect,
			declared: HashSet::new(),
			source: String::new(),
			params: ThinVec::new(),
		}
	}

	pub fn dialect(&self) -> Dialect {
		self.dialect
	}

	/// Returns `true` if `name` was not declared before. The caller must then emit it.
	pub fn declare(&mut self, name: &str) -> bool {
		if self.declared.contains(name) {
			return false;
		}
		self.declared.insert(name.to_string())
	}

	pub fn is_declared(&self, name: &str) -> bool {
		self.declared.contains(name)
	}

	pub fn push_pointer(&mut self, scalartype: &str, name: &str, binding: ArgBinding) {
		let decl =
			generate_pointer_kernel_argument(self.dialect.global_address_space(), scalartype, name);
		self.push(decl, name, binding);
	}

	pub fn push_value(&mut self, scalartype: &str, name: &str, binding: ArgBinding) {
		let decl = generate_value_kernel_argument(scalartype, name);
		self.push(decl, name, binding);
	}

	fn push(&mut self, decl: String, name: &str, binding: ArgBinding) {
		log::trace!("KernelArguments: declaring `{decl}`");
		self.source.push_str(&decl);
		self.params.push(KernelParam { name: name.to_string(), binding });
	}

	/// Raw declaration text, every declaration terminated by a comma.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// Declaration text ready to be placed between the parentheses of the kernel signature.
	pub fn signature(&self) -> &str {
		self.source.strip_suffix(',').unwrap_or(&self.source)
	}

	pub fn params(&self) -> &[KernelParam] {
		&self.params
	}

	pub fn len(&self) -> usize {
		self.params.len()
	}

	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
