//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::collections::HashSet;

use crate::codegen::arguments::KernelArguments;
use crate::codegen::config::Dialect;

//--------------------------------------------------------------------------------------------------

/// State shared by all mapped objects while one kernel is generated.
///
/// `arguments` lives as long as the kernel. `fetched` holds the access names loaded into
/// local variables of the current body and is reset by `begin_body()`, since several
/// bodies may be generated from one mapping.
#[derive(Debug, Clone, Default)]
pub struct KernelContext {
	pub arguments: KernelArguments,
	fetched: HashSet<String>,
}

impl KernelContext {
	pub fn new(dialect: Dialect) -> Self {
		Self {
			arguments: KernelArguments::new(dialect),
			fetched: HashSet::new(),
		}
	}

	pub fn dialect(&self) -> Dialect {
		self.arguments.dialect()
	}

	pub fn begin_body(&mut self) {
		if !self.fetched.is_empty() {
			log::debug!(
				"KernelContext::begin_body(): dropping {} fetched values without write-back",
				self.fetched.len()
			);
		}
		self.fetched.clear();
	}

	pub fn is_fetched(&self, access_name: &str) -> bool {
		self.fetched.contains(access_name)
	}

	pub fn fetched_count(&self) -> usize {
		self.fetched.len()
	}

	/// Returns `true` if the name was not fetched yet in this body.
	pub(crate) fn mark_fetched(&mut self, access_name: &str) -> bool {
		if self.fetched.contains(access_name) {
			return false;
		}
		self.fetched.insert(access_name.to_string())
	}

	/// Returns `true` if the name was fetched in this body.
	pub(crate) fn unmark_fetched(&mut self, access_name: &str) -> bool {
		self.fetched.remove(access_name)
	}
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fetch_set_is_scoped_to_body_and_arguments_to_kernel() {
		let mut ctx = KernelContext::new(Dialect::OpenCL);
		assert!(ctx.arguments.declare("arg0"));
		assert!(ctx.mark_fetched("arg0_i"));
		assert!(!ctx.mark_fetched("arg0_i"));
		assert_eq!(ctx.fetched_count(), 1);

		ctx.begin_body();
		assert!(!ctx.is_fetched("arg0_i"));
		assert!(ctx.arguments.is_declared("arg0"));
		assert!(!ctx.unmark_fetched("arg0_i"));
	}
}

//--------------------------------------------------------------------------------------------------
