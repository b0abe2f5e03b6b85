//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::codegen::arguments::{ArgBinding, INDEX_TYPE, KernelArguments};

//--------------------------------------------------------------------------------------------------

/// A value passed to the kernel by value.
#[derive(Debug)]
pub struct MappedHostScalar {
	name: String,
	value: f64,
}

impl MappedHostScalar {
	pub fn new(name: impl Into<String>, value: f64) -> Self {
		Self { name: name.into(), value }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> f64 {
		self.value
	}

	pub fn append_kernel_arguments(&self, scalartype: &str, args: &mut KernelArguments) {
		if args.declare(&self.name) {
			args.push_value(scalartype, &self.name, ArgBinding::Value(self.value));
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// Vector without storage, e.g. a constant fill or a unit vector.
///
/// Empty names contribute no parameter. A static value has its literal in `value_name`
/// and is not a parameter either.
#[derive(Debug, Default)]
pub struct MappedImplicitVector {
	value_name: String,
	index_name: String,
	is_value_static: bool,
	value: f64,
	index: u32,
}

impl MappedImplicitVector {
	pub fn new(value_name: impl Into<String>, index_name: impl Into<String>) -> Self {
		Self {
			value_name: value_name.into(),
			index_name: index_name.into(),
			is_value_static: false,
			value: 0.0,
			index: 0,
		}
	}

	/// Compile-time constant: `literal` is spliced into the source as is.
	pub fn constant(literal: impl Into<String>) -> Self {
		Self {
			value_name: literal.into(),
			is_value_static: true,
			..Self::default()
		}
	}

	pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
		self.index_name = index_name.into();
		self
	}

	/// Values bound to the parameters when the kernel is launched.
	pub fn with_bindings(mut self, value: f64, index: u32) -> Self {
		self.value = value;
		self.index = index;
		self
	}

	pub fn value_name(&self) -> &str {
		&self.value_name
	}

	pub fn index_name(&self) -> &str {
		&self.index_name
	}

	pub fn is_value_static(&self) -> bool {
		self.is_value_static
	}

	pub fn append_kernel_arguments(&self, scalartype: &str, args: &mut KernelArguments) {
		if !self.value_name.is_empty() && !self.is_value_static && args.declare(&self.value_name) {
			args.push_value(scalartype, &self.value_name, ArgBinding::Value(self.value));
		}
		if !self.index_name.is_empty() && args.declare(&self.index_name) {
			args.push_value(INDEX_TYPE, &self.index_name, ArgBinding::UInt(self.index));
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// Matrix without storage: a constant fill, or a scaled identity when `is_diag` is set.
#[derive(Debug, Default)]
pub struct MappedImplicitMatrix {
	value_name: String,
	is_diag: bool,
	is_value_static: bool,
	value: f64,
}

impl MappedImplicitMatrix {
	pub fn new(value_name: impl Into<String>, is_diag: bool) -> Self {
		Self {
			value_name: value_name.into(),
			is_diag,
			is_value_static: false,
			value: 0.0,
		}
	}

	pub fn constant(literal: impl Into<String>, is_diag: bool) -> Self {
		Self {
			value_name: literal.into(),
			is_diag,
			is_value_static: true,
			value: 0.0,
		}
	}

	pub fn with_binding(mut self, value: f64) -> Self {
		self.value = value;
		self
	}

	pub fn value_name(&self) -> &str {
		&self.value_name
	}

	pub fn is_diag(&self) -> bool {
		self.is_diag
	}

	pub fn is_value_static(&self) -> bool {
		self.is_value_static
	}

	pub fn append_kernel_arguments(&self, scalartype: &str, args: &mut KernelArguments) {
		if !self.value_name.is_empty() && !self.is_value_static && args.declare(&self.value_name) {
			args.push_value(scalartype, &self.value_name, ArgBinding::Value(self.value));
		}
	}
}

//--------------------------------------------------------------------------------------------------
