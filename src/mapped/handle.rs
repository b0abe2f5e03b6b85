//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::codegen::arguments::{ArgBinding, INDEX_TYPE, KernelArguments};
use crate::codegen::context::KernelContext;
use crate::codegen::stream::KernelBody;
use crate::mapped::{MappedObject, NodeInfo};
use crate::mapping::{IndexTuple, MappedStatements};
use crate::rhs::generate_rhs;
use crate::statement::BufferId;

//--------------------------------------------------------------------------------------------------

/// `float` with width 4 becomes `float4`. Width 1 leaves the type unchanged.
pub fn simd_scalartype(scalartype: &str, simd_width: u32) -> String {
	if simd_width > 1 { format!("{scalartype}{simd_width}") } else { scalartype.to_string() }
}

//--------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct VectorLayout {
	pub start_name: String,
	pub stride_name: String,
	pub start: u32,
	pub stride: u32,

	/// When set, the element address is the regenerated expression of this subtree.
	pub info: Option<NodeInfo>,
}

impl VectorLayout {
	pub fn new(name: &str, start: u32, stride: u32) -> Self {
		Self::with_names(format!("{name}_start"), format!("{name}_stride"), start, stride)
	}

	pub fn with_names(
		start_name: impl Into<String>,
		stride_name: impl Into<String>,
		start: u32,
		stride: u32,
	) -> Self {
		Self {
			start_name: start_name.into(),
			stride_name: stride_name.into(),
			start,
			stride,
			info: None,
		}
	}

	pub fn with_info(mut self, info: NodeInfo) -> Self {
		self.info = Some(info);
		self
	}

	/// `start+i*stride`, with `index.i` spliced in as is. The product keeps its meaning
	/// only when `index.i` is atomic: a name, a literal, or an expression in parentheses.
	pub fn offset(&self, index: &IndexTuple, program: &MappedStatements) -> String {
		if let Some(info) = self.info {
			let mut offset = String::new();
			generate_rhs(program, info.statement, info.root, index, None, &mut offset);
			offset
		} else {
			format!("{}+{}*{}", self.start_name, index.i, self.stride_name)
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixLayout {
	pub ld_name: String,
	pub start1_name: String,
	pub stride1_name: String,
	pub start2_name: String,
	pub stride2_name: String,

	pub ld: u32,
	pub start1: u32,
	pub stride1: u32,
	pub start2: u32,
	pub stride2: u32,

	/// Set for row-major storage: the generator swaps `i` and `j` before asking for an
	/// offset, which itself always treats `i` as the row.
	pub interpret_as_transposed: bool,
}

impl MatrixLayout {
	pub fn new(name: &str, ld: u32, interpret_as_transposed: bool) -> Self {
		Self {
			ld_name: format!("{name}_ld"),
			start1_name: format!("{name}_start1"),
			stride1_name: format!("{name}_stride1"),
			start2_name: format!("{name}_start2"),
			stride2_name: format!("{name}_stride2"),
			ld,
			start1: 0,
			stride1: 1,
			start2: 0,
			stride2: 1,
			interpret_as_transposed,
		}
	}

	pub fn with_ranges(mut self, (start1, stride1): (u32, u32), (start2, stride2): (u32, u32)) -> Self {
		self.start1 = start1;
		self.stride1 = stride1;
		self.start2 = start2;
		self.stride2 = stride2;
		self
	}

	pub fn with_ld_name(mut self, ld_name: impl Into<String>) -> Self {
		self.ld_name = ld_name.into();
		self
	}

	/// A literal `0` on either axis collapses the expression, avoiding a multiply for
	/// single-row and single-column accesses.
	pub fn offset(&self, index: &IndexTuple) -> String {
		if index.i == "0" {
			format!("({})*{}", index.j, self.ld_name)
		} else if index.j == "0" {
			format!("({})", index.i)
		} else {
			format!("({})+ ({})*{}", index.i, index.j, self.ld_name)
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
	Scalar,
	Vector(VectorLayout),
	Matrix(MatrixLayout),
}

//--------------------------------------------------------------------------------------------------

/// An operand passed to the kernel by pointer.
#[derive(Debug)]
pub struct MappedHandle {
	name: String,
	simd_width: u32,
	buffer: BufferId,
	storage: Storage,
}

impl MappedHandle {
	pub fn new(name: impl Into<String>, simd_width: u32, buffer: BufferId, storage: Storage) -> Self {
		debug_assert!(simd_width > 0, "MappedHandle::new(): simd_width must be at least 1");
		Self {
			name: name.into(),
			simd_width,
			buffer,
			storage,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn simd_width(&self) -> u32 {
		self.simd_width
	}

	pub fn buffer(&self) -> BufferId {
		self.buffer
	}

	pub fn storage(&self) -> &Storage {
		&self.storage
	}

	/// Vectors and matrices. Only these honor a lane selection in `evaluate()`.
	pub fn is_buffer(&self) -> bool {
		!matches!(self.storage, Storage::Scalar)
	}

	pub fn offset(&self, index: &IndexTuple, program: &MappedStatements) -> String {
		match &self.storage {
			Storage::Scalar => "0".to_string(),
			Storage::Vector(layout) => layout.offset(index, program),
			Storage::Matrix(layout) => layout.offset(index),
		}
	}

	pub fn generate_default(&self, index: &IndexTuple, program: &MappedStatements) -> String {
		format!("{}[{}]", self.name, self.offset(index, program))
	}

	pub fn append_kernel_arguments(&self, scalartype: &str, args: &mut KernelArguments) {
		if args.declare(&self.name) {
			let vector_scalartype = simd_scalartype(scalartype, self.simd_width);
			args.push_pointer(&vector_scalartype, &self.name, ArgBinding::Buffer(self.buffer));
			self.append_optional_arguments(args);
		}
	}

	fn append_optional_arguments(&self, args: &mut KernelArguments) {
		match &self.storage {
			Storage::Scalar => {},
			Storage::Vector(v) => {
				args.push_value(INDEX_TYPE, &v.start_name, ArgBinding::UInt(v.start));
				args.push_value(INDEX_TYPE, &v.stride_name, ArgBinding::UInt(v.stride));
			},
			Storage::Matrix(m) => {
				args.push_value(INDEX_TYPE, &m.ld_name, ArgBinding::UInt(m.ld));
				args.push_value(INDEX_TYPE, &m.start1_name, ArgBinding::UInt(m.start1));
				args.push_value(INDEX_TYPE, &m.stride1_name, ArgBinding::UInt(m.stride1));
				args.push_value(INDEX_TYPE, &m.start2_name, ArgBinding::UInt(m.start2));
				args.push_value(INDEX_TYPE, &m.stride2_name, ArgBinding::UInt(m.stride2));
			},
		}
	}
}

//--------------------------------------------------------------------------------------------------

/// A mapped object known to be pointer-backed. Carries the fetch / write-back protocol.
#[derive(Clone, Copy)]
pub struct Handle<'a> {
	object: &'a MappedObject,
	handle: &'a MappedHandle,
}

impl<'a> Handle<'a> {
	pub(crate) fn new(object: &'a MappedObject, handle: &'a MappedHandle) -> Self {
		Self { object, handle }
	}

	pub fn object(&self) -> &'a MappedObject {
		self.object
	}

	pub fn name(&self) -> &'a str {
		self.handle.name()
	}

	pub fn simd_width(&self) -> u32 {
		self.handle.simd_width()
	}

	pub fn storage(&self) -> &'a Storage {
		self.handle.storage()
	}

	/// Type of both the local cache variable and the pointer parameter.
	pub fn simd_scalartype(&self) -> String {
		simd_scalartype(self.object.scalartype(), self.handle.simd_width())
	}

	pub fn offset(&self, index: &IndexTuple, program: &MappedStatements) -> String {
		self.handle.offset(index, program)
	}

	/// Loads the value into the local variable `name + suffix`, unless the current body
	/// already did. Either way the object evaluates to that variable afterwards.
	pub fn fetch(
		&self,
		suffix: &str,
		index: &IndexTuple,
		ctx: &mut KernelContext,
		body: &mut KernelBody,
		program: &MappedStatements,
	) {
		let access_name = format!("{}{}", self.handle.name(), suffix);
		if ctx.mark_fetched(&access_name) {
			let value = self.handle.generate_default(index, program);
			log::trace!("fetch: {access_name} = {value}");
			body.line_fmt(format_args!("{} {} = {};", self.simd_scalartype(), access_name, value));
		}
		self.object.set_access_name(&access_name);
	}

	/// Stores the fetched variable back to memory and forgets it. Does nothing if the
	/// value was not fetched in the current body.
	///
	/// The store address is computed from `index` alone; `suffix` is not used.
	pub fn write_back(
		&self,
		_suffix: &str,
		index: &IndexTuple,
		ctx: &mut KernelContext,
		body: &mut KernelBody,
		program: &MappedStatements,
	) {
		let access_name = self.object.access_name().clone();
		if access_name.is_empty() || !ctx.unmark_fetched(&access_name) {
			return;
		}
		let target = self.handle.generate_default(index, program);
		log::trace!("write_back: {target} = {access_name}");
		body.line_fmt(format_args!("{target} = {access_name};"));
		self.object.clear_access_name();
	}
}

//--------------------------------------------------------------------------------------------------
