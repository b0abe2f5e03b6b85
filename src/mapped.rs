//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::cell::{Ref, RefCell};

use crate::codegen::arguments::KernelArguments;
use crate::codegen::config::Dialect;
use crate::mapping::{IndexTuple, MappedStatements, MappingTable};
use crate::statement::{BufferId, NodeIndex, ReductionKind, Statement, StatementIndex};

pub mod handle;
pub mod implicit;
pub mod leaf;


pub use handle::{Handle, MappedHandle, MatrixLayout, Storage, VectorLayout, simd_scalartype};
pub use implicit::{MappedHostScalar, MappedImplicitMatrix, MappedImplicitVector};
pub use leaf::{MappedMatrixProduct, MappedReduction, ReductionShape};

//--------------------------------------------------------------------------------------------------

/// Non-owning reference to the subtree a binary leaf (or an indirectly addressed vector)
/// summarizes. Both indexes point into the `MappedStatements` of the current request,
/// which also holds the mapping table of `statement`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeInfo {
	pub statement: StatementIndex,
	pub root: NodeIndex,
}

impl NodeInfo {
	pub fn new(statement: StatementIndex, root: NodeIndex) -> Self {
		Self { statement, root }
	}

	pub fn statement<'p>(&self, program: &'p MappedStatements) -> &'p Statement {
		program.statement(self.statement)
	}

	pub fn mapping<'p>(&self, program: &'p MappedStatements) -> &'p MappingTable {
		program.mapping(self.statement)
	}

	pub fn root_idx(&self) -> NodeIndex {
		self.root
	}
}

//--------------------------------------------------------------------------------------------------

#[allow(clippy::panic)]
fn lane_accessor(dialect: Dialect, handle: &MappedHandle, lane: u32) -> String {
	let accessor = if lane < handle.simd_width() { dialect.lane_accessor(lane) } else { None };
	match accessor {
		Some(accessor) => accessor,
		None => panic!(
			"MappedObject::evaluate(): lane {lane} of `{}` (SIMD width {}) does not exist in {dialect:?}",
			handle.name(),
			handle.simd_width()
		),
	}
}

#[derive(Debug)]
pub enum MappedKind {
	Handle(MappedHandle),
	HostScalar(MappedHostScalar),
	ImplicitVector(MappedImplicitVector),
	ImplicitMatrix(MappedImplicitMatrix),
	Reduction(MappedReduction),
	MatrixProduct(MappedMatrixProduct),
}

/// Kernel-side view of one expression-tree node.
///
/// Everything is fixed at construction except the access name: the local variable that
/// holds a fetched value. While it is set, `evaluate()` returns it instead of the default
/// expression, so a fetched operand is read from memory only once per body.
#[derive(Debug)]
pub struct MappedObject {
	scalartype: String,
	access_name: RefCell<String>,
	kind: MappedKind,
}

impl MappedObject {
	pub fn new(scalartype: impl Into<String>, kind: MappedKind) -> Self {
		Self {
			scalartype: scalartype.into(),
			access_name: RefCell::new(String::new()),
			kind,
		}
	}

	pub fn scalar(scalartype: impl Into<String>, name: impl Into<String>, buffer: BufferId) -> Self {
		Self::new(scalartype, MappedKind::Handle(MappedHandle::new(name, 1, buffer, Storage::Scalar)))
	}

	pub fn vector(
		scalartype: impl Into<String>,
		name: impl Into<String>,
		simd_width: u32,
		buffer: BufferId,
		layout: VectorLayout,
	) -> Self {
		let handle = MappedHandle::new(name, simd_width, buffer, Storage::Vector(layout));
		Self::new(scalartype, MappedKind::Handle(handle))
	}

	pub fn matrix(
		scalartype: impl Into<String>,
		name: impl Into<String>,
		simd_width: u32,
		buffer: BufferId,
		layout: MatrixLayout,
	) -> Self {
		let handle = MappedHandle::new(name, simd_width, buffer, Storage::Matrix(layout));
		Self::new(scalartype, MappedKind::Handle(handle))
	}

	pub fn host_scalar(scalartype: impl Into<String>, name: impl Into<String>, value: f64) -> Self {
		Self::new(scalartype, MappedKind::HostScalar(MappedHostScalar::new(name, value)))
	}

	pub fn implicit_vector(scalartype: impl Into<String>, implicit: MappedImplicitVector) -> Self {
		Self::new(scalartype, MappedKind::ImplicitVector(implicit))
	}

	pub fn implicit_matrix(scalartype: impl Into<String>, implicit: MappedImplicitMatrix) -> Self {
		Self::new(scalartype, MappedKind::ImplicitMatrix(implicit))
	}

	pub fn scalar_reduction(scalartype: impl Into<String>, info: NodeInfo, kind: ReductionKind) -> Self {
		let reduction = MappedReduction::new(info, kind, ReductionShape::Scalar);
		Self::new(scalartype, MappedKind::Reduction(reduction))
	}

	pub fn vector_reduction(scalartype: impl Into<String>, info: NodeInfo, kind: ReductionKind) -> Self {
		let reduction = MappedReduction::new(info, kind, ReductionShape::Vector);
		Self::new(scalartype, MappedKind::Reduction(reduction))
	}

	pub fn matrix_product(scalartype: impl Into<String>, info: NodeInfo) -> Self {
		Self::new(scalartype, MappedKind::MatrixProduct(MappedMatrixProduct::new(info)))
	}

	//----------------------------------------------------------------------------------------------

	pub fn scalartype(&self) -> &str {
		&self.scalartype
	}

	pub fn kind(&self) -> &MappedKind {
		&self.kind
	}

	pub fn access_name(&self) -> Ref<'_, String> {
		self.access_name.borrow()
	}

	pub fn set_access_name(&self, name: &str) {
		let mut access_name = self.access_name.borrow_mut();
		access_name.clear();
		access_name.push_str(name);
	}

	pub fn clear_access_name(&self) {
		self.access_name.borrow_mut().clear();
	}

	pub fn has_access_name(&self) -> bool {
		!self.access_name.borrow().is_empty()
	}

	//----------------------------------------------------------------------------------------------

	/// Source expression for the value of this node at `index`.
	///
	/// Returns the access name verbatim if one is set. `lane` selects one lane of a SIMD
	/// value; only vector and matrix buffers honor it.
	///
	/// # Panics
	///
	/// If a buffer is asked for a lane beyond its SIMD width, or one the dialect cannot
	/// name.
	pub fn evaluate(&self, index: &IndexTuple, lane: Option<u32>, program: &MappedStatements) -> String {
		let cached = self.access_name.borrow().clone();
		let mut value =
			if cached.is_empty() { self.generate_default(index, program) } else { cached };
		if let Some(lane) = lane
			&& let MappedKind::Handle(handle) = &self.kind
			&& handle.is_buffer()
		{
			value.push_str(&lane_accessor(program.config().dialect, handle, lane));
		}
		value
	}

	/// The uncached expression of this node. Binary leaves have none.
	pub fn generate_default(&self, index: &IndexTuple, program: &MappedStatements) -> String {
		match &self.kind {
			MappedKind::Handle(handle) => handle.generate_default(index, program),
			MappedKind::HostScalar(scalar) => scalar.name().to_string(),
			MappedKind::ImplicitVector(implicit) => implicit.value_name().to_string(),
			MappedKind::ImplicitMatrix(implicit) => implicit.value_name().to_string(),
			MappedKind::Reduction(..) | MappedKind::MatrixProduct(..) => String::new(),
		}
	}

	pub fn append_kernel_arguments<'a>(&self, args: &'a mut KernelArguments) -> &'a mut KernelArguments {
		match &self.kind {
			MappedKind::Handle(handle) => {
				handle.append_kernel_arguments(&self.scalartype, args);
			},
			MappedKind::HostScalar(scalar) => {
				scalar.append_kernel_arguments(&self.scalartype, args);
			},
			MappedKind::ImplicitVector(implicit) => {
				implicit.append_kernel_arguments(&self.scalartype, args);
			},
			MappedKind::ImplicitMatrix(implicit) => {
				implicit.append_kernel_arguments(&self.scalartype, args);
			},
			MappedKind::Reduction(..) | MappedKind::MatrixProduct(..) => {},
		}
		args
	}

	//----------------------------------------------------------------------------------------------

	pub fn handle(&self) -> Option<Handle<'_>> {
		match &self.kind {
			MappedKind::Handle(handle) => Some(Handle::new(self, handle)),
			_ => None,
		}
	}

	pub fn as_reduction(&self) -> Option<&MappedReduction> {
		match &self.kind {
			MappedKind::Reduction(reduction) => Some(reduction),
			_ => None,
		}
	}

	pub fn as_matrix_product(&self) -> Option<&MappedMatrixProduct> {
		match &self.kind {
			MappedKind::MatrixProduct(product) => Some(product),
			_ => None,
		}
	}

	/// Subtree summarized by this node, if it is a binary leaf.
	pub fn binary_leaf_info(&self) -> Option<NodeInfo> {
		match &self.kind {
			MappedKind::Reduction(reduction) => Some(reduction.info()),
			MappedKind::MatrixProduct(product) => Some(product.info()),
			_ => None,
		}
	}

	/// The generator swaps `i` and `j` before evaluating a transposed matrix.
	pub fn interpret_as_transposed(&self) -> bool {
		match &self.kind {
			MappedKind::Handle(handle) => match handle.storage() {
				Storage::Matrix(layout) => layout.interpret_as_transposed,
				_ => false,
			},
			_ => false,
		}
	}
}

//--------------------------------------------------------------------------------------------------
