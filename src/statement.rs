//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::define_index_type;
use crate::dtype::ScalarType;
use crate::util::index_vec::IndexVec;

//--------------------------------------------------------------------------------------------------

define_index_type!(NodeIndex);
define_index_type!(StatementIndex);
define_index_type!(BufferId);

//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReductionKind {
	Sum,
	Max,
	Min,
	Prod,
}

impl ReductionKind {
	/// Expression combining the partial result `acc` with `x`.
	pub fn combine(self, acc: &str, x: &str) -> String {
		match self {
			Self::Sum => format!("{acc} + {x}"),
			Self::Max => format!("fmax({acc}, {x})"),
			Self::Min => format!("fmin({acc}, {x})"),
			Self::Prod => format!("{acc} * {x}"),
		}
	}

	pub fn neutral_element(self) -> &'static str {
		match self {
			Self::Sum => "0",
			Self::Max => "-INFINITY",
			Self::Min => "INFINITY",
			Self::Prod => "1",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryFn {
	Abs,
	Exp,
	Log,
	Sqrt,
	Sin,
	Cos,
	Tan,
	Tanh,
	Floor,
	Ceil,
}

impl UnaryFn {
	pub const fn name(self) -> &'static str {
		match self {
			Self::Abs => "fabs",
			Self::Exp => "exp",
			Self::Log => "log",
			Self::Sqrt => "sqrt",
			Self::Sin => "sin",
			Self::Cos => "cos",
			Self::Tan => "tan",
			Self::Tanh => "tanh",
			Self::Floor => "floor",
			Self::Ceil => "ceil",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	Assign,
	InplaceAdd,
	InplaceSub,

	Add,
	Sub,
	Mult,
	Div,
	ElementProd,
	ElementDiv,
	ElementPow,
	ElementMax,
	ElementMin,

	Neg,
	Trans,
	Unary(UnaryFn),

	InnerProd,
	MatVecProd,
	MatMatProd,
	Reduce(ReductionKind),
	RowReduce(ReductionKind),
}

impl OpKind {
	pub const fn is_assignment(self) -> bool {
		matches!(self, Self::Assign | Self::InplaceAdd | Self::InplaceSub)
	}

	/// Ops whose value is produced by a separate reduction / product pass.
	pub const fn is_summarizing(self) -> bool {
		matches!(
			self,
			Self::InnerProd
				| Self::MatVecProd
				| Self::MatMatProd
				| Self::Reduce(..)
				| Self::RowReduce(..)
		)
	}

	pub const fn is_unary(self) -> bool {
		matches!(
			self,
			Self::Neg | Self::Trans | Self::Unary(..) | Self::Reduce(..) | Self::RowReduce(..)
		)
	}

	/// Symbol of ops written as `lhs <symbol> rhs`.
	pub const fn infix_symbol(self) -> Option<&'static str> {
		match self {
			Self::Assign => Some("="),
			Self::InplaceAdd => Some("+="),
			Self::InplaceSub => Some("-="),
			Self::Add => Some("+"),
			Self::Sub => Some("-"),
			Self::Mult | Self::ElementProd => Some("*"),
			Self::Div | Self::ElementDiv => Some("/"),
			_ => None,
		}
	}

	/// Name of ops written as `name(lhs,rhs)`.
	pub const fn binary_function(self) -> Option<&'static str> {
		match self {
			Self::ElementPow => Some("pow"),
			Self::ElementMax => Some("fmax"),
			Self::ElementMin => Some("fmin"),
			_ => None,
		}
	}
}

//--------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct VectorOperand {
	pub dtype: ScalarType,
	pub buffer: BufferId,
	pub start: u32,
	pub stride: u32,
	pub size: u32,

	/// Root of a subtree of the same statement computing the element address.
	/// When set, `start` and `stride` are not used for addressing.
	pub address: Option<NodeIndex>,
}

impl VectorOperand {
	pub fn new(dtype: ScalarType, buffer: BufferId, size: u32) -> Self {
		Self {
			dtype,
			buffer,
			start: 0,
			stride: 1,
			size,
			address: None,
		}
	}

	pub fn with_range(mut self, start: u32, stride: u32) -> Self {
		self.start = start;
		self.stride = stride;
		self
	}

	pub fn with_address(mut self, address: NodeIndex) -> Self {
		self.address = Some(address);
		self
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatrixOperand {
	pub dtype: ScalarType,
	pub buffer: BufferId,
	pub size1: u32,
	pub size2: u32,

	/// Leading dimension, i.e. the allocated size of the fastest-varying axis.
	pub ld: u32,
	pub start1: u32,
	pub stride1: u32,
	pub start2: u32,
	pub stride2: u32,
	pub row_major: bool,
}

impl MatrixOperand {
	pub fn new(dtype: ScalarType, buffer: BufferId, size1: u32, size2: u32) -> Self {
		Self {
			dtype,
			buffer,
			size1,
			size2,
			ld: size1,
			start1: 0,
			stride1: 1,
			start2: 0,
			stride2: 1,
			row_major: false,
		}
	}

	pub fn row_major(mut self) -> Self {
		self.row_major = true;
		self.ld = self.size2;
		self
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImplicitVectorOperand {
	pub dtype: ScalarType,
	pub size: u32,
	pub value: f64,

	/// The value is known when the kernel is generated and is written as a literal.
	pub is_value_static: bool,

	/// Set for unit vectors: only the element at `index` has `value`.
	pub index: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImplicitMatrixOperand {
	pub dtype: ScalarType,
	pub value: f64,
	pub is_value_static: bool,
	pub is_diag: bool,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Operand {
	#[default]
	Invalid,
	Composite(NodeIndex),
	HostScalar {
		dtype: ScalarType,
		value: f64,
	},
	Scalar {
		dtype: ScalarType,
		buffer: BufferId,
	},
	Vector(VectorOperand),
	Matrix(MatrixOperand),
	ImplicitVector(ImplicitVectorOperand),
	ImplicitMatrix(ImplicitMatrixOperand),
}

impl Operand {
	pub fn is_invalid(&self) -> bool {
		matches!(self, Self::Invalid)
	}

	pub fn is_leaf(&self) -> bool {
		!matches!(self, Self::Invalid | Self::Composite(..))
	}

	pub fn dtype(&self) -> Option<ScalarType> {
		match self {
			Self::Invalid | Self::Composite(..) => None,
			Self::HostScalar { dtype, .. } | Self::Scalar { dtype, .. } => Some(*dtype),
			Self::Vector(v) => Some(v.dtype),
			Self::Matrix(m) => Some(m.dtype),
			Self::ImplicitVector(v) => Some(v.dtype),
			Self::ImplicitMatrix(m) => Some(m.dtype),
		}
	}
}

//--------------------------------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub lhs: Operand,
	pub op: OpKind,
	pub rhs: Operand,
}

impl Node {
	pub fn new(lhs: Operand, op: OpKind, rhs: Operand) -> Self {
		Self { lhs, op, rhs }
	}

	pub fn unary(op: OpKind, operand: Operand) -> Self {
		debug_assert!(op.is_unary(), "Node::unary(): {op:?} is not a unary op");
		Self { lhs: operand, op, rhs: Operand::Invalid }
	}
}

/// One numeric operation, e.g. `x = y + z`, stored as a flat arena of nodes.
///
/// Children are referenced by `Operand::Composite(index)`, so nodes may be pushed in
/// any order. The root is node 0 unless `set_root()` says otherwise.
#[derive(Clone, Debug)]
pub struct Statement {
	pub nodes: IndexVec<NodeIndex, Node>,
	root: NodeIndex,
}

impl Default for Statement {
	fn default() -> Self {
		Self::new()
	}
}

impl Statement {
	pub fn new() -> Self {
		Self {
			nodes: IndexVec::new(),
			root: NodeIndex::new(0),
		}
	}

	pub fn push(&mut self, node: Node) -> NodeIndex {
		self.nodes.push(node)
	}

	pub fn root(&self) -> NodeIndex {
		self.root
	}

	pub fn set_root(&mut self, root: NodeIndex) {
		self.root = root;
	}

	pub fn node(&self, index: NodeIndex) -> Option<&Node> {
		self.nodes.get(index)
	}

	/// Element type of the subtree rooted at `index`: the type of its leftmost leaf.
	pub fn scalartype_of(&self, index: NodeIndex) -> Option<ScalarType> {
		let mut current = index;
		// bounded in case of a malformed (cyclic) statement
		for _ in 0..=self.nodes.len() {
			let node = self.nodes.get(current)?;
			for operand in [&node.lhs, &node.rhs] {
				if let Some(dtype) = operand.dtype() {
					return Some(dtype);
				}
			}
			match (&node.lhs, &node.rhs) {
				(Operand::Composite(child), _) | (_, Operand::Composite(child)) => current = *child,
				_ => return None,
			}
		}
		None
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
