//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::mapped::NodeInfo;
use crate::statement::{NodeIndex, ReductionKind};

//--------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReductionShape {
	/// Inner-product style, collapses to one value.
	Scalar,

	/// Matrix-vector-product style, collapses one axis.
	Vector,
}

/// A reduction over the subtree at `info`. Its value exists only after the reduction pass
/// has computed it and set the access name of the owning object.
#[derive(Debug)]
pub struct MappedReduction {
	info: NodeInfo,
	kind: ReductionKind,
	shape: ReductionShape,
}

impl MappedReduction {
	pub fn new(info: NodeInfo, kind: ReductionKind, shape: ReductionShape) -> Self {
		Self { info, kind, shape }
	}

	pub fn info(&self) -> NodeInfo {
		self.info
	}

	pub fn root_idx(&self) -> NodeIndex {
		self.info.root
	}

	pub fn reduction_type(&self) -> ReductionKind {
		self.kind
	}

	pub fn shape(&self) -> ReductionShape {
		self.shape
	}
}

//--------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct MappedMatrixProduct {
	info: NodeInfo,
}

impl MappedMatrixProduct {
	pub fn new(info: NodeInfo) -> Self {
		Self { info }
	}

	pub fn info(&self) -> NodeInfo {
		self.info
	}

	pub fn root_idx(&self) -> NodeIndex {
		self.info.root
	}
}

//--------------------------------------------------------------------------------------------------
