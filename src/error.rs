//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::ErrPack;

//--------------------------------------------------------------------------------------------------

/// Failures reported by the tree-mapping pass.
///
/// Everything after mapping (evaluation, fetch, write-back, argument emission) is
/// infallible and works on tables this pass has already validated.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
	InvalidNodeIndex,
	MissingOperand,
	UnexpectedOperand,
	InvalidSimdWidth,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct InvalidSimdWidthError;

impl From<InvalidSimdWidthError> for MappingError {
	fn from(_: InvalidSimdWidthError) -> Self {
		Self::InvalidSimdWidth
	}
}

impl From<InvalidSimdWidthError> for ErrPack<MappingError> {
	#[cold]
	#[inline(never)]
	fn from(_: InvalidSimdWidthError) -> Self {
		Self::with_message(
			MappingError::InvalidSimdWidth,
			"SIMD width must be one of 1, 2, 4, 8, 16",
		)
	}
}

//--------------------------------------------------------------------------------------------------
