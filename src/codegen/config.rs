//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::borrow::Cow;

use crate::error::InvalidSimdWidthError;

//--------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
	#[default]
	OpenCL,
	Cuda,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UnknownDialectError;

impl std::str::FromStr for Dialect {
	type Err = UnknownDialectError;

	fn from_str(s: &str) -> Result<Self, UnknownDialectError> {
		match s {
			"opencl" | "OpenCL" | "cl" => Ok(Self::OpenCL),
			"cuda" | "CUDA" | "cu" => Ok(Self::Cuda),
			_ => Err(UnknownDialectError),
		}
	}
}

impl Dialect {
	/// Qualifier written in front of pointer parameters. Empty for CUDA.
	pub const fn global_address_space(self) -> &'static str {
		match self {
			Self::OpenCL => "__global",
			Self::Cuda => "",
		}
	}

	pub const fn kernel_qualifier(self) -> &'static str {
		match self {
			Self::OpenCL => "__kernel void",
			Self::Cuda => "extern \"C\" __global__ void",
		}
	}

	/// Accessor selecting one lane of a SIMD value, e.g. `.s3` or `.w`. `None` if the
	/// dialect's vector types have no such lane.
	pub fn lane_accessor(self, lane: u32) -> Option<String> {
		match self {
			Self::OpenCL => (lane < 16).then(|| format!(".s{lane:x}")),
			Self::Cuda => {
				let component = match lane {
					0 => ".x",
					1 => ".y",
					2 => ".z",
					3 => ".w",
					_ => return None,
				};
				Some(component.to_string())
			},
		}
	}

	/// Widest vector type the dialect has: `float16` in OpenCL, `float4` in CUDA.
	pub const fn max_simd_width(self) -> u32 {
		match self {
			Self::OpenCL => 16,
			Self::Cuda => 4,
		}
	}
}

//--------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
	pub dialect: Dialect,

	/// Lanes per load/store of vector and matrix operands. Scalars always use 1.
	pub simd_width: u32,

	/// Prefix of generated operand names: `arg0`, `arg1`, ...
	pub name_prefix: Cow<'static, str>,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self::new()
	}
}

impl GeneratorConfig {
	pub const fn new() -> Self {
		Self {
			dialect: Dialect::OpenCL,
			simd_width: 1,
			name_prefix: Cow::Borrowed("arg"),
		}
	}

	pub fn with_dialect(mut self, dialect: Dialect) -> Self {
		self.dialect = dialect;
		self
	}

	/// Fails if the current dialect has no vector type of this width. Set the dialect
	/// first; `MappedStatements::map_statement()` checks the pair again.
	pub fn with_simd_width(mut self, simd_width: u32) -> Result<Self, InvalidSimdWidthError> {
		check_simd_width(self.dialect, simd_width)?;
		self.simd_width = simd_width;
		Ok(self)
	}

	pub fn with_name_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
		self.name_prefix = prefix.into();
		self
	}
}

pub fn check_simd_width(dialect: Dialect, simd_width: u32) -> Result<(), InvalidSimdWidthError> {
	if simd_width.is_power_of_two() && simd_width <= dialect.max_simd_width() {
		Ok(())
	} else {
		Err(InvalidSimdWidthError)
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
