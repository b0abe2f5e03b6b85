//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

//--------------------------------------------------------------------------------------------------

/// Element type of an operand, as spelled in device source.
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScalarType {
	Char,
	UChar,
	Short,
	UShort,
	Int,
	UInt,
	Long,
	ULong,
	Half,
	Float,
	Double,
}

pub trait HasScalarType {
	const scalartype: ScalarType;
}

impl HasScalarType for i8 {
	const scalartype: ScalarType = ScalarType::Char;
}

impl HasScalarType for u8 {
	const scalartype: ScalarType = ScalarType::UChar;
}

impl HasScalarType for i16 {
	const scalartype: ScalarType = ScalarType::Short;
}

impl HasScalarType for u16 {
	const scalartype: ScalarType = ScalarType::UShort;
}

impl HasScalarType for i32 {
	const scalartype: ScalarType = ScalarType::Int;
}

impl HasScalarType for u32 {
	const scalartype: ScalarType = ScalarType::UInt;
}

impl HasScalarType for i64 {
	const scalartype: ScalarType = ScalarType::Long;
}

impl HasScalarType for u64 {
	const scalartype: ScalarType = ScalarType::ULong;
}

impl HasScalarType for f32 {
	const scalartype: ScalarType = ScalarType::Float;
}

impl HasScalarType for f64 {
	const scalartype: ScalarType = ScalarType::Double;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct UnknownScalarTypeError;

impl std::fmt::Display for UnknownScalarTypeError {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "Unknown scalar type")
	}
}

impl std::error::Error for UnknownScalarTypeError {}

impl std::str::FromStr for ScalarType {
	type Err = UnknownScalarTypeError;

	fn from_str(s: &str) -> Result<Self, UnknownScalarTypeError> {
		match s {
			"char" | "i8" => Ok(Self::Char),
			"uchar" | "u8" => Ok(Self::UChar),
			"short" | "i16" => Ok(Self::Short),
			"ushort" | "u16" => Ok(Self::UShort),
			"int" | "i32" => Ok(Self::Int),
			"uint" | "unsigned int" | "u32" => Ok(Self::UInt),
			"long" | "i64" => Ok(Self::Long),
			"ulong" | "u64" => Ok(Self::ULong),
			"half" | "f16" => Ok(Self::Half),
			"float" | "f32" => Ok(Self::Float),
			"double" | "f64" => Ok(Self::Double),
			_ => Err(UnknownScalarTypeError),
		}
	}
}

impl ScalarType {
	/// The name used in device source. Vector types append the lane count to it.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Char => "char",
			Self::UChar => "uchar",
			Self::Short => "short",
			Self::UShort => "ushort",
			Self::Int => "int",
			Self::UInt => "uint",
			Self::Long => "long",
			Self::ULong => "ulong",
			Self::Half => "half",
			Self::Float => "float",
			Self::Double => "double",
		}
	}
}

impl std::fmt::Display for ScalarType {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		write!(f, "{}", self.name())
	}
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_device_and_rust_names() {
		assert_eq!("float".parse::<ScalarType>(), Ok(ScalarType::Float));
		assert_eq!("f64".parse::<ScalarType>(), Ok(ScalarType::Double));
		assert_eq!("unsigned int".parse::<ScalarType>(), Ok(ScalarType::UInt));
		assert_eq!("f128".parse::<ScalarType>(), Err(UnknownScalarTypeError));
	}

	#[test]
	fn rust_primitives_map_to_device_names() {
		assert_eq!(f32::scalartype.name(), "float");
		assert_eq!(u32::scalartype.name(), "uint");
		assert_eq!(f64::scalartype.to_string(), "double");
	}
}

//--------------------------------------------------------------------------------------------------
