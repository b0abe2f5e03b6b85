//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::ErrPack;
use crate::codegen::{KernelBody, KernelContext};
use crate::dtype::ScalarType;
use crate::error::MappingError;
use crate::mapping::{IndexTuple, LeafKind, MappedStatements};
use crate::rhs::generate_rhs;
use crate::statement::{BufferId, Node, NodeIndex, OpKind, Operand, Statement, VectorOperand};
use crate::tests::init_logging;

//--------------------------------------------------------------------------------------------------

fn vector(dtype: ScalarType, buffer: usize) -> VectorOperand {
	VectorOperand::new(dtype, BufferId::new(buffer), 64)
}

/// y[idx[i] + base] = x[i]
fn scatter() -> Statement {
	let mut st = Statement::new();
	let y = vector(ScalarType::Float, 0).with_address(NodeIndex::new(1));
	st.push(Node::new(
		Operand::Vector(y),
		OpKind::Assign,
		Operand::Vector(vector(ScalarType::Float, 1)),
	));
	st.push(Node::new(
		Operand::Vector(vector(ScalarType::UInt, 2)),
		OpKind::Add,
		Operand::HostScalar { dtype: ScalarType::UInt, value: 4.0 },
	));
	st
}

#[test]
fn test_address_is_regenerated_from_subtree() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let mut program = MappedStatements::default();
	let s = program.map_statement(scatter())?;
	let index = IndexTuple::new("i", "0");

	let y = program.object(s, NodeIndex::new(0), LeafKind::Lhs);
	assert_eq!(y.generate_default(&index, &program), "arg0[(arg2[arg2_start+i*arg2_stride] + arg3)]");

	// once the index vector is in a local, the address reads the local
	let idx = program.object(s, NodeIndex::new(1), LeafKind::Lhs);
	idx.set_access_name("idx_i");
	assert_eq!(y.generate_default(&index, &program), "arg0[(idx_i + arg3)]");
	idx.clear_access_name();

	let mut rhs = String::new();
	generate_rhs(&program, s, NodeIndex::new(0), &index, None, &mut rhs);
	assert_eq!(
		rhs,
		"arg0[(arg2[arg2_start+i*arg2_stride] + arg3)] = arg1[arg1_start+i*arg1_stride]"
	);
	Ok(())
}

#[test]
fn test_indirect_fetch_and_write_back() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let mut program = MappedStatements::default();
	let s = program.map_statement(scatter())?;
	let index = IndexTuple::new("i", "0");

	let mut ctx = KernelContext::new(program.config().dialect);
	program.append_kernel_arguments(s, &mut ctx.arguments);
	assert_eq!(
		ctx.arguments.signature(),
		"__global float* arg0,unsigned int arg0_start,unsigned int arg0_stride,\
		 __global float* arg1,unsigned int arg1_start,unsigned int arg1_stride,\
		 __global uint* arg2,unsigned int arg2_start,unsigned int arg2_stride,\
		 uint arg3"
	);

	let mut body = KernelBody::new();
	program.fetch_all(s, "_i", &index, &mut ctx, &mut body);
	let mut rhs = String::new();
	generate_rhs(&program, s, NodeIndex::new(0), &index, None, &mut rhs);
	body.line_fmt(format_args!("{rhs};"));
	program.write_back_assigned(s, "_i", &index, &mut ctx, &mut body);

	// the address was taken before `idx` was fetched, the store uses the local
	assert_eq!(
		body.as_str(),
		"float arg0_i = arg0[(arg2[arg2_start+i*arg2_stride] + arg3)];\n\
		 float arg1_i = arg1[arg1_start+i*arg1_stride];\n\
		 uint arg2_i = arg2[arg2_start+i*arg2_stride];\n\
		 arg0_i = arg1_i;\n\
		 arg0[(arg2_i + arg3)] = arg0_i;\n"
	);
	Ok(())
}

//--------------------------------------------------------------------------------------------------
