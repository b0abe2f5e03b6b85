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
use crate::mapping::{IndexTuple, MappedStatements};
use crate::rhs::generate_rhs;
use crate::statement::{
	BufferId, MatrixOperand, Node, NodeIndex, OpKind, Operand, Statement, StatementIndex,
};
use crate::tests::init_logging;

//--------------------------------------------------------------------------------------------------

fn matrix(buffer: usize) -> MatrixOperand {
	MatrixOperand::new(ScalarType::Float, BufferId::new(buffer), 8, 8)
}

/// a = trans(b)
fn assign_transposed(a: MatrixOperand, b: MatrixOperand) -> Statement {
	let mut st = Statement::new();
	st.push(Node::new(Operand::Matrix(a), OpKind::Assign, Operand::Composite(NodeIndex::new(1))));
	st.push(Node::unary(OpKind::Trans, Operand::Matrix(b)));
	st
}

fn rhs_of(program: &MappedStatements, s: StatementIndex, index: &IndexTuple) -> String {
	let mut rhs = String::new();
	generate_rhs(program, s, program.statement(s).root(), index, None, &mut rhs);
	rhs
}

/// Generates fetch, assignment and write-back for one body.
fn body_of(program: &MappedStatements, s: StatementIndex, index: &IndexTuple) -> String {
	let mut ctx = KernelContext::new(program.config().dialect);
	let mut body = KernelBody::new();
	program.fetch_all(s, "_x", index, &mut ctx, &mut body);
	let rhs = rhs_of(program, s, index);
	body.line_fmt(format_args!("{rhs};"));
	program.write_back_assigned(s, "_x", index, &mut ctx, &mut body);
	body.into_string()
}

#[test]
fn test_fetch_under_trans_loads_the_element_rhs_reads() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let mut program = MappedStatements::default();
	let s = program.map_statement(assign_transposed(matrix(0), matrix(1)))?;
	let index = IndexTuple::new("r", "c");

	let unfetched = rhs_of(&program, s, &index);
	assert_eq!(unfetched, "arg0[(r)+ (c)*arg0_ld] = arg1[(c)+ (r)*arg1_ld]");
	let (target, source) = unfetched.split_once(" = ").unwrap();

	let body = body_of(&program, s, &index);
	assert_eq!(
		body,
		format!(
			"float arg0_x = {target};\n\
			 float arg1_x = {source};\n\
			 arg0_x = arg1_x;\n\
			 {target} = arg0_x;\n"
		)
	);
	Ok(())
}

#[test]
fn test_row_major_under_trans_reads_unswapped() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let mut program = MappedStatements::default();
	let s = program.map_statement(assign_transposed(matrix(0), matrix(1).row_major()))?;
	let index = IndexTuple::new("r", "c");

	// the two swaps cancel out
	assert_eq!(rhs_of(&program, s, &index), "arg0[(r)+ (c)*arg0_ld] = arg1[(r)+ (c)*arg1_ld]");
	assert_eq!(
		body_of(&program, s, &index),
		"float arg0_x = arg0[(r)+ (c)*arg0_ld];\n\
		 float arg1_x = arg1[(r)+ (c)*arg1_ld];\n\
		 arg0_x = arg1_x;\n\
		 arg0[(r)+ (c)*arg0_ld] = arg0_x;\n"
	);
	Ok(())
}

#[test]
fn test_row_major_target_is_stored_where_it_was_loaded() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let mut program = MappedStatements::default();
	let mut st = Statement::new();
	st.push(Node::new(
		Operand::Matrix(matrix(0).row_major()),
		OpKind::Assign,
		Operand::Matrix(matrix(1)),
	));
	let s = program.map_statement(st)?;
	let index = IndexTuple::new("r", "c");

	assert_eq!(rhs_of(&program, s, &index), "arg0[(c)+ (r)*arg0_ld] = arg1[(r)+ (c)*arg1_ld]");
	assert_eq!(
		body_of(&program, s, &index),
		"float arg0_x = arg0[(c)+ (r)*arg0_ld];\n\
		 float arg1_x = arg1[(r)+ (c)*arg1_ld];\n\
		 arg0_x = arg1_x;\n\
		 arg0[(c)+ (r)*arg0_ld] = arg0_x;\n"
	);
	Ok(())
}

#[test]
fn test_double_trans_cancels_out() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	// a = trans(trans(b))
	let mut st = Statement::new();
	st.push(Node::new(
		Operand::Matrix(matrix(0)),
		OpKind::Assign,
		Operand::Composite(NodeIndex::new(1)),
	));
	st.push(Node::unary(OpKind::Trans, Operand::Composite(NodeIndex::new(2))));
	st.push(Node::unary(OpKind::Trans, Operand::Matrix(matrix(1))));

	let mut program = MappedStatements::default();
	let s = program.map_statement(st)?;
	let index = IndexTuple::new("r", "c");

	assert_eq!(rhs_of(&program, s, &index), "arg0[(r)+ (c)*arg0_ld] = arg1[(r)+ (c)*arg1_ld]");
	assert!(body_of(&program, s, &index).contains("float arg1_x = arg1[(r)+ (c)*arg1_ld];\n"));
	Ok(())
}

//--------------------------------------------------------------------------------------------------
