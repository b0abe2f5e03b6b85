//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::mapping::{IndexTuple, LeafKind, MappedStatements};
use crate::statement::{NodeIndex, OpKind, Operand, StatementIndex};

//--------------------------------------------------------------------------------------------------

/// Appends the source expression of the subtree at `root` to `out`.
///
/// Leaves evaluate through their mapped objects, so a fetched operand shows up as its
/// local variable. Summarizing ops evaluate to their binary leaf, which is empty until the
/// reduction pass has set its access name.
pub fn generate_rhs(
	program: &MappedStatements,
	statement: StatementIndex,
	root: NodeIndex,
	index: &IndexTuple,
	lane: Option<u32>,
	out: &mut String,
) {
	let Some(node) = program.statement(statement).node(root) else {
		return;
	};
	let op = node.op;

	if op.is_summarizing() {
		let parent = program.object(statement, root, LeafKind::Parent);
		out.push_str(&parent.evaluate(index, lane, program));
		return;
	}

	let emit = |out: &mut String, operand: &Operand, leaf: LeafKind, index: &IndexTuple| {
		generate_operand(program, statement, root, leaf, operand, index, lane, out);
	};

	match op {
		OpKind::Trans => {
			emit(out, &node.lhs, LeafKind::Lhs, &index.transposed());
		},
		OpKind::Neg => {
			out.push_str("-(");
			emit(out, &node.lhs, LeafKind::Lhs, index);
			out.push(')');
		},
		OpKind::Unary(f) => {
			out.push_str(f.name());
			out.push('(');
			emit(out, &node.lhs, LeafKind::Lhs, index);
			out.push(')');
		},
		_ => {
			if let Some(function) = op.binary_function() {
				out.push_str(function);
				out.push('(');
				emit(out, &node.lhs, LeafKind::Lhs, index);
				out.push(',');
				emit(out, &node.rhs, LeafKind::Rhs, index);
				out.push(')');
			} else if let Some(symbol) = op.infix_symbol() {
				let assignment = op.is_assignment();
				if !assignment {
					out.push('(');
				}
				emit(out, &node.lhs, LeafKind::Lhs, index);
				out.push(' ');
				out.push_str(symbol);
				out.push(' ');
				emit(out, &node.rhs, LeafKind::Rhs, index);
				if !assignment {
					out.push(')');
				}
			}
		},
	}
}

#[allow(clippy::too_many_arguments)]
fn generate_operand(
	program: &MappedStatements,
	statement: StatementIndex,
	node: NodeIndex,
	leaf: LeafKind,
	operand: &Operand,
	index: &IndexTuple,
	lane: Option<u32>,
	out: &mut String,
) {
	match operand {
		Operand::Invalid => {},
		Operand::Composite(child) => generate_rhs(program, statement, *child, index, lane, out),
		_ => {
			let object = program.object(statement, node, leaf);
			let value = if object.interpret_as_transposed() {
				object.evaluate(&index.transposed(), lane, program)
			} else {
				object.evaluate(index, lane, program)
			};
			out.push_str(&value);
		},
	}
}

//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dtype::ScalarType;
	use crate::statement::{BufferId, MatrixOperand, Node, Statement, UnaryFn, VectorOperand};

	fn vector(buffer: usize) -> Operand {
		Operand::Vector(VectorOperand::new(ScalarType::Float, BufferId::new(buffer), 16))
	}

	fn rhs_of(program: &MappedStatements, statement: StatementIndex, index: &IndexTuple) -> String {
		let mut out = String::new();
		let root = program.statement(statement).root();
		generate_rhs(program, statement, root, index, None, &mut out);
		out
	}

	#[test]
	fn assignment_is_not_parenthesized() {
		// x = exp(y) + -(z)
		let mut st = Statement::new();
		st.push(Node::new(vector(0), OpKind::Assign, Operand::Composite(NodeIndex::new(1))));
		st.push(Node::new(
			Operand::Composite(NodeIndex::new(2)),
			OpKind::Add,
			Operand::Composite(NodeIndex::new(3)),
		));
		st.push(Node::unary(OpKind::Unary(UnaryFn::Exp), vector(1)));
		st.push(Node::unary(OpKind::Neg, vector(2)));

		let mut program = MappedStatements::default();
		let s = program.map_statement(st).unwrap();
		assert_eq!(
			rhs_of(&program, s, &IndexTuple::new("i", "0")),
			"arg0[arg0_start+i*arg0_stride] = (exp(arg1[arg1_start+i*arg1_stride]) + \
			 -(arg2[arg2_start+i*arg2_stride]))"
		);
	}

	#[test]
	fn binary_functions_use_call_syntax() {
		let mut st = Statement::new();
		st.push(Node::new(vector(0), OpKind::InplaceAdd, Operand::Composite(NodeIndex::new(1))));
		st.push(Node::new(
			vector(1),
			OpKind::ElementMax,
			Operand::HostScalar { dtype: ScalarType::Float, value: 0.0 },
		));

		let mut program = MappedStatements::default();
		let s = program.map_statement(st).unwrap();
		assert_eq!(
			rhs_of(&program, s, &IndexTuple::new("i", "0")),
			"arg0[arg0_start+i*arg0_stride] += fmax(arg1[arg1_start+i*arg1_stride],arg2)"
		);
	}

	#[test]
	fn transpose_swaps_index_of_subtree() {
		let a = MatrixOperand::new(ScalarType::Float, BufferId::new(0), 4, 4);
		let b = MatrixOperand::new(ScalarType::Float, BufferId::new(1), 4, 4);
		let mut st = Statement::new();
		st.push(Node::new(Operand::Matrix(a), OpKind::Assign, Operand::Composite(NodeIndex::new(1))));
		st.push(Node::unary(OpKind::Trans, Operand::Matrix(b)));

		let mut program = MappedStatements::default();
		let s = program.map_statement(st).unwrap();
		assert_eq!(
			rhs_of(&program, s, &IndexTuple::new("r", "c")),
			"arg0[(r)+ (c)*arg0_ld] = arg1[(c)+ (r)*arg1_ld]"
		);
	}

	#[test]
	fn row_major_matrix_is_read_transposed() {
		let a = MatrixOperand::new(ScalarType::Float, BufferId::new(0), 4, 8).row_major();
		let mut st = Statement::new();
		st.push(Node::new(vector(1), OpKind::Assign, Operand::Matrix(a)));

		let mut program = MappedStatements::default();
		let s = program.map_statement(st).unwrap();
		let mut out = String::new();
		generate_rhs(&program, s, NodeIndex::new(0), &IndexTuple::new("i", "j"), None, &mut out);
		assert_eq!(out, "arg0[arg0_start+i*arg0_stride] = arg1[(j)+ (i)*arg1_ld]");
	}

	#[test]
	fn summarizing_op_evaluates_to_its_access_name() {
		let mut st = Statement::new();
		st.push(Node::new(
			Operand::Scalar { dtype: ScalarType::Float, buffer: BufferId::new(0) },
			OpKind::Assign,
			Operand::Composite(NodeIndex::new(1)),
		));
		st.push(Node::new(vector(1), OpKind::InnerProd, vector(2)));

		let mut program = MappedStatements::default();
		let s = program.map_statement(st).unwrap();
		let index = IndexTuple::new("0", "0");

		// not computed yet: nothing to show
		assert_eq!(rhs_of(&program, s, &index), "arg0[0] = ");

		program.object(s, NodeIndex::new(1), LeafKind::Parent).set_access_name("sum_1");
		assert_eq!(rhs_of(&program, s, &index), "arg0[0] = sum_1");
	}
}

//--------------------------------------------------------------------------------------------------
