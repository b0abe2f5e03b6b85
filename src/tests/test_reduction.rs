//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::ErrPack;
use crate::codegen::{KernelBody, KernelContext, assemble_kernel};
use crate::dtype::ScalarType;
use crate::error::MappingError;
use crate::mapped::ReductionShape;
use crate::mapping::{IndexTuple, LeafKind, MappedStatements};
use crate::rhs::generate_rhs;
use crate::statement::{
	BufferId, MatrixOperand, Node, NodeIndex, OpKind, Operand, ReductionKind, Statement,
	VectorOperand,
};
use crate::tests::init_logging;

//--------------------------------------------------------------------------------------------------

fn vector(dtype: ScalarType, buffer: usize) -> Operand {
	Operand::Vector(VectorOperand::new(dtype, BufferId::new(buffer), 256))
}

/// Emits `acc = acc <op> x` over the operands of the summarizing node and publishes the
/// accumulator as the node's value, the way a reduction pass uses the mapped objects.
fn reduce_inner_product(
	program: &MappedStatements,
	s: crate::statement::StatementIndex,
	node: NodeIndex,
	body: &mut KernelBody,
) {
	let parent = program.object(s, node, LeafKind::Parent);
	let reduction = parent.as_reduction().unwrap();
	let kind = reduction.reduction_type();
	let index = IndexTuple::new("k", "0");
	let x = program.object(s, node, LeafKind::Lhs).evaluate(&index, None, program);
	let y = program.object(s, node, LeafKind::Rhs).evaluate(&index, None, program);

	body.line_fmt(format_args!("{} acc = {};", parent.scalartype(), kind.neutral_element()));
	body.line("for (unsigned int k = 0; k < N; ++k)");
	body.line("{");
	body.inc_tab();
	body.line_fmt(format_args!("acc = {};", kind.combine("acc", &format!("{x} * {y}"))));
	body.dec_tab();
	body.line("}");
	parent.set_access_name("acc");
}

#[test]
fn test_inner_product() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	// s = inner_prod(x, y)
	let mut st = Statement::new();
	st.push(Node::new(
		Operand::Scalar { dtype: ScalarType::Double, buffer: BufferId::new(0) },
		OpKind::Assign,
		Operand::Composite(NodeIndex::new(1)),
	));
	st.push(Node::new(
		vector(ScalarType::Double, 1),
		OpKind::InnerProd,
		vector(ScalarType::Double, 2),
	));

	let mut program = MappedStatements::default();
	let s = program.map_statement(st)?;

	let prod = program.object(s, NodeIndex::new(1), LeafKind::Parent);
	assert_eq!(prod.scalartype(), "double");
	assert_eq!(prod.as_reduction().unwrap().shape(), ReductionShape::Scalar);
	assert_eq!(prod.binary_leaf_info().unwrap().root_idx(), NodeIndex::new(1));

	let mut ctx = KernelContext::new(program.config().dialect);
	program.append_kernel_arguments(s, &mut ctx.arguments);
	ctx.arguments.push_value("unsigned int", "N", crate::codegen::ArgBinding::UInt(256));

	let mut body = KernelBody::new();
	reduce_inner_product(&program, s, NodeIndex::new(1), &mut body);

	let mut rhs = String::new();
	generate_rhs(&program, s, NodeIndex::new(0), &IndexTuple::new("0", "0"), None, &mut rhs);
	body.line_fmt(format_args!("{rhs};"));

	assert_eq!(
		assemble_kernel("dot", &ctx.arguments, &body),
		"__kernel void dot(__global double* arg0,\
		 __global double* arg1,unsigned int arg1_start,unsigned int arg1_stride,\
		 __global double* arg2,unsigned int arg2_start,unsigned int arg2_stride,\
		 unsigned int N)\n\
		 {\n\
		 \tdouble acc = 0;\n\
		 \tfor (unsigned int k = 0; k < N; ++k)\n\
		 \t{\n\
		 \t\tacc = acc + arg1[arg1_start+k*arg1_stride] * arg2[arg2_start+k*arg2_stride];\n\
		 \t}\n\
		 \targ0[0] = acc;\n\
		 }\n"
	);
	Ok(())
}

#[test]
fn test_summarizing_ops_map_to_binary_leaves() -> Result<(), ErrPack<MappingError>> {
	init_logging();

	let a = MatrixOperand::new(ScalarType::Float, BufferId::new(0), 8, 8);
	let b = MatrixOperand::new(ScalarType::Float, BufferId::new(1), 8, 8).row_major();
	let c = MatrixOperand::new(ScalarType::Float, BufferId::new(2), 8, 8);

	// c = a * b
	let mut gemm = Statement::new();
	gemm.push(Node::new(Operand::Matrix(c), OpKind::Assign, Operand::Composite(NodeIndex::new(1))));
	gemm.push(Node::new(Operand::Matrix(a.clone()), OpKind::MatMatProd, Operand::Matrix(b)));

	// r = max over rows of a
	let mut row_max = Statement::new();
	row_max.push(Node::new(
		vector(ScalarType::Float, 3),
		OpKind::Assign,
		Operand::Composite(NodeIndex::new(1)),
	));
	row_max.push(Node::unary(OpKind::RowReduce(ReductionKind::Max), Operand::Matrix(a)));

	let mut program = MappedStatements::default();
	let gemm = program.map_statement(gemm)?;
	let row_max = program.map_statement(row_max)?;

	let product = program.object(gemm, NodeIndex::new(1), LeafKind::Parent);
	assert!(product.as_matrix_product().is_some());
	assert!(program.object(gemm, NodeIndex::new(1), LeafKind::Rhs).interpret_as_transposed());
	assert!(!program.object(gemm, NodeIndex::new(1), LeafKind::Lhs).interpret_as_transposed());

	let reduction = program.object(row_max, NodeIndex::new(1), LeafKind::Parent);
	let reduction = reduction.as_reduction().unwrap();
	assert_eq!(reduction.shape(), ReductionShape::Vector);
	assert_eq!(reduction.reduction_type(), ReductionKind::Max);
	assert_eq!(reduction.reduction_type().neutral_element(), "-INFINITY");

	// the matrix shared by both statements is one parameter
	let mut ctx = KernelContext::new(program.config().dialect);
	program.append_kernel_arguments(gemm, &mut ctx.arguments);
	program.append_kernel_arguments(row_max, &mut ctx.arguments);
	let pointers = ctx
		.arguments
		.params()
		.iter()
		.filter(|p| matches!(p.binding, crate::codegen::ArgBinding::Buffer(..)))
		.count();
	assert_eq!(pointers, 4);
	Ok(())
}

//--------------------------------------------------------------------------------------------------
