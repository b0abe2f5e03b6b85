//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::collections::{BTreeMap, HashMap};

use bit_set::BitSet;
use smallvec::SmallVec;

use crate::ErrPack;
use crate::codegen::arguments::KernelArguments;
use crate::codegen::config::{GeneratorConfig, check_simd_width};
use crate::codegen::context::KernelContext;
use crate::codegen::stream::KernelBody;
use crate::error::MappingError;
use crate::mapped::{
	MappedImplicitMatrix, MappedImplicitVector, MappedObject, MatrixLayout, NodeInfo, VectorLayout,
};
use crate::statement::{
	BufferId, NodeIndex, OpKind, Operand, ReductionKind, Statement, StatementIndex,
};
use crate::util::index_vec::IndexVec;

//--------------------------------------------------------------------------------------------------

/// Row (`i`) and column (`j`) index expressions of one evaluation site.
///
/// Offsets splice the expressions into the generated source without adding parentheses,
/// so each one must be atomic: a name, a literal, or an expression in parentheses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexTuple {
	pub i: String,
	pub j: String,
}

impl IndexTuple {
	pub fn new(i: impl Into<String>, j: impl Into<String>) -> Self {
		Self { i: i.into(), j: j.into() }
	}

	pub fn transposed(&self) -> Self {
		Self { i: self.j.clone(), j: self.i.clone() }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeafKind {
	Lhs,
	Parent,
	Rhs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MappingKey {
	pub node: NodeIndex,
	pub leaf: LeafKind,
}

impl MappingKey {
	pub fn new(node: NodeIndex, leaf: LeafKind) -> Self {
		Self { node, leaf }
	}
}

/// Mapped objects of one statement. Ordered, so argument lists come out the same way
/// on every run.
pub type MappingTable = BTreeMap<MappingKey, MappedObject>;

//--------------------------------------------------------------------------------------------------

/// Arena of one kernel-generation request: the statements, their mapping tables and the
/// names handed out so far.
///
/// Mapped objects refer to statements only through indexes into this arena. It must not
/// be shared between concurrent requests.
pub struct MappedStatements {
	config: GeneratorConfig,
	statements: IndexVec<StatementIndex, Statement>,
	mappings: IndexVec<StatementIndex, MappingTable>,

	/// Per statement: nodes whose operands are read with `i` and `j` swapped.
	swapped: IndexVec<StatementIndex, BitSet>,
	buffer_names: HashMap<BufferId, String>,
	name_count: usize,
}

impl Default for MappedStatements {
	fn default() -> Self {
		Self::new(GeneratorConfig::default())
	}
}

impl MappedStatements {
	pub fn new(config: GeneratorConfig) -> Self {
		Self {
			config,
			statements: IndexVec::new(),
			mappings: IndexVec::new(),
			swapped: IndexVec::new(),
			buffer_names: HashMap::new(),
			name_count: 0,
		}
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	pub fn len(&self) -> usize {
		self.statements.len()
	}

	pub fn is_empty(&self) -> bool {
		self.statements.is_empty()
	}

	pub fn statement(&self, statement: StatementIndex) -> &Statement {
		&self.statements[statement]
	}

	pub fn mapping(&self, statement: StatementIndex) -> &MappingTable {
		&self.mappings[statement]
	}

	pub fn get(&self, statement: StatementIndex, node: NodeIndex, leaf: LeafKind) -> Option<&MappedObject> {
		self.mappings.get(statement)?.get(&MappingKey::new(node, leaf))
	}

	/// Like `get()`, for lookups the mapping pass guarantees to succeed.
	#[allow(clippy::panic)]
	pub fn object(&self, statement: StatementIndex, node: NodeIndex, leaf: LeafKind) -> &MappedObject {
		match self.get(statement, node, leaf) {
			Some(object) => object,
			None => panic!(
				"MappedStatements::object(): no mapped object for statement {statement}, node {node}, {leaf:?}"
			),
		}
	}

	/// Name of the buffer's pointer parameter. Every reference to one buffer shares it.
	pub fn buffer_name(&self, buffer: BufferId) -> Option<&str> {
		self.buffer_names.get(&buffer).map(String::as_str)
	}

	//----------------------------------------------------------------------------------------------

	/// Validates `statement`, creates one mapped object per leaf and per summarizing op
	/// reachable from the root, and stores both in the arena.
	///
	/// Nodes the root does not reach (directly or through a vector address) are ignored.
	pub fn map_statement(&mut self, statement: Statement) -> Result<StatementIndex, ErrPack<MappingError>> {
		check_simd_width(self.config.dialect, self.config.simd_width)?;
		let reachable = validate(&statement)?;

		let statement_index = self.statements.next_index();
		let mut table = MappingTable::new();
		for (node_index, node) in statement.nodes.iter_enumerated() {
			if !reachable.nodes.contains(node_index.raw) {
				continue;
			}
			if let Some(object) = self.map_operand(statement_index, &node.lhs) {
				table.insert(MappingKey::new(node_index, LeafKind::Lhs), object);
			}
			if let Some(object) = self.map_operand(statement_index, &node.rhs) {
				table.insert(MappingKey::new(node_index, LeafKind::Rhs), object);
			}
			if node.op.is_summarizing() {
				let info = NodeInfo::new(statement_index, node_index);
				// `validate()` checked that the op has a typed leaf below it
				let scalartype = statement.scalartype_of(node_index).map_or("float", |t| t.name());
				let object = match node.op {
					OpKind::InnerProd => {
						MappedObject::scalar_reduction(scalartype, info, ReductionKind::Sum)
					},
					OpKind::Reduce(kind) => MappedObject::scalar_reduction(scalartype, info, kind),
					OpKind::MatVecProd => {
						MappedObject::vector_reduction(scalartype, info, ReductionKind::Sum)
					},
					OpKind::RowReduce(kind) => MappedObject::vector_reduction(scalartype, info, kind),
					_ => MappedObject::matrix_product(scalartype, info),
				};
				table.insert(MappingKey::new(node_index, LeafKind::Parent), object);
			}
		}

		log::debug!(
			"MappedStatements::map_statement(): statement {statement_index}: {} nodes, {} mapped objects",
			statement.nodes.len(),
			table.len()
		);

		let index = self.statements.push(statement);
		let mapping_index = self.mappings.push(table);
		let swapped_index = self.swapped.push(reachable.swapped);
		debug_assert!(index == mapping_index && index == swapped_index && index == statement_index);
		Ok(index)
	}

	fn fresh_name(&mut self) -> String {
		let name = format!("{}{}", self.config.name_prefix, self.name_count);
		self.name_count += 1;
		name
	}

	fn buffer_name_or_insert(&mut self, buffer: BufferId) -> String {
		if let Some(name) = self.buffer_names.get(&buffer) {
			return name.clone();
		}
		let name = self.fresh_name();
		self.buffer_names.insert(buffer, name.clone());
		name
	}

	fn map_operand(&mut self, statement: StatementIndex, operand: &Operand) -> Option<MappedObject> {
		let simd_width = self.config.simd_width;
		let object = match operand {
			Operand::Invalid | Operand::Composite(..) => return None,
			Operand::HostScalar { dtype, value } => {
				MappedObject::host_scalar(dtype.name(), self.fresh_name(), *value)
			},
			Operand::Scalar { dtype, buffer } => {
				MappedObject::scalar(dtype.name(), self.buffer_name_or_insert(*buffer), *buffer)
			},
			Operand::Vector(v) => {
				let name = self.buffer_name_or_insert(v.buffer);
				let mut layout = VectorLayout::new(&name, v.start, v.stride);
				if let Some(address) = v.address {
					layout = layout.with_info(NodeInfo::new(statement, address));
				}
				MappedObject::vector(v.dtype.name(), name, simd_width, v.buffer, layout)
			},
			Operand::Matrix(m) => {
				let name = self.buffer_name_or_insert(m.buffer);
				let layout = MatrixLayout::new(&name, m.ld, m.row_major)
					.with_ranges((m.start1, m.stride1), (m.start2, m.stride2));
				MappedObject::matrix(m.dtype.name(), name, simd_width, m.buffer, layout)
			},
			Operand::ImplicitVector(v) => {
				let name = self.fresh_name();
				let mut implicit = if v.is_value_static {
					MappedImplicitVector::constant(format_literal(v.value))
				} else {
					MappedImplicitVector::new(name.as_str(), "")
				};
				if let Some(index) = v.index {
					implicit = implicit.with_index_name(format!("{name}_index"));
					implicit = implicit.with_bindings(v.value, index);
				} else {
					implicit = implicit.with_bindings(v.value, 0);
				}
				MappedObject::implicit_vector(v.dtype.name(), implicit)
			},
			Operand::ImplicitMatrix(m) => {
				let implicit = if m.is_value_static {
					MappedImplicitMatrix::constant(format_literal(m.value), m.is_diag)
				} else {
					MappedImplicitMatrix::new(self.fresh_name(), m.is_diag).with_binding(m.value)
				};
				MappedObject::implicit_matrix(m.dtype.name(), implicit)
			},
		};
		Some(object)
	}

	//----------------------------------------------------------------------------------------------

	/// Appends the parameters of every mapped object of `statement`, in mapping order.
	pub fn append_kernel_arguments<'a>(
		&self,
		statement: StatementIndex,
		args: &'a mut KernelArguments,
	) -> &'a mut KernelArguments {
		for object in self.mapping(statement).values() {
			object.append_kernel_arguments(args);
		}
		args
	}

	/// Index a leaf operand of `node` is evaluated with when the statement is evaluated at
	/// `index`: swapped once per `Trans` above the leaf, and once more for a transposed
	/// matrix. `generate_rhs()` arrives at the same index.
	pub fn leaf_index(
		&self,
		statement: StatementIndex,
		node: NodeIndex,
		object: &MappedObject,
		index: &IndexTuple,
	) -> IndexTuple {
		let under_trans = self.swapped.get(statement).is_some_and(|set| set.contains(node.raw));
		if under_trans != object.interpret_as_transposed() {
			index.transposed()
		} else {
			index.clone()
		}
	}

	/// Starts a new kernel body: forgets the fetches of the previous one, in `ctx` and in
	/// the access names of all mapped objects.
	pub fn begin_body(&self, ctx: &mut KernelContext) {
		ctx.begin_body();
		for (_, table) in self.mappings.iter_enumerated() {
			for object in table.values() {
				object.clear_access_name();
			}
		}
	}

	/// Fetches every pointer-backed operand of `statement` into a local variable.
	pub fn fetch_all(
		&self,
		statement: StatementIndex,
		suffix: &str,
		index: &IndexTuple,
		ctx: &mut KernelContext,
		body: &mut KernelBody,
	) {
		for (key, object) in self.mapping(statement) {
			if let Some(handle) = object.handle() {
				let leaf_index = self.leaf_index(statement, key.node, object, index);
				handle.fetch(suffix, &leaf_index, ctx, body, self);
			}
		}
	}

	/// Writes back the target of an assignment statement, if it is pointer-backed.
	pub fn write_back_assigned(
		&self,
		statement: StatementIndex,
		suffix: &str,
		index: &IndexTuple,
		ctx: &mut KernelContext,
		body: &mut KernelBody,
	) {
		let root = self.statement(statement).root();
		if !self.statement(statement).node(root).is_some_and(|node| node.op.is_assignment()) {
			return;
		}
		let Some(handle) = self.get(statement, root, LeafKind::Lhs).and_then(MappedObject::handle)
		else {
			return;
		};
		let leaf_index = self.leaf_index(statement, root, handle.object(), index);
		handle.write_back(suffix, &leaf_index, ctx, body, self);
	}
}

//--------------------------------------------------------------------------------------------------

/// Source literal of a static value. Non-finite values use the device math constants.
fn format_literal(value: f64) -> String {
	if value.is_nan() {
		"NAN".to_string()
	} else if value.is_infinite() {
		if value > 0.0 { "INFINITY" } else { "-INFINITY" }.to_string()
	} else {
		format!("{value:?}")
	}
}

fn node_error(code: MappingError, node: NodeIndex, what: &str) -> ErrPack<MappingError> {
	ErrPack::with_message(code, format!("node {node}: {what}"))
}

/// Nodes reachable from the root, and among them the ones whose operands are read with
/// `i` and `j` swapped (odd number of `Trans` on the path, the node itself included).
struct Reachable {
	nodes: BitSet,
	swapped: BitSet,
}

/// Checks everything the mapped objects later take for granted: references in range,
/// operands present where the op needs them, and every node reachable at most once.
fn validate(statement: &Statement) -> Result<Reachable, ErrPack<MappingError>> {
	let root = statement.root();
	if !statement.nodes.contains_index(root) {
		return Err(node_error(MappingError::InvalidNodeIndex, root, "root is out of range"));
	}

	for (index, node) in statement.nodes.iter_enumerated() {
		for operand in [&node.lhs, &node.rhs] {
			let target = match operand {
				Operand::Composite(child) => Some(*child),
				Operand::Vector(v) => v.address,
				_ => None,
			};
			if let Some(target) = target
				&& !statement.nodes.contains_index(target)
			{
				return Err(node_error(
					MappingError::InvalidNodeIndex,
					index,
					&format!("reference to node {target} is out of range"),
				));
			}
		}
		if node.lhs.is_invalid() {
			return Err(node_error(MappingError::MissingOperand, index, "missing lhs operand"));
		}
		if node.op.is_unary() {
			if !node.rhs.is_invalid() {
				return Err(node_error(
					MappingError::UnexpectedOperand,
					index,
					&format!("{:?} takes a single operand", node.op),
				));
			}
		} else if node.rhs.is_invalid() {
			return Err(node_error(MappingError::MissingOperand, index, "missing rhs operand"));
		}
	}

	let mut reachable = Reachable {
		nodes: BitSet::with_capacity(statement.nodes.len()),
		swapped: BitSet::with_capacity(statement.nodes.len()),
	};
	let mut stack: SmallVec<[(NodeIndex, bool); 16]> = SmallVec::new();
	stack.push((root, false));
	while let Some((index, outer_swapped)) = stack.pop() {
		if !reachable.nodes.insert(index.raw) {
			return Err(node_error(
				MappingError::UnexpectedOperand,
				index,
				"node is referenced more than once",
			));
		}
		let Some(node) = statement.node(index) else {
			continue;
		};
		let swapped = outer_swapped != matches!(node.op, OpKind::Trans);
		if swapped {
			reachable.swapped.insert(index.raw);
		}
		for operand in [&node.lhs, &node.rhs] {
			match operand {
				Operand::Composite(child) => stack.push((*child, swapped)),
				Operand::Vector(v) => {
					// the address is evaluated at the index the vector itself gets
					if let Some(address) = v.address {
						stack.push((address, swapped));
					}
				},
				_ => {},
			}
		}
		if node.op.is_summarizing() && statement.scalartype_of(index).is_none() {
			return Err(node_error(
				MappingError::MissingOperand,
				index,
				"summarizing op has no typed operand",
			));
		}
	}
	Ok(reachable)
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
