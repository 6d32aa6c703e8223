use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use itertools::Itertools;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use report_script::Env;

use crate::error::Error;
use crate::variable::{EvaluatedVariable, Variable};

/// Holds the template's variable table and the dependency graph between
/// variables, resolves an evaluation order, and evaluates.
///
/// Edges run from a variable to each name it reads, so a topological order
/// of the graph reversed gives sources-before-consumers.
#[derive(Default)]
pub struct DependencyResolver {
	table: Vec<Variable>,
	graph: DiGraph<Arc<str>, ()>,
	nodes: HashMap<Arc<str>, NodeIndex>,
}

impl DependencyResolver {
	pub fn new() -> DependencyResolver {
		DependencyResolver::default()
	}

	fn node(&mut self, name: &Arc<str>) -> NodeIndex {
		match self.nodes.get(name) {
			Some(idx) => *idx,
			None => {
				let idx = self.graph.add_node(name.clone());
				self.nodes.insert(name.clone(), idx);
				idx
			},
		}
	}

	pub fn add(&mut self, variable: Variable) -> Result<(), Error> {
		if self.is_declared(variable.name()) {
			return Err(Error::DuplicateName(variable.name().to_string()));
		}
		let from = self.node(variable.name());
		for dep in variable.unbound() {
			let to = self.node(&dep);
			self.graph.add_edge(from, to, ());
		}
		self.table.push(variable);
		Ok(())
	}

	/// Adds in sequence; the first failure aborts.
	pub fn add_many(&mut self, variables: impl IntoIterator<Item = Variable>) -> Result<(), Error> {
		for v in variables {
			self.add(v)?;
		}
		Ok(())
	}

	fn is_declared(&self, name: &Arc<str>) -> bool {
		self.table.iter().any(|v| v.name() == name)
	}

	/// Checks that every referenced name is declared, rejects cycles, and
	/// reorders the table so dependencies precede their dependents.
	pub fn resolve(&mut self) -> Result<(), Error> {
		let declared: HashSet<&Arc<str>> = self.table.iter().map(|v| v.name()).collect();
		let undeclared: Vec<String> = self
			.graph
			.node_indices()
			.filter(|idx| !declared.contains(&self.graph[*idx]))
			.map(|idx| self.graph[idx].to_string())
			.sorted()
			.collect();
		if !undeclared.is_empty() {
			return Err(Error::Unbound(undeclared));
		}

		let order = match toposort(&self.graph, None) {
			Ok(order) => order,
			Err(_) => {
				let cycle: Vec<String> = tarjan_scc(&self.graph)
					.into_iter()
					.filter(|scc| {
						scc.len() > 1 || scc.iter().any(|n| self.graph.contains_edge(*n, *n))
					})
					.flatten()
					.map(|idx| self.graph[idx].to_string())
					.sorted()
					.collect();
				return Err(Error::CyclicDependency(cycle));
			},
		};

		// Toposort puts a variable before the names it reads; evaluation
		// wants the reverse.
		let position: HashMap<&Arc<str>, usize> = order
			.iter()
			.rev()
			.enumerate()
			.map(|(i, idx)| (&self.graph[*idx], i))
			.collect();
		self
			.table
			.sort_by_key(|v| position.get(v.name()).copied().unwrap_or(usize::MAX));
		Ok(())
	}

	/// Resolves, then evaluates every variable in order. Each evaluated
	/// value is placed into the environment before the next variable runs;
	/// the formatter is evaluated against the environment that already
	/// contains the variable's own value.
	pub fn evaluate(mut self) -> Result<Vec<EvaluatedVariable>, Error> {
		self.resolve()?;
		let mut env = Env::new();
		let mut out = Vec::with_capacity(self.table.len());
		for variable in &self.table {
			let name = variable.name().clone();
			let value = variable
				.load(&env)
				.map_err(|e| Error::EvaluateFailed {
					name: name.to_string(),
					source: Box::new(e),
				})?;
			env = env.layered(
				[(name.clone(), value.clone())].into_iter().collect(),
			);
			let formatter = variable.eval_formatter(&env)?;
			out.push(EvaluatedVariable {
				name,
				value,
				formatter,
			});
		}
		Ok(out)
	}
}

/// One-shot helper: builds a resolver over `variables` and evaluates.
pub fn resolve_and_evaluate(
	variables: impl IntoIterator<Item = Variable>,
) -> Result<Vec<EvaluatedVariable>, Error> {
	let mut resolver = DependencyResolver::new();
	resolver.add_many(variables)?;
	resolver.evaluate()
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;
	use report_script::Value;

	use super::*;
	use crate::expr::LazyExpr;
	use crate::variable::LiteralVariable;

	fn literal(name: &str, expr: &str) -> Variable {
		Variable::Literal(LiteralVariable {
			name: Arc::from(name),
			expr: LazyExpr::new(expr, Vec::new()).unwrap(),
			comment: None,
			formatter: None,
			expected: None,
		})
	}

	#[test]
	fn linear_chain_evaluates_in_dependency_order() {
		// Declared out of order on purpose.
		let evaluated = resolve_and_evaluate(vec![
			literal("c", "a + b"),
			literal("b", "a * 10"),
			literal("a", "1 + 2"),
		])
		.unwrap();
		let pairs: Vec<(&str, &Value)> = evaluated
			.iter()
			.map(|v| (v.name.as_ref(), &v.value))
			.collect();
		assert_eq!(pairs, vec![
			("a", &Value::Int(3)),
			("b", &Value::Int(30)),
			("c", &Value::Int(33)),
		]);
	}

	#[test]
	fn declared_dependencies_precede_dependents() {
		let mut resolver = DependencyResolver::new();
		resolver
			.add_many(vec![
				literal("d", "b + c"),
				literal("b", "a + 1"),
				literal("c", "a + 2"),
				literal("a", "1"),
			])
			.unwrap();
		resolver.resolve().unwrap();
		let evaluated = resolver.evaluate().unwrap();
		let position: HashMap<&str, usize> = evaluated
			.iter()
			.enumerate()
			.map(|(i, v)| (v.name.as_ref(), i))
			.collect();
		assert!(position["a"] < position["b"]);
		assert!(position["a"] < position["c"]);
		assert!(position["b"] < position["d"]);
		assert!(position["c"] < position["d"]);
	}

	#[test]
	fn cycle_is_detected() {
		let err = resolve_and_evaluate(vec![literal("x", "y + 1"), literal("y", "x + 1")])
			.unwrap_err();
		assert_matches!(err, Error::CyclicDependency(names) => {
			assert_eq!(names, vec!["x".to_string(), "y".to_string()]);
		});
	}

	#[test]
	fn self_reference_is_a_cycle() {
		let err = resolve_and_evaluate(vec![literal("x", "x + 1")]).unwrap_err();
		assert_matches!(err, Error::CyclicDependency(names) => {
			assert_eq!(names, vec!["x".to_string()]);
		});
	}

	#[test]
	fn unbound_reference_across_template() {
		let err = resolve_and_evaluate(vec![literal("a", "missing + 1")]).unwrap_err();
		assert_matches!(err, Error::Unbound(names) => {
			assert_eq!(names, vec!["missing".to_string()]);
		});
	}

	#[test]
	fn duplicate_names_are_rejected() {
		let mut resolver = DependencyResolver::new();
		resolver.add(literal("a", "1")).unwrap();
		assert_matches!(
			resolver.add(literal("a", "2")),
			Err(Error::DuplicateName(name)) if name == "a"
		);
	}

	#[test]
	fn runtime_failure_aborts_with_variable_name() {
		let err = resolve_and_evaluate(vec![literal("boom", "1 / 0")]).unwrap_err();
		assert_matches!(err, Error::EvaluateFailed { name, .. } if name == "boom");
	}

	#[test]
	fn formatter_sees_the_evaluated_environment() {
		let with_formatter = Variable::Literal(LiteralVariable {
			name: Arc::from("pi"),
			expr: LazyExpr::new("3.14159", Vec::new()).unwrap(),
			comment: None,
			formatter: Some(
				// Reads its own just-registered value through the env.
				LazyExpr::new("lambda v: f'{v:.2f} (from {pi})'", Vec::new()).unwrap(),
			),
			expected: None,
		});
		let evaluated = resolve_and_evaluate(vec![with_formatter]).unwrap();
		let formatted = evaluated[0]
			.formatter
			.as_ref()
			.unwrap()
			.format(&Value::Float(3.14159))
			.unwrap();
		assert_eq!(formatted, "3.14 (from 3.14159)");
	}
}
