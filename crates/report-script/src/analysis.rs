use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::CompileError;
use crate::ast::{Expr, FStringPart, ImportStmt, Stmt};

/// Cached result of the safety and free-variable walks over a program.
#[derive(Clone, Debug, Default)]
pub struct Analysis {
	/// Identifiers read by the body that are bound by neither the body
	/// itself, the prelude, nor the ambient builtins.
	pub unbound: BTreeSet<Arc<str>>,
	/// The single free variable, when the body references exactly one and
	/// contains no function call.
	pub sole_dependency: Option<Arc<str>>,
	/// Last walrus target seen in the body, if any.
	pub walrus_target: Option<Arc<str>>,
	/// Names bound by the prelude's import statements.
	pub imports: BTreeSet<Arc<str>>,
}

/// Accepts only import statements (and their aliases) in a prelude.
pub fn validate_prelude(stmts: &[Stmt]) -> Result<Vec<ImportStmt>, CompileError> {
	let mut imports = Vec::with_capacity(stmts.len());
	for stmt in stmts {
		match stmt {
			Stmt::Import(imp) => imports.push(imp.clone()),
			other => {
				return Err(CompileError::InvalidImport(format!(
					"prelude may contain only import statements, found {}",
					stmt_kind(other)
				)));
			},
		}
	}
	Ok(imports)
}

fn stmt_kind(stmt: &Stmt) -> &'static str {
	match stmt {
		Stmt::Expr(_) => "an expression",
		Stmt::Import(_) => "an import",
		Stmt::Assign => "an assignment",
		Stmt::FunctionDef(_) => "a function definition",
		Stmt::ClassDef(_) => "a class definition",
	}
}

/// Rejects statements the safety policy forbids in an expression body.
pub fn reject_disallowed(stmts: &[Stmt]) -> Result<(), CompileError> {
	for stmt in stmts {
		match stmt {
			Stmt::Assign => return Err(CompileError::DisallowedAssignment),
			Stmt::ClassDef(_) => return Err(CompileError::DisallowedClassDef),
			Stmt::FunctionDef(_) => return Err(CompileError::DisallowedFunctionDef),
			Stmt::Expr(_) | Stmt::Import(_) => {},
		}
	}
	Ok(())
}

/// Walks the entry expression collecting free variables, the walrus target,
/// and whether any function call appears.
#[derive(Default)]
pub struct FreeVariableFinder {
	assigned: HashSet<Arc<str>>,
	unbound: BTreeSet<Arc<str>>,
	walrus_target: Option<Arc<str>>,
	calls: usize,
}

impl FreeVariableFinder {
	pub fn run(entry: &Expr) -> Self {
		let mut finder = FreeVariableFinder::default();
		finder.visit(entry);
		finder
	}

	/// Free variables before prelude/builtin subtraction.
	pub fn raw_unbound(&self) -> &BTreeSet<Arc<str>> {
		&self.unbound
	}

	pub fn walrus_target(&self) -> Option<Arc<str>> {
		self.walrus_target.clone()
	}

	pub fn has_calls(&self) -> bool {
		self.calls > 0
	}

	fn visit(&mut self, expr: &Expr) {
		match expr {
			Expr::Literal(_) => {},
			Expr::FString(parts) => {
				for part in parts {
					if let FStringPart::Field { value, .. } = part {
						self.visit(value);
					}
				}
			},
			Expr::Ident(name) => {
				if !self.assigned.contains(name) {
					self.unbound.insert(name.clone());
				}
			},
			Expr::Unary { operand, .. } => self.visit(operand),
			Expr::Binary { left, right, .. } => {
				self.visit(left);
				self.visit(right);
			},
			Expr::Bool { values, .. } => {
				for v in values {
					self.visit(v);
				}
			},
			Expr::Compare { left, ops } => {
				self.visit(left);
				for (_, right) in ops {
					self.visit(right);
				}
			},
			Expr::Conditional { test, body, orelse } => {
				self.visit(test);
				self.visit(body);
				self.visit(orelse);
			},
			Expr::Lambda { params, body } => {
				for p in params {
					self.assigned.insert(p.clone());
				}
				self.visit(body);
			},
			Expr::Named { target, value } => {
				// The target is reported, not treated as a binding: a later
				// read of the same name still counts as unbound.
				self.walrus_target = Some(target.clone());
				self.visit(value);
			},
			Expr::List(items) | Expr::Tuple(items) | Expr::Set(items) => {
				for item in items {
					self.visit(item);
				}
			},
			Expr::Dict(entries) => {
				for (k, v) in entries {
					self.visit(k);
					self.visit(v);
				}
			},
			Expr::Comp(comp) => {
				// Targets first so they shadow reads in the iterables and
				// filters, matching the flat-set behavior of the walk.
				for clause in &comp.clauses {
					for target in &clause.targets {
						self.assigned.insert(target.clone());
					}
				}
				for clause in &comp.clauses {
					self.visit(&clause.iter);
					for cond in &clause.ifs {
						self.visit(cond);
					}
				}
				if let Some(key) = &comp.key {
					self.visit(key);
				}
				self.visit(&comp.value);
			},
			Expr::Attribute { value, .. } => self.visit(value),
			Expr::Index { value, index } => {
				self.visit(value);
				self.visit(index);
			},
			Expr::Call { func, args } => {
				self.calls += 1;
				self.visit(func);
				for arg in args {
					self.visit(arg);
				}
			},
		}
	}
}

/// Runs the full analysis for a program body against a resolved prelude.
pub fn analyze(
	stmts: &[Stmt],
	entry: &Expr,
	prelude: &[ImportStmt],
	builtins: &[&str],
) -> Result<Analysis, CompileError> {
	reject_disallowed(stmts)?;
	let imports: BTreeSet<Arc<str>> = prelude.iter().flat_map(|imp| imp.bound_names()).collect();
	let finder = FreeVariableFinder::run(entry);
	let unbound: BTreeSet<Arc<str>> = finder
		.raw_unbound()
		.iter()
		.filter(|name| !imports.contains(*name) && !builtins.contains(&name.as_ref()))
		.cloned()
		.collect();
	let sole_dependency = if !finder.has_calls() && unbound.len() == 1 {
		unbound.iter().next().cloned()
	} else {
		None
	};
	Ok(Analysis {
		unbound,
		sole_dependency,
		walrus_target: finder.walrus_target(),
		imports,
	})
}
