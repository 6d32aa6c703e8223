//! A sandboxed scripting sub-language for report templates.
//!
//! Programs are a whitelisted import prelude plus a single expression body.
//! Assignments, class definitions, and function definitions (other than
//! lambdas) are rejected at compile time; evaluation can only read the
//! environment it is given.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use thiserror::Error;

mod macros;

pub mod analysis;
pub mod ast;
pub mod context;
pub mod functions;
mod interp;
pub mod lexer;
pub mod modules;
pub mod objects;
pub mod parser;
mod strfmt;
pub mod types;

pub use analysis::Analysis;
pub use context::{Context, Env};
pub use functions::FunctionContext;
pub use lexer::ParseError;
pub use objects::{Key, MapValue, Value, ValueType};
pub use types::TypeSpec;

use crate::ast::{Expr, ImportStmt, Stmt};
use crate::interp::{Interpreter, Scopes};

/// The ambient builtins every expression may reference without imports.
/// Together with the keyword literals `True`, `False`, and `None`, this is
/// the exact identifier set excluded from free-variable analysis.
pub const BUILTINS: &[&str] = &[
	"len", "min", "max", "sum", "abs", "range", "map", "filter", "list", "dict", "set", "tuple",
	"int", "float", "str", "bool",
];

#[derive(Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ExecutionError {
	/// The script referenced a name bound by neither the environment, the
	/// prelude, nor the builtins.
	#[error("undeclared reference to '{0}'")]
	UndeclaredReference(Arc<str>),
	#[error("unsupported unary operator '{0}' for {1}")]
	UnsupportedUnaryOperator(&'static str, ValueType),
	#[error("unsupported binary operator '{0}' for {1} and {2}")]
	UnsupportedBinaryOperator(&'static str, ValueType, ValueType),
	/// The script used a value as a mapping key whose type is not hashable
	/// here (for example a float or a list).
	#[error("unhashable key type: {0}")]
	UnsupportedKeyType(ValueType),
	#[error("no such key: {0}")]
	NoSuchKey(String),
	#[error("{0} has no attribute '{1}'")]
	NoSuchAttribute(ValueType, String),
	#[error("index {0} out of range")]
	IndexOutOfBounds(i64),
	#[error("cannot index {0} with {1}")]
	UnsupportedIndex(ValueType, ValueType),
	#[error("{0} is not callable")]
	NotCallable(ValueType),
	#[error("invalid argument count: expected {expected}, got {actual}")]
	InvalidArgumentCount { expected: usize, actual: usize },
	#[error("error in function '{function}': {message}")]
	FunctionError { function: String, message: String },
	#[error("division by zero")]
	DivisionByZero,
	#[error("modulo by zero")]
	RemainderByZero,
	#[error("overflow in operator '{0}'")]
	Overflow(&'static str),
	#[error("cannot convert {1} to {0}")]
	Conversion(&'static str, ValueType),
	#[error("{0} and {1} are not comparable")]
	ValuesNotComparable(ValueType, ValueType),
	#[error("{0} is not iterable")]
	NotIterable(ValueType),
	#[error("cannot unpack: expected {expected} values, got {got}")]
	UnpackMismatch { expected: usize, got: usize },
	#[error("invalid format spec `{0}`")]
	InvalidFormatSpec(String),
}

impl ExecutionError {
	pub fn function_error<M: ToString>(function: &str, message: M) -> Self {
		ExecutionError::FunctionError {
			function: function.to_string(),
			message: message.to_string(),
		}
	}
}

/// Errors raised while turning source text into a [`Program`]: parse
/// failures and violations of the safety policy.
#[derive(Error, Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum CompileError {
	#[error("parse: {0}")]
	Parse(#[from] ParseError),
	#[error("empty expression body")]
	EmptyExpression,
	#[error("last statement is not an expression")]
	NotAnExpression,
	#[error("invalid import: {0}")]
	InvalidImport(String),
	#[error("unknown module '{0}'")]
	UnknownModule(String),
	#[error("assignment is not allowed")]
	DisallowedAssignment,
	#[error("class definition is not allowed")]
	DisallowedClassDef,
	#[error("function definition is not allowed")]
	DisallowedFunctionDef,
}

/// A compiled program: prelude imports plus one entry expression, with the
/// safety/free-variable analysis cached. Immutable once constructed and
/// cheap to evaluate repeatedly.
pub struct Program {
	source: String,
	prelude: Vec<ImportStmt>,
	entry: Expr,
	analysis: Analysis,
	imports_env: HashMap<Arc<str>, Value>,
}

impl Debug for Program {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Program")
			.field("source", &self.source)
			.finish()
	}
}

impl Program {
	/// Compiles `source` with an optional prelude of import lines.
	///
	/// The body must end in an expression; earlier statements are dropped
	/// with a warning. The prelude may only import from the whitelisted
	/// modules, and its effects are resolved here, once.
	pub fn compile(source: &str, prelude: &[String]) -> Result<Program, CompileError> {
		let prelude_src = prelude.join("\n");
		let prelude_stmts = parser::parse_statements(&prelude_src)?;
		let imports = analysis::validate_prelude(&prelude_stmts)?;

		let body = parser::parse_statements(source)?;
		analysis::reject_disallowed(&body)?;
		let entry = match body.last() {
			None => return Err(CompileError::EmptyExpression),
			Some(Stmt::Expr(expr)) => expr.clone(),
			Some(_) => return Err(CompileError::NotAnExpression),
		};
		if body.len() > 1 {
			tracing::warn!(
				statements = body.len(),
				"multiple statements in expression body; only the last is evaluated"
			);
		}

		let analysis = analysis::analyze(&body, &entry, &imports, BUILTINS)?;
		let imports_env = modules::resolve_imports(&imports)?;
		Ok(Program {
			source: source.to_string(),
			prelude: imports,
			entry,
			analysis,
			imports_env,
		})
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn prelude(&self) -> &[ImportStmt] {
		&self.prelude
	}

	pub fn analysis(&self) -> &Analysis {
		&self.analysis
	}

	/// Evaluates the entry expression. The environment is read, never
	/// written: walrus bindings live in evaluation-local frames.
	pub fn execute(&self, ctx: &Context, env: &Env) -> Result<Value, ExecutionError> {
		let interp = Interpreter::new(ctx, &self.imports_env);
		let mut scopes = Scopes::new(env.clone());
		interp.eval(&self.entry, &mut scopes)
	}
}

#[cfg(test)]
#[path = "test.rs"]
mod test;
