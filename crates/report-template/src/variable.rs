use std::collections::BTreeSet;
use std::sync::Arc;

use report_script::{Context, Env, TypeSpec, Value};

use crate::error::Error;
use crate::expr::LazyExpr;
use crate::path::path_query;

/// A named value of the template, either computed from an expression or
/// extracted from a materialized data source. Uniform capability set:
/// name, free variables, `load`, and `eval_formatter`.
pub enum Variable {
	Literal(LiteralVariable),
	Path(PathVariable),
}

impl Variable {
	pub fn name(&self) -> &Arc<str> {
		match self {
			Variable::Literal(v) => &v.name,
			Variable::Path(v) => &v.name,
		}
	}

	/// Identifiers this variable needs evaluated before it: the dependency
	/// edges of the template graph.
	pub fn unbound(&self) -> BTreeSet<Arc<str>> {
		match self {
			Variable::Literal(v) => v.expr.unbound().clone(),
			Variable::Path(v) => {
				// The path lookup itself reads the already-materialized
				// source and contributes no dependencies.
				let mut out = BTreeSet::new();
				for expr in [&v.preprocessor, &v.validator, &v.formatter]
					.into_iter()
					.flatten()
				{
					out.extend(expr.unbound().iter().cloned());
				}
				out
			},
		}
	}

	pub fn load(&self, env: &Env) -> Result<Value, Error> {
		match self {
			Variable::Literal(v) => v.load(env),
			Variable::Path(v) => v.load(env),
		}
	}

	pub fn eval_formatter(&self, env: &Env) -> Result<Option<Formatter>, Error> {
		let (name, formatter) = match self {
			Variable::Literal(v) => (&v.name, &v.formatter),
			Variable::Path(v) => (&v.name, &v.formatter),
		};
		let Some(expr) = formatter else {
			return Ok(None);
		};
		let func = expr
			.eval(env)
			.map_err(|e| Error::runtime(name.as_ref(), e))?;
		if !func.is_callable() {
			return Err(Error::InvalidFormatter(name.to_string()));
		}
		Ok(Some(Formatter {
			name: name.clone(),
			func,
		}))
	}
}

/// A variable computed by evaluating one expression.
pub struct LiteralVariable {
	pub name: Arc<str>,
	pub expr: LazyExpr,
	pub comment: Option<String>,
	pub formatter: Option<LazyExpr>,
	pub expected: Option<TypeSpec>,
}

impl LiteralVariable {
	fn load(&self, env: &Env) -> Result<Value, Error> {
		let value = self
			.expr
			.eval(env)
			.map_err(|e| Error::runtime(self.name.as_ref(), e))?;
		if let Some(expected) = &self.expected {
			verify_type(&self.name, expected, &value)?;
		}
		Ok(value)
	}
}

/// A variable extracted from a materialized source mapping via JSONPath,
/// with optional preprocessing and validation.
pub struct PathVariable {
	pub name: Arc<str>,
	/// The source data, already loaded by the orchestrator.
	pub source: Arc<serde_json::Value>,
	pub json_path: String,
	pub comment: Option<String>,
	pub preprocessor: Option<LazyExpr>,
	pub validator: Option<LazyExpr>,
	pub formatter: Option<LazyExpr>,
	/// Expected type of the value after preprocessing.
	pub expected: Option<TypeSpec>,
}

impl PathVariable {
	fn load(&self, env: &Env) -> Result<Value, Error> {
		let mut value = path_query(&self.source, &self.json_path)?;

		if let Some(pre) = &self.preprocessor {
			value = pre
				.call(vec![value], env)
				.map_err(|e| Error::PreprocessFailed {
					name: self.name.to_string(),
					source: e,
				})?;
		}

		if let Some(validator) = &self.validator {
			let verdict = validator
				.call(vec![value.clone()], env)
				.map_err(|e| Error::runtime(self.name.as_ref(), e))?;
			if !verdict.is_truthy() {
				return Err(Error::VerifyFailed {
					name: self.name.to_string(),
					reason: "validator returned false".to_string(),
				});
			}
		}

		if let Some(expected) = &self.expected {
			verify_type(&self.name, expected, &value)?;
		}
		Ok(value)
	}
}

fn verify_type(name: &str, expected: &TypeSpec, value: &Value) -> Result<(), Error> {
	if expected.check(value) {
		return Ok(());
	}
	Err(Error::VerifyFailed {
		name: name.to_string(),
		reason: format!(
			"expected {expected}, got {} ({})",
			value.type_of(),
			value.py_str()
		),
	})
}

/// A formatter obtained by evaluating a variable's formatter expression:
/// a callable taking the value and producing its display string.
#[derive(Clone, Debug)]
pub struct Formatter {
	name: Arc<str>,
	func: Value,
}

impl Formatter {
	pub fn format(&self, value: &Value) -> Result<String, Error> {
		let out = Context::root()
			.call(&self.func, vec![value.clone()])
			.map_err(|e| Error::runtime(self.name.as_ref(), e))?;
		Ok(out.py_str())
	}
}

/// The resolver's output for one variable: its evaluated value and, when
/// declared, the formatter to render it with.
#[derive(Debug)]
pub struct EvaluatedVariable {
	pub name: Arc<str>,
	pub value: Value,
	pub formatter: Option<Formatter>,
}

/// Builds the environment later expressions evaluate against.
pub fn to_env(evaluated: &[EvaluatedVariable]) -> Env {
	evaluated
		.iter()
		.map(|v| (v.name.clone(), v.value.clone()))
		.collect()
}
