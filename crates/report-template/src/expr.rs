use std::collections::BTreeSet;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use report_script::{Context, Env, ExecutionError, Program, TypeSpec, Value};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

/// An immutable expression bundled with its import prelude and cached
/// analysis. Compiled once per template construction, evaluated any number
/// of times against the environments the resolver produces.
pub struct LazyExpr {
	raw: String,
	imports: Vec<String>,
	program: Program,
}

impl LazyExpr {
	pub fn new(raw: impl Into<String>, imports: Vec<String>) -> Result<LazyExpr, Error> {
		let raw = raw.into();
		let program = Program::compile(&raw, &imports)?;
		Ok(LazyExpr {
			raw,
			imports,
			program,
		})
	}

	pub fn raw(&self) -> &str {
		&self.raw
	}

	pub fn imports(&self) -> &[String] {
		&self.imports
	}

	/// Free variables of the body: what this expression needs from the
	/// environment before it can be evaluated.
	pub fn unbound(&self) -> &BTreeSet<Arc<str>> {
		&self.program.analysis().unbound
	}

	/// The unique free variable when the body has exactly one and no
	/// function calls; drives formatter selection during rendering.
	pub fn sole_dependency(&self) -> Option<&str> {
		self.program.analysis().sole_dependency.as_deref()
	}

	pub fn walrus_target(&self) -> Option<&str> {
		self.program.analysis().walrus_target.as_deref()
	}

	pub fn eval(&self, env: &Env) -> Result<Value, ExecutionError> {
		self.program.execute(Context::root(), env)
	}

	/// Evaluates to a callable and applies it, the way preprocessors,
	/// validators, and formatters are invoked.
	pub fn call(&self, args: Vec<Value>, env: &Env) -> Result<Value, ExecutionError> {
		let func = self.eval(env)?;
		if !func.is_callable() {
			return Err(ExecutionError::NotCallable(func.type_of()));
		}
		Context::root().call(&func, args)
	}
}

impl Debug for LazyExpr {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LazyExpr").field("raw", &self.raw).finish()
	}
}

impl Serialize for LazyExpr {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.raw)
	}
}

/// The wire shape of an expression field: either a bare source string or
/// `{"raw": …, "imports": […]}` carrying extra per-expression imports.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum LazyExprSpec {
	Raw(String),
	Detailed {
		raw: String,
		#[serde(default)]
		imports: Vec<String>,
	},
}

impl LazyExprSpec {
	/// Compiles with the template-wide ambient imports prepended to any
	/// per-expression imports.
	pub fn compile(&self, ambient: &[String]) -> Result<LazyExpr, Error> {
		match self {
			LazyExprSpec::Raw(raw) => LazyExpr::new(raw.clone(), ambient.to_vec()),
			LazyExprSpec::Detailed { raw, imports } => {
				let merged: Vec<String> = ambient.iter().chain(imports.iter()).cloned().collect();
				LazyExpr::new(raw.clone(), merged)
			},
		}
	}

	pub fn raw(&self) -> &str {
		match self {
			LazyExprSpec::Raw(raw) => raw,
			LazyExprSpec::Detailed { raw, .. } => raw,
		}
	}
}

/// Evaluates a declared expected-type expression (`"int"`, `"list[int]"`,
/// `"int | float"`) down to a type tag.
pub fn parse_type_spec(name: &str, source: &str, imports: &[String]) -> Result<TypeSpec, Error> {
	let expr = LazyExpr::new(source, imports.to_vec())?;
	let value = expr
		.eval(&Env::new())
		.map_err(|e| Error::runtime(name, e))?;
	match value {
		Value::Type(spec) => Ok(spec),
		other => Err(Error::InvalidTypeExpression {
			name: name.to_string(),
			got: other.py_str(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn spec_from_plain_string() {
		let spec: LazyExprSpec = serde_json::from_value(serde_json::json!("1 + 2")).unwrap();
		let expr = spec.compile(&[]).unwrap();
		assert_eq!(expr.eval(&Env::new()).unwrap(), Value::Int(3));
	}

	#[test]
	fn spec_with_extra_imports() {
		let spec: LazyExprSpec = serde_json::from_value(serde_json::json!({
			"raw": "sqrt(16)",
			"imports": ["from math import sqrt"],
		}))
		.unwrap();
		let expr = spec.compile(&[]).unwrap();
		assert_eq!(expr.eval(&Env::new()).unwrap(), Value::Float(4.0));
	}

	#[test]
	fn ambient_imports_are_prepended() {
		let spec: LazyExprSpec = serde_json::from_value(serde_json::json!("math.pi")).unwrap();
		let expr = spec.compile(&["import math".to_string()]).unwrap();
		assert_matches!(expr.eval(&Env::new()).unwrap(), Value::Float(_));
	}

	#[test]
	fn call_rejects_non_callables() {
		let expr = LazyExpr::new("42", Vec::new()).unwrap();
		assert_matches!(
			expr.call(vec![Value::Int(1)], &Env::new()),
			Err(ExecutionError::NotCallable(_))
		);
	}

	#[test]
	fn type_spec_parsing() {
		assert_eq!(parse_type_spec("v", "int", &[]).unwrap(), TypeSpec::Int);
		let t = parse_type_spec("v", "list[int | float]", &[]).unwrap();
		assert_eq!(t.to_string(), "list[int | float]");
		assert_matches!(
			parse_type_spec("v", "1 + 1", &[]),
			Err(Error::InvalidTypeExpression { .. })
		);
	}

	#[test]
	fn serializes_back_to_raw_source() {
		let expr = LazyExpr::new("a + b", Vec::new()).unwrap();
		assert_eq!(
			serde_json::to_value(&expr).unwrap(),
			serde_json::json!("a + b")
		);
	}
}
