use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::ExecutionError;
use crate::functions;
use crate::interp::Interpreter;
use crate::macros::builtin;
use crate::objects::Value;
use crate::types::TypeSpec;

/// An immutable chain of variable scopes, cheap to clone and to layer.
///
/// Lambdas capture an `Env` snapshot at creation; the resolver threads an
/// `Env` of already-evaluated variables into each evaluation.
#[derive(Clone, Default)]
pub struct Env {
	node: Option<Arc<EnvNode>>,
}

struct EnvNode {
	vars: HashMap<Arc<str>, Value>,
	parent: Option<Arc<EnvNode>>,
}

impl Env {
	pub fn new() -> Env {
		Env::default()
	}

	pub fn from_map(vars: HashMap<Arc<str>, Value>) -> Env {
		Env {
			node: Some(Arc::new(EnvNode { vars, parent: None })),
		}
	}

	/// A child environment whose bindings shadow this one's.
	pub fn layered(&self, vars: HashMap<Arc<str>, Value>) -> Env {
		Env {
			node: Some(Arc::new(EnvNode {
				vars,
				parent: self.node.clone(),
			})),
		}
	}

	pub fn get(&self, name: &str) -> Option<Value> {
		let mut node = self.node.as_deref();
		while let Some(n) = node {
			if let Some(v) = n.vars.get(name) {
				return Some(v.clone());
			}
			node = n.parent.as_deref();
		}
		None
	}

	/// Writes the chain into `out`, outermost scope first, so later (inner)
	/// bindings overwrite earlier ones.
	pub fn flatten_into(&self, out: &mut HashMap<Arc<str>, Value>) {
		fn rec(node: Option<&EnvNode>, out: &mut HashMap<Arc<str>, Value>) {
			let Some(n) = node else { return };
			rec(n.parent.as_deref(), out);
			for (k, v) in &n.vars {
				out.insert(k.clone(), v.clone());
			}
		}
		rec(self.node.as_deref(), out);
	}
}

impl Debug for Env {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let mut flat = HashMap::new();
		self.flatten_into(&mut flat);
		let mut names: Vec<&str> = flat.keys().map(|k| k.as_ref()).collect();
		names.sort_unstable();
		write!(f, "Env({names:?})")
	}
}

impl FromIterator<(Arc<str>, Value)> for Env {
	fn from_iter<T: IntoIterator<Item = (Arc<str>, Value)>>(iter: T) -> Self {
		Env::from_map(iter.into_iter().collect())
	}
}

/// The ambient builtins available to every expression without imports.
///
/// This is the published list: identifiers outside it (and outside the
/// prelude imports) count as free variables.
pub struct Context {
	bindings: BTreeMap<&'static str, Value>,
}

impl Context {
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.bindings.get(name)
	}

	pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.bindings.keys().copied()
	}

	/// Invokes a callable value outside any expression, e.g. a formatter
	/// obtained from an evaluated expression.
	pub fn call(&self, func: &Value, args: Vec<Value>) -> Result<Value, ExecutionError> {
		static NO_IMPORTS: Lazy<HashMap<Arc<str>, Value>> = Lazy::new(HashMap::new);
		let interp = Interpreter::new(self, &NO_IMPORTS);
		interp.call_value(func, args)
	}

	/// The shared root context. Builtins are stateless, so one instance
	/// serves every request.
	pub fn root() -> &'static Context {
		static ROOT: Lazy<Context> = Lazy::new(Context::default);
		&ROOT
	}
}

impl Default for Context {
	fn default() -> Self {
		let mut bindings: BTreeMap<&'static str, Value> = BTreeMap::new();

		bindings.insert("len", builtin!("len", functions::len));
		bindings.insert("min", builtin!("min", functions::min));
		bindings.insert("max", builtin!("max", functions::max));
		bindings.insert("sum", builtin!("sum", functions::sum));
		bindings.insert("abs", builtin!("abs", functions::abs));
		bindings.insert("range", builtin!("range", functions::range));
		bindings.insert("map", builtin!("map", functions::map));
		bindings.insert("filter", builtin!("filter", functions::filter));

		bindings.insert("int", Value::Type(TypeSpec::Int));
		bindings.insert("float", Value::Type(TypeSpec::Float));
		bindings.insert("str", Value::Type(TypeSpec::Str));
		bindings.insert("bool", Value::Type(TypeSpec::Bool));
		bindings.insert("list", Value::Type(TypeSpec::List(None)));
		bindings.insert("dict", Value::Type(TypeSpec::Dict));
		bindings.insert("set", Value::Type(TypeSpec::Set));
		bindings.insert("tuple", Value::Type(TypeSpec::Tuple));

		Context { bindings }
	}
}
