use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::ser::Error as SerError;
use serde::{Serialize, Serializer};

use crate::ExecutionError;
use crate::ast::Expr;
use crate::context::Env;
use crate::functions::FunctionContext;
use crate::types::TypeSpec;

pub type MapValue = IndexMap<Key, Value>;

/// Keys a script mapping may carry. Floats are not accepted as keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Int(i64),
	Bool(bool),
	String(Arc<str>),
}

impl Key {
	pub fn from_value(value: &Value) -> Result<Key, ExecutionError> {
		match value {
			Value::Int(v) => Ok(Key::Int(*v)),
			Value::Bool(v) => Ok(Key::Bool(*v)),
			Value::String(v) => Ok(Key::String(v.clone())),
			other => Err(ExecutionError::UnsupportedKeyType(other.type_of())),
		}
	}

	pub fn to_value(&self) -> Value {
		match self {
			Key::Int(v) => Value::Int(*v),
			Key::Bool(v) => Value::Bool(*v),
			Key::String(v) => Value::String(v.clone()),
		}
	}
}

impl Display for Key {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Key::Int(v) => write!(f, "{v}"),
			Key::Bool(v) => write!(f, "{}", if *v { "True" } else { "False" }),
			Key::String(v) => write!(f, "{v}"),
		}
	}
}

/// A whitelisted prelude module: a named bundle of constants and functions.
pub struct Module {
	pub name: &'static str,
	pub bindings: BTreeMap<&'static str, Value>,
}

impl Debug for Module {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Module({})", self.name)
	}
}

pub type BuiltinFn = fn(&FunctionContext<'_>) -> Result<Value, ExecutionError>;

/// A natively implemented function.
pub struct Builtin {
	pub name: &'static str,
	pub func: BuiltinFn,
}

/// A lambda together with the environment it closed over.
pub struct LambdaValue {
	pub params: Vec<Arc<str>>,
	pub body: Arc<Expr>,
	pub captured: Env,
}

impl Debug for LambdaValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "Lambda({} params)", self.params.len())
	}
}

#[derive(Clone)]
pub enum FunctionValue {
	Builtin(&'static Builtin),
	Lambda(Arc<LambdaValue>),
}

impl FunctionValue {
	pub fn name(&self) -> &str {
		match self {
			FunctionValue::Builtin(b) => b.name,
			FunctionValue::Lambda(_) => "<lambda>",
		}
	}
}

impl Debug for FunctionValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			FunctionValue::Builtin(b) => write!(f, "Builtin({})", b.name),
			FunctionValue::Lambda(l) => write!(f, "{l:?}"),
		}
	}
}

#[derive(Clone)]
pub enum Value {
	Int(i64),
	Float(f64),
	Bool(bool),
	String(Arc<str>),
	Null,

	List(Arc<Vec<Value>>),
	Tuple(Arc<Vec<Value>>),
	/// Insertion-ordered, deduplicated by value equality.
	Set(Arc<Vec<Value>>),
	Map(Arc<MapValue>),

	Function(FunctionValue),
	Module(Arc<Module>),
	Type(TypeSpec),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueType {
	Int,
	Float,
	Bool,
	String,
	Null,
	List,
	Tuple,
	Set,
	Map,
	Function,
	Module,
	Type,
}

impl ValueType {
	pub fn as_str(&self) -> &'static str {
		match self {
			ValueType::Int => "int",
			ValueType::Float => "float",
			ValueType::Bool => "bool",
			ValueType::String => "str",
			ValueType::Null => "NoneType",
			ValueType::List => "list",
			ValueType::Tuple => "tuple",
			ValueType::Set => "set",
			ValueType::Map => "dict",
			ValueType::Function => "function",
			ValueType::Module => "module",
			ValueType::Type => "type",
		}
	}
}

impl Display for ValueType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl Value {
	pub fn type_of(&self) -> ValueType {
		match self {
			Value::Int(_) => ValueType::Int,
			Value::Float(_) => ValueType::Float,
			Value::Bool(_) => ValueType::Bool,
			Value::String(_) => ValueType::String,
			Value::Null => ValueType::Null,
			Value::List(_) => ValueType::List,
			Value::Tuple(_) => ValueType::Tuple,
			Value::Set(_) => ValueType::Set,
			Value::Map(_) => ValueType::Map,
			Value::Function(_) => ValueType::Function,
			Value::Module(_) => ValueType::Module,
			Value::Type(_) => ValueType::Type,
		}
	}

	pub fn is_truthy(&self) -> bool {
		match self {
			Value::Int(v) => *v != 0,
			Value::Float(v) => *v != 0.0,
			Value::Bool(v) => *v,
			Value::String(v) => !v.is_empty(),
			Value::Null => false,
			Value::List(v) | Value::Tuple(v) | Value::Set(v) => !v.is_empty(),
			Value::Map(v) => !v.is_empty(),
			Value::Function(_) | Value::Module(_) | Value::Type(_) => true,
		}
	}

	pub fn is_callable(&self) -> bool {
		matches!(self, Value::Function(_) | Value::Type(_))
	}

	pub fn as_number(&self) -> Option<f64> {
		match self {
			Value::Int(v) => Some(*v as f64),
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Result<i64, ExecutionError> {
		match self {
			Value::Int(v) => Ok(*v),
			_ => Err(ExecutionError::Conversion("int", self.type_of())),
		}
	}

	pub fn as_str(&self) -> Result<&str, ExecutionError> {
		match self {
			Value::String(v) => Ok(v.as_ref()),
			_ => Err(ExecutionError::Conversion("str", self.type_of())),
		}
	}

	/// Membership test with the container on the right: `needle in self`.
	pub fn contains(&self, needle: &Value) -> Result<bool, ExecutionError> {
		match self {
			Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
				Ok(items.iter().any(|v| v == needle))
			},
			Value::Map(map) => match Key::from_value(needle) {
				Ok(key) => Ok(map.contains_key(&key)),
				Err(_) => Ok(false),
			},
			Value::String(haystack) => match needle {
				Value::String(sub) => Ok(haystack.contains(sub.as_ref())),
				other => Err(ExecutionError::UnsupportedBinaryOperator(
					"in",
					other.type_of(),
					self.type_of(),
				)),
			},
			other => Err(ExecutionError::UnsupportedBinaryOperator(
				"in",
				needle.type_of(),
				other.type_of(),
			)),
		}
	}

	/// The `str()` rendering: strings bare, everything else as `repr()`.
	pub fn py_str(&self) -> String {
		match self {
			Value::String(v) => v.to_string(),
			other => other.py_repr(),
		}
	}

	pub fn py_repr(&self) -> String {
		match self {
			Value::Int(v) => v.to_string(),
			Value::Float(v) => format!("{v:?}"),
			Value::Bool(v) => if *v { "True" } else { "False" }.to_string(),
			Value::String(v) => repr_str(v),
			Value::Null => "None".to_string(),
			Value::List(items) => {
				format!("[{}]", items.iter().map(|v| v.py_repr()).join(", "))
			},
			Value::Tuple(items) => match items.as_slice() {
				[only] => format!("({},)", only.py_repr()),
				items => format!("({})", items.iter().map(|v| v.py_repr()).join(", ")),
			},
			Value::Set(items) => {
				if items.is_empty() {
					return "set()".to_string();
				}
				format!("{{{}}}", items.iter().map(|v| v.py_repr()).join(", "))
			},
			Value::Map(map) => {
				let inner = map
					.iter()
					.map(|(k, v)| format!("{}: {}", k.to_value().py_repr(), v.py_repr()))
					.join(", ");
				format!("{{{inner}}}")
			},
			Value::Function(f) => match f {
				FunctionValue::Builtin(b) => format!("<built-in function {}>", b.name),
				FunctionValue::Lambda(_) => "<function <lambda>>".to_string(),
			},
			Value::Module(m) => format!("<module '{}'>", m.name),
			Value::Type(t) => format!("<class '{t}'>"),
		}
	}

	pub fn from_json(value: &serde_json::Value) -> Value {
		match value {
			serde_json::Value::Null => Value::Null,
			serde_json::Value::Bool(v) => Value::Bool(*v),
			serde_json::Value::Number(n) => {
				if let Some(v) = n.as_i64() {
					Value::Int(v)
				} else {
					Value::Float(n.as_f64().unwrap_or(f64::NAN))
				}
			},
			serde_json::Value::String(s) => Value::String(Arc::from(s.as_str())),
			serde_json::Value::Array(items) => {
				Value::List(Arc::new(items.iter().map(Value::from_json).collect()))
			},
			serde_json::Value::Object(entries) => {
				let map: MapValue = entries
					.iter()
					.map(|(k, v)| (Key::String(Arc::from(k.as_str())), Value::from_json(v)))
					.collect();
				Value::Map(Arc::new(map))
			},
		}
	}

	/// Converts to a JSON value. Functions, modules, and type tags are not
	/// representable and yield an error.
	pub fn json(&self) -> Result<serde_json::Value, ExecutionError> {
		Ok(match self {
			Value::Int(v) => serde_json::Value::from(*v),
			Value::Float(v) => serde_json::Number::from_f64(*v)
				.map(serde_json::Value::Number)
				.ok_or(ExecutionError::Conversion("json", ValueType::Float))?,
			Value::Bool(v) => serde_json::Value::from(*v),
			Value::String(v) => serde_json::Value::from(v.as_ref()),
			Value::Null => serde_json::Value::Null,
			Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
				let out: Result<Vec<_>, _> = items.iter().map(|v| v.json()).collect();
				serde_json::Value::Array(out?)
			},
			Value::Map(map) => {
				let mut out = serde_json::Map::with_capacity(map.len());
				for (k, v) in map.iter() {
					out.insert(k.to_string(), v.json()?);
				}
				serde_json::Value::Object(out)
			},
			other => return Err(ExecutionError::Conversion("json", other.type_of())),
		})
	}
}

fn repr_str(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('\'');
	for c in s.chars() {
		match c {
			'\'' => out.push_str("\\'"),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			c => out.push(c),
		}
	}
	out.push('\'');
	out
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.py_str())
	}
}

impl Debug for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Int(v) => write!(f, "Int({v})"),
			Value::Float(v) => write!(f, "Float({v:?})"),
			Value::Bool(v) => write!(f, "Bool({v})"),
			Value::String(v) => write!(f, "String({v:?})"),
			Value::Null => write!(f, "Null"),
			Value::List(items) => write!(f, "List({items:?})"),
			Value::Tuple(items) => write!(f, "Tuple({items:?})"),
			Value::Set(items) => write!(f, "Set({items:?})"),
			Value::Map(map) => write!(f, "Map({map:?})"),
			Value::Function(v) => write!(f, "Function({v:?})"),
			Value::Module(m) => write!(f, "{m:?}"),
			Value::Type(t) => write!(f, "Type({t})"),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			// Numbers compare across int/float without explicit casting.
			(Value::Int(a), Value::Float(b)) => (*a as f64) == *b,
			(Value::Float(a), Value::Int(b)) => *a == (*b as f64),
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::String(a), Value::String(b)) => a == b,
			(Value::Null, Value::Null) => true,
			(Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
				a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
			},
			(Value::Set(a), Value::Set(b)) => {
				a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x == y))
			},
			(Value::Map(a), Value::Map(b)) => {
				a.len() == b.len()
					&& a.iter()
						.all(|(k, v)| b.get(k).map(|other| v == other).unwrap_or(false))
			},
			(Value::Type(a), Value::Type(b)) => a == b,
			(_, _) => false,
		}
	}
}

impl PartialOrd for Value {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
			(Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
			(Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
			(Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
			(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
			(Value::String(a), Value::String(b)) => Some(a.as_ref().cmp(b.as_ref())),
			(Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
				for (x, y) in a.iter().zip(b.iter()) {
					match x.partial_cmp(y)? {
						Ordering::Equal => continue,
						other => return Some(other),
					}
				}
				Some(a.len().cmp(&b.len()))
			},
			_ => None,
		}
	}
}

impl Serialize for Value {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self
			.json()
			.map_err(|e| S::Error::custom(e.to_string()))?
			.serialize(serializer)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(Arc::from(v))
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(Arc::from(v.as_str()))
	}
}

impl<T: Into<Value>> From<Vec<T>> for Value {
	fn from(v: Vec<T>) -> Self {
		Value::List(Arc::new(v.into_iter().map(|v| v.into()).collect()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cross_numeric_equality() {
		assert_eq!(Value::Int(1), Value::Float(1.0));
		assert_ne!(Value::Int(1), Value::Bool(true));
	}

	#[test]
	fn set_equality_ignores_order() {
		let a = Value::Set(Arc::new(vec![Value::Int(1), Value::Int(2)]));
		let b = Value::Set(Arc::new(vec![Value::Int(2), Value::Int(1)]));
		assert_eq!(a, b);
	}

	#[test]
	fn py_str_rendering() {
		assert_eq!(Value::Float(20.0).py_str(), "20.0");
		assert_eq!(Value::Bool(true).py_str(), "True");
		assert_eq!(Value::Null.py_str(), "None");
		assert_eq!(Value::from("x").py_str(), "x");
		let list: Value = vec![1i64, 2, 3].into();
		assert_eq!(list.py_str(), "[1, 2, 3]");
		let nested: Value = Value::List(Arc::new(vec![Value::from("a")]));
		assert_eq!(nested.py_str(), "['a']");
	}

	#[test]
	fn json_round_trip() {
		let js = serde_json::json!({"a": [1, 2.5, "x"], "b": null});
		let v = Value::from_json(&js);
		assert_eq!(v.json().unwrap(), js);
	}

	#[test]
	fn functions_do_not_convert_to_json() {
		let module = Value::Type(TypeSpec::Int);
		assert!(module.json().is_err());
	}
}
