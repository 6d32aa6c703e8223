use std::fmt::{Display, Formatter};

use crate::objects::Value;

/// A runtime type tag. Type names evaluate to these, conversion calls like
/// `int("3")` dispatch on them, and declared expected types are checked
/// against them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSpec {
	Int,
	Float,
	Str,
	Bool,
	NoneType,
	/// `list` or `list[T]`.
	List(Option<Box<TypeSpec>>),
	Dict,
	Set,
	Tuple,
	/// `T | U | …`
	Union(Vec<TypeSpec>),
}

impl TypeSpec {
	/// Whether the value satisfies this type. `bool` and `int` are distinct,
	/// as are `int` and `float`.
	pub fn check(&self, value: &Value) -> bool {
		match self {
			TypeSpec::Int => matches!(value, Value::Int(_)),
			TypeSpec::Float => matches!(value, Value::Float(_)),
			TypeSpec::Str => matches!(value, Value::String(_)),
			TypeSpec::Bool => matches!(value, Value::Bool(_)),
			TypeSpec::NoneType => matches!(value, Value::Null),
			TypeSpec::List(elem) => match value {
				Value::List(items) => match elem {
					Some(elem) => items.iter().all(|v| elem.check(v)),
					None => true,
				},
				_ => false,
			},
			TypeSpec::Dict => matches!(value, Value::Map(_)),
			TypeSpec::Set => matches!(value, Value::Set(_)),
			TypeSpec::Tuple => matches!(value, Value::Tuple(_)),
			TypeSpec::Union(options) => options.iter().any(|t| t.check(value)),
		}
	}

	pub fn union(self, other: TypeSpec) -> TypeSpec {
		match (self, other) {
			(TypeSpec::Union(mut a), TypeSpec::Union(b)) => {
				a.extend(b);
				TypeSpec::Union(a)
			},
			(TypeSpec::Union(mut a), b) => {
				a.push(b);
				TypeSpec::Union(a)
			},
			(a, TypeSpec::Union(mut b)) => {
				b.insert(0, a);
				TypeSpec::Union(b)
			},
			(a, b) => TypeSpec::Union(vec![a, b]),
		}
	}
}

impl Display for TypeSpec {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TypeSpec::Int => f.write_str("int"),
			TypeSpec::Float => f.write_str("float"),
			TypeSpec::Str => f.write_str("str"),
			TypeSpec::Bool => f.write_str("bool"),
			TypeSpec::NoneType => f.write_str("NoneType"),
			TypeSpec::List(None) => f.write_str("list"),
			TypeSpec::List(Some(elem)) => write!(f, "list[{elem}]"),
			TypeSpec::Dict => f.write_str("dict"),
			TypeSpec::Set => f.write_str("set"),
			TypeSpec::Tuple => f.write_str("tuple"),
			TypeSpec::Union(options) => {
				let names: Vec<String> = options.iter().map(|t| t.to_string()).collect();
				f.write_str(&names.join(" | "))
			},
		}
	}
}
