use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ExecutionError;
use crate::ast::{BinaryOp, BoolOp, CmpOp, CompKind, Comprehension, Expr, FStringPart, Literal, UnaryOp};
use crate::context::{Context, Env};
use crate::functions::FunctionContext;
use crate::objects::{FunctionValue, Key, LambdaValue, MapValue, Value};
use crate::strfmt;
use crate::types::TypeSpec;

type Result<T> = std::result::Result<T, ExecutionError>;

/// Evaluates expressions against a context of builtins, a set of prelude
/// import bindings, and a caller environment. Evaluation never mutates the
/// caller environment; walrus bindings live in per-evaluation frames.
pub struct Interpreter<'a> {
	ctx: &'a Context,
	imports: &'a HashMap<Arc<str>, Value>,
}

/// Mutable name scopes for one evaluation: a stack of frames over an
/// immutable base environment. `func_base` marks the innermost function
/// frame, which is where walrus targets bind.
pub struct Scopes {
	base: Env,
	frames: Vec<HashMap<Arc<str>, Value>>,
	func_base: usize,
}

impl Scopes {
	pub fn new(base: Env) -> Scopes {
		Scopes {
			base,
			frames: vec![HashMap::new()],
			func_base: 0,
		}
	}

	fn lookup(&self, name: &str) -> Option<Value> {
		for frame in self.frames.iter().rev() {
			if let Some(v) = frame.get(name) {
				return Some(v.clone());
			}
		}
		self.base.get(name)
	}

	fn bind(&mut self, name: Arc<str>, value: Value) {
		self
			.frames
			.last_mut()
			.expect("scopes always hold one frame")
			.insert(name, value);
	}

	fn bind_function_scope(&mut self, name: Arc<str>, value: Value) {
		self.frames[self.func_base].insert(name, value);
	}
}

/// Materializes the values an expression may iterate over. Mappings yield
/// their keys, strings their characters.
pub(crate) fn iter_values(value: &Value) -> Result<Vec<Value>> {
	match value {
		Value::List(items) | Value::Tuple(items) | Value::Set(items) => Ok(items.as_ref().clone()),
		Value::Map(map) => Ok(map.keys().map(|k| k.to_value()).collect()),
		Value::String(s) => Ok(
			s.chars()
				.map(|c| Value::String(Arc::from(c.to_string().as_str())))
				.collect(),
		),
		other => Err(ExecutionError::NotIterable(other.type_of())),
	}
}

fn push_unique(out: &mut Vec<Value>, value: Value) {
	if !out.iter().any(|v| v == &value) {
		out.push(value);
	}
}

impl<'a> Interpreter<'a> {
	pub fn new(ctx: &'a Context, imports: &'a HashMap<Arc<str>, Value>) -> Interpreter<'a> {
		Interpreter { ctx, imports }
	}

	pub fn eval(&self, expr: &Expr, scopes: &mut Scopes) -> Result<Value> {
		match expr {
			Expr::Literal(lit) => Ok(match lit {
				Literal::Int(v) => Value::Int(*v),
				Literal::Float(v) => Value::Float(*v),
				Literal::Str(v) => Value::String(v.clone()),
				Literal::Bool(v) => Value::Bool(*v),
				Literal::None => Value::Null,
			}),
			Expr::FString(parts) => {
				let mut out = String::new();
				for part in parts {
					match part {
						FStringPart::Literal(s) => out.push_str(s),
						FStringPart::Field { value, spec } => {
							let v = self.eval(value, scopes)?;
							match spec {
								Some(spec) => out.push_str(&strfmt::format_value(&v, spec)?),
								None => out.push_str(&v.py_str()),
							}
						},
					}
				}
				Ok(Value::String(Arc::from(out.as_str())))
			},
			Expr::Ident(name) => self.resolve_name(name, scopes),
			Expr::Unary { op, operand } => {
				let v = self.eval(operand, scopes)?;
				self.unary(*op, v)
			},
			Expr::Binary { op, left, right } => {
				let l = self.eval(left, scopes)?;
				let r = self.eval(right, scopes)?;
				binary(*op, l, r)
			},
			Expr::Bool { op, values } => {
				let mut last = Value::Null;
				for (i, value) in values.iter().enumerate() {
					last = self.eval(value, scopes)?;
					let truthy = last.is_truthy();
					let short = match op {
						BoolOp::And => !truthy,
						BoolOp::Or => truthy,
					};
					if short && i + 1 < values.len() {
						return Ok(last);
					}
				}
				Ok(last)
			},
			Expr::Compare { left, ops } => {
				let mut prev = self.eval(left, scopes)?;
				for (op, right) in ops {
					let next = self.eval(right, scopes)?;
					if !compare(*op, &prev, &next)? {
						return Ok(Value::Bool(false));
					}
					prev = next;
				}
				Ok(Value::Bool(true))
			},
			Expr::Conditional { test, body, orelse } => {
				if self.eval(test, scopes)?.is_truthy() {
					self.eval(body, scopes)
				} else {
					self.eval(orelse, scopes)
				}
			},
			Expr::Lambda { params, body } => {
				Ok(Value::Function(FunctionValue::Lambda(Arc::new(LambdaValue {
					params: params.clone(),
					body: body.clone(),
					captured: self.snapshot(scopes),
				}))))
			},
			Expr::Named { target, value } => {
				let v = self.eval(value, scopes)?;
				scopes.bind_function_scope(target.clone(), v.clone());
				Ok(v)
			},
			Expr::List(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(self.eval(item, scopes)?);
				}
				Ok(Value::List(Arc::new(out)))
			},
			Expr::Tuple(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(self.eval(item, scopes)?);
				}
				Ok(Value::Tuple(Arc::new(out)))
			},
			Expr::Set(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					push_unique(&mut out, self.eval(item, scopes)?);
				}
				Ok(Value::Set(Arc::new(out)))
			},
			Expr::Dict(entries) => {
				let mut out = MapValue::with_capacity(entries.len());
				for (k, v) in entries {
					let key = Key::from_value(&self.eval(k, scopes)?)?;
					out.insert(key, self.eval(v, scopes)?);
				}
				Ok(Value::Map(Arc::new(out)))
			},
			Expr::Comp(comp) => self.comprehension(comp, scopes),
			Expr::Attribute { value, attr } => {
				let v = self.eval(value, scopes)?;
				self.attribute(&v, attr)
			},
			Expr::Index { value, index } => {
				let v = self.eval(value, scopes)?;
				let i = self.eval(index, scopes)?;
				index_value(&v, &i)
			},
			Expr::Call { func, args } => {
				let f = self.eval(func, scopes)?;
				let mut evaled = Vec::with_capacity(args.len());
				for arg in args {
					evaled.push(self.eval(arg, scopes)?);
				}
				self.call_value(&f, evaled)
			},
		}
	}

	fn resolve_name(&self, name: &Arc<str>, scopes: &Scopes) -> Result<Value> {
		if let Some(v) = scopes.lookup(name) {
			return Ok(v);
		}
		if let Some(v) = self.imports.get(name) {
			return Ok(v.clone());
		}
		if let Some(v) = self.ctx.get(name) {
			return Ok(v.clone());
		}
		Err(ExecutionError::UndeclaredReference(name.clone()))
	}

	/// Flattens builtins-excluded state into an environment a lambda can
	/// carry beyond this evaluation: imports first, then the base env, then
	/// the live frames.
	fn snapshot(&self, scopes: &Scopes) -> Env {
		let mut flat = self.imports.clone();
		scopes.base.flatten_into(&mut flat);
		for frame in &scopes.frames {
			for (k, v) in frame {
				flat.insert(k.clone(), v.clone());
			}
		}
		Env::from_map(flat)
	}

	pub fn call_value(&self, func: &Value, args: Vec<Value>) -> Result<Value> {
		match func {
			Value::Function(FunctionValue::Builtin(builtin)) => {
				let ftx = FunctionContext {
					name: builtin.name,
					args: &args,
					interp: self,
				};
				(builtin.func)(&ftx)
			},
			Value::Function(FunctionValue::Lambda(lambda)) => {
				if lambda.params.len() != args.len() {
					return Err(ExecutionError::InvalidArgumentCount {
						expected: lambda.params.len(),
						actual: args.len(),
					});
				}
				let frame: HashMap<Arc<str>, Value> = lambda
					.params
					.iter()
					.cloned()
					.zip(args)
					.collect();
				let mut scopes = Scopes {
					base: lambda.captured.clone(),
					frames: vec![frame],
					func_base: 0,
				};
				self.eval(&lambda.body, &mut scopes)
			},
			Value::Type(spec) => construct(spec, &args),
			other => Err(ExecutionError::NotCallable(other.type_of())),
		}
	}

	fn unary(&self, op: UnaryOp, value: Value) -> Result<Value> {
		match op {
			UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
			UnaryOp::Neg => match value {
				Value::Int(v) => v
					.checked_neg()
					.map(Value::Int)
					.ok_or(ExecutionError::Overflow("-")),
				Value::Float(v) => Ok(Value::Float(-v)),
				v => Err(ExecutionError::UnsupportedUnaryOperator(
					op.symbol(),
					v.type_of(),
				)),
			},
			UnaryOp::Pos => match value {
				v @ (Value::Int(_) | Value::Float(_)) => Ok(v),
				v => Err(ExecutionError::UnsupportedUnaryOperator(
					op.symbol(),
					v.type_of(),
				)),
			},
		}
	}

	fn attribute(&self, value: &Value, attr: &str) -> Result<Value> {
		match value {
			Value::Map(map) => map
				.get(&Key::String(Arc::from(attr)))
				.cloned()
				.ok_or_else(|| ExecutionError::NoSuchAttribute(value.type_of(), attr.to_string())),
			Value::Module(module) => module
				.bindings
				.get(attr)
				.cloned()
				.ok_or_else(|| ExecutionError::NoSuchAttribute(value.type_of(), attr.to_string())),
			other => Err(ExecutionError::NoSuchAttribute(
				other.type_of(),
				attr.to_string(),
			)),
		}
	}

	fn comprehension(&self, comp: &Comprehension, scopes: &mut Scopes) -> Result<Value> {
		let mut list_out = Vec::new();
		let mut map_out = MapValue::new();
		scopes.frames.push(HashMap::new());
		let result = self.comp_clause(comp, 0, scopes, &mut list_out, &mut map_out);
		scopes.frames.pop();
		result?;
		Ok(match comp.kind {
			CompKind::List | CompKind::Generator => Value::List(Arc::new(list_out)),
			CompKind::Set => {
				let mut unique = Vec::with_capacity(list_out.len());
				for v in list_out {
					push_unique(&mut unique, v);
				}
				Value::Set(Arc::new(unique))
			},
			CompKind::Dict => Value::Map(Arc::new(map_out)),
		})
	}

	fn comp_clause(
		&self,
		comp: &Comprehension,
		depth: usize,
		scopes: &mut Scopes,
		list_out: &mut Vec<Value>,
		map_out: &mut MapValue,
	) -> Result<()> {
		if depth == comp.clauses.len() {
			match (&comp.kind, &comp.key) {
				(CompKind::Dict, Some(key)) => {
					let k = Key::from_value(&self.eval(key, scopes)?)?;
					let v = self.eval(&comp.value, scopes)?;
					map_out.insert(k, v);
				},
				_ => list_out.push(self.eval(&comp.value, scopes)?),
			}
			return Ok(());
		}
		let clause = &comp.clauses[depth];
		let iterable = self.eval(&clause.iter, scopes)?;
		'items: for item in iter_values(&iterable)? {
			if clause.targets.len() == 1 {
				scopes.bind(clause.targets[0].clone(), item);
			} else {
				let parts = match &item {
					Value::List(items) | Value::Tuple(items) => items.as_ref().clone(),
					other => return Err(ExecutionError::NotIterable(other.type_of())),
				};
				if parts.len() != clause.targets.len() {
					return Err(ExecutionError::UnpackMismatch {
						expected: clause.targets.len(),
						got: parts.len(),
					});
				}
				for (target, part) in clause.targets.iter().zip(parts) {
					scopes.bind(target.clone(), part);
				}
			}
			for cond in &clause.ifs {
				if !self.eval(cond, scopes)?.is_truthy() {
					continue 'items;
				}
			}
			self.comp_clause(comp, depth + 1, scopes, list_out, map_out)?;
		}
		Ok(())
	}
}

fn index_value(value: &Value, index: &Value) -> Result<Value> {
	match (value, index) {
		(Value::List(items) | Value::Tuple(items), Value::Int(i)) => {
			let idx = normalize_index(*i, items.len())?;
			Ok(items[idx].clone())
		},
		(Value::String(s), Value::Int(i)) => {
			let chars: Vec<char> = s.chars().collect();
			let idx = normalize_index(*i, chars.len())?;
			Ok(Value::String(Arc::from(chars[idx].to_string().as_str())))
		},
		(Value::Map(map), key) => {
			let key = Key::from_value(key)
				.map_err(|_| ExecutionError::UnsupportedIndex(value.type_of(), key.type_of()))?;
			map
				.get(&key)
				.cloned()
				.ok_or_else(|| ExecutionError::NoSuchKey(key.to_string()))
		},
		// `list[int]` builds a parameterized type tag.
		(Value::Type(TypeSpec::List(None)), Value::Type(elem)) => {
			Ok(Value::Type(TypeSpec::List(Some(Box::new(elem.clone())))))
		},
		(v, i) => Err(ExecutionError::UnsupportedIndex(v.type_of(), i.type_of())),
	}
}

fn normalize_index(i: i64, len: usize) -> Result<usize> {
	let idx = if i < 0 { i + len as i64 } else { i };
	if idx < 0 || idx as usize >= len {
		return Err(ExecutionError::IndexOutOfBounds(i));
	}
	Ok(idx as usize)
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> Result<bool> {
	match op {
		CmpOp::Eq => Ok(left == right),
		CmpOp::Ne => Ok(left != right),
		CmpOp::In => right.contains(left),
		CmpOp::NotIn => right.contains(left).map(|b| !b),
		CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
			let ord = left
				.partial_cmp(right)
				.ok_or(ExecutionError::ValuesNotComparable(
					left.type_of(),
					right.type_of(),
				))?;
			Ok(match op {
				CmpOp::Lt => ord.is_lt(),
				CmpOp::Le => ord.is_le(),
				CmpOp::Gt => ord.is_gt(),
				_ => ord.is_ge(),
			})
		},
	}
}

/// Floor division rounding toward negative infinity, so the remainder
/// carries the divisor's sign.
fn floor_div_int(a: i64, b: i64) -> Result<Value> {
	if b == 0 {
		return Err(ExecutionError::DivisionByZero);
	}
	let q = a.checked_div(b).ok_or(ExecutionError::Overflow("//"))?;
	let r = a % b;
	if r != 0 && ((r < 0) != (b < 0)) {
		Ok(Value::Int(q - 1))
	} else {
		Ok(Value::Int(q))
	}
}

fn mod_int(a: i64, b: i64) -> Result<Value> {
	if b == 0 {
		return Err(ExecutionError::RemainderByZero);
	}
	if b == -1 {
		// i64::MIN % -1 overflows the native remainder.
		return Ok(Value::Int(0));
	}
	let r = a % b;
	if r != 0 && ((r < 0) != (b < 0)) {
		Ok(Value::Int(r + b))
	} else {
		Ok(Value::Int(r))
	}
}

fn repeat_seq(items: &[Value], times: i64) -> Vec<Value> {
	let times = times.max(0) as usize;
	let mut out = Vec::with_capacity(items.len() * times);
	for _ in 0..times {
		out.extend(items.iter().cloned());
	}
	out
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
	use BinaryOp::*;
	let unsupported =
		|l: &Value, r: &Value| ExecutionError::UnsupportedBinaryOperator(op.symbol(), l.type_of(), r.type_of());
	match (op, &left, &right) {
		(Add, Value::Int(a), Value::Int(b)) => a
			.checked_add(*b)
			.map(Value::Int)
			.ok_or(ExecutionError::Overflow("+")),
		(Add, a, b) if a.as_number().is_some() && b.as_number().is_some() => {
			Ok(Value::Float(a.as_number().unwrap() + b.as_number().unwrap()))
		},
		(Add, Value::String(a), Value::String(b)) => {
			let mut out = String::with_capacity(a.len() + b.len());
			out.push_str(a);
			out.push_str(b);
			Ok(Value::String(Arc::from(out.as_str())))
		},
		(Add, Value::List(a), Value::List(b)) => {
			let mut out = a.as_ref().clone();
			out.extend(b.iter().cloned());
			Ok(Value::List(Arc::new(out)))
		},
		(Add, Value::Tuple(a), Value::Tuple(b)) => {
			let mut out = a.as_ref().clone();
			out.extend(b.iter().cloned());
			Ok(Value::Tuple(Arc::new(out)))
		},

		(Sub, Value::Int(a), Value::Int(b)) => a
			.checked_sub(*b)
			.map(Value::Int)
			.ok_or(ExecutionError::Overflow("-")),
		(Sub, a, b) if a.as_number().is_some() && b.as_number().is_some() => {
			Ok(Value::Float(a.as_number().unwrap() - b.as_number().unwrap()))
		},
		(Sub, Value::Set(a), Value::Set(b)) => {
			let out: Vec<Value> = a
				.iter()
				.filter(|v| !b.iter().any(|other| other == *v))
				.cloned()
				.collect();
			Ok(Value::Set(Arc::new(out)))
		},

		(Mul, Value::Int(a), Value::Int(b)) => a
			.checked_mul(*b)
			.map(Value::Int)
			.ok_or(ExecutionError::Overflow("*")),
		(Mul, a, b) if a.as_number().is_some() && b.as_number().is_some() => {
			Ok(Value::Float(a.as_number().unwrap() * b.as_number().unwrap()))
		},
		(Mul, Value::String(s), Value::Int(n)) | (Mul, Value::Int(n), Value::String(s)) => {
			Ok(Value::String(Arc::from(
				s.repeat((*n).max(0) as usize).as_str(),
			)))
		},
		(Mul, Value::List(items), Value::Int(n)) | (Mul, Value::Int(n), Value::List(items)) => {
			Ok(Value::List(Arc::new(repeat_seq(items, *n))))
		},

		(Div, a, b) => {
			let x = a.as_number().ok_or_else(|| unsupported(a, b))?;
			let y = b.as_number().ok_or_else(|| unsupported(a, b))?;
			if y == 0.0 {
				return Err(ExecutionError::DivisionByZero);
			}
			Ok(Value::Float(x / y))
		},

		(FloorDiv, Value::Int(a), Value::Int(b)) => floor_div_int(*a, *b),
		(FloorDiv, a, b) => {
			let x = a.as_number().ok_or_else(|| unsupported(a, b))?;
			let y = b.as_number().ok_or_else(|| unsupported(a, b))?;
			if y == 0.0 {
				return Err(ExecutionError::DivisionByZero);
			}
			Ok(Value::Float((x / y).floor()))
		},

		(Mod, Value::Int(a), Value::Int(b)) => mod_int(*a, *b),
		(Mod, a, b) => {
			let x = a.as_number().ok_or_else(|| unsupported(a, b))?;
			let y = b.as_number().ok_or_else(|| unsupported(a, b))?;
			if y == 0.0 {
				return Err(ExecutionError::RemainderByZero);
			}
			Ok(Value::Float(x - y * (x / y).floor()))
		},

		(Pow, Value::Int(a), Value::Int(b)) => {
			if *b >= 0 {
				let exp = u32::try_from(*b).map_err(|_| ExecutionError::Overflow("**"))?;
				a.checked_pow(exp)
					.map(Value::Int)
					.ok_or(ExecutionError::Overflow("**"))
			} else {
				Ok(Value::Float((*a as f64).powf(*b as f64)))
			}
		},
		(Pow, a, b) => {
			let x = a.as_number().ok_or_else(|| unsupported(a, b))?;
			let y = b.as_number().ok_or_else(|| unsupported(a, b))?;
			Ok(Value::Float(x.powf(y)))
		},

		(Union, Value::Type(a), Value::Type(b)) => Ok(Value::Type(a.clone().union(b.clone()))),
		(Union, Value::Set(a), Value::Set(b)) => {
			let mut out = a.as_ref().clone();
			for v in b.iter() {
				push_unique(&mut out, v.clone());
			}
			Ok(Value::Set(Arc::new(out)))
		},

		(_, l, r) => Err(unsupported(l, r)),
	}
}

/// Calling a type tag converts, e.g. `int("3")` or `list(xs)`. With no
/// argument the type's zero value is produced.
fn construct(spec: &TypeSpec, args: &[Value]) -> Result<Value> {
	if args.len() > 1 {
		return Err(ExecutionError::InvalidArgumentCount {
			expected: 1,
			actual: args.len(),
		});
	}
	let arg = args.first();
	let cannot = |spec: &TypeSpec, v: &Value| ExecutionError::FunctionError {
		function: spec.to_string(),
		message: format!("cannot convert {} to {spec}", v.type_of()),
	};
	match spec {
		TypeSpec::Int => match arg {
			None => Ok(Value::Int(0)),
			Some(Value::Int(v)) => Ok(Value::Int(*v)),
			Some(Value::Float(v)) => {
				if v.is_finite() && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 {
					Ok(Value::Int(v.trunc() as i64))
				} else {
					Err(ExecutionError::Overflow("int"))
				}
			},
			Some(Value::Bool(v)) => Ok(Value::Int(*v as i64)),
			Some(Value::String(s)) => s
				.trim()
				.parse::<i64>()
				.map(Value::Int)
				.map_err(|_| ExecutionError::FunctionError {
					function: "int".to_string(),
					message: format!("invalid literal for int(): {}", s),
				}),
			Some(v) => Err(cannot(spec, v)),
		},
		TypeSpec::Float => match arg {
			None => Ok(Value::Float(0.0)),
			Some(Value::Int(v)) => Ok(Value::Float(*v as f64)),
			Some(Value::Float(v)) => Ok(Value::Float(*v)),
			Some(Value::Bool(v)) => Ok(Value::Float(*v as i64 as f64)),
			Some(Value::String(s)) => s
				.trim()
				.parse::<f64>()
				.map(Value::Float)
				.map_err(|_| ExecutionError::FunctionError {
					function: "float".to_string(),
					message: format!("could not convert string to float: {}", s),
				}),
			Some(v) => Err(cannot(spec, v)),
		},
		TypeSpec::Str => Ok(match arg {
			None => Value::String(Arc::from("")),
			Some(v) => Value::String(Arc::from(v.py_str().as_str())),
		}),
		TypeSpec::Bool => Ok(Value::Bool(arg.map(|v| v.is_truthy()).unwrap_or(false))),
		TypeSpec::List(None) => Ok(match arg {
			None => Value::List(Arc::new(Vec::new())),
			Some(v) => Value::List(Arc::new(iter_values(v)?)),
		}),
		TypeSpec::Set => Ok(match arg {
			None => Value::Set(Arc::new(Vec::new())),
			Some(v) => {
				let mut out = Vec::new();
				for item in iter_values(v)? {
					push_unique(&mut out, item);
				}
				Value::Set(Arc::new(out))
			},
		}),
		TypeSpec::Tuple => Ok(match arg {
			None => Value::Tuple(Arc::new(Vec::new())),
			Some(v) => Value::Tuple(Arc::new(iter_values(v)?)),
		}),
		TypeSpec::Dict => match arg {
			None => Ok(Value::Map(Arc::new(IndexMap::new()))),
			Some(Value::Map(map)) => Ok(Value::Map(map.clone())),
			Some(v @ (Value::List(_) | Value::Tuple(_) | Value::Set(_))) => {
				let mut out = MapValue::new();
				for pair in iter_values(v)? {
					match &pair {
						Value::List(kv) | Value::Tuple(kv) if kv.len() == 2 => {
							out.insert(Key::from_value(&kv[0])?, kv[1].clone());
						},
						_ => return Err(cannot(spec, v)),
					}
				}
				Ok(Value::Map(Arc::new(out)))
			},
			Some(v) => Err(cannot(spec, v)),
		},
		TypeSpec::NoneType | TypeSpec::Union(_) | TypeSpec::List(Some(_)) => {
			Err(ExecutionError::FunctionError {
				function: spec.to_string(),
				message: "cannot instantiate this type".to_string(),
			})
		},
	}
}
