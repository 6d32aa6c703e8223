use std::sync::Arc;

use crate::ExecutionError;
use crate::interp::{Interpreter, iter_values};
use crate::objects::Value;

type Result<T> = std::result::Result<T, ExecutionError>;

/// Passed to every native function: its declared name, the already
/// evaluated arguments, and a handle back into the interpreter so
/// higher-order builtins can invoke callables.
pub struct FunctionContext<'a> {
	pub name: &'static str,
	pub args: &'a [Value],
	pub(crate) interp: &'a Interpreter<'a>,
}

impl FunctionContext<'_> {
	pub fn arg(&self, index: usize) -> Result<&Value> {
		self
			.args
			.get(index)
			.ok_or(ExecutionError::InvalidArgumentCount {
				expected: index + 1,
				actual: self.args.len(),
			})
	}

	pub fn exactly(&self, n: usize) -> Result<()> {
		if self.args.len() != n {
			return Err(ExecutionError::InvalidArgumentCount {
				expected: n,
				actual: self.args.len(),
			});
		}
		Ok(())
	}

	pub fn between(&self, min: usize, max: usize) -> Result<()> {
		if self.args.len() < min || self.args.len() > max {
			return Err(ExecutionError::InvalidArgumentCount {
				expected: min,
				actual: self.args.len(),
			});
		}
		Ok(())
	}

	pub fn call(&self, func: &Value, args: Vec<Value>) -> Result<Value> {
		self.interp.call_value(func, args)
	}

	pub fn error<M: ToString>(&self, message: M) -> ExecutionError {
		ExecutionError::function_error(self.name, message)
	}
}

/// `len(x)` for strings (in characters), sequences, sets, and mappings.
pub fn len(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(1)?;
	let n = match ftx.arg(0)? {
		Value::String(s) => s.chars().count(),
		Value::List(items) | Value::Tuple(items) | Value::Set(items) => items.len(),
		Value::Map(map) => map.len(),
		other => return Err(ftx.error(format!("object of type '{}' has no len()", other.type_of()))),
	};
	Ok(Value::Int(n as i64))
}

pub fn abs(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(1)?;
	match ftx.arg(0)? {
		Value::Int(v) => v
			.checked_abs()
			.map(Value::Int)
			.ok_or(ExecutionError::Overflow("abs")),
		Value::Float(v) => Ok(Value::Float(v.abs())),
		other => Err(ftx.error(format!("bad operand type for abs(): '{}'", other.type_of()))),
	}
}

fn extremum(ftx: &FunctionContext<'_>, want_greater: bool) -> Result<Value> {
	let candidates = if ftx.args.len() == 1 {
		iter_values(ftx.arg(0)?)?
	} else {
		ftx.args.to_vec()
	};
	let mut best: Option<Value> = None;
	for v in candidates {
		best = Some(match best {
			None => v,
			Some(cur) => {
				let ord = cur
					.partial_cmp(&v)
					.ok_or(ExecutionError::ValuesNotComparable(
						cur.type_of(),
						v.type_of(),
					))?;
				// Ties keep the earlier value.
				let replace = if want_greater { ord.is_lt() } else { ord.is_gt() };
				if replace { v } else { cur }
			},
		});
	}
	best.ok_or_else(|| ftx.error(format!("{}() arg is an empty sequence", ftx.name)))
}

pub fn min(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.between(1, usize::MAX)?;
	extremum(ftx, false)
}

pub fn max(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.between(1, usize::MAX)?;
	extremum(ftx, true)
}

/// `sum(iterable[, start])` over ints and floats. The result stays an int
/// until a float enters the accumulation.
pub fn sum(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.between(1, 2)?;
	let mut acc = match ftx.args.get(1) {
		Some(v) => v.clone(),
		None => Value::Int(0),
	};
	for item in iter_values(ftx.arg(0)?)? {
		acc = match (&acc, &item) {
			(Value::Int(a), Value::Int(b)) => Value::Int(
				a.checked_add(*b)
					.ok_or(ExecutionError::Overflow("sum"))?,
			),
			_ => {
				let a = acc
					.as_number()
					.ok_or_else(|| ftx.error(format!("unsupported operand type '{}'", acc.type_of())))?;
				let b = item
					.as_number()
					.ok_or_else(|| ftx.error(format!("unsupported operand type '{}'", item.type_of())))?;
				Value::Float(a + b)
			},
		};
	}
	Ok(acc)
}

/// `range(stop)`, `range(start, stop)`, `range(start, stop, step)`,
/// materialized as a list.
pub fn range(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.between(1, 3)?;
	let (start, stop, step) = match ftx.args.len() {
		1 => (0, ftx.arg(0)?.as_int()?, 1),
		2 => (ftx.arg(0)?.as_int()?, ftx.arg(1)?.as_int()?, 1),
		_ => (
			ftx.arg(0)?.as_int()?,
			ftx.arg(1)?.as_int()?,
			ftx.arg(2)?.as_int()?,
		),
	};
	if step == 0 {
		return Err(ftx.error("range() arg 3 must not be zero"));
	}
	let mut out = Vec::new();
	let mut cur = start;
	while (step > 0 && cur < stop) || (step < 0 && cur > stop) {
		out.push(Value::Int(cur));
		cur += step;
	}
	Ok(Value::List(Arc::new(out)))
}

/// `map(f, iterable)`, materialized as a list.
pub fn map(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(2)?;
	let func = ftx.arg(0)?;
	let items = iter_values(ftx.arg(1)?)?;
	let mut out = Vec::with_capacity(items.len());
	for item in items {
		out.push(ftx.call(func, vec![item])?);
	}
	Ok(Value::List(Arc::new(out)))
}

/// `filter(f, iterable)`; `filter(None, iterable)` keeps truthy items.
pub fn filter(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(2)?;
	let func = ftx.arg(0)?;
	let items = iter_values(ftx.arg(1)?)?;
	let mut out = Vec::new();
	for item in items {
		let keep = match func {
			Value::Null => item.is_truthy(),
			f => ftx.call(f, vec![item.clone()])?.is_truthy(),
		};
		if keep {
			out.push(item);
		}
	}
	Ok(Value::List(Arc::new(out)))
}
