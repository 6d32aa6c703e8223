use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::ast::ImportStmt;
use crate::functions::FunctionContext;
use crate::interp::iter_values;
use crate::macros::builtin;
use crate::objects::{Module, Value};
use crate::{CompileError, ExecutionError};

type Result<T> = std::result::Result<T, ExecutionError>;

/// Looks up a whitelisted module by name. Anything not listed here cannot
/// be imported by a prelude.
pub fn lookup(name: &str) -> Option<Value> {
	match name {
		"math" => Some(MATH.clone()),
		"statistics" => Some(STATISTICS.clone()),
		_ => None,
	}
}

/// Resolves prelude imports into the bindings they contribute to a program
/// scope. Runs once per compiled program.
pub fn resolve_imports(prelude: &[ImportStmt]) -> std::result::Result<HashMap<Arc<str>, Value>, CompileError> {
	let mut out = HashMap::new();
	for imp in prelude {
		let module = lookup(&imp.module)
			.ok_or_else(|| CompileError::UnknownModule(imp.module.to_string()))?;
		match &imp.names {
			None => {
				let bound = imp.alias.clone().unwrap_or_else(|| imp.module.clone());
				out.insert(bound, module);
			},
			Some(names) => {
				let Value::Module(m) = &module else {
					unreachable!("lookup only returns modules")
				};
				for (name, alias) in names {
					let value = m.bindings.get(name.as_ref()).cloned().ok_or_else(|| {
						CompileError::InvalidImport(format!(
							"cannot import name '{name}' from '{}'",
							imp.module
						))
					})?;
					out.insert(alias.clone().unwrap_or_else(|| name.clone()), value);
				}
			},
		}
	}
	Ok(out)
}

fn number_arg(ftx: &FunctionContext<'_>, index: usize) -> Result<f64> {
	let v = ftx.arg(index)?;
	v.as_number()
		.ok_or_else(|| ftx.error(format!("must be a real number, not {}", v.type_of())))
}

fn unary_float(ftx: &FunctionContext<'_>, f: fn(f64) -> f64) -> Result<Value> {
	ftx.exactly(1)?;
	Ok(Value::Float(f(number_arg(ftx, 0)?)))
}

fn sqrt(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(1)?;
	let n = number_arg(ftx, 0)?;
	if n < 0.0 {
		return Err(ftx.error("math domain error"));
	}
	Ok(Value::Float(n.sqrt()))
}

fn floor(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(1)?;
	Ok(Value::Int(number_arg(ftx, 0)?.floor() as i64))
}

fn ceil(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(1)?;
	Ok(Value::Int(number_arg(ftx, 0)?.ceil() as i64))
}

fn fabs(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::abs)
}

fn exp(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::exp)
}

fn log(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.between(1, 2)?;
	let n = number_arg(ftx, 0)?;
	if n <= 0.0 {
		return Err(ftx.error("math domain error"));
	}
	match ftx.args.len() {
		1 => Ok(Value::Float(n.ln())),
		_ => Ok(Value::Float(n.log(number_arg(ftx, 1)?))),
	}
}

fn log2(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::log2)
}

fn log10(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::log10)
}

fn pow(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(2)?;
	Ok(Value::Float(number_arg(ftx, 0)?.powf(number_arg(ftx, 1)?)))
}

fn sin(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::sin)
}

fn cos(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::cos)
}

fn tan(ftx: &FunctionContext<'_>) -> Result<Value> {
	unary_float(ftx, f64::tan)
}

fn hypot(ftx: &FunctionContext<'_>) -> Result<Value> {
	ftx.exactly(2)?;
	Ok(Value::Float(number_arg(ftx, 0)?.hypot(number_arg(ftx, 1)?)))
}

static MATH: Lazy<Value> = Lazy::new(|| {
	let mut bindings: BTreeMap<&'static str, Value> = BTreeMap::new();
	bindings.insert("pi", Value::Float(std::f64::consts::PI));
	bindings.insert("e", Value::Float(std::f64::consts::E));
	bindings.insert("inf", Value::Float(f64::INFINITY));
	bindings.insert("nan", Value::Float(f64::NAN));
	bindings.insert("sqrt", builtin!("sqrt", sqrt));
	bindings.insert("floor", builtin!("floor", floor));
	bindings.insert("ceil", builtin!("ceil", ceil));
	bindings.insert("fabs", builtin!("fabs", fabs));
	bindings.insert("exp", builtin!("exp", exp));
	bindings.insert("log", builtin!("log", log));
	bindings.insert("log2", builtin!("log2", log2));
	bindings.insert("log10", builtin!("log10", log10));
	bindings.insert("pow", builtin!("pow", pow));
	bindings.insert("sin", builtin!("sin", sin));
	bindings.insert("cos", builtin!("cos", cos));
	bindings.insert("tan", builtin!("tan", tan));
	bindings.insert("hypot", builtin!("hypot", hypot));
	Value::Module(Arc::new(Module {
		name: "math",
		bindings,
	}))
});

fn data_points(ftx: &FunctionContext<'_>) -> Result<Vec<f64>> {
	ftx.exactly(1)?;
	let items = iter_values(ftx.arg(0)?)?;
	let mut out = Vec::with_capacity(items.len());
	for item in items {
		out.push(
			item
				.as_number()
				.ok_or_else(|| ftx.error(format!("cannot average {}", item.type_of())))?,
		);
	}
	Ok(out)
}

fn mean_of(data: &[f64]) -> f64 {
	data.iter().sum::<f64>() / data.len() as f64
}

fn mean(ftx: &FunctionContext<'_>) -> Result<Value> {
	let data = data_points(ftx)?;
	if data.is_empty() {
		return Err(ftx.error("mean requires at least one data point"));
	}
	Ok(Value::Float(mean_of(&data)))
}

fn median(ftx: &FunctionContext<'_>) -> Result<Value> {
	let mut data = data_points(ftx)?;
	if data.is_empty() {
		return Err(ftx.error("no median for empty data"));
	}
	data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
	let mid = data.len() / 2;
	if data.len() % 2 == 1 {
		Ok(Value::Float(data[mid]))
	} else {
		Ok(Value::Float((data[mid - 1] + data[mid]) / 2.0))
	}
}

fn sample_variance(data: &[f64]) -> f64 {
	let m = mean_of(data);
	data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (data.len() - 1) as f64
}

fn variance(ftx: &FunctionContext<'_>) -> Result<Value> {
	let data = data_points(ftx)?;
	if data.len() < 2 {
		return Err(ftx.error("variance requires at least two data points"));
	}
	Ok(Value::Float(sample_variance(&data)))
}

fn stdev(ftx: &FunctionContext<'_>) -> Result<Value> {
	let data = data_points(ftx)?;
	if data.len() < 2 {
		return Err(ftx.error("stdev requires at least two data points"));
	}
	Ok(Value::Float(sample_variance(&data).sqrt()))
}

static STATISTICS: Lazy<Value> = Lazy::new(|| {
	let mut bindings: BTreeMap<&'static str, Value> = BTreeMap::new();
	bindings.insert("mean", builtin!("mean", mean));
	bindings.insert("fmean", builtin!("fmean", mean));
	bindings.insert("median", builtin!("median", median));
	bindings.insert("variance", builtin!("variance", variance));
	bindings.insert("stdev", builtin!("stdev", stdev));
	Value::Module(Arc::new(Module {
		name: "statistics",
		bindings,
	}))
});
