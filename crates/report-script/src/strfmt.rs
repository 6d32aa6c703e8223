use crate::ExecutionError;
use crate::objects::Value;

/// Applies a format spec from an f-string replacement field.
///
/// Supported subset: `[0][width][.precision][dfes%]`. A bare precision on a
/// number formats like `f`. Numbers right-align within `width`, strings
/// left-align, and a leading `0` zero-fills numbers.
pub fn format_value(value: &Value, spec: &str) -> Result<String, ExecutionError> {
	let parsed = FormatSpec::parse(spec)
		.ok_or_else(|| ExecutionError::InvalidFormatSpec(spec.to_string()))?;
	parsed.apply(value, spec)
}

struct FormatSpec {
	zero: bool,
	width: Option<usize>,
	precision: Option<usize>,
	kind: Option<char>,
}

impl FormatSpec {
	fn parse(spec: &str) -> Option<FormatSpec> {
		let mut rest = spec;
		let mut kind = None;
		if let Some(last) = rest.chars().last() {
			if matches!(last, 'd' | 'f' | 'e' | 's' | '%') {
				kind = Some(last);
				rest = &rest[..rest.len() - last.len_utf8()];
			} else if last.is_alphabetic() {
				return None;
			}
		}
		let (rest, precision) = match rest.split_once('.') {
			Some((head, prec)) => {
				if prec.is_empty() || !prec.bytes().all(|b| b.is_ascii_digit()) {
					return None;
				}
				(head, Some(prec.parse().ok()?))
			},
			None => (rest, None),
		};
		let zero = rest.starts_with('0') && rest.len() > 1;
		let digits = rest.strip_prefix('0').unwrap_or(rest);
		let width = if digits.is_empty() {
			None
		} else if digits.bytes().all(|b| b.is_ascii_digit()) {
			Some(digits.parse().ok()?)
		} else {
			return None;
		};
		Some(FormatSpec {
			zero,
			width,
			precision,
			kind,
		})
	}

	fn apply(&self, value: &Value, spec: &str) -> Result<String, ExecutionError> {
		let body = match self.kind {
			Some('d') => match value {
				Value::Int(v) => v.to_string(),
				Value::Bool(v) => (*v as i64).to_string(),
				other => {
					return Err(ExecutionError::FunctionError {
						function: "format".to_string(),
						message: format!("unknown format code 'd' for {}", other.type_of()),
					});
				},
			},
			Some('f') => {
				let n = self.number(value, spec)?;
				format!("{:.*}", self.precision.unwrap_or(6), n)
			},
			Some('e') => {
				let n = self.number(value, spec)?;
				scientific(n, self.precision.unwrap_or(6))
			},
			Some('%') => {
				let n = self.number(value, spec)?;
				format!("{:.*}%", self.precision.unwrap_or(6), n * 100.0)
			},
			Some('s') => value.py_str(),
			Some(other) => return Err(ExecutionError::InvalidFormatSpec(other.to_string())),
			None => match (value, self.precision) {
				(Value::Float(v), Some(p)) => format!("{v:.p$}"),
				(Value::Int(v), Some(p)) => format!("{:.*}", p, *v as f64),
				_ => value.py_str(),
			},
		};
		Ok(self.pad(body, value))
	}

	fn number(&self, value: &Value, spec: &str) -> Result<f64, ExecutionError> {
		value
			.as_number()
			.ok_or_else(|| ExecutionError::FunctionError {
				function: "format".to_string(),
				message: format!("cannot format {} with spec `{spec}`", value.type_of()),
			})
	}

	fn pad(&self, body: String, value: &Value) -> String {
		let Some(width) = self.width else { return body };
		if body.chars().count() >= width {
			return body;
		}
		let fill = width - body.chars().count();
		if matches!(value, Value::String(_)) && self.kind != Some('d') {
			let mut out = body;
			out.extend(std::iter::repeat_n(' ', fill));
			out
		} else if self.zero {
			let (sign, digits) = match body.strip_prefix('-') {
				Some(rest) => ("-", rest),
				None => ("", body.as_str()),
			};
			format!("{sign}{}{digits}", "0".repeat(fill))
		} else {
			format!("{}{body}", " ".repeat(fill))
		}
	}
}

/// Renders `1234.5` as `1.234500e+03`: the exponent keeps an explicit
/// sign and at least two digits, unlike the bare `1.2345e3` of `{:e}`.
fn scientific(n: f64, precision: usize) -> String {
	let formatted = format!("{:.*e}", precision, n);
	match formatted.split_once('e') {
		Some((mantissa, exp)) => {
			let exp: i32 = exp.parse().unwrap_or(0);
			format!("{mantissa}e{:+03}", exp)
		},
		None => formatted,
	}
}
