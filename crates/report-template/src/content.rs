use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use report_script::Value;

use crate::error::Error;
use crate::expr::LazyExpr;
use crate::extract::extract;
use crate::variable::{EvaluatedVariable, to_env};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlTag {
	H1,
	H2,
	H3,
	H4,
	H5,
	H6,
	P,
	Em,
	Strong,
	Blockquote,
	B,
	I,
	U,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotKind {
	Line,
	Bar,
	Pie,
	Scatter,
	Histogram,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
	Table,
}

/// A plot/table column: literal numbers pass through, a string is an
/// interpolation that must evaluate to a numeric array.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum Column {
	Literal(Vec<serde_json::Number>),
	Expr(String),
}

/// An HTML fragment whose body may interpolate `${…}` expressions.
#[derive(Debug, Deserialize)]
pub struct HtmlContent {
	pub tag: HtmlTag,
	pub content: String,
	#[serde(default)]
	pub style: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct PlotContent {
	pub plot_type: PlotKind,
	pub data: IndexMap<String, Column>,
}

#[derive(Debug, Deserialize)]
pub struct TableContent {
	pub table_type: TableKind,
	pub data: IndexMap<String, Column>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Content {
	Html(HtmlContent),
	Plot(PlotContent),
	Table(TableContent),
}

/// A content item rendered against the evaluated variables, in the shape
/// the response carries.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Rendered {
	Html {
		tag: HtmlTag,
		text: String,
		style: IndexMap<String, String>,
	},
	Plot {
		plot_type: PlotKind,
		data: IndexMap<String, serde_json::Value>,
	},
	Table {
		table_type: TableKind,
		data: IndexMap<String, serde_json::Value>,
	},
}

impl Content {
	pub fn eval_result(
		&self,
		evaluated: &[EvaluatedVariable],
		imports: &[String],
	) -> Result<Rendered, Error> {
		match self {
			Content::Html(html) => html.eval_result(evaluated, imports),
			Content::Plot(plot) => Ok(Rendered::Plot {
				plot_type: plot.plot_type,
				data: eval_columns(&plot.data, evaluated, imports)?,
			}),
			Content::Table(table) => Ok(Rendered::Table {
				table_type: table.table_type,
				data: eval_columns(&table.data, evaluated, imports)?,
			}),
		}
	}
}

impl HtmlContent {
	fn eval_result(
		&self,
		evaluated: &[EvaluatedVariable],
		imports: &[String],
	) -> Result<Rendered, Error> {
		let extraction = extract(&self.content)?;
		let env = to_env(evaluated);
		let by_name: HashMap<&str, &EvaluatedVariable> = evaluated
			.iter()
			.map(|v| (v.name.as_ref(), v))
			.collect();

		let mut text = extraction.text;
		for (token, src) in &extraction.table {
			let lazy = LazyExpr::new(src.clone(), imports.to_vec())?;
			let value = lazy
				.eval(&env)
				.map_err(|e| Error::runtime(src.trim(), e))?;

			// A formatter transfers from a variable only when the rendered
			// value is of the very same runtime type as that variable's
			// value; int and float do not coerce into each other here.
			let formatted = match lazy.sole_dependency().and_then(|d| by_name.get(d)) {
				Some(dep) if dep.value.type_of() == value.type_of() => match &dep.formatter {
					Some(formatter) => formatter.format(&value)?,
					None => value.py_str(),
				},
				_ => value.py_str(),
			};
			text = text.replace(token.as_str(), &formatted);
		}

		Ok(Rendered::Html {
			tag: self.tag,
			text,
			style: self.style.clone(),
		})
	}
}

fn is_numeric_array(value: &Value) -> bool {
	match value {
		Value::List(items) | Value::Tuple(items) => items
			.iter()
			.all(|v| matches!(v, Value::Int(_) | Value::Float(_))),
		_ => false,
	}
}

fn eval_columns(
	data: &IndexMap<String, Column>,
	evaluated: &[EvaluatedVariable],
	imports: &[String],
) -> Result<IndexMap<String, serde_json::Value>, Error> {
	let env = to_env(evaluated);
	let mut out = IndexMap::with_capacity(data.len());
	for (name, column) in data {
		let rendered = match column {
			Column::Literal(numbers) => serde_json::Value::Array(
				numbers
					.iter()
					.cloned()
					.map(serde_json::Value::Number)
					.collect(),
			),
			Column::Expr(src) => {
				let extraction = extract(src)?;
				let [(_, expr)] = extraction.table.as_slice() else {
					return Err(Error::ExpectedSingleExpression(name.clone()));
				};
				let lazy = LazyExpr::new(expr.clone(), imports.to_vec())?;
				let value = lazy.eval(&env).map_err(|e| Error::runtime(name, e))?;
				if !is_numeric_array(&value) {
					return Err(Error::TypeMismatch {
						name: name.clone(),
						expected: "list[int | float]".to_string(),
						got: value.type_of().to_string(),
					});
				}
				value.json().map_err(|_| Error::JsonConvert(name.clone()))?
			},
		};
		out.insert(name.clone(), rendered);
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use assert_matches::assert_matches;

	use super::*;
	use crate::resolve::resolve_and_evaluate;
	use crate::variable::{LiteralVariable, Variable};

	fn var(name: &str, expr: &str, formatter: Option<&str>) -> Variable {
		Variable::Literal(LiteralVariable {
			name: Arc::from(name),
			expr: LazyExpr::new(expr, Vec::new()).unwrap(),
			comment: None,
			formatter: formatter.map(|f| LazyExpr::new(f, Vec::new()).unwrap()),
			expected: None,
		})
	}

	fn html(content: &str) -> Content {
		Content::Html(HtmlContent {
			tag: HtmlTag::P,
			content: content.to_string(),
			style: IndexMap::new(),
		})
	}

	#[test]
	fn html_interpolation_with_formatter() {
		let evaluated = resolve_and_evaluate(vec![var(
			"pi",
			"3.14159",
			Some("lambda v: f'{v:.2f}'"),
		)])
		.unwrap();
		let rendered = html("value is ${pi}").eval_result(&evaluated, &[]).unwrap();
		assert_eq!(rendered, Rendered::Html {
			tag: HtmlTag::P,
			text: "value is 3.14".to_string(),
			style: IndexMap::new(),
		});
	}

	#[test]
	fn formatter_skipped_when_runtime_type_differs() {
		// `x` is an int with a formatter; the interpolation produces a
		// float, so the default rendering applies.
		let evaluated =
			resolve_and_evaluate(vec![var("x", "10", Some("lambda v: 'INT:' + str(v)"))]).unwrap();
		let rendered = html("${x} and ${x / 4}").eval_result(&evaluated, &[]).unwrap();
		assert_matches!(rendered, Rendered::Html { text, .. } => {
			assert_eq!(text, "INT:10 and 2.5");
		});
	}

	#[test]
	fn formatter_skipped_when_expression_calls_functions() {
		let evaluated = resolve_and_evaluate(vec![var(
			"xs",
			"[1, 2, 3]",
			Some("lambda v: 'LIST'"),
		)])
		.unwrap();
		// `list(xs)` has the same runtime type but contains a call, so no
		// sole dependency and no formatter.
		let rendered = html("${list(xs)}").eval_result(&evaluated, &[]).unwrap();
		assert_matches!(rendered, Rendered::Html { text, .. } => {
			assert_eq!(text, "[1, 2, 3]");
		});
	}

	#[test]
	fn every_token_occurrence_is_replaced() {
		let evaluated = resolve_and_evaluate(vec![var("a", "7", None)]).unwrap();
		let rendered = html("${a} + ${a} = 14").eval_result(&evaluated, &[]).unwrap();
		assert_matches!(rendered, Rendered::Html { text, .. } => {
			assert_eq!(text, "7 + 7 = 14");
		});
	}

	#[test]
	fn plot_columns_split_literal_and_lazy() {
		let evaluated = resolve_and_evaluate(vec![var("ys", "[4, 5, 6]", None)]).unwrap();
		let content: Content = serde_json::from_value(serde_json::json!({
			"plot_type": "line",
			"data": {"x": [1, 2, 3], "y": "${ys}"},
		}))
		.unwrap();
		let rendered = content.eval_result(&evaluated, &[]).unwrap();
		assert_matches!(rendered, Rendered::Plot { plot_type: PlotKind::Line, data } => {
			assert_eq!(data["x"], serde_json::json!([1, 2, 3]));
			assert_eq!(data["y"], serde_json::json!([4, 5, 6]));
		});
	}

	#[test]
	fn table_requires_single_expression_columns() {
		let evaluated = resolve_and_evaluate(vec![var("ys", "[1]", None)]).unwrap();
		let content: Content = serde_json::from_value(serde_json::json!({
			"table_type": "table",
			"data": {"y": "${ys} ${ys}"},
		}))
		.unwrap();
		assert_matches!(
			content.eval_result(&evaluated, &[]),
			Err(Error::ExpectedSingleExpression(name)) if name == "y"
		);
	}

	#[test]
	fn lazy_column_must_be_a_numeric_array() {
		let evaluated = resolve_and_evaluate(vec![var("s", "'oops'", None)]).unwrap();
		let content: Content = serde_json::from_value(serde_json::json!({
			"plot_type": "bar",
			"data": {"y": "${s}"},
		}))
		.unwrap();
		assert_matches!(
			content.eval_result(&evaluated, &[]),
			Err(Error::TypeMismatch { name, .. }) if name == "y"
		);
	}

	#[test]
	fn content_deserializes_by_shape() {
		let html: Content =
			serde_json::from_value(serde_json::json!({"tag": "h1", "content": "hi"})).unwrap();
		assert_matches!(html, Content::Html(_));
		let plot: Content = serde_json::from_value(
			serde_json::json!({"plot_type": "pie", "data": {}}),
		)
		.unwrap();
		assert_matches!(plot, Content::Plot(_));
		let table: Content = serde_json::from_value(
			serde_json::json!({"table_type": "table", "data": {}}),
		)
		.unwrap();
		assert_matches!(table, Content::Table(_));
	}

	#[test]
	fn html_with_no_placeholders_passes_through() {
		let rendered = html("static text").eval_result(&[], &[]).unwrap();
		assert_matches!(rendered, Rendered::Html { text, .. } => {
			assert_eq!(text, "static text");
		});
	}

	#[test]
	fn interpolation_uses_template_imports() {
		let evaluated = resolve_and_evaluate(vec![var("x", "16", None)]).unwrap();
		let rendered = html("root: ${int(math.sqrt(x))}")
			.eval_result(&evaluated, &["import math".to_string()])
			.unwrap();
		assert_matches!(rendered, Rendered::Html { text, .. } => {
			assert_eq!(text, "root: 4");
		});
	}

}
