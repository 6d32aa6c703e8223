use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::content::{Content, Rendered};
use crate::error::Error;
use crate::expr::{LazyExpr, LazyExprSpec, parse_type_spec};
use crate::resolve::resolve_and_evaluate;
use crate::source::{SourceLoader, SourceSpec};
use crate::variable::{LiteralVariable, PathVariable, Variable};

/// The template document driving one evaluation. `imports` is the
/// template-wide prelude applied to every expression built from it.
#[derive(Debug, Deserialize)]
pub struct TemplateSpec {
	#[serde(default)]
	pub imports: Vec<String>,
	#[serde(default)]
	pub data_sources: Vec<SourceSpec>,
	#[serde(default)]
	pub variables: Vec<VariableSpec>,
	#[serde(default)]
	pub content: Vec<Content>,
}

/// Wire shape of one variable entry: an `expr` field makes it a literal
/// variable, a `source` field a path variable.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum VariableSpec {
	Path {
		name: String,
		source: String,
		json_path: String,
		#[serde(default)]
		comment: Option<String>,
		#[serde(default)]
		preprocessor: Option<LazyExprSpec>,
		#[serde(default, alias = "verifier")]
		validator: Option<LazyExprSpec>,
		#[serde(default)]
		formatter: Option<LazyExprSpec>,
		#[serde(default, rename = "t")]
		expected: Option<String>,
	},
	Literal {
		name: String,
		expr: LazyExprSpec,
		#[serde(default)]
		comment: Option<String>,
		#[serde(default)]
		formatter: Option<LazyExprSpec>,
		#[serde(default, rename = "t")]
		expected: Option<String>,
	},
}

/// The response document: evaluated variables in evaluation order, then
/// the rendered content items.
#[derive(Debug, Serialize)]
pub struct TemplateOutput {
	pub variables: Vec<serde_json::Value>,
	pub content: Vec<Rendered>,
}

/// Evaluates a template payload end to end: materialize sources, build
/// variables and contents, resolve + evaluate, render.
pub async fn evaluate_template(
	payload: serde_json::Value,
	loader: &dyn SourceLoader,
) -> Result<TemplateOutput, Error> {
	let spec: TemplateSpec =
		serde_json::from_value(payload).map_err(|e| Error::InvalidTemplate(e.to_string()))?;
	evaluate(spec, loader).await
}

pub async fn evaluate(
	spec: TemplateSpec,
	loader: &dyn SourceLoader,
) -> Result<TemplateOutput, Error> {
	if spec.variables.is_empty() {
		return Err(Error::InvalidTemplate("no variables provided".to_string()));
	}
	tracing::debug!(
		variables = spec.variables.len(),
		contents = spec.content.len(),
		sources = spec.data_sources.len(),
		"evaluating template"
	);

	let imports = spec.imports;
	let sources: HashMap<&str, &SourceSpec> =
		spec.data_sources.iter().map(|s| (s.name(), s)).collect();
	// Each source is fetched at most once per request, however many
	// variables read from it.
	let mut loaded: HashMap<String, Arc<serde_json::Value>> = HashMap::new();

	let mut variables = Vec::with_capacity(spec.variables.len());
	for entry in &spec.variables {
		variables.push(build_variable(entry, &imports, &sources, &mut loaded, loader).await?);
	}

	let evaluated = resolve_and_evaluate(variables)?;

	let mut content = Vec::with_capacity(spec.content.len());
	for item in &spec.content {
		content.push(item.eval_result(&evaluated, &imports)?);
	}

	let variables = evaluated
		.iter()
		.map(|v| {
			let value = v
				.value
				.json()
				.map_err(|_| Error::JsonConvert(v.name.to_string()))?;
			let mut entry = serde_json::Map::with_capacity(1);
			entry.insert(v.name.to_string(), value);
			Ok(serde_json::Value::Object(entry))
		})
		.collect::<Result<Vec<_>, Error>>()?;

	Ok(TemplateOutput { variables, content })
}

async fn build_variable(
	entry: &VariableSpec,
	imports: &[String],
	sources: &HashMap<&str, &SourceSpec>,
	loaded: &mut HashMap<String, Arc<serde_json::Value>>,
	loader: &dyn SourceLoader,
) -> Result<Variable, Error> {
	let compile_opt = |spec: &Option<LazyExprSpec>| -> Result<Option<LazyExpr>, Error> {
		spec.as_ref().map(|s| s.compile(imports)).transpose()
	};
	match entry {
		VariableSpec::Literal {
			name,
			expr,
			comment,
			formatter,
			expected,
		} => Ok(Variable::Literal(LiteralVariable {
			name: Arc::from(name.as_str()),
			expr: expr.compile(imports)?,
			comment: comment.clone(),
			formatter: compile_opt(formatter)?,
			expected: expected
				.as_ref()
				.map(|t| parse_type_spec(name, t, imports))
				.transpose()?,
		})),
		VariableSpec::Path {
			name,
			source,
			json_path,
			comment,
			preprocessor,
			validator,
			formatter,
			expected,
		} => {
			let spec = sources
				.get(source.as_str())
				.ok_or_else(|| Error::UnknownSource(source.clone()))?;
			let data = match loaded.get(source) {
				Some(data) => data.clone(),
				None => {
					let mapping = loader.load(spec).await?;
					let data = Arc::new(serde_json::Value::Object(mapping));
					loaded.insert(source.clone(), data.clone());
					data
				},
			};
			Ok(Variable::Path(PathVariable {
				name: Arc::from(name.as_str()),
				source: data,
				json_path: json_path.clone(),
				comment: comment.clone(),
				preprocessor: compile_opt(preprocessor)?,
				validator: compile_opt(validator)?,
				formatter: compile_opt(formatter)?,
				expected: expected
					.as_ref()
					.map(|t| parse_type_spec(name, t, imports))
					.transpose()?,
			}))
		},
	}
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
