use async_trait::async_trait;
use serde::Deserialize;

/// The materialized form of a data source: one JSON object per source name.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

/// A data-source descriptor from the template. The optional `schema` is
/// carried opaquely for collaborators that validate payloads; the core
/// never interprets it.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "source_type", rename_all = "lowercase")]
pub enum SourceSpec {
	File {
		name: String,
		path: String,
		#[serde(default)]
		schema: Option<serde_json::Value>,
		#[serde(default)]
		comment: Option<String>,
	},
	Api {
		name: String,
		url: String,
		#[serde(default)]
		schema: Option<serde_json::Value>,
		#[serde(default)]
		comment: Option<String>,
	},
	Dict {
		name: String,
		data: Mapping,
		#[serde(default)]
		schema: Option<serde_json::Value>,
		#[serde(default)]
		comment: Option<String>,
	},
}

impl SourceSpec {
	pub fn name(&self) -> &str {
		match self {
			SourceSpec::File { name, .. } => name,
			SourceSpec::Api { name, .. } => name,
			SourceSpec::Dict { name, .. } => name,
		}
	}
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SourceError {
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid json: {0}")]
	Json(#[from] serde_json::Error),
	#[error("source `{0}` did not produce a JSON object")]
	NotAnObject(String),
	#[error("{0}")]
	Unsupported(String),
}

/// Boundary for materializing source descriptors into mappings. The
/// orchestrator calls this at most once per `(request, source name)`.
#[async_trait]
pub trait SourceLoader: Send + Sync {
	async fn load(&self, spec: &SourceSpec) -> Result<Mapping, SourceError>;
}

/// Loader for sources that need no network: inline `dict` data and local
/// JSON files. `api` sources are refused; callers that want them provide
/// their own [`SourceLoader`] doing the fetch.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalLoader;

#[async_trait]
impl SourceLoader for LocalLoader {
	async fn load(&self, spec: &SourceSpec) -> Result<Mapping, SourceError> {
		match spec {
			SourceSpec::Dict { data, .. } => Ok(data.clone()),
			SourceSpec::File { name, path, .. } => {
				let text = fs_err::tokio::read_to_string(path).await?;
				match serde_json::from_str(&text)? {
					serde_json::Value::Object(map) => Ok(map),
					_ => Err(SourceError::NotAnObject(name.clone())),
				}
			},
			SourceSpec::Api { name, .. } => Err(SourceError::Unsupported(format!(
				"source `{name}`: api sources require an external loader"
			))),
		}
	}
}
