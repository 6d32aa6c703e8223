use report_script::{CompileError, ExecutionError};

use crate::source::SourceError;

/// Everything that can go wrong between receiving a template and returning
/// its evaluation. Parse/safety failures surface before any evaluation;
/// a single variable failure aborts the whole request.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
	#[error("unmatched braces at offset {0}")]
	UnmatchedBraces(usize),
	#[error("{0}")]
	Compile(#[from] CompileError),

	#[error("unbound variables across template: {0:?}")]
	Unbound(Vec<String>),
	#[error("cyclic dependency among variables {0:?}")]
	CyclicDependency(Vec<String>),
	#[error("duplicated variable name: {0}")]
	DuplicateName(String),
	#[error("column `{0}`: expected exactly one interpolated expression")]
	ExpectedSingleExpression(String),

	#[error("evaluating `{name}`: {source}")]
	Runtime {
		name: String,
		#[source]
		source: ExecutionError,
	},
	#[error("verification failed for `{name}`: {reason}")]
	VerifyFailed { name: String, reason: String },
	#[error("type mismatch for `{name}`: expected {expected}, got {got}")]
	TypeMismatch {
		name: String,
		expected: String,
		got: String,
	},
	#[error("formatter for `{0}` is not callable")]
	InvalidFormatter(String),
	#[error("preprocessing `{name}` failed: {source}")]
	PreprocessFailed {
		name: String,
		#[source]
		source: ExecutionError,
	},
	#[error("no match for json path `{0}`")]
	NoMatch(String),
	#[error("invalid json path `{path}`: {reason}")]
	InvalidPath { path: String, reason: String },

	#[error("failed to evaluate variable `{name}`: {source}")]
	EvaluateFailed {
		name: String,
		#[source]
		source: Box<Error>,
	},

	#[error("data source: {0}")]
	SourceLoad(#[from] SourceError),
	#[error("unknown data source `{0}`")]
	UnknownSource(String),
	#[error("invalid template: {0}")]
	InvalidTemplate(String),
	#[error("expected type of `{name}` must evaluate to a type, got `{got}`")]
	InvalidTypeExpression { name: String, got: String },
	#[error("value of `{0}` is not representable as JSON")]
	JsonConvert(String),
}

impl Error {
	pub(crate) fn runtime(name: impl Into<String>, source: ExecutionError) -> Error {
		Error::Runtime {
			name: name.into(),
			source,
		}
	}
}
