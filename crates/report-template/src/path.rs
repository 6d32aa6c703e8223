use std::sync::Arc;

use report_script::Value;
use serde_json_path::JsonPath;

use crate::error::Error;

/// Runs a JSONPath query against a materialized source mapping.
///
/// Exactly one match yields that value; several matches yield the list of
/// matched values, so `$.list[*].age` extracts a column. No match is an
/// error, as is a path that does not parse.
pub fn path_query(data: &serde_json::Value, path: &str) -> Result<Value, Error> {
	let compiled = JsonPath::parse(path).map_err(|e| Error::InvalidPath {
		path: path.to_string(),
		reason: e.to_string(),
	})?;
	let nodes = compiled.query(data).all();
	match nodes.as_slice() {
		[] => Err(Error::NoMatch(path.to_string())),
		[single] => Ok(Value::from_json(single)),
		many => Ok(Value::List(Arc::new(
			many.iter().map(|v| Value::from_json(v)).collect(),
		))),
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	fn data() -> serde_json::Value {
		serde_json::json!({
			"list": [{"age": 10}, {"age": 20}, {"age": 30}],
			"meta": {"count": 3}
		})
	}

	#[test]
	fn single_match() {
		assert_eq!(
			path_query(&data(), "$.meta.count").unwrap(),
			Value::Int(3)
		);
	}

	#[test]
	fn multiple_matches_collect_into_a_list() {
		assert_eq!(
			path_query(&data(), "$.list[*].age").unwrap(),
			Value::from(vec![10i64, 20, 30])
		);
	}

	#[test]
	fn no_match() {
		assert_matches!(path_query(&data(), "$.absent"), Err(Error::NoMatch(_)));
	}

	#[test]
	fn invalid_path() {
		assert_matches!(
			path_query(&data(), "$.[["),
			Err(Error::InvalidPath { .. })
		);
	}
}
