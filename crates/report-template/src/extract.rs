use xxhash_rust::xxh32::Xxh32;

use crate::error::Error;

/// Result of scanning a text for `${…}` placeholders: the canonical text
/// with each placeholder replaced by its token, and the (token, expression)
/// table in order of appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
	pub text: String,
	pub table: Vec<(String, String)>,
}

/// Derives the 8-hex-digit token standing in for a placeholder. The byte
/// offset of the `$` participates in the hash so identical expressions at
/// different positions get distinct tokens; replacement later in rendering
/// is plain string substitution and must never collide.
fn token_for(offset: usize, expr: &str) -> String {
	let mut hasher = Xxh32::new(0);
	hasher.update(&(offset as u32).to_be_bytes());
	hasher.update(expr.as_bytes());
	format!("{:08x}", hasher.digest())
}

/// Scans `text` left to right for `${…}` placeholders with balanced nested
/// braces and replaces each with a token. A `$` not followed by `{` is
/// literal text.
pub fn extract(text: &str) -> Result<Extraction, Error> {
	let mut out = text.to_string();
	let mut table = Vec::new();
	let mut pos = 0usize;

	while let Some(found) = out[pos..].find("${") {
		let dollar = pos + found;
		let body_start = dollar + 2;
		let mut depth = 0usize;
		let mut body_end = None;
		for (i, c) in out[body_start..].char_indices() {
			match c {
				'{' => depth += 1,
				'}' => {
					if depth == 0 {
						body_end = Some(body_start + i);
						break;
					}
					depth -= 1;
				},
				_ => {},
			}
		}
		let Some(body_end) = body_end else {
			return Err(Error::UnmatchedBraces(body_start));
		};

		let expr = out[body_start..body_end].to_string();
		let token = token_for(dollar, &expr);
		out.replace_range(dollar..=body_end, &token);
		pos = dollar + token.len();
		table.push((token, expr));
	}

	Ok(Extraction { text: out, table })
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[test]
	fn text_without_placeholders_is_unchanged() {
		let r = extract("plain text with $dollar but no braces").unwrap();
		assert_eq!(r.text, "plain text with $dollar but no braces");
		assert!(r.table.is_empty());
	}

	#[test]
	fn empty_text() {
		assert_eq!(extract("").unwrap(), Extraction::default());
	}

	#[test]
	fn single_placeholder() {
		let r = extract("value is ${pi}").unwrap();
		assert_eq!(r.table.len(), 1);
		let (token, expr) = &r.table[0];
		assert_eq!(expr, "pi");
		assert_eq!(token.len(), 8);
		assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
		assert_eq!(r.text, format!("value is {token}"));
	}

	#[test]
	fn nested_braces_are_balanced() {
		let r = extract("sum = ${ sum({x for x in range(3)}) }").unwrap();
		assert_eq!(r.table.len(), 1);
		assert_eq!(r.table[0].1, " sum({x for x in range(3)}) ");
	}

	#[test]
	fn every_extracted_expression_has_balanced_braces() {
		let r = extract("a ${ {1: {2: 3}} } b ${ {'x'} } c").unwrap();
		for (_, expr) in &r.table {
			let mut depth = 0i64;
			for c in expr.chars() {
				match c {
					'{' => depth += 1,
					'}' => depth -= 1,
					_ => {},
				}
				assert!(depth >= 0, "negative depth inside `{expr}`");
			}
			assert_eq!(depth, 0, "unbalanced `{expr}`");
		}
	}

	#[test]
	fn identical_expressions_get_distinct_tokens() {
		let r = extract("${x} + ${x} + ${x}").unwrap();
		assert_eq!(r.table.len(), 3);
		let tokens: Vec<&String> = r.table.iter().map(|(t, _)| t).collect();
		assert_ne!(tokens[0], tokens[1]);
		assert_ne!(tokens[1], tokens[2]);
		assert_ne!(tokens[0], tokens[2]);
	}

	#[test]
	fn round_trip_restores_the_input() {
		let input = "let ${a} and ${ b + 1 } meet ${ {k: v for k, v in m} } end";
		let r = extract(input).unwrap();
		let mut restored = r.text.clone();
		for (token, expr) in &r.table {
			restored = restored.replace(token, &format!("${{{expr}}}"));
		}
		assert_eq!(restored, input);
	}

	#[test]
	fn multiple_placeholders_keep_order() {
		let r = extract("${first} then ${second}").unwrap();
		let exprs: Vec<&str> = r.table.iter().map(|(_, e)| e.as_str()).collect();
		assert_eq!(exprs, vec!["first", "second"]);
	}

	#[test]
	fn unmatched_braces() {
		assert_matches!(extract("broken ${ never closes"), Err(Error::UnmatchedBraces(_)));
		assert_matches!(
			extract("nested ${ {unclosed }"),
			Err(Error::UnmatchedBraces(_))
		);
	}

	#[test]
	fn literal_dollar_without_brace() {
		let r = extract("cost: $5 and ${price}").unwrap();
		assert!(r.text.starts_with("cost: $5 and "));
		assert_eq!(r.table[0].1, "price");
	}

	#[test]
	fn tokens_are_deterministic() {
		let a = extract("x ${expr} y").unwrap();
		let b = extract("x ${expr} y").unwrap();
		assert_eq!(a.table[0].0, b.table[0].0);
	}
}
