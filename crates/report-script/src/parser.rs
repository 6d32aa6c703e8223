use std::sync::Arc;

use crate::ast::{
	BinaryOp, BoolOp, CmpOp, CompClause, CompKind, Comprehension, Expr, FStringPart, ImportStmt,
	Literal, Stmt, UnaryOp,
};
use crate::lexer::{ParseError, RawFPart, Spanned, Tok, tokenize};

/// Parse a newline/semicolon separated statement list.
pub fn parse_statements(src: &str) -> Result<Vec<Stmt>, ParseError> {
	let toks = tokenize(src)?;
	let mut parser = Parser {
		toks,
		pos: 0,
		end: src.len(),
	};
	parser.statements()
}

/// Parse a single expression, rejecting trailing input. Used for f-string
/// replacement fields and other embedded sources.
pub fn parse_expression(src: &str) -> Result<Expr, ParseError> {
	let toks = tokenize(src)?;
	let mut parser = Parser {
		toks,
		pos: 0,
		end: src.len(),
	};
	parser.skip_separators();
	let expr = parser.expression()?;
	parser.skip_separators();
	match parser.peek() {
		None => Ok(expr),
		Some(_) => Err(parser.unexpected("end of expression")),
	}
}

struct Parser {
	toks: Vec<Spanned>,
	pos: usize,
	end: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Tok> {
		self.toks.get(self.pos).map(|s| &s.tok)
	}

	fn peek_at(&self, n: usize) -> Option<&Tok> {
		self.toks.get(self.pos + n).map(|s| &s.tok)
	}

	fn offset(&self) -> usize {
		self.toks.get(self.pos).map(|s| s.offset).unwrap_or(self.end)
	}

	fn bump(&mut self) -> Option<Tok> {
		let t = self.toks.get(self.pos).map(|s| s.tok.clone());
		if t.is_some() {
			self.pos += 1;
		}
		t
	}

	fn eat(&mut self, tok: &Tok) -> bool {
		if self.peek() == Some(tok) {
			self.pos += 1;
			true
		} else {
			false
		}
	}

	fn expect(&mut self, tok: &Tok) -> Result<(), ParseError> {
		if self.eat(tok) {
			Ok(())
		} else {
			Err(self.unexpected(&format!("`{tok}`")))
		}
	}

	fn unexpected(&self, wanted: &str) -> ParseError {
		match self.peek() {
			Some(tok) => ParseError::new(format!("expected {wanted}, found `{tok}`"), self.offset()),
			None => ParseError::new(format!("expected {wanted}, found end of input"), self.offset()),
		}
	}

	fn ident(&mut self) -> Result<Arc<str>, ParseError> {
		match self.peek() {
			Some(Tok::Ident(name)) => {
				let name = name.clone();
				self.pos += 1;
				Ok(name)
			},
			_ => Err(self.unexpected("identifier")),
		}
	}

	fn skip_separators(&mut self) {
		while matches!(self.peek(), Some(Tok::Newline | Tok::Semi)) {
			self.pos += 1;
		}
	}

	fn statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
		let mut stmts = Vec::new();
		self.skip_separators();
		while self.peek().is_some() {
			stmts.push(self.statement()?);
			match self.peek() {
				None => break,
				Some(Tok::Newline | Tok::Semi) => self.skip_separators(),
				Some(_) => return Err(self.unexpected("end of statement")),
			}
		}
		Ok(stmts)
	}

	fn statement(&mut self) -> Result<Stmt, ParseError> {
		match self.peek() {
			Some(Tok::Import) => {
				self.pos += 1;
				let module = self.dotted_name()?;
				let alias = if self.eat(&Tok::As) {
					Some(self.ident()?)
				} else {
					None
				};
				Ok(Stmt::Import(ImportStmt {
					module,
					names: None,
					alias,
				}))
			},
			Some(Tok::From) => {
				self.pos += 1;
				let module = self.dotted_name()?;
				self.expect(&Tok::Import)?;
				let mut names = Vec::new();
				loop {
					let name = self.ident()?;
					let alias = if self.eat(&Tok::As) {
						Some(self.ident()?)
					} else {
						None
					};
					names.push((name, alias));
					if !self.eat(&Tok::Comma) {
						break;
					}
				}
				Ok(Stmt::Import(ImportStmt {
					module,
					names: Some(names),
					alias: None,
				}))
			},
			Some(Tok::Def) => {
				self.pos += 1;
				let name = match self.peek() {
					Some(Tok::Ident(name)) => {
						let name = name.clone();
						self.pos += 1;
						name
					},
					_ => Arc::from(""),
				};
				// Definition bodies span indented lines we do not model; the
				// analyzer rejects the statement wholesale.
				self.pos = self.toks.len();
				Ok(Stmt::FunctionDef(name))
			},
			Some(Tok::Class) => {
				self.pos += 1;
				let name = match self.peek() {
					Some(Tok::Ident(name)) => {
						let name = name.clone();
						self.pos += 1;
						name
					},
					_ => Arc::from(""),
				};
				self.pos = self.toks.len();
				Ok(Stmt::ClassDef(name))
			},
			_ => {
				let expr = self.expression()?;
				if self.eat(&Tok::Assign) {
					// Consume the right-hand side so the statement is well
					// delimited, then let the analyzer reject it.
					let _ = self.expression()?;
					Ok(Stmt::Assign)
				} else {
					Ok(Stmt::Expr(expr))
				}
			},
		}
	}

	fn dotted_name(&mut self) -> Result<Arc<str>, ParseError> {
		let mut name = self.ident()?.to_string();
		while self.eat(&Tok::Dot) {
			name.push('.');
			name.push_str(&self.ident()?);
		}
		Ok(Arc::from(name.as_str()))
	}

	fn expression(&mut self) -> Result<Expr, ParseError> {
		if self.peek() == Some(&Tok::Lambda) {
			return self.lambda();
		}
		self.ternary()
	}

	fn lambda(&mut self) -> Result<Expr, ParseError> {
		self.expect(&Tok::Lambda)?;
		let mut params = Vec::new();
		if self.peek() != Some(&Tok::Colon) {
			loop {
				params.push(self.ident()?);
				if !self.eat(&Tok::Comma) {
					break;
				}
			}
		}
		self.expect(&Tok::Colon)?;
		let body = self.expression()?;
		Ok(Expr::Lambda {
			params,
			body: Arc::new(body),
		})
	}

	fn ternary(&mut self) -> Result<Expr, ParseError> {
		let body = self.or_expr()?;
		if self.eat(&Tok::If) {
			let test = self.or_expr()?;
			self.expect(&Tok::Else)?;
			let orelse = self.expression()?;
			return Ok(Expr::Conditional {
				test: Box::new(test),
				body: Box::new(body),
				orelse: Box::new(orelse),
			});
		}
		Ok(body)
	}

	fn or_expr(&mut self) -> Result<Expr, ParseError> {
		let first = self.and_expr()?;
		if self.peek() != Some(&Tok::Or) {
			return Ok(first);
		}
		let mut values = vec![first];
		while self.eat(&Tok::Or) {
			values.push(self.and_expr()?);
		}
		Ok(Expr::Bool {
			op: BoolOp::Or,
			values,
		})
	}

	fn and_expr(&mut self) -> Result<Expr, ParseError> {
		let first = self.not_expr()?;
		if self.peek() != Some(&Tok::And) {
			return Ok(first);
		}
		let mut values = vec![first];
		while self.eat(&Tok::And) {
			values.push(self.not_expr()?);
		}
		Ok(Expr::Bool {
			op: BoolOp::And,
			values,
		})
	}

	fn not_expr(&mut self) -> Result<Expr, ParseError> {
		if self.eat(&Tok::Not) {
			let operand = self.not_expr()?;
			return Ok(Expr::Unary {
				op: UnaryOp::Not,
				operand: Box::new(operand),
			});
		}
		self.comparison()
	}

	fn cmp_op(&mut self) -> Option<CmpOp> {
		let op = match self.peek() {
			Some(Tok::EqEq) => CmpOp::Eq,
			Some(Tok::NotEq) => CmpOp::Ne,
			Some(Tok::Lt) => CmpOp::Lt,
			Some(Tok::Le) => CmpOp::Le,
			Some(Tok::Gt) => CmpOp::Gt,
			Some(Tok::Ge) => CmpOp::Ge,
			Some(Tok::In) => CmpOp::In,
			Some(Tok::Not) if self.peek_at(1) == Some(&Tok::In) => {
				self.pos += 2;
				return Some(CmpOp::NotIn);
			},
			_ => return None,
		};
		self.pos += 1;
		Some(op)
	}

	fn comparison(&mut self) -> Result<Expr, ParseError> {
		let left = self.union_expr()?;
		let mut ops = Vec::new();
		while let Some(op) = self.cmp_op() {
			ops.push((op, self.union_expr()?));
		}
		if ops.is_empty() {
			return Ok(left);
		}
		Ok(Expr::Compare {
			left: Box::new(left),
			ops,
		})
	}

	fn union_expr(&mut self) -> Result<Expr, ParseError> {
		let mut left = self.arith()?;
		while self.eat(&Tok::Pipe) {
			let right = self.arith()?;
			left = Expr::Binary {
				op: BinaryOp::Union,
				left: Box::new(left),
				right: Box::new(right),
			};
		}
		Ok(left)
	}

	fn arith(&mut self) -> Result<Expr, ParseError> {
		let mut left = self.term()?;
		loop {
			let op = match self.peek() {
				Some(Tok::Plus) => BinaryOp::Add,
				Some(Tok::Minus) => BinaryOp::Sub,
				_ => break,
			};
			self.pos += 1;
			let right = self.term()?;
			left = Expr::Binary {
				op,
				left: Box::new(left),
				right: Box::new(right),
			};
		}
		Ok(left)
	}

	fn term(&mut self) -> Result<Expr, ParseError> {
		let mut left = self.factor()?;
		loop {
			let op = match self.peek() {
				Some(Tok::Star) => BinaryOp::Mul,
				Some(Tok::Slash) => BinaryOp::Div,
				Some(Tok::DoubleSlash) => BinaryOp::FloorDiv,
				Some(Tok::Percent) => BinaryOp::Mod,
				_ => break,
			};
			self.pos += 1;
			let right = self.factor()?;
			left = Expr::Binary {
				op,
				left: Box::new(left),
				right: Box::new(right),
			};
		}
		Ok(left)
	}

	fn factor(&mut self) -> Result<Expr, ParseError> {
		let op = match self.peek() {
			Some(Tok::Minus) => Some(UnaryOp::Neg),
			Some(Tok::Plus) => Some(UnaryOp::Pos),
			_ => None,
		};
		if let Some(op) = op {
			self.pos += 1;
			let operand = self.factor()?;
			return Ok(Expr::Unary {
				op,
				operand: Box::new(operand),
			});
		}
		self.power()
	}

	fn power(&mut self) -> Result<Expr, ParseError> {
		let base = self.postfix()?;
		if self.eat(&Tok::DoubleStar) {
			// Right-associative; the right side may carry a unary sign.
			let exp = self.factor()?;
			return Ok(Expr::Binary {
				op: BinaryOp::Pow,
				left: Box::new(base),
				right: Box::new(exp),
			});
		}
		Ok(base)
	}

	fn postfix(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.atom()?;
		loop {
			match self.peek() {
				Some(Tok::Dot) => {
					self.pos += 1;
					let attr = self.ident()?;
					expr = Expr::Attribute {
						value: Box::new(expr),
						attr,
					};
				},
				Some(Tok::LBracket) => {
					self.pos += 1;
					let index = self.expression()?;
					self.expect(&Tok::RBracket)?;
					expr = Expr::Index {
						value: Box::new(expr),
						index: Box::new(index),
					};
				},
				Some(Tok::LParen) => {
					self.pos += 1;
					let args = self.call_args()?;
					expr = Expr::Call {
						func: Box::new(expr),
						args,
					};
				},
				_ => break,
			}
		}
		Ok(expr)
	}

	fn call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
		let mut args = Vec::new();
		if self.eat(&Tok::RParen) {
			return Ok(args);
		}
		loop {
			let arg = self.expression()?;
			if self.peek() == Some(&Tok::Assign) {
				return Err(ParseError::new(
					"keyword arguments are not supported",
					self.offset(),
				));
			}
			// A bare generator may be the sole argument: `sum(x for x in xs)`.
			if args.is_empty() && self.peek() == Some(&Tok::For) {
				let clauses = self.comp_clauses()?;
				self.expect(&Tok::RParen)?;
				return Ok(vec![Expr::Comp(Box::new(Comprehension {
					kind: CompKind::Generator,
					key: None,
					value: arg,
					clauses,
				}))]);
			}
			args.push(arg);
			if self.eat(&Tok::Comma) {
				if self.eat(&Tok::RParen) {
					return Ok(args);
				}
				continue;
			}
			self.expect(&Tok::RParen)?;
			return Ok(args);
		}
	}

	fn atom(&mut self) -> Result<Expr, ParseError> {
		match self.peek() {
			Some(Tok::Int(_)) => {
				let Some(Tok::Int(v)) = self.bump() else {
					unreachable!()
				};
				Ok(Expr::Literal(Literal::Int(v)))
			},
			Some(Tok::Float(_)) => {
				let Some(Tok::Float(v)) = self.bump() else {
					unreachable!()
				};
				Ok(Expr::Literal(Literal::Float(v)))
			},
			Some(Tok::Str(_)) => {
				let Some(Tok::Str(s)) = self.bump() else {
					unreachable!()
				};
				Ok(Expr::Literal(Literal::Str(s)))
			},
			Some(Tok::True) => {
				self.pos += 1;
				Ok(Expr::Literal(Literal::Bool(true)))
			},
			Some(Tok::False) => {
				self.pos += 1;
				Ok(Expr::Literal(Literal::Bool(false)))
			},
			Some(Tok::None) => {
				self.pos += 1;
				Ok(Expr::Literal(Literal::None))
			},
			Some(Tok::FString(_)) => {
				let Some(Tok::FString(parts)) = self.bump() else {
					unreachable!()
				};
				let mut out = Vec::with_capacity(parts.len());
				for part in parts {
					match part {
						RawFPart::Literal(s) => out.push(FStringPart::Literal(s)),
						RawFPart::Field { src, spec } => {
							let value = parse_expression(&src)?;
							out.push(FStringPart::Field { value, spec });
						},
					}
				}
				Ok(Expr::FString(out))
			},
			Some(Tok::Ident(_)) => {
				let name = self.ident()?;
				if self.eat(&Tok::Walrus) {
					let value = self.expression()?;
					return Ok(Expr::Named {
						target: name,
						value: Box::new(value),
					});
				}
				Ok(Expr::Ident(name))
			},
			Some(Tok::LParen) => self.paren_atom(),
			Some(Tok::LBracket) => self.bracket_atom(),
			Some(Tok::LBrace) => self.brace_atom(),
			Some(Tok::Lambda) => self.lambda(),
			_ => Err(self.unexpected("expression")),
		}
	}

	fn paren_atom(&mut self) -> Result<Expr, ParseError> {
		self.expect(&Tok::LParen)?;
		if self.eat(&Tok::RParen) {
			return Ok(Expr::Tuple(Vec::new()));
		}
		let first = self.expression()?;
		if self.peek() == Some(&Tok::For) {
			let clauses = self.comp_clauses()?;
			self.expect(&Tok::RParen)?;
			return Ok(Expr::Comp(Box::new(Comprehension {
				kind: CompKind::Generator,
				key: None,
				value: first,
				clauses,
			})));
		}
		if self.peek() == Some(&Tok::Comma) {
			let mut items = vec![first];
			while self.eat(&Tok::Comma) {
				if self.peek() == Some(&Tok::RParen) {
					break;
				}
				items.push(self.expression()?);
			}
			self.expect(&Tok::RParen)?;
			return Ok(Expr::Tuple(items));
		}
		self.expect(&Tok::RParen)?;
		Ok(first)
	}

	fn bracket_atom(&mut self) -> Result<Expr, ParseError> {
		self.expect(&Tok::LBracket)?;
		if self.eat(&Tok::RBracket) {
			return Ok(Expr::List(Vec::new()));
		}
		let first = self.expression()?;
		if self.peek() == Some(&Tok::For) {
			let clauses = self.comp_clauses()?;
			self.expect(&Tok::RBracket)?;
			return Ok(Expr::Comp(Box::new(Comprehension {
				kind: CompKind::List,
				key: None,
				value: first,
				clauses,
			})));
		}
		let mut items = vec![first];
		while self.eat(&Tok::Comma) {
			if self.peek() == Some(&Tok::RBracket) {
				break;
			}
			items.push(self.expression()?);
		}
		self.expect(&Tok::RBracket)?;
		Ok(Expr::List(items))
	}

	fn brace_atom(&mut self) -> Result<Expr, ParseError> {
		self.expect(&Tok::LBrace)?;
		if self.eat(&Tok::RBrace) {
			return Ok(Expr::Dict(Vec::new()));
		}
		let first = self.expression()?;
		if self.eat(&Tok::Colon) {
			let value = self.expression()?;
			if self.peek() == Some(&Tok::For) {
				let clauses = self.comp_clauses()?;
				self.expect(&Tok::RBrace)?;
				return Ok(Expr::Comp(Box::new(Comprehension {
					kind: CompKind::Dict,
					key: Some(first),
					value,
					clauses,
				})));
			}
			let mut entries = vec![(first, value)];
			while self.eat(&Tok::Comma) {
				if self.peek() == Some(&Tok::RBrace) {
					break;
				}
				let k = self.expression()?;
				self.expect(&Tok::Colon)?;
				let v = self.expression()?;
				entries.push((k, v));
			}
			self.expect(&Tok::RBrace)?;
			return Ok(Expr::Dict(entries));
		}
		if self.peek() == Some(&Tok::For) {
			let clauses = self.comp_clauses()?;
			self.expect(&Tok::RBrace)?;
			return Ok(Expr::Comp(Box::new(Comprehension {
				kind: CompKind::Set,
				key: None,
				value: first,
				clauses,
			})));
		}
		let mut items = vec![first];
		while self.eat(&Tok::Comma) {
			if self.peek() == Some(&Tok::RBrace) {
				break;
			}
			items.push(self.expression()?);
		}
		self.expect(&Tok::RBrace)?;
		Ok(Expr::Set(items))
	}

	fn comp_clauses(&mut self) -> Result<Vec<CompClause>, ParseError> {
		let mut clauses = Vec::new();
		while self.eat(&Tok::For) {
			let targets = self.comp_targets()?;
			self.expect(&Tok::In)?;
			// The iterable and filters are `or`-level expressions; a ternary
			// here would swallow the `if` filter keyword.
			let iter = self.or_expr()?;
			let mut ifs = Vec::new();
			while self.eat(&Tok::If) {
				ifs.push(self.or_expr()?);
			}
			clauses.push(CompClause { targets, iter, ifs });
		}
		Ok(clauses)
	}

	fn comp_targets(&mut self) -> Result<Vec<Arc<str>>, ParseError> {
		if self.eat(&Tok::LParen) {
			let mut targets = Vec::new();
			loop {
				targets.push(self.ident()?);
				if !self.eat(&Tok::Comma) {
					break;
				}
			}
			self.expect(&Tok::RParen)?;
			return Ok(targets);
		}
		let mut targets = vec![self.ident()?];
		while self.peek() == Some(&Tok::Comma) {
			// Only consume the comma when another bare target follows.
			match self.peek_at(1) {
				Some(Tok::Ident(_)) => {
					self.pos += 1;
					targets.push(self.ident()?);
				},
				_ => break,
			}
		}
		Ok(targets)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn expr(src: &str) -> Expr {
		parse_expression(src).unwrap()
	}

	#[test]
	fn arithmetic_precedence() {
		assert_eq!(
			expr("1 + 2 * 3"),
			Expr::Binary {
				op: BinaryOp::Add,
				left: Box::new(Expr::Literal(Literal::Int(1))),
				right: Box::new(Expr::Binary {
					op: BinaryOp::Mul,
					left: Box::new(Expr::Literal(Literal::Int(2))),
					right: Box::new(Expr::Literal(Literal::Int(3))),
				}),
			}
		);
	}

	#[test]
	fn power_is_right_associative() {
		let e = expr("2 ** 3 ** 2");
		match e {
			Expr::Binary {
				op: BinaryOp::Pow,
				right,
				..
			} => assert!(matches!(
				*right,
				Expr::Binary {
					op: BinaryOp::Pow,
					..
				}
			)),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn unary_minus_binds_looser_than_power() {
		let e = expr("-2 ** 2");
		assert!(matches!(
			e,
			Expr::Unary {
				op: UnaryOp::Neg,
				..
			}
		));
	}

	#[test]
	fn lambda_with_params() {
		match expr("lambda a, b: a + b") {
			Expr::Lambda { params, .. } => {
				assert_eq!(params.len(), 2);
			},
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn list_comprehension() {
		match expr("[x * 2 for x in xs if x > 0]") {
			Expr::Comp(comp) => {
				assert_eq!(comp.kind, CompKind::List);
				assert_eq!(comp.clauses.len(), 1);
				assert_eq!(comp.clauses[0].ifs.len(), 1);
			},
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn dict_comprehension() {
		match expr("{k: v * 2 for (k, v) in pairs}") {
			Expr::Comp(comp) => {
				assert_eq!(comp.kind, CompKind::Dict);
				assert!(comp.key.is_some());
				assert_eq!(comp.clauses[0].targets.len(), 2);
			},
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn set_display_vs_dict_display() {
		assert!(matches!(expr("{1, 2}"), Expr::Set(items) if items.len() == 2));
		assert!(matches!(expr("{1: 2}"), Expr::Dict(entries) if entries.len() == 1));
		assert!(matches!(expr("{}"), Expr::Dict(entries) if entries.is_empty()));
	}

	#[test]
	fn walrus() {
		match expr("(total := 1 + 2)") {
			Expr::Named { target, .. } => assert_eq!(&*target, "total"),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn chained_comparison() {
		match expr("1 < x <= 10") {
			Expr::Compare { ops, .. } => assert_eq!(ops.len(), 2),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn not_in() {
		match expr("x not in xs") {
			Expr::Compare { ops, .. } => assert_eq!(ops[0].0, CmpOp::NotIn),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn conditional_expression() {
		assert!(matches!(
			expr("a if cond else b"),
			Expr::Conditional { .. }
		));
	}

	#[test]
	fn statements_split_on_newline_and_semicolon() {
		let stmts = parse_statements("1 + 1\n2 + 2; 3").unwrap();
		assert_eq!(stmts.len(), 3);
	}

	#[test]
	fn assignment_is_parsed_loosely() {
		let stmts = parse_statements("x = 5").unwrap();
		assert_eq!(stmts, vec![Stmt::Assign]);
	}

	#[test]
	fn import_forms() {
		let stmts = parse_statements("import math\nfrom math import sqrt as s, floor").unwrap();
		assert_eq!(stmts.len(), 2);
		match &stmts[1] {
			Stmt::Import(imp) => {
				assert_eq!(&*imp.module, "math");
				let names = imp.names.as_ref().unwrap();
				assert_eq!(names.len(), 2);
				assert_eq!(names[0].1.as_deref(), Some("s"));
			},
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn keyword_arguments_are_rejected() {
		assert!(parse_expression("f(x=1)").is_err());
	}

	#[test]
	fn fstring_parses_fields() {
		match expr("f'{v:.2f} and {w}'") {
			Expr::FString(parts) => {
				assert_eq!(parts.len(), 3);
				assert!(matches!(&parts[0], FStringPart::Field { spec: Some(s), .. } if s == ".2f"));
				assert!(matches!(&parts[1], FStringPart::Literal(s) if s == " and "));
			},
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn generator_expression() {
		match expr("(x for x in xs)") {
			Expr::Comp(comp) => assert_eq!(comp.kind, CompKind::Generator),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn bare_generator_as_sole_call_argument() {
		match expr("sum(x for x in xs)") {
			Expr::Call { args, .. } => {
				assert_eq!(args.len(), 1);
				assert!(matches!(&args[0], Expr::Comp(c) if c.kind == CompKind::Generator));
			},
			other => panic!("unexpected {other:?}"),
		}
	}
}
