use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// A parse failure with the byte offset where it was observed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} (at offset {offset})")]
pub struct ParseError {
	pub message: String,
	pub offset: usize,
}

impl ParseError {
	pub fn new(message: impl Into<String>, offset: usize) -> Self {
		ParseError {
			message: message.into(),
			offset,
		}
	}
}

/// Raw f-string segment. Field sources are re-parsed by the parser.
#[derive(Clone, Debug, PartialEq)]
pub enum RawFPart {
	Literal(String),
	Field { src: String, spec: Option<String> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	FString(Vec<RawFPart>),
	Ident(Arc<str>),

	// Keywords
	Lambda,
	If,
	Else,
	For,
	In,
	Not,
	And,
	Or,
	True,
	False,
	None,
	Import,
	From,
	As,
	Def,
	Class,

	Plus,
	Minus,
	Star,
	DoubleStar,
	Slash,
	DoubleSlash,
	Percent,
	Pipe,
	EqEq,
	NotEq,
	Lt,
	Le,
	Gt,
	Ge,
	Assign,
	Walrus,
	LParen,
	RParen,
	LBracket,
	RBracket,
	LBrace,
	RBrace,
	Comma,
	Colon,
	Dot,
	Semi,
	Newline,
}

impl Display for Tok {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Tok::Int(v) => write!(f, "{v}"),
			Tok::Float(v) => write!(f, "{v}"),
			Tok::Str(s) => write!(f, "{s:?}"),
			Tok::FString(_) => write!(f, "f-string"),
			Tok::Ident(s) => write!(f, "{s}"),
			Tok::Lambda => write!(f, "lambda"),
			Tok::If => write!(f, "if"),
			Tok::Else => write!(f, "else"),
			Tok::For => write!(f, "for"),
			Tok::In => write!(f, "in"),
			Tok::Not => write!(f, "not"),
			Tok::And => write!(f, "and"),
			Tok::Or => write!(f, "or"),
			Tok::True => write!(f, "True"),
			Tok::False => write!(f, "False"),
			Tok::None => write!(f, "None"),
			Tok::Import => write!(f, "import"),
			Tok::From => write!(f, "from"),
			Tok::As => write!(f, "as"),
			Tok::Def => write!(f, "def"),
			Tok::Class => write!(f, "class"),
			Tok::Plus => write!(f, "+"),
			Tok::Minus => write!(f, "-"),
			Tok::Star => write!(f, "*"),
			Tok::DoubleStar => write!(f, "**"),
			Tok::Slash => write!(f, "/"),
			Tok::DoubleSlash => write!(f, "//"),
			Tok::Percent => write!(f, "%"),
			Tok::Pipe => write!(f, "|"),
			Tok::EqEq => write!(f, "=="),
			Tok::NotEq => write!(f, "!="),
			Tok::Lt => write!(f, "<"),
			Tok::Le => write!(f, "<="),
			Tok::Gt => write!(f, ">"),
			Tok::Ge => write!(f, ">="),
			Tok::Assign => write!(f, "="),
			Tok::Walrus => write!(f, ":="),
			Tok::LParen => write!(f, "("),
			Tok::RParen => write!(f, ")"),
			Tok::LBracket => write!(f, "["),
			Tok::RBracket => write!(f, "]"),
			Tok::LBrace => write!(f, "{{"),
			Tok::RBrace => write!(f, "}}"),
			Tok::Comma => write!(f, ","),
			Tok::Colon => write!(f, ":"),
			Tok::Dot => write!(f, "."),
			Tok::Semi => write!(f, ";"),
			Tok::Newline => write!(f, "newline"),
		}
	}
}

#[derive(Clone, Debug)]
pub struct Spanned {
	pub tok: Tok,
	pub offset: usize,
}

fn keyword(ident: &str) -> Option<Tok> {
	Some(match ident {
		"lambda" => Tok::Lambda,
		"if" => Tok::If,
		"else" => Tok::Else,
		"for" => Tok::For,
		"in" => Tok::In,
		"not" => Tok::Not,
		"and" => Tok::And,
		"or" => Tok::Or,
		"True" => Tok::True,
		"False" => Tok::False,
		"None" => Tok::None,
		"import" => Tok::Import,
		"from" => Tok::From,
		"as" => Tok::As,
		"def" => Tok::Def,
		"class" => Tok::Class,
		_ => return Option::None,
	})
}

struct Lexer<'a> {
	src: &'a str,
	pos: usize,
	/// Open `(`/`[`/`{` count; newlines inside brackets are insignificant.
	depth: usize,
	out: Vec<Spanned>,
}

/// Tokenize a statement list. Newlines and semicolons at bracket depth zero
/// become statement separators; everything else is skipped as whitespace.
pub fn tokenize(src: &str) -> Result<Vec<Spanned>, ParseError> {
	let mut lexer = Lexer {
		src,
		pos: 0,
		depth: 0,
		out: Vec::new(),
	};
	lexer.run()?;
	Ok(lexer.out)
}

impl<'a> Lexer<'a> {
	fn peek(&self) -> Option<char> {
		self.src[self.pos..].chars().next()
	}

	fn peek2(&self) -> Option<char> {
		let mut it = self.src[self.pos..].chars();
		it.next();
		it.next()
	}

	fn bump(&mut self) -> Option<char> {
		let c = self.peek()?;
		self.pos += c.len_utf8();
		Some(c)
	}

	fn push(&mut self, tok: Tok, offset: usize) {
		self.out.push(Spanned { tok, offset });
	}

	fn error(&self, message: impl Into<String>, offset: usize) -> ParseError {
		ParseError::new(message, offset)
	}

	fn run(&mut self) -> Result<(), ParseError> {
		while let Some(c) = self.peek() {
			let start = self.pos;
			match c {
				' ' | '\t' | '\r' => {
					self.bump();
				},
				'\\' => {
					// Line continuation.
					self.bump();
					if self.peek() == Some('\r') {
						self.bump();
					}
					if self.peek() == Some('\n') {
						self.bump();
					} else {
						return Err(self.error("unexpected character after line continuation", start));
					}
				},
				'\n' => {
					self.bump();
					if self.depth == 0 {
						self.push(Tok::Newline, start);
					}
				},
				'#' => {
					while let Some(c) = self.peek() {
						if c == '\n' {
							break;
						}
						self.bump();
					}
				},
				'0'..='9' => self.number(start)?,
				'.' => {
					if matches!(self.peek2(), Some('0'..='9')) {
						self.number(start)?;
					} else {
						self.bump();
						self.push(Tok::Dot, start);
					}
				},
				'\'' | '"' => {
					let s = self.string(c)?;
					self.push(Tok::Str(Arc::from(s)), start);
				},
				c if c == 'f' && matches!(self.peek2(), Some('\'' | '"')) => {
					self.bump();
					let quote = self.peek().expect("peeked above");
					let parts = self.fstring(quote)?;
					self.push(Tok::FString(parts), start);
				},
				c if c.is_alphabetic() || c == '_' => {
					while let Some(c) = self.peek() {
						if c.is_alphanumeric() || c == '_' {
							self.bump();
						} else {
							break;
						}
					}
					let ident = &self.src[start..self.pos];
					match keyword(ident) {
						Some(tok) => self.push(tok, start),
						None => self.push(Tok::Ident(Arc::from(ident)), start),
					}
				},
				_ => self.operator(start)?,
			}
		}
		Ok(())
	}

	fn operator(&mut self, start: usize) -> Result<(), ParseError> {
		let c = self.bump().expect("caller peeked");
		let next = self.peek();
		let tok = match (c, next) {
			('*', Some('*')) => {
				self.bump();
				Tok::DoubleStar
			},
			('*', _) => Tok::Star,
			('/', Some('/')) => {
				self.bump();
				Tok::DoubleSlash
			},
			('/', _) => Tok::Slash,
			('=', Some('=')) => {
				self.bump();
				Tok::EqEq
			},
			('=', _) => Tok::Assign,
			('!', Some('=')) => {
				self.bump();
				Tok::NotEq
			},
			('!', _) => return Err(self.error("unexpected character `!`", start)),
			('<', Some('=')) => {
				self.bump();
				Tok::Le
			},
			('<', _) => Tok::Lt,
			('>', Some('=')) => {
				self.bump();
				Tok::Ge
			},
			('>', _) => Tok::Gt,
			(':', Some('=')) => {
				self.bump();
				Tok::Walrus
			},
			(':', _) => Tok::Colon,
			('+', _) => Tok::Plus,
			('-', _) => Tok::Minus,
			('%', _) => Tok::Percent,
			('|', _) => Tok::Pipe,
			('(', _) => {
				self.depth += 1;
				Tok::LParen
			},
			(')', _) => {
				self.depth = self.depth.saturating_sub(1);
				Tok::RParen
			},
			('[', _) => {
				self.depth += 1;
				Tok::LBracket
			},
			(']', _) => {
				self.depth = self.depth.saturating_sub(1);
				Tok::RBracket
			},
			('{', _) => {
				self.depth += 1;
				Tok::LBrace
			},
			('}', _) => {
				self.depth = self.depth.saturating_sub(1);
				Tok::RBrace
			},
			(',', _) => Tok::Comma,
			('.', _) => Tok::Dot,
			(';', _) => Tok::Semi,
			_ => return Err(self.error(format!("unexpected character `{c}`"), start)),
		};
		self.push(tok, start);
		Ok(())
	}

	fn number(&mut self, start: usize) -> Result<(), ParseError> {
		let mut is_float = false;
		while let Some(c) = self.peek() {
			match c {
				'0'..='9' | '_' => {
					self.bump();
				},
				'.' if !is_float && matches!(self.peek2(), Some('0'..='9')) => {
					is_float = true;
					self.bump();
				},
				'.' if !is_float && self.pos == start => {
					// Leading `.5` form.
					is_float = true;
					self.bump();
				},
				'e' | 'E' => {
					is_float = true;
					self.bump();
					if matches!(self.peek(), Some('+' | '-')) {
						self.bump();
					}
					if !matches!(self.peek(), Some('0'..='9')) {
						return Err(self.error("malformed float exponent", self.pos));
					}
				},
				_ => break,
			}
		}
		let text: String = self.src[start..self.pos].replace('_', "");
		if is_float {
			let v: f64 = text
				.parse()
				.map_err(|_| self.error(format!("invalid float literal `{text}`"), start))?;
			self.push(Tok::Float(v), start);
		} else {
			let v: i64 = text
				.parse()
				.map_err(|_| self.error(format!("invalid int literal `{text}`"), start))?;
			self.push(Tok::Int(v), start);
		}
		Ok(())
	}

	fn escape(&mut self, offset: usize) -> Result<char, ParseError> {
		let c = self
			.bump()
			.ok_or_else(|| self.error("unterminated escape", offset))?;
		Ok(match c {
			'n' => '\n',
			't' => '\t',
			'r' => '\r',
			'0' => '\0',
			'\\' => '\\',
			'\'' => '\'',
			'"' => '"',
			// Unknown escapes pass the character through verbatim.
			other => other,
		})
	}

	fn string(&mut self, quote: char) -> Result<String, ParseError> {
		let start = self.pos;
		self.bump();
		let mut out = String::new();
		loop {
			let offset = self.pos;
			match self.bump() {
				Some(c) if c == quote => return Ok(out),
				Some('\\') => out.push(self.escape(offset)?),
				Some('\n') | None => return Err(self.error("unterminated string literal", start)),
				Some(c) => out.push(c),
			}
		}
	}

	fn fstring(&mut self, quote: char) -> Result<Vec<RawFPart>, ParseError> {
		let start = self.pos;
		self.bump();
		let mut parts = Vec::new();
		let mut literal = String::new();
		loop {
			let offset = self.pos;
			match self.bump() {
				Some(c) if c == quote => {
					if !literal.is_empty() {
						parts.push(RawFPart::Literal(literal));
					}
					return Ok(parts);
				},
				Some('\\') => literal.push(self.escape(offset)?),
				Some('{') if self.peek() == Some('{') => {
					self.bump();
					literal.push('{');
				},
				Some('}') if self.peek() == Some('}') => {
					self.bump();
					literal.push('}');
				},
				Some('}') => return Err(self.error("single `}` is not allowed in f-string", offset)),
				Some('{') => {
					if !literal.is_empty() {
						parts.push(RawFPart::Literal(std::mem::take(&mut literal)));
					}
					parts.push(self.fstring_field(offset)?);
				},
				Some('\n') | None => return Err(self.error("unterminated f-string literal", start)),
				Some(c) => literal.push(c),
			}
		}
	}

	/// Scan an f-string replacement field body up to its matching `}`. The
	/// first top-level `:` separates the expression from the format spec.
	fn fstring_field(&mut self, start: usize) -> Result<RawFPart, ParseError> {
		let mut depth = 0usize;
		let mut src = String::new();
		let mut spec: Option<String> = None;
		loop {
			let offset = self.pos;
			let c = self
				.bump()
				.ok_or_else(|| self.error("unterminated f-string field", start))?;
			match c {
				'}' if depth == 0 => {
					if src.trim().is_empty() {
						return Err(self.error("empty f-string field", start));
					}
					return Ok(RawFPart::Field { src, spec });
				},
				'{' | '(' | '[' => {
					depth += 1;
					self.field_push(&mut src, &mut spec, c);
				},
				'}' | ')' | ']' => {
					depth = depth.saturating_sub(1);
					self.field_push(&mut src, &mut spec, c);
				},
				':' if depth == 0 && spec.is_none() => {
					spec = Some(String::new());
				},
				'\'' | '"' if spec.is_none() => {
					// Re-scan the quoted run verbatim so the recursive parse
					// sees the original literal.
					src.push(c);
					loop {
						let c2 = self
							.bump()
							.ok_or_else(|| self.error("unterminated string in f-string field", offset))?;
						src.push(c2);
						if c2 == '\\' {
							if let Some(esc) = self.bump() {
								src.push(esc);
							}
						} else if c2 == c {
							break;
						}
					}
				},
				c => self.field_push(&mut src, &mut spec, c),
			}
		}
	}

	fn field_push(&self, src: &mut String, spec: &mut Option<String>, c: char) {
		match spec {
			Some(s) => s.push(c),
			None => src.push(c),
		}
	}
}
