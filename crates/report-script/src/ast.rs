use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
	Int(i64),
	Float(f64),
	Str(Arc<str>),
	Bool(bool),
	None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
	Neg,
	Pos,
	Not,
}

impl UnaryOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			UnaryOp::Neg => "-",
			UnaryOp::Pos => "+",
			UnaryOp::Not => "not",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	FloorDiv,
	Mod,
	Pow,
	/// `|` — union of type tags or of sets.
	Union,
}

impl BinaryOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Div => "/",
			BinaryOp::FloorDiv => "//",
			BinaryOp::Mod => "%",
			BinaryOp::Pow => "**",
			BinaryOp::Union => "|",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
	Eq,
	Ne,
	Lt,
	Le,
	Gt,
	Ge,
	In,
	NotIn,
}

impl CmpOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			CmpOp::Eq => "==",
			CmpOp::Ne => "!=",
			CmpOp::Lt => "<",
			CmpOp::Le => "<=",
			CmpOp::Gt => ">",
			CmpOp::Ge => ">=",
			CmpOp::In => "in",
			CmpOp::NotIn => "not in",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
	And,
	Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
	Literal(String),
	Field {
		value: Expr,
		/// Raw format spec after `:`, e.g. `.2f`.
		spec: Option<String>,
	},
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompKind {
	List,
	Set,
	Dict,
	Generator,
}

/// One `for target[, target…] in iter [if cond]…` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct CompClause {
	pub targets: Vec<Arc<str>>,
	pub iter: Expr,
	pub ifs: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
	pub kind: CompKind,
	/// Key expression for dict comprehensions, absent otherwise.
	pub key: Option<Expr>,
	pub value: Expr,
	pub clauses: Vec<CompClause>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
	Literal(Literal),
	FString(Vec<FStringPart>),
	Ident(Arc<str>),
	Unary {
		op: UnaryOp,
		operand: Box<Expr>,
	},
	Binary {
		op: BinaryOp,
		left: Box<Expr>,
		right: Box<Expr>,
	},
	Bool {
		op: BoolOp,
		values: Vec<Expr>,
	},
	/// Chained comparison: `left op1 e1 op2 e2 …`.
	Compare {
		left: Box<Expr>,
		ops: Vec<(CmpOp, Expr)>,
	},
	/// `body if test else orelse`
	Conditional {
		test: Box<Expr>,
		body: Box<Expr>,
		orelse: Box<Expr>,
	},
	Lambda {
		params: Vec<Arc<str>>,
		body: Arc<Expr>,
	},
	/// Walrus: `target := value`.
	Named {
		target: Arc<str>,
		value: Box<Expr>,
	},
	List(Vec<Expr>),
	Tuple(Vec<Expr>),
	Set(Vec<Expr>),
	Dict(Vec<(Expr, Expr)>),
	Comp(Box<Comprehension>),
	Attribute {
		value: Box<Expr>,
		attr: Arc<str>,
	},
	Index {
		value: Box<Expr>,
		index: Box<Expr>,
	},
	Call {
		func: Box<Expr>,
		args: Vec<Expr>,
	},
}

/// `import module [as alias]` or `from module import name [as alias], …`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportStmt {
	pub module: Arc<str>,
	/// `None` for plain `import m`; `Some` for `from m import …`.
	pub names: Option<Vec<(Arc<str>, Option<Arc<str>>)>>,
	pub alias: Option<Arc<str>>,
}

impl ImportStmt {
	/// The identifiers this statement binds into the program scope.
	pub fn bound_names(&self) -> Vec<Arc<str>> {
		match &self.names {
			Some(names) => names
				.iter()
				.map(|(name, alias)| alias.clone().unwrap_or_else(|| name.clone()))
				.collect(),
			None => vec![self.alias.clone().unwrap_or_else(|| self.module.clone())],
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
	Expr(Expr),
	Import(ImportStmt),
	/// Parsed loosely, only so the analyzer can reject it.
	Assign,
	FunctionDef(Arc<str>),
	ClassDef(Arc<str>),
}
