//! Parse tree for Patito source text.
//!
//! The grammar is deliberately small: it mirrors the surface syntax in
//! `programa ID; <vars?> <funcs*> main <body> end` directly rather than
//! going through an intermediate concrete-syntax tree. Every node carries
//! the line it started on, for diagnostics.

use patito_core::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub name: String,
    pub globals: Vec<VarDecl>,
    pub functions: Vec<FunctionDecl>,
    pub main_body: Block,
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub names: Vec<String>,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub locals: Vec<VarDecl>,
    pub body: Block,
    pub span: Span,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign { target: String, value: Expr, span: Span },
    Call { name: String, args: Vec<Expr>, span: Span },
    If { cond: Expr, then_body: Block, else_body: Option<Block>, span: Span },
    While { cond: Expr, body: Block, span: Span },
    Print { items: Vec<PrintItem>, span: Span },
    Return { value: Expr, span: Span },
}

#[derive(Debug, Clone)]
pub enum PrintItem {
    Str(String),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    Minus,
    Mul,
    Div,
    Gt,
    Lt,
    Neq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(i64, Span),
    FloatLit(f64, Span),
    Var(String, Span),
    Unary(UnaryOp, Box<Expr>, Span),
    Binary(BinOp, Box<Expr>, Box<Expr>, Span),
    Call { name: String, args: Vec<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(_, s)
            | Expr::FloatLit(_, s)
            | Expr::Var(_, s)
            | Expr::Unary(_, _, s)
            | Expr::Binary(_, _, _, s)
            | Expr::Call { span: s, .. } => *s,
        }
    }
}
