//! Recursive-descent parser, precedence-climbing over the three
//! expression tiers `{MUL,DIV} > {PLUS,MINUS} > {GT,LT,NEQ}` (§4.6.1, §6).

use patito_core::Type;

use crate::ast::*;
use crate::error::ParseError;
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(source)?;
        Ok(Parser { tokens, pos: 0 })
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(&TokenKind::Programa)?;
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Semi)?;

        let globals = self.parse_var_decls()?;

        let mut functions = Vec::new();
        while self.check_func_type_start() {
            functions.push(self.parse_function()?);
        }

        self.expect(&TokenKind::Main)?;
        let main_body = self.parse_block()?;
        self.expect(&TokenKind::End)?;

        Ok(Program { name, globals, functions, main_body })
    }

    fn check_func_type_start(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Void | TokenKind::Int | TokenKind::Float)
    }

    /// Zero or more `var a, b: type;` declarations.
    fn parse_var_decls(&mut self) -> Result<Vec<VarDecl>, ParseError> {
        let mut decls = Vec::new();
        while matches!(self.peek().kind, TokenKind::Var) {
            self.advance();
            loop {
                let span = self.span();
                let mut names = vec![self.expect_ident()?];
                while matches!(self.peek().kind, TokenKind::Comma) {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                self.expect(&TokenKind::Semi)?;
                decls.push(VarDecl { names, ty, span });

                // `var a:int; b:float;` chains further groups without a
                // second `var` keyword -- stop once the next tokens don't
                // look like another "ident(,ident)*:type;" group.
                if !self.looks_like_var_group() {
                    break;
                }
            }
        }
        Ok(decls)
    }

    /// Lookahead: does the token stream starting here match
    /// `ID (, ID)* :`? Used to decide whether a bare `var` block
    /// continues with another comma-less declaration group.
    fn looks_like_var_group(&self) -> bool {
        let mut i = self.pos;
        if !matches!(self.tokens[i].kind, TokenKind::Ident(_)) {
            return false;
        }
        i += 1;
        while matches!(self.tokens[i].kind, TokenKind::Comma) {
            i += 1;
            if !matches!(self.tokens[i].kind, TokenKind::Ident(_)) {
                return false;
            }
            i += 1;
        }
        matches!(self.tokens[i].kind, TokenKind::Colon)
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Int => {
                self.advance();
                Ok(Type::Int)
            }
            TokenKind::Float => {
                self.advance();
                Ok(Type::Float)
            }
            other => Err(self.unexpected("'int' or 'float'", &other)),
        }
    }

    fn parse_function(&mut self) -> Result<FunctionDecl, ParseError> {
        let span = self.span();
        let return_type = match self.peek().kind.clone() {
            TokenKind::Void => {
                self.advance();
                Type::Void
            }
            TokenKind::Int => {
                self.advance();
                Type::Int
            }
            TokenKind::Float => {
                self.advance();
                Type::Float
            }
            other => return Err(self.unexpected("a return type", &other)),
        };
        let name = self.expect_ident()?;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !matches!(self.peek().kind, TokenKind::RParen) {
            loop {
                let p_span = self.span();
                let p_name = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let p_ty = self.parse_type()?;
                params.push(Param { name: p_name, ty: p_ty, span: p_span });
                if matches!(self.peek().kind, TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBracket)?;
        let locals = self.parse_var_decls()?;
        let body = self.parse_block()?;
        self.expect(&TokenKind::RBracket)?;
        self.expect(&TokenKind::Semi)?;

        Ok(FunctionDecl { name, return_type, params, locals, body, span })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.peek().kind, TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let span = self.span();
        match self.peek().kind.clone() {
            TokenKind::If => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                let then_body = self.parse_block()?;
                let else_body = if matches!(self.peek().kind, TokenKind::Else) {
                    self.advance();
                    Some(self.parse_block()?)
                } else {
                    None
                };
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::If { cond, then_body, else_body, span })
            }
            TokenKind::While => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let cond = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                self.expect(&TokenKind::Do)?;
                let body = self.parse_block()?;
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::While { cond, body, span })
            }
            TokenKind::Print => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let mut items = Vec::new();
                loop {
                    items.push(self.parse_print_item()?);
                    if matches!(self.peek().kind, TokenKind::Comma) {
                        self.advance();
                        continue;
                    }
                    break;
                }
                self.expect(&TokenKind::RParen)?;
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::Print { items, span })
            }
            TokenKind::Return => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let value = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                self.expect(&TokenKind::Semi)?;
                Ok(Stmt::Return { value, span })
            }
            TokenKind::Ident(name) => {
                self.advance();
                match self.peek().kind.clone() {
                    TokenKind::Assign => {
                        self.advance();
                        let value = self.parse_expr()?;
                        self.expect(&TokenKind::Semi)?;
                        Ok(Stmt::Assign { target: name, value, span })
                    }
                    TokenKind::LParen => {
                        self.advance();
                        let args = self.parse_args()?;
                        self.expect(&TokenKind::RParen)?;
                        self.expect(&TokenKind::Semi)?;
                        Ok(Stmt::Call { name, args, span })
                    }
                    other => Err(self.unexpected("'=' or '('", &other)),
                }
            }
            other => Err(self.unexpected("a statement", &other)),
        }
    }

    fn parse_print_item(&mut self) -> Result<PrintItem, ParseError> {
        if let TokenKind::StringLit(s) = self.peek().kind.clone() {
            self.advance();
            Ok(PrintItem::Str(s))
        } else {
            Ok(PrintItem::Expr(self.parse_expr()?))
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek().kind, TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if matches!(self.peek().kind, TokenKind::Comma) {
                self.advance();
                continue;
            }
            break;
        }
        Ok(args)
    }

    /// Top tier: a single optional relational comparison over two
    /// additive expressions.
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek().kind {
            TokenKind::Gt => Some(BinOp::Gt),
            TokenKind::Lt => Some(BinOp::Lt),
            TokenKind::Neq => Some(BinOp::Neq),
            _ => None,
        };
        if let Some(op) = op {
            let span = self.span();
            self.advance();
            let rhs = self.parse_additive()?;
            Ok(Expr::Binary(op, Box::new(lhs), Box::new(rhs), span))
        } else {
            Ok(lhs)
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinOp::Plus,
                TokenKind::Minus => BinOp::Minus,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let span = self.span();
        match self.peek().kind {
            TokenKind::Plus => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Plus, Box::new(self.parse_unary()?), span))
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary(UnaryOp::Minus, Box::new(self.parse_unary()?), span))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let span = self.span();
        match self.peek().kind.clone() {
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Expr::IntLit(n, span))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Expr::FloatLit(n, span))
            }
            TokenKind::LParen => {
                self.advance();
                let e = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(e)
            }
            TokenKind::Ident(name) => {
                self.advance();
                if matches!(self.peek().kind, TokenKind::LParen) {
                    self.advance();
                    let args = self.parse_args()?;
                    self.expect(&TokenKind::RParen)?;
                    Ok(Expr::Call { name, args, span })
                } else {
                    Ok(Expr::Var(name, span))
                }
            }
            other => Err(self.unexpected("an expression", &other)),
        }
    }

    // --- token-stream plumbing ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn span(&self) -> Span {
        let t = self.peek();
        Span { line: t.line, column: t.column }
    }

    fn advance(&mut self) -> &Token {
        let t = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        t
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if &self.peek().kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{kind}"), &self.peek().kind.clone()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Ident(s) => {
                self.advance();
                Ok(s)
            }
            other => Err(self.unexpected("an identifier", &other)),
        }
    }

    fn unexpected(&self, expected: &str, found: &TokenKind) -> ParseError {
        if matches!(found, TokenKind::Eof) {
            ParseError::UnexpectedEof { expected: expected.to_string() }
        } else {
            let t = self.peek();
            ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: found.to_string(),
                line: t.line,
                column: t.column,
            }
        }
    }
}

pub fn parse(source: &str) -> Result<Program, ParseError> {
    Parser::new(source)?.parse_program()
}
