//! Recursive-descent parser with precedence climbing over the Tulpar
//! token stream. Entry point is [`Parser::parse`], which always returns
//! a `Node::Program` — on a mismatch the parser reports a diagnostic,
//! advances one token, and keeps going, so the result may be partial
//! but parsing itself never aborts.

pub mod ast;
mod expr;
mod stmt;

pub use ast::{BinOp, Node, TypeName, UnOp};

#[cfg(test)]
mod edge_cases;

use tulpar_lex::{Lexer, Token};
use tulpar_util::{DiagnosticBuilder, Handler, Span};

struct TokenInfo {
    token: Token,
    start: usize,
    end: usize,
    line: u32,
    column: u32,
}

pub struct Parser<'a> {
    tokens: Vec<TokenInfo>,
    pos: usize,
    handler: &'a Handler,
}

impl<'a> Parser<'a> {
    pub fn new(source: &str, handler: &'a Handler) -> Self {
        let mut lexer = Lexer::new(source, handler);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token();
            let info = TokenInfo {
                start: lexer.token_start(),
                end: lexer.position(),
                line: lexer.token_start_line(),
                column: lexer.token_start_column(),
                token: token.clone(),
            };
            let is_eof = info.token == Token::Eof;
            tokens.push(info);
            if is_eof {
                break;
            }
        }

        Self { tokens, pos: 0, handler }
    }

    /// Parses the whole token stream, recovering from errors rather
    /// than aborting.
    pub fn parse(&mut self) -> Node {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            let before = self.pos;
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => {
                    if self.pos == before {
                        self.advance();
                    }
                },
            }
        }
        Node::Program(stmts)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn peek(&self, ahead: usize) -> &Token {
        let idx = (self.pos + ahead).min(self.tokens.len() - 1);
        &self.tokens[idx].token
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].token.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, expected: &Token) -> bool {
        self.current() == expected
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes `expected` or emits a diagnostic naming it.
    fn expect(&mut self, expected: Token, what: &str) -> bool {
        if self.match_token(&expected) {
            true
        } else {
            self.error(&format!("expected {}", what));
            false
        }
    }

    fn error(&self, message: &str) {
        let info = &self.tokens[self.pos];
        let span = Span::new(info.start, info.end, info.line, info.column);
        DiagnosticBuilder::error(message.to_string()).span(span).emit(self.handler);
    }
}
