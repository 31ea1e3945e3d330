//! Expression parsing: precedence climbing over the fixed operator
//! ladder, lowest to highest:
//!
//! logical-or < logical-and < comparison < additive < multiplicative
//! < unary < primary
//!
//! Every level is left-associative except unary, which recurses on
//! itself (right-associative, as there's only ever one unary operand).

use crate::ast::{BinOp, Node, UnOp};
use crate::Parser;
use tulpar_lex::Token;
use tulpar_util::Symbol;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> Option<Node> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Option<Node> {
        let mut left = self.parse_and()?;
        while self.match_token(&Token::OrOr) {
            let right = self.parse_and()?;
            left = Node::BinOp { op: BinOp::Or, left: Box::new(left), right: Box::new(right) };
        }
        Some(left)
    }

    fn parse_and(&mut self) -> Option<Node> {
        let mut left = self.parse_comparison()?;
        while self.match_token(&Token::AndAnd) {
            let right = self.parse_comparison()?;
            left = Node::BinOp { op: BinOp::And, left: Box::new(left), right: Box::new(right) };
        }
        Some(left)
    }

    fn parse_comparison(&mut self) -> Option<Node> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current() {
                Token::EqEq => BinOp::EqEq,
                Token::NotEq => BinOp::NotEq,
                Token::Lt => BinOp::Lt,
                Token::Gt => BinOp::Gt,
                Token::LtEq => BinOp::LtEq,
                Token::GtEq => BinOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = Node::BinOp { op, left: Box::new(left), right: Box::new(right) };
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Node> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Node::BinOp { op, left: Box::new(left), right: Box::new(right) };
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinOp::Mul,
                Token::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Node::BinOp { op, left: Box::new(left), right: Box::new(right) };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Node> {
        let op = match self.current() {
            Token::Bang => Some(UnOp::Not),
            Token::Minus => Some(UnOp::Neg),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                let operand = self.parse_unary()?;
                Some(Node::UnaryOp { op, operand: Box::new(operand) })
            },
            None => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Option<Node> {
        match self.current().clone() {
            Token::Int(value) => {
                self.advance();
                Some(Node::IntLit(value))
            },
            Token::Float(value) => {
                self.advance();
                Some(Node::FloatLit(value))
            },
            Token::Str(value) => {
                self.advance();
                Some(Node::StringLit(value))
            },
            Token::True => {
                self.advance();
                Some(Node::BoolLit(true))
            },
            Token::False => {
                self.advance();
                Some(Node::BoolLit(false))
            },
            Token::Ident(name) => {
                self.advance();
                self.parse_ident_trailer(name)
            },
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen, "')'");
                Some(inner)
            },
            Token::LBracket => self.parse_array_lit(),
            Token::LBrace => self.parse_object_lit(),
            _ => {
                self.error("expected an expression");
                None
            },
        }
    }

    /// An identifier may be followed by a call's `(args)` or by a chain
    /// of `[index]` accesses; bare it's just a reference.
    fn parse_ident_trailer(&mut self, name: Symbol) -> Option<Node> {
        if self.match_token(&Token::LParen) {
            let mut args = Vec::new();
            if !self.check(&Token::RParen) {
                loop {
                    args.push(self.parse_expr()?);
                    if !self.match_token(&Token::Comma) {
                        break;
                    }
                }
            }
            self.expect(Token::RParen, "')'");
            return Some(Node::Call { name, args });
        }

        let mut node = Node::Ident(name);
        while self.match_token(&Token::LBracket) {
            let index = self.parse_expr()?;
            self.expect(Token::RBracket, "']'");
            node = Node::IndexAccess { target: Box::new(node), index: Box::new(index) };
        }
        Some(node)
    }

    fn parse_array_lit(&mut self) -> Option<Node> {
        self.expect(Token::LBracket, "'['");
        let mut elements = Vec::new();
        if !self.check(&Token::RBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RBracket, "']'");
        Some(Node::ArrayLit(elements))
    }

    /// Object literals only ever have string keys.
    fn parse_object_lit(&mut self) -> Option<Node> {
        self.expect(Token::LBrace, "'{'");
        let mut pairs = Vec::new();
        if !self.check(&Token::RBrace) {
            loop {
                let key = match self.current().clone() {
                    Token::Str(key) => {
                        self.advance();
                        key
                    },
                    _ => {
                        self.error("expected a string key");
                        return None;
                    },
                };
                self.expect(Token::Colon, "':'");
                let value = self.parse_expr()?;
                pairs.push((key, value));
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RBrace, "'}'");
        Some(Node::ObjectLit(pairs))
    }
}
