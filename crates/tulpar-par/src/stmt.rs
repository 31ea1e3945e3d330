//! Statement parsing: declarations, functions, control flow, the
//! assignment family, and blocks.

use crate::ast::{BinOp, Node, TypeName};
use crate::Parser;
use tulpar_lex::Token;
use tulpar_util::Symbol;

impl<'a> Parser<'a> {
    pub(crate) fn parse_stmt(&mut self) -> Option<Node> {
        if let Some(declared_type) = TypeName::from_token(self.current()) {
            return self.parse_var_decl(declared_type);
        }

        match self.current().clone() {
            Token::Func => self.parse_func_decl(),
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::For => self.parse_for(),
            Token::Return => self.parse_return(),
            Token::Break => {
                self.advance();
                self.expect(Token::Semicolon, "';'");
                Some(Node::Break)
            },
            Token::Continue => {
                self.advance();
                self.expect(Token::Semicolon, "';'");
                Some(Node::Continue)
            },
            Token::LBrace => self.parse_block(),
            Token::Import => self.parse_import(),
            Token::Try => self.parse_try_catch(),
            Token::Throw => self.parse_throw(),
            Token::Ident(name) => {
                self.advance();
                self.parse_assignment_family(name)
            },
            _ => {
                self.error("expected a statement");
                None
            },
        }
    }

    fn parse_var_decl(&mut self, declared_type: TypeName) -> Option<Node> {
        self.advance();
        let name = self.expect_ident()?;
        let init = if self.match_token(&Token::Eq) {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        self.expect(Token::Semicolon, "';'");
        Some(Node::VarDecl { declared_type, name, init })
    }

    fn parse_func_decl(&mut self) -> Option<Node> {
        self.advance(); // 'func'
        let name = self.expect_ident()?;
        self.expect(Token::LParen, "'('");

        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let declared_type = TypeName::from_token(self.current()).or_else(|| {
                    self.error("expected a parameter type");
                    None
                })?;
                self.advance();
                let param_name = self.expect_ident()?;
                params.push(Node::VarDecl { declared_type, name: param_name, init: None });
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'");

        let body = self.parse_block()?;
        Some(Node::FuncDecl { name, params, body: Box::new(body) })
    }

    fn parse_if(&mut self) -> Option<Node> {
        self.advance(); // 'if'
        self.expect(Token::LParen, "'('");
        let cond = self.parse_expr()?;
        self.expect(Token::RParen, "')'");
        let then = self.parse_block()?;
        let else_ = if self.match_token(&Token::Else) {
            if self.check(&Token::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block()?))
            }
        } else {
            None
        };
        Some(Node::If { cond: Box::new(cond), then: Box::new(then), else_ })
    }

    fn parse_while(&mut self) -> Option<Node> {
        self.advance(); // 'while'
        self.expect(Token::LParen, "'('");
        let cond = self.parse_expr()?;
        self.expect(Token::RParen, "')'");
        let body = self.parse_block()?;
        Some(Node::While { cond: Box::new(cond), body: Box::new(body) })
    }

    /// Disambiguated by two-token lookahead: `for '(' ident 'in'` is a
    /// for-in; anything else is a classic three-clause for.
    fn parse_for(&mut self) -> Option<Node> {
        self.advance(); // 'for'
        self.expect(Token::LParen, "'('");

        if matches!(self.current(), Token::Ident(_)) && matches!(self.peek(1), Token::In) {
            let name = self.expect_ident()?;
            self.advance(); // 'in'
            let iterable = self.parse_expr()?;
            self.expect(Token::RParen, "')'");
            let body = self.parse_block()?;
            return Some(Node::ForIn {
                name,
                iterable: Box::new(iterable),
                body: Box::new(body),
            });
        }

        let init = if self.check(&Token::Semicolon) {
            None
        } else if let Some(declared_type) = TypeName::from_token(self.current()) {
            Some(Box::new(self.parse_var_decl(declared_type)?))
        } else {
            let name = self.expect_ident()?;
            let stmt = self.parse_assignment_family(name)?;
            Some(Box::new(stmt))
        };
        if init.is_some() {
            // parse_var_decl / parse_assignment_family already consumed the ';'
        } else {
            self.expect(Token::Semicolon, "';'");
        }

        let cond = if self.check(&Token::Semicolon) { None } else { Some(self.parse_expr()?) };
        self.expect(Token::Semicolon, "';'");

        let step = if self.check(&Token::RParen) { None } else { Some(self.parse_for_step()?) };
        self.expect(Token::RParen, "')'");

        let body = self.parse_block()?;
        Some(Node::For {
            init,
            cond: cond.map(Box::new),
            step: step.map(Box::new),
            body: Box::new(body),
        })
    }

    /// The step clause of a classic `for` has no terminating `;`, unlike
    /// an ordinary statement, so it can't reuse `parse_assignment_family`
    /// directly.
    fn parse_for_step(&mut self) -> Option<Node> {
        let name = self.expect_ident()?;
        if self.match_token(&Token::PlusPlus) {
            return Some(Node::Inc(name));
        }
        if self.match_token(&Token::MinusMinus) {
            return Some(Node::Dec(name));
        }
        if let Some(op) = self.compound_assign_op() {
            let value = self.parse_expr()?;
            return Some(Node::CompoundAssign { name, op, value: Box::new(value) });
        }
        self.expect(Token::Eq, "'='");
        let value = self.parse_expr()?;
        Some(Node::Assign { target: Box::new(Node::Ident(name)), value: Box::new(value) })
    }

    fn parse_return(&mut self) -> Option<Node> {
        self.advance(); // 'return'
        let value = if self.check(&Token::Semicolon) { None } else { Some(Box::new(self.parse_expr()?)) };
        self.expect(Token::Semicolon, "';'");
        Some(Node::Return(value))
    }

    fn parse_import(&mut self) -> Option<Node> {
        self.advance(); // 'import'
        let path = match self.current().clone() {
            Token::Str(path) => {
                self.advance();
                path
            },
            _ => {
                self.error("expected a string path after 'import'");
                return None;
            },
        };
        self.expect(Token::Semicolon, "';'");
        Some(Node::Import(path))
    }

    fn parse_try_catch(&mut self) -> Option<Node> {
        self.advance(); // 'try'
        let try_block = self.parse_block()?;

        let mut catch_var = None;
        let mut catch_block = None;
        if self.match_token(&Token::Catch) {
            if self.match_token(&Token::LParen) {
                catch_var = Some(self.expect_ident()?);
                self.expect(Token::RParen, "')'");
            }
            catch_block = Some(Box::new(self.parse_block()?));
        }

        let finally = if self.match_token(&Token::Finally) {
            Some(Box::new(self.parse_block()?))
        } else {
            None
        };

        Some(Node::TryCatch {
            try_block: Box::new(try_block),
            catch_var,
            catch_block,
            finally,
        })
    }

    fn parse_throw(&mut self) -> Option<Node> {
        self.advance(); // 'throw'
        let value = self.parse_expr()?;
        self.expect(Token::Semicolon, "';'");
        Some(Node::Throw(Box::new(value)))
    }

    pub(crate) fn parse_block(&mut self) -> Option<Node> {
        self.expect(Token::LBrace, "'{'");
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
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
        self.expect(Token::RBrace, "'}'");
        Some(Node::Block(stmts))
    }

    /// Identifier-led statements: plain assign, compound assign,
    /// increment, decrement, indexed assign, or a call expression
    /// statement.
    fn parse_assignment_family(&mut self, name: Symbol) -> Option<Node> {
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
            self.expect(Token::Semicolon, "';'");
            return Some(Node::Call { name, args });
        }

        if self.match_token(&Token::PlusPlus) {
            self.expect(Token::Semicolon, "';'");
            return Some(Node::Inc(name));
        }
        if self.match_token(&Token::MinusMinus) {
            self.expect(Token::Semicolon, "';'");
            return Some(Node::Dec(name));
        }
        if let Some(op) = self.compound_assign_op() {
            let value = self.parse_expr()?;
            self.expect(Token::Semicolon, "';'");
            return Some(Node::CompoundAssign { name, op, value: Box::new(value) });
        }

        let mut target = Node::Ident(name);
        while self.match_token(&Token::LBracket) {
            let index = self.parse_expr()?;
            self.expect(Token::RBracket, "']'");
            target = Node::IndexAccess { target: Box::new(target), index: Box::new(index) };
        }

        if self.match_token(&Token::Eq) {
            let value = self.parse_expr()?;
            self.expect(Token::Semicolon, "';'");
            return Some(Node::Assign { target: Box::new(target), value: Box::new(value) });
        }

        self.error("expected '=', a compound assignment, '++', '--', or '(' after identifier");
        None
    }

    fn compound_assign_op(&mut self) -> Option<BinOp> {
        let op = match self.current() {
            Token::PlusEq => BinOp::Add,
            Token::MinusEq => BinOp::Sub,
            Token::StarEq => BinOp::Mul,
            Token::SlashEq => BinOp::Div,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    fn expect_ident(&mut self) -> Option<Symbol> {
        match self.current().clone() {
            Token::Ident(name) => {
                self.advance();
                Some(name)
            },
            _ => {
                self.error("expected an identifier");
                None
            },
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Handler;

    fn parse(source: &str) -> (Node, bool) {
        let handler = Handler::new();
        let mut parser = Parser::new(source, &handler);
        let program = parser.parse();
        (program, handler.has_errors())
    }

    #[test]
    fn function_declaration() {
        let (ast, errored) = parse("func add(int a, int b) { return a + b; }");
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::FuncDecl {
                name: Symbol::intern("add"),
                params: vec![
                    Node::VarDecl { declared_type: TypeName::Int, name: Symbol::intern("a"), init: None },
                    Node::VarDecl { declared_type: TypeName::Int, name: Symbol::intern("b"), init: None },
                ],
                body: Box::new(Node::Block(vec![Node::Return(Some(Box::new(Node::BinOp {
                    op: BinOp::Add,
                    left: Box::new(Node::Ident(Symbol::intern("a"))),
                    right: Box::new(Node::Ident(Symbol::intern("b"))),
                })))])),
            }])
        );
    }

    #[test]
    fn if_else_chain() {
        let (ast, errored) = parse("if (true) { return 1; } else { return 2; }");
        assert!(!errored);
        match &ast {
            Node::Program(stmts) => assert!(matches!(stmts[0], Node::If { .. })),
            _ => panic!(),
        }
    }

    #[test]
    fn while_loop() {
        let (ast, errored) = parse("while (x < 10) { x++; }");
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::While {
                cond: Box::new(Node::BinOp {
                    op: BinOp::Lt,
                    left: Box::new(Node::Ident(Symbol::intern("x"))),
                    right: Box::new(Node::IntLit(10)),
                }),
                body: Box::new(Node::Block(vec![Node::Inc(Symbol::intern("x"))])),
            }])
        );
    }

    #[test]
    fn classic_for_loop() {
        let (ast, errored) = parse("for (int i = 0; i < 10; i++) { print(i); }");
        assert!(!errored);
        match &ast {
            Node::Program(stmts) => assert!(matches!(stmts[0], Node::For { .. })),
            _ => panic!(),
        }
    }

    #[test]
    fn for_in_loop_disambiguated_from_classic_for() {
        let (ast, errored) = parse("for (item in items) { print(item); }");
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::ForIn {
                name: Symbol::intern("item"),
                iterable: Box::new(Node::Ident(Symbol::intern("items"))),
                body: Box::new(Node::Block(vec![Node::Call {
                    name: Symbol::intern("print"),
                    args: vec![Node::Ident(Symbol::intern("item"))],
                }])),
            }])
        );
    }

    #[test]
    fn compound_assignment() {
        let (ast, errored) = parse("x += 1;");
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::CompoundAssign {
                name: Symbol::intern("x"),
                op: BinOp::Add,
                value: Box::new(Node::IntLit(1)),
            }])
        );
    }

    #[test]
    fn indexed_assignment() {
        let (ast, errored) = parse(r#"a["k"] = 1;"#);
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::Assign {
                target: Box::new(Node::IndexAccess {
                    target: Box::new(Node::Ident(Symbol::intern("a"))),
                    index: Box::new(Node::StringLit(Symbol::intern("k"))),
                }),
                value: Box::new(Node::IntLit(1)),
            }])
        );
    }

    #[test]
    fn call_statement() {
        let (ast, errored) = parse(r#"print("hi");"#);
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::Call {
                name: Symbol::intern("print"),
                args: vec![Node::StringLit(Symbol::intern("hi"))],
            }])
        );
    }

    #[test]
    fn try_catch_finally() {
        let (ast, errored) = parse("try { throw 1; } catch (e) { print(e); } finally { print(0); }");
        assert!(!errored);
        match &ast {
            Node::Program(stmts) => assert!(matches!(stmts[0], Node::TryCatch { .. })),
            _ => panic!(),
        }
    }

    #[test]
    fn import_statement() {
        let (ast, errored) = parse(r#"import "math";"#);
        assert!(!errored);
        assert_eq!(ast, Node::Program(vec![Node::Import(Symbol::intern("math"))]));
    }

    #[test]
    fn break_and_continue() {
        let (ast, errored) = parse("while (true) { break; continue; }");
        assert!(!errored);
        assert_eq!(
            ast,
            Node::Program(vec![Node::While {
                cond: Box::new(Node::BoolLit(true)),
                body: Box::new(Node::Block(vec![Node::Break, Node::Continue])),
            }])
        );
    }

    #[test]
    fn missing_semicolon_is_recovered() {
        let (ast, errored) = parse("int x = 1 int y = 2;");
        assert!(errored);
        match ast {
            Node::Program(stmts) => {
                assert!(stmts.iter().any(|s| matches!(
                    s,
                    Node::VarDecl { name, .. } if *name == Symbol::intern("y")
                )));
            },
            _ => panic!(),
        }
    }
}
