//! Operator and punctuation lexing.
//!
//! Grounded on `original_source/src/lexer/lexer.c`'s `lexer_next_token`
//! switch: every operator needs at most one character of lookahead, and a
//! lone `&` or `|` (not doubled) is not a valid token.

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes `+`, `++`, or `+=`.
    pub fn lex_plus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('+') {
            Token::PlusPlus
        } else if self.cursor.match_char('=') {
            Token::PlusEq
        } else {
            Token::Plus
        }
    }

    /// Lexes `-`, `--`, or `-=`.
    pub fn lex_minus(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('-') {
            Token::MinusMinus
        } else if self.cursor.match_char('=') {
            Token::MinusEq
        } else {
            Token::Minus
        }
    }

    /// Lexes `*` or `*=`.
    pub fn lex_star(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::StarEq
        } else {
            Token::Star
        }
    }

    /// Lexes `/` or `/=`. `//` comments are skipped before dispatch ever
    /// reaches this method, so a second `/` can't appear here.
    pub fn lex_slash(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::SlashEq
        } else {
            Token::Slash
        }
    }

    /// Lexes `=` or `==`.
    pub fn lex_equals(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::EqEq
        } else {
            Token::Eq
        }
    }

    /// Lexes `!` or `!=`.
    pub fn lex_bang(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::NotEq
        } else {
            Token::Bang
        }
    }

    /// Lexes `<` or `<=`.
    pub fn lex_less(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::LtEq
        } else {
            Token::Lt
        }
    }

    /// Lexes `>` or `>=`.
    pub fn lex_greater(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('=') {
            Token::GtEq
        } else {
            Token::Gt
        }
    }

    /// Lexes `&&`. A lone `&` is not a valid token.
    pub fn lex_ampersand(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('&') {
            Token::AndAnd
        } else {
            self.report_error("unexpected character '&'".to_string());
            Token::Error("&".to_string())
        }
    }

    /// Lexes `||`. A lone `|` is not a valid token.
    pub fn lex_pipe(&mut self) -> Token {
        self.cursor.advance();
        if self.cursor.match_char('|') {
            Token::OrOr
        } else {
            self.report_error("unexpected character '|'".to_string());
            Token::Error("|".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Handler;

    fn lex_op(source: &str) -> Token {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new(source, &mut handler);
        lexer.next_token()
    }

    #[test]
    fn arithmetic_and_compound_assign() {
        assert_eq!(lex_op("+"), Token::Plus);
        assert_eq!(lex_op("++"), Token::PlusPlus);
        assert_eq!(lex_op("+="), Token::PlusEq);
        assert_eq!(lex_op("-"), Token::Minus);
        assert_eq!(lex_op("--"), Token::MinusMinus);
        assert_eq!(lex_op("-="), Token::MinusEq);
        assert_eq!(lex_op("*"), Token::Star);
        assert_eq!(lex_op("*="), Token::StarEq);
        assert_eq!(lex_op("/"), Token::Slash);
        assert_eq!(lex_op("/="), Token::SlashEq);
    }

    #[test]
    fn comparison_and_assignment() {
        assert_eq!(lex_op("="), Token::Eq);
        assert_eq!(lex_op("=="), Token::EqEq);
        assert_eq!(lex_op("!"), Token::Bang);
        assert_eq!(lex_op("!="), Token::NotEq);
        assert_eq!(lex_op("<"), Token::Lt);
        assert_eq!(lex_op("<="), Token::LtEq);
        assert_eq!(lex_op(">"), Token::Gt);
        assert_eq!(lex_op(">="), Token::GtEq);
    }

    #[test]
    fn logical_operators_require_doubling() {
        assert_eq!(lex_op("&&"), Token::AndAnd);
        assert_eq!(lex_op("||"), Token::OrOr);
    }

    #[test]
    fn lone_ampersand_or_pipe_is_an_error() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("& x", &mut handler);
        assert_eq!(lexer.next_token(), Token::Error("&".to_string()));
        assert!(handler.has_errors());
    }
}
