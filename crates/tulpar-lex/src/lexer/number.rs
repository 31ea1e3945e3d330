//! Number literal lexing.
//!
//! Grounded on `original_source/src/lexer/lexer.c`'s `lexer_read_number`:
//! digits, optionally one `.`; a second `.` terminates the number rather
//! than erroring. No hex/binary/octal prefixes, no exponent suffix.

use crate::token::Token;
use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Lexes an integer or floating-point literal.
    ///
    /// # Returns
    /// `Token::Int(i64)` if no `.` was seen, else `Token::Float(f64)`.
    pub fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        let mut seen_dot = false;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                self.cursor.advance();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.cursor.advance();
            } else {
                break;
            }
        }

        let text = self.cursor.slice_from(start);

        if seen_dot {
            match text.parse::<f64>() {
                Ok(value) => Token::Float(value),
                Err(e) => {
                    self.report_error(format!("invalid floating point literal '{}': {}", text, e));
                    Token::Float(0.0)
                },
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Token::Int(value),
                Err(e) => {
                    self.report_error(format!("integer literal overflow: {}", e));
                    Token::Int(0)
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Handler;

    fn lex_num(source: &str) -> Token {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new(source, &mut handler);
        lexer.lex_number()
    }

    #[test]
    fn decimal_integer() {
        assert_eq!(lex_num("42"), Token::Int(42));
        assert_eq!(lex_num("0"), Token::Int(0));
        assert_eq!(lex_num("123456"), Token::Int(123456));
    }

    #[test]
    fn float_with_one_dot() {
        assert_eq!(lex_num("3.14"), Token::Float(3.14));
    }

    #[test]
    fn trailing_dot_is_still_a_float() {
        assert_eq!(lex_num("5."), Token::Float(5.0));
    }

    #[test]
    fn second_dot_terminates_the_number() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("1.2.3", &mut handler);
        assert_eq!(lexer.lex_number(), Token::Float(1.2));
        // The remaining ".3" starts with a dot the main dispatcher would
        // reject; lex_number itself only consumes up to the first value.
        assert_eq!(lexer.cursor.current_char(), '.');
    }

    #[test]
    fn integer_overflow_reports_and_yields_zero() {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new("99999999999999999999999", &mut handler);
        let tok = lexer.lex_number();
        assert_eq!(tok, Token::Int(0));
        assert!(handler.has_errors());
    }
}
