//! String literal lexing.
//!
//! Grounded on `original_source/src/lexer/lexer.c`'s `lexer_read_string`:
//! bytes between the quotes are copied verbatim, no escape processing,
//! and running off the end of the source yields whatever was
//! accumulated so far rather than aborting.

use crate::token::Token;
use crate::Lexer;
use tulpar_util::Symbol;

impl<'a> Lexer<'a> {
    /// Lexes a string literal.
    ///
    /// # Returns
    /// `Token::Str(symbol)` holding the bytes between the quotes, copied
    /// verbatim.
    pub fn lex_string(&mut self) -> Token {
        self.cursor.advance(); // opening '"'

        let start = self.cursor.position();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '"' {
            self.cursor.advance();
        }

        let content = self.cursor.slice_from(start);

        if self.cursor.current_char() == '"' {
            self.cursor.advance();
        } else {
            self.report_error("unterminated string literal".to_string());
        }

        Token::Str(Symbol::intern(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Handler;

    fn lex_str(source: &str) -> (Token, bool) {
        let mut handler = Handler::new();
        let mut lexer = crate::Lexer::new(source, &mut handler);
        let token = lexer.lex_string();
        (token, handler.has_errors())
    }

    #[test]
    fn simple_string() {
        let (token, errored) = lex_str("\"hello\"");
        assert_eq!(token, Token::Str(Symbol::intern("hello")));
        assert!(!errored);
    }

    #[test]
    fn empty_string() {
        let (token, _) = lex_str("\"\"");
        assert_eq!(token, Token::Str(Symbol::intern("")));
    }

    #[test]
    fn backslash_is_copied_verbatim_not_treated_as_an_escape() {
        let (token, _) = lex_str(r#""a\nb""#);
        assert_eq!(token, Token::Str(Symbol::intern("a\\nb")));
    }

    #[test]
    fn unterminated_string_yields_content_seen_so_far() {
        let (token, errored) = lex_str("\"no closing quote");
        assert_eq!(token, Token::Str(Symbol::intern("no closing quote")));
        assert!(errored);
    }

    #[test]
    fn string_may_span_multiple_lines() {
        let (token, errored) = lex_str("\"line one\nline two\"");
        assert_eq!(token, Token::Str(Symbol::intern("line one\nline two")));
        assert!(!errored);
    }
}
