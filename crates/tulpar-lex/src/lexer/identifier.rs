//! Identifier and keyword lexing.

use crate::token::{keyword_from_ident, Token};
use crate::unicode::is_ascii_ident_continue;
use crate::Lexer;
use tulpar_util::Symbol;

impl<'a> Lexer<'a> {
    /// Lexes an identifier or keyword.
    ///
    /// Identifiers start with a letter or underscore, followed by
    /// alphanumeric characters or underscores. After reading the identifier,
    /// checks if it matches a reserved keyword or type-name.
    pub fn lex_identifier(&mut self) -> Token {
        while is_ascii_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);

        keyword_from_ident(text).unwrap_or_else(|| Token::Ident(Symbol::intern(text)))
    }
}
