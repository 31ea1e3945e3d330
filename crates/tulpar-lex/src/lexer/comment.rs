//! Whitespace and comment skipping.
//!
//! Only `//` line comments exist in this grammar (original_source's
//! `lexer_skip_comment` handles no other form).

use crate::Lexer;

impl<'a> Lexer<'a> {
    /// Skips all whitespace and `// ...` comments preceding the next token.
    pub fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.cursor.is_at_end() {
                return;
            }

            match self.cursor.current_char() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                },
                '/' if self.cursor.peek_char(1) == '/' => {
                    self.skip_line_comment();
                },
                _ => return,
            }
        }
    }

    fn skip_line_comment(&mut self) {
        self.cursor.advance();
        self.cursor.advance();

        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            self.cursor.advance();
        }
    }
}
