//! Edge case tests for tulpar-lex.

use crate::{Lexer, Token};
use tulpar_util::{Handler, Symbol};

fn lex_all(source: &str) -> Vec<Token> {
    let mut handler = Handler::new();
    let mut lexer = Lexer::new(source, &mut handler);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token == Token::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

#[test]
fn empty_source() {
    assert!(lex_all("").is_empty());
}

#[test]
fn single_char_identifier() {
    let t = lex_all("x");
    assert_eq!(t[0], Token::Ident(Symbol::intern("x")));
}

#[test]
fn long_identifier() {
    let name = "a".repeat(10_000);
    let t = lex_all(&format!("int {} = 1;", name));
    assert!(t.contains(&Token::Ident(Symbol::intern(&name))));
}

#[test]
fn keywords_are_not_identifiers() {
    let t = lex_all("func int if");
    assert_eq!(t[0], Token::Func);
    assert_eq!(t[1], Token::IntType);
    assert_eq!(t[2], Token::If);
}

#[test]
fn no_hex_binary_or_octal_prefixes() {
    // '0' followed by 'x' is two separate tokens: Int(0) then an identifier.
    let t = lex_all("0x1");
    assert_eq!(t[0], Token::Int(0));
    assert_eq!(t[1], Token::Ident(Symbol::intern("x1")));
}

#[test]
fn empty_string_literal() {
    let t = lex_all("\"\"");
    assert_eq!(t[0], Token::Str(Symbol::intern("")));
}

#[test]
fn all_operators() {
    let t = lex_all("+ - * / == != < > <= >= && ! ++ --");
    assert!(t.contains(&Token::Plus));
    assert!(t.contains(&Token::EqEq));
    assert!(t.contains(&Token::PlusPlus));
    assert!(t.contains(&Token::MinusMinus));
}

#[test]
fn all_delimiters() {
    let t = lex_all("( ) { } [ ] , ; :");
    assert!(t.contains(&Token::LParen));
    assert!(t.contains(&Token::Colon));
}

#[test]
fn nested_parens() {
    let t = lex_all("((()))");
    assert_eq!(t.iter().filter(|x| **x == Token::LParen).count(), 3);
}

#[test]
fn case_sensitivity() {
    let t = lex_all("Func func");
    assert_eq!(t[0], Token::Ident(Symbol::intern("Func")));
    assert_eq!(t[1], Token::Func);
}

#[test]
fn boolean_literals_are_keyword_tokens() {
    let t = lex_all("true false");
    assert_eq!(t[0], Token::True);
    assert_eq!(t[1], Token::False);
}

#[test]
fn no_exponent_suffix_on_floats() {
    // There is no scientific notation: `1e10` lexes as an identifier
    // starting with 'e' right after the integer `1`.
    let t = lex_all("1e10");
    assert_eq!(t[0], Token::Int(1));
    assert_eq!(t[1], Token::Ident(Symbol::intern("e10")));
}

#[test]
fn large_integer_literal_overflows_to_zero_with_diagnostic() {
    let mut handler = Handler::new();
    let mut lexer = Lexer::new("99999999999999999999", &mut handler);
    assert_eq!(lexer.next_token(), Token::Int(0));
    assert!(handler.has_errors());
}

#[test]
fn all_keywords_recognized() {
    let t = lex_all(
        "func return if else while for in break continue true false import try catch finally throw",
    );
    assert_eq!(
        t,
        vec![
            Token::Func,
            Token::Return,
            Token::If,
            Token::Else,
            Token::While,
            Token::For,
            Token::In,
            Token::Break,
            Token::Continue,
            Token::True,
            Token::False,
            Token::Import,
            Token::Try,
            Token::Catch,
            Token::Finally,
            Token::Throw,
        ]
    );
}

#[test]
fn unterminated_string_reports_an_error() {
    let mut h = Handler::new();
    let _ = Lexer::new("\"unterminated", &mut h).next_token();
    assert!(h.has_errors());
}

#[test]
fn lone_bitwise_characters_are_errors() {
    let mut h = Handler::new();
    let mut lex = Lexer::new("@ # $", &mut h);
    while lex.next_token() != Token::Eof {}
    assert!(h.has_errors());
}

#[test]
fn mixed_valid_and_invalid_bytes() {
    let mut h = Handler::new();
    let mut lex = Lexer::new("int x = # 1;", &mut h);
    while lex.next_token() != Token::Eof {}
    assert!(h.has_errors());
}

#[test]
fn consecutive_increment_operators() {
    // "+++" greedily lexes as `++` then `+`.
    let t = lex_all("+++");
    assert_eq!(t, vec![Token::PlusPlus, Token::Plus]);
}

#[test]
fn whitespace_variations() {
    let t = lex_all("func\tx\n(\n)");
    assert!(t.contains(&Token::Func));
    assert!(t.contains(&Token::LParen));
}

#[test]
fn leading_zeros_are_preserved_as_value() {
    assert_eq!(lex_all("007")[0], Token::Int(7));
}

#[test]
fn index_access_chaining_tokens() {
    let t = lex_all("a[0][1]");
    assert_eq!(
        t,
        vec![
            Token::Ident(Symbol::intern("a")),
            Token::LBracket,
            Token::Int(0),
            Token::RBracket,
            Token::LBracket,
            Token::Int(1),
            Token::RBracket,
        ]
    );
}

#[test]
fn object_literal_tokens() {
    let t = lex_all(r#"{ "key": 1 }"#);
    assert_eq!(
        t,
        vec![
            Token::LBrace,
            Token::Str(Symbol::intern("key")),
            Token::Colon,
            Token::Int(1),
            Token::RBrace,
        ]
    );
}
