//! Edge case tests for tulpar-par.

use crate::{Node, Parser};
use tulpar_util::{Handler, Symbol};

fn parse_source(source: &str) -> (Node, Handler) {
    let handler = Handler::new();
    let mut parser = Parser::new(source, &handler);
    let ast = parser.parse();
    (ast, handler)
}

#[test]
fn empty_source() {
    let (ast, handler) = parse_source("");
    assert_eq!(ast, Node::Program(vec![]));
    assert!(!handler.has_errors());
}

#[test]
fn whitespace_and_comments_only() {
    let (ast, handler) = parse_source("   \n\t// nothing here\n  ");
    assert_eq!(ast, Node::Program(vec![]));
    assert!(!handler.has_errors());
}

#[test]
fn nested_index_access_bottoms_out_in_an_identifier() {
    let (ast, handler) = parse_source(r#"a[0][1]["k"];"#);
    assert!(handler.has_errors()); // bare expression isn't a valid statement
    let _ = ast;
}

#[test]
fn deeply_nested_parentheses() {
    let (ast, handler) = parse_source("int x = ((((1))));");
    assert!(!handler.has_errors());
    assert_eq!(
        ast,
        Node::Program(vec![Node::VarDecl {
            declared_type: crate::TypeName::Int,
            name: Symbol::intern("x"),
            init: Some(Box::new(Node::IntLit(1))),
        }])
    );
}

#[test]
fn empty_function_body() {
    let (ast, handler) = parse_source("func noop() {}");
    assert!(!handler.has_errors());
    assert_eq!(
        ast,
        Node::Program(vec![Node::FuncDecl {
            name: Symbol::intern("noop"),
            params: vec![],
            body: Box::new(Node::Block(vec![])),
        }])
    );
}

#[test]
fn nested_blocks() {
    let (ast, handler) = parse_source("while (true) { while (true) { break; } }");
    assert!(!handler.has_errors());
    assert_eq!(
        ast,
        Node::Program(vec![Node::While {
            cond: Box::new(Node::BoolLit(true)),
            body: Box::new(Node::Block(vec![Node::While {
                cond: Box::new(Node::BoolLit(true)),
                body: Box::new(Node::Block(vec![Node::Break])),
            }])),
        }])
    );
}

#[test]
fn for_in_disambiguation_holds_even_with_parenthesised_iterable() {
    let (ast, handler) = parse_source("for (x in (a)) { print(x); }");
    assert!(!handler.has_errors());
    match ast {
        Node::Program(stmts) => assert!(matches!(stmts[0], Node::ForIn { .. })),
        _ => panic!(),
    }
}

#[test]
fn unterminated_block_is_recovered_to_eof_without_panicking() {
    let (_, handler) = parse_source("func f() { int x = 1;");
    assert!(handler.has_errors());
}

#[test]
fn unexpected_token_at_statement_start_advances_and_continues() {
    let (ast, handler) = parse_source("; int x = 1;");
    assert!(handler.has_errors());
    match ast {
        Node::Program(stmts) => {
            assert!(stmts
                .iter()
                .any(|s| matches!(s, Node::VarDecl { name, .. } if *name == Symbol::intern("x"))));
        },
        _ => panic!(),
    }
}

#[test]
fn object_literal_rejects_non_string_keys() {
    let (_, handler) = parse_source("int x = {1: 2};");
    assert!(handler.has_errors());
}

#[test]
fn consecutive_statements_of_every_kind_all_parse() {
    let source = r#"
        int a = 1;
        float b = 2.5;
        str c = "hi";
        bool d = true;
        array e = [1, 2];
        a += 1;
        a++;
        a--;
        if (d) { return; } else { return; }
        while (d) { break; }
        for (int i = 0; i < 1; i++) {}
        for (x in e) {}
    "#;
    let (_, handler) = parse_source(source);
    assert!(!handler.has_errors());
}

#[test]
fn long_binary_chain_does_not_overflow_the_stack() {
    let mut source = String::from("int x = 0");
    for _ in 0..500 {
        source.push_str(" + 1");
    }
    source.push(';');
    let (_, handler) = parse_source(&source);
    assert!(!handler.has_errors());
}

#[test]
fn typed_array_declarations_for_every_element_type() {
    let source = r#"
        arrayInt a = [1];
        arrayFloat b = [1.0];
        arrayStr c = ["s"];
        arrayBool d = [true];
        arrayJson e = [{"k": 1}];
    "#;
    let (_, handler) = parse_source(source);
    assert!(!handler.has_errors());
}
