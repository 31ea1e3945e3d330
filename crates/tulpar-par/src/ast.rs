//! AST node definitions.
//!
//! A single enum carries every node kind; each variant owns exactly the
//! fields that kind uses. `IndexAccess` chains always bottom out in an
//! `Ident` (never in an arbitrary expression), mirroring the grammar's
//! `ident '[' expr ']' ('[' expr ']')*` production.

use tulpar_lex::Token;
use tulpar_util::Symbol;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    IntLit(i64),
    FloatLit(f64),
    StringLit(Symbol),
    BoolLit(bool),
    ArrayLit(Vec<Node>),
    ObjectLit(Vec<(Symbol, Node)>),

    Ident(Symbol),
    /// `target['index']`. `target` is `Ident` or a nested `IndexAccess`.
    IndexAccess { target: Box<Node>, index: Box<Node> },

    BinOp { op: BinOp, left: Box<Node>, right: Box<Node> },
    UnaryOp { op: UnOp, operand: Box<Node> },

    Call { name: Symbol, args: Vec<Node> },

    VarDecl { declared_type: TypeName, name: Symbol, init: Option<Box<Node>> },
    Assign { target: Box<Node>, value: Box<Node> },
    CompoundAssign { name: Symbol, op: BinOp, value: Box<Node> },
    Inc(Symbol),
    Dec(Symbol),

    If { cond: Box<Node>, then: Box<Node>, else_: Option<Box<Node>> },
    While { cond: Box<Node>, body: Box<Node> },
    For {
        init: Option<Box<Node>>,
        cond: Option<Box<Node>>,
        step: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForIn { name: Symbol, iterable: Box<Node>, body: Box<Node> },
    Break,
    Continue,
    Return(Option<Box<Node>>),

    Block(Vec<Node>),
    Program(Vec<Node>),
    FuncDecl { name: Symbol, params: Vec<Node>, body: Box<Node> },
    Import(Symbol),
    TryCatch {
        try_block: Box<Node>,
        catch_var: Option<Symbol>,
        catch_block: Option<Box<Node>>,
        finally: Option<Box<Node>>,
    },
    Throw(Box<Node>),
}

/// The fixed set of type-name tokens a `VarDecl` or function parameter
/// may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Int,
    Float,
    Str,
    Bool,
    Array,
    ArrayInt,
    ArrayFloat,
    ArrayStr,
    ArrayBool,
    ArrayJson,
}

impl TypeName {
    /// Maps a type-name token to its `TypeName`, or `None` if `token`
    /// isn't one.
    pub fn from_token(token: &Token) -> Option<Self> {
        Some(match token {
            Token::IntType => TypeName::Int,
            Token::FloatType => TypeName::Float,
            Token::StrType => TypeName::Str,
            Token::BoolType => TypeName::Bool,
            Token::ArrayType => TypeName::Array,
            Token::ArrayIntType => TypeName::ArrayInt,
            Token::ArrayFloatType => TypeName::ArrayFloat,
            Token::ArrayStrType => TypeName::ArrayStr,
            Token::ArrayBoolType => TypeName::ArrayBool,
            Token::ArrayJsonType => TypeName::ArrayJson,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
