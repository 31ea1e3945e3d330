//! The tree-walking executor (§4.6). Mirrors the AOT semantics by
//! calling through the same `tulpar-rt::ops` module for every value
//! operation, so the two execution paths produce identical `print`
//! traces.

use crate::builtins;
use crate::scope::{Scope, ScopeHandle};
use std::collections::HashMap;
use std::rc::Rc;
use tulpar_par::{BinOp, Node, TypeName, UnOp};
use tulpar_rt::{ops, Op, Value};
use tulpar_util::Symbol;

struct FunctionDef {
    params: Vec<Symbol>,
    body: Rc<Node>,
    closure: ScopeHandle,
}

/// The three in-band control-exit flags plus the exception payload
/// that rides alongside them: each is consumed by the nearest
/// enclosing construct and re-cleared there.
struct Flow {
    should_return: bool,
    should_break: bool,
    should_continue: bool,
    should_throw: bool,
    return_value: Value,
    thrown_value: Value,
}

impl Default for Flow {
    fn default() -> Self {
        Flow {
            should_return: false,
            should_break: false,
            should_continue: false,
            should_throw: false,
            return_value: Value::Void,
            thrown_value: Value::Void,
        }
    }
}

pub struct Interpreter {
    functions: HashMap<Symbol, FunctionDef>,
    globals: ScopeHandle,
    flow: Flow,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter { functions: HashMap::new(), globals: Scope::root(), flow: Flow::default() }
    }

    /// Runs a whole program: registers every top-level function first
    /// (so forward references and mutual recursion both work), then
    /// executes the remaining top-level statements in source order.
    /// Returns the process exit code (§6): 0 unless a top-level
    /// `return` supplies an integer.
    pub fn run(&mut self, program: &Node) -> i64 {
        let stmts = match program {
            Node::Program(stmts) => stmts,
            _ => return 0,
        };

        for stmt in stmts {
            if let Node::FuncDecl { name, params, body } = stmt {
                self.register_function(*name, params, body);
            }
        }

        let globals = self.globals.clone();
        for stmt in stmts {
            if matches!(stmt, Node::FuncDecl { .. }) {
                continue;
            }
            self.exec_stmt(stmt, &globals);
            if self.flow.should_throw {
                let message = ops::render(&self.flow.thrown_value);
                eprintln!("Uncaught exception: {}", message);
                return 1;
            }
            if self.flow.should_return {
                break;
            }
        }

        if self.flow.should_return {
            match self.flow.return_value {
                Value::Int(i) => i,
                _ => 0,
            }
        } else {
            0
        }
    }

    fn register_function(&mut self, name: Symbol, params: &[Node], body: &Node) {
        let param_names = params
            .iter()
            .map(|p| match p {
                Node::VarDecl { name, .. } => *name,
                _ => unreachable!("function parameters are always VarDecl nodes"),
            })
            .collect();
        self.functions.insert(
            name,
            FunctionDef { params: param_names, body: Rc::new(body.clone()), closure: self.globals.clone() },
        );
    }

    fn exec_stmt(&mut self, node: &Node, scope: &ScopeHandle) {
        match node {
            Node::VarDecl { declared_type, name, init } => {
                let value = match init {
                    Some(expr) => self.eval_expr(expr, scope),
                    None => default_value(*declared_type),
                };
                Scope::declare(scope, *name, value);
            },
            Node::Assign { target, value } => {
                let value = self.eval_expr(value, scope);
                self.assign(target, value, scope);
            },
            Node::CompoundAssign { name, op, value } => {
                let current = self.read_ident(*name, scope);
                let rhs = self.eval_expr(value, scope);
                let result = ops::binary_op(to_rt_op(*op), &current, &rhs);
                if !Scope::assign(scope, *name, result) {
                    ops::runtime_error(&format!("assignment to undefined identifier '{}'", name.as_str()));
                }
            },
            Node::Inc(name) => self.step(*name, 1, scope),
            Node::Dec(name) => self.step(*name, -1, scope),
            Node::If { cond, then, else_ } => {
                if self.eval_expr(cond, scope).is_truthy() {
                    self.exec_block_in_child(then, scope);
                } else if let Some(else_) = else_ {
                    self.exec_block_in_child(else_, scope);
                }
            },
            Node::While { cond, body } => {
                while self.eval_expr(cond, scope).is_truthy() {
                    self.exec_block_in_child(body, scope);
                    if self.flow.should_throw || self.flow.should_return {
                        break;
                    }
                    if self.flow.should_break {
                        self.flow.should_break = false;
                        break;
                    }
                    self.flow.should_continue = false;
                }
            },
            Node::For { init, cond, step, body } => {
                let loop_scope = Scope::child(scope);
                if let Some(init) = init {
                    self.exec_stmt(init, &loop_scope);
                }
                loop {
                    let continue_looping = match cond {
                        Some(cond) => self.eval_expr(cond, &loop_scope).is_truthy(),
                        None => true,
                    };
                    if !continue_looping {
                        break;
                    }
                    self.exec_block_in_child(body, &loop_scope);
                    if self.flow.should_throw || self.flow.should_return {
                        break;
                    }
                    if self.flow.should_break {
                        self.flow.should_break = false;
                        break;
                    }
                    self.flow.should_continue = false;
                    if let Some(step) = step {
                        self.exec_stmt(step, &loop_scope);
                    }
                }
            },
            Node::ForIn { name, iterable, body } => {
                let iterable = self.eval_expr(iterable, scope);
                let length = ops::array_len(&iterable);
                let loop_scope = Scope::child(scope);
                let mut i = 0;
                while i < length {
                    let item = ops::get_element(&iterable, &Value::int(i));
                    Scope::declare(&loop_scope, *name, item);
                    self.exec_block_in_child(body, &loop_scope);
                    if self.flow.should_throw || self.flow.should_return {
                        break;
                    }
                    if self.flow.should_break {
                        self.flow.should_break = false;
                        break;
                    }
                    self.flow.should_continue = false;
                    i += 1;
                }
            },
            Node::Break => self.flow.should_break = true,
            Node::Continue => self.flow.should_continue = true,
            Node::Return(value) => {
                self.flow.return_value = match value {
                    Some(expr) => self.eval_expr(expr, scope),
                    None => Value::Void,
                };
                self.flow.should_return = true;
            },
            Node::Block(stmts) => self.exec_block(stmts, scope),
            Node::FuncDecl { .. } => {
                // Nested function declarations aren't part of the grammar at
                // statement position below top level; registered up front.
            },
            Node::Import(_) => {
                // Module inlining is a lowering-time concern (§4.5 point 8);
                // the interpreter runs a single already-flattened program.
            },
            Node::TryCatch { try_block, catch_var, catch_block, finally } => {
                self.exec_try_catch(try_block, *catch_var, catch_block.as_deref(), finally.as_deref(), scope);
            },
            Node::Throw(value) => {
                self.flow.thrown_value = self.eval_expr(value, scope);
                self.flow.should_throw = true;
            },
            Node::Call { name, args } => {
                self.eval_call(*name, args, scope);
            },
            _ => ops::runtime_error("node is not valid in statement position"),
        }
    }

    fn exec_block(&mut self, stmts: &[Node], scope: &ScopeHandle) {
        for stmt in stmts {
            self.exec_stmt(stmt, scope);
            if self.flow.should_return || self.flow.should_break || self.flow.should_continue || self.flow.should_throw {
                break;
            }
        }
    }

    fn exec_block_in_child(&mut self, node: &Node, scope: &ScopeHandle) {
        let child = Scope::child(scope);
        match node {
            Node::Block(stmts) => self.exec_block(stmts, &child),
            other => self.exec_stmt(other, &child),
        }
    }

    fn exec_try_catch(
        &mut self,
        try_block: &Node,
        catch_var: Option<Symbol>,
        catch_block: Option<&Node>,
        finally: Option<&Node>,
        scope: &ScopeHandle,
    ) {
        self.exec_block_in_child(try_block, scope);

        if self.flow.should_throw {
            if let Some(catch_block) = catch_block {
                self.flow.should_throw = false;
                let value = std::mem::replace(&mut self.flow.thrown_value, Value::Void);
                let catch_scope = Scope::child(scope);
                if let Some(var) = catch_var {
                    Scope::declare(&catch_scope, var, value);
                }
                match catch_block {
                    Node::Block(stmts) => self.exec_block(stmts, &catch_scope),
                    other => self.exec_stmt(other, &catch_scope),
                }
            }
        }

        if let Some(finally) = finally {
            self.exec_block_in_child(finally, scope);
        }
    }

    fn step(&mut self, name: Symbol, delta: i64, scope: &ScopeHandle) {
        let current = self.read_ident(name, scope);
        let result = ops::binary_op(Op::Add, &current, &Value::int(delta));
        if !Scope::assign(scope, name, result) {
            ops::runtime_error(&format!("assignment to undefined identifier '{}'", name.as_str()));
        }
    }

    fn assign(&mut self, target: &Node, value: Value, scope: &ScopeHandle) {
        match target {
            Node::Ident(name) => {
                if !Scope::assign(scope, *name, value) {
                    ops::runtime_error(&format!("assignment to undefined identifier '{}'", name.as_str()));
                }
            },
            Node::IndexAccess { target, index } => {
                let container = self.eval_expr(target, scope);
                let index = self.eval_expr(index, scope);
                ops::set_element(&container, &index, value);
            },
            _ => ops::runtime_error("invalid assignment target"),
        }
    }

    fn read_ident(&mut self, name: Symbol, scope: &ScopeHandle) -> Value {
        match Scope::get(scope, name) {
            Some(value) => value,
            None => {
                ops::runtime_error(&format!("undefined identifier '{}'", name.as_str()));
                Value::int(0)
            },
        }
    }

    fn eval_call(&mut self, name: Symbol, args: &[Node], scope: &ScopeHandle) -> Value {
        let arg_values: Vec<Value> = args.iter().map(|arg| self.eval_expr(arg, scope)).collect();

        if builtins::is_builtin(name.as_str()) {
            return builtins::call(name.as_str(), arg_values);
        }

        let Some(def) = self.functions.get(&name) else {
            ops::runtime_error(&format!("call to undefined function '{}'", name.as_str()));
            return Value::int(0);
        };

        let call_scope = Scope::child(&def.closure);
        for (param, arg) in def.params.iter().zip(arg_values.into_iter()) {
            Scope::declare(&call_scope, *param, arg);
        }
        let body = def.body.clone();
        let saved_flow = std::mem::take(&mut self.flow);

        match &*body {
            Node::Block(stmts) => self.exec_block(stmts, &call_scope),
            other => self.exec_stmt(other, &call_scope),
        }

        let result = if self.flow.should_return {
            std::mem::replace(&mut self.flow.return_value, Value::Void)
        } else {
            Value::Void
        };
        let propagate_throw = self.flow.should_throw;
        let thrown = std::mem::replace(&mut self.flow.thrown_value, Value::Void);
        self.flow = saved_flow;
        if propagate_throw {
            self.flow.should_throw = true;
            self.flow.thrown_value = thrown;
        }
        result
    }

    fn eval_expr(&mut self, node: &Node, scope: &ScopeHandle) -> Value {
        match node {
            Node::IntLit(i) => Value::int(*i),
            Node::FloatLit(f) => Value::float(*f),
            Node::StringLit(s) => Value::string(s.as_str().to_string()),
            Node::BoolLit(b) => Value::bool(*b),
            Node::Ident(name) => self.read_ident(*name, scope),
            Node::ArrayLit(elements) => {
                let array = Value::array();
                for element in elements {
                    let value = self.eval_expr(element, scope);
                    ops::array_push(&array, value);
                }
                array
            },
            Node::ObjectLit(pairs) => {
                let object = Value::object();
                for (key, value) in pairs {
                    let value = self.eval_expr(value, scope);
                    ops::set_element(&object, &Value::string(key.as_str().to_string()), value);
                }
                object
            },
            Node::IndexAccess { target, index } => {
                let target = self.eval_expr(target, scope);
                let index = self.eval_expr(index, scope);
                ops::get_element(&target, &index)
            },
            Node::BinOp { op: BinOp::And, left, right } => {
                let left = self.eval_expr(left, scope);
                if !left.is_truthy() {
                    Value::bool(false)
                } else {
                    Value::bool(self.eval_expr(right, scope).is_truthy())
                }
            },
            Node::BinOp { op: BinOp::Or, left, right } => {
                let left = self.eval_expr(left, scope);
                if left.is_truthy() {
                    Value::bool(true)
                } else {
                    Value::bool(self.eval_expr(right, scope).is_truthy())
                }
            },
            Node::BinOp { op, left, right } => {
                let left = self.eval_expr(left, scope);
                let right = self.eval_expr(right, scope);
                ops::binary_op(to_rt_op(*op), &left, &right)
            },
            Node::UnaryOp { op: UnOp::Not, operand } => Value::bool(!self.eval_expr(operand, scope).is_truthy()),
            Node::UnaryOp { op: UnOp::Neg, operand } => match self.eval_expr(operand, scope) {
                Value::Int(i) => Value::int(-i),
                Value::Float(f) => Value::float(-f),
                _ => {
                    ops::runtime_error("unary '-' applied to a non-numeric value");
                    Value::int(0)
                },
            },
            Node::Call { name, args } => self.eval_call(*name, args, scope),
            _ => {
                ops::runtime_error("node is not valid in expression position");
                Value::int(0)
            },
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn to_rt_op(op: BinOp) -> Op {
    match op {
        BinOp::Add => Op::Add,
        BinOp::Sub => Op::Sub,
        BinOp::Mul => Op::Mul,
        BinOp::Div => Op::Div,
        BinOp::Lt => Op::Lt,
        BinOp::Gt => Op::Gt,
        BinOp::LtEq => Op::LtEq,
        BinOp::GtEq => Op::GtEq,
        BinOp::EqEq => Op::EqEq,
        BinOp::NotEq => Op::NotEq,
        BinOp::And | BinOp::Or => unreachable!("short-circuit operators never reach binary_op"),
    }
}

fn default_value(declared_type: TypeName) -> Value {
    match declared_type {
        TypeName::Int => Value::int(0),
        TypeName::Float => Value::float(0.0),
        TypeName::Str => Value::string(""),
        TypeName::Bool => Value::bool(false),
        TypeName::Array
        | TypeName::ArrayInt
        | TypeName::ArrayFloat
        | TypeName::ArrayStr
        | TypeName::ArrayBool
        | TypeName::ArrayJson => Value::array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Handler;

    fn run(source: &str) -> i64 {
        let handler = Handler::new();
        let mut parser = tulpar_par::Parser::new(source, &handler);
        let program = parser.parse();
        assert!(!handler.has_errors(), "source failed to parse: {}", source);
        Interpreter::new().run(&program)
    }

    #[test]
    fn arithmetic_and_print_scenario() {
        assert_eq!(run("int x = 5; int y = 10; print(x + y);"), 0);
    }

    #[test]
    fn string_concatenation_scenario() {
        assert_eq!(run(r#"str s = "Hel" + "lo"; print(s);"#), 0);
    }

    #[test]
    fn fibonacci_via_recursion() {
        assert_eq!(
            run("func fib(int n){ if (n<2){ return n; } return fib(n-1)+fib(n-2); } print(fib(10));"),
            0
        );
    }

    #[test]
    fn classic_for_loop_runs_three_times() {
        assert_eq!(run("for (int i=0; i<3; i++) { print(i); }"), 0);
    }

    #[test]
    fn top_level_return_becomes_the_exit_code() {
        assert_eq!(run("return 7;"), 7);
    }

    #[test]
    fn break_exits_only_the_innermost_loop() {
        assert_eq!(
            run("int count = 0; for (int i = 0; i < 3; i++) { for (int j = 0; j < 3; j++) { if (j == 1) { break; } count += 1; } }"),
            0
        );
    }

    #[test]
    fn continue_skips_the_rest_of_the_body() {
        assert_eq!(run("int total = 0; for (int i = 0; i < 5; i++) { if (i == 2) { continue; } total += i; }"), 0);
    }

    #[test]
    fn try_catch_recovers_from_a_thrown_value() {
        assert_eq!(run(r#"try { throw "boom"; } catch (e) { print(e); } print("after");"#), 0);
    }

    #[test]
    fn finally_runs_whether_or_not_an_exception_was_thrown() {
        assert_eq!(run(r#"try { int x = 1; } finally { print("always"); }"#), 0);
    }

    #[test]
    fn for_in_iterates_array_elements_in_order() {
        assert_eq!(run(r#"array a = [1, 2, 3]; for (item in a) { print(item); }"#), 0);
    }

    #[test]
    fn undefined_identifier_yields_neutral_value_without_aborting() {
        assert_eq!(run("print(missing + 1);"), 0);
    }
}
