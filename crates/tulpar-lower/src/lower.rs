//! AST → `tulpar-ir` lowering (§4.5). Depth-first walk that either
//! materializes a literal inline or emits a call into the runtime for
//! anything whose result depends on a `Value`'s tag, mirroring
//! `original_source/src/aot/aot_pipeline.c`'s parse-then-emit shape
//! and `faxc-mir`'s `lower_expr`-returns-a-place structure.

use std::collections::HashSet;
use std::path::Path;

use tulpar_ir::{BlockId, Builder, ConstValue, Function, FunctionId, LocalId, Module, RuntimeDecl};
use tulpar_par::{BinOp, Node, TypeName, UnOp};
use tulpar_util::{DiagnosticBuilder, Handler, IndexVec, Span, Symbol};

use crate::builtins::{self, Wrap};
use crate::import;
use crate::scope::ScopeChain;

/// `binary_op`'s `op` discriminant, matching `tulpar_rt::abi::decode_op`'s
/// declaration order byte-for-byte.
fn op_code(op: BinOp) -> i64 {
    match op {
        BinOp::Add => 0,
        BinOp::Sub => 1,
        BinOp::Mul => 2,
        BinOp::Div => 3,
        BinOp::Lt => 4,
        BinOp::Gt => 5,
        BinOp::LtEq => 6,
        BinOp::GtEq => 7,
        BinOp::EqEq => 8,
        BinOp::NotEq => 9,
        BinOp::And | BinOp::Or => unreachable!("short-circuit operators never reach binary_op"),
    }
}

struct LoopCx {
    break_block: BlockId,
    continue_block: BlockId,
}

/// Owns the parts of lowering shared across every function in the
/// module: the runtime symbols any function has called into (so the
/// module only declares what it actually uses) and the finished
/// function list.
struct ModuleCx {
    runtime_decls: std::collections::BTreeMap<&'static str, usize>,
    functions: IndexVec<FunctionId, Function>,
    function_names: HashSet<Symbol>,
}

impl ModuleCx {
    fn declare_runtime(&mut self, name: &'static str, arity: usize) {
        self.runtime_decls.entry(name).or_insert(arity);
    }
}

/// One function's lowering state: its `Builder`, its own scope chain
/// (§3.4 — "a linked chain" rooted fresh per call), and the enclosing
/// loops `break`/`continue` may target.
struct FnLower<'a, 'm> {
    module: &'m mut ModuleCx,
    handler: &'a Handler,
    builder: Builder,
    scopes: ScopeChain,
    loops: Vec<LoopCx>,
    /// Nearest enclosing `catch` dispatch block for each `try` currently
    /// open in this function, innermost last. Consulted by
    /// `propagate_exception` every time a `throw` fires or a statement
    /// sequence notices the handler-stack flag set.
    catch_targets: Vec<BlockId>,
    temp_counter: u32,
}

impl<'a, 'm> FnLower<'a, 'm> {
    fn new(module: &'m mut ModuleCx, handler: &'a Handler, name: Symbol, params: Vec<Symbol>) -> Self {
        FnLower {
            module,
            handler,
            builder: Builder::new(name, params),
            scopes: ScopeChain::new(),
            loops: Vec::new(),
            catch_targets: Vec::new(),
            temp_counter: 0,
        }
    }

    fn temp_name(&mut self, label: &str) -> Symbol {
        self.temp_counter += 1;
        Symbol::intern(&format!("__{}_{}", label, self.temp_counter))
    }

    fn call(&mut self, name: &'static str, args: Vec<LocalId>, has_result: bool) -> Option<LocalId> {
        self.module.declare_runtime(name, args.len());
        self.builder.call(Symbol::intern(name), args, has_result)
    }

    fn const_int(&mut self, value: i64) -> LocalId {
        self.builder.const_value(ConstValue::Int(value))
    }

    fn is_truthy(&mut self, value: LocalId) -> LocalId {
        self.call("is_truthy", vec![value], true).expect("is_truthy always yields a result")
    }

    // ---- statements --------------------------------------------------

    /// Lowers a statement sequence, skipping anything after a node
    /// that unconditionally diverts control (`return`/`break`/
    /// `continue`/`throw`). After every statement that does fall
    /// through, also checks whether it (or anything several calls deep
    /// underneath it) recorded a `throw` against the handler stack, and
    /// if so stops the sequence immediately instead of letting the
    /// statements after it run. This is the same sequence used for a
    /// function's own body and for every nested block (`if`/`while`/
    /// `for` bodies, plain `{ }` blocks), so the check fires at every
    /// throwable call site, not only directly inside a `try` (§4.5
    /// point 7). Returns whether control can fall off the end of the
    /// sequence normally.
    fn lower_stmts(&mut self, stmts: &[Node]) -> bool {
        for stmt in stmts {
            let falls_through = self.lower_stmt(stmt);
            if !falls_through {
                return false;
            }
            self.check_pending_exception();
        }
        true
    }

    /// Tests the handler-stack flag (`setjmp_token`) and, if it is set,
    /// routes the pending exception away before any further statement
    /// in the current sequence can run.
    fn check_pending_exception(&mut self) {
        let flag = self.call("setjmp_token", vec![], true).unwrap();
        let continue_block = self.builder.new_block();
        let propagate_block = self.builder.new_block();
        self.builder.cond_branch(flag, propagate_block, continue_block);

        self.builder.set_current_block(propagate_block);
        self.propagate_exception();

        self.builder.set_current_block(continue_block);
    }

    /// Sends a pending exception to the nearest enclosing `catch`
    /// dispatch open in this function. If none is open here, returns
    /// early instead: the exception (and the handler-stack flag that
    /// marks it) stays live across the native call boundary, so the
    /// caller's own `check_pending_exception` — run immediately after
    /// the call that reached this function — picks it up and keeps
    /// propagating the same way, all the way up to whichever `try`
    /// frame (in this call or an ancestor) is actually open.
    fn propagate_exception(&mut self) {
        match self.catch_targets.last().copied() {
            Some(catch_block) => self.builder.branch(catch_block),
            None => {
                let fallback = self.const_int(0);
                self.builder.ret(Some(fallback));
            },
        }
    }

    /// Returns whether control falls through to the statement after
    /// `stmt` (false for `return`/`break`/`continue`/bare `throw`, and
    /// for an `if` whose every arm diverges).
    fn lower_stmt(&mut self, stmt: &Node) -> bool {
        match stmt {
            Node::VarDecl { declared_type, name, init } => {
                let value = match init {
                    Some(init) => self.lower_expr(init),
                    None => self.default_value(*declared_type),
                };
                let slot = self.builder.alloca(*name);
                self.builder.store(slot, value);
                self.scopes.define(*name, slot);
                true
            },
            Node::Assign { target, value } => {
                let value = self.lower_expr(value);
                self.lower_assign(target, value);
                true
            },
            Node::CompoundAssign { name, op, value } => {
                let Some(slot) = self.scopes.lookup(*name) else {
                    self.undefined(*name);
                    return true;
                };
                let current = self.builder.load(slot);
                let rhs = self.lower_expr(value);
                let code = self.const_int(op_code(*op));
                let result = self.call("binary_op", vec![code, current, rhs], true).unwrap();
                self.builder.store(slot, result);
                true
            },
            Node::Inc(name) | Node::Dec(name) => {
                let Some(slot) = self.scopes.lookup(*name) else {
                    self.undefined(*name);
                    return true;
                };
                let current = self.builder.load(slot);
                let one = self.const_int(1);
                let op = if matches!(stmt, Node::Inc(_)) { BinOp::Add } else { BinOp::Sub };
                let code = self.const_int(op_code(op));
                let result = self.call("binary_op", vec![code, current, one], true).unwrap();
                self.builder.store(slot, result);
                true
            },
            Node::If { cond, then, else_ } => self.lower_if(cond, then, else_.as_deref()),
            Node::While { cond, body } => self.lower_while(cond, body),
            Node::For { init, cond, step, body } => self.lower_for(init.as_deref(), cond.as_deref(), step.as_deref(), body),
            Node::ForIn { name, iterable, body } => self.lower_for_in(*name, iterable, body),
            Node::Break => {
                let target = self.loops.last().expect("break outside a loop").break_block;
                self.builder.branch(target);
                false
            },
            Node::Continue => {
                let target = self.loops.last().expect("continue outside a loop").continue_block;
                self.builder.branch(target);
                false
            },
            Node::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.lower_expr(value)),
                    None => Some(self.builder.const_value(ConstValue::Void)),
                };
                self.builder.ret(value);
                false
            },
            Node::Block(stmts) => {
                self.scopes.push();
                let falls_through = self.lower_stmts(stmts);
                self.scopes.pop();
                falls_through
            },
            Node::TryCatch { try_block, catch_var, catch_block, finally } => {
                self.lower_try_catch(try_block, *catch_var, catch_block.as_deref(), finally.as_deref())
            },
            Node::Throw(value) => {
                let value = self.lower_expr(value);
                self.call("throw", vec![value], false);
                self.propagate_exception();
                false
            },
            Node::Import(_) => {
                DiagnosticBuilder::error("import only allowed at the top level of a program".to_string())
                    .span(Span::DUMMY)
                    .emit(self.handler);
                true
            },
            // Expression statements: a bare call, e.g. `print(x);`.
            other => {
                self.lower_expr(other);
                true
            },
        }
    }

    fn undefined(&mut self, name: Symbol) {
        DiagnosticBuilder::error(format!("undefined identifier '{}'", name.as_str()))
            .span(Span::DUMMY)
            .emit(self.handler);
    }

    fn default_value(&mut self, declared_type: TypeName) -> LocalId {
        match declared_type {
            TypeName::Float => self.builder.const_value(ConstValue::Float(0.0)),
            TypeName::Str => self.builder.const_value(ConstValue::Str(Symbol::intern(""))),
            TypeName::Bool => self.builder.const_value(ConstValue::Bool(false)),
            TypeName::Array | TypeName::ArrayInt | TypeName::ArrayFloat | TypeName::ArrayStr | TypeName::ArrayBool
            | TypeName::ArrayJson => self.call("allocate_array", vec![], true).unwrap(),
            TypeName::Int => self.builder.const_value(ConstValue::Int(0)),
        }
    }

    fn lower_assign(&mut self, target: &Node, value: LocalId) {
        match target {
            Node::Ident(name) => match self.scopes.lookup(*name) {
                Some(slot) => self.builder.store(slot, value),
                None => self.undefined(*name),
            },
            Node::IndexAccess { target, index } => {
                let target = self.lower_expr(target);
                let index = self.lower_expr(index);
                self.call("set_element", vec![target, index, value], false);
            },
            _ => unreachable!("parser only ever produces Ident/IndexAccess assign targets"),
        }
    }

    fn lower_if(&mut self, cond: &Node, then: &Node, else_: Option<&Node>) -> bool {
        let cond_value = self.lower_expr(cond);
        let cond_bool = self.is_truthy(cond_value);

        let then_block = self.builder.new_block();
        let else_block = self.builder.new_block();
        let join_block = self.builder.new_block();
        self.builder.cond_branch(cond_bool, then_block, else_block);

        self.builder.set_current_block(then_block);
        let then_falls = self.lower_stmt(then);
        if then_falls {
            self.builder.branch(join_block);
        }

        self.builder.set_current_block(else_block);
        let else_falls = match else_ {
            Some(else_) => self.lower_stmt(else_),
            None => true,
        };
        if else_falls {
            self.builder.branch(join_block);
        }

        self.builder.set_current_block(join_block);
        if !then_falls && !else_falls {
            self.builder.unreachable();
            return false;
        }
        true
    }

    fn lower_while(&mut self, cond: &Node, body: &Node) -> bool {
        let cond_block = self.builder.new_block();
        let body_block = self.builder.new_block();
        let after_block = self.builder.new_block();
        self.builder.branch(cond_block);

        self.builder.set_current_block(cond_block);
        let cond_value = self.lower_expr(cond);
        let cond_bool = self.is_truthy(cond_value);
        self.builder.cond_branch(cond_bool, body_block, after_block);

        self.builder.set_current_block(body_block);
        self.loops.push(LoopCx { break_block: after_block, continue_block: cond_block });
        let body_falls = self.lower_stmt(body);
        self.loops.pop();
        if body_falls {
            self.builder.branch(cond_block);
        }

        self.builder.set_current_block(after_block);
        true
    }

    fn lower_for(&mut self, init: Option<&Node>, cond: Option<&Node>, step: Option<&Node>, body: &Node) -> bool {
        self.scopes.push();
        if let Some(init) = init {
            self.lower_stmt(init);
        }

        let cond_block = self.builder.new_block();
        let body_block = self.builder.new_block();
        let step_block = self.builder.new_block();
        let after_block = self.builder.new_block();
        self.builder.branch(cond_block);

        self.builder.set_current_block(cond_block);
        match cond {
            Some(cond) => {
                let cond_value = self.lower_expr(cond);
                let continues = self.is_truthy(cond_value);
                self.builder.cond_branch(continues, body_block, after_block);
            },
            // No condition (`for (;;)`): nothing to test, so `cond_block`
            // falls straight through rather than manufacturing a fake
            // always-true handle just to run it through `is_truthy`.
            None => self.builder.branch(body_block),
        }

        self.builder.set_current_block(body_block);
        self.loops.push(LoopCx { break_block: after_block, continue_block: step_block });
        let body_falls = self.lower_stmt(body);
        self.loops.pop();
        if body_falls {
            self.builder.branch(step_block);
        }

        self.builder.set_current_block(step_block);
        if let Some(step) = step {
            self.lower_stmt(step);
        }
        self.builder.branch(cond_block);

        self.builder.set_current_block(after_block);
        self.scopes.pop();
        true
    }

    /// Desugars `for (name in iterable) body` into an index-counted
    /// loop over the iterable's length (§4.5 point 5), matching
    /// `tulpar-interp`'s `ForIn` evaluation exactly so both paths
    /// visit the same elements in the same order.
    fn lower_for_in(&mut self, name: Symbol, iterable: &Node, body: &Node) -> bool {
        self.scopes.push();
        let iterable_value = self.lower_expr(iterable);
        let iterable_slot = self.builder.alloca(self.temp_name("forin_iterable"));
        self.builder.store(iterable_slot, iterable_value);

        let zero = self.const_int(0);
        let index_slot = self.builder.alloca(self.temp_name("forin_index"));
        self.builder.store(index_slot, zero);

        let cond_block = self.builder.new_block();
        let body_block = self.builder.new_block();
        let step_block = self.builder.new_block();
        let after_block = self.builder.new_block();
        self.builder.branch(cond_block);

        self.builder.set_current_block(cond_block);
        let iterable_now = self.builder.load(iterable_slot);
        let length_raw = self.call("len", vec![iterable_now], true).unwrap();
        let length_value = self.call("alloc_int", vec![length_raw], true).unwrap();
        let index_now = self.builder.load(index_slot);
        let lt_code = self.const_int(op_code(BinOp::Lt));
        let continues_value = self.call("binary_op", vec![lt_code, index_now, length_value], true).unwrap();
        let continues = self.is_truthy(continues_value);
        self.builder.cond_branch(continues, body_block, after_block);

        self.builder.set_current_block(body_block);
        self.scopes.push();
        let index_now = self.builder.load(index_slot);
        let iterable_now = self.builder.load(iterable_slot);
        let item_value = self.call("get_element", vec![iterable_now, index_now], true).unwrap();
        let item_slot = self.builder.alloca(name);
        self.builder.store(item_slot, item_value);
        self.scopes.define(name, item_slot);
        self.loops.push(LoopCx { break_block: after_block, continue_block: step_block });
        let body_falls = self.lower_stmt(body);
        self.loops.pop();
        self.scopes.pop();
        if body_falls {
            self.builder.branch(step_block);
        }

        self.builder.set_current_block(step_block);
        let index_now = self.builder.load(index_slot);
        let one = self.const_int(1);
        let add_code = self.const_int(op_code(BinOp::Add));
        let next_index = self.call("binary_op", vec![add_code, index_now, one], true).unwrap();
        self.builder.store(index_slot, next_index);
        self.builder.branch(cond_block);

        self.builder.set_current_block(after_block);
        self.scopes.pop();
        true
    }

    /// Lowers `try`/`catch`/`finally` onto `tulpar-rt`'s handler-stack
    /// protocol (§4.5 point 7). The try body is lowered through the
    /// same `lower_stmts` every block uses, with this `try`'s catch
    /// dispatch pushed as the current `propagate_exception` target —
    /// so a `throw` raised directly in the body, nested several levels
    /// of `if`/`while`/`for` deep, or raised inside a function called
    /// from the body, all land on `catch_block_label` the moment
    /// control returns here, not only when checked between top-level
    /// try statements.
    fn lower_try_catch(
        &mut self,
        try_block: &Node,
        catch_var: Option<Symbol>,
        catch_block: Option<&Node>,
        finally: Option<&Node>,
    ) -> bool {
        let Node::Block(try_stmts) = try_block else {
            unreachable!("parser always wraps try bodies in a Block")
        };

        self.call("try_push", vec![], false);

        let catch_block_label = self.builder.new_block();
        let finally_block = self.builder.new_block();

        self.scopes.push();
        self.catch_targets.push(catch_block_label);
        let try_falls_through = self.lower_stmts(try_stmts);
        self.catch_targets.pop();
        self.scopes.pop();

        // A normal fall-through is the only path that reaches this point
        // without already having branched to `catch_block_label` or
        // returned out of the function, so it's the only path that still
        // needs its own terminator here.
        if try_falls_through {
            self.call("try_pop", vec![], false);
            self.builder.branch(finally_block);
        }

        self.builder.set_current_block(catch_block_label);
        self.call("try_pop", vec![], false);
        let exception = self.call("get_exception", vec![], true).unwrap();
        self.scopes.push();
        if let Some(catch_var) = catch_var {
            let slot = self.builder.alloca(catch_var);
            self.builder.store(slot, exception);
            self.scopes.define(catch_var, slot);
        }
        if let Some(catch_block) = catch_block {
            self.lower_stmt(catch_block);
        }
        self.scopes.pop();
        self.builder.branch(finally_block);

        self.builder.set_current_block(finally_block);
        if let Some(finally) = finally {
            self.lower_stmt(finally);
        }
        true
    }

    // ---- expressions ---------------------------------------------------

    fn lower_expr(&mut self, expr: &Node) -> LocalId {
        match expr {
            Node::IntLit(value) => self.builder.const_value(ConstValue::Int(*value)),
            Node::FloatLit(value) => self.builder.const_value(ConstValue::Float(*value)),
            Node::BoolLit(value) => self.builder.const_value(ConstValue::Bool(*value)),
            Node::StringLit(value) => self.builder.const_value(ConstValue::Str(*value)),
            Node::Ident(name) => match self.scopes.lookup(*name) {
                Some(slot) => self.builder.load(slot),
                None => {
                    self.undefined(*name);
                    self.builder.const_value(ConstValue::Int(0))
                },
            },
            Node::ArrayLit(elements) => {
                let array = self.call("allocate_array", vec![], true).unwrap();
                for element in elements {
                    let value = self.lower_expr(element);
                    self.call("array_push", vec![array, value], false);
                }
                array
            },
            Node::ObjectLit(pairs) => {
                let object = self.call("allocate_object", vec![], true).unwrap();
                for (key, value) in pairs {
                    let key_local = self.builder.const_value(ConstValue::Str(*key));
                    let value_local = self.lower_expr(value);
                    self.call("object_set", vec![object, key_local, value_local], false);
                }
                object
            },
            Node::IndexAccess { target, index } => {
                let target = self.lower_expr(target);
                let index = self.lower_expr(index);
                self.call("get_element", vec![target, index], true).unwrap()
            },
            Node::BinOp { op: BinOp::And, left, right } => self.lower_and(left, right),
            Node::BinOp { op: BinOp::Or, left, right } => self.lower_or(left, right),
            Node::BinOp { op, left, right } => {
                let left = self.lower_expr(left);
                let right = self.lower_expr(right);
                let code = self.const_int(op_code(*op));
                self.call("binary_op", vec![code, left, right], true).unwrap()
            },
            Node::UnaryOp { op: UnOp::Not, operand } => {
                let value = self.lower_expr(operand);
                self.call("logical_not", vec![value], true).unwrap()
            },
            Node::UnaryOp { op: UnOp::Neg, operand } => {
                let value = self.lower_expr(operand);
                self.call("negate", vec![value], true).unwrap()
            },
            Node::Call { name, args } => self.lower_call(*name, args),
            _ => unreachable!("statement-only node reached expression lowering"),
        }
    }

    fn lower_and(&mut self, left: &Node, right: &Node) -> LocalId {
        let slot = self.builder.alloca(self.temp_name("and_result"));
        let left_value = self.lower_expr(left);
        let left_bool = self.is_truthy(left_value);

        let rhs_block = self.builder.new_block();
        let false_block = self.builder.new_block();
        let join_block = self.builder.new_block();
        self.builder.cond_branch(left_bool, rhs_block, false_block);

        self.builder.set_current_block(rhs_block);
        let right_value = self.lower_expr(right);
        let right_bool = self.is_truthy(right_value);
        let right_as_value = self.call("alloc_bool", vec![right_bool], true).unwrap();
        self.builder.store(slot, right_as_value);
        self.builder.branch(join_block);

        self.builder.set_current_block(false_block);
        let zero = self.const_int(0);
        let false_value = self.call("alloc_bool", vec![zero], true).unwrap();
        self.builder.store(slot, false_value);
        self.builder.branch(join_block);

        self.builder.set_current_block(join_block);
        self.builder.load(slot)
    }

    fn lower_or(&mut self, left: &Node, right: &Node) -> LocalId {
        let slot = self.builder.alloca(self.temp_name("or_result"));
        let left_value = self.lower_expr(left);
        let left_bool = self.is_truthy(left_value);

        let true_block = self.builder.new_block();
        let rhs_block = self.builder.new_block();
        let join_block = self.builder.new_block();
        self.builder.cond_branch(left_bool, true_block, rhs_block);

        self.builder.set_current_block(true_block);
        let one = self.const_int(1);
        let true_value = self.call("alloc_bool", vec![one], true).unwrap();
        self.builder.store(slot, true_value);
        self.builder.branch(join_block);

        self.builder.set_current_block(rhs_block);
        let right_value = self.lower_expr(right);
        let right_bool = self.is_truthy(right_value);
        let right_as_value = self.call("alloc_bool", vec![right_bool], true).unwrap();
        self.builder.store(slot, right_as_value);
        self.builder.branch(join_block);

        self.builder.set_current_block(join_block);
        self.builder.load(slot)
    }

    fn lower_call(&mut self, name: Symbol, args: &[Node]) -> LocalId {
        let text = name.as_str();
        if text == "print" {
            for arg in args {
                let value = self.lower_expr(arg);
                self.call("print_value", vec![value], false);
            }
            return self.builder.const_value(ConstValue::Void);
        }
        if text == "push" {
            let mut args = args.iter();
            let array = args.next().map(|a| self.lower_expr(a));
            let item = args.next().map(|a| self.lower_expr(a));
            if let (Some(array), Some(item)) = (array, item) {
                self.call("array_push", vec![array, item], false);
            }
            return self.builder.const_value(ConstValue::Void);
        }
        if let Some(sig) = builtins::lookup(text) {
            let arg_locals: Vec<LocalId> = args.iter().map(|a| self.lower_expr(a)).collect();
            let raw = self.call(sig.runtime_name, arg_locals, true).unwrap();
            return match sig.wrap {
                Wrap::Direct => raw,
                Wrap::Int => self.call("alloc_int", vec![raw], true).unwrap(),
                Wrap::Float => self.call("alloc_float", vec![raw], true).unwrap(),
            };
        }

        // User-defined function: emitted elsewhere as its own IR
        // `Function`; lowering only needs its name to address it.
        if !self.module.function_names.contains(&name) {
            DiagnosticBuilder::error(format!("call to undefined function '{}'", text))
                .span(Span::DUMMY)
                .emit(self.handler);
        }
        let arg_locals: Vec<LocalId> = args.iter().map(|a| self.lower_expr(a)).collect();
        self.builder.call(name, arg_locals, true).unwrap()
    }

    fn finish(mut self, default_return: i64) -> Function {
        let fallback = self.builder.const_value(ConstValue::Int(default_return));
        self.builder.ret(Some(fallback));
        self.builder.build()
    }
}

/// Lowers a whole `Program` into a `tulpar-ir::Module`. `source_dir`
/// anchors relative `import` paths (§4.5 point 8).
pub fn lower_program(program: &Node, handler: &Handler, source_dir: &Path) -> Module {
    let Node::Program(top_level) = program else {
        panic!("lower_program expects a Node::Program, the only thing Parser::parse ever returns");
    };

    let mut seen_imports = HashSet::new();
    let flattened = import::flatten(top_level, source_dir, handler, &mut seen_imports);

    let function_names: HashSet<Symbol> = flattened
        .iter()
        .filter_map(|stmt| match stmt {
            Node::FuncDecl { name, .. } => Some(*name),
            _ => None,
        })
        .collect();

    let mut module_cx = ModuleCx { runtime_decls: std::collections::BTreeMap::new(), functions: IndexVec::new(), function_names };

    let mut main_stmts = Vec::new();
    let mut func_decls = Vec::new();
    for stmt in &flattened {
        match stmt {
            Node::FuncDecl { .. } => func_decls.push(stmt),
            other => main_stmts.push(other.clone()),
        }
    }

    for func in func_decls {
        let Node::FuncDecl { name, params, body } = func else { unreachable!() };
        let param_names: Vec<Symbol> = params
            .iter()
            .map(|p| match p {
                Node::VarDecl { name, .. } => *name,
                _ => unreachable!("FuncDecl params are always VarDecl nodes with no init"),
            })
            .collect();

        let mut fn_lower = FnLower::new(&mut module_cx, handler, *name, param_names.clone());
        for (i, param_name) in param_names.iter().enumerate() {
            let param_local = LocalId(i as u32);
            let slot = fn_lower.builder.alloca(*param_name);
            fn_lower.builder.store(slot, param_local);
            fn_lower.scopes.define(*param_name, slot);
        }
        let Node::Block(body_stmts) = body.as_ref() else {
            unreachable!("parser always gives function bodies a Block")
        };
        let falls_through = fn_lower.lower_stmts(body_stmts);
        let function = if falls_through { fn_lower.finish(0) } else { fn_lower.builder.build() };
        module_cx.functions.push(function);
    }

    let main_name = Symbol::intern("main");
    let mut main_lower = FnLower::new(&mut module_cx, handler, main_name, vec![]);
    let falls_through = main_lower.lower_stmts(&main_stmts);
    let main_function = if falls_through { main_lower.finish(0) } else { main_lower.builder.build() };
    let main_id = module_cx.functions.push(main_function);

    let runtime_decls: Vec<RuntimeDecl> = module_cx
        .runtime_decls
        .into_iter()
        .map(|(name, arity)| RuntimeDecl { name: Symbol::intern(name), arity })
        .collect();

    Module { runtime_decls, functions: module_cx.functions, main: main_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_ir::Instruction;
    use tulpar_par::Parser;

    fn lower(source: &str) -> (Module, bool) {
        let handler = Handler::new();
        let mut parser = Parser::new(source, &handler);
        let program = parser.parse();
        let module = lower_program(&program, &handler, Path::new("."));
        (module, handler.has_errors())
    }

    #[test]
    fn simple_addition_lowers_to_a_binary_op_call() {
        let (module, errored) = lower("int x = 5; int y = 10; print(x + y);");
        assert!(!errored);
        let main = &module.functions[module.main];
        let calls: Vec<&Symbol> = main
            .blocks
            .as_slice()
            .iter()
            .flat_map(|b| &b.instructions)
            .filter_map(|i| match i {
                Instruction::Call { callee, .. } => Some(callee),
                _ => None,
            })
            .collect();
        assert!(calls.iter().any(|c| c.as_str() == "binary_op"));
        assert!(calls.iter().any(|c| c.as_str() == "print_value"));
    }

    #[test]
    fn function_declarations_become_their_own_ir_function() {
        let (module, errored) =
            lower("func fib(int n){ if (n<2){ return n; } return fib(n-1)+fib(n-2); } print(fib(10));");
        assert!(!errored);
        assert_eq!(module.functions.len(), 2);
    }

    #[test]
    fn for_loop_produces_four_blocks_plus_entry() {
        let (module, errored) = lower("for (int i=0; i<3; i++) { print(i); }");
        assert!(!errored);
        let main = &module.functions[module.main];
        assert!(main.block_count() >= 5);
    }

    #[test]
    fn undefined_identifier_is_a_diagnostic_not_a_panic() {
        let (_module, errored) = lower("print(neverDeclared);");
        assert!(errored);
    }

    #[test]
    fn array_literal_allocates_and_pushes_each_element() {
        let (module, errored) = lower("array a = [1, 2, 3];");
        assert!(!errored);
        let main = &module.functions[module.main];
        let push_calls = main
            .blocks
            .as_slice()
            .iter()
            .flat_map(|b| &b.instructions)
            .filter(|i| matches!(i, Instruction::Call { callee, .. } if callee.as_str() == "array_push"))
            .count();
        assert_eq!(push_calls, 3);
    }
}
