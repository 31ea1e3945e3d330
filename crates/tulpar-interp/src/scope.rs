//! Parent-linked scope chain (§4.6): each scope is a flat binding map
//! with an optional parent, mirroring the teacher's `Rib`/`ScopeTree`
//! shape but holding real `Value`s instead of `DefId`s, since the
//! interpreter needs no separate name-resolution pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tulpar_rt::Value;
use tulpar_util::Symbol;

pub struct Scope {
    bindings: HashMap<Symbol, Value>,
    parent: Option<ScopeHandle>,
}

pub type ScopeHandle = Rc<RefCell<Scope>>;

impl Scope {
    pub fn root() -> ScopeHandle {
        Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent: None }))
    }

    pub fn child(parent: &ScopeHandle) -> ScopeHandle {
        Rc::new(RefCell::new(Scope { bindings: HashMap::new(), parent: Some(parent.clone()) }))
    }

    /// Binds `name` in this scope, shadowing any outer binding.
    pub fn declare(scope: &ScopeHandle, name: Symbol, value: Value) {
        scope.borrow_mut().bindings.insert(name, value);
    }

    pub fn get(scope: &ScopeHandle, name: Symbol) -> Option<Value> {
        let mut current = scope.clone();
        loop {
            if let Some(value) = current.borrow().bindings.get(&name) {
                return Some(value.clone());
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(next) => current = next,
                None => return None,
            }
        }
    }

    /// Assigns to the nearest enclosing binding named `name`. Returns
    /// `false` if no such binding exists anywhere in the chain — the
    /// caller reports that as an undefined-identifier runtime error.
    pub fn assign(scope: &ScopeHandle, name: Symbol, value: Value) -> bool {
        let mut current = scope.clone();
        loop {
            if current.borrow().bindings.contains_key(&name) {
                current.borrow_mut().bindings.insert(name, value);
                return true;
            }
            let parent = current.borrow().parent.clone();
            match parent {
                Some(next) => current = next,
                None => return false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scope_sees_parent_bindings() {
        let root = Scope::root();
        Scope::declare(&root, Symbol::intern("x"), Value::int(1));
        let child = Scope::child(&root);
        assert!(matches!(Scope::get(&child, Symbol::intern("x")), Some(Value::Int(1))));
    }

    #[test]
    fn child_binding_shadows_parent() {
        let root = Scope::root();
        Scope::declare(&root, Symbol::intern("x"), Value::int(1));
        let child = Scope::child(&root);
        Scope::declare(&child, Symbol::intern("x"), Value::int(2));
        assert!(matches!(Scope::get(&child, Symbol::intern("x")), Some(Value::Int(2))));
        assert!(matches!(Scope::get(&root, Symbol::intern("x")), Some(Value::Int(1))));
    }

    #[test]
    fn assign_writes_through_to_the_owning_scope() {
        let root = Scope::root();
        Scope::declare(&root, Symbol::intern("x"), Value::int(1));
        let child = Scope::child(&root);
        assert!(Scope::assign(&child, Symbol::intern("x"), Value::int(99)));
        assert!(matches!(Scope::get(&root, Symbol::intern("x")), Some(Value::Int(99))));
    }

    #[test]
    fn assign_to_undeclared_name_fails() {
        let root = Scope::root();
        assert!(!Scope::assign(&root, Symbol::intern("missing"), Value::int(1)));
    }
}
