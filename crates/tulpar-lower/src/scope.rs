//! The lowering's own linked scope (§4.5 point 4): a stack of
//! name→slot maps, innermost last, mirroring the interpreter's
//! parent-chained `Scope` but resolving to compile-time `LocalId`
//! stack slots instead of runtime `Value` cells.

use std::collections::HashMap;
use tulpar_ir::LocalId;
use tulpar_util::Symbol;

pub struct ScopeChain {
    frames: Vec<HashMap<Symbol, LocalId>>,
}

impl ScopeChain {
    pub fn new() -> Self {
        ScopeChain { frames: vec![HashMap::new()] }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
        debug_assert!(!self.frames.is_empty(), "popped the function's root scope");
    }

    /// Inserts in the innermost frame, per §3.4 ("insertion is always
    /// in the innermost scope").
    pub fn define(&mut self, name: Symbol, slot: LocalId) {
        self.frames.last_mut().expect("scope chain is never empty").insert(name, slot);
    }

    /// Walks parent-ward, matching §3.4's lookup direction.
    pub fn lookup(&self, name: Symbol) -> Option<LocalId> {
        self.frames.iter().rev().find_map(|frame| frame.get(&name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut chain = ScopeChain::new();
        let x = Symbol::intern("x");
        chain.define(x, LocalId(0));
        chain.push();
        chain.define(x, LocalId(1));
        assert_eq!(chain.lookup(x), Some(LocalId(1)));
        chain.pop();
        assert_eq!(chain.lookup(x), Some(LocalId(0)));
    }

    #[test]
    fn lookup_walks_parent_ward() {
        let mut chain = ScopeChain::new();
        let y = Symbol::intern("y");
        chain.define(y, LocalId(5));
        chain.push();
        assert_eq!(chain.lookup(y), Some(LocalId(5)));
    }

    #[test]
    fn missing_name_is_none() {
        let chain = ScopeChain::new();
        assert_eq!(chain.lookup(Symbol::intern("nowhere")), None);
    }
}
