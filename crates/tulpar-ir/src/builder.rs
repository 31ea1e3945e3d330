//! Imperative construction helper for [`Function`] bodies, mirroring
//! the teacher's block-at-a-time MIR builder but emitting the small
//! abstract instruction set instead of typed statements/terminators.

use tulpar_util::{IndexVec, Symbol};

use crate::ir::{BasicBlock, BlockId, ConstValue, Function, Instruction, Local, LocalId};

pub struct Builder {
    function: Function,
    current_block: BlockId,
}

impl Builder {
    pub fn new(name: Symbol, params: Vec<Symbol>) -> Self {
        let mut locals: IndexVec<LocalId, Local> = IndexVec::new();
        for param in &params {
            locals.push(Local { name: Some(*param) });
        }
        let mut blocks: IndexVec<BlockId, BasicBlock> = IndexVec::new();
        let entry = blocks.push(BasicBlock { id: BlockId(0), instructions: Vec::new() });

        Builder {
            function: Function { name, params, locals, blocks, entry },
            current_block: entry,
        }
    }

    pub fn add_local(&mut self, name: Option<Symbol>) -> LocalId {
        self.function.locals.push(Local { name })
    }

    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.function.blocks.len() as u32);
        let pushed = self.function.blocks.push(BasicBlock { id, instructions: Vec::new() });
        debug_assert_eq!(pushed, id);
        id
    }

    pub fn set_current_block(&mut self, block: BlockId) {
        self.current_block = block;
    }

    pub fn current_block(&self) -> BlockId {
        self.current_block
    }

    fn emit(&mut self, instruction: Instruction) {
        self.function.blocks[self.current_block].instructions.push(instruction);
    }

    pub fn const_value(&mut self, value: ConstValue) -> LocalId {
        let dest = self.add_local(None);
        self.emit(Instruction::ConstValue { dest, value });
        dest
    }

    pub fn alloca(&mut self, name: Symbol) -> LocalId {
        let local = self.add_local(Some(name));
        self.emit(Instruction::Alloca { local });
        local
    }

    pub fn load(&mut self, slot: LocalId) -> LocalId {
        let dest = self.add_local(None);
        self.emit(Instruction::Load { dest, slot });
        dest
    }

    pub fn store(&mut self, slot: LocalId, value: LocalId) {
        self.emit(Instruction::Store { slot, value });
    }

    pub fn call(&mut self, callee: Symbol, args: Vec<LocalId>, has_result: bool) -> Option<LocalId> {
        let dest = if has_result { Some(self.add_local(None)) } else { None };
        self.emit(Instruction::Call { dest, callee, args });
        dest
    }

    pub fn label(&mut self, block: BlockId) {
        self.emit(Instruction::Label(block));
    }

    pub fn branch(&mut self, target: BlockId) {
        self.emit(Instruction::Branch { target });
    }

    pub fn cond_branch(&mut self, cond: LocalId, then_block: BlockId, else_block: BlockId) {
        self.emit(Instruction::CondBranch { cond, then_block, else_block });
    }

    pub fn ret(&mut self, value: Option<LocalId>) {
        self.emit(Instruction::Ret { value });
    }

    pub fn unreachable(&mut self) {
        self.emit(Instruction::Unreachable);
    }

    pub fn build(self) -> Function {
        self.function
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_util::Symbol;

    #[test]
    fn builds_a_function_with_a_branch_between_two_blocks() {
        let mut builder = Builder::new(Symbol::intern("main"), vec![]);
        let then_block = builder.new_block();
        let after = builder.new_block();

        let cond = builder.const_value(ConstValue::Bool(true));
        builder.cond_branch(cond, then_block, after);

        builder.set_current_block(then_block);
        builder.branch(after);

        builder.set_current_block(after);
        builder.ret(None);

        let function = builder.build();
        assert_eq!(function.block_count(), 3);
        assert_eq!(function.blocks[function.entry].instructions.len(), 2);
    }
}
