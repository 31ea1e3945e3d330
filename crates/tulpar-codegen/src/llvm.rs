//! `tulpar-ir` → LLVM IR (§4.5's closing paragraph, §6). Declares the
//! runtime ABI as external functions, lowers each `Function`'s blocks
//! and instructions to `inkwell` builder calls, and emits a concrete
//! C-ABI `main` that calls the designated entry function and converts
//! its boxed return to a process exit code via `to_int`.

use std::collections::HashMap;
use std::path::Path;

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::{Linkage, Module};
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, FloatValue, FunctionValue, IntValue, PointerValue};
use inkwell::{AddressSpace, IntPredicate, OptimizationLevel};

use tulpar_ir::{BlockId, ConstValue, Function as IrFunction, Instruction, LocalId, Module as IrModule};
use tulpar_util::Symbol;

use crate::error::{CodeGenError, Result};
use crate::types::{self, Scalar};

/// The LLVM function the designated entry (§4.5 point 2, `Module::main`)
/// compiles to. Never literally `"main"`: that name is reserved for the
/// thin C-ABI wrapper `build_entry_point` emits around it.
const ENTRY_SYMBOL: &str = "__tulpar_entry";

/// What a local currently holds, tracked lazily so a value is only
/// boxed into a `Value*` handle (or unboxed out of one) at the point
/// something actually needs that representation — an `int` literal
/// used only as `binary_op`'s opcode argument never gets boxed at all.
#[derive(Clone, Copy)]
enum LocalRepr<'ctx> {
    Ptr(PointerValue<'ctx>),
    /// A raw, not-yet-boxed C string (from a string literal); distinct
    /// from `Ptr` so it isn't mistaken for an already-boxed handle.
    CStr(PointerValue<'ctx>),
    Void,
    I32(IntValue<'ctx>),
    I64(IntValue<'ctx>),
    F64(FloatValue<'ctx>),
}

pub struct LlvmBackend<'ctx> {
    pub context: &'ctx Context,
    pub module: Module<'ctx>,
    pub builder: Builder<'ctx>,
    pub target_triple: String,
    pub opt_level: OptimizationLevel,
    runtime_fns: HashMap<String, FunctionValue<'ctx>>,
    user_fns: HashMap<Symbol, FunctionValue<'ctx>>,
}

impl<'ctx> LlvmBackend<'ctx> {
    pub fn new(context: &'ctx Context, module_name: &str, target_triple: String, opt_level: OptimizationLevel) -> Self {
        let module = context.create_module(module_name);

        let triple = inkwell::targets::TargetTriple::create(&target_triple);
        module.set_triple(&triple);
        if let Ok(target) = inkwell::targets::Target::from_triple(&triple) {
            if let Some(target_machine) = target.create_target_machine(
                &triple,
                "generic",
                "",
                opt_level,
                inkwell::targets::RelocMode::Default,
                inkwell::targets::CodeModel::Default,
            ) {
                let data_layout = target_machine.get_target_data().get_data_layout();
                module.set_data_layout(&data_layout);
            }
        }

        LlvmBackend {
            context,
            module,
            builder: context.create_builder(),
            target_triple,
            opt_level,
            runtime_fns: HashMap::new(),
            user_fns: HashMap::new(),
        }
    }

    fn ptr_type(&self) -> inkwell::types::PointerType<'ctx> {
        self.context.ptr_type(AddressSpace::default())
    }

    fn scalar_basic_type(&self, scalar: Scalar) -> inkwell::types::BasicTypeEnum<'ctx> {
        match scalar {
            Scalar::Ptr => self.ptr_type().into(),
            Scalar::I32 => self.context.i32_type().into(),
            Scalar::I64 => self.context.i64_type().into(),
            Scalar::F64 => self.context.f64_type().into(),
        }
    }

    /// Compiles a whole module: declares every runtime entry it calls
    /// into, emits one LLVM function per `tulpar-ir::Function`, and
    /// wraps the designated entry in a real `main`.
    pub fn compile_module(&mut self, ir_module: &IrModule) -> Result<()> {
        self.declare_runtime_functions(ir_module);
        self.declare_user_functions(ir_module);

        for (id, function) in ir_module.functions.as_slice().iter().enumerate() {
            let llvm_fn = self.user_fns[&function.name];
            self.compile_function(function, llvm_fn)?;
            let _ = id;
        }

        let entry = self.user_fns[&ir_module.functions[ir_module.main].name];
        self.build_entry_point(entry)?;
        Ok(())
    }

    fn declare_runtime_functions(&mut self, ir_module: &IrModule) {
        for decl in &ir_module.runtime_decls {
            let name = decl.name.as_str();
            if self.runtime_fns.contains_key(name) {
                continue;
            }
            let Some(sig) = types::signature(name) else {
                continue;
            };
            let param_types: Vec<BasicMetadataTypeEnum> =
                sig.params.iter().map(|p| self.scalar_basic_type(*p).into()).collect();
            let fn_type = match sig.ret {
                Some(ret) => self.scalar_basic_type(ret).fn_type(&param_types, false),
                None => self.context.void_type().fn_type(&param_types, false),
            };
            let function = self.module.add_function(name, fn_type, Some(Linkage::External));
            self.runtime_fns.insert(name.to_string(), function);
        }
    }

    /// User functions are always `n` boxed params returning one boxed
    /// handle (§4.5 point 2) — declared up front so mutually recursive
    /// calls resolve regardless of definition order.
    fn declare_user_functions(&mut self, ir_module: &IrModule) {
        let ptr_type = self.ptr_type();
        for function in ir_module.functions.as_slice() {
            let param_types: Vec<BasicMetadataTypeEnum> = function.params.iter().map(|_| ptr_type.into()).collect();
            let fn_type = ptr_type.fn_type(&param_types, false);
            let llvm_name =
                if function.name == ir_module.functions[ir_module.main].name { ENTRY_SYMBOL } else { function.name.as_str() };
            let llvm_fn = self.module.add_function(llvm_name, fn_type, None);
            self.user_fns.insert(function.name, llvm_fn);
        }
    }

    fn compile_function(&mut self, function: &IrFunction, llvm_fn: FunctionValue<'ctx>) -> Result<()> {
        let mut blocks = HashMap::new();
        for block in function.blocks.as_slice() {
            let name = format!("bb{}", block.id.0);
            blocks.insert(block.id.0, self.context.append_basic_block(llvm_fn, &name));
        }

        let mut locals: HashMap<u32, LocalRepr<'ctx>> = HashMap::new();
        let mut slots: HashMap<u32, PointerValue<'ctx>> = HashMap::new();

        for (index, param_name) in function.params.iter().enumerate() {
            let param = llvm_fn
                .get_nth_param(index as u32)
                .ok_or_else(|| CodeGenError::Internal(format!("missing parameter {}", param_name.as_str())))?;
            locals.insert(index as u32, LocalRepr::Ptr(param.into_pointer_value()));
        }

        for block in function.blocks.as_slice() {
            let llvm_block = blocks[&block.id.0];
            self.builder.position_at_end(llvm_block);
            for instruction in &block.instructions {
                self.compile_instruction(instruction, &mut locals, &mut slots, &blocks)?;
            }
        }
        Ok(())
    }

    fn compile_instruction(
        &mut self,
        instruction: &Instruction,
        locals: &mut HashMap<u32, LocalRepr<'ctx>>,
        slots: &mut HashMap<u32, PointerValue<'ctx>>,
        blocks: &HashMap<u32, inkwell::basic_block::BasicBlock<'ctx>>,
    ) -> Result<()> {
        match instruction {
            Instruction::ConstValue { dest, value } => {
                let repr = match value {
                    ConstValue::Int(i) => LocalRepr::I64(self.context.i64_type().const_int(*i as u64, true)),
                    ConstValue::Float(f) => LocalRepr::F64(self.context.f64_type().const_float(*f)),
                    ConstValue::Bool(b) => LocalRepr::I32(self.context.i32_type().const_int(*b as u64, false)),
                    ConstValue::Str(s) => {
                        let global = self
                            .builder
                            .build_global_string_ptr(s.as_str(), "str_lit")
                            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                        LocalRepr::CStr(global.as_pointer_value())
                    },
                    ConstValue::Void => LocalRepr::Void,
                };
                locals.insert(dest.0, repr);
            },
            Instruction::Alloca { local } => {
                let alloca = self
                    .builder
                    .build_alloca(self.ptr_type(), &format!("slot{}", local.0))
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                slots.insert(local.0, alloca);
            },
            Instruction::Load { dest, slot } => {
                let ptr = *slots
                    .get(&slot.0)
                    .ok_or_else(|| CodeGenError::Internal(format!("load from unknown slot {}", slot.0)))?;
                let loaded = self
                    .builder
                    .build_load(self.ptr_type(), ptr, &format!("load{}", dest.0))
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
                locals.insert(dest.0, LocalRepr::Ptr(loaded.into_pointer_value()));
            },
            Instruction::Store { slot, value } => {
                let ptr = *slots
                    .get(&slot.0)
                    .ok_or_else(|| CodeGenError::Internal(format!("store to unknown slot {}", slot.0)))?;
                let boxed = self.materialize_ptr(*value, locals)?;
                self.builder.build_store(ptr, boxed).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            },
            Instruction::Call { dest, callee, args } => {
                self.compile_call(*dest, *callee, args, locals)?;
            },
            Instruction::Label(_) => {},
            Instruction::Branch { target } => {
                let block = self.llvm_block(*target, blocks)?;
                self.builder.build_unconditional_branch(block).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            },
            Instruction::CondBranch { cond, then_block, else_block } => {
                let cond_i1 = self.materialize_i1(*cond, locals)?;
                let then_block = self.llvm_block(*then_block, blocks)?;
                let else_block = self.llvm_block(*else_block, blocks)?;
                self.builder
                    .build_conditional_branch(cond_i1, then_block, else_block)
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            },
            Instruction::Ret { value } => {
                let boxed = match value {
                    Some(value) => self.materialize_ptr(*value, locals)?,
                    None => self.materialize_void(locals)?,
                };
                self.builder.build_return(Some(&boxed)).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            },
            Instruction::Unreachable => {
                self.builder.build_unreachable().map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            },
        }
        Ok(())
    }

    fn llvm_block(&self, id: BlockId, blocks: &HashMap<u32, inkwell::basic_block::BasicBlock<'ctx>>) -> Result<inkwell::basic_block::BasicBlock<'ctx>> {
        blocks.get(&id.0).copied().ok_or_else(|| CodeGenError::BlockNotFound(format!("bb{}", id.0)))
    }

    fn compile_call(
        &mut self,
        dest: Option<LocalId>,
        callee: Symbol,
        args: &[LocalId],
        locals: &mut HashMap<u32, LocalRepr<'ctx>>,
    ) -> Result<()> {
        let name = callee.as_str();
        if let Some(sig) = types::signature(name) {
            let function = *self
                .runtime_fns
                .get(name)
                .ok_or_else(|| CodeGenError::FunctionNotFound(name.to_string()))?;
            let mut call_args: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
            for (arg, kind) in args.iter().zip(sig.params.iter()) {
                call_args.push(match kind {
                    Scalar::Ptr => self.materialize_ptr(*arg, locals)?.into(),
                    Scalar::I32 => self.materialize_i32(*arg, locals)?.into(),
                    Scalar::I64 => self.materialize_i64(*arg, locals)?.into(),
                    Scalar::F64 => self.materialize_f64(*arg, locals)?.into(),
                });
            }
            let call_site = self.builder.build_call(function, &call_args, name).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
            if let Some(dest) = dest {
                let returned = call_site
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::InvalidOperandType(format!("'{}' produced no return value", name)))?;
                let repr = match sig.ret {
                    Some(Scalar::Ptr) => LocalRepr::Ptr(returned.into_pointer_value()),
                    Some(Scalar::I32) => LocalRepr::I32(returned.into_int_value()),
                    Some(Scalar::I64) => LocalRepr::I64(returned.into_int_value()),
                    Some(Scalar::F64) => LocalRepr::F64(returned.into_float_value()),
                    None => return Err(CodeGenError::InvalidOperandType(format!("'{}' has no return slot", name))),
                };
                locals.insert(dest.0, repr);
            }
            return Ok(());
        }

        let function = *self.user_fns.get(&callee).ok_or_else(|| CodeGenError::FunctionNotFound(name.to_string()))?;
        let mut call_args: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
        for arg in args {
            call_args.push(self.materialize_ptr(*arg, locals)?.into());
        }
        let call_site = self.builder.build_call(function, &call_args, name).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        if let Some(dest) = dest {
            let returned = call_site
                .try_as_basic_value()
                .left()
                .ok_or_else(|| CodeGenError::InvalidOperandType(format!("call to '{}' produced no value", name)))?;
            locals.insert(dest.0, LocalRepr::Ptr(returned.into_pointer_value()));
        }
        Ok(())
    }

    fn alloc_call(&mut self, name: &str) -> Result<FunctionValue<'ctx>> {
        self.runtime_fns.get(name).copied().ok_or_else(|| CodeGenError::FunctionNotFound(name.to_string()))
    }

    fn materialize_ptr(&mut self, local: LocalId, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<PointerValue<'ctx>> {
        let repr = *locals.get(&local.0).ok_or_else(|| CodeGenError::Internal(format!("local {} never defined", local.0)))?;
        let boxed = match repr {
            LocalRepr::Ptr(p) => return Ok(p),
            LocalRepr::CStr(cstr) => {
                let alloc_string = self.alloc_call("alloc_string")?;
                self.builder
                    .build_call(alloc_string, &[cstr.into()], "box_str")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("alloc_string returned nothing".to_string()))?
                    .into_pointer_value()
            },
            LocalRepr::Void => {
                let alloc_void = self.alloc_call("alloc_void")?;
                self.builder
                    .build_call(alloc_void, &[], "box_void")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("alloc_void returned nothing".to_string()))?
                    .into_pointer_value()
            },
            LocalRepr::I32(v) => {
                let alloc_bool = self.alloc_call("alloc_bool")?;
                self.builder
                    .build_call(alloc_bool, &[v.into()], "box_bool")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("alloc_bool returned nothing".to_string()))?
                    .into_pointer_value()
            },
            LocalRepr::I64(v) => {
                let alloc_int = self.alloc_call("alloc_int")?;
                self.builder
                    .build_call(alloc_int, &[v.into()], "box_int")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("alloc_int returned nothing".to_string()))?
                    .into_pointer_value()
            },
            LocalRepr::F64(v) => {
                let alloc_float = self.alloc_call("alloc_float")?;
                self.builder
                    .build_call(alloc_float, &[v.into()], "box_float")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("alloc_float returned nothing".to_string()))?
                    .into_pointer_value()
            },
        };
        locals.insert(local.0, LocalRepr::Ptr(boxed));
        Ok(boxed)
    }

    fn materialize_void(&mut self, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<PointerValue<'ctx>> {
        let alloc_void = self.alloc_call("alloc_void")?;
        let boxed = self
            .builder
            .build_call(alloc_void, &[], "void_ret")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("alloc_void returned nothing".to_string()))?
            .into_pointer_value();
        let _ = locals;
        Ok(boxed)
    }

    /// Unboxes `local` into a raw `i64`, calling `to_int` if it's
    /// currently a boxed handle rather than already a raw integer.
    fn materialize_i64(&mut self, local: LocalId, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<IntValue<'ctx>> {
        let repr = *locals.get(&local.0).ok_or_else(|| CodeGenError::Internal(format!("local {} never defined", local.0)))?;
        match repr {
            LocalRepr::I64(v) => Ok(v),
            LocalRepr::I32(v) => self.builder.build_int_s_extend(v, self.context.i64_type(), "sext").map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string())),
            _ => {
                let ptr = self.materialize_ptr(local, locals)?;
                let to_int = self.alloc_call("to_int")?;
                let result = self
                    .builder
                    .build_call(to_int, &[ptr.into()], "unbox_int")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("to_int returned nothing".to_string()))?;
                Ok(result.into_int_value())
            },
        }
    }

    fn materialize_i32(&mut self, local: LocalId, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<IntValue<'ctx>> {
        let repr = *locals.get(&local.0).ok_or_else(|| CodeGenError::Internal(format!("local {} never defined", local.0)))?;
        match repr {
            LocalRepr::I32(v) => Ok(v),
            LocalRepr::I64(v) => self
                .builder
                .build_int_truncate(v, self.context.i32_type(), "trunc")
                .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string())),
            _ => {
                let raw = self.materialize_i64(local, locals)?;
                self.builder.build_int_truncate(raw, self.context.i32_type(), "trunc").map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
            },
        }
    }

    fn materialize_f64(&mut self, local: LocalId, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<FloatValue<'ctx>> {
        let repr = *locals.get(&local.0).ok_or_else(|| CodeGenError::Internal(format!("local {} never defined", local.0)))?;
        match repr {
            LocalRepr::F64(v) => Ok(v),
            _ => {
                let ptr = self.materialize_ptr(local, locals)?;
                let to_float = self.alloc_call("to_float")?;
                let result = self
                    .builder
                    .build_call(to_float, &[ptr.into()], "unbox_float")
                    .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
                    .try_as_basic_value()
                    .left()
                    .ok_or_else(|| CodeGenError::Internal("to_float returned nothing".to_string()))?;
                Ok(result.into_float_value())
            },
        }
    }

    /// A `CondBranch`'s condition is always the raw `i32` result of
    /// `is_truthy`/`setjmp_token` (§4.5 point 7), never a boxed handle
    /// — `lower.rs` only ever feeds one of those two calls' result
    /// directly into a branch.
    fn materialize_i1(&mut self, local: LocalId, locals: &mut HashMap<u32, LocalRepr<'ctx>>) -> Result<IntValue<'ctx>> {
        let raw = self.materialize_i32(local, locals)?;
        let zero = self.context.i32_type().const_zero();
        self.builder
            .build_int_compare(IntPredicate::NE, raw, zero, "tobool")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))
    }

    /// Emits the real `main(): i32`, calling the compiled entry and
    /// converting its boxed return to an exit code via `to_int`.
    fn build_entry_point(&mut self, entry: FunctionValue<'ctx>) -> Result<()> {
        let i32_type = self.context.i32_type();
        let fn_type = i32_type.fn_type(&[], false);
        let main_fn = self.module.add_function("main", fn_type, None);
        let block = self.context.append_basic_block(main_fn, "entry");
        self.builder.position_at_end(block);

        let result = self
            .builder
            .build_call(entry, &[], "result")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("entry function returned nothing".to_string()))?
            .into_pointer_value();

        let to_int = self.alloc_call("to_int")?;
        let code = self
            .builder
            .build_call(to_int, &[result.into()], "code")
            .map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?
            .try_as_basic_value()
            .left()
            .ok_or_else(|| CodeGenError::Internal("to_int returned nothing".to_string()))?
            .into_int_value();
        let code32 = self.builder.build_int_truncate(code, i32_type, "code32").map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        self.builder.build_return(Some(&code32)).map_err(|e| CodeGenError::LlvmOperationFailed(e.to_string()))?;
        Ok(())
    }

    pub fn optimize(&mut self) {
        // opt_level-driven pass pipelines are not wired up; codegen emits
        // unoptimized IR and relies on the linker's `-O` flag.
    }

    pub fn emit_llvm_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_ir_to_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fs::File;
        use std::io::Write;

        let ir = self.emit_llvm_ir();
        let mut file = File::create(path)?;
        file.write_all(ir.as_bytes())?;
        Ok(())
    }

    pub fn get_module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn write_object_file(&self, path: &Path) -> Result<()> {
        self.write_via_target_machine(path, inkwell::targets::FileType::Object)
    }

    pub fn write_asm_file(&self, path: &Path) -> Result<()> {
        self.write_via_target_machine(path, inkwell::targets::FileType::Assembly)
    }

    fn write_via_target_machine(&self, path: &Path, file_type: inkwell::targets::FileType) -> Result<()> {
        use inkwell::targets::TargetTriple;

        let triple = TargetTriple::create(&self.target_triple);
        let target = inkwell::targets::Target::from_triple(&triple)
            .map_err(|e| CodeGenError::CompilationError(format!("failed to get target: {}", e)))?;
        let target_machine = target
            .create_target_machine(
                &triple,
                "generic",
                "",
                self.opt_level,
                inkwell::targets::RelocMode::Default,
                inkwell::targets::CodeModel::Default,
            )
            .ok_or_else(|| CodeGenError::CompilationError("failed to create target machine".to_string()))?;
        target_machine
            .write_to_file(&self.module, file_type, path)
            .map_err(|e| CodeGenError::CompilationError(format!("failed to write output: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulpar_par::Parser;
    use tulpar_util::Handler;

    fn compile(source: &str) -> String {
        let handler = Handler::new();
        let mut parser = Parser::new(source, &handler);
        let program = parser.parse();
        let ir_module = tulpar_lower::lower_program(&program, &handler, std::path::Path::new("."));

        let context = Context::create();
        let mut backend = LlvmBackend::new(&context, "test", "x86_64-unknown-linux-gnu".to_string(), OptimizationLevel::None);
        backend.compile_module(&ir_module).expect("module compiles");
        backend.emit_llvm_ir()
    }

    #[test]
    fn backend_creation_sets_the_requested_triple() {
        let context = Context::create();
        let backend = LlvmBackend::new(&context, "test", "x86_64-unknown-linux-gnu".to_string(), OptimizationLevel::None);
        assert_eq!(backend.target_triple, "x86_64-unknown-linux-gnu");
    }

    #[test]
    fn empty_program_still_emits_a_real_main() {
        let ir = compile("");
        assert!(ir.contains("define i32 @main"));
        assert!(ir.contains(ENTRY_SYMBOL));
    }

    #[test]
    fn arithmetic_declares_binary_op_as_external() {
        let ir = compile("int x = 1 + 2; print(x);");
        assert!(ir.contains("declare ptr @binary_op"));
        assert!(ir.contains("declare void @print_value"));
    }

    #[test]
    fn user_function_compiles_to_its_own_definition() {
        let ir = compile("func add(int a, int b) { return a + b; } print(add(1, 2));");
        assert!(ir.contains("define ptr @add"));
    }
}
