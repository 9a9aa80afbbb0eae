//! The SDT engine: walks the parse tree twice and emits quadruples
//! (§4.6). Pass 1 registers declarations; Pass 2 emits bodies and does
//! all type checking along the way.

mod expr;
mod stmt;

use std::collections::HashMap;

use patito_core::{FunctionDescriptor, ObjectProgram, Op, Param, QuadArg, Quadruple, Type};
use tracing::debug;

use crate::ast::{FunctionDecl, Program, VarDecl};
use crate::config::CompilerConfig;
use crate::constant_table::ConstantTable;
use crate::error::{SemanticError, SemanticErrors};
use crate::function_directory::FunctionDirectory;
use crate::memory_map::MemoryMap;
use crate::variable_table::VariableTable;

/// All mutable compilation state, threaded explicitly through Pass 1 and
/// Pass 2 rather than hung off a visitor object.
pub(crate) struct Context {
    pub memory_map: MemoryMap,
    pub constants: ConstantTable,
    pub variables: VariableTable,
    pub functions: FunctionDirectory,
    pub quadruples: Vec<Quadruple>,
    pub jump_stack: Vec<usize>,
    /// Intermediate sub-expression results: parallel operand/type stacks
    /// (§4.6.1). Expression evaluation snapshots their depth on entry and
    /// restores it on exit so nested expressions never leak state.
    pub operand_stack: Vec<i64>,
    pub type_stack: Vec<Type>,
    /// `(quad_index, callee)` for every GOSUB emitted so far. Functions are
    /// emitted in declaration order, so a call to a not-yet-emitted
    /// function has no `quad_start` yet; patched in once every function
    /// has been walked (see `patch_gosubs`).
    pub pending_gosubs: Vec<(usize, String)>,
    pub current_function: Option<String>,
    pub errors: SemanticErrors,
    stop_at_first_error: bool,
}

impl Context {
    fn new(config: &CompilerConfig) -> Self {
        Context {
            memory_map: MemoryMap::with_segment_size(config.segment_size),
            constants: ConstantTable::new(),
            variables: VariableTable::new(),
            functions: FunctionDirectory::new(),
            quadruples: Vec::new(),
            jump_stack: Vec::new(),
            operand_stack: Vec::new(),
            type_stack: Vec::new(),
            pending_gosubs: Vec::new(),
            current_function: None,
            errors: SemanticErrors::default(),
            stop_at_first_error: config.stop_at_first_error,
        }
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.errors.push(SemanticError::new(line, message));
    }

    /// Whether iteration should bail early: only true once at least one
    /// error has been recorded *and* the config asked to stop at the
    /// first one. Checked at natural per-item boundaries (one global, one
    /// function, one statement) rather than after every quad emitted.
    fn should_stop(&self) -> bool {
        self.stop_at_first_error && !self.errors.is_empty()
    }

    pub fn gen_quad(&mut self, op: Op, arg1: impl Into<QuadArg>, arg2: impl Into<QuadArg>, result: impl Into<QuadArg>) -> usize {
        let idx = self.quadruples.len();
        self.quadruples.push(Quadruple::new(op, arg1, arg2, result));
        idx
    }

    pub fn fill_quad_result(&mut self, index: usize, value: impl Into<QuadArg>) {
        self.quadruples[index].3 = value.into();
    }
}

/// Compile a parsed program with the default configuration: collect every
/// semantic error rather than stopping at the first one (§7).
pub fn compile(program: &Program) -> Result<ObjectProgram, SemanticErrors> {
    compile_with_config(program, &CompilerConfig::default())
}

/// Compile a parsed program into an object program, or the full list of
/// semantic errors found.
pub fn compile_with_config(program: &Program, config: &CompilerConfig) -> Result<ObjectProgram, SemanticErrors> {
    let mut ctx = Context::new(config);

    pass1(&mut ctx, program);
    if !ctx.errors.is_empty() {
        return Err(ctx.errors);
    }

    pass2(&mut ctx, program);
    if !ctx.errors.is_empty() {
        return Err(ctx.errors);
    }

    patch_gosubs(&mut ctx);

    debug!(quads = ctx.quadruples.len(), functions = ctx.functions.iter().count(), "compilation finished");
    Ok(assemble(ctx, &program.name))
}

/// Functions are emitted in declaration order, so a GOSUB to a function
/// declared later in the source has no `quad_start` yet at emission time.
/// Every function header is registered in Pass 1 and every body is fully
/// emitted by the end of Pass 2, so the fixup always has a real target.
fn patch_gosubs(ctx: &mut Context) {
    for (idx, callee) in std::mem::take(&mut ctx.pending_gosubs) {
        let quad_start = ctx.functions.get(&callee).and_then(|f| f.quad_start).expect("callee emitted by end of pass 2");
        ctx.fill_quad_result(idx, quad_start);
    }
}

/// Pass 1: register the program name, global variables, and every
/// function header (name, params, return slot) before any body is
/// emitted, so call sites always find a known callee.
fn pass1(ctx: &mut Context, program: &Program) {
    // §4.5: the program itself reserves its name as a void pseudo-function
    // so the VM can size `main`'s own activation record the same way it
    // sizes every other function's.
    if let Err(e) = ctx.functions.add_function("main", Type::Void, 0) {
        ctx.errors.push(e);
    }

    for decl in &program.globals {
        if ctx.should_stop() {
            return;
        }
        register_vars(ctx, decl, true);
    }

    for func in &program.functions {
        if ctx.should_stop() {
            return;
        }
        if let Err(e) = ctx.functions.add_function(&func.name, func.return_type, func.span.line) {
            ctx.errors.push(e);
            continue;
        }
        if func.return_type != Type::Void {
            match ctx.memory_map.assign_global(func.return_type, func.span.line) {
                Ok(addr) => ctx.functions.set_return_address(&func.name, addr),
                Err(e) => ctx.errors.push(e),
            }
        }
        for p in &func.params {
            if let Err(e) = ctx.functions.add_param(&func.name, &p.name, p.ty, p.span.line) {
                ctx.errors.push(e);
            }
        }
    }
}

fn register_vars(ctx: &mut Context, decl: &VarDecl, is_global: bool) {
    for name in &decl.names {
        if ctx.should_stop() {
            return;
        }
        let addr = if is_global {
            ctx.memory_map.assign_global(decl.ty, decl.span.line)
        } else {
            ctx.memory_map.assign_local(decl.ty, decl.span.line)
        };
        let addr = match addr {
            Ok(a) => a,
            Err(e) => {
                ctx.errors.push(e);
                continue;
            }
        };
        let result = if is_global {
            ctx.variables.add_global(name, decl.ty, addr)
        } else {
            ctx.variables.add_local(name, decl.ty, addr)
        };
        if result.is_err() {
            ctx.error(decl.span.line, format!("variable '{name}' already declared in this scope"));
        }
    }
}

/// Pass 2: emit the `GOTO main` placeholder, every function body in
/// declaration order, then `main`'s own body and `END` (§4.6).
fn pass2(ctx: &mut Context, program: &Program) {
    let goto_main = ctx.gen_quad(Op::Goto, QuadArg::None, QuadArg::None, QuadArg::None);

    for func in &program.functions {
        if ctx.should_stop() {
            break;
        }
        emit_function(ctx, func);
    }

    let main_start = ctx.quadruples.len() as i64;
    ctx.fill_quad_result(goto_main, main_start);
    ctx.functions.set_quad_start("main", main_start);

    ctx.current_function = Some("main".to_string());
    for stmt in &program.main_body {
        if ctx.should_stop() {
            break;
        }
        stmt::emit_stmt(ctx, stmt);
    }
    let main_resources = ctx.memory_map.current_resources(0, 0);
    ctx.functions.set_resources("main", main_resources);
    ctx.current_function = None;

    ctx.gen_quad(Op::End, QuadArg::None, QuadArg::None, QuadArg::None);
}

fn emit_function(ctx: &mut Context, func: &FunctionDecl) {
    ctx.functions.set_quad_start(&func.name, ctx.quadruples.len() as i64);

    ctx.current_function = Some(func.name.clone());
    ctx.memory_map.enter_function();
    ctx.variables.enter_scope();

    let mut params_int = 0usize;
    let mut params_float = 0usize;
    for p in &func.params {
        match ctx.memory_map.assign_local(p.ty, p.span.line) {
            Ok(addr) => {
                if ctx.variables.add_parameter(&p.name, p.ty, addr).is_err() {
                    ctx.error(p.span.line, format!("parameter '{}' already declared", p.name));
                }
                match p.ty {
                    Type::Float => params_float += 1,
                    _ => params_int += 1,
                }
            }
            Err(e) => ctx.errors.push(e),
        }
    }

    for decl in &func.locals {
        if ctx.should_stop() {
            break;
        }
        register_vars(ctx, decl, false);
    }

    for stmt in &func.body {
        if ctx.should_stop() {
            break;
        }
        stmt::emit_stmt(ctx, stmt);
    }

    let resources = ctx.memory_map.current_resources(params_int, params_float);
    ctx.functions.set_resources(&func.name, resources);

    ctx.gen_quad(Op::EndFunc, QuadArg::None, QuadArg::None, QuadArg::None);

    ctx.variables.exit_scope();
    ctx.memory_map.exit_function();
    ctx.current_function = None;
}

fn assemble(ctx: Context, program_name: &str) -> ObjectProgram {
    let mut constants = HashMap::new();
    for (&addr, &value) in ctx.constants.values.iter() {
        constants.insert(addr, value);
    }

    let mut functions = HashMap::new();
    for (name, entry) in ctx.functions.iter() {
        functions.insert(
            name.clone(),
            FunctionDescriptor {
                return_type: entry.return_type,
                quad_start: entry.quad_start.unwrap_or(0),
                return_address: entry.return_address,
                params: entry.params.iter().map(|(n, t)| Param { name: n.clone(), ty: *t }).collect(),
                resources: entry.resources,
            },
        );
    }

    ObjectProgram {
        program_name: program_name.to_string(),
        quadruples: ctx.quadruples,
        constants,
        functions,
    }
}

