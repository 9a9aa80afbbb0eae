//! Statement emission (§4.6.2-§4.6.7).
//!
//! One function per statement kind, each doing its own type check inline
//! before emitting -- there's no separate "validate, then generate" pass
//! within a statement, unlike the two top-level passes over the program.

use patito_core::{Op, QuadArg, Type};

use super::expr::{emit_call, emit_expr};
use super::Context;
use crate::ast::{Expr, PrintItem, Stmt};
use crate::semantic_cube;

pub(crate) fn emit_stmt(ctx: &mut Context, stmt: &Stmt) {
    match stmt {
        Stmt::Assign { target, value, span } => emit_assign(ctx, target, value, span.line),
        Stmt::Call { name, args, span } => {
            emit_call(ctx, name, args, span.line);
        }
        Stmt::If { cond, then_body, else_body, span } => emit_if(ctx, cond, then_body, else_body.as_deref(), span.line),
        Stmt::While { cond, body, span } => emit_while(ctx, cond, body, span.line),
        Stmt::Print { items, .. } => emit_print(ctx, items),
        Stmt::Return { value, span } => emit_return(ctx, value, span.line),
    }
}

fn emit_block(ctx: &mut Context, body: &[Stmt]) {
    for stmt in body {
        emit_stmt(ctx, stmt);
    }
}

/// §4.6.2: look up the target's declared type, check cube-assignability
/// against the expression's type, then emit a single `=` quad.
fn emit_assign(ctx: &mut Context, target: &str, value: &Expr, line: usize) {
    let Some(info) = ctx.variables.lookup(target) else {
        ctx.error(line, format!("variable '{target}' is not declared"));
        return;
    };
    let (var_ty, var_addr) = (info.ty, info.address);

    let Some((value_addr, value_ty)) = emit_expr(ctx, value) else {
        return;
    };
    if !semantic_cube::can_assign(var_ty, value_ty) {
        ctx.error(line, format!("cannot assign '{value_ty}' to '{target}' of type '{var_ty}'"));
        return;
    }
    ctx.gen_quad(Op::Assign, value_addr, QuadArg::None, var_addr);
}

/// §4.6.3: `GOTOF` on the condition, then patch it to just past the `then`
/// body (no `else`) or past an unconditional `GOTO` that skips the `else`
/// body (with one).
fn emit_if(ctx: &mut Context, cond: &Expr, then_body: &[Stmt], else_body: Option<&[Stmt]>, line: usize) {
    let Some((cond_addr, cond_ty)) = emit_expr(ctx, cond) else {
        return;
    };
    if cond_ty != Type::Int {
        ctx.error(line, format!("if condition must be 'int', found '{cond_ty}'"));
        return;
    }

    let gotof_idx = ctx.gen_quad(Op::GotoF, cond_addr, QuadArg::None, QuadArg::None);
    emit_block(ctx, then_body);

    match else_body {
        Some(else_body) => {
            let goto_idx = ctx.gen_quad(Op::Goto, QuadArg::None, QuadArg::None, QuadArg::None);
            ctx.fill_quad_result(gotof_idx, ctx.quadruples.len() as i64);
            emit_block(ctx, else_body);
            ctx.fill_quad_result(goto_idx, ctx.quadruples.len() as i64);
        }
        None => {
            ctx.fill_quad_result(gotof_idx, ctx.quadruples.len() as i64);
        }
    }
}

/// §4.6.4: re-evaluate and re-test the condition on every iteration --
/// `loop_start` points at the condition's first quad, not the body's.
fn emit_while(ctx: &mut Context, cond: &Expr, body: &[Stmt], line: usize) {
    let loop_start = ctx.quadruples.len() as i64;

    let Some((cond_addr, cond_ty)) = emit_expr(ctx, cond) else {
        return;
    };
    if cond_ty != Type::Int {
        ctx.error(line, format!("while condition must be 'int', found '{cond_ty}'"));
        return;
    }

    let gotof_idx = ctx.gen_quad(Op::GotoF, cond_addr, QuadArg::None, QuadArg::None);
    emit_block(ctx, body);
    ctx.gen_quad(Op::Goto, QuadArg::None, QuadArg::None, loop_start);
    ctx.fill_quad_result(gotof_idx, ctx.quadruples.len() as i64);
}

/// §4.6.7: string literals print directly; expressions are evaluated and
/// their result address printed. Items print left to right with no
/// separator the VM inserts on their behalf.
fn emit_print(ctx: &mut Context, items: &[PrintItem]) {
    for item in items {
        match item {
            PrintItem::Str(s) => {
                ctx.gen_quad(Op::Print, s.as_str(), QuadArg::None, QuadArg::None);
            }
            PrintItem::Expr(expr) => {
                if let Some((addr, _)) = emit_expr(ctx, expr) {
                    ctx.gen_quad(Op::Print, addr, QuadArg::None, QuadArg::None);
                }
            }
        }
    }
}

/// §4.6.6: `return` is only valid inside a non-void function, and its
/// expression must be cube-assignable to that function's declared return
/// type. Emits `(RETURN, expr_addr, _, return_address)`.
fn emit_return(ctx: &mut Context, value: &Expr, line: usize) {
    let Some(func_name) = ctx.current_function.clone() else {
        ctx.error(line, "return used outside of a function");
        return;
    };
    let entry = ctx.functions.get(&func_name).expect("current function is registered");
    if entry.return_type == Type::Void {
        ctx.error(line, format!("void function '{func_name}' cannot return a value"));
        return;
    }
    let return_type = entry.return_type;
    let return_address = entry.return_address.expect("non-void function was given a return slot in pass 1");

    let Some((value_addr, value_ty)) = emit_expr(ctx, value) else {
        return;
    };
    if !semantic_cube::can_assign(return_type, value_ty) {
        ctx.error(line, format!("function '{func_name}' returns '{return_type}', found '{value_ty}'"));
        return;
    }
    ctx.gen_quad(Op::Return, value_addr, QuadArg::None, return_address);
}
