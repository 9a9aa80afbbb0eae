//! Expression emission (§4.6.1).
//!
//! The parser has already resolved precedence into a nested [`Expr`] tree,
//! so this is a recursive walk rather than a flat operator-stack reduction.
//! `operand_stack`/`type_stack` are still the registers sub-results move
//! through: every leaf pushes, every binary/unary/call node pops its
//! operands and pushes its result, and each top-level expression restores
//! the stacks to their pre-evaluation depth plus exactly one result.

use patito_core::{Op, QuadArg, Type};

use super::Context;
use crate::ast::{BinOp, Expr, UnaryOp};
use crate::semantic_cube;

pub(crate) enum CallResult {
    Error,
    Void,
    Value(i64, Type),
}

fn push_operand(ctx: &mut Context, addr: i64, ty: Type) {
    ctx.operand_stack.push(addr);
    ctx.type_stack.push(ty);
}

fn pop_operand(ctx: &mut Context) -> (i64, Type) {
    let addr = ctx.operand_stack.pop().expect("operand stack underflow");
    let ty = ctx.type_stack.pop().expect("type stack underflow");
    (addr, ty)
}

fn quad_op(op: BinOp) -> Op {
    match op {
        BinOp::Plus => Op::Plus,
        BinOp::Minus => Op::Minus,
        BinOp::Mul => Op::Mul,
        BinOp::Div => Op::Div,
        BinOp::Gt => Op::Gt,
        BinOp::Lt => Op::Lt,
        BinOp::Neq => Op::Neq,
    }
}

/// Evaluate `expr`, emitting quadruples as needed. Returns its result
/// address and type, or `None` if a type error was recorded -- the caller
/// should treat that as "this statement/expression cannot be completed"
/// without emitting anything further from it.
pub(crate) fn emit_expr(ctx: &mut Context, expr: &Expr) -> Option<(i64, Type)> {
    let start = ctx.operand_stack.len();
    if !walk(ctx, expr) {
        debug_assert_eq!(ctx.operand_stack.len(), start);
        return None;
    }
    let result = pop_operand(ctx);
    debug_assert_eq!(ctx.operand_stack.len(), start);
    Some(result)
}

fn walk(ctx: &mut Context, expr: &Expr) -> bool {
    match expr {
        Expr::IntLit(value, span) => match ctx.constants.add_int(*value, &mut ctx.memory_map, span.line) {
            Ok(addr) => {
                push_operand(ctx, addr, Type::Int);
                true
            }
            Err(e) => {
                ctx.errors.push(e);
                false
            }
        },
        Expr::FloatLit(value, span) => match ctx.constants.add_float(*value, &mut ctx.memory_map, span.line) {
            Ok(addr) => {
                push_operand(ctx, addr, Type::Float);
                true
            }
            Err(e) => {
                ctx.errors.push(e);
                false
            }
        },
        Expr::Var(name, span) => match ctx.variables.lookup(name) {
            Some(info) => {
                push_operand(ctx, info.address, info.ty);
                true
            }
            None => {
                ctx.error(span.line, format!("variable '{name}' is not declared"));
                false
            }
        },
        Expr::Unary(op, inner, span) => {
            if !walk(ctx, inner) {
                return false;
            }
            let (addr, ty) = pop_operand(ctx);
            let Some(result_ty) = semantic_cube::unary(ty, *op) else {
                ctx.error(span.line, format!("unary operator is not defined for type '{ty}'"));
                return false;
            };
            match op {
                UnaryOp::Plus => {
                    push_operand(ctx, addr, result_ty);
                    true
                }
                UnaryOp::Minus => emit_negate(ctx, addr, result_ty, span.line),
            }
        }
        Expr::Binary(op, lhs, rhs, span) => {
            if !walk(ctx, lhs) {
                return false;
            }
            if !walk(ctx, rhs) {
                return false;
            }
            let (right_addr, right_ty) = pop_operand(ctx);
            let (left_addr, left_ty) = pop_operand(ctx);
            let Some(result_ty) = semantic_cube::binary(left_ty, *op, right_ty) else {
                ctx.error(span.line, format!("operator is not defined for '{left_ty}' and '{right_ty}'"));
                return false;
            };
            match ctx.memory_map.assign_temp(result_ty, span.line) {
                Ok(temp) => {
                    ctx.gen_quad(quad_op(*op), left_addr, right_addr, temp);
                    push_operand(ctx, temp, result_ty);
                    true
                }
                Err(e) => {
                    ctx.errors.push(e);
                    false
                }
            }
        }
        Expr::Call { name, args, span } => match emit_call(ctx, name, args, span.line) {
            CallResult::Error => false,
            CallResult::Void => {
                ctx.error(span.line, format!("void function '{name}' cannot be used as an expression"));
                false
            }
            CallResult::Value(addr, ty) => {
                push_operand(ctx, addr, ty);
                true
            }
        },
    }
}

/// `-x` has no dedicated opcode; it lowers to `0 - x` in a fresh temp,
/// reusing the same interned zero constant every call site needs it.
fn emit_negate(ctx: &mut Context, addr: i64, ty: Type, line: usize) -> bool {
    let zero = match ty {
        Type::Float => ctx.constants.add_float(0.0, &mut ctx.memory_map, line),
        _ => ctx.constants.add_int(0, &mut ctx.memory_map, line),
    };
    let zero = match zero {
        Ok(z) => z,
        Err(e) => {
            ctx.errors.push(e);
            return false;
        }
    };
    match ctx.memory_map.assign_temp(ty, line) {
        Ok(temp) => {
            ctx.gen_quad(Op::Minus, zero, addr, temp);
            push_operand(ctx, temp, ty);
            true
        }
        Err(e) => {
            ctx.errors.push(e);
            false
        }
    }
}

/// Shared by call-as-expression and call-as-statement (§4.6.5): validates
/// arity and per-argument assignability, emits `ERA`/`PARAM*`/`GOSUB`, and
/// -- when the callee is non-void -- copies its return slot into a fresh
/// temp, exactly as the statement form does even though the result may go
/// unused.
pub(crate) fn emit_call(ctx: &mut Context, name: &str, args: &[Expr], line: usize) -> CallResult {
    if !ctx.functions.exists(name) {
        ctx.error(line, format!("function '{name}' is not declared"));
        return CallResult::Error;
    }
    let params = ctx.functions.get(name).expect("checked above").params.clone();
    if args.len() != params.len() {
        ctx.error(line, format!("function '{name}' expects {} argument(s), found {}", params.len(), args.len()));
        return CallResult::Error;
    }

    let mut arg_addrs = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let Some((addr, ty)) = emit_expr(ctx, arg) else {
            return CallResult::Error;
        };
        let (_, param_ty) = &params[i];
        let param_ty = *param_ty;
        if !semantic_cube::can_assign(param_ty, ty) {
            ctx.error(arg.span().line, format!("argument {} of '{name}': expected '{param_ty}', found '{ty}'", i + 1));
            return CallResult::Error;
        }
        arg_addrs.push(addr);
    }

    ctx.gen_quad(Op::Era, name, QuadArg::None, QuadArg::None);
    for (i, addr) in arg_addrs.iter().enumerate() {
        ctx.gen_quad(Op::Param, *addr, QuadArg::None, i as i64);
    }
    let gosub_idx = ctx.gen_quad(Op::Gosub, name, QuadArg::None, QuadArg::None);
    ctx.pending_gosubs.push((gosub_idx, name.to_string()));

    let entry = ctx.functions.get(name).expect("checked above");
    if entry.return_type == Type::Void {
        return CallResult::Void;
    }
    let return_type = entry.return_type;
    let return_address = entry.return_address.expect("non-void function was given a return slot in pass 1");
    match ctx.memory_map.assign_temp(return_type, line) {
        Ok(temp) => {
            ctx.gen_quad(Op::Assign, return_address, QuadArg::None, temp);
            CallResult::Value(temp, return_type)
        }
        Err(e) => {
            ctx.errors.push(e);
            CallResult::Error
        }
    }
}
