/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * This file is part of the Ark Sovereign Compiler.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * 1. OPEN SOURCE: You may use this file under the terms of the GNU Affero
 * General Public License v3.0. If you link to this code, your ENTIRE
 * application must be open-sourced under AGPLv3.
 *
 * 2. COMMERCIAL: For proprietary use, you must obtain a Commercial License
 * from Sovereign Systems.
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

//! Expression code generation.
//!
//! Every expression node carries its operation in `attrs.code` and the slot
//! holding its result in `attrs.val`. Lowering a node emits instructions that
//! leave that slot filled: operands are evaluated into their own slots first,
//! then pushed left to right, combined, and stored into the node's `out`.

use crate::assembler::RT_LOAD;
use crate::context::TranslationContext;
use crate::error::CompileError;
use crate::ops::{BinaryOp, LiteralValue, Operation, UnaryOp, ValueRef};
use crate::tree::SyntaxNode;
use crate::types::{ScalarType, WasmType};
use crate::wat::{Instr, NumOp};

pub fn translate_expr(node: &SyntaxNode, ctx: &mut TranslationContext) -> Result<(), CompileError> {
    match node.code()? {
        Operation::Get { source, out } => {
            let ty = read_var(source, ctx)?;
            write_var(out, ty, ctx)
        }
        Operation::GetLiteral {
            source,
            out,
            literal,
        } => {
            translate_literal(node.child(*literal)?, ctx)?;
            let ty = read_var(source, ctx)?;
            write_var(out, ty, ctx)
        }
        Operation::Literal { value, out } => {
            ctx.emit(literal_const(value));
            write_var(out, value.ty().wasm(), ctx)
        }
        Operation::Call {
            function,
            args,
            out,
        } => translate_call(node, function, args, out, ctx),
        Operation::Binary {
            operator,
            lhs,
            rhs: Some(rhs),
            out,
        } => translate_binary(node, *operator, *lhs, *rhs, out, ctx),
        Operation::Binary {
            operator,
            lhs,
            rhs: None,
            out,
        } => match operator {
            BinaryOp::Add => {
                let operand = operand(node, *lhs, ctx)?;
                ctx.emit(Instr::local_get(&operand.name));
                write_var(out, operand.ty.wasm(), ctx)
            }
            BinaryOp::Sub => {
                let operand = operand(node, *lhs, ctx)?;
                let ty = operand.ty.wasm();
                ctx.emit(Instr::zero(ty));
                ctx.emit(Instr::local_get(&operand.name));
                ctx.emit(numeric(ty, NumOp::Sub, "-", operand.ty)?);
                write_var(out, ty, ctx)
            }
            // `*x` arrives as a multiply with no right operand
            BinaryOp::Mul => translate_deref(node, *lhs, out, ctx),
            other => Err(CompileError::malformed(format!(
                "binary `{}` without a right operand",
                other
            ))),
        },
        Operation::Unary {
            operator,
            operand: index,
            out,
        } => {
            let operand = operand(node, *index, ctx)?;
            let ty = operand.ty.wasm();
            ctx.emit(Instr::local_get(&operand.name));
            let produced = match operator {
                UnaryOp::Not => {
                    emit_is_zero(ty, ctx);
                    WasmType::I32
                }
                UnaryOp::Complement => {
                    if ty.is_float() {
                        return Err(CompileError::Unsupported {
                            op: operator.symbol().to_string(),
                            ty: operand.ty,
                        });
                    }
                    ctx.emit(Instr::I32Const(-1));
                    ctx.emit(Instr::Numeric(ty, NumOp::Xor));
                    ty
                }
            };
            write_var(out, produced, ctx)
        }
        Operation::Deref { operand, out } => translate_deref(node, *operand, out, ctx),
        Operation::Assign { value, out } => {
            let value = operand(node, *value, ctx)?;
            ctx.emit(Instr::local_get(&value.name));
            write_var(out, value.ty.wasm(), ctx)
        }
        statement => Err(CompileError::UnknownTag {
            kind: "expression",
            tag: statement.tag().to_string(),
        }),
    }
}

/// Lower child `index` and return the slot its value ends up in.
pub(crate) fn operand(
    node: &SyntaxNode,
    index: usize,
    ctx: &mut TranslationContext,
) -> Result<ValueRef, CompileError> {
    let child = node.child(index)?;
    translate_expr(child, ctx)?;
    let val = child.val()?;
    ctx.env.lookup_variable_type(&val.name)?;
    Ok(val.clone())
}

/// Leave 1 on the stack when the value on top is zero, 0 otherwise.
pub(crate) fn emit_is_zero(ty: WasmType, ctx: &mut TranslationContext) {
    if ty.is_float() {
        ctx.emit(Instr::zero(ty));
        ctx.emit(Instr::Numeric(ty, NumOp::Eq));
    } else {
        ctx.emit(Instr::Numeric(ty, NumOp::Eqz));
    }
}

fn translate_binary(
    node: &SyntaxNode,
    operator: BinaryOp,
    lhs: usize,
    rhs: usize,
    out: &str,
    ctx: &mut TranslationContext,
) -> Result<(), CompileError> {
    let left = operand(node, lhs, ctx)?;
    ctx.emit(Instr::local_get(&left.name));
    let right = operand(node, rhs, ctx)?;
    ctx.emit(Instr::local_get(&right.name));
    // operands are homogeneous after semantic analysis; the left one decides
    let ty = left.ty.wasm();
    let op = num_op(operator);
    ctx.emit(numeric(ty, op, operator.symbol(), left.ty)?);
    write_var(out, op.result(ty), ctx)
}

fn translate_call(
    node: &SyntaxNode,
    function: &str,
    args: &[usize],
    out: &str,
    ctx: &mut TranslationContext,
) -> Result<(), CompileError> {
    let signature = ctx.env.lookup_function(function)?;
    if signature.params.len() != args.len() {
        return Err(CompileError::malformed(format!(
            "`{}` takes {} argument(s), called with {}",
            function,
            signature.params.len(),
            args.len()
        )));
    }
    let mut values = Vec::with_capacity(args.len());
    for &index in args {
        values.push(operand(node, index, ctx)?);
    }
    for value in &values {
        ctx.emit(Instr::local_get(&value.name));
    }
    ctx.emit(Instr::call(function));
    write_var(out, signature.ret.wasm(), ctx)
}

fn translate_deref(
    node: &SyntaxNode,
    index: usize,
    out: &str,
    ctx: &mut TranslationContext,
) -> Result<(), CompileError> {
    let pointer = operand(node, index, ctx)?;
    ctx.emit(Instr::local_get(&pointer.name));
    ctx.emit(Instr::call(RT_LOAD));
    write_var(out, WasmType::I32, ctx)
}

/// A literal child of `get_literal`.
fn translate_literal(node: &SyntaxNode, ctx: &mut TranslationContext) -> Result<(), CompileError> {
    match node.code()? {
        Operation::Literal { value, out } => {
            ctx.emit(literal_const(value));
            write_var(out, value.ty().wasm(), ctx)
        }
        other => Err(CompileError::UnknownTag {
            kind: "literal",
            tag: other.tag().to_string(),
        }),
    }
}

pub(crate) fn literal_const(value: &LiteralValue) -> Instr {
    match value {
        LiteralValue::Int(v) => Instr::I32Const(*v),
        LiteralValue::Float(v) => Instr::F32Const(*v),
        LiteralValue::Char(c) => Instr::I32Const(*c as u32 as i32),
        LiteralValue::Bool(b) => Instr::I32Const(i32::from(*b)),
        LiteralValue::Void => Instr::I32Const(0),
    }
}

fn num_op(operator: BinaryOp) -> NumOp {
    match operator {
        BinaryOp::Add => NumOp::Add,
        BinaryOp::Sub => NumOp::Sub,
        BinaryOp::Mul => NumOp::Mul,
        BinaryOp::Div => NumOp::Div,
        BinaryOp::Eq => NumOp::Eq,
        BinaryOp::Ne => NumOp::Ne,
        BinaryOp::Gt => NumOp::Gt,
        BinaryOp::Lt => NumOp::Lt,
        BinaryOp::Ge => NumOp::Ge,
        BinaryOp::Le => NumOp::Le,
        BinaryOp::LogicalAnd | BinaryOp::BitAnd => NumOp::And,
        BinaryOp::LogicalOr | BinaryOp::BitOr => NumOp::Or,
    }
}

fn numeric(ty: WasmType, op: NumOp, symbol: &str, scalar: ScalarType) -> Result<Instr, CompileError> {
    match op.mnemonic(ty) {
        Some(_) => Ok(Instr::Numeric(ty, op)),
        None => Err(CompileError::Unsupported {
            op: symbol.to_string(),
            ty: scalar,
        }),
    }
}

fn read_var(name: &str, ctx: &mut TranslationContext) -> Result<WasmType, CompileError> {
    let ty = ctx.env.lookup_variable_type(name)?.wasm();
    ctx.emit(Instr::local_get(name));
    Ok(ty)
}

/// Store the `produced` value on top of the stack into `name`, whose slot
/// must have the same width.
pub(crate) fn write_var(name: &str, produced: WasmType, ctx: &mut TranslationContext) -> Result<(), CompileError> {
    let slot = ctx.env.lookup_variable_type(name)?.wasm();
    if slot != produced {
        return Err(CompileError::UnknownTag {
            kind: "type",
            tag: format!("{} stored into {} slot ${}", produced, slot, name),
        });
    }
    ctx.emit(Instr::local_set(name));
    Ok(())
}
