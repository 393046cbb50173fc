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

use crate::assembler::{echo_import, RT_FREE, RT_MALLOC, RT_STORE};
use crate::context::TranslationContext;
use crate::error::CompileError;
use crate::expr::{emit_is_zero, operand, translate_expr, write_var};
use crate::labels::Frame;
use crate::ops::{ElseBranch, Operation};
use crate::tree::SyntaxNode;
use crate::types::WasmType;
use crate::wat::{Instr, NumOp};

/// Lower every statement child of a block node, in order.
pub fn translate_block(node: &SyntaxNode, ctx: &mut TranslationContext) -> Result<(), CompileError> {
    for stmt in &node.children {
        translate_stmt(stmt, ctx)?;
    }
    Ok(())
}

pub fn translate_stmt(node: &SyntaxNode, ctx: &mut TranslationContext) -> Result<(), CompileError> {
    match node.code()? {
        Operation::Pass => Ok(()),
        Operation::Assign { .. } => translate_expr(node, ctx),
        Operation::Expr { value } => translate_expr(node.child(*value)?, ctx),
        Operation::Return { value } => {
            let value = operand(node, *value, ctx)?;
            ctx.emit(Instr::local_get(&value.name));
            let target = ctx.labels.return_target()?.to_string();
            ctx.emit(Instr::Br(target));
            Ok(())
        }
        Operation::Echo { value } => {
            let value = operand(node, *value, ctx)?;
            ctx.emit(Instr::local_get(&value.name));
            ctx.emit(Instr::Call(echo_import(value.ty.wasm())));
            Ok(())
        }
        Operation::If {
            cond,
            then_branch,
            else_branch,
        } => translate_if(node, *cond, *then_branch, else_branch, ctx),
        Operation::While { cond, body } => translate_while(node, *cond, *body, ctx),
        Operation::Break => {
            let target = ctx.labels.break_target()?.to_string();
            ctx.emit(Instr::Br(target));
            Ok(())
        }
        Operation::Continue => {
            let target = ctx.labels.continue_target()?.to_string();
            ctx.emit(Instr::Br(target));
            Ok(())
        }
        Operation::Unreachable => {
            ctx.emit(Instr::Unreachable);
            Ok(())
        }
        Operation::Malloc { size, out } => {
            let size = operand(node, *size, ctx)?;
            ctx.emit(Instr::local_get(&size.name));
            ctx.emit(Instr::call(RT_MALLOC));
            write_var(out, WasmType::I32, ctx)
        }
        Operation::Free { pointer } => {
            let pointer = operand(node, *pointer, ctx)?;
            ctx.emit(Instr::local_get(&pointer.name));
            ctx.emit(Instr::call(RT_FREE));
            Ok(())
        }
        Operation::Store { pointer, value } => {
            let pointer = operand(node, *pointer, ctx)?;
            ctx.emit(Instr::local_get(&pointer.name));
            let value = operand(node, *value, ctx)?;
            ctx.emit(Instr::local_get(&value.name));
            ctx.emit(Instr::call(RT_STORE));
            Ok(())
        }
        expression => Err(CompileError::UnknownTag {
            kind: "statement",
            tag: expression.tag().to_string(),
        }),
    }
}

/// `cond != 0` then a two-armed `if`. A nested `if` in the false arm gives
/// the else-if chain.
fn translate_if(
    node: &SyntaxNode,
    cond: usize,
    then_branch: usize,
    else_branch: &ElseBranch,
    ctx: &mut TranslationContext,
) -> Result<(), CompileError> {
    let cond = operand(node, cond, ctx)?;
    let ty = cond.ty.wasm();
    ctx.emit(Instr::local_get(&cond.name));
    ctx.emit(Instr::zero(ty));
    ctx.emit(Instr::Numeric(ty, NumOp::Ne));

    let then_body = ctx.capture(|ctx| translate_block(node.child(then_branch)?, ctx))?;
    let else_body = match else_branch {
        ElseBranch::None => None,
        ElseBranch::Else { node: index } => {
            Some(ctx.capture(|ctx| translate_block(node.child(*index)?, ctx))?)
        }
        ElseBranch::Nest { node: index } => {
            let nested = node.child(*index)?;
            if !matches!(nested.code()?, Operation::If { .. }) {
                return Err(CompileError::malformed(format!(
                    "else-if arm holds `{}` instead of `if`",
                    nested.code()?.tag()
                )));
            }
            Some(ctx.capture(|ctx| translate_stmt(nested, ctx))?)
        }
    };

    ctx.emit(Instr::If {
        then_body,
        else_body,
    });
    Ok(())
}

/// `(block $exit (loop $entry <cond> br_if $exit <body> br $entry))`
fn translate_while(
    node: &SyntaxNode,
    cond: usize,
    body: usize,
    ctx: &mut TranslationContext,
) -> Result<(), CompileError> {
    let labels = ctx.labels.enter_loop();
    let looped = ctx.capture(|ctx| {
        let cond = operand(node, cond, ctx)?;
        ctx.emit(Instr::local_get(&cond.name));
        emit_is_zero(cond.ty.wasm(), ctx);
        ctx.emit(Instr::BrIf(labels.exit.clone()));
        translate_block(node.child(body)?, ctx)?;
        ctx.emit(Instr::Br(labels.entry.clone()));
        Ok(())
    });
    match ctx.labels.exit()? {
        Frame::Loop(closed) if closed == labels => {}
        other => {
            return Err(CompileError::unbalanced(format!(
                "loop `{}` closed frame {:?}",
                labels.entry, other
            )))
        }
    }
    let body = looped?;

    ctx.emit(Instr::Block {
        label: labels.exit,
        result: None,
        body: vec![Instr::Loop {
            label: labels.entry,
            body,
        }],
    });
    Ok(())
}
