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

//! A tiny front end for tests: builders for raw trees and the per-category
//! attribute handlers that decorate them.

#![allow(dead_code)]

use mygo_wat::attribute::Action;
use mygo_wat::env::{Binding, FunctionSignature};
use mygo_wat::ops::{BinaryOp, ElseBranch, LiteralValue, Operation, UnaryOp, ValueRef};
use mygo_wat::types::ScalarType;
use mygo_wat::{ActionPair, ActionTable, CompileError, Compiler, SyntaxNode, TranslationContext, Visit};
use serde_json::json;

type Outcome = Result<(), CompileError>;

// =============================================================================
// Tree builders
// =============================================================================

fn t(category: &str, value: &str) -> SyntaxNode {
    SyntaxNode::terminal(category, value)
}

fn n(category: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::branch(category, children)
}

pub fn program(functions: Vec<SyntaxNode>) -> SyntaxNode {
    n("program", functions)
}

/// `ret name(params) { body }`; no body makes a forward declaration.
pub fn function(name: &str, ret: &str, params: &[(&str, &str)], body: Option<Vec<SyntaxNode>>) -> SyntaxNode {
    let params = params
        .iter()
        .map(|(ty, name)| n("param", vec![t("type", ty), t("id", name)]))
        .collect();
    let mut children = vec![t("id", name), t("type", ret), n("params", params)];
    if let Some(body) = body {
        children.push(block(body));
    }
    n("function", children)
}

pub fn block(stmts: Vec<SyntaxNode>) -> SyntaxNode {
    n("block", stmts)
}

pub fn declare(ty: &str, name: &str, init: Option<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![t("type", ty), t("id", name)];
    children.extend(init);
    n("declare", children)
}

pub fn assign(name: &str, value: SyntaxNode) -> SyntaxNode {
    n("assign", vec![t("id", name), value])
}

pub fn while_loop(cond: SyntaxNode, body: Vec<SyntaxNode>) -> SyntaxNode {
    n("while", vec![cond, block(body)])
}

/// `otherwise` is either a `block(..)` or another `if_stmt(..)`.
pub fn if_stmt(cond: SyntaxNode, then: Vec<SyntaxNode>, otherwise: Option<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![cond, block(then)];
    children.extend(otherwise);
    n("if", children)
}

pub fn ret(value: SyntaxNode) -> SyntaxNode {
    n("return", vec![value])
}

pub fn echo(value: SyntaxNode) -> SyntaxNode {
    n("echo", vec![value])
}

pub fn expr_stmt(value: SyntaxNode) -> SyntaxNode {
    n("expr", vec![value])
}

pub fn brk() -> SyntaxNode {
    t("break", "break")
}

pub fn cont() -> SyntaxNode {
    t("continue", "continue")
}

pub fn num(text: &str) -> SyntaxNode {
    t("num", text)
}

pub fn var(name: &str) -> SyntaxNode {
    t("var", name)
}

pub fn bin(lhs: SyntaxNode, op: &str, rhs: SyntaxNode) -> SyntaxNode {
    SyntaxNode {
        value: op.into(),
        ..n("binop", vec![lhs, rhs])
    }
}

pub fn neg(operand: SyntaxNode) -> SyntaxNode {
    SyntaxNode {
        value: "-".into(),
        ..n("binop", vec![operand])
    }
}

pub fn not(operand: SyntaxNode) -> SyntaxNode {
    n("not", vec![operand])
}

pub fn call(name: &str, args: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode {
        value: name.into(),
        ..n("call", args)
    }
}

pub fn deref(pointer: SyntaxNode) -> SyntaxNode {
    n("deref", vec![pointer])
}

pub fn malloc(name: &str, size: SyntaxNode) -> SyntaxNode {
    n("malloc", vec![t("id", name), size])
}

pub fn free(pointer: SyntaxNode) -> SyntaxNode {
    n("free", vec![pointer])
}

pub fn store(pointer: SyntaxNode, value: SyntaxNode) -> SyntaxNode {
    n("store", vec![pointer, value])
}

// =============================================================================
// Attribute handlers
// =============================================================================

fn scalar(text: &str) -> Result<ScalarType, CompileError> {
    text.parse()
}

fn child_val(visit: &Visit<'_>, index: usize) -> Result<ValueRef, CompileError> {
    Ok(visit.child(index)?.val()?.clone())
}

fn set_value(visit: &mut Visit<'_>, code: Operation, ty: ScalarType, out: String) {
    let attrs = visit.attrs_mut();
    attrs.code = Some(code);
    attrs.val = Some(ValueRef::new(ty, out));
}

/// Statements remember how many temporaries were live when they started and
/// give back everything claimed since when they end.
fn open_statement(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let mark = ctx.env.temporaries_in_use();
    visit.attrs_mut().extra.insert("mark".into(), json!(mark));
    Ok(())
}

fn close_statement(visit: &mut Visit<'_>, ctx: &mut TranslationContext, code: Operation) -> Outcome {
    let mark = visit.attrs().extra.get("mark").and_then(|m| m.as_u64()).unwrap_or(0) as usize;
    while ctx.env.temporaries_in_use() > mark {
        ctx.env.release_temporary()?;
    }
    visit.attrs_mut().code = Some(code);
    Ok(())
}

fn function_enter(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let name = visit.child(0)?.value.clone();
    let ret = scalar(&visit.child(1)?.value)?;
    let mut params = Vec::new();
    for param in &visit.child(2)?.children {
        params.push(Binding::new(param.child(1)?.value.clone(), scalar(&param.child(0)?.value)?));
    }
    let signature = FunctionSignature { name, params, ret };

    ctx.env.declare_function(signature.clone());
    ctx.env.push_scope();
    ctx.env.reset_temporaries();
    for param in &signature.params {
        ctx.env.declare(&param.name, param.ty);
    }

    let defined = visit.child_count() > 3;
    let attrs = visit.attrs_mut();
    attrs.signature = Some(signature);
    attrs.skip = !defined;
    attrs.body = defined.then_some(3);
    Ok(())
}

fn function_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let scope = ctx.env.pop_scope()?;
    visit.attrs_mut().locals = scope.bindings().to_vec();
    Ok(())
}

fn declare_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let ty = scalar(&visit.child(0)?.value)?;
    let name = visit.child(1)?.value.clone();
    ctx.env.declare(&name, ty);
    let code = if visit.child_count() > 2 {
        Operation::Assign { value: 2, out: name }
    } else {
        Operation::Pass
    };
    close_statement(visit, ctx, code)
}

fn assign_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let name = visit.child(0)?.value.clone();
    ctx.env.lookup_variable_type(&name)?;
    close_statement(visit, ctx, Operation::Assign { value: 1, out: name })
}

fn while_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::While { cond: 0, body: 1 })
}

fn if_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let else_branch = match visit.child_count() {
        2 => ElseBranch::None,
        _ if visit.child(2)?.category == "if" => ElseBranch::Nest { node: 2 },
        _ => ElseBranch::Else { node: 2 },
    };
    close_statement(
        visit,
        ctx,
        Operation::If {
            cond: 0,
            then_branch: 1,
            else_branch,
        },
    )
}

fn return_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Return { value: 0 })
}

fn echo_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Echo { value: 0 })
}

fn expr_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Expr { value: 0 })
}

fn break_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Break)
}

fn continue_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Continue)
}

fn malloc_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let name = visit.child(0)?.value.clone();
    ctx.env.lookup_variable_type(&name)?;
    close_statement(visit, ctx, Operation::Malloc { size: 1, out: name })
}

fn free_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Free { pointer: 0 })
}

fn store_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    close_statement(visit, ctx, Operation::Store { pointer: 0, value: 1 })
}

fn num_enter(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let text = visit.value().to_string();
    let value = if text.contains('.') {
        text.parse()
            .map(LiteralValue::Float)
            .map_err(|_| CompileError::Malformed(format!("bad float `{}`", text)))?
    } else {
        text.parse()
            .map(LiteralValue::Int)
            .map_err(|_| CompileError::Malformed(format!("bad int `{}`", text)))?
    };
    let ty = value.ty();
    let out = ctx.env.new_temporary(ty);
    set_value(visit, Operation::Literal { value, out: out.clone() }, ty, out);
    Ok(())
}

fn var_enter(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let source = visit.value().to_string();
    let ty = ctx.env.lookup_variable_type(&source)?;
    let out = ctx.env.new_temporary(ty);
    set_value(visit, Operation::Get { source, out: out.clone() }, ty, out);
    Ok(())
}

fn binop_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let operator: BinaryOp = serde_json::from_value(json!(visit.value())).map_err(|_| CompileError::UnknownTag {
        kind: "operator",
        tag: visit.value().to_string(),
    })?;
    let lhs = child_val(visit, 0)?;
    let rhs = (visit.child_count() > 1).then_some(1);
    let ty = match operator {
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => ScalarType::Bool,
        op if op.is_comparison() => ScalarType::Bool,
        _ => lhs.ty,
    };
    let out = ctx.env.new_temporary(ty);
    set_value(
        visit,
        Operation::Binary {
            operator,
            lhs: 0,
            rhs,
            out: out.clone(),
        },
        ty,
        out,
    );
    Ok(())
}

fn not_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let out = ctx.env.new_temporary(ScalarType::Bool);
    let code = Operation::Unary {
        operator: UnaryOp::Not,
        operand: 0,
        out: out.clone(),
    };
    set_value(visit, code, ScalarType::Bool, out);
    Ok(())
}

fn call_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let function = visit.value().to_string();
    let ty = ctx.env.lookup_function_return_type(&function)?;
    let out = ctx.env.new_temporary(ty);
    let code = Operation::Call {
        function,
        args: (0..visit.child_count()).collect(),
        out: out.clone(),
    };
    set_value(visit, code, ty, out);
    Ok(())
}

fn deref_exit(visit: &mut Visit<'_>, ctx: &mut TranslationContext) -> Outcome {
    let out = ctx.env.new_temporary(ScalarType::Int);
    set_value(visit, Operation::Deref { operand: 0, out: out.clone() }, ScalarType::Int, out);
    Ok(())
}

pub fn actions() -> ActionTable {
    let statement = |exit: Action| ActionPair::new(open_statement, exit);
    ActionTable::new()
        .with("program", ActionPair::none())
        .with("function", ActionPair::new(function_enter, function_exit))
        .with("params", ActionPair::none())
        .with("param", ActionPair::none())
        .with("type", ActionPair::none())
        .with("id", ActionPair::none())
        .with("block", ActionPair::none())
        .with("declare", statement(declare_exit))
        .with("assign", statement(assign_exit))
        .with("while", statement(while_exit))
        .with("if", statement(if_exit))
        .with("return", statement(return_exit))
        .with("echo", statement(echo_exit))
        .with("expr", statement(expr_exit))
        .with("break", statement(break_exit))
        .with("continue", statement(continue_exit))
        .with("malloc", statement(malloc_exit))
        .with("free", statement(free_exit))
        .with("store", statement(store_exit))
        .with("num", ActionPair::inherited(num_enter))
        .with("var", ActionPair::inherited(var_enter))
        .with("binop", ActionPair::synthesized(binop_exit))
        .with("not", ActionPair::synthesized(not_exit))
        .with("call", ActionPair::synthesized(call_exit))
        .with("deref", ActionPair::synthesized(deref_exit))
}

/// Decorate `tree` in place and return the module text.
pub fn compile(tree: &mut SyntaxNode) -> Result<String, CompileError> {
    Compiler::new(actions()).compile(tree)
}
