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

//! Function and module assembly.
//!
//! Walks the top-level function declarations of a decorated tree and
//! produces a [`WatModule`]: runtime imports, one `func` per defined
//! function, and one export per declared name.

use std::collections::HashSet;

use crate::context::TranslationContext;
use crate::env::FunctionSignature;
use crate::error::CompileError;
use crate::labels::Frame;
use crate::lower::translate_block;
use crate::tree::SyntaxNode;
use crate::types::WasmType;
use crate::wat::{Func, Import, Instr, WatModule};

/// Import module every host call lives in.
pub const RUNTIME_MODULE: &str = "runtime";

pub const RT_MALLOC: &str = "rt_malloc";
pub const RT_FREE: &str = "rt_free";
pub const RT_STORE: &str = "rt_store";
pub const RT_LOAD: &str = "rt_load";

/// Internal name of the `echo` import for one width.
pub fn echo_import(ty: WasmType) -> String {
    format!("rt_echo_{}", ty)
}

/// The fixed host imports, in the order they appear in every module:
/// one `echo` per width, then `malloc`, `free`, `store`, `load`.
pub fn runtime_imports() -> Vec<Import> {
    let import = |field: &str, func: String, params: Vec<WasmType>, result: Option<WasmType>| Import {
        module: RUNTIME_MODULE.to_string(),
        field: field.to_string(),
        func,
        params,
        result,
    };

    let mut imports: Vec<Import> = WasmType::ALL
        .iter()
        .map(|&ty| import("echo", echo_import(ty), vec![ty], None))
        .collect();
    imports.push(import("malloc", RT_MALLOC.into(), vec![WasmType::I32], Some(WasmType::I32)));
    imports.push(import("free", RT_FREE.into(), vec![WasmType::I32], None));
    imports.push(import("store", RT_STORE.into(), vec![WasmType::I32, WasmType::I32], None));
    imports.push(import("load", RT_LOAD.into(), vec![WasmType::I32], Some(WasmType::I32)));
    imports
}

/// Assemble a module from `root`, whose children are function declarations.
///
/// The context is reset first; everything it holds afterwards belongs to
/// this module.
pub fn assemble(root: &SyntaxNode, ctx: &mut TranslationContext) -> Result<WatModule, CompileError> {
    ctx.reset();

    let mut declarations = Vec::with_capacity(root.children.len());
    for (index, node) in root.children.iter().enumerate() {
        let signature = node.attrs.signature.as_ref().ok_or_else(|| {
            CompileError::malformed(format!(
                "top-level `{}` node {} has no function signature",
                node.category, index
            ))
        })?;
        ctx.env.declare_function(signature.clone());
        declarations.push((node, signature));
    }

    let mut funcs = Vec::new();
    let mut defined = HashSet::new();
    for (node, signature) in declarations {
        if node.attrs.skip {
            tracing::trace!(function = %signature.name, "forward declaration, no body emitted");
            continue;
        }
        if !defined.insert(signature.name.as_str()) {
            return Err(CompileError::malformed(format!(
                "function `{}` defined more than once",
                signature.name
            )));
        }
        funcs.push(translate_function(node, signature, ctx)?);
    }

    let mut exports = Vec::new();
    for name in ctx.env.function_names() {
        if !defined.contains(name.as_str()) {
            return Err(CompileError::Unresolved(name.clone()));
        }
        exports.push(name.clone());
    }

    Ok(WatModule {
        imports: runtime_imports(),
        funcs,
        exports,
    })
}

pub fn translate_function(
    node: &SyntaxNode,
    signature: &FunctionSignature,
    ctx: &mut TranslationContext,
) -> Result<Func, CompileError> {
    tracing::debug!(function = %signature.name, params = signature.params.len(), "translating function");

    let depth = ctx.labels.depth();
    let result = signature.ret.wasm();
    ctx.env.reset_temporaries();
    let label = ctx.labels.enter_function();
    ctx.env.push_scope();

    let translated = function_body(node, signature, result, ctx);

    let frame = ctx.labels.exit()?;
    ctx.env.pop_scope()?;
    let (locals, body) = translated?;

    if frame != Frame::Function(label.clone()) || ctx.labels.depth() != depth {
        return Err(CompileError::unbalanced(format!(
            "label stack not restored after `{}`",
            signature.name
        )));
    }

    Ok(Func {
        name: signature.name.clone(),
        params: signature
            .params
            .iter()
            .map(|p| (p.name.clone(), p.ty.wasm()))
            .collect(),
        result,
        locals,
        label,
        body,
    })
}

type Locals = Vec<(String, WasmType)>;

fn function_body(
    node: &SyntaxNode,
    signature: &FunctionSignature,
    result: WasmType,
    ctx: &mut TranslationContext,
) -> Result<(Locals, Vec<Instr>), CompileError> {
    for param in &signature.params {
        ctx.env.declare(&param.name, param.ty);
    }

    let mut locals = Vec::new();
    let mut seen = HashSet::new();
    for binding in &node.attrs.locals {
        if signature.is_param(&binding.name) || !seen.insert(binding.name.as_str()) {
            continue;
        }
        ctx.env.declare(&binding.name, binding.ty);
        locals.push((binding.name.clone(), binding.ty.wasm()));
    }

    let index = node.attrs.body.ok_or_else(|| {
        CompileError::malformed(format!("function `{}` has no body index", signature.name))
    })?;
    let body_node = node.child(index)?;

    let body = ctx.capture(|ctx| {
        translate_block(body_node, ctx)?;
        // value of a body that runs off the end
        ctx.emit(Instr::zero(result));
        Ok(())
    })?;
    Ok((locals, body))
}
