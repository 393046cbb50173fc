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

//! Backend that lowers an attributed syntax tree of a small imperative
//! language to a WebAssembly text module.

pub mod assembler;
pub mod attribute;
#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
pub mod compiler;
pub mod context;
pub mod env;
pub mod error;
pub mod expr;
pub mod heap;
pub mod labels;
pub mod loader;
pub mod lower;
pub mod ops;
pub mod tree;
pub mod types;
pub mod wat;
#[cfg(not(target_arch = "wasm32"))]
pub mod wasm_runner;

pub use attribute::{ActionPair, ActionTable, Visit};
pub use compiler::Compiler;
pub use context::TranslationContext;
pub use error::CompileError;
pub use tree::SyntaxNode;
