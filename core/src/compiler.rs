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

use crate::assembler::assemble;
use crate::attribute::ActionTable;
use crate::context::TranslationContext;
use crate::error::CompileError;
use crate::tree::SyntaxNode;
use crate::wat::WatModule;

/// Drives one module translation: attribution over the raw tree, then
/// assembly. Every call works on a fresh [`TranslationContext`], so a
/// `Compiler` can be reused across modules.
#[derive(Debug, Default)]
pub struct Compiler {
    actions: ActionTable,
}

impl Compiler {
    pub fn new(actions: ActionTable) -> Self {
        Self { actions }
    }

    /// Check that every category in `tree` has handlers, without running them.
    pub fn validate(&self, tree: &SyntaxNode) -> Result<(), CompileError> {
        self.actions.validate(tree)
    }

    pub fn compile_module(&self, tree: &mut SyntaxNode) -> Result<WatModule, CompileError> {
        let mut ctx = TranslationContext::new();
        self.actions.run(tree, &mut ctx)?;
        tracing::debug!(functions = tree.children.len(), "attribution finished");
        assemble(tree, &mut ctx)
    }

    /// Decorate `tree` in place and return the module text.
    pub fn compile(&self, tree: &mut SyntaxNode) -> Result<String, CompileError> {
        self.compile_module(tree).map(|module| module.to_string())
    }

    /// Assemble a tree whose attributes are already filled in.
    pub fn compile_decorated(tree: &SyntaxNode) -> Result<String, CompileError> {
        let mut ctx = TranslationContext::new();
        assemble(tree, &mut ctx).map(|module| module.to_string())
    }
}
