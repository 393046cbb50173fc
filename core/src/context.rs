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

use std::mem;

use crate::env::SymbolEnv;
use crate::error::CompileError;
use crate::labels::LabelStack;
use crate::wat::Instr;

/// All mutable state of one module translation. Create one per module;
/// never share between translations.
#[derive(Debug, Default)]
pub struct TranslationContext {
    pub env: SymbolEnv,
    pub labels: LabelStack,
    /// Instruction sink for the region currently being generated.
    code: Vec<Instr>,
}

impl TranslationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unwind scopes to the root, zero temporaries and empty the label stack.
    pub fn reset(&mut self) {
        self.env.reset();
        self.labels.reset();
        self.code.clear();
    }

    pub fn emit(&mut self, instr: Instr) {
        self.code.push(instr);
    }

    /// Run `f` against an empty sink and return what it emitted. The
    /// enclosing region's instructions are restored afterwards, also on error.
    pub fn capture<F>(&mut self, f: F) -> Result<Vec<Instr>, CompileError>
    where
        F: FnOnce(&mut Self) -> Result<(), CompileError>,
    {
        let outer = mem::take(&mut self.code);
        let result = f(self);
        let inner = mem::replace(&mut self.code, outer);
        result.map(|()| inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarType;

    #[test]
    fn test_capture_nests_regions() {
        let mut ctx = TranslationContext::new();
        ctx.emit(Instr::I32Const(1));
        let inner = ctx
            .capture(|ctx| {
                ctx.emit(Instr::I32Const(2));
                let deeper = ctx.capture(|ctx| {
                    ctx.emit(Instr::Unreachable);
                    Ok(())
                })?;
                assert_eq!(deeper, vec![Instr::Unreachable]);
                Ok(())
            })
            .unwrap();
        assert_eq!(inner, vec![Instr::I32Const(2)]);
        assert!(ctx.capture(|_| Ok(())).unwrap().is_empty());
    }

    #[test]
    fn test_capture_restores_on_error() {
        let mut ctx = TranslationContext::new();
        ctx.emit(Instr::I32Const(7));
        let err = ctx.capture(|ctx| {
            ctx.emit(Instr::Unreachable);
            Err(CompileError::Unresolved("x".into()))
        });
        assert!(err.is_err());
        ctx.emit(Instr::I32Const(8));
        let mut all = Vec::new();
        mem::swap(&mut all, &mut ctx.code);
        assert_eq!(all, vec![Instr::I32Const(7), Instr::I32Const(8)]);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut ctx = TranslationContext::new();
        ctx.env.push_scope();
        ctx.env.declare("x", ScalarType::Int);
        ctx.env.new_temporary(ScalarType::Int);
        ctx.labels.enter_function();
        ctx.reset();
        assert_eq!(ctx.env.depth(), 0);
        assert_eq!(ctx.env.temporaries_in_use(), 0);
        assert_eq!(ctx.labels.depth(), 0);
        assert!(ctx.env.lookup_variable_type("x").is_err());
    }
}
