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

use crate::types::ScalarType;
use thiserror::Error;

/// Every way a module translation can fail. All variants abort the
/// translation of the current module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A variable or function name not found in any enclosing scope.
    #[error("unresolved identifier `{0}`")]
    Unresolved(String),

    /// An attribute value outside the recognized set.
    #[error("unknown {kind} tag `{tag}`")]
    UnknownTag { kind: &'static str, tag: String },

    /// The operation has no instruction at the operand's width (e.g. `~` on float).
    #[error("operator `{op}` is not defined for `{ty}` operands")]
    Unsupported { op: String, ty: ScalarType },

    /// `break`/`continue` outside a loop, popping the root scope, label underflow.
    #[error("unbalanced control state: {0}")]
    Unbalanced(String),

    /// A node is missing a child or a property the translation depends on.
    #[error("malformed tree: {0}")]
    Malformed(String),

    /// Attribution was configured without a handler for a category present in the tree.
    #[error("no attribute handlers registered for category `{0}`")]
    MissingHandler(String),
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        CompileError::Malformed(message.into())
    }

    pub(crate) fn unbalanced(message: impl Into<String>) -> Self {
        CompileError::Unbalanced(message.into())
    }
}
