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

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::env::{Binding, FunctionSignature};
use crate::error::CompileError;
use crate::ops::{Operation, ValueRef};
use crate::types::ScalarType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Terminal,
    #[default]
    NonTerminal,
}

/// Computed properties of a node, filled in by attribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    /// The operation this node lowers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Operation>,
    /// Where this node's value lives once its code has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<ValueRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<FunctionSignature>,
    /// Symbol table of a function at the end of its body, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locals: Vec<Binding>,
    /// Child index of a function's body block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<usize>,
    /// Declaration without a body (forward declaration).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
    /// Scratch space for front-end handlers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A node of the parsed tree. Each node owns its children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    #[serde(alias = "sematic")]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
    #[serde(default, alias = "d")]
    pub attrs: Attributes,
}

impl SyntaxNode {
    pub fn terminal(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            kind: NodeKind::Terminal,
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn branch(category: impl Into<String>, children: Vec<SyntaxNode>) -> Self {
        Self {
            category: category.into(),
            kind: NodeKind::NonTerminal,
            children,
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: Operation) -> Self {
        self.attrs.code = Some(code);
        self
    }

    pub fn with_val(mut self, ty: ScalarType, name: impl Into<String>) -> Self {
        self.attrs.val = Some(ValueRef::new(ty, name));
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == NodeKind::Terminal
    }

    pub fn child(&self, index: usize) -> Result<&SyntaxNode, CompileError> {
        self.children.get(index).ok_or_else(|| {
            CompileError::malformed(format!(
                "`{}` node has no child #{} ({} children)",
                self.category,
                index,
                self.children.len()
            ))
        })
    }

    pub fn code(&self) -> Result<&Operation, CompileError> {
        self.attrs
            .code
            .as_ref()
            .ok_or_else(|| CompileError::malformed(format!("`{}` node has no operation", self.category)))
    }

    pub fn val(&self) -> Result<&ValueRef, CompileError> {
        self.attrs.val.as_ref().ok_or_else(|| {
            CompileError::malformed(format!("`{}` node has no resolved value", self.category))
        })
    }

    /// Every category that appears in this subtree.
    pub fn categories(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.insert(node.category.as_str());
            stack.extend(node.children.iter());
        }
        out
    }
}
