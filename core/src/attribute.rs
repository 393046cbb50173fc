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

//! Attribute propagation: one depth-first walk per tree that runs each
//! node's inherited action before its children and its synthesized action
//! after them.
//!
//! Actions are looked up by node category in an [`ActionTable`]. The table
//! is checked against the whole tree before the walk starts, so a missing
//! handler is reported once, up front.

use std::collections::HashMap;
use std::fmt;
use std::mem;

use crate::context::TranslationContext;
use crate::error::CompileError;
use crate::tree::{Attributes, SyntaxNode};

pub type Action = fn(&mut Visit<'_>, &mut TranslationContext) -> Result<(), CompileError>;

/// Action that leaves the node untouched.
pub fn noop(_: &mut Visit<'_>, _: &mut TranslationContext) -> Result<(), CompileError> {
    Ok(())
}

#[derive(Clone, Copy)]
pub struct ActionPair {
    pub inherited: Action,
    pub synthesized: Action,
}

impl ActionPair {
    pub fn new(inherited: Action, synthesized: Action) -> Self {
        Self {
            inherited,
            synthesized,
        }
    }

    pub fn inherited(action: Action) -> Self {
        Self::new(action, noop)
    }

    pub fn synthesized(action: Action) -> Self {
        Self::new(noop, action)
    }

    pub fn none() -> Self {
        Self::new(noop, noop)
    }
}

impl fmt::Debug for ActionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionPair").finish_non_exhaustive()
    }
}

/// The handle an action gets: its own node, read access to its children,
/// and read access to its parent.
///
/// The parent is seen with its children detached, so siblings are not
/// reachable from here.
pub struct Visit<'a> {
    node: &'a mut SyntaxNode,
    parent: Option<&'a SyntaxNode>,
}

impl<'a> Visit<'a> {
    pub fn node(&self) -> &SyntaxNode {
        self.node
    }

    pub fn category(&self) -> &str {
        &self.node.category
    }

    /// Terminal text of this node.
    pub fn value(&self) -> &str {
        &self.node.value
    }

    pub fn attrs(&self) -> &Attributes {
        &self.node.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.node.attrs
    }

    pub fn child(&self, index: usize) -> Result<&SyntaxNode, CompileError> {
        self.node.child(index)
    }

    pub fn child_count(&self) -> usize {
        self.node.children.len()
    }

    pub fn parent(&self) -> Option<&SyntaxNode> {
        self.parent
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    actions: HashMap<String, ActionPair>,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with(mut self, category: &str, pair: ActionPair) -> Self {
        self.register(category, pair);
        self
    }

    pub fn register(&mut self, category: &str, pair: ActionPair) {
        if self.actions.insert(category.to_string(), pair).is_some() {
            tracing::warn!(category, "attribute handlers replaced");
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.actions.contains_key(category)
    }

    /// Fail if any category in the tree has no registered pair.
    pub fn validate(&self, root: &SyntaxNode) -> Result<(), CompileError> {
        match root.categories().into_iter().find(|c| !self.contains(c)) {
            Some(missing) => Err(CompileError::MissingHandler(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Decorate every node of `root`.
    pub fn run(&self, root: &mut SyntaxNode, ctx: &mut TranslationContext) -> Result<(), CompileError> {
        self.validate(root)?;
        self.visit(root, None, ctx)
    }

    fn visit(
        &self,
        node: &mut SyntaxNode,
        parent: Option<&SyntaxNode>,
        ctx: &mut TranslationContext,
    ) -> Result<(), CompileError> {
        let pair = self
            .actions
            .get(&node.category)
            .copied()
            .ok_or_else(|| CompileError::MissingHandler(node.category.clone()))?;

        (pair.inherited)(&mut Visit { node, parent }, ctx)?;

        let mut children = mem::take(&mut node.children);
        let walked = children
            .iter_mut()
            .try_for_each(|child| self.visit(child, Some(&*node), ctx));
        node.children = children;
        walked?;

        (pair.synthesized)(&mut Visit { node, parent }, ctx)
    }
}
