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

//! Scopes, the function table and the temporary-slot allocator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::CompileError;
use crate::types::ScalarType;

/// A declared name and its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub ty: ScalarType,
}

impl Binding {
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Binding>,
    pub ret: ScalarType,
}

impl FunctionSignature {
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// One level of lexical scope. Remembers declaration order so that local
/// declarations come out deterministic.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Vec<Binding>,
    index: HashMap<String, usize>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name` in this scope.
    pub fn declare(&mut self, name: &str, ty: ScalarType) {
        match self.index.get(name) {
            Some(&slot) => self.bindings[slot].ty = ty,
            None => {
                self.index.insert(name.to_string(), self.bindings.len());
                self.bindings.push(Binding::new(name, ty));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<ScalarType> {
        self.index.get(name).map(|&slot| self.bindings[slot].ty)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Symbol and type environment for one translation run.
#[derive(Debug)]
pub struct SymbolEnv {
    /// Innermost scope last. Index 0 is the root and is never popped.
    scopes: Vec<Scope>,
    functions: HashMap<String, Rc<FunctionSignature>>,
    function_order: Vec<String>,
    next_temp: usize,
}

impl Default for SymbolEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolEnv {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
            functions: HashMap::new(),
            function_order: Vec::new(),
            next_temp: 0,
        }
    }

    /// Back to a single empty root scope with no functions and a zeroed
    /// temporary counter.
    pub fn reset(&mut self) {
        self.scopes.clear();
        self.scopes.push(Scope::new());
        self.functions.clear();
        self.function_order.clear();
        self.next_temp = 0;
    }

    // ---------------------------------------------------------------------
    // Scopes
    // ---------------------------------------------------------------------

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    pub fn pop_scope(&mut self) -> Result<Scope, CompileError> {
        if self.scopes.len() <= 1 {
            return Err(CompileError::unbalanced("attempted to pop the root scope"));
        }
        // len > 1 checked above
        Ok(self.scopes.pop().unwrap_or_default())
    }

    /// Number of scopes above the root.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn current_scope(&self) -> &Scope {
        // the root is never popped
        &self.scopes[self.scopes.len() - 1]
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn declare(&mut self, name: &str, ty: ScalarType) {
        self.current_scope_mut().declare(name, ty);
    }

    pub fn lookup_variable_type(&self, name: &str) -> Result<ScalarType, CompileError> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .ok_or_else(|| CompileError::Unresolved(name.to_string()))
    }

    // ---------------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------------

    /// Record a function signature. A later declaration of the same name
    /// replaces the earlier one but keeps its position in declaration order.
    pub fn declare_function(&mut self, signature: FunctionSignature) -> Rc<FunctionSignature> {
        let name = signature.name.clone();
        let signature = Rc::new(signature);
        match self.functions.insert(name.clone(), Rc::clone(&signature)) {
            Some(previous) if *previous != *signature => {
                tracing::warn!(function = %name, "function redeclared with a different signature");
            }
            Some(_) => {}
            None => self.function_order.push(name),
        }
        signature
    }

    pub fn lookup_function(&self, name: &str) -> Result<Rc<FunctionSignature>, CompileError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| CompileError::Unresolved(name.to_string()))
    }

    pub fn lookup_function_return_type(&self, name: &str) -> Result<ScalarType, CompileError> {
        self.lookup_function(name).map(|sig| sig.ret)
    }

    /// Declared function names in first-declaration order.
    pub fn function_names(&self) -> &[String] {
        &self.function_order
    }

    // ---------------------------------------------------------------------
    // Temporaries
    // ---------------------------------------------------------------------

    /// Claim a temporary slot for a value of type `ty` in the current scope.
    ///
    /// Slot `tmp_N` is reused when it already holds a value of the same
    /// storage width; slots claimed at a different width are skipped. A slot
    /// keeps the type it was first claimed with.
    pub fn new_temporary(&mut self, ty: ScalarType) -> String {
        let mut key = format!("tmp_{}", self.next_temp);
        while let Some(existing) = self.current_scope().get(&key) {
            if existing.wasm() == ty.wasm() {
                break;
            }
            self.next_temp += 1;
            key = format!("tmp_{}", self.next_temp);
        }
        if !self.current_scope().contains(&key) {
            self.declare(&key, ty);
        }
        self.next_temp += 1;
        key
    }

    /// Give back the most recently claimed index (LIFO). Names already handed
    /// out stay valid.
    pub fn release_temporary(&mut self) -> Result<(), CompileError> {
        if self.next_temp == 0 {
            return Err(CompileError::unbalanced("temporary released with none outstanding"));
        }
        self.next_temp -= 1;
        Ok(())
    }

    /// Restart numbering; called at every function boundary.
    pub fn reset_temporaries(&mut self) {
        self.next_temp = 0;
    }

    pub fn temporaries_in_use(&self) -> usize {
        self.next_temp
    }
}
