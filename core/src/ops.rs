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

//! The operation vocabulary the code generator dispatches on.
//!
//! Operand references are child indices into the node that carries the
//! operation; output locations are local slot names already chosen by
//! attribution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ScalarType;

/// Where a node's computed value lives after its code has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRef {
    pub ty: ScalarType,
    pub name: String,
}

impl ValueRef {
    pub fn new(ty: ScalarType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// A typed constant as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum LiteralValue {
    Int(i32),
    Float(f32),
    Char(char),
    Bool(bool),
    Void,
}

impl LiteralValue {
    pub fn ty(&self) -> ScalarType {
        match self {
            LiteralValue::Int(_) => ScalarType::Int,
            LiteralValue::Float(_) => ScalarType::Float,
            LiteralValue::Char(_) => ScalarType::Char,
            LiteralValue::Bool(_) => ScalarType::Bool,
            LiteralValue::Void => ScalarType::Void,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "&&")]
    LogicalAnd,
    #[serde(rename = "||")]
    LogicalOr,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical not: equality to zero.
    #[serde(rename = "!")]
    Not,
    /// Bitwise complement: xor with all ones.
    #[serde(rename = "~")]
    Complement,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Complement => "~",
        }
    }
}

/// Shape of an `if` statement's false arm, decided by semantic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElseBranch {
    /// Empty false arm.
    None,
    /// `node` is a block.
    Else { node: usize },
    /// `node` is a nested `if` statement (else-if chain).
    Nest { node: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    // Expressions
    Get {
        source: String,
        out: String,
    },
    GetLiteral {
        source: String,
        out: String,
        literal: usize,
    },
    Literal {
        value: LiteralValue,
        out: String,
    },
    Call {
        function: String,
        #[serde(default)]
        args: Vec<usize>,
        out: String,
    },
    Binary {
        operator: BinaryOp,
        lhs: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rhs: Option<usize>,
        out: String,
    },
    Unary {
        operator: UnaryOp,
        operand: usize,
        out: String,
    },
    /// Load through a pointer via the runtime `load` primitive.
    Deref {
        operand: usize,
        out: String,
    },
    Assign {
        value: usize,
        out: String,
    },

    // Statements
    Pass,
    Return {
        value: usize,
    },
    Expr {
        value: usize,
    },
    Echo {
        value: usize,
    },
    If {
        cond: usize,
        then_branch: usize,
        else_branch: ElseBranch,
    },
    While {
        cond: usize,
        body: usize,
    },
    Break,
    Continue,
    Unreachable,

    // Memory
    Malloc {
        size: usize,
        out: String,
    },
    Free {
        pointer: usize,
    },
    Store {
        pointer: usize,
        value: usize,
    },
}

impl Operation {
    /// The `op` tag as it appears in the tree artifact.
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::Get { .. } => "get",
            Operation::GetLiteral { .. } => "get_literal",
            Operation::Literal { .. } => "literal",
            Operation::Call { .. } => "call",
            Operation::Binary { .. } => "binary",
            Operation::Unary { .. } => "unary",
            Operation::Deref { .. } => "deref",
            Operation::Assign { .. } => "assign",
            Operation::Pass => "pass",
            Operation::Return { .. } => "return",
            Operation::Expr { .. } => "expr",
            Operation::Echo { .. } => "echo",
            Operation::If { .. } => "if",
            Operation::While { .. } => "while",
            Operation::Break => "break",
            Operation::Continue => "continue",
            Operation::Unreachable => "unreachable",
            Operation::Malloc { .. } => "malloc",
            Operation::Free { .. } => "free",
            Operation::Store { .. } => "store",
        }
    }
}
