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
use std::fmt;
use std::str::FromStr;

use crate::error::CompileError;

/// Source-level scalar types. Every value in the language is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Int,
    Float,
    Char,
    Bool,
    Void,
}

/// Storage widths of the target stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasmType {
    I32,
    I64,
    F32,
    F64,
}

impl ScalarType {
    /// Fixed scalar → storage-width mapping. Char, bool and void all live in
    /// an i32 slot (character code, 0/1, constant 0).
    pub fn wasm(self) -> WasmType {
        match self {
            ScalarType::Int => WasmType::I32,
            ScalarType::Float => WasmType::F32,
            ScalarType::Char => WasmType::I32,
            ScalarType::Bool => WasmType::I32,
            ScalarType::Void => WasmType::I32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Char => "char",
            ScalarType::Bool => "bool",
            ScalarType::Void => "void",
        }
    }
}

impl FromStr for ScalarType {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(ScalarType::Int),
            "float" => Ok(ScalarType::Float),
            "char" => Ok(ScalarType::Char),
            "bool" => Ok(ScalarType::Bool),
            "void" => Ok(ScalarType::Void),
            other => Err(CompileError::UnknownTag {
                kind: "type",
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl WasmType {
    /// Every width the runtime exposes an `echo` import for, in import order.
    pub const ALL: [WasmType; 4] = [WasmType::I32, WasmType::I64, WasmType::F32, WasmType::F64];

    pub fn is_float(self) -> bool {
        matches!(self, WasmType::F32 | WasmType::F64)
    }

    pub fn name(self) -> &'static str {
        match self {
            WasmType::I32 => "i32",
            WasmType::I64 => "i64",
            WasmType::F32 => "f32",
            WasmType::F64 => "f64",
        }
    }
}

impl fmt::Display for WasmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
