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

//! File-level drivers behind the `mygo-wat` binary.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::compiler::Compiler;
use crate::error::CompileError;
use crate::loader::{load_tree_file, LoadError};
use crate::wasm_runner::{run, RunConfig, RunError};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{}: {source}", path.display())]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Assemble the decorated tree stored at `tree`. The module text is returned
/// and, when `output` is given, also written there.
pub fn compile_file(tree: &Path, output: Option<&Path>) -> Result<String, CliError> {
    let root = load_tree_file(tree)?;
    let text = Compiler::compile_decorated(&root).map_err(|source| CliError::Compile {
        path: tree.to_path_buf(),
        source,
    })?;
    if let Some(path) = output {
        fs::write(path, format!("{}\n", text)).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "module written");
    }
    Ok(text)
}

/// Run the module text at `module` and return the lines to print: every
/// echoed value, then `=> <result>` when the entry returns one.
pub fn execute_file(module: &Path, config: &RunConfig, args: &[i32]) -> Result<Vec<String>, CliError> {
    let wat = fs::read_to_string(module).map_err(|source| CliError::Io {
        path: module.to_path_buf(),
        source,
    })?;
    let output = run(&wat, config, args)?;
    let mut lines = output.echoed;
    if let Some(value) = output.value {
        lines.push(format!("=> {}", value));
    }
    Ok(lines)
}
