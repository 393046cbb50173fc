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

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::from_str;
use thiserror::Error;

use crate::tree::SyntaxNode;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("JSON Parse Error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("I/O Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a tree artifact. Works for raw trees and for trees whose nodes
/// already carry their attributes.
pub fn load_tree(json: &str) -> Result<SyntaxNode, LoadError> {
    let root: SyntaxNode = from_str(json)?;
    tracing::debug!(category = %root.category, children = root.children.len(), "tree loaded");
    Ok(root)
}

pub fn load_tree_file(path: &Path) -> Result<SyntaxNode, LoadError> {
    let json = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_tree(&json)
}
