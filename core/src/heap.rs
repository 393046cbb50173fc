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

//! Linear-memory allocator backing the `malloc`/`free`/`store`/`load` host
//! calls of emitted modules.
//!
//! A bump pointer over a growable byte region plus a free list of released
//! addresses. Released addresses are handed out again before the region
//! grows. There is no coalescing and no size tracking.

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    #[error("heap exhausted: {requested} more bytes would exceed the {limit}-byte limit")]
    Exhausted { requested: u64, limit: u64 },
    #[error("address {address} out of bounds for a {len}-byte heap")]
    OutOfBounds { address: u32, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Growth granule in bytes.
    pub page_size: u32,
    pub initial_pages: u32,
    pub max_pages: u32,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            page_size: 64 * 1024,
            initial_pages: 64,
            max_pages: 65536,
        }
    }
}

impl HeapConfig {
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.max_pages)
    }
}

#[derive(Debug, Clone)]
pub struct Heap {
    config: HeapConfig,
    bytes: Vec<u8>,
    top: u64,
    free: Vec<u32>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new(HeapConfig::default())
    }
}

impl Heap {
    pub fn new(config: HeapConfig) -> Self {
        let initial = u64::from(config.page_size) * u64::from(config.initial_pages.min(config.max_pages));
        Self {
            config,
            bytes: vec![0; initial as usize],
            top: 0,
            free: Vec::new(),
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Current size of the backing region in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Next address the bump pointer would hand out.
    pub fn top(&self) -> u64 {
        self.top
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn allocate(&mut self, size: u32) -> Result<u32, HeapError> {
        if let Some(address) = self.free.pop() {
            tracing::trace!(address, size, "allocate from free list");
            return Ok(address);
        }

        let limit = self.config.limit();
        let exhausted = HeapError::Exhausted {
            requested: u64::from(size),
            limit,
        };
        let address = u32::try_from(self.top).map_err(|_| exhausted.clone())?;
        let end = self.top + u64::from(size);
        if end > limit {
            return Err(exhausted);
        }

        let len = self.bytes.len() as u64;
        if end > len {
            let page = u64::from(self.config.page_size.max(1));
            let pages = (end - len).div_ceil(page);
            let grown = len + pages * page;
            if grown > limit {
                return Err(exhausted);
            }
            tracing::trace!(pages, bytes = grown, "heap grown");
            self.bytes.resize(grown as usize, 0);
        }

        self.top = end;
        tracing::trace!(address, size, "allocate by bump");
        Ok(address)
    }

    /// Put `address` back on the free list. Not checked against earlier
    /// allocations.
    pub fn release(&mut self, address: u32) {
        tracing::trace!(address, "release");
        self.free.push(address);
    }

    /// Write a little-endian i32 at `address`.
    pub fn store(&mut self, address: u32, value: i32) -> Result<(), HeapError> {
        let range = self.word(address)?;
        self.bytes[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Read a little-endian i32 at `address`.
    pub fn load(&self, address: u32) -> Result<i32, HeapError> {
        let range = self.word(address)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.bytes[range]);
        Ok(i32::from_le_bytes(word))
    }

    fn word(&self, address: u32) -> Result<std::ops::Range<usize>, HeapError> {
        let start = address as usize;
        match start.checked_add(4) {
            Some(end) if end <= self.bytes.len() => Ok(start..end),
            _ => Err(HeapError::OutOfBounds {
                address,
                len: self.bytes.len(),
            }),
        }
    }
}
