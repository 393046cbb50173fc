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

use crate::error::CompileError;

/// Label pair of one `while` loop: `entry` heads the `loop`, `exit` names the
/// enclosing `block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopLabels {
    pub entry: String,
    pub exit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The result block wrapping a function body; `return` branches here.
    Function(String),
    Loop(LoopLabels),
}

/// Stack of structured control regions that are currently open.
///
/// Labels are numbered by nesting depth (`block_<depth>`), so sibling loops
/// reuse the same name while nested regions never collide.
#[derive(Debug, Default)]
pub struct LabelStack {
    frames: Vec<Frame>,
    next: usize,
}

impl LabelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.next = 0;
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn fresh(&mut self) -> String {
        let label = format!("block_{}", self.next);
        self.next += 1;
        label
    }

    pub fn enter_function(&mut self) -> String {
        let label = self.fresh();
        self.frames.push(Frame::Function(label.clone()));
        label
    }

    pub fn enter_loop(&mut self) -> LoopLabels {
        let entry = self.fresh();
        let labels = LoopLabels {
            exit: format!("{}_block", entry),
            entry,
        };
        tracing::trace!(entry = %labels.entry, depth = self.frames.len() + 1, "enter loop");
        self.frames.push(Frame::Loop(labels.clone()));
        labels
    }

    pub fn exit(&mut self) -> Result<Frame, CompileError> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| CompileError::unbalanced("label stack underflow"))?;
        self.next -= 1;
        Ok(frame)
    }

    /// Innermost loop, never looking past the enclosing function.
    fn innermost_loop(&self, keyword: &str) -> Result<&LoopLabels, CompileError> {
        for frame in self.frames.iter().rev() {
            match frame {
                Frame::Loop(labels) => return Ok(labels),
                Frame::Function(_) => break,
            }
        }
        Err(CompileError::unbalanced(format!("`{}` outside of a loop", keyword)))
    }

    pub fn break_target(&self) -> Result<&str, CompileError> {
        self.innermost_loop("break").map(|l| l.exit.as_str())
    }

    pub fn continue_target(&self) -> Result<&str, CompileError> {
        self.innermost_loop("continue").map(|l| l.entry.as_str())
    }

    pub fn return_target(&self) -> Result<&str, CompileError> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Function(label) => Some(label.as_str()),
                Frame::Loop(_) => None,
            })
            .ok_or_else(|| CompileError::unbalanced("`return` outside of a function"))
    }
}
