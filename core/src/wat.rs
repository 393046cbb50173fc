/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * WAT instruction model and s-expression printer.
 *
 * Structured control (block / loop / if) is kept as nested instruction
 * lists and rendered in folded form; everything else is one plain
 * instruction per line.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use std::fmt::{self, Write};

use crate::types::WasmType;

// =============================================================================
// Instructions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
    Xor,
    Eqz,
}

impl NumOp {
    /// Mnemonic for this op at `ty`, or `None` if the width has no such
    /// instruction. Integer division and ordering are signed.
    pub fn mnemonic(self, ty: WasmType) -> Option<&'static str> {
        let float = ty.is_float();
        let name = match self {
            NumOp::Add => "add",
            NumOp::Sub => "sub",
            NumOp::Mul => "mul",
            NumOp::Eq => "eq",
            NumOp::Ne => "ne",
            NumOp::Div if float => "div",
            NumOp::Div => "div_s",
            NumOp::Gt if float => "gt",
            NumOp::Gt => "gt_s",
            NumOp::Lt if float => "lt",
            NumOp::Lt => "lt_s",
            NumOp::Ge if float => "ge",
            NumOp::Ge => "ge_s",
            NumOp::Le if float => "le",
            NumOp::Le => "le_s",
            NumOp::And | NumOp::Or | NumOp::Xor | NumOp::Eqz if float => return None,
            NumOp::And => "and",
            NumOp::Or => "or",
            NumOp::Xor => "xor",
            NumOp::Eqz => "eqz",
        };
        Some(name)
    }

    /// Width left on the stack by this op applied at `ty`.
    pub fn result(self, ty: WasmType) -> WasmType {
        match self {
            NumOp::Eq | NumOp::Ne | NumOp::Gt | NumOp::Lt | NumOp::Ge | NumOp::Le | NumOp::Eqz => WasmType::I32,
            _ => ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    LocalGet(String),
    LocalSet(String),
    I32Const(i32),
    I64Const(i64),
    F32Const(f32),
    F64Const(f64),
    Numeric(WasmType, NumOp),
    Call(String),
    Br(String),
    BrIf(String),
    Unreachable,
    Block {
        label: String,
        result: Option<WasmType>,
        body: Vec<Instr>,
    },
    Loop {
        label: String,
        body: Vec<Instr>,
    },
    /// Pops its condition from the stack.
    If {
        then_body: Vec<Instr>,
        else_body: Option<Vec<Instr>>,
    },
}

impl Instr {
    /// The zero constant of a width.
    pub fn zero(ty: WasmType) -> Instr {
        match ty {
            WasmType::I32 => Instr::I32Const(0),
            WasmType::I64 => Instr::I64Const(0),
            WasmType::F32 => Instr::F32Const(0.0),
            WasmType::F64 => Instr::F64Const(0.0),
        }
    }

    pub fn local_get(name: &str) -> Instr {
        Instr::LocalGet(name.to_string())
    }

    pub fn local_set(name: &str) -> Instr {
        Instr::LocalSet(name.to_string())
    }

    pub fn call(name: &str) -> Instr {
        Instr::Call(name.to_string())
    }
}

fn float_literal<T: fmt::Display>(value: T, nan: bool, infinite: bool, negative: bool) -> String {
    if nan {
        "nan".to_string()
    } else if infinite && negative {
        "-inf".to_string()
    } else if infinite {
        "inf".to_string()
    } else {
        value.to_string()
    }
}

/// Plain (non-structured) instructions render on a single line.
impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::LocalGet(name) => write!(f, "local.get ${}", name),
            Instr::LocalSet(name) => write!(f, "local.set ${}", name),
            Instr::I32Const(v) => write!(f, "i32.const {}", v),
            Instr::I64Const(v) => write!(f, "i64.const {}", v),
            Instr::F32Const(v) => write!(
                f,
                "f32.const {}",
                float_literal(v, v.is_nan(), v.is_infinite(), v.is_sign_negative())
            ),
            Instr::F64Const(v) => write!(
                f,
                "f64.const {}",
                float_literal(v, v.is_nan(), v.is_infinite(), v.is_sign_negative())
            ),
            Instr::Numeric(ty, op) => match op.mnemonic(*ty) {
                Some(name) => write!(f, "{}.{}", ty, name),
                None => Err(fmt::Error),
            },
            Instr::Call(name) => write!(f, "call ${}", name),
            Instr::Br(label) => write!(f, "br ${}", label),
            Instr::BrIf(label) => write!(f, "br_if ${}", label),
            Instr::Unreachable => f.write_str("unreachable"),
            Instr::Block { label, result, .. } => match result {
                Some(ty) => write!(f, "(block ${} (result {}) ...)", label, ty),
                None => write!(f, "(block ${} ...)", label),
            },
            Instr::Loop { label, .. } => write!(f, "(loop ${} ...)", label),
            Instr::If { .. } => f.write_str("(if ...)"),
        }
    }
}

fn indent(f: &mut impl Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("  ")?;
    }
    Ok(())
}

/// Render `instrs` one per line at `depth`, expanding structured control.
pub fn write_instrs(f: &mut impl Write, instrs: &[Instr], depth: usize) -> fmt::Result {
    for instr in instrs {
        match instr {
            Instr::Block {
                label,
                result,
                body,
            } => {
                indent(f, depth)?;
                write!(f, "(block ${}", label)?;
                if let Some(ty) = result {
                    write!(f, " (result {})", ty)?;
                }
                f.write_char('\n')?;
                write_instrs(f, body, depth + 1)?;
                indent(f, depth)?;
                f.write_str(")\n")?;
            }
            Instr::Loop { label, body } => {
                indent(f, depth)?;
                writeln!(f, "(loop ${}", label)?;
                write_instrs(f, body, depth + 1)?;
                indent(f, depth)?;
                f.write_str(")\n")?;
            }
            Instr::If {
                then_body,
                else_body,
            } => {
                indent(f, depth)?;
                f.write_str("(if\n")?;
                indent(f, depth + 1)?;
                f.write_str("(then\n")?;
                write_instrs(f, then_body, depth + 2)?;
                indent(f, depth + 1)?;
                f.write_str(")\n")?;
                if let Some(else_body) = else_body {
                    indent(f, depth + 1)?;
                    f.write_str("(else\n")?;
                    write_instrs(f, else_body, depth + 2)?;
                    indent(f, depth + 1)?;
                    f.write_str(")\n")?;
                }
                indent(f, depth)?;
                f.write_str(")\n")?;
            }
            plain => {
                indent(f, depth)?;
                writeln!(f, "{}", plain)?;
            }
        }
    }
    Ok(())
}

// =============================================================================
// Module items
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub module: String,
    pub field: String,
    /// Internal name of the imported function.
    pub func: String,
    pub params: Vec<WasmType>,
    pub result: Option<WasmType>,
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(import \"{}\" \"{}\" (func ${}",
            self.module, self.field, self.func
        )?;
        for param in &self.params {
            write!(f, " (param {})", param)?;
        }
        if let Some(result) = self.result {
            write!(f, " (result {})", result)?;
        }
        f.write_str("))")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: String,
    pub params: Vec<(String, WasmType)>,
    pub result: WasmType,
    pub locals: Vec<(String, WasmType)>,
    /// The result block wrapping `body`.
    pub label: String,
    pub body: Vec<Instr>,
}

impl Func {
    fn write_to(&self, f: &mut impl Write, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        write!(f, "(func ${}", self.name)?;
        for (name, ty) in &self.params {
            write!(f, " (param ${} {})", name, ty)?;
        }
        writeln!(f, " (result {})", self.result)?;
        for (name, ty) in &self.locals {
            indent(f, depth + 1)?;
            writeln!(f, "(local ${} {})", name, ty)?;
        }
        let wrapped = Instr::Block {
            label: self.label.clone(),
            result: Some(self.result),
            body: self.body.clone(),
        };
        write_instrs(f, std::slice::from_ref(&wrapped), depth + 1)?;
        indent(f, depth)?;
        f.write_str(")\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatModule {
    pub imports: Vec<Import>,
    pub funcs: Vec<Func>,
    /// Exported function names; each is exported under its own name.
    pub exports: Vec<String>,
}

impl fmt::Display for WatModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(module\n")?;
        for import in &self.imports {
            writeln!(f, "  {}", import)?;
        }
        for func in &self.funcs {
            func.write_to(f, 1)?;
        }
        for name in &self.exports {
            writeln!(f, "  (export \"{}\" (func ${}))", name, name)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_selected_mnemonics() {
        assert_eq!(NumOp::Div.mnemonic(WasmType::I32), Some("div_s"));
        assert_eq!(NumOp::Div.mnemonic(WasmType::F32), Some("div"));
        assert_eq!(NumOp::Ge.mnemonic(WasmType::I32), Some("ge_s"));
        assert_eq!(NumOp::Ge.mnemonic(WasmType::F32), Some("ge"));
        assert_eq!(NumOp::Xor.mnemonic(WasmType::F32), None);
        assert_eq!(NumOp::Eqz.mnemonic(WasmType::I32), Some("eqz"));
        assert_eq!(NumOp::Le.result(WasmType::F32), WasmType::I32);
        assert_eq!(NumOp::Mul.result(WasmType::F32), WasmType::F32);
    }

    #[test]
    fn test_plain_instruction_text() {
        assert_eq!(Instr::local_get("x").to_string(), "local.get $x");
        assert_eq!(Instr::F32Const(1.5).to_string(), "f32.const 1.5");
        assert_eq!(Instr::F32Const(f32::NAN).to_string(), "f32.const nan");
        assert_eq!(Instr::F32Const(f32::NEG_INFINITY).to_string(), "f32.const -inf");
        assert_eq!(Instr::Numeric(WasmType::I32, NumOp::Lt).to_string(), "i32.lt_s");
        assert_eq!(Instr::BrIf("block_1_block".into()).to_string(), "br_if $block_1_block");
    }

    #[test]
    fn test_structured_rendering() {
        let body = vec![
            Instr::I32Const(1),
            Instr::If {
                then_body: vec![Instr::Br("out".into())],
                else_body: Some(vec![Instr::Unreachable]),
            },
        ];
        let mut text = String::new();
        write_instrs(
            &mut text,
            &[Instr::Block {
                label: "out".into(),
                result: None,
                body,
            }],
            0,
        )
        .unwrap();
        assert_eq!(
            text,
            "(block $out\n  i32.const 1\n  (if\n    (then\n      br $out\n    )\n    (else\n      unreachable\n    )\n  )\n)\n"
        );
    }

    #[test]
    fn test_import_line() {
        let import = Import {
            module: "runtime".into(),
            field: "store".into(),
            func: "rt_store".into(),
            params: vec![WasmType::I32, WasmType::I32],
            result: None,
        };
        assert_eq!(
            import.to_string(),
            "(import \"runtime\" \"store\" (func $rt_store (param i32) (param i32)))"
        );
    }
}
