/*
 * Copyright (c) 2026 Mohamad Al-Zawahreh (dba Sovereign Systems).
 *
 * Wasmtime execution harness for emitted modules.
 *
 * Compiles module text, satisfies the `runtime` host imports from a
 * linear-memory heap, captures echoed values and calls an exported entry
 * point with i32 arguments.
 *
 * The four `echo` imports share one field name, so imports are bound one
 * by one in declaration order instead of through a name-keyed linker.
 *
 * LICENSE: DUAL-LICENSED (AGPLv3 or COMMERCIAL).
 *
 * PATENT NOTICE: Protected by US Patent App #63/935,467.
 * NO IMPLIED LICENSE to rights of Mohamad Al-Zawahreh or Sovereign Systems.
 */

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use wasmtime::{Caller, Engine, Extern, ExternType, Func, Instance, Module, Store, Val, ValType};

use crate::assembler::RUNTIME_MODULE;
use crate::heap::{Heap, HeapConfig};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to load module: {0}")]
    Load(String),
    #[error("no host function for import `{module}` `{name}`")]
    UnsupportedImport { module: String, name: String },
    #[error("failed to instantiate: {0}")]
    Instantiate(String),
    #[error("export `{0}` not found")]
    MissingExport(String),
    #[error("call to `{name}` trapped: {message}")]
    Trap { name: String, message: String },
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Export invoked by [`run`].
    pub entry: String,
    pub heap: HeapConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            entry: "c_main".to_string(),
            heap: HeapConfig::default(),
        }
    }
}

// =============================================================================
// Host State
// =============================================================================

/// Store data seen by every host call.
#[derive(Debug, Default)]
pub struct HostState {
    pub heap: Heap,
    /// Values passed to `echo`, formatted, in call order.
    pub echoed: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReturnValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnValue::I32(v) => write!(f, "{}", v),
            ReturnValue::I64(v) => write!(f, "{}", v),
            ReturnValue::F32(v) => write!(f, "{}", v),
            ReturnValue::F64(v) => write!(f, "{}", v),
        }
    }
}

/// Result of [`run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub value: Option<ReturnValue>,
    pub echoed: Vec<String>,
}

// =============================================================================
// Runner
// =============================================================================

/// An instantiated module together with its host state.
pub struct WasmRunner {
    store: Store<HostState>,
    instance: Instance,
}

impl WasmRunner {
    pub fn new(wat: &str, heap: HeapConfig) -> Result<Self, RunError> {
        let engine = Engine::default();
        let module = Module::new(&engine, wat).map_err(|e| RunError::Load(e.to_string()))?;

        let mut store = Store::new(
            &engine,
            HostState {
                heap: Heap::new(heap),
                echoed: Vec::new(),
            },
        );

        let mut imports = Vec::new();
        for import in module.imports() {
            let func = host_function(&mut store, import.module(), import.name(), &import.ty())?;
            imports.push(Extern::Func(func));
        }

        let instance = Instance::new(&mut store, &module, &imports)
            .map_err(|e| RunError::Instantiate(e.to_string()))?;
        tracing::debug!(imports = imports.len(), "module instantiated");

        Ok(Self { store, instance })
    }

    /// Call export `name`. Returns its first result, if it has one.
    pub fn call(&mut self, name: &str, args: &[i32]) -> Result<Option<ReturnValue>, RunError> {
        let func = self
            .instance
            .get_func(&mut self.store, name)
            .ok_or_else(|| RunError::MissingExport(name.to_string()))?;

        let params: Vec<Val> = args.iter().map(|&v| Val::I32(v)).collect();
        let result_count = func.ty(&self.store).results().len();
        let mut results = vec![Val::I32(0); result_count];

        func.call(&mut self.store, &params, &mut results)
            .map_err(|e| RunError::Trap {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(results.first().and_then(|val| match val {
            Val::I32(v) => Some(ReturnValue::I32(*v)),
            Val::I64(v) => Some(ReturnValue::I64(*v)),
            Val::F32(bits) => Some(ReturnValue::F32(f32::from_bits(*bits))),
            Val::F64(bits) => Some(ReturnValue::F64(f64::from_bits(*bits))),
            _ => None,
        }))
    }

    pub fn echoed(&self) -> &[String] {
        &self.store.data().echoed
    }

    pub fn heap(&self) -> &Heap {
        &self.store.data().heap
    }
}

/// Compile `wat`, call the configured entry export with `args`.
pub fn run(wat: &str, config: &RunConfig, args: &[i32]) -> Result<RunOutput, RunError> {
    let mut runner = WasmRunner::new(wat, config.heap)?;
    let value = runner.call(&config.entry, args)?;
    Ok(RunOutput {
        value,
        echoed: runner.echoed().to_vec(),
    })
}

// =============================================================================
// Host Functions
// =============================================================================

fn echo<T: fmt::Display>(caller: &mut Caller<'_, HostState>, value: T) {
    let text = value.to_string();
    tracing::debug!(value = %text, "echo");
    caller.data_mut().echoed.push(text);
}

fn host_function(
    store: &mut Store<HostState>,
    module: &str,
    name: &str,
    ty: &ExternType,
) -> Result<Func, RunError> {
    let unsupported = || RunError::UnsupportedImport {
        module: module.to_string(),
        name: name.to_string(),
    };
    if module != RUNTIME_MODULE {
        return Err(unsupported());
    }

    let func = match name {
        // one import per width, told apart by their parameter
        "echo" => {
            let param = match ty {
                ExternType::Func(func_ty) => func_ty.params().next(),
                _ => None,
            };
            match param {
                Some(ValType::I32) => Func::wrap(&mut *store, |mut caller: Caller<'_, HostState>, v: i32| {
                    echo(&mut caller, v)
                }),
                Some(ValType::I64) => Func::wrap(&mut *store, |mut caller: Caller<'_, HostState>, v: i64| {
                    echo(&mut caller, v)
                }),
                Some(ValType::F32) => Func::wrap(&mut *store, |mut caller: Caller<'_, HostState>, v: f32| {
                    echo(&mut caller, v)
                }),
                Some(ValType::F64) => Func::wrap(&mut *store, |mut caller: Caller<'_, HostState>, v: f64| {
                    echo(&mut caller, v)
                }),
                _ => return Err(unsupported()),
            }
        }
        "malloc" => Func::wrap(
            &mut *store,
            |mut caller: Caller<'_, HostState>, size: i32| -> wasmtime::Result<i32> {
                let size = u32::try_from(size)
                    .map_err(|_| wasmtime::Error::msg(format!("malloc of negative size {}", size)))?;
                let address = caller.data_mut().heap.allocate(size)?;
                Ok(address as i32)
            },
        ),
        "free" => Func::wrap(&mut *store, |mut caller: Caller<'_, HostState>, address: i32| {
            caller.data_mut().heap.release(address as u32)
        }),
        "store" => Func::wrap(
            &mut *store,
            |mut caller: Caller<'_, HostState>, address: i32, value: i32| -> wasmtime::Result<()> {
                caller.data_mut().heap.store(address as u32, value)?;
                Ok(())
            },
        ),
        "load" => Func::wrap(
            &mut *store,
            |caller: Caller<'_, HostState>, address: i32| -> wasmtime::Result<i32> {
                Ok(caller.data().heap.load(address as u32)?)
            },
        ),
        _ => return Err(unsupported()),
    };
    Ok(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::{echo_import, runtime_imports, RT_FREE, RT_LOAD, RT_MALLOC, RT_STORE};
    use crate::types::WasmType;
    use crate::wat::{Func as WatFunc, Instr, NumOp, WatModule};

    fn module(funcs: Vec<WatFunc>) -> String {
        let exports = funcs.iter().map(|f| f.name.clone()).collect();
        WatModule {
            imports: runtime_imports(),
            funcs,
            exports,
        }
        .to_string()
    }

    fn func(name: &str, params: &[&str], locals: &[&str], body: Vec<Instr>) -> WatFunc {
        WatFunc {
            name: name.into(),
            params: params.iter().map(|p| (p.to_string(), WasmType::I32)).collect(),
            result: WasmType::I32,
            locals: locals.iter().map(|l| (l.to_string(), WasmType::I32)).collect(),
            label: "block_0".into(),
            body,
        }
    }

    #[test]
    fn test_entry_with_arguments() {
        let wat = module(vec![func(
            "c_main",
            &["a", "b"],
            &[],
            vec![
                Instr::local_get("a"),
                Instr::local_get("b"),
                Instr::Numeric(WasmType::I32, NumOp::Sub),
            ],
        )]);
        let output = run(&wat, &RunConfig::default(), &[10, 3]).expect("run failed");
        assert_eq!(output.value, Some(ReturnValue::I32(7)));
        assert!(output.echoed.is_empty());
    }

    #[test]
    fn test_echo_per_width() {
        let wat = module(vec![func(
            "c_main",
            &[],
            &[],
            vec![
                Instr::I32Const(5),
                Instr::Call(echo_import(WasmType::I32)),
                Instr::F32Const(1.5),
                Instr::Call(echo_import(WasmType::F32)),
                Instr::I64Const(-9),
                Instr::Call(echo_import(WasmType::I64)),
                Instr::I32Const(0),
            ],
        )]);
        let output = run(&wat, &RunConfig::default(), &[]).expect("run failed");
        assert_eq!(output.echoed, vec!["5", "1.5", "-9"]);
    }

    #[test]
    fn test_memory_round_trip_through_host() {
        let wat = module(vec![func(
            "c_main",
            &[],
            &["p", "q"],
            vec![
                Instr::I32Const(8),
                Instr::call(RT_MALLOC),
                Instr::local_set("p"),
                Instr::local_get("p"),
                Instr::I32Const(1234),
                Instr::call(RT_STORE),
                Instr::local_get("p"),
                Instr::call(RT_FREE),
                Instr::I32Const(8),
                Instr::call(RT_MALLOC),
                Instr::local_set("q"),
                Instr::local_get("q"),
                Instr::call(RT_LOAD),
            ],
        )]);
        let mut runner = WasmRunner::new(&wat, HeapConfig::default()).unwrap();
        assert_eq!(runner.call("c_main", &[]).unwrap(), Some(ReturnValue::I32(1234)));
        assert_eq!(runner.heap().top(), 8);
        assert_eq!(runner.heap().free_count(), 0);
    }

    #[test]
    fn test_heap_errors_trap() {
        let wat = module(vec![func(
            "c_main",
            &[],
            &[],
            vec![Instr::I32Const(-4), Instr::call(RT_LOAD)],
        )]);
        let err = run(&wat, &RunConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, RunError::Trap { .. }), "{}", err);
    }

    #[test]
    fn test_harness_failures() {
        let wat = module(vec![func("other", &[], &[], vec![Instr::I32Const(0)])]);
        assert!(matches!(
            run(&wat, &RunConfig::default(), &[]),
            Err(RunError::MissingExport(name)) if name == "c_main"
        ));

        let foreign = r#"(module (import "env" "print" (func $p (param i32))))"#;
        assert!(matches!(
            WasmRunner::new(foreign, HeapConfig::default()),
            Err(RunError::UnsupportedImport { .. })
        ));

        assert!(matches!(
            WasmRunner::new("(module (func", HeapConfig::default()),
            Err(RunError::Load(_))
        ));
    }
}
