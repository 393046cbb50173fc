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

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mygo_wat::cli::{compile_file, execute_file};
use mygo_wat::heap::HeapConfig;
use mygo_wat::loader::load_tree_file;
use mygo_wat::wasm_runner::RunConfig;

/// Lower attributed syntax trees to WebAssembly text and run the result.
#[derive(Parser, Debug)]
#[command(name = "mygo-wat")]
#[command(about = "Attributed tree to WAT backend", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a decorated tree artifact (JSON) into module text
    Compile {
        tree: PathBuf,

        /// Write the module here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the loaded tree to stderr (for debugging)
        #[arg(long)]
        pretty_tree: bool,
    },
    /// Execute a module, printing echoed values and the entry result
    Run {
        module: PathBuf,

        #[arg(long, default_value = "c_main")]
        entry: String,

        /// i32 argument for the entry export (repeatable)
        #[arg(long = "arg", allow_negative_numbers = true)]
        args: Vec<i32>,

        /// Heap growth limit in 64 KiB pages
        #[arg(long)]
        max_pages: Option<u32>,
    },
}

fn compile(tree: PathBuf, output: Option<PathBuf>, pretty_tree: bool) -> Result<(), String> {
    if pretty_tree {
        let root = load_tree_file(&tree).map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&root).map_err(|e| e.to_string())?;
        eprintln!("=== Loaded Tree ===");
        eprintln!("{}", json);
    }

    let text = compile_file(&tree, output.as_deref()).map_err(|e| e.to_string())?;
    if output.is_none() {
        println!("{}", text);
    }
    Ok(())
}

fn execute(module: PathBuf, entry: String, args: Vec<i32>, max_pages: Option<u32>) -> Result<(), String> {
    let mut heap = HeapConfig::default();
    if let Some(max_pages) = max_pages {
        heap.max_pages = max_pages;
    }
    let config = RunConfig { entry, heap };

    for line in execute_file(&module, &config, &args).map_err(|e| e.to_string())? {
        println!("{}", line);
    }
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG controls the level; default to WARN
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let result = match Args::parse().command {
        Command::Compile {
            tree,
            output,
            pretty_tree,
        } => compile(tree, output, pretty_tree),
        Command::Run {
            module,
            entry,
            args,
            max_pages,
        } => execute(module, entry, args, max_pages),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}
