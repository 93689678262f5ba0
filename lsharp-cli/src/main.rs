//! L# CLI: compile, run, and disassemble.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, I/O or decode error
//! - 2: Compile error or parse diagnostics
//! - 3: Runtime fault
//!
//! Logging goes to stderr through `env_logger`, filtered at `info` unless
//! `RUST_LOG` says otherwise.

mod commands;

use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "compile" => commands::compile(&args[2..]),
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: lsharp <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  compile <input.ls> [-o output.lsb]      Compile source to bytecode");
    eprintln!("  run <input.lsb> [--gc-every N]          Execute a bytecode file");
    eprintln!("  disassemble <input.lsb>                 Print a bytecode listing");
}
