//! CLI command implementations.

use std::fs;

use log::info;
use lsharp_common::Program;
use lsharp_vm::{VmOptions, VM};

/// Compile a .ls source file to .lsb bytecode.
pub fn compile(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: compile requires an input file");
        eprintln!("Usage: lsharp compile <input.ls> [-o output.lsb]");
        return Err(1);
    }

    let input = &args[0];

    let output = match parse_output(&args[1..])? {
        Some(output) => output.clone(),
        None if input.ends_with(".ls") => format!("{input}b"),
        None => format!("{input}.lsb"),
    };

    let source = fs::read_to_string(input).map_err(|e| {
        eprintln!("error: cannot read '{input}': {e}");
        1
    })?;

    let compiled = lsharp_compiler::compile_source(&source).map_err(|e| {
        eprintln!("error: {e}");
        2
    })?;

    if compiled.has_diagnostics() {
        for d in &compiled.diagnostics {
            eprintln!("error: {input}:{d}");
        }
        return Err(2);
    }

    compiled.write(&output).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    eprintln!(
        "compiled {} instructions, {} objects -> {output}",
        compiled.program.len(),
        compiled.program.objects.len()
    );
    Ok(())
}

/// Execute a .lsb bytecode file.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: lsharp run <input.lsb> [--gc-every N]");
        return Err(1);
    }

    let input = &args[0];
    let options = VmOptions {
        gc_interval: parse_gc_every(&args[1..])?,
        ..VmOptions::default()
    };
    let program = read_binary(input)?;

    let mut vm = VM::with_options(program, options);
    match vm.run() {
        Ok(()) => {
            info!("{input}: halted with {} value(s) on the stack", vm.stack().len());
            Ok(())
        }
        Err(e) => {
            eprintln!("runtime error: {e}");
            Err(3)
        }
    }
}

/// Disassemble a .lsb bytecode file to text.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: lsharp disassemble <input.lsb>");
        return Err(1);
    }

    let input = &args[0];
    let program = read_binary(input)?;
    print!("{}", lsharp_common::disassemble(&program));
    Ok(())
}

fn read_binary(path: &str) -> Result<Program, i32> {
    lsharp_vm::load_program(path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })
}

/// Parse the -o flag from arguments.
fn parse_output(args: &[String]) -> Result<Option<&String>, i32> {
    match args {
        [] => Ok(None),
        [flag] if flag == "-o" => {
            eprintln!("error: -o requires a value");
            Err(1)
        }
        [flag, output] if flag == "-o" => Ok(Some(output)),
        [flag, _, extra, ..] if flag == "-o" => {
            eprintln!("error: unexpected argument '{extra}'");
            Err(1)
        }
        [other, ..] => {
            eprintln!("error: unexpected argument '{other}'");
            Err(1)
        }
    }
}

/// Parse the --gc-every flag from arguments.
fn parse_gc_every(args: &[String]) -> Result<Option<usize>, i32> {
    match args {
        [] => Ok(None),
        [flag] if flag == "--gc-every" => {
            eprintln!("error: --gc-every requires a value");
            Err(1)
        }
        [flag, value] if flag == "--gc-every" => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(Some(n)),
            _ => {
                eprintln!("error: --gc-every expects a positive integer, got '{value}'");
                Err(1)
            }
        },
        [other, ..] => {
            eprintln!("error: unexpected argument '{other}'");
            Err(1)
        }
    }
}
