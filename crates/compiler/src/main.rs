//! `patitoc` -- command-line front end for the Patito compiler and VM.

use std::path::PathBuf;
use std::process;

use clap::{Parser as ClapParser, Subcommand};
use patc::{compile_file, CompileError};
use patito_core::ObjectProgram;
use patito_vm::VirtualMachine;

#[derive(ClapParser)]
#[command(name = "patitoc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Patito compiler and virtual machine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a .pat source file to a JSON object program.
    Compile {
        /// Input .pat source file
        input: PathBuf,

        /// Output object file (defaults to input filename with .patobj extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a previously compiled object program.
    Run {
        /// Object program produced by `patitoc compile`
        object: PathBuf,
    },

    /// Compile and immediately run a .pat source file without writing an object file.
    Execute {
        /// Input .pat source file
        input: PathBuf,
    },

    /// Parse and type-check a .pat source file, reporting diagnostics without emitting an object program.
    Analyze {
        /// Input .pat source file
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("patc=info".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile { input, output } => run_compile(&input, output),
        Commands::Run { object } => run_object(&object),
        Commands::Execute { input } => run_execute(&input),
        Commands::Analyze { input } => run_analyze(&input),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn run_compile(input: &std::path::Path, output: Option<PathBuf>) -> Result<(), i32> {
    let object = compile_or_report(input)?;

    let output = output.unwrap_or_else(|| input.with_extension("patobj"));
    patito_core::io::save(&object, &output).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    println!("compiled {} -> {}", input.display(), output.display());
    Ok(())
}

fn run_object(object_path: &std::path::Path) -> Result<(), i32> {
    let object = patito_core::io::load(object_path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    execute(&object)
}

fn run_execute(input: &std::path::Path) -> Result<(), i32> {
    let object = compile_or_report(input)?;
    execute(&object)
}

fn run_analyze(input: &std::path::Path) -> Result<(), i32> {
    compile_or_report(input)?;
    println!("{}: no errors", input.display());
    Ok(())
}

fn compile_or_report(input: &std::path::Path) -> Result<ObjectProgram, i32> {
    match compile_file(input) {
        Ok(object) => Ok(object),
        Err(CompileError::Io(e)) => {
            eprintln!("error: could not read {}: {e}", input.display());
            Err(1)
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}

fn execute(object: &ObjectProgram) -> Result<(), i32> {
    let mut vm = VirtualMachine::new(object).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    // `VirtualMachine::run` already writes each PRINT item to stdout inline
    // (no separator, no trailing newline, per §4.7); its returned Vec is for
    // callers that want the captured output, not for the CLI to re-emit.
    vm.run().map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    Ok(())
}
