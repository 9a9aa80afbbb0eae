//! Patito compiler library: lexer, parser, and SDT engine that turn
//! Patito source text into a serializable [`ObjectProgram`].
//!
//! ```no_run
//! use patc::compile_source;
//!
//! let object = compile_source("programa demo; main { print(\"hi\"); } end").unwrap();
//! println!("{}", object.to_json_pretty().unwrap());
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod constant_table;
pub mod error;
pub mod function_directory;
pub mod lexer;
pub mod memory_map;
pub mod parser;
pub mod semantic_cube;
pub mod variable_table;

pub use config::CompilerConfig;
pub use error::{CompileError, ParseError, SemanticError, SemanticErrors};

use std::fs;
use std::path::Path;

use patito_core::ObjectProgram;

/// Compile Patito source text with the default configuration (§7: collect
/// every semantic error rather than stopping at the first).
pub fn compile_source(source: &str) -> Result<ObjectProgram, CompileError> {
    compile_source_with_config(source, &CompilerConfig::default())
}

/// Compile Patito source text with an explicit configuration.
pub fn compile_source_with_config(source: &str, config: &CompilerConfig) -> Result<ObjectProgram, CompileError> {
    let program = parser::parse(source)?;
    codegen::compile_with_config(&program, config).map_err(CompileError::from)
}

/// Read `path`, compile it, and return the object program.
pub fn compile_file(path: &Path) -> Result<ObjectProgram, CompileError> {
    compile_file_with_config(path, &CompilerConfig::default())
}

/// Read `path`, compile it with an explicit configuration, and return the
/// object program.
pub fn compile_file_with_config(path: &Path, config: &CompilerConfig) -> Result<ObjectProgram, CompileError> {
    let source = fs::read_to_string(path)?;
    compile_source_with_config(&source, config)
}
