use std::path::Path;

pub mod codegen;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod symbols;
pub mod tokenizer;

pub use codegen::*;
pub use error::{CompileError, CompileResult, Diagnostic};
pub use parser::*;
pub use symbols::SymbolTable;
pub use tokenizer::*;

/// Compiles Pulang source text into a program for the register machine.
pub fn compile(source: &str) -> CompileResult<Compilation> {
    Parser::new(tokenize(source)).parse()
}

pub fn compile_file(path: &Path) -> CompileResult<Compilation> {
    Parser::new(tokenize_file(path)?).parse()
}
