/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST.
pub mod parser;

/// The type checker takes an untyped AST, checks the soundness of its types,
/// and maps it into a typed AST.
pub mod type_checker;

/// The code generator takes a typed AST, mapping it into JavaScript source.
pub mod code_gen;

pub mod ast;
pub mod error;
pub mod token;
pub mod types;

pub mod util {
    pub mod tree;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

pub use error::Error;

/// Compiles a source program into JavaScript, stopping at the first error.
pub fn compile(src: &str) -> Result<String, Error> {
    let tokens = lexer::tokenize(src)?;
    let program = parser::parse(&tokens)?;
    let program = type_checker::typecheck(&program)?;
    let code = code_gen::generate_code(&program)?;
    Ok(code)
}
