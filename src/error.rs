use crate::{code_gen, lexer, parser, type_checker};

/// A failure of any compilation stage.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tokenizer(#[from] lexer::Error),
    #[error(transparent)]
    Parser(#[from] parser::Error),
    #[error(transparent)]
    Type(#[from] type_checker::Error),
    #[error(transparent)]
    CodeGenerator(#[from] code_gen::Error),
}

impl Error {
    /// Name of the stage which failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Tokenizer(_) => "tokenizer",
            Error::Parser(_) => "parser",
            Error::Type(_) => "type checker",
            Error::CodeGenerator(_) => "code generator",
        }
    }
}
