use std::fmt;

/// A lexical unit of the source language.
///
/// All variants but [`Token::Identifier`] and [`Token::Integer`] are fixed
/// lexemes; equality compares the variant and, for those two, the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Class,
    Extends,
    Constructor,
    Super,
    This,
    New,
    Int,
    Bool,
    Void,
    True,
    False,
    If,
    Else,
    While,
    Return,
    Println,

    /// `+`
    Plus,
    /// `<`
    Less,
    /// `==`
    Eq,
    /// `=`
    Assign,
    Dot,
    Comma,
    Semicolon,
    LBrace,
    RBrace,
    LParen,
    RParen,

    Identifier(Box<str>),
    Integer(i64),
}

impl Token {
    pub fn ident(name: &str) -> Token {
        Token::Identifier(name.into())
    }

    /// Returns the fixed lexeme of this token, or `None` for identifiers and
    /// integer literals.
    pub fn lexeme(&self) -> Option<&'static str> {
        use Token::*;
        let s = match self {
            Class => "class",
            Extends => "extends",
            Constructor => "constructor",
            Super => "super",
            This => "this",
            New => "new",
            Int => "int",
            Bool => "bool",
            Void => "void",
            True => "true",
            False => "false",
            If => "if",
            Else => "else",
            While => "while",
            Return => "return",
            Println => "println",
            Plus => "+",
            Less => "<",
            Eq => "==",
            Assign => "=",
            Dot => ".",
            Comma => ",",
            Semicolon => ";",
            LBrace => "{",
            RBrace => "}",
            LParen => "(",
            RParen => ")",
            Identifier(_) | Integer(_) => return None,
        };
        Some(s)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Identifier(name) => f.write_str(name),
            Token::Integer(value) => write!(f, "{value}"),
            other => f.write_str(other.lexeme().unwrap_or_default()),
        }
    }
}

pub static KEYWORDS: phf::Map<&'static str, Token> = phf::phf_map! {
    "class" => Token::Class,
    "extends" => Token::Extends,
    "constructor" => Token::Constructor,
    "super" => Token::Super,
    "this" => Token::This,
    "new" => Token::New,
    "int" => Token::Int,
    "bool" => Token::Bool,
    "void" => Token::Void,
    "true" => Token::True,
    "false" => Token::False,
    "if" => Token::If,
    "else" => Token::Else,
    "while" => Token::While,
    "return" => Token::Return,
    "println" => Token::Println,
};
