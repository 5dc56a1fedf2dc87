use std::iter::Peekable;

use crate::token::{Token, KEYWORDS};

pub const SUGGESTED_TOKENS_CAPACITY: usize = 1_024;

/// Tokenizes the provided source string.
///
/// Whitespace only separates tokens and is never produced. Fails on the first
/// character (or integer literal) that matches no token rule.
pub fn tokenize(src: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::with_capacity(SUGGESTED_TOKENS_CAPACITY.min(src.len() / 2 + 1));
    Lexer::new(src, &mut tokens).lex()?;
    tracing::debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unexpected character {char:?} at byte {offset}")]
    UnexpectedChar { char: char, offset: usize },
    #[error("integer literal {literal} at byte {offset} is out of bounds")]
    IntegerOutOfBounds { literal: Box<str>, offset: usize },
}

struct Lexer<'src, 'tok> {
    src: &'src str,
    iter: Peekable<std::str::Chars<'src>>,
    cursor: usize,
    current_lo: usize,
    tokens: &'tok mut Vec<Token>,
}

impl Lexer<'_, '_> {
    /// Scans the source string until the input is exhausted.
    fn lex(mut self) -> Result<(), Error> {
        while let Some(next) = self.scan_token()? {
            self.tokens.push(next);
        }
        Ok(())
    }

    /// Scans the next token, skipping any leading whitespace. Returns `None`
    /// once the input is exhausted.
    fn scan_token(&mut self) -> Result<Option<Token>, Error> {
        use Token::*;
        self.skip_whitespace();
        if self.iter.peek().is_none() {
            return Ok(None);
        }
        let token = match self.mark_advance() {
            '+' => Plus,
            '<' => Less,
            // `==` must be tried before `=`.
            '=' => match self.peek() {
                '=' => self.advance_with(Eq),
                _ => Assign,
            },
            '.' => Dot,
            ',' => Comma,
            ';' => Semicolon,
            '{' => LBrace,
            '}' => RBrace,
            '(' => LParen,
            ')' => RParen,
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier_or_keyword(),
            c if c.is_ascii_digit() => self.integer()?,
            char => {
                return Err(Error::UnexpectedChar {
                    char,
                    offset: self.current_lo,
                })
            }
        };
        Ok(Some(token))
    }

    fn identifier_or_keyword(&mut self) -> Token {
        let valid_identifier_suffix = |c: char| c.is_ascii_alphanumeric() || c == '_';

        while valid_identifier_suffix(self.peek()) {
            self.advance();
        }
        let substr = self.substr();
        match KEYWORDS.get(substr) {
            Some(keyword) => keyword.clone(),
            None => Token::ident(substr),
        }
    }

    fn integer(&mut self) -> Result<Token, Error> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let literal = self.substr();
        literal
            .parse()
            .map(Token::Integer)
            .map_err(|_| Error::IntegerOutOfBounds {
                literal: literal.into(),
                offset: self.current_lo,
            })
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_ascii_whitespace() {
            self.advance();
        }
    }
}

impl Lexer<'_, '_> {
    /// Constructs a new lexer with the default state.
    fn new<'src, 'tok>(src: &'src str, tokens: &'tok mut Vec<Token>) -> Lexer<'src, 'tok> {
        Lexer {
            src,
            iter: src.chars().peekable(),
            cursor: 0,
            current_lo: 0,
            tokens,
        }
    }

    /// Starts a new token "mark" and advances the iterator.
    fn mark_advance(&mut self) -> char {
        self.current_lo = self.cursor;
        self.advance()
    }

    /// Returns the next character and advances the iterator.
    fn advance(&mut self) -> char {
        self.iter
            .next()
            .inspect(|c| self.cursor += c.len_utf8())
            .unwrap_or('\0')
    }

    /// Advances and returns the provided value.
    fn advance_with<T>(&mut self, value: T) -> T {
        self.advance();
        value
    }

    /// Returns the next character without advancing the iterator.
    fn peek(&mut self) -> char {
        self.iter.peek().copied().unwrap_or('\0')
    }

    /// Returns the substring of the current marked bounds.
    fn substr(&self) -> &str {
        &self.src[self.current_lo..self.cursor]
    }
}
