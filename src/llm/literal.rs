//! Strict literal parser for model replies.
//!
//! Accepts a single Python-style literal and nothing else:
//!
//! ```text
//! literal := string | number | "True" | "False" | "None"
//!          | "[" [literal ("," literal)* [","]] "]"
//!          | "(" [literal ("," literal)* [","]] ")"
//! string  := ["u" | "r"] ( '...' | "..." )
//! number  := ["+" | "-"] digits ["." digits] [("e" | "E") ["+" | "-"] digits]
//! ```
//!
//! There is no evaluation step: names other than `True`, `False` and `None`,
//! operators, calls, subscripts and comprehensions are all syntax errors.
//! Nesting is capped at [`MAX_DEPTH`].

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Maximum container nesting accepted by [`parse_literal`].
pub const MAX_DEPTH: usize = 32;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
}

impl Literal {
    /// Short type name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "str",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Bool(_) => "bool",
            Literal::None => "None",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiteralError {
    #[error("input is empty")]
    Empty,

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character {ch:?} at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("name {0:?} is not a literal")]
    UnknownName(String),

    #[error("invalid number {0:?}")]
    InvalidNumber(String),

    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),

    #[error("unterminated string starting at byte {0}")]
    UnterminatedString(usize),

    #[error("nesting deeper than {}", MAX_DEPTH)]
    TooDeep,

    #[error("trailing input at byte {0}")]
    TrailingInput(usize),
}

/// Parse `input` as exactly one literal, surrounded by optional whitespace.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    if input.trim().is_empty() {
        return Err(LiteralError::Empty);
    }
    let mut parser = Parser {
        chars: input.char_indices().peekable(),
    };
    let value = parser.value(0)?;
    parser.skip_ws();
    match parser.chars.peek() {
        None => Ok(value),
        Some(&(pos, _)) => Err(LiteralError::TrailingInput(pos)),
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl Parser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn peek(&mut self) -> Result<(usize, char), LiteralError> {
        self.chars.peek().copied().ok_or(LiteralError::UnexpectedEnd)
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep);
        }
        self.skip_ws();
        let (pos, ch) = self.peek()?;
        match ch {
            '[' => {
                self.chars.next();
                let (items, _) = self.sequence(']', depth)?;
                Ok(Literal::List(items))
            }
            '(' => {
                self.chars.next();
                let (mut items, saw_comma) = self.sequence(')', depth)?;
                // `(x)` is a parenthesised value, `(x,)` and `()` are tuples.
                if items.len() == 1 && !saw_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Literal::Tuple(items))
                }
            }
            '\'' | '"' => self.string(false),
            '+' | '-' | '.' | '0'..='9' => self.number(),
            c if c.is_alphabetic() || c == '_' => self.name(),
            _ => Err(LiteralError::UnexpectedChar { ch, pos }),
        }
    }

    /// Comma-separated values up to `close`; the opening bracket is consumed.
    fn sequence(
        &mut self,
        close: char,
        depth: usize,
    ) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            let (pos, ch) = self.peek()?;
            if ch == close {
                self.chars.next();
                return Ok((items, saw_comma));
            }
            if ch == ',' {
                return Err(LiteralError::UnexpectedChar { ch, pos });
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            let (pos, ch) = self.peek()?;
            match ch {
                ',' => {
                    self.chars.next();
                    saw_comma = true;
                }
                c if c == close => {}
                _ => return Err(LiteralError::UnexpectedChar { ch, pos }),
            }
        }
    }

    fn name(&mut self) -> Result<Literal, LiteralError> {
        let mut ident = String::new();
        while let Some((_, c)) = self.chars.next_if(|&(_, c)| c.is_alphanumeric() || c == '_') {
            ident.push(c);
        }

        if matches!(self.chars.peek(), Some(&(_, '\'' | '"'))) {
            return match ident.as_str() {
                "u" | "U" => self.string(false),
                "r" | "R" => self.string(true),
                _ => Err(LiteralError::UnknownName(ident)),
            };
        }

        match ident.as_str() {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            _ => Err(LiteralError::UnknownName(ident)),
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let mut text = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|&(_, c)| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'))
        {
            // A sign is only valid at the start or right after an exponent marker.
            if matches!(c, '+' | '-') && !(text.is_empty() || text.ends_with(['e', 'E'])) {
                return Err(LiteralError::InvalidNumber(format!("{text}{c}")));
            }
            text.push(c);
        }

        if !underscores_between_digits(&text) {
            return Err(LiteralError::InvalidNumber(text));
        }
        let cleaned = text.replace('_', "");
        let unsigned = cleaned.trim_start_matches(['+', '-']);
        if unsigned.is_empty() || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return Err(LiteralError::InvalidNumber(text));
        }

        if unsigned.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = cleaned.parse::<i64>() {
                return Ok(Literal::Int(n));
            }
        }
        if unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            if let Ok(f) = cleaned.parse::<f64>() {
                return Ok(Literal::Float(f));
            }
        }
        Err(LiteralError::InvalidNumber(text))
    }

    fn string(&mut self, raw: bool) -> Result<Literal, LiteralError> {
        let (start, quote) = self.peek()?;
        self.chars.next();

        let mut out = String::new();
        loop {
            let (pos, c) = self
                .chars
                .next()
                .ok_or(LiteralError::UnterminatedString(start))?;
            match c {
                c if c == quote => return Ok(Literal::Str(out)),
                '\n' => return Err(LiteralError::UnterminatedString(start)),
                '\\' if raw => {
                    let (_, next) = self
                        .chars
                        .next()
                        .ok_or(LiteralError::UnterminatedString(start))?;
                    out.push('\\');
                    out.push(next);
                }
                '\\' => self.escape(pos, start, &mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, pos: usize, start: usize, out: &mut String) -> Result<(), LiteralError> {
        let (_, c) = self
            .chars
            .next()
            .ok_or(LiteralError::UnterminatedString(start))?;
        match c {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'x' => out.push(self.hex_char(2, pos)?),
            'u' => out.push(self.hex_char(4, pos)?),
            'U' => out.push(self.hex_char(8, pos)?),
            // Unknown escapes keep the backslash.
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize, pos: usize) -> Result<char, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let (_, c) = self.chars.next().ok_or(LiteralError::InvalidEscape(pos))?;
            let d = c.to_digit(16).ok_or(LiteralError::InvalidEscape(pos))?;
            code = code * 16 + d;
        }
        char::from_u32(code).ok_or(LiteralError::InvalidEscape(pos))
    }
}

/// Digit separators must sit between two digits: `1_000`, not `1_` or `1__0`.
fn underscores_between_digits(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
