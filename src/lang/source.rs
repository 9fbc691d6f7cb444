use super::lex::lex;
use super::reader::u32_be;
use super::table::TokenTable;
use super::token::Token;
use super::Error;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

pub const HEADER_LEN: usize = 20;
const LENGTH_OFFSET: usize = 16;

/// ## Tokenized source file
///
/// A 20 byte header whose only trusted field is the big-endian token region
/// length at offset 16, followed by the lines of the program.

#[derive(Debug)]
pub struct Source<'a> {
    tokens: &'a [u8],
    declared: usize,
}

impl<'a> Source<'a> {
    pub fn new(file: &'a [u8]) -> Result<Source<'a>> {
        if file.len() < HEADER_LEN {
            return Err(error!(FormatError; "FILE TOO SMALL FOR HEADER"));
        }
        let declared = u32_be(file, LENGTH_OFFSET)? as usize;
        let end = HEADER_LEN.saturating_add(declared).min(file.len());
        Ok(Source {
            tokens: &file[HEADER_LEN..end],
            declared,
        })
    }

    /// The token region, clamped to the file.
    pub fn tokens(&self) -> &'a [u8] {
        self.tokens
    }

    pub fn is_truncated(&self) -> bool {
        self.tokens.len() < self.declared
    }

    pub fn lines<'t>(&self, table: &'t TokenTable) -> Lines<'a, 't> {
        Lines {
            tokens: self.tokens,
            table,
            pos: 0,
            number: 0,
            done: false,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Line {
    pub number: usize,
    /// Offset of the line in the file.
    pub offset: usize,
    pub indent: u8,
    pub tokens: Vec<Token>,
    /// Offset of an end-of-line marker with body bytes still after it.
    pub cut: Option<usize>,
}

pub struct Lines<'a, 't> {
    tokens: &'a [u8],
    table: &'t TokenTable,
    pos: usize,
    number: usize,
    done: bool,
}

impl<'a, 't> Iterator for Lines<'a, 't> {
    type Item = Result<Line>;

    fn next(&mut self) -> Option<Result<Line>> {
        if self.done || self.pos >= self.tokens.len() {
            return None;
        }
        let start = self.pos;
        let offset = HEADER_LEN + start;
        let len = self.tokens[start] as usize * 2;
        if len == 0 {
            debug!(offset, "zero length line ends the source");
            self.done = true;
            return None;
        }
        let end = start + len;
        if end > self.tokens.len() {
            self.done = true;
            return Some(Err(error!(MalformedSource, ..offset; "LINE PAST END OF SOURCE")));
        }
        let indent = self.tokens[start + 1];
        let (tokens, cut) = match lex(&self.tokens[start + 2..end], offset + 2, self.table) {
            Ok(lexed) => lexed,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let line = Line {
            number: self.number,
            offset,
            indent,
            tokens,
            cut,
        };
        self.pos = end;
        self.number += 1;
        Some(Ok(line))
    }
}
