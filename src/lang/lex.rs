use super::reader::Cursor;
use super::table::{composite_key, placeholder, TokenTable};
use super::token::{code, Literal, ProcHeader, Token};
use super::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Decode the token body of one line. `base` is the absolute offset of
/// `body`, used when reporting a malformed line.
///
/// Codes are read one after another; only literals, names, extension
/// words, REM and PROCEDURE carry a payload. The second value is the
/// offset of an end-of-line marker that left part of the body unread.
pub fn lex(
    body: &[u8],
    base: usize,
    table: &TokenTable,
) -> Result<(Vec<Token>, Option<usize>)> {
    let mut lexer = Lexer {
        cursor: Cursor::new(body),
        table,
    };
    let mut tokens: Vec<Token> = vec![];
    while !lexer.cursor.is_empty() {
        let at = lexer.cursor.pos();
        match lexer.token() {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) if lexer.cursor.is_empty() => break,
            Ok(None) => return Ok((tokens, Some(base + at))),
            Err(_) => return Err(error!(MalformedSource, ..base + at; "TOKEN CROSSES LINE END")),
        }
    }
    Ok((tokens, None))
}

struct Lexer<'a> {
    cursor: Cursor<'a>,
    table: &'a TokenTable,
}

impl<'a> Lexer<'a> {
    fn token(&mut self) -> Result<Option<Token>> {
        let tk = self.cursor.u16()?;
        let token = match tk {
            code::END_OF_LINE => return Ok(None),
            code::VARIABLE => Token::Variable(self.variable()?),
            code::LABEL => Token::Label(self.name()?),
            code::PROCEDURE_REF => Token::ProcedureRef(self.name()?),
            code::LABEL_REF => Token::LabelRef(self.name()?),
            tk if tk < code::LABEL_REF => Token::Variable(self.name()?),
            code::BINARY => Token::Literal(Literal::Binary(self.cursor.u32()?)),
            code::STRING_1 | code::STRING_2 => Token::Literal(Literal::String(self.string()?)),
            code::HEX => Token::Literal(Literal::Hex(self.cursor.u32()?)),
            code::INTEGER => Token::Literal(Literal::Integer(self.cursor.u32()? as i32)),
            code::FLOAT => Token::Literal(Literal::Float(self.cursor.u32()?)),
            code::DOUBLE => Token::Literal(Literal::Double(self.cursor.u64()?)),
            tk if tk < code::EXTENSION => Token::Word(placeholder(tk as u32).into()),
            code::EXTENSION => {
                let slot = self.cursor.u8()?;
                self.cursor.skip(1)?;
                let offset = self.cursor.u16()?;
                self.word(composite_key(slot, offset))
            }
            code::REM_1 | code::REM_2 => {
                self.cursor.skip(1)?;
                let len = self.cursor.u8()? as usize;
                let text = self.text(len)?;
                self.cursor.align()?;
                Token::Rem(text)
            }
            code::PROCEDURE => Token::Procedure(ProcHeader {
                size: self.cursor.u32()?,
                seed: self.cursor.u16()?,
                flags: self.cursor.u8()?,
                key: self.cursor.u8()?,
            }),
            tk => self.word(tk as u32),
        };
        Ok(Some(token))
    }

    fn word(&self, key: u32) -> Token {
        let name = match self.table.get(key) {
            Some(entry) => entry.name.trim().to_ascii_uppercase(),
            None => placeholder(key),
        };
        Token::Word(name.into())
    }

    fn name(&mut self) -> Result<Rc<str>> {
        Ok(self.name_and_flags()?.0.into())
    }

    // Low flag bits give the type: 1 float, 2 string.
    fn variable(&mut self) -> Result<Rc<str>> {
        let (mut name, flags) = self.name_and_flags()?;
        match flags & 3 {
            1 => name.push('#'),
            2 => name.push('$'),
            _ => {}
        }
        Ok(name.into())
    }

    // 2 reserved bytes, length, flags, name padded to even.
    fn name_and_flags(&mut self) -> Result<(String, u8)> {
        self.cursor.skip(2)?;
        let len = self.cursor.u8()? as usize;
        let flags = self.cursor.u8()?;
        let raw = self.cursor.bytes(len)?;
        self.cursor.align()?;
        let raw = match raw.iter().position(|b| *b == 0) {
            Some(nul) => &raw[..nul],
            None => raw,
        };
        let name: String = raw.iter().map(|b| *b as char).collect();
        Ok((name.to_ascii_uppercase(), flags))
    }

    fn string(&mut self) -> Result<Rc<str>> {
        let len = self.cursor.u16()? as usize;
        let s = self.text(len)?;
        self.cursor.align()?;
        Ok(s)
    }

    fn text(&mut self, len: usize) -> Result<Rc<str>> {
        let s: String = self.cursor.bytes(len)?.iter().map(|b| *b as char).collect();
        Ok(s.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::table::Entry;

    fn table() -> TokenTable {
        vec![
            (0x0054, Entry::new(":", 0)),
            (0x023C, Entry::new("For", 0)),
            (composite_key(2, 0x10), Entry::new("Hslider ", 0)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_literals() {
        let body = [
            0x00, 0x3E, 0xFF, 0xFF, 0xFF, 0xFE, // -2
            0x00, 0x26, 0x00, 0x03, b'a', b'b', b'c', 0x00, // "abc"
            0x00, 0x36, 0x00, 0x00, 0x00, 0xFF, // $FF
            0x00, 0x00,
        ];
        assert_eq!(
            lex(&body, 0, &table()).unwrap().0,
            vec![
                Token::Literal(Literal::Integer(-2)),
                Token::Literal(Literal::String("abc".into())),
                Token::Literal(Literal::Hex(0xFF)),
            ]
        );
    }

    #[test]
    fn test_names_and_words() {
        let body = [
            0x02, 0x3C, // For
            0x00, 0x06, 0x00, 0x00, 0x01, 0x00, b'i', 0x00, // I
            0x00, 0x54, // :
            0x00, 0x4E, 0x02, 0x00, 0x00, 0x10, // extension 2
            0x00, 0x4E, 0x03, 0x00, 0x00, 0x1A, // unknown
            0x00, 0x06, 0x00, 0x00, 0x01, 0x02, b'a', 0x00, // A$
        ];
        assert_eq!(
            lex(&body, 0, &table()).unwrap(),
            (
                vec![
                    Token::Word("FOR".into()),
                    Token::Variable("I".into()),
                    Token::Word(":".into()),
                    Token::Word("HSLIDER".into()),
                    Token::Word("UNK_3_1a".into()),
                    Token::Variable("A$".into()),
                ],
                None
            )
        );
    }

    #[test]
    fn test_early_end_of_line() {
        let body = [
            0x02, 0x3C, // For
            0x00, 0x00, // end of line
            0x00, 0x06, 0x00, 0x00, 0x01, 0x00, b'i', 0x00, // I
            0x00, 0x00,
        ];
        let (tokens, cut) = lex(&body, 30, &table()).unwrap();
        assert_eq!(tokens, vec![Token::Word("FOR".into())]);
        assert_eq!(cut, Some(32));
    }

    #[test]
    fn test_truncated_token() {
        let body = [0x00, 0x3E, 0x00, 0x00];
        let e = lex(&body, 22, &table()).unwrap_err();
        assert!(e.is(crate::lang::ErrorCode::MalformedSource));
        assert_eq!(e.offset(), Some(22));
    }
}
