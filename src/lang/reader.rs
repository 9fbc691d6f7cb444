//! Big-endian field extraction over byte slices.
//!
//! Every read is bounds checked and fails with `OutOfRange`.

use super::Error;

type Result<T> = std::result::Result<T, Error>;

pub fn u16_be(buf: &[u8], offset: usize) -> Result<u16> {
    let b = field(buf, offset, 2)?;
    Ok(u16::from_be_bytes([b[0], b[1]]))
}

pub fn u32_be(buf: &[u8], offset: usize) -> Result<u32> {
    let b = field(buf, offset, 4)?;
    Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn field(buf: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or_else(|| error!(OutOfRange, ..offset))
}

/// Round up to the next even number.
pub fn align2(n: usize) -> usize {
    (n + 1) & !1
}

/// Sequential reader used by the tokenizer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Cursor<'a> {
        Cursor { buf, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn u8(&mut self) -> Result<u8> {
        match self.buf.get(self.pos) {
            Some(b) => {
                self.pos += 1;
                Ok(*b)
            }
            None => Err(error!(OutOfRange, ..self.pos)),
        }
    }

    pub fn u16(&mut self) -> Result<u16> {
        let v = u16_be(self.buf, self.pos)?;
        self.pos += 2;
        Ok(v)
    }

    pub fn u32(&mut self) -> Result<u32> {
        let v = u32_be(self.buf, self.pos)?;
        self.pos += 4;
        Ok(v)
    }

    pub fn u64(&mut self) -> Result<u64> {
        let hi = self.u32()? as u64;
        let lo = self.u32()? as u64;
        Ok(hi << 32 | lo)
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        match self.buf.get(self.pos..self.pos.saturating_add(len)) {
            Some(b) if b.len() == len => {
                self.pos += len;
                Ok(b)
            }
            _ => Err(error!(OutOfRange, ..self.pos)),
        }
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.bytes(len).map(|_| ())
    }

    /// Skip a pad byte if the position is odd.
    pub fn align(&mut self) -> Result<()> {
        if self.pos & 1 == 1 {
            self.skip(1)?;
        }
        Ok(())
    }
}
