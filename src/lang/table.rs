//! ## Token tables
//!
//! AMOS keeps the names of its instructions inside the extension binaries
//! themselves, which are Amiga hunk executables. The table starts just past
//! the code hunk header and is a packed list of entries:
//!
//! ```text
//! +0  u16 instruction offset, u16 function offset (0 ends the table)
//! +4  name, last character has bit 7 set
//!     type byte, parameter bytes, terminator >= $FD, pad to even
//! ```
//!
//! A token in the tokenized source refers to an entry by its byte offset from
//! the table start, so the composite key of an entry is
//! `slot << 16 | offset`. For the core vocabulary (slot 0) that is the raw
//! token code.

use super::reader::{align2, u16_be, u32_be};
use super::Error;
use std::collections::HashMap;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

const HUNK_HEADER: u32 = 0x0000_03F3;
const HUNK_CODE: u32 = 0x0000_03E9;
const AP20: u32 = 0x4150_3230;
const CODE_SIZE_OFFSET: usize = 32;
const TABLE_BIAS: usize = 32 + 18;
const MIN_LEN: usize = 54;

/// Bytes before the first entry of the core vocabulary table.
pub const CORE_HEADER_SKIP: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: u8,
}

impl Entry {
    pub fn new(name: &str, kind: u8) -> Entry {
        Entry {
            name: name.to_string(),
            kind,
        }
    }
}

pub fn composite_key(slot: u8, offset: u16) -> u32 {
    (slot as u32) << 16 | offset as u32
}

#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: HashMap<u32, Entry>,
}

impl TokenTable {
    pub fn new() -> TokenTable {
        TokenTable::default()
    }

    /// Decode the token table of one extension binary.
    pub fn parse(bytes: &[u8], slot: u8, header_skip: usize) -> Result<TokenTable> {
        let mut table = TokenTable::new();
        table.load(bytes, slot, header_skip)?;
        Ok(table)
    }

    /// Decode an extension binary into this table. Returns the number of
    /// entries added.
    pub fn load(&mut self, bytes: &[u8], slot: u8, header_skip: usize) -> Result<usize> {
        let len = bytes.len();
        if len < MIN_LEN {
            return Err(error!(FormatError; "EXTENSION TOO SMALL"));
        }
        if u32_be(bytes, 0)? != HUNK_HEADER || u32_be(bytes, 24)? != HUNK_CODE {
            return Err(error!(FormatError; "NOT AN AMIGA HUNK FILE"));
        }
        let mut table_offset = (u32_be(bytes, CODE_SIZE_OFFSET)? as usize).saturating_add(TABLE_BIAS);
        if u32_be(bytes, TABLE_BIAS)? == AP20 {
            table_offset += 4;
        }
        if table_offset > len {
            return Err(error!(FormatError, ..table_offset; "BAD TOKEN TABLE OFFSET"));
        }

        let mut count = 0;
        let mut p = table_offset.saturating_add(header_skip);
        while p + 2 < len {
            let key = composite_key(slot, ((p - table_offset) & 0xFFFF) as u16);
            if u16_be(bytes, p)? == 0 {
                break;
            }
            p += 4;
            let name_start = p;
            while p < len && bytes[p] < 0x80 {
                p += 1;
            }
            if p >= len {
                break;
            }
            let name_end = p;
            p += 1;
            let kind = bytes.get(p).copied().unwrap_or(0);
            while p < len && bytes[p] < 0xFD {
                p += 1;
            }
            p = align2(p + 1);

            let name: String = bytes[name_start..=name_end]
                .iter()
                .map(|b| (b & 0x7F) as char)
                .collect();
            self.entries.insert(
                key,
                Entry {
                    name: name.trim_end().to_string(),
                    kind,
                },
            );
            count += 1;
        }
        debug!(slot, count, "token table loaded");
        Ok(count)
    }

    pub fn insert(&mut self, key: u32, entry: Entry) -> Option<Entry> {
        self.entries.insert(key, entry)
    }

    pub fn get(&self, key: u32) -> Option<&Entry> {
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a key to its name, or a stand-in naming the slot and offset.
    pub fn name(&self, key: u32) -> String {
        match self.get(key) {
            Some(entry) => entry.name.clone(),
            None => placeholder(key),
        }
    }
}

impl std::iter::FromIterator<(u32, Entry)> for TokenTable {
    fn from_iter<T: IntoIterator<Item = (u32, Entry)>>(iter: T) -> TokenTable {
        TokenTable {
            entries: iter.into_iter().collect(),
        }
    }
}

pub fn placeholder(key: u32) -> String {
    format!("UNK_{}_{:x}", key >> 16, key & 0xFFFF)
}

/// Extract the bytes of a C array initializer such as
/// `unsigned char ext00_base [] = { 0x00, 0x03, ... };`
pub fn bytes_from_c_array(text: &str) -> Result<Vec<u8>> {
    let open = match text.find('{') {
        Some(i) => i,
        None => return Err(error!(FormatError; "NO ARRAY INITIALIZER")),
    };
    let close = match text[open..].find('}') {
        Some(i) => open + i,
        None => return Err(error!(FormatError; "UNTERMINATED ARRAY INITIALIZER")),
    };
    let mut bytes = vec![];
    for tok in text[open + 1..close].split(|c: char| c == ',' || c.is_whitespace()) {
        if tok.is_empty() {
            continue;
        }
        let value = if let Some(hex) = tok.strip_prefix("0x").or_else(|| tok.strip_prefix("0X")) {
            u32::from_str_radix(hex, 16)
        } else {
            tok.parse::<u32>()
        };
        match value {
            Ok(v) => bytes.push((v & 0xFF) as u8),
            Err(_) => continue,
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        assert_eq!(placeholder(composite_key(3, 0x1A)), "UNK_3_1a");
        assert_eq!(placeholder(0x0054), "UNK_0_54");
    }

    #[test]
    fn test_c_array() {
        let text = "unsigned char ext00_base [] = {\n 0x00, 0x03,0xF3 ,\n 12, 0XFF };\n";
        assert_eq!(bytes_from_c_array(text).unwrap(), vec![0x00, 0x03, 0xF3, 12, 0xFF]);
        assert!(bytes_from_c_array("int x = 3;").is_err());
    }

    #[test]
    fn test_too_small() {
        let e = TokenTable::parse(&[0; 20], 0, CORE_HEADER_SKIP).unwrap_err();
        assert!(e.is(crate::lang::ErrorCode::FormatError));
    }
}
