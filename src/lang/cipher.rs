/*!
## Procedure cipher

Protected procedures have their token bytes scrambled with a keystream
seeded from the procedure header. The same walk both scrambles and
unscrambles; each call flips the encrypted bit of the header.

*/

use super::reader::{u16_be, u32_be};
use super::source::HEADER_LEN;
use super::token::{code, proc_flags};
use super::Error;
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

const FLAGS: usize = 10;

/// Toggle the procedure whose line starts at `buf[0]`. Returns false
/// without touching anything when the span is too short or the
/// procedure is compiled.
pub fn toggle(buf: &mut [u8]) -> Result<bool> {
    if buf.len() < 12 || buf[FLAGS] & proc_flags::COMPILED != 0 {
        return Ok(false);
    }
    let size = u32_be(buf, 4)?;
    let end = (size as usize).saturating_add(8 + 6).min(buf.len());
    let mut key = (size << 8) | buf[11] as u32;
    let mut key2: u32 = 1;
    let key3 = u16_be(buf, 8)? as u32;

    let mut line = buf[0] as usize * 2;
    while line < end {
        let len = buf[line] as usize * 2;
        if len == 0 {
            debug!(line, "zero length line inside procedure");
            return Ok(false);
        }
        let next = (line + len).min(buf.len());
        let mut p = line + 4;
        while p < next {
            buf[p] ^= (key >> 8) as u8;
            p += 1;
            if p >= next {
                break;
            }
            buf[p] ^= key as u8;
            p += 1;
            key = (key & 0xFFFF_0000) | (key.wrapping_add(key2) & 0xFFFF);
            key2 = (key2 + key3) & 0xFFFF;
            key = key.rotate_right(1);
        }
        line += len;
    }
    buf[FLAGS] ^= proc_flags::ENCRYPTED;
    Ok(true)
}

/// Decrypt every encrypted procedure of a tokenized source file in place.
/// Returns the number unlocked.
pub fn unlock_procedures(file: &mut [u8]) -> Result<usize> {
    let declared = u32_be(file, HEADER_LEN - 4)? as usize;
    let end = HEADER_LEN.saturating_add(declared).min(file.len());
    let mut count = 0;
    let mut pos = HEADER_LEN;
    while pos < end {
        let len = file[pos] as usize * 2;
        if len == 0 {
            break;
        }
        let is_proc = matches!(u16_be(file, pos + 2), Ok(code::PROCEDURE));
        if is_proc && pos + 12 <= end {
            let flags = file[pos + FLAGS];
            if flags & proc_flags::ENCRYPTED != 0 && flags & proc_flags::COMPILED == 0 {
                if toggle(&mut file[pos..end])? {
                    debug!(offset = pos, "unlocked procedure");
                    count += 1;
                }
            }
        }
        pos += len;
    }
    Ok(count)
}
