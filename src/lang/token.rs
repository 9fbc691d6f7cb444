use std::rc::Rc;

/// Raw 16-bit token codes with fixed meaning in the tokenized source.
pub mod code {
    pub const END_OF_LINE: u16 = 0x0000;
    pub const VARIABLE: u16 = 0x0006;
    pub const LABEL: u16 = 0x000C;
    pub const PROCEDURE_REF: u16 = 0x0012;
    pub const LABEL_REF: u16 = 0x0018;
    pub const BINARY: u16 = 0x001E;
    pub const STRING_1: u16 = 0x0026;
    pub const STRING_2: u16 = 0x002E;
    pub const HEX: u16 = 0x0036;
    pub const INTEGER: u16 = 0x003E;
    pub const FLOAT: u16 = 0x0046;
    pub const EXTENSION: u16 = 0x004E;
    pub const FOR: u16 = 0x023C;
    pub const IF: u16 = 0x02BE;
    pub const PROCEDURE: u16 = 0x0376;
    pub const REM_1: u16 = 0x064A;
    pub const REM_2: u16 = 0x0652;
    pub const DOUBLE: u16 = 0x2B6A;
}

/// Flag bits in the procedure header.
pub mod proc_flags {
    pub const COMPILED: u8 = 0x10;
    pub const ENCRYPTED: u8 = 0x20;
}

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Variable(Rc<str>),
    Label(Rc<str>),
    ProcedureRef(Rc<str>),
    LabelRef(Rc<str>),
    Literal(Literal),
    /// A vocabulary word, trimmed and uppercased. Operators and punctuation
    /// arrive this way too.
    Word(Rc<str>),
    Rem(Rc<str>),
    Procedure(ProcHeader),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Binary(u32),
    String(Rc<str>),
    Hex(u32),
    Integer(i32),
    /// Motorola fast floating point bits.
    Float(u32),
    /// IEEE double bits.
    Double(u64),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ProcHeader {
    pub size: u32,
    pub seed: u16,
    pub flags: u8,
    pub key: u8,
}

impl ProcHeader {
    pub fn is_encrypted(&self) -> bool {
        self.flags & proc_flags::ENCRYPTED != 0
    }
}

impl Token {
    pub fn is_word(&self, word: &str) -> bool {
        match self {
            Token::Word(w) => &**w == word,
            _ => false,
        }
    }

    pub fn is_separator(&self) -> bool {
        self.is_word(":")
    }
}

impl Literal {
    pub fn to_f64(&self) -> Option<f64> {
        use Literal::*;
        match self {
            Binary(n) | Hex(n) => Some(*n as f64),
            Integer(n) => Some(*n as f64),
            Float(bits) => Some(ffp_to_f64(*bits)),
            Double(bits) => Some(f64::from_bits(*bits)),
            String(_) => None,
        }
    }
}

/// Motorola FFP: 24-bit mantissa, sign in bit 7, excess-64 exponent in bits 0-6.
pub fn ffp_to_f64(bits: u32) -> f64 {
    let mantissa = bits >> 8;
    if mantissa == 0 {
        return 0.0;
    }
    let exponent = (bits & 0x7F) as i32 - 64;
    let value = mantissa as f64 / (1u32 << 24) as f64 * 2f64.powi(exponent);
    if bits & 0x80 != 0 {
        -value
    } else {
        value
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Token::*;
        match self {
            Variable(s) | ProcedureRef(s) | LabelRef(s) | Word(s) => write!(f, "{}", s),
            Label(s) => write!(f, "{}:", s),
            Literal(l) => write!(f, "{}", l),
            Rem(s) => write!(f, "REM {}", s),
            Procedure(_) => write!(f, "PROCEDURE"),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Literal::*;
        match self {
            Binary(n) => write!(f, "%{:b}", n),
            String(s) => write!(f, "\"{}\"", s),
            Hex(n) => write!(f, "${:X}", n),
            Integer(n) => write!(f, "{}", n),
            Float(_) | Double(_) => write!(f, "{}", self.to_f64().unwrap_or(0.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffp() {
        assert_eq!(ffp_to_f64(0), 0.0);
        // 1.0 = $80000041
        assert_eq!(ffp_to_f64(0x8000_0041), 1.0);
        assert_eq!(ffp_to_f64(0x8000_00C1), -1.0);
        // 0.5 = $80000040
        assert_eq!(ffp_to_f64(0x8000_0040), 0.5);
    }
}
