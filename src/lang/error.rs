use super::Address;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    address: Option<Address>,
    offset: Option<usize>,
    message: &'static str,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, ..$offset:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).at_offset($offset)
    };
    ($err:ident, $addr:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_address($addr)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, ..$offset:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .at_offset($offset)
            .message($msg)
    };
    ($err:ident, $addr:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_address($addr)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            address: None,
            offset: None,
            message: "",
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    /// Instruction index the error was raised at, for runtime traps.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// Byte offset into the buffer being decoded.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn in_address(&self, address: Address) -> Error {
        debug_assert!(self.address.is_none());
        Error {
            code: self.code,
            address: Some(address),
            offset: self.offset,
            message: self.message,
        }
    }

    pub fn at_offset(&self, offset: usize) -> Error {
        Error {
            code: self.code,
            address: self.address,
            offset: Some(offset),
            message: self.message,
        }
    }

    pub fn message(&self, message: &'static str) -> Error {
        debug_assert_eq!(self.message.len(), 0);
        Error {
            code: self.code,
            address: self.address,
            offset: self.offset,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NextWithoutFor = 1,
    EmptyReturnStack = 3,
    Overflow = 6,
    OutOfMemory = 7,
    UnresolvedLabel = 8,
    DivisionByZero = 11,
    TypeMismatch = 13,
    ForWithoutTo = 26,
    MissingLabel = 27,
    OutOfRange = 40,
    FormatError = 41,
    MalformedSource = 42,
    InternalError = 51,
}

const CODE_NAMES: &[(u16, &str)] = &[
    (1, "NEXT WITHOUT FOR"),
    (3, "RETURN WITHOUT GOSUB"),
    (6, "OVERFLOW"),
    (7, "OUT OF MEMORY"),
    (8, "UNRESOLVED LABEL"),
    (11, "DIVISION BY ZERO"),
    (13, "TYPE MISMATCH"),
    (26, "FOR WITHOUT TO"),
    (27, "MISSING LABEL"),
    (40, "OUT OF RANGE"),
    (41, "FORMAT ERROR"),
    (42, "MALFORMED SOURCE"),
    (51, "INTERNAL ERROR"),
];

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match CODE_NAMES.iter().find(|(code, _)| *code == self.code) {
            Some((_, name)) => f.write_str(name)?,
            None => write!(f, "ERROR {}", self.code)?,
        }
        if let Some(address) = self.address {
            write!(f, " IN {}", address)?;
        }
        if let Some(offset) = self.offset {
            write!(f, " AT ${:X}", offset)?;
        }
        if !self.message.is_empty() {
            write!(f, "; {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(error!(UnresolvedLabel, 6).to_string(), "UNRESOLVED LABEL IN 6");
        assert_eq!(
            error!(FormatError; "NOT AN AMIGA HUNK FILE").to_string(),
            "FORMAT ERROR; NOT AN AMIGA HUNK FILE"
        );
        assert_eq!(error!(OutOfRange, ..0x20).to_string(), "OUT OF RANGE AT $20");
        assert_eq!(error!(TypeMismatch).to_string(), "TYPE MISMATCH");
    }

    #[test]
    fn test_code_and_address() {
        let e = error!(EmptyReturnStack, 9);
        assert!(e.is(ErrorCode::EmptyReturnStack));
        assert_eq!(e.address(), Some(9));
        assert_eq!(e.offset(), None);
    }
}
