use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;

/// ## Runtime values
///
/// AMOS integers and floats share one numeric representation here.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Number(f64),
    String(Rc<str>),
}

impl Val {
    pub fn truth(b: bool) -> Val {
        Val::Number(if b { -1.0 } else { 0.0 })
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Val::String(_))
    }
}

impl Default for Val {
    fn default() -> Val {
        Val::Number(0.0)
    }
}

impl From<f64> for Val {
    fn from(n: f64) -> Val {
        Val::Number(n)
    }
}

impl From<i32> for Val {
    fn from(n: i32) -> Val {
        Val::Number(n as f64)
    }
}

impl From<&str> for Val {
    fn from(s: &str) -> Val {
        Val::String(s.into())
    }
}

impl From<String> for Val {
    fn from(s: String) -> Val {
        Val::String(s.into())
    }
}

impl TryFrom<Val> for f64 {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<f64, Error> {
        match val {
            Val::Number(n) => Ok(n),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }
}

impl TryFrom<Val> for i32 {
    type Error = Error;
    fn try_from(val: Val) -> std::result::Result<i32, Error> {
        let n = f64::try_from(val)?.trunc();
        if n >= i32::min_value() as f64 && n <= i32::max_value() as f64 {
            Ok(n as i32)
        } else {
            Err(error!(Overflow))
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Number(n) if *n == 0.0 => write!(f, "0"),
            Val::Number(n) => write!(f, "{}", n),
            Val::String(s) => write!(f, "{}", s),
        }
    }
}
