use super::Val;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Operators on runtime values. Comparisons yield -1 for true and 0 for
/// false; logical operators work bitwise on 32-bit integers.
pub struct Operation {}

impl Operation {
    pub fn negate(val: Val) -> Result<Val> {
        match val {
            Val::Number(n) => Ok(Val::Number(-n)),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::from(!i32::try_from(val)?))
    }

    pub fn add(lhs: Val, rhs: Val) -> Result<Val> {
        use Val::*;
        match (lhs, rhs) {
            (Number(l), Number(r)) => Ok(Number(l + r)),
            (String(l), String(r)) => {
                let mut s = l.to_string();
                s.push_str(&r);
                Ok(Val::from(s))
            }
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        Ok(Val::Number(l - r))
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        Ok(Val::Number(l * r))
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = Operation::numbers(lhs, rhs)?;
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Ok(Val::Number(l / r))
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from(i32::try_from(lhs)? & i32::try_from(rhs)?))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from(i32::try_from(lhs)? | i32::try_from(rhs)?))
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Operation::equal_bool(lhs, rhs)?))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(!Operation::equal_bool(lhs, rhs)?))
    }

    pub fn equal_bool(lhs: Val, rhs: Val) -> Result<bool> {
        use Val::*;
        match (lhs, rhs) {
            (Number(l), Number(r)) => Ok(l == r),
            (String(l), String(r)) => Ok(l == r),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Operation::less_bool(&lhs, &rhs)?))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(Operation::less_bool(&rhs, &lhs)?))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(!Operation::less_bool(&rhs, &lhs)?))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::truth(!Operation::less_bool(&lhs, &rhs)?))
    }

    fn less_bool(lhs: &Val, rhs: &Val) -> Result<bool> {
        use Val::*;
        match (lhs, rhs) {
            (Number(l), Number(r)) => Ok(l < r),
            (String(l), String(r)) => Ok(l < r),
            _ => Err(error!(TypeMismatch)),
        }
    }

    fn numbers(lhs: Val, rhs: Val) -> Result<(f64, f64)> {
        Ok((f64::try_from(lhs)?, f64::try_from(rhs)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_arithmetic() {
        assert_eq!(Operation::add(1.into(), 2.into()).unwrap(), Val::from(3));
        assert_eq!(Operation::add("A".into(), "B".into()).unwrap(), Val::from("AB"));
        assert!(Operation::add("A".into(), 2.into())
            .unwrap_err()
            .is(ErrorCode::TypeMismatch));
        assert!(Operation::divide(1.into(), 0.into())
            .unwrap_err()
            .is(ErrorCode::DivisionByZero));
    }

    #[test]
    fn test_logic_and_compare() {
        assert_eq!(Operation::less(1.into(), 2.into()).unwrap(), Val::from(-1));
        assert_eq!(Operation::greater_equal(1.into(), 2.into()).unwrap(), Val::from(0));
        assert_eq!(Operation::less_equal(2.into(), 2.into()).unwrap(), Val::from(-1));
        assert_eq!(Operation::and(12.into(), 10.into()).unwrap(), Val::from(8));
        assert_eq!(Operation::or(12.into(), 3.into()).unwrap(), Val::from(15));
        assert_eq!(Operation::not(0.into()).unwrap(), Val::from(-1));
    }
}
