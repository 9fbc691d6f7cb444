use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

const DEFAULT_LIMIT: usize = u16::MAX as usize;

/// ## Bounded stack
///
/// Pushing past the limit is `OutOfMemory` carrying the stack's own
/// message. Popping an empty stack is an `InternalError`; the dispatcher
/// maps it to something better where the program is at fault.

pub struct Stack<T> {
    items: Vec<T>,
    limit: usize,
    full: &'static str,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T> Stack<T> {
    pub fn new(full: &'static str) -> Stack<T> {
        Stack::with_limit(DEFAULT_LIMIT, full)
    }

    pub fn with_limit(limit: usize, full: &'static str) -> Stack<T> {
        Stack {
            items: Vec::new(),
            limit,
            full,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop everything above depth `len`.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Depth of the topmost item matching `f`.
    pub fn rposition<F: FnMut(&T) -> bool>(&self, f: F) -> Option<usize> {
        self.items.iter().rposition(f)
    }

    pub fn push(&mut self, item: T) -> Result<()> {
        if self.items.len() >= self.limit {
            return Err(error!(OutOfMemory; self.full));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<T> {
        self.items
            .pop()
            .ok_or_else(|| error!(InternalError; "STACK UNDERFLOW"))
    }

    /// Pop two items, returned in the order they were pushed.
    pub fn pop_2(&mut self) -> Result<(T, T)> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        Ok((lhs, rhs))
    }

    /// Pop `n` items, returned in the order they were pushed.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<T>> {
        let at = self
            .items
            .len()
            .checked_sub(n)
            .ok_or_else(|| error!(InternalError; "STACK UNDERFLOW"))?;
        Ok(self.items.split_off(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_limit() {
        let mut s: Stack<u8> = Stack::with_limit(2, "TOO DEEP");
        s.push(1).unwrap();
        s.push(2).unwrap();
        let e = s.push(3).unwrap_err();
        assert!(e.is(ErrorCode::OutOfMemory));
        assert_eq!(e.to_string(), "OUT OF MEMORY; TOO DEEP");
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_pop_order() {
        let mut s: Stack<u8> = Stack::new("");
        for n in 1..=3 {
            s.push(n).unwrap();
        }
        assert_eq!(s.pop_2().unwrap(), (2, 3));
        assert!(s.pop_n(2).is_err());
        assert_eq!(s.len(), 1);
        assert_eq!(s.pop_n(1).unwrap(), vec![1]);
        assert!(s.pop().unwrap_err().is(ErrorCode::InternalError));
    }

    #[test]
    fn test_truncate_to_match() {
        let mut s: Stack<char> = Stack::new("");
        for c in "abcb".chars() {
            s.push(c).unwrap();
        }
        let depth = s.rposition(|c| *c == 'b').unwrap();
        assert_eq!(depth, 3);
        s.truncate(2);
        assert_eq!(s.last(), Some(&'b'));
    }
}
