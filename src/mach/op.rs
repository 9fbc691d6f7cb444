use super::{Address, Opcode};
use std::rc::Rc;

/// An expression compiled to reverse Polish order.
pub type Code = Vec<Opcode>;

/// ## Program instruction set
///
/// One op per IR instruction, at the same address. Jump targets are
/// already resolved; a missing target traps when reached.

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // *** No effect, kept for listings
    Label(Rc<str>),
    Rem(Rc<str>),
    Proc(u32, u8),

    // *** Branch control
    Goto(Rc<str>, Option<Address>),
    Gosub(Rc<str>, Option<Address>),
    Return,
    End,
    For {
        var: Rc<str>,
        from: i32,
        to: i32,
        step: i32,
    },
    /// Address of the matching FOR, if the loop was closed at all.
    Next(Option<Address>),
    IfEq {
        var: Rc<str>,
        value: Code,
        label: Rc<str>,
        target: Option<Address>,
    },

    // *** Statements
    Print(Vec<Code>),
    Set(Rc<str>, Code),
    Call(Rc<str>, Vec<Code>),
    Cmd(Rc<str>, Vec<(Option<Rc<str>>, Vec<Code>)>),
    Eval(Code),
}

fn code(f: &mut std::fmt::Formatter, code: &[Opcode]) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, opcode) in code.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{}", opcode)?;
    }
    write!(f, "]")
}

fn codes(f: &mut std::fmt::Formatter, codes: &[Code]) -> std::fmt::Result {
    for c in codes {
        write!(f, " ")?;
        code(f, c)?;
    }
    Ok(())
}

fn target(f: &mut std::fmt::Formatter, label: &str, target: &Option<Address>) -> std::fmt::Result {
    match target {
        Some(addr) => write!(f, "({}) {}", addr, label),
        None => write!(f, "(?) {}", label),
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Op::*;
        match self {
            Label(s) => write!(f, "{}:", s),
            Rem(s) => write!(f, "REM {}", s),
            Proc(size, flags) => write!(f, "PROC ${:X} ${:02X}", size, flags),
            Goto(label, t) => {
                write!(f, "GOTO")?;
                target(f, label, t)
            }
            Gosub(label, t) => {
                write!(f, "GOSUB")?;
                target(f, label, t)
            }
            Return => write!(f, "RETURN"),
            End => write!(f, "END"),
            For {
                var,
                from,
                to,
                step,
            } => write!(f, "FOR({}) {} {} {}", var, from, to, step),
            Next(Some(addr)) => write!(f, "NEXT({})", addr),
            Next(None) => write!(f, "NEXT(?)"),
            IfEq {
                var,
                value,
                label,
                target: t,
            } => {
                write!(f, "IFEQ({}) ", var)?;
                code(f, value)?;
                write!(f, " ")?;
                target(f, label, t)
            }
            Print(items) => {
                write!(f, "PRINT")?;
                codes(f, items)
            }
            Set(var, value) => {
                write!(f, "SET({}) ", var)?;
                code(f, value)
            }
            Call(name, args) => {
                write!(f, "CALL({})", name)?;
                codes(f, args)
            }
            Cmd(name, parts) => {
                write!(f, "CMD({})", name)?;
                for (keyword, args) in parts {
                    if let Some(keyword) = keyword {
                        write!(f, " {}", keyword)?;
                    }
                    codes(f, args)?;
                }
                Ok(())
            }
            Eval(value) => {
                write!(f, "EVAL ")?;
                code(f, value)
            }
        }
    }
}
