use super::Val;
use std::rc::Rc;

/// ## Expression code
///
/// Expressions are lowered to reverse Polish order and evaluated on the
/// runtime's value stack. `3*B+1` becomes `3 PUSH(B) MUL 1 ADD`.

#[derive(Clone, PartialEq)]
pub enum Opcode {
    Literal(Val),
    /// Value of a variable; unset reads as empty.
    Push(Rc<str>),

    // *** Host calls
    /// Pop the arguments and push the host function result, 0 when the host
    /// does not know the name.
    Func(Rc<str>, usize),
    /// Pop the arguments, the first being the prompt, and push a line of input.
    Input(usize),

    // *** Operators
    Neg,
    Not,
    Mul,
    Div,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl Opcode {
    fn mnemonic(&self) -> &'static str {
        use Opcode::*;
        match self {
            Literal(_) | Push(_) | Func(..) | Input(_) => "",
            Neg => "NEG",
            Not => "NOT",
            Mul => "MUL",
            Div => "DIV",
            Add => "ADD",
            Sub => "SUB",
            Eq => "EQ",
            NotEq => "NE",
            Lt => "LT",
            LtEq => "LE",
            Gt => "GT",
            GtEq => "GE",
            And => "AND",
            Or => "OR",
        }
    }
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Opcode::Literal(Val::String(s)) => write!(f, "{:?}", &**s),
            Opcode::Literal(v) => write!(f, "{}", v),
            Opcode::Push(name) => write!(f, "PUSH({})", name),
            Opcode::Func(name, argc) => write!(f, "FN({},{})", name, argc),
            Opcode::Input(argc) => write!(f, "INPUT({})", argc),
            op => f.write_str(op.mnemonic()),
        }
    }
}
