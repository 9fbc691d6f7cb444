use super::Address;
use std::rc::Rc;

/// ## Intermediate representation
///
/// The parser appends instructions in program order. The index of an
/// instruction is its address for the lifetime of the compiled program.

#[derive(Debug, PartialEq, Clone)]
pub enum Instruction {
    Label(Rc<str>),
    Print(Vec<Expression>),
    Goto {
        label: Rc<str>,
        target: Option<Address>,
    },
    Gosub {
        label: Rc<str>,
        target: Option<Address>,
    },
    Return,
    End,
    For {
        var: Rc<str>,
        from: i32,
        to: i32,
        step: i32,
    },
    Next {
        var: Option<Rc<str>>,
        for_index: Option<Address>,
    },
    IfEq {
        var: Rc<str>,
        value: Expression,
        label: Rc<str>,
        target: Option<Address>,
    },
    Set {
        var: Rc<str>,
        value: Expression,
    },
    Call {
        name: Rc<str>,
        args: Vec<Expression>,
    },
    Cmd {
        name: Rc<str>,
        parts: Vec<Part>,
    },
    Expr(Expression),
    Rem(Rc<str>),
    Proc {
        size: u32,
        flags: u8,
    },
}

/// One argument group of a generic command. `Box 1,1 To 5,3` has two parts,
/// the second introduced by the keyword `TO`.
#[derive(Debug, PartialEq, Clone)]
pub struct Part {
    pub keyword: Option<Rc<str>>,
    pub args: Vec<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Num(f64),
    Str(Rc<str>),
    Var(Rc<str>),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    Call(Rc<str>, Vec<Expression>),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn for_word(word: &str) -> Option<BinaryOp> {
        use BinaryOp::*;
        Some(match word {
            "OR" => Or,
            "AND" => And,
            "=" => Eq,
            "<>" => NotEq,
            "<" => Lt,
            ">" => Gt,
            "<=" | "=<" => LtEq,
            ">=" | "=>" => GtEq,
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            _ => return None,
        })
    }

    pub fn precedence(self) -> usize {
        use BinaryOp::*;
        match self {
            Or => 1,
            And => 2,
            Eq | NotEq | Lt | Gt | LtEq | GtEq => 3,
            Add | Sub => 4,
            Mul | Div => 5,
        }
    }
}

impl Instruction {
    /// Label a control transfer refers to, if any.
    pub fn label(&self) -> Option<&Rc<str>> {
        match self {
            Instruction::Goto { label, .. }
            | Instruction::Gosub { label, .. }
            | Instruction::IfEq { label, .. } => Some(label),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<Address> {
        match self {
            Instruction::Goto { target, .. }
            | Instruction::Gosub { target, .. }
            | Instruction::IfEq { target, .. } => *target,
            _ => None,
        }
    }

    pub fn set_target(&mut self, addr: Address) -> bool {
        match self {
            Instruction::Goto { target, .. }
            | Instruction::Gosub { target, .. }
            | Instruction::IfEq { target, .. } => {
                *target = Some(addr);
                true
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "NOT "),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Or => " OR ",
            And => " AND ",
            Eq => "=",
            NotEq => "<>",
            Lt => "<",
            Gt => ">",
            LtEq => "<=",
            GtEq => ">=",
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
        };
        write!(f, "{}", s)
    }
}

fn join(f: &mut std::fmt::Formatter, exprs: &[Expression]) -> std::fmt::Result {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{}", expr)?;
    }
    Ok(())
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Expression::*;
        match self {
            Num(n) => write!(f, "{}", n),
            Str(s) => write!(f, "\"{}\"", s),
            Var(s) => write!(f, "{}", s),
            Unary(op, expr) => write!(f, "{}{}", op, expr),
            Binary(op, lhs, rhs) => write!(f, "({}{}{})", lhs, op, rhs),
            Call(name, args) => {
                write!(f, "{}(", name)?;
                join(f, args)?;
                write!(f, ")")
            }
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Instruction::*;
        fn target(f: &mut std::fmt::Formatter, target: &Option<Address>) -> std::fmt::Result {
            match target {
                Some(addr) => write!(f, " ({})", addr),
                None => write!(f, " (?)"),
            }
        }
        match self {
            Label(name) => write!(f, "{}:", name),
            Print(exprs) => {
                write!(f, "PRINT ")?;
                join(f, exprs)
            }
            Goto { label, target: t } => {
                write!(f, "GOTO {}", label)?;
                target(f, t)
            }
            Gosub { label, target: t } => {
                write!(f, "GOSUB {}", label)?;
                target(f, t)
            }
            Return => write!(f, "RETURN"),
            End => write!(f, "END"),
            For {
                var,
                from,
                to,
                step,
            } => write!(f, "FOR {}={} TO {} STEP {}", var, from, to, step),
            Next { var, for_index } => {
                write!(f, "NEXT")?;
                if let Some(var) = var {
                    write!(f, " {}", var)?;
                }
                target(f, for_index)
            }
            IfEq {
                var,
                value,
                label,
                target: t,
            } => {
                write!(f, "IF {}={} THEN {}", var, value, label)?;
                target(f, t)
            }
            Set { var, value } => write!(f, "{}={}", var, value),
            Call { name, args } => {
                write!(f, "{}(", name)?;
                join(f, args)?;
                write!(f, ")")
            }
            Cmd { name, parts } => {
                write!(f, "{}", name)?;
                for part in parts {
                    if let Some(keyword) = &part.keyword {
                        write!(f, " {}", keyword)?;
                    }
                    if !part.args.is_empty() {
                        write!(f, " ")?;
                        join(f, &part.args)?;
                    }
                }
                Ok(())
            }
            Expr(expr) => write!(f, "{}", expr),
            Rem(text) => write!(f, "REM {}", text),
            Proc { size, flags } => write!(f, "PROCEDURE ${:X} ${:02X}", size, flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let cmd = Instruction::Cmd {
            name: "BOX".into(),
            parts: vec![
                Part {
                    keyword: None,
                    args: vec![Expression::Num(1.0), Expression::Num(1.0)],
                },
                Part {
                    keyword: Some("TO".into()),
                    args: vec![Expression::Num(5.0), Expression::Num(3.0)],
                },
            ],
        };
        assert_eq!(cmd.to_string(), "BOX 1,1 TO 5,3");
        let goto = Instruction::Goto {
            label: "END".into(),
            target: None,
        };
        assert_eq!(goto.to_string(), "GOTO END (?)");
        let expr = Expression::Binary(
            BinaryOp::Add,
            Box::new(Expression::Var("X".into())),
            Box::new(Expression::Call("LEN".into(), vec![Expression::Str("ab".into())])),
        );
        assert_eq!(expr.to_string(), "(X+LEN(\"ab\"))");
    }

    #[test]
    fn test_precedence_order() {
        let order = ["OR", "AND", "=", "+", "*"];
        let p: Vec<usize> = order
            .iter()
            .map(|w| BinaryOp::for_word(w).unwrap().precedence())
            .collect();
        assert_eq!(p, vec![1, 2, 3, 4, 5]);
    }
}
