use super::op::Code;
use super::{Address, Op, Opcode, Program, Val};
use crate::error;
use crate::lang::ir::{BinaryOp, Expression, Instruction, UnaryOp};
use crate::lang::{Error, LabelTable};
use tracing::debug;

type Result<T> = std::result::Result<T, Error>;

/// Lower a parsed program. Op `n` of the result implements instruction `n`
/// of the IR.
pub fn codegen(ir: &[Instruction], labels: &LabelTable) -> Result<Program> {
    let gen = Generator { ir, labels };
    let mut ops: Vec<Op> = Vec::with_capacity(ir.len());
    for (addr, instruction) in ir.iter().enumerate() {
        ops.push(gen.instruction(addr, instruction)?);
    }
    debug!(ops = ops.len(), "generated program");
    Ok(Program::new(ops))
}

struct Generator<'a> {
    ir: &'a [Instruction],
    labels: &'a LabelTable,
}

impl<'a> Generator<'a> {
    fn instruction(&self, addr: Address, instruction: &Instruction) -> Result<Op> {
        use Instruction::*;
        Ok(match instruction {
            Label(name) => Op::Label(name.clone()),
            Rem(text) => Op::Rem(text.clone()),
            Proc { size, flags } => Op::Proc(*size, *flags),
            Print(items) => Op::Print(self.expressions(items)),
            Goto { label, target } => Op::Goto(label.clone(), self.target(addr, label, *target)?),
            Gosub { label, target } => {
                Op::Gosub(label.clone(), self.target(addr, label, *target)?)
            }
            Return => Op::Return,
            End => Op::End,
            For {
                var,
                from,
                to,
                step,
            } => Op::For {
                var: var.clone(),
                from: *from,
                to: *to,
                step: *step,
            },
            Next { for_index, .. } => {
                if let Some(for_index) = for_index {
                    match self.ir.get(*for_index) {
                        Some(For { .. }) => {}
                        _ => return Err(error!(InternalError, addr; "NEXT NOT LINKED TO FOR")),
                    }
                }
                Op::Next(*for_index)
            }
            IfEq {
                var,
                value,
                label,
                target,
            } => Op::IfEq {
                var: var.clone(),
                value: self.expression(value),
                label: label.clone(),
                target: self.target(addr, label, *target)?,
            },
            Set { var, value } => Op::Set(var.clone(), self.expression(value)),
            Call { name, args } => Op::Call(name.clone(), self.expressions(args)),
            Cmd { name, parts } => Op::Cmd(
                name.clone(),
                parts
                    .iter()
                    .map(|part| (part.keyword.clone(), self.expressions(&part.args)))
                    .collect(),
            ),
            Expr(expr) => Op::Eval(self.expression(expr)),
        })
    }

    fn target(&self, addr: Address, label: &str, target: Option<Address>) -> Result<Option<Address>> {
        let target = target.or_else(|| self.labels.get(label));
        match target {
            Some(t) if t > self.ir.len() => {
                Err(error!(InternalError, addr; "JUMP PAST END OF PROGRAM"))
            }
            _ => Ok(target),
        }
    }

    fn expressions(&self, exprs: &[Expression]) -> Vec<Code> {
        exprs.iter().map(|e| self.expression(e)).collect()
    }

    fn expression(&self, expr: &Expression) -> Code {
        fn lower(code: &mut Code, expr: &Expression) {
            match expr {
                Expression::Num(n) => code.push(Opcode::Literal(Val::Number(*n))),
                Expression::Str(s) => code.push(Opcode::Literal(Val::String(s.clone()))),
                Expression::Var(name) => code.push(Opcode::Push(name.clone())),
                Expression::Unary(op, expr) => {
                    lower(code, expr);
                    code.push(match op {
                        UnaryOp::Neg => Opcode::Neg,
                        UnaryOp::Not => Opcode::Not,
                    });
                }
                Expression::Binary(op, lhs, rhs) => {
                    lower(code, lhs);
                    lower(code, rhs);
                    code.push(binary_opcode(*op));
                }
                Expression::Call(name, args) => {
                    for arg in args {
                        lower(code, arg);
                    }
                    if &**name == "INPUT$" {
                        code.push(Opcode::Input(args.len()));
                    } else {
                        code.push(Opcode::Func(name.clone(), args.len()));
                    }
                }
            }
        }
        let mut code = Code::new();
        lower(&mut code, expr);
        code
    }
}

fn binary_opcode(op: BinaryOp) -> Opcode {
    use BinaryOp::*;
    match op {
        Or => Opcode::Or,
        And => Opcode::And,
        Eq => Opcode::Eq,
        NotEq => Opcode::NotEq,
        Lt => Opcode::Lt,
        Gt => Opcode::Gt,
        LtEq => Opcode::LtEq,
        GtEq => Opcode::GtEq,
        Add => Opcode::Add,
        Sub => Opcode::Sub,
        Mul => Opcode::Mul,
        Div => Opcode::Div,
    }
}
