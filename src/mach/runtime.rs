use super::op::Code;
use super::{Address, Io, Op, Opcode, Operation, Part, Program, Stack, Val, Var};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, Error>;

const SLICE: usize = 10_000;

/// What the dispatcher wants after one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Dispatch the next instruction right away.
    Continue,
    /// Hand control back to the host before continuing.
    Yield,
    Halt,
}

/// Result of running a slice of the program.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Running,
    Stopped,
    Error(Error),
}

#[derive(Debug)]
struct Frame {
    for_index: Address,
    var: Rc<str>,
    to: f64,
    step: f64,
    body: Address,
}

/// ## Program controller
///
/// Owns all mutable state of one execution: variables, the GOSUB return
/// stack and open FOR loops. Loops and backward jumps yield, so a host can
/// interleave other work and the native call stack never grows with the
/// iteration count.

pub struct Runtime<I: Io> {
    program: Rc<Program>,
    io: I,
    ip: Address,
    vars: Var,
    returns: Stack<Address>,
    loops: Stack<Frame>,
    values: Stack<Val>,
    halted: bool,
    yields: usize,
    error: Option<Error>,
}

impl<I: Io> Runtime<I> {
    pub fn new(program: Rc<Program>, io: I) -> Runtime<I> {
        Runtime {
            program,
            io,
            ip: 0,
            vars: Var::new(),
            returns: Stack::new("GOSUB TOO DEEP"),
            loops: Stack::new("TOO MANY OPEN LOOPS"),
            values: Stack::new("EXPRESSION TOO COMPLEX"),
            halted: false,
            yields: 0,
            error: None,
        }
    }

    pub fn program(&self) -> &Rc<Program> {
        &self.program
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }

    pub fn into_io(self) -> I {
        self.io
    }

    pub fn ip(&self) -> Address {
        self.ip
    }

    /// Number of times the program has handed control back.
    pub fn yields(&self) -> usize {
        self.yields
    }

    pub fn var(&self, name: &str) -> Val {
        self.vars.fetch(name)
    }

    /// The trap that stopped the program, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Rewind to the first instruction with fresh state.
    pub fn reset(&mut self) {
        self.ip = 0;
        self.vars.clear();
        self.returns.clear();
        self.loops.clear();
        self.values.clear();
        self.halted = false;
        self.yields = 0;
        self.error = None;
    }

    /// Run until the program ends or traps, ignoring yields.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.execute(SLICE) {
                Event::Running => continue,
                Event::Stopped => return Ok(()),
                Event::Error(e) => return Err(e),
            }
        }
    }

    /// Dispatch up to `cycles` instructions. Returns early at a yield point.
    pub fn execute(&mut self, cycles: usize) -> Event {
        if self.halted {
            return Event::Stopped;
        }
        for _ in 0..cycles {
            match self.step() {
                Ok(Step::Continue) => continue,
                Ok(Step::Yield) => return Event::Running,
                Ok(Step::Halt) => return Event::Stopped,
                Err(e) => {
                    debug!(error = %e, "program trapped");
                    self.error = Some(e.clone());
                    return Event::Error(e);
                }
            }
        }
        Event::Running
    }

    /// Dispatch exactly one instruction.
    pub fn step(&mut self) -> Result<Step> {
        if self.halted {
            return Ok(Step::Halt);
        }
        let program = Rc::clone(&self.program);
        let ip = self.ip;
        let op = match program.op(ip) {
            Some(op) => op,
            None => {
                self.halted = true;
                return Ok(Step::Halt);
            }
        };
        match self.dispatch(ip, op) {
            Ok(step) => {
                if step == Step::Halt {
                    self.halted = true;
                }
                Ok(step)
            }
            Err(e) => {
                self.halted = true;
                self.values.clear();
                match e.address() {
                    Some(_) => Err(e),
                    None => Err(e.in_address(ip)),
                }
            }
        }
    }

    fn dispatch(&mut self, ip: Address, op: &Op) -> Result<Step> {
        let next = ip + 1;
        match op {
            Op::Label(_) | Op::Rem(_) | Op::Proc(..) => {}
            Op::Print(items) => {
                for item in items {
                    let val = self.eval(item)?;
                    self.io.print(&val.to_string());
                }
            }
            Op::Goto(_, target) => {
                let target = target.ok_or_else(|| error!(UnresolvedLabel))?;
                return Ok(self.jump(ip, target));
            }
            Op::Gosub(_, target) => {
                let target = target.ok_or_else(|| error!(UnresolvedLabel))?;
                self.returns.push(next)?;
                return Ok(self.jump(ip, target));
            }
            Op::Return => {
                let target = self.returns.pop().map_err(|_| error!(EmptyReturnStack))?;
                return Ok(self.jump(ip, target));
            }
            Op::End => return Ok(Step::Halt),
            Op::For {
                var,
                from,
                to,
                step,
            } => {
                self.vars.store(var, Val::from(*from))?;
                if let Some(pos) = self.loops.rposition(|f| f.for_index == ip) {
                    self.loops.truncate(pos);
                }
                self.loops.push(Frame {
                    for_index: ip,
                    var: var.clone(),
                    to: *to as f64,
                    step: *step as f64,
                    body: next,
                })?;
            }
            Op::Next(for_index) => {
                let pos = for_index
                    .and_then(|idx| self.loops.rposition(|f| f.for_index == idx))
                    .ok_or_else(|| error!(NextWithoutFor))?;
                self.loops.truncate(pos + 1);
                let (var, to, step, body) = match self.loops.last() {
                    Some(f) => (f.var.clone(), f.to, f.step, f.body),
                    None => return Err(error!(InternalError)),
                };
                let n = f64::try_from(self.vars.fetch(&var))? + step;
                self.vars.store(&var, Val::Number(n))?;
                let again = if step >= 0.0 { n <= to } else { n >= to };
                if again {
                    self.ip = body;
                    return Ok(self.yield_now());
                }
                self.loops.pop()?;
            }
            Op::IfEq {
                var,
                value,
                target,
                ..
            } => {
                let value = self.eval(value)?;
                if Operation::equal_bool(self.vars.fetch(var), value)? {
                    let target = target.ok_or_else(|| error!(UnresolvedLabel))?;
                    return Ok(self.jump(ip, target));
                }
            }
            Op::Set(var, value) => {
                let value = self.eval(value)?;
                self.vars.store(var, value)?;
            }
            Op::Call(name, args) => {
                let args = self.eval_all(args)?;
                self.io.call(name, &args);
            }
            Op::Cmd(name, parts) => {
                let mut evaluated = Vec::with_capacity(parts.len());
                for (keyword, args) in parts {
                    evaluated.push(Part {
                        keyword: keyword.clone(),
                        args: self.eval_all(args)?,
                    });
                }
                self.io.cmd(name, &evaluated);
            }
            Op::Eval(code) => {
                self.eval(code)?;
            }
        }
        self.ip = next;
        Ok(Step::Continue)
    }

    fn jump(&mut self, from: Address, to: Address) -> Step {
        self.ip = to;
        if to <= from {
            self.yield_now()
        } else {
            Step::Continue
        }
    }

    fn yield_now(&mut self) -> Step {
        self.yields += 1;
        trace!(ip = self.ip, "yield");
        Step::Yield
    }

    fn eval_all(&mut self, codes: &[Code]) -> Result<Vec<Val>> {
        codes.iter().map(|code| self.eval(code)).collect()
    }

    fn eval(&mut self, code: &[Opcode]) -> Result<Val> {
        for opcode in code {
            let binary: fn(Val, Val) -> Result<Val> = match opcode {
                Opcode::Literal(val) => {
                    self.values.push(val.clone())?;
                    continue;
                }
                Opcode::Push(name) => {
                    let val = self.vars.fetch(name);
                    self.values.push(val)?;
                    continue;
                }
                Opcode::Func(name, argc) => {
                    let args = self.values.pop_n(*argc)?;
                    let val = self.io.func(name, &args).unwrap_or_default();
                    self.values.push(val)?;
                    continue;
                }
                Opcode::Input(argc) => {
                    let args = self.values.pop_n(*argc)?;
                    let prompt = args.first().map(|v| v.to_string());
                    let line = self.io.input(prompt.as_deref());
                    self.values.push(Val::from(line))?;
                    continue;
                }
                Opcode::Neg => {
                    let val = self.values.pop()?;
                    self.values.push(Operation::negate(val)?)?;
                    continue;
                }
                Opcode::Not => {
                    let val = self.values.pop()?;
                    self.values.push(Operation::not(val)?)?;
                    continue;
                }
                Opcode::Mul => Operation::multiply,
                Opcode::Div => Operation::divide,
                Opcode::Add => Operation::add,
                Opcode::Sub => Operation::subtract,
                Opcode::Eq => Operation::equal,
                Opcode::NotEq => Operation::not_equal,
                Opcode::Lt => Operation::less,
                Opcode::LtEq => Operation::less_equal,
                Opcode::Gt => Operation::greater,
                Opcode::GtEq => Operation::greater_equal,
                Opcode::And => Operation::and,
                Opcode::Or => Operation::or,
            };
            let (lhs, rhs) = self.values.pop_2()?;
            self.values.push(binary(lhs, rhs)?)?;
        }
        self.values.pop()
    }
}
