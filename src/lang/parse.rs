use super::ir::{BinaryOp, Expression, Instruction, Part, UnaryOp};
use super::link::{LabelTable, Link, RefKind};
use super::source::{Line, Source, HEADER_LEN};
use super::table::TokenTable;
use super::token::{Literal, Token};
use super::{Address, Error};
use std::rc::Rc;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, Error>;

/// Everything one pass over a source file produces.
#[derive(Debug)]
pub struct Parsed {
    pub ir: Vec<Instruction>,
    pub labels: LabelTable,
    /// Constructs that were skipped or cut short. Never fatal.
    pub warnings: Vec<Error>,
    /// CRC-32 of the token region.
    pub checksum: u32,
}

/// Parse a whole tokenized source file. Only a header too small to read is
/// an error; a broken line ends the scan and keeps the instructions so far.
pub fn parse(file: &[u8], table: &TokenTable) -> Result<Parsed> {
    let source = Source::new(file)?;
    let mut builder = Builder::default();
    if source.is_truncated() {
        warn!("declared token length runs past the end of the file");
        builder
            .warnings
            .push(error!(MalformedSource, ..HEADER_LEN - 4; "DECLARED LENGTH PAST END OF FILE"));
    }
    for line in source.lines(table) {
        match line {
            Ok(line) => {
                if let Some(at) = line.cut {
                    builder.warn(error!(MalformedSource, ..at; "TOKENS AFTER END OF LINE"));
                }
                builder.line(&line)
            }
            Err(e) => {
                warn!(error = %e, "source scan stopped");
                builder.warnings.push(e);
                break;
            }
        }
    }
    let unresolved = builder.link.link(&mut builder.ir);
    debug!(
        instructions = builder.ir.len(),
        unresolved, "parsed tokenized source"
    );
    Ok(Parsed {
        ir: builder.ir,
        labels: builder.link.into_labels(),
        warnings: builder.warnings,
        checksum: crc::crc32::checksum_ieee(source.tokens()),
    })
}

#[derive(Default)]
struct Builder {
    ir: Vec<Instruction>,
    link: Link,
    loops: Vec<(Rc<str>, Address)>,
    warnings: Vec<Error>,
}

impl Builder {
    fn line(&mut self, line: &Line) {
        let mut p = Parser {
            tokens: &line.tokens,
            pos: 0,
        };
        let mut start = 0;
        while let Some(token) = p.peek() {
            if token.is_separator() {
                p.next();
                start = p.pos;
                continue;
            }
            if let Token::Label(name) = token {
                let name = name.clone();
                p.next();
                self.link.define(name.clone(), self.ir.len());
                self.ir.push(Instruction::Label(name));
                start = p.pos;
                continue;
            }
            let first = p.pos == start;
            self.statement(&mut p, first, line.offset);
        }
    }

    fn push(&mut self, op: Instruction) -> Address {
        self.ir.push(op);
        self.ir.len() - 1
    }

    fn warn(&mut self, error: Error) {
        warn!(error = %error, "skipped construct");
        self.warnings.push(error);
    }

    fn statement(&mut self, p: &mut Parser, first: bool, offset: usize) {
        let token = match p.next() {
            Some(token) => token.clone(),
            None => return,
        };
        match token {
            Token::Rem(text) => {
                self.push(Instruction::Rem(text));
            }
            Token::Procedure(header) => {
                self.push(Instruction::Proc {
                    size: header.size,
                    flags: header.flags,
                });
                p.skip_statement();
            }
            Token::Variable(var) if first && p.peek_word("=") => {
                p.next();
                match p.expression() {
                    Some(value) => {
                        self.push(Instruction::Set { var, value });
                    }
                    None => debug!(var = %var, "assignment without value"),
                }
            }
            Token::Word(word) => match &*word {
                "PRINT" => self.print(p),
                "GOTO" => self.jump(p, RefKind::Goto, offset),
                "GOSUB" => self.jump(p, RefKind::Gosub, offset),
                "RETURN" => {
                    self.push(Instruction::Return);
                }
                "END" => {
                    self.push(Instruction::End);
                }
                "FOR" => self.for_loop(p, offset),
                "NEXT" => self.next_loop(p),
                "IF" => {
                    if !self.if_eq(p) {
                        self.generic(p, word, first);
                    }
                }
                _ => self.generic(p, word, first),
            },
            // Operands outside any statement.
            _ => {}
        }
    }

    fn print(&mut self, p: &mut Parser) {
        let mut items = vec![];
        while !p.at_statement_end() {
            if p.peek_word(",") || p.peek_word(";") {
                p.next();
                continue;
            }
            match p.expression() {
                Some(expr) => items.push(expr),
                None => {
                    p.next();
                }
            }
        }
        self.push(Instruction::Print(items));
    }

    fn jump(&mut self, p: &mut Parser, kind: RefKind, offset: usize) {
        let label = match p.peek() {
            Some(Token::LabelRef(label)) => label.clone(),
            _ => {
                self.warn(error!(MissingLabel, ..offset));
                return;
            }
        };
        p.next();
        let op = match kind {
            RefKind::Gosub => Instruction::Gosub {
                label: label.clone(),
                target: None,
            },
            _ => Instruction::Goto {
                label: label.clone(),
                target: None,
            },
        };
        let addr = self.push(op);
        self.link.link_addr_to_symbol(addr, kind, label);
    }

    fn for_loop(&mut self, p: &mut Parser, offset: usize) {
        let var = match p.peek() {
            Some(Token::Variable(var)) => var.clone(),
            _ => return p.skip_statement(),
        };
        p.next();
        if p.peek_word("=") {
            p.next();
        }
        let from = p.integer().unwrap_or(0);
        if !p.peek_word("TO") {
            self.warn(error!(ForWithoutTo, ..offset));
            return p.skip_statement();
        }
        p.next();
        let to = p.integer().unwrap_or(0);
        let mut step = 1;
        if p.peek_word("STEP") {
            p.next();
            step = p.integer().unwrap_or(1);
        }
        let addr = self.push(Instruction::For {
            var: var.clone(),
            from,
            to,
            step,
        });
        self.loops.push((var, addr));
    }

    fn next_loop(&mut self, p: &mut Parser) {
        let var = match p.peek() {
            Some(Token::Variable(var)) => Some(var.clone()),
            _ => None,
        };
        if var.is_some() {
            p.next();
        }
        let frame = match &var {
            Some(name) => self.loops.iter().rposition(|(v, _)| v == name),
            None => self.loops.len().checked_sub(1),
        };
        let for_index = frame.map(|i| {
            let addr = self.loops[i].1;
            self.loops.truncate(i);
            addr
        });
        self.push(Instruction::Next { var, for_index });
    }

    /// `IF var = expr THEN [GOTO] label` and nothing else on the statement.
    fn if_eq(&mut self, p: &mut Parser) -> bool {
        let start = p.pos;
        match p.if_eq() {
            Some((var, value, label)) => {
                let addr = self.push(Instruction::IfEq {
                    var,
                    value,
                    label: label.clone(),
                    target: None,
                });
                self.link.link_addr_to_symbol(addr, RefKind::Branch, label);
                true
            }
            None => {
                p.pos = start;
                false
            }
        }
    }

    fn generic(&mut self, p: &mut Parser, name: Rc<str>, first: bool) {
        if p.peek_word("(") {
            if let Some(args) = p.arguments() {
                if first {
                    self.push(Instruction::Call { name, args });
                } else {
                    self.push(Instruction::Expr(Expression::Call(name, args)));
                }
                return;
            }
        }
        let parts = p.parts();
        self.push(Instruction::Cmd { name, parts });
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek_word(&self, word: &str) -> bool {
        matches!(self.peek(), Some(t) if t.is_word(word))
    }

    fn at_statement_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(t) => t.is_separator(),
        }
    }

    fn skip_statement(&mut self) {
        while !self.at_statement_end() {
            self.pos += 1;
        }
    }

    fn expect_word(&mut self, word: &str) -> Option<()> {
        if self.peek_word(word) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    /// Try a sub-parse, restoring the position when it comes back empty.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Parser<'a>) -> Option<T>) -> Option<T> {
        let start = self.pos;
        let r = f(self);
        if r.is_none() {
            self.pos = start;
        }
        r
    }

    fn integer(&mut self) -> Option<i32> {
        self.attempt(|p| {
            let negative = p.expect_word("-").is_some();
            let n = match p.next()? {
                Token::Literal(Literal::Integer(n)) => *n,
                Token::Literal(Literal::Hex(n)) | Token::Literal(Literal::Binary(n)) => *n as i32,
                _ => return None,
            };
            Some(if negative { n.wrapping_neg() } else { n })
        })
    }

    fn if_eq(&mut self) -> Option<(Rc<str>, Expression, Rc<str>)> {
        self.attempt(|p| {
            let var = match p.next()? {
                Token::Variable(var) => var.clone(),
                _ => return None,
            };
            p.expect_word("=")?;
            let value = p.expression()?;
            p.expect_word("THEN")?;
            if p.peek_word("GOTO") {
                p.next();
            }
            let label = match p.next()? {
                Token::LabelRef(label) => label.clone(),
                _ => return None,
            };
            if !p.at_statement_end() {
                return None;
            }
            Some((var, value, label))
        })
    }

    /// Argument groups of a generic command.
    fn parts(&mut self) -> Vec<Part> {
        let mut parts = vec![Part {
            keyword: None,
            args: vec![],
        }];
        while !self.at_statement_end() {
            if self.peek_word(",") || self.peek_word(";") {
                self.next();
                continue;
            }
            if let Some(keyword) = self.keyword() {
                self.next();
                parts.push(Part {
                    keyword: Some(keyword),
                    args: vec![],
                });
                continue;
            }
            match self.expression() {
                Some(expr) => {
                    if let Some(part) = parts.last_mut() {
                        part.args.push(expr);
                    }
                }
                None => {
                    self.next();
                }
            }
        }
        parts
    }

    // A bare word: not punctuation, not an operator, not called.
    fn keyword(&self) -> Option<Rc<str>> {
        let word = match self.peek()? {
            Token::Word(word) => word,
            _ => return None,
        };
        if BinaryOp::for_word(word).is_some() {
            return None;
        }
        if matches!(&**word, "(" | ")" | "," | ";" | ":" | "NOT") {
            return None;
        }
        if matches!(self.peek_nth(1), Some(t) if t.is_word("(")) {
            return None;
        }
        Some(word.clone())
    }

    fn expression(&mut self) -> Option<Expression> {
        self.binary(1)
    }

    fn binary(&mut self, min: usize) -> Option<Expression> {
        let mut lhs = self.attempt(|p| p.primary())?;
        loop {
            let op = match self.peek() {
                Some(Token::Word(word)) => match BinaryOp::for_word(word) {
                    Some(op) if op.precedence() >= min => op,
                    _ => break,
                },
                _ => break,
            };
            let before_op = self.pos;
            self.next();
            match self.binary(op.precedence() + 1) {
                Some(rhs) => lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs)),
                None => {
                    self.pos = before_op;
                    break;
                }
            }
        }
        Some(lhs)
    }

    fn primary(&mut self) -> Option<Expression> {
        match self.next()? {
            Token::Literal(Literal::String(s)) => Some(Expression::Str(s.clone())),
            Token::Literal(lit) => Some(Expression::Num(lit.to_f64()?)),
            Token::Variable(var) => Some(Expression::Var(var.clone())),
            Token::Word(word) => match &**word {
                "(" => {
                    let expr = self.expression()?;
                    self.expect_word(")")?;
                    Some(expr)
                }
                "NOT" => Some(Expression::Unary(UnaryOp::Not, Box::new(self.primary()?))),
                "-" => Some(Expression::Unary(UnaryOp::Neg, Box::new(self.primary()?))),
                _ if self.peek_word("(") => {
                    let args = self.arguments()?;
                    Some(Expression::Call(word.clone(), args))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// `( expr, expr, ... )`
    fn arguments(&mut self) -> Option<Vec<Expression>> {
        self.attempt(|p| {
            p.expect_word("(")?;
            let mut args = vec![];
            if p.expect_word(")").is_some() {
                return Some(args);
            }
            loop {
                args.push(p.expression()?);
                match p.next()? {
                    t if t.is_word(",") => continue,
                    t if t.is_word(")") => return Some(args),
                    _ => return None,
                }
            }
        })
    }
}
