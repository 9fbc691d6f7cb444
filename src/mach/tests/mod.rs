use super::*;
use crate::lang::ir::{Expression, Instruction};
use crate::lang::LabelTable;
use std::collections::VecDeque;
use std::rc::Rc;


#[derive(Default)]
struct Record {
    out: Vec<String>,
    input: VecDeque<String>,
    prompts: Vec<Option<String>>,
    host: Vec<String>,
}

impl Io for Record {
    fn print(&mut self, text: &str) {
        self.out.push(text.to_string());
    }

    fn input(&mut self, prompt: Option<&str>) -> String {
        self.prompts.push(prompt.map(|p| p.to_string()));
        self.input.pop_front().unwrap_or_default()
    }

    fn func(&mut self, name: &str, args: &[Val]) -> Option<Val> {
        match (name, args) {
            ("LEN", [Val::String(s)]) => Some(Val::from(s.len() as i32)),
            _ => None,
        }
    }

    fn call(&mut self, name: &str, args: &[Val]) {
        self.host.push(format!("CALL {} {:?}", name, args));
    }

    fn cmd(&mut self, name: &str, parts: &[Part]) {
        let parts: Vec<String> = parts
            .iter()
            .map(|p| {
                let args: Vec<String> = p.args.iter().map(|a| a.to_string()).collect();
                format!("{:?}{:?}", p.keyword, args)
            })
            .collect();
        self.host.push(format!("CMD {} {}", name, parts.join(" ")));
    }
}

fn compile(ir: &[Instruction]) -> Rc<Program> {
    Rc::new(codegen(ir, &LabelTable::new()).unwrap())
}

fn run(ir: &[Instruction]) -> Record {
    let program = compile(ir);
    let mut runtime = program.bind(Record::default());
    runtime.run().unwrap();
    runtime.into_io()
}

fn print(s: &str) -> Instruction {
    Instruction::Print(vec![Expression::Str(s.into())])
}

fn print_var(v: &str) -> Instruction {
    Instruction::Print(vec![Expression::Var(v.into())])
}

fn goto(target: usize) -> Instruction {
    Instruction::Goto {
        label: "L".into(),
        target: Some(target),
    }
}

fn gosub(target: usize) -> Instruction {
    Instruction::Gosub {
        label: "L".into(),
        target: Some(target),
    }
}

fn for_(var: &str, from: i32, to: i32, step: i32) -> Instruction {
    Instruction::For {
        var: var.into(),
        from,
        to,
        step,
    }
}

fn next(for_index: usize) -> Instruction {
    Instruction::Next {
        var: None,
        for_index: Some(for_index),
    }
}
