#![allow(dead_code)]

use amos::lang::table::CORE_HEADER_SKIP;
use amos::lang::token::code;
use amos::lang::{cipher, parse, Parsed, TokenTable};
use amos::mach::{codegen, Io, Part, Program, Val};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

const AUTO: &[&str] = &[
    ":", ",", ";", "(", ")", "TO", "STEP", "THEN", "=", "<>", "<", ">", "+", "-", "*", "/",
    "AND", "OR", "NOT", "PRINT", "GOTO", "GOSUB", "RETURN", "END", "NEXT", "LEN", "INPUT$",
    "BOX", "BEEP", "INK",
];

/// Builds an Amiga hunk binary holding a token table, and remembers the
/// code each name was given.
pub struct Hunk {
    table: Vec<u8>,
    codes: HashMap<String, u16>,
    ap20: bool,
}

impl Hunk {
    pub fn new() -> Hunk {
        Hunk {
            table: vec![0; CORE_HEADER_SKIP],
            codes: HashMap::new(),
            ap20: false,
        }
    }

    pub fn with_ap20(mut self) -> Hunk {
        self.ap20 = true;
        self
    }

    pub fn entry(&mut self, name: &str) -> u16 {
        let code = self.table.len() as u16;
        self.table.extend_from_slice(&[0, 1, 0, 0]);
        let bytes = name.as_bytes();
        self.table.extend_from_slice(&bytes[..bytes.len() - 1]);
        self.table.push(bytes[bytes.len() - 1] | 0x80);
        self.table.extend_from_slice(&[b'I', 0xFD]);
        if self.table.len() % 2 == 1 {
            self.table.push(0);
        }
        self.codes.insert(name.to_ascii_uppercase(), code);
        code
    }

    /// Place an entry at a fixed code, padding with a filler entry.
    pub fn entry_at(&mut self, code: u16, name: &str) {
        let gap = code as usize - self.table.len();
        if gap > 0 {
            assert!(gap >= 8 && gap % 2 == 0, "cannot pad {} bytes", gap);
            let filler = "F".repeat(gap - 6);
            self.entry(&filler);
        }
        assert_eq!(self.entry(name), code);
    }

    pub fn code(&self, name: &str) -> u16 {
        match self.codes.get(name) {
            Some(code) => *code,
            None => panic!("no code for {}", name),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut v = vec![0; 50];
        v[0..4].copy_from_slice(&0x3F3u32.to_be_bytes());
        v[24..28].copy_from_slice(&0x3E9u32.to_be_bytes());
        if self.ap20 {
            v.extend_from_slice(b"AP20");
        }
        v.extend_from_slice(&self.table);
        v.extend_from_slice(&[0, 0, 0, 0]);
        v
    }
}

/// The vocabulary the integration tests write programs in.
pub fn core() -> Hunk {
    let mut hunk = Hunk::new();
    hunk.entry_at(0x0054, ":");
    for name in &AUTO[1..] {
        hunk.entry(name);
    }
    hunk.entry_at(code::FOR, "For");
    hunk.entry_at(code::IF, "If");
    hunk
}

pub fn vocabulary() -> (Hunk, TokenTable) {
    let hunk = core();
    let table = TokenTable::parse(&hunk.bytes(), 0, CORE_HEADER_SKIP).unwrap();
    (hunk, table)
}

pub fn w(hunk: &Hunk, word: &str) -> Vec<u8> {
    hunk.code(word).to_be_bytes().to_vec()
}

fn name(code: u16, flags: u8, name: &str) -> Vec<u8> {
    let mut v = code.to_be_bytes().to_vec();
    v.extend_from_slice(&[0, 0, name.len() as u8, flags]);
    v.extend_from_slice(name.as_bytes());
    if v.len() % 2 == 1 {
        v.push(0);
    }
    v
}

pub fn var(n: &str) -> Vec<u8> {
    match n.strip_suffix('$') {
        Some(n) => name(code::VARIABLE, 2, n),
        None => name(code::VARIABLE, 0, n),
    }
}

pub fn label(n: &str) -> Vec<u8> {
    name(code::LABEL, 0, n)
}

pub fn label_ref(n: &str) -> Vec<u8> {
    name(code::LABEL_REF, 0, n)
}

pub fn int(n: i32) -> Vec<u8> {
    let mut v = code::INTEGER.to_be_bytes().to_vec();
    v.extend_from_slice(&n.to_be_bytes());
    v
}

pub fn string(s: &str) -> Vec<u8> {
    let mut v = code::STRING_1.to_be_bytes().to_vec();
    v.extend_from_slice(&(s.len() as u16).to_be_bytes());
    v.extend_from_slice(s.as_bytes());
    if v.len() % 2 == 1 {
        v.push(0);
    }
    v
}

pub fn line(tokens: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = tokens.concat();
    let len = body.len() + 4;
    let mut v = vec![(len / 2) as u8, 0];
    v.extend(body);
    v.extend_from_slice(&[0, 0]);
    v
}

pub fn source(lines: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = lines.concat();
    let mut v = b"AMOS Basic V134 ".to_vec();
    v.extend_from_slice(&(body.len() as u32).to_be_bytes());
    v.extend(body);
    v
}

/// The same path the `amos` binary takes from file bytes to a parse.
pub fn parse_file(file: &[u8], table: &TokenTable) -> Parsed {
    let mut file = file.to_vec();
    cipher::unlock_procedures(&mut file).unwrap();
    parse(&file, table).unwrap()
}

pub fn compile(file: &[u8], table: &TokenTable) -> Rc<Program> {
    let parsed = parse_file(file, table);
    let program = codegen(&parsed.ir, &parsed.labels).unwrap();
    Rc::new(program.with_checksum(parsed.checksum))
}

/// Records everything a program does.
#[derive(Default)]
pub struct Record {
    pub out: Vec<String>,
    pub input: VecDeque<String>,
    pub host: Vec<String>,
}

impl Io for Record {
    fn print(&mut self, text: &str) {
        self.out.push(text.to_string());
    }

    fn input(&mut self, prompt: Option<&str>) -> String {
        if let Some(prompt) = prompt {
            self.out.push(prompt.to_string());
        }
        self.input.pop_front().unwrap_or_default()
    }

    fn func(&mut self, name: &str, args: &[Val]) -> Option<Val> {
        match (name, args) {
            ("LEN", [Val::String(s)]) => Some(Val::from(s.len() as f64)),
            _ => None,
        }
    }

    fn call(&mut self, name: &str, args: &[Val]) {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.host.push(format!("{} {}", name, args.join(",")));
    }

    fn cmd(&mut self, name: &str, parts: &[Part]) {
        let parts: Vec<String> = parts
            .iter()
            .map(|p| {
                let args: Vec<String> = p.args.iter().map(|a| a.to_string()).collect();
                match &p.keyword {
                    Some(k) => format!("{} {}", k, args.join(",")),
                    None => args.join(","),
                }
            })
            .collect();
        self.host.push(format!("{} {}", name, parts.join(" ")));
    }
}
