use super::table::Entry;
use super::token::code;
use super::TokenTable;


const WORDS: &[(&str, u16)] = &[
    (":", 0x0054),
    (",", 0x005C),
    (";", 0x0064),
    ("(", 0x0074),
    (")", 0x007C),
    ("TO", 0x0094),
    ("STEP", 0x009C),
    ("THEN", 0x02C6),
    ("=", 0xFFA2),
    (">", 0xFF8E),
    ("+", 0xFFC0),
    ("-", 0xFFCA),
    ("*", 0xFFE2),
    ("/", 0xFFEC),
    ("PRINT", 0x0476),
    ("GOTO", 0x02A8),
    ("GOSUB", 0x02B2),
    ("RETURN", 0x02A0),
    ("END", 0x0390),
    ("FOR", code::FOR),
    ("NEXT", 0x0246),
    ("IF", code::IF),
    ("BOX", 0x1C5C),
    ("LEN", 0x0A2A),
];

fn vocabulary() -> TokenTable {
    WORDS
        .iter()
        .map(|(name, code)| (*code as u32, Entry::new(name, 0)))
        .collect()
}

fn w(word: &str) -> Vec<u8> {
    let code = match WORDS.iter().find(|(name, _)| *name == word) {
        Some((_, code)) => *code,
        None => panic!("no test code for {}", word),
    };
    code.to_be_bytes().to_vec()
}

fn name(code: u16, name: &str) -> Vec<u8> {
    let mut v = code.to_be_bytes().to_vec();
    v.extend_from_slice(&[0, 0, name.len() as u8, 0]);
    v.extend_from_slice(name.as_bytes());
    if v.len() % 2 == 1 {
        v.push(0);
    }
    v
}

fn var(n: &str) -> Vec<u8> {
    name(code::VARIABLE, n)
}

fn label(n: &str) -> Vec<u8> {
    name(code::LABEL, n)
}

fn label_ref(n: &str) -> Vec<u8> {
    name(code::LABEL_REF, n)
}

fn int(n: i32) -> Vec<u8> {
    let mut v = code::INTEGER.to_be_bytes().to_vec();
    v.extend_from_slice(&n.to_be_bytes());
    v
}

fn string(s: &str) -> Vec<u8> {
    let mut v = code::STRING_1.to_be_bytes().to_vec();
    v.extend_from_slice(&(s.len() as u16).to_be_bytes());
    v.extend_from_slice(s.as_bytes());
    if v.len() % 2 == 1 {
        v.push(0);
    }
    v
}

fn line(tokens: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = tokens.concat();
    let len = body.len() + 4;
    let mut v = vec![(len / 2) as u8, 0];
    v.extend(body);
    v.extend_from_slice(&[0, 0]);
    v
}

fn source(lines: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = lines.concat();
    let mut v = b"AMOS Basic V134 ".to_vec();
    v.extend_from_slice(&(body.len() as u32).to_be_bytes());
    v.extend(body);
    v
}
