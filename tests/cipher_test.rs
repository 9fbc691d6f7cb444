mod common;
use amos::lang::cipher::{toggle, unlock_procedures};
use amos::lang::ir::Instruction;
use amos::lang::token::{code, proc_flags};
use common::*;

fn procedure(size: u32, flags: u8) -> Vec<u8> {
    let mut v = vec![6, 0];
    v.extend_from_slice(&code::PROCEDURE.to_be_bytes());
    v.extend_from_slice(&size.to_be_bytes());
    v.extend_from_slice(&[0x12, 0x34, flags, 0x5A]);
    v
}

fn protected_program(flags: u8) -> Vec<u8> {
    let h = core();
    let body = line(&[w(&h, "PRINT"), string("SECRET"), w(&h, ";"), int(42)]);
    source(&[
        procedure(body.len() as u32, flags),
        body,
        line(&[w(&h, "END")]),
    ])
}

#[test]
fn test_locked_procedure_reads_like_plain() {
    let (_, table) = vocabulary();
    let plain = protected_program(0);
    let mut locked = plain.clone();
    assert!(toggle(&mut locked[20..]).unwrap());
    assert_eq!(locked[30] & proc_flags::ENCRYPTED, proc_flags::ENCRYPTED);
    assert_ne!(locked[36..], plain[36..]);

    let a = parse_file(&plain, &table);
    let b = parse_file(&locked, &table);
    assert_eq!(a.ir, b.ir);
    assert_eq!(a.checksum, b.checksum);
    assert!(matches!(a.ir[0], Instruction::Proc { flags: 0, .. }));

    let mut r = compile(&locked, &table).bind(Record::default());
    r.run().unwrap();
    assert_eq!(r.io().out, vec!["SECRET", "42"]);
}

#[test]
fn test_compiled_procedure_left_alone() {
    let flags = proc_flags::COMPILED | proc_flags::ENCRYPTED;
    let original = protected_program(flags);
    let mut file = original.clone();
    assert_eq!(unlock_procedures(&mut file).unwrap(), 0);
    assert_eq!(file, original);
}

#[test]
fn test_toggle_is_an_involution() {
    let original = protected_program(0);
    let mut file = original.clone();
    for _ in 0..2 {
        assert!(toggle(&mut file[20..]).unwrap());
    }
    assert_eq!(file, original);
}

#[test]
fn test_cut_short_procedure_stays_locked() {
    let mut file = source(&[procedure(8, proc_flags::ENCRYPTED), vec![0; 8]]);
    let original = file.clone();
    assert_eq!(unlock_procedures(&mut file).unwrap(), 0);
    assert_eq!(file[30] & proc_flags::ENCRYPTED, proc_flags::ENCRYPTED);
    assert_eq!(file, original);
}
