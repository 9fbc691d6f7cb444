mod common;
use amos::lang::ErrorCode;
use common::*;

#[test]
fn test_listing() {
    let h = core();
    let file = source(&[
        line(&[label("Top"), w(&h, "PRINT"), string("HI"), w(&h, ";"), var("N")]),
        line(&[var("N"), w(&h, "="), var("N"), w(&h, "+"), int(1)]),
        line(&[w(&h, "GOTO"), label_ref("Top")]),
    ]);
    let (_, table) = vocabulary();
    let program = compile(&file, &table);
    let listing = program.to_string();
    let mut lines = listing.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("; 4 OPS, CRC $"), "{}", header);
    assert_eq!(
        lines.collect::<Vec<_>>(),
        vec![
            "    0  TOP:",
            "    1  PRINT [\"HI\"] [PUSH(N)]",
            "    2  SET(N) [PUSH(N) 1 ADD]",
            "    3  GOTO(0) TOP",
        ]
    );
    assert_eq!(program.checksum(), Some(parse_file(&file, &table).checksum));
}

#[test]
fn test_unknown_words_survive() {
    let (_, table) = vocabulary();
    // An extension word nothing was loaded for.
    let ext = vec![0x00, 0x4E, 0x07, 0x00, 0x01, 0x2C];
    let file = source(&[line(&[ext, int(9)])]);
    let listing = compile(&file, &table).to_string();
    assert!(listing.ends_with("    0  CMD(UNK_7_12c) [9]\n"), "{}", listing);
}

#[test]
fn test_warnings_are_collected() {
    let h = core();
    let file = source(&[
        line(&[w(&h, "GOSUB"), int(100)]),
        line(&[w(&h, "FOR"), var("I"), w(&h, "="), int(1)]),
        line(&[w(&h, "END")]),
    ]);
    let (_, table) = vocabulary();
    let parsed = parse_file(&file, &table);
    assert_eq!(parsed.ir.len(), 1);
    assert!(parsed.warnings[0].is(ErrorCode::MissingLabel));
    assert!(parsed.warnings[1].is(ErrorCode::ForWithoutTo));
}
