use super::*;
use crate::error::AsmError;
use crate::module::{HType, Module, Op};
use crate::value::{HFunc, HValue};

#[test]
fn tokens_classify_positionally() {
    let mut lexer = Lexer::new(".constants: { hint } 16 0x10 main: pushc $main");
    let expected = [
        Token::Section("constants".to_string()),
        Token::LBrace,
        Token::Type(HType::Int),
        Token::RBrace,
        Token::Int(16),
        Token::Int(16),
        Token::LabelDef("main".to_string()),
        Token::Instr(Op::Pushc),
        Token::LabelRef("main".to_string()),
    ];
    for want in expected {
        assert_eq!(lexer.next_token(), Ok(want));
    }
    // Exhausted input yields Eof on every subsequent read.
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn unknown_identifier_is_invalid() {
    let mut lexer = Lexer::new("popcount");
    assert_eq!(
        lexer.next_token(),
        Err(AsmError::InvalidToken("popcount".to_string()))
    );
}

#[test]
fn integer_literals_accept_all_bases() {
    let mut lexer = Lexer::new("10 0x10 0b101 0o17 -3 -0x10");
    for want in [10, 16, 5, 15, -3, -16] {
        assert_eq!(lexer.next_token(), Ok(Token::Int(want)));
    }
}

#[test]
fn comment_lines_are_skipped() {
    let source = "# leading comment\nhalt\n   # indented comment\nnoop";
    let mut lexer = Lexer::new(source);
    assert_eq!(lexer.next_token(), Ok(Token::Instr(Op::Halt)));
    assert_eq!(lexer.next_token(), Ok(Token::Instr(Op::Noop)));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn rbrace_where_lbrace_expected_is_unexpected() {
    let err = assemble(".constants }").unwrap_err();
    assert!(matches!(err, AsmError::UnexpectedToken(_)), "{err:?}");
}

#[test]
fn emission_matches_wire_format() {
    let bytes = assemble(".constants { hfunc 0 $main hint 0x05 } .code { main: noop }")
        .expect("assembles");
    let mut want = Vec::new();
    want.extend_from_slice(b"hiss");
    want.push(2); // constant count
    want.push(0x02); // hfunc tag
    want.push(0x00); // arity
    want.extend_from_slice(&0i64.to_be_bytes()); // offset of main within .code
    want.push(0x01); // hint tag
    want.extend_from_slice(&5i64.to_be_bytes());
    want.push(0x00); // noop
    assert_eq!(bytes, want);
}

#[test]
fn forward_reference_is_backpatched() {
    let source = ".constants { hfunc 0 $later } .code { noop noop later: halt }";
    let bytes = assemble(source).expect("assembles");
    // Offset payload sits right after magic, count, tag, and arity.
    let offset = i64::from_be_bytes(bytes[7..15].try_into().unwrap());
    assert_eq!(offset, 2);
    // No stray placeholder bytes survive.
    assert!(!bytes.windows(8).any(|w| w.iter().all(|&b| b == 0xFF)));
}

#[test]
fn assemble_then_load_round_trips() {
    let source = "
# entry plus one worker function
.constants {
    hfunc 0 $main
    hfunc 2 $add
    hint 4
    hint 6
}
.code {
main:
    pushc 2
    pushc 3
    pushc 1
    call
    print
    halt
add:
    loadv 0
    loadv 1
    iadd
    ret
}
";
    let bytes = assemble(source).expect("assembles");
    let module = Module::load(&bytes).expect("loads");
    assert_eq!(
        module.constants,
        vec![
            HValue::Func(HFunc {
                offset: 0,
                arity: 0
            }),
            HValue::Func(HFunc {
                offset: 9,
                arity: 2
            }),
            HValue::Int(4),
            HValue::Int(6),
        ]
    );
    // Code is exactly what was emitted after the constants.
    assert_eq!(
        module.code,
        vec![
            Op::Pushc as u8,
            2,
            Op::Pushc as u8,
            3,
            Op::Pushc as u8,
            1,
            Op::Call as u8,
            Op::Print as u8,
            Op::Halt as u8,
            Op::Loadv as u8,
            0,
            Op::Loadv as u8,
            1,
            Op::Iadd as u8,
            Op::Ret as u8,
        ]
    );
}

#[test]
fn duplicate_label_is_rejected() {
    let err = assemble(".constants { } .code { main: noop main: halt }").unwrap_err();
    assert_eq!(err, AsmError::DuplicateLabel("main".to_string()));
}

#[test]
fn unresolved_reference_is_rejected() {
    let err = assemble(".constants { hfunc 0 $nowhere } .code { noop }").unwrap_err();
    assert_eq!(err, AsmError::UnresolvedReference("nowhere".to_string()));
}

#[test]
fn arity_out_of_range_is_rejected() {
    let err = assemble(".constants { hfunc 300 $main } .code { main: noop }").unwrap_err();
    assert_eq!(err, AsmError::OutOfRange(300));
}

#[test]
fn code_immediate_out_of_range_is_rejected() {
    let err = assemble(".constants { } .code { pushc 256 }").unwrap_err();
    assert_eq!(err, AsmError::OutOfRange(256));

    let err = assemble(".constants { } .code { pushc -1 }").unwrap_err();
    assert_eq!(err, AsmError::OutOfRange(-1));
}

#[test]
fn label_reference_in_code_is_unexpected() {
    // Reserved by the grammar; not currently legal.
    let err = assemble(".constants { } .code { pushc $main }").unwrap_err();
    assert!(matches!(err, AsmError::UnexpectedToken(_)), "{err:?}");
}

#[test]
fn trailing_tokens_after_code_are_unexpected() {
    let err = assemble(".constants { } .code { halt } noop").unwrap_err();
    assert!(matches!(err, AsmError::UnexpectedToken(_)), "{err:?}");
}

#[test]
fn hint_payload_keeps_full_width() {
    let bytes = assemble(".constants { hint -1 } .code { }").expect("assembles");
    assert_eq!(&bytes[6..14], &(-1i64).to_be_bytes());
}
