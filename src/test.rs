use crate::constants::*;
use crate::*;

#[test]
fn instruction_word_layout() {
    // stop: opcode 15, no operands.
    assert_eq!(
        make_instruction_word(Opcode::STOP, None, None),
        0b1111000000
    );
    // mov #-1, r3: opcode 0, source immediate, target register.
    let word = make_instruction_word(
        Opcode::MOV,
        Some(AddressingMode::Immediate),
        Some(AddressingMode::Register),
    );
    assert_eq!(word, 0b0000001100);
    assert_eq!(word & ARE_MASK, 0);
}

#[test]
fn instruction_word_fields() {
    let word = make_instruction_word(
        Opcode::LEA,
        Some(AddressingMode::Matrix),
        Some(AddressingMode::Direct),
    );
    assert_eq!((word & OPCODE_MASK) >> OPCODE_OFFSET, 4);
    assert_eq!((word & SRC_MODE_MASK) >> SRC_MODE_OFFSET, 2);
    assert_eq!((word & DST_MODE_MASK) >> DST_MODE_OFFSET, 1);
}

#[test]
fn immediate_word_two_complement() {
    assert_eq!(make_immediate_word(-1), 0b1111111100);
    assert_eq!(make_immediate_word(5), 0b0000010100);
    assert_eq!(make_immediate_word(-128), 0b1000000000);
}

#[test]
fn register_words() {
    assert_eq!(make_source_register_word(RegisterId::R3), 0b0011000000);
    assert_eq!(make_target_register_word(RegisterId::R3), 0b0000001100);
    assert_eq!(
        make_register_pair_word(RegisterId::R7, RegisterId::R1),
        0b0111000100
    );
}

#[test]
fn reference_words() {
    assert_eq!(make_reference_word(0, Are::External), 0b0000000001);
    assert_eq!(make_reference_word(104, Are::Relocatable), 0b0110100010);
    // Only the low eight bits of the address survive.
    assert_eq!(
        make_reference_word(0x1FF, Are::Relocatable),
        0b1111111110
    );
}

#[test]
fn data_words() {
    assert_eq!(data_word(5), 0b0000000101);
    assert_eq!(data_word(-3), 0b1111111101);
    assert_eq!(data_word(-512), 0b1000000000);
    assert_eq!(data_word(511), 0b0111111111);
    assert_eq!(char_word(b'a'), 0b0001100001);
}

#[test]
fn operand_counts() {
    assert_eq!(operand_count(Opcode::MOV), 2);
    assert_eq!(operand_count(Opcode::LEA), 2);
    assert_eq!(operand_count(Opcode::CLR), 1);
    assert_eq!(operand_count(Opcode::PRN), 1);
    assert_eq!(operand_count(Opcode::RTS), 0);
    assert_eq!(operand_count(Opcode::STOP), 0);
}

#[test]
fn mnemonic_parsing() {
    assert_eq!("mov".parse::<Opcode>(), Ok(Opcode::MOV));
    assert_eq!("stop".parse::<Opcode>(), Ok(Opcode::STOP));
    assert!("MOV".parse::<Opcode>().is_err());
    assert!("move".parse::<Opcode>().is_err());
    assert_eq!("r5".parse::<RegisterId>(), Ok(RegisterId::R5));
}

#[test]
fn base4_projection() {
    assert_eq!(word_to_base4(0b1111000000), "ddaaa");
    assert_eq!(word_to_base4(0), "aaaaa");
    assert_eq!(address_to_base4(100), "bcba");
    assert_eq!(to_base4(1, 3), "aab");
    assert_eq!(to_base4(0, 2), "aa");
}

#[test]
fn base4_round_trip() {
    for word in &[0u16, 1, 100, 0b1111000000, 0b1010101010, 1023] {
        let text = word_to_base4(*word);
        assert_eq!(text.len(), 5);
        assert_eq!(from_base4(&text), Some(*word));
    }
    assert_eq!(from_base4("bcba"), Some(100));
    assert_eq!(from_base4("xyz"), None);
}
