//! The in-memory record of one assembled instruction and its words, plus the
//! two pieces of instruction knowledge the passes share: the word-count rule
//! and the addressing-mode legality matrix.

use crate::diag::ErrorKind;
use tencpu::{Address, AddressingMode, Opcode, Word};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordKind {
    Instruction,
    Data,
}

/// An encoded word together with the address it will occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodedWord {
    pub address: Address,
    pub bits: Word,
    pub kind: WordKind,
}

/// A symbol operand whose word could not be encoded in the first pass. The
/// placeholder's position is remembered so the second pass overwrites it
/// directly instead of scanning for an all-zero word.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRef {
    pub name: String,
    pub word_index: usize,
}

#[derive(Debug)]
pub struct Order {
    /// Line in the expanded source, for second-pass diagnostics.
    pub line: u32,
    pub address: Address,
    pub opcode: Opcode,
    pub src_mode: Option<AddressingMode>,
    pub dst_mode: Option<AddressingMode>,
    pub word_count: usize,
    pub words: Vec<CodedWord>,
    pub pending: Vec<PendingRef>,
}

impl Order {
    pub fn new(
        line: u32,
        address: Address,
        opcode: Opcode,
        src_mode: Option<AddressingMode>,
        dst_mode: Option<AddressingMode>,
        word_count: usize,
    ) -> Order {
        Order {
            line,
            address,
            opcode,
            src_mode,
            dst_mode,
            word_count,
            words: Vec::with_capacity(word_count),
            pending: Vec::new(),
        }
    }

    /// Appends a word at the next address of this order and returns its
    /// index in the chain.
    pub fn push_word(&mut self, bits: Word) -> usize {
        let index = self.words.len();
        self.words.push(CodedWord {
            address: self.address + index as Address,
            bits,
            kind: WordKind::Instruction,
        });
        index
    }

    /// Appends an all-zero placeholder for a symbol operand and records the
    /// reference for the second pass.
    pub fn push_reference(&mut self, name: &str) {
        let word_index = self.push_word(0);
        self.pending.push(PendingRef {
            name: name.to_owned(),
            word_index,
        });
    }
}

/// Words an instruction occupies: one for the instruction itself, one per
/// immediate/direct/register operand, two per matrix operand; two register
/// operands share a single word.
pub fn word_count(src: Option<AddressingMode>, dst: Option<AddressingMode>) -> usize {
    use AddressingMode::*;
    if let (Some(Register), Some(Register)) = (src, dst) {
        return 2;
    }
    let operand_words = |mode: Option<AddressingMode>| match mode {
        None => 0,
        Some(Matrix) => 2,
        Some(Immediate) | Some(Direct) | Some(Register) => 1,
    };
    1 + operand_words(src) + operand_words(dst)
}

/// Which addressing modes each opcode accepts in each position. Assumes the
/// operand count has already been checked.
pub fn check_modes(
    oc: Opcode,
    src: Option<AddressingMode>,
    dst: Option<AddressingMode>,
) -> Result<(), ErrorKind> {
    use AddressingMode::*;
    use Opcode::*;

    let src_ok = match oc {
        MOV | CMP | ADD | SUB => true,
        LEA => matches!(src, Some(Direct) | Some(Matrix)),
        _ => src.is_none(),
    };
    if !src_ok {
        return Err(ErrorKind::IllegalSrcMode {
            mnemonic: oc.to_string(),
            mode: src.unwrap_or(Immediate),
        });
    }

    let dst_ok = match oc {
        CMP | PRN => true,
        RTS | STOP => dst.is_none(),
        _ => matches!(dst, Some(Direct) | Some(Matrix) | Some(Register)),
    };
    if !dst_ok {
        return Err(ErrorKind::IllegalDstMode {
            mnemonic: oc.to_string(),
            mode: dst.unwrap_or(Immediate),
        });
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use matches::assert_matches;
    use AddressingMode::*;

    #[test]
    fn word_counts() {
        assert_eq!(word_count(None, None), 1);
        assert_eq!(word_count(None, Some(Register)), 2);
        assert_eq!(word_count(Some(Register), Some(Register)), 2);
        assert_eq!(word_count(Some(Immediate), Some(Register)), 3);
        assert_eq!(word_count(Some(Direct), Some(Direct)), 3);
        assert_eq!(word_count(Some(Matrix), Some(Register)), 4);
        assert_eq!(word_count(Some(Matrix), Some(Matrix)), 5);
    }

    #[test]
    fn mode_legality() {
        assert_matches!(check_modes(Opcode::CMP, Some(Immediate), Some(Immediate)), Ok(()));
        assert_matches!(check_modes(Opcode::PRN, None, Some(Immediate)), Ok(()));
        assert_matches!(
            check_modes(Opcode::MOV, Some(Immediate), Some(Immediate)),
            Err(ErrorKind::IllegalDstMode { .. })
        );
        assert_matches!(
            check_modes(Opcode::LEA, Some(Immediate), Some(Register)),
            Err(ErrorKind::IllegalSrcMode { .. })
        );
        assert_matches!(
            check_modes(Opcode::LEA, Some(Register), Some(Register)),
            Err(ErrorKind::IllegalSrcMode { .. })
        );
        assert_matches!(check_modes(Opcode::JMP, None, Some(Direct)), Ok(()));
        assert_matches!(
            check_modes(Opcode::INC, None, Some(Immediate)),
            Err(ErrorKind::IllegalDstMode { .. })
        );
        assert_matches!(check_modes(Opcode::STOP, None, None), Ok(()));
    }

    #[test]
    fn reference_placeholders() {
        let mut order = Order::new(1, 100, Opcode::MOV, Some(Direct), Some(Register), 3);
        order.push_word(0b0000011100);
        order.push_reference("X");
        order.push_word(0b0000000100);

        assert_eq!(order.words.len(), 3);
        assert_eq!(order.words[1].bits, 0);
        assert_eq!(order.words[1].address, 101);
        assert_eq!(order.pending.len(), 1);
        assert_eq!(order.pending[0].word_index, 1);
    }
}
