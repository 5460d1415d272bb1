use crate::{constants, Word};
use num::traits::ToPrimitive;
use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

/// Processor instruction set.
///
/// Every encoded word is ten bits. The first word of an instruction has the
/// layout (high bit first):
///
/// | Bits 9-6 | Bits 5-4    | Bits 3-2    | Bits 1-0 |
/// |----------|-------------|-------------|----------|
/// | opcode   | source mode | target mode | ARE      |
///
/// Operand words reuse the same grid: an 8-bit value field over the ARE bits
/// for immediates and symbol references, or two 4-bit register fields for
/// register operands and matrix indices.
///
/// Mnemonics are the lowercase variant names; parsing goes through
/// [`EnumFromStr`](../util/trait.EnumFromStr.html).
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum Opcode {
    /// Copy source operand to target operand.
    MOV,
    /// Compare operands (sets the zero flag; accepts any operand forms).
    CMP,
    /// Add source to target.
    ADD,
    /// Subtract source from target.
    SUB,
    /// Load the address of the source label into the target.
    LEA,
    /// Clear the target operand.
    CLR,
    /// Bitwise-complement the target operand.
    NOT,
    /// Increment the target operand.
    INC,
    /// Decrement the target operand.
    DEC,
    /// Jump to the target address.
    JMP,
    /// Branch to the target address if the zero flag is clear.
    BNE,
    /// Jump to subroutine at the target address.
    JSR,
    /// Read a character into the target operand.
    RED,
    /// Print the target operand.
    PRN,
    /// Return from subroutine.
    RTS,
    /// Stop the program.
    STOP,
}

/// Operand addressing modes, in their encoded order.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum AddressingMode {
    /// `#N` - the operand word carries the value itself.
    Immediate,
    /// `SYMBOL` - the operand word carries the symbol's address.
    Direct,
    /// `SYMBOL[rX][rY]` - address word followed by a register index word.
    Matrix,
    /// `r0`..`r7` - encoded in a register field of the operand word.
    Register,
}

/// The two ARE bits appended to every emitted word.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive)]
pub enum Are {
    /// Absolute content, fixed at assembly time.
    Absolute = 0,
    /// Reference to an external symbol; the value field is zero.
    External = 1,
    /// Reference to a symbol defined in this file.
    Relocatable = 2,
}

/// Register file of the machine.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive, ToPrimitive, EnumFromStr)]
pub enum RegisterId {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

#[inline]
pub fn enum_to_word<T: ToPrimitive + Copy>(val: T) -> Word {
    val.to_u16().unwrap()
}

macro_rules! impl_lowercase_display {
    ($e:ty) => {
        impl std::fmt::Display for $e {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "{}", format!("{:?}", self).to_lowercase())
            }
        }
    };
}

impl_lowercase_display!(Opcode);
impl_lowercase_display!(RegisterId);

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            AddressingMode::Immediate => "immediate",
            AddressingMode::Direct => "direct",
            AddressingMode::Matrix => "matrix",
            AddressingMode::Register => "register",
        };
        write!(f, "{}", name)
    }
}

/// Number of operands the instruction takes in source form.
pub fn operand_count(oc: Opcode) -> usize {
    use Opcode::*;
    match oc {
        MOV | CMP | ADD | SUB | LEA => 2,
        CLR | NOT | INC | DEC | JMP | BNE | JSR | RED | PRN => 1,
        RTS | STOP => 0,
    }
}

#[inline]
fn mode_bits(mode: Option<AddressingMode>) -> Word {
    // An absent operand leaves its mode field clear.
    mode.map(enum_to_word).unwrap_or(0)
}

/// Constructs the first word of an instruction. The ARE field of the first
/// word is always absolute.
#[inline]
pub fn make_instruction_word(
    oc: Opcode,
    src: Option<AddressingMode>,
    dst: Option<AddressingMode>,
) -> Word {
    ((enum_to_word(oc) << constants::OPCODE_OFFSET) & constants::OPCODE_MASK)
        | ((mode_bits(src) << constants::SRC_MODE_OFFSET) & constants::SRC_MODE_MASK)
        | ((mode_bits(dst) << constants::DST_MODE_OFFSET) & constants::DST_MODE_MASK)
}

/// Constructs an immediate operand word: 8-bit two's complement value over an
/// absolute ARE field.
#[inline]
pub fn make_immediate_word(value: i16) -> Word {
    ((value as Word) << constants::VALUE_OFFSET) & constants::VALUE_MASK
}

/// Constructs the operand word for a register in source position.
#[inline]
pub fn make_source_register_word(rs: RegisterId) -> Word {
    (enum_to_word(rs) << constants::SRC_REGISTER_OFFSET) & constants::SRC_REGISTER_MASK
}

/// Constructs the operand word for a register in target position.
#[inline]
pub fn make_target_register_word(rd: RegisterId) -> Word {
    (enum_to_word(rd) << constants::DST_REGISTER_OFFSET) & constants::DST_REGISTER_MASK
}

/// Constructs the shared operand word of a register/register instruction.
/// A matrix operand's index word uses the same layout.
#[inline]
pub fn make_register_pair_word(rs: RegisterId, rd: RegisterId) -> Word {
    make_source_register_word(rs) | make_target_register_word(rd)
}

/// Constructs a resolved symbol-reference word: the symbol's address in the
/// 8-bit value field, ARE per the symbol's linkage.
#[inline]
pub fn make_reference_word(value: u16, are: Are) -> Word {
    (((value as Word) << constants::VALUE_OFFSET) & constants::VALUE_MASK)
        | ((enum_to_word(are) << constants::ARE_OFFSET) & constants::ARE_MASK)
}

/// Low ten bits of a signed value, two's complement.
#[inline]
pub fn data_word(value: i16) -> Word {
    (value as Word) & constants::WORD_MASK
}

/// A character datum: the unsigned byte value in ten bits.
#[inline]
pub fn char_word(ch: u8) -> Word {
    Word::from(ch)
}
