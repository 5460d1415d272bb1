use crate::Word;

pub const WORD_WIDTH        : u32 = 10;
pub const WORD_MASK         : Word = 0b1111111111;

pub const OPCODE_WIDTH      : u32 = 4;
pub const MODE_WIDTH        : u32 = 2;
pub const ARE_WIDTH         : u32 = 2;
pub const VALUE_WIDTH       : u32 = 8;
pub const REGISTER_WIDTH    : u32 = 4;

pub const OPCODE_MASK       : Word = 0b1111000000;
pub const SRC_MODE_MASK     : Word = 0b0000110000;
pub const DST_MODE_MASK     : Word = 0b0000001100;
pub const ARE_MASK          : Word = 0b0000000011;
pub const VALUE_MASK        : Word = 0b1111111100;
pub const SRC_REGISTER_MASK : Word = 0b1111000000;
pub const DST_REGISTER_MASK : Word = 0b0000111100;

pub const OPCODE_OFFSET     : u32 = 6;
pub const SRC_MODE_OFFSET   : u32 = 4;
pub const DST_MODE_OFFSET   : u32 = 2;
pub const ARE_OFFSET        : u32 = 0;
pub const VALUE_OFFSET      : u32 = 2;
pub const SRC_REGISTER_OFFSET : u32 = 6;
pub const DST_REGISTER_OFFSET : u32 = 2;

pub const REGISTER_COUNT    : usize = 8;
pub const OPCODE_COUNT      : usize = 16;

/// First address of the instruction section.
pub const IC_START          : u16 = 100;

/// Longest accepted source line, excluding the newline.
pub const MAX_LINE_LENGTH   : usize = 80;
/// Longest accepted symbol (and macro) name.
pub const MAX_SYMBOL_LENGTH : usize = 30;
/// Most digits a numeric literal may carry, excluding the sign.
pub const MAX_NUM_DIGITS    : usize = 4;

/// Range of a `.data`/`.mat` cell value (10-bit two's complement).
pub const DATA_MIN          : i16 = -512;
pub const DATA_MAX          : i16 = 511;

/// Range of an immediate operand (8-bit two's complement).
pub const IMMEDIATE_MIN     : i16 = -128;
pub const IMMEDIATE_MAX     : i16 = 127;
