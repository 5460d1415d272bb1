//! Machine model for the ten-bit educational processor.
//!
//! The machine addresses memory in 10-bit words. This crate defines the word
//! type, the bit layout of encoded instruction and operand words, the opcode,
//! register and addressing-mode enumerations, and the base-4 letter projection
//! used by the assembler's output files. It deliberately contains no
//! execution logic: the assembler (the [tenasm](../tenasm/index.html) crate)
//! only needs the encodings.

pub mod base4;
pub mod constants;

mod instructions;

pub use crate::base4::{address_to_base4, from_base4, to_base4, word_to_base4};
pub use crate::instructions::*;

/// One machine word. Only the low ten bits are significant; constructors in
/// this crate never set the rest.
pub type Word = u16;

/// A word address. Rendered modulo 256 in output files (the object format
/// carries four base-4 letters per address).
pub type Address = u16;

#[cfg(test)]
mod test;
