use std::{error::Error, fmt};

/// Failure to interpret a token as a variant of some enum, carrying the
/// rejected text and the enum's name for diagnostics.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseEnumError {
    pub value: String,
    pub enum_name: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "\"{}\" is not a valid {}",
            &self.value, &self.enum_name
        )
    }
}

impl Error for ParseEnumError {}

/// Token-to-variant parsing for fieldless enums. Derivable with
/// `#[derive(EnumFromStr)]` from the `util-derive` crate, which matches each
/// variant by its lowercased name (assembler source is lowercase).
pub trait EnumFromStr: Sized {
    fn from_str(s: &str) -> Result<Self, ParseEnumError>;
}
