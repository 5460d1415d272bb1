//! Two-pass assembler for the ten-bit educational machine.
//!
//! The pipeline mirrors how the assembler is run from the command line: a
//! `.as` source file is expanded by the macro preprocessor
//! ([`preprocess`](fn.preprocess.html)) into the `.am` stream, which
//! [`translate`](fn.translate.html) turns into either the three output
//! artifacts (the object image plus the entry and external record lists) or
//! a list of diagnostics. [`assemble`](fn.assemble.html) chains the two for
//! callers that start from raw source text.
//!
//! Parsing is implemented with [pest], one source line at a time, so a bad
//! line costs one diagnostic and the scan keeps going; the whole file is
//! rejected only after every fault has been reported.
//!
//! # Source language
//!
//! A line is an optional `NAME:` label, an optional statement and an
//! optional `;` comment. Statements are either directives or instructions.
//!
//! ## Directives
//!
//! Keyword    | Description                                      | Example
//! -----------|--------------------------------------------------|---------------------
//! `.data`    | comma-separated signed words                     | `.data 7, -3, 12`
//! `.string`  | character data, zero-terminated                  | `.string "abc"`
//! `.mat`     | matrix: dimensions plus optional initializer     | `.mat [2][3] 1, 2`
//! `.extern`  | declare a symbol defined in another file         | `.extern K`
//! `.entry`   | export a symbol defined in this file             | `.entry MAIN`
//!
//! A `.mat` initializer may be shorter than the matrix; the remaining cells
//! assemble as zero words.
//!
//! ## Instructions
//!
//! Mnemonic | Operands | Mnemonic | Operands | Mnemonic | Operands
//! ---------|----------|----------|----------|----------|---------
//! `mov`    | 2        | `clr`    | 1        | `red`    | 1
//! `cmp`    | 2        | `not`    | 1        | `prn`    | 1
//! `add`    | 2        | `inc`    | 1        | `rts`    | 0
//! `sub`    | 2        | `dec`    | 1        | `stop`   | 0
//! `lea`    | 2        | `jmp`    | 1        |          |
//!          |          | `bne`    | 1        |          |
//!          |          | `jsr`    | 1        |          |
//!
//! Operands take one of four addressing modes: immediate (`#-3`), direct
//! (`SYMBOL`), matrix (`SYMBOL[r1][r2]`) and register (`r0`..`r7`). Which
//! modes an instruction accepts in which position is checked during the
//! first pass.
//!
//! ## Macros
//!
//! `mcro NAME` opens a textual macro definition, `mcroend` closes it; a
//! later line starting with `NAME` expands to the captured body. Macro
//! names may not shadow mnemonics or directives.
//!
//! # Output
//!
//! Output files are text in the machine's base-4 letter alphabet; see the
//! [tenobj](../tenobj/index.html) crate for the formats.
//!
//! [pest]: https://docs.rs/pest/

pub mod diag;

mod first_pass;
mod macros;
mod orders;
mod parser;
mod second_pass;
mod symbols;


use crate::diag::Diagnostics;
use crate::orders::Order;
use crate::symbols::{SymbolKind, SymbolTable};
use tencpu::constants::IC_START;
use tencpu::Address;
use tenobj::ObjectImage;

pub use crate::macros::preprocess;

/// The mutable state of one file's translation: both passes work on this,
/// and a fresh one is built per file.
pub struct Assembly {
    symbols: SymbolTable,
    orders: Vec<Order>,
    data: Vec<orders::CodedWord>,
    externals: Vec<(String, Address)>,
    ic: Address,
    dc: Address,
    diags: Diagnostics,
}

impl Assembly {
    fn new() -> Assembly {
        Assembly {
            symbols: SymbolTable::new(),
            orders: Vec::new(),
            data: Vec::new(),
            externals: Vec::new(),
            ic: IC_START,
            dc: 0,
            diags: Diagnostics::new(),
        }
    }

    fn into_artifacts(self) -> Artifacts {
        let words = self
            .orders
            .iter()
            .flat_map(|order| order.words.iter())
            .chain(self.data.iter())
            .map(|word| (word.address, word.bits))
            .collect();

        let entries = self
            .symbols
            .iter()
            .filter(|symbol| symbol.kind == SymbolKind::Entry)
            .map(|symbol| (symbol.name.clone(), symbol.value))
            .collect();

        Artifacts {
            object: ObjectImage::from(self.ic - IC_START, self.dc, words),
            entries,
            externals: self.externals,
        }
    }
}

/// Everything the emitter needs for one successfully translated file.
#[derive(Debug, PartialEq)]
pub struct Artifacts {
    pub object: ObjectImage,
    pub entries: Vec<(String, Address)>,
    pub externals: Vec<(String, Address)>,
}

/// Runs both passes over an already-expanded source stream. The artifacts
/// are `None` whenever any diagnostic is an error; warnings alone do not
/// block emission.
pub fn translate(source: &str) -> (Option<Artifacts>, Diagnostics) {
    let mut asm = Assembly::new();

    first_pass::first_pass(source, &mut asm);
    if asm.diags.has_errors() {
        return (None, asm.diags);
    }

    second_pass::second_pass(source, &mut asm);
    if asm.diags.has_errors() {
        return (None, asm.diags);
    }

    let mut diags = Diagnostics::new();
    std::mem::swap(&mut diags, &mut asm.diags);
    (Some(asm.into_artifacts()), diags)
}

/// Expands the macro layer, then translates. The convenience entry point
/// for callers (and tests) that do not care about the `.am` side artifact.
pub fn assemble(source: &str) -> (Option<Artifacts>, Diagnostics) {
    let (expanded, mut diags) = preprocess(source);
    if diags.has_errors() {
        return (None, diags);
    }
    let (artifacts, pass_diags) = translate(&expanded);
    diags.extend(pass_diags);
    (artifacts, diags)
}
