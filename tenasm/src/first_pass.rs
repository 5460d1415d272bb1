//! The first pass: walks the expanded source line by line, collects symbol
//! definitions, encodes data words and everything of an instruction that
//! does not need the symbol table, and advances the instruction and data
//! counters. Symbol operands get an all-zero placeholder word and a pending
//! reference for the second pass.

use matches::debug_assert_matches;
use pest::iterators::Pair;

use crate::diag::{Diagnostics, ErrorKind};
use crate::orders::{check_modes, word_count, CodedWord, Order, WordKind};
use crate::parser::{
    diagnose_parse_failure, parse_line, process_int, process_register, process_symbol, Rule,
};
use crate::symbols::SymbolKind;
use crate::Assembly;
use tencpu::constants::{DATA_MAX, DATA_MIN, IMMEDIATE_MAX, IMMEDIATE_MIN, MAX_LINE_LENGTH};
use tencpu::{
    char_word, data_word, make_immediate_word, make_instruction_word, make_register_pair_word,
    make_source_register_word, make_target_register_word, operand_count, Address, AddressingMode,
    Opcode, Word,
};

pub fn first_pass(source: &str, asm: &mut Assembly) {
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;

        if line.len() > MAX_LINE_LENGTH {
            asm.diags.error(line_no, ErrorKind::LineTooLong(line.len()));
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }

        let parsed = match parse_line(line) {
            Ok(pair) => pair,
            Err(err) => {
                asm.diags
                    .error(line_no, diagnose_parse_failure(line, &err));
                continue;
            }
        };

        let mut label: Option<String> = None;
        let mut statement = None;
        for item in parsed.into_inner() {
            match item.as_rule() {
                Rule::label => {
                    let ident = item.into_inner().next().unwrap();
                    match process_symbol(&ident) {
                        Ok(name) => label = Some(name.to_owned()),
                        Err(kind) => asm.diags.error(line_no, kind),
                    }
                }
                Rule::statement => statement = Some(item.into_inner().next().unwrap()),
                Rule::EOI => {}
                _ => unreachable!(),
            }
        }

        match statement {
            Some(stmt) => dispatch_statement(stmt, label, line_no, asm),
            // A bare label defines a code symbol at the current IC; the
            // statement it belongs to follows on a later line (macro
            // expansion produces exactly this shape).
            None => {
                if let Some(name) = label {
                    define(&name, SymbolKind::Code, asm.ic, line_no, asm);
                }
            }
        }
    }

    let final_ic = asm.ic;
    asm.symbols.relocate_data(final_ic);
    for word in &mut asm.data {
        word.address += final_ic;
    }
}

fn define(name: &str, kind: SymbolKind, value: Address, line_no: u32, asm: &mut Assembly) {
    if let Err(err) = asm.symbols.add(name, kind, value) {
        asm.diags.error(line_no, err);
    }
}

fn push_data(asm: &mut Assembly, bits: Word) {
    asm.data.push(CodedWord {
        address: asm.dc,
        bits,
        kind: WordKind::Data,
    });
    asm.dc += 1;
}

fn dispatch_statement(stmt: Pair<Rule>, label: Option<String>, line_no: u32, asm: &mut Assembly) {
    match stmt.as_rule() {
        Rule::data_stmt => {
            if let Some(name) = &label {
                define(name, SymbolKind::Data, asm.dc, line_no, asm);
            }
            let list = stmt.into_inner().nth(1).unwrap();
            for int_pair in list.into_inner() {
                match process_int(&int_pair, DATA_MIN, DATA_MAX) {
                    Ok(value) => push_data(asm, data_word(value)),
                    Err(kind) => asm.diags.error(line_no, kind),
                }
            }
        }

        Rule::string_stmt => {
            if let Some(name) = &label {
                define(name, SymbolKind::Data, asm.dc, line_no, asm);
            }
            let literal = stmt.into_inner().nth(1).unwrap();
            let text = literal.as_str();
            for byte in text[1..text.len() - 1].bytes() {
                push_data(asm, char_word(byte));
            }
            // The terminating all-zero word.
            push_data(asm, 0);
        }

        Rule::mat_stmt => {
            if let Some(name) = &label {
                define(name, SymbolKind::Data, asm.dc, line_no, asm);
            }
            let mut inner = stmt.into_inner();
            let dims = inner.nth(1).unwrap();
            let mut dim_pairs = dims.into_inner();
            let rows = process_int(&dim_pairs.next().unwrap(), DATA_MIN, DATA_MAX);
            let cols = process_int(&dim_pairs.next().unwrap(), DATA_MIN, DATA_MAX);
            let (rows, cols) = match (rows, cols) {
                (Ok(rows), Ok(cols)) => (rows, cols),
                (rows, cols) => {
                    for err in rows.err().into_iter().chain(cols.err()) {
                        asm.diags.error(line_no, err);
                    }
                    return;
                }
            };
            if rows <= 0 || cols <= 0 {
                asm.diags.error(line_no, ErrorKind::BadMatrixDimensions);
                return;
            }
            let cells = rows as usize * cols as usize;
            if cells > usize::from(u16::max_value()) - usize::from(asm.dc) {
                asm.diags.error(line_no, ErrorKind::BadMatrixDimensions);
                return;
            }

            let mut given = 0;
            if let Some(list) = inner.next() {
                for int_pair in list.into_inner() {
                    given += 1;
                    match process_int(&int_pair, DATA_MIN, DATA_MAX) {
                        Ok(value) if given <= cells => push_data(asm, data_word(value)),
                        Ok(_) => {}
                        Err(kind) => asm.diags.error(line_no, kind),
                    }
                }
            }
            if given > cells {
                asm.diags
                    .error(line_no, ErrorKind::MatrixInitializerOverflow { cells, given });
            }
            // Unspecified trailing cells are reserved as explicit zeros.
            for _ in given.min(cells)..cells {
                push_data(asm, 0);
            }
        }

        Rule::extern_stmt => {
            if label.is_some() {
                asm.diags.warning(line_no, ErrorKind::LabelIgnored(".extern"));
            }
            let ident = stmt.into_inner().nth(1).unwrap();
            match process_symbol(&ident) {
                Ok(name) => match asm.symbols.lookup(name) {
                    // Repeating an .extern declaration is harmless.
                    Some(sym) if sym.kind == SymbolKind::External => {}
                    Some(_) => asm
                        .diags
                        .error(line_no, ErrorKind::DuplicateSymbol(name.to_owned())),
                    None => define(name, SymbolKind::External, 0, line_no, asm),
                },
                Err(kind) => asm.diags.error(line_no, kind),
            }
        }

        Rule::entry_stmt => {
            if label.is_some() {
                asm.diags.warning(line_no, ErrorKind::LabelIgnored(".entry"));
            }
            // Resolution happens in the second pass; only the syntax counts
            // here.
            let ident = stmt.into_inner().nth(1).unwrap();
            if let Err(kind) = process_symbol(&ident) {
                asm.diags.error(line_no, kind);
            }
        }

        Rule::instruction => handle_instruction(stmt, label, line_no, asm),

        _ => unreachable!(),
    }
}

fn mode_of(pair: &Pair<Rule>) -> AddressingMode {
    match pair.as_rule() {
        Rule::immediate => AddressingMode::Immediate,
        Rule::identifier => AddressingMode::Direct,
        Rule::matrix => AddressingMode::Matrix,
        Rule::register => AddressingMode::Register,
        _ => unreachable!(),
    }
}

enum Slot {
    Source,
    Target,
}

fn encode_operand(
    order: &mut Order,
    pair: Pair<Rule>,
    slot: Slot,
    line_no: u32,
    diags: &mut Diagnostics,
) {
    match pair.as_rule() {
        Rule::immediate => {
            let int_pair = pair.into_inner().next().unwrap();
            match process_int(&int_pair, IMMEDIATE_MIN, IMMEDIATE_MAX) {
                Ok(value) => {
                    order.push_word(make_immediate_word(value));
                }
                Err(kind) => {
                    diags.error(line_no, kind);
                    order.push_word(0);
                }
            }
        }
        Rule::register => {
            let register = process_register(&pair);
            let word = match slot {
                Slot::Source => make_source_register_word(register),
                Slot::Target => make_target_register_word(register),
            };
            order.push_word(word);
        }
        Rule::identifier => match process_symbol(&pair) {
            Ok(name) => order.push_reference(name),
            Err(kind) => {
                diags.error(line_no, kind);
                order.push_word(0);
            }
        },
        Rule::matrix => {
            let mut inner = pair.into_inner();
            let ident = inner.next().unwrap();
            let row = process_register(&inner.next().unwrap());
            let col = process_register(&inner.next().unwrap());
            match process_symbol(&ident) {
                Ok(name) => order.push_reference(name),
                Err(kind) => {
                    diags.error(line_no, kind);
                    order.push_word(0);
                }
            }
            order.push_word(make_register_pair_word(row, col));
        }
        _ => unreachable!(),
    }
}

fn handle_instruction(stmt: Pair<Rule>, label: Option<String>, line_no: u32, asm: &mut Assembly) {
    debug_assert_matches!(stmt.as_rule(), Rule::instruction);

    if let Some(name) = &label {
        define(name, SymbolKind::Code, asm.ic, line_no, asm);
    }

    let mut inner = stmt.into_inner();
    let mnemonic_pair = inner.next().unwrap();
    let mnemonic = mnemonic_pair.as_str();
    let opcode: Opcode = match mnemonic.parse() {
        Ok(opcode) => opcode,
        Err(_) => {
            asm.diags
                .error(line_no, ErrorKind::UnknownMnemonic(mnemonic.to_owned()));
            return;
        }
    };

    let operand_pairs: Vec<Pair<Rule>> = inner
        .next()
        .map(|ops| ops.into_inner().collect())
        .unwrap_or_default();
    let expected = operand_count(opcode);
    if operand_pairs.len() != expected {
        asm.diags.error(
            line_no,
            ErrorKind::OperandCount {
                mnemonic: mnemonic.to_owned(),
                expected,
                found: operand_pairs.len(),
            },
        );
        return;
    }

    let mut operands = operand_pairs
        .into_iter()
        .map(|p| p.into_inner().next().unwrap());
    let (src, dst) = match expected {
        2 => (operands.next(), operands.next()),
        1 => (None, operands.next()),
        _ => (None, None),
    };
    let src_mode = src.as_ref().map(mode_of);
    let dst_mode = dst.as_ref().map(mode_of);

    if let Err(kind) = check_modes(opcode, src_mode, dst_mode) {
        asm.diags.error(line_no, kind);
        return;
    }

    let count = word_count(src_mode, dst_mode);
    let mut order = Order::new(line_no, asm.ic, opcode, src_mode, dst_mode, count);
    order.push_word(make_instruction_word(opcode, src_mode, dst_mode));

    if let (Some(AddressingMode::Register), Some(AddressingMode::Register)) = (src_mode, dst_mode)
    {
        // Two register operands share one trailing word.
        let rs = process_register(&src.unwrap());
        let rd = process_register(&dst.unwrap());
        order.push_word(make_register_pair_word(rs, rd));
    } else {
        if let Some(pair) = src {
            encode_operand(&mut order, pair, Slot::Source, line_no, &mut asm.diags);
        }
        if let Some(pair) = dst {
            encode_operand(&mut order, pair, Slot::Target, line_no, &mut asm.diags);
        }
    }

    debug_assert_eq!(order.words.len(), count);
    asm.ic += count as Address;
    asm.orders.push(order);
}
