//! The second pass. Only runs on a clean first pass. Promotes `.entry`
//! symbols, then resolves every pending symbol reference left on the orders,
//! recording a use-site for each external reference at the address of the
//! word that carries it.

use crate::diag::ErrorKind;
use crate::parser::{parse_line, Rule};
use crate::symbols::SymbolKind;
use crate::Assembly;
use tencpu::{make_reference_word, Are};

pub fn second_pass(source: &str, asm: &mut Assembly) {
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        // The first pass already diagnosed anything unparseable.
        let parsed = match parse_line(line) {
            Ok(pair) => pair,
            Err(_) => continue,
        };

        let statement = parsed
            .into_inner()
            .find(|item| item.as_rule() == Rule::statement)
            .map(|item| item.into_inner().next().unwrap());
        let entry = match statement {
            Some(stmt) if stmt.as_rule() == Rule::entry_stmt => stmt,
            _ => continue,
        };

        let name = entry.into_inner().nth(1).unwrap().as_str();
        match asm.symbols.lookup_mut(name) {
            None => asm
                .diags
                .error(line_no, ErrorKind::EntryUndefined(name.to_owned())),
            Some(symbol) if symbol.kind == SymbolKind::External => asm
                .diags
                .error(line_no, ErrorKind::EntryExternal(name.to_owned())),
            Some(symbol) => symbol.kind = SymbolKind::Entry,
        }
    }

    let Assembly {
        orders,
        symbols,
        externals,
        diags,
        ..
    } = asm;

    for order in orders.iter_mut() {
        for pending in &order.pending {
            match symbols.lookup(&pending.name) {
                None => diags.error(
                    order.line,
                    ErrorKind::UndefinedSymbol(pending.name.clone()),
                ),
                Some(symbol) if symbol.kind == SymbolKind::External => {
                    let word = &mut order.words[pending.word_index];
                    word.bits = make_reference_word(0, Are::External);
                    externals.push((pending.name.clone(), word.address));
                }
                Some(symbol) => {
                    order.words[pending.word_index].bits =
                        make_reference_word(symbol.value, Are::Relocatable);
                }
            }
        }
    }
}
