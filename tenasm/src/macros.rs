//! The macro layer. Runs over the raw source before either pass and expands
//! it textually:
//!
//! ```text
//! mcro NAME
//!     ...body lines...
//! mcroend
//! ```
//!
//! captures a body; any later line whose first token (after an optional
//! label) is `NAME` is replaced by the body. Everything else streams through
//! verbatim. The macro table dies with the call; nothing of it survives into
//! the passes.

use std::collections::HashMap;

use crate::diag::{Diagnostics, ErrorKind};
use tencpu::constants::MAX_SYMBOL_LENGTH;
use tencpu::Opcode;

const MCRO: &str = "mcro";
const MCRO_END: &str = "mcroend";

const DIRECTIVES: [&str; 5] = [".data", ".string", ".mat", ".extern", ".entry"];

fn is_legal_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
        _ => false,
    }
}

/// A macro may not shadow anything the translator would recognize.
fn is_legal_macro_name(name: &str) -> bool {
    is_legal_symbol(name)
        && name.len() <= MAX_SYMBOL_LENGTH
        && name.parse::<Opcode>().is_err()
        && !DIRECTIVES.contains(&name)
}

/// Splits an invocation line into its optional `NAME:` label and the first
/// token after it.
fn invocation_parts(line: &str) -> (Option<&str>, Option<&str>) {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some(first) if first.ends_with(':') => (Some(first), tokens.next()),
        first => (None, first),
    }
}

/// Expands the macro layer. The expanded stream is returned even when
/// diagnostics carry errors, so the caller can still write the preprocessed
/// file before deciding to stop.
pub fn preprocess(source: &str) -> (String, Diagnostics) {
    let mut diags = Diagnostics::new();
    let mut table: HashMap<String, Vec<String>> = HashMap::new();
    let mut current: Option<(String, Vec<String>, u32)> = None;
    let mut out = String::new();

    for (idx, line) in source.lines().enumerate() {
        let line_no = idx as u32 + 1;
        let trimmed = line.trim_start();
        let first_token = trimmed.split_whitespace().next().unwrap_or("");

        if first_token == MCRO {
            if current.is_some() {
                diags.error(line_no, ErrorKind::NestedMacro);
                continue;
            }
            let rest = trimmed[MCRO.len()..].trim_start();
            let name = rest.split_whitespace().next().unwrap_or("");
            if !is_legal_macro_name(name) {
                diags.error(line_no, ErrorKind::BadMacroName(name.to_owned()));
            }
            if rest[name.len()..].trim_start() != "" {
                diags.error(line_no, ErrorKind::MacroTrailingText(MCRO));
            }
            // Open the definition even on a bad name so the body lines do
            // not leak into the output.
            current = Some((name.to_owned(), Vec::new(), line_no));
        } else if first_token == MCRO_END {
            match current.take() {
                None => diags.error(line_no, ErrorKind::UnmatchedMacroEnd),
                Some((name, body, _)) => {
                    if trimmed[MCRO_END.len()..].trim_start() != "" {
                        diags.error(line_no, ErrorKind::MacroTrailingText(MCRO_END));
                    }
                    table.insert(name, body);
                }
            }
        } else if let Some((_, body, _)) = current.as_mut() {
            body.push(line.to_owned());
        } else {
            let (label, callee) = invocation_parts(line);
            match callee.and_then(|name| table.get(name)) {
                Some(body) => {
                    if let Some(label) = label {
                        out.push_str(label);
                        out.push('\n');
                    }
                    for body_line in body {
                        out.push_str(body_line);
                        out.push('\n');
                    }
                }
                None => {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
    }

    if let Some((_, _, line_no)) = current {
        diags.error(line_no, ErrorKind::UnterminatedMacro);
    }

    (out, diags)
}

#[cfg(test)]
mod test {
    use super::*;

    fn expand_clean(source: &str) -> String {
        let (out, diags) = preprocess(source);
        assert!(!diags.has_errors(), "{:?}", diags);
        out
    }

    #[test]
    fn passthrough_without_macros() {
        let source = "MAIN: mov r1, r2\nstop\n";
        assert_eq!(expand_clean(source), source);
    }

    #[test]
    fn definition_and_invocation() {
        let out = expand_clean(
            "mcro TWO\ninc r1\ninc r1\nmcroend\nTWO\nstop\n",
        );
        assert_eq!(out, "inc r1\ninc r1\nstop\n");
    }

    #[test]
    fn labelled_invocation_keeps_the_label() {
        let out = expand_clean(
            "mcro TWO\ninc r1\ninc r1\nmcroend\nSTART: TWO\nstop\n",
        );
        assert_eq!(out, "START:\ninc r1\ninc r1\nstop\n");
    }

    #[test]
    fn body_is_captured_verbatim() {
        let out = expand_clean(
            "mcro M\n    mov  r1,  r2 ; keep me\nmcroend\nM\n",
        );
        assert_eq!(out, "    mov  r1,  r2 ; keep me\n");
    }

    #[test]
    fn reserved_names_are_rejected() {
        let (_, diags) = preprocess("mcro mov\nmcroend\n");
        assert!(diags.has_errors());

        let (_, diags) = preprocess("mcro .data\nmcroend\n");
        assert!(diags.has_errors());

        let (_, diags) = preprocess("mcro 2FAST\nmcroend\n");
        assert!(diags.has_errors());
    }

    #[test]
    fn nested_definition_is_an_error() {
        let (_, diags) = preprocess("mcro A\nmcro B\nmcroend\nmcroend\n");
        assert!(diags
            .iter()
            .any(|d| d.kind == ErrorKind::NestedMacro));
    }

    #[test]
    fn stray_mcroend_is_an_error() {
        let (_, diags) = preprocess("mcroend\n");
        assert!(diags
            .iter()
            .any(|d| d.kind == ErrorKind::UnmatchedMacroEnd));
    }

    #[test]
    fn trailing_text_is_an_error() {
        let (_, diags) = preprocess("mcro M extra\nmcroend\n");
        assert!(diags
            .iter()
            .any(|d| d.kind == ErrorKind::MacroTrailingText("mcro")));

        let (_, diags) = preprocess("mcro M\nmcroend extra\n");
        assert!(diags
            .iter()
            .any(|d| d.kind == ErrorKind::MacroTrailingText("mcroend")));
    }

    #[test]
    fn unterminated_definition_is_an_error() {
        let (out, diags) = preprocess("mcro M\ninc r1\n");
        assert!(diags
            .iter()
            .any(|d| d.kind == ErrorKind::UnterminatedMacro));
        assert_eq!(out, "");
    }

    #[test]
    fn output_is_produced_even_on_error() {
        let (out, diags) = preprocess("mcroend\nstop\n");
        assert!(diags.has_errors());
        assert_eq!(out, "stop\n");
    }
}
