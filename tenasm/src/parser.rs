//! The line grammar and the shared token-processing helpers. Parsing is
//! per-line: the passes hand each source line to [`parse_line`] and turn a
//! failure into a diagnostic via [`diagnose_parse_failure`], which inspects
//! the raw text to say something more useful than a bare grammar error
//! (comma faults in value lists, unterminated strings, unknown directives).

use pest::error::{Error as PestError, ErrorVariant};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::diag::{CommaFault, ErrorKind};
use tencpu::constants::{MAX_NUM_DIGITS, MAX_SYMBOL_LENGTH};
use tencpu::RegisterId;

#[derive(Parser)]
#[grammar = "tenasm.pest"]
pub struct AsmParser;

pub fn parse_line(text: &str) -> Result<Pair<Rule>, PestError<Rule>> {
    Ok(AsmParser::parse(Rule::line, text)?.next().unwrap())
}

/// Checks the digit-count limit and the given range on an `int` token.
pub fn process_int(pair: &Pair<Rule>, min: i16, max: i16) -> Result<i16, ErrorKind> {
    let text = pair.as_str();
    let digits = text.chars().filter(char::is_ascii_digit).count();
    if digits > MAX_NUM_DIGITS {
        return Err(ErrorKind::NumberTooLong(text.to_owned()));
    }
    // At most four digits, so this always fits an i16.
    let value: i16 = text
        .parse()
        .map_err(|_| ErrorKind::MalformedNumber(text.to_owned()))?;
    if value < min || value > max {
        return Err(ErrorKind::NumberOutOfRange {
            value: i32::from(value),
            min: i32::from(min),
            max: i32::from(max),
        });
    }
    Ok(value)
}

/// Checks the name-length limit on an `identifier` token.
pub fn process_symbol<'i>(pair: &Pair<'i, Rule>) -> Result<&'i str, ErrorKind> {
    let name = pair.as_str();
    if name.len() > MAX_SYMBOL_LENGTH {
        return Err(ErrorKind::SymbolTooLong(name.to_owned()));
    }
    Ok(name)
}

pub fn process_register(pair: &Pair<Rule>) -> RegisterId {
    match pair.as_str().parse() {
        Ok(register) => register,
        // The grammar only admits r0..r7.
        Err(_) => unreachable!(),
    }
}

/// Reproduces the four-way comma diagnosis of a numeric list, checked in
/// this order: leading, double, trailing, missing-between-values.
pub fn classify_commas(list: &str) -> Option<CommaFault> {
    let text = list.trim();
    if text.is_empty() {
        return None;
    }
    if text.starts_with(',') {
        return Some(CommaFault::Leading);
    }

    let mut last_was_comma = false;
    let mut any_comma = false;
    for ch in text.chars() {
        if ch == ',' {
            if last_was_comma {
                return Some(CommaFault::Double);
            }
            last_was_comma = true;
            any_comma = true;
        } else if ch != ' ' && ch != '\t' {
            last_was_comma = false;
        }
    }
    if last_was_comma && any_comma {
        return Some(CommaFault::Trailing);
    }

    for segment in text.split(',') {
        if segment.split_whitespace().count() > 1 {
            return Some(CommaFault::Missing);
        }
    }
    None
}

fn looks_like_number(token: &str) -> bool {
    let digits = token
        .strip_prefix('+')
        .or_else(|| token.strip_prefix('-'))
        .unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn strip_label(line: &str) -> &str {
    let text = line.trim_start();
    if let Some(idx) = text.find(':') {
        let head = &text[..idx];
        let mut chars = head.chars();
        let legal = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric())
            }
            _ => false,
        };
        if legal {
            return text[idx + 1..].trim_start();
        }
    }
    text
}

/// The statement body after a directive keyword, or `None` when the keyword
/// runs straight into more alphanumerics (`.data5` is not `.data`).
fn directive_rest<'a>(body: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() => None,
        _ => Some(rest),
    }
}

fn diagnose_list(rest: &str) -> ErrorKind {
    if let Some(fault) = classify_commas(rest) {
        return ErrorKind::CommaMisuse(fault);
    }
    for segment in rest.split(',') {
        let token = segment.trim();
        if !token.is_empty() && !looks_like_number(token) {
            return ErrorKind::MalformedNumber(token.to_owned());
        }
    }
    ErrorKind::Syntax("malformed value list".to_owned())
}

fn diagnose_string(rest: &str) -> ErrorKind {
    let text = rest.trim();
    if let Some(interior) = text.strip_prefix('"') {
        match interior.find('"') {
            None => ErrorKind::UnterminatedString,
            Some(idx) if interior[idx + 1..].trim().is_empty() => {
                ErrorKind::Syntax("malformed string directive".to_owned())
            }
            Some(_) => ErrorKind::Syntax("unexpected text after string literal".to_owned()),
        }
    } else {
        ErrorKind::Syntax("expected a string literal".to_owned())
    }
}

fn diagnose_mat(rest: &str) -> ErrorKind {
    match rest.rfind(']') {
        Some(idx) => {
            let list = &rest[idx + 1..];
            if let Some(fault) = classify_commas(list) {
                return ErrorKind::CommaMisuse(fault);
            }
            for segment in list.split(',') {
                let token = segment.trim();
                if !token.is_empty() && !looks_like_number(token) {
                    return ErrorKind::MalformedNumber(token.to_owned());
                }
            }
            ErrorKind::Syntax("malformed matrix declaration".to_owned())
        }
        None => ErrorKind::Syntax("malformed matrix declaration".to_owned()),
    }
}

fn rule_name(rule: Rule) -> &'static str {
    match rule {
        Rule::int => "a number",
        Rule::identifier => "a symbol",
        Rule::register => "a register",
        Rule::immediate => "an immediate value",
        Rule::matrix => "a matrix operand",
        Rule::operand | Rule::operands => "an operand",
        Rule::num_list => "a number list",
        Rule::string => "a string literal",
        Rule::dims => "matrix dimensions",
        Rule::label => "a label",
        Rule::statement | Rule::mnemonic | Rule::instruction => "a statement",
        Rule::EOI => "end of line",
        _ => "valid syntax",
    }
}

fn summarize(err: &PestError<Rule>) -> String {
    match &err.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            if positives.is_empty() {
                "unexpected input".to_owned()
            } else {
                let mut names: Vec<&str> = positives.iter().map(|r| rule_name(*r)).collect();
                names.dedup();
                format!("expected {}", names.join(" or "))
            }
        }
        ErrorVariant::CustomError { message } => message.clone(),
    }
}

/// Turns a failed line parse into the most specific diagnostic the raw text
/// supports.
pub fn diagnose_parse_failure(line: &str, err: &PestError<Rule>) -> ErrorKind {
    let mut body = strip_label(line);
    // A trailing comment never changes the diagnosis unless a string literal
    // might contain the semicolon.
    if !body.contains('"') {
        if let Some(idx) = body.find(';') {
            body = body[..idx].trim_end();
        }
    }

    if body.starts_with('.') {
        if let Some(rest) = directive_rest(body, ".data") {
            return diagnose_list(rest);
        }
        if let Some(rest) = directive_rest(body, ".string") {
            return diagnose_string(rest);
        }
        if let Some(rest) = directive_rest(body, ".mat") {
            return diagnose_mat(rest);
        }
        for keyword in &[".extern", ".entry"] {
            if let Some(rest) = directive_rest(body, keyword) {
                return if rest.split_whitespace().count() > 1 {
                    ErrorKind::Syntax(format!("unexpected text after {}", keyword))
                } else {
                    ErrorKind::Syntax("expected a symbol name".to_owned())
                };
            }
        }
        let token = body.split_whitespace().next().unwrap_or(".").to_owned();
        return ErrorKind::UnknownDirective(token);
    }

    ErrorKind::Syntax(summarize(err))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn comma_classification() {
        assert_eq!(classify_commas("1, 2, 3"), None);
        assert_eq!(classify_commas("  7  "), None);
        assert_eq!(classify_commas(",1, 2"), Some(CommaFault::Leading));
        assert_eq!(classify_commas("1, 2,"), Some(CommaFault::Trailing));
        assert_eq!(classify_commas("1,, 2"), Some(CommaFault::Double));
        assert_eq!(classify_commas("1 , , 2"), Some(CommaFault::Double));
        assert_eq!(classify_commas("1 2"), Some(CommaFault::Missing));
        assert_eq!(classify_commas("1, 2 3"), Some(CommaFault::Missing));
        assert_eq!(classify_commas(""), None);
    }

    #[test]
    fn data_line_diagnosis() {
        let err = parse_line(".data 1,,2").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".data 1,,2", &err),
            ErrorKind::CommaMisuse(CommaFault::Double)
        );

        let err = parse_line("X: .data ,1").unwrap_err();
        assert_eq!(
            diagnose_parse_failure("X: .data ,1", &err),
            ErrorKind::CommaMisuse(CommaFault::Leading)
        );

        let err = parse_line(".data 1, x").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".data 1, x", &err),
            ErrorKind::MalformedNumber("x".to_owned())
        );
    }

    #[test]
    fn string_line_diagnosis() {
        let err = parse_line(".string \"abc").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".string \"abc", &err),
            ErrorKind::UnterminatedString
        );

        let err = parse_line(".string \"abc\" x").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".string \"abc\" x", &err),
            ErrorKind::Syntax("unexpected text after string literal".to_owned())
        );
    }

    #[test]
    fn unknown_directive_diagnosis() {
        let err = parse_line(".float 1").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".float 1", &err),
            ErrorKind::UnknownDirective(".float".to_owned())
        );

        let err = parse_line(".data5 1").unwrap_err();
        assert_eq!(
            diagnose_parse_failure(".data5 1", &err),
            ErrorKind::UnknownDirective(".data5".to_owned())
        );
    }

    #[test]
    fn int_limits() {
        let pair = AsmParser::parse(Rule::int, "-512")
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(process_int(&pair, -512, 511), Ok(-512));

        let pair = AsmParser::parse(Rule::int, "512").unwrap().next().unwrap();
        assert_eq!(
            process_int(&pair, -512, 511),
            Err(ErrorKind::NumberOutOfRange {
                value: 512,
                min: -512,
                max: 511
            })
        );

        let pair = AsmParser::parse(Rule::int, "12345")
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(
            process_int(&pair, -512, 511),
            Err(ErrorKind::NumberTooLong("12345".to_owned()))
        );
    }
}
