#![no_std]
#![deny(clippy::alloc_instead_of_core)]
#![deny(clippy::allow_attributes_without_reason)]
#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::equatable_if_let)]
#![deny(clippy::filter_map_next)]
#![deny(clippy::flat_map_option)]
#![deny(clippy::map_unwrap_or)]
#![deny(clippy::missing_panics_doc)]
#![deny(clippy::option_if_let_else)]
#![deny(clippy::panic)]
#![deny(clippy::std_instead_of_alloc)]
#![deny(clippy::std_instead_of_core)]
#![deny(clippy::todo)]
#![deny(clippy::wildcard_enum_match_arm)]
#![deny(clippy::wildcard_imports)]
#![deny(macro_use_extern_crate)]
#![deny(unused_crate_dependencies)]
#![deny(unused_extern_crates)]
#![deny(unused_lifetimes)]
#![deny(unused_qualifications)]

//! Parsing for tab-delimited tables in the excel-tab dialect: tab separated fields, optionally
//! enclosed in double quotes, with `""` standing for a literal quote inside a quoted field.

pub mod lex;
use core::{fmt, iter::Peekable};

use lex::{lex, Lexer, TokenKind};

extern crate alloc;
use alloc::{borrow::Cow, string::String, vec::Vec};

pub type Field<'a> = Cow<'a, str>;

#[derive(Debug, PartialEq, Eq)]
pub struct Record<'a> {
    // the position of the first character of the record
    pub pos: usize,
    pub fields: Vec<Field<'a>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ParseError {
    pub pos: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    // the position of the error is the position of the opening quote
    UnterminatedQuote,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnterminatedQuote => f.write_str("unterminated quoted field"),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.pos)
    }
}

/// Returns the 1-based line and column of the byte offset `pos` within `input`.
pub fn location(input: &str, pos: usize) -> (usize, usize) {
    let before = input.get(..pos).unwrap_or(input);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map_or(before, |i| &before[i + 1..])
        .chars()
        .count()
        + 1;
    (line, column)
}

#[derive(Default)]
enum FieldBuf<'a> {
    #[default]
    Empty,
    Borrowed(&'a str),
    Owned(String),
}

impl<'a> FieldBuf<'a> {
    fn push(&mut self, s: &'a str) {
        *self = match core::mem::take(self) {
            FieldBuf::Empty => FieldBuf::Borrowed(s),
            FieldBuf::Borrowed(b) => {
                let mut o = String::with_capacity(b.len() + s.len());
                o.push_str(b);
                o.push_str(s);
                FieldBuf::Owned(o)
            }
            FieldBuf::Owned(mut o) => {
                o.push_str(s);
                FieldBuf::Owned(o)
            }
        }
    }

    fn take(&mut self) -> Field<'a> {
        match core::mem::take(self) {
            FieldBuf::Empty => Cow::Borrowed(""),
            FieldBuf::Borrowed(b) => Cow::Borrowed(b),
            FieldBuf::Owned(o) => Cow::Owned(o),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    StartField,
    Unquoted,
    Quoted,
    // just saw a quote while inside a quoted field, it either closes the field or is the first
    // half of an escaped quote
    QuoteInQuoted,
}

/// A lazy iterator over the records of a table, see [`records`].
pub struct Records<'a> {
    tokens: Peekable<Lexer<'a>>,
    failed: bool,
}

/// Parses records one at a time, so that callers can act on earlier records before a later
/// malformed one is reached. Once an error has been returned the iterator yields nothing more.
pub fn records(input: &str) -> Records<'_> {
    Records {
        tokens: lex(input).peekable(),
        failed: false,
    }
}

/// Parses the whole input, returning the first error if there is one.
pub fn parse(input: &str) -> Result<Vec<Record<'_>>, ParseError> {
    records(input).collect()
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<Record<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let pos = self.tokens.peek()?.pos;
        let mut fields = Vec::new();
        let mut field = FieldBuf::default();
        let mut state = State::StartField;
        let mut quote_pos = pos;

        while let Some(t) = self.tokens.next() {
            match t.kind {
                TokenKind::Tab => {
                    if state == State::Quoted {
                        field.push("\t");
                    } else {
                        fields.push(field.take());
                        state = State::StartField;
                    }
                }
                TokenKind::Newline => {
                    if state == State::Quoted {
                        field.push("\n");
                    } else {
                        // a blank line is a record with no fields
                        if !(state == State::StartField && fields.is_empty()) {
                            fields.push(field.take());
                        }
                        return Some(Ok(Record { pos, fields }));
                    }
                }
                TokenKind::Quote => match state {
                    State::StartField => {
                        quote_pos = t.pos;
                        state = State::Quoted;
                    }
                    State::Unquoted => field.push("\""),
                    State::Quoted => state = State::QuoteInQuoted,
                    State::QuoteInQuoted => {
                        field.push("\"");
                        state = State::Quoted;
                    }
                },
                TokenKind::Text(s) => {
                    field.push(s);
                    if state != State::Quoted {
                        state = State::Unquoted;
                    }
                }
            }
        }

        if state == State::Quoted {
            self.failed = true;
            return Some(Err(ParseError {
                pos: quote_pos,
                kind: ParseErrorKind::UnterminatedQuote,
            }));
        }

        fields.push(field.take());
        Some(Ok(Record { pos, fields }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::{borrow::ToOwned, vec};
    use pretty_assertions::assert_eq;

    macro_rules! fields_test {
        ($s:expr $(, [$($f:expr),* $(,)?])* $(,)?) => {{
            let expected: Vec<Vec<Field>> = vec![$(vec![$(Cow::<str>::from($f)),*]),*];
            assert_eq!(
                parse($s)
                    .unwrap()
                    .into_iter()
                    .map(|r| r.fields)
                    .collect::<Vec<_>>(),
                expected
            )
        }};
    }

    macro_rules! parse_err_test {
        ($s:expr, $e:expr) => {
            assert_eq!(parse($s).unwrap_err(), $e)
        };
    }

    #[test]
    fn basic() {
        fields_test!(
            "00\tADD\textra\n01\tADD\n",
            ["00", "ADD", "extra"],
            ["01", "ADD"],
        );
    }

    #[test]
    fn positions() {
        assert_eq!(
            parse("00\tADD\nGRP1/0\tADD\n").unwrap(),
            vec![
                Record {
                    pos: 0,
                    fields: vec![Cow::Borrowed("00"), Cow::Borrowed("ADD")]
                },
                Record {
                    pos: 7,
                    fields: vec![Cow::Borrowed("GRP1/0"), Cow::Borrowed("ADD")]
                },
            ]
        );
    }

    #[test]
    fn no_trailing_newline() {
        fields_test!("00\tADD", ["00", "ADD"]);
        fields_test!("00\t", ["00", ""]);
    }

    #[test]
    fn blank_lines() {
        fields_test!("\n00\tADD\n\n", [], ["00", "ADD"], []);
        fields_test!("\t\n", ["", ""]);
    }

    #[test]
    fn empty() {
        fields_test!("");
    }

    #[test]
    fn line_endings() {
        fields_test!("00\tADD\r\n01\tOR\r02\tAND", ["00", "ADD"], ["01", "OR"], ["02", "AND"]);
    }

    #[test]
    fn quoted() {
        fields_test!("\"00\"\t\"ADD\"\n", ["00", "ADD"]);
        fields_test!("\"\"\tx\n", ["", "x"]);
        fields_test!("\"a\tb\"\tc\n", ["a\tb", "c"]);
        fields_test!("\"a\r\nb\"\tc\n", ["a\nb", "c"]);
    }

    #[test]
    fn escaped_quotes() {
        fields_test!("\"say \"\"hi\"\"\"\tx", ["say \"hi\"", "x"]);
        fields_test!("\"\"\"\"", ["\""]);
    }

    #[test]
    fn quote_not_at_field_start() {
        fields_test!("a\"b\tc\"", ["a\"b", "c\""]);
    }

    #[test]
    fn text_after_closing_quote() {
        fields_test!("\"ab\"cd\te", ["abcd", "e"]);
        fields_test!("\"ab\"c\"d\te", ["abc\"d", "e"]);
    }

    #[test]
    fn borrows_when_possible() {
        let records = parse("\"ADD\"\tA\"B\t\"a\"\"b\"").unwrap();
        assert!(matches!(records[0].fields[0], Cow::Borrowed("ADD")));
        assert!(matches!(records[0].fields[1], Cow::Owned(_)));
        assert_eq!(records[0].fields[2], "a\"b".to_owned());
    }

    #[test]
    fn unterminated_quote() {
        parse_err_test!(
            "00\tADD\n01\t\"OR\n",
            ParseError {
                pos: 10,
                kind: ParseErrorKind::UnterminatedQuote
            }
        );
        parse_err_test!(
            "\"",
            ParseError {
                pos: 0,
                kind: ParseErrorKind::UnterminatedQuote
            }
        );
    }

    #[test]
    fn records_before_error() {
        let mut r = records("00\tADD\n01\t\"OR\n02\tAND\n");
        assert_eq!(
            r.next(),
            Some(Ok(Record {
                pos: 0,
                fields: vec![Cow::Borrowed("00"), Cow::Borrowed("ADD")]
            }))
        );
        assert_eq!(
            r.next(),
            Some(Err(ParseError {
                pos: 10,
                kind: ParseErrorKind::UnterminatedQuote
            }))
        );
        assert_eq!(r.next(), None);
    }

    #[test]
    fn locations() {
        let input = "00\tADD\n01\t\"OR\n";
        assert_eq!(location(input, 0), (1, 1));
        assert_eq!(location(input, 10), (2, 4));
        assert_eq!(location(input, input.len()), (3, 1));
    }

    #[test]
    fn display() {
        assert_eq!(
            alloc::format!(
                "{}",
                ParseError {
                    pos: 10,
                    kind: ParseErrorKind::UnterminatedQuote
                }
            ),
            "unterminated quoted field at byte 10"
        );
    }
}
