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

use core::fmt::{self, Write};

extern crate alloc;
use alloc::{borrow::Cow, format, string::String, vec::Vec};
use hashbrown::HashMap;
use log::trace;
use optable_parser::{records, Field, ParseError, Record};

/// First fields starting with this prefix name a member of an opcode group rather than an opcode.
pub const GROUP_PREFIX: &str = "GRP";

#[derive(Debug, PartialEq, Eq)]
pub enum Row<'a> {
    Opcode(OpcodeEntry<'a>),
    Group {
        key: Field<'a>,
        mnemonic: Field<'a>,
    },
}

impl<'a> Row<'a> {
    /// Returns `None` for records with fewer than two fields. Fields after the second are ignored.
    pub fn classify(record: Record<'a>) -> Option<Self> {
        let mut fields = record.fields.into_iter();
        let (first, mnemonic) = (fields.next()?, fields.next()?);
        Some(if first.starts_with(GROUP_PREFIX) {
            Row::Group {
                key: group_key(first),
                mnemonic,
            }
        } else {
            Row::Opcode(OpcodeEntry {
                opcode: first,
                mnemonic,
            })
        })
    }
}

// drops the last two characters, whatever they are
fn group_key(field: Field<'_>) -> Field<'_> {
    let end = field
        .char_indices()
        .rev()
        .nth(1)
        .map_or(0, |(i, _)| i);
    match field {
        Cow::Borrowed(s) => Cow::Borrowed(&s[..end]),
        Cow::Owned(mut s) => {
            s.truncate(end);
            Cow::Owned(s)
        }
    }
}

/// A single `{ 0x<opcode>, "<mnemonic>" }` initializer. The opcode text is not validated.
#[derive(Debug, PartialEq, Eq)]
pub struct OpcodeEntry<'a> {
    pub opcode: Field<'a>,
    pub mnemonic: Field<'a>,
}

impl fmt::Display for OpcodeEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ 0x{}, \"{}\" }}", self.opcode, self.mnemonic)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Group<'a> {
    pub key: Field<'a>,
    // each mnemonic is stored already wrapped in double quotes
    pub mnemonics: Vec<String>,
}

impl fmt::Display for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "string[8] {} = {{ {} }};", self.key, self.mnemonics.join(", "))
    }
}

/// Groups in the order their keys were first seen.
#[derive(Default)]
pub struct GroupTable<'a> {
    groups: Vec<Group<'a>>,
    index: HashMap<Field<'a>, usize>,
}

impl<'a> GroupTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Field<'a>, mnemonic: &str) {
        let quoted = format!("\"{}\"", mnemonic);
        if let Some(&i) = self.index.get(&*key) {
            self.groups[i].mnemonics.push(quoted);
        } else {
            trace!("new group {}", key);
            self.index.insert(key.clone(), self.groups.len());
            self.groups.push(Group {
                key,
                mnemonics: alloc::vec![quoted],
            });
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Group<'a>> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

impl<'t, 'a> IntoIterator for &'t GroupTable<'a> {
    type Item = &'t Group<'a>;
    type IntoIter = core::slice::Iter<'t, Group<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for GroupTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.groups.iter().map(|g| (&g.key, &g.mnemonics)))
            .finish()
    }
}

/// Consumes records in table order. Opcode rows are handed straight back so they can be written
/// out immediately, group rows are collected until [`Generator::finish`].
#[derive(Default)]
pub struct Generator<'a> {
    groups: GroupTable<'a>,
    entries: usize,
}

impl<'a> Generator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, record: Record<'a>) -> Option<OpcodeEntry<'a>> {
        let pos = record.pos;
        match Row::classify(record) {
            None => {
                trace!("skipping record at byte {} with fewer than 2 fields", pos);
                None
            }
            Some(Row::Group { key, mnemonic }) => {
                self.groups.insert(key, &mnemonic);
                None
            }
            Some(Row::Opcode(entry)) => {
                self.entries += 1;
                Some(entry)
            }
        }
    }

    /// The number of opcode entries handed back so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn finish(self) -> GroupTable<'a> {
        self.groups
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum GenerateError {
    Parse(ParseError),
    Fmt(fmt::Error),
}

impl From<ParseError> for GenerateError {
    fn from(e: ParseError) -> Self {
        GenerateError::Parse(e)
    }
}

impl From<fmt::Error> for GenerateError {
    fn from(e: fmt::Error) -> Self {
        GenerateError::Fmt(e)
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::Parse(e) => write!(f, "parsing failed: {}", e),
            GenerateError::Fmt(e) => write!(f, "writing output failed: {}", e),
        }
    }
}

/// Counts of what [`generate`] wrote.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Summary {
    pub entries: usize,
    pub groups: usize,
}

/// Writes every opcode entry as it is reached, then one declaration per group, then a dump of the
/// group table. Lines written before a parse error are left in `out`.
pub fn generate<W: Write>(input: &str, out: &mut W) -> Result<Summary, GenerateError> {
    let mut generator = Generator::new();
    for record in records(input) {
        if let Some(entry) = generator.feed(record?) {
            writeln!(out, "{}", entry)?;
        }
    }
    let entries = generator.entries();
    let groups = generator.finish();
    for group in &groups {
        writeln!(out, "{}", group)?;
    }
    writeln!(out, "{:?}", groups)?;
    Ok(Summary {
        entries: entries,
        groups: groups.len(),
    })
}
