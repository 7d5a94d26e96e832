//! Hierarchical rename-mapping data model and codec.
//!
//! A mapping file is tab-indented text naming classes, fields, and methods
//! from an obfuscated to a human-readable identifier scheme:
//!
//! ```text
//! CLASS <obf> [<mapped>]
//! \tFIELD <obf> [<mapped>] <descriptor>
//! \tMETHOD <obf> [<mapped>] <descriptor>
//! \t\tARG <index> <name>
//! \tCOMMENT <text>
//! ```
//!
//! Nesting is expressed by relative tab depth. The parser invokes a
//! translation hook once per CLASS/FIELD/METHOD definition, so a single pass
//! both parses and re-namespaces a file; the writer emits the tree back in a
//! deterministic order.

mod parser;
mod writer;


pub use parser::{parse_lines, ParseError, Parsed};
pub use writer::export;

use std::collections::BTreeMap;

/// Fields shared by every mapping entry kind: the obfuscated identity (the
/// stable ordering key, preserved across translation), the translated name
/// (empty when the entry is untranslated), and accumulated comment lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryInfo {
    pub obfuscated: String,
    pub mapped: String,
    pub comment: Vec<String>,
}

impl EntryInfo {
    pub fn named(obfuscated: impl Into<String>, mapped: impl Into<String>) -> Self {
        EntryInfo {
            obfuscated: obfuscated.into(),
            mapped: mapped.into(),
            comment: Vec::new(),
        }
    }
}

/// A class scope: its own identity plus its members and nested classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassEntry {
    pub info: EntryInfo,
    pub fields: Vec<FieldEntry>,
    pub methods: Vec<MethodEntry>,
    pub classes: Vec<ClassEntry>,
}

/// A field definition with its type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    pub info: EntryInfo,
    pub descriptor: String,
}

/// A method definition with its descriptor and parameter table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodEntry {
    pub info: EntryInfo,
    pub descriptor: String,
    /// Parameter index to name/comment; BTreeMap keeps export order stable.
    pub args: BTreeMap<u32, Parameter>,
}

/// A method parameter: its name and optional comment lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub comment: Vec<String>,
}

/// A whole mapping file: one top-level class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingFile {
    pub root: ClassEntry,
}

impl MappingFile {
    /// Render the file to its textual form.
    pub fn export(&self) -> String {
        export(self)
    }
}
