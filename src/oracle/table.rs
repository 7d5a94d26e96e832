//! Translation table backed by a pre-merged mapping file.
//!
//! The table file carries one record per line, tab-separated:
//!
//! ```text
//! c\t<class-a>\t<class-b>
//! f\t<owner-a>\t<name-a>\t<name-b>
//! m\t<owner-a>\t<name-a>\t<descriptor-a>\t<name-b>
//! ```
//!
//! Class names are fully scoped in both namespaces, with nested classes
//! joined by `$` (e.g. `net/foo/Bar$Baz`). Field and method owners refer to
//! the input namespace. Lines starting with `#` and blank lines are ignored.
//!
//! Descriptors are translated structurally: every `L<class>;` reference is
//! rewritten through the class map; unknown references pass through
//! unchanged, so a partially-populated table still produces usable output.

use super::{MemberKind, Oracle, Translation};
use crate::error::{PortError, Result};
use std::collections::HashMap;
use std::path::Path;

/// In-memory translation table between two namespaces.
#[derive(Debug, Default)]
pub struct TranslationTable {
    classes: HashMap<String, String>,
    fields: HashMap<(String, String), String>,
    methods: HashMap<(String, String, String), String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| PortError::io(path, e))?;
        Self::parse(&content)
            .map_err(|msg| PortError::User(format!("invalid table file '{}': {}", path.display(), msg)))
    }

    /// Parse a table from its textual form.
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut table = Self::new();
        for (number, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            match fields.as_slice() {
                ["c", from, to] => table.add_class(from, to),
                ["f", owner, from, to] => table.add_field(owner, from, to),
                ["m", owner, from, desc, to] => table.add_method(owner, from, desc, to),
                _ => {
                    return Err(format!("malformed record on line {}: `{}`", number + 1, line));
                }
            }
        }
        Ok(table)
    }

    pub fn add_class(&mut self, from: &str, to: &str) {
        self.classes.insert(from.to_string(), to.to_string());
    }

    pub fn add_field(&mut self, owner: &str, from: &str, to: &str) {
        self.fields
            .insert((owner.to_string(), from.to_string()), to.to_string());
    }

    pub fn add_method(&mut self, owner: &str, from: &str, descriptor: &str, to: &str) {
        self.methods.insert(
            (owner.to_string(), from.to_string(), descriptor.to_string()),
            to.to_string(),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.fields.is_empty() && self.methods.is_empty()
    }

    /// Fully scoped input-namespace name for a class given its scope chain.
    fn scoped(scope: &[String], name: &str) -> String {
        if scope.is_empty() {
            name.to_string()
        } else {
            format!("{}${}", scope.join("$"), name)
        }
    }

    /// Rewrite every `L<class>;` reference in a descriptor through the class
    /// map. Primitives, arrays, and unknown class references pass through.
    fn translate_descriptor(&self, descriptor: &str) -> String {
        let mut out = String::with_capacity(descriptor.len());
        let bytes = descriptor.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'L' {
                if let Some(end) = descriptor[i..].find(';') {
                    let reference = &descriptor[i + 1..i + end];
                    match self.classes.get(reference) {
                        Some(translated) => {
                            out.push('L');
                            out.push_str(translated);
                            out.push(';');
                        }
                        None => out.push_str(&descriptor[i..i + end + 1]),
                    }
                    i += end + 1;
                    continue;
                }
            }
            out.push(bytes[i] as char);
            i += 1;
        }
        out
    }
}

impl Oracle for TranslationTable {
    fn resolve(
        &self,
        scope: &[String],
        kind: MemberKind,
        obfuscated: &str,
        descriptor: Option<&str>,
    ) -> Option<Translation> {
        match kind {
            MemberKind::Class => {
                let translated = self.classes.get(&Self::scoped(scope, obfuscated))?;
                // Nested definition lines carry only the inner-name segment.
                let name = match translated.rsplit_once('$') {
                    Some((_, inner)) if !scope.is_empty() => inner.to_string(),
                    _ => translated.clone(),
                };
                Some(Translation {
                    name,
                    descriptor: None,
                })
            }
            MemberKind::Field => {
                let owner = Self::scoped(&scope[..scope.len().saturating_sub(1)], scope.last()?);
                let name = self
                    .fields
                    .get(&(owner, obfuscated.to_string()))?
                    .clone();
                Some(Translation {
                    name,
                    descriptor: descriptor.map(|d| self.translate_descriptor(d)),
                })
            }
            MemberKind::Method => {
                let owner = Self::scoped(&scope[..scope.len().saturating_sub(1)], scope.last()?);
                let name = self
                    .methods
                    .get(&(owner, obfuscated.to_string(), descriptor?.to_string()))?
                    .clone();
                Some(Translation {
                    name,
                    descriptor: descriptor.map(|d| self.translate_descriptor(d)),
                })
            }
        }
    }
}
