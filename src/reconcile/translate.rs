//! Definition tables and changed-line translation.
//!
//! While the codec parses a pre- or post-image, a recording wrapper around
//! the oracle captures every definition query it makes, keyed by the
//! identity and its enclosing scope chain. Changed diff lines are then
//! re-expressed in the target namespace by looking their definition up in
//! the matching table; an identity the oracle could not resolve cannot be
//! safely re-emitted into a hunk, so here a miss is fatal.

use crate::error::{PortError, Result};
use crate::oracle::{MemberKind, Oracle, Translation};
use crate::tree::{line_depth, IndentTree};
use std::cell::RefCell;
use std::collections::HashMap;

/// Key of one structural definition: identity plus its enclosing scope chain
/// (joined with `$`), and the descriptor for signature-bearing kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DefKey {
    scope: String,
    kind: MemberKind,
    identity: String,
    descriptor: Option<String>,
}

/// Every definition the codec saw in one image, with the oracle's answer
/// (`None` when the oracle had no translation).
#[derive(Debug, Default)]
pub struct DefinitionTable {
    entries: HashMap<DefKey, Option<Translation>>,
}

impl DefinitionTable {
    fn lookup(
        &self,
        scope: &str,
        kind: MemberKind,
        identity: &str,
        descriptor: Option<&str>,
    ) -> Option<&Option<Translation>> {
        self.entries.get(&DefKey {
            scope: scope.to_string(),
            kind,
            identity: identity.to_string(),
            descriptor: descriptor.map(str::to_string),
        })
    }
}

/// Oracle wrapper that records every query and its outcome.
pub struct RecordingOracle<'a> {
    inner: &'a dyn Oracle,
    table: RefCell<DefinitionTable>,
}

impl<'a> RecordingOracle<'a> {
    pub fn new(inner: &'a dyn Oracle) -> Self {
        RecordingOracle {
            inner,
            table: RefCell::new(DefinitionTable::default()),
        }
    }

    pub fn into_table(self) -> DefinitionTable {
        self.table.into_inner()
    }
}

impl Oracle for RecordingOracle<'_> {
    fn resolve(
        &self,
        scope: &[String],
        kind: MemberKind,
        obfuscated: &str,
        descriptor: Option<&str>,
    ) -> Option<Translation> {
        let result = self.inner.resolve(scope, kind, obfuscated, descriptor);
        self.table.borrow_mut().entries.insert(
            DefKey {
                scope: scope.join("$"),
                kind,
                identity: obfuscated.to_string(),
                descriptor: descriptor.map(str::to_string),
            },
            result.clone(),
        );
        result
    }
}

/// Re-express one changed line in the target namespace.
///
/// COMMENT and ARG lines are untranslatable leaf content and pass through
/// verbatim. Definition lines are rebuilt from the table entry recorded when
/// the surrounding image was parsed; the enclosing scope chain comes from the
/// indentation tree over that image.
pub fn translate_line(
    index: usize,
    lines: &[String],
    tree: &IndentTree,
    table: &DefinitionTable,
) -> Result<String> {
    let line = lines.get(index).ok_or_else(|| PortError::Reconcile {
        line: String::new(),
        message: format!(
            "hunk addresses line {} but the file has {} lines; was the patch generated from this revision?",
            index + 1,
            lines.len()
        ),
    })?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let keyword = tokens.first().copied().unwrap_or("");

    if keyword == "COMMENT" || keyword == "ARG" {
        return Ok(line.clone());
    }

    let kind = match keyword {
        "CLASS" => MemberKind::Class,
        "FIELD" => MemberKind::Field,
        "METHOD" => MemberKind::Method,
        _ => {
            return Err(PortError::Reconcile {
                line: line.clone(),
                message: format!("unexpected keyword `{}` on a changed line", keyword),
            });
        }
    };

    if tokens.len() < 2 || (kind != MemberKind::Class && tokens.len() < 3) {
        return Err(PortError::Reconcile {
            line: line.clone(),
            message: "truncated definition line".to_string(),
        });
    }

    let identity = tokens[1];
    let descriptor = match kind {
        MemberKind::Class => None,
        // The descriptor is the last token whether or not a mapped name is
        // present between it and the identity.
        _ => Some(tokens[tokens.len() - 1]),
    };

    // Enclosing class chain, outermost first.
    let scope: Vec<&str> = tree
        .ancestors(index)
        .into_iter()
        .filter_map(|ancestor| {
            let mut parts = lines[ancestor].split_whitespace();
            match parts.next() {
                Some("CLASS") => parts.next(),
                _ => None,
            }
        })
        .collect();
    let scope_key = scope.join("$");

    let entry = table
        .lookup(&scope_key, kind, identity, descriptor)
        .ok_or_else(|| PortError::Reconcile {
            line: line.clone(),
            message: format!(
                "definition `{}` in scope `{}` was not seen while parsing the image",
                identity, scope_key
            ),
        })?;

    let translation = entry.as_ref().ok_or_else(|| PortError::TranslationMiss {
        kind: kind.keyword().to_string(),
        identity: identity.to_string(),
        scope: scope_key.clone(),
    })?;

    // Rebuild the line exactly as the writer renders the translated entry.
    let mut out = String::new();
    for _ in 0..line_depth(line) {
        out.push('\t');
    }
    out.push_str(keyword);
    out.push(' ');
    out.push_str(identity);
    if !translation.name.is_empty() {
        out.push(' ');
        out.push_str(&translation.name);
    }
    if let Some(descriptor) = descriptor {
        out.push(' ');
        out.push_str(translation.descriptor.as_deref().unwrap_or(descriptor));
    }
    Ok(out)
}
