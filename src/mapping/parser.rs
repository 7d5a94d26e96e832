//! Recursive-descent parser for mapping files.
//!
//! The parser threads an explicit cursor through each recursive call and
//! keeps an explicit stack of enclosing class identities, so the translation
//! hook can disambiguate same-named entries in different scopes. A line at a
//! depth at or below the current class's own depth is left for the caller
//! (one-line lookahead, no consumed-then-unread state).

use super::{ClassEntry, EntryInfo, FieldEntry, MappingFile, MethodEntry, Parameter};
use crate::oracle::{MemberKind, Oracle};
use crate::tree::line_depth;
use std::fmt;

/// Parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

/// A parsed mapping file plus the translation misses encountered.
///
/// Misses are non-fatal for the plain codec: the original identity is kept in
/// the tree and the caller decides how loudly to report the warnings.
#[derive(Debug)]
pub struct Parsed {
    pub file: MappingFile,
    pub warnings: Vec<String>,
}

/// Parse a mapping file's lines, translating every definition through the
/// oracle as it goes.
pub fn parse_lines<S: AsRef<str>>(lines: &[S], oracle: &dyn Oracle) -> Result<Parsed, ParseError> {
    let mut cursor = Cursor { lines, pos: 0 };
    let mut scope: Vec<String> = Vec::new();
    let mut warnings = Vec::new();

    if cursor.peek().is_none() {
        return Err(ParseError {
            line: 1,
            message: "empty mapping file".to_string(),
        });
    }

    let root = parse_class(&mut cursor, &mut scope, oracle, &mut warnings)?;

    if let Some(line) = cursor.peek() {
        return Err(ParseError {
            line: cursor.pos + 1,
            message: format!("unexpected content after top-level class: `{}`", line),
        });
    }

    Ok(Parsed {
        file: MappingFile { root },
        warnings,
    })
}

struct Cursor<'a, S: AsRef<str>> {
    lines: &'a [S],
    pos: usize,
}

impl<'a, S: AsRef<str>> Cursor<'a, S> {
    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).map(|l| l.as_ref())
    }

    fn next(&mut self) -> Option<&'a str> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            line: self.pos,
            message: message.into(),
        }
    }
}

fn parse_class<S: AsRef<str>>(
    cursor: &mut Cursor<'_, S>,
    scope: &mut Vec<String>,
    oracle: &dyn Oracle,
    warnings: &mut Vec<String>,
) -> Result<ClassEntry, ParseError> {
    let line = cursor.next().expect("caller checked a CLASS line is present");
    let depth = line_depth(line);
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.first() != Some(&"CLASS") || tokens.len() < 2 {
        return Err(cursor.error(format!("expected `CLASS <obf> [<mapped>]`, got `{}`", line)));
    }

    let raw_identity = tokens[1];
    // The oracle's answer replaces the translated-name column; the obfuscated
    // identity is the stable key and passes through untouched. On a miss the
    // original text is kept so partial mapping files stay usable.
    let mapped = match oracle.resolve(scope, MemberKind::Class, raw_identity, None) {
        Some(translation) => translation.name,
        None => {
            warnings.push(miss_warning("CLASS", raw_identity, scope));
            tokens.get(2).copied().unwrap_or("").to_string()
        }
    };

    let mut entry = ClassEntry {
        info: EntryInfo::named(raw_identity, mapped),
        ..ClassEntry::default()
    };

    // Children resolve against the input-namespace scope chain.
    scope.push(raw_identity.to_string());
    let result = parse_class_body(cursor, depth, &mut entry, scope, oracle, warnings);
    scope.pop();
    result?;

    Ok(entry)
}

fn parse_class_body<S: AsRef<str>>(
    cursor: &mut Cursor<'_, S>,
    depth: usize,
    entry: &mut ClassEntry,
    scope: &mut Vec<String>,
    oracle: &dyn Oracle,
    warnings: &mut Vec<String>,
) -> Result<(), ParseError> {
    while let Some(line) = cursor.peek() {
        if line_depth(line) <= depth {
            // Sibling or outer scope; leave it for the caller.
            return Ok(());
        }
        let keyword = line.split_whitespace().next().unwrap_or("");
        match keyword {
            "COMMENT" => {
                entry.info.comment.push(comment_text(line));
                cursor.next();
            }
            "FIELD" => entry.fields.push(parse_field(cursor, scope, oracle, warnings)?),
            "METHOD" => entry
                .methods
                .push(parse_method(cursor, scope, oracle, warnings)?),
            "CLASS" => entry
                .classes
                .push(parse_class(cursor, scope, oracle, warnings)?),
            _ => {
                return Err(ParseError {
                    line: cursor.pos + 1,
                    message: format!("unexpected line: `{}`", line),
                });
            }
        }
    }
    Ok(())
}

fn parse_field<S: AsRef<str>>(
    cursor: &mut Cursor<'_, S>,
    scope: &mut Vec<String>,
    oracle: &dyn Oracle,
    warnings: &mut Vec<String>,
) -> Result<FieldEntry, ParseError> {
    let line = cursor.next().expect("caller peeked a FIELD line");
    let depth = line_depth(line);
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(cursor.error(format!(
            "expected `FIELD <obf> [<mapped>] <descriptor>`, got `{}`",
            line
        )));
    }

    let raw_identity = tokens[1];
    let (raw_mapped, raw_descriptor) = if tokens.len() < 4 {
        ("", tokens[2])
    } else {
        (tokens[2], tokens[3])
    };

    let (mapped, descriptor) =
        match oracle.resolve(scope, MemberKind::Field, raw_identity, Some(raw_descriptor)) {
            Some(translation) => (
                translation.name,
                translation
                    .descriptor
                    .unwrap_or_else(|| raw_descriptor.to_string()),
            ),
            None => {
                warnings.push(miss_warning("FIELD", raw_identity, scope));
                (raw_mapped.to_string(), raw_descriptor.to_string())
            }
        };

    let mut entry = FieldEntry {
        info: EntryInfo::named(raw_identity, mapped),
        descriptor,
    };

    while let Some(line) = cursor.peek() {
        // A line at the field's own depth belongs to the enclosing class.
        if line_depth(line) <= depth || line.split_whitespace().next() != Some("COMMENT") {
            break;
        }
        entry.info.comment.push(comment_text(line));
        cursor.next();
    }

    Ok(entry)
}

fn parse_method<S: AsRef<str>>(
    cursor: &mut Cursor<'_, S>,
    scope: &mut Vec<String>,
    oracle: &dyn Oracle,
    warnings: &mut Vec<String>,
) -> Result<MethodEntry, ParseError> {
    let line = cursor.next().expect("caller peeked a METHOD line");
    let depth = line_depth(line);
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(cursor.error(format!(
            "expected `METHOD <obf> [<mapped>] <descriptor>`, got `{}`",
            line
        )));
    }

    let raw_identity = tokens[1];
    let (raw_mapped, raw_descriptor) = if tokens.len() < 4 {
        ("", tokens[2])
    } else {
        (tokens[2], tokens[3])
    };

    let (mapped, descriptor) =
        match oracle.resolve(scope, MemberKind::Method, raw_identity, Some(raw_descriptor)) {
            Some(translation) => (
                translation.name,
                translation
                    .descriptor
                    .unwrap_or_else(|| raw_descriptor.to_string()),
            ),
            None => {
                warnings.push(miss_warning("METHOD", raw_identity, scope));
                (raw_mapped.to_string(), raw_descriptor.to_string())
            }
        };

    let mut entry = MethodEntry {
        info: EntryInfo::named(raw_identity, mapped),
        descriptor,
        args: Default::default(),
    };

    // COMMENT lines before the first ARG belong to the method; after an ARG
    // they belong to that parameter.
    let mut current_arg: Option<u32> = None;
    while let Some(line) = cursor.peek() {
        if line_depth(line) <= depth {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first().copied() {
            Some("COMMENT") => {
                let text = comment_text(line);
                match current_arg {
                    Some(index) => entry
                        .args
                        .get_mut(&index)
                        .expect("current_arg was just inserted")
                        .comment
                        .push(text),
                    None => entry.info.comment.push(text),
                }
                cursor.next();
            }
            Some("ARG") => {
                if tokens.len() < 3 {
                    return Err(ParseError {
                        line: cursor.pos + 1,
                        message: format!("expected `ARG <index> <name>`, got `{}`", line),
                    });
                }
                let index: u32 = tokens[1].parse().map_err(|_| ParseError {
                    line: cursor.pos + 1,
                    message: format!("invalid parameter index `{}`", tokens[1]),
                })?;
                entry.args.insert(
                    index,
                    Parameter {
                        name: tokens[2].to_string(),
                        comment: Vec::new(),
                    },
                );
                current_arg = Some(index);
                cursor.next();
            }
            _ => break,
        }
    }

    Ok(entry)
}

/// Comment body with the `COMMENT ` prefix stripped; empty bodies permitted.
fn comment_text(line: &str) -> String {
    line.trim()
        .strip_prefix("COMMENT ")
        .unwrap_or("")
        .to_string()
}

fn miss_warning(kind: &str, identity: &str, scope: &[String]) -> String {
    if scope.is_empty() {
        format!("no translation for {} `{}`", kind, identity)
    } else {
        format!(
            "no translation for {} `{}` in `{}`",
            kind,
            identity,
            scope.join("$")
        )
    }
}
