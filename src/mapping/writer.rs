//! Deterministic writer for mapping files.
//!
//! Emission is recursive depth-first: the class line, its comments, fields,
//! methods (with their parameters), then nested classes, each group sorted by
//! identity (then descriptor for members) so the same tree always renders to
//! the same bytes.

use super::{ClassEntry, EntryInfo, MappingFile};
use std::fmt::Write;

/// Render a mapping file to its textual form. Every line ends with `\n`.
pub fn export(file: &MappingFile) -> String {
    let mut out = String::new();
    write_class(&file.root, &mut out, 0);
    out
}

fn write_class(class: &ClassEntry, out: &mut String, depth: usize) {
    push_indent(out, depth);
    out.push_str("CLASS ");
    out.push_str(&class.info.obfuscated);
    if !class.info.mapped.is_empty() {
        out.push(' ');
        out.push_str(&class.info.mapped);
    }
    out.push('\n');
    write_comments(&class.info, out, depth);

    let mut fields: Vec<_> = class.fields.iter().collect();
    fields.sort_by(|a, b| {
        (&a.info.obfuscated, &a.descriptor).cmp(&(&b.info.obfuscated, &b.descriptor))
    });
    for field in fields {
        push_indent(out, depth + 1);
        out.push_str("FIELD ");
        out.push_str(&field.info.obfuscated);
        out.push(' ');
        if !field.info.mapped.is_empty() {
            out.push_str(&field.info.mapped);
            out.push(' ');
        }
        out.push_str(&field.descriptor);
        out.push('\n');
        write_comments(&field.info, out, depth + 1);
    }

    let mut methods: Vec<_> = class.methods.iter().collect();
    methods.sort_by(|a, b| {
        (&a.info.obfuscated, &a.descriptor).cmp(&(&b.info.obfuscated, &b.descriptor))
    });
    for method in methods {
        push_indent(out, depth + 1);
        out.push_str("METHOD ");
        out.push_str(&method.info.obfuscated);
        out.push(' ');
        if !method.info.mapped.is_empty() {
            out.push_str(&method.info.mapped);
            out.push(' ');
        }
        out.push_str(&method.descriptor);
        out.push('\n');
        write_comments(&method.info, out, depth + 1);

        for (index, parameter) in &method.args {
            push_indent(out, depth + 2);
            let _ = writeln!(out, "ARG {} {}", index, parameter.name);
            for line in &parameter.comment {
                push_comment(out, depth + 3, line);
            }
        }
    }

    let mut classes: Vec<_> = class.classes.iter().collect();
    classes.sort_by(|a, b| a.info.obfuscated.cmp(&b.info.obfuscated));
    for nested in classes {
        write_class(nested, out, depth + 1);
    }
}

fn write_comments(info: &EntryInfo, out: &mut String, depth: usize) {
    for line in &info.comment {
        push_comment(out, depth + 1, line);
    }
}

fn push_comment(out: &mut String, depth: usize, text: &str) {
    push_indent(out, depth);
    if text.is_empty() {
        out.push_str("COMMENT\n");
    } else {
        let _ = writeln!(out, "COMMENT {}", text);
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}
