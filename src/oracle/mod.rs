//! Namespace translation oracle.
//!
//! The oracle resolves what an identifier from the input namespace is called
//! in the output namespace. How the table is built (artifact download, version
//! resolution, merging two namespace tables over a common base scheme) is
//! outside this crate's core; here we define the query contract and a concrete
//! implementation backed by a pre-merged table file.

mod table;

pub use table::TranslationTable;

/// Kinds of identifiers the oracle can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Class,
    Field,
    Method,
}

impl MemberKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            MemberKind::Class => "CLASS",
            MemberKind::Field => "FIELD",
            MemberKind::Method => "METHOD",
        }
    }
}

/// A resolved identity in the output namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Translated identifier. For nested classes this is the inner-name
    /// segment as it appears on its definition line.
    pub name: String,
    /// Translated type descriptor, present iff a descriptor was passed in.
    pub descriptor: Option<String>,
}

/// Resolves an identifier's meaning across namespaces.
///
/// `scope` is the chain of enclosing class identities in the *input*
/// namespace, outermost first; an identity is only meaningful within its
/// scope chain, so the same obfuscated name in different scopes may resolve
/// differently. Returning `None` means the oracle has no answer; policy for
/// a miss belongs to the caller (the plain codec keeps the original text,
/// the reconciler treats it as fatal).
pub trait Oracle {
    fn resolve(
        &self,
        scope: &[String],
        kind: MemberKind,
        obfuscated: &str,
        descriptor: Option<&str>,
    ) -> Option<Translation>;
}

/// Oracle that answers nothing.
///
/// A miss makes the codec keep an entry's original text, so parsing with this
/// oracle reads a file without renaming anything. Used for plain round-trip
/// reads and structural inspection.
pub struct PassthroughOracle;

impl Oracle for PassthroughOracle {
    fn resolve(
        &self,
        _scope: &[String],
        _kind: MemberKind,
        _obfuscated: &str,
        _descriptor: Option<&str>,
    ) -> Option<Translation> {
        None
    }
}
