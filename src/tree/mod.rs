//! Generic indentation tree over a flat tab-indented line list.
//!
//! A line's depth is its leading tab count; a node's children are the maximal
//! run of immediately following lines at depth + 1. The tree is used for
//! structural lookup on already-rendered text: "what is the enclosing parent
//! of line i" and "what is the ancestor chain of line i". It knows nothing
//! about mapping-file keywords.

/// Depth of a line: the number of leading tab characters.
pub fn line_depth(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b'\t').count()
}

/// An index-based tree over a list of indented lines.
///
/// Nodes are identified by their line index; the structure is stored as a
/// parent pointer per line, which is all the lookups here need.
#[derive(Debug)]
pub struct IndentTree {
    depths: Vec<usize>,
    parents: Vec<Option<usize>>,
}

impl IndentTree {
    /// Build the tree from a flat line list.
    ///
    /// A line's parent is the nearest preceding line whose depth is exactly
    /// one less than its own.
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let depths: Vec<usize> = lines.iter().map(|l| line_depth(l.as_ref())).collect();
        let mut parents = Vec::with_capacity(lines.len());
        // last_at[d] is the most recent line index seen at depth d
        let mut last_at: Vec<Option<usize>> = Vec::new();

        for (i, &depth) in depths.iter().enumerate() {
            if last_at.len() <= depth {
                last_at.resize(depth + 1, None);
            }
            parents.push(if depth == 0 {
                None
            } else {
                last_at[depth - 1]
            });
            last_at[depth] = Some(i);
            // A shallower line closes every deeper scope
            last_at.truncate(depth + 1);
        }

        IndentTree { depths, parents }
    }

    /// Number of lines the tree was built over.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Depth of line `i`.
    pub fn depth(&self, i: usize) -> usize {
        self.depths[i]
    }

    /// Index of the nearest preceding line whose depth is exactly one less
    /// than line `i`'s, or `None` for top-level lines.
    pub fn parent_of(&self, i: usize) -> Option<usize> {
        self.parents[i]
    }

    /// Line indices of the ancestors of line `i`, ordered from the root down.
    /// Does not include `i` itself.
    pub fn ancestors(&self, i: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.parents[i];
        while let Some(p) = current {
            chain.push(p);
            current = self.parents[p];
        }
        chain.reverse();
        chain
    }
}
