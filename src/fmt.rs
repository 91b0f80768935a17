//! Formatting implementation for the tree.

use std::fmt::{Debug, Formatter, Result};

use crate::RadixTree;

/// An indented structural dump: one line per node with its discriminator
/// bit, propagation masks, and (for prefix-bearing nodes) the stored
/// stream and every `(netmask, payload)` entry. The rendering depends only
/// on structure, never on arena indices, so two trees that format equally
/// are structurally identical.
impl<T: Debug> Debug for RadixTree<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self.root {
            None => f.write_str("<empty>"),
            Some(root) => DebugNode {
                tree: self,
                idx: root,
                depth: 0,
            }
            .fmt(f),
        }
    }
}

struct DebugNode<'a, T> {
    tree: &'a RadixTree<T>,
    idx: usize,
    depth: usize,
}

impl<T: Debug> Debug for DebugNode<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let node = &self.tree.table[self.idx];
        write!(
            f,
            "{:indent$}bit {} {:?}",
            "",
            node.bit,
            node.masks,
            indent = self.depth * 2
        )?;
        match &node.prefix {
            Some(prefix) => {
                write!(f, " (")?;
                for (i, byte) in prefix.stream.iter().enumerate() {
                    if i != 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{byte}")?;
                }
                write!(f, ")")?;
                for entry in &prefix.entries {
                    write!(f, " /{} {:?}", entry.netmask, entry.user)?;
                }
            }
            None => write!(f, " (-)")?,
        }
        writeln!(f)?;
        for child in [node.left, node.right].into_iter().flatten() {
            DebugNode {
                tree: self.tree,
                idx: child,
                depth: self.depth + 1,
            }
            .fmt(f)?;
        }
        Ok(())
    }
}
