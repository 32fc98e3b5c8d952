//! Prefix lookup tree derived from a MultiIndex's level codes.
//!
//! The MultiIndex stores rows as integer codes per level; this tree is built lazily on first
//! lookup and only answers "which rows start with this code prefix". Each node keeps the rows
//! under it in ascending order and its children in first-occurrence order.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct LookupNode {
    children: HashMap<usize, LookupNode>,
    order: Vec<usize>,
    positions: Vec<usize>,
}

impl LookupNode {
    /// Builds the tree from `codes[level][row]` for rows `0..len`.
    pub(crate) fn build(codes: &[Vec<usize>], len: usize) -> Self {
        let mut root = Self::default();
        for row in 0..len {
            let mut node = &mut root;
            node.positions.push(row);
            for level in codes {
                let code = level[row];
                if !node.children.contains_key(&code) {
                    node.order.push(code);
                }
                node = node.children.entry(code).or_default();
                node.positions.push(row);
            }
        }
        root
    }

    pub(crate) fn descend(&self, path: &[usize]) -> Option<&Self> {
        path.iter()
            .try_fold(self, |node, code| node.children.get(code))
    }

    /// Rows under this node, ascending.
    pub(crate) fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Child codes in first-occurrence order.
    pub(crate) fn child_codes(&self) -> &[usize] {
        &self.order
    }
}
