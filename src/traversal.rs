//! Child iteration and whole-tree walks.
//!
//! Borrowing iterators hold `&Tree`, so the tree cannot change while they
//! are live. [`PreOrderCursor`] keeps only handles and can be advanced across
//! mutations.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::slice;
use tracing::instrument;

use crate::arena::{NodeId, Tree};
use crate::errors::TreeResult;
use crate::node::NodeRef;

/// Children of one node; double ended, so `.rev()` walks right to left.
pub struct Children<'a, T> {
    tree: &'a Tree<T>,
    ids: slice::Iter<'a, NodeId>,
}

impl<'a, T> Children<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, ids: &'a [NodeId]) -> Self {
        Self {
            tree,
            ids: ids.iter(),
        }
    }
}

impl<'a, T> Clone for Children<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            ids: self.ids.clone(),
        }
    }
}

impl<'a, T> Iterator for Children<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.tree.node_ref(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<'a, T> DoubleEndedIterator for Children<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| self.tree.node_ref(id))
    }
}

impl<'a, T> ExactSizeIterator for Children<'a, T> {}

impl<'a, T> FusedIterator for Children<'a, T> {}

/// Depth-first pre-order walk: parent first, then children left to right.
///
/// The top of the pending stack is the current node. An exhausted walk
/// compares equal to [`PreOrder::end`] of the same tree.
pub struct PreOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<NodeId>,
}

impl<'a, T> PreOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }

    /// The exhausted walk of `tree`.
    pub fn end(tree: &'a Tree<T>) -> Self {
        Self::new(tree, None)
    }

    /// Node the next call to `next` returns, None once exhausted.
    pub fn current(&self) -> Option<NodeRef<'a, T>> {
        self.stack.last().map(|&id| self.tree.node_ref(id))
    }

    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }
}

impl<'a, T> Clone for PreOrder<'a, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}

/// Walks are equal when they belong to the same tree and sit on the same
/// node; pending stacks are not compared.
impl<'a, 'b, T> PartialEq<PreOrder<'b, T>> for PreOrder<'a, T> {
    fn eq(&self, other: &PreOrder<'b, T>) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.stack.last() == other.stack.last()
    }
}

impl<'a, T> Iterator for PreOrder<'a, T> {
    type Item = NodeRef<'a, T>;

    #[instrument(level = "trace", skip(self), fields(pending = self.stack.len()))]
    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let node = self.tree.node_ref(current);
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.child_ids().iter().rev().copied());
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.tree.len()))
    }
}

impl<'a, T> FusedIterator for PreOrder<'a, T> {}

/// Depth-first post-order walk: children left to right, then the parent.
pub struct PostOrder<'a, T> {
    tree: &'a Tree<T>,
    stack: Vec<(NodeId, bool)>,
}

impl<'a, T> PostOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            stack: start.into_iter().map(|id| (id, false)).collect(),
        }
    }
}

impl<'a, T> Iterator for PostOrder<'a, T> {
    type Item = NodeRef<'a, T>;

    #[instrument(level = "trace", skip(self))]
    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, expanded)) = self.stack.pop() {
            let node = self.tree.node_ref(current);
            if expanded {
                return Some(node);
            }
            self.stack.push((current, true));
            for &child in node.child_ids().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

impl<'a, T> FusedIterator for PostOrder<'a, T> {}

/// Breadth-first walk, each level left to right.
pub struct LevelOrder<'a, T> {
    tree: &'a Tree<T>,
    queue: VecDeque<NodeId>,
}

impl<'a, T> LevelOrder<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, start: Option<NodeId>) -> Self {
        Self {
            tree,
            queue: start.into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for LevelOrder<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.queue.pop_front()?;
        let node = self.tree.node_ref(current);
        self.queue.extend(node.child_ids().iter().copied());
        Some(node)
    }
}

impl<'a, T> FusedIterator for LevelOrder<'a, T> {}

/// Leaf nodes in pre-order order.
pub struct Leaves<'a, T> {
    inner: PreOrder<'a, T>,
}

impl<'a, T> Leaves<'a, T> {
    pub(crate) fn new(inner: PreOrder<'a, T>) -> Self {
        Self { inner }
    }
}

impl<'a, T> Iterator for Leaves<'a, T> {
    type Item = NodeRef<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.find(|node| node.is_leaf())
    }
}

impl<'a, T> FusedIterator for Leaves<'a, T> {}

/// Pre-order walk that stores handles only, so the tree may be mutated
/// between steps.
///
/// Children are captured when their parent is visited: nodes added below an
/// already visited node are not seen, nodes added below a pending node are.
/// A pending node that was removed makes [`PreOrderCursor::advance`] return
/// [`TreeError::StaleHandle`](crate::TreeError::StaleHandle); the handle is
/// dropped and the next call continues with the remaining nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreOrderCursor {
    stack: Vec<NodeId>,
}

impl PreOrderCursor {
    /// Cursor over the whole tree, exhausted right away for an empty tree.
    pub fn new<T>(tree: &Tree<T>) -> Self {
        let stack = if tree.is_empty() {
            Vec::new()
        } else {
            vec![tree.root_id()]
        };
        Self { stack }
    }

    /// Cursor over the subtree rooted at `id`.
    pub fn from_node(id: NodeId) -> Self {
        Self { stack: vec![id] }
    }

    pub fn current(&self) -> Option<NodeId> {
        self.stack.last().copied()
    }

    pub fn is_exhausted(&self) -> bool {
        self.stack.is_empty()
    }

    /// Returns the current handle and moves to the next node.
    #[instrument(level = "trace", skip(self, tree), fields(pending = self.stack.len()))]
    pub fn advance<T>(&mut self, tree: &Tree<T>) -> TreeResult<Option<NodeId>> {
        let Some(current) = self.stack.pop() else {
            return Ok(None);
        };
        let node = tree.get(current)?;
        self.stack.extend(node.child_ids().iter().rev().copied());
        Ok(Some(current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TreeError;
    use rstest::{fixture, rstest};

    // 0
    // ├── 1
    // │   ├── 11
    // │   └── 12
    // ├── 2
    // │   ├── 21
    // │   └── 22
    // └── 3
    //     ├── 31
    //     └── 32
    #[fixture]
    fn sample() -> Tree<i32> {
        let mut tree = Tree::with_value(0);
        for i in 1..=3 {
            let child = tree.root_mut().add_child(i);
            let mut node = tree.get_mut(child).unwrap();
            node.add_child(i * 10 + 1);
            node.add_child(i * 10 + 2);
        }
        tree
    }

    fn collect<'a>(nodes: impl Iterator<Item = NodeRef<'a, i32>>) -> Vec<i32> {
        nodes.map(|n| *n.value().unwrap()).collect()
    }

    #[rstest]
    fn given_sample_when_walking_pre_order_then_parent_before_children(sample: Tree<i32>) {
        assert_eq!(
            collect(sample.pre_order()),
            vec![0, 1, 11, 12, 2, 21, 22, 3, 31, 32]
        );
    }

    #[rstest]
    fn given_sample_when_walking_post_order_then_children_before_parent(sample: Tree<i32>) {
        assert_eq!(
            collect(sample.post_order()),
            vec![11, 12, 1, 21, 22, 2, 31, 32, 3, 0]
        );
    }

    #[rstest]
    fn given_sample_when_walking_level_order_then_level_by_level(sample: Tree<i32>) {
        assert_eq!(
            collect(sample.level_order()),
            vec![0, 1, 2, 3, 11, 12, 21, 22, 31, 32]
        );
    }

    #[rstest]
    fn given_sample_when_listing_leaves_then_grandchildren_in_order(sample: Tree<i32>) {
        assert_eq!(collect(sample.leaves()), vec![11, 12, 21, 22, 31, 32]);
    }

    #[rstest]
    fn given_walk_when_advanced_then_current_tracks_next_node(sample: Tree<i32>) {
        let mut walk = sample.pre_order();
        assert_eq!(walk.current().map(|n| n.id()), Some(sample.root_id()));
        walk.next();
        assert_eq!(walk.current().unwrap().value(), Ok(&1));
        assert!(walk != PreOrder::end(&sample));

        walk.by_ref().for_each(drop);

        assert!(walk.is_exhausted());
        assert!(walk.current().is_none());
        assert!(walk == PreOrder::end(&sample));
        assert!(walk.next().is_none());
    }

    #[rstest]
    fn given_equal_valued_trees_when_comparing_walks_then_identity_decides(sample: Tree<i32>) {
        let copy = sample.clone();
        assert!(sample.pre_order() == sample.pre_order());
        assert!(sample.pre_order() != copy.pre_order());
    }

    #[rstest]
    fn given_cursor_when_pending_node_removed_then_reports_stale_and_continues(
        sample: Tree<i32>,
    ) {
        let mut tree = sample;
        let mut cursor = PreOrderCursor::new(&tree);
        let root = cursor.advance(&tree).unwrap();
        assert_eq!(root, Some(tree.root_id()));

        let second = tree.root().child(1).unwrap().id();
        tree.root_mut().remove_child(1).unwrap();

        let mut seen = Vec::new();
        let mut stale = Vec::new();
        loop {
            match cursor.advance(&tree) {
                Ok(Some(id)) => seen.push(*tree.get(id).unwrap().value().unwrap()),
                Ok(None) => break,
                Err(TreeError::StaleHandle(id)) => stale.push(id),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(seen, vec![1, 11, 12, 3, 31, 32]);
        assert_eq!(stale, vec![second]);
    }

    #[rstest]
    fn given_cursor_when_child_added_to_pending_node_then_it_is_visited(sample: Tree<i32>) {
        let mut tree = sample;
        let mut cursor = PreOrderCursor::new(&tree);
        cursor.advance(&tree).unwrap();
        tree.root_mut().add_child(4);
        let third = tree.root().child(2).unwrap().id();
        tree.get_mut(third).unwrap().add_child(33);

        let mut seen = Vec::new();
        while let Some(id) = cursor.advance(&tree).unwrap() {
            seen.push(*tree.get(id).unwrap().value().unwrap());
        }
        // 4 was added below the already visited root
        assert_eq!(seen, vec![1, 11, 12, 2, 21, 22, 3, 31, 32, 33]);
    }
}
