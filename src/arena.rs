use generational_arena::{Arena, Index};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument};

use crate::errors::{TreeError, TreeResult};
use crate::node::{NodeMut, NodeRef};
use crate::traversal::{Leaves, LevelOrder, PostOrder, PreOrder};

static NEXT_TREE: AtomicU64 = AtomicU64::new(0);

fn next_tree_id() -> u64 {
    NEXT_TREE.fetch_add(1, Ordering::Relaxed)
}

/// Generation-checked handle to a node stored in a [`Tree`].
///
/// A handle never owns its node. Once the node is removed the handle stays
/// stale, even when the arena slot is reused by a later insertion. A handle
/// also remembers the tree it came from and is rejected by every other tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u64,
    index: Index,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.index.into_raw_parts();
        write!(f, "t{}:{}v{}", self.tree, slot, generation)
    }
}

/// Arena record of a single node.
#[derive(Debug, Clone)]
pub(crate) struct NodeData<T> {
    /// Payload, None for structural nodes
    pub(crate) value: Option<T>,
    /// Handle of the containing node, None for the root
    pub(crate) parent: Option<NodeId>,
    /// Owned children in traversal order
    pub(crate) children: Vec<NodeId>,
}

impl<T> NodeData<T> {
    fn new(value: Option<T>, parent: Option<NodeId>) -> Self {
        Self {
            value,
            parent,
            children: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

/// Ordered N-ary tree backed by a generational arena.
///
/// The tree exclusively owns every node. Parent and child links are
/// [`NodeId`] handles, so growing a child list never invalidates them and a
/// handle to a removed node fails with [`TreeError::StaleHandle`] instead of
/// reading freed memory.
///
/// A clone keeps the identity of its source: handles taken from one resolve
/// to the matching node in the other.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    /// Identity stamped into every handle this tree hands out
    id: u64,
    /// Arena storage for all nodes of this tree
    arena: Arena<NodeData<T>>,
    /// Handle of the root, always live
    root: NodeId,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<T> for Tree<T> {
    fn from(value: T) -> Self {
        Self::with_value(value)
    }
}

/// `for node in &tree` walks the tree in pre-order.
impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = NodeRef<'a, T>;
    type IntoIter = PreOrder<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.pre_order()
    }
}

impl<T> Tree<T> {
    /// Creates a tree whose root has neither a value nor children.
    pub fn new() -> Self {
        Self::from_root(None)
    }

    pub fn with_value(value: T) -> Self {
        Self::from_root(Some(value))
    }

    fn from_root(value: Option<T>) -> Self {
        let id = next_tree_id();
        let mut arena = Arena::new();
        let root = NodeId {
            tree: id,
            index: arena.insert(NodeData::new(value, None)),
        };
        Self { id, arena, root }
    }

    fn insert(&mut self, data: NodeData<T>) -> NodeId {
        NodeId {
            tree: self.id,
            index: self.arena.insert(data),
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> NodeRef<'_, T> {
        self.node_ref(self.root)
    }

    pub fn root_mut(&mut self) -> NodeMut<'_, T> {
        let root = self.root;
        NodeMut::new(self, root)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, id: NodeId) -> TreeResult<NodeRef<'_, T>> {
        let data = self.data(id)?;
        Ok(NodeRef::new(self, id, data))
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_mut(&mut self, id: NodeId) -> TreeResult<NodeMut<'_, T>> {
        if !self.contains(id) {
            return Err(TreeError::StaleHandle(id));
        }
        Ok(NodeMut::new(self, id))
    }

    /// True iff `id` was handed out by this tree and its node is still live.
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.id && self.arena.contains(id.index)
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True iff the root holds no value and has no children.
    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    /// Number of levels, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in &self.live(id).children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// Drops every node and installs a fresh empty root.
    ///
    /// All handles taken before the call become stale.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        // Remove one by one: each removal bumps the arena generation, which
        // `Arena::clear` does not do.
        let stale: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        debug!(nodes = stale.len(), "clearing tree");
        for idx in stale {
            self.arena.remove(idx);
        }
        self.root = self.insert(NodeData::new(None, None));
    }

    /// Depth-first pre-order walk of the whole tree.
    pub fn pre_order(&self) -> PreOrder<'_, T> {
        PreOrder::new(self, self.start())
    }

    pub fn post_order(&self) -> PostOrder<'_, T> {
        PostOrder::new(self, self.start())
    }

    /// Breadth-first walk, level by level.
    pub fn level_order(&self) -> LevelOrder<'_, T> {
        LevelOrder::new(self, self.start())
    }

    pub fn leaves(&self) -> Leaves<'_, T> {
        Leaves::new(PreOrder::new(self, self.start()))
    }

    /// Values in pre-order, skipping nodes without a value.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.pre_order().filter_map(|node| node.value().ok())
    }

    fn start(&self) -> Option<NodeId> {
        (!self.is_empty()).then_some(self.root)
    }

    pub(crate) fn data(&self, id: NodeId) -> TreeResult<&NodeData<T>> {
        if id.tree != self.id {
            return Err(TreeError::StaleHandle(id));
        }
        self.arena.get(id.index).ok_or(TreeError::StaleHandle(id))
    }

    // Only for handles the tree itself keeps live: the root, child lists and
    // ids held by a NodeMut.
    pub(crate) fn live(&self, id: NodeId) -> &NodeData<T> {
        &self.arena[id.index]
    }

    pub(crate) fn live_mut(&mut self, id: NodeId) -> &mut NodeData<T> {
        &mut self.arena[id.index]
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> NodeRef<'_, T> {
        NodeRef::new(self, id, self.live(id))
    }

    #[instrument(level = "trace", skip(self, value), fields(has_value = value.is_some()))]
    pub(crate) fn append(&mut self, parent: NodeId, value: Option<T>) -> NodeId {
        let child = self.insert(NodeData::new(value, Some(parent)));
        self.live_mut(parent).children.push(child);
        child
    }

    /// Unlinks the child at `position` and drops its whole subtree.
    ///
    /// Validates before touching the arena, so a failed call changes nothing.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn remove_child_at(
        &mut self,
        parent: NodeId,
        position: usize,
    ) -> TreeResult<Option<T>> {
        let len = self.data(parent)?.children.len();
        if position >= len {
            return Err(TreeError::InvalidIteratorPosition { position, len });
        }
        let child = self.live_mut(parent).children.remove(position);
        Ok(self.remove_subtree(child))
    }

    fn remove_subtree(&mut self, id: NodeId) -> Option<T> {
        let mut value = None;
        let mut removed = 0usize;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.arena.remove(current.index) {
                stack.extend(data.children);
                if current == id {
                    value = data.value;
                }
                removed += 1;
            }
        }
        debug!(%id, removed, "removed subtree");
        value
    }

    /// Moves every node of `other` under `parent`, keeping order and
    /// rewriting parent handles to this tree's ids.
    #[instrument(level = "trace", skip(self, other), fields(nodes = other.len()))]
    pub(crate) fn graft(&mut self, parent: NodeId, mut other: Tree<T>) -> NodeId {
        let other_root = other.live_mut(other.root);
        let value = other_root.value.take();
        let children = std::mem::take(&mut other_root.children);

        let grafted = self.append(parent, value);
        let mut moved = 1usize;
        let mut stack: Vec<(NodeId, NodeId)> =
            children.into_iter().rev().map(|child| (child, grafted)).collect();
        while let Some((old, new_parent)) = stack.pop() {
            let Some(data) = other.arena.remove(old.index) else {
                continue;
            };
            let new_id = self.append(new_parent, data.value);
            stack.extend(data.children.into_iter().rev().map(|child| (child, new_id)));
            moved += 1;
        }
        debug!(%parent, %grafted, moved, "grafted subtree");
        grafted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn given_new_tree_when_inspecting_then_root_is_empty_and_alone() {
        let tree: Tree<i32> = Tree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.depth(), 0);
        assert!(tree.root().parent_id().is_none());
    }

    #[rstest]
    fn given_cleared_tree_when_using_old_handle_then_fails_as_stale() {
        let mut tree = Tree::with_value(1);
        let child = tree.root_mut().add_child(2);
        let old_root = tree.root_id();

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(child).err(), Some(TreeError::StaleHandle(child)));
        assert_eq!(tree.get(old_root).err(), Some(TreeError::StaleHandle(old_root)));
        assert_ne!(tree.root_id(), old_root);
    }

    #[rstest]
    fn given_removed_slot_when_reused_then_old_handle_stays_stale() {
        let mut tree = Tree::with_value(0);
        let first = tree.root_mut().add_child(1);
        tree.root_mut().remove_child(0).unwrap();

        let second = tree.root_mut().add_child(2);

        assert!(!tree.contains(first));
        assert!(tree.contains(second));
        assert_eq!(*tree.get(second).unwrap().value().unwrap(), 2);
    }

    #[rstest]
    fn given_subtree_when_grafted_then_parent_handles_point_into_new_tree() {
        let mut branch = Tree::with_value("b");
        let leaf = branch.root_mut().add_child("b1");
        branch.get_mut(leaf).unwrap().add_child("b11");
        branch.root_mut().add_child("b2");

        let mut tree = Tree::with_value("root");
        let grafted = tree.root_mut().add_subtree(branch);

        assert_eq!(tree.len(), 5);
        let node = tree.get(grafted).unwrap();
        assert_eq!(node.parent_id(), Some(tree.root_id()));
        for child in node.children() {
            assert_eq!(child.parent_id(), Some(grafted));
        }
        let values: Vec<_> = tree.values().copied().collect();
        assert_eq!(values, vec!["root", "b", "b1", "b11", "b2"]);
    }

    #[rstest]
    fn given_grafted_subtree_when_using_its_old_handle_then_fails_as_stale() {
        let mut branch = Tree::with_value(100);
        let leaf = branch.root_mut().add_child(101);
        let old_root = branch.root_id();

        let mut tree = Tree::with_value(0);
        tree.root_mut().add_child(1);
        tree.root_mut().add_subtree(branch);

        assert!(!tree.contains(leaf));
        assert_eq!(tree.get(leaf).err(), Some(TreeError::StaleHandle(leaf)));
        assert_eq!(tree.get(old_root).err(), Some(TreeError::StaleHandle(old_root)));
        assert!(tree.get_mut(leaf).is_err());
    }

    #[rstest]
    fn given_two_trees_when_crossing_handles_then_neither_accepts_the_other() {
        let mut a = Tree::with_value("a");
        let a_child = a.root_mut().add_child("a1");
        let mut b = Tree::with_value("b");
        let b_child = b.root_mut().add_child("b1");

        assert_eq!(b.get(a_child).err(), Some(TreeError::StaleHandle(a_child)));
        assert_eq!(a.get(b.root_id()).err(), Some(TreeError::StaleHandle(b.root_id())));
        assert!(b.get_mut(a_child).is_err());
        assert_eq!(
            b.root_mut().remove_child_id(a_child).err(),
            Some(TreeError::NotAChild {
                parent: b.root_id(),
                child: a_child
            })
        );
        assert_eq!(b.get(b_child).unwrap().value(), Ok(&"b1"));
        assert_eq!(b.len(), 2);
    }

    #[rstest]
    fn given_cloned_tree_when_using_source_handle_then_resolves_matching_node() {
        let mut tree = Tree::with_value(0);
        let child = tree.root_mut().add_child(1);

        let mut copy = tree.clone();
        copy.get_mut(child).unwrap().set_value(2);

        assert_eq!(tree.get(child).unwrap().value(), Ok(&1));
        assert_eq!(copy.get(child).unwrap().value(), Ok(&2));
    }

    #[rstest]
    fn given_nested_tree_when_removing_branch_then_all_descendants_are_freed() {
        let mut tree = Tree::with_value(0);
        let a = tree.root_mut().add_child(1);
        let a1 = tree.get_mut(a).unwrap().add_child(11);
        tree.root_mut().add_child(2);

        let removed = tree.root_mut().remove_child(0).unwrap();

        assert_eq!(removed, Some(1));
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(a1));
    }

    #[rstest]
    #[case(vec![], 1)]
    #[case(vec![1], 2)]
    #[case(vec![1, 2, 3], 4)]
    fn given_chain_when_measuring_depth_then_counts_levels(
        #[case] chain: Vec<i32>,
        #[case] expected: usize,
    ) {
        let mut tree = Tree::with_value(0);
        let mut current = tree.root_id();
        for v in chain {
            current = tree.get_mut(current).unwrap().add_child(v);
        }
        assert_eq!(tree.depth(), expected);
    }
}
