use std::fmt;
use std::iter::Rev;
use tracing::instrument;

use crate::arena::{NodeData, NodeId, Tree};
use crate::errors::{TreeError, TreeResult};
use crate::traversal::{Children, PostOrder, PreOrder};

/// Shared view of one node: its payload, its children and a read-only
/// handle to its parent.
pub struct NodeRef<'a, T> {
    tree: &'a Tree<T>,
    id: NodeId,
    data: &'a NodeData<T>,
}

impl<'a, T> Clone for NodeRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for NodeRef<'a, T> {}

impl<'a, T: fmt::Debug> fmt::Debug for NodeRef<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("value", &self.data.value)
            .field("parent", &self.data.parent)
            .field("children", &self.data.children.len())
            .finish()
    }
}

/// Shallow equality: parent handle, payload and number of children.
///
/// Subtrees are not compared. Use [`NodeRef::same_node`] for identity.
impl<'a, 'b, T: PartialEq> PartialEq<NodeRef<'b, T>> for NodeRef<'a, T> {
    fn eq(&self, other: &NodeRef<'b, T>) -> bool {
        self.data.parent == other.data.parent
            && self.data.value == other.data.value
            && self.data.children.len() == other.data.children.len()
    }
}

/// `for child in node` visits the children left to right.
impl<'a, T> IntoIterator for NodeRef<'a, T> {
    type Item = NodeRef<'a, T>;
    type IntoIter = Children<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.children()
    }
}

impl<'a, T> NodeRef<'a, T> {
    pub(crate) fn new(tree: &'a Tree<T>, id: NodeId, data: &'a NodeData<T>) -> Self {
        Self { tree, id, data }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Payload of this node, [`TreeError::EmptyNode`] if none was set.
    pub fn value(&self) -> TreeResult<&'a T> {
        self.data.value.as_ref().ok_or(TreeError::EmptyNode(self.id))
    }

    pub fn has_value(&self) -> bool {
        self.data.value.is_some()
    }

    pub fn child_count(&self) -> usize {
        self.data.children.len()
    }

    pub fn child(&self, index: usize) -> TreeResult<NodeRef<'a, T>> {
        self.data
            .children
            .get(index)
            .map(|&id| self.tree.node_ref(id))
            .ok_or(TreeError::IndexOutOfBounds {
                index,
                len: self.data.children.len(),
            })
    }

    pub fn child_ids(&self) -> &'a [NodeId] {
        &self.data.children
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.data.parent
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.data.parent.and_then(|id| self.tree.get(id).ok())
    }

    /// Index of this node among its parent's children.
    pub fn position(&self) -> Option<usize> {
        let id = self.id;
        self.parent()
            .and_then(|parent| parent.child_ids().iter().position(|&c| c == id))
    }

    pub fn is_root(&self) -> bool {
        self.data.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.data.children.is_empty()
    }

    /// True iff the node has no value and no children.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Children left to right.
    pub fn children(&self) -> Children<'a, T> {
        Children::new(self.tree, &self.data.children)
    }

    /// Children right to left.
    pub fn children_rev(&self) -> Rev<Children<'a, T>> {
        self.children().rev()
    }

    /// The parent's other children, in order.
    pub fn siblings(&self) -> impl Iterator<Item = NodeRef<'a, T>> + 'a {
        let id = self.id;
        self.parent()
            .into_iter()
            .flat_map(|parent| parent.children())
            .filter(move |node| node.id != id)
    }

    /// Pre-order walk of the subtree rooted here, this node first.
    pub fn pre_order(&self) -> PreOrder<'a, T> {
        PreOrder::new(self.tree, Some(self.id))
    }

    pub fn post_order(&self) -> PostOrder<'a, T> {
        PostOrder::new(self.tree, Some(self.id))
    }

    /// Identity check: same tree, same handle.
    pub fn same_node(&self, other: &NodeRef<'_, T>) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

/// Exclusive view of one node; the only way to change a node's payload or
/// its list of children.
///
/// The parent is exposed as a handle only, a child cannot reach up and edit
/// its parent's children.
pub struct NodeMut<'a, T> {
    tree: &'a mut Tree<T>,
    id: NodeId,
}

impl<'a, T> NodeMut<'a, T> {
    pub(crate) fn new(tree: &'a mut Tree<T>, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Read-only view of this node for the duration of the borrow.
    pub fn as_node_ref(&self) -> NodeRef<'_, T> {
        self.tree.node_ref(self.id)
    }

    pub fn into_ref(self) -> NodeRef<'a, T> {
        let NodeMut { tree, id } = self;
        tree.node_ref(id)
    }

    fn data(&self) -> &NodeData<T> {
        self.tree.live(self.id)
    }

    pub fn value(&self) -> TreeResult<&T> {
        self.data().value.as_ref().ok_or(TreeError::EmptyNode(self.id))
    }

    pub fn value_mut(&mut self) -> TreeResult<&mut T> {
        let id = self.id;
        self.tree
            .live_mut(id)
            .value
            .as_mut()
            .ok_or(TreeError::EmptyNode(id))
    }

    pub fn has_value(&self) -> bool {
        self.data().value.is_some()
    }

    /// Stores `value`, returning the previous payload.
    #[instrument(level = "trace", skip_all, fields(node = %self.id))]
    pub fn set_value(&mut self, value: T) -> Option<T> {
        let id = self.id;
        self.tree.live_mut(id).value.replace(value)
    }

    #[instrument(level = "trace", skip_all, fields(node = %self.id))]
    pub fn take_value(&mut self) -> Option<T> {
        let id = self.id;
        self.tree.live_mut(id).value.take()
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.data().parent
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.data().children.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Appends a new child holding `value` and returns its handle.
    #[instrument(level = "trace", skip_all, fields(node = %self.id))]
    pub fn add_child(&mut self, value: T) -> NodeId {
        self.tree.append(self.id, Some(value))
    }

    /// Appends a child without a value.
    #[instrument(level = "trace", skip_all, fields(node = %self.id))]
    pub fn add_empty_child(&mut self) -> NodeId {
        self.tree.append(self.id, None)
    }

    /// Moves all nodes of `subtree` below this node as its last child.
    ///
    /// Returns the handle of the former root of `subtree`, now valid in this
    /// tree. Handles taken from `subtree` are not valid here.
    #[instrument(level = "debug", skip_all, fields(node = %self.id))]
    pub fn add_subtree(&mut self, subtree: Tree<T>) -> NodeId {
        self.tree.graft(self.id, subtree)
    }

    /// Removes the child at `position` with its descendants and returns the
    /// child's payload.
    ///
    /// `position == child_count()` is the end position and is rejected with
    /// [`TreeError::InvalidIteratorPosition`]; the tree is left unchanged.
    #[instrument(level = "debug", skip(self), fields(node = %self.id))]
    pub fn remove_child(&mut self, position: usize) -> TreeResult<Option<T>> {
        self.tree.remove_child_at(self.id, position)
    }

    /// Removes the child with handle `child`, see [`NodeMut::remove_child`].
    #[instrument(level = "debug", skip(self), fields(node = %self.id))]
    pub fn remove_child_id(&mut self, child: NodeId) -> TreeResult<Option<T>> {
        let position = self
            .data()
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(TreeError::NotAChild {
                parent: self.id,
                child,
            })?;
        self.remove_child(position)
    }

    pub fn child_mut(&mut self, index: usize) -> TreeResult<NodeMut<'_, T>> {
        let children = &self.data().children;
        let id = *children.get(index).ok_or(TreeError::IndexOutOfBounds {
            index,
            len: children.len(),
        })?;
        Ok(NodeMut::new(&mut *self.tree, id))
    }
}
