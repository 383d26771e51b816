//! Ordered N-ary tree container.
//!
//! All nodes of a [`Tree`] live in one generational arena and refer to each
//! other through [`NodeId`] handles. A node owns its children, the parent
//! link is a plain handle and never keeps anything alive. Reading through a
//! handle whose node was removed fails with [`TreeError::StaleHandle`].
//!
//! ```
//! use ntree::Tree;
//!
//! let mut tree = Tree::with_value(0);
//! let first = tree.root_mut().add_child(1);
//! tree.get_mut(first).unwrap().add_child(11);
//! tree.root_mut().add_child(2);
//!
//! let walk: Vec<i32> = tree.values().copied().collect();
//! assert_eq!(walk, vec![0, 1, 11, 2]);
//! ```

pub mod arena;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exitcode;
pub mod node;
pub mod traversal;
pub mod tree_traits;
pub mod util;

pub use arena::{NodeId, Tree};
pub use errors::{TreeError, TreeResult};
pub use node::{NodeMut, NodeRef};
pub use traversal::{Children, Leaves, LevelOrder, PostOrder, PreOrder, PreOrderCursor};
pub use tree_traits::TreeRender;
