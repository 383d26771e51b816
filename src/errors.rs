use thiserror::Error;

use crate::arena::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node {0} has no value")]
    EmptyNode(NodeId),

    #[error("Child index {index} out of bounds: node has {len} children")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid child position {position}: node has {len} children, end is not removable")]
    InvalidIteratorPosition { position: usize, len: usize },

    #[error("Stale node handle: {0}")]
    StaleHandle(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
}

pub type TreeResult<T> = Result<T, TreeError>;
