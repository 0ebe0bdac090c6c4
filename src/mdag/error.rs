use thiserror::Error;

use super::node::NodeId;

/// Errors returned by [`Mdag`](super::Mdag) operations that callers can recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MdagError {
    /// The automaton still holds unminimized nodes from an insertion in progress.
    ///
    /// Call [`Mdag::finish`](super::Mdag::finish) or
    /// [`Mdag::minimize`](super::Mdag::minimize) before freezing.
    #[error("automaton has pending unminimized nodes; finish or minimize it before freezing")]
    PendingMinimization,
}

/// A broken structural invariant, reported by [`Mdag::verify`](super::Mdag::verify).
///
/// These indicate a bug in the automaton, never a usage error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node's transitions are not strictly sorted by label.
    #[error("transitions of {node} are not sorted or contain a duplicate label")]
    UnsortedTransitions {
        /// The offending node.
        node: NodeId,
    },

    /// A transition targets a freed arena slot.
    #[error("{from} has a transition to freed node {to}")]
    DanglingTransition {
        /// Node holding the transition.
        from: NodeId,
        /// Freed target.
        to: NodeId,
    },

    /// A node's recorded incoming count differs from the edges that target it.
    #[error("{node} records {recorded} incoming edges but {actual} exist")]
    IncomingCount {
        /// The offending node.
        node: NodeId,
        /// Count stored on the node.
        recorded: usize,
        /// Count observed in the graph.
        actual: usize,
    },

    /// A live node other than the source has no incoming edges.
    #[error("{node} is live but unreachable")]
    Orphan {
        /// The unreachable node.
        node: NodeId,
    },

    /// The running transition total differs from the edges in the graph.
    #[error("transition count is {recorded} but the graph has {actual} transitions")]
    TransitionCount {
        /// Running total kept by the arena.
        recorded: usize,
        /// Edges observed in the graph.
        actual: usize,
    },

    /// The graph contains a cycle through the given node.
    #[error("cycle detected through {node}")]
    Cycle {
        /// A node on the cycle.
        node: NodeId,
    },

    /// Two live nodes are structurally equivalent in a settled automaton.
    #[error("{first} and {second} are structurally equivalent")]
    NotMinimal {
        /// One node of the equivalent pair.
        first: NodeId,
        /// The other node.
        second: NodeId,
    },

    /// A live node of a settled automaton is missing from the equivalence registry.
    #[error("{node} is not registered as canonical")]
    Unregistered {
        /// The unregistered node.
        node: NodeId,
    },
}
