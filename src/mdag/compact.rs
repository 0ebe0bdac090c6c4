//! The frozen, array-backed form of a settled automaton.

use std::fmt;

use tracing::debug;

use super::char_trait::MdagChar;
use super::node::NodeId;
use super::node_arena::NodeArena;
use super::query::WordGraph;

/// One transition of a [`FrozenMdag`], together with what it leads to.
///
/// The record describes its target node: whether the target accepts, and
/// where the target's own transitions live in the record array. A node's
/// transitions occupy `records[block_start..block_start + out_degree]`,
/// sorted by label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FrozenRecord<C: MdagChar> {
    letter: C,
    accept: bool,
    out_degree: u32,
    block_start: u32,
}

impl<C: MdagChar> FrozenRecord<C> {
    /// Label of the transition. `C::default()` for the source record.
    pub fn letter(&self) -> C {
        self.letter
    }

    /// True if the target node accepts.
    pub fn is_accept(&self) -> bool {
        self.accept
    }

    /// Number of transitions leaving the target node.
    pub fn out_degree(&self) -> usize {
        self.out_degree as usize
    }

    /// Index of the target node's first transition.
    pub fn block_start(&self) -> usize {
        self.block_start as usize
    }

    fn block(&self) -> std::ops::Range<usize> {
        self.block_start()..self.block_start() + self.out_degree()
    }
}

/// An immutable automaton stored as one flat array of transition records.
///
/// Produced by [`Mdag::freeze`](super::Mdag::freeze) or
/// [`Mdag::compact`](super::Mdag::compact). It never changes, so it can be
/// shared across threads and queried concurrently. Later edits to the `Mdag`
/// it came from are not reflected.
///
/// # Examples
///
/// ```
/// use libmdag::mdag::{build_mdag, WordGraph};
///
/// let frozen = build_mdag(["tap", "taps", "top", "tops"]).compact();
/// assert!(frozen.contains("tops"));
/// assert!(!frozen.contains("to"));
/// assert_eq!(frozen.transition_count(), 5);
/// assert_eq!(frozen.words_ending_with::<String>("ps").len(), 2);
/// ```
#[derive(Clone)]
pub struct FrozenMdag<C: MdagChar> {
    records: Box<[FrozenRecord<C>]>,
    source: FrozenRecord<C>,
    node_count: usize,
}

impl<C: MdagChar> FrozenMdag<C> {
    /// Number of transitions, which is also the length of the record array.
    pub fn transition_count(&self) -> usize {
        self.records.len()
    }

    /// Number of nodes, not counting the source.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The record array.
    pub fn records(&self) -> &[FrozenRecord<C>] {
        &self.records
    }

    fn block(&self, state: FrozenRecord<C>) -> &[FrozenRecord<C>] {
        &self.records[state.block()]
    }
}

impl<C: MdagChar> fmt::Debug for FrozenMdag<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrozenMdag")
            .field("node_count", &self.node_count)
            .field("transition_count", &self.transition_count())
            .finish()
    }
}

impl<C: MdagChar> WordGraph<C> for FrozenMdag<C> {
    type State = FrozenRecord<C>;

    fn source(&self) -> FrozenRecord<C> {
        self.source
    }

    fn is_accept(&self, state: FrozenRecord<C>) -> bool {
        state.accept
    }

    fn transition(&self, state: FrozenRecord<C>, letter: C) -> Option<FrozenRecord<C>> {
        let block = self.block(state);
        block
            .binary_search_by(|record| record.letter.cmp(&letter))
            .ok()
            .map(|pos| block[pos])
    }

    fn transitions(&self, state: FrozenRecord<C>) -> impl Iterator<Item = (C, FrozenRecord<C>)> + '_ {
        self.block(state).iter().map(|record| (record.letter, *record))
    }
}

/// Lays out every node reachable from the source as a contiguous block of
/// records, depth first, each node exactly once.
struct Compactor<'a, C: MdagChar> {
    arena: &'a NodeArena<C>,
    records: Vec<FrozenRecord<C>>,
    /// Block start per arena slot, once assigned.
    block_starts: Vec<Option<u32>>,
    /// First unassigned record index.
    end: usize,
    nodes: usize,
}

impl<C: MdagChar> Compactor<'_, C> {
    /// Assigns `id`'s block, and recursively those of its children, returning
    /// the block start. A child's block is assigned before the parent's record
    /// pointing at it is written.
    fn assign(&mut self, id: NodeId) -> u32 {
        if let Some(start) = self.block_starts[id.index()] {
            return start;
        }
        let arena = self.arena;
        let node = arena.node(id);
        let start = self.end;
        self.end += node.out_degree();
        self.block_starts[id.index()] = Some(record_index(start));
        self.nodes += 1;

        for (offset, (letter, child)) in node.transitions().enumerate() {
            let child_start = self.assign(child);
            let target = arena.node(child);
            self.records[start + offset] = FrozenRecord {
                letter,
                accept: target.is_accept(),
                out_degree: record_index(target.out_degree()),
                block_start: child_start,
            };
        }
        record_index(start)
    }
}

/// Record offsets are stored as `u32`, the same bound as [`NodeId`].
fn record_index(index: usize) -> u32 {
    u32::try_from(index).expect("frozen automaton exceeds u32::MAX records")
}

/// Flattens the graph held by `arena`. The graph should be minimal, but the
/// result is correct for any acyclic graph.
pub(crate) fn compact<C: MdagChar>(arena: &NodeArena<C>) -> FrozenMdag<C> {
    let mut compactor = Compactor {
        arena,
        records: vec![FrozenRecord::default(); arena.transition_count()],
        block_starts: vec![None; arena.capacity()],
        end: 0,
        nodes: 0,
    };
    let source_start = compactor.assign(NodeId::SOURCE);
    debug_assert_eq!(source_start, 0);
    debug_assert_eq!(compactor.end, compactor.records.len(), "every transition gets one record");

    let source = arena.node(NodeId::SOURCE);
    let frozen = FrozenMdag {
        records: compactor.records.into_boxed_slice(),
        source: FrozenRecord {
            letter: C::default(),
            accept: source.is_accept(),
            out_degree: record_index(source.out_degree()),
            block_start: source_start,
        },
        node_count: compactor.nodes - 1,
    };
    debug!(
        nodes = frozen.node_count,
        transitions = frozen.transition_count(),
        "compacted automaton"
    );
    frozen
}
