//! The equivalence registry: one canonical node per structural signature.

use std::hash::BuildHasher;

use hashbrown::{DefaultHashBuilder, HashSet, HashTable};
use smallvec::SmallVec;

use super::char_trait::MdagChar;
use super::error::InvariantViolation;
use super::node::{Node, NodeId};
use super::node_arena::NodeArena;

/// Maps a node signature (accept flag plus `(label, child)` pairs) to the one
/// canonical node carrying it.
///
/// Entries are keyed by the current contents of the node they name, so a
/// registered node must be unregistered before it is mutated.
pub(crate) struct EquivalenceRegistry {
    table: HashTable<NodeId>,
    hasher: DefaultHashBuilder,
}

impl EquivalenceRegistry {
    pub(crate) fn new() -> Self {
        EquivalenceRegistry {
            table: HashTable::new(),
            hasher: DefaultHashBuilder::default(),
        }
    }

    /// Number of equivalence classes.
    pub(crate) fn len(&self) -> usize {
        self.table.len()
    }

    fn hash<C: MdagChar>(hasher: &DefaultHashBuilder, node: &Node<C>) -> u64 {
        hasher.hash_one(node)
    }

    /// Returns the canonical node equivalent to `id`, which may be `id` itself.
    pub(crate) fn find<C: MdagChar>(&self, arena: &NodeArena<C>, id: NodeId) -> Option<NodeId> {
        let node = arena.node(id);
        let hash = Self::hash(&self.hasher, node);
        self.table
            .find(hash, |&candidate| arena.node(candidate) == node)
            .copied()
    }

    /// True if `id` itself is the registered representative of its class.
    pub(crate) fn is_registered<C: MdagChar>(&self, arena: &NodeArena<C>, id: NodeId) -> bool {
        let hash = Self::hash(&self.hasher, arena.node(id));
        self.table.find(hash, |&candidate| candidate == id).is_some()
    }

    /// Makes `id` the representative of its class.
    pub(crate) fn register<C: MdagChar>(&mut self, arena: &NodeArena<C>, id: NodeId) {
        debug_assert!(
            arena.node(id).transitions().all(|(_, child)| self.is_registered(arena, child)),
            "cannot register {id} before its children are canonical"
        );
        debug_assert!(self.find(arena, id).is_none(), "{id} already has a canonical equivalent");
        let Self { table, hasher } = self;
        let hash = Self::hash(hasher, arena.node(id));
        table.insert_unique(hash, id, |&entry| Self::hash(hasher, arena.node(entry)));
    }

    /// Drops the entry for `id` if `id` is the registered representative.
    /// Returns whether an entry was removed.
    pub(crate) fn unregister<C: MdagChar>(&mut self, arena: &NodeArena<C>, id: NodeId) -> bool {
        let hash = Self::hash(&self.hasher, arena.node(id));
        match self.table.find_entry(hash, |&candidate| candidate == id) {
            Ok(entry) => {
                entry.remove();
                true
            }
            Err(_) => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
    }

    /// Merges `child`, the target of `parent --letter-->`, into its canonical
    /// equivalent, or registers it when it is the first of its class.
    pub(crate) fn merge_or_register<C: MdagChar>(
        &mut self,
        arena: &mut NodeArena<C>,
        parent: NodeId,
        letter: C,
        child: NodeId,
    ) {
        match self.find(arena, child) {
            Some(canonical) if canonical != child => {
                arena.reassign_outgoing_transition(parent, letter, child, canonical);
                self.release(arena, child);
            }
            Some(_) => {}
            None => self.register(arena, child),
        }
    }

    /// Minimizes the chain of most recently added transitions hanging off `origin`.
    ///
    /// Nodes are processed deepest first, so every node's children are
    /// canonical by the time the node itself is looked up. `origin` is left
    /// unregistered: it is still on the path of the word being built.
    pub(crate) fn replace_or_register<C: MdagChar>(&mut self, arena: &mut NodeArena<C>, origin: NodeId) {
        let mut chain: SmallVec<[(NodeId, C, NodeId); 32]> = SmallVec::new();
        let mut parent = origin;
        while let Some((letter, child)) = arena.node(parent).last_transition() {
            chain.push((parent, letter, child));
            parent = child;
        }
        for (parent, letter, child) in chain.into_iter().rev() {
            self.merge_or_register(arena, parent, letter, child);
        }
    }

    /// Frees `id` if nothing references it any more, cascading to children
    /// that lose their last parent. The source is never freed.
    pub(crate) fn release<C: MdagChar>(&mut self, arena: &mut NodeArena<C>, id: NodeId) {
        if id == NodeId::SOURCE || arena.node(id).incoming_count() > 0 {
            return;
        }
        self.unregister(arena, id);
        let node = arena.free(id);
        for (_, child) in node.transitions() {
            arena.decrement_incoming(child);
            self.release(arena, child);
        }
    }

    /// Rebuilds the registry from scratch, merging every pair of equivalent
    /// nodes reachable from the source.
    pub(crate) fn minimize<C: MdagChar>(&mut self, arena: &mut NodeArena<C>) {
        self.clear();
        let mut visited = HashSet::new();
        self.minimize_below(arena, NodeId::SOURCE, &mut visited);
    }

    fn minimize_below<C: MdagChar>(
        &mut self,
        arena: &mut NodeArena<C>,
        origin: NodeId,
        visited: &mut HashSet<NodeId>,
    ) {
        let transitions: SmallVec<[(C, NodeId); 8]> = arena.node(origin).transitions().collect();
        for (letter, child) in transitions {
            // No allocation happens during minimization, so a visited id is never
            // recycled for a different node.
            if visited.insert(child) {
                self.minimize_below(arena, child, visited);
            }
            self.merge_or_register(arena, origin, letter, child);
        }
    }

    /// Checks that the live non-source nodes are pairwise inequivalent and all
    /// registered. Only holds for a settled automaton.
    pub(crate) fn verify_minimal<C: MdagChar>(&self, arena: &NodeArena<C>) -> Result<(), InvariantViolation> {
        let mut seen: HashTable<NodeId> = HashTable::new();
        for id in arena.ids().filter(|&id| id != NodeId::SOURCE) {
            let node = arena.node(id);
            let hash = Self::hash(&self.hasher, node);
            if let Some(&first) = seen.find(hash, |&other| arena.node(other) == node) {
                return Err(InvariantViolation::NotMinimal { first, second: id });
            }
            seen.insert_unique(hash, id, |&entry| Self::hash(&self.hasher, arena.node(entry)));
            if !self.is_registered(arena, id) {
                return Err(InvariantViolation::Unregistered { node: id });
            }
        }
        Ok(())
    }
}
