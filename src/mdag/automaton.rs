use std::fmt;

use tracing::{debug, error};

use super::builder::BuildContext;
use super::char_trait::MdagChar;
use super::compact::{self, FrozenMdag};
use super::config::MdagConfig;
use super::error::{InvariantViolation, MdagError};
use super::node::NodeId;
use super::node_arena::NodeArena;
use super::registry::EquivalenceRegistry;

/// A mutable minimal acyclic finite-state automaton (MDAG) storing a set of words.
///
/// Words share both prefixes and suffixes: every set of words that continue the
/// same way after some prefix ends in the same node. Words can be inserted in
/// any order and removed again; the graph stays minimal after each settled
/// operation. For read-heavy use, [`freeze`](Mdag::freeze) or
/// [`compact`](Mdag::compact) produce an immutable array form.
///
/// Querying goes through the [`WordGraph`](super::WordGraph) trait.
///
/// # Examples
///
/// ```
/// use libmdag::mdag::{Mdag, WordGraph};
///
/// let mut mdag = Mdag::new();
/// for word in ["BAKE", "CAKE", "FAKE", "LAKE", "MAKE"] {
///     mdag.insert(word);
/// }
/// mdag.finish();
///
/// assert!(mdag.contains("CAKE"));
/// assert!(!mdag.contains("AKE"));
/// // {B,C,F,L,M} -> A -> K -> E
/// assert_eq!(mdag.node_count(), 3);
///
/// mdag.remove("BAKE");
/// assert!(!mdag.contains("BAKE"));
/// ```
pub struct Mdag<C: MdagChar> {
    pub(crate) arena: NodeArena<C>,
    pub(crate) registry: EquivalenceRegistry,
    pub(crate) context: BuildContext<C>,
    pub(crate) config: MdagConfig,
}

impl<C: MdagChar> Default for Mdag<C> {
    fn default() -> Self {
        Mdag::new()
    }
}

impl<C: MdagChar> Mdag<C> {
    /// Creates an empty automaton with the default configuration.
    pub fn new() -> Self {
        Mdag::with_config(MdagConfig::default())
    }

    /// Creates an empty automaton.
    pub fn with_config(config: MdagConfig) -> Self {
        Mdag {
            arena: NodeArena::new(),
            registry: EquivalenceRegistry::new(),
            context: BuildContext::new(),
            config,
        }
    }

    /// The configuration this automaton was created with.
    pub fn config(&self) -> &MdagConfig {
        &self.config
    }

    /// Minimizes whatever the last insertions left pending.
    ///
    /// After `finish` the graph is minimal and [`freeze`](Mdag::freeze)
    /// succeeds. Inserting afterwards is allowed: words no longer need to be
    /// in order relative to what came before, but later inserts no longer
    /// take the ascending fast path. Calling `finish` on a settled automaton
    /// does nothing.
    pub fn finish(&mut self) {
        if self.context.is_pending() {
            if self.config.is_incremental() {
                if self.arena.node(NodeId::SOURCE).has_transitions() {
                    self.registry.replace_or_register(&mut self.arena, NodeId::SOURCE);
                }
            } else {
                self.registry.minimize(&mut self.arena);
            }
            debug!(
                nodes = self.node_count(),
                transitions = self.transition_count(),
                classes = self.equivalence_class_count(),
                "finished pending minimization"
            );
        }
        self.context.settle();
        self.after_mutation("finish");
    }

    /// Rebuilds the equivalence registry from scratch and merges every pair of
    /// equivalent nodes, regardless of the minimization mode.
    pub fn minimize(&mut self) {
        let before = self.node_count();
        self.registry.minimize(&mut self.arena);
        self.context.settle();
        debug!(before, after = self.node_count(), "global minimization");
        self.after_mutation("minimize");
    }

    /// True when no nodes are waiting to be minimized.
    pub fn is_settled(&self) -> bool {
        !self.context.is_pending()
    }

    /// True when the automaton stores no words, not even the empty one.
    pub fn is_empty(&self) -> bool {
        let source = self.arena.node(NodeId::SOURCE);
        !source.is_accept() && !source.has_transitions()
    }

    /// Live nodes, not counting the source.
    pub fn node_count(&self) -> usize {
        self.arena.live() - 1
    }

    /// Edges in the graph.
    pub fn transition_count(&self) -> usize {
        self.arena.transition_count()
    }

    /// Number of registered equivalence classes. Equal to
    /// [`node_count`](Mdag::node_count) once the automaton is settled in
    /// incremental mode, or after [`finish`](Mdag::finish) in deferred mode.
    pub fn equivalence_class_count(&self) -> usize {
        self.registry.len()
    }

    /// Checks every structural invariant of the graph: sorted transitions,
    /// incoming counts, the transition total, acyclicity, and (once settled)
    /// minimality.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        self.arena.verify()?;
        if self.is_settled() {
            self.registry.verify_minimal(&self.arena)?;
        }
        Ok(())
    }

    /// Converts a settled automaton into its immutable array form.
    ///
    /// Fails with [`MdagError::PendingMinimization`] while insertions are
    /// still pending; see [`finish`](Mdag::finish).
    pub fn freeze(&self) -> Result<FrozenMdag<C>, MdagError> {
        if !self.is_settled() {
            return Err(MdagError::PendingMinimization);
        }
        Ok(compact::compact(&self.arena))
    }

    /// Finishes the automaton and converts it into its immutable array form.
    pub fn compact(mut self) -> FrozenMdag<C> {
        self.finish();
        compact::compact(&self.arena)
    }

    pub(crate) fn contains_slice(&self, word: &[C]) -> bool {
        self.arena
            .transition_path(NodeId::SOURCE, word)
            .is_some_and(|id| self.arena.node(id).is_accept())
    }

    /// Leaves the ascending fast path before an edit that may touch shared nodes.
    pub(crate) fn prepare_for_mutation(&mut self) {
        if self.config.is_incremental() {
            self.finish();
        } else {
            self.context.break_order();
        }
    }

    pub(crate) fn after_mutation(&self, operation: &str) {
        if !self.config.verify_invariants {
            return;
        }
        if let Err(violation) = self.verify() {
            error!(operation, %violation, "invariant check failed");
            panic!("invariant violated after {operation}: {violation}");
        }
    }
}

impl<C: MdagChar> fmt::Debug for Mdag<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mdag")
            .field("node_count", &self.node_count())
            .field("transition_count", &self.transition_count())
            .field("settled", &self.is_settled())
            .finish()
    }
}
