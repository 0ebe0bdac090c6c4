//! Index-addressed arena holding the nodes of a mutable MDAG.
//!
//! Nodes may have many parents, so ownership is tracked by each node's incoming
//! edge count instead of by references. Slots are recycled through a free-list
//! once a node's last incoming edge disappears.

use super::char_trait::MdagChar;
use super::error::InvariantViolation;
use super::node::{Node, NodeId};

pub(crate) struct NodeArena<C: MdagChar> {
    slots: Vec<Option<Node<C>>>,
    /// Reusable slots from freed nodes.
    free_list: Vec<NodeId>,
    live: usize,
    transitions: usize,
}

impl<C: MdagChar> NodeArena<C> {
    /// Creates an arena holding only a non-accepting source node.
    pub(crate) fn new() -> Self {
        NodeArena {
            slots: vec![Some(Node::new(false))],
            free_list: Vec::new(),
            live: 1,
            transitions: 0,
        }
    }

    /// Live nodes, the source included.
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn transition_count(&self) -> usize {
        self.transitions
    }

    /// Number of slots, free or not. Every `NodeId` indexes below this.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn free_slots(&self) -> usize {
        self.free_list.len()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<C> {
        self.slots[id.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("{id} refers to a freed node"))
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<C> {
        self.slots[id.index()]
            .as_mut()
            .unwrap_or_else(|| panic!("{id} refers to a freed node"))
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.slots.get(id.index()).is_some_and(Option::is_some)
    }

    /// Live node ids in slot order.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| NodeId::from_index(index))
    }

    /// Stores a node, reusing a freed slot when one is available.
    ///
    /// The node's transitions are counted, but its children's incoming counts are
    /// the caller's responsibility.
    fn alloc(&mut self, node: Node<C>) -> NodeId {
        self.live += 1;
        self.transitions += node.out_degree();
        if let Some(id) = self.free_list.pop() {
            self.slots[id.index()] = Some(node);
            id
        } else {
            self.slots.push(Some(node));
            NodeId::from_index(self.slots.len() - 1)
        }
    }

    /// Removes a node from the arena and returns it.
    ///
    /// The node must have no incoming edges. Its outgoing edges stop counting as
    /// transitions; the caller decrements the children it pointed at.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<C> {
        assert!(id != NodeId::SOURCE, "the source node is never freed");
        let node = self.slots[id.index()]
            .take()
            .unwrap_or_else(|| panic!("{id} freed twice"));
        debug_assert_eq!(node.incoming_count(), 0, "freeing {id} while it is still referenced");
        self.live -= 1;
        self.transitions -= node.out_degree();
        self.free_list.push(id);
        node
    }

    pub(crate) fn decrement_incoming(&mut self, id: NodeId) {
        self.node_mut(id).decrement_incoming();
    }

    /// Adds the edge `parent --letter--> child`.
    pub(crate) fn add_transition(&mut self, parent: NodeId, letter: C, child: NodeId) {
        self.node_mut(parent).insert_transition(letter, child);
        self.node_mut(child).increment_incoming();
        self.transitions += 1;
    }

    /// Removes the edge labeled `letter` from `parent` and returns its former target.
    ///
    /// The target is not freed even if it lost its last incoming edge.
    pub(crate) fn remove_transition(&mut self, parent: NodeId, letter: C) -> Option<NodeId> {
        let child = self.node_mut(parent).remove_transition(letter)?;
        self.decrement_incoming(child);
        self.transitions -= 1;
        Some(child)
    }

    /// Follows `letter` from `parent`, creating an accept-`accept` child if the
    /// transition is missing. An existing child is marked accepting when `accept`
    /// is set and returned unchanged otherwise.
    pub(crate) fn add_outgoing_transition(&mut self, parent: NodeId, letter: C, accept: bool) -> NodeId {
        if let Some(child) = self.node(parent).transition(letter) {
            if accept {
                self.node_mut(child).set_accept(true);
            }
            return child;
        }
        let child = self.alloc(Node::new(accept));
        self.add_transition(parent, letter, child);
        child
    }

    /// Points `parent --letter-->` at `new_target` instead of `old_target`,
    /// moving one incoming edge between them. `old_target` is not freed.
    pub(crate) fn reassign_outgoing_transition(
        &mut self,
        parent: NodeId,
        letter: C,
        old_target: NodeId,
        new_target: NodeId,
    ) {
        let previous = self.node_mut(parent).replace_transition(letter, new_target);
        debug_assert_eq!(previous, old_target, "{parent} --{letter:?}--> did not target {old_target}");
        self.decrement_incoming(old_target);
        self.node_mut(new_target).increment_incoming();
    }

    /// Creates a node with the same accept flag and transitions as `id`.
    ///
    /// Children are shared, not copied: each gains one incoming edge from the
    /// clone. The clone itself starts without incoming edges.
    pub(crate) fn clone_node(&mut self, id: NodeId) -> NodeId {
        let copy = self.node(id).detached_copy();
        for (_, child) in copy.transitions() {
            self.node_mut(child).increment_incoming();
        }
        self.alloc(copy)
    }

    /// Clones the target of `parent --letter-->` and redirects that edge to the
    /// clone. Returns the clone.
    pub(crate) fn clone_into(&mut self, parent: NodeId, letter: C) -> NodeId {
        let shared = self
            .node(parent)
            .transition(letter)
            .unwrap_or_else(|| panic!("clone_into: {parent} has no transition {letter:?}"));
        let clone = self.clone_node(shared);
        self.reassign_outgoing_transition(parent, letter, shared, clone);
        debug_assert!(
            self.node(shared).incoming_count() > 0,
            "clone_into left {shared} without parents"
        );
        clone
    }

    /// Walks `word` from `from`, stopping at the first missing transition.
    pub(crate) fn transition_path(&self, from: NodeId, word: &[C]) -> Option<NodeId> {
        word.iter()
            .try_fold(from, |id, &letter| self.node(id).transition(letter))
    }

    /// Checks the structural invariants of the whole graph.
    pub(crate) fn verify(&self) -> Result<(), InvariantViolation> {
        let mut incoming = vec![0usize; self.slots.len()];
        let mut transitions = 0;

        for id in self.ids() {
            let node = self.node(id);
            if !node.transition_slice().windows(2).all(|w| w[0].0 < w[1].0) {
                return Err(InvariantViolation::UnsortedTransitions { node: id });
            }
            for (_, child) in node.transitions() {
                if !self.is_live(child) {
                    return Err(InvariantViolation::DanglingTransition { from: id, to: child });
                }
                incoming[child.index()] += 1;
                transitions += 1;
            }
        }

        for id in self.ids() {
            let recorded = self.node(id).incoming_count();
            let actual = incoming[id.index()];
            if recorded != actual {
                return Err(InvariantViolation::IncomingCount { node: id, recorded, actual });
            }
            if id != NodeId::SOURCE && actual == 0 {
                return Err(InvariantViolation::Orphan { node: id });
            }
        }

        if transitions != self.transitions {
            return Err(InvariantViolation::TransitionCount {
                recorded: self.transitions,
                actual: transitions,
            });
        }

        self.verify_acyclic()
    }

    fn verify_acyclic(&self) -> Result<(), InvariantViolation> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.slots.len()];
        // (node, index of the next transition to explore)
        let mut stack = vec![(NodeId::SOURCE, 0usize)];
        marks[NodeId::SOURCE.index()] = Mark::OnStack;

        while let Some((id, next)) = stack.last_mut() {
            let node = self.node(*id);
            match node.transition_slice().get(*next) {
                Some(&(_, child)) => {
                    *next += 1;
                    match marks[child.index()] {
                        Mark::OnStack => return Err(InvariantViolation::Cycle { node: child }),
                        Mark::Done => {}
                        Mark::Unvisited => {
                            marks[child.index()] = Mark::OnStack;
                            stack.push((child, 0));
                        }
                    }
                }
                None => {
                    marks[id.index()] = Mark::Done;
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_arena_holds_only_the_source() {
        let arena = NodeArena::<char>::new();
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.transition_count(), 0);
        assert!(!arena.node(NodeId::SOURCE).is_accept());
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn add_outgoing_transition_creates_children() {
        let mut arena = NodeArena::new();
        let s = NodeId::SOURCE;
        let a = arena.add_outgoing_transition(s, 'a', true);
        let b = arena.add_outgoing_transition(s, 'b', false);
        let c = arena.add_outgoing_transition(s, 'c', false);
        assert_eq!(arena.node(s).out_degree(), 3);
        assert!(arena.node(a).is_accept());
        assert!(!arena.node(b).is_accept());
        assert!(!arena.node(c).is_accept());
        assert_eq!(arena.node(a).incoming_count(), 1);
        assert_eq!(arena.transition_count(), 3);
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn add_outgoing_transition_reuses_existing_child() {
        let mut arena = NodeArena::new();
        let s = NodeId::SOURCE;
        let a = arena.add_outgoing_transition(s, 'a', false);
        let again = arena.add_outgoing_transition(s, 'a', true);
        assert_eq!(a, again);
        assert!(arena.node(a).is_accept());
        assert_eq!(arena.node(a).incoming_count(), 1);
        assert_eq!(arena.transition_count(), 1);
    }

    #[test]
    fn transition_path_short_circuits() {
        let mut arena = NodeArena::new();
        let mut current = NodeId::SOURCE;
        for (i, ch) in "alphabet".chars().enumerate() {
            current = arena.add_outgoing_transition(current, ch, i == 7);
        }
        let end: Vec<char> = "alphabet".chars().collect();
        assert_eq!(arena.transition_path(NodeId::SOURCE, &end), Some(current));
        let missing: Vec<char> = "alps".chars().collect();
        assert_eq!(arena.transition_path(NodeId::SOURCE, &missing), None);
        assert_eq!(arena.transition_path(NodeId::SOURCE, &[]), Some(NodeId::SOURCE));
    }

    #[test]
    fn reassign_moves_incoming_edges() {
        let mut arena = NodeArena::new();
        let s = NodeId::SOURCE;
        let a = arena.add_outgoing_transition(s, 'a', false);
        let b = arena.add_outgoing_transition(s, 'b', false);
        let leaf = arena.add_outgoing_transition(a, 'x', true);
        let other = arena.add_outgoing_transition(b, 'y', true);

        arena.reassign_outgoing_transition(a, 'x', leaf, other);
        assert_eq!(arena.node(a).transition('x'), Some(other));
        assert_eq!(arena.node(other).incoming_count(), 2);
        assert_eq!(arena.node(leaf).incoming_count(), 0);

        let freed = arena.free(leaf);
        assert!(freed.is_accept());
        assert_eq!(arena.free_slots(), 1);
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn clone_shares_children() {
        let mut arena = NodeArena::new();
        let s = NodeId::SOURCE;
        let n = arena.add_outgoing_transition(s, 'n', false);
        let a = arena.add_outgoing_transition(n, 'a', false);
        let b = arena.add_outgoing_transition(n, 'b', true);
        let transitions_before = arena.transition_count();

        let clone = arena.clone_node(n);
        assert_ne!(clone, n);
        assert_eq!(arena.node(clone), arena.node(n));
        assert_eq!(arena.node(clone).incoming_count(), 0);
        assert_eq!(arena.node(a).incoming_count(), 2);
        assert_eq!(arena.node(b).incoming_count(), 2);
        assert_eq!(arena.transition_count(), transitions_before + 2);
    }

    #[test]
    fn clone_into_redirects_parent() {
        let mut arena = NodeArena::new();
        let s = NodeId::SOURCE;
        let shared = arena.add_outgoing_transition(s, 'a', false);
        arena.add_outgoing_transition(shared, 'z', true);
        let other = arena.add_outgoing_transition(s, 'b', false);
        arena.add_transition(other, 'c', shared);
        assert_eq!(arena.node(shared).incoming_count(), 2);

        let clone = arena.clone_into(other, 'c');
        assert_eq!(arena.node(other).transition('c'), Some(clone));
        assert_eq!(arena.node(clone).incoming_count(), 1);
        assert_eq!(arena.node(shared).incoming_count(), 1);
        assert!(arena.node(clone).has_outgoing('z'));
        assert!(arena.verify().is_ok());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = NodeArena::new();
        let a = arena.add_outgoing_transition(NodeId::SOURCE, 'a', true);
        arena.remove_transition(NodeId::SOURCE, 'a');
        arena.free(a);
        assert_eq!(arena.live(), 1);
        let b = arena.add_outgoing_transition(NodeId::SOURCE, 'b', true);
        assert_eq!(a, b);
        assert_eq!(arena.capacity(), 2);
    }

    #[test]
    fn verify_detects_incoming_mismatch() {
        let mut arena = NodeArena::new();
        let a = arena.add_outgoing_transition(NodeId::SOURCE, 'a', true);
        arena.node_mut(a).increment_incoming();
        assert_eq!(
            arena.verify(),
            Err(InvariantViolation::IncomingCount { node: a, recorded: 2, actual: 1 })
        );
    }

    #[test]
    fn verify_detects_cycles() {
        let mut arena = NodeArena::new();
        let a = arena.add_outgoing_transition(NodeId::SOURCE, 'a', false);
        let b = arena.add_outgoing_transition(a, 'b', false);
        arena.add_transition(b, 'c', a);
        assert!(matches!(arena.verify(), Err(InvariantViolation::Cycle { .. })));
    }
}
