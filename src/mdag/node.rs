use std::fmt;
use std::hash;

use smallvec::SmallVec;

use super::char_trait::MdagChar;

/// Outgoing transitions of a node, sorted by label. Most nodes in a minimized
/// word graph have one or two transitions, so those stay inline.
pub(crate) type Transitions<C> = SmallVec<[(C, NodeId); 2]>;

/// Stable index of a node inside the automaton's arena.
///
/// Ids are only meaningful for the automaton that handed them out, and a
/// freed id may be reused by a later allocation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The source node: the state reached by the empty prefix.
    pub const SOURCE: NodeId = NodeId(0);

    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(u32::try_from(index).expect("node arena exceeds u32::MAX slots"))
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A vertex of the mutable word graph.
///
/// `incoming` counts the edges anywhere in the graph that target this node.
/// It decides whether a node is private to one path or shared, and it is not
/// part of the node's structural identity.
#[derive(Clone, Debug, Eq)]
pub(crate) struct Node<C: MdagChar> {
    accept: bool,
    transitions: Transitions<C>,
    incoming: usize,
}

impl<C: MdagChar> Node<C> {
    /// Creates a node without transitions or incoming edges.
    pub(crate) fn new(accept: bool) -> Self {
        Node {
            accept,
            transitions: SmallVec::new(),
            incoming: 0,
        }
    }

    /// Creates a detached copy: same accept flag and transitions, no incoming edges.
    pub(crate) fn detached_copy(&self) -> Self {
        Node {
            accept: self.accept,
            transitions: self.transitions.clone(),
            incoming: 0,
        }
    }

    /// True if the path reaching this node spells a stored word.
    #[inline]
    pub(crate) fn is_accept(&self) -> bool {
        self.accept
    }

    pub(crate) fn set_accept(&mut self, accept: bool) {
        self.accept = accept;
    }

    #[inline]
    pub(crate) fn incoming_count(&self) -> usize {
        self.incoming
    }

    pub(crate) fn increment_incoming(&mut self) {
        self.incoming += 1;
    }

    pub(crate) fn decrement_incoming(&mut self) {
        self.incoming = self
            .incoming
            .checked_sub(1)
            .expect("incoming count dropped below zero");
    }

    /// Returns the target of the transition labeled `letter`.
    #[inline]
    pub(crate) fn transition(&self, letter: C) -> Option<NodeId> {
        self.position(letter).ok().map(|pos| self.transitions[pos].1)
    }

    #[inline]
    pub(crate) fn has_outgoing(&self, letter: C) -> bool {
        self.position(letter).is_ok()
    }

    #[inline]
    pub(crate) fn has_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    #[inline]
    pub(crate) fn out_degree(&self) -> usize {
        self.transitions.len()
    }

    /// The transition with the greatest label. Under ascending insertion this is
    /// the most recently added one.
    pub(crate) fn last_transition(&self) -> Option<(C, NodeId)> {
        self.transitions.last().copied()
    }

    /// Transitions in label order.
    pub(crate) fn transitions(&self) -> impl ExactSizeIterator<Item = (C, NodeId)> + '_ {
        self.transitions.iter().copied()
    }

    pub(crate) fn transition_slice(&self) -> &[(C, NodeId)] {
        &self.transitions
    }

    /// Inserts a transition in sorted position.
    ///
    /// Panics if `letter` already exists.
    pub(crate) fn insert_transition(&mut self, letter: C, target: NodeId) {
        match self.position(letter) {
            Ok(_) => panic!("insert_transition: letter {letter:?} already exists"),
            Err(pos) => self.transitions.insert(pos, (letter, target)),
        }
    }

    /// Points the transition labeled `letter` at `target` and returns the previous target.
    ///
    /// Panics if `letter` is not present.
    pub(crate) fn replace_transition(&mut self, letter: C, target: NodeId) -> NodeId {
        let pos = self
            .position(letter)
            .unwrap_or_else(|_| panic!("replace_transition: letter {letter:?} not found"));
        std::mem::replace(&mut self.transitions[pos].1, target)
    }

    /// Removes the transition labeled `letter` and returns its target.
    pub(crate) fn remove_transition(&mut self, letter: C) -> Option<NodeId> {
        let pos = self.position(letter).ok()?;
        Some(self.transitions.remove(pos).1)
    }

    fn position(&self, letter: C) -> Result<usize, usize> {
        self.transitions.binary_search_by(|&(c, _)| c.cmp(&letter))
    }
}

// Structural identity: accept flag plus (label, child id) pairs. Child ids are
// compared as plain indices, which is only sound because children are
// canonicalized before their parents are hashed or compared.
impl<C: MdagChar> PartialEq for Node<C> {
    fn eq(&self, rhs: &Self) -> bool {
        self.accept == rhs.accept && self.transitions == rhs.transitions
    }
}

impl<C: MdagChar> hash::Hash for Node<C> {
    fn hash<H>(&self, state: &mut H)
    where
        H: hash::Hasher,
    {
        self.accept.hash(state);
        self.transitions.as_slice().hash(state);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::hash::BuildHasher;

    fn id(n: usize) -> NodeId {
        NodeId::from_index(n)
    }

    #[test]
    fn no_transitions() {
        let n = Node::<char>::new(false);
        assert_eq!(n.transitions().next(), None);
        assert_eq!(n.out_degree(), 0);
        assert!(!n.has_transitions());
        assert_eq!(n.last_transition(), None);
    }

    #[test]
    fn transitions_stay_sorted() {
        let mut n = Node::new(false);
        n.insert_transition('c', id(3));
        n.insert_transition('a', id(1));
        n.insert_transition('b', id(2));
        let letters: Vec<char> = n.transitions().map(|(c, _)| c).collect();
        assert_eq!(letters, ['a', 'b', 'c']);
        assert_eq!(n.transition('b'), Some(id(2)));
        assert_eq!(n.transition('d'), None);
        assert!(n.has_outgoing('a'));
        assert!(!n.has_outgoing('z'));
        assert_eq!(n.last_transition(), Some(('c', id(3))));
    }

    #[test]
    #[should_panic(expected = "already exists")]
    fn duplicate_letter_panics() {
        let mut n = Node::new(false);
        n.insert_transition('a', id(1));
        n.insert_transition('a', id(2));
    }

    #[test]
    fn replace_and_remove() {
        let mut n = Node::new(false);
        n.insert_transition('a', id(1));
        n.insert_transition('b', id(2));
        assert_eq!(n.replace_transition('a', id(7)), id(1));
        assert_eq!(n.transition('a'), Some(id(7)));
        assert_eq!(n.remove_transition('b'), Some(id(2)));
        assert_eq!(n.remove_transition('b'), None);
        assert_eq!(n.out_degree(), 1);
    }

    #[test]
    fn a_thousand_transitions() {
        let mut n = Node::new(false);
        let letters: Vec<char> = (0..).filter_map(std::char::from_u32).take(1000).collect();
        for (i, ch) in letters.clone().into_iter().enumerate().rev() {
            n.insert_transition(ch, id(i));
        }
        for (i, ch) in letters.into_iter().enumerate() {
            assert_eq!(n.transition(ch), Some(id(i)));
        }
        assert_eq!(n.out_degree(), 1000);
    }

    #[test]
    fn equality_ignores_incoming_count() {
        let mut n1 = Node::new(true);
        n1.insert_transition('a', id(1));
        n1.insert_transition('b', id(2));
        let mut n2 = n1.detached_copy();
        n2.increment_incoming();
        n2.increment_incoming();
        assert_eq!(n1, n2);

        let hasher = hashbrown::DefaultHashBuilder::default();
        assert_eq!(hasher.hash_one(&n1), hasher.hash_one(&n2));
    }

    #[test]
    fn equality_depends_on_accept_and_targets() {
        let mut n1 = Node::new(false);
        n1.insert_transition('a', id(1));
        let mut n2 = Node::new(true);
        n2.insert_transition('a', id(1));
        let mut n3 = Node::new(false);
        n3.insert_transition('a', id(2));
        assert_ne!(n1, n2);
        assert_ne!(n1, n3);
    }

    #[test]
    fn detached_copy_has_no_incoming_edges() {
        let mut n = Node::new(true);
        n.insert_transition('x', id(4));
        n.increment_incoming();
        let copy = n.detached_copy();
        assert_eq!(copy.incoming_count(), 0);
        assert!(copy.is_accept());
        assert_eq!(copy.transition('x'), Some(id(4)));
    }
}
