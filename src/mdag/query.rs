//! Read-only traversal shared by the live and the frozen automaton.

use std::collections::BTreeSet;

use super::automaton::Mdag;
use super::builder::IntoWord;
use super::char_trait::MdagChar;
use super::node::NodeId;

/// Which words the generalized enumerator keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// Words starting with the needle.
    Prefix,
    /// Words ending with the needle.
    Suffix,
    /// Words containing the needle anywhere.
    Substring,
}

impl SearchMode {
    /// True if `word` satisfies this mode's condition for `needle`. The empty
    /// needle matches every word.
    pub fn matches<C: PartialEq>(self, word: &[C], needle: &[C]) -> bool {
        match self {
            SearchMode::Prefix => word.starts_with(needle),
            SearchMode::Suffix => word.ends_with(needle),
            SearchMode::Substring => needle.is_empty() || word.windows(needle.len()).any(|w| w == needle),
        }
    }
}

/// Queries over a word graph.
///
/// Implementors only describe how to step through their states; every query
/// is a default method and behaves the same on [`Mdag`] and
/// [`FrozenMdag`](super::FrozenMdag).
///
/// Enumerating queries return a [`BTreeSet`] of any word type that can be
/// collected from labels, so `String` works for `char` graphs and `Vec<u8>`
/// for byte graphs.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use libmdag::mdag::{build_mdag, WordGraph};
///
/// let mdag = build_mdag(["car", "cat", "cats", "do", "dog", "doggy"]);
/// assert!(mdag.contains("dog"));
/// assert!(!mdag.contains("ca"));
/// assert!(mdag.has_prefix("ca"));
/// assert_eq!(mdag.longest_stored_prefix::<String>("doggyland"), "doggy");
///
/// let expected: BTreeSet<String> = ["do", "dog", "doggy"].map(String::from).into();
/// assert_eq!(mdag.words_with_prefix::<String>("do"), expected);
/// ```
pub trait WordGraph<C: MdagChar> {
    /// A position in the graph.
    type State: Copy;

    /// The state reached by the empty word.
    fn source(&self) -> Self::State;

    /// True if the word spelled by the path to `state` is stored.
    fn is_accept(&self, state: Self::State) -> bool;

    /// Follows the transition labeled `letter`, if any.
    fn transition(&self, state: Self::State, letter: C) -> Option<Self::State>;

    /// Outgoing transitions of `state` in label order.
    fn transitions(&self, state: Self::State) -> impl Iterator<Item = (C, Self::State)> + '_;

    /// Follows `word` from the source. Returns `None` as soon as a label is missing.
    fn walk(&self, word: impl IntoWord<C>) -> Option<Self::State> {
        let word = word.collect_word();
        self.walk_from(self.source(), &word)
    }

    /// Follows `word` from `from`.
    fn walk_from(&self, from: Self::State, word: &[C]) -> Option<Self::State> {
        word.iter().try_fold(from, |state, &letter| self.transition(state, letter))
    }

    /// True if `word` is stored.
    fn contains(&self, word: impl IntoWord<C>) -> bool {
        self.walk(word).is_some_and(|state| self.is_accept(state))
    }

    /// True if some stored word starts with `prefix`.
    fn has_prefix(&self, prefix: impl IntoWord<C>) -> bool {
        self.walk(prefix).is_some()
    }

    /// The longest prefix of `word` that is itself a stored word, or the empty
    /// word if there is none.
    fn longest_stored_prefix<W: FromIterator<C>>(&self, word: impl IntoWord<C>) -> W {
        let word = word.collect_word();
        let mut state = self.source();
        let mut longest = 0;
        for (i, &letter) in word.iter().enumerate() {
            match self.transition(state, letter) {
                Some(next) => state = next,
                None => break,
            }
            if self.is_accept(state) {
                longest = i + 1;
            }
        }
        word[..longest].iter().copied().collect()
    }

    /// Depth-first enumeration below `state`.
    ///
    /// `path` holds the labels leading to `state` and is restored before
    /// returning. Every accepting state whose full word satisfies `mode` for
    /// `needle` adds that word to `out`.
    fn collect<W>(
        &self,
        state: Self::State,
        path: &mut Vec<C>,
        needle: &[C],
        mode: SearchMode,
        out: &mut BTreeSet<W>,
    ) where
        W: FromIterator<C> + Ord,
    {
        if self.is_accept(state) && mode.matches(path, needle) {
            out.insert(path.iter().copied().collect());
        }
        for (letter, next) in self.transitions(state) {
            path.push(letter);
            self.collect(next, path, needle, mode, out);
            path.pop();
        }
    }

    /// Every stored word.
    fn words<W: FromIterator<C> + Ord>(&self) -> BTreeSet<W> {
        let mut out = BTreeSet::new();
        self.collect(self.source(), &mut Vec::new(), &[], SearchMode::Prefix, &mut out);
        out
    }

    /// Stored words starting with `prefix`, the prefix itself included when stored.
    fn words_with_prefix<W: FromIterator<C> + Ord>(&self, prefix: impl IntoWord<C>) -> BTreeSet<W> {
        let prefix = prefix.collect_word();
        let mut out = BTreeSet::new();
        if let Some(state) = self.walk_from(self.source(), &prefix) {
            let mut path = prefix.to_vec();
            self.collect(state, &mut path, &prefix, SearchMode::Prefix, &mut out);
        }
        out
    }

    /// Stored words ending with `suffix`.
    fn words_ending_with<W: FromIterator<C> + Ord>(&self, suffix: impl IntoWord<C>) -> BTreeSet<W> {
        let suffix = suffix.collect_word();
        let mut out = BTreeSet::new();
        self.collect(self.source(), &mut Vec::new(), &suffix, SearchMode::Suffix, &mut out);
        out
    }

    /// Stored words containing `needle`.
    fn words_with_substring<W: FromIterator<C> + Ord>(&self, needle: impl IntoWord<C>) -> BTreeSet<W> {
        let needle = needle.collect_word();
        let mut out = BTreeSet::new();
        self.collect(self.source(), &mut Vec::new(), &needle, SearchMode::Substring, &mut out);
        out
    }
}

impl<C: MdagChar> WordGraph<C> for Mdag<C> {
    type State = NodeId;

    fn source(&self) -> NodeId {
        NodeId::SOURCE
    }

    fn is_accept(&self, state: NodeId) -> bool {
        self.arena.node(state).is_accept()
    }

    fn transition(&self, state: NodeId, letter: C) -> Option<NodeId> {
        self.arena.node(state).transition(letter)
    }

    fn transitions(&self, state: NodeId) -> impl Iterator<Item = (C, NodeId)> + '_ {
        self.arena.node(state).transitions()
    }
}
