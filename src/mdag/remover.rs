//! Copy-on-write mutation of a word's path, used by removal and by
//! out-of-order insertion.
//!
//! Nodes past the first confluence node (the first node on the path with more
//! than one incoming edge) may belong to other words, so they are never
//! mutated in place. The path is cloned from that node on, the clones are
//! edited, and the whole path is merged back into the registry bottom-up.

use smallvec::{smallvec, SmallVec};
use tracing::trace;

use super::automaton::Mdag;
use super::builder::IntoWord;
use super::char_trait::MdagChar;
use super::node::NodeId;

/// Nodes along a word's path; element `i` is reached by the first `i` labels.
pub(crate) type Path = SmallVec<[NodeId; 32]>;

impl<C: MdagChar> Mdag<C> {
    /// Follows `word` from the source as far as transitions exist.
    pub(crate) fn walk_path(&self, word: &[C]) -> Path {
        let mut path: Path = smallvec![NodeId::SOURCE];
        for &letter in word {
            let current = *path.last().expect("path always starts at the source");
            match self.arena.node(current).transition(letter) {
                Some(next) => path.push(next),
                None => break,
            }
        }
        path
    }

    /// Gives `word`'s path private nodes that can be mutated without affecting
    /// other words.
    ///
    /// Nodes before the first confluence node are already private; they are
    /// unregistered because their contents are about to change. From the
    /// confluence node on, each node is replaced by a clone. Returns the index
    /// of the first confluence node, if any.
    pub(crate) fn privatize_path(&mut self, word: &[C], path: &mut [NodeId]) -> Option<usize> {
        let confluence = path
            .iter()
            .skip(1)
            .position(|&id| self.arena.node(id).incoming_count() > 1)
            .map(|pos| pos + 1);

        let private_end = confluence.unwrap_or(path.len());
        for &id in &path[1..private_end] {
            self.registry.unregister(&self.arena, id);
        }

        if let Some(start) = confluence {
            for i in start..path.len() {
                path[i] = self.arena.clone_into(path[i - 1], word[i - 1]);
            }
            trace!(confluence = start, cloned = path.len() - start, "privatized shared path");
        }
        confluence
    }

    /// Restores minimality after a path has been edited, or defers it.
    pub(crate) fn settle_path(&mut self, word: &[C], path: &[NodeId]) {
        if self.config.is_incremental() {
            self.recanonicalize_path(word, path);
        } else {
            self.context.mark_pending();
        }
    }

    /// Merges each node of an edited path into its registered equivalent, or
    /// registers it, from the deepest node up to (not including) the source.
    fn recanonicalize_path(&mut self, word: &[C], path: &[NodeId]) {
        for i in (1..path.len()).rev() {
            self.registry
                .merge_or_register(&mut self.arena, path[i - 1], word[i - 1], path[i]);
        }
    }

    /// Removes a word.
    ///
    /// Returns `true` if the word was removed, `false` if it was not present (in
    /// which case nothing changes). All other stored words are kept, and the
    /// automaton stays minimal.
    ///
    /// # Examples
    ///
    /// ```
    /// use libmdag::mdag::{build_mdag, WordGraph};
    ///
    /// let mut mdag = build_mdag(["BAKE", "CAKE"]);
    /// assert!(mdag.remove("BAKE"));
    /// assert!(!mdag.remove("BAKE")); // already removed
    /// assert!(!mdag.contains("BAKE"));
    /// assert!(mdag.contains("CAKE"));
    /// ```
    pub fn remove(&mut self, word: impl IntoWord<C>) -> bool {
        let word = word.collect_word();
        if !self.contains_slice(&word) {
            trace!(len = word.len(), "remove: word not found");
            return false;
        }

        self.prepare_for_mutation();
        let mut path = self.walk_path(&word);
        debug_assert_eq!(path.len(), word.len() + 1, "a stored word's path is complete");
        self.privatize_path(&word, &mut path);

        let end = *path.last().expect("path always starts at the source");
        self.arena.node_mut(end).set_accept(false);

        // Drop the tail of the path that no longer leads to any word.
        while path.len() > 1 {
            let id = path[path.len() - 1];
            let node = self.arena.node(id);
            if node.is_accept() || node.has_transitions() {
                break;
            }
            let parent = path[path.len() - 2];
            self.arena.remove_transition(parent, word[path.len() - 2]);
            self.registry.release(&mut self.arena, id);
            path.pop();
        }

        self.settle_path(&word, &path);
        self.after_mutation("remove");
        true
    }
}

#[cfg(test)]
mod test {
    use crate::mdag::builder::{build_mdag, build_mdag_with_config};
    use crate::mdag::config::{MdagConfig, Minimization};
    use crate::mdag::query::WordGraph;
    use crate::mdag::Mdag;

    fn checked() -> MdagConfig {
        MdagConfig::default().with_verify_invariants(true)
    }

    fn counts(mdag: &Mdag<char>) -> (usize, usize, usize) {
        (mdag.node_count(), mdag.transition_count(), mdag.equivalence_class_count())
    }

    #[test]
    fn remove_word_basic() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE", "FAKE"], checked());
        assert!(mdag.remove("BAKE"));
        assert!(!mdag.contains("BAKE"));
        assert!(mdag.contains("CAKE"));
        assert!(mdag.contains("FAKE"));
    }

    #[test]
    fn remove_word_returns_false_for_missing() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE"], checked());
        let before = counts(&mdag);
        assert!(!mdag.remove("FAKE"));
        assert!(!mdag.remove("BAK"));
        assert!(!mdag.remove("BAKED"));
        assert!(!mdag.remove(""));
        assert_eq!(counts(&mdag), before);
    }

    #[test]
    fn remove_word_returns_false_for_already_removed() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE"], checked());
        assert!(mdag.remove("BAKE"));
        assert!(!mdag.remove("BAKE"));
    }

    #[test]
    fn remove_last_word() {
        let mut mdag = build_mdag_with_config(["HELLO"], checked());
        assert!(mdag.remove("HELLO"));
        assert!(!mdag.contains("HELLO"));
        assert!(mdag.is_empty());
        assert_eq!(counts(&mdag), (0, 0, 0));
    }

    #[test]
    fn remove_all_words() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE", "FAKE"], checked());
        assert!(mdag.remove("BAKE"));
        assert!(mdag.remove("CAKE"));
        assert!(mdag.remove("FAKE"));
        assert!(mdag.is_empty());
        assert_eq!(counts(&mdag), (0, 0, 0));
    }

    #[test]
    fn remove_prefix_keeps_extension() {
        let mut mdag = build_mdag_with_config(["CAR", "CART"], checked());
        assert!(mdag.remove("CAR"));
        assert!(!mdag.contains("CAR"));
        assert!(mdag.contains("CART"));
        assert_eq!(counts(&mdag), counts(&build_mdag(["CART"])));
    }

    #[test]
    fn remove_extension_keeps_prefix() {
        let mut mdag = build_mdag_with_config(["CAR", "CART"], checked());
        assert!(mdag.remove("CART"));
        assert!(mdag.contains("CAR"));
        assert!(!mdag.contains("CART"));
        assert_eq!(counts(&mdag), counts(&build_mdag(["CAR"])));
    }

    #[test]
    fn remove_splits_confluence_node() {
        let words = ["do", "dog", "doggy", "cat", "cats", "car"];
        let mut sorted = words;
        sorted.sort_unstable();
        let mut mdag = build_mdag_with_config(sorted, checked());
        assert!(mdag.remove("dog"));
        assert!(!mdag.contains("dog"));
        assert!(mdag.contains("doggy"));
        assert!(mdag.contains("do"));
        assert!(mdag.contains("cats"));
        assert_eq!(counts(&mdag), counts(&build_mdag(["car", "cat", "cats", "do", "doggy"])));
    }

    #[test]
    fn remove_does_not_break_sharing() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE", "FAKE"], checked());
        mdag.remove("FAKE");
        assert_eq!(counts(&mdag), counts(&build_mdag(["BAKE", "CAKE"])));
    }

    #[test]
    fn remove_empty_word() {
        let mut mdag = build_mdag_with_config(["", "A"], checked());
        assert!(mdag.remove(""));
        assert!(!mdag.contains(""));
        assert!(mdag.contains("A"));
    }

    #[test]
    fn remove_matches_fresh_build_for_every_word() {
        let words = ["BAKE", "BAKED", "BAKER", "CAKE", "CAKED", "FAKE", "LAKE", "MAKER"];
        for removed in words {
            let mut mdag = build_mdag_with_config(words, checked());
            assert!(mdag.remove(removed));
            let rest = words.iter().filter(|&&w| w != removed);
            assert_eq!(counts(&mdag), counts(&build_mdag(rest)), "removing {removed}");
        }
    }

    #[test]
    fn interleaved_insert_remove() {
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE"], checked());
        mdag.insert("FAKE");
        mdag.remove("BAKE");
        mdag.insert("LAKE");
        mdag.insert("MAKE");
        mdag.remove("CAKE");

        assert!(!mdag.contains("BAKE"));
        assert!(!mdag.contains("CAKE"));
        assert!(mdag.contains("FAKE"));
        assert!(mdag.contains("LAKE"));
        assert!(mdag.contains("MAKE"));
        mdag.finish();
        assert_eq!(counts(&mdag), counts(&build_mdag(["FAKE", "LAKE", "MAKE"])));
    }

    #[test]
    fn removed_nodes_are_recycled() {
        let mut mdag = build_mdag_with_config(["ABCDEFGH", "XY"], checked());
        mdag.remove("ABCDEFGH");
        let free = mdag.arena.free_slots();
        let capacity = mdag.arena.capacity();
        assert!(free >= 2, "need at least 2 free slots, got {free}");

        mdag.insert("ZW");
        assert!(mdag.contains("ZW"));
        assert!(mdag.contains("XY"));
        assert_eq!(mdag.arena.capacity(), capacity);
    }

    #[test]
    fn repeated_insert_remove_cycles_do_not_grow_the_arena() {
        let mut mdag = Mdag::with_config(checked());
        for _ in 0..5 {
            mdag.insert("TESTING");
            mdag.remove("TESTING");
        }
        let capacity = mdag.arena.capacity();
        for _ in 0..5 {
            mdag.insert("TESTING");
            mdag.remove("TESTING");
        }
        assert_eq!(mdag.arena.capacity(), capacity);
    }

    #[test]
    fn deferred_remove_then_finish_is_minimal() {
        let config = checked().with_minimization(Minimization::Deferred);
        let mut mdag = build_mdag_with_config(["BAKE", "CAKE", "FAKE"], config);
        assert!(mdag.remove("CAKE"));
        assert!(!mdag.is_settled());
        assert!(mdag.contains("BAKE"));
        assert!(mdag.contains("FAKE"));
        mdag.finish();
        assert_eq!(counts(&mdag), counts(&build_mdag(["BAKE", "FAKE"])));
    }
}
