use mark_last::MarkLastIterator;
use smallvec::SmallVec;
use tracing::trace;

use super::automaton::Mdag;
use super::char_trait::MdagChar;
use super::config::MdagConfig;
use super::node::NodeId;

/// Buffer holding one word's labels.
pub(crate) type Word<C> = SmallVec<[C; 32]>;

/// Trait for types that can be used as a word when building or querying an MDAG.
///
/// Implemented for common string and sequence types so that [`Mdag::insert`],
/// [`build_mdag`] and the query methods accept them directly without manual
/// conversion.
pub trait IntoWord<C: MdagChar> {
    /// Collects this word into a label buffer.
    fn collect_word(self) -> SmallVec<[C; 32]>;
}

// String types → char

impl IntoWord<char> for &str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for &&str {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

impl IntoWord<char> for &String {
    fn collect_word(self) -> SmallVec<[char; 32]> {
        self.chars().collect()
    }
}

// Generic sequence types → C

impl<C: MdagChar> IntoWord<C> for &[C] {
    fn collect_word(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

impl<C: MdagChar> IntoWord<C> for Vec<C> {
    fn collect_word(self) -> SmallVec<[C; 32]> {
        self.into_iter().collect()
    }
}

impl<C: MdagChar> IntoWord<C> for &Vec<C> {
    fn collect_word(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

impl<C: MdagChar, const N: usize> IntoWord<C> for [C; N] {
    fn collect_word(self) -> SmallVec<[C; 32]> {
        self.into_iter().collect()
    }
}

impl<C: MdagChar, const N: usize> IntoWord<C> for &[C; N] {
    fn collect_word(self) -> SmallVec<[C; 32]> {
        SmallVec::from_slice(self)
    }
}

/// Insertion state threaded through successive [`Mdag::insert`] calls.
pub(crate) struct BuildContext<C: MdagChar> {
    /// The last word inserted on the ascending fast path. `None` once the graph
    /// has been settled or mutated out of order, since the previous word's path
    /// may then be shared.
    previous: Option<Word<C>>,
    /// True while the graph may hold nodes that were never minimized.
    pending: bool,
}

impl<C: MdagChar> BuildContext<C> {
    pub(crate) fn new() -> Self {
        BuildContext {
            previous: Some(SmallVec::new()),
            pending: false,
        }
    }

    fn accepts_in_order(&self, word: &[C]) -> bool {
        matches!(&self.previous, Some(previous) if word > previous.as_slice())
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Ends the ascending run.
    pub(crate) fn break_order(&mut self) {
        self.previous = None;
    }

    /// Records that the graph is fully minimized.
    pub(crate) fn settle(&mut self) {
        self.previous = None;
        self.pending = false;
    }
}

/// Returns the index at which `previous` and `current` diverge, or `None` if
/// `current` extends `previous` (so the previous word's nodes stay on the
/// current word's path and nothing needs minimizing).
///
/// # Examples
///
/// ```
/// use libmdag::mdag::minimization_start_index;
///
/// let chars = |s: &str| s.chars().collect::<Vec<_>>();
/// assert_eq!(minimization_start_index(&chars("abcd"), &chars("abd")), Some(2));
/// assert_eq!(minimization_start_index(&chars("abcd"), &chars("abcd")), None);
/// assert_eq!(minimization_start_index(&chars("ab"), &chars("abcd")), None);
/// ```
pub fn minimization_start_index<C: PartialEq>(previous: &[C], current: &[C]) -> Option<usize> {
    if current.starts_with(previous) {
        None
    } else {
        Some(common_prefix_len(previous, current))
    }
}

pub(crate) fn common_prefix_len<C: PartialEq>(a: &[C], b: &[C]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

impl<C: MdagChar> Mdag<C> {
    /// Inserts a word.
    ///
    /// Returns `true` if the word was added, `false` if it was already present
    /// (in which case nothing changes). Words inserted in ascending order take
    /// the incremental fast path; any other order is still accepted and leaves
    /// every other stored word intact.
    ///
    /// The fast path only covers the ascending run that starts with an empty
    /// automaton. Once the graph has been settled by [`finish`](Mdag::finish)
    /// (which [`build_mdag`] calls), or edited out of order, every insert
    /// clones the shared part of its path and re-minimizes it, even when the
    /// words keep ascending. The graph stays minimal either way. To bulk load
    /// a sorted list cheaply, insert all of it before the first `finish`.
    ///
    /// # Examples
    ///
    /// ```
    /// use libmdag::mdag::{build_mdag, WordGraph};
    ///
    /// let mut mdag = build_mdag(["BAKE", "CAKE"]);
    /// assert!(mdag.insert("FAKE"));
    /// assert!(!mdag.insert("FAKE")); // already present
    /// assert!(mdag.insert("AKE")); // out of order is fine
    /// assert!(mdag.contains("FAKE"));
    /// assert!(mdag.contains("AKE"));
    /// ```
    pub fn insert(&mut self, word: impl IntoWord<C>) -> bool {
        let word = word.collect_word();
        if self.contains_slice(&word) {
            trace!(len = word.len(), "insert: word already present");
            return false;
        }
        if self.context.accepts_in_order(&word) {
            self.append_in_order(&word);
        } else {
            self.prepare_for_mutation();
            self.insert_copy_on_write(&word);
        }
        self.after_mutation("insert");
        true
    }

    /// Daciuk's incremental step: minimize the previous word's divergent
    /// suffix, then hang the new suffix off the common prefix.
    fn append_in_order(&mut self, word: &[C]) {
        let previous = self
            .context
            .previous
            .take()
            .expect("in-order insertion requires a previous word");
        let prefix_len = minimization_start_index(&previous, word).unwrap_or(previous.len());
        let prefix_end = self
            .arena
            .transition_path(NodeId::SOURCE, &word[..prefix_len])
            .expect("the previous word's prefix is always present");

        if self.config.is_incremental() && self.arena.node(prefix_end).has_transitions() {
            self.registry.replace_or_register(&mut self.arena, prefix_end);
        }

        debug_assert!(
            !self.arena.node(prefix_end).has_outgoing(word[prefix_len]),
            "ascending insertion always adds a new transition"
        );
        let arena = &mut self.arena;
        word[prefix_len..]
            .iter()
            .copied()
            .mark_last()
            .fold(prefix_end, |node, (last, ch)| arena.add_outgoing_transition(node, ch, last));

        self.context.previous = Some(SmallVec::from_slice(word));
        self.context.mark_pending();
    }

    /// Inserts a word that does not continue the ascending run. Shared nodes on
    /// the word's path are cloned before the new suffix is attached.
    fn insert_copy_on_write(&mut self, word: &[C]) {
        let mut path = self.walk_path(word);
        let matched = path.len() - 1;
        self.privatize_path(word, &mut path);

        let end = *path.last().expect("path always starts at the source");
        if matched == word.len() {
            self.arena.node_mut(end).set_accept(true);
        } else {
            let arena = &mut self.arena;
            word[matched..]
                .iter()
                .copied()
                .mark_last()
                .fold(end, |node, (last, ch)| {
                    let child = arena.add_outgoing_transition(node, ch, last);
                    path.push(child);
                    child
                });
        }
        self.settle_path(word, &path);
    }
}

/// Builds an MDAG from an iterator of words and finishes it.
///
/// Each word must implement [`IntoWord`], allowing this function to accept
/// `&str`, `String`, slices, vectors, arrays, or any other supported word type.
/// Sorted input is built incrementally; unsorted input is accepted too.
///
/// # Examples
///
/// Building from byte sequences:
///
/// ```
/// use libmdag::mdag::{build_mdag, WordGraph};
///
/// let words: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![1, 2, 4], vec![2, 3, 4]];
/// let mdag = build_mdag(words);
///
/// assert!(mdag.contains([1u8, 2, 3]));
/// assert!(!mdag.contains([1u8, 2, 5]));
/// ```
///
/// Building from strings:
///
/// ```
/// use libmdag::mdag::{build_mdag, WordGraph};
///
/// let mdag = build_mdag(["APPLE", "BANANA", "CHERRY"]);
/// assert!(mdag.contains("BANANA"));
/// assert!(!mdag.contains("APRICOT"));
/// ```
pub fn build_mdag<C, W>(words: impl IntoIterator<Item = W>) -> Mdag<C>
where
    C: MdagChar,
    W: IntoWord<C>,
{
    build_mdag_with_config(words, MdagConfig::default())
}

/// Like [`build_mdag`], with an explicit configuration.
pub fn build_mdag_with_config<C, W>(words: impl IntoIterator<Item = W>, config: MdagConfig) -> Mdag<C>
where
    C: MdagChar,
    W: IntoWord<C>,
{
    let mut mdag = Mdag::with_config(config);
    for word in words {
        mdag.insert(word);
    }
    mdag.finish();
    mdag
}
