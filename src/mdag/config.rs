#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When the automaton merges equivalent nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Minimization {
    /// Merge as words are inserted and removed. Ascending insertion takes the
    /// fast incremental path; any other order goes through copy-on-write
    /// insertion. The graph is minimal after every settled operation.
    #[default]
    Incremental,

    /// Build a trie-shaped graph and merge only on
    /// [`finish`](super::Mdag::finish) or [`minimize`](super::Mdag::minimize).
    Deferred,
}

/// Configuration for an [`Mdag`](super::Mdag).
///
/// # Examples
///
/// ```
/// use libmdag::mdag::{Mdag, MdagConfig, Minimization};
///
/// let config = MdagConfig::default()
///     .with_minimization(Minimization::Deferred)
///     .with_verify_invariants(true);
/// let mut mdag = Mdag::<char>::with_config(config);
/// mdag.insert("TOP");
/// mdag.insert("STOP");
/// mdag.finish();
/// assert_eq!(mdag.node_count(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MdagConfig {
    /// Minimization strategy.
    pub minimization: Minimization,

    /// Run a full structural check after every mutation and panic on failure.
    /// Costs O(graph size) per operation.
    pub verify_invariants: bool,
}

impl MdagConfig {
    /// Sets the minimization strategy.
    pub fn with_minimization(mut self, minimization: Minimization) -> Self {
        self.minimization = minimization;
        self
    }

    /// Enables or disables the post-mutation structural check.
    pub fn with_verify_invariants(mut self, verify: bool) -> Self {
        self.verify_invariants = verify;
        self
    }

    pub(crate) fn is_incremental(&self) -> bool {
        self.minimization == Minimization::Incremental
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_incremental_without_checks() {
        let config = MdagConfig::default();
        assert_eq!(config.minimization, Minimization::Incremental);
        assert!(!config.verify_invariants);
        assert!(config.is_incremental());
    }

    #[test]
    fn setters_chain() {
        let config = MdagConfig::default()
            .with_minimization(Minimization::Deferred)
            .with_verify_invariants(true);
        assert!(!config.is_incremental());
        assert!(config.verify_invariants);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let config: MdagConfig = serde_json::from_str(r#"{"minimization":"Deferred"}"#).unwrap();
        assert_eq!(config.minimization, Minimization::Deferred);
        assert!(!config.verify_invariants);

        let json = serde_json::to_string(&MdagConfig::default()).unwrap();
        assert_eq!(json, r#"{"minimization":"Incremental","verify_invariants":false}"#);
    }
}
