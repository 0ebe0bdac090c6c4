/// The mutable automaton and its settle/freeze operations.
pub mod automaton;
/// Word insertion: the incremental ascending path and copy-on-write insertion.
pub mod builder;
/// Trait for types that can serve as MDAG transition labels.
pub mod char_trait;
/// Flattened, immutable form of a settled automaton.
pub mod compact;
/// Minimization strategy and checking options.
pub mod config;
/// Error types.
pub mod error;
/// Node identifiers and the mutable node type.
pub mod node;
/// Index arena holding the mutable nodes.
pub(crate) mod node_arena;
/// Queries shared by the live and frozen automaton.
pub mod query;
/// Canonical node per equivalence class.
pub(crate) mod registry;
/// Word removal and the copy-on-write path shared with insertion.
pub mod remover;

pub use automaton::Mdag;
pub use builder::{build_mdag, build_mdag_with_config, minimization_start_index, IntoWord};
pub use char_trait::MdagChar;
pub use compact::{FrozenMdag, FrozenRecord};
pub use config::{MdagConfig, Minimization};
pub use error::{InvariantViolation, MdagError};
pub use node::NodeId;
pub use query::{SearchMode, WordGraph};
