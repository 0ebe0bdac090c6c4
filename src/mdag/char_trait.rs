use std::fmt::Debug;
use std::hash::Hash;

/// Trait for types that can serve as transition labels in an MDAG.
///
/// This trait is automatically implemented for any type satisfying all the
/// required bounds (`char`, `u8`, `u16`, `u32`, etc.).
///
/// - `Copy`: transitions store labels by value
/// - `Eq + Ord`: transitions are kept sorted; the greatest label is the most recent one
/// - `Hash`: structural hashing in the equivalence registry
/// - `Debug`: debug printing of nodes and records
/// - `Default`: label of the synthetic source record of a frozen MDAG
pub trait MdagChar: Copy + Eq + Ord + Hash + Debug + Default {}

impl<T: Copy + Eq + Ord + Hash + Debug + Default> MdagChar for T {}
