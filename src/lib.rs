//! # libmdag
//!
//! A mutable [MDAG](https://en.wikipedia.org/wiki/Deterministic_acyclic_finite_state_automaton)
//! (minimal acyclic finite-state automaton) library for Rust.
//!
//! An MDAG stores a set of words as a graph in which common prefixes and common
//! suffixes are shared, giving compact storage and O(word length) lookups.
//! Sorted input is built with the incremental algorithm of
//! [Daciuk et al. (2000)](https://arxiv.org/abs/cs/0007009v1). Unlike a
//! build-once DAWG, the automaton accepts words in any order and supports
//! removal, and stays minimal through both.
//!
//! ## Features
//!
//! - **Generic over label type**: works with `char`, `u8`, `u16`, or any type implementing
//!   [`MdagChar`](mdag::MdagChar)
//! - **Mutable**: [`insert`](mdag::Mdag::insert) and [`remove`](mdag::Mdag::remove)
//!   split shared nodes before changing them, so other words are never affected
//! - **Compact**: a settled automaton freezes into one flat array of transition
//!   records ([`FrozenMdag`](mdag::FrozenMdag)) that is `Send + Sync`
//! - **Queries**: membership, longest stored prefix, and prefix, suffix or
//!   substring enumeration on both forms through [`WordGraph`](mdag::WordGraph)
//!
//! ## Quick Start
//!
//! ```
//! use libmdag::mdag::{build_mdag, WordGraph};
//!
//! let mut mdag = build_mdag(["BAKE", "CAKE", "FAKE", "LAKE", "MAKE"]);
//! assert!(mdag.contains("CAKE"));
//! assert!(!mdag.contains("AKE"));
//!
//! mdag.insert("AKE");
//! mdag.remove("LAKE");
//! assert!(mdag.contains("AKE"));
//! assert!(!mdag.contains("LAKE"));
//!
//! let frozen = mdag.compact();
//! assert_eq!(frozen.words_ending_with::<String>("AKE").len(), 5);
//! ```
//!
//! ## Generic Usage
//!
//! The automaton is generic over the transition label type:
//!
//! ```
//! use libmdag::mdag::{build_mdag, WordGraph};
//!
//! let words: Vec<Vec<u8>> = vec![vec![1, 2, 3], vec![1, 2, 4], vec![2, 3, 4]];
//! let mdag = build_mdag(words);
//!
//! assert!(mdag.contains([1u8, 2, 3]));
//! assert!(!mdag.contains([1u8, 2, 5]));
//! ```

#![warn(missing_docs)]

/// Core MDAG data structure: node graph, builder, remover, compactor and queries.
pub mod mdag;
