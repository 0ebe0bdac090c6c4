//! Example: a Wordlist wrapper around a frozen MDAG.
//!
//! The live `Mdag` is edited first (words added out of order, one removed),
//! then frozen into the flat record form that the `Wordlist` queries.
//!
//! Run with: RUST_LOG=debug cargo run --example wordlist

use libmdag::mdag::{build_mdag, FrozenMdag, WordGraph};
use tracing_subscriber::EnvFilter;

/// A read-only word list backed by a frozen MDAG.
struct Wordlist {
    mdag: FrozenMdag<char>,
}

impl Wordlist {
    fn new(mdag: FrozenMdag<char>) -> Self {
        Wordlist { mdag }
    }

    /// Returns true if the word is in the wordlist.
    fn is_word(&self, word: &str) -> bool {
        self.mdag.contains(word)
    }

    /// Returns true if any word in the wordlist starts with the given prefix.
    fn has_prefix(&self, prefix: &str) -> bool {
        self.mdag.has_prefix(prefix)
    }

    fn all_words(&self) -> Vec<String> {
        self.mdag.words().into_iter().collect()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut mdag = build_mdag(["BAKE", "BAKED", "BAKER", "CAKE", "CAKED", "FAKE", "LAKE"]);
    mdag.insert("AKE");
    mdag.insert("MAKER");
    mdag.remove("CAKED");
    println!("{mdag:?}");

    let wordlist = Wordlist::new(mdag.compact());

    println!("Word lookup:");
    for word in ["BAKE", "BAKER", "BAKES", "CAKE", "CAKED", "MAKER", "MAKE"] {
        println!("  {word}: {}", if wordlist.is_word(word) { "yes" } else { "no" });
    }

    println!("\nPrefix checking:");
    for prefix in ["BA", "CAK", "MA", "ZA"] {
        println!("  {prefix}*: {}", if wordlist.has_prefix(prefix) { "yes" } else { "no" });
    }

    println!("\nEnding with \"ER\": {:?}", wordlist.mdag.words_ending_with::<String>("ER"));
    println!("Longest stored prefix of \"BAKERY\": {}", wordlist.mdag.longest_stored_prefix::<String>("BAKERY"));
    println!("\nAll words: {:?}", wordlist.all_words());
}
