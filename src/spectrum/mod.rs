//! Corpus storage and matching
//!
//! - Store: key → spectrum mapping, built once
//! - Cache: concurrent memoization for query keys outside the store
//! - Finder: best-match and threshold queries over the store

pub mod cache;
pub mod finder;
pub mod store;

pub use cache::*;
pub use finder::*;
pub use store::*;
