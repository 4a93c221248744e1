//! # argindex - Positional Grouping of Sequences
//!
//! Single-pass utilities that group the positions of a sequence by how its
//! items relate to each other:
//!
//! - [`group_equal`]: positions holding equal items.
//! - [`group_by_mapping`]: positions holding an item, paired with the
//!   positions of the items that map onto it under a user function.
//! - [`group_entities`]: positions of entities (collections of alternative
//!   representations) that share at least one representation.
//!
//! Positions start at zero and follow traversal order, so any
//! `IntoIterator`, including one-shot streams, can be grouped.
//!
//! ## Example
//!
//! ```
//! use argindex::{group_by_mapping, group_entities, group_equal};
//!
//! let numbers = [1, -1, 2, -1, 1];
//! assert_eq!(group_equal(numbers, true), vec![vec![0, 4], vec![1, 3]]);
//!
//! let opposites = group_by_mapping(numbers, |n| -n, true);
//! assert_eq!(opposites.get(&-1).unwrap().matched_positions(), Some(&[0, 4][..]));
//!
//! let entities = group_entities([vec![1, 2], vec![2, 3], vec![4]], false);
//! assert_eq!(entities, vec![vec![0, 1], vec![2]]);
//! ```
//!
//! ## Incremental use
//!
//! Each function has an indexer counterpart ([`EqualIndexer`],
//! [`MatchIndexer`], [`EntityIndexer`]) that accepts items one at a time
//! and can report its groups at any point.
//!
//! ## Performance
//!
//! - O(1) expected time per item (O(k) per entity of k representations)
//! - Position-lists live in a generational arena (SlotMap) and are shared
//!   by handle, never copied while indexing

mod arena;
mod entity;
mod equal;
mod matching;
mod position;


pub use entity::{group_entities, group_entities_with, Entity, EntityIndexer, MergePolicy};
pub use equal::{group_equal, EqualIndexer};
pub use matching::{group_by_mapping, try_group_by_mapping, MatchEntry, MatchGroups, MatchIndexer};
