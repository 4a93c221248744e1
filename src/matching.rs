use crate::arena::{ListId, PositionArena};
use crate::position::PositionCounter;
use indexmap::IndexMap;
use std::borrow::Borrow;
use std::convert::Infallible;
use std::hash::Hash;
use tracing::{debug, trace};

type RecordMap<T> = IndexMap<T, MatchRecord, ahash::RandomState>;

/// Per-item bookkeeping.
///
/// `matched` is a handle to the `equal` list of whichever item most
/// recently mapped onto this one, so appends to that list show through.
#[derive(Debug, Clone, Copy)]
struct MatchRecord {
    equal: ListId,
    matched: Option<ListId>,
    /// Set when a newly seen item mapped onto this one
    targeted: bool,
}

impl MatchRecord {
    fn new(equal: ListId) -> Self {
        Self {
            equal,
            matched: None,
            targeted: false,
        }
    }

    fn has_match(&self) -> bool {
        self.matched.is_some() || self.targeted
    }
}

/// Incremental index of items that are equal, or equal once mapped.
///
/// The indexer does not own the mapping function: each item is pushed
/// together with its image, which lets callers use fallible or stateful
/// mappers. See [`group_by_mapping`] for the one-shot form.
#[derive(Debug, Clone)]
pub struct MatchIndexer<T> {
    /// Insertion-ordered records, one per distinct item
    records: RecordMap<T>,

    arena: PositionArena,
    positions: PositionCounter,
}

impl<T: Hash + Eq> MatchIndexer<T> {
    pub fn new() -> Self {
        Self {
            records: RecordMap::default(),
            arena: PositionArena::new(),
            positions: PositionCounter::new(),
        }
    }

    /// Records `item` at the next position, with `image` as its mapped value.
    ///
    /// If `image` has already been seen, its matched positions become the
    /// equal positions of `item`.
    pub fn push(&mut self, item: T, image: T) -> usize {
        let position = self.positions.advance();

        let (source, is_new) = match self.records.get(&item) {
            Some(record) => {
                self.arena.push(record.equal, position);
                (record.equal, false)
            }
            None => {
                let equal = self.arena.create(position);
                self.records.insert(item, MatchRecord::new(equal));
                (equal, true)
            }
        };

        if let Some(target) = self.records.get_mut(&image) {
            target.matched = Some(source);
            if is_new {
                target.targeted = true;
                trace!(position, "item matched an earlier image");
            }
        }

        position
    }

    /// Records every item of `iter`, mapping each with `mapper`.
    pub fn extend_with<I, F>(&mut self, iter: I, mut mapper: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> T,
    {
        for item in iter {
            let image = mapper(&item);
            self.push(item, image);
        }
    }

    /// Like [`MatchIndexer::extend_with`], stopping at the first mapper error.
    ///
    /// Items before the failing one stay recorded.
    pub fn try_extend_with<I, F, E>(&mut self, iter: I, mut mapper: F) -> Result<(), E>
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> Result<T, E>,
    {
        for item in iter {
            let image = mapper(&item)?;
            self.push(item, image);
        }
        Ok(())
    }

    /// Number of items recorded.
    pub fn len(&self) -> usize {
        self.positions.consumed()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the indexer and returns the grouping snapshot.
    ///
    /// With `only_matches`, items that never took part in a match (neither
    /// as source nor as image) are dropped. Matched positions of a kept item
    /// may still refer to the positions of a dropped one.
    pub fn finish(self, only_matches: bool) -> MatchGroups<T> {
        let Self {
            mut records,
            arena,
            positions,
        } = self;

        if only_matches {
            records.retain(|_, record| record.has_match());
        }

        debug!(
            items = positions.consumed(),
            keys = records.len(),
            only_matches,
            "mapping grouping finished"
        );

        MatchGroups { records, arena }
    }
}

impl<T: Hash + Eq> Default for MatchIndexer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a mapping grouping: item → equal and matched positions.
///
/// Iteration follows the order in which items were first seen.
#[derive(Debug, Clone)]
pub struct MatchGroups<T> {
    records: RecordMap<T>,
    arena: PositionArena,
}

impl<T: Hash + Eq> MatchGroups<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get<Q>(&self, item: &Q) -> Option<MatchEntry<'_>>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.get(item).map(|record| self.entry(record))
    }

    pub fn contains_key<Q>(&self, item: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.records.contains_key(item)
    }

    pub fn keys(&self) -> impl Iterator<Item = &T> + '_ {
        self.records.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, MatchEntry<'_>)> + '_ {
        self.records
            .iter()
            .map(move |(item, record)| (item, self.entry(record)))
    }

    fn entry<'a>(&'a self, record: &'a MatchRecord) -> MatchEntry<'a> {
        MatchEntry {
            record,
            arena: &self.arena,
        }
    }
}

/// View of one item's positions inside a [`MatchGroups`].
#[derive(Debug, Clone, Copy)]
pub struct MatchEntry<'a> {
    record: &'a MatchRecord,
    arena: &'a PositionArena,
}

impl<'a> MatchEntry<'a> {
    /// Positions holding this exact item, ascending.
    pub fn equal_positions(&self) -> &'a [usize] {
        self.arena.get(self.record.equal)
    }

    /// Positions of the latest item whose image is this item, if any.
    pub fn matched_positions(&self) -> Option<&'a [usize]> {
        self.record.matched.map(|id| self.arena.get(id))
    }

    /// True when the item is its own image.
    pub fn is_self_match(&self) -> bool {
        self.record.matched == Some(self.record.equal)
    }
}

/// Groups positions of items that are equal, or equal under `mapper`.
///
/// For every distinct item the result holds its equal positions and the
/// equal positions of the item mapping onto it (absent if none was seen
/// after it). With `only_matches`, items that never matched are dropped.
///
/// ```
/// use argindex::group_by_mapping;
///
/// let groups = group_by_mapping([1, -1, 2, -1, 1], |n| -n, false);
///
/// let one = groups.get(&1).unwrap();
/// assert_eq!(one.equal_positions(), &[0, 4]);
/// assert_eq!(one.matched_positions(), Some(&[1, 3][..]));
/// assert_eq!(groups.get(&2).unwrap().matched_positions(), None);
///
/// let matched = group_by_mapping([1, -1, 2, -1, 1], |n| -n, true);
/// assert_eq!(matched.keys().copied().collect::<Vec<_>>(), vec![1, -1]);
/// ```
pub fn group_by_mapping<T, I, F>(iter: I, mut mapper: F, only_matches: bool) -> MatchGroups<T>
where
    T: Hash + Eq,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> T,
{
    let infallible = |item: &T| Ok::<_, Infallible>(mapper(item));
    match try_group_by_mapping(iter, infallible, only_matches) {
        Ok(groups) => groups,
        Err(never) => match never {},
    }
}

/// Fallible form of [`group_by_mapping`].
///
/// The first mapper error is returned unchanged and no partial result is
/// produced.
pub fn try_group_by_mapping<T, I, F, E>(
    iter: I,
    mapper: F,
    only_matches: bool,
) -> Result<MatchGroups<T>, E>
where
    T: Hash + Eq,
    I: IntoIterator<Item = T>,
    F: FnMut(&T) -> Result<T, E>,
{
    let mut indexer = MatchIndexer::new();
    indexer.try_extend_with(iter, mapper)?;
    Ok(indexer.finish(only_matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    type Owned<T> = Vec<(T, Vec<usize>, Option<Vec<usize>>)>;

    fn snapshot<T: Hash + Eq + Clone>(groups: &MatchGroups<T>) -> Owned<T> {
        groups
            .iter()
            .map(|(item, entry)| {
                (
                    item.clone(),
                    entry.equal_positions().to_vec(),
                    entry.matched_positions().map(<[usize]>::to_vec),
                )
            })
            .collect()
    }

    #[test]
    fn test_new() {
        let indexer = MatchIndexer::<i32>::new();
        assert!(indexer.is_empty());
        assert!(indexer.finish(false).is_empty());
    }

    #[test]
    fn test_negation_all_keys() {
        let groups = group_by_mapping(vec![1, -1, 2, -1, 1], |n| -n, false);
        assert_eq!(
            snapshot(&groups),
            vec![
                (1, vec![0, 4], Some(vec![1, 3])),
                (-1, vec![1, 3], Some(vec![0, 4])),
                (2, vec![2], None),
            ]
        );
    }

    #[test]
    fn test_negation_only_matches() {
        let groups = group_by_mapping(vec![1, -1, 2, -1, 1], |n| -n, true);
        assert_eq!(groups.len(), 2);
        assert!(groups.contains_key(&1));
        assert!(groups.contains_key(&-1));
        assert!(!groups.contains_key(&2));
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec![1, -1]);
    }

    #[test]
    fn test_self_match() {
        let groups = group_by_mapping(vec!['a', 'b', 'a'], |c| *c, true);
        let a = groups.get(&'a').unwrap();
        assert!(a.is_self_match());
        assert_eq!(a.equal_positions(), &[0, 2]);
        assert_eq!(a.matched_positions(), Some(&[0, 2][..]));
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_matched_is_live_view() {
        // 2 is matched by 1's list at position 1; later 1s show through
        let groups = group_by_mapping(vec![2, 1, 1, 1], |n| n + 1, false);
        let two = groups.get(&2).unwrap();
        assert_eq!(two.matched_positions(), Some(&[1, 2, 3][..]));
        assert_eq!(groups.get(&1).unwrap().matched_positions(), None);
    }

    #[test]
    fn test_only_matches_keeps_target_of_dropped_source() {
        let groups = group_by_mapping(vec![2, 1], |n| n + 1, true);
        assert_eq!(snapshot(&groups), vec![(2, vec![0], Some(vec![1]))]);
    }

    #[test]
    fn test_last_write_wins() {
        // both 3 and 5 map onto 1 via modulo
        let groups = group_by_mapping(vec![1, 3, 5, 3], |n| n % 2, false);
        let one = groups.get(&1).unwrap();
        assert_eq!(one.matched_positions(), Some(&[1, 3][..]));
    }

    #[test]
    fn test_unseen_image_is_ignored() {
        let groups = group_by_mapping(vec!["a", "b"], |_| "z", false);
        assert!(groups.iter().all(|(_, entry)| entry.matched_positions().is_none()));
        assert!(group_by_mapping(vec!["a", "b"], |_| "z", true).is_empty());
    }

    #[test]
    fn test_borrowed_lookup() {
        let input: Vec<String> = ["ab", "ba"].iter().map(|s| s.to_string()).collect();
        let groups = group_by_mapping(input, |s| s.chars().rev().collect(), true);
        assert_eq!(groups.get("ab").unwrap().matched_positions(), Some(&[1][..]));
        // "ba" was a source but never an image
        assert!(!groups.contains_key("ba"));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_mapping(Vec::<i32>::new(), |n| -n, true).is_empty());
        assert!(group_by_mapping(Vec::<i32>::new(), |n| -n, false).is_empty());
    }

    #[test]
    fn test_mapper_error_aborts() {
        let result = try_group_by_mapping(
            vec![1, 2, 3],
            |&n| if n == 2 { Err("boom") } else { Ok(-n) },
            false,
        );
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn test_try_ok_matches_infallible() {
        let fallible =
            try_group_by_mapping(vec![1, -1, 2], |&n| Ok::<_, ()>(-n), false).unwrap();
        let infallible = group_by_mapping(vec![1, -1, 2], |n| -n, false);
        assert_eq!(snapshot(&fallible), snapshot(&infallible));
    }

    #[test]
    fn test_push_with_explicit_image() {
        let mut indexer = MatchIndexer::new();
        assert_eq!(indexer.push("cat", "dog"), 0);
        assert_eq!(indexer.push("dog", "cat"), 1);
        assert_eq!(indexer.len(), 2);

        let groups = indexer.finish(true);
        assert_eq!(groups.get("dog").unwrap().matched_positions(), Some(&[0][..]));
        assert_eq!(groups.get("cat").unwrap().matched_positions(), Some(&[1][..]));
    }
}
