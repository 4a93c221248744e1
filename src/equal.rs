use crate::arena::{ListId, PositionArena};
use crate::position::PositionCounter;
use ahash::AHashMap as HashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use tracing::{debug, trace};

/// Incremental index of positions holding equal items.
///
/// Each distinct item owns one position-list; lists are reported in the
/// order their item first appeared.
#[derive(Debug, Clone)]
pub struct EqualIndexer<T> {
    /// Maps each distinct item to its position-list
    lists_by_item: HashMap<T, ListId>,

    arena: PositionArena,
    positions: PositionCounter,
}

impl<T: Hash + Eq> EqualIndexer<T> {
    pub fn new() -> Self {
        Self {
            lists_by_item: HashMap::default(),
            arena: PositionArena::new(),
            positions: PositionCounter::new(),
        }
    }

    /// Records the next item and returns the position it was assigned.
    pub fn push(&mut self, item: T) -> usize {
        let position = self.positions.advance();

        match self.lists_by_item.get(&item) {
            Some(&id) => self.arena.push(id, position),
            None => {
                let id = self.arena.create(position);
                trace!(position, "new equality group");
                self.lists_by_item.insert(item, id);
            }
        }

        position
    }

    /// Records every item of `iter` in order.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }

    /// Number of items recorded.
    pub fn len(&self) -> usize {
        self.positions.consumed()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of distinct items recorded.
    pub fn distinct(&self) -> usize {
        self.lists_by_item.len()
    }

    /// Positions at which `item` occurs, ascending.
    pub fn positions_of<Q>(&self, item: &Q) -> Option<&[usize]>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lists_by_item.get(item).map(|&id| self.arena.get(id))
    }

    /// Snapshot of the position-lists in first-occurrence order.
    ///
    /// With `only_repeated`, items that occurred once are left out.
    pub fn groups(&self, only_repeated: bool) -> Vec<Vec<usize>> {
        let groups = self.arena.collect(only_repeated);
        debug!(
            items = self.len(),
            distinct = self.distinct(),
            groups = groups.len(),
            "equality grouping finished"
        );
        groups
    }
}

impl<T: Hash + Eq> Default for EqualIndexer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups positions of equal items.
///
/// Returns one position-list per distinct item, ordered by first
/// occurrence. With `only_repeated`, only lists with more than one
/// position are returned.
///
/// ```
/// use argindex::group_equal;
///
/// let groups = group_equal([1, -1, 2, -1, 1], false);
/// assert_eq!(groups, vec![vec![0, 4], vec![1, 3], vec![2]]);
///
/// let repeated = group_equal([1, -1, 2, -1, 1], true);
/// assert_eq!(repeated, vec![vec![0, 4], vec![1, 3]]);
/// ```
pub fn group_equal<T, I>(iter: I, only_repeated: bool) -> Vec<Vec<usize>>
where
    T: Hash + Eq,
    I: IntoIterator<Item = T>,
{
    let mut indexer = EqualIndexer::new();
    indexer.extend(iter);
    indexer.groups(only_repeated)
}
