use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a position-list stored in a [`PositionArena`].
    pub(crate) struct ListId;
}

/// Shared storage for position-lists.
///
/// Lists are addressed by generational handles, so several records can
/// refer to the same list and observe later appends (the "live view" of
/// matched positions). Creation order is tracked separately because
/// results are reported in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub(crate) struct PositionArena {
    lists: SlotMap<ListId, Vec<usize>>,

    /// Every list ever created, oldest first. Retired lists stay here and
    /// are skipped when collecting.
    order: Vec<ListId>,
}

impl PositionArena {
    pub(crate) fn new() -> Self {
        Self {
            lists: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Creates a singleton list holding `position`.
    pub(crate) fn create(&mut self, position: usize) -> ListId {
        let id = self.lists.insert(vec![position]);
        self.order.push(id);
        id
    }

    /// Appends a position to an existing list.
    ///
    /// Positions arrive in traversal order, so lists stay ascending.
    pub(crate) fn push(&mut self, id: ListId, position: usize) {
        let list = self
            .lists
            .get_mut(id)
            .expect("position-list handle should be live");
        debug_assert!(list.last().map_or(true, |&last| last < position));
        list.push(position);
    }

    pub(crate) fn get(&self, id: ListId) -> &[usize] {
        self.lists
            .get(id)
            .expect("position-list handle should be live")
    }

    /// First position of a list, used to rank groups by age.
    pub(crate) fn first(&self, id: ListId) -> usize {
        self.get(id)[0]
    }

    pub(crate) fn contains(&self, id: ListId) -> bool {
        self.lists.contains_key(id)
    }

    /// Moves every position of `source` into `target` and retires `source`.
    ///
    /// Both lists are ascending and disjoint; the result stays ascending.
    pub(crate) fn absorb(&mut self, target: ListId, source: ListId) {
        assert_ne!(target, source, "Cannot absorb a list into itself");
        let moved = self
            .lists
            .remove(source)
            .expect("absorbed position-list handle should be live");
        let kept = std::mem::take(
            self.lists
                .get_mut(target)
                .expect("target position-list handle should be live"),
        );
        self.lists[target] = merge_ascending(kept, moved);
    }

    /// Number of live lists.
    pub(crate) fn len(&self) -> usize {
        self.lists.len()
    }

    /// Collects live lists in creation order.
    ///
    /// With `only_repeated`, singleton lists are skipped.
    pub(crate) fn collect(&self, only_repeated: bool) -> Vec<Vec<usize>> {
        self.order
            .iter()
            .filter_map(|&id| self.lists.get(id))
            .filter(|list| !only_repeated || list.len() > 1)
            .cloned()
            .collect()
    }
}

fn merge_ascending(left: Vec<usize>, right: Vec<usize>) -> Vec<usize> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => a < b,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        merged.extend(next);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_push() {
        let mut arena = PositionArena::new();
        let a = arena.create(0);
        let b = arena.create(1);
        arena.push(a, 2);

        assert_eq!(arena.get(a), &[0, 2]);
        assert_eq!(arena.get(b), &[1]);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_collect_in_creation_order() {
        let mut arena = PositionArena::new();
        let a = arena.create(0);
        let b = arena.create(1);
        arena.create(2);
        arena.push(b, 3);
        arena.push(a, 4);

        assert_eq!(arena.collect(false), vec![vec![0, 4], vec![1, 3], vec![2]]);
        assert_eq!(arena.collect(true), vec![vec![0, 4], vec![1, 3]]);
    }

    #[test]
    fn test_absorb_merges_ascending() {
        let mut arena = PositionArena::new();
        let a = arena.create(0);
        let b = arena.create(1);
        arena.push(a, 3);
        arena.push(b, 2);
        arena.absorb(a, b);

        assert_eq!(arena.get(a), &[0, 1, 2, 3]);
        assert!(!arena.contains(b));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.collect(false), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    #[should_panic(expected = "Cannot absorb a list into itself")]
    fn test_absorb_self() {
        let mut arena = PositionArena::new();
        let a = arena.create(0);
        arena.absorb(a, a);
    }

    #[test]
    fn test_merge_ascending() {
        assert_eq!(merge_ascending(vec![1, 4, 6], vec![2, 3, 7]), vec![1, 2, 3, 4, 6, 7]);
        assert_eq!(merge_ascending(vec![], vec![5]), vec![5]);
        assert_eq!(merge_ascending(vec![], vec![]), Vec::<usize>::new());
    }
}
