use crate::arena::{ListId, PositionArena};
use crate::position::PositionCounter;
use ahash::AHashMap as HashMap;
use std::borrow::Borrow;
use std::hash::Hash;
use tracing::{debug, trace};

/// One input element of an entity grouping.
///
/// An entity is either a single atomic value or a collection of
/// alternative representations of the same logical thing. Two entities
/// belong together when they share at least one representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity<T> {
    /// An atomic value, treated as a one-element collection.
    Single(T),

    /// Alternative representations of one entity. May be empty, in which
    /// case the entity can never join or be joined by another.
    Multi(Vec<T>),
}

impl<T> Entity<T> {
    pub fn single(value: T) -> Self {
        Entity::Single(value)
    }

    /// The representations of this entity, in order.
    pub fn items(&self) -> &[T] {
        match self {
            Entity::Single(value) => std::slice::from_ref(value),
            Entity::Multi(values) => values,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Entity::Single(value) => vec![value],
            Entity::Multi(values) => values,
        }
    }
}

impl<T> From<Vec<T>> for Entity<T> {
    fn from(values: Vec<T>) -> Self {
        Entity::Multi(values)
    }
}

impl<T, const N: usize> From<[T; N]> for Entity<T> {
    fn from(values: [T; N]) -> Self {
        Entity::Multi(values.into())
    }
}

/// Text is an entity made of its characters, not an atomic value.
///
/// Wrap it in [`Entity::single`] to keep a string whole.
impl From<&str> for Entity<char> {
    fn from(text: &str) -> Self {
        Entity::Multi(text.chars().collect())
    }
}

impl From<String> for Entity<char> {
    fn from(text: String) -> Self {
        Entity::from(text.as_str())
    }
}

/// How an entity touching several existing groups is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The first representation already seen decides the group. Groups that
    /// already exist are never merged with each other, even when a later
    /// entity overlaps both.
    #[default]
    FirstMatch,

    /// Every group the entity touches is merged into the oldest one, giving
    /// the connected components of the overlap relation.
    Transitive,
}

/// Incremental grouping of entities that share representations.
#[derive(Debug, Clone)]
pub struct EntityIndexer<T> {
    /// Latest group each representation was registered to. Under the
    /// transitive policy the handle may be retired; see `redirects`.
    groups_by_item: HashMap<T, ListId>,

    /// Retired group → group it was merged into
    redirects: HashMap<ListId, ListId>,

    arena: PositionArena,
    positions: PositionCounter,
    policy: MergePolicy,
}

impl<T: Hash + Eq> EntityIndexer<T> {
    /// Creates an indexer using [`MergePolicy::FirstMatch`].
    pub fn new() -> Self {
        Self::with_policy(MergePolicy::default())
    }

    pub fn with_policy(policy: MergePolicy) -> Self {
        Self {
            groups_by_item: HashMap::default(),
            redirects: HashMap::default(),
            arena: PositionArena::new(),
            positions: PositionCounter::new(),
            policy,
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Records the next entity and returns the position it was assigned.
    pub fn push<E: Into<Entity<T>>>(&mut self, entity: E) -> usize {
        let position = self.positions.advance();
        let entity: Entity<T> = entity.into();
        let items = entity.into_items();

        let target = match self.policy {
            MergePolicy::FirstMatch => items
                .iter()
                .find_map(|item| self.groups_by_item.get(item).copied()),
            MergePolicy::Transitive => self.merge_touched(&items),
        };

        let group = match target {
            Some(group) => {
                self.arena.push(group, position);
                trace!(position, "entity joined existing group");
                group
            }
            None => {
                trace!(position, "new entity group");
                self.arena.create(position)
            }
        };

        for item in items {
            self.groups_by_item.insert(item, group);
        }

        position
    }

    /// Records every entity of `iter` in order.
    pub fn extend<I, E>(&mut self, iter: I)
    where
        I: IntoIterator<Item = E>,
        E: Into<Entity<T>>,
    {
        for entity in iter {
            self.push(entity);
        }
    }

    /// Number of entities recorded.
    pub fn len(&self) -> usize {
        self.positions.consumed()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions of the group `item` currently belongs to.
    pub fn group_of<Q>(&self, item: &Q) -> Option<&[usize]>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut group = *self.groups_by_item.get(item)?;
        while let Some(&next) = self.redirects.get(&group) {
            group = next;
        }
        Some(self.arena.get(group))
    }

    /// Snapshot of the groups in first-occurrence order.
    ///
    /// With `only_repeated`, entities that joined no other are left out.
    pub fn groups(&self, only_repeated: bool) -> Vec<Vec<usize>> {
        let groups = self.arena.collect(only_repeated);
        debug!(
            entities = self.len(),
            live = self.arena.len(),
            groups = groups.len(),
            policy = ?self.policy,
            "entity grouping finished"
        );
        groups
    }

    /// Merges every live group touched by `items` into the oldest of them.
    fn merge_touched(&mut self, items: &[T]) -> Option<ListId> {
        let mut touched: Vec<ListId> = Vec::new();
        for item in items {
            let Some(&group) = self.groups_by_item.get(item) else {
                continue;
            };
            let root = self.resolve(group);
            if !touched.contains(&root) {
                touched.push(root);
            }
        }

        let oldest = touched
            .iter()
            .copied()
            .min_by_key(|&group| self.arena.first(group))?;

        for group in touched {
            if group != oldest {
                trace!(
                    survivor = self.arena.first(oldest),
                    absorbed = self.arena.first(group),
                    "merging entity groups"
                );
                self.arena.absorb(oldest, group);
                self.redirects.insert(group, oldest);
            }
        }

        Some(oldest)
    }

    /// Follows redirects to the live group, compressing the path walked.
    fn resolve(&mut self, group: ListId) -> ListId {
        let mut root = group;
        while let Some(&next) = self.redirects.get(&root) {
            root = next;
        }

        let mut current = group;
        while let Some(next) = self.redirects.get_mut(&current) {
            let following = *next;
            *next = root;
            current = following;
        }

        debug_assert!(self.arena.contains(root));
        root
    }
}

impl<T: Hash + Eq> Default for EntityIndexer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Groups positions of entities that share at least one representation.
///
/// Uses [`MergePolicy::FirstMatch`]: an entity joins the group of the first
/// of its representations seen before. Groups are ordered by first
/// occurrence. With `only_repeated`, singleton groups are dropped.
///
/// ```
/// use argindex::group_entities;
///
/// let groups = group_entities([vec![1, 2], vec![2, 3], vec![4]], false);
/// assert_eq!(groups, vec![vec![0, 1], vec![2]]);
///
/// // strings are collections of characters
/// let groups = group_entities(["ab", "cd", "bx"], true);
/// assert_eq!(groups, vec![vec![0, 2]]);
/// ```
pub fn group_entities<T, I, E>(iter: I, only_repeated: bool) -> Vec<Vec<usize>>
where
    T: Hash + Eq,
    I: IntoIterator<Item = E>,
    E: Into<Entity<T>>,
{
    group_entities_with(iter, MergePolicy::FirstMatch, only_repeated)
}

/// Like [`group_entities`], with an explicit [`MergePolicy`].
///
/// ```
/// use argindex::{group_entities_with, MergePolicy};
///
/// let input = [vec![1], vec![2], vec![1, 2]];
/// assert_eq!(
///     group_entities_with(input.clone(), MergePolicy::FirstMatch, false),
///     vec![vec![0, 2], vec![1]]
/// );
/// assert_eq!(
///     group_entities_with(input, MergePolicy::Transitive, false),
///     vec![vec![0, 1, 2]]
/// );
/// ```
pub fn group_entities_with<T, I, E>(
    iter: I,
    policy: MergePolicy,
    only_repeated: bool,
) -> Vec<Vec<usize>>
where
    T: Hash + Eq,
    I: IntoIterator<Item = E>,
    E: Into<Entity<T>>,
{
    let mut indexer = EntityIndexer::with_policy(policy);
    indexer.extend(iter);
    indexer.groups(only_repeated)
}
