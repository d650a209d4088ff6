//! Parent/child index over the entries of a history file.

use std::collections::{HashMap, HashSet, VecDeque};

use scribe_core::ContentHash;

use crate::format::{HistoryFile, VersionEntry};

/// An index over one history's entries, built once per load.
///
/// Nodes are entry positions in file order. A hash that appears more than
/// once resolves to its first position for lookups. Parent walks follow the
/// append order instead: a parent is the latest entry with that hash written
/// before the child.
#[derive(Debug)]
pub struct VersionGraph<'a> {
    entries: &'a [VersionEntry],
    index: HashMap<ContentHash, usize>,
    positions: HashMap<ContentHash, Vec<usize>>,
    children: HashMap<ContentHash, Vec<usize>>,
    root: Option<usize>,
}

impl<'a> VersionGraph<'a> {
    pub fn new(history: &'a HistoryFile) -> Self {
        let entries = history.entries.as_slice();
        let mut index = HashMap::new();
        let mut positions: HashMap<ContentHash, Vec<usize>> = HashMap::new();
        let mut children: HashMap<ContentHash, Vec<usize>> = HashMap::new();
        let mut root = None;

        for (pos, entry) in entries.iter().enumerate() {
            index.entry(entry.hash).or_insert(pos);
            positions.entry(entry.hash).or_default().push(pos);
            match entry.parent {
                Some(parent) => children.entry(parent).or_default().push(pos),
                None => {
                    root.get_or_insert(pos);
                }
            }
        }

        Self {
            entries,
            index,
            positions,
            children,
            root,
        }
    }

    /// First entry with this hash.
    pub fn get(&self, hash: &ContentHash) -> Option<&'a VersionEntry> {
        self.index.get(hash).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.index.contains_key(hash)
    }

    /// The root entry.
    pub fn root(&self) -> Option<&'a VersionEntry> {
        self.root.map(|pos| &self.entries[pos])
    }

    /// Entries whose parent is `hash`, in file order.
    pub fn children(&self, hash: &ContentHash) -> impl Iterator<Item = &'a VersionEntry> + '_ {
        self.children
            .get(hash)
            .into_iter()
            .flatten()
            .map(|&pos| &self.entries[pos])
    }

    /// Entries from `from` back to (but excluding) `to`, following parents.
    ///
    /// The walk starts at the last entry with hash `from` and resolves each
    /// parent to the latest matching entry before the child, so positions
    /// strictly decrease and the walk always terminates. Returns `None` if
    /// `to` is not an ancestor of `from` (or equal to it, which yields an
    /// empty walk).
    pub fn ancestry(&self, from: &ContentHash, to: &ContentHash) -> Option<Vec<&'a VersionEntry>> {
        let mut walk = Vec::new();
        if from == to {
            return Some(walk);
        }
        let mut pos = *self.positions.get(from)?.last()?;
        loop {
            let entry = &self.entries[pos];
            walk.push(entry);
            let parent = entry.parent?;
            if parent == *to {
                return Some(walk);
            }
            pos = self.latest_before(&parent, pos)?;
        }
    }

    fn latest_before(&self, hash: &ContentHash, before: usize) -> Option<usize> {
        self.positions
            .get(hash)?
            .iter()
            .rev()
            .find(|&&pos| pos < before)
            .copied()
    }

    /// Shortest chain of entries from the root to `target`, root excluded.
    ///
    /// Breadth-first over the child index. Returns `None` if `target` is
    /// unreachable from the root.
    pub fn path_from_root(&self, target: &ContentHash) -> Option<Vec<&'a VersionEntry>> {
        let root = self.root()?;
        if root.hash == *target {
            return Some(Vec::new());
        }

        let mut came_from: HashMap<ContentHash, &'a VersionEntry> = HashMap::new();
        let mut visited = HashSet::from([root.hash]);
        let mut queue = VecDeque::from([root.hash]);

        while let Some(hash) = queue.pop_front() {
            for child in self.children(&hash) {
                if !visited.insert(child.hash) {
                    continue;
                }
                came_from.insert(child.hash, child);
                if child.hash == *target {
                    return Some(self.unwind(&came_from, *target, root.hash));
                }
                queue.push_back(child.hash);
            }
        }
        None
    }

    fn unwind(
        &self,
        came_from: &HashMap<ContentHash, &'a VersionEntry>,
        target: ContentHash,
        root: ContentHash,
    ) -> Vec<&'a VersionEntry> {
        let mut path = Vec::new();
        let mut cursor = target;
        while cursor != root {
            let Some(entry) = came_from.get(&cursor) else {
                break;
            };
            path.push(*entry);
            match entry.parent {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
