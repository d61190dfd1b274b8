//! Alignment of an original child sequence against its rewritten order.
//!
//! Elements are matched by identity. The elements that stay anchored at
//! their original position form an increasing run of original indices in
//! the target order; everything else is an insertion, a removal or a move.
//! The run keeps as many original elements as possible, which minimises the
//! number of moves, and among equally heavy runs the one with the smallest
//! original indices wins, so the earliest elements stay in place.

use std::fmt;

use weaver_syntax::NodeId;

use crate::node::RewriteNode;

/// Position of an element in the rewritten list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ListItem {
    /// The element now at this position.
    pub(crate) node: RewriteNode,
    /// Index of the original element this position descends from: the
    /// element itself, or the element it replaced.
    pub(crate) origin: Option<usize>,
}

impl ListItem {
    pub(crate) const fn original(index: usize, node: NodeId) -> Self {
        Self {
            node: RewriteNode::Original(node),
            origin: Some(index),
        }
    }

    #[cfg(test)]
    pub(crate) const fn inserted(node: RewriteNode) -> Self {
        Self { node, origin: None }
    }
}

/// How one entry of a [`ListEditScript`] changes the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListTag {
    /// The original element stays in place.
    Unchanged,
    /// A new element is inserted.
    Inserted,
    /// The original element is removed.
    Removed,
    /// The original element is replaced in place.
    Replaced,
    /// The original element at the given index is re-emitted here.
    MovedFrom(usize),
}

impl fmt::Display for ListTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => f.write_str("unchanged"),
            Self::Inserted => f.write_str("inserted"),
            Self::Removed => f.write_str("removed"),
            Self::Replaced => f.write_str("replaced"),
            Self::MovedFrom(index) => write!(f, "moved from {index}"),
        }
    }
}

/// One entry of a [`ListEditScript`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListEntry {
    original_index: Option<usize>,
    node: RewriteNode,
    tag: ListTag,
}

impl ListEntry {
    /// Index of the original element the entry consumes, if any.
    #[must_use]
    pub const fn original_index(&self) -> Option<usize> {
        self.original_index
    }

    /// The element the entry emits, or the removed original.
    #[must_use]
    pub const fn node(&self) -> RewriteNode {
        self.node
    }

    /// What the entry does.
    #[must_use]
    pub const fn tag(&self) -> ListTag {
        self.tag
    }

    /// Whether the entry keeps an original element at its position.
    #[must_use]
    pub const fn is_anchor(&self) -> bool {
        matches!(self.tag, ListTag::Unchanged | ListTag::Replaced)
    }
}

/// Resolved edit script of one list property.
///
/// Entries that emit an element appear in the rewritten order; removals
/// are interleaved at the position of the original element they drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEditScript {
    entries: Vec<ListEntry>,
}

impl ListEditScript {
    /// Entries in script order.
    #[must_use]
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    /// Whether the script leaves the list untouched.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.tag == ListTag::Unchanged)
    }

    /// Number of entries with the given tag kind.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(ListTag) -> bool) -> usize {
        self.entries
            .iter()
            .filter(|entry| predicate(entry.tag))
            .count()
    }

    /// The elements of the rewritten list in order.
    pub fn rewritten(&self) -> impl Iterator<Item = RewriteNode> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.tag != ListTag::Removed)
            .map(|entry| entry.node)
    }
}

/// Aligns `items` against the `original` elements.
pub(crate) fn align(original: &[NodeId], items: &[ListItem]) -> ListEditScript {
    let candidates: Vec<(usize, Candidate)> = items
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            item.origin.map(|origin| {
                let candidate = Candidate {
                    origin,
                    is_original: matches!(item.node, RewriteNode::Original(_)),
                };
                (position, candidate)
            })
        })
        .collect();
    let chosen: Vec<Candidate> = candidates.iter().map(|(_, candidate)| *candidate).collect();
    let mut anchored = vec![false; items.len()];
    for index in heaviest_increasing(&chosen) {
        if let Some(flag) = candidates
            .get(index)
            .and_then(|(position, _)| anchored.get_mut(*position))
        {
            *flag = true;
        }
    }

    // Originals survive when they stay anchored or move; replacements give
    // up their original slot unless they are anchored.
    let mut consumed = vec![false; original.len()];
    for (item, anchor) in items.iter().zip(&anchored) {
        let keeps = *anchor || matches!(item.node, RewriteNode::Original(_));
        if let (true, Some(origin)) = (keeps, item.origin)
            && let Some(flag) = consumed.get_mut(origin)
        {
            *flag = true;
        }
    }

    let mut entries = Vec::with_capacity(items.len().saturating_add(original.len()));
    let mut pending_removed = original
        .iter()
        .zip(&consumed)
        .enumerate()
        .filter(|(_, (_, kept))| !**kept)
        .map(|(index, (node, _))| (index, *node))
        .peekable();

    for (item, anchor) in items.iter().zip(&anchored) {
        let entry = match (item.origin, *anchor) {
            (Some(origin), true) => {
                while let Some((index, node)) =
                    pending_removed.next_if(|(index, _)| *index < origin)
                {
                    entries.push(removed(index, node));
                }
                let unchanged =
                    original.get(origin).copied().map(RewriteNode::Original) == Some(item.node);
                ListEntry {
                    original_index: Some(origin),
                    node: item.node,
                    tag: if unchanged {
                        ListTag::Unchanged
                    } else {
                        ListTag::Replaced
                    },
                }
            }
            (Some(origin), false) if matches!(item.node, RewriteNode::Original(_)) => ListEntry {
                original_index: Some(origin),
                node: item.node,
                tag: ListTag::MovedFrom(origin),
            },
            _ => ListEntry {
                original_index: None,
                node: item.node,
                tag: ListTag::Inserted,
            },
        };
        entries.push(entry);
    }
    entries.extend(pending_removed.map(|(index, node)| removed(index, node)));
    ListEditScript { entries }
}

const fn removed(index: usize, node: NodeId) -> ListEntry {
    ListEntry {
        original_index: Some(index),
        node: RewriteNode::Original(node),
        tag: ListTag::Removed,
    }
}

/// An element that may stay anchored at its original position.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    origin: usize,
    is_original: bool,
}

impl Candidate {
    const fn weight(self) -> Weight {
        Weight {
            originals: if self.is_original { 1 } else { 0 },
            anchors: 1,
        }
    }
}

/// Score of an anchor run: kept originals first, so that moves are
/// minimised, then the total number of anchored positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
struct Weight {
    originals: usize,
    anchors: usize,
}

impl Weight {
    const fn plus(self, other: Self) -> Self {
        Self {
            originals: self.originals.saturating_add(other.originals),
            anchors: self.anchors.saturating_add(other.anchors),
        }
    }

    const fn minus(self, other: Self) -> Self {
        Self {
            originals: self.originals.saturating_sub(other.originals),
            anchors: self.anchors.saturating_sub(other.anchors),
        }
    }

    const fn is_zero(self) -> bool {
        self.anchors == 0
    }
}

/// Returns indices of the heaviest run of `candidates` with strictly
/// increasing origins. Ties go to the run with the smallest origins.
fn heaviest_increasing(candidates: &[Candidate]) -> Vec<usize> {
    // `best[p]` is the weight of the heaviest run starting at `p`.
    let mut best = vec![Weight::default(); candidates.len()];
    for (position, candidate) in candidates.iter().enumerate().rev() {
        let tail = candidates
            .iter()
            .zip(&best)
            .skip(position.saturating_add(1))
            .filter(|(later, _)| later.origin > candidate.origin)
            .map(|(_, weight)| *weight)
            .max()
            .unwrap_or_default();
        if let Some(slot) = best.get_mut(position) {
            *slot = candidate.weight().plus(tail);
        }
    }

    let mut needed = best.iter().copied().max().unwrap_or_default();
    let mut indices = Vec::new();
    let mut start = 0;
    let mut floor: Option<usize> = None;
    while !needed.is_zero() {
        let next = candidates
            .iter()
            .zip(&best)
            .enumerate()
            .skip(start)
            .filter(|(_, (candidate, weight))| {
                **weight == needed && floor.is_none_or(|bound| candidate.origin > bound)
            })
            .min_by_key(|(_, (candidate, _))| candidate.origin);
        let Some((index, (candidate, _))) = next else {
            break;
        };
        indices.push(index);
        floor = Some(candidate.origin);
        start = index.saturating_add(1);
        needed = needed.minus(candidate.weight());
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NewNodeId, SessionId};
    use rstest::rstest;
    use weaver_syntax::{CHILDREN, ListLayout, Separator, SyntaxCategory, TreeBuilder};

    fn originals(count: usize) -> Vec<NodeId> {
        let source = "x".repeat(count);
        let mut builder = TreeBuilder::new(source.clone());
        let ids: Vec<NodeId> = (0..count)
            .map(|index| {
                builder
                    .leaf("x", SyntaxCategory::Expression, index..index + 1)
                    .expect("leaf")
            })
            .collect();
        let root = builder
            .node("list", SyntaxCategory::Other, 0..count)
            .list(CHILDREN, ids.clone(), ListLayout::new(0, Separator::Space))
            .build()
            .expect("root");
        builder.finish(root).expect("tree");
        ids
    }

    fn tags(script: &ListEditScript) -> Vec<String> {
        script
            .entries()
            .iter()
            .map(|entry| {
                let index = entry
                    .original_index()
                    .map_or_else(|| String::from("-"), |index| index.to_string());
                format!("{index}:{}", entry.tag())
            })
            .collect()
    }

    fn item(ids: &[NodeId], index: usize) -> ListItem {
        ListItem::original(index, *ids.get(index).expect("original"))
    }

    #[rstest]
    #[case(&[0, 1, 2], &[0, 1, 2])]
    #[case(&[2, 0, 1], &[1, 2])]
    #[case(&[1, 0], &[1])]
    #[case(&[3, 1, 2, 0], &[1, 2])]
    fn heaviest_run_prefers_earliest_originals(
        #[case] origins: &[usize],
        #[case] expected: &[usize],
    ) {
        let candidates: Vec<Candidate> = origins
            .iter()
            .map(|origin| Candidate {
                origin: *origin,
                is_original: true,
            })
            .collect();
        assert_eq!(heaviest_increasing(&candidates), expected);
    }

    #[test]
    fn rotation_moves_a_single_element() {
        let ids = originals(3);
        let items: Vec<ListItem> = [2, 0, 1].iter().map(|index| item(&ids, *index)).collect();
        let script = align(&ids, &items);
        assert_eq!(
            tags(&script),
            ["2:moved from 2", "0:unchanged", "1:unchanged"]
        );
        assert_eq!(script.count(|tag| matches!(tag, ListTag::MovedFrom(_))), 1);
    }

    #[test]
    fn removals_are_interleaved_at_their_original_position() {
        let ids = originals(3);
        let fresh = RewriteNode::New(NewNodeId::new(SessionId::fresh(), 0));
        let items = vec![item(&ids, 0), ListItem::inserted(fresh), item(&ids, 2)];
        let script = align(&ids, &items);
        assert_eq!(
            tags(&script),
            ["0:unchanged", "-:inserted", "1:removed", "2:unchanged"]
        );
        assert_eq!(script.rewritten().count(), 3);
    }

    #[test]
    fn replacements_that_move_become_insert_and_remove() {
        let ids = originals(2);
        let fresh = RewriteNode::New(NewNodeId::new(SessionId::fresh(), 0));
        let items = vec![
            item(&ids, 1),
            ListItem {
                node: fresh,
                origin: Some(0),
            },
        ];
        let script = align(&ids, &items);
        assert_eq!(tags(&script), ["0:removed", "1:unchanged", "-:inserted"]);
    }
}
