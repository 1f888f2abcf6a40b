/*
 * QuadTree Module
 *
 * This module defines a point quadtree used to find the particles inside a
 * query window without scanning the whole population.
 *
 * The tree is stored as a flat arena of nodes addressed by index. It is
 * rebuilt from scratch every frame, so there is no removal: `clear` keeps the
 * arena's allocation and the next batch of insertions refills it.
 *
 * Each node holds up to `capacity` items. When a full node receives another
 * item it is split into four quadrants (NW, NE, SW, SE) and the new item is
 * handed to the first quadrant that contains it. Items already stored in the
 * node stay where they are.
 */

use nannou::prelude::*;

use crate::region::Region;

pub const DEFAULT_NODE_CAPACITY: usize = 16;

// Nodes this deep accept items past capacity instead of splitting again.
// Only reached when many items share (almost) the same coordinates.
pub const MAX_DEPTH: usize = 32;

// Anything that can be placed in the tree
pub trait Locatable {
    fn position(&self) -> Vec2;
}

impl Locatable for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    boundary: Region,
    items: Vec<T>,
    // Index of the NW child; NE, SW and SE follow it in the arena
    first_child: Option<usize>,
    depth: usize,
}

impl<T> Node<T> {
    fn new(boundary: Region, depth: usize, capacity: usize) -> Self {
        Self {
            boundary,
            items: Vec::with_capacity(capacity),
            first_child: None,
            depth,
        }
    }

    fn children(&self) -> Option<std::ops::Range<usize>> {
        self.first_child.map(|first| first..first + 4)
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    nodes: Vec<Node<T>>,
    capacity: usize,
    len: usize,
}

impl<T: Locatable + Clone> QuadTree<T> {
    pub fn new(boundary: Region) -> Self {
        Self::with_capacity(boundary, DEFAULT_NODE_CAPACITY)
    }

    pub fn with_capacity(boundary: Region, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            nodes: vec![Node::new(boundary, 0, capacity)],
            capacity,
            len: 0,
        }
    }

    pub fn boundary(&self) -> Region {
        self.nodes[0].boundary
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|n| n.depth).max().unwrap_or(0)
    }

    // Drop every item and child, keeping the arena allocation
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[0].items.clear();
        self.nodes[0].first_child = None;
        self.len = 0;
    }

    // Clear and refill with a new root region. Returns the number of items inserted.
    pub fn rebuild<I>(&mut self, boundary: Region, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.nodes[0].boundary = boundary;
        self.batch_insert(items)
    }

    // Insert every item that lies in the root region, silently skipping the others.
    // Returns the number of items inserted.
    pub fn batch_insert<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let root = self.nodes[0].boundary;
        let mut inserted = 0;

        for item in items {
            if root.contains(item.position()) && self.insert(item) {
                inserted += 1;
            }
        }

        inserted
    }

    // Insert one item. Returns false, leaving the tree untouched, if the item is
    // outside the root region.
    pub fn insert(&mut self, item: T) -> bool {
        let position = item.position();
        let mut node = 0;

        if !self.nodes[node].boundary.contains(position) {
            return false;
        }

        loop {
            // Room left in this node, or too deep to split further
            if self.nodes[node].items.len() < self.capacity || self.nodes[node].depth >= MAX_DEPTH {
                self.nodes[node].items.push(item);
                self.len += 1;
                return true;
            }

            if self.nodes[node].first_child.is_none() {
                self.subdivide(node);
            }

            let children = match self.nodes[node].children() {
                Some(children) => children,
                None => return false,
            };

            // First quadrant in NW, NE, SW, SE order that accepts the item
            match children.into_iter().find(|&child| self.nodes[child].boundary.contains(position)) {
                Some(child) => node = child,
                None => {
                    // Quadrants cover their parent exactly, so this is a bug
                    log::error!(
                        "quadtree node {:?} contains {:?} but none of its quadrants do",
                        self.nodes[node].boundary,
                        position
                    );
                    debug_assert!(false, "point inside a node rejected by all four quadrants");
                    return false;
                }
            }
        }
    }

    // Every item whose position lies in `window`, in unspecified order
    pub fn query(&self, window: &Region) -> Vec<T> {
        let mut found = Vec::new();
        self.query_into(window, &mut found);
        found
    }

    // Same as `query` but appends into a caller-owned buffer
    pub fn query_into(&self, window: &Region, found: &mut Vec<T>) {
        let mut stack = Vec::with_capacity(MAX_DEPTH * 3 + 1);
        stack.push(0);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];

            // Prune whole subtrees that cannot hold a match
            if !node.boundary.intersects(window) {
                continue;
            }

            found.extend(
                node.items
                    .iter()
                    .filter(|item| window.contains(item.position()))
                    .cloned(),
            );

            if let Some(children) = node.children() {
                stack.extend(children.rev());
            }
        }
    }

    // Boundaries of every node, for debug overlays
    pub fn boundaries(&self) -> impl Iterator<Item = &Region> + '_ {
        self.nodes.iter().map(|n| &n.boundary)
    }

    // All stored items, in arena order
    pub fn items(&self) -> impl Iterator<Item = &T> + '_ {
        self.nodes.iter().flat_map(|n| n.items.iter())
    }

    fn subdivide(&mut self, index: usize) {
        let quadrants = self.nodes[index].boundary.quadrants();
        let depth = self.nodes[index].depth + 1;
        let first = self.nodes.len();

        for quadrant in quadrants {
            self.nodes.push(Node::new(quadrant, depth, self.capacity));
        }

        self.nodes[index].first_child = Some(first);
    }
}
