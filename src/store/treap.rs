//! Size-augmented randomized treap
//!
//! A binary search tree keyed by `(score, member)` with member as tie-break,
//! kept height-balanced in expectation by a max-heap invariant over uniformly
//! random per-node priorities. Every node tracks its subtree size, giving
//! O(log n) rank lookups.
//!
//! ## Ownership
//!
//! The structural routines take the subtree root by value and return the new
//! root for the caller to reassign. No parent pointers, no aliasing, no
//! unsafe.

type Link = Option<Box<Node>>;

struct Node {
    score: i64,
    member: String,
    priority: u64,
    size: usize,
    left: Link,
    right: Link,
}

impl Node {
    fn new(score: i64, member: String) -> Box<Self> {
        Box::new(Self {
            score,
            member,
            priority: rand::random(),
            size: 1,
            left: None,
            right: None,
        })
    }

    /// Recompute `size` from the children ("push-up")
    fn push_up(&mut self) {
        self.size = 1 + subtree_size(&self.left) + subtree_size(&self.right);
    }

    fn key(&self) -> (i64, &str) {
        (self.score, self.member.as_str())
    }
}

fn subtree_size(link: &Link) -> usize {
    link.as_deref().map_or(0, |node| node.size)
}

fn priority(link: &Link) -> u64 {
    link.as_deref().map_or(0, |node| node.priority)
}

/// Rotate the left child above `node` (zig). No-op without a left child.
fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    match node.left.take() {
        Some(mut pivot) => {
            node.left = pivot.right.take();
            node.push_up();
            pivot.right = Some(node);
            pivot.push_up();
            pivot
        }
        None => node,
    }
}

/// Rotate the right child above `node` (zag). No-op without a right child.
fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    match node.right.take() {
        Some(mut pivot) => {
            node.right = pivot.left.take();
            node.push_up();
            pivot.left = Some(node);
            pivot.push_up();
            pivot
        }
        None => node,
    }
}

fn insert(link: Link, score: i64, member: &str) -> (Link, bool) {
    let mut node = match link {
        None => return (Some(Node::new(score, member.to_string())), true),
        Some(node) => node,
    };

    use std::cmp::Ordering::*;
    let inserted = match (score, member).cmp(&node.key()) {
        Less => {
            let (child, inserted) = insert(node.left.take(), score, member);
            node.left = child;
            if priority(&node.left) > node.priority {
                node = rotate_right(node);
            }
            inserted
        }
        Greater => {
            let (child, inserted) = insert(node.right.take(), score, member);
            node.right = child;
            if priority(&node.right) > node.priority {
                node = rotate_left(node);
            }
            inserted
        }
        // Exact key already present: never mutate a key in place
        Equal => false,
    };
    node.push_up();
    (Some(node), inserted)
}

fn erase(link: Link, score: i64, member: &str) -> (Link, bool) {
    let mut node = match link {
        None => return (None, false),
        Some(node) => node,
    };

    use std::cmp::Ordering::*;
    match (score, member).cmp(&node.key()) {
        Less => {
            let (child, removed) = erase(node.left.take(), score, member);
            node.left = child;
            node.push_up();
            (Some(node), removed)
        }
        Greater => {
            let (child, removed) = erase(node.right.take(), score, member);
            node.right = child;
            node.push_up();
            (Some(node), removed)
        }
        Equal => {
            if node.left.is_none() && node.right.is_none() {
                return (None, true);
            }
            if node.left.is_none() || node.right.is_none() {
                // One child: splice it up directly
                let child = node.left.take().or_else(|| node.right.take());
                return (child, true);
            }
            // Two children: rotate the higher-priority child up and chase the
            // demoted node down. Priority ties resolve toward the right.
            if priority(&node.left) > priority(&node.right) {
                node = rotate_right(node);
                let (child, removed) = erase(node.right.take(), score, member);
                node.right = child;
                node.push_up();
                (Some(node), removed)
            } else {
                node = rotate_left(node);
                let (child, removed) = erase(node.left.take(), score, member);
                node.left = child;
                node.push_up();
                (Some(node), removed)
            }
        }
    }
}

/// A rank-indexed ordered set of `(score, member)` pairs
#[derive(Default)]
pub struct Treap {
    root: Link,
}

impl Treap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pairs in the tree
    pub fn len(&self) -> usize {
        subtree_size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Insert a pair. Returns false (and leaves the tree unchanged) when the
    /// exact pair is already present.
    pub fn insert(&mut self, score: i64, member: &str) -> bool {
        let (root, inserted) = insert(self.root.take(), score, member);
        self.root = root;
        inserted
    }

    /// Remove a pair. Returns false when the pair is not in the tree.
    pub fn erase(&mut self, score: i64, member: &str) -> bool {
        let (root, removed) = erase(self.root.take(), score, member);
        self.root = root;
        removed
    }

    /// Look up the 1-based rank `rank` in ascending `(score, member)` order
    pub fn get_by_rank(&self, rank: usize) -> Option<(i64, &str)> {
        if rank == 0 || rank > self.len() {
            return None;
        }
        let mut node = self.root.as_deref()?;
        let mut rank = rank;
        loop {
            let left_size = subtree_size(&node.left);
            if rank <= left_size {
                node = node.left.as_deref()?;
            } else if rank == left_size + 1 {
                return Some((node.score, node.member.as_str()));
            } else {
                rank -= left_size + 1;
                node = node.right.as_deref()?;
            }
        }
    }

    /// In-order traversal: all pairs in ascending `(score, member)` order
    pub fn in_order(&self) -> Vec<(i64, String)> {
        fn walk(link: &Link, out: &mut Vec<(i64, String)>) {
            if let Some(node) = link.as_deref() {
                walk(&node.left, out);
                out.push((node.score, node.member.clone()));
                walk(&node.right, out);
            }
        }
        let mut out = Vec::with_capacity(self.len());
        walk(&self.root, &mut out);
        out
    }
}
