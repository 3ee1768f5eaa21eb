//! Per-scope symbol table.
//!
//! A height-balanced (AVL) binary search tree keyed by the mangled symbol
//! name. The parser needs fast lookup in each scope and a stable in-order
//! traversal for the end-of-parse undefined-function sweep; a balanced BST
//! gives predictable worst-case behavior for both without rehashing.
//!
//! `insert` never overwrites: a colliding key reports "not inserted" and
//! the caller turns that into a redefinition diagnostic. Mutation of an
//! existing entry (upgrading a forward-declared function to defined) goes
//! through `find_mut`.

use std::cmp::Ordering;

use crate::symbol::Symbol;

type Link = Option<Box<Node>>;

struct Node {
    key: String,
    data: Symbol,
    height: i32,
    left: Link,
    right: Link,
}

impl Node {
    fn new(key: &str, data: Symbol) -> Self {
        Self {
            key: key.to_string(),
            data,
            height: 1,
            left: None,
            right: None,
        }
    }
}

fn height(link: &Link) -> i32 {
    link.as_ref().map_or(0, |n| n.height)
}

fn balance_factor(link: &Link) -> i32 {
    match link {
        Some(n) => height(&n.left) - height(&n.right),
        None => 0,
    }
}

fn update_height(node: &mut Node) {
    node.height = 1 + height(&node.left).max(height(&node.right));
}

fn rotate_right(mut y: Box<Node>) -> Box<Node> {
    match y.left.take() {
        Some(mut x) => {
            y.left = x.right.take();
            update_height(&mut y);
            x.right = Some(y);
            update_height(&mut x);
            x
        },
        // unreachable for a left-heavy node; keep the tree intact
        None => y,
    }
}

fn rotate_left(mut x: Box<Node>) -> Box<Node> {
    match x.right.take() {
        Some(mut y) => {
            x.right = y.left.take();
            update_height(&mut x);
            y.left = Some(x);
            update_height(&mut y);
            y
        },
        None => x,
    }
}

/// Symbol table for one lexical scope.
#[derive(Default)]
pub struct SymTable {
    root: Link,
}

impl SymTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Inserts `data` under `key`. Returns false (and leaves the existing
    /// entry untouched) if the key is already present.
    pub fn insert(&mut self, key: &str, data: Symbol) -> bool {
        let mut inserted = false;
        self.root = Self::insert_rec(self.root.take(), key, data, &mut inserted);
        inserted
    }

    fn insert_rec(link: Link, key: &str, data: Symbol, inserted: &mut bool) -> Link {
        let mut node = match link {
            None => {
                *inserted = true;
                return Some(Box::new(Node::new(key, data)));
            },
            Some(node) => node,
        };

        match key.cmp(node.key.as_str()) {
            Ordering::Less => node.left = Self::insert_rec(node.left.take(), key, data, inserted),
            Ordering::Greater => {
                node.right = Self::insert_rec(node.right.take(), key, data, inserted)
            },
            Ordering::Equal => {
                *inserted = false;
                return Some(node);
            },
        }

        update_height(&mut node);
        let bf = height(&node.left) - height(&node.right);

        if bf > 1 {
            if balance_factor(&node.left) < 0 {
                if let Some(left) = node.left.take() {
                    node.left = Some(rotate_left(left));
                }
            }
            return Some(rotate_right(node));
        }
        if bf < -1 {
            if balance_factor(&node.right) > 0 {
                if let Some(right) = node.right.take() {
                    node.right = Some(rotate_right(right));
                }
            }
            return Some(rotate_left(node));
        }

        Some(node)
    }

    /// Looks up a key.
    pub fn find(&self, key: &str) -> Option<&Symbol> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(&node.data),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Looks up a key for mutation. Used to upgrade forward-declared
    /// functions to defined once their body is parsed.
    pub fn find_mut(&mut self, key: &str) -> Option<&mut Symbol> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Equal => return Some(&mut node.data),
                Ordering::Less => node.left.as_deref_mut(),
                Ordering::Greater => node.right.as_deref_mut(),
            };
        }
        None
    }

    /// Returns true if a *defined* function with the same bare name as
    /// `key` (ignoring the `@N` arity suffix) exists. Distinguishes a
    /// wrong-argument-count call from a call to an unknown function.
    pub fn find_function(&self, key: &str) -> bool {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            if bare_names_match(key, &node.key) {
                if let Symbol::Function { defined: true, .. } = node.data {
                    return true;
                }
            }
            current = match key.cmp(node.key.as_str()) {
                Ordering::Less => node.left.as_deref(),
                _ => node.right.as_deref(),
            };
        }
        false
    }

    /// In-order traversal over every entry.
    pub fn visit<F>(&self, f: &mut F)
    where
        F: FnMut(&str, &Symbol),
    {
        Self::visit_rec(&self.root, f);
    }

    fn visit_rec<F>(link: &Link, f: &mut F)
    where
        F: FnMut(&str, &Symbol),
    {
        if let Some(node) = link {
            Self::visit_rec(&node.left, f);
            f(&node.key, &node.data);
            Self::visit_rec(&node.right, f);
        }
    }

    #[cfg(test)]
    fn tree_height(&self) -> i32 {
        height(&self.root)
    }
}

/// Compares two mangled names ignoring everything after the last `@`.
fn bare_names_match(a: &str, b: &str) -> bool {
    match (a.rfind('@'), b.rfind('@')) {
        (Some(i), Some(j)) => a[..i] == b[..j],
        (None, None) => a == b,
        _ => false,
    }
}
