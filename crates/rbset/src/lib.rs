use std::cmp::Ordering;
use std::fmt;

pub mod cursor;
mod error;
mod macros;

pub use cursor::{Cursor, Order};
pub use error::Error;

use crate::error::Result;

pub type NodeId = u32;

const NIL: NodeId = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Red,
    Black,
}

impl Colour {
    pub fn black_height(&self) -> u8 {
        match self {
            Colour::Red => 0,
            Colour::Black => 1,
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Colour::Red => write!(f, "red")?,
            Colour::Black => write!(f, "black")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    Inserted,
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delete {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone)]
struct Node {
    key: i32,
    colour: Colour,
    left: NodeId,
    right: NodeId,
    parent: NodeId,
}

impl Node {
    fn new(key: i32) -> Self {
        Self { key, colour: Colour::Red, left: NIL, right: NIL, parent: NIL }
    }
}

/// An ordered set of `i32` keys backed by an arena-allocated red-black tree.
///
/// Node relations are plain indices into the arena, so the child/parent
/// cycle never touches ownership; `NIL` marks an absent child and reads as
/// an implicitly black leaf.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: vec![], free: vec![], root: NIL, len: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeRef<'_>> {
        if self.root == NIL {
            None
        } else {
            Some(NodeRef { tree: self, id: self.root })
        }
    }

    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        assert!((id as usize) < self.nodes.len(), "stale node id");
        NodeRef { tree: self, id }
    }

    pub fn search(&self, key: i32) -> Option<NodeId> {
        let mut curr = self.root;
        while curr != NIL {
            let node = &self.nodes[curr as usize];
            match key.cmp(&node.key) {
                Ordering::Equal => return Some(curr),
                Ordering::Less => curr = node.left,
                Ordering::Greater => curr = node.right,
            }
        }
        None
    }

    pub fn contains(&self, key: i32) -> bool {
        self.search(key).is_some()
    }

    #[tracing::instrument(skip(self))]
    pub fn insert(&mut self, key: i32) -> Insert {
        let mut parent = NIL;
        let mut curr = self.root;
        while curr != NIL {
            parent = curr;
            let node = &self.nodes[curr as usize];
            match key.cmp(&node.key) {
                Ordering::Equal => return Insert::Duplicate,
                Ordering::Less => curr = node.left,
                Ordering::Greater => curr = node.right,
            }
        }

        let id = self.alloc(key);
        self.nodes[id as usize].parent = parent;
        if parent == NIL {
            self.root = id;
        } else if key < self.nodes[parent as usize].key {
            self.nodes[parent as usize].left = id;
        } else {
            self.nodes[parent as usize].right = id;
        }
        self.len += 1;
        self.insert_fixup(id);
        Insert::Inserted
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, key: i32) -> Delete {
        match self.search(key) {
            None => Delete::NotFound,
            Some(id) => {
                self.remove(id);
                Delete::Deleted
            }
        }
    }

    /// In-order yields the current keys in strictly ascending order.
    pub fn traverse(&self, order: Order) -> Cursor<'_> {
        Cursor::new(self, order)
    }

    pub fn iter(&self) -> Cursor<'_> {
        self.traverse(Order::In)
    }

    /// Releases every node at once; the tree is empty afterwards.
    #[tracing::instrument(skip(self))]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = NIL;
        self.len = 0;
    }

    pub fn is_balanced(&self) -> bool {
        self.check().is_ok()
    }

    /// Walks the whole tree and returns its black-height, or the first
    /// violated red-black/BST invariant.
    pub fn check(&self) -> Result<usize> {
        if self.root == NIL {
            return Ok(0);
        }
        let root = &self.nodes[self.root as usize];
        if root.colour == Colour::Red {
            return Err(Error::RedRoot);
        }
        if root.parent != NIL {
            return Err(Error::BrokenParentLink(root.key));
        }
        self.check_node(self.root, None, None)
    }

    fn check_node(&self, id: NodeId, lo: Option<i32>, hi: Option<i32>) -> Result<usize> {
        if id == NIL {
            return Ok(0);
        }
        let node = &self.nodes[id as usize];
        if lo.is_some_and(|lo| node.key <= lo) || hi.is_some_and(|hi| node.key >= hi) {
            return Err(Error::OrderViolation(node.key));
        }
        if node.colour == Colour::Red
            && (self.colour(node.left) == Colour::Red || self.colour(node.right) == Colour::Red)
        {
            return Err(Error::ConsecutiveRed(node.key));
        }
        for child in [node.left, node.right] {
            if child != NIL && self.nodes[child as usize].parent != id {
                return Err(Error::BrokenParentLink(self.nodes[child as usize].key));
            }
        }

        let lheight = self.check_node(node.left, lo, Some(node.key))?;
        let rheight = self.check_node(node.right, Some(node.key), hi)?;
        if lheight != rheight {
            return Err(Error::DifferingBlackHeight(node.key));
        }
        Ok(lheight + (node.colour.black_height() as usize))
    }

    pub fn write_dot(&self, w: &mut impl std::io::Write) -> std::io::Result<()> {
        writeln!(w, "digraph G {{")?;
        if self.root != NIL {
            self.write_dot_node(self.root, w)?;
        }
        writeln!(w, "}}")?;
        Ok(())
    }

    fn write_dot_node(&self, id: NodeId, w: &mut impl std::io::Write) -> std::io::Result<()> {
        let node = &self.nodes[id as usize];
        writeln!(w, "\tn{}[shape=circle,color={},label=\"{}\"];", id, node.colour, node.key)?;
        for child in [node.left, node.right] {
            if child != NIL {
                self.write_dot_node(child, w)?;
                writeln!(w, "\tn{} -> n{};", id, child)?;
            }
        }
        Ok(())
    }

    fn alloc(&mut self, key: i32) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id as usize] = Node::new(key);
                id
            }
            None => {
                let id = self.nodes.len() as NodeId;
                self.nodes.push(Node::new(key));
                id
            }
        }
    }

    fn colour(&self, id: NodeId) -> Colour {
        if id == NIL {
            Colour::Black
        } else {
            self.nodes[id as usize].colour
        }
    }

    fn parent(&self, id: NodeId) -> NodeId {
        self.nodes[id as usize].parent
    }

    fn minimum(&self, mut id: NodeId) -> NodeId {
        while self.nodes[id as usize].left != NIL {
            id = self.nodes[id as usize].left;
        }
        id
    }

    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.colour(self.parent(z)) == Colour::Red {
            let p = self.parent(z);
            let g = self.parent(p);
            debug_assert!(g != NIL, "red node without a grandparent");

            if p == self.nodes[g as usize].left {
                let u = self.nodes[g as usize].right;
                if self.colour(u) == Colour::Red {
                    // red uncle: recolour and push the violation up two levels
                    self.nodes[p as usize].colour = Colour::Black;
                    self.nodes[u as usize].colour = Colour::Black;
                    self.nodes[g as usize].colour = Colour::Red;
                    z = g;
                } else {
                    if z == self.nodes[p as usize].right {
                        // inner grandchild: rotate into the outer shape first
                        z = p;
                        self.rotate_left(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p as usize].colour = Colour::Black;
                    self.nodes[g as usize].colour = Colour::Red;
                    self.rotate_right(g);
                }
            } else {
                let u = self.nodes[g as usize].left;
                if self.colour(u) == Colour::Red {
                    self.nodes[p as usize].colour = Colour::Black;
                    self.nodes[u as usize].colour = Colour::Black;
                    self.nodes[g as usize].colour = Colour::Red;
                    z = g;
                } else {
                    if z == self.nodes[p as usize].left {
                        z = p;
                        self.rotate_right(z);
                    }
                    let p = self.parent(z);
                    let g = self.parent(p);
                    self.nodes[p as usize].colour = Colour::Black;
                    self.nodes[g as usize].colour = Colour::Red;
                    self.rotate_left(g);
                }
            }
        }
        self.nodes[self.root as usize].colour = Colour::Black;
    }

    fn remove(&mut self, z: NodeId) {
        let zleft = self.nodes[z as usize].left;
        let zright = self.nodes[z as usize].right;
        let mut removed_colour = self.nodes[z as usize].colour;

        // x is the node taking over the vacated structural position; it may
        // be NIL, so its parent is carried alongside.
        let x;
        let xparent;
        if zleft == NIL {
            x = zright;
            xparent = self.parent(z);
            self.transplant(z, zright);
        } else if zright == NIL {
            x = zleft;
            xparent = self.parent(z);
            self.transplant(z, zleft);
        } else {
            let y = self.minimum(zright);
            removed_colour = self.nodes[y as usize].colour;
            x = self.nodes[y as usize].right;
            if self.parent(y) == z {
                xparent = y;
            } else {
                xparent = self.parent(y);
                self.transplant(y, x);
                self.nodes[y as usize].right = zright;
                self.nodes[zright as usize].parent = y;
            }
            self.transplant(z, y);
            self.nodes[y as usize].left = zleft;
            self.nodes[zleft as usize].parent = y;
            self.nodes[y as usize].colour = self.nodes[z as usize].colour;
        }

        self.free.push(z);
        self.len -= 1;
        if removed_colour == Colour::Black {
            // a black node left some path; repair the black-height deficit
            self.delete_fixup(x, xparent);
        }
    }

    /// Replaces the subtree rooted at `u` with the one rooted at `v` in
    /// `u`'s parent (or the tree root).
    fn transplant(&mut self, u: NodeId, v: NodeId) {
        let p = self.parent(u);
        if p == NIL {
            self.root = v;
        } else if self.nodes[p as usize].left == u {
            self.nodes[p as usize].left = v;
        } else {
            self.nodes[p as usize].right = v;
        }
        if v != NIL {
            self.nodes[v as usize].parent = p;
        }
    }

    fn delete_fixup(&mut self, mut x: NodeId, mut p: NodeId) {
        while x != self.root && self.colour(x) == Colour::Black {
            if x == self.nodes[p as usize].left {
                let mut w = self.nodes[p as usize].right;
                debug_assert!(w != NIL, "double-black node without a sibling");
                if self.colour(w) == Colour::Red {
                    self.nodes[w as usize].colour = Colour::Black;
                    self.nodes[p as usize].colour = Colour::Red;
                    self.rotate_left(p);
                    w = self.nodes[p as usize].right;
                }
                let wleft = self.nodes[w as usize].left;
                let wright = self.nodes[w as usize].right;
                if self.colour(wleft) == Colour::Black && self.colour(wright) == Colour::Black {
                    // both nephews black: move the defect up
                    self.nodes[w as usize].colour = Colour::Red;
                    x = p;
                    p = self.parent(x);
                } else {
                    if self.colour(wright) == Colour::Black {
                        self.nodes[wleft as usize].colour = Colour::Black;
                        self.nodes[w as usize].colour = Colour::Red;
                        self.rotate_right(w);
                        w = self.nodes[p as usize].right;
                    }
                    self.nodes[w as usize].colour = self.nodes[p as usize].colour;
                    self.nodes[p as usize].colour = Colour::Black;
                    let wright = self.nodes[w as usize].right;
                    self.nodes[wright as usize].colour = Colour::Black;
                    self.rotate_left(p);
                    x = self.root;
                }
            } else {
                let mut w = self.nodes[p as usize].left;
                debug_assert!(w != NIL, "double-black node without a sibling");
                if self.colour(w) == Colour::Red {
                    self.nodes[w as usize].colour = Colour::Black;
                    self.nodes[p as usize].colour = Colour::Red;
                    self.rotate_right(p);
                    w = self.nodes[p as usize].left;
                }
                let wleft = self.nodes[w as usize].left;
                let wright = self.nodes[w as usize].right;
                if self.colour(wleft) == Colour::Black && self.colour(wright) == Colour::Black {
                    self.nodes[w as usize].colour = Colour::Red;
                    x = p;
                    p = self.parent(x);
                } else {
                    if self.colour(wleft) == Colour::Black {
                        self.nodes[wright as usize].colour = Colour::Black;
                        self.nodes[w as usize].colour = Colour::Red;
                        self.rotate_left(w);
                        w = self.nodes[p as usize].left;
                    }
                    self.nodes[w as usize].colour = self.nodes[p as usize].colour;
                    self.nodes[p as usize].colour = Colour::Black;
                    let wleft = self.nodes[w as usize].left;
                    self.nodes[wleft as usize].colour = Colour::Black;
                    self.rotate_right(p);
                    x = self.root;
                }
            }
        }
        if x != NIL {
            self.nodes[x as usize].colour = Colour::Black;
        }
    }

    fn rotate_left(&mut self, x: NodeId) {
        let y = self.nodes[x as usize].right;
        debug_assert!(y != NIL, "rotate_left with no right child");
        let yleft = self.nodes[y as usize].left;

        self.nodes[x as usize].right = yleft;
        if yleft != NIL {
            self.nodes[yleft as usize].parent = x;
        }

        let p = self.nodes[x as usize].parent;
        self.nodes[y as usize].parent = p;
        if p == NIL {
            self.root = y;
        } else if self.nodes[p as usize].left == x {
            self.nodes[p as usize].left = y;
        } else {
            self.nodes[p as usize].right = y;
        }

        self.nodes[y as usize].left = x;
        self.nodes[x as usize].parent = y;
    }

    fn rotate_right(&mut self, x: NodeId) {
        let y = self.nodes[x as usize].left;
        debug_assert!(y != NIL, "rotate_right with no left child");
        let yright = self.nodes[y as usize].right;

        self.nodes[x as usize].left = yright;
        if yright != NIL {
            self.nodes[yright as usize].parent = x;
        }

        let p = self.nodes[x as usize].parent;
        self.nodes[y as usize].parent = p;
        if p == NIL {
            self.root = y;
        } else if self.nodes[p as usize].right == x {
            self.nodes[p as usize].right = y;
        } else {
            self.nodes[p as usize].left = y;
        }

        self.nodes[y as usize].right = x;
        self.nodes[x as usize].parent = y;
    }
}

/// A borrowing view of one node, for collaborators that read finished
/// structure.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> i32 {
        self.tree.nodes[self.id as usize].key
    }

    pub fn colour(&self) -> Colour {
        self.tree.nodes[self.id as usize].colour
    }

    pub fn left(&self) -> Option<NodeRef<'a>> {
        let id = self.tree.nodes[self.id as usize].left;
        if id == NIL {
            None
        } else {
            Some(NodeRef { tree: self.tree, id })
        }
    }

    pub fn right(&self) -> Option<NodeRef<'a>> {
        let id = self.tree.nodes[self.id as usize].right;
        if id == NIL {
            None
        } else {
            Some(NodeRef { tree: self.tree, id })
        }
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        let id = self.tree.nodes[self.id as usize].parent;
        if id == NIL {
            None
        } else {
            Some(NodeRef { tree: self.tree, id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::*;

    #[test]
    fn insert_rebalances_to_middle_root() {
        // ascending insert forces a left rotation at the root; the rotated
        // pivot turns black and the demoted root stays red
        let tree = set![10, 20, 30];
        assert_eq!(tree.check(), Ok(1));

        let root = tree.root().expect("non-empty tree");
        assert_eq!(root.key(), 20);
        assert_eq!(root.colour(), Colour::Black);
        assert_eq!(root.left().map(|n| (n.key(), n.colour())), Some((10, Colour::Red)));
        assert_eq!(root.right().map(|n| (n.key(), n.colour())), Some((30, Colour::Red)));
    }

    #[test]
    fn insert_rebalances_to_middle_root_mirror() {
        let tree = set![30, 20, 10];
        assert_eq!(tree.check(), Ok(1));

        let root = tree.root().expect("non-empty tree");
        assert_eq!(root.key(), 20);
        assert_eq!(root.colour(), Colour::Black);
        assert_eq!(root.left().map(|n| (n.key(), n.colour())), Some((10, Colour::Red)));
        assert_eq!(root.right().map(|n| (n.key(), n.colour())), Some((30, Colour::Red)));
    }

    #[test]
    fn delete_root_with_two_children_uses_successor() {
        let mut tree = set![4, 2, 6, 1, 3, 5, 7];
        assert_eq!(tree.delete(4), Delete::Deleted);
        assert!(tree.is_balanced());

        // 4 is replaced by 5, the minimum of its right subtree
        assert_eq!(tree.root().map(|n| (n.key(), n.colour())), Some((5, Colour::Black)));
        assert_eq!(keys!(tree), vec![1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn delete_from_six_key_tree() {
        let _ = std::fs::remove_dir_all("target/tests/");
        std::fs::create_dir_all("target/tests/").expect("create directory");

        let mut tree = set![10, 20, 30, 40, 50, 25];
        assert!(tree.is_balanced());

        let mut file = std::fs::File::create("target/tests/before_delete.dot").expect("create file");
        tree.write_dot(&mut file).expect("write dot file");

        assert_eq!(tree.delete(30), Delete::Deleted);
        assert!(tree.is_balanced());
        assert_eq!(keys!(tree), vec![10, 20, 25, 40, 50]);

        let mut file = std::fs::File::create("target/tests/after_delete.dot").expect("create file");
        tree.write_dot(&mut file).expect("write dot file");
    }

    #[test]
    fn drain_two_node_tree() {
        let mut tree = set![10, 20];
        let root = tree.root().expect("non-empty tree");
        assert_eq!(root.colour(), Colour::Black);
        assert_eq!(root.right().map(|n| n.colour()), Some(Colour::Red));

        // red leaf first: no fixup needed
        assert_eq!(tree.delete(20), Delete::Deleted);
        assert!(tree.is_balanced());
        assert_eq!(tree.len(), 1);

        // then the black root
        assert_eq!(tree.delete(10), Delete::Deleted);
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.delete(10), Delete::NotFound);
    }

    #[test]
    fn duplicate_insert_is_a_noop() {
        let mut tree = set![5, 3, 8, 1];
        let before: Vec<_> = tree.traverse(Order::Pre).collect();

        assert_eq!(tree.insert(3), Insert::Duplicate);
        assert_eq!(tree.len(), 4);
        let after: Vec<_> = tree.traverse(Order::Pre).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn search_round_trip() {
        let mut tree = Tree::new();
        assert_eq!(tree.insert(7), Insert::Inserted);
        assert!(tree.contains(7));
        assert_eq!(tree.search(7).map(|id| tree.get(id).key()), Some(7));

        assert_eq!(tree.delete(7), Delete::Deleted);
        assert!(!tree.contains(7));
        assert_eq!(tree.search(7), None);
    }

    #[test]
    fn size_law() {
        let mut tree = Tree::new();
        for key in [8, 3, 10, 1, 6, 14, 4, 7, 13] {
            tree.insert(key);
        }
        assert_eq!(tree.len(), 9);

        tree.delete(6);
        assert_eq!(tree.len(), 8);
        tree.delete(6);
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn clear_empties_the_tree() {
        let mut tree = set![4, 2, 6];
        tree.clear();
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.check(), Ok(0));

        // reusable as an empty set
        assert_eq!(tree.insert(1), Insert::Inserted);
        assert_eq!(keys!(tree), vec![1]);
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut tree = set![1, 2, 3, 4];
        tree.delete(2);
        tree.delete(4);
        tree.insert(5);
        tree.insert(6);
        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(keys!(tree), vec![1, 3, 5, 6]);
        assert!(tree.is_balanced());
    }

    #[test]
    fn randomized_soak() {
        use rand::rngs::SmallRng;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;

        let mut rng = SmallRng::seed_from_u64(42);
        let mut keys: Vec<i32> = (0..512).collect();

        let mut tree = Tree::new();
        keys.shuffle(&mut rng);
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(tree.insert(key), Insert::Inserted);
            assert_eq!(tree.len(), i + 1);
            assert!(tree.is_balanced(), "unbalanced after inserting {}", key);
        }
        let in_order: Vec<_> = keys!(tree);
        assert_eq!(in_order, (0..512).collect::<Vec<_>>());

        keys.shuffle(&mut rng);
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(tree.delete(key), Delete::Deleted);
            assert_eq!(tree.len(), 511 - i);
            assert!(tree.is_balanced(), "unbalanced after deleting {}", key);
        }
        assert!(tree.is_empty());
    }
}
