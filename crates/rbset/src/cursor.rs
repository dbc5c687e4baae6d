use crate::{Colour, NodeId, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Pre,
    In,
    Post,
}

/// Which side of a node the walk has finished with.
#[derive(Debug, Clone, Copy)]
enum Visited {
    Neither,
    Left,
    Right,
}

/// A finite, non-restartable walk over the tree yielding `(colour, key)`
/// pairs in the requested order. Iterative with an explicit ancestor
/// stack, so no recursion depth is assumed.
#[derive(Debug)]
pub struct Cursor<'a> {
    tree: &'a Tree,
    order: Order,
    stack: Vec<(NodeId, Visited)>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tree: &'a Tree, order: Order) -> Self {
        let mut stack = vec![];
        if let Some(root) = tree.root() {
            stack.push((root.id(), Visited::Neither));
        }
        Self { tree, order, stack }
    }
}

impl<'a> Iterator for Cursor<'a> {
    type Item = (Colour, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, visited)) = self.stack.pop() {
            let node = self.tree.get(id);
            match visited {
                Visited::Neither => {
                    self.stack.push((id, Visited::Left));
                    if let Some(left) = node.left() {
                        self.stack.push((left.id(), Visited::Neither));
                    }
                    if self.order == Order::Pre {
                        return Some((node.colour(), node.key()));
                    }
                }
                Visited::Left => {
                    self.stack.push((id, Visited::Right));
                    if let Some(right) = node.right() {
                        self.stack.push((right.id(), Visited::Neither));
                    }
                    if self.order == Order::In {
                        return Some((node.colour(), node.key()));
                    }
                }
                Visited::Right => {
                    if self.order == Order::Post {
                        return Some((node.colour(), node.key()));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::*;

    // inserting 4,2,6 then the leaves yields a full black two-level tree
    // with red leaves:
    //
    //          4
    //        /   \
    //       2     6
    //      / \   / \
    //     1   3 5   7
    fn full_tree() -> Tree {
        set![4, 2, 6, 1, 3, 5, 7]
    }

    #[test]
    fn pre_order_visits_root_first() {
        let tree = full_tree();
        let keys: Vec<_> = tree.traverse(Order::Pre).map(|(_, k)| k).collect();
        assert_eq!(keys, vec![4, 2, 1, 3, 6, 5, 7]);
    }

    #[test]
    fn in_order_is_ascending() {
        let tree = full_tree();
        let keys: Vec<_> = tree.traverse(Order::In).map(|(_, k)| k).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn post_order_visits_root_last() {
        let tree = full_tree();
        let keys: Vec<_> = tree.traverse(Order::Post).map(|(_, k)| k).collect();
        assert_eq!(keys, vec![1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn cursor_reports_colours() {
        let tree = full_tree();
        let nodes: Vec<_> = tree.traverse(Order::In).collect();
        assert_eq!(
            nodes,
            vec![
                (Colour::Red, 1),
                (Colour::Black, 2),
                (Colour::Red, 3),
                (Colour::Black, 4),
                (Colour::Red, 5),
                (Colour::Black, 6),
                (Colour::Red, 7),
            ]
        );
    }

    #[test]
    fn empty_tree_yields_nothing() {
        let tree = Tree::new();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.traverse(Order::Pre).next(), None);
        assert_eq!(tree.traverse(Order::Post).next(), None);
    }

    #[test]
    fn single_node_in_every_order() {
        let tree = set![42];
        for order in [Order::Pre, Order::In, Order::Post] {
            let nodes: Vec<_> = tree.traverse(order).collect();
            assert_eq!(nodes, vec![(Colour::Black, 42)]);
        }
    }
}
