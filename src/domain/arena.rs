use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::expression::{Expression, Node};

/// Handle to a node in a [`PositionalTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(Index);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{slot}.{generation}")
    }
}

/// Tree node in the arena-based positional tree.
#[derive(Debug)]
pub struct TreeNode<T> {
    /// Payload stored at this position
    pub elem: T,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    pub left: Option<Index>,
    pub right: Option<Index>,
}

impl<T> TreeNode<T> {
    fn is_external(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena-based binary tree addressed by positions.
///
/// Structural edits go through generational indices, so a removed position
/// can never alias a node inserted later.
#[derive(Debug)]
pub struct PositionalTree<T> {
    arena: Arena<TreeNode<T>>,
    root: Option<Index>,
}

impl<T> Default for PositionalTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PositionalTree<T> {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub fn size(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn root(&self) -> Option<Position> {
        self.root.map(Position)
    }

    /// Create the root of an empty tree.
    pub fn add_root(&mut self, elem: T) -> DomainResult<Position> {
        if self.root.is_some() {
            return Err(DomainError::InvalidPosition("tree already has a root".into()));
        }
        let idx = self.insert(elem, None);
        self.root = Some(idx);
        Ok(Position(idx))
    }

    /// Turn the external node at `p` into an internal node with two new leaves.
    #[instrument(level = "trace", skip(self, left, right))]
    pub fn expand_external(&mut self, p: Position, left: T, right: T) -> DomainResult<()> {
        if !self.node(p)?.is_external() {
            return Err(DomainError::InvalidPosition(format!(
                "{p} is not external"
            )));
        }
        let left = self.insert(left, Some(p.0));
        let right = self.insert(right, Some(p.0));
        let node = self.node_mut(p)?;
        node.left = Some(left);
        node.right = Some(right);
        Ok(())
    }

    /// Remove the external node at `p` together with its parent; the sibling
    /// of `p` takes the parent's place. Returns the sibling's position.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_above_external(&mut self, p: Position) -> DomainResult<Position> {
        let node = self.node(p)?;
        if !node.is_external() {
            return Err(DomainError::InvalidPosition(format!(
                "{p} is not external"
            )));
        }
        let parent_idx = node
            .parent
            .ok_or_else(|| DomainError::InvalidPosition(format!("{p} is the root")))?;
        let parent = self.node(Position(parent_idx))?;
        let sibling = if parent.left == Some(p.0) {
            parent.right
        } else {
            parent.left
        };
        let sibling_idx = sibling
            .ok_or_else(|| DomainError::InvalidPosition(format!("{p} has no sibling")))?;
        let grandparent = parent.parent;

        match grandparent {
            None => self.root = Some(sibling_idx),
            Some(gp_idx) => {
                let gp = self.node_mut(Position(gp_idx))?;
                if gp.left == Some(parent_idx) {
                    gp.left = Some(sibling_idx);
                } else {
                    gp.right = Some(sibling_idx);
                }
            }
        }
        self.node_mut(Position(sibling_idx))?.parent = grandparent;
        self.arena.remove(p.0);
        self.arena.remove(parent_idx);
        Ok(Position(sibling_idx))
    }

    /// All positions in preorder (node, left subtree, right subtree).
    pub fn positions(&self) -> Vec<Position> {
        self.iter().map(|(p, _)| p).collect()
    }

    pub fn iter(&self) -> PreOrderIterator<'_, T> {
        PreOrderIterator::new(self)
    }

    pub fn element(&self, p: Position) -> DomainResult<&T> {
        Ok(&self.node(p)?.elem)
    }

    pub fn left(&self, p: Position) -> DomainResult<Option<Position>> {
        Ok(self.node(p)?.left.map(Position))
    }

    pub fn right(&self, p: Position) -> DomainResult<Option<Position>> {
        Ok(self.node(p)?.right.map(Position))
    }

    pub fn parent(&self, p: Position) -> DomainResult<Option<Position>> {
        Ok(self.node(p)?.parent.map(Position))
    }

    pub fn is_root(&self, p: Position) -> DomainResult<bool> {
        Ok(self.node(p)?.parent.is_none())
    }

    pub fn is_external(&self, p: Position) -> DomainResult<bool> {
        Ok(self.node(p)?.is_external())
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                depth = depth.max(level);
                stack.extend(
                    [node.left, node.right]
                        .into_iter()
                        .flatten()
                        .map(|child| (child, level + 1)),
                );
            }
        }
        depth
    }

    /// External positions, left to right.
    pub fn leaves(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, node)| node.is_external())
            .map(|(p, _)| p)
            .collect()
    }

    fn insert(&mut self, elem: T, parent: Option<Index>) -> Index {
        self.arena.insert(TreeNode {
            elem,
            parent,
            left: None,
            right: None,
        })
    }

    fn node(&self, p: Position) -> DomainResult<&TreeNode<T>> {
        self.arena
            .get(p.0)
            .ok_or_else(|| DomainError::InvalidPosition(format!("{p} does not exist")))
    }

    fn node_mut(&mut self, p: Position) -> DomainResult<&mut TreeNode<T>> {
        self.arena
            .get_mut(p.0)
            .ok_or_else(|| DomainError::InvalidPosition(format!("{p} does not exist")))
    }
}

impl<T: fmt::Display> PositionalTree<T> {
    /// Render the tree for terminal display.
    ///
    /// Builds and prints one nesting level per tree level; keep the depth
    /// bounded before calling this.
    pub fn to_tree_string(&self) -> termtree::Tree<String> {
        fn build<T: fmt::Display>(tree: &PositionalTree<T>, idx: Index) -> termtree::Tree<String> {
            match tree.arena.get(idx) {
                Some(node) => termtree::Tree::new(node.elem.to_string()).with_leaves(
                    [node.left, node.right]
                        .into_iter()
                        .flatten()
                        .map(|child| build(tree, child)),
                ),
                None => termtree::Tree::new(String::new()),
            }
        }

        match self.root {
            Some(root) => build(self, root),
            None => termtree::Tree::new("Empty tree".to_string()),
        }
    }
}

impl From<&Expression> for PositionalTree<String> {
    fn from(expression: &Expression) -> Self {
        let mut tree = PositionalTree::new();
        let mut pending: Vec<(&Node, Option<(Index, bool)>)> = vec![(expression.root(), None)];

        while let Some((node, link)) = pending.pop() {
            let idx = tree.insert(node.label().to_string(), link.map(|(parent, _)| parent));
            match link {
                None => tree.root = Some(idx),
                Some((parent, is_left)) => {
                    if let Some(slot) = tree.arena.get_mut(parent) {
                        if is_left {
                            slot.left = Some(idx);
                        } else {
                            slot.right = Some(idx);
                        }
                    }
                }
            }
            match node {
                Node::Operand(_) => {}
                Node::Unary { child, .. } => pending.push((child.as_ref(), Some((idx, true)))),
                Node::Binary { left, right, .. } => {
                    pending.push((right.as_ref(), Some((idx, false))));
                    pending.push((left.as_ref(), Some((idx, true))));
                }
            }
        }
        tree
    }
}

pub struct PreOrderIterator<'a, T> {
    tree: &'a PositionalTree<T>,
    stack: Vec<Index>,
}

impl<'a, T> PreOrderIterator<'a, T> {
    fn new(tree: &'a PositionalTree<T>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a, T> Iterator for PreOrderIterator<'a, T> {
    type Item = (Position, &'a TreeNode<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.arena.get(current) {
                // Right first so the left subtree is visited first
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                return Some((Position(current), node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::ExpressionBuilder;

    fn labels(tree: &PositionalTree<String>) -> Vec<String> {
        tree.iter().map(|(_, node)| node.elem.clone()).collect()
    }

    #[test]
    fn given_empty_tree_when_adding_root_then_single_external_node() {
        let mut tree = PositionalTree::new();
        assert!(tree.is_empty());
        let root = tree.add_root("r".to_string()).unwrap();

        assert_eq!(tree.size(), 1);
        assert!(tree.is_root(root).unwrap());
        assert!(tree.is_external(root).unwrap());
        assert!(tree.add_root("again".to_string()).is_err());
    }

    #[test]
    fn given_leaf_when_expanding_then_gains_two_children() {
        let mut tree = PositionalTree::new();
        let root = tree.add_root("+".to_string()).unwrap();
        tree.expand_external(root, "a".into(), "b".into()).unwrap();

        assert_eq!(tree.size(), 3);
        assert!(!tree.is_external(root).unwrap());
        let left = tree.left(root).unwrap().unwrap();
        assert_eq!(tree.element(left).unwrap(), "a");
        assert_eq!(tree.parent(left).unwrap(), Some(root));
        assert_eq!(labels(&tree), vec!["+", "a", "b"]);
        assert!(tree.expand_external(root, "x".into(), "y".into()).is_err());
    }

    #[test]
    fn given_leaf_when_removing_above_then_sibling_replaces_parent() {
        let mut tree = PositionalTree::new();
        let root = tree.add_root("*".to_string()).unwrap();
        tree.expand_external(root, "+".into(), "c".into()).unwrap();
        let plus = tree.left(root).unwrap().unwrap();
        tree.expand_external(plus, "a".into(), "b".into()).unwrap();
        let a = tree.left(plus).unwrap().unwrap();

        let promoted = tree.remove_above_external(a).unwrap();

        assert_eq!(tree.element(promoted).unwrap(), "b");
        assert_eq!(tree.parent(promoted).unwrap(), Some(root));
        assert_eq!(tree.size(), 3);
        assert_eq!(labels(&tree), vec!["*", "b", "c"]);
        assert!(tree.element(a).is_err(), "removed position must be stale");
    }

    #[test]
    fn given_child_of_root_when_removing_above_then_sibling_becomes_root() {
        let mut tree = PositionalTree::new();
        let root = tree.add_root("-".to_string()).unwrap();
        tree.expand_external(root, "a".into(), "b".into()).unwrap();
        let b = tree.right(root).unwrap().unwrap();

        let promoted = tree.remove_above_external(b).unwrap();

        assert_eq!(tree.root(), Some(promoted));
        assert!(tree.is_root(promoted).unwrap());
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn given_root_or_internal_node_when_removing_above_then_fails() {
        let mut tree = PositionalTree::new();
        let root = tree.add_root("x".to_string()).unwrap();
        assert!(tree.remove_above_external(root).is_err());
        tree.expand_external(root, "a".into(), "b".into()).unwrap();
        assert!(tree.remove_above_external(root).is_err());
    }

    #[test]
    fn given_expression_when_converting_then_preorder_labels_match() {
        let expr = ExpressionBuilder::new().build("a b + abs 2 *").unwrap();
        let tree = PositionalTree::from(&expr);

        assert_eq!(tree.size(), expr.size());
        assert_eq!(tree.depth(), expr.depth());
        assert_eq!(labels(&tree), vec!["*", "abs", "+", "a", "b", "2"]);
        assert_eq!(tree.positions().len(), 6);
        let leaves: Vec<_> = tree
            .leaves()
            .into_iter()
            .map(|p| tree.element(p).unwrap().clone())
            .collect();
        assert_eq!(leaves, vec!["a", "b", "2"]);
    }

    #[test]
    fn given_deep_expression_when_converting_then_depth_matches() {
        let line = format!("a{}", " b -".repeat(100_000));
        let expr = ExpressionBuilder::new().build(&line).unwrap();

        let tree = PositionalTree::from(&expr);

        assert_eq!(tree.size(), 200_001);
        assert_eq!(tree.depth(), 100_001);
        assert_eq!(tree.leaves().len(), 100_001);
    }

    #[test]
    fn given_tree_when_rendering_termtree_then_lists_every_node() {
        let expr = ExpressionBuilder::new().build("a b -").unwrap();
        let text = PositionalTree::from(&expr).to_tree_string().to_string();
        assert!(text.starts_with('-'));
        assert!(text.contains('a'));
        assert!(text.contains('b'));
        assert_eq!(
            PositionalTree::<String>::new().to_tree_string().to_string().trim(),
            "Empty tree"
        );
    }
}
