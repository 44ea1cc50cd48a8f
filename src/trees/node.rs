//! Binary tree with exclusively owned children, its traversals and display export.

use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Depth-first visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    InOrder,
    PreOrder,
    PostOrder,
}

impl FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "in" | "inorder" => Ok(TraversalOrder::InOrder),
            "pre" | "preorder" => Ok(TraversalOrder::PreOrder),
            "post" | "postorder" => Ok(TraversalOrder::PostOrder),
            _ => Err(format!(
                "unknown traversal {s:?}, expected \"in-order\", \"pre-order\" or \"post-order\""
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    /// Display id, unique within one tree
    pub id: String,
    pub value: T,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    pub fn leaf(id: String, value: T) -> Self {
        Self {
            id,
            value,
            left: None,
            right: None,
        }
    }
}

/// Children are released from an explicit stack so dropping a degenerate
/// chain does not recurse once per level.
impl<T> Drop for TreeNode<T> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<TreeNode<T>>> = Vec::new();
        stack.extend(self.left.take());
        stack.extend(self.right.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

/// Hands out `node-{value}-{n}` display ids.
#[derive(Debug, Clone, Default)]
pub struct IdCounter {
    next: usize,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id<T: Display>(&mut self, value: &T) -> String {
        let id = format!("node-{}-{}", value, self.next);
        self.next += 1;
        id
    }
}

/// Element as consumed by the canvas: `{ data: { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element<D> {
    pub data: D,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Nodes and parent-child edges of a tree, ready for drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeElements {
    pub nodes: Vec<Element<NodeData>>,
    pub edges: Vec<Element<EdgeData>>,
}

/// Optional root plus whole-tree queries.
///
/// Every walk uses an explicit stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree<T> {
    pub root: Option<Box<TreeNode<T>>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<T> Tree<T> {
    pub fn new(root: Option<Box<TreeNode<T>>>) -> Self {
        Self { root }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn len(&self) -> usize {
        self.traverse(TraversalOrder::PreOrder).len()
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&TreeNode<T>, usize)> = Vec::new();
        if let Some(root) = &self.root {
            stack.push((&**root, 1));
        }
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            for child in [&node.left, &node.right].into_iter().flatten() {
                stack.push((&**child, depth + 1));
            }
        }
        height
    }

    pub fn traverse(&self, order: TraversalOrder) -> Vec<&TreeNode<T>> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreeNode<T>> = Vec::new();

        match order {
            TraversalOrder::PreOrder => {
                stack.extend(self.root.as_deref());
                while let Some(node) = stack.pop() {
                    out.push(node);
                    stack.extend(node.right.as_deref());
                    stack.extend(node.left.as_deref());
                }
            }
            TraversalOrder::InOrder => {
                let mut cursor = self.root.as_deref();
                loop {
                    while let Some(node) = cursor {
                        stack.push(node);
                        cursor = node.left.as_deref();
                    }
                    let Some(node) = stack.pop() else { break };
                    out.push(node);
                    cursor = node.right.as_deref();
                }
            }
            TraversalOrder::PostOrder => {
                // root, right, left reversed
                stack.extend(self.root.as_deref());
                while let Some(node) = stack.pop() {
                    out.push(node);
                    stack.extend(node.left.as_deref());
                    stack.extend(node.right.as_deref());
                }
                out.reverse();
            }
        }
        out
    }
}

impl<T: Clone> Tree<T> {
    pub fn values(&self, order: TraversalOrder) -> Vec<T> {
        self.traverse(order)
            .into_iter()
            .map(|n| n.value.clone())
            .collect()
    }
}

impl<T: Display> Tree<T> {
    /// Pre-order export of nodes and parent-child edges.
    pub fn to_elements(&self) -> TreeElements {
        let mut elements = TreeElements::default();
        let mut stack: Vec<(&TreeNode<T>, Option<&str>)> = Vec::new();
        if let Some(root) = &self.root {
            stack.push((&**root, None));
        }

        while let Some((node, parent)) = stack.pop() {
            elements.nodes.push(Element {
                data: NodeData {
                    id: node.id.clone(),
                    label: node.value.to_string(),
                },
            });
            if let Some(parent) = parent {
                elements.edges.push(Element {
                    data: EdgeData {
                        id: format!("edge-{}-{}", parent, node.id),
                        source: parent.to_string(),
                        target: node.id.clone(),
                    },
                });
            }
            // right pushed first so the left subtree is emitted first
            if let Some(right) = &node.right {
                stack.push((&**right, Some(node.id.as_str())));
            }
            if let Some(left) = &node.left {
                stack.push((&**left, Some(node.id.as_str())));
            }
        }

        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree<i32> {
        //     1
        //    / \
        //   2   3
        //  /
        // 4
        let mut ids = IdCounter::new();
        let mut two = TreeNode::leaf(ids.next_id(&2), 2);
        two.left = Some(Box::new(TreeNode::leaf(ids.next_id(&4), 4)));
        let mut one = TreeNode::leaf(ids.next_id(&1), 1);
        one.left = Some(Box::new(two));
        one.right = Some(Box::new(TreeNode::leaf(ids.next_id(&3), 3)));
        Tree::new(Some(Box::new(one)))
    }

    #[test]
    fn test_traversals() {
        let t = sample();
        assert_eq!(t.values(TraversalOrder::InOrder), vec![4, 2, 1, 3]);
        assert_eq!(t.values(TraversalOrder::PreOrder), vec![1, 2, 4, 3]);
        assert_eq!(t.values(TraversalOrder::PostOrder), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_size_and_height() {
        let t = sample();
        assert_eq!(t.len(), 4);
        assert_eq!(t.height(), 3);
        assert_eq!(Tree::<i32>::default().height(), 0);
    }

    #[test]
    fn test_elements() {
        let el = sample().to_elements();
        let labels: Vec<&str> = el.nodes.iter().map(|n| n.data.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "4", "3"]);
        assert_eq!(el.edges.len(), 3);
        assert_eq!(el.edges[0].data.id, "edge-node-1-2-node-2-0");
    }

    #[test]
    fn test_deep_chain() {
        let n = 50_000;
        let mut ids = IdCounter::new();
        let mut root: Option<Box<TreeNode<i32>>> = None;
        for v in (0..n).rev() {
            let mut node = TreeNode::leaf(ids.next_id(&v), v);
            node.right = root.take();
            root = Some(Box::new(node));
        }
        let t = Tree::new(root);
        assert_eq!(t.len(), n as usize);
        assert_eq!(t.height(), n as usize);
        assert_eq!(t.values(TraversalOrder::InOrder), (0..n).collect::<Vec<_>>());
        assert_eq!(t.values(TraversalOrder::PostOrder)[0], n - 1);
        assert_eq!(t.to_elements().edges.len(), n as usize - 1);
    }

    #[test]
    fn test_id_counter() {
        let mut ids = IdCounter::new();
        assert_eq!(ids.next_id(&7), "node-7-0");
        assert_eq!(ids.next_id(&7), "node-7-1");
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("in-order".parse::<TraversalOrder>(), Ok(TraversalOrder::InOrder));
        assert_eq!("PreOrder".parse::<TraversalOrder>(), Ok(TraversalOrder::PreOrder));
        assert_eq!("post_order".parse::<TraversalOrder>(), Ok(TraversalOrder::PostOrder));
        assert!("level".parse::<TraversalOrder>().is_err());
    }
}
