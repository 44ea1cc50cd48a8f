//! Rebuilding a binary tree from two of its depth-first traversals.
//!
//! - in-order + pre-order: roots come from the front of the pre-order
//! - in-order + post-order: roots come from the back of the post-order, right
//!   subtree first
//! - pre-order + post-order: only determines full binary trees; a node with a
//!   single child gets it on the left
//!
//! Values must be unique. Every discovered root is recorded as a `find_root`
//! step.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use super::node::{IdCounter, TraversalOrder, Tree, TreeElements, TreeNode};
use crate::error::{SolverError, SolverResult};
use crate::report::{Report, Summary, Trace};

/// Values a reconstructable tree may hold.
pub trait TreeValue: Clone + Eq + Hash + Display {}

impl<T: Clone + Eq + Hash + Display> TreeValue for T {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStep<T> {
    pub action: &'static str,
    pub root_value: T,
    pub node_id: String,
    pub description: String,
}

impl<T> TreeStep<T> {
    fn find_root(node: &TreeNode<T>, description: String) -> Self
    where
        T: Clone,
    {
        Self {
            action: "find_root",
            root_value: node.value.clone(),
            node_id: node.id.clone(),
            description,
        }
    }
}

/// Which two traversals are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalPair {
    InPre,
    PrePost,
    InPost,
}

impl TraversalPair {
    fn names(self) -> (&'static str, &'static str) {
        match self {
            TraversalPair::InPre => ("in-order", "pre-order"),
            TraversalPair::PrePost => ("pre-order", "post-order"),
            TraversalPair::InPost => ("in-order", "post-order"),
        }
    }
}

/// Position of every value; rejects duplicates.
fn positions<T: TreeValue>(seq: &[T], name: &str) -> SolverResult<HashMap<T, usize>> {
    let mut pos = HashMap::with_capacity(seq.len());
    for (i, v) in seq.iter().enumerate() {
        if pos.insert(v.clone(), i).is_some() {
            return Err(SolverError::invalid_traversal(format!(
                "{name} contains {v} more than once"
            )));
        }
    }
    Ok(pos)
}

/// Same length, no duplicates, same set of values. Returns the position maps.
fn check_pair<T: TreeValue>(
    pair: TraversalPair,
    first: &[T],
    second: &[T],
) -> SolverResult<(HashMap<T, usize>, HashMap<T, usize>)> {
    let (first_name, second_name) = pair.names();
    if first.len() != second.len() {
        return Err(SolverError::invalid_traversal(format!(
            "{first_name} has {} values but {second_name} has {}",
            first.len(),
            second.len()
        )));
    }
    let first_pos = positions(first, first_name)?;
    let second_pos = positions(second, second_name)?;
    if let Some(v) = second.iter().find(|v| !first_pos.contains_key(*v)) {
        return Err(SolverError::invalid_traversal(format!(
            "{v} appears in {second_name} but not in {first_name}"
        )));
    }
    Ok((first_pos, second_pos))
}

/// Rebuild from in-order and pre-order.
pub fn from_in_pre<T: TreeValue>(
    inorder: &[T],
    preorder: &[T],
    trace: &mut Trace<TreeStep<T>>,
) -> SolverResult<Tree<T>> {
    let (in_pos, _) = check_pair(TraversalPair::InPre, inorder, preorder)?;
    let mut builder = InOrderSplit {
        in_pos,
        roots: preorder,
        from_back: false,
        taken: 0,
        ids: IdCounter::new(),
        trace,
    };
    builder.build(inorder.len())
}

/// Rebuild from in-order and post-order.
pub fn from_in_post<T: TreeValue>(
    inorder: &[T],
    postorder: &[T],
    trace: &mut Trace<TreeStep<T>>,
) -> SolverResult<Tree<T>> {
    let (in_pos, _) = check_pair(TraversalPair::InPost, inorder, postorder)?;
    let mut builder = InOrderSplit {
        in_pos,
        roots: postorder,
        from_back: true,
        taken: 0,
        ids: IdCounter::new(),
        trace,
    };
    builder.build(inorder.len())
}

/// Rebuild a full binary tree from pre-order and post-order.
pub fn from_pre_post<T: TreeValue>(
    preorder: &[T],
    postorder: &[T],
    trace: &mut Trace<TreeStep<T>>,
) -> SolverResult<Tree<T>> {
    let (_, post_pos) = check_pair(TraversalPair::PrePost, preorder, postorder)?;
    let mut builder = PrePostSplit {
        preorder,
        postorder,
        post_pos,
        taken: 0,
        ids: IdCounter::new(),
        trace,
    };
    builder.build(postorder.len())
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A segment still waiting for its root, and where that root hangs.
type Task = (usize, usize, Option<(usize, Side)>);

/// Nodes in discovery order plus child links. A child is always discovered
/// after its parent, which lets `into_tree` link boxes from the back.
struct Arena<T> {
    nodes: Vec<Option<Box<TreeNode<T>>>>,
    links: Vec<[Option<usize>; 2]>,
}

impl<T> Arena<T> {
    fn with_capacity(n: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(n),
            links: Vec::with_capacity(n),
        }
    }

    fn add(&mut self, node: TreeNode<T>, parent: Option<(usize, Side)>) {
        let idx = self.nodes.len();
        self.nodes.push(Some(Box::new(node)));
        self.links.push([None, None]);
        if let Some((p, side)) = parent {
            self.links[p][side as usize] = Some(idx);
        }
    }

    fn into_tree(mut self) -> Tree<T> {
        for i in (0..self.nodes.len()).rev() {
            let [left, right] = self.links[i];
            let left = left.and_then(|c| self.nodes[c].take());
            let right = right.and_then(|c| self.nodes[c].take());
            if let Some(node) = self.nodes[i].as_mut() {
                node.left = left;
                node.right = right;
            }
        }
        Tree::new(self.nodes.first_mut().and_then(Option::take))
    }
}

/// Roots are taken from `roots` (front or back); the in-order position of
/// each root splits the current segment.
struct InOrderSplit<'a, T> {
    in_pos: HashMap<T, usize>,
    roots: &'a [T],
    from_back: bool,
    taken: usize,
    ids: IdCounter,
    trace: &'a mut Trace<TreeStep<T>>,
}

impl<T: TreeValue> InOrderSplit<'_, T> {
    /// Tree over the in-order segment `0..n`.
    fn build(&mut self, n: usize) -> SolverResult<Tree<T>> {
        let mut arena = Arena::with_capacity(n);
        let mut tasks: Vec<Task> = vec![(0, n, None)];

        while let Some((lo, hi, parent)) = tasks.pop() {
            if lo >= hi {
                continue;
            }
            let Some(value) = self.next_root() else {
                return Err(SolverError::invalid_traversal("ran out of subtree roots"));
            };
            let mid = self.in_pos[&value];
            if mid < lo || mid >= hi {
                return Err(SolverError::invalid_traversal(format!(
                    "{value} is not inside the in-order segment of its subtree"
                )));
            }

            let node = TreeNode::leaf(self.ids.next_id(&value), value);
            let source = if self.from_back {
                "last remaining value of the post-order"
            } else {
                "next value of the pre-order"
            };
            self.trace.push(TreeStep::find_root(
                &node,
                format!(
                    "Subtree root is {} ({source}); the in-order splits it into {} left and {} right nodes",
                    node.value,
                    mid - lo,
                    hi - mid - 1
                ),
            ));

            let idx = arena.nodes.len();
            arena.add(node, parent);
            let left = (lo, mid, Some((idx, Side::Left)));
            let right = (mid + 1, hi, Some((idx, Side::Right)));
            // the side pushed last is rebuilt first
            if self.from_back {
                tasks.extend([left, right]);
            } else {
                tasks.extend([right, left]);
            }
        }

        Ok(arena.into_tree())
    }

    fn next_root(&mut self) -> Option<T> {
        let len = self.roots.len();
        if self.taken >= len {
            return None;
        }
        let idx = if self.from_back {
            len - 1 - self.taken
        } else {
            self.taken
        };
        self.taken += 1;
        Some(self.roots[idx].clone())
    }
}

struct PrePostSplit<'a, T> {
    preorder: &'a [T],
    postorder: &'a [T],
    post_pos: HashMap<T, usize>,
    taken: usize,
    ids: IdCounter,
    trace: &'a mut Trace<TreeStep<T>>,
}

impl<T: TreeValue> PrePostSplit<'_, T> {
    /// Tree whose post-order is `postorder[0..n]`.
    fn build(&mut self, n: usize) -> SolverResult<Tree<T>> {
        let mut arena = Arena::with_capacity(n);
        let mut tasks: Vec<Task> = vec![(0, n, None)];

        while let Some((lo, hi, parent)) = tasks.pop() {
            if lo >= hi {
                continue;
            }
            let Some(value) = self.preorder.get(self.taken).cloned() else {
                return Err(SolverError::invalid_traversal("ran out of subtree roots"));
            };
            self.taken += 1;
            if self.postorder[hi - 1] != value {
                return Err(SolverError::invalid_traversal(format!(
                    "{value} starts a subtree in pre-order but does not end it in post-order"
                )));
            }

            let node = TreeNode::leaf(self.ids.next_id(&value), value);
            if hi - lo == 1 {
                self.trace.push(TreeStep::find_root(
                    &node,
                    format!("Subtree root is {} (next value of the pre-order); it is a leaf", node.value),
                ));
                arena.add(node, parent);
                continue;
            }

            let Some(left_root) = self.preorder.get(self.taken) else {
                return Err(SolverError::invalid_traversal("ran out of subtree roots"));
            };
            let left_end = self.post_pos[left_root];
            if left_end < lo || left_end + 1 >= hi {
                return Err(SolverError::invalid_traversal(format!(
                    "{left_root} cannot be a child of {}",
                    node.value
                )));
            }
            self.trace.push(TreeStep::find_root(
                &node,
                format!(
                    "Subtree root is {} (next value of the pre-order); its left subtree is rooted at {left_root}",
                    node.value
                ),
            ));

            let idx = arena.nodes.len();
            arena.add(node, parent);
            tasks.push((left_end + 1, hi - 1, Some((idx, Side::Right))));
            tasks.push((lo, left_end + 1, Some((idx, Side::Left))));
        }

        Ok(arena.into_tree())
    }
}

/// Rebuilt tree plus everything the UI draws from it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuiltTree<T> {
    #[serde(skip)]
    pub root: Option<Box<TreeNode<T>>>,
    /// Display id of the root; the shape travels flat in `elements`
    pub root_id: Option<String>,
    pub size: usize,
    pub height: usize,
    pub elements: TreeElements,
    pub inorder: Vec<T>,
    pub preorder: Vec<T>,
    pub postorder: Vec<T>,
}

impl<T: TreeValue> From<Tree<T>> for RebuiltTree<T> {
    fn from(tree: Tree<T>) -> Self {
        Self {
            size: tree.len(),
            height: tree.height(),
            elements: tree.to_elements(),
            inorder: tree.values(TraversalOrder::InOrder),
            preorder: tree.values(TraversalOrder::PreOrder),
            postorder: tree.values(TraversalOrder::PostOrder),
            root_id: tree.root.as_ref().map(|n| n.id.clone()),
            root: tree.root,
        }
    }
}

impl<T> Summary for RebuiltTree<T> {
    fn summary(&self) -> String {
        if self.size == 0 {
            "Empty traversals: the tree is empty".to_string()
        } else {
            format!(
                "Tree rebuilt with {} nodes (height {})",
                self.size, self.height
            )
        }
    }
}

/// Rebuild from the given pair and package the result with its trace.
pub fn rebuild<T: TreeValue>(
    pair: TraversalPair,
    first: &[T],
    second: &[T],
) -> Report<RebuiltTree<T>, TreeStep<T>> {
    let mut trace = Trace::new();
    let result = match pair {
        TraversalPair::InPre => from_in_pre(first, second, &mut trace),
        TraversalPair::PrePost => from_pre_post(first, second, &mut trace),
        TraversalPair::InPost => from_in_post(first, second, &mut trace),
    };
    if let Err(err) = &result {
        log::debug!("tree reconstruction failed after {} steps: {err}", trace.len());
    }
    Report::new(result.map(RebuiltTree::from), trace.into_steps())
}
