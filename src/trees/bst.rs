//! Binary search tree over integers, exposed to JavaScript as `Bst`.

use std::cmp::Ordering;
use wasm_bindgen::prelude::*;

use super::node::{IdCounter, TraversalOrder, Tree, TreeNode};
use crate::graph::to_js;

#[wasm_bindgen]
#[derive(Debug, Clone, Default)]
pub struct Bst {
    tree: Tree<i32>,
    ids: IdCounter,
}

#[wasm_bindgen]
impl Bst {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Bst {
        Bst::default()
    }

    /// Insert a value. Returns false if it is already present.
    pub fn insert(&mut self, value: i32) -> bool {
        let mut slot = &mut self.tree.root;
        loop {
            match slot {
                None => {
                    *slot = Some(Box::new(TreeNode::leaf(self.ids.next_id(&value), value)));
                    return true;
                }
                Some(node) => {
                    slot = match value.cmp(&node.value) {
                        Ordering::Equal => return false,
                        Ordering::Less => &mut node.left,
                        Ordering::Greater => &mut node.right,
                    };
                }
            }
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        let mut cursor = self.tree.root.as_deref();
        while let Some(node) = cursor {
            cursor = match value.cmp(&node.value) {
                Ordering::Equal => return true,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        false
    }

    /// Remove every node. Display ids keep counting up.
    pub fn clear(&mut self) {
        self.tree = Tree::default();
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    pub fn size(&self) -> usize {
        self.tree.len()
    }

    /// Values in `"in-order"`, `"pre-order"` or `"post-order"`.
    pub fn traverse(&self, order: &str) -> Result<Vec<i32>, JsError> {
        let order: TraversalOrder = order.parse().map_err(|e: String| JsError::new(&e))?;
        Ok(self.tree.values(order))
    }

    /// Display ids of the nodes in the given order, for step-by-step highlighting.
    #[wasm_bindgen(js_name = traverseIds)]
    pub fn traverse_ids(&self, order: &str) -> Result<Vec<String>, JsError> {
        let order: TraversalOrder = order.parse().map_err(|e: String| JsError::new(&e))?;
        Ok(self
            .tree
            .traverse(order)
            .into_iter()
            .map(|n| n.id.clone())
            .collect())
    }

    /// `{ nodes, edges }` for drawing.
    #[wasm_bindgen(js_name = toElements)]
    pub fn to_elements(&self) -> Result<JsValue, JsError> {
        to_js(&self.tree.to_elements())
    }
}

impl Bst {
    pub fn tree(&self) -> &Tree<i32> {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bst(values: &[i32]) -> Bst {
        let mut t = Bst::new();
        for &v in values {
            t.insert(v);
        }
        t
    }

    #[test]
    fn test_insert_orders_values() {
        let t = bst(&[5, 3, 8, 1, 4, 9]);
        assert_eq!(t.tree().values(TraversalOrder::InOrder), vec![1, 3, 4, 5, 8, 9]);
        assert_eq!(t.tree().values(TraversalOrder::PreOrder), vec![5, 3, 1, 4, 8, 9]);
        assert_eq!(t.height(), 3);
        assert_eq!(t.size(), 6);
    }

    #[test]
    fn test_duplicates_ignored() {
        let mut t = bst(&[2, 1]);
        assert!(!t.insert(2));
        assert_eq!(t.size(), 2);
        assert!(t.contains(1));
        assert!(!t.contains(7));
    }

    #[test]
    fn test_clear() {
        let mut t = bst(&[2, 1, 3]);
        t.clear();
        assert_eq!(t.height(), 0);
        assert!(t.tree().is_empty());
        t.insert(4);
        // ids are not reused after clearing
        assert_eq!(t.tree().root.as_ref().unwrap().id, "node-4-3");
    }

    #[test]
    fn test_traverse_by_name() {
        let t = bst(&[2, 1, 3]);
        assert_eq!(t.traverse("post-order").ok(), Some(vec![1, 3, 2]));
        assert_eq!(
            t.traverse_ids("in-order").ok(),
            Some(vec!["node-1-1".to_string(), "node-2-0".to_string(), "node-3-2".to_string()])
        );
    }

    #[test]
    fn test_degenerate_height() {
        let t = bst(&[1, 2, 3, 4]);
        assert_eq!(t.height(), 4);
        assert_eq!(t.tree().to_elements().edges.len(), 3);
    }

    #[test]
    fn test_sorted_inserts_build_deep_chain() {
        let values: Vec<i32> = (0..5_000).collect();
        let mut t = bst(&values);
        assert_eq!(t.height(), 5_000);
        assert!(t.contains(4_999));
        assert!(!t.insert(2_500));
        assert_eq!(t.traverse("in-order").ok(), Some(values));
        t.clear();
        assert_eq!(t.size(), 0);
    }
}
