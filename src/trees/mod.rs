//! Binary trees: reconstruction from traversals and a binary search tree.

pub mod bst;
pub mod node;
pub mod reconstruction;

use wasm_bindgen::prelude::*;

use crate::graph::to_js;
use reconstruction::{rebuild, TraversalPair};

pub use bst::Bst;
pub use node::{TraversalOrder, Tree, TreeElements, TreeNode};
pub use reconstruction::{from_in_post, from_in_pre, from_pre_post, RebuiltTree, TreeStep};

/// Parse a JS array of integers.
fn sequence(value: JsValue, name: &str) -> Result<Vec<i32>, JsError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsError::new(&format!("{name} must be an array of integers: {e}")))
}

fn rebuild_js(
    pair: TraversalPair,
    first: JsValue,
    second: JsValue,
    names: (&str, &str),
) -> Result<JsValue, JsError> {
    let first = sequence(first, names.0)?;
    let second = sequence(second, names.1)?;
    to_js(&rebuild(pair, &first, &second))
}

/// Rebuild a tree from in-order and pre-order traversals.
#[wasm_bindgen(js_name = buildTreeFromInPre)]
pub fn build_tree_from_in_pre(inorder: JsValue, preorder: JsValue) -> Result<JsValue, JsError> {
    rebuild_js(TraversalPair::InPre, inorder, preorder, ("inorder", "preorder"))
}

/// Rebuild a full binary tree from pre-order and post-order traversals.
#[wasm_bindgen(js_name = buildTreeFromPrePost)]
pub fn build_tree_from_pre_post(preorder: JsValue, postorder: JsValue) -> Result<JsValue, JsError> {
    rebuild_js(TraversalPair::PrePost, preorder, postorder, ("preorder", "postorder"))
}

/// Rebuild a tree from in-order and post-order traversals.
#[wasm_bindgen(js_name = buildTreeFromInPost)]
pub fn build_tree_from_in_post(inorder: JsValue, postorder: JsValue) -> Result<JsValue, JsError> {
    rebuild_js(TraversalPair::InPost, inorder, postorder, ("inorder", "postorder"))
}
