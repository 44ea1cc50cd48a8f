//! Browser-side tests of the JavaScript glue. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use graph_solver_wasm::trees::{build_tree_from_in_pre, Bst};
use graph_solver_wasm::Graph;
use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn field(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn scenario() -> Graph {
    let mut g = Graph::new();
    for id in ["A", "B", "C", "D"] {
        g.add_node(id, None);
    }
    g.add_edge("ab", "A", "B", 4.0, None);
    g.add_edge("ac", "A", "C", 2.0, None);
    g.add_edge("bd", "B", "D", 1.0, None);
    g.add_edge("cd", "C", "D", 5.0, None);
    g
}

#[wasm_bindgen_test]
fn critical_path_report_is_plain_object() {
    let report = scenario().critical_path_js(JsValue::UNDEFINED).unwrap();
    assert_eq!(field(&report, "ok").as_bool(), Some(true));
    assert_eq!(field(&report, "duration").as_f64(), Some(7.0));
    assert!(field(&report, "kind").is_undefined());
}

#[wasm_bindgen_test]
fn partial_config_object_is_accepted() {
    let config = js_sys::Object::new();
    Reflect::set(&config, &JsValue::from_str("maxPaths"), &JsValue::from_f64(1.0)).unwrap();
    let report = scenario().shortest_path_dag_js(config.into()).unwrap();
    assert_eq!(field(&report, "ok").as_bool(), Some(true));
    assert_eq!(field(&report, "distance").as_f64(), Some(5.0));
}

#[wasm_bindgen_test]
fn algorithmic_failure_is_a_report() {
    let mut g = scenario();
    g.add_edge("da", "D", "A", 1.0, None);
    let report = g.critical_path_js(JsValue::NULL).unwrap();
    assert_eq!(field(&report, "ok").as_bool(), Some(false));
    assert_eq!(field(&report, "kind").as_string().as_deref(), Some("CyclicGraph"));
}

#[wasm_bindgen_test]
fn bad_mode_throws() {
    assert!(scenario().assignment_js("sideways").is_err());
    assert!(scenario().kruskal_js("min").is_ok());
}

#[wasm_bindgen_test]
fn graph_from_value() {
    let json = r#"{"nodes":[{"id":"x"},{"id":"y"}],"edges":[{"id":"xy","source":"x","target":"y","weight":2}]}"#;
    let value = js_sys::JSON::parse(json).unwrap();
    let g = Graph::from_value(value).unwrap();
    assert_eq!(g.edge_count(), 1);
}

#[wasm_bindgen_test]
fn tree_from_js_arrays() {
    let inorder = serde_wasm_bindgen::to_value(&[2, 1, 3]).unwrap();
    let preorder = serde_wasm_bindgen::to_value(&[1, 2, 3]).unwrap();
    let report = build_tree_from_in_pre(inorder, preorder).unwrap();
    assert_eq!(field(&report, "ok").as_bool(), Some(true));
    assert_eq!(field(&report, "size").as_f64(), Some(3.0));

    let steps = js_sys::Array::from(&field(&report, "steps"));
    assert_eq!(steps.length(), 3);
}

#[wasm_bindgen_test]
fn non_integer_traversal_throws() {
    let inorder = serde_wasm_bindgen::to_value(&[1.5]).unwrap();
    let preorder = serde_wasm_bindgen::to_value(&[1.5]).unwrap();
    assert!(build_tree_from_in_pre(inorder, preorder).is_err());
}

#[wasm_bindgen_test]
fn bst_elements() {
    let mut bst = Bst::new();
    for v in [5, 3, 8] {
        assert!(bst.insert(v));
    }
    let elements = bst.to_elements().unwrap();
    let edges = js_sys::Array::from(&field(&elements, "edges"));
    assert_eq!(edges.length(), 2);
}
