use std::collections::BTreeMap;

use confbind::{Binder, RenderOptions};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Leaf {
    flag: bool,
    ratio: f64,
    label: String,
    count: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Branch {
    id: u64,
    leaves: Vec<Leaf>,
    scores: BTreeMap<String, i64>,
    pinned: Box<Leaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Tree {
    name: String,
    branches: Vec<Branch>,
    tags: Vec<String>,
    limits: [u8; 3],
}

fn leaf(label: &str, count: Option<i32>) -> Leaf {
    Leaf {
        flag: count.is_some(),
        ratio: 0.25,
        label: label.to_string(),
        count,
    }
}

fn sample() -> Tree {
    Tree {
        name: "forest".to_string(),
        branches: vec![
            Branch {
                id: u64::MAX,
                leaves: vec![leaf("a", Some(-3)), leaf("", None)],
                scores: BTreeMap::from([("north".to_string(), 10), ("south".to_string(), -2)]),
                pinned: Box::new(leaf("true", Some(0))),
            },
            Branch {
                id: 0,
                leaves: Vec::new(),
                scores: BTreeMap::new(),
                pinned: Box::new(leaf("multi\nline", None)),
            },
        ],
        tags: vec!["x".to_string(), "null".to_string(), "1.5".to_string()],
        limits: [1, 2, 255],
    }
}

#[test]
fn test_text_round_trip_three_levels() {
    let binder = Binder::new();
    let tree = sample();
    let text = binder.to_text("tree", &tree).unwrap();
    let back: Tree = binder.from_text(&text, "tree").unwrap();
    assert_eq!(back, tree);
}

#[test]
fn test_tree_round_trip() {
    let binder = Binder::new();
    let tree = sample();
    let value = binder.to_tree(&tree).unwrap();
    assert_eq!(value.lookup("branches.0.pinned.label").and_then(|v| v.as_str()), Some("true"));
    let back: Tree = binder.from_tree(&value).unwrap();
    assert_eq!(back, tree);
}

#[test]
fn test_json_round_trip() {
    let binder = Binder::new();
    let tree = sample();
    let text = binder
        .to_text_with("tree", &tree, &RenderOptions::json())
        .unwrap();
    assert!(text.starts_with("{\n"));
    let back: Tree = binder.from_text(&text, "tree").unwrap();
    assert_eq!(back, tree);
}

#[test]
fn test_rendering_is_idempotent() {
    let binder = Binder::new();
    let value = binder.to_config("tree", &sample()).unwrap();
    let options = RenderOptions::default();
    assert_eq!(Binder::render(&value, &options), Binder::render(&value, &options));
}

#[test]
fn test_top_level_list_round_trip() {
    let binder = Binder::new();
    let leaves = vec![leaf("one", Some(1)), leaf("two", None)];
    let text = binder.to_text("leaves", &leaves).unwrap();
    let back: Vec<Leaf> = binder.from_text(&text, "leaves").unwrap();
    assert_eq!(back, leaves);
}

fn leaf_strategy() -> impl Strategy<Value = Leaf> {
    (
        any::<bool>(),
        -1.0e6..1.0e6f64,
        "[a-z0-9 ._-]{0,10}",
        proptest::option::of(any::<i32>()),
    )
        .prop_map(|(flag, ratio, label, count)| Leaf {
            flag,
            ratio,
            label,
            count,
        })
}

fn branch_strategy() -> impl Strategy<Value = Branch> {
    (
        any::<u64>(),
        proptest::collection::vec(leaf_strategy(), 0..4),
        proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..4),
        leaf_strategy(),
    )
        .prop_map(|(id, leaves, scores, pinned)| Branch {
            id,
            leaves,
            scores,
            pinned: Box::new(pinned),
        })
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    (
        "[a-zA-Z]{1,8}",
        proptest::collection::vec(branch_strategy(), 0..3),
        proptest::collection::vec("[a-z0-9:# ]{0,6}", 0..4),
        any::<[u8; 3]>(),
    )
        .prop_map(|(name, branches, tags, limits)| Tree {
            name,
            branches,
            tags,
            limits,
        })
}

proptest! {
    #[test]
    fn prop_text_round_trip(tree in tree_strategy()) {
        let binder = Binder::new();
        let text = binder.to_text("tree", &tree).unwrap();
        let back: Tree = binder.from_text(&text, "tree").unwrap();
        prop_assert_eq!(back, tree);
    }
}
