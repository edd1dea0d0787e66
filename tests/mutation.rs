//! Mutation engine behavior through the public API

use linden::{LazySlice, TreeBuf, TreeError};
use test_case::test_case;

fn buf(structure: &[usize], values: &[&'static str]) -> TreeBuf<&'static str> {
    // RUST_LOG=linden=debug surfaces the mutation trace on failures
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    TreeBuf::from_parts(structure.to_vec(), values.to_vec()).unwrap()
}

fn frozen(
    structure: &[usize],
    values: &[&'static str],
) -> (LazySlice<usize>, LazySlice<&'static str>) {
    let tree = buf(structure, values).freeze();
    (tree.structure().clone(), tree.values().clone())
}

#[test_case(&[0], &["r"] => Ok(-1); "leaf root empties the tree")]
#[test_case(&[0, 1], &["a", "r"] => Ok(-1); "an only child is promoted")]
#[test_case(&[0, 0, 2], &["a", "b", "r"] => Err(TreeError::AmbiguousRootRemoval { children: 2 }); "two children leave no unambiguous root")]
fn root_removal(structure: &[usize], values: &[&'static str]) -> Result<isize, TreeError> {
    let mut buf = buf(structure, values);
    let root = buf.root_index().unwrap();
    buf.remove_value(root)
}

#[test]
fn removing_an_inner_node_hands_children_to_the_parent() {
    // P -> A -> (x, y)
    let mut buf = buf(&[0, 0, 2, 1], &["x", "y", "A", "P"]);
    assert_eq!(buf.remove_value(2), Ok(-1));
    assert_eq!(buf.structure().as_slice(), &[0, 0, 2]);
    let tree = buf.freeze();
    assert_eq!(tree.root_value(), Some("P"));
    assert_eq!(tree.children_of(2), Ok(vec![0, 1]));
}

#[test_case(false, 1; "plain insertion duplicates the child")]
#[test_case(true, 0; "distinct insertion of an existing child is a no-op")]
fn repeated_leaf_insertion(distinct: bool, expected_delta: isize) {
    let mut buf = buf(&[0, 1], &["a", "r"]);
    let root = buf.root_index().unwrap();
    assert_eq!(buf.insert_value(root, "a", distinct), Ok(expected_delta));
    assert_eq!(buf.len() as isize, 2 + expected_delta);
}

#[test]
fn distinct_branch_insertion_reuses_the_shared_prefix() {
    // root -> a -> b; inserting the branch a/b/c only adds c
    let mut buf = buf(&[0, 1, 1], &["b", "a", "root"]);
    let root = buf.root_index().unwrap();
    assert_eq!(buf.insert_branch(root, ["a", "b", "c"], true), Ok(1));
    let tree = buf.freeze();
    assert_eq!(tree.contains_branch(["a", "b", "c"], |v| *v), Ok(true));
    assert_eq!(tree.len(), 4);
}

#[test]
fn plain_branch_insertion_grafts_the_whole_chain() {
    let mut buf = buf(&[0, 1, 1], &["b", "a", "root"]);
    let root = buf.root_index().unwrap();
    assert_eq!(buf.insert_branch(root, ["a", "b", "c"], false), Ok(3));
    let tree = buf.freeze();
    assert_eq!(tree.len(), 6);
    // both "a" children exist: the old chain and the fresh one
    assert_eq!(tree.children_of(tree.root_index().unwrap()).unwrap().len(), 2);
}

#[test]
fn fully_matched_distinct_branch_changes_nothing() {
    let mut buf = buf(&[0, 1, 1], &["b", "a", "root"]);
    assert_eq!(buf.insert_branch(2, ["a", "b"], true), Ok(0));
    assert_eq!(buf.structure().as_slice(), &[0, 1, 1]);
}

#[test]
fn make_children_distinct_terminates_on_many_duplicates() {
    // root with leaf children [A, B, A, C, A]
    let mut buf = buf(&[0, 0, 0, 0, 0, 5], &["A", "B", "A", "C", "A", "root"]);
    let root = buf.root_index().unwrap();
    assert_eq!(buf.make_children_distinct(root), Ok(-2));
    let tree = buf.freeze();
    let root = tree.root_index().unwrap();
    let mut children: Vec<&str> = tree
        .children_of(root)
        .unwrap()
        .into_iter()
        .map(|c| tree.value(c).unwrap())
        .collect();
    children.sort_unstable();
    assert_eq!(children, vec!["A", "B", "C"]);
}

#[test]
fn make_children_distinct_settles_cascading_merges() {
    // root -> (A -> p, A -> p): merging the As creates a second duplicate
    // pair one level down, which must settle too
    let mut buf = buf(&[0, 1, 0, 1, 2], &["p", "A", "p", "A", "root"]);
    assert_eq!(buf.make_children_distinct(4), Ok(-2));
    let tree = buf.freeze();
    assert_eq!(tree.contains_branch(["A", "p"], |v| *v), Ok(true));
    assert_eq!(tree.len(), 3);
}

#[test]
fn distinct_tree_insertion_merges_down_shared_structure() {
    // tree root -> a -> b; donor a -> (b, c): only c is new
    let mut buf = buf(&[0, 1, 1], &["b", "a", "root"]);
    let (ds, dv) = frozen(&[0, 0, 2], &["b", "c", "a"]);
    assert_eq!(buf.insert_tree_distinct(2, &ds, &dv), Ok(1));
    let tree = buf.freeze();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.contains_branch(["a", "b"], |v| *v), Ok(true));
    assert_eq!(tree.contains_branch(["a", "c"], |v| *v), Ok(true));
}

#[test]
fn distinct_tree_insertion_keeps_donor_sibling_order_across_grafts() {
    // tree: root -> a -> x; donor: a -> (b -> p, c). The donor's a merges
    // into the existing a, and b and c graft after x in donor order.
    let mut buf = buf(&[0, 1, 1], &["x", "a", "root"]);
    let (ds, dv) = frozen(&[0, 1, 0, 2], &["p", "b", "c", "a"]);
    assert_eq!(buf.insert_tree_distinct(2, &ds, &dv), Ok(3));
    let tree = buf.freeze();
    let root = tree.root_index().unwrap();
    let a = tree.children_of(root).unwrap()[0];
    let children: Vec<&str> = tree
        .children_of(a)
        .unwrap()
        .into_iter()
        .map(|c| tree.value(c).unwrap())
        .collect();
    assert_eq!(children, vec!["x", "b", "c"], "sibling order is observable");
    assert_eq!(tree.contains_branch(["a", "b", "p"], |v| *v), Ok(true));
    assert_eq!(
        tree.branch_values(None).collect::<Vec<_>>(),
        vec![
            vec!["root", "a", "x"],
            vec!["root", "a", "b", "p"],
            vec!["root", "a", "c"],
        ]
    );
}

#[test]
fn distinct_tree_insertion_is_idempotent() {
    let mut buf = buf(&[0, 0, 2, 1], &["b", "c", "a", "root"]);
    let (ds, dv) = frozen(&[0, 0, 2], &["b", "c", "a"]);
    assert_eq!(buf.insert_tree_distinct(3, &ds, &dv), Ok(0));
    assert_eq!(buf.insert_tree_distinct(3, &ds, &dv), Ok(0));
    assert_eq!(buf.len(), 4);
}

#[test]
fn whole_subtree_insertion_allows_duplicates() {
    let mut buf = buf(&[0, 1], &["a", "root"]);
    let (ds, dv) = frozen(&[0], &["a"]);
    assert_eq!(buf.insert_tree(1, &ds, &dv), Ok(1));
    let tree = buf.freeze();
    let root = tree.root_index().unwrap();
    assert_eq!(tree.children_of(root).unwrap().len(), 2);
}

#[test]
fn insertion_into_an_empty_tree_is_an_error() {
    let mut buf: TreeBuf<&str> = TreeBuf::new();
    assert_eq!(
        buf.insert_value(0, "x", false),
        Err(TreeError::EmptyTreeInsert { index: 0 })
    );
    // seeding is the sanctioned way in
    let buf = TreeBuf::seed("x");
    assert_eq!(buf.len(), 1);
}

#[test]
fn out_of_bounds_targets_are_rejected_before_any_write() {
    let mut buf = buf(&[0, 1], &["a", "root"]);
    assert_eq!(
        buf.insert_value(5, "x", false),
        Err(TreeError::IndexOutOfBounds { index: 5, size: 2 })
    );
    assert_eq!(
        buf.remove_value(5),
        Err(TreeError::IndexOutOfBounds { index: 5, size: 2 })
    );
    assert_eq!(buf.structure().as_slice(), &[0, 1], "nothing was written");
}

#[test]
fn malformed_raw_parts_are_rejected() {
    assert_eq!(
        TreeBuf::from_parts(vec![0, 0], vec!["a"]),
        Err(TreeError::LengthMismatch {
            structure: 2,
            values: 1
        })
    );
    assert!(matches!(
        TreeBuf::from_parts(vec![0, 2], vec!["a", "r"]),
        Err(TreeError::IncompleteTree { .. })
    ));
}
