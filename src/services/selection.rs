//! Collapse checked tree nodes into a package manifest

use crate::error::{PackageError, PackageResult};
use crate::model::manifest::{Manifest, Parent, SelectionNode, LOADING};
use crate::model::metadata_type::{accepts_wildcard, WILDCARD};

/// Reduce the checked nodes of the selection tree to a type → members mapping
///
/// Input order does not matter: a wildcard-capable root node always wins over
/// its children, whether the children come before or after it.
pub fn reduce(selected: &[SelectionNode]) -> Manifest {
    let mut manifest = Manifest::new();

    for node in selected {
        if node.text == LOADING {
            continue;
        }

        match &node.parent {
            Parent::Root => {
                let wildcard = accepts_wildcard(&node.text);
                if !manifest.contains(&node.text) {
                    let members = if wildcard {
                        vec![WILDCARD.to_string()]
                    } else {
                        Vec::new()
                    };
                    manifest.insert(node.text.clone(), members);
                } else if wildcard {
                    manifest.insert(node.text.clone(), vec![WILDCARD.to_string()]);
                }
            }
            Parent::Type(owner) => match manifest.get_mut(owner) {
                None => manifest.insert(owner.clone(), vec![node.text.clone()]),
                Some(members) if is_wildcard(members) => {}
                Some(members) => members.push(node.text.clone()),
            },
        }
    }

    manifest
}

/// Reduce a selection that is about to be written
///
/// A selection whose types all came out without members would render a
/// manifest with no `types` at all, so it is rejected like an empty one.
pub fn reduce_for_build(selected: &[SelectionNode]) -> PackageResult<Manifest> {
    let manifest = reduce(selected);
    if manifest.iter().all(|(_, members)| members.is_empty()) {
        return Err(PackageError::EmptySelection);
    }
    Ok(manifest)
}

/// Whether a member list is the wildcard marker
pub fn is_wildcard(members: &[String]) -> bool {
    members.iter().any(|m| m == WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn members(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_root_wins_over_child() {
        let manifest = reduce(&[
            SelectionNode::root("ApexClass"),
            SelectionNode::child("ApexClass", "Foo"),
        ]);
        assert_eq!(manifest.get("ApexClass"), Some(&members(&["*"])));
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_wildcard_root_after_children_replaces_them() {
        let manifest = reduce(&[
            SelectionNode::child("ApexClass", "Foo"),
            SelectionNode::child("ApexClass", "Bar"),
            SelectionNode::root("ApexClass"),
        ]);
        assert_eq!(manifest.get("ApexClass"), Some(&members(&["*"])));
    }

    #[test]
    fn test_folder_root_without_children_is_empty() {
        let manifest = reduce(&[SelectionNode::root("Report")]);
        assert_eq!(manifest.get("Report"), Some(&Vec::new()));
    }

    #[test]
    fn test_non_wildcard_root_collects_children() {
        let manifest = reduce(&[
            SelectionNode::root("Report"),
            SelectionNode::child("Report", "Sales/Pipeline"),
            SelectionNode::child("Report", "Sales/Forecast"),
        ]);
        assert_eq!(
            manifest.get("Report"),
            Some(&members(&["Sales/Pipeline", "Sales/Forecast"]))
        );
    }

    #[test]
    fn test_build_rejects_selection_without_members() {
        assert_eq!(reduce_for_build(&[]), Err(PackageError::EmptySelection));
        assert_eq!(
            reduce_for_build(&[
                SelectionNode::root("Report"),
                SelectionNode::child("Report", LOADING),
            ]),
            Err(PackageError::EmptySelection)
        );

        let manifest = reduce_for_build(&[
            SelectionNode::root("Report"),
            SelectionNode::root("ApexClass"),
        ])
        .unwrap();
        assert_eq!(manifest.get("ApexClass"), Some(&members(&["*"])));
    }

    #[test]
    fn test_children_without_root() {
        let manifest = reduce(&[
            SelectionNode::child("CustomObject", "Account"),
            SelectionNode::child("Layout", "Account-Account Layout"),
            SelectionNode::child("CustomObject", "Contact"),
        ]);
        let types: Vec<&str> = manifest.iter().map(|(ty, _)| ty).collect();
        assert_eq!(types, vec!["CustomObject", "Layout"]);
        assert_eq!(manifest.get("CustomObject"), Some(&members(&["Account", "Contact"])));
    }

    #[test]
    fn test_loading_placeholder_is_skipped() {
        let manifest = reduce(&[
            SelectionNode::child("CustomObject", LOADING),
            SelectionNode::child("CustomObject", "Account"),
        ]);
        assert_eq!(manifest.get("CustomObject"), Some(&members(&["Account"])));

        let manifest = reduce(&[SelectionNode::child("Layout", LOADING)]);
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_empty_selection_reduces_to_empty_manifest() {
        assert!(reduce(&[]).is_empty());
    }

    fn type_name() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "ApexClass",
            "ApexPage",
            "Report",
            "Dashboard",
            "CustomObject",
            "Layout",
        ])
        .prop_map(str::to_string)
    }

    fn selection_node() -> impl Strategy<Value = SelectionNode> {
        prop_oneof![
            type_name().prop_map(SelectionNode::root),
            (type_name(), "[A-Za-z]{1,6}").prop_map(|(ty, m)| SelectionNode::child(ty, m)),
            type_name().prop_map(|ty| SelectionNode::child(ty, LOADING)),
        ]
    }

    proptest! {
        /// Any permutation of the same selection reduces to the same mapping.
        #[test]
        fn reduce_is_order_independent(
            (nodes, shuffled) in prop::collection::vec(selection_node(), 0..24)
                .prop_flat_map(|nodes| {
                    let shuffled = Just(nodes.clone()).prop_shuffle();
                    (Just(nodes), shuffled)
                })
        ) {
            prop_assert_eq!(reduce(&nodes).canonical(), reduce(&shuffled).canonical());
        }

        /// A wildcard-capable root anywhere in the input yields exactly ["*"].
        #[test]
        fn wildcard_root_always_yields_star(
            mut nodes in prop::collection::vec(selection_node(), 0..16),
            position in any::<prop::sample::Index>(),
        ) {
            let at = position.index(nodes.len() + 1);
            nodes.insert(at, SelectionNode::root("ApexClass"));
            let manifest = reduce(&nodes);
            prop_assert_eq!(manifest.get("ApexClass"), Some(&vec!["*".to_string()]));
        }
    }
}
