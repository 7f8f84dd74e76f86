//! Selection tree state
//!
//! One root per metadata type, with members loaded lazily on expand. Check
//! state is three-valued on roots: checking a root checks every loaded member,
//! unchecking any member clears the root, and a root whose loaded members are
//! all checked counts as checked.

use crate::model::manifest::{Manifest, SelectionNode, LOADING};
use crate::model::metadata::{MetadataComponent, MetadataObject};
use crate::model::metadata_type::is_folder_based;
use crate::services::enumerate::ChildRequest;
use crate::services::selection::is_wildcard;
use std::collections::BTreeSet;
use tracing::warn;

/// Load state of a type's members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
}

/// Rendered check marker of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Checked,
    Unchecked,
    /// Some members checked, or saved members not yet fetched
    Partial,
}

impl Check {
    pub fn marker(&self) -> &'static str {
        match self {
            Check::Checked => "[x]",
            Check::Unchecked => "[ ]",
            Check::Partial => "[~]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNode {
    pub name: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub name: String,
    pub in_folder: bool,
    pub checked: bool,
    pub expanded: bool,
    pub state: ChildState,
    pub members: Vec<MemberNode>,
    /// Members saved in the existing manifest, applied once the listing arrives
    pub pending: Vec<String>,
    /// Known only from the saved manifest, not from the org's catalog
    pub saved_only: bool,
}

impl TypeNode {
    fn new(object: &MetadataObject) -> Self {
        Self {
            name: object.xml_name.clone(),
            in_folder: object.in_folder,
            checked: false,
            expanded: false,
            state: ChildState::NotLoaded,
            members: Vec::new(),
            pending: Vec::new(),
            saved_only: false,
        }
    }

    fn saved_only(name: &str) -> Self {
        Self {
            name: name.to_string(),
            in_folder: is_folder_based(name),
            checked: false,
            expanded: false,
            state: ChildState::NotLoaded,
            members: Vec::new(),
            pending: Vec::new(),
            saved_only: true,
        }
    }

    fn all_members_checked(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.checked)
    }

    pub fn check(&self) -> Check {
        if self.checked || self.all_members_checked() {
            Check::Checked
        } else if !self.pending.is_empty() || self.members.iter().any(|m| m.checked) {
            Check::Partial
        } else {
            Check::Unchecked
        }
    }
}

/// One visible line of the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Type(usize),
    Member(usize, usize),
    /// Placeholder shown under a type whose members are being fetched
    Loading(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTree {
    types: Vec<TypeNode>,
}

impl SelectionTree {
    /// Build the roots from the type catalog and seed them from a saved manifest
    pub fn from_objects(objects: &[MetadataObject], existing: &Manifest) -> Self {
        let mut types: Vec<TypeNode> = objects.iter().map(TypeNode::new).collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types.dedup_by(|a, b| a.name == b.name);

        let mut tree = Self { types };
        tree.seed(existing);
        tree.types.sort_by(|a, b| a.name.cmp(&b.name));
        tree
    }

    /// Apply the saved manifest; saved types the catalog lacks get their own root
    fn seed(&mut self, existing: &Manifest) {
        for (metadata_type, members) in existing.iter() {
            let index = match self.types.iter().position(|t| t.name == metadata_type) {
                Some(index) => index,
                None => {
                    warn!(metadata_type, "saved type is not in the org catalog; keeping it");
                    self.types.push(TypeNode::saved_only(metadata_type));
                    self.types.len() - 1
                }
            };
            let node = &mut self.types[index];
            if is_wildcard(members) {
                node.checked = true;
            } else {
                node.pending = members
                    .iter()
                    .filter(|m| m.as_str() != LOADING)
                    .cloned()
                    .collect();
            }
        }
    }

    pub fn types(&self) -> &[TypeNode] {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, metadata_type: &str) -> Option<&TypeNode> {
        self.types.iter().find(|t| t.name == metadata_type)
    }

    fn find_mut(&mut self, metadata_type: &str) -> Option<&mut TypeNode> {
        self.types.iter_mut().find(|t| t.name == metadata_type)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lazy loading
    // ─────────────────────────────────────────────────────────────────────────

    /// Expand a type, returning the request to issue if its members are not loaded
    pub fn begin_fetch(&mut self, metadata_type: &str) -> Option<ChildRequest> {
        let node = self.find_mut(metadata_type)?;
        node.expanded = true;
        if node.state != ChildState::NotLoaded {
            return None;
        }
        node.state = ChildState::Loading;
        Some(ChildRequest {
            metadata_type: node.name.clone(),
            in_folder: node.in_folder,
        })
    }

    /// Replace a type's members with a fetched listing
    pub fn apply_listing(&mut self, metadata_type: &str, results: &[MetadataComponent]) {
        let Some(node) = self.find_mut(metadata_type) else {
            return;
        };

        let mut names: BTreeSet<&str> = results.iter().map(|c| c.full_name.as_str()).collect();
        let pending: BTreeSet<&str> = node.pending.iter().map(String::as_str).collect();
        let missing: Vec<&str> = pending.difference(&names).copied().collect();
        if !missing.is_empty() {
            warn!(metadata_type, missing = ?missing, "saved members not in the listing; keeping them");
            names.extend(missing);
        }
        let members = names
            .into_iter()
            .map(|name| MemberNode {
                name: name.to_string(),
                checked: node.checked || pending.contains(name),
            })
            .collect();

        node.members = members;
        node.pending.clear();
        node.state = ChildState::Loaded;
    }

    /// Reset a type after a failed fetch so it can be retried
    pub fn fetch_failed(&mut self, metadata_type: &str) {
        if let Some(node) = self.find_mut(metadata_type) {
            node.state = ChildState::NotLoaded;
            node.expanded = false;
        }
    }

    pub fn collapse(&mut self, metadata_type: &str) {
        if let Some(node) = self.find_mut(metadata_type) {
            node.expanded = false;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Checking
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_type(&mut self, metadata_type: &str) {
        let Some(node) = self.find_mut(metadata_type) else {
            return;
        };
        let checked = node.check() != Check::Checked;
        node.checked = checked;
        for member in &mut node.members {
            member.checked = checked;
        }
        if !checked {
            node.pending.clear();
        }
    }

    pub fn toggle_member(&mut self, metadata_type: &str, member: &str) {
        let Some(node) = self.find_mut(metadata_type) else {
            return;
        };
        let Some(entry) = node.members.iter_mut().find(|m| m.name == member) else {
            return;
        };
        entry.checked = !entry.checked;
        if !entry.checked {
            node.checked = false;
        }
    }

    pub fn clear_all(&mut self) {
        for node in &mut self.types {
            node.checked = false;
            node.pending.clear();
            for member in &mut node.members {
                member.checked = false;
            }
        }
    }

    /// Every checked node in tree order, as fed to the reducer
    ///
    /// Saved members whose type has not been fetched yet are reported as
    /// checked children so that a rebuild keeps them.
    pub fn selected_nodes(&self) -> Vec<SelectionNode> {
        let mut selected = Vec::new();

        for node in &self.types {
            let root_checked = node.check() == Check::Checked;
            if root_checked {
                selected.push(SelectionNode::root(&node.name));
                if node.state != ChildState::Loaded {
                    selected.push(SelectionNode::child(&node.name, LOADING));
                }
            }
            for member in node.members.iter().filter(|m| m.checked) {
                selected.push(SelectionNode::child(&node.name, &member.name));
            }
            for member in &node.pending {
                selected.push(SelectionNode::child(&node.name, member));
            }
        }

        selected
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Display
    // ─────────────────────────────────────────────────────────────────────────

    /// Visible rows, keeping types whose name or any loaded member matches `query`
    pub fn visible_rows(&self, query: &str) -> Vec<Row> {
        let query = query.to_lowercase();
        let matches = |text: &str| query.is_empty() || text.to_lowercase().contains(&query);
        let mut rows = Vec::new();

        for (ti, node) in self.types.iter().enumerate() {
            let type_matches = matches(&node.name);
            let member_hits: Vec<usize> = node
                .members
                .iter()
                .enumerate()
                .filter(|(_, m)| type_matches || matches(&m.name))
                .map(|(mi, _)| mi)
                .collect();

            if !type_matches && member_hits.is_empty() {
                continue;
            }
            rows.push(Row::Type(ti));

            let expanded = node.expanded || (!query.is_empty() && !type_matches);
            if !expanded {
                continue;
            }
            match node.state {
                ChildState::Loading => rows.push(Row::Loading(ti)),
                ChildState::Loaded => rows.extend(member_hits.into_iter().map(|mi| Row::Member(ti, mi))),
                ChildState::NotLoaded => {}
            }
        }

        rows
    }

    /// Type name and optional member name behind a row
    pub fn row_target(&self, row: Row) -> Option<(&str, Option<&str>)> {
        match row {
            Row::Type(ti) | Row::Loading(ti) => self.types.get(ti).map(|t| (t.name.as_str(), None)),
            Row::Member(ti, mi) => {
                let node = self.types.get(ti)?;
                let member = node.members.get(mi)?;
                Some((node.name.as_str(), Some(member.name.as_str())))
            }
        }
    }

    /// Count of checked roots and members, for the panel title
    pub fn checked_count(&self) -> usize {
        self.types
            .iter()
            .map(|t| {
                let root = usize::from(t.check() == Check::Checked);
                root + t.members.iter().filter(|m| m.checked).count() + t.pending.len()
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::selection::reduce;

    fn objects() -> Vec<MetadataObject> {
        vec![
            MetadataObject::new("Report", true),
            MetadataObject::new("ApexClass", false),
            MetadataObject::new("CustomObject", false),
        ]
    }

    fn listing(names: &[&str]) -> Vec<MetadataComponent> {
        names.iter().map(|n| MetadataComponent::named(*n)).collect()
    }

    fn members(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_roots_sorted_by_name() {
        let tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        let names: Vec<&str> = tree.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ApexClass", "CustomObject", "Report"]);
    }

    #[test]
    fn test_begin_fetch_only_once() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        let request = tree.begin_fetch("Report").unwrap();
        assert!(request.in_folder);
        assert_eq!(tree.get("Report").unwrap().state, ChildState::Loading);
        assert!(tree.begin_fetch("Report").is_none());

        tree.apply_listing("Report", &listing(&["Sales/Pipeline"]));
        assert!(tree.begin_fetch("Report").is_none());
    }

    #[test]
    fn test_failed_fetch_can_be_retried() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        tree.begin_fetch("ApexClass");
        tree.fetch_failed("ApexClass");
        assert_eq!(tree.get("ApexClass").unwrap().state, ChildState::NotLoaded);
        assert!(tree.begin_fetch("ApexClass").is_some());
    }

    #[test]
    fn test_checked_wildcard_root_before_load_builds_star() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        tree.toggle_type("ApexClass");

        let selected = tree.selected_nodes();
        assert_eq!(
            selected,
            vec![
                SelectionNode::root("ApexClass"),
                SelectionNode::child("ApexClass", LOADING)
            ]
        );
        assert_eq!(reduce(&selected).get("ApexClass"), Some(&members(&["*"])));
    }

    #[test]
    fn test_unchecking_member_clears_root() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        tree.begin_fetch("CustomObject");
        tree.apply_listing("CustomObject", &listing(&["Account", "Contact"]));
        tree.toggle_type("CustomObject");
        assert_eq!(tree.get("CustomObject").unwrap().check(), Check::Checked);

        tree.toggle_member("CustomObject", "Contact");
        assert_eq!(tree.get("CustomObject").unwrap().check(), Check::Partial);
        assert_eq!(
            reduce(&tree.selected_nodes()).get("CustomObject"),
            Some(&members(&["Account"]))
        );

        tree.toggle_member("CustomObject", "Contact");
        assert_eq!(tree.get("CustomObject").unwrap().check(), Check::Checked);
    }

    #[test]
    fn test_existing_manifest_seeds_pending_members() {
        let existing: Manifest = vec![
            ("ApexClass", members(&["*"])),
            ("CustomObject", members(&["Account", LOADING])),
            ("Layout", members(&["Account-Account Layout", LOADING])),
        ]
        .into_iter()
        .collect();
        let mut tree = SelectionTree::from_objects(&objects(), &existing);

        assert_eq!(tree.get("ApexClass").unwrap().check(), Check::Checked);
        assert_eq!(tree.get("CustomObject").unwrap().check(), Check::Partial);
        assert_eq!(
            reduce(&tree.selected_nodes()).get("CustomObject"),
            Some(&members(&["Account"]))
        );

        tree.begin_fetch("CustomObject");
        tree.apply_listing("CustomObject", &listing(&["Contact", "Account"]));
        let node = tree.get("CustomObject").unwrap();
        assert!(node.pending.is_empty());
        assert_eq!(
            node.members,
            vec![
                MemberNode { name: "Account".into(), checked: true },
                MemberNode { name: "Contact".into(), checked: false },
            ]
        );
    }

    #[test]
    fn test_saved_type_missing_from_catalog_is_kept() {
        let existing: Manifest = vec![
            ("CustomField", members(&["Account.Foo__c", LOADING])),
            ("Dashboard", members(&["*"])),
        ]
        .into_iter()
        .collect();
        let mut tree = SelectionTree::from_objects(&objects(), &existing);

        let names: Vec<&str> = tree.types().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["ApexClass", "CustomField", "CustomObject", "Dashboard", "Report"]);
        let field = tree.get("CustomField").unwrap();
        assert!(field.saved_only);
        assert_eq!(field.check(), Check::Partial);
        assert!(tree.get("Dashboard").unwrap().in_folder);

        tree.toggle_type("ApexClass");
        let manifest = reduce(&tree.selected_nodes());
        assert_eq!(manifest.get("CustomField"), Some(&members(&["Account.Foo__c"])));
        assert_eq!(manifest.get("ApexClass"), Some(&members(&["*"])));
    }

    #[test]
    fn test_saved_member_missing_from_listing_is_kept() {
        let existing: Manifest = vec![("CustomObject", members(&["Gone__c", "Account", LOADING]))]
            .into_iter()
            .collect();
        let mut tree = SelectionTree::from_objects(&objects(), &existing);
        tree.begin_fetch("CustomObject");
        tree.apply_listing("CustomObject", &listing(&["Account", "Contact"]));

        let node = tree.get("CustomObject").unwrap();
        let checked: Vec<&str> = node
            .members
            .iter()
            .filter(|m| m.checked)
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(checked, vec!["Account", "Gone__c"]);
        assert_eq!(
            reduce(&tree.selected_nodes()).get("CustomObject"),
            Some(&members(&["Account", "Gone__c"]))
        );
    }

    #[test]
    fn test_checked_root_checks_fetched_members() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        tree.toggle_type("Report");
        tree.begin_fetch("Report");
        tree.apply_listing("Report", &listing(&["Sales/Pipeline", "Ops/Backlog"]));

        assert_eq!(
            reduce(&tree.selected_nodes()).get("Report"),
            Some(&members(&["Ops/Backlog", "Sales/Pipeline"]))
        );
    }

    #[test]
    fn test_clear_all() {
        let existing: Manifest = vec![("CustomObject", members(&["Account", LOADING]))]
            .into_iter()
            .collect();
        let mut tree = SelectionTree::from_objects(&objects(), &existing);
        tree.toggle_type("ApexClass");
        tree.clear_all();
        assert!(tree.selected_nodes().is_empty());
        assert_eq!(tree.checked_count(), 0);
    }

    #[test]
    fn test_visible_rows_and_search() {
        let mut tree = SelectionTree::from_objects(&objects(), &Manifest::new());
        assert_eq!(tree.visible_rows(""), vec![Row::Type(0), Row::Type(1), Row::Type(2)]);

        tree.begin_fetch("CustomObject");
        assert_eq!(tree.visible_rows("custom"), vec![Row::Type(1), Row::Loading(1)]);

        tree.apply_listing("CustomObject", &listing(&["Account", "Contact"]));
        tree.collapse("CustomObject");
        assert_eq!(tree.visible_rows("cont"), vec![Row::Type(1), Row::Member(1, 1)]);
        assert_eq!(
            tree.row_target(Row::Member(1, 1)),
            Some(("CustomObject", Some("Contact")))
        );
        assert!(tree.visible_rows("nothing").is_empty());
    }

    #[test]
    fn test_marker() {
        assert_eq!(Check::Checked.marker(), "[x]");
        assert_eq!(Check::Partial.marker(), "[~]");
    }
}
