//! Data models for tree selections and package manifests

use serde::{Deserialize, Serialize};

/// Placeholder child shown while a type's members are being fetched.
/// Also marks a previously saved type whose full member list is not yet known.
pub const LOADING: &str = "*loading..";

/// Parent of a selected tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parent {
    /// The node is itself a metadata type
    Root,
    /// The node is a member of the named metadata type
    Type(String),
}

/// One checked node in the selection tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionNode {
    pub text: String,
    pub parent: Parent,
}

impl SelectionNode {
    pub fn root(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent: Parent::Root,
        }
    }

    pub fn child(parent: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parent: Parent::Type(parent.into()),
        }
    }

    /// Parse a `Type` or `Type:Member` selector as used on the command line
    pub fn parse_selector(selector: &str) -> Option<Self> {
        match selector.split_once(':') {
            Some((ty, member)) if !ty.is_empty() && !member.is_empty() => {
                Some(Self::child(ty, member))
            }
            Some(_) => None,
            None if !selector.is_empty() => Some(Self::root(selector)),
            None => None,
        }
    }
}

/// Type-to-members mapping that backs a package.xml
///
/// Types keep the order in which they were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    entries: Vec<(String, Vec<String>)>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, metadata_type: &str) -> bool {
        self.get(metadata_type).is_some()
    }

    pub fn get(&self, metadata_type: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(ty, _)| ty == metadata_type)
            .map(|(_, members)| members)
    }

    pub fn get_mut(&mut self, metadata_type: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(ty, _)| ty == metadata_type)
            .map(|(_, members)| members)
    }

    /// Insert or replace the members of a type, keeping its original position
    pub fn insert(&mut self, metadata_type: impl Into<String>, members: Vec<String>) {
        let metadata_type = metadata_type.into();
        match self.get_mut(&metadata_type) {
            Some(existing) => *existing = members,
            None => self.entries.push((metadata_type, members)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(ty, members)| (ty.as_str(), members.as_slice()))
    }

    /// Order-insensitive view: types and members both sorted
    #[cfg(test)]
    pub fn canonical(&self) -> std::collections::BTreeMap<String, Vec<String>> {
        self.entries
            .iter()
            .map(|(ty, members)| {
                let mut members = members.clone();
                members.sort();
                (ty.clone(), members)
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut manifest = Manifest::new();
        for (ty, members) in iter {
            manifest.insert(ty, members);
        }
        manifest
    }
}
