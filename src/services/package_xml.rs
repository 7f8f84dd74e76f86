//! package.xml rendering and loading services

use crate::error::{PackageError, PackageResult};
use crate::model::manifest::{Manifest, LOADING};
use crate::model::metadata_type::WILDCARD;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Namespace of the metadata API package schema
pub const METADATA_NAMESPACE: &str = "http://soap.sforce.com/2006/04/metadata";

/// API version written when none is configured
pub const DEFAULT_API_VERSION: &str = "45.0";

/// Render a manifest as package.xml text
///
/// Types with no members are left out. Members are sorted by ordinal
/// comparison so the output does not depend on selection order; types keep
/// their insertion order.
pub fn render(manifest: &Manifest, version: &str) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    xml.push_str(&format!("<Package xmlns=\"{}\">\n", METADATA_NAMESPACE));

    for (metadata_type, members) in manifest.iter() {
        let mut members: Vec<&str> = members
            .iter()
            .map(String::as_str)
            .filter(|m| *m != LOADING)
            .collect();
        if members.is_empty() {
            continue;
        }
        members.sort_unstable();

        xml.push_str("\t<types>\n");
        for member in members {
            xml.push_str(&format!("\t\t<members>{}</members>\n", escape(member)));
        }
        xml.push_str(&format!("\t\t<name>{}</name>\n", escape(metadata_type)));
        xml.push_str("\t</types>\n");
    }

    xml.push_str(&format!("\t<version>{}</version>\n", escape(version)));
    xml.push_str("</Package>");
    xml
}

fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    quick_xml::escape::escape(text)
}

/// Write rendered package.xml text, creating the parent directory if needed
pub fn write_manifest<P: AsRef<Path>>(path: P, contents: &str) -> PackageResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct PackageDocument {
    #[serde(default)]
    types: Vec<TypesElement>,
}

#[derive(Debug, Deserialize)]
struct TypesElement {
    #[serde(default)]
    members: Vec<String>,
    name: String,
}

/// Parse a previously saved package.xml into a merge seed
///
/// Types that are not `*` get the pending marker appended so the tree can show
/// them as partially known until their members are fetched. Anything that is
/// not a readable `Package` document yields an empty manifest.
pub fn parse_existing(text: &str) -> Manifest {
    match parse_document(text) {
        Ok(manifest) => manifest,
        Err(error) => {
            warn!(%error, "ignoring unreadable package.xml");
            Manifest::new()
        }
    }
}

fn parse_document(text: &str) -> PackageResult<Manifest> {
    match root_element(text) {
        Some(root) if root == "Package" => {}
        Some(root) => return Err(PackageError::Xml(format!("unexpected root element <{}>", root))),
        None => return Err(PackageError::Xml("no root element".to_string())),
    }

    let document: PackageDocument =
        quick_xml::de::from_str(text).map_err(|e| PackageError::Xml(e.to_string()))?;

    let mut manifest = Manifest::new();
    for ty in document.types {
        let mut members = ty.members;
        if members.is_empty() {
            continue;
        }
        if !members.iter().any(|m| m == WILDCARD) {
            members.push(LOADING.to_string());
        }
        manifest.insert(ty.name, members);
    }
    Ok(manifest)
}

/// Load the package.xml at `path`, treating a missing or broken file as empty
pub fn load_existing<P: AsRef<Path>>(path: P) -> Manifest {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => parse_existing(&text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no existing package.xml");
            Manifest::new()
        }
    }
}

/// Local name of the first element in the document
fn root_element(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}
