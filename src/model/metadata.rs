//! Records returned by the metadata CLI (describe and list)

use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the describe-metadata catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataObject {
    pub xml_name: String,
    #[serde(default)]
    pub in_folder: bool,
    #[serde(default)]
    pub directory_name: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub meta_file: bool,
    #[serde(default)]
    pub child_xml_names: Vec<String>,
}

impl MetadataObject {
    #[cfg(test)]
    pub fn new(xml_name: impl Into<String>, in_folder: bool) -> Self {
        Self {
            xml_name: xml_name.into(),
            in_folder,
            directory_name: None,
            suffix: None,
            meta_file: false,
            child_xml_names: Vec::new(),
        }
    }
}

/// One component returned by list-metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataComponent {
    pub full_name: String,
    #[serde(default, rename = "type")]
    pub metadata_type: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub namespace_prefix: Option<String>,
    #[serde(default)]
    pub manageable_state: Option<String>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
}

impl MetadataComponent {
    #[cfg(test)]
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            metadata_type: None,
            file_name: None,
            id: None,
            namespace_prefix: None,
            manageable_state: None,
            last_modified_date: None,
        }
    }
}

/// `{ "result": ... }` envelope of a list-metadata call
///
/// The CLI omits `result` when nothing matched and emits a bare object when
/// exactly one component matched.
#[derive(Debug, Default, Deserialize)]
pub struct ListMetadataResponse {
    #[serde(default, deserialize_with = "one_or_many")]
    pub result: Vec<MetadataComponent>,
}

/// `{ "result": { "metadataObjects": [...] } }` envelope of a describe call
#[derive(Debug, Deserialize)]
pub struct DescribeMetadataResponse {
    pub result: DescribeMetadataResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeMetadataResult {
    #[serde(default)]
    pub metadata_objects: Vec<MetadataObject>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
        None => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_response_many() {
        let json = r#"{"status":0,"result":[
            {"fullName":"Foo","type":"ApexClass","fileName":"classes/Foo.cls"},
            {"fullName":"Bar","type":"ApexClass"}
        ]}"#;
        let response: ListMetadataResponse = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = response.result.iter().map(|c| c.full_name.as_str()).collect();
        assert_eq!(names, vec!["Foo", "Bar"]);
        assert_eq!(response.result[0].file_name.as_deref(), Some("classes/Foo.cls"));
    }

    #[test]
    fn test_list_response_single_object() {
        let json = r#"{"status":0,"result":{"fullName":"Sales","type":"ReportFolder"}}"#;
        let response: ListMetadataResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.result, vec![MetadataComponent {
            metadata_type: Some("ReportFolder".to_string()),
            ..MetadataComponent::named("Sales")
        }]);
    }

    #[test]
    fn test_list_response_missing_or_null_result() {
        let response: ListMetadataResponse = serde_json::from_str(r#"{"status":0}"#).unwrap();
        assert!(response.result.is_empty());

        let response: ListMetadataResponse =
            serde_json::from_str(r#"{"status":0,"result":null}"#).unwrap();
        assert!(response.result.is_empty());
    }

    #[test]
    fn test_describe_response() {
        let json = r#"{"status":0,"result":{"metadataObjects":[
            {"directoryName":"classes","inFolder":false,"metaFile":true,"suffix":"cls","xmlName":"ApexClass"},
            {"directoryName":"reports","inFolder":true,"metaFile":false,"suffix":"report","xmlName":"Report"}
        ],"organizationNamespace":""}}"#;
        let response: DescribeMetadataResponse = serde_json::from_str(json).unwrap();
        let objects = response.result.metadata_objects;
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].xml_name, "ApexClass");
        assert!(!objects[0].in_folder);
        assert!(objects[1].in_folder);
        assert!(objects[1].child_xml_names.is_empty());
    }
}
