//! Metadata enumeration
//!
//! Fetches the members of one metadata type. Folder-based types take two
//! phases: list the folders, then list each folder's members one folder at a
//! time so that only one CLI process runs per request.

use crate::error::PackageResult;
use crate::model::metadata::{MetadataComponent, MetadataObject};
use crate::model::metadata_type::{folder_type, is_folder_based};
use async_trait::async_trait;
use tracing::{debug, info};

/// Source of metadata listings (the sfdx CLI in production)
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// List the components of a type, optionally restricted to one folder
    async fn list_metadata(
        &self,
        metadata_type: &str,
        folder: Option<&str>,
    ) -> PackageResult<Vec<MetadataComponent>>;

    /// List every metadata type known to the org
    async fn describe_metadata(&self) -> PackageResult<Vec<MetadataObject>>;
}

/// Progress notification around a single external call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Begin(String),
    End,
}

/// What to enumerate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequest {
    pub metadata_type: String,
    pub in_folder: bool,
}

impl ChildRequest {
    /// Request for a type known only by name, classified by the static table
    pub fn from_name(metadata_type: &str) -> Self {
        Self {
            metadata_type: metadata_type.to_string(),
            in_folder: is_folder_based(metadata_type),
        }
    }
}

async fn tracked<T, F>(progress: &(dyn Fn(Progress) + Send + Sync), title: String, call: F) -> T
where
    F: std::future::Future<Output = T>,
{
    progress(Progress::Begin(title));
    let result = call.await;
    progress(Progress::End);
    result
}

/// Fetch every component of the requested type
///
/// The first failing call ends the request; no call is retried.
pub async fn fetch_children(
    source: &dyn MetadataSource,
    request: &ChildRequest,
    progress: &(dyn Fn(Progress) + Send + Sync),
) -> PackageResult<Vec<MetadataComponent>> {
    let metadata_type = request.metadata_type.as_str();

    if !request.in_folder {
        return tracked(
            progress,
            format!("Processing Metadata : {}", metadata_type),
            source.list_metadata(metadata_type, None),
        )
        .await;
    }

    let folder_type = folder_type(metadata_type)?;
    let folders = tracked(
        progress,
        format!("Processing Metadata : {}", folder_type),
        source.list_metadata(folder_type, None),
    )
    .await?;
    let folder_names: Vec<String> = folders.into_iter().map(|f| f.full_name).collect();
    debug!(metadata_type, folders = folder_names.len(), "listed folders");

    let mut results = Vec::new();
    for folder in &folder_names {
        let components = tracked(
            progress,
            format!("Processing Metadata : {}:{}", metadata_type, folder),
            source.list_metadata(metadata_type, Some(folder)),
        )
        .await?;
        results.extend(components);
    }

    info!(metadata_type, components = results.len(), "fetched folder contents");
    Ok(results)
}

/// Fetch the org's metadata type catalog
pub async fn describe(
    source: &dyn MetadataSource,
    progress: &(dyn Fn(Progress) + Send + Sync),
) -> PackageResult<Vec<MetadataObject>> {
    tracked(progress, "Processing Metadata".to_string(), source.describe_metadata()).await
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;
    use crate::error::PackageError;
    use std::sync::Mutex;

    fn names(components: &[MetadataComponent]) -> Vec<&str> {
        components.iter().map(|c| c.full_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_non_folder_type_single_call() {
        let source = FakeSource::default().with_listing("ApexClass", None, &["Foo", "Bar"]);
        let request = ChildRequest::from_name("ApexClass");

        let results = fetch_children(&source, &request, &|_| {}).await.unwrap();
        assert_eq!(names(&results), vec!["Foo", "Bar"]);
        assert_eq!(source.calls(), vec![("ApexClass".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_folder_type_fans_out_sequentially() {
        let source = FakeSource::default()
            .with_listing("ReportFolder", None, &["Sales", "Ops"])
            .with_listing("Report", Some("Sales"), &["Sales/Pipeline", "Sales/Forecast"])
            .with_listing("Report", Some("Ops"), &["Ops/Backlog"]);
        let request = ChildRequest::from_name("Report");

        let results = fetch_children(&source, &request, &|_| {}).await.unwrap();
        assert_eq!(
            names(&results),
            vec!["Sales/Pipeline", "Sales/Forecast", "Ops/Backlog"]
        );
        assert_eq!(
            source.calls(),
            vec![
                ("ReportFolder".to_string(), None),
                ("Report".to_string(), Some("Sales".to_string())),
                ("Report".to_string(), Some("Ops".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_folders_skips_second_phase() {
        let source = FakeSource::default();
        let request = ChildRequest::from_name("Dashboard");

        let results = fetch_children(&source, &request, &|_| {}).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(source.calls(), vec![("DashboardFolder".to_string(), None)]);
    }

    #[tokio::test]
    async fn test_failure_mid_sequence_stops() {
        let err = PackageError::Transport {
            command: "sfdx".into(),
            stderr: "session expired".into(),
        };
        let source = FakeSource::default()
            .with_listing("EmailFolder", None, &["A", "B", "C"])
            .with_listing("EmailTemplate", Some("A"), &["A/Welcome"])
            .with_failure("EmailTemplate", Some("B"), err.clone());
        let request = ChildRequest::from_name("EmailTemplate");

        let result = fetch_children(&source, &request, &|_| {}).await;
        assert_eq!(result, Err(err));
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_in_folder_type_without_folder_mapping_fails_loudly() {
        let source = FakeSource::default();
        let request = ChildRequest {
            metadata_type: "CustomThing".to_string(),
            in_folder: true,
        };

        let result = fetch_children(&source, &request, &|_| {}).await;
        assert_eq!(result, Err(PackageError::UnknownFolderType("CustomThing".into())));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_progress_wraps_each_call() {
        let source = FakeSource::default()
            .with_listing("DocumentFolder", None, &["Shared"])
            .with_listing("Document", Some("Shared"), &["Shared/logo.png"]);
        let events = Mutex::new(Vec::new());
        let request = ChildRequest::from_name("Document");

        fetch_children(&source, &request, &|p| events.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(
            events.into_inner().unwrap(),
            vec![
                Progress::Begin("Processing Metadata : DocumentFolder".to_string()),
                Progress::End,
                Progress::Begin("Processing Metadata : Document:Shared".to_string()),
                Progress::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_describe() {
        let source = FakeSource::default()
            .with_objects(vec![MetadataObject::new("ApexClass", false)]);
        let objects = describe(&source, &|_| {}).await.unwrap();
        assert_eq!(objects[0].xml_name, "ApexClass");
    }

    #[test]
    fn test_child_request_from_name_classifies() {
        assert!(ChildRequest::from_name("Report").in_folder);
        assert!(!ChildRequest::from_name("ApexClass").in_folder);
    }
}
