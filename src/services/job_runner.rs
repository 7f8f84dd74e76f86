//! Background enumeration runner
//!
//! Spawns metadata requests onto the tokio runtime and hands their results
//! back to the UI thread through a channel that is polled on every tick.

use crate::error::PackageError;
use crate::model::manifest::Manifest;
use crate::model::metadata::{MetadataComponent, MetadataObject};
use crate::services::enumerate::{self, ChildRequest, MetadataSource, Progress};
use crate::services::package_xml;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Message from a background request to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum JobMessage {
    /// An external call started or finished
    Progress(Progress),
    /// The type catalog, together with the manifest already on disk
    MetadataObjects {
        objects: Vec<MetadataObject>,
        existing: Manifest,
    },
    /// Members of one type
    ListMetadata {
        metadata_type: String,
        results: Vec<MetadataComponent>,
    },
    /// A request failed; `metadata_type` is `None` for the catalog request
    Failed {
        metadata_type: Option<String>,
        error: PackageError,
    },
}

/// Runner for metadata requests
pub struct JobRunner {
    handle: Handle,
    source: Arc<dyn MetadataSource>,
    sender: Sender<JobMessage>,
    receiver: Receiver<JobMessage>,
}

impl JobRunner {
    pub fn new(handle: Handle, source: Arc<dyn MetadataSource>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            handle,
            source,
            sender,
            receiver,
        }
    }

    /// Load the saved manifest and fetch the type catalog
    pub fn spawn_describe(&self, existing_manifest: PathBuf) {
        let source = Arc::clone(&self.source);
        let tx = self.sender.clone();

        self.handle.spawn(async move {
            let existing = package_xml::load_existing(&existing_manifest);
            let progress_tx = tx.clone();
            let progress = move |p: Progress| {
                let _ = progress_tx.send(JobMessage::Progress(p));
            };

            let message = match enumerate::describe(source.as_ref(), &progress).await {
                Ok(objects) => {
                    debug!(types = objects.len(), existing = existing.len(), "described metadata");
                    JobMessage::MetadataObjects { objects, existing }
                }
                Err(error) => {
                    warn!(%error, "describe metadata failed");
                    JobMessage::Failed {
                        metadata_type: None,
                        error,
                    }
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Fetch the members of one type
    pub fn spawn_fetch(&self, request: ChildRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.sender.clone();

        self.handle.spawn(async move {
            let progress_tx = tx.clone();
            let progress = move |p: Progress| {
                let _ = progress_tx.send(JobMessage::Progress(p));
            };

            let message = match enumerate::fetch_children(source.as_ref(), &request, &progress).await {
                Ok(results) => JobMessage::ListMetadata {
                    metadata_type: request.metadata_type,
                    results,
                },
                Err(error) => {
                    warn!(metadata_type = %request.metadata_type, %error, "list metadata failed");
                    JobMessage::Failed {
                        metadata_type: Some(request.metadata_type),
                        error,
                    }
                }
            };
            let _ = tx.send(message);
        });
    }

    /// Drain every message that has arrived since the last poll
    pub fn poll(&self) -> Vec<JobMessage> {
        self.receiver.try_iter().collect()
    }
}
