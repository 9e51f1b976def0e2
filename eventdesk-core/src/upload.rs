//! Image upload followed by the event list write.
//!
//! A submit runs as two stages: the image asset is committed first, and only
//! then is the record pointing at it added or updated. If the second stage
//! fails the asset stays in the repository; nothing is rolled back.

use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::collection::EventManager;
use crate::error::{EventDeskError, EventDeskResult};
use crate::event::EventRecord;
use crate::remote::ContentStore;

pub const UPLOAD_MESSAGE: &str = "Upload event image";

/// An image picked by the operator, read into memory.
#[derive(Debug, Clone)]
pub struct ImageFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageFile {
    /// Only the final path component of `file_name` is kept.
    pub fn new(file_name: &str, bytes: Vec<u8>) -> EventDeskResult<Self> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                EventDeskError::Validation(format!("'{file_name}' is not a usable file name"))
            })?;

        Ok(ImageFile {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    pub async fn read(path: &Path) -> EventDeskResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::new(&path.to_string_lossy(), bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Text fields of the event being submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvent {
    pub alt: String,
    pub caption: String,
}

/// Where the submitted record goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    New,
    Existing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStage {
    Idle,
    UploadingAsset,
    AssetCommitted,
    PersistingRecord,
    Done,
}

impl fmt::Display for SubmitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubmitStage::Idle => "preparing submission",
            SubmitStage::UploadingAsset => "uploading image",
            SubmitStage::AssetCommitted => "recording image",
            SubmitStage::PersistingRecord => "saving event list",
            SubmitStage::Done => "finishing",
        };
        f.write_str(label)
    }
}

/// A submit that stopped at `stage`.
///
/// `orphaned_asset` is set when the image had already been committed; it
/// is left in the repository without a record referencing it.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct SubmitError {
    pub stage: SubmitStage,
    pub orphaned_asset: Option<String>,
    pub error: EventDeskError,
}

/// Result of the asset stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedAsset {
    pub path: String,
}

/// Repository path for an upload: `{asset_dir}/{epoch_millis}_{file_name}`.
pub fn asset_path(asset_dir: &str, epoch_millis: i64, file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        asset_dir.trim_end_matches('/'),
        epoch_millis,
        file_name
    )
}

/// Stage one: write the image as a new file.
pub async fn upload_asset<S: ContentStore + ?Sized>(
    store: &S,
    asset_dir: &str,
    image: &ImageFile,
    epoch_millis: i64,
) -> EventDeskResult<CommittedAsset> {
    let path = asset_path(asset_dir, epoch_millis, image.file_name());
    store
        .write_object(&path, image.bytes(), UPLOAD_MESSAGE, None)
        .await?;
    Ok(CommittedAsset { path })
}

/// Stage two: build the record and hand it to the manager.
///
/// Without a new asset, an existing record keeps its image and a new one
/// gets an empty image path.
pub async fn commit_record<S: ContentStore>(
    manager: &mut EventManager<S>,
    asset: Option<&CommittedAsset>,
    fields: PendingEvent,
    target: Target,
) -> EventDeskResult<EventRecord> {
    let image = match (asset, target) {
        (Some(asset), _) => asset.path.clone(),
        (None, Target::New) => String::new(),
        (None, Target::Existing(index)) => manager
            .get(index)
            .map(|r| r.image.clone())
            .ok_or(EventDeskError::IndexOutOfRange {
                index,
                len: manager.len(),
            })?,
    };

    let record = EventRecord {
        image,
        alt: fields.alt,
        caption: fields.caption,
    };

    match target {
        Target::New => manager.add(record.clone()).await?,
        Target::Existing(index) => manager.update(index, record.clone()).await?,
    }

    Ok(record)
}

/// Runs a submit through both stages.
pub struct ImageUploader {
    asset_dir: String,
}

impl ImageUploader {
    pub fn new(asset_dir: impl Into<String>) -> Self {
        ImageUploader {
            asset_dir: asset_dir.into(),
        }
    }

    pub fn asset_dir(&self) -> &str {
        &self.asset_dir
    }

    pub async fn attach_and_finalize<S: ContentStore>(
        &self,
        manager: &mut EventManager<S>,
        image: Option<ImageFile>,
        fields: PendingEvent,
        target: Target,
    ) -> Result<EventRecord, SubmitError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.attach_and_finalize_at(manager, image, fields, target, now)
            .await
    }

    async fn attach_and_finalize_at<S: ContentStore>(
        &self,
        manager: &mut EventManager<S>,
        image: Option<ImageFile>,
        fields: PendingEvent,
        target: Target,
        epoch_millis: i64,
    ) -> Result<EventRecord, SubmitError> {
        let fail = |stage, orphaned_asset, error| SubmitError {
            stage,
            orphaned_asset,
            error,
        };

        if let Target::Existing(index) = target {
            manager
                .check_index(index)
                .map_err(|e| fail(SubmitStage::Idle, None, e))?;
        }

        let asset = match image {
            Some(image) => {
                debug!(stage = %SubmitStage::UploadingAsset, file = image.file_name());
                let asset = upload_asset(manager.store(), &self.asset_dir, &image, epoch_millis)
                    .await
                    .map_err(|e| fail(SubmitStage::UploadingAsset, None, e))?;
                info!(path = %asset.path, "image uploaded");
                debug!(stage = %SubmitStage::AssetCommitted, path = %asset.path);
                Some(asset)
            }
            None => None,
        };

        debug!(stage = %SubmitStage::PersistingRecord, ?target);
        let record = commit_record(manager, asset.as_ref(), fields, target)
            .await
            .map_err(|e| {
                fail(
                    SubmitStage::PersistingRecord,
                    asset.as_ref().map(|a| a.path.clone()),
                    e,
                )
            })?;

        debug!(stage = %SubmitStage::Done);
        Ok(record)
    }
}
