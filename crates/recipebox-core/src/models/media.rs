use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Which derivative generator an upload is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Image,
    Video,
}

impl MediaCategory {
    /// Category implied by a MIME type; parameters such as `; charset=` are ignored.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => Some(MediaCategory::Image),
            Some(("video", subtype)) if !subtype.is_empty() => Some(MediaCategory::Video),
            _ => None,
        }
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MediaCategory::Image => write!(f, "image"),
            MediaCategory::Video => write!(f, "video"),
        }
    }
}

/// Independent storage roots. Files never move between areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageArea {
    Uploads,
    ProfilePictures,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Uploads => "uploads",
            StorageArea::ProfilePictures => "profile_pictures",
        }
    }

    /// Profile pictures are still images only.
    pub fn accepts(&self, category: MediaCategory) -> bool {
        match self {
            StorageArea::Uploads => true,
            StorageArea::ProfilePictures => category == MediaCategory::Image,
        }
    }
}

impl Display for StorageArea {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// A raw upload as persisted at ingestion. Never modified afterwards.
#[derive(Debug, Clone)]
pub struct UploadedAsset {
    pub filename: String,
    pub path: PathBuf,
    pub area: StorageArea,
    pub owner_id: String,
    pub media_type: String,
    pub category: MediaCategory,
    pub filesize: u64,
}

/// Files produced for one upload, named relative to the upload's storage root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DerivativeSet {
    Image {
        thumbnail: String,
    },
    Video {
        screenshots: Vec<String>,
        /// Absent when palette generation or GIF encoding failed
        gif: Option<String>,
    },
}

impl DerivativeSet {
    /// Every derivative file name in the set.
    pub fn files(&self) -> Vec<&str> {
        match self {
            DerivativeSet::Image { thumbnail } => vec![thumbnail.as_str()],
            DerivativeSet::Video { screenshots, gif } => screenshots
                .iter()
                .map(String::as_str)
                .chain(gif.as_deref())
                .collect(),
        }
    }
}
