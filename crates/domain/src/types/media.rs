//! Media upload types

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// Media kinds accepted by DingTalk's media upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Voice,
    Video,
    File,
}

impl_domain_enum_conversions!(MediaType {
    Image => "image",
    Voice => "voice",
    Video => "video",
    File => "file",
});

/// Media file to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub media_type: MediaType,
    pub filename: String,
    pub content: Vec<u8>,
}
