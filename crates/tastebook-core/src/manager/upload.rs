//! Upload Coordinator
//!
//! Size check and storage key derivation for image uploads. The manager
//! drives the actual gateway call and applies the result to its form.

use uuid::Uuid;

use crate::domain::CmsError;

const MIB: u64 = 1024 * 1024;

/// A file picked in the form's image input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// An accepted image selection holding the form's upload slot.
///
/// Hand it back with the file's bytes, or abandon it if they can't be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub(crate) coordinator: UploadCoordinator,
    pub(crate) field: &'static str,
    pub(crate) generation: u64,
    pub(crate) epoch: u64,
}

/// Upload policy for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCoordinator {
    pub bucket: String,
    pub prefix: &'static str,
    pub max_bytes: u64,
}

impl UploadCoordinator {
    pub fn new(bucket: impl Into<String>, prefix: &'static str, max_bytes: u64) -> Self {
        Self {
            bucket: bucket.into(),
            prefix,
            max_bytes,
        }
    }

    /// Reject files over the limit before anything is sent
    pub fn check_size(&self, size: u64) -> Result<(), CmsError> {
        if size > self.max_bytes {
            return Err(CmsError::Upload(format!(
                "Image size should be less than {}",
                describe_limit(self.max_bytes)
            )));
        }
        Ok(())
    }

    /// Fresh collision-resistant key for `file_name`
    pub fn key_for(&self, file_name: &str) -> String {
        storage_key(
            self.prefix,
            &Uuid::new_v4().simple().to_string(),
            chrono::Utc::now().timestamp_millis(),
            file_name,
        )
    }
}

fn describe_limit(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{} bytes", bytes)
    }
}

/// `<prefix>-<random>-<timestamp>.<ext>`, the extension taken from the
/// original file name. Names without one produce a key without one.
pub fn storage_key(prefix: &str, random: &str, timestamp_ms: i64, file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => {
            format!("{}-{}-{}.{}", prefix, random, timestamp_ms, ext)
        }
        _ => format!("{}-{}-{}", prefix, random, timestamp_ms),
    }
}
