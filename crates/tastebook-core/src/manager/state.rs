//! Manager State Types
//!
//! Everything a view needs to render one manager, as plain values.

use crate::domain::{Entity, FormDraft, RecordId, Schema};

/// Which record the open draft belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditingTarget {
    /// The draft describes a record that doesn't exist yet
    #[default]
    New,
    Existing(RecordId),
}

impl EditingTarget {
    pub fn id(&self) -> Option<RecordId> {
        match self {
            EditingTarget::New => None,
            EditingTarget::Existing(id) => Some(*id),
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, EditingTarget::Existing(_))
    }
}

/// Image upload progress for the open form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading { file_name: String },
    Done(String),
    Failed(String),
}

impl UploadState {
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadState::Uploading { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown after an operation.
///
/// `id` grows with every notice posted by a manager, so a timer armed for an
/// older notice can't clear a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// The single edit form a manager owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub draft: FormDraft,
    pub editing: EditingTarget,
    pub upload: UploadState,
    pub notice: Option<Notice>,
}

impl FormState {
    pub fn blank(schema: &Schema) -> Self {
        Self {
            draft: FormDraft::blank(schema),
            editing: EditingTarget::New,
            upload: UploadState::Idle,
            notice: None,
        }
    }

    /// Submit stays disabled while an image is in flight
    pub fn can_submit(&self) -> bool {
        !self.upload.is_uploading()
    }
}

/// Point-in-time copy of a manager, handed to listeners and views
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerSnapshot<R> {
    pub records: Vec<R>,
    pub loading: bool,
    pub form: FormState,
    /// Record awaiting delete confirmation
    pub pending_removal: Option<RecordId>,
    /// Bumped each time edit mode is entered; views scroll to the form on change
    pub focus_requests: u64,
    pub version: u64,
}

impl<R: Entity> ManagerSnapshot<R> {
    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn is_editing(&self, id: RecordId) -> bool {
        self.form.editing == EditingTarget::Existing(id)
    }
}
