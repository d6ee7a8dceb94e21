//! Resource Manager
//!
//! Owns one collection's loaded records and its single shared edit form.
//! Generic over the record type; the record's [`Schema`] supplies table,
//! ordering, fields and wording.
//!
//! Every async operation follows the same shape: mutate state, release the
//! lock, await the gateway, then apply the result under the lock again.
//! Results are applied only if they are still current:
//! - a load is dropped when a newer load was issued after it
//! - an upload is dropped when another file was selected or the form was reset
//! - nothing is applied once the manager has been disposed
//!
//! Submissions are not debounced; two quick submits issue two inserts.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use super::state::{EditingTarget, FormState, ManagerSnapshot, Notice, NoticeKind, UploadState};
use super::upload::{SelectedFile, UploadCoordinator, UploadTicket};
use crate::config::{CmsConfig, DEFAULT_IMAGE_BUCKET, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_NOTICE_TTL_MS};
use crate::domain::{decode_rows, CmsError, CmsResult, Entity, FormDraft, RecordId, Schema};
use crate::gateway::Gateway;

/// Limits shared by all managers built from one configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSettings {
    pub image_bucket: String,
    pub max_upload_bytes: u64,
    pub notice_ttl: Duration,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            image_bucket: DEFAULT_IMAGE_BUCKET.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            notice_ttl: Duration::from_millis(DEFAULT_NOTICE_TTL_MS),
        }
    }
}

impl From<&CmsConfig> for ManagerSettings {
    fn from(config: &CmsConfig) -> Self {
        Self {
            image_bucket: config.image_bucket.clone(),
            max_upload_bytes: config.max_upload_bytes,
            notice_ttl: config.notice_ttl(),
        }
    }
}

type Listener<R> = Arc<dyn Fn(&ManagerSnapshot<R>) + Send + Sync>;

struct ManagerState<R> {
    records: Vec<R>,
    loading: bool,
    form: FormState,
    pending_removal: Option<RecordId>,
    focus_requests: u64,
    version: u64,
    load_generation: u64,
    upload_generation: u64,
    /// Bumped whenever the form is reset or retargeted
    form_epoch: u64,
    next_notice_id: u64,
    disposed: bool,
}

impl<R: Entity> ManagerState<R> {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            form: FormState::blank(R::schema()),
            pending_removal: None,
            focus_requests: 0,
            version: 0,
            load_generation: 0,
            upload_generation: 0,
            form_epoch: 0,
            next_notice_id: 0,
            disposed: false,
        }
    }

    /// Replace whatever notice is showing
    fn post(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.next_notice_id += 1;
        self.form.notice = Some(Notice {
            id: self.next_notice_id,
            kind,
            message: message.into(),
        });
    }

    /// Blank draft in create mode; notices are left alone
    fn reset_form(&mut self) {
        self.form.draft = FormDraft::blank(R::schema());
        self.form.editing = EditingTarget::New;
        self.form.upload = UploadState::Idle;
        self.form_epoch += 1;
    }

    fn snapshot(&self) -> ManagerSnapshot<R> {
        ManagerSnapshot {
            records: self.records.clone(),
            loading: self.loading,
            form: self.form.clone(),
            pending_removal: self.pending_removal,
            focus_requests: self.focus_requests,
            version: self.version,
        }
    }
}

/// CRUD and edit-state orchestration for one collection.
///
/// Cloning is cheap and every clone drives the same state, so a view can
/// move a handle into each async task it spawns.
pub struct ResourceManager<R: Entity> {
    gateway: Arc<dyn Gateway>,
    settings: Arc<ManagerSettings>,
    state: Arc<Mutex<ManagerState<R>>>,
    listener: Arc<Mutex<Option<Listener<R>>>>,
}

impl<R: Entity> Clone for ResourceManager<R> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            settings: Arc::clone(&self.settings),
            state: Arc::clone(&self.state),
            listener: Arc::clone(&self.listener),
        }
    }
}

impl<R: Entity> ResourceManager<R> {
    pub fn new(gateway: Arc<dyn Gateway>, settings: ManagerSettings) -> Self {
        Self {
            gateway,
            settings: Arc::new(settings),
            state: Arc::new(Mutex::new(ManagerState::new())),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        R::schema()
    }

    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// How long a notice should stay up before [`ResourceManager::expire_notice`]
    pub fn notice_ttl(&self) -> Duration {
        self.settings.notice_ttl
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_listener(&self) -> Option<Listener<R>> {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `f` to the state, then notify the listener outside the lock
    fn update<T>(&self, f: impl FnOnce(&mut ManagerState<R>) -> T) -> T {
        let listener = self.current_listener();
        let (out, snapshot) = {
            let mut state = self.lock();
            let out = f(&mut state);
            state.version += 1;
            let snapshot = match &listener {
                Some(_) if !state.disposed => Some(state.snapshot()),
                _ => None,
            };
            (out, snapshot)
        };
        if let (Some(listener), Some(snapshot)) = (listener, snapshot) {
            listener(&snapshot);
        }
        out
    }

    /// Register the single change listener, replacing any previous one
    pub fn subscribe(&self, listener: impl Fn(&ManagerSnapshot<R>) + Send + Sync + 'static) {
        *self.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(listener));
    }

    pub fn snapshot(&self) -> ManagerSnapshot<R> {
        self.lock().snapshot()
    }

    pub fn records(&self) -> Vec<R> {
        self.lock().records.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn form(&self) -> FormState {
        self.lock().form.clone()
    }

    /// Upload policy, or `None` when the collection has no image field
    pub fn uploads(&self) -> Option<UploadCoordinator> {
        let schema = R::schema();
        match (schema.upload_prefix, schema.image_field()) {
            (Some(prefix), Some(_)) => Some(UploadCoordinator::new(
                self.settings.image_bucket.clone(),
                prefix,
                self.settings.max_upload_bytes,
            )),
            _ => None,
        }
    }

    /// Mark the owning view as gone; late completions are dropped from now on
    pub fn dispose(&self) {
        let mut state = self.lock();
        state.disposed = true;
        debug!("{} manager disposed", R::schema().noun);
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    // ========================
    // Collection
    // ========================

    /// Fetch the whole collection in schema order.
    ///
    /// On failure the previously loaded records stay in place.
    pub async fn load(&self) -> CmsResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let schema = R::schema();
        let generation = self.update(|s| {
            s.load_generation += 1;
            s.loading = true;
            s.load_generation
        });
        debug!("loading {} (#{})", schema.plural, generation);

        let result = self
            .gateway
            .fetch_all(schema.table, schema.order)
            .await
            .map(decode_rows::<R>);

        self.update(|s| {
            if s.disposed {
                warn!("dropping {} load #{}: manager disposed", schema.plural, generation);
                return Ok(());
            }
            if s.load_generation != generation {
                debug!(
                    "dropping stale {} load #{} (latest #{})",
                    schema.plural, generation, s.load_generation
                );
                return Ok(());
            }
            s.loading = false;
            match result {
                Ok(records) => {
                    debug!("loaded {} {}", records.len(), schema.plural);
                    s.records = records;
                    Ok(())
                }
                Err(err) => {
                    let error = CmsError::Load(format!("Error loading {}: {}", schema.plural, err));
                    warn!("{}", error);
                    s.post(NoticeKind::Error, error.to_string());
                    Err(error)
                }
            }
        })
    }

    // ========================
    // Form
    // ========================

    /// Enter edit mode for `record`, discarding any unsaved draft
    pub fn begin_edit(&self, record: &R) -> CmsResult<()> {
        let schema = R::schema();
        let draft = FormDraft::from_record(record).map_err(|e| {
            CmsError::Validation(format!("Cannot edit this {}: {}", schema.noun, e))
        })?;
        let id = record.id();
        self.update(|s| {
            s.form.draft = draft;
            s.form.editing = EditingTarget::Existing(id);
            s.form.upload = UploadState::Idle;
            s.form_epoch += 1;
            s.focus_requests += 1;
        });
        debug!("editing {} {}", schema.noun, id);
        Ok(())
    }

    /// Blank draft in create mode
    pub fn begin_create(&self) {
        self.update(|s| s.reset_form());
    }

    /// Edit one draft field; unknown names are ignored and return false
    pub fn set_field(&self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(|s| s.form.draft.set(name, value))
    }

    /// Leave edit mode without saving and clear any error notice
    pub fn cancel(&self) {
        self.update(|s| {
            s.reset_form();
            if s.form.notice.as_ref().is_some_and(Notice::is_error) {
                s.form.notice = None;
            }
        });
    }

    /// Insert or update from the current draft, then reload.
    ///
    /// On failure the draft and editing target are kept for a retry.
    pub async fn submit(&self) -> CmsResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let schema = R::schema();
        let prepared = self.update(|s| {
            if s.form.upload.is_uploading() {
                let error = CmsError::Validation(
                    "Please wait for the image upload to finish".to_string(),
                );
                s.post(NoticeKind::Error, error.to_string());
                return Err(error);
            }
            if let Err(error) = s.form.draft.validate(schema) {
                s.post(NoticeKind::Error, error.to_string());
                return Err(error);
            }
            s.form.notice = None;
            Ok((s.form.editing, s.form.draft.to_payload(schema), s.form_epoch))
        });
        let (target, payload, epoch) = prepared?;

        let result = match target {
            EditingTarget::New => self.gateway.insert(schema.table, payload).await.map(|row| {
                info!("inserted {} {:?}", schema.noun, row.get("id"));
            }),
            EditingTarget::Existing(id) => self
                .gateway
                .update(schema.table, id, payload)
                .await
                .map(|()| info!("updated {} {}", schema.noun, id)),
        };
        let verb = if target.is_existing() { "updated" } else { "added" };
        let outcome = result.map_err(|err| {
            CmsError::Mutation(format!("Error saving {}: {}", schema.noun, err))
        });

        let applied = self.update(|s| {
            if s.disposed {
                warn!("dropping {} save result: manager disposed", schema.noun);
                return false;
            }
            match &outcome {
                Ok(()) => {
                    s.post(
                        NoticeKind::Success,
                        format!("{} {} successfully!", schema.sentence_noun(), verb),
                    );
                    // The user may already have moved on to another record.
                    if s.form_epoch == epoch {
                        s.reset_form();
                    }
                }
                Err(error) => {
                    warn!("{}", error);
                    s.post(NoticeKind::Error, error.to_string());
                }
            }
            true
        });

        if applied && outcome.is_ok() {
            // A failed reload posts its own notice; the save itself succeeded.
            let _ = self.load().await;
        }
        outcome
    }

    // ========================
    // Delete
    // ========================

    /// Ask for confirmation before deleting `id`
    pub fn request_remove(&self, id: RecordId) {
        self.update(|s| s.pending_removal = Some(id));
    }

    /// Drop a pending delete request
    pub fn dismiss_remove(&self) {
        self.update(|s| s.pending_removal = None);
    }

    /// Delete the record awaiting confirmation, then reload.
    ///
    /// Without a pending request this does nothing.
    pub async fn confirm_remove(&self) -> CmsResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let schema = R::schema();
        let Some(id) = self.update(|s| s.pending_removal.take()) else {
            return Ok(());
        };

        let outcome = self
            .gateway
            .delete(schema.table, id)
            .await
            .map_err(|err| CmsError::Mutation(format!("Error deleting {}: {}", schema.noun, err)));

        let applied = self.update(|s| {
            if s.disposed {
                warn!("dropping {} delete result: manager disposed", schema.noun);
                return false;
            }
            match &outcome {
                Ok(()) => {
                    info!("deleted {} {}", schema.noun, id);
                    if s.form.editing == EditingTarget::Existing(id) {
                        s.reset_form();
                    }
                    s.post(
                        NoticeKind::Success,
                        format!("{} deleted successfully!", schema.sentence_noun()),
                    );
                }
                Err(error) => {
                    warn!("{}", error);
                    s.post(NoticeKind::Error, error.to_string());
                }
            }
            true
        });

        if applied && outcome.is_ok() {
            let _ = self.load().await;
        }
        outcome
    }

    // ========================
    // Image upload
    // ========================

    /// Check a picked file before its bytes are read.
    ///
    /// An accepted file takes the form's upload slot right away, so submit
    /// stays locked while the bytes are read. Rejections post an error
    /// notice and leave the upload state untouched.
    pub fn select_image(&self, file_name: &str, size: u64) -> CmsResult<UploadTicket> {
        let schema = R::schema();
        let checked = match (self.uploads(), schema.image_field()) {
            (Some(coordinator), Some(field)) => coordinator
                .check_size(size)
                .map(|()| (coordinator, field.name)),
            _ => Err(CmsError::Upload(format!(
                "{} do not have an image",
                schema.title_plural
            ))),
        };
        let (coordinator, field) = match checked {
            Ok(accepted) => accepted,
            Err(error) => {
                warn!("rejected image {:?} ({} bytes): {}", file_name, size, error);
                self.update(|s| s.post(NoticeKind::Error, error.to_string()));
                return Err(error);
            }
        };

        let (generation, epoch) = self.update(|s| {
            s.upload_generation += 1;
            s.form.upload = UploadState::Uploading {
                file_name: file_name.to_string(),
            };
            (s.upload_generation, s.form_epoch)
        });
        Ok(UploadTicket {
            coordinator,
            field,
            generation,
            epoch,
        })
    }

    /// Select and upload in one step
    pub async fn upload_image(&self, file: SelectedFile) -> CmsResult<()> {
        if self.is_disposed() {
            return Ok(());
        }
        let ticket = self.select_image(&file.name, file.size())?;
        self.upload_selected(ticket, file).await
    }

    /// Upload the bytes of a selected image and stage its URL in the draft.
    ///
    /// The draft is not submitted. A newer selection or a form reset makes
    /// the ticket stale; a stale ticket uploads nothing, and a result that
    /// goes stale in flight is dropped.
    pub async fn upload_selected(&self, ticket: UploadTicket, file: SelectedFile) -> CmsResult<()> {
        if !self.holds_upload_slot(&ticket) {
            debug!("skipping superseded upload of {:?}", file.name);
            return Ok(());
        }
        let UploadTicket {
            coordinator,
            field,
            generation,
            epoch,
        } = ticket;
        let key = coordinator.key_for(&file.name);
        debug!("uploading {:?} as {}/{}", file.name, coordinator.bucket, key);

        let SelectedFile { bytes, content_type, .. } = file;
        let result = self
            .gateway
            .upload_object(&coordinator.bucket, &key, bytes, content_type.as_deref())
            .await;

        self.update(|s| {
            if s.disposed {
                warn!("dropping upload {}: manager disposed", key);
                return Ok(());
            }
            if s.upload_generation != generation || s.form_epoch != epoch {
                debug!("dropping superseded upload {}", key);
                return Ok(());
            }
            match result {
                Ok(url) => {
                    info!("uploaded {} -> {}", key, url);
                    s.form.draft.set(field, url.clone());
                    s.form.upload = UploadState::Done(url);
                    s.post(NoticeKind::Success, "Image uploaded successfully!");
                    Ok(())
                }
                Err(err) => {
                    let error = CmsError::Upload(format!("Error uploading image: {}", err));
                    warn!("{}", error);
                    s.form.upload = UploadState::Failed(err.to_string());
                    s.post(NoticeKind::Error, error.to_string());
                    Err(error)
                }
            }
        })
    }

    /// Release the upload slot when a selected file can't be read
    pub fn abandon_upload(&self, ticket: UploadTicket, reason: &str) {
        self.update(|s| {
            if s.disposed
                || s.upload_generation != ticket.generation
                || s.form_epoch != ticket.epoch
            {
                return;
            }
            let error = CmsError::Upload(format!("Error uploading image: {}", reason));
            warn!("{}", error);
            s.form.upload = UploadState::Failed(reason.to_string());
            s.post(NoticeKind::Error, error.to_string());
        });
    }

    fn holds_upload_slot(&self, ticket: &UploadTicket) -> bool {
        let state = self.lock();
        !state.disposed
            && state.upload_generation == ticket.generation
            && state.form_epoch == ticket.epoch
    }

    // ========================
    // Notices
    // ========================

    /// Clear the notice with `id` if it is still the one showing
    pub fn expire_notice(&self, id: u64) -> bool {
        self.update(|s| match &s.form.notice {
            Some(notice) if notice.id == id => {
                s.form.notice = None;
                true
            }
            _ => false,
        })
    }
}
