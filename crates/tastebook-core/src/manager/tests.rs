use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use super::*;
use crate::domain::{BlogPost, CmsError, Cuisine, GatewayResult, Recipe, RecordId, SortOrder};
use crate::gateway::{Gateway, MemoryGateway, Operation, Row};

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn cuisine_row(name: &str) -> Row {
    row(json!({ "name": name, "description": format!("{} food", name) }))
}

fn recipe_row(id: i64, title: &str) -> Row {
    row(json!({
        "id": id,
        "title": title,
        "category": "Italian",
        "cook_time": "30 mins",
        "servings": 4,
        "description": "Crisp and simple",
        "image_url": null,
    }))
}

fn settings() -> ManagerSettings {
    ManagerSettings::default()
}

fn manager<R: crate::domain::Entity>(gateway: Arc<dyn Gateway>) -> ResourceManager<R> {
    ResourceManager::new(gateway, settings())
}

fn notice_text<R>(snapshot: &ManagerSnapshot<R>) -> Option<String> {
    snapshot.form.notice.as_ref().map(|n| n.message.clone())
}

/// Gateway whose fetches and uploads can be held until released.
///
/// A held fetch reads its rows up front, so it returns the data as it was
/// when the call was issued.
struct GatedGateway {
    inner: MemoryGateway,
    fetch_gates: Mutex<VecDeque<Arc<Notify>>>,
    upload_gates: Mutex<VecDeque<Arc<Notify>>>,
}

impl GatedGateway {
    fn new() -> Self {
        Self {
            inner: MemoryGateway::new(),
            fetch_gates: Mutex::new(VecDeque::new()),
            upload_gates: Mutex::new(VecDeque::new()),
        }
    }

    fn hold_next_fetch(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.fetch_gates.lock().unwrap().push_back(gate.clone());
        gate
    }

    fn hold_next_upload(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.upload_gates.lock().unwrap().push_back(gate.clone());
        gate
    }
}

#[async_trait]
impl Gateway for GatedGateway {
    async fn fetch_all(&self, table: &str, order: SortOrder) -> GatewayResult<Vec<Row>> {
        let gate = self.fetch_gates.lock().unwrap().pop_front();
        let result = self.inner.fetch_all(table, order).await;
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn insert(&self, table: &str, row: Row) -> GatewayResult<Row> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: &str, id: RecordId, patch: Row) -> GatewayResult<()> {
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: &str, id: RecordId) -> GatewayResult<()> {
        self.inner.delete(table, id).await
    }

    async fn upload_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> GatewayResult<String> {
        let gate = self.upload_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.inner.upload_object(bucket, key, bytes, content_type).await
    }
}

// ========================
// Load
// ========================

#[tokio::test]
async fn test_load_empty_collection() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway);
    cuisines.load().await.unwrap();

    let snapshot = cuisines.snapshot();
    assert!(snapshot.records.is_empty());
    assert!(!snapshot.loading);
    assert!(snapshot.form.notice.is_none());
}

#[tokio::test]
async fn test_load_orders_newest_first() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("cuisines", cuisine_row("Italian"));
    gateway.seed("cuisines", cuisine_row("Mexican"));
    let cuisines = manager::<Cuisine>(gateway);
    cuisines.load().await.unwrap();

    let names: Vec<String> = cuisines.records().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Mexican", "Italian"]);
}

#[tokio::test]
async fn test_blog_posts_ordered_by_date() {
    let gateway = Arc::new(MemoryGateway::new());
    for (title, date) in [("Old", "2024-01-05"), ("New", "2024-03-01"), ("Mid", "2024-02-10")] {
        gateway.seed(
            "blog_posts",
            row(json!({ "title": title, "excerpt": "x", "date": date, "author": "Admin" })),
        );
    }
    let posts = manager::<BlogPost>(gateway);
    posts.load().await.unwrap();

    let titles: Vec<String> = posts.records().into_iter().map(|p| p.title).collect();
    assert_eq!(titles, vec!["New", "Mid", "Old"]);
}

#[tokio::test]
async fn test_failed_load_keeps_previous_records() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("cuisines", cuisine_row("Italian"));
    let cuisines = manager::<Cuisine>(gateway.clone());
    cuisines.load().await.unwrap();

    gateway.fail_next(Operation::FetchAll, "connection reset");
    let err = cuisines.load().await.unwrap_err();
    assert_eq!(err, CmsError::Load("Error loading cuisines: connection reset".to_string()));

    let snapshot = cuisines.snapshot();
    assert_eq!(snapshot.records.len(), 1);
    assert!(!snapshot.loading);
    assert_eq!(
        notice_text(&snapshot).as_deref(),
        Some("Error loading cuisines: connection reset")
    );
}

#[tokio::test]
async fn test_stale_load_is_discarded() {
    let gateway = Arc::new(GatedGateway::new());
    gateway.inner.seed("cuisines", cuisine_row("Italian"));
    let cuisines = manager::<Cuisine>(gateway.clone());

    let gate = gateway.hold_next_fetch();
    let slow = cuisines.clone();
    let first = tokio::spawn(async move { slow.load().await });
    tokio::task::yield_now().await;
    assert!(cuisines.is_loading());

    gateway.inner.seed("cuisines", cuisine_row("Mexican"));
    cuisines.load().await.unwrap();
    assert_eq!(cuisines.records().len(), 2);

    gate.notify_one();
    first.await.unwrap().unwrap();

    let snapshot = cuisines.snapshot();
    assert_eq!(snapshot.records.len(), 2);
    assert!(!snapshot.loading);
}

// ========================
// Submit
// ========================

#[tokio::test]
async fn test_create_cuisine_then_reload() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway.clone());
    cuisines.load().await.unwrap();

    cuisines.begin_create();
    assert!(cuisines.set_field("name", "Peruvian"));
    cuisines.set_field("description", "Andean and coastal fusion");
    cuisines.set_field("flag_emoji", "🇵🇪");
    cuisines.submit().await.unwrap();

    let snapshot = cuisines.snapshot();
    assert_eq!(snapshot.records.len(), 1);
    let peruvian = &snapshot.records[0];
    assert_eq!(peruvian.name, "Peruvian");
    assert_eq!(peruvian.description, "Andean and coastal fusion");
    assert_eq!(peruvian.flag_emoji.as_deref(), Some("🇵🇪"));
    assert!(peruvian.id.0 > 0);

    assert_eq!(snapshot.form.editing, EditingTarget::New);
    assert_eq!(snapshot.form.draft.get("name"), "");
    assert_eq!(notice_text(&snapshot).as_deref(), Some("Cuisine added successfully!"));
    assert_eq!(gateway.call_count(Operation::Insert), 1);
    assert_eq!(gateway.call_count(Operation::FetchAll), 2);
}

#[tokio::test]
async fn test_missing_required_fields_never_reach_backend() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway.clone());

    cuisines.set_field("name", "Thai");
    let err = cuisines.submit().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Validation("Please fill in the required fields: Description".to_string())
    );
    assert_eq!(gateway.call_count(Operation::Insert), 0);
    assert_eq!(cuisines.form().draft.get("name"), "Thai");
    assert!(cuisines.form().notice.is_some_and(|n| n.is_error()));
}

#[tokio::test]
async fn test_flag_emoji_limit() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway.clone());
    cuisines.set_field("name", "Flags");
    cuisines.set_field("description", "Too many");
    cuisines.set_field("flag_emoji", "abcdefghijk");

    let err = cuisines.submit().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Validation("Flag Emoji must be at most 10 characters".to_string())
    );
    assert_eq!(gateway.call_count(Operation::Insert), 0);
}

#[tokio::test]
async fn test_non_numeric_servings_submit_as_zero() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("recipes", recipe_row(7, "Margherita"));
    let recipes = manager::<Recipe>(gateway.clone());
    recipes.load().await.unwrap();

    let record = recipes.snapshot().find(RecordId(7)).cloned().unwrap();
    recipes.begin_edit(&record).unwrap();
    assert_eq!(recipes.form().draft.get("servings"), "4");
    recipes.set_field("servings", "abc");
    recipes.submit().await.unwrap();

    let stored = gateway.rows("recipes");
    assert_eq!(stored[0].get("servings"), Some(&json!(0)));
    assert_eq!(recipes.records()[0].servings, 0);
    assert_eq!(
        notice_text(&recipes.snapshot()).as_deref(),
        Some("Recipe updated successfully!")
    );
}

#[tokio::test]
async fn test_failed_save_keeps_draft_for_retry() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("recipes", recipe_row(3, "Ramen"));
    let recipes = manager::<Recipe>(gateway.clone());
    recipes.load().await.unwrap();
    let record = recipes.records().remove(0);
    recipes.begin_edit(&record).unwrap();
    recipes.set_field("title", "Tonkotsu Ramen");

    gateway.fail_next(Operation::Update, "permission denied");
    let err = recipes.submit().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Mutation("Error saving recipe: permission denied".to_string())
    );

    let form = recipes.form();
    assert_eq!(form.editing, EditingTarget::Existing(RecordId(3)));
    assert_eq!(form.draft.get("title"), "Tonkotsu Ramen");
    assert_eq!(recipes.records()[0].title, "Ramen");

    recipes.submit().await.unwrap();
    assert_eq!(recipes.records()[0].title, "Tonkotsu Ramen");
}

#[tokio::test]
async fn test_blog_post_defaults_and_sentence_case_notice() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let draft = posts.form().draft;
    assert_eq!(draft.get("author"), "Admin");
    assert_eq!(draft.get("date").len(), 10);

    posts.set_field("title", "Knife skills");
    posts.set_field("excerpt", "Start here.");
    posts.submit().await.unwrap();

    let stored = gateway.rows("blog_posts");
    assert_eq!(stored[0].get("content"), Some(&Value::Null));
    assert_eq!(stored[0].get("image_url"), Some(&Value::Null));
    assert_eq!(
        notice_text(&posts.snapshot()).as_deref(),
        Some("Blog post added successfully!")
    );
}

#[tokio::test]
async fn test_unreadable_blog_date_never_reaches_backend() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed(
        "blog_posts",
        row(json!({"title": "Spice basics", "excerpt": "x", "date": "2024-01-05", "author": "Admin"})),
    );
    let posts = manager::<BlogPost>(gateway.clone());
    posts.load().await.unwrap();

    posts.set_field("title", "Market day");
    posts.set_field("excerpt", "What to buy");
    posts.set_field("date", "next tuesday");
    let err = posts.submit().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Validation("Date must be a date like 2025-11-01".to_string())
    );
    assert_eq!(gateway.call_count(Operation::Insert), 0);
    assert_eq!(posts.form().draft.get("date"), "next tuesday");

    posts.load().await.unwrap();
    assert_eq!(posts.records().len(), 1);
}

#[tokio::test]
async fn test_malformed_stored_row_does_not_hide_collection() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed(
        "blog_posts",
        row(json!({"title": "Spice basics", "excerpt": "x", "date": "2024-01-05", "author": "Admin"})),
    );
    gateway.seed(
        "blog_posts",
        row(json!({"title": "Broken", "excerpt": "x", "date": "next tuesday", "author": "Admin"})),
    );
    let posts = manager::<BlogPost>(gateway);

    posts.load().await.unwrap();
    let records = posts.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Spice basics");
    assert!(posts.form().notice.is_none());
}

// ========================
// Editing target
// ========================

#[tokio::test]
async fn test_switching_edit_target_discards_draft() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("recipes", recipe_row(1, "Pizza"));
    gateway.seed("recipes", recipe_row(2, "Pasta"));
    let recipes = manager::<Recipe>(gateway.clone());
    recipes.load().await.unwrap();
    let snapshot = recipes.snapshot();
    let a = snapshot.find(RecordId(1)).cloned().unwrap();
    let b = snapshot.find(RecordId(2)).cloned().unwrap();

    recipes.begin_edit(&a).unwrap();
    recipes.set_field("title", "Pizza Bianca");
    recipes.begin_edit(&b).unwrap();

    let snapshot = recipes.snapshot();
    assert!(snapshot.is_editing(RecordId(2)));
    assert_eq!(snapshot.form.draft.get("title"), "Pasta");
    assert_eq!(snapshot.focus_requests, 2);
    assert_eq!(gateway.call_count(Operation::Update), 0);
}

#[tokio::test]
async fn test_cancel_restores_blank_create_form() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("cuisines", cuisine_row("Greek"));
    let cuisines = manager::<Cuisine>(gateway);
    cuisines.load().await.unwrap();
    let initial = cuisines.form();

    let greek = cuisines.records().remove(0);
    cuisines.begin_edit(&greek).unwrap();
    cuisines.set_field("description", "");
    let _ = cuisines.submit().await;
    assert!(cuisines.form().notice.is_some());

    cuisines.cancel();
    assert_eq!(cuisines.form(), initial);
}

#[tokio::test]
async fn test_cancel_keeps_success_notice() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway);
    cuisines.set_field("name", "Korean");
    cuisines.set_field("description", "Fermented and bright");
    cuisines.submit().await.unwrap();

    cuisines.cancel();
    assert_eq!(
        notice_text(&cuisines.snapshot()).as_deref(),
        Some("Cuisine added successfully!")
    );
}

#[tokio::test]
async fn test_unknown_field_is_ignored() {
    let cuisines = manager::<Cuisine>(Arc::new(MemoryGateway::new()));
    assert!(!cuisines.set_field("servings", "4"));
    assert_eq!(cuisines.form().draft.get("servings"), "");
}

// ========================
// Delete
// ========================

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let gateway = Arc::new(MemoryGateway::new());
    let id = gateway.seed("cuisines", cuisine_row("French"));
    let cuisines = manager::<Cuisine>(gateway.clone());
    cuisines.load().await.unwrap();

    cuisines.request_remove(id);
    assert_eq!(cuisines.snapshot().pending_removal, Some(id));
    cuisines.dismiss_remove();
    cuisines.confirm_remove().await.unwrap();
    assert_eq!(gateway.call_count(Operation::Delete), 0);
    assert_eq!(cuisines.records().len(), 1);

    cuisines.request_remove(id);
    cuisines.confirm_remove().await.unwrap();
    let snapshot = cuisines.snapshot();
    assert!(snapshot.records.is_empty());
    assert!(snapshot.pending_removal.is_none());
    assert_eq!(notice_text(&snapshot).as_deref(), Some("Cuisine deleted successfully!"));
}

#[tokio::test]
async fn test_delete_failure_keeps_record() {
    let gateway = Arc::new(MemoryGateway::new());
    let id = gateway.seed("cuisines", cuisine_row("French"));
    let cuisines = manager::<Cuisine>(gateway.clone());
    cuisines.load().await.unwrap();

    gateway.fail_next(Operation::Delete, "foreign key violation");
    cuisines.request_remove(id);
    let err = cuisines.confirm_remove().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Mutation("Error deleting cuisine: foreign key violation".to_string())
    );
    assert_eq!(cuisines.records().len(), 1);
    assert_eq!(gateway.call_count(Operation::FetchAll), 1);
}

#[tokio::test]
async fn test_deleting_edited_record_resets_form() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("recipes", recipe_row(1, "Pizza"));
    gateway.seed("recipes", recipe_row(2, "Pasta"));
    let recipes = manager::<Recipe>(gateway.clone());
    recipes.load().await.unwrap();
    let blank = recipes.form().draft;

    let pizza = recipes.snapshot().find(RecordId(1)).cloned().unwrap();
    recipes.begin_edit(&pizza).unwrap();
    recipes.set_field("title", "Pizza Bianca");
    recipes.request_remove(RecordId(1));
    recipes.confirm_remove().await.unwrap();

    let form = recipes.form();
    assert_eq!(form.editing, EditingTarget::New);
    assert_eq!(form.draft, blank);
    assert_eq!(
        form.notice.map(|n| n.message).as_deref(),
        Some("Recipe deleted successfully!")
    );

    // Deleting some other record leaves an open edit alone.
    let pasta = recipes.snapshot().find(RecordId(2)).cloned().unwrap();
    recipes.begin_edit(&pasta).unwrap();
    let id = gateway.seed("recipes", recipe_row(3, "Risotto"));
    recipes.request_remove(id);
    recipes.confirm_remove().await.unwrap();
    assert_eq!(recipes.form().editing, EditingTarget::Existing(RecordId(2)));
    assert_eq!(gateway.call_count(Operation::Update), 0);
}

// ========================
// Uploads
// ========================

#[tokio::test]
async fn test_upload_sets_image_url_without_submitting() {
    let gateway = Arc::new(MemoryGateway::new());
    let recipes = manager::<Recipe>(gateway.clone());

    let file = SelectedFile::new("pizza.png", Some("image/png".to_string()), vec![1, 2, 3]);
    recipes.upload_image(file).await.unwrap();

    let form = recipes.form();
    let keys = gateway.object_keys("recipe-images");
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("recipe-"));
    assert!(keys[0].ends_with(".png"));
    let url = format!("memory://objects/recipe-images/{}", keys[0]);
    assert_eq!(form.draft.get("image_url"), url);
    assert_eq!(form.upload, UploadState::Done(url));
    assert_eq!(
        form.notice.map(|n| n.message).as_deref(),
        Some("Image uploaded successfully!")
    );
    assert_eq!(gateway.call_count(Operation::Insert), 0);
}

#[tokio::test]
async fn test_oversized_file_is_not_uploaded() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let too_big = vec![0u8; 5 * 1024 * 1024 + 1];
    let err = posts
        .upload_image(SelectedFile::new("huge.jpg", None, too_big))
        .await
        .unwrap_err();
    assert_eq!(err, CmsError::Upload("Image size should be less than 5MB".to_string()));
    assert_eq!(gateway.call_count(Operation::Upload), 0);
    assert_eq!(posts.form().upload, UploadState::Idle);
}

#[tokio::test]
async fn test_cuisines_take_no_images() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway.clone());
    assert!(cuisines.uploads().is_none());
    assert!(cuisines
        .upload_image(SelectedFile::new("flag.png", None, vec![1]))
        .await
        .is_err());
    assert_eq!(gateway.call_count(Operation::Upload), 0);
}

#[tokio::test]
async fn test_upload_failure_leaves_draft_untouched() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());
    posts.set_field("image_url", "https://cdn.example/old.png");

    gateway.fail_next(Operation::Upload, "bucket not found");
    let err = posts
        .upload_image(SelectedFile::new("new.png", None, vec![1]))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CmsError::Upload("Error uploading image: bucket not found".to_string())
    );
    let form = posts.form();
    assert_eq!(form.draft.get("image_url"), "https://cdn.example/old.png");
    assert_eq!(form.upload, UploadState::Failed("bucket not found".to_string()));
}

#[tokio::test]
async fn test_submit_blocked_while_uploading() {
    let gateway = Arc::new(GatedGateway::new());
    let recipes = manager::<Recipe>(gateway.clone());
    for (name, value) in [
        ("title", "Tacos"),
        ("category", "Mexican"),
        ("cook_time", "20 mins"),
        ("servings", "2"),
        ("description", "Street style"),
    ] {
        recipes.set_field(name, value);
    }

    let gate = gateway.hold_next_upload();
    let uploader = recipes.clone();
    let upload = tokio::spawn(async move {
        uploader
            .upload_image(SelectedFile::new("tacos.jpg", None, vec![7]))
            .await
    });
    tokio::task::yield_now().await;
    assert!(recipes.form().upload.is_uploading());
    assert!(!recipes.form().can_submit());

    let err = recipes.submit().await.unwrap_err();
    assert_eq!(
        err,
        CmsError::Validation("Please wait for the image upload to finish".to_string())
    );

    gate.notify_one();
    upload.await.unwrap().unwrap();
    recipes.submit().await.unwrap();
    let stored = gateway.inner.rows("recipes");
    assert!(stored[0]
        .get("image_url")
        .and_then(Value::as_str)
        .is_some_and(|url| url.ends_with(".jpg")));
}

#[tokio::test]
async fn test_selected_image_locks_submit_before_upload() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());
    posts.set_field("title", "Knife skills");
    posts.set_field("excerpt", "Start here.");

    let ticket = posts.select_image("board.jpg", 3).unwrap();
    let form = posts.form();
    assert_eq!(
        form.upload,
        UploadState::Uploading {
            file_name: "board.jpg".to_string()
        }
    );
    assert!(!form.can_submit());
    assert!(posts.submit().await.is_err());
    assert_eq!(gateway.call_count(Operation::Insert), 0);

    posts
        .upload_selected(ticket, SelectedFile::new("board.jpg", None, vec![1, 2, 3]))
        .await
        .unwrap();
    assert!(posts.form().can_submit());
    posts.submit().await.unwrap();
    assert_eq!(gateway.call_count(Operation::Insert), 1);
}

#[tokio::test]
async fn test_unreadable_file_releases_upload_slot() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let ticket = posts.select_image("board.jpg", 3).unwrap();
    posts.abandon_upload(ticket, "file was removed");

    let form = posts.form();
    assert_eq!(form.upload, UploadState::Failed("file was removed".to_string()));
    assert!(form.can_submit());
    assert_eq!(
        form.notice.map(|n| n.message).as_deref(),
        Some("Error uploading image: file was removed")
    );
    assert_eq!(gateway.call_count(Operation::Upload), 0);
}

#[tokio::test]
async fn test_reset_while_reading_skips_upload() {
    let gateway = Arc::new(MemoryGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let ticket = posts.select_image("board.jpg", 3).unwrap();
    posts.cancel();
    posts
        .upload_selected(ticket.clone(), SelectedFile::new("board.jpg", None, vec![1]))
        .await
        .unwrap();
    posts.abandon_upload(ticket, "too late");

    let form = posts.form();
    assert_eq!(form.upload, UploadState::Idle);
    assert_eq!(form.draft.get("image_url"), "");
    assert_eq!(gateway.call_count(Operation::Upload), 0);
}

#[tokio::test]
async fn test_latest_upload_wins() {
    let gateway = Arc::new(GatedGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let gate = gateway.hold_next_upload();
    let slow = posts.clone();
    let first = tokio::spawn(async move {
        slow.upload_image(SelectedFile::new("first.png", None, vec![1]))
            .await
    });
    tokio::task::yield_now().await;

    posts
        .upload_image(SelectedFile::new("second.gif", None, vec![2]))
        .await
        .unwrap();
    gate.notify_one();
    first.await.unwrap().unwrap();

    let form = posts.form();
    assert!(form.draft.get("image_url").ends_with(".gif"));
    assert!(matches!(form.upload, UploadState::Done(ref url) if url.ends_with(".gif")));
    assert_eq!(gateway.inner.object_keys("recipe-images").len(), 2);
}

#[tokio::test]
async fn test_form_reset_discards_late_upload() {
    let gateway = Arc::new(GatedGateway::new());
    let posts = manager::<BlogPost>(gateway.clone());

    let gate = gateway.hold_next_upload();
    let slow = posts.clone();
    let upload = tokio::spawn(async move {
        slow.upload_image(SelectedFile::new("late.png", None, vec![1]))
            .await
    });
    tokio::task::yield_now().await;

    posts.cancel();
    gate.notify_one();
    upload.await.unwrap().unwrap();

    let form = posts.form();
    assert_eq!(form.draft.get("image_url"), "");
    assert_eq!(form.upload, UploadState::Idle);
}

// ========================
// Notices, listeners, disposal
// ========================

#[tokio::test]
async fn test_expire_only_clears_matching_notice() {
    let gateway = Arc::new(MemoryGateway::new());
    let cuisines = manager::<Cuisine>(gateway);

    let _ = cuisines.submit().await;
    let first = cuisines.form().notice.unwrap();
    cuisines.set_field("name", "Thai");
    let _ = cuisines.submit().await;
    let second = cuisines.form().notice.unwrap();
    assert!(second.id > first.id);

    assert!(!cuisines.expire_notice(first.id));
    assert_eq!(cuisines.form().notice, Some(second.clone()));
    assert!(cuisines.expire_notice(second.id));
    assert!(cuisines.form().notice.is_none());
}

#[tokio::test]
async fn test_listener_sees_each_change() {
    let gateway = Arc::new(MemoryGateway::new());
    gateway.seed("cuisines", cuisine_row("Italian"));
    let cuisines = manager::<Cuisine>(gateway);

    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let calls = calls.clone();
        let seen = seen.clone();
        cuisines.subscribe(move |snapshot| {
            calls.fetch_add(1, Ordering::SeqCst);
            seen.lock().unwrap().push((snapshot.loading, snapshot.records.len()));
        });
    }
    cuisines.load().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*seen.lock().unwrap(), vec![(true, 0), (false, 1)]);
}

#[tokio::test]
async fn test_disposed_manager_ignores_late_results() {
    let gateway = Arc::new(GatedGateway::new());
    gateway.inner.seed("cuisines", cuisine_row("Italian"));
    let cuisines = manager::<Cuisine>(gateway.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = calls.clone();
        cuisines.subscribe(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        });
    }

    let gate = gateway.hold_next_fetch();
    let slow = cuisines.clone();
    let load = tokio::spawn(async move { slow.load().await });
    tokio::task::yield_now().await;
    let before = calls.load(Ordering::SeqCst);

    cuisines.dispose();
    gate.notify_one();
    load.await.unwrap().unwrap();

    assert!(cuisines.records().is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), before);

    cuisines.load().await.unwrap();
    assert_eq!(gateway.inner.call_count(Operation::FetchAll), 1);
}

#[test]
fn test_settings_from_config() {
    let config = crate::CmsConfig {
        image_bucket: "media".to_string(),
        max_upload_bytes: 1024,
        notice_ttl_ms: 1500,
        ..crate::CmsConfig::default()
    };
    let settings = ManagerSettings::from(&config);
    assert_eq!(settings.image_bucket, "media");
    assert_eq!(settings.max_upload_bytes, 1024);
    assert_eq!(settings.notice_ttl, std::time::Duration::from_millis(1500));
}
