//! Manager Stores
//!
//! Bridges a core `ResourceManager` into Leptos. Each manager change is
//! pushed into an `RwSignal` that components read; operations go through
//! the manager handle kept alongside it.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use tastebook_core::{Entity, ManagerSnapshot, ResourceManager};

/// Reactive view of one resource manager
pub struct ManagerStore<R: Entity> {
    manager: StoredValue<ResourceManager<R>>,
    pub snapshot: RwSignal<ManagerSnapshot<R>>,
}

impl<R: Entity> Clone for ManagerStore<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Entity> Copy for ManagerStore<R> {}

impl<R: Entity> ManagerStore<R> {
    pub fn new(manager: ResourceManager<R>) -> Self {
        let snapshot = RwSignal::new(manager.snapshot());
        manager.subscribe(move |next| {
            // The signal is gone once the owning scope is cleaned up.
            let _ = snapshot.try_set(next.clone());
        });
        Self {
            manager: StoredValue::new(manager),
            snapshot,
        }
    }

    /// Handle for calling operations; clones share state
    pub fn manager(&self) -> ResourceManager<R> {
        self.manager.get_value()
    }

    /// Run an async manager operation without blocking the view
    pub fn spawn<F, Fut>(&self, op: F)
    where
        F: FnOnce(ResourceManager<R>) -> Fut,
        Fut: std::future::Future<Output = ()> + 'static,
    {
        spawn_local(op(self.manager()));
    }

    pub fn load(&self) {
        self.spawn(|manager| async move {
            let _ = manager.load().await;
        });
    }
}

/// Clear each notice after the manager's TTL. A newer notice posted in the
/// meantime keeps its own timer.
pub fn expire_notices<R: Entity>(store: ManagerStore<R>) {
    let notice_id = Memo::new(move |_| {
        store
            .snapshot
            .with(|s| s.form.notice.as_ref().map(|notice| notice.id))
    });

    Effect::new(move |_| {
        let Some(id) = notice_id.get() else {
            return;
        };
        let manager = store.manager();
        let ttl_ms = u32::try_from(manager.notice_ttl().as_millis()).unwrap_or(u32::MAX);
        spawn_local(async move {
            TimeoutFuture::new(ttl_ms).await;
            manager.expire_notice(id);
        });
    });
}

/// Scroll the form into view each time the manager enters edit mode
pub fn scroll_to_form_on_edit<R: Entity>(store: ManagerStore<R>, form_id: String) {
    let focus_requests = Memo::new(move |_| store.snapshot.with(|s| s.focus_requests));

    Effect::new(move |previous: Option<u64>| {
        let current = focus_requests.get();
        if previous.is_some_and(|p| p != current) {
            if let Some(form) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(&form_id))
            {
                form.scroll_into_view();
            }
        }
        current
    });
}
