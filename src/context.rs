//! Application Context
//!
//! One manager store per resource, provided via the Leptos Context API.

use std::sync::Arc;

use leptos::prelude::*;
use log::{info, warn};
use tastebook_core::{
    BlogPost, CmsConfig, Cuisine, Gateway, ManagerSettings, MemoryGateway, Recipe,
    ResourceManager, RestGateway,
};

use crate::showcase;
use crate::store::{expire_notices, ManagerStore};

#[derive(Clone, Copy)]
pub struct AppContext {
    pub cuisines: ManagerStore<Cuisine>,
    pub recipes: ManagerStore<Recipe>,
    pub blog_posts: ManagerStore<BlogPost>,
    /// No backend configured; edits live in memory until reload
    pub offline: bool,
}

impl AppContext {
    pub fn new(config: &CmsConfig) -> Self {
        let offline = !config.has_backend();
        let gateway: Arc<dyn Gateway> = if offline {
            warn!("TASTEBOOK_API_URL not set; using an in-memory store");
            let memory = MemoryGateway::new();
            showcase::seed(&memory);
            Arc::new(memory)
        } else {
            info!("using backend at {}", config.api_url);
            Arc::new(RestGateway::from_config(config))
        };
        let settings = ManagerSettings::from(config);

        Self {
            cuisines: ManagerStore::new(ResourceManager::new(gateway.clone(), settings.clone())),
            recipes: ManagerStore::new(ResourceManager::new(gateway.clone(), settings.clone())),
            blog_posts: ManagerStore::new(ResourceManager::new(gateway, settings)),
            offline,
        }
    }

    /// Arm notice timers for every manager
    pub fn watch_notices(&self) {
        expire_notices(self.cuisines);
        expire_notices(self.recipes);
        expire_notices(self.blog_posts);
    }

    pub fn load_all(&self) {
        self.cuisines.load();
        self.recipes.load();
        self.blog_posts.load();
    }

    /// Stop applying late results once the app is torn down
    pub fn dispose(&self) {
        self.cuisines.manager().dispose();
        self.recipes.manager().dispose();
        self.blog_posts.manager().dispose();
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}
