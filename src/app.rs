//! Tastebook Frontend App
//!
//! Sidebar with the public site and one admin panel per collection.

use leptos::prelude::*;
use log::warn;
use tastebook_core::CmsConfig;

use crate::components::{PublicSite, ResourcePanel};
use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Site,
    Cuisines,
    Recipes,
    BlogPosts,
}

const TABS: &[(Tab, &str, &str)] = &[
    (Tab::Site, "🌐", "View Site"),
    (Tab::Cuisines, "🍽️", "Cuisines"),
    (Tab::Recipes, "📖", "Recipes"),
    (Tab::BlogPosts, "✍️", "Blog Posts"),
];

#[component]
pub fn App() -> impl IntoView {
    let config = CmsConfig::from_build_env();
    if let Err(err) = config.validate() {
        warn!("invalid build configuration: {}", err);
    }

    // Provide context to all children
    let ctx = AppContext::new(&config);
    provide_context(ctx);
    ctx.watch_notices();
    on_cleanup(move || ctx.dispose());

    let (active, set_active) = signal(Tab::Site);

    // Load every collection on mount
    Effect::new(move |_| ctx.load_all());

    view! {
        <div class="app-layout">
            <nav class="admin-sidebar">
                <h1 class="brand">"World Cuisine"</h1>
                <ul>
                    {TABS
                        .iter()
                        .map(|&(tab, icon, label)| {
                            view! {
                                <li class=move || if active.get() == tab { "active" } else { "" }>
                                    <button on:click=move |_| set_active.set(tab)>
                                        <span class="icon">{icon}</span>
                                        {label}
                                    </button>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </nav>

            <main class="admin-main">
                <Show when=move || ctx.offline>
                    <p class="offline-banner">
                        "No backend configured. Changes are kept in memory until the page reloads."
                    </p>
                </Show>
                {move || match active.get() {
                    Tab::Site => view! { <PublicSite /> }.into_any(),
                    Tab::Cuisines => view! { <ResourcePanel store=ctx.cuisines /> }.into_any(),
                    Tab::Recipes => view! { <ResourcePanel store=ctx.recipes /> }.into_any(),
                    Tab::BlogPosts => view! { <ResourcePanel store=ctx.blog_posts /> }.into_any(),
                }}
            </main>
        </div>
    }
}
