//! Public Site Component
//!
//! Read-only pages built from the same managers the admin edits.

use leptos::prelude::*;
use tastebook_core::{project, Audience, CardSource};

use super::CardGrid;
use crate::context::use_app_context;
use crate::store::ManagerStore;

#[component]
pub fn PublicSite() -> impl IntoView {
    let ctx = use_app_context();

    view! {
        <div class="public-site">
            <section id="home" class="hero">
                <h1 class="hero-title">"Discover the World Through Food"</h1>
                <p class="hero-subtitle">
                    "Explore authentic recipes and culinary traditions from every corner of the globe"
                </p>
                <a href="#recipes" class="btn-primary">"Explore Recipes"</a>
            </section>
            <PublicSection anchor="cuisines" title="Popular Cuisines" store=ctx.cuisines />
            <PublicSection anchor="recipes" title="Latest Recipes" store=ctx.recipes />
            <PublicSection anchor="blog" title="Latest From The Blog" store=ctx.blog_posts />
        </div>
    }
}

#[component]
fn PublicSection<R>(
    anchor: &'static str,
    title: &'static str,
    store: ManagerStore<R>,
) -> impl IntoView
where
    R: CardSource,
{
    let list = Signal::derive(move || {
        store
            .snapshot
            .with(|s| project(&s.records, s.loading, Audience::Public))
    });

    view! {
        <section id=anchor class="public-section">
            <h2 class="section-title">{title}</h2>
            <CardGrid list=list actions=None />
        </section>
    }
}
