//! Offline showcase content
//!
//! Without a configured backend the app runs on an in-memory store; these
//! rows give the public pages something to show.

use serde_json::{json, Value};
use tastebook_core::{MemoryGateway, Row};

const CUISINES: &[(&str, &str, &str)] = &[
    ("Italian", "Classic pasta, pizza, and Mediterranean flavors", "🇮🇹"),
    ("Asian", "From sushi to curry, explore Eastern delights", "🥢"),
    ("Mexican", "Vibrant flavors and traditional dishes", "🇲🇽"),
    ("Mediterranean", "Healthy and delicious coastal cuisine", "🫒"),
    ("Indian", "Rich spices and aromatic curries", "🇮🇳"),
    ("French", "Elegant cooking and refined techniques", "🇫🇷"),
];

/// category, title, description, cook time, servings
const RECIPES: &[(&str, &str, &str, &str, i64)] = &[
    ("Italian", "Authentic Pizza Margherita", "Traditional Neapolitan pizza with fresh mozzarella and basil", "30 min", 4),
    ("Japanese", "Homemade Sushi Rolls", "Fresh sushi with salmon, avocado, and cucumber", "45 min", 2),
    ("Mexican", "Spicy Chicken Tacos", "Authentic street-style tacos with homemade salsa", "25 min", 4),
    ("Indian", "Butter Chicken Curry", "Creamy tomato-based curry with tender chicken", "50 min", 6),
    ("Mediterranean", "Greek Salad Bowl", "Fresh vegetables with feta and olives", "15 min", 2),
    ("Thai", "Pad Thai Noodles", "Sweet and tangy stir-fried rice noodles", "35 min", 3),
];

/// date, title, excerpt
const POSTS: &[(&str, &str, &str)] = &[
    ("2025-11-01", "Essential Spices for Your Global Kitchen", "Discover the must-have spices that will transform your cooking and bring authentic flavors to your dishes."),
    ("2025-10-28", "The Art of Pasta Making", "Learn the traditional techniques for creating perfect homemade pasta from scratch."),
    ("2025-10-25", "Street Food Around the World", "A culinary journey through the best street food destinations and their iconic dishes."),
];

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

/// Fill an empty store. Rows go in oldest first so the newest-first order
/// matches the lists above.
pub fn seed(gateway: &MemoryGateway) {
    for (name, description, flag) in CUISINES.iter().rev() {
        gateway.seed(
            "cuisines",
            row(json!({ "name": name, "description": description, "flag_emoji": flag })),
        );
    }
    for (category, title, description, cook_time, servings) in RECIPES.iter().rev() {
        gateway.seed(
            "recipes",
            row(json!({
                "category": category,
                "title": title,
                "description": description,
                "cook_time": cook_time,
                "servings": servings,
            })),
        );
    }
    for (date, title, excerpt) in POSTS {
        gateway.seed(
            "blog_posts",
            row(json!({ "date": date, "title": title, "excerpt": excerpt, "author": "Admin" })),
        );
    }
}
