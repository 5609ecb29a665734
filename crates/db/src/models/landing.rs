//! Landing page builder models: pages, sections, components.

use onboard_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `landing_pages` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct LandingPage {
    pub id: DbId,
    pub title: String,
    pub slug: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateLandingPage {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateLandingPage {
    pub title: Option<String>,
    pub slug: Option<String>,
}

/// A row from the `landing_sections` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct LandingSection {
    pub id: DbId,
    pub page_id: DbId,
    pub section_type: String,
    pub title: Option<String>,
    pub content: serde_json::Value,
    pub order_index: i32,
    pub is_visible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateSection {
    pub section_type: String,
    pub title: Option<String>,
    #[serde(default = "empty_object")]
    pub content: serde_json::Value,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSection {
    pub section_type: Option<String>,
    pub title: Option<String>,
    pub content: Option<serde_json::Value>,
    pub is_visible: Option<bool>,
}

/// A row from the `landing_components` table.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[ts(export)]
pub struct LandingComponent {
    pub id: DbId,
    pub section_id: DbId,
    pub component_type: String,
    pub content: serde_json::Value,
    pub order_index: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Deserialize)]
pub struct CreateComponent {
    pub component_type: String,
    #[serde(default = "empty_object")]
    pub content: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateComponent {
    pub component_type: Option<String>,
    pub content: Option<serde_json::Value>,
}

/// A section with its ordered components, as rendered publicly.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SectionWithComponents {
    #[serde(flatten)]
    #[ts(flatten)]
    pub section: LandingSection,
    pub components: Vec<LandingComponent>,
}

/// A full page tree.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct LandingPageTree {
    #[serde(flatten)]
    #[ts(flatten)]
    pub page: LandingPage,
    pub sections: Vec<SectionWithComponents>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

fn default_visible() -> bool {
    true
}
