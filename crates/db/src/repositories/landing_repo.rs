//! Repository for the landing page builder: pages, sections, components.

use std::collections::HashMap;

use onboard_core::types::DbId;
use sqlx::PgPool;

use super::ordering::{reorder_children, ReorderOutcome};
use crate::models::landing::{
    CreateComponent, CreateLandingPage, CreateSection, LandingComponent, LandingPage,
    LandingPageTree, LandingSection, SectionWithComponents, UpdateComponent, UpdateLandingPage,
    UpdateSection,
};

const PAGE_COLUMNS: &str = "id, title, slug, is_active, created_at, updated_at";

const SECTION_COLUMNS: &str =
    "id, page_id, section_type, title, content, order_index, is_visible, created_at, updated_at";

const COMPONENT_COLUMNS: &str =
    "id, section_id, component_type, content, order_index, created_at, updated_at";

pub struct LandingRepo;

impl LandingRepo {
    // -----------------------------------------------------------------------
    // Pages
    // -----------------------------------------------------------------------

    /// Create an inactive page. A taken slug violates `uq_landing_pages_slug`.
    pub async fn create_page(
        pool: &PgPool,
        input: &CreateLandingPage,
    ) -> Result<LandingPage, sqlx::Error> {
        let query = format!(
            "INSERT INTO landing_pages (title, slug) VALUES ($1, $2) RETURNING {PAGE_COLUMNS}"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(input.title.trim())
            .bind(&input.slug)
            .fetch_one(pool)
            .await
    }

    pub async fn list_pages(pool: &PgPool) -> Result<Vec<LandingPage>, sqlx::Error> {
        let query = format!(
            "SELECT {PAGE_COLUMNS} FROM landing_pages ORDER BY is_active DESC, updated_at DESC"
        );
        sqlx::query_as::<_, LandingPage>(&query).fetch_all(pool).await
    }

    pub async fn find_page(pool: &PgPool, id: DbId) -> Result<Option<LandingPage>, sqlx::Error> {
        let query = format!("SELECT {PAGE_COLUMNS} FROM landing_pages WHERE id = $1");
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_page(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLandingPage,
    ) -> Result<Option<LandingPage>, sqlx::Error> {
        let query = format!(
            "UPDATE landing_pages SET
                title = COALESCE($2, title),
                slug = COALESCE($3, slug)
             WHERE id = $1
             RETURNING {PAGE_COLUMNS}"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.slug)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_page(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM landing_pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make `id` the only active page.
    ///
    /// Runs in one transaction: every other page is deactivated before the
    /// target is activated, so the single-active index is never violated.
    /// Repeating the call is a no-op. Returns `None` if the page is missing.
    pub async fn set_active(pool: &PgPool, id: DbId) -> Result<Option<LandingPage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM landing_pages WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        sqlx::query("UPDATE landing_pages SET is_active = false WHERE is_active AND id <> $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "UPDATE landing_pages SET is_active = true WHERE id = $1 RETURNING {PAGE_COLUMNS}"
        );
        let page = sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(page))
    }

    /// Take a page offline. Afterwards no page may be active.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<Option<LandingPage>, sqlx::Error> {
        let query = format!(
            "UPDATE landing_pages SET is_active = false WHERE id = $1 RETURNING {PAGE_COLUMNS}"
        );
        sqlx::query_as::<_, LandingPage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Sections
    // -----------------------------------------------------------------------

    /// Append a section at the end of the page.
    pub async fn create_section(
        pool: &PgPool,
        page_id: DbId,
        input: &CreateSection,
    ) -> Result<LandingSection, sqlx::Error> {
        let query = format!(
            "INSERT INTO landing_sections (page_id, section_type, title, content, order_index, is_visible)
             VALUES ($1, $2, $3, $4,
                     (SELECT COALESCE(MAX(order_index) + 1, 0) FROM landing_sections WHERE page_id = $1),
                     $5)
             RETURNING {SECTION_COLUMNS}"
        );
        sqlx::query_as::<_, LandingSection>(&query)
            .bind(page_id)
            .bind(&input.section_type)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_visible)
            .fetch_one(pool)
            .await
    }

    pub async fn find_section(
        pool: &PgPool,
        page_id: DbId,
        section_id: DbId,
    ) -> Result<Option<LandingSection>, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM landing_sections WHERE id = $2 AND page_id = $1"
        );
        sqlx::query_as::<_, LandingSection>(&query)
            .bind(page_id)
            .bind(section_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_section(
        pool: &PgPool,
        page_id: DbId,
        section_id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<LandingSection>, sqlx::Error> {
        let query = format!(
            "UPDATE landing_sections SET
                section_type = COALESCE($3, section_type),
                title = COALESCE($4, title),
                content = COALESCE($5, content),
                is_visible = COALESCE($6, is_visible)
             WHERE id = $2 AND page_id = $1
             RETURNING {SECTION_COLUMNS}"
        );
        sqlx::query_as::<_, LandingSection>(&query)
            .bind(page_id)
            .bind(section_id)
            .bind(&input.section_type)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_visible)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_section(
        pool: &PgPool,
        page_id: DbId,
        section_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM landing_sections WHERE id = $2 AND page_id = $1")
            .bind(page_id)
            .bind(section_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn reorder_sections(
        pool: &PgPool,
        page_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        reorder_children(pool, "landing_sections", "page_id", page_id, ordered_ids).await
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Append a component at the end of the section.
    pub async fn create_component(
        pool: &PgPool,
        section_id: DbId,
        input: &CreateComponent,
    ) -> Result<LandingComponent, sqlx::Error> {
        let query = format!(
            "INSERT INTO landing_components (section_id, component_type, content, order_index)
             VALUES ($1, $2, $3,
                     (SELECT COALESCE(MAX(order_index) + 1, 0) FROM landing_components WHERE section_id = $1))
             RETURNING {COMPONENT_COLUMNS}"
        );
        sqlx::query_as::<_, LandingComponent>(&query)
            .bind(section_id)
            .bind(&input.component_type)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    pub async fn update_component(
        pool: &PgPool,
        section_id: DbId,
        component_id: DbId,
        input: &UpdateComponent,
    ) -> Result<Option<LandingComponent>, sqlx::Error> {
        let query = format!(
            "UPDATE landing_components SET
                component_type = COALESCE($3, component_type),
                content = COALESCE($4, content)
             WHERE id = $2 AND section_id = $1
             RETURNING {COMPONENT_COLUMNS}"
        );
        sqlx::query_as::<_, LandingComponent>(&query)
            .bind(section_id)
            .bind(component_id)
            .bind(&input.component_type)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete_component(
        pool: &PgPool,
        section_id: DbId,
        component_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM landing_components WHERE id = $2 AND section_id = $1")
                .bind(section_id)
                .bind(component_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn reorder_components(
        pool: &PgPool,
        section_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        reorder_children(pool, "landing_components", "section_id", section_id, ordered_ids).await
    }

    // -----------------------------------------------------------------------
    // Trees
    // -----------------------------------------------------------------------

    /// The active page with its visible sections, or `None` when no page is
    /// active.
    pub async fn active_tree(pool: &PgPool) -> Result<Option<LandingPageTree>, sqlx::Error> {
        let query = format!("SELECT {PAGE_COLUMNS} FROM landing_pages WHERE is_active");
        let Some(page) = sqlx::query_as::<_, LandingPage>(&query)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };
        Self::build_tree(pool, page, true).await.map(Some)
    }

    /// Any page with every section, hidden ones included.
    pub async fn page_tree(pool: &PgPool, id: DbId) -> Result<Option<LandingPageTree>, sqlx::Error> {
        match Self::find_page(pool, id).await? {
            Some(page) => Self::build_tree(pool, page, false).await.map(Some),
            None => Ok(None),
        }
    }

    async fn build_tree(
        pool: &PgPool,
        page: LandingPage,
        visible_only: bool,
    ) -> Result<LandingPageTree, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM landing_sections
             WHERE page_id = $1 AND (is_visible OR NOT $2)
             ORDER BY order_index, id"
        );
        let sections = sqlx::query_as::<_, LandingSection>(&query)
            .bind(page.id)
            .bind(visible_only)
            .fetch_all(pool)
            .await?;

        let section_ids: Vec<DbId> = sections.iter().map(|s| s.id).collect();
        let query = format!(
            "SELECT {COMPONENT_COLUMNS} FROM landing_components
             WHERE section_id = ANY($1)
             ORDER BY order_index, id"
        );
        let components = sqlx::query_as::<_, LandingComponent>(&query)
            .bind(&section_ids)
            .fetch_all(pool)
            .await?;

        let mut by_section: HashMap<DbId, Vec<LandingComponent>> = HashMap::new();
        for component in components {
            by_section
                .entry(component.section_id)
                .or_default()
                .push(component);
        }

        let sections = sections
            .into_iter()
            .map(|section| SectionWithComponents {
                components: by_section.remove(&section.id).unwrap_or_default(),
                section,
            })
            .collect();

        Ok(LandingPageTree { page, sections })
    }
}
