//! Aggregate counts for the owner dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardSummary;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Compute every headline count in a single round-trip.
    pub async fn summary(pool: &PgPool) -> Result<DashboardSummary, sqlx::Error> {
        sqlx::query_as::<_, DashboardSummary>(
            "SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM users WHERE company_email_verified) AS verified_users,
                (SELECT COUNT(*) FROM users WHERE onboarding_completed_at IS NOT NULL)
                    AS onboarded_users,
                (SELECT COUNT(*) FROM tickets WHERE status IN ('open', 'in_progress'))
                    AS open_tickets,
                (SELECT COUNT(*) FROM events WHERE is_published AND starts_at >= NOW())
                    AS upcoming_events,
                (SELECT COUNT(*) FROM store_products WHERE is_active) AS active_products,
                (SELECT COUNT(*) FROM checklist_assignments a
                  WHERE a.is_required
                    AND (SELECT COUNT(*) FROM checklist_item_progress p
                          WHERE p.assignment_id = a.id AND p.completed)
                      < (SELECT COUNT(*) FROM dynamic_checklist_items i
                          WHERE i.checklist_id = a.checklist_id)) AS pending_assignments",
        )
        .fetch_one(pool)
        .await
    }
}
