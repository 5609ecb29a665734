//! Integration tests for tickets and performance goals.

use onboard_core::performance::GoalChecklistItem;
use onboard_db::models::performance_goal::{CreateGoal, GoalFilter, UpdateGoal};
use onboard_db::models::ticket::{CreateTicket, TicketFilter, UpdateTicket};
use onboard_db::models::user::ProvisionUser;
use onboard_db::repositories::{PerformanceGoalRepo, TicketRepo, UserRepo};
use sqlx::PgPool;

async fn new_user(pool: &PgPool, github_id: i64) -> i64 {
    UserRepo::provision(
        pool,
        &ProvisionUser {
            github_id,
            github_username: format!("user{github_id}"),
            avatar_url: None,
            personal_email: None,
            first_name: Some("Grace".to_string()),
            last_name: Some("Hopper".to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

fn goal(user_id: i64, month_year: &str) -> CreateGoal {
    CreateGoal {
        user_id,
        month_year: month_year.to_string(),
        target_hours: 160.0,
        completed_hours: 80.0,
        target_story_points: 0.0,
        completed_story_points: 0.0,
        checklist: vec![GoalChecklistItem {
            title: "Ship feature".to_string(),
            completed: false,
        }],
        notes: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_ticket_joins_requester_and_defaults(pool: PgPool) {
    let user_id = new_user(&pool, 1).await;
    let ticket = TicketRepo::create(
        &pool,
        user_id,
        &CreateTicket {
            title: "  No VPN access ".to_string(),
            description: "Cannot connect".to_string(),
            category: "access".to_string(),
            priority: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(ticket.title, "No VPN access");
    assert_eq!(ticket.priority, "medium");
    assert_eq!(ticket.status, "open");
    assert_eq!(ticket.requester_username, "user1");
    assert_eq!(ticket.requester_first_name.as_deref(), Some("Grace"));

    let resolved = TicketRepo::update(
        &pool,
        ticket.id,
        &UpdateTicket {
            status: "resolved".to_string(),
            priority: "high".to_string(),
            resolution_notes: Some("Reset token".to_string()),
            resolved_at: Some(chrono::Utc::now()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(resolved.resolved_at.is_some());

    let open = TicketRepo::list(
        &pool,
        &TicketFilter {
            status: Some("open".to_string()),
            ..Default::default()
        },
        50,
        0,
    )
    .await
    .unwrap();
    assert!(open.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_ticket_category_blocked_by_constraint(pool: PgPool) {
    let user_id = new_user(&pool, 2).await;
    let result = TicketRepo::create(
        &pool,
        user_id,
        &CreateTicket {
            title: "x".to_string(),
            description: "y".to_string(),
            category: "plumbing".to_string(),
            priority: None,
        },
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_one_goal_per_user_and_month(pool: PgPool) {
    let user_id = new_user(&pool, 3).await;
    let created = PerformanceGoalRepo::create(&pool, &goal(user_id, "2026-10"))
        .await
        .unwrap();
    assert_eq!(created.github_username, "user3");
    assert_eq!(created.checklist[0]["title"], "Ship feature");

    let duplicate = PerformanceGoalRepo::create(&pool, &goal(user_id, "2026-10")).await;
    assert!(duplicate.is_err(), "Second goal for the same month should fail");

    PerformanceGoalRepo::create(&pool, &goal(user_id, "2026-11"))
        .await
        .unwrap();
    let october = PerformanceGoalRepo::list(
        &pool,
        &GoalFilter {
            user_id: Some(user_id),
            month_year: Some("2026-10".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(october.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_goal_partial_update(pool: PgPool) {
    let user_id = new_user(&pool, 4).await;
    let created = PerformanceGoalRepo::create(&pool, &goal(user_id, "2026-09"))
        .await
        .unwrap();

    let updated = PerformanceGoalRepo::update(
        &pool,
        created.id,
        &UpdateGoal {
            completed_hours: Some(120.0),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.completed_hours, 120.0);
    assert_eq!(updated.target_hours, 160.0);
    assert_eq!(updated.checklist, created.checklist);
}
