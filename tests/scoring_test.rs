use chrono::{Duration, Utc};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::admin_helpers::{create_admin_user_and_login, create_current_season, create_fixture, predict, set_score};
use common::utils::{create_verified_user_and_login, make_authenticated_request, spawn_app, TestApp};

type StatsSnapshot = (i32, i32, i32, i32, i32, i32, f64, Option<i32>);

async fn stats_of(app: &TestApp, user_id: Uuid) -> StatsSnapshot {
    sqlx::query_as(
        r#"SELECT total_points, correct_scores, correct_results, predictions_made,
                  current_streak, best_streak, avg_points_per_game, position
           FROM user_stats WHERE user_id = $1"#,
    )
    .bind(user_id)
    .fetch_one(&app.db_pool)
    .await
    .expect("Missing stats row")
}

async fn points_of(app: &TestApp, user_id: Uuid, fixture_id: Uuid) -> Option<i32> {
    sqlx::query_scalar("SELECT points_earned FROM predictions WHERE user_id = $1 AND fixture_id = $2")
        .bind(user_id)
        .bind(fixture_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("Missing prediction")
}

async fn admin_post(app: &TestApp, token: &str, path: &str, body: Option<Value>) -> reqwest::Response {
    make_authenticated_request(
        &Client::new(),
        Method::POST,
        &format!("{}{}", app.address, path),
        token,
        body,
    )
    .await
}

#[tokio::test]
async fn score_awards_points_and_updates_standings() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let exact = create_verified_user_and_login(&app).await;
    let result = create_verified_user_and_login(&app).await;
    let miss = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &exact, fixture, 2, 1).await;
    predict(&app, &result, fixture, 3, 1).await;
    predict(&app, &miss, fixture, 1, 1).await;

    let response = set_score(&app, &admin, fixture, 2, 1).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["data"]["status"], "finished");
    assert_eq!(body["data"]["predictions_scored"], 3);
    assert_eq!(body["data"]["users_updated"], 3);

    assert_eq!(points_of(&app, exact.user_id, fixture).await, Some(3));
    assert_eq!(points_of(&app, result.user_id, fixture).await, Some(1));
    assert_eq!(points_of(&app, miss.user_id, fixture).await, Some(0));

    assert_eq!(stats_of(&app, exact.user_id).await, (3, 1, 0, 1, 1, 1, 3.0, Some(1)));
    assert_eq!(stats_of(&app, result.user_id).await, (1, 0, 1, 1, 1, 1, 1.0, Some(2)));
    assert_eq!(stats_of(&app, miss.user_id).await, (0, 0, 0, 1, 0, 0, 0.0, Some(3)));
}

#[tokio::test]
async fn correcting_a_score_rescores_predictions() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &user, fixture, 2, 1).await;

    set_score(&app, &admin, fixture, 1, 0).await;
    assert_eq!(points_of(&app, user.user_id, fixture).await, Some(1));

    set_score(&app, &admin, fixture, 2, 1).await;
    assert_eq!(points_of(&app, user.user_id, fixture).await, Some(3));
    assert_eq!(stats_of(&app, user.user_id).await.0, 3);
}

#[tokio::test]
async fn repeating_the_same_score_changes_nothing() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &user, fixture, 0, 0).await;

    set_score(&app, &admin, fixture, 0, 0).await;
    let before = stats_of(&app, user.user_id).await;

    let response = set_score(&app, &admin, fixture, 0, 0).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["changed"], false);
    assert_eq!(stats_of(&app, user.user_id).await, before);

    let journal: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fixture_score_changes WHERE fixture_id = $1")
        .bind(fixture)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count journal");
    assert_eq!(journal, 1);
}

#[tokio::test]
async fn simulate_then_undo_restores_everything() {
    let app = common::utils::spawn_app_with(|settings| settings.game.next_fixture_only = false).await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let alice = create_verified_user_and_login(&app).await;
    let bob = create_verified_user_and_login(&app).await;

    let played = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    let simulated = create_fixture(&app, &admin, "Derby", "Stoke", Utc::now() + Duration::hours(2)).await;
    predict(&app, &alice, played, 1, 0).await;
    predict(&app, &bob, played, 0, 1).await;
    predict(&app, &alice, simulated, 0, 2).await;
    predict(&app, &bob, simulated, 0, 2).await;
    set_score(&app, &admin, played, 1, 0).await;

    let alice_before = stats_of(&app, alice.user_id).await;
    let bob_before = stats_of(&app, bob.user_id).await;

    let response = admin_post(
        &app,
        &admin.token,
        &format!("/admin/test/simulate-score/{}", simulated),
        Some(json!({"home_score": 0, "away_score": 2})),
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(points_of(&app, bob.user_id, simulated).await, Some(3));
    assert_ne!(stats_of(&app, bob.user_id).await, bob_before);

    let response = admin_post(&app, &admin.token, &format!("/admin/test/undo-score/{}", simulated), None).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "scheduled");
    assert!(body["data"]["home_score"].is_null());

    assert_eq!(points_of(&app, alice.user_id, simulated).await, None);
    assert_eq!(points_of(&app, bob.user_id, simulated).await, None);
    assert_eq!(stats_of(&app, alice.user_id).await, alice_before);
    assert_eq!(stats_of(&app, bob.user_id).await, bob_before);

    // Nothing left to undo
    let response = admin_post(&app, &admin.token, &format!("/admin/test/undo-score/{}", simulated), None).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["changed"], false);
}

#[tokio::test]
async fn undo_steps_back_one_score_at_a_time() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &user, fixture, 3, 3).await;
    set_score(&app, &admin, fixture, 3, 3).await;
    set_score(&app, &admin, fixture, 1, 2).await;

    let response = admin_post(&app, &admin.token, &format!("/admin/test/undo-score/{}", fixture), None).await;
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "finished");
    assert_eq!(body["data"]["home_score"], 3);
    assert_eq!(body["data"]["away_score"], 3);
    assert_eq!(points_of(&app, user.user_id, fixture).await, Some(3));
}

#[tokio::test]
async fn scoring_a_postponed_fixture_is_rejected() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;

    let response = make_authenticated_request(
        &Client::new(),
        Method::PUT,
        &format!("{}/admin/fixtures/{}", app.address, fixture),
        &admin.token,
        Some(json!({"status": "postponed"})),
    )
    .await;
    assert_eq!(200, response.status().as_u16());

    assert_eq!(400, set_score(&app, &admin, fixture, 1, 0).await.status().as_u16());
    assert_eq!(422, set_score(&app, &admin, fixture, 21, 0).await.status().as_u16());
    assert_eq!(404, set_score(&app, &admin, Uuid::new_v4(), 1, 0).await.status().as_u16());
}

#[tokio::test]
async fn recalculate_all_points_repairs_drifted_stats() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &user, fixture, 2, 0).await;
    set_score(&app, &admin, fixture, 2, 0).await;
    let expected = stats_of(&app, user.user_id).await;

    sqlx::query("UPDATE predictions SET points_earned = 0 WHERE fixture_id = $1")
        .bind(fixture)
        .execute(&app.db_pool)
        .await
        .expect("Failed to corrupt points");
    sqlx::query("UPDATE user_stats SET total_points = 99, best_streak = 99 WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&app.db_pool)
        .await
        .expect("Failed to corrupt stats");

    let response = admin_post(&app, &admin.token, "/admin/recalculate-all-points", None).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["fixtures_rescored"], 1);
    assert_eq!(body["data"]["predictions_rescored"], 1);

    assert_eq!(points_of(&app, user.user_id, fixture).await, Some(3));
    assert_eq!(stats_of(&app, user.user_id).await, expected);
}
