use chrono::{Duration, Utc};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::admin_helpers::{create_admin_user_and_login, create_current_season, create_fixture, predict, set_score};
use common::utils::{create_verified_user_and_login, make_authenticated_request, spawn_app};

#[tokio::test]
async fn admin_routes_require_an_admin_token() {
    let app = spawn_app().await;
    let client = Client::new();
    let user = create_verified_user_and_login(&app).await;

    let response = client
        .get(&format!("{}/admin/stats", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let response = make_authenticated_request(
        &client,
        Method::GET,
        &format!("{}/admin/stats", app.address),
        &user.token,
        None,
    )
    .await;
    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn create_fixture_needs_a_season() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;

    let response = make_authenticated_request(
        &Client::new(),
        Method::POST,
        &format!("{}/admin/fixtures", app.address),
        &admin.token,
        Some(json!({
            "home_team": "Leeds",
            "away_team": "Hull",
            "competition": "championship",
            "kickoff_time": Utc::now() + Duration::days(1)
        })),
    )
    .await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn fixture_details_are_frozen_once_predicted() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;
    let client = Client::new();

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(2)).await;
    let url = format!("{}/admin/fixtures/{}", app.address, fixture);

    let response = make_authenticated_request(&client, Method::PUT, &url, &admin.token, Some(json!({"round": "Matchday 1"}))).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["round"], "Matchday 1");

    predict(&app, &user, fixture, 1, 0).await;

    let response = make_authenticated_request(&client, Method::PUT, &url, &admin.token, Some(json!({"home_team": "Leeds United"}))).await;
    assert_eq!(409, response.status().as_u16());

    let response = make_authenticated_request(&client, Method::PUT, &url, &admin.token, Some(json!({"status": "postponed"}))).await;
    assert_eq!(200, response.status().as_u16());

    let response = make_authenticated_request(&client, Method::PUT, &url, &admin.token, Some(json!({"status": "finished"}))).await;
    assert_eq!(400, response.status().as_u16());

    let response = make_authenticated_request(&client, Method::PUT, &url, &admin.token, Some(json!({}))).await;
    assert_eq!(400, response.status().as_u16());

    let response = make_authenticated_request(&client, Method::DELETE, &url, &admin.token, None).await;
    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn unpredicted_fixture_can_be_deleted() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let client = Client::new();

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(2)).await;
    let url = format!("{}/admin/fixtures/{}", app.address, fixture);

    assert_eq!(200, make_authenticated_request(&client, Method::DELETE, &url, &admin.token, None).await.status().as_u16());
    assert_eq!(404, make_authenticated_request(&client, Method::DELETE, &url, &admin.token, None).await.status().as_u16());
}

#[tokio::test]
async fn admin_sees_predictions_before_the_deadline() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(2)).await;
    predict(&app, &user, fixture, 4, 4).await;

    let response = make_authenticated_request(
        &Client::new(),
        Method::GET,
        &format!("{}/admin/fixtures/{}/predictions", app.address, fixture),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["items"][0]["home_prediction"], 4);
}

#[tokio::test]
async fn stats_count_users_fixtures_and_predictions() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let played = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    create_fixture(&app, &admin, "Derby", "Stoke", Utc::now() + Duration::hours(5)).await;
    predict(&app, &user, played, 1, 0).await;
    set_score(&app, &admin, played, 1, 0).await;

    let response = make_authenticated_request(
        &Client::new(),
        Method::GET,
        &format!("{}/admin/stats", app.address),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let stats = &body["data"];
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_fixtures"], 2);
    assert_eq!(stats["total_predictions"], 1);
    assert_eq!(stats["upcoming_fixtures"], 1);
    assert_eq!(stats["completed_fixtures"], 1);
    assert_eq!(stats["active_users_last_7_days"], 1);
}

#[tokio::test]
async fn admins_manage_roles_but_cannot_demote_themselves() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    let user = create_verified_user_and_login(&app).await;
    let client = Client::new();

    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/make-admin", app.address, user.user_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["role"], "admin");

    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/remove-admin", app.address, user.user_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());

    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/remove-admin", app.address, admin.user_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(400, response.status().as_u16());

    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/make-admin", app.address, uuid::Uuid::new_v4()),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn delete_waits_for_a_prediction_being_written() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(2)).await;

    // A prediction transaction that has locked the fixture but not committed yet
    let mut tx = app.db_pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("SELECT id FROM fixtures WHERE id = $1 FOR SHARE")
        .bind(fixture)
        .execute(&mut *tx)
        .await
        .expect("Failed to lock fixture");
    sqlx::query(
        "INSERT INTO predictions (id, user_id, fixture_id, home_prediction, away_prediction) VALUES ($1, $2, $3, 2, 1)",
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(fixture)
    .execute(&mut *tx)
    .await
    .expect("Failed to insert prediction");

    let url = format!("{}/admin/fixtures/{}", app.address, fixture);
    let token = admin.token.clone();
    let delete = tokio::spawn(async move {
        make_authenticated_request(&Client::new(), Method::DELETE, &url, &token, None)
            .await
            .status()
            .as_u16()
    });

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    tx.commit().await.expect("Failed to commit prediction");

    assert_eq!(409, delete.await.expect("Delete task panicked"));
    let predictions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions WHERE fixture_id = $1")
        .bind(fixture)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count predictions");
    assert_eq!(predictions, 1);
}

#[tokio::test]
async fn status_change_cannot_overwrite_a_score_being_recorded() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(2)).await;

    // A scoring transaction holding the fixture row
    let mut tx = app.db_pool.begin().await.expect("Failed to begin transaction");
    sqlx::query("SELECT id FROM fixtures WHERE id = $1 FOR UPDATE")
        .bind(fixture)
        .execute(&mut *tx)
        .await
        .expect("Failed to lock fixture");
    sqlx::query("UPDATE fixtures SET status = 'finished', home_score = 1, away_score = 0 WHERE id = $1")
        .bind(fixture)
        .execute(&mut *tx)
        .await
        .expect("Failed to finish fixture");

    let url = format!("{}/admin/fixtures/{}", app.address, fixture);
    let token = admin.token.clone();
    let update = tokio::spawn(async move {
        make_authenticated_request(&Client::new(), Method::PUT, &url, &token, Some(json!({"status": "postponed"})))
            .await
            .status()
            .as_u16()
    });

    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    tx.commit().await.expect("Failed to commit score");

    assert_eq!(400, update.await.expect("Update task panicked"));
    let status: String = sqlx::query_scalar("SELECT status::text FROM fixtures WHERE id = $1")
        .bind(fixture)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch fixture");
    assert_eq!(status, "finished");
}

#[tokio::test]
async fn admin_access_follows_the_stored_role_not_the_token() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    let other = create_admin_user_and_login(&app).await;
    let user = create_verified_user_and_login(&app).await;
    let client = Client::new();
    let stats_url = format!("{}/admin/stats", app.address);

    // Promotion takes effect for the token the user already holds
    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/make-admin", app.address, user.user_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let response = make_authenticated_request(&client, Method::GET, &stats_url, &user.token, None).await;
    assert_eq!(200, response.status().as_u16());

    // Demotion locks out the token issued while `other` was an admin
    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/users/{}/remove-admin", app.address, other.user_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let response = make_authenticated_request(&client, Method::GET, &stats_url, &other.token, None).await;
    assert_eq!(403, response.status().as_u16());
    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/recalculate-all-points", app.address),
        &other.token,
        None,
    )
    .await;
    assert_eq!(403, response.status().as_u16());

    // Suspension does the same for a still-promoted admin
    sqlx::query("UPDATE users SET status = 'suspended' WHERE id = $1")
        .bind(user.user_id)
        .execute(&app.db_pool)
        .await
        .expect("Failed to suspend user");
    let response = make_authenticated_request(&client, Method::GET, &stats_url, &user.token, None).await;
    assert_eq!(403, response.status().as_u16());
}
