use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Method, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::utils::{create_verified_user_and_login, make_authenticated_request, TestApp, TestUser};

/// Create a verified user, promote them to admin in the database and log in again.
pub async fn create_admin_user_and_login(app: &TestApp) -> TestUser {
    let user = create_verified_user_and_login(app).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
        .bind(user.user_id)
        .execute(&app.db_pool)
        .await
        .expect("Failed to promote user to admin");

    // Fresh token carrying the admin role
    let response = Client::new()
        .post(&format!("{}/auth/login", app.address))
        .json(&json!({
            "username": user.username,
            "password": crate::common::utils::TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();

    TestUser { token, ..user }
}

/// Create a season through the admin API and make it current.
pub async fn create_current_season(app: &TestApp, admin: &TestUser) -> Uuid {
    let client = Client::new();
    let now = Utc::now();
    let response = make_authenticated_request(
        &client,
        Method::POST,
        &format!("{}/admin/seasons", app.address),
        &admin.token,
        Some(json!({
            "name": format!("Season {}", &Uuid::new_v4().simple().to_string()[..8]),
            "start_date": now - Duration::days(30),
            "end_date": now + Duration::days(300)
        })),
    )
    .await;
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse season response");
    let season_id = body["data"]["id"].as_str().expect("No season id").to_string();

    let response = make_authenticated_request(
        &client,
        Method::PUT,
        &format!("{}/admin/seasons/{}/activate", app.address, season_id),
        &admin.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());

    Uuid::parse_str(&season_id).expect("Season id is not a uuid")
}

pub async fn create_fixture(
    app: &TestApp,
    admin: &TestUser,
    home: &str,
    away: &str,
    kickoff: DateTime<Utc>,
) -> Uuid {
    let response = make_authenticated_request(
        &Client::new(),
        Method::POST,
        &format!("{}/admin/fixtures", app.address),
        &admin.token,
        Some(json!({
            "home_team": home,
            "away_team": away,
            "competition": "championship",
            "kickoff_time": kickoff
        })),
    )
    .await;
    let status = response.status().as_u16();
    if status != 201 {
        let text = response.text().await.expect("Failed to get response text");
        panic!("Expected 201, got {}: {}", status, text);
    }
    let body: Value = response.json().await.expect("Failed to parse fixture response");
    Uuid::parse_str(body["data"]["id"].as_str().expect("No fixture id")).expect("Fixture id is not a uuid")
}

pub async fn set_score(app: &TestApp, admin: &TestUser, fixture_id: Uuid, home: i32, away: i32) -> Response {
    make_authenticated_request(
        &Client::new(),
        Method::PUT,
        &format!("{}/admin/fixtures/{}/score", app.address, fixture_id),
        &admin.token,
        Some(json!({ "home_score": home, "away_score": away })),
    )
    .await
}

pub async fn predict(app: &TestApp, user: &TestUser, fixture_id: Uuid, home: i32, away: i32) -> Response {
    make_authenticated_request(
        &Client::new(),
        Method::POST,
        &format!("{}/predictions", app.address),
        &user.token,
        Some(json!({
            "fixture_id": fixture_id,
            "home_prediction": home,
            "away_prediction": away
        })),
    )
    .await
}

/// Move a fixture's kickoff into the past so its predictions become public.
pub async fn move_kickoff(app: &TestApp, fixture_id: Uuid, kickoff: DateTime<Utc>) {
    sqlx::query("UPDATE fixtures SET kickoff_time = $2 WHERE id = $1")
        .bind(fixture_id)
        .bind(kickoff)
        .execute(&app.db_pool)
        .await
        .expect("Failed to move kickoff");
}
