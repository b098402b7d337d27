use chrono::{Duration, Utc};
use reqwest::{Client, Method};
use serde_json::{json, Value};
use uuid::Uuid;

mod common;
use common::admin_helpers::{create_admin_user_and_login, create_current_season, create_fixture, move_kickoff, predict, set_score};
use common::utils::{
    create_verified_user_and_login, get_json, login, make_authenticated_request, spawn_app_with, TestApp, TestUser,
    TEST_PASSWORD,
};

async fn call(app: &TestApp, user: &TestUser, method: Method, path: &str, body: Option<Value>) -> reqwest::Response {
    make_authenticated_request(&Client::new(), method, &format!("{}{}", app.address, path), &user.token, body).await
}

#[tokio::test]
async fn me_returns_profile_and_current_season_stats() {
    let app = spawn_app_with(|_| {}).await;
    let admin = create_admin_user_and_login(&app).await;
    let season_id = create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &user, fixture, 1, 0).await;
    set_score(&app, &admin, fixture, 1, 0).await;

    let response = make_authenticated_request(
        &Client::new(),
        Method::GET,
        &format!("{}/users/me", app.address),
        &user.token,
        None,
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    let me = &body["data"];
    assert_eq!(me["username"], user.username.as_str());
    assert_eq!(me["email_verified"], true);
    assert_eq!(me["role"], "user");
    assert_eq!(me["stats"]["season_id"], season_id.to_string());
    assert_eq!(me["stats"]["total_points"], 3);
    assert_eq!(me["stats"]["position"], 1);
}

#[tokio::test]
async fn public_profile_hides_private_fields() {
    let app = spawn_app_with(|_| {}).await;
    let user = create_verified_user_and_login(&app).await;
    let client = Client::new();

    let (status, body) = get_json(&client, &format!("{}/users/{}", app.address, user.username)).await;
    assert_eq!(200, status);
    assert_eq!(body["data"]["username"], user.username.as_str());
    assert!(body["data"].get("email").is_none());
    assert!(body["data"]["stats"].is_null());

    let (status, _) = get_json(&client, &format!("{}/users/nobody_at_all", app.address)).await;
    assert_eq!(404, status);
}

#[tokio::test]
async fn user_predictions_only_show_closed_fixtures() {
    let app = spawn_app_with(|settings| settings.game.next_fixture_only = false).await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let user = create_verified_user_and_login(&app).await;

    let closed = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    let open = create_fixture(&app, &admin, "Derby", "Stoke", Utc::now() + Duration::hours(2)).await;
    predict(&app, &user, closed, 2, 2).await;
    predict(&app, &user, open, 0, 1).await;
    move_kickoff(&app, closed, Utc::now() - Duration::minutes(10)).await;

    let (status, body) = get_json(
        &Client::new(),
        &format!("{}/users/{}/predictions", app.address, user.username),
    )
    .await;
    assert_eq!(200, status);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["fixture_id"], closed.to_string());
}

#[tokio::test]
async fn huge_page_of_user_predictions_is_empty() {
    let app = spawn_app_with(|_| {}).await;
    let user = create_verified_user_and_login(&app).await;

    let (status, body) = get_json(
        &Client::new(),
        &format!("{}/users/{}/predictions?page={}", app.address, user.username, i64::MAX),
    )
    .await;
    assert_eq!(200, status);
    assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn profile_update_changes_username_and_resets_email_verification() {
    let app = spawn_app_with(|_| {}).await;
    let user = create_verified_user_and_login(&app).await;
    let other = create_verified_user_and_login(&app).await;

    let new_name = format!("re{}", &Uuid::new_v4().simple().to_string()[..10]);
    let response = call(
        &app,
        &user,
        Method::PUT,
        "/users/me",
        Some(json!({ "username": new_name, "email": format!("{}@example.org", new_name) })),
    )
    .await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["username"], new_name.as_str());
    assert_eq!(body["data"]["email_verified"], false);

    let pending: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM email_verifications WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count tokens");
    assert_eq!(pending, 1);

    let response = call(&app, &user, Method::PUT, "/users/me", Some(json!({ "username": other.username }))).await;
    assert_eq!(409, response.status().as_u16());

    let response = call(
        &app,
        &user,
        Method::PUT,
        "/users/me",
        Some(json!({ "email": format!("{}@EXAMPLE.com", other.username) })),
    )
    .await;
    assert_eq!(409, response.status().as_u16());

    let response = call(&app, &user, Method::PUT, "/users/me", Some(json!({ "username": "x!" }))).await;
    assert_eq!(422, response.status().as_u16());

    let response = call(&app, &user, Method::PUT, "/users/me", Some(json!({}))).await;
    assert_eq!(400, response.status().as_u16());

    let (status, _) = get_json(&Client::new(), &format!("{}/users/{}", app.address, new_name)).await;
    assert_eq!(200, status);
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let app = spawn_app_with(|_| {}).await;
    let user = create_verified_user_and_login(&app).await;
    let new_password = "N3w!Passw0rd";

    let response = call(
        &app,
        &user,
        Method::POST,
        "/users/me/change-password",
        Some(json!({ "current_password": "Wr0ng!Pass", "new_password": new_password })),
    )
    .await;
    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Current password is incorrect");

    let response = call(
        &app,
        &user,
        Method::POST,
        "/users/me/change-password",
        Some(json!({ "current_password": TEST_PASSWORD, "new_password": "weak" })),
    )
    .await;
    assert_eq!(422, response.status().as_u16());

    let response = call(
        &app,
        &user,
        Method::POST,
        "/users/me/change-password",
        Some(json!({ "current_password": TEST_PASSWORD, "new_password": new_password })),
    )
    .await;
    assert_eq!(200, response.status().as_u16());

    assert_eq!(401, login(&app.address, &user.username).await.status().as_u16());
    let response = Client::new()
        .post(&format!("{}/auth/login", app.address))
        .json(&json!({ "username": user.username, "password": new_password }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn account_deletion_hands_over_leagues_and_reranks_the_season() {
    let app = spawn_app_with(|_| {}).await;
    let admin = create_admin_user_and_login(&app).await;
    let season_id = create_current_season(&app, &admin).await;
    let leaving = create_verified_user_and_login(&app).await;
    let staying = create_verified_user_and_login(&app).await;

    let fixture = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    predict(&app, &leaving, fixture, 1, 0).await;
    predict(&app, &staying, fixture, 2, 0).await;
    set_score(&app, &admin, fixture, 1, 0).await;

    let response = call(&app, &leaving, Method::POST, "/mini-leagues/create", Some(json!({ "name": "Shared" }))).await;
    assert_eq!(201, response.status().as_u16());
    let shared: Value = response.json().await.expect("Failed to parse response");
    let shared_id = Uuid::parse_str(shared["data"]["id"].as_str().expect("league id")).expect("league id is not a uuid");
    let code = shared["data"]["invite_code"].as_str().expect("invite code").to_string();
    let response = call(&app, &staying, Method::POST, &format!("/mini-leagues/join/{}", code), None).await;
    assert_eq!(200, response.status().as_u16());
    let response = call(&app, &leaving, Method::POST, "/mini-leagues/create", Some(json!({ "name": "Solo" }))).await;
    assert_eq!(201, response.status().as_u16());

    let response = call(&app, &leaving, Method::GET, "/users/me/deletion-preview", None).await;
    assert_eq!(200, response.status().as_u16());
    let preview: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(preview["data"]["predictions"], 1);
    assert_eq!(preview["data"]["user_stats"], 1);
    assert_eq!(preview["data"]["mini_league_memberships"], 2);
    let leagues = preview["data"]["created_leagues"].as_array().expect("created leagues");
    assert_eq!(leagues.len(), 2);
    assert_eq!(leagues[0]["name"], "Shared");
    assert_eq!(leagues[0]["will_be_deleted"], false);
    assert_eq!(leagues[1]["will_be_deleted"], true);

    let response = call(&app, &leaving, Method::DELETE, "/users/me", Some(json!({ "confirmation": "delete", "password": TEST_PASSWORD }))).await;
    assert_eq!(400, response.status().as_u16());
    let response = call(&app, &leaving, Method::DELETE, "/users/me", Some(json!({ "confirmation": "DELETE" }))).await;
    assert_eq!(400, response.status().as_u16());
    let response = call(&app, &leaving, Method::DELETE, "/users/me", Some(json!({ "confirmation": "DELETE", "password": "Wr0ng!Pass" }))).await;
    assert_eq!(401, response.status().as_u16());

    let response = call(&app, &leaving, Method::DELETE, "/users/me", Some(json!({ "confirmation": "DELETE", "password": TEST_PASSWORD }))).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["predictions"], 1);
    assert_eq!(body["data"]["mini_leagues_transferred"], 1);
    assert_eq!(body["data"]["mini_leagues_deleted"], 1);

    assert_eq!(401, login(&app.address, &leaving.username).await.status().as_u16());

    let (owner, is_admin): (Uuid, bool) = sqlx::query_as(
        r#"
        SELECT l.created_by, m.is_admin FROM mini_leagues l
        JOIN mini_league_members m ON m.mini_league_id = l.id AND m.user_id = l.created_by
        WHERE l.id = $1
        "#,
    )
    .bind(shared_id)
    .fetch_one(&app.db_pool)
    .await
    .expect("Shared league should survive");
    assert_eq!(owner, staying.user_id);
    assert!(is_admin);

    let leagues: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM mini_leagues")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count leagues");
    assert_eq!(leagues, 1);

    let position: Option<i32> = sqlx::query_scalar("SELECT position FROM user_stats WHERE user_id = $1 AND season_id = $2")
        .bind(staying.user_id)
        .bind(season_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch position");
    assert_eq!(position, Some(1));
}
