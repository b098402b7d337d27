use chrono::{Duration, Utc};
use reqwest::Client;

mod common;
use common::admin_helpers::{create_admin_user_and_login, create_current_season, create_fixture, set_score};
use common::utils::{get_json, spawn_app};

#[tokio::test]
async fn fixture_listing_marks_only_the_next_fixture_predictable() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let client = Client::new();

    let later = create_fixture(&app, &admin, "Derby", "Stoke", Utc::now() + Duration::hours(5)).await;
    let next = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() + Duration::hours(1)).await;
    let closing = create_fixture(&app, &admin, "QPR", "Luton", Utc::now() - Duration::hours(1)).await;

    let (status, body) = get_json(&client, &format!("{}/fixtures", app.address)).await;
    assert_eq!(200, status);
    let fixtures = body["data"].as_array().expect("fixtures");
    assert_eq!(fixtures.len(), 3);
    // Ordered by kickoff
    assert_eq!(fixtures[0]["id"], closing.to_string());
    assert_eq!(fixtures[1]["id"], next.to_string());
    assert_eq!(fixtures[2]["id"], later.to_string());

    assert_eq!(fixtures[0]["can_predict"], false);
    assert_eq!(fixtures[1]["can_predict"], true);
    assert_eq!(fixtures[2]["can_predict"], false);
    assert_eq!(fixtures[1]["predictions_count"], 0);
    assert!(fixtures[1]["deadline"].is_string());

    let (status, body) = get_json(&client, &format!("{}/fixtures/next", app.address)).await;
    assert_eq!(200, status);
    assert_eq!(body["data"]["id"], next.to_string());
    assert_eq!(body["data"]["home_team"], "Leeds");

    let (_, body) = get_json(&client, &format!("{}/fixtures/upcoming?limit=1", app.address)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["id"], next.to_string());
}

#[tokio::test]
async fn recent_results_list_finished_fixtures_newest_first() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let client = Client::new();

    let older = create_fixture(&app, &admin, "Leeds", "Hull", Utc::now() - Duration::days(7)).await;
    let newer = create_fixture(&app, &admin, "Derby", "Stoke", Utc::now() - Duration::days(1)).await;
    set_score(&app, &admin, older, 2, 2).await;
    set_score(&app, &admin, newer, 0, 1).await;

    let (status, body) = get_json(&client, &format!("{}/fixtures/recent", app.address)).await;
    assert_eq!(200, status);
    let results = body["data"].as_array().expect("results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], newer.to_string());
    assert_eq!(results[0]["status"], "finished");
    assert_eq!(results[0]["away_score"], 1);

    let (status, body) = get_json(&client, &format!("{}/fixtures/{}", app.address, older)).await;
    assert_eq!(200, status);
    assert_eq!(body["data"]["home_score"], 2);
    assert_eq!(body["data"]["can_predict"], false);
}

#[tokio::test]
async fn missing_fixtures_return_404() {
    let app = spawn_app().await;
    let admin = create_admin_user_and_login(&app).await;
    create_current_season(&app, &admin).await;
    let client = Client::new();

    let (status, _) = get_json(&client, &format!("{}/fixtures/next", app.address)).await;
    assert_eq!(404, status);

    let (status, _) = get_json(&client, &format!("{}/fixtures/{}", app.address, uuid::Uuid::new_v4())).await;
    assert_eq!(404, status);
}
