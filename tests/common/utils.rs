use secrecy::ExposeSecret;
use serde_json::{json, Value};
use sqlx::{PgPool, PgConnection, Connection, Executor};
use std::net::TcpListener;
use uuid::Uuid;
use once_cell::sync::Lazy;
use reqwest::{Client, Method, Response};

use scoreline_backend::run;
use scoreline_backend::config::settings::{get_config, get_jwt_settings, DatabaseSettings, Settings};
use scoreline_backend::telemetry::{get_subscriber, init_subscriber};

pub const TEST_PASSWORD: &str = "Str0ng!Pass";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

pub struct TestUser {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn the app after letting the test adjust the loaded settings.
pub async fn spawn_app_with(customize: impl FnOnce(&mut Settings)) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.database.db_name = Uuid::new_v4().to_string();
    // Each test gets its own database, so ignore any full URL from the environment
    configuration.database.db_url = None;
    // Every test request comes from 127.0.0.1
    configuration.rate_limit.login_max_attempts = 1_000;
    configuration.rate_limit.register_max_attempts = 1_000;
    customize(&mut configuration);

    let connection_pool = configure_db(&configuration.database).await;
    let jwt_settings = get_jwt_settings(&configuration);
    let server = run(
        listener,
        connection_pool.clone(),
        jwt_settings,
        configuration.game.clone(),
        configuration.rate_limit.clone(),
    )
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);
    TestApp {
        address,
        db_pool: connection_pool
    }
}

pub async fn configure_db(config: &DatabaseSettings) -> PgPool {
    // Create database
    let mut connection = PgConnection::connect(
            &config.connection_string_without_db()
        )
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(format!(r#"CREATE DATABASE "{}";"#, config.db_name).as_str())
        .await
        .expect("Failed to create database.");

    // Migrate database
    let connection_pool = PgPool::connect(config.connection_string().expose_secret())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database");

    connection_pool
}

/// Short unique username that passes validation.
pub fn unique_username(prefix: &str) -> String {
    format!("{}{}", prefix, &Uuid::new_v4().simple().to_string()[..10])
}

pub async fn register_user(app_address: &str, username: &str) -> Response {
    Client::new()
        .post(&format!("{}/auth/register", app_address))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to register user.")
}

pub async fn login(app_address: &str, username: &str) -> Response {
    Client::new()
        .post(&format!("{}/auth/login", app_address))
        .json(&json!({
            "username": username,
            "password": TEST_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to execute login request.")
}

async fn login_token(app_address: &str, username: &str) -> String {
    let response = login(app_address, username).await;
    assert_eq!(200, response.status().as_u16(), "login failed for {}", username);
    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a user without verifying the email address and log in.
pub async fn create_test_user_and_login(app: &TestApp) -> TestUser {
    let username = unique_username("user");
    let response = register_user(&app.address, &username).await;
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse registration response");
    let user_id = body["data"]["user_id"]
        .as_str()
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("No user id in registration response");

    let token = login_token(&app.address, &username).await;
    TestUser { user_id, username, token }
}

/// Register, mark the email verified directly in the database, then log in.
pub async fn create_verified_user_and_login(app: &TestApp) -> TestUser {
    let user = create_test_user_and_login(app).await;
    mark_verified(app, user.user_id).await;
    let token = login_token(&app.address, &user.username).await;
    TestUser { token, ..user }
}

pub async fn mark_verified(app: &TestApp, user_id: Uuid) {
    sqlx::query("UPDATE users SET email_verified = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(&app.db_pool)
        .await
        .expect("Failed to verify user");
}

pub async fn make_authenticated_request(
    client: &Client,
    method: Method,
    url: &str,
    token: &str,
    body: Option<Value>,
) -> Response {
    let mut request = client
        .request(method, url)
        .header("Authorization", format!("Bearer {}", token));
    if let Some(body) = body {
        request = request.json(&body);
    }
    request.send().await.expect("Failed to execute request.")
}

pub async fn get_json(client: &Client, url: &str) -> (u16, Value) {
    let response = client.get(url).send().await.expect("Failed to execute request.");
    let status = response.status().as_u16();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}
