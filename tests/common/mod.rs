#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use notes_auth::auth::{AuthenticationService, JwtKeys};
use notes_auth::configuration::JwtSettings;
use notes_auth::startup::run;
use notes_auth::store::InMemoryUserStore;
use serde_json::{json, Value};

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryUserStore>,
    pub keys: JwtKeys,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        valid_issuer: "https://localhost:5001".to_string(),
        valid_audience: "https://localhost:5001".to_string(),
        expires: 15,
        secret: "TestSecretKeyForJWTMustBeAtLeast32BytesLong".to_string(),
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryUserStore::new());
    let keys = JwtKeys::from_settings(&jwt_settings()).expect("Failed to build JWT keys");
    let auth = AuthenticationService::new(store.clone(), keys.clone());

    let server = run(listener, auth, None).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        keys,
        client: reqwest::Client::new(),
    }
}

pub fn registration_body(user_name: &str) -> Value {
    json!({
        "firstName": "Juan",
        "lastName": "Dela Cruz",
        "userName": user_name,
        "email": format!("{}@example.com", user_name),
        "password": "Password123!"
    })
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, user_name: &str) -> reqwest::Response {
        self.post_json("/api/authentication", &registration_body(user_name))
            .await
    }

    pub async fn login(&self, user_name: &str, password: &str) -> reqwest::Response {
        self.post_json(
            "/api/authentication/login",
            &json!({ "userName": user_name, "password": password }),
        )
        .await
    }

    /// Register `user_name` and log in, returning the token pair JSON
    pub async fn register_and_login(&self, user_name: &str) -> Value {
        assert_eq!(201, self.register(user_name).await.status().as_u16());
        let response = self.login(user_name, "Password123!").await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }
}
