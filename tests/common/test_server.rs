use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinHandle;

use storekeep::auth::{hash_password, issue_token};
use storekeep::config::ServerConfig;
use storekeep::server::{AppState, create_router};
use storekeep::store::{DataStore, SqliteStore};
use storekeep::types::{AccessLevel, User, UserProfile};

pub const ADMIN_NAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const MAX_PAGE_SIZE: i64 = 100;

/// A server bound to an ephemeral port inside the test process.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub admin_token: String,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_page_size: MAX_PAGE_SIZE,
            ..ServerConfig::default()
        };

        let store = SqliteStore::new(config.db_path()).expect("open store");
        store.initialize().expect("initialize store");

        let admin = User {
            id: 0,
            name: Some(ADMIN_NAME.to_string()),
            password: Some(hash_password(ADMIN_PASSWORD).expect("hash password")),
            access_level: AccessLevel::Admin,
        };
        let admin_id = store
            .create_user(&admin, &UserProfile::new(0))
            .expect("create admin");
        let (_, admin_token) = issue_token(&store, admin_id, None).expect("issue admin token");

        let store = Arc::new(store);
        let state = Arc::new(AppState::new(store.clone(), config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let app = create_router(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://{addr}"),
            admin_token,
            store,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("send GET")
    }

    pub async fn get_json(&self, path: &str, token: &str) -> Value {
        let resp = self.get(path, token).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.json().await.expect("parse JSON")
    }

    pub async fn post(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("send POST")
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("send PUT")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("send DELETE")
    }

    /// POSTs a JSON body expecting 201 and returns the created entity.
    pub async fn create(&self, path: &str, token: &str, body: Value) -> Value {
        let resp = self.post(path, token, &body).await;
        assert_eq!(resp.status(), StatusCode::CREATED, "POST {path}");
        resp.json().await.expect("parse JSON")
    }

    /// Registers, confirms and logs in a regular user, returning (user id, token).
    pub async fn login_new_user(&self, name: &str) -> (i64, String) {
        let password = format!("{name}-password");
        let creds = json!({ "name": name, "password": password });

        let resp = self
            .client
            .post(self.url("/api/users/register"))
            .json(&creds)
            .send()
            .await
            .expect("register");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let registered: Value = resp.json().await.expect("parse register");
        let code = registered["code"].as_str().expect("code").to_string();

        let resp = self
            .client
            .post(self.url(&format!("/api/users/register/confirm/{code}")))
            .send()
            .await
            .expect("confirm");
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = self
            .client
            .post(self.url("/api/users/login"))
            .json(&creds)
            .send()
            .await
            .expect("login");
        assert_eq!(resp.status(), StatusCode::OK);
        let login: Value = resp.json().await.expect("parse login");

        (
            login["user"]["id"].as_i64().expect("user id"),
            login["token"].as_str().expect("token").to_string(),
        )
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
