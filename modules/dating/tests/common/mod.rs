//! Shared harness: boots the dating module through its real lifecycle
//! (init -> migrate -> register_rest) on in-memory SQLite, behind the ingress stack.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use api_ingress::ApiIngress;
use axum::{body::Body, http::Request, response::Response, Router};
use chrono::Utc;
use modkit::{ConfigProvider, DbModule, Module, ModuleCtxBuilder, RestfulModule};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use dating::contract::User;
use dating::domain::ports::{PasswordHasher, SessionIssuer};
use dating::domain::repo::UsersRepository;
use dating::infra::auth::{BcryptHasher, JwtSessions};
use dating::infra::storage::sea_orm_repo::SeaOrmUsersRepository;
use dating::Dating;

pub const SECRET: &str = "integration-test-secret";
pub const INITIAL_PASSWORD: &str = "initial-password";

struct MapConfig(HashMap<String, Value>);

impl ConfigProvider for MapConfig {
    fn get_module_config(&self, module_name: &str) -> Option<&Value> {
        self.0.get(module_name)
    }
}

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub home: TempDir,
}

pub fn default_config() -> Value {
    json!({ "jwt_secret": SECRET, "bcrypt_cost": 4 })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(default_config()).await
}

pub async fn spawn_app_with(dating_cfg: Value) -> TestApp {
    let home = tempfile::tempdir().expect("tempdir");
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");

    let provider = MapConfig(HashMap::from([("dating".to_string(), dating_cfg)]));
    let ctx = ModuleCtxBuilder::new(home.path())
        .with_db(db.clone())
        .with_config_provider(Arc::new(provider))
        .build()
        .for_module("dating");

    let module = Dating::default();
    module.init(&ctx).await.expect("init");
    module.migrate(&db).await.expect("migrate");
    let routes = module.register_rest(&ctx, Router::new()).expect("routes");

    TestApp {
        router: ApiIngress::default().build_router(routes),
        db,
        home,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.expect("request")
    }

    pub fn users(&self) -> SeaOrmUsersRepository<DatabaseConnection> {
        SeaOrmUsersRepository::new(self.db.clone())
    }

    /// Inserts a registered member with `INITIAL_PASSWORD`.
    pub async fn seed_user(&self, id: &str) -> User {
        let hash = BcryptHasher::new(4)
            .unwrap()
            .hash(INITIAL_PASSWORD)
            .await
            .unwrap();
        let now = Utc::now();
        let user = User {
            id: id.to_string(),
            name: format!("Member {id}"),
            bio: String::new(),
            date_of_birth: None,
            password_hash: hash,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        };
        self.users().insert(user.clone()).await.unwrap();
        user
    }

    pub async fn stored_user(&self, id: &str) -> User {
        self.users().find_by_id(id).await.unwrap().expect("user exists")
    }
}

pub fn token_for(user_id: &str) -> String {
    JwtSessions::new(SECRET.as_bytes(), Duration::from_secs(3600))
        .unwrap()
        .issue(user_id)
        .unwrap()
        .value
}

pub fn json_request(method: &str, uri: &str, user: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(id) = user {
        builder = builder.header("cookie", format!("token={}", token_for(id)));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = user {
        builder = builder.header("authorization", format!("Bearer {}", token_for(id)));
    }
    builder.body(Body::empty()).unwrap()
}

pub const BOUNDARY: &str = "----amora-test-boundary";

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_request(uri: &str, user: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("cookie", format!("token={}", token_for(user)))
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("json body")
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
