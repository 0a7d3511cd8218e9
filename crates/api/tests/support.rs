#![allow(dead_code)]

use dingbridge_domain::{
    AppCredential, Config, DatabaseConfig, DingApp, DingTalkConfig, NewDingApp,
};
use dingbridge_lib::AppContext;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Application context backed by a temporary database and a mock DingTalk.
pub struct TestContext {
    pub ctx: AppContext,
    pub server: MockServer,
    /// Keep temporary directory alive for the lifetime of the context.
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temporary directory");
        let server = MockServer::start().await;

        let config = Config {
            database: DatabaseConfig {
                path: temp_dir.path().join("data/dingbridge.db").to_string_lossy().into_owned(),
                pool_size: 4,
            },
            dingtalk: DingTalkConfig {
                oapi_base_url: server.uri(),
                api_base_url: server.uri(),
                timeout_seconds: 5,
            },
        };
        let ctx = AppContext::new_with_config(config).expect("failed to build app context");

        Self { ctx, server, _temp_dir: temp_dir }
    }

    pub fn register_app(&self, sync_with_user: bool) -> DingApp {
        dingbridge_lib::add_app(&self.ctx, new_app(sync_with_user)).expect("app should be created")
    }

    pub async fn mount_token(&self) {
        Mock::given(method("GET"))
            .and(path("/gettoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "access_token": "tok",
                "expires_in": 7200
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == endpoint)
            .count()
    }
}

pub fn new_app(sync_with_user: bool) -> NewDingApp {
    NewDingApp {
        name: "Attendance".into(),
        description: Some("clock-in reminders".into()),
        credential: AppCredential::new("dingkey", "dingsecret", "1000"),
        company_id: 7,
        sync_with_user,
        callback_token: None,
        encoding_aes_key: None,
    }
}
