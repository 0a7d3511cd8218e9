#![allow(dead_code)]

use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use dingbridge_core::{AppRepository, SyncOrchestrator};
use dingbridge_domain::{AppCredential, DingApp, DingTalkConfig, NewDingApp};
use dingbridge_infra::{
    DbManager, DepartmentHierarchySync, DingTalkClientFactory, NotificationBus,
    SqliteAppRepository, SqliteSessionProvider,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub async fn register_app(&self, sync_with_user: bool) -> DingApp {
        SqliteAppRepository::new(self.manager.clone())
            .create(NewDingApp {
                name: "Attendance".into(),
                description: None,
                credential: AppCredential::new("dingkey", "dingsecret", "1000"),
                company_id: 7,
                sync_with_user,
                callback_token: None,
                encoding_aes_key: None,
            })
            .await
            .expect("app should be created")
    }

    pub fn count(&self, table: &str) -> i64 {
        let conn = self.manager.get_connection().expect("connection should be available");
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count query should succeed")
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrator wired to real adapters against `server`.
pub fn orchestrator(db: &TestDatabase, server: &MockServer, bus: &NotificationBus) -> SyncOrchestrator {
    orchestrator_at(db, &server.uri(), bus)
}

/// Orchestrator whose DingTalk hosts both live at `base_url`.
pub fn orchestrator_at(db: &TestDatabase, base_url: &str, bus: &NotificationBus) -> SyncOrchestrator {
    let config = DingTalkConfig {
        oapi_base_url: base_url.to_string(),
        api_base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    SyncOrchestrator::new(
        Arc::new(SqliteSessionProvider::new(db.manager.clone())),
        Arc::new(DingTalkClientFactory::new(&config)),
        Arc::new(DepartmentHierarchySync::new()),
        Arc::new(bus.clone()),
    )
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "access_token": "tok",
            "expires_in": 7200
        })))
        .mount(server)
        .await;
}

pub async fn mount_whole_org_scope(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/scopes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "auth_user_field": ["name"],
            "auth_org_scopes": {"authed_dept": [1], "authed_user": []}
        })))
        .mount(server)
        .await;
}

/// Root with children 10 and 20, each without sub-departments.
pub async fn mount_two_departments(server: &MockServer) {
    mount_listsub(
        server,
        1,
        json!([
            {"dept_id": 10, "name": "R&D", "parent_id": 1},
            {"dept_id": 20, "name": "Sales", "parent_id": 1}
        ]),
    )
    .await;
    mount_listsub(server, 10, json!([])).await;
    mount_listsub(server, 20, json!([])).await;
}

pub async fn mount_listsub(server: &MockServer, dept_id: i64, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/topapi/v2/department/listsub"))
        .and(body_json(json!({"dept_id": dept_id})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "result": result
        })))
        .mount(server)
        .await;
}

/// Every department has the same single member.
pub async fn mount_single_member(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/topapi/user/listsimple"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 0,
            "errmsg": "ok",
            "result": {"has_more": false, "list": [{"userid": "manager01", "name": "Zhang San"}]}
        })))
        .mount(server)
        .await;
}

/// Address of a server that reads one request and hangs up without replying.
pub fn hang_up_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut buf = [0_u8; 4096];
            let _ = stream.read(&mut buf);
        }
    });
    format!("http://{addr}")
}

/// Join a detached run without blocking the test runtime.
pub async fn join(handle: dingbridge_core::DetachedHandle) {
    tokio::time::timeout(
        Duration::from_secs(30),
        tokio::task::spawn_blocking(move || handle.join()),
    )
    .await
    .expect("sync run should finish")
    .expect("join task should not panic")
    .expect("detached unit should exit cleanly");
}
