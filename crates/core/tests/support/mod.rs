//! Shared test helpers for `dingbridge-core` integration tests.
//!
//! In-memory stand-ins for every orchestrator port so sync runs can be
//! observed without a database, network or notification bus.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dingbridge_core::{
    DingTalkApi, HierarchySummary, HierarchySync, NotificationChannel, RequestClientFactory,
    SessionProvider, SyncOrchestrator, SyncSession,
};
use dingbridge_domain::{
    AppCredential, AuditLogEntry, AuthScope, Department, DingApp, DingBridgeError, Employee,
    MediaUpload, NotificationMessage, OutgoingMessage, Result, TemplateSpec, UserPage,
};
use parking_lot::Mutex;

/// Committed state shared by every session of a provider.
#[derive(Debug, Default)]
pub struct Store {
    pub opened_by: Vec<String>,
    pub commits: usize,
    pub audit: Vec<AuditLogEntry>,
    pub departments: Vec<(i64, Department)>,
    pub employees: Vec<(i64, Employee)>,
}

/// Hands out sessions that buffer writes until commit.
#[derive(Default)]
pub struct MemorySessionProvider {
    pub store: Arc<Mutex<Store>>,
    failing_opens: AtomicUsize,
    fail_first_audit: AtomicBool,
}

impl MemorySessionProvider {
    /// Fail the next `count` calls to `open_session`.
    pub fn failing_opens(self, count: usize) -> Self {
        self.failing_opens.store(count, Ordering::SeqCst);
        self
    }

    /// Fail the audit append of the first session that attempts one.
    pub fn failing_first_audit(self) -> Self {
        self.fail_first_audit.store(true, Ordering::SeqCst);
        self
    }

    pub fn audit(&self) -> Vec<AuditLogEntry> {
        self.store.lock().audit.clone()
    }
}

impl SessionProvider for MemorySessionProvider {
    fn open_session(&self, acting_user: &str) -> Result<Box<dyn SyncSession>> {
        let remaining = self.failing_opens.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_opens.store(remaining - 1, Ordering::SeqCst);
            return Err(DingBridgeError::Database("database is locked".into()));
        }

        self.store.lock().opened_by.push(acting_user.to_string());
        Ok(Box::new(MemorySession {
            store: self.store.clone(),
            acting_user: acting_user.to_string(),
            fail_audit: self.fail_first_audit.swap(false, Ordering::SeqCst),
            departments: Vec::new(),
            employees: Vec::new(),
            audit: Vec::new(),
        }))
    }
}

pub struct MemorySession {
    store: Arc<Mutex<Store>>,
    acting_user: String,
    fail_audit: bool,
    departments: Vec<(i64, Department)>,
    employees: Vec<(i64, Employee)>,
    audit: Vec<AuditLogEntry>,
}

#[async_trait]
impl SyncSession for MemorySession {
    fn acting_user(&self) -> &str {
        &self.acting_user
    }

    async fn upsert_department(&mut self, app_id: i64, department: &Department) -> Result<()> {
        self.departments.push((app_id, department.clone()));
        Ok(())
    }

    async fn upsert_employee(&mut self, app_id: i64, employee: &Employee) -> Result<()> {
        self.employees.push((app_id, employee.clone()));
        Ok(())
    }

    async fn append_audit_log(&mut self, entry: &AuditLogEntry) -> Result<()> {
        if self.fail_audit {
            return Err(DingBridgeError::Database("disk I/O error".into()));
        }
        self.audit.push(entry.clone());
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let mut store = self.store.lock();
        store.commits += 1;
        store.departments.extend(self.departments);
        store.employees.extend(self.employees);
        store.audit.extend(self.audit);
        Ok(())
    }
}

/// Remote API double with an optional slow or failing scope lookup.
#[derive(Default)]
pub struct StubApi {
    pub scopes_delay: Option<Duration>,
    pub scopes_error: Option<DingBridgeError>,
    pub scopes: AuthScope,
    pub scopes_completed: AtomicBool,
}

#[async_trait]
impl DingTalkApi for StubApi {
    async fn get_auth_scopes(&self) -> Result<AuthScope> {
        if let Some(delay) = self.scopes_delay {
            tokio::time::sleep(delay).await;
        }
        self.scopes_completed.store(true, Ordering::SeqCst);
        match &self.scopes_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.scopes.clone()),
        }
    }

    async fn upload_media(&self, _upload: MediaUpload) -> Result<String> {
        Ok("@media".into())
    }

    async fn send_message(&self, _message: &OutgoingMessage) -> Result<String> {
        Ok("task".into())
    }

    async fn create_or_update_template(&self, template: &TemplateSpec) -> Result<String> {
        Ok(template.process_code.clone())
    }

    async fn get_department(&self, department_id: i64) -> Result<Department> {
        Ok(Department {
            ding_id: department_id,
            name: format!("dept-{department_id}"),
            parent_id: Some(1),
        })
    }

    async fn list_sub_departments(&self, _parent_id: i64) -> Result<Vec<Department>> {
        Ok(Vec::new())
    }

    async fn list_department_users(
        &self,
        _department_id: i64,
        _cursor: i64,
        _size: u32,
    ) -> Result<UserPage> {
        Ok(UserPage::default())
    }
}

pub struct StubFactory {
    pub api: Arc<StubApi>,
    pub create_error: Option<DingBridgeError>,
}

impl StubFactory {
    pub fn new(api: StubApi) -> Self {
        Self { api: Arc::new(api), create_error: None }
    }
}

impl RequestClientFactory for StubFactory {
    fn create(&self, credential: &AppCredential) -> Result<Arc<dyn DingTalkApi>> {
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        credential.validate()?;
        Ok(self.api.clone())
    }
}

/// How [`StubHierarchy`] ends after writing one department per authed id.
#[derive(Debug, Clone)]
pub enum Outcome {
    Succeed,
    Fail(DingBridgeError),
    Panic(&'static str),
}

pub struct StubHierarchy {
    pub outcome: Outcome,
}

#[async_trait]
impl HierarchySync for StubHierarchy {
    async fn sync(
        &self,
        session: &mut dyn SyncSession,
        app: &DingApp,
        _client: &dyn DingTalkApi,
        scopes: &AuthScope,
    ) -> Result<HierarchySummary> {
        for id in &scopes.authed_departments {
            let department =
                Department { ding_id: *id, name: format!("dept-{id}"), parent_id: None };
            session.upsert_department(app.id, &department).await?;
        }

        match &self.outcome {
            Outcome::Succeed => Ok(HierarchySummary {
                departments: scopes.authed_departments.len(),
                employees: 0,
            }),
            Outcome::Fail(err) => Err(err.clone()),
            Outcome::Panic(message) => panic!("{message}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Delivered {
    pub recipient: String,
    pub event: String,
    pub message: NotificationMessage,
    pub at: Instant,
    /// Committed audit entries at the moment of delivery
    pub audit_entries: usize,
}

/// Records notifications along with a snapshot of the committed audit count.
pub struct RecordingNotifier {
    store: Arc<Mutex<Store>>,
    pub delivered: Mutex<Vec<Delivered>>,
}

impl RecordingNotifier {
    pub fn observing(store: Arc<Mutex<Store>>) -> Self {
        Self { store, delivered: Mutex::new(Vec::new()) }
    }

    pub fn delivered(&self) -> Vec<Delivered> {
        self.delivered.lock().clone()
    }
}

impl NotificationChannel for RecordingNotifier {
    fn send(&self, recipient: &str, event: &str, message: NotificationMessage) {
        let audit_entries = self.store.lock().audit.len();
        self.delivered.lock().push(Delivered {
            recipient: recipient.to_string(),
            event: event.to_string(),
            message,
            at: Instant::now(),
            audit_entries,
        });
    }
}

/// Orchestrator wired to in-memory doubles.
pub struct Harness {
    pub orchestrator: SyncOrchestrator,
    pub sessions: Arc<MemorySessionProvider>,
    pub factory: Arc<StubFactory>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(sessions: MemorySessionProvider, factory: StubFactory, outcome: Outcome) -> Self {
        let sessions = Arc::new(sessions);
        let factory = Arc::new(factory);
        let notifier = Arc::new(RecordingNotifier::observing(sessions.store.clone()));
        let orchestrator = SyncOrchestrator::new(
            sessions.clone(),
            factory.clone(),
            Arc::new(StubHierarchy { outcome }),
            notifier.clone(),
        );
        Self { orchestrator, sessions, factory, notifier }
    }

    pub fn succeeding() -> Self {
        Self::new(MemorySessionProvider::default(), StubFactory::new(scoped_api()), Outcome::Succeed)
    }
}

/// API whose scopes authorize departments 10 and 20.
pub fn scoped_api() -> StubApi {
    StubApi {
        scopes: AuthScope {
            auth_user_field: vec!["name".into()],
            authed_departments: vec![10, 20],
            authed_users: Vec::new(),
        },
        ..StubApi::default()
    }
}

pub fn sample_app() -> DingApp {
    DingApp {
        id: 3,
        name: "Attendance".into(),
        description: Some("HR attendance app".into()),
        credential: AppCredential::new("dingkey", "dingsecret", "123456"),
        company_id: 9,
        sync_with_user: true,
        callback_token: None,
        encoding_aes_key: None,
    }
}
