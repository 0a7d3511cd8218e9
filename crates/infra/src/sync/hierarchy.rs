//! Department hierarchy walk
//!
//! Starting from the departments the app is authorized for, sub-departments
//! are listed breadth-first and upserted through the run's session. The
//! authorized departments themselves are stored first, except the root. When
//! the app mirrors users, each visited department's members are paged through
//! as well.

use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;
use dingbridge_core::{DingTalkApi, HierarchySummary, HierarchySync, SyncSession};
use dingbridge_domain::constants::{ROOT_DEPARTMENT_ID, USER_PAGE_SIZE};
use dingbridge_domain::{AuthScope, DingApp, Result};
use tracing::{debug, info, instrument};

/// [`HierarchySync`] that mirrors departments and, optionally, their members
#[derive(Debug, Clone, Copy, Default)]
pub struct DepartmentHierarchySync;

impl DepartmentHierarchySync {
    pub fn new() -> Self {
        Self
    }
}

/// Departments to start the walk from. Authorization for the root covers
/// everything, so other entries are redundant.
fn starting_departments(scopes: &AuthScope) -> Vec<i64> {
    if scopes.authed_departments.contains(&ROOT_DEPARTMENT_ID) {
        return vec![ROOT_DEPARTMENT_ID];
    }
    let mut seen = HashSet::new();
    scopes.authed_departments.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[async_trait]
impl HierarchySync for DepartmentHierarchySync {
    #[instrument(skip_all, fields(app_id = app.id, sync_with_user = app.sync_with_user))]
    async fn sync(
        &self,
        session: &mut dyn SyncSession,
        app: &DingApp,
        client: &dyn DingTalkApi,
        scopes: &AuthScope,
    ) -> Result<HierarchySummary> {
        let mut summary = HierarchySummary::default();
        let starts = starting_departments(scopes);
        for &department_id in &starts {
            if department_id == ROOT_DEPARTMENT_ID {
                continue;
            }
            let department = client.get_department(department_id).await?;
            session.upsert_department(app.id, &department).await?;
            summary.departments += 1;
        }

        let mut queue: VecDeque<i64> = starts.into();
        let mut visited: HashSet<i64> = queue.iter().copied().collect();

        while let Some(department_id) = queue.pop_front() {
            for child in client.list_sub_departments(department_id).await? {
                if !visited.insert(child.ding_id) {
                    continue;
                }
                session.upsert_department(app.id, &child).await?;
                summary.departments += 1;
                queue.push_back(child.ding_id);
            }

            if app.sync_with_user {
                summary.employees += sync_members(session, app, client, department_id).await?;
            }
        }

        info!(
            departments = summary.departments,
            employees = summary.employees,
            "department hierarchy mirrored"
        );
        Ok(summary)
    }
}

async fn sync_members(
    session: &mut dyn SyncSession,
    app: &DingApp,
    client: &dyn DingTalkApi,
    department_id: i64,
) -> Result<usize> {
    let mut cursor = 0;
    let mut written = 0;
    loop {
        let page = client.list_department_users(department_id, cursor, USER_PAGE_SIZE).await?;
        for employee in &page.users {
            session.upsert_employee(app.id, employee).await?;
        }
        written += page.users.len();

        match page.next_cursor {
            Some(next) if next != cursor => cursor = next,
            _ => break,
        }
    }
    debug!(department_id, written, "department members mirrored");
    Ok(written)
}
