//! Wire types for the DingTalk open API
//!
//! The legacy host wraps every payload in an `{errcode, errmsg}` envelope;
//! the v1.0 host reports errors through HTTP status plus `{code, message}`.

use dingbridge_domain::{AuthScope, Department, Employee, UserPage};
use serde::{Deserialize, Serialize};

use super::errors::DingTalkError;

/// Legacy-host envelope with the endpoint payload flattened in.
#[derive(Debug, Deserialize)]
pub struct OapiEnvelope<T> {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(flatten)]
    pub body: T,
}

impl<T> OapiEnvelope<T> {
    pub fn into_result(self, endpoint: &'static str) -> Result<T, DingTalkError> {
        if self.errcode == 0 {
            Ok(self.body)
        } else {
            Err(DingTalkError::from_errcode(endpoint, self.errcode, self.errmsg))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenBody {
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScopesBody {
    #[serde(default)]
    pub auth_user_field: Vec<String>,
    #[serde(default)]
    pub auth_org_scopes: OrgScopes,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrgScopes {
    #[serde(default)]
    pub authed_dept: Vec<i64>,
    #[serde(default)]
    pub authed_user: Vec<String>,
}

impl From<ScopesBody> for AuthScope {
    fn from(value: ScopesBody) -> Self {
        Self {
            auth_user_field: value.auth_user_field,
            authed_departments: value.auth_org_scopes.authed_dept,
            authed_users: value.auth_org_scopes.authed_user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaBody {
    pub media_id: Option<String>,
}

/// `asyncsend_v2` request body
#[derive(Debug, Serialize)]
pub struct AsyncSendRequest<'a> {
    pub agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub userid_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dept_id_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_all_user: Option<bool>,
    pub msg: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct AsyncSendBody {
    pub task_id: Option<serde_json::Value>,
}

/// Body of the department calls keyed by a single `dept_id`.
#[derive(Debug, Serialize)]
pub struct DepartmentRequest {
    pub dept_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct GetDepartmentBody {
    pub result: Option<DepartmentDto>,
}

#[derive(Debug, Deserialize)]
pub struct ListSubBody {
    #[serde(default)]
    pub result: Vec<DepartmentDto>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentDto {
    pub dept_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl From<DepartmentDto> for Department {
    fn from(value: DepartmentDto) -> Self {
        Self { ding_id: value.dept_id, name: value.name, parent_id: value.parent_id }
    }
}

#[derive(Debug, Serialize)]
pub struct ListUsersRequest {
    pub dept_id: i64,
    pub cursor: i64,
    pub size: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersBody {
    pub result: Option<UserPageDto>,
}

#[derive(Debug, Deserialize)]
pub struct UserPageDto {
    #[serde(default)]
    pub has_more: bool,
    pub next_cursor: Option<i64>,
    #[serde(default)]
    pub list: Vec<UserDto>,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub userid: String,
    #[serde(default)]
    pub name: String,
}

impl UserPageDto {
    pub fn into_page(self, department_id: i64) -> UserPage {
        let users = self
            .list
            .into_iter()
            .map(|user| Employee { ding_userid: user.userid, name: user.name, department_id })
            .collect();
        let next_cursor = if self.has_more { self.next_cursor } else { None };
        UserPage { users, next_cursor }
    }
}

/// v1.0 workflow schema upsert body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSchemaRequest<'a> {
    pub process_code: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub form_components: &'a [serde_json::Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_config: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessSchemaResponse {
    pub result: Option<ProcessSchemaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSchemaResult {
    pub process_code: Option<String>,
}
