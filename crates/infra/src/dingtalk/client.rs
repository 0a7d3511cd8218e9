//! DingTalk request client
//!
//! One client is bound to one app credential. Every operation is a single
//! authenticated request; failures are classified into `Auth` or `Remote`
//! and returned to the caller unchanged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dingbridge_core::DingTalkApi;
use dingbridge_domain::{
    AppCredential, AuthScope, Department, DingBridgeError, DingTalkConfig, MediaUpload,
    OutgoingMessage, Recipients, Result, TemplateSpec, UserPage,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use super::auth::{AccessTokenProvider, AppTokenProvider};
use super::errors::DingTalkError;
use super::types::{
    AsyncSendBody, AsyncSendRequest, DepartmentRequest, GetDepartmentBody, ListSubBody,
    ListUsersBody, ListUsersRequest, MediaBody, OapiEnvelope, ProcessSchemaRequest,
    ProcessSchemaResponse, ScopesBody,
};
use crate::http::HttpClient;

/// Header carrying the access token on the v1.0 host
const ACCESS_TOKEN_HEADER: &str = "x-acs-dingtalk-access-token";

/// Endpoints and timeout for [`DingTalkClient`]
#[derive(Debug, Clone)]
pub struct DingTalkClientConfig {
    pub oapi_base_url: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl Default for DingTalkClientConfig {
    fn default() -> Self {
        Self::from(&DingTalkConfig::default())
    }
}

impl From<&DingTalkConfig> for DingTalkClientConfig {
    fn from(value: &DingTalkConfig) -> Self {
        Self {
            oapi_base_url: value.oapi_base_url.trim_end_matches('/').to_string(),
            api_base_url: value.api_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(value.timeout_seconds),
        }
    }
}

/// Authenticated client for one DingTalk app
pub struct DingTalkClient {
    http: HttpClient,
    config: DingTalkClientConfig,
    agent_id: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl DingTalkClient {
    /// Build a client whose token is exchanged from `credential` on first use.
    pub fn new(config: DingTalkClientConfig, credential: &AppCredential) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        let tokens = Arc::new(AppTokenProvider::new(
            http.clone(),
            config.oapi_base_url.clone(),
            credential.clone(),
        ));
        Ok(Self { http, config, agent_id: credential.agent_id.clone(), tokens })
    }

    /// Build a client around an existing token source.
    pub fn with_token_provider(
        config: DingTalkClientConfig,
        agent_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
    ) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config, agent_id: agent_id.into(), tokens })
    }

    async fn oapi_request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{}", self.config.oapi_base_url, path);
        Ok(self.http.request(method, url).query(&[("access_token", token.as_str())]))
    }

    async fn oapi_post<B, T>(&self, endpoint: &'static str, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let request = self.oapi_request(Method::POST, path).await?.json(body);
        self.execute_oapi(endpoint, request).await
    }

    async fn execute_oapi<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DingTalkError::from_status(endpoint, status.as_u16(), body).into());
        }

        let envelope: OapiEnvelope<T> = response
            .json()
            .await
            .map_err(|err| DingTalkError::Decode {
                endpoint,
                message: err.without_url().to_string(),
            })?;
        Ok(envelope.into_result(endpoint)?)
    }
}

#[async_trait]
impl DingTalkApi for DingTalkClient {
    #[instrument(skip(self))]
    async fn get_auth_scopes(&self) -> Result<AuthScope> {
        let request = self.oapi_request(Method::GET, "/auth/scopes").await?;
        let body: ScopesBody = self.execute_oapi("auth/scopes", request).await?;
        Ok(body.into())
    }

    #[instrument(skip(self, upload), fields(media_type = %upload.media_type, size = upload.content.len()))]
    async fn upload_media(&self, upload: MediaUpload) -> Result<String> {
        let part = Part::bytes(upload.content).file_name(upload.filename);
        let request = self
            .oapi_request(Method::POST, "/media/upload")
            .await?
            .query(&[("type", upload.media_type.as_str())])
            .multipart(Form::new().part("media", part));

        let body: MediaBody = self.execute_oapi("media/upload", request).await?;
        body.media_id.filter(|id| !id.is_empty()).ok_or_else(|| {
            DingBridgeError::Remote("media/upload returned no media_id".into())
        })
    }

    #[instrument(skip(self, message), fields(all_users = message.target.is_all_users()))]
    async fn send_message(&self, message: &OutgoingMessage) -> Result<String> {
        let (userid_list, to_all_user) = match message.target.recipients() {
            Recipients::AllUsers => (None, Some(true)),
            Recipients::Users(ids) if ids.is_empty() => (None, None),
            Recipients::Users(ids) => (Some(ids.join(",")), None),
        };
        let departments = message.target.effective_departments();
        let body = AsyncSendRequest {
            agent_id: &self.agent_id,
            userid_list,
            dept_id_list: (!departments.is_empty()).then(|| departments.join(",")),
            to_all_user,
            msg: &message.msg,
        };

        let response: AsyncSendBody = self
            .oapi_post("asyncsend_v2", "/topapi/message/corpconversation/asyncsend_v2", &body)
            .await?;
        match response.task_id {
            Some(serde_json::Value::String(id)) => Ok(id),
            Some(serde_json::Value::Number(id)) => Ok(id.to_string()),
            _ => Err(DingBridgeError::Remote("asyncsend_v2 returned no task_id".into())),
        }
    }

    #[instrument(skip(self, template), fields(process_code = %template.process_code))]
    async fn create_or_update_template(&self, template: &TemplateSpec) -> Result<String> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/v1.0/workflow/processCentres/schemas", self.config.api_base_url);
        let body = ProcessSchemaRequest {
            process_code: &template.process_code,
            name: &template.name,
            description: template.description.as_deref(),
            form_components: &template.form_components,
            template_config: template.template_config.as_ref(),
        };
        let request = self
            .http
            .request(Method::POST, url)
            .header(ACCESS_TOKEN_HEADER, token)
            .json(&body);

        let response = self.http.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DingTalkError::from_status("processCentres/schemas", status.as_u16(), body).into());
        }

        let parsed: ProcessSchemaResponse = response.json().await.map_err(|err| {
            DingTalkError::Decode {
                endpoint: "processCentres/schemas",
                message: err.without_url().to_string(),
            }
        })?;
        let process_code = parsed
            .result
            .and_then(|result| result.process_code)
            .unwrap_or_else(|| template.process_code.clone());
        debug!(%process_code, "template saved");
        Ok(process_code)
    }

    #[instrument(skip(self))]
    async fn get_department(&self, department_id: i64) -> Result<Department> {
        let body: GetDepartmentBody = self
            .oapi_post("department/get", "/topapi/v2/department/get", &DepartmentRequest {
                dept_id: department_id,
            })
            .await?;
        body.result.map(Department::from).ok_or_else(|| {
            DingBridgeError::Remote(format!(
                "department/get returned no department {department_id}"
            ))
        })
    }

    #[instrument(skip(self))]
    async fn list_sub_departments(&self, parent_id: i64) -> Result<Vec<Department>> {
        let body: ListSubBody = self
            .oapi_post("department/listsub", "/topapi/v2/department/listsub", &DepartmentRequest {
                dept_id: parent_id,
            })
            .await?;
        Ok(body.result.into_iter().map(Department::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_department_users(
        &self,
        department_id: i64,
        cursor: i64,
        size: u32,
    ) -> Result<UserPage> {
        let body: ListUsersBody = self
            .oapi_post("user/listsimple", "/topapi/user/listsimple", &ListUsersRequest {
                dept_id: department_id,
                cursor,
                size,
            })
            .await?;
        Ok(body.result.map(|page| page.into_page(department_id)).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use dingbridge_domain::{MediaType, MessageTarget};
    use serde_json::json;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct FixedToken;

    #[async_trait]
    impl AccessTokenProvider for FixedToken {
        async fn access_token(&self) -> std::result::Result<String, DingTalkError> {
            Ok("tok".into())
        }
    }

    fn client(server: &MockServer) -> DingTalkClient {
        let config = DingTalkClientConfig {
            oapi_base_url: server.uri(),
            api_base_url: server.uri(),
            timeout: Duration::from_secs(5),
        };
        DingTalkClient::with_token_provider(config, "1000", Arc::new(FixedToken)).unwrap()
    }

    #[tokio::test]
    async fn scopes_are_read_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/scopes"))
            .and(query_param("access_token", "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "auth_user_field": ["name"],
                "auth_org_scopes": {"authed_dept": [1], "authed_user": []}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let scopes = client(&server).get_auth_scopes().await.unwrap();
        assert_eq!(scopes.authed_departments, vec![1]);
    }

    #[tokio::test]
    async fn message_to_users_joins_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topapi/message/corpconversation/asyncsend_v2"))
            .and(body_json(json!({
                "agent_id": "1000",
                "userid_list": "u1,u2",
                "dept_id_list": "12",
                "msg": {"msgtype": "text", "text": {"content": "hello"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "task_id": 256271667526_i64,
                "request_id": "4jzllmte0wau"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let target = MessageTarget::new(
            Recipients::Users(vec!["u1".into(), "u2".into()]),
            vec!["12".into()],
        )
        .unwrap();
        let message = OutgoingMessage::new(
            target,
            json!({"msgtype": "text", "text": {"content": "hello"}}),
        )
        .unwrap();

        let task_id = client(&server).send_message(&message).await.unwrap();
        assert_eq!(task_id, "256271667526");
    }

    #[tokio::test]
    async fn api_errcode_becomes_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topapi/v2/department/listsub"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 60003,
                "errmsg": "department not found"
            })))
            .mount(&server)
            .await;

        let err = client(&server).list_sub_departments(99).await.unwrap_err();
        match err {
            DingBridgeError::Remote(msg) => assert!(msg.contains("60003")),
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn department_lookup_reads_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topapi/v2/department/get"))
            .and(query_param("access_token", "tok"))
            .and(body_json(json!({"dept_id": 10})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "result": {"dept_id": 10, "name": "R&D", "parent_id": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let department = client(&server).get_department(10).await.unwrap();

        assert_eq!(
            department,
            Department { ding_id: 10, name: "R&D".into(), parent_id: Some(1) }
        );
    }

    #[tokio::test]
    async fn upload_sends_multipart_with_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/media/upload"))
            .and(query_param("type", "image"))
            .and(body_string_contains("logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "errmsg": "ok",
                "type": "image",
                "media_id": "@lADPDgQ9",
                "created_at": 1605863153573_i64
            })))
            .expect(1)
            .mount(&server)
            .await;

        let upload = MediaUpload {
            media_type: MediaType::Image,
            filename: "logo.png".into(),
            content: b"not really a png".to_vec(),
        };
        let media_id = client(&server).upload_media(upload).await.unwrap();
        assert_eq!(media_id, "@lADPDgQ9");
    }

    #[tokio::test]
    async fn template_upsert_uses_header_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/workflow/processCentres/schemas"))
            .and(header(ACCESS_TOKEN_HEADER, "tok"))
            .and(body_string_contains("\"processCode\":\"PROC-LEAVE\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"processCode": "PROC-LEAVE"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let template = TemplateSpec {
            process_code: "PROC-LEAVE".into(),
            name: "Leave".into(),
            form_components: vec![json!({"componentType": "TextField"})],
            description: None,
            template_config: None,
        };
        let code = client(&server).create_or_update_template(&template).await.unwrap();
        assert_eq!(code, "PROC-LEAVE");
    }

    #[tokio::test]
    async fn template_forbidden_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1.0/workflow/processCentres/schemas"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "code": "Forbidden.AccessDenied.AccessTokenPermissionDenied",
                "message": "no permission"
            })))
            .mount(&server)
            .await;

        let template = TemplateSpec {
            process_code: "PROC-LEAVE".into(),
            name: "Leave".into(),
            form_components: vec![],
            description: None,
            template_config: None,
        };
        let err = client(&server).create_or_update_template(&template).await.unwrap_err();
        assert!(matches!(err, DingBridgeError::Auth(_)));
    }

    #[tokio::test]
    async fn user_pages_follow_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topapi/user/listsimple"))
            .and(body_json(json!({"dept_id": 5, "cursor": 0, "size": 100})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "errcode": 0,
                "result": {
                    "has_more": true,
                    "next_cursor": 100,
                    "list": [{"userid": "u1", "name": "Han Meimei"}]
                }
            })))
            .mount(&server)
            .await;

        let page = client(&server).list_department_users(5, 0, 100).await.unwrap();
        assert_eq!(page.next_cursor, Some(100));
        assert_eq!(page.users[0].ding_userid, "u1");
        assert_eq!(page.users[0].department_id, 5);
    }
}
