pub mod dto;
pub mod transport;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::Endpoint;
use crate::error::AppError;
use crate::models::{Created, GroupDetails, GroupSummary, Identity, TaskDetails, TaskSummary};

pub use transport::{
    ApiRequest, Attachment, Method, RawResponse, RequestBody, ReqwestTransport, Transport,
};

/// Free-form text fields of a create form, keyed by field name.
pub type FormFields = BTreeMap<String, String>;

/// Multipart field name of the group avatar.
pub const AVATAR_FIELD: &str = "avatar";

/// Typed remote operations of the backend.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn fetch_identity(&self) -> Result<Identity, AppError>;
    async fn list_my_tasks(&self) -> Result<Vec<TaskSummary>, AppError>;
    async fn get_task_details(&self, id: &str) -> Result<TaskDetails, AppError>;
    async fn list_my_groups(&self) -> Result<Vec<GroupSummary>, AppError>;
    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, AppError>;
    async fn list_all_groups(&self) -> Result<Vec<GroupSummary>, AppError>;
    async fn create_task(&self, fields: &FormFields) -> Result<Created, AppError>;
    async fn create_group(
        &self,
        fields: &FormFields,
        avatar: Option<Attachment>,
    ) -> Result<Created, AppError>;
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    Data(T),
    /// Empty or non-JSON body, e.g. `204 No Content`.
    NoData { status: u16 },
}

impl<T> Payload<T> {
    fn required(self) -> Result<T, AppError> {
        match self {
            Payload::Data(value) => Ok(value),
            Payload::NoData { status } => Err(AppError::EmptyResponse { status }),
        }
    }
}

impl<T: Default> Payload<T> {
    fn or_default(self) -> T {
        match self {
            Payload::Data(value) => value,
            Payload::NoData { .. } => T::default(),
        }
    }
}

/// Turns a raw response into data or a normalized [`AppError::Api`].
pub fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<Payload<T>, AppError> {
    let success = response.is_success();
    let RawResponse { status, body } = response;

    if !success {
        let message = match serde_json::from_str::<dto::ErrorBody>(&body) {
            Ok(err) => err.message,
            Err(_) if body.trim().is_empty() => reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or_default()
                .to_string(),
            Err(_) => body,
        };
        return Err(AppError::Api { status, message });
    }

    if body.trim().is_empty() {
        return Ok(Payload::NoData { status });
    }
    let value = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(value) => value,
        Err(_) => {
            debug!("status {} returned a non-JSON body, treating as no data", status);
            return Ok(Payload::NoData { status });
        }
    };

    serde_json::from_value(value)
        .map(Payload::Data)
        .map_err(|e| AppError::Decode(e.to_string()))
}

pub struct HttpGateway {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
    credential: Option<String>,
}

impl HttpGateway {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Endpoint, credential: Option<String>) -> Self {
        Self {
            transport,
            endpoint,
            credential,
        }
    }

    fn build(&self, method: Method, path: &[&str], body: RequestBody) -> Result<ApiRequest, AppError> {
        let url = self.endpoint.join(path)?;

        let mut headers = Vec::new();
        if let Some(credential) = &self.credential {
            headers.push(("Authorization".to_string(), format!("tma {}", credential)));
        }
        // Multipart bodies get their boundary from the transport.
        if matches!(body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(ApiRequest {
            method,
            url,
            headers,
            body,
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        body: RequestBody,
    ) -> Result<Payload<T>, AppError> {
        let request = self.build(method, path, body)?;
        let url = request.url.clone();
        let response = self.transport.send(request).await?;

        decode(response).inspect_err(|e| warn!("{:?} {} failed: {}", method, url, e))
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    async fn fetch_identity(&self) -> Result<Identity, AppError> {
        let credential = self.credential.as_deref().ok_or(AppError::MissingCredential)?;
        let body = serde_json::to_value(dto::IdentityRequest {
            init_data: credential,
        })
        .map_err(|e| AppError::Decode(e.to_string()))?;

        self.call(Method::Post, &["auth"], RequestBody::Json(body))
            .await?
            .required()
    }

    async fn list_my_tasks(&self) -> Result<Vec<TaskSummary>, AppError> {
        Ok(self
            .call(Method::Get, &["tasks"], RequestBody::Empty)
            .await?
            .or_default())
    }

    async fn get_task_details(&self, id: &str) -> Result<TaskDetails, AppError> {
        self.call(Method::Get, &["tasks", id], RequestBody::Empty)
            .await?
            .required()
    }

    async fn list_my_groups(&self) -> Result<Vec<GroupSummary>, AppError> {
        Ok(self
            .call(Method::Get, &["groups"], RequestBody::Empty)
            .await?
            .or_default())
    }

    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, AppError> {
        self.call(Method::Get, &["groups", id], RequestBody::Empty)
            .await?
            .required()
    }

    async fn list_all_groups(&self) -> Result<Vec<GroupSummary>, AppError> {
        Ok(self
            .call(Method::Get, &["admin", "groups"], RequestBody::Empty)
            .await?
            .or_default())
    }

    async fn create_task(&self, fields: &FormFields) -> Result<Created, AppError> {
        let body = serde_json::to_value(fields).map_err(|e| AppError::Decode(e.to_string()))?;

        match self.call(Method::Post, &["tasks"], RequestBody::Json(body)).await? {
            Payload::Data(created) => Ok(created),
            Payload::NoData { .. } => Ok(Created::accepted()),
        }
    }

    async fn create_group(
        &self,
        fields: &FormFields,
        avatar: Option<Attachment>,
    ) -> Result<Created, AppError> {
        let body = RequestBody::Multipart {
            fields: fields
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            file: avatar.map(|file| (AVATAR_FIELD.to_string(), file)),
        };

        match self.call(Method::Post, &["groups"], body).await? {
            Payload::Data(created) => Ok(created),
            Payload::NoData { .. } => Ok(Created::accepted()),
        }
    }
}
