#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use frontend::api::{ApiGateway, ApiRequest, Attachment, FormFields, RawResponse, Transport};
use frontend::error::AppError;
use frontend::models::{
    Created, GroupDetails, GroupSummary, Identity, Member, Role, TaskDetails, TaskSummary,
};

pub fn at(ts: &str) -> DateTime<Utc> {
    ts.parse().expect("valid timestamp")
}

pub fn identity(role: Role) -> Identity {
    Identity {
        id: "100".to_string(),
        name: "Grace".to_string(),
        role,
    }
}

pub fn task(id: &str) -> TaskSummary {
    TaskSummary {
        id: id.to_string(),
        title: format!("Task {}", id),
        project: "Apollo".to_string(),
        deadline: at("2025-03-01T12:00:00Z"),
    }
}

pub fn task_details(id: &str) -> TaskDetails {
    TaskDetails {
        summary: task(id),
        assignee: "Grace".to_string(),
        group: "Ops".to_string(),
        description: format!("Details of {}", id),
        start_time: at("2025-02-01T09:00:00Z"),
    }
}

pub fn group(id: &str) -> GroupSummary {
    GroupSummary {
        id: id.to_string(),
        name: format!("Group {}", id),
        avatar: None,
    }
}

pub fn group_details(id: &str) -> GroupDetails {
    GroupDetails {
        summary: group(id),
        members: vec![Member {
            id: "100".to_string(),
            name: "Grace".to_string(),
        }],
        description: String::new(),
    }
}

fn not_found() -> AppError {
    AppError::Api {
        status: 404,
        message: "not found".to_string(),
    }
}

/// In-memory backend. Detail requests can be held until released.
pub struct FakeGateway {
    identity: Mutex<Result<Identity, AppError>>,
    tasks: Mutex<Result<Vec<TaskSummary>, AppError>>,
    groups: Mutex<Result<Vec<GroupSummary>, AppError>>,
    created: Mutex<Result<Created, AppError>>,
    held: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<(FormFields, Option<Attachment>)>>,
}

impl FakeGateway {
    pub fn new(role: Role) -> Self {
        Self {
            identity: Mutex::new(Ok(identity(role))),
            tasks: Mutex::new(Ok(vec![task("1"), task("2")])),
            groups: Mutex::new(Ok(vec![group("g1")])),
            created: Mutex::new(Ok(Created {
                success: true,
                id: Some("501".to_string()),
            })),
            held: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_identity(&self, err: AppError) {
        *self.identity.lock().unwrap() = Err(err);
    }

    pub fn set_tasks(&self, tasks: Result<Vec<TaskSummary>, AppError>) {
        *self.tasks.lock().unwrap() = tasks;
    }

    pub fn set_created(&self, created: Result<Created, AppError>) {
        *self.created.lock().unwrap() = created;
    }

    pub fn hold(&self, id: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(id.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, id: &str) {
        if let Some(gate) = self.held.lock().unwrap().get(id) {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    pub fn submitted(&self) -> Vec<(FormFields, Option<Attachment>)> {
        self.submitted.lock().unwrap().clone()
    }

    async fn wait_if_held(&self, id: &str) {
        let gate = self.held.lock().unwrap().get(id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn fetch_identity(&self) -> Result<Identity, AppError> {
        self.record("fetch_identity");
        self.identity.lock().unwrap().clone()
    }

    async fn list_my_tasks(&self) -> Result<Vec<TaskSummary>, AppError> {
        self.record("list_my_tasks");
        self.tasks.lock().unwrap().clone()
    }

    async fn get_task_details(&self, id: &str) -> Result<TaskDetails, AppError> {
        self.record(format!("get_task_details:{}", id));
        self.wait_if_held(id).await;
        if id == "missing" {
            return Err(not_found());
        }
        Ok(task_details(id))
    }

    async fn list_my_groups(&self) -> Result<Vec<GroupSummary>, AppError> {
        self.record("list_my_groups");
        self.groups.lock().unwrap().clone()
    }

    async fn get_group_details(&self, id: &str) -> Result<GroupDetails, AppError> {
        self.record(format!("get_group_details:{}", id));
        self.wait_if_held(id).await;
        Ok(group_details(id))
    }

    async fn list_all_groups(&self) -> Result<Vec<GroupSummary>, AppError> {
        self.record("list_all_groups");
        Ok(vec![group("g1"), group("g2"), group("g3")])
    }

    async fn create_task(&self, fields: &FormFields) -> Result<Created, AppError> {
        self.record("create_task");
        self.submitted.lock().unwrap().push((fields.clone(), None));
        self.created.lock().unwrap().clone()
    }

    async fn create_group(
        &self,
        fields: &FormFields,
        avatar: Option<Attachment>,
    ) -> Result<Created, AppError> {
        self.record("create_group");
        self.submitted.lock().unwrap().push((fields.clone(), avatar));
        self.created.lock().unwrap().clone()
    }
}

/// Transport that answers every request with one canned response and
/// keeps the requests it saw.
pub struct RecordingTransport {
    response: Mutex<RawResponse>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl RecordingTransport {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            response: Mutex::new(RawResponse::new(status, body)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(&self, status: u16, body: &str) {
        *self.response.lock().unwrap() = RawResponse::new(status, body);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> ApiRequest {
        self.requests().pop().expect("at least one request")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, AppError> {
        self.requests.lock().unwrap().push(request);
        Ok(self.response.lock().unwrap().clone())
    }
}
