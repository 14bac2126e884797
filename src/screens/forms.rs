//! Admin creation forms.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{Attachment, FormFields};
use crate::error::AppError;
use crate::models::Created;

pub const TASK_REQUIRED_FIELDS: [&str; 4] = ["title", "project", "group", "assignee"];
pub const GROUP_REQUIRED_FIELDS: [&str; 1] = ["name"];

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Validated payload handed to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub fields: FormFields,
    pub avatar: Option<Attachment>,
}

/// Action run after a delay unless cancelled first.
pub struct DelayedAction {
    handle: JoinHandle<()>,
}

impl DelayedAction {
    pub fn schedule<F>(delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

#[derive(Default)]
struct FormState {
    fields: FormFields,
    submitting: bool,
    message: Option<String>,
    created: Option<Created>,
    confirmation: Option<DelayedAction>,
}

impl FormState {
    fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn begin(&mut self, required: &[&str]) -> Option<FormFields> {
        if self.submitting {
            debug!("submission already in flight");
            return None;
        }

        let missing = required.iter().any(|name| {
            self.fields
                .get(*name)
                .is_none_or(|value| value.trim().is_empty())
        });
        if missing {
            let err = AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string());
            self.message = Some(err.to_string());
            return None;
        }

        self.cancel_confirmation();
        self.submitting = true;
        self.message = None;
        self.created = None;
        Some(self.fields.clone())
    }

    fn finish(&mut self, outcome: Result<Created, AppError>) -> bool {
        self.submitting = false;
        match outcome {
            Ok(created) if created.success => {
                info!("created record {:?}", created.id);
                self.created = Some(created);
                true
            }
            Ok(_) => {
                warn!("server answered the create with success=false");
                self.cancel_confirmation();
                self.message = Some(AppError::Rejected.to_string());
                false
            }
            Err(err) => {
                self.cancel_confirmation();
                self.message = Some(err.to_string());
                false
            }
        }
    }

    fn cancel_confirmation(&mut self) -> bool {
        match self.confirmation.take() {
            Some(action) => {
                action.cancel();
                true
            }
            None => false,
        }
    }

    fn reset(&mut self) {
        self.cancel_confirmation();
        *self = Self::default();
    }
}

macro_rules! form_accessors {
    () => {
        pub fn set_field(&mut self, name: &str, value: &str) {
            self.state.set_field(name, value);
        }

        pub fn field(&self, name: &str) -> Option<&str> {
            self.state.fields.get(name).map(String::as_str)
        }

        /// The submit control is disabled while this is true.
        pub fn is_submitting(&self) -> bool {
            self.state.submitting
        }

        /// Validation or API failure shown inline.
        pub fn message(&self) -> Option<&str> {
            self.state.message.as_deref()
        }

        pub fn created(&self) -> Option<&Created> {
            self.state.created.as_ref()
        }

        /// Records the outcome. Returns true on success.
        pub fn finish(&mut self, outcome: Result<Created, AppError>) -> bool {
            self.state.finish(outcome)
        }

        pub fn set_confirmation(&mut self, action: DelayedAction) {
            self.state.cancel_confirmation();
            self.state.confirmation = Some(action);
        }

        pub fn has_confirmation(&self) -> bool {
            self.state.confirmation.is_some()
        }

        pub fn cancel_confirmation(&mut self) -> bool {
            self.state.cancel_confirmation()
        }
    };
}

#[derive(Default)]
pub struct TaskForm {
    state: FormState,
}

impl TaskForm {
    form_accessors!();

    /// Validates and marks the form as submitting. `None` means no
    /// request may be sent.
    pub fn begin(&mut self) -> Option<Submission> {
        self.state.begin(&TASK_REQUIRED_FIELDS).map(|fields| Submission {
            fields,
            avatar: None,
        })
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[derive(Default)]
pub struct GroupForm {
    state: FormState,
    avatar: Option<Attachment>,
}

impl GroupForm {
    form_accessors!();

    pub fn set_avatar(&mut self, avatar: Option<Attachment>) {
        self.avatar = avatar;
    }

    pub fn avatar(&self) -> Option<&Attachment> {
        self.avatar.as_ref()
    }

    pub fn begin(&mut self) -> Option<Submission> {
        let avatar = self.avatar.clone();
        self.state
            .begin(&GROUP_REQUIRED_FIELDS)
            .map(|fields| Submission { fields, avatar })
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.avatar = None;
    }
}
