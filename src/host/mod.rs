//! Capabilities the embedding platform exposes to the app.
//!
//! The real bridge lives in the host; this crate only talks to it through
//! [`HostBridge`]. [`NoopHost`] stands in when no host is present and
//! [`RecordingHost`] records every call for tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Click handler registered on a chrome button.
pub type ClickHandler = Arc<dyn Fn() + Send + Sync>;

/// Theme colour tokens keyed by name (`bg_color`, `text_color`, ...).
pub type ThemeTokens = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHint {
    pub id: String,
    pub display_name: String,
}

/// One of the two host-drawn buttons.
pub trait ChromeButton: Send + Sync {
    fn show(&self);
    fn hide(&self);
    fn set_label(&self, label: &str);
    fn on_click(&self, handler: ClickHandler);
}

pub trait HostBridge: Send + Sync {
    /// Opaque per-launch credential, forwarded to the backend verbatim.
    fn credential(&self) -> Option<String>;
    fn user_hint(&self) -> Option<UserHint>;
    fn theme_tokens(&self) -> ThemeTokens;
    fn main_button(&self) -> &dyn ChromeButton;
    fn back_button(&self) -> &dyn ChromeButton;
    /// Expands the app to full height. Called once at launch.
    fn reveal(&self);
}

struct NoopButton;

impl ChromeButton for NoopButton {
    fn show(&self) {}
    fn hide(&self) {}
    fn set_label(&self, _label: &str) {}
    fn on_click(&self, _handler: ClickHandler) {}
}

/// Host used when running outside the platform, e.g. from the CLI.
pub struct NoopHost {
    credential: Option<String>,
    button: NoopButton,
}

impl NoopHost {
    pub fn new(credential: Option<String>) -> Self {
        Self {
            credential,
            button: NoopButton,
        }
    }
}

impl HostBridge for NoopHost {
    fn credential(&self) -> Option<String> {
        self.credential.clone()
    }

    fn user_hint(&self) -> Option<UserHint> {
        None
    }

    fn theme_tokens(&self) -> ThemeTokens {
        ThemeTokens::new()
    }

    fn main_button(&self) -> &dyn ChromeButton {
        &self.button
    }

    fn back_button(&self) -> &dyn ChromeButton {
        &self.button
    }

    fn reveal(&self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub visible: bool,
    pub label: Option<String>,
}

#[derive(Default)]
struct RecordedButton {
    state: Mutex<ButtonState>,
    handler: Mutex<Option<ClickHandler>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RecordedButton {
    fn snapshot(&self) -> ButtonState {
        lock(&self.state).clone()
    }

    fn click(&self) {
        let handler = lock(&self.handler).clone();
        if let Some(handler) = handler {
            handler();
        }
    }
}

impl ChromeButton for RecordedButton {
    fn show(&self) {
        lock(&self.state).visible = true;
    }

    fn hide(&self) {
        lock(&self.state).visible = false;
    }

    fn set_label(&self, label: &str) {
        lock(&self.state).label = Some(label.to_string());
    }

    fn on_click(&self, handler: ClickHandler) {
        *lock(&self.handler) = Some(handler);
    }
}

/// In-memory host that remembers what the app asked of it.
#[derive(Default)]
pub struct RecordingHost {
    credential: Option<String>,
    user: Option<UserHint>,
    theme: ThemeTokens,
    main: RecordedButton,
    back: RecordedButton,
    reveals: Mutex<usize>,
}

impl RecordingHost {
    pub fn new(credential: Option<&str>) -> Self {
        Self {
            credential: credential.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user: UserHint) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_theme(mut self, theme: ThemeTokens) -> Self {
        self.theme = theme;
        self
    }

    pub fn main_state(&self) -> ButtonState {
        self.main.snapshot()
    }

    pub fn back_state(&self) -> ButtonState {
        self.back.snapshot()
    }

    pub fn reveal_count(&self) -> usize {
        *lock(&self.reveals)
    }

    /// Simulates the user pressing the host back button.
    pub fn click_back(&self) {
        self.back.click();
    }

    pub fn click_main(&self) {
        self.main.click();
    }
}

impl HostBridge for RecordingHost {
    fn credential(&self) -> Option<String> {
        self.credential.clone()
    }

    fn user_hint(&self) -> Option<UserHint> {
        self.user.clone()
    }

    fn theme_tokens(&self) -> ThemeTokens {
        self.theme.clone()
    }

    fn main_button(&self) -> &dyn ChromeButton {
        &self.main
    }

    fn back_button(&self) -> &dyn ChromeButton {
        &self.back
    }

    fn reveal(&self) {
        *lock(&self.reveals) += 1;
    }
}
