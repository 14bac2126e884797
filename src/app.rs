//! Application driver.
//!
//! `App` is the only owner of mutable state. Remote calls run as spawned
//! tasks and report back over one channel; their results are applied when
//! the driver drains it, so every write happens on a single context.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{error, info, warn};

use crate::api::{ApiGateway, HttpGateway, Transport};
use crate::config::{ClientConfig, Endpoint};
use crate::error::AppError;
use crate::host::{HostBridge, ThemeTokens, UserHint};
use crate::models::Created;
use crate::navigation::{Screen, View};
use crate::screens::forms::DelayedAction;
use crate::screens::{
    AllGroups, Fetch, GroupDetailsScreen, GroupForm, GroupsList, ScreenController, TaskDetailsScreen,
    TaskForm, TasksList, Ticket,
};
use crate::state::{Action, Session, Store};

#[derive(Debug, Clone)]
pub struct AppOptions {
    /// How long the success confirmation stays up after a create.
    pub confirmation_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for AppOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            confirmation_delay: config.confirmation_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Task,
    Group,
}

impl FormKind {
    fn confirmation_label(self) -> &'static str {
        match self {
            FormKind::Task => "Task created",
            FormKind::Group => "Group created",
        }
    }
}

pub struct Screens {
    pub tasks: ScreenController<TasksList>,
    pub task_details: ScreenController<TaskDetailsScreen>,
    pub groups: ScreenController<GroupsList>,
    pub group_details: ScreenController<GroupDetailsScreen>,
    pub all_groups: ScreenController<AllGroups>,
    pub task_form: TaskForm,
    pub group_form: GroupForm,
}

impl Default for Screens {
    fn default() -> Self {
        Self {
            tasks: ScreenController::new(TasksList),
            task_details: ScreenController::new(TaskDetailsScreen),
            groups: ScreenController::new(GroupsList),
            group_details: ScreenController::new(GroupDetailsScreen),
            all_groups: ScreenController::new(AllGroups),
            task_form: TaskForm::default(),
            group_form: GroupForm::default(),
        }
    }
}

type Apply = Box<dyn FnOnce(&mut App) + Send>;

struct Completion {
    tracked: bool,
    apply: Apply,
}

pub struct App {
    store: Store,
    host: Arc<dyn HostBridge>,
    gateway: Option<Arc<dyn ApiGateway>>,
    screens: Screens,
    options: AppOptions,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    outstanding: usize,
}

impl App {
    /// Resolves the backend from `launch_url` and wires the HTTP gateway.
    /// A bad launch URL leaves the app in its fatal error view.
    pub fn launch(
        launch_url: &str,
        host: Arc<dyn HostBridge>,
        transport: Arc<dyn Transport>,
        options: AppOptions,
    ) -> Self {
        match Endpoint::from_launch_url(launch_url) {
            Ok(endpoint) => {
                let gateway =
                    HttpGateway::new(transport, endpoint.clone(), host.credential());
                Self::with_gateway(endpoint, Arc::new(gateway), host, options)
            }
            Err(err) => {
                error!("launch failed: {}", err);
                let mut app = Self::bare(host, options);
                app.dispatch(Action::ConfigurationFailed(err.to_string()));
                app
            }
        }
    }

    pub fn with_gateway(
        endpoint: Endpoint,
        gateway: Arc<dyn ApiGateway>,
        host: Arc<dyn HostBridge>,
        options: AppOptions,
    ) -> Self {
        let mut app = Self::bare(host, options);
        app.gateway = Some(gateway);
        app.dispatch(Action::EndpointResolved(endpoint));
        app
    }

    fn bare(host: Arc<dyn HostBridge>, options: AppOptions) -> Self {
        let (tx, rx) = unbounded_channel();

        host.reveal();
        let back_tx = tx.clone();
        host.back_button().on_click(Arc::new(move || {
            let _ = back_tx.send(Completion {
                tracked: false,
                apply: Box::new(|app: &mut App| app.back()),
            });
        }));
        let main_tx = tx.clone();
        host.main_button().on_click(Arc::new(move || {
            let _ = main_tx.send(Completion {
                tracked: false,
                apply: Box::new(|app: &mut App| app.dismiss_confirmation()),
            });
        }));

        let app = Self {
            store: Store::new(),
            host,
            gateway: None,
            screens: Screens::default(),
            options,
            tx,
            rx,
            outstanding: 0,
        };
        app.sync_chrome();
        app
    }

    /// Fetches the identity once the backend is known. Failure is fatal.
    pub async fn load_identity(&mut self) {
        let Some(gateway) = self.gateway.clone() else {
            return;
        };
        if self.store.session().identity.is_some() || self.store.session().fatal.is_some() {
            return;
        }

        match gateway.fetch_identity().await {
            Ok(identity) => {
                info!("signed in as {} ({:?})", identity.name, identity.role);
                self.dispatch(Action::IdentityLoaded(identity));
            }
            Err(err) => {
                error!("identity fetch failed: {}", err);
                self.dispatch(Action::IdentityFailed(err.to_string()));
            }
        }
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    pub fn view(&self) -> View {
        self.store.view()
    }

    pub fn screens(&self) -> &Screens {
        &self.screens
    }

    pub fn screens_mut(&mut self) -> &mut Screens {
        &mut self.screens
    }

    pub fn theme(&self) -> ThemeTokens {
        self.host.theme_tokens()
    }

    /// Who the host says is signed in, available before identity loads.
    pub fn user_hint(&self) -> Option<UserHint> {
        self.host.user_hint()
    }

    /// Number of spawned requests whose results have not been applied.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn navigate(&mut self, screen: Screen) {
        self.dispatch(Action::Navigate(screen));
    }

    pub fn select_task(&mut self, id: impl Into<String>) {
        self.dispatch(Action::SelectTask(id.into()));
    }

    pub fn select_group(&mut self, id: impl Into<String>) {
        self.dispatch(Action::SelectGroup(id.into()));
    }

    pub fn back(&mut self) {
        self.dispatch(Action::Back);
    }

    pub fn dispatch(&mut self, action: Action) {
        let interrupts = matches!(
            action,
            Action::Navigate(_)
                | Action::SelectTask(_)
                | Action::SelectGroup(_)
                | Action::Back
                | Action::ConfigurationFailed(_)
                | Action::IdentityFailed(_)
        );
        if interrupts {
            self.cancel_confirmations();
        }

        let before = self.store.view();
        let selection_before = self.store.session().navigation.clone();
        self.store.dispatch(action);

        if self.store.view() != before || self.store.session().navigation != selection_before {
            self.activate(&before);
        }
        self.sync_chrome();
    }

    /// Refetches the data of the screen currently shown.
    pub fn retry(&mut self) {
        match self.store.view().screen() {
            Some(Screen::TasksList) => {
                if let Some(ticket) = self.screens.tasks.retry() {
                    self.spawn_fetch(ticket, |s| &mut s.tasks);
                }
            }
            Some(Screen::TaskDetails) => {
                if let Some(ticket) = self.screens.task_details.retry() {
                    self.spawn_fetch(ticket, |s| &mut s.task_details);
                }
            }
            Some(Screen::GroupsList) => {
                if let Some(ticket) = self.screens.groups.retry() {
                    self.spawn_fetch(ticket, |s| &mut s.groups);
                }
            }
            Some(Screen::GroupDetails) => {
                if let Some(ticket) = self.screens.group_details.retry() {
                    self.spawn_fetch(ticket, |s| &mut s.group_details);
                }
            }
            Some(Screen::AdminAllGroups) => {
                if let Some(ticket) = self.screens.all_groups.retry() {
                    self.spawn_fetch(ticket, |s| &mut s.all_groups);
                }
            }
            Some(Screen::AdminCreateTask) | Some(Screen::AdminCreateGroup) | None => {}
        }
    }

    /// Sends the task form. Returns false when validation or an in-flight
    /// submission blocked the request.
    pub fn submit_task(&mut self) -> bool {
        let Some(submission) = self.screens.task_form.begin() else {
            return false;
        };
        self.host.main_button().hide();
        let Some(api) = self.gateway.clone() else {
            self.finish_creation(FormKind::Task, Err(backend_unavailable()));
            return false;
        };

        self.spawn_tracked(
            async move { api.create_task(&submission.fields).await },
            |app, outcome| app.finish_creation(FormKind::Task, outcome),
        );
        true
    }

    pub fn submit_group(&mut self) -> bool {
        let Some(submission) = self.screens.group_form.begin() else {
            return false;
        };
        self.host.main_button().hide();
        let Some(api) = self.gateway.clone() else {
            self.finish_creation(FormKind::Group, Err(backend_unavailable()));
            return false;
        };

        self.spawn_tracked(
            async move { api.create_group(&submission.fields, submission.avatar).await },
            |app, outcome| app.finish_creation(FormKind::Group, outcome),
        );
        true
    }

    /// Waits for one completion and applies it. Returns false if nothing
    /// can arrive any more.
    pub async fn next_completion(&mut self) -> bool {
        match self.rx.recv().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Applies completions until no spawned request is outstanding.
    pub async fn settle(&mut self) {
        while self.outstanding > 0 {
            if !self.next_completion().await {
                break;
            }
        }
    }

    /// Applies whatever has already arrived without waiting.
    pub fn process_ready(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            self.apply(completion);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, completion: Completion) {
        if completion.tracked {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        (completion.apply)(self);
    }

    /// Mounts the controller of the screen now shown, or updates its key.
    fn activate(&mut self, before: &View) {
        let view = self.store.view();
        let entered = view != *before;
        let navigation = self.store.session().navigation.clone();

        for screen in Screen::ALL {
            if view.screen() != Some(screen) {
                self.unmount(screen);
            }
        }

        match view.screen() {
            Some(Screen::TasksList) if entered => {
                let ticket = self.screens.tasks.mount(());
                self.spawn_fetch(ticket, |s| &mut s.tasks);
            }
            Some(Screen::GroupsList) if entered => {
                let ticket = self.screens.groups.mount(());
                self.spawn_fetch(ticket, |s| &mut s.groups);
            }
            Some(Screen::AdminAllGroups) if entered => {
                let ticket = self.screens.all_groups.mount(());
                self.spawn_fetch(ticket, |s| &mut s.all_groups);
            }
            Some(Screen::TaskDetails) => {
                let Some(id) = navigation.selected_task else {
                    return;
                };
                let ticket = if entered {
                    Some(self.screens.task_details.mount(id))
                } else {
                    self.screens.task_details.update_key(id)
                };
                if let Some(ticket) = ticket {
                    self.spawn_fetch(ticket, |s| &mut s.task_details);
                }
            }
            Some(Screen::GroupDetails) => {
                let Some(id) = navigation.selected_group else {
                    return;
                };
                let ticket = if entered {
                    Some(self.screens.group_details.mount(id))
                } else {
                    self.screens.group_details.update_key(id)
                };
                if let Some(ticket) = ticket {
                    self.spawn_fetch(ticket, |s| &mut s.group_details);
                }
            }
            _ => {}
        }
    }

    fn unmount(&mut self, screen: Screen) {
        match screen {
            Screen::TasksList => self.screens.tasks.unmount(),
            Screen::TaskDetails => self.screens.task_details.unmount(),
            Screen::GroupsList => self.screens.groups.unmount(),
            Screen::GroupDetails => self.screens.group_details.unmount(),
            Screen::AdminAllGroups => self.screens.all_groups.unmount(),
            Screen::AdminCreateTask | Screen::AdminCreateGroup => {}
        }
    }

    fn spawn_fetch<F: Fetch>(
        &mut self,
        ticket: Ticket<F::Key>,
        slot: fn(&mut Screens) -> &mut ScreenController<F>,
    ) {
        let fetcher = slot(&mut self.screens).fetcher().clone();
        let Some(api) = self.gateway.clone() else {
            slot(&mut self.screens).settle(&ticket, Err(backend_unavailable()));
            return;
        };

        self.spawn_tracked(
            async move {
                let outcome = fetcher.fetch(api.as_ref(), &ticket.key).await;
                (ticket, outcome)
            },
            move |app, (ticket, outcome)| {
                slot(&mut app.screens).settle(&ticket, outcome);
            },
        );
    }

    fn spawn_tracked<Fut, T, A>(&mut self, work: Fut, apply: A)
    where
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        A: FnOnce(&mut App, T) + Send + 'static,
    {
        self.outstanding += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let value = work.await;
            let completion = Completion {
                tracked: true,
                apply: Box::new(move |app: &mut App| apply(app, value)),
            };
            if tx.send(completion).is_err() {
                warn!("app dropped before a request completed");
            }
        });
    }

    fn finish_creation(&mut self, kind: FormKind, outcome: Result<Created, AppError>) {
        let succeeded = match kind {
            FormKind::Task => self.screens.task_form.finish(outcome),
            FormKind::Group => self.screens.group_form.finish(outcome),
        };

        let main = self.host.main_button();
        if !succeeded {
            main.hide();
            return;
        }

        main.set_label(kind.confirmation_label());
        main.show();

        let tx = self.tx.clone();
        let action = DelayedAction::schedule(self.options.confirmation_delay, move || {
            let _ = tx.send(Completion {
                tracked: false,
                apply: Box::new(move |app: &mut App| app.complete_creation(kind)),
            });
        });
        match kind {
            FormKind::Task => self.screens.task_form.set_confirmation(action),
            FormKind::Group => self.screens.group_form.set_confirmation(action),
        }
    }

    fn complete_creation(&mut self, kind: FormKind) {
        let pending = match kind {
            FormKind::Task => self.screens.task_form.has_confirmation(),
            FormKind::Group => self.screens.group_form.has_confirmation(),
        };
        if !pending {
            return;
        }

        self.host.main_button().hide();
        match kind {
            FormKind::Task => self.screens.task_form.reset(),
            FormKind::Group => {
                self.screens.group_form.reset();
                self.navigate(Screen::AdminAllGroups);
            }
        }
    }

    /// Main-button click: finishes a pending creation without waiting.
    fn dismiss_confirmation(&mut self) {
        if self.screens.task_form.has_confirmation() {
            self.complete_creation(FormKind::Task);
        } else if self.screens.group_form.has_confirmation() {
            self.complete_creation(FormKind::Group);
        }
    }

    fn cancel_confirmations(&mut self) {
        let task = self.screens.task_form.cancel_confirmation();
        let group = self.screens.group_form.cancel_confirmation();
        if task || group {
            self.host.main_button().hide();
        }
    }

    fn sync_chrome(&self) {
        let back = self.host.back_button();
        match self.store.view() {
            View::Screen(screen) if screen.is_details() => back.show(),
            View::Screen(_) => back.hide(),
            View::Error(_) | View::Loading => {
                back.hide();
                self.host.main_button().hide();
            }
        }
    }
}

fn backend_unavailable() -> AppError {
    AppError::Configuration("Backend address is not configured".to_string())
}
