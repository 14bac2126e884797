use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use frontend::api::ReqwestTransport;
use frontend::config::ClientConfig;
use frontend::host::NoopHost;
use frontend::navigation::{Screen, View};
use frontend::screens::RemoteResult;
use frontend::{App, AppOptions};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "frontend=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ClientConfig::new_from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let transport = match ReqwestTransport::new() {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let host = Arc::new(NoopHost::new(config.init_data.clone()));
    let mut app = App::launch(&config.launch_url, host, transport, AppOptions::from(&config));
    if let Some(user) = app.user_hint() {
        info!("host reports user {} ({})", user.display_name, user.id);
    }
    app.load_identity().await;
    app.settle().await;

    match app.view() {
        View::Error(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
        View::Loading => {
            warn!("identity never arrived");
            ExitCode::FAILURE
        }
        View::Screen(screen) => {
            report(&app, screen);
            ExitCode::SUCCESS
        }
    }
}

fn report(app: &App, screen: Screen) {
    let screens = app.screens();
    info!("showing {}", screen);

    match screen {
        Screen::TasksList => log_result("tasks", screens.tasks.result(), |tasks| {
            for task in tasks {
                info!("  [{}] {} / {} due {}", task.id, task.title, task.project, task.deadline);
            }
        }),
        Screen::GroupsList => log_result("groups", screens.groups.result(), |groups| {
            for group in groups {
                info!("  [{}] {}", group.id, group.name);
            }
        }),
        Screen::AdminAllGroups => log_result("all groups", screens.all_groups.result(), |groups| {
            for group in groups {
                info!("  [{}] {}", group.id, group.name);
            }
        }),
        Screen::AdminCreateTask | Screen::AdminCreateGroup => {
            info!("admin form ready");
        }
        Screen::TaskDetails | Screen::GroupDetails => {}
    }
}

fn log_result<T>(label: &str, result: &RemoteResult<Vec<T>>, print: impl Fn(&[T])) {
    match result {
        RemoteResult::Pending => warn!("{} still loading", label),
        RemoteResult::Error(message) => error!("{}: {}", label, message),
        RemoteResult::Ready(items) => {
            info!("{} {}", items.len(), label);
            print(items.as_slice());
        }
    }
}
