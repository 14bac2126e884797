//! Session snapshot and its single update entry point.

use tracing::{debug, info, warn};

use crate::config::Endpoint;
use crate::models::Identity;
use crate::navigation::{NavigationState, Screen, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    EndpointResolved(Endpoint),
    ConfigurationFailed(String),
    IdentityLoaded(Identity),
    IdentityFailed(String),
    Navigate(Screen),
    SelectTask(String),
    SelectGroup(String),
    Back,
}

/// Immutable session snapshot. Replaced wholesale by [`reduce`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub endpoint: Option<Endpoint>,
    pub identity: Option<Identity>,
    /// Configuration or identity failure; ends the session.
    pub fatal: Option<String>,
    pub navigation: NavigationState,
    initial_redirect_done: bool,
}

impl Session {
    /// Resolution order: fatal error, loading, task, group, nominal tab.
    pub fn view(&self) -> View {
        if let Some(message) = &self.fatal {
            return View::Error(message.clone());
        }
        if self.identity.is_none() {
            return View::Loading;
        }
        View::Screen(self.navigation.effective_screen())
    }

    fn is_admin(&self) -> bool {
        self.identity.as_ref().is_some_and(Identity::is_admin)
    }
}

pub fn reduce(session: &Session, action: Action) -> Session {
    let mut next = session.clone();

    match action {
        Action::EndpointResolved(endpoint) => {
            if next.endpoint.is_some() {
                warn!("endpoint already resolved, ignoring {}", endpoint.as_url());
            } else {
                next.endpoint = Some(endpoint);
            }
        }
        Action::ConfigurationFailed(message) | Action::IdentityFailed(message) => {
            if next.fatal.is_none() {
                next.fatal = Some(message);
            }
        }
        Action::IdentityLoaded(identity) => {
            if next.identity.is_some() {
                warn!("identity already loaded, ignoring {}", identity.id);
                return next;
            }
            if identity.is_admin() && !next.initial_redirect_done {
                next.navigation = next.navigation.navigate(Screen::AdminCreateTask);
            }
            next.initial_redirect_done = true;
            next.identity = Some(identity);
        }
        Action::Navigate(_) | Action::SelectTask(_) | Action::SelectGroup(_) | Action::Back
            if next.fatal.is_some() =>
        {
            debug!("session failed, ignoring {:?}", action);
        }
        Action::Navigate(screen) => {
            if screen.requires_admin() && !next.is_admin() {
                warn!("screen {} requires the admin role", screen);
            } else {
                next.navigation = next.navigation.navigate(screen);
            }
        }
        Action::SelectTask(id) => next.navigation = next.navigation.select_task(id),
        Action::SelectGroup(id) => next.navigation = next.navigation.select_group(id),
        Action::Back => next.navigation = next.navigation.back(),
    }

    next
}

#[derive(Debug, Default)]
pub struct Store {
    session: Session,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn view(&self) -> View {
        self.session.view()
    }

    pub fn dispatch(&mut self, action: Action) -> &Session {
        debug!("dispatch {:?}", action);
        let before = self.session.view();
        self.session = reduce(&self.session, action);
        let after = self.session.view();
        if before != after {
            info!("view {:?} -> {:?}", before, after);
        }
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn identity(role: Role) -> Identity {
        Identity {
            id: "1".to_string(),
            name: "Ada".to_string(),
            role,
        }
    }

    fn loaded(role: Role) -> Session {
        reduce(&Session::default(), Action::IdentityLoaded(identity(role)))
    }

    #[test]
    fn loading_until_identity_arrives() {
        let session = Session::default();
        assert_eq!(session.view(), View::Loading);
        assert_eq!(loaded(Role::User).view(), View::Screen(Screen::TasksList));
    }

    #[test]
    fn fatal_error_overrides_everything() {
        let session = reduce(&loaded(Role::User), Action::SelectTask("t1".to_string()));
        let session = reduce(&session, Action::IdentityFailed("boom".to_string()));
        assert_eq!(session.view(), View::Error("boom".to_string()));
    }

    #[test]
    fn first_fatal_message_wins() {
        let session = reduce(
            &Session::default(),
            Action::ConfigurationFailed("missing apiUrl".to_string()),
        );
        let session = reduce(&session, Action::IdentityFailed("later".to_string()));
        assert_eq!(session.fatal.as_deref(), Some("missing apiUrl"));
    }

    #[test]
    fn admin_is_redirected_once() {
        let session = loaded(Role::Admin);
        assert_eq!(session.view(), View::Screen(Screen::AdminCreateTask));

        let session = reduce(&session, Action::Navigate(Screen::TasksList));
        assert_eq!(session.view(), View::Screen(Screen::TasksList));

        let again = reduce(&session, Action::IdentityLoaded(identity(Role::Admin)));
        assert_eq!(again.view(), View::Screen(Screen::TasksList));
    }

    #[test]
    fn users_cannot_open_admin_screens() {
        let session = reduce(&loaded(Role::User), Action::Navigate(Screen::AdminAllGroups));
        assert_eq!(session.view(), View::Screen(Screen::TasksList));
    }

    #[test]
    fn navigation_is_frozen_after_failure() {
        let session = reduce(&Session::default(), Action::ConfigurationFailed("x".to_string()));
        let after = reduce(&session, Action::SelectGroup("g".to_string()));
        assert_eq!(after, session);
    }

    #[test]
    fn endpoint_is_write_once() {
        let first = Endpoint::parse("https://a.example").expect("endpoint");
        let second = Endpoint::parse("https://b.example").expect("endpoint");
        let mut store = Store::new();
        store.dispatch(Action::EndpointResolved(first.clone()));
        store.dispatch(Action::EndpointResolved(second));
        assert_eq!(store.session().endpoint, Some(first));
    }
}
