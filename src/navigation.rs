//! Screens, drill-down selection and the rules that decide what is shown.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Screen {
    #[serde(rename = "myTasks")]
    TasksList,
    TaskDetails,
    #[serde(rename = "myGroups")]
    GroupsList,
    GroupDetails,
    AdminCreateTask,
    AdminCreateGroup,
    AdminAllGroups,
}

impl Screen {
    pub const DEFAULT: Screen = Screen::TasksList;

    pub const ALL: [Screen; 7] = [
        Screen::TasksList,
        Screen::TaskDetails,
        Screen::GroupsList,
        Screen::GroupDetails,
        Screen::AdminCreateTask,
        Screen::AdminCreateGroup,
        Screen::AdminAllGroups,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Screen::TasksList => "myTasks",
            Screen::TaskDetails => "taskDetails",
            Screen::GroupsList => "myGroups",
            Screen::GroupDetails => "groupDetails",
            Screen::AdminCreateTask => "adminCreateTask",
            Screen::AdminCreateGroup => "adminCreateGroup",
            Screen::AdminAllGroups => "adminAllGroups",
        }
    }

    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            Screen::AdminCreateTask | Screen::AdminCreateGroup | Screen::AdminAllGroups
        )
    }

    pub fn is_details(self) -> bool {
        matches!(self, Screen::TaskDetails | Screen::GroupDetails)
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownScreen(pub String);

impl fmt::Display for UnknownScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown screen `{}`", self.0)
    }
}

impl std::error::Error for UnknownScreen {}

impl FromStr for Screen {
    type Err = UnknownScreen;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Screen::ALL
            .into_iter()
            .find(|screen| screen.name() == s)
            .ok_or_else(|| UnknownScreen(s.to_string()))
    }
}

/// Nominal tab plus the drill-down selection. At most one selection is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current: Screen,
    pub selected_task: Option<String>,
    pub selected_group: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current: Screen::DEFAULT,
            selected_task: None,
            selected_group: None,
        }
    }
}

impl NavigationState {
    pub fn navigate(&self, screen: Screen) -> Self {
        Self {
            current: screen,
            selected_task: None,
            selected_group: None,
        }
    }

    pub fn select_task(&self, id: impl Into<String>) -> Self {
        Self {
            current: self.current,
            selected_task: Some(id.into()),
            selected_group: None,
        }
    }

    pub fn select_group(&self, id: impl Into<String>) -> Self {
        Self {
            current: self.current,
            selected_task: None,
            selected_group: Some(id.into()),
        }
    }

    /// Leaves a drill-down for its owning list, otherwise goes to the
    /// default tab.
    pub fn back(&self) -> Self {
        if self.selected_task.is_some() {
            self.navigate(Screen::TasksList)
        } else if self.selected_group.is_some() {
            self.navigate(Screen::GroupsList)
        } else {
            self.navigate(Screen::DEFAULT)
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selected_task.is_some() || self.selected_group.is_some()
    }

    /// Screen to render once the session is healthy and identity is known.
    pub fn effective_screen(&self) -> Screen {
        if self.selected_task.is_some() {
            return Screen::TaskDetails;
        }
        if self.selected_group.is_some() {
            return Screen::GroupDetails;
        }
        match self.current {
            // A details tab without a selection has nothing to show.
            Screen::TaskDetails | Screen::GroupDetails => Screen::DEFAULT,
            screen => screen,
        }
    }
}

/// What the presentation layer should draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Error(String),
    Loading,
    Screen(Screen),
}

impl View {
    pub fn screen(&self) -> Option<Screen> {
        match self {
            View::Screen(screen) => Some(*screen),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_names_round_trip_through_from_str() {
        for screen in Screen::ALL {
            assert_eq!(screen.name().parse::<Screen>(), Ok(screen));
        }
        assert!("settings".parse::<Screen>().is_err());
    }

    #[test]
    fn serde_uses_screen_names() {
        let json = serde_json::to_string(&Screen::AdminAllGroups).expect("serialize");
        assert_eq!(json, "\"adminAllGroups\"");
        let screen: Screen = serde_json::from_str("\"myTasks\"").expect("deserialize");
        assert_eq!(screen, Screen::TasksList);
    }

    #[test]
    fn navigate_clears_selection_even_on_same_screen() {
        let state = NavigationState::default().select_task("7");
        let next = state.navigate(Screen::TasksList);
        assert_eq!(next, NavigationState::default());
    }

    #[test]
    fn selection_overrides_current_tab() {
        let state = NavigationState::default()
            .navigate(Screen::AdminAllGroups)
            .select_group("g1");
        assert_eq!(state.current, Screen::AdminAllGroups);
        assert_eq!(state.effective_screen(), Screen::GroupDetails);
    }

    #[test]
    fn selecting_one_kind_clears_the_other() {
        let state = NavigationState::default().select_group("g1").select_task("t1");
        assert_eq!(state.selected_group, None);
        assert_eq!(state.effective_screen(), Screen::TaskDetails);
    }

    #[test]
    fn back_returns_to_owning_list() {
        let from_task = NavigationState::default()
            .navigate(Screen::GroupsList)
            .select_task("t1")
            .back();
        assert_eq!(from_task.effective_screen(), Screen::TasksList);
        assert!(!from_task.has_selection());

        let from_group = NavigationState::default().select_group("g1").back();
        assert_eq!(from_group.effective_screen(), Screen::GroupsList);
    }

    #[test]
    fn back_without_selection_goes_to_default_tab() {
        let state = NavigationState::default().navigate(Screen::GroupsList).back();
        assert_eq!(state.effective_screen(), Screen::TasksList);
    }

    #[test]
    fn details_tab_without_selection_falls_back() {
        let state = NavigationState::default().navigate(Screen::GroupDetails);
        assert_eq!(state.effective_screen(), Screen::TasksList);
    }
}
