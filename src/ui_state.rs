//! Per-session UI state containers.
//!
//! Each container is constructed explicitly with a known initial value and
//! reset explicitly when its page or session ends. Nothing here is global.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Sidebar and theme for the dashboard shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LayoutState {
    pub sidebar_open: bool,
    pub theme: Theme,
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            sidebar_open: true,
            theme: Theme::System,
        }
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand/collapse flag of the document side panel on a thread page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PanelState {
    pub expanded: bool,
}

impl PanelState {
    pub fn new() -> Self {
        Self { expanded: false }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// The space the user is currently working in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpaceState {
    pub current: Option<Uuid>,
}

impl SpaceState {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Returns true when the selection actually changed.
    pub fn select(&mut self, space_id: Uuid) -> bool {
        let changed = self.current != Some(space_id);
        self.current = Some(space_id);
        changed
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// UiSession
///
/// All containers for one signed-in session, injected into the page tree
/// at startup and reset on sign-out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UiSession {
    pub layout: LayoutState,
    pub panel: PanelState,
    pub space: SpaceState,
}

impl UiSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switching spaces closes the document panel, which belonged to the
    /// previous space.
    pub fn select_space(&mut self, space_id: Uuid) {
        if self.space.select(space_id) {
            self.panel.collapse();
        }
    }

    pub fn reset(&mut self) {
        self.layout.reset();
        self.panel.reset();
        self.space.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_values() {
        let session = UiSession::new();
        assert!(session.layout.sidebar_open);
        assert_eq!(session.layout.theme, Theme::System);
        assert!(!session.panel.expanded);
        assert_eq!(session.space.current, None);
    }

    #[test]
    fn panel_toggles() {
        let mut panel = PanelState::new();
        panel.toggle();
        assert!(panel.expanded);
        panel.toggle();
        assert!(!panel.expanded);
        panel.expand();
        panel.reset();
        assert!(!panel.expanded);
    }

    #[test]
    fn switching_space_collapses_panel() {
        let mut session = UiSession::new();
        let first = Uuid::new_v4();
        session.select_space(first);
        session.panel.expand();

        // Re-selecting the same space keeps the panel open.
        session.select_space(first);
        assert!(session.panel.expanded);

        session.select_space(Uuid::new_v4());
        assert!(!session.panel.expanded);
    }

    #[test]
    fn reset_restores_every_container() {
        let mut session = UiSession::new();
        session.layout.toggle_sidebar();
        session.layout.set_theme(Theme::Dark);
        session.panel.expand();
        session.select_space(Uuid::new_v4());

        session.reset();
        assert_eq!(session, UiSession::new());
    }

    #[test]
    fn containers_are_independent() {
        let mut a = UiSession::new();
        let b = UiSession::new();
        a.layout.toggle_sidebar();
        assert!(!a.layout.sidebar_open);
        assert!(b.layout.sidebar_open);
    }

    #[test]
    fn clearing_space() {
        let mut space = SpaceState::new();
        assert!(space.select(Uuid::new_v4()));
        space.clear();
        assert_eq!(space.current, None);
    }
}
