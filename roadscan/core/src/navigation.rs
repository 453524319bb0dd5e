//! Navigation Shell
//!
//! Picks which screens exist from the identity state. This is a pure
//! state-to-view mapping:
//!
//! | State          | Graph             | Screens                        |
//! |----------------|-------------------|--------------------------------|
//! | `Initializing` | `Splash`          | (none)                         |
//! | `SignedOut`    | `Unauthenticated` | Login                          |
//! | `SignedIn`     | `Authenticated`   | Home, Account (tabs), Detect   |
//!
//! [`Navigator`] adds a back stack on top so surfaces can push Detect from
//! Home and pop back, and resets to the graph root whenever the graph
//! changes (sign-in, sign-out).

use thiserror::Error;

use crate::session::AuthState;

/// A renderable screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Email/password form
    Login,
    /// Home tab
    Home,
    /// Account tab
    Account,
    /// Live capture-and-classify screen
    Detect,
}

impl Screen {
    /// Header title for the screen
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            // The detect screen keeps the "Home" header with a back action
            Self::Login => "Log In",
            Self::Home | Self::Detect => "Home",
            Self::Account => "Account",
        }
    }

    /// The tab this screen belongs to, if it is a tab
    #[must_use]
    pub fn tab(self) -> Option<Tab> {
        match self {
            Self::Home => Some(Tab::Home),
            Self::Account => Some(Tab::Account),
            _ => None,
        }
    }
}

/// Tabs of the authenticated home
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tab {
    /// Welcome / start detection
    Home,
    /// Signed-in account
    Account,
}

impl Tab {
    /// All tabs in display order
    pub const ALL: [Tab; 2] = [Tab::Home, Tab::Account];

    /// Screen shown for this tab
    #[must_use]
    pub fn screen(self) -> Screen {
        match self {
            Self::Home => Screen::Home,
            Self::Account => Screen::Account,
        }
    }

    /// Tab bar label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Account => "Account",
        }
    }

    /// The other tab
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Home => Self::Account,
            Self::Account => Self::Home,
        }
    }
}

/// The set of screens available for an identity state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenGraph {
    /// Identity state not known yet: render nothing
    Splash,
    /// Signed out: Login only
    Unauthenticated,
    /// Signed in: tabs plus Detect
    Authenticated,
}

impl ScreenGraph {
    /// Pure mapping from identity state to screen graph
    #[must_use]
    pub fn for_state(state: &AuthState) -> Self {
        match state {
            AuthState::Initializing => Self::Splash,
            AuthState::SignedOut => Self::Unauthenticated,
            AuthState::SignedIn(_) => Self::Authenticated,
        }
    }

    /// Screens reachable in this graph
    #[must_use]
    pub fn screens(self) -> &'static [Screen] {
        match self {
            Self::Splash => &[],
            Self::Unauthenticated => &[Screen::Login],
            Self::Authenticated => &[Screen::Home, Screen::Account, Screen::Detect],
        }
    }

    /// Whether `screen` is reachable
    #[must_use]
    pub fn contains(self, screen: Screen) -> bool {
        self.screens().contains(&screen)
    }

    /// First screen shown when the graph is entered
    #[must_use]
    pub fn root(self) -> Option<Screen> {
        self.screens().first().copied()
    }
}

/// Navigation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// The screen is not part of the current graph
    #[error("{screen:?} is not reachable while {graph:?}")]
    Unreachable {
        /// Requested screen
        screen: Screen,
        /// Graph in effect
        graph: ScreenGraph,
    },
}

/// Back stack within the current screen graph
#[derive(Clone, Debug)]
pub struct Navigator {
    graph: ScreenGraph,
    stack: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(&AuthState::Initializing)
    }
}

impl Navigator {
    /// Create a navigator positioned at the root for `state`
    #[must_use]
    pub fn new(state: &AuthState) -> Self {
        let graph = ScreenGraph::for_state(state);
        Self {
            graph,
            stack: graph.root().into_iter().collect(),
        }
    }

    /// Graph in effect
    #[must_use]
    pub fn graph(&self) -> ScreenGraph {
        self.graph
    }

    /// Screen on top of the stack (`None` while on the splash)
    #[must_use]
    pub fn current(&self) -> Option<Screen> {
        self.stack.last().copied()
    }

    /// Stack depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Follow an identity change.
    ///
    /// Returns true when the graph changed and the stack was reset.
    pub fn apply(&mut self, state: &AuthState) -> bool {
        let graph = ScreenGraph::for_state(state);
        if graph == self.graph {
            return false;
        }
        tracing::debug!(from = ?self.graph, to = ?graph, "Screen graph changed");
        self.graph = graph;
        self.stack = graph.root().into_iter().collect();
        true
    }

    /// Push a screen
    pub fn navigate(&mut self, screen: Screen) -> Result<(), NavigationError> {
        if !self.graph.contains(screen) {
            return Err(NavigationError::Unreachable {
                screen,
                graph: self.graph,
            });
        }
        if self.current() != Some(screen) {
            self.stack.push(screen);
        }
        Ok(())
    }

    /// Pop back one screen. Returns false at the root.
    pub fn back(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Currently selected tab (the tab screen nearest the top of the stack)
    #[must_use]
    pub fn active_tab(&self) -> Option<Tab> {
        self.stack.iter().rev().find_map(|s| s.tab())
    }

    /// Switch tabs. Only valid while a tab screen is on top.
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), NavigationError> {
        let screen = tab.screen();
        if !self.graph.contains(screen) {
            return Err(NavigationError::Unreachable {
                screen,
                graph: self.graph,
            });
        }
        match self.stack.last_mut() {
            Some(top) if top.tab().is_some() => {
                *top = screen;
                Ok(())
            }
            _ => Err(NavigationError::Unreachable {
                screen,
                graph: self.graph,
            }),
        }
    }
}
