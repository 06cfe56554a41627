//! Routes and the navigation seam.
//!
//! The client never decides *how* a navigation happens; it asks a
//! [`Navigator`] to either push a route (client-side, keeps in-memory state)
//! or assign one (hard navigation that discards the current page).

use parking_lot::Mutex;

/// Top-level routes the session lifecycle navigates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Credential entry. Public.
    Login,
    /// First-run admin creation. Public.
    Setup,
    /// Protected dashboard root.
    Dashboard,
}

impl Route {
    /// Path of this route.
    pub const fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Setup => "/setup",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Whether the route is reachable without a session.
    pub const fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Setup)
    }

    /// Resolve a path to its top-level route.
    ///
    /// Anything under `/dashboard/` belongs to the dashboard.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        match path {
            "/login" => Some(Route::Login),
            "/setup" => Some(Route::Setup),
            "/dashboard" => Some(Route::Dashboard),
            p if p.starts_with("/dashboard/") => Some(Route::Dashboard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// True for the public entry points, where an absent session must not
/// trigger a redirect.
pub fn is_public_path(path: &str) -> bool {
    Route::from_path(path).is_some_and(Route::is_public)
}

/// Navigation layer the session lifecycle drives.
pub trait Navigator: Send + Sync {
    /// Current path.
    fn pathname(&self) -> String;

    /// Client-side navigation.
    fn push(&self, path: &str);

    /// Hard navigation; in-memory page state does not survive it.
    fn assign(&self, path: &str);
}

/// How a recorded navigation was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Push,
    Assign,
}

/// A single recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub kind: NavigationKind,
    pub path: String,
}

/// In-memory navigator that tracks the current path and records every
/// navigation.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug)]
struct MemoryInner {
    current: String,
    history: Vec<Navigation>,
}

impl MemoryNavigator {
    /// Create a navigator starting at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                current: path.into(),
                history: Vec::new(),
            }),
        }
    }

    /// All navigations performed so far, oldest first.
    pub fn history(&self) -> Vec<Navigation> {
        self.inner.lock().history.clone()
    }

    /// Number of navigations (of any kind) to `path`.
    pub fn count_to(&self, path: &str) -> usize {
        self.inner
            .lock()
            .history
            .iter()
            .filter(|n| n.path == path)
            .count()
    }

    /// Route of the current path, if it is a known one.
    pub fn route(&self) -> Option<Route> {
        Route::from_path(&self.inner.lock().current)
    }

    fn record(&self, kind: NavigationKind, path: &str) {
        let mut inner = self.inner.lock();
        inner.current = path.to_string();
        inner.history.push(Navigation {
            kind,
            path: path.to_string(),
        });
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Dashboard.path())
    }
}

impl Navigator for MemoryNavigator {
    fn pathname(&self) -> String {
        self.inner.lock().current.clone()
    }

    fn push(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.record(NavigationKind::Push, path);
    }

    fn assign(&self, path: &str) {
        tracing::debug!(path, "hard navigate");
        self.record(NavigationKind::Assign, path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::Setup.path(), "/setup");
        assert_eq!(Route::Dashboard.to_string(), "/dashboard");
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/setup/"), Some(Route::Setup));
        assert_eq!(
            Route::from_path("/dashboard/domains?page=2"),
            Some(Route::Dashboard)
        );
        assert_eq!(Route::from_path("/dashboardx"), None);
        assert_eq!(Route::from_path("/"), None);
    }

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/login"));
        assert!(is_public_path("/setup"));
        assert!(!is_public_path("/dashboard"));
        assert!(!is_public_path("/dashboard/providers"));
        assert!(!is_public_path("/"));
    }

    #[test]
    fn test_memory_navigator_records() {
        let nav = MemoryNavigator::new("/dashboard");
        nav.push("/login");
        nav.assign("/login");

        assert_eq!(nav.pathname(), "/login");
        assert_eq!(nav.route(), Some(Route::Login));
        assert_eq!(nav.count_to("/login"), 2);
        assert_eq!(
            nav.history(),
            vec![
                Navigation {
                    kind: NavigationKind::Push,
                    path: "/login".into()
                },
                Navigation {
                    kind: NavigationKind::Assign,
                    path: "/login".into()
                },
            ]
        );
    }
}
