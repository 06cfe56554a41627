//! Response classification and the session-expiry side channel.
//!
//! Every call made through [`DashboardClient`](crate::DashboardClient) is
//! classified with [`classify`] once it completes. A 401 from anywhere but
//! the authentication probe means a session that used to be valid has
//! expired; the installed [`SessionExpiryDispatcher`] then notifies the
//! user and schedules a hard navigation to the login page. The result of
//! the call is returned to the caller unchanged either way.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::Result;
use crate::navigation::{Navigator, Route};
use crate::notify::{Notice, Notifier};

/// API path of the authentication probe.
pub const PROBE_PATH: &str = "auth/me";

/// Delay between the expiry notice and the redirect to the login page.
pub const DEFAULT_EXPIRY_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Outcome of a completed call, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// The call succeeded.
    Ok,
    /// The session expired mid-use.
    Unauthorized,
    /// Any other failure, left to the caller.
    OtherError,
}

/// Whether `path` addresses the authentication probe.
pub fn is_probe_path(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    let path = path.split('?').next().unwrap_or_default();
    path.trim_end_matches('/') == PROBE_PATH
}

/// Classify the result of a call to `path`.
///
/// A 401 from the probe is the normal answer for an anonymous visitor and
/// is therefore not `Unauthorized`.
pub fn classify<T>(path: &str, result: &Result<T>) -> ResponseClass {
    match result {
        Ok(_) => ResponseClass::Ok,
        Err(err) if err.is_unauthorized() && !is_probe_path(path) => ResponseClass::Unauthorized,
        Err(_) => ResponseClass::OtherError,
    }
}

/// Reacts to [`ResponseClass::Unauthorized`] with a notice and a delayed
/// hard navigation to `/login`.
///
/// Every expiry produces a notice. While a redirect is already scheduled,
/// further expiries do not schedule another one.
#[derive(Clone)]
pub struct SessionExpiryDispatcher {
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,
    redirect_pending: Arc<AtomicBool>,
}

impl SessionExpiryDispatcher {
    /// Create a dispatcher with the default redirect delay.
    pub fn new(notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            notifier,
            navigator,
            redirect_delay: DEFAULT_EXPIRY_REDIRECT_DELAY,
            redirect_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the delay before the redirect.
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Configured redirect delay.
    pub fn redirect_delay(&self) -> Duration {
        self.redirect_delay
    }

    /// Act on a classified response.
    ///
    /// Returns the handle of the scheduled redirect, if one was scheduled.
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, class: ResponseClass) -> Option<JoinHandle<()>> {
        if class != ResponseClass::Unauthorized {
            return None;
        }

        tracing::warn!("session expired, redirecting to login");
        self.notifier.notify(&Notice::session_expired());

        if self.redirect_pending.swap(true, Ordering::AcqRel) {
            return None;
        }

        let navigator = Arc::clone(&self.navigator);
        let pending = Arc::clone(&self.redirect_pending);
        let delay = self.redirect_delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.assign(Route::Login.path());
            pending.store(false, Ordering::Release);
        }))
    }
}

impl std::fmt::Debug for SessionExpiryDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpiryDispatcher")
            .field("redirect_delay", &self.redirect_delay)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::navigation::{MemoryNavigator, NavigationKind};
    use crate::notify::MemoryNotifier;

    fn status(status: u16) -> Result<()> {
        Err(Error::Api {
            status,
            detail: None,
            message: String::new(),
        })
    }

    #[test]
    fn test_probe_path_matching() {
        assert!(is_probe_path("auth/me"));
        assert!(is_probe_path("/auth/me"));
        assert!(is_probe_path("auth/me/"));
        assert!(is_probe_path("auth/me?fields=id"));
        assert!(!is_probe_path("auth/logout"));
        assert!(!is_probe_path("auth/members"));
        assert!(!is_probe_path("domains"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("domains", &Ok(())), ResponseClass::Ok);
        assert_eq!(classify("domains", &status(401)), ResponseClass::Unauthorized);
        assert_eq!(classify("auth/me", &status(401)), ResponseClass::OtherError);
        assert_eq!(classify("domains", &status(403)), ResponseClass::OtherError);
        assert_eq!(classify("domains", &status(500)), ResponseClass::OtherError);
    }

    fn dispatcher() -> (
        SessionExpiryDispatcher,
        Arc<MemoryNotifier>,
        Arc<MemoryNavigator>,
    ) {
        let notifier = Arc::new(MemoryNotifier::new());
        let navigator = Arc::new(MemoryNavigator::new("/dashboard/domains"));
        let dispatcher = SessionExpiryDispatcher::new(notifier.clone(), navigator.clone());
        (dispatcher, notifier, navigator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_notifies_then_redirects_after_delay() {
        let (dispatcher, notifier, navigator) = dispatcher();

        let handle = dispatcher.dispatch(ResponseClass::Unauthorized).unwrap();
        assert_eq!(notifier.notices(), vec![Notice::session_expired()]);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(navigator.history().is_empty());

        handle.await.unwrap();
        let history = navigator.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, NavigationKind::Assign);
        assert_eq!(history[0].path, "/login");
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_classes_are_ignored() {
        let (dispatcher, notifier, navigator) = dispatcher();

        assert!(dispatcher.dispatch(ResponseClass::Ok).is_none());
        assert!(dispatcher.dispatch(ResponseClass::OtherError).is_none());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(notifier.notices().is_empty());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_expiries_schedules_one_redirect() {
        let (dispatcher, notifier, navigator) = dispatcher();

        let first = dispatcher.dispatch(ResponseClass::Unauthorized);
        let second = dispatcher.dispatch(ResponseClass::Unauthorized);
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(notifier.notices().len(), 2);

        first.unwrap().await.unwrap();
        assert_eq!(navigator.count_to("/login"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_delay() {
        let (dispatcher, _notifier, navigator) = dispatcher();
        let dispatcher = dispatcher.with_redirect_delay(Duration::from_millis(250));
        assert_eq!(dispatcher.redirect_delay(), Duration::from_millis(250));

        let handle = dispatcher.dispatch(ResponseClass::Unauthorized).unwrap();
        tokio::time::timeout(Duration::from_millis(300), handle)
            .await
            .expect("redirect fires before the default delay")
            .unwrap();
        assert_eq!(navigator.pathname(), "/login");
    }
}
