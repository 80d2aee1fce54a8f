//! Route guard.
//!
//! One decision per navigation: given what kind of page is being opened and
//! the current session, either let it through or name where to go instead.

use chrono::{DateTime, Utc};

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Anyone may open it.
    Public,
    /// Only for visitors without a session (login, sign-up).
    GuestOnly,
    /// Requires a live session.
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Redirect targets used by `GuardPaths::decide`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPaths {
    pub login: String,
    pub home: String,
}

impl Default for GuardPaths {
    fn default() -> Self {
        GuardPaths {
            login: "/login".to_string(),
            home: "/dashboard".to_string(),
        }
    }
}

impl GuardPaths {
    pub fn decide(
        &self,
        access: RouteAccess,
        session: Option<&Session>,
        now: DateTime<Utc>,
    ) -> GuardDecision {
        let signed_in = session.is_some_and(|s| !s.is_expired(now));

        match access {
            RouteAccess::Protected if !signed_in => GuardDecision::Redirect(self.login.clone()),
            RouteAccess::GuestOnly if signed_in => GuardDecision::Redirect(self.home.clone()),
            _ => GuardDecision::Allow,
        }
    }
}

/// Decide a navigation with the default `/login` and `/dashboard` targets.
pub fn decide(access: RouteAccess, session: Option<&Session>, now: DateTime<Utc>) -> GuardDecision {
    GuardPaths::default().decide(access, session, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::UserRecord;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn session(ttl_hours: i64) -> Session {
        Session::issue(
            UserRecord {
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            now(),
            Duration::hours(ttl_hours),
        )
    }

    #[test]
    fn test_protected_route_needs_session() {
        assert_eq!(
            decide(RouteAccess::Protected, None, now()),
            GuardDecision::Redirect("/login".to_string())
        );
        assert_eq!(
            decide(RouteAccess::Protected, Some(&session(1)), now()),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_expired_session_counts_as_signed_out() {
        let expired = session(1);
        let later = now() + Duration::hours(2);
        assert_eq!(
            decide(RouteAccess::Protected, Some(&expired), later),
            GuardDecision::Redirect("/login".to_string())
        );
        assert_eq!(decide(RouteAccess::GuestOnly, Some(&expired), later), GuardDecision::Allow);
    }

    #[test]
    fn test_guest_only_route_sends_signed_in_users_home() {
        assert_eq!(
            decide(RouteAccess::GuestOnly, Some(&session(1)), now()),
            GuardDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(decide(RouteAccess::GuestOnly, None, now()), GuardDecision::Allow);
    }

    #[test]
    fn test_public_route_always_allowed() {
        assert_eq!(decide(RouteAccess::Public, None, now()), GuardDecision::Allow);
        assert_eq!(
            decide(RouteAccess::Public, Some(&session(1)), now()),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_custom_paths() {
        let paths = GuardPaths {
            login: "/signin".to_string(),
            home: "/".to_string(),
        };
        assert_eq!(
            paths.decide(RouteAccess::Protected, None, now()),
            GuardDecision::Redirect("/signin".to_string())
        );
    }
}
