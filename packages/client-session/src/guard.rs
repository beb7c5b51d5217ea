//! Route-guard decisions over the stored session.

use crate::session::StoredSession;

/// What a route requires. `User` covers every protected non-admin view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    User,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Missing/corrupt session, or insufficient role for an admin route.
    RedirectToLogin,
    /// Admins landing on user-only views are sent to the admin panel.
    RedirectToAdminPanel,
}

/// Decide before rendering a protected view.
///
/// Guests may browse user routes but never admin routes. Admins are pushed
/// off user routes so the two surfaces stay separate.
pub fn route_decision(session: Option<&StoredSession>, access: RouteAccess) -> GuardDecision {
    let Some(session) = session else {
        return GuardDecision::RedirectToLogin;
    };

    match access {
        RouteAccess::Admin => {
            if session.is_guest || session.role.as_deref() != Some("admin") {
                GuardDecision::RedirectToLogin
            } else {
                GuardDecision::Allow
            }
        }
        RouteAccess::User => {
            if session.is_admin() {
                GuardDecision::RedirectToAdminPanel
            } else {
                GuardDecision::Allow
            }
        }
    }
}
