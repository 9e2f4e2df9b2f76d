//! Viewer identity for gating decisions.

use crate::subscription::UserId;

/// The identity behind the current request or screen.
///
/// Gating entry points take the viewer explicitly instead of reading
/// ambient session state, which keeps them deterministic and testable.
/// Anonymous viewers can still browse; purchase and cancellation require
/// a signed-in account.
///
/// # Examples
///
/// ```
/// use activity_gate::{CurrentUser, subscription::UserId};
///
/// let anonymous = CurrentUser::Anonymous;
/// assert!(anonymous.user_id().is_none());
///
/// let viewer = CurrentUser::SignedIn(UserId::new("parent-42").unwrap());
/// assert!(viewer.is_signed_in());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    /// No one is signed in.
    Anonymous,
    /// A signed-in account.
    SignedIn(UserId),
}

impl CurrentUser {
    /// Returns the signed-in user id, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::SignedIn(id) => Some(id),
        }
    }

    /// Returns true if a user is signed in.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_user_id() {
        assert!(CurrentUser::Anonymous.user_id().is_none());
        assert!(!CurrentUser::Anonymous.is_signed_in());
    }

    #[test]
    fn test_signed_in_exposes_user_id() {
        let viewer = CurrentUser::SignedIn(UserId::new("parent-42").unwrap());
        assert!(viewer.is_signed_in());
        assert_eq!(viewer.user_id().map(UserId::as_str), Some("parent-42"));
    }
}
