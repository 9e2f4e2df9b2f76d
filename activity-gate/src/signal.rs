//! Routing signals derived from gate outcomes.
//!
//! Screens do not branch on raw errors. Every gate operation resolves to
//! exactly one [`RouteSignal`] telling the caller where to send the viewer:
//! carry on, go sign in, go subscribe, or show an error with a
//! machine-readable [`SignalKind`]. A duplicate purchase is deliberately
//! [`Severity::Info`]: the viewer already has what they tried to buy.

use serde::Serialize;

use crate::error::{GateError, Result};

/// Machine-readable category carried by error signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// The requested plan does not exist in the catalog.
    InvalidPlan,
    /// The viewer already holds an active subscription.
    AlreadySubscribed,
    /// The viewer has no subscription to operate on.
    NotSubscribed,
    /// The subscription store could not complete a request.
    PersistenceFailure,
    /// The plan catalog could not be reached.
    CatalogUnavailable,
    /// The requested activity does not exist.
    ActivityNotFound,
    /// The request itself was malformed.
    InvalidRequest,
}

impl SignalKind {
    /// How prominently this kind should be surfaced.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::AlreadySubscribed => Severity::Info,
            Self::InvalidPlan
            | Self::NotSubscribed
            | Self::PersistenceFailure
            | Self::CatalogUnavailable
            | Self::ActivityNotFound
            | Self::InvalidRequest => Severity::Error,
        }
    }
}

/// Display prominence of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational notice; nothing went wrong for the viewer.
    Info,
    /// A failure the viewer should see as an error.
    Error,
}

/// The single routing decision produced by a gate operation.
///
/// # Examples
///
/// ```
/// use activity_gate::{GateError, signal::RouteSignal};
///
/// let signal = RouteSignal::from(&GateError::Unauthenticated);
/// assert_eq!(signal, RouteSignal::RedirectToLogin);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteSignal {
    /// The operation completed; stay on the current flow.
    Success,
    /// Send the viewer to the sign-in screen.
    RedirectToLogin,
    /// Send the viewer to the subscribe screen.
    RedirectToSubscribe,
    /// Show an error to the viewer.
    Error {
        /// Machine-readable category.
        kind: SignalKind,
        /// Human-readable summary.
        message: String,
    },
}

impl RouteSignal {
    /// Resolves an operation outcome into its routing signal.
    pub fn from_outcome<T>(outcome: &Result<T>) -> Self {
        match outcome {
            Ok(_) => Self::Success,
            Err(error) => Self::from(error),
        }
    }

    /// How prominently this signal should be surfaced.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Success | Self::RedirectToLogin | Self::RedirectToSubscribe => Severity::Info,
            Self::Error { kind, .. } => kind.severity(),
        }
    }
}

impl From<&GateError> for RouteSignal {
    fn from(error: &GateError) -> Self {
        match error {
            GateError::Unauthenticated => Self::RedirectToLogin,
            GateError::NotSubscribed => Self::RedirectToSubscribe,
            GateError::InvalidPlan(_) => {
                Self::Error { kind: SignalKind::InvalidPlan, message: error.to_string() }
            }
            GateError::AlreadySubscribed => {
                Self::Error { kind: SignalKind::AlreadySubscribed, message: error.to_string() }
            }
            GateError::PersistenceFailure(_) => {
                Self::Error { kind: SignalKind::PersistenceFailure, message: error.to_string() }
            }
            GateError::CatalogUnavailable(_) => {
                Self::Error { kind: SignalKind::CatalogUnavailable, message: error.to_string() }
            }
            GateError::ActivityNotFound(_) => {
                Self::Error { kind: SignalKind::ActivityNotFound, message: error.to_string() }
            }
            GateError::InvalidUserId(_) | GateError::InvalidConfig(_) => {
                Self::Error { kind: SignalKind::InvalidRequest, message: error.to_string() }
            }
        }
    }
}
