//! Backend error types.
//!
//! Every backend call, whatever transport serves it, fails with the same
//! [`ApiError`] shape so that controllers can classify failures without
//! string matching.

use std::fmt;

use thiserror::Error;

/// The backend operations the client performs.
///
/// Each operation carries the fixed message used when a failure response
/// does not provide a readable `detail` of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Login,
    GoogleAuth,
    Profile,
    GeneratePath,
    ListPaths,
    GenerateQuiz,
    Mentor,
    DashboardStats,
    CreatePost,
    ListPosts,
}

impl Operation {
    /// Message shown when the backend gives no explanation.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::Register => "Registration failed",
            Operation::Login => "Login failed",
            Operation::GoogleAuth => "Google authentication failed",
            Operation::Profile => "Failed to fetch profile",
            Operation::GeneratePath => "Failed to generate learning path",
            Operation::ListPaths => "Failed to fetch learning paths",
            Operation::GenerateQuiz => "Failed to generate quiz",
            Operation::Mentor => "Failed to chat with mentor",
            Operation::DashboardStats => "Failed to fetch dashboard stats",
            Operation::CreatePost => "Failed to create forum post",
            Operation::ListPosts => "Failed to fetch forum posts",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Register => "register",
            Operation::Login => "login",
            Operation::GoogleAuth => "google-auth",
            Operation::Profile => "profile",
            Operation::GeneratePath => "generate-path",
            Operation::ListPaths => "list-paths",
            Operation::GenerateQuiz => "generate-quiz",
            Operation::Mentor => "mentor",
            Operation::DashboardStats => "dashboard-stats",
            Operation::CreatePost => "create-post",
            Operation::ListPosts => "list-posts",
        };
        f.write_str(name)
    }
}

/// Broad classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The backend rejected the credentials (HTTP 401). The stored token has
    /// already been discarded by the time this is observed.
    Unauthorized,
    /// Any other non-success HTTP status.
    Http,
    /// The request never produced a response.
    Network,
    /// The transport timed out.
    Timeout,
    /// The response body did not match the expected shape.
    Decode,
}

/// Normalized failure of a backend call.
///
/// `Display` yields only the human-readable message, which is what views show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub operation: Operation,
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    /// Build an error from an HTTP failure, preferring the backend's detail.
    pub fn from_status(operation: Operation, status: u16, detail: Option<String>) -> Self {
        let kind = if status == 401 {
            ApiErrorKind::Unauthorized
        } else {
            ApiErrorKind::Http
        };
        Self {
            operation,
            kind,
            status: Some(status),
            message: detail
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| operation.fallback_message().to_string()),
        }
    }

    /// A failure with no response: the fallback message is all there is.
    pub fn without_response(operation: Operation, kind: ApiErrorKind) -> Self {
        Self {
            operation,
            kind,
            status: None,
            message: operation.fallback_message().to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }
}
