//! Core trait definitions for the backend and token storage.
//!
//! `Backend` is implemented by the HTTP transport in `eduplatform-client` and
//! by [`crate::mock::MockBackend`] for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{
    AuthResponse, Category, DashboardStats, ForumPost, LearningPath, LoginRequest, MentorReply,
    MentorRequest, NewPost, PathPreferences, Quiz, QuizRequest, RegisterRequest, User,
};

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// The remote REST surface the client consumes.
///
/// Implementations attach credentials themselves and, on a 401, discard the
/// stored token before returning an [`ApiError`] of kind `Unauthorized`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError>;

    /// Exchange a Google identity token for a session.
    async fn google_auth(&self, id_token: &str) -> Result<AuthResponse, ApiError>;

    async fn profile(&self) -> Result<User, ApiError>;

    async fn generate_learning_path(
        &self,
        preferences: &PathPreferences,
    ) -> Result<LearningPath, ApiError>;

    async fn learning_paths(&self) -> Result<Vec<LearningPath>, ApiError>;

    async fn generate_quiz(&self, request: &QuizRequest) -> Result<Quiz, ApiError>;

    async fn chat_with_mentor(&self, request: &MentorRequest) -> Result<MentorReply, ApiError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn create_forum_post(&self, post: &NewPost) -> Result<ForumPost, ApiError>;

    /// List posts, newest first. `category` of `None` lists every category.
    async fn forum_posts(
        &self,
        category: Option<Category>,
        limit: u32,
    ) -> Result<Vec<ForumPost>, ApiError>;
}

// ---------------------------------------------------------------------------
// Token storage
// ---------------------------------------------------------------------------

/// Client-side persistence of the bearer token.
pub trait TokenStore: Send + Sync {
    /// The stored token, if any.
    fn load(&self) -> Option<String>;

    fn save(&self, token: &str) -> anyhow::Result<()>;

    /// Forget the token. Clearing an empty store is not an error.
    fn clear(&self) -> anyhow::Result<()>;
}

/// Token store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, token: &str) -> anyhow::Result<()> {
        *self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        *self
            .token
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
