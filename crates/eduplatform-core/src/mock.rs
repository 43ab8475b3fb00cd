//! Mock backend for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ApiError, Operation};
use crate::model::{
    AuthResponse, Category, DashboardStats, Difficulty, ForumPost, LearningPath, LoginRequest,
    MentorReply, MentorRequest, NewPost, PathModule, PathPreferences, Question, Quiz,
    QuizRequest, RegisterRequest, User, UserStats, DEFAULT_PASSING_SCORE,
};
use crate::traits::{Backend, TokenStore};

/// An in-memory backend for exercising controllers without a server.
///
/// Holds a small document store, records every call, and can be told to fail
/// any operation with a given status. A configured 401 clears the attached
/// token store, the same way the HTTP transport does.
pub struct MockBackend {
    user: User,
    access_token: String,
    mentor_reply: String,
    stats: DashboardStats,
    paths: Mutex<Vec<LearningPath>>,
    posts: Mutex<Vec<ForumPost>>,
    failures: Mutex<HashMap<Operation, ApiError>>,
    calls: Mutex<Vec<Operation>>,
    last_mentor_request: Mutex<Option<MentorRequest>>,
    last_forum_query: Mutex<Option<(Option<Category>, u32)>>,
    tokens: Option<Arc<dyn TokenStore>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            user: user("Ada Lovelace"),
            access_token: "mock-token".to_string(),
            mentor_reply: "Keep going, you are doing great.".to_string(),
            stats: DashboardStats {
                user_stats: UserStats {
                    total_points: 120,
                    current_level: "beginner".into(),
                    badges: vec!["first-steps".into()],
                    completion_rate: 25.0,
                    total_modules: 4,
                    completed_modules: 1,
                },
                ..Default::default()
            },
            paths: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            last_mentor_request: Mutex::new(None),
            last_forum_query: Mutex::new(None),
            tokens: None,
        }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    pub fn with_mentor_reply(mut self, reply: &str) -> Self {
        self.mentor_reply = reply.to_string();
        self
    }

    pub fn with_stats(mut self, stats: DashboardStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_paths(self, paths: Vec<LearningPath>) -> Self {
        *lock(&self.paths) = paths;
        self
    }

    pub fn with_posts(self, posts: Vec<ForumPost>) -> Self {
        *lock(&self.posts) = posts;
        self
    }

    /// Share the client's token store so 401s can clear it.
    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Make `operation` fail with `status` until [`MockBackend::recover`].
    pub fn fail(&self, operation: Operation, status: u16, detail: Option<&str>) {
        lock(&self.failures).insert(
            operation,
            ApiError::from_status(operation, status, detail.map(str::to_string)),
        );
    }

    pub fn recover(&self, operation: Operation) {
        lock(&self.failures).remove(&operation);
    }

    /// Every operation invoked so far, in order.
    pub fn calls(&self) -> Vec<Operation> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        lock(&self.calls).iter().filter(|c| **c == operation).count()
    }

    pub fn last_mentor_request(&self) -> Option<MentorRequest> {
        lock(&self.last_mentor_request).clone()
    }

    pub fn last_forum_query(&self) -> Option<(Option<Category>, u32)> {
        *lock(&self.last_forum_query)
    }

    fn check(&self, operation: Operation) -> Result<(), ApiError> {
        lock(&self.calls).push(operation);
        let failure = lock(&self.failures).get(&operation).cloned();
        match failure {
            Some(err) => {
                if err.is_unauthorized() {
                    if let Some(tokens) = &self.tokens {
                        let _ = tokens.clear();
                    }
                }
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn auth_response(&self, user: User) -> AuthResponse {
        AuthResponse {
            access_token: self.access_token.clone(),
            token_type: Some("bearer".into()),
            user,
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.check(Operation::Register)?;
        let mut user = self.user.clone();
        user.email = request.email.clone();
        user.full_name = request.full_name.clone();
        Ok(self.auth_response(user))
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.check(Operation::Login)?;
        if request.email != self.user.email {
            return Err(ApiError::from_status(
                Operation::Login,
                401,
                Some("Incorrect email or password".into()),
            ));
        }
        Ok(self.auth_response(self.user.clone()))
    }

    async fn google_auth(&self, _id_token: &str) -> Result<AuthResponse, ApiError> {
        self.check(Operation::GoogleAuth)?;
        Ok(self.auth_response(self.user.clone()))
    }

    async fn profile(&self) -> Result<User, ApiError> {
        self.check(Operation::Profile)?;
        Ok(self.user.clone())
    }

    async fn generate_learning_path(
        &self,
        preferences: &PathPreferences,
    ) -> Result<LearningPath, ApiError> {
        self.check(Operation::GeneratePath)?;
        let topics = preferences.topics_of_interest.join(", ");
        let generated = LearningPath {
            id: Uuid::new_v4().to_string(),
            title: format!("Learning path: {topics}"),
            description: preferences.learning_goals.clone(),
            difficulty: preferences.difficulty_preference,
            estimated_duration: preferences.time_commitment_hours * 4,
            modules: preferences
                .topics_of_interest
                .iter()
                .map(|t| PathModule {
                    title: t.clone(),
                    description: format!("Fundamentals of {t}"),
                    duration: Some("2 hours".into()),
                })
                .collect(),
            prerequisites: Vec::new(),
            created_at: Some(Utc::now()),
        };
        lock(&self.paths).push(generated.clone());
        Ok(generated)
    }

    async fn learning_paths(&self) -> Result<Vec<LearningPath>, ApiError> {
        self.check(Operation::ListPaths)?;
        Ok(lock(&self.paths).clone())
    }

    async fn generate_quiz(&self, request: &QuizRequest) -> Result<Quiz, ApiError> {
        self.check(Operation::GenerateQuiz)?;
        let answers: Vec<usize> = (0..request.num_questions as usize).map(|i| i % 4).collect();
        let mut generated = quiz(&answers);
        generated.topic = request.topic.clone();
        generated.difficulty = request.difficulty;
        Ok(generated)
    }

    async fn chat_with_mentor(&self, request: &MentorRequest) -> Result<MentorReply, ApiError> {
        *lock(&self.last_mentor_request) = Some(request.clone());
        self.check(Operation::Mentor)?;
        Ok(MentorReply {
            response: self.mentor_reply.clone(),
            timestamp: Some(Utc::now()),
        })
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.check(Operation::DashboardStats)?;
        Ok(self.stats.clone())
    }

    async fn create_forum_post(&self, post: &NewPost) -> Result<ForumPost, ApiError> {
        self.check(Operation::CreatePost)?;
        let created = ForumPost {
            id: Uuid::new_v4().to_string(),
            title: post.title.clone(),
            content: post.content.clone(),
            category: post.category,
            author_name: self.user.full_name.clone(),
            created_at: Utc::now(),
            likes: 0,
        };
        lock(&self.posts).insert(0, created.clone());
        Ok(created)
    }

    async fn forum_posts(
        &self,
        category: Option<Category>,
        limit: u32,
    ) -> Result<Vec<ForumPost>, ApiError> {
        *lock(&self.last_forum_query) = Some((category, limit));
        self.check(Operation::ListPosts)?;
        Ok(lock(&self.posts)
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A user with the given display name.
pub fn user(full_name: &str) -> User {
    User {
        id: "user-1".into(),
        email: "ada@example.com".into(),
        full_name: full_name.into(),
        learning_preferences: serde_json::Value::Null,
        progress: serde_json::Value::Null,
        badges: Vec::new(),
        created_at: Some(Utc::now()),
        last_login: None,
    }
}

/// A four-option quiz whose correct answers are `correct`.
pub fn quiz(correct: &[usize]) -> Quiz {
    Quiz {
        id: Uuid::new_v4().to_string(),
        topic: "General knowledge".into(),
        difficulty: Difficulty::Intermediate,
        questions: correct
            .iter()
            .enumerate()
            .map(|(i, answer)| Question {
                prompt: format!("Question {}", i + 1),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: *answer,
                explanation: Some(format!("The answer is option {}", answer + 1)),
            })
            .collect(),
        time_limit: None,
        passing_score: DEFAULT_PASSING_SCORE,
        created_at: None,
    }
}

pub fn post(id: &str, title: &str, content: &str, category: Category) -> ForumPost {
    ForumPost {
        id: id.into(),
        title: title.into(),
        content: content.into(),
        category,
        author_name: "Ada Lovelace".into(),
        created_at: Utc::now(),
        likes: 0,
    }
}

pub fn path(id: &str, title: &str, description: &str, difficulty: Difficulty) -> LearningPath {
    LearningPath {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        difficulty,
        estimated_duration: 10,
        modules: Vec::new(),
        prerequisites: Vec::new(),
        created_at: None,
    }
}
