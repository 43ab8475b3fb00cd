//! Core data model types for eduplatform.
//!
//! These mirror the JSON documents exchanged with the backend. Fields the
//! backend may omit are optional or defaulted here, with the defaults stated
//! on the field.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Time allowed for a quiz whose document carries no `time_limit`.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 300;

/// Passing threshold the backend assigns to generated quizzes.
pub const DEFAULT_PASSING_SCORE: u32 = 70;

/// Default number of questions requested when generating a quiz.
pub const DEFAULT_NUM_QUESTIONS: u32 = 5;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Difficulty level shared by quizzes and learning paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Forum categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    General,
    Programming,
    Design,
    Career,
    Resources,
    Help,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::General,
        Category::Programming,
        Category::Design,
        Category::Career,
        Category::Resources,
        Category::Help,
    ];

    /// Wire identifier, as sent in the `category` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Programming => "programming",
            Category::Design => "design",
            Category::Career => "career",
            Category::Resources => "resources",
            Category::Help => "help",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Programming => "Programming",
            Category::Design => "Design",
            Category::Career => "Career",
            Category::Resources => "Resources",
            Category::Help => "Help",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category: {wanted}"))
    }
}

impl TryFrom<String> for Category {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Preferred learning style, used when requesting a learning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Kinesthetic,
    #[default]
    Mixed,
}

impl FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            "mixed" => Ok(LearningStyle::Mixed),
            other => Err(format!("unknown learning style: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// A multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A generated quiz. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Seconds allowed. `None` means [`DEFAULT_TIME_LIMIT_SECS`].
    #[serde(default)]
    pub time_limit: Option<u64>,
    /// Percentage needed to pass.
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default, with = "option_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

impl Quiz {
    /// Effective time limit in seconds.
    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECS)
    }

    /// Time limit as shown in quiz listings, e.g. "5 min".
    pub fn time_limit_label(&self) -> String {
        let secs = self.time_limit_secs();
        if secs % 60 == 0 {
            format!("{} min", secs / 60)
        } else {
            format!("{}:{:02} min", secs / 60, secs % 60)
        }
    }
}

/// Body of `POST /api/assessment/generate-quiz`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub topic: String,
    pub difficulty: Difficulty,
    pub num_questions: u32,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            difficulty: Difficulty::default(),
            num_questions: DEFAULT_NUM_QUESTIONS,
        }
    }
}

// ---------------------------------------------------------------------------
// Learning paths
// ---------------------------------------------------------------------------

/// One module of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathModule {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Free-form duration as produced by the generator ("2 hours", "45").
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Estimated hours to complete.
    #[serde(default)]
    pub estimated_duration: u32,
    #[serde(default)]
    pub modules: Vec<PathModule>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, with = "option_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/learning/generate-path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPreferences {
    pub topics_of_interest: Vec<String>,
    pub difficulty_preference: Difficulty,
    pub learning_style: LearningStyle,
    pub time_commitment_hours: u32,
    pub learning_goals: String,
}

impl PathPreferences {
    /// Build preferences from a comma-separated topic list.
    pub fn from_topic_list(topics: &str) -> Self {
        Self {
            topics_of_interest: topics
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            difficulty_preference: Difficulty::default(),
            learning_style: LearningStyle::default(),
            time_commitment_hours: 5,
            learning_goals: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    #[serde(rename = "type")]
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/chat/mentor`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorRequest {
    pub message: String,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorReply {
    pub response: String,
    #[serde(default, with = "option_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Forum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForumPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Category,
    #[serde(default)]
    pub author_name: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Like counter. Increments are local to this session.
    #[serde(default)]
    pub likes: u32,
}

/// Body of `POST /api/forum/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: Category,
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    /// Owned by the backend; carried through untouched.
    #[serde(default)]
    pub learning_preferences: Value,
    /// Owned by the backend; carried through untouched.
    #[serde(default)]
    pub progress: Value,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default, with = "option_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "option_timestamp")]
    pub last_login: Option<DateTime<Utc>>,
}

/// Local edits to the profile form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEdit {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub learning_preferences: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_preferences: Option<Value>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Response of every auth endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub total_points: u64,
    #[serde(default)]
    pub current_level: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub completion_rate: f64,
    #[serde(default)]
    pub total_modules: u64,
    #[serde(default)]
    pub completed_modules: u64,
}

/// Recent backend activity; entries are opaque documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentActivities {
    #[serde(default)]
    pub chats: Vec<Value>,
    #[serde(default)]
    pub quizzes: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub user_stats: UserStats,
    #[serde(default)]
    pub recent_activities: RecentActivities,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Parse a backend timestamp. Accepts RFC 3339 and the naive ISO form the
/// backend emits for UTC times.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<chrono::NaiveDateTime>()
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}

pub(crate) mod option_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match dt {
            Some(dt) => s.serialize_some(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => super::parse_timestamp(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }
}
