//! Mentor chat transcript.
//!
//! The transcript is append-only between clears. [`MentorChat`] wraps it
//! with the backend round trip: the user's message is appended at once, the
//! mentor's reply (or a fixed apology) follows when the call completes.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::model::{ChatMessage, MentorRequest, Role};
use crate::session::Session;
use crate::traits::Backend;

/// Number of trailing messages forwarded as conversational context.
pub const CONTEXT_WINDOW: usize = 5;

/// Shown in place of a reply when the mentor call fails.
pub const APOLOGY: &str =
    "Sorry, I'm having technical difficulties. Could you try again in a few moments?";

/// Canned prompts offered next to the input box.
pub const QUICK_QUESTIONS: [&str; 4] = [
    "Recommend some learning resources",
    "How can I improve my performance?",
    "Give me some study tips",
    "How can I organise my time better?",
];

/// Greeting that opens a new conversation.
pub fn greeting(name: Option<&str>, detailed: bool) -> String {
    let name = name.filter(|n| !n.trim().is_empty()).unwrap_or("learner");
    if detailed {
        format!(
            "Hello {name}! 👋\n\n\
             I'm your personal AI mentor, here to help you along your learning journey. \
             You can ask me about:\n\n\
             • Your courses and modules\n\
             • Study advice\n\
             • Clarifications on concepts\n\
             • Resource recommendations\n\
             • Your progress\n\n\
             How can I help you today?"
        )
    } else {
        format!("Hello {name}! 👋\n\nI'm your personal AI mentor. How can I help you today?")
    }
}

/// Ordered chat history.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Transcript {
    /// A transcript holding only `greeting`.
    pub fn new(greeting: String) -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        transcript.push(Role::Ai, greeting);
        transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message stamped with the current time.
    pub fn push(&mut self, role: Role, content: String) -> &ChatMessage {
        self.push_at(role, content, Utc::now())
    }

    pub fn push_at(
        &mut self,
        role: Role,
        content: String,
        timestamp: DateTime<Utc>,
    ) -> &ChatMessage {
        self.messages.push(ChatMessage {
            id: self.next_id,
            role,
            content,
            timestamp,
        });
        self.next_id += 1;
        &self.messages[self.messages.len() - 1]
    }

    /// The last [`CONTEXT_WINDOW`] messages as `Role: content` lines.
    pub fn context(&self) -> String {
        let start = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        self.messages[start..]
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "User",
                    Role::Ai => "Mentor",
                };
                format!("{role}: {}", m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace everything with a single greeting.
    pub fn reset(&mut self, greeting: String) {
        self.messages.clear();
        self.push(Role::Ai, greeting);
    }

    /// Flat text rendering for download, stamped in local time.
    pub fn export(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                let who = match m.role {
                    Role::User => "You",
                    Role::Ai => "AI Mentor",
                };
                format!(
                    "[{}] {who}: {}",
                    m.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                    m.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Suggested download name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("chat-mentor-{}.txt", date.format("%Y-%m-%d"))
}

/// Controller for the mentor screen.
pub struct MentorChat {
    backend: Arc<dyn Backend>,
    user_name: Option<String>,
    transcript: Transcript,
    typing: bool,
}

impl MentorChat {
    pub fn new(session: &Session) -> Self {
        let user_name = session.user().map(|u| u.full_name.clone());
        Self {
            backend: session.backend(),
            transcript: Transcript::new(greeting(user_name.as_deref(), true)),
            user_name,
            typing: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    /// Whether a reply is pending.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Send `text` to the mentor.
    ///
    /// Blank input is ignored and returns `false`. Otherwise the exchange is
    /// always completed with an AI message: the reply, or [`APOLOGY`] if the
    /// call failed.
    pub async fn send(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let context = self.transcript.context();
        self.transcript.push(Role::User, text.to_string());
        self.typing = true;

        let request = MentorRequest {
            message: text.to_string(),
            context: Some(context),
        };
        let reply = match self.backend.chat_with_mentor(&request).await {
            Ok(reply) => reply.response,
            Err(e) => {
                tracing::warn!("mentor chat failed: {e}");
                APOLOGY.to_string()
            }
        };

        self.transcript.push(Role::Ai, reply);
        self.typing = false;
        true
    }

    /// Start over with a short greeting. No backend call.
    pub fn clear(&mut self) {
        self.transcript.reset(greeting(self.user_name.as_deref(), false));
    }

    pub fn export(&self) -> String {
        self.transcript.export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::MockBackend;
    use crate::traits::MemoryTokenStore;
    use chrono::TimeZone;

    async fn chat_with(backend: Arc<MockBackend>) -> MentorChat {
        let mut session = Session::new(backend, Arc::new(MemoryTokenStore::with_token("t")));
        session.init().await;
        MentorChat::new(&session)
    }

    #[tokio::test]
    async fn starts_with_personal_greeting() {
        let chat = chat_with(Arc::new(MockBackend::new())).await;
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Ai);
        assert!(chat.messages()[0].content.contains("Ada Lovelace"));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let backend = Arc::new(MockBackend::new());
        let mut chat = chat_with(backend.clone()).await;
        assert!(!chat.send("").await);
        assert!(!chat.send("   ").await);
        assert_eq!(chat.messages().len(), 1);
        assert!(!chat.is_typing());
        assert_eq!(backend.call_count(Operation::Mentor), 0);
    }

    #[tokio::test]
    async fn reply_is_appended_after_user_message() {
        let backend = Arc::new(MockBackend::new().with_mentor_reply("Try spaced repetition."));
        let mut chat = chat_with(backend.clone()).await;

        assert!(chat.send("How do I study?").await);
        let messages = chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "How do I study?");
        assert_eq!(messages[2].role, Role::Ai);
        assert_eq!(messages[2].content, "Try spaced repetition.");
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
        assert!(!chat.is_typing());

        let request = backend.last_mentor_request().unwrap();
        assert_eq!(request.message, "How do I study?");
        assert!(request.context.unwrap().starts_with("Mentor: Hello Ada Lovelace"));
    }

    #[tokio::test]
    async fn failure_appends_apology() {
        let backend = Arc::new(MockBackend::new());
        backend.fail(Operation::Mentor, 500, Some("model overloaded"));
        let mut chat = chat_with(backend).await;

        assert!(chat.send("Hello?").await);
        let last = chat.messages().last().unwrap();
        assert_eq!(last.role, Role::Ai);
        assert_eq!(last.content, APOLOGY);
        assert!(!chat.is_typing());
    }

    #[tokio::test]
    async fn context_is_bounded_to_recent_messages() {
        let backend = Arc::new(MockBackend::new().with_mentor_reply("ok"));
        let mut chat = chat_with(backend.clone()).await;
        for i in 0..4 {
            chat.send(&format!("question {i}")).await;
        }

        let context = backend.last_mentor_request().unwrap().context.unwrap();
        let lines: Vec<&str> = context.lines().collect();
        assert_eq!(lines.len(), CONTEXT_WINDOW);
        assert_eq!(lines[0], "Mentor: ok");
        assert_eq!(lines[1], "User: question 1");
        assert_eq!(lines[3], "User: question 2");
        assert!(!context.contains("question 3"));
    }

    #[tokio::test]
    async fn clear_leaves_single_greeting() {
        let backend = Arc::new(MockBackend::new());
        let mut chat = chat_with(backend.clone()).await;
        chat.send("hi").await;
        let calls = backend.calls().len();

        chat.clear();
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Ai);
        assert_eq!(backend.calls().len(), calls);
    }

    #[test]
    fn export_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 9, 5, 7).unwrap();
        let mut transcript = Transcript::new(String::new());
        transcript.messages.clear();
        transcript.push_at(Role::Ai, "Hello".into(), at);
        transcript.push_at(Role::User, "Hi there".into(), at);

        let local = at.with_timezone(&Local).format("%H:%M:%S").to_string();
        assert_eq!(
            transcript.export(),
            format!("[{local}] AI Mentor: Hello\n\n[{local}] You: Hi there")
        );
        assert_eq!(
            export_file_name(at.date_naive()),
            "chat-mentor-2024-01-15.txt"
        );
    }

    #[test]
    fn greeting_falls_back_to_learner() {
        assert!(greeting(None, false).starts_with("Hello learner!"));
        assert!(greeting(Some("  "), true).starts_with("Hello learner!"));
    }
}
