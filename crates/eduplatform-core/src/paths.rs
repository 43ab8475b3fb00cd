//! Learning path catalog.

use std::sync::Arc;

use crate::error::ApiError;
use crate::filter::ListFilter;
use crate::model::{Difficulty, LearningPath, PathPreferences};
use crate::session::Session;
use crate::traits::Backend;
use crate::view::Loadable;

pub struct PathCatalog {
    backend: Arc<dyn Backend>,
    paths: Loadable<Vec<LearningPath>>,
    filter: ListFilter<Difficulty>,
    generating: bool,
}

impl PathCatalog {
    pub fn new(session: &Session) -> Self {
        Self {
            backend: session.backend(),
            paths: Loadable::new(),
            filter: ListFilter::default(),
            generating: false,
        }
    }

    pub fn paths(&self) -> &[LearningPath] {
        self.paths.data().map_or(&[], Vec::as_slice)
    }

    pub fn is_loading(&self) -> bool {
        self.paths.is_loading()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn error(&self) -> Option<&str> {
        self.paths.error()
    }

    /// Fetch the user's paths. A failure keeps what was shown before.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.paths.begin();
        let result = self.backend.learning_paths().await;
        if let Err(e) = &result {
            tracing::warn!("failed to load learning paths: {e}");
        }
        self.paths.finish(result)
    }

    /// Generate a new path and append it to the list.
    pub async fn generate(&mut self, preferences: &PathPreferences) -> Result<&LearningPath, ApiError> {
        self.generating = true;
        let result = self.backend.generate_learning_path(preferences).await;
        self.generating = false;

        let path = match result {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(
                    topics = ?preferences.topics_of_interest,
                    "learning path generation failed: {e}"
                );
                return Err(e);
            }
        };
        tracing::info!(path = %path.id, modules = path.modules.len(), "learning path generated");

        let paths = self.paths.data_or_default();
        paths.push(path);
        Ok(&paths[paths.len() - 1])
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    /// Restrict to one difficulty, or `None` for all.
    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.filter.facet = difficulty;
    }

    pub fn visible(&self) -> Vec<&LearningPath> {
        self.filter.apply(self.paths())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::{path, MockBackend};
    use crate::traits::MemoryTokenStore;

    fn catalog(backend: Arc<MockBackend>) -> PathCatalog {
        let session = Session::new(backend, Arc::new(MemoryTokenStore::with_token("t")));
        PathCatalog::new(&session)
    }

    #[tokio::test]
    async fn generated_path_is_appended() {
        let backend = Arc::new(
            MockBackend::new().with_paths(vec![path("a", "Existing", "", Difficulty::Beginner)]),
        );
        let mut catalog = catalog(backend);
        catalog.refresh().await.unwrap();

        let mut prefs = PathPreferences::from_topic_list("rust, wasm");
        prefs.difficulty_preference = Difficulty::Advanced;
        let generated = catalog.generate(&prefs).await.unwrap();
        assert_eq!(generated.modules.len(), 2);
        assert_eq!(generated.difficulty, Difficulty::Advanced);

        assert_eq!(catalog.paths().len(), 2);
        assert_eq!(catalog.paths()[0].id, "a");
        assert!(!catalog.is_generating());
    }

    #[tokio::test]
    async fn generate_failure_leaves_list_alone() {
        let backend = Arc::new(MockBackend::new());
        backend.fail(Operation::GeneratePath, 500, None);
        let mut catalog = catalog(backend);

        let err = catalog
            .generate(&PathPreferences::from_topic_list("rust"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to generate learning path");
        assert!(catalog.paths().is_empty());
        assert!(catalog.error().is_none());
    }

    #[tokio::test]
    async fn visible_applies_search_and_difficulty() {
        let backend = Arc::new(MockBackend::new().with_paths(vec![
            path("a", "Frontend", "React and CSS", Difficulty::Beginner),
            path("b", "Backend", "Rust services", Difficulty::Advanced),
            path("c", "Data", "SQL and Rust", Difficulty::Intermediate),
        ]));
        let mut catalog = catalog(backend);
        catalog.refresh().await.unwrap();

        catalog.set_search("rust");
        assert_eq!(catalog.visible().len(), 2);
        catalog.set_difficulty(Some(Difficulty::Intermediate));
        let visible = catalog.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "c");
    }

    #[tokio::test]
    async fn refresh_failure_is_reported() {
        let backend = Arc::new(MockBackend::new());
        backend.fail(Operation::ListPaths, 503, Some("Database unavailable"));
        let mut catalog = catalog(backend);

        assert!(catalog.refresh().await.is_err());
        assert_eq!(catalog.error(), Some("Database unavailable"));
        assert!(catalog.paths().is_empty());
    }
}
