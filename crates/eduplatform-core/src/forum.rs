//! Community forum board.

use std::sync::Arc;

use crate::error::ApiError;
use crate::filter::ListFilter;
use crate::model::{Category, ForumPost, NewPost};
use crate::session::Session;
use crate::traits::Backend;
use crate::view::Loadable;

/// Posts fetched for the selected category, narrowed locally by search.
pub struct ForumBoard {
    backend: Arc<dyn Backend>,
    posts: Loadable<Vec<ForumPost>>,
    filter: ListFilter<Category>,
    page_size: u32,
}

impl ForumBoard {
    pub fn new(session: &Session, page_size: u32) -> Self {
        Self {
            backend: session.backend(),
            posts: Loadable::new(),
            filter: ListFilter::default(),
            page_size,
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.filter.facet
    }

    pub fn search(&self) -> &str {
        &self.filter.search
    }

    pub fn is_loading(&self) -> bool {
        self.posts.is_loading()
    }

    /// Message of the last failed fetch.
    pub fn error(&self) -> Option<&str> {
        self.posts.error()
    }

    /// Everything fetched, newest first as the backend returned it.
    pub fn posts(&self) -> &[ForumPost] {
        self.posts.data().map_or(&[], Vec::as_slice)
    }

    /// Refetch for the selected category. A failure keeps the current posts.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.posts.begin();
        let result = self
            .backend
            .forum_posts(self.filter.facet, self.page_size)
            .await;
        if let Err(e) = &result {
            tracing::warn!(category = ?self.filter.facet, "failed to load forum posts: {e}");
        }
        self.posts.finish(result)
    }

    /// Change the category (`None` is all) and refetch.
    pub async fn select_category(&mut self, category: Option<Category>) -> Result<(), ApiError> {
        self.filter.facet = category;
        self.refresh().await
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search = term.into();
    }

    /// Posts matching the search term and category.
    pub fn visible(&self) -> Vec<&ForumPost> {
        self.filter.apply(self.posts())
    }

    /// Publish a post and show it at the top.
    ///
    /// On failure nothing is added; the error is returned so the form keeps
    /// its content.
    pub async fn create_post(&mut self, post: NewPost) -> Result<&ForumPost, ApiError> {
        let created = match self.backend.create_forum_post(&post).await {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(title = %post.title, "failed to create forum post: {e}");
                return Err(e);
            }
        };
        tracing::info!(post = %created.id, category = %created.category, "forum post created");

        let posts = self.posts.data_or_default();
        posts.insert(0, created);
        Ok(&posts[0])
    }

    /// Count a like locally. Returns the new total, or `None` for an unknown
    /// post.
    pub fn like(&mut self, post_id: &str) -> Option<u32> {
        let post = self
            .posts
            .data_mut()?
            .iter_mut()
            .find(|p| p.id == post_id)?;
        post.likes += 1;
        Some(post.likes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::{post, MockBackend};
    use crate::traits::MemoryTokenStore;

    fn board(backend: Arc<MockBackend>) -> ForumBoard {
        let session = Session::new(backend, Arc::new(MemoryTokenStore::with_token("t")));
        ForumBoard::new(&session, 50)
    }

    fn seeded() -> Arc<MockBackend> {
        Arc::new(MockBackend::new().with_posts(vec![
            post("1", "Lifetimes", "why does this not compile", Category::Help),
            post("2", "CV tips", "what recruiters look for", Category::Career),
            post("3", "Async help", "tokio select confusion", Category::Help),
        ]))
    }

    #[tokio::test]
    async fn refresh_passes_category_and_page_size() {
        let backend = seeded();
        let mut board = board(backend.clone());

        board.refresh().await.unwrap();
        assert_eq!(board.posts().len(), 3);
        assert_eq!(backend.last_forum_query(), Some((None, 50)));

        board.select_category(Some(Category::Help)).await.unwrap();
        assert_eq!(backend.last_forum_query(), Some((Some(Category::Help), 50)));
        assert_eq!(board.posts().len(), 2);
    }

    #[tokio::test]
    async fn search_narrows_visible_posts() {
        let mut board = board(seeded());
        board.refresh().await.unwrap();

        board.set_search("TOKIO");
        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "3");

        board.set_search("nothing like this");
        assert!(board.visible().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_posts_and_reports() {
        let backend = seeded();
        let mut board = board(backend.clone());
        board.refresh().await.unwrap();

        backend.fail(Operation::ListPosts, 500, None);
        assert!(board.refresh().await.is_err());
        assert_eq!(board.posts().len(), 3);
        assert_eq!(board.error(), Some("Failed to fetch forum posts"));
        assert!(!board.is_loading());
    }

    #[tokio::test]
    async fn created_post_goes_to_top() {
        let mut board = board(seeded());
        board.refresh().await.unwrap();

        let created = board
            .create_post(NewPost {
                title: "Show and tell".into(),
                content: "my first crate".into(),
                category: Category::General,
            })
            .await
            .unwrap();
        assert_eq!(created.title, "Show and tell");
        assert_eq!(created.author_name, "Ada Lovelace");
        assert_eq!(board.posts()[0].title, "Show and tell");
        assert_eq!(board.posts().len(), 4);
    }

    #[tokio::test]
    async fn failed_create_adds_nothing() {
        let backend = seeded();
        let mut board = board(backend.clone());
        board.refresh().await.unwrap();
        backend.fail(Operation::CreatePost, 422, Some("Title too short"));

        let err = board
            .create_post(NewPost {
                title: "x".into(),
                content: "y".into(),
                category: Category::General,
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Title too short");
        assert_eq!(board.posts().len(), 3);
    }

    #[tokio::test]
    async fn create_before_first_fetch() {
        let mut board = board(Arc::new(MockBackend::new()));
        board
            .create_post(NewPost {
                title: "Hello".into(),
                content: "world".into(),
                category: Category::General,
            })
            .await
            .unwrap();
        assert_eq!(board.posts().len(), 1);
    }

    #[tokio::test]
    async fn likes_are_local() {
        let backend = seeded();
        let mut board = board(backend.clone());
        board.refresh().await.unwrap();
        let calls = backend.calls().len();

        assert_eq!(board.like("2"), Some(1));
        assert_eq!(board.like("2"), Some(2));
        assert_eq!(board.like("missing"), None);
        assert_eq!(backend.calls().len(), calls);
    }
}
