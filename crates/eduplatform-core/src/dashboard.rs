//! Dashboard statistics.

use std::sync::Arc;

use crate::error::ApiError;
use crate::model::DashboardStats;
use crate::session::Session;
use crate::traits::Backend;
use crate::view::Loadable;

pub struct Dashboard {
    backend: Arc<dyn Backend>,
    stats: Loadable<DashboardStats>,
}

impl Dashboard {
    pub fn new(session: &Session) -> Self {
        Self {
            backend: session.backend(),
            stats: Loadable::new(),
        }
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.data()
    }

    pub fn is_loading(&self) -> bool {
        self.stats.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.stats.error()
    }

    /// Fetch fresh statistics. On failure the previous figures stay visible
    /// next to the error.
    pub async fn load(&mut self) -> Result<(), ApiError> {
        self.stats.begin();
        let result = self.backend.dashboard_stats().await;
        match &result {
            Ok(stats) => tracing::debug!(points = stats.user_stats.total_points, "dashboard loaded"),
            Err(e) => tracing::warn!("failed to load dashboard: {e}"),
        }
        self.stats.finish(result)
    }

    /// Completed modules over total, as a whole percentage. Zero modules is 0.
    pub fn module_progress(&self) -> u32 {
        let Some(stats) = self.stats.data() else {
            return 0;
        };
        let user = &stats.user_stats;
        if user.total_modules == 0 {
            return 0;
        }
        ((user.completed_modules * 100 + user.total_modules / 2) / user.total_modules) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::MockBackend;
    use crate::model::UserStats;
    use crate::traits::MemoryTokenStore;

    fn dashboard(backend: Arc<MockBackend>) -> Dashboard {
        let session = Session::new(backend, Arc::new(MemoryTokenStore::with_token("t")));
        Dashboard::new(&session)
    }

    #[tokio::test]
    async fn loads_stats() {
        let mut dashboard = dashboard(Arc::new(MockBackend::new()));
        assert!(dashboard.stats().is_none());
        assert_eq!(dashboard.module_progress(), 0);

        dashboard.load().await.unwrap();
        let stats = dashboard.stats().unwrap();
        assert_eq!(stats.user_stats.total_points, 120);
        assert_eq!(dashboard.module_progress(), 25);
    }

    #[tokio::test]
    async fn module_progress_rounds_to_nearest() {
        let stats = DashboardStats {
            user_stats: UserStats {
                total_modules: 3,
                completed_modules: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut dashboard = dashboard(Arc::new(MockBackend::new().with_stats(stats)));
        dashboard.load().await.unwrap();
        assert_eq!(dashboard.module_progress(), 67);
    }

    #[tokio::test]
    async fn failure_keeps_prior_stats() {
        let backend = Arc::new(MockBackend::new());
        let mut dashboard = dashboard(backend.clone());
        dashboard.load().await.unwrap();

        backend.fail(Operation::DashboardStats, 500, None);
        assert!(dashboard.load().await.is_err());
        assert_eq!(dashboard.stats().unwrap().user_stats.total_points, 120);
        assert_eq!(dashboard.error(), Some("Failed to fetch dashboard stats"));

        backend.recover(Operation::DashboardStats);
        dashboard.load().await.unwrap();
        assert!(dashboard.error().is_none());
    }
}
