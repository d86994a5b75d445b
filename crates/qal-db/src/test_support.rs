//! Shared test utilities for qal-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use crate::QalDb;
    use crate::service::MetricsService;

    /// Create an in-memory MetricsService (for pure DB tests).
    pub async fn test_service() -> MetricsService {
        let db = QalDb::open_local(":memory:").await.unwrap();
        MetricsService::from_db(db)
    }

    /// Create a PnL and return its id (convenience for tests that need one).
    pub async fn create_test_pnl(svc: &MetricsService, name: &str) -> i64 {
        let pnl = svc.create_pnl(name, None).await.unwrap();
        pnl.id
    }
}
