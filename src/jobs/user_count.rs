use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

use crate::repositories::UserRepository;

/// Interval between two user count reports.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(10);

/// Periodically logs the number of stored users.
///
/// Runs until the shutdown token is cancelled. Count failures are logged
/// and skipped.
pub struct UserCountReporter {
    repo: Arc<dyn UserRepository>,
    period: Duration,
}

impl UserCountReporter {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self::with_period(repo, REPORT_INTERVAL)
    }

    pub fn with_period(repo: Arc<dyn UserRepository>, period: Duration) -> Self {
        Self { repo, period }
    }

    /// Reads the count once and emits it. Returns `None` if the read failed.
    pub async fn tick(&self) -> Option<i64> {
        match self.repo.count().await {
            Ok(count) => {
                tracing::info!(user_count = count, "Current user count");
                Some(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read user count");
                None
            }
        }
    }

    /// Reports every period until `shutdown` fires.
    ///
    /// The first report happens one full period after start. A count that is
    /// still in flight when shutdown fires is abandoned.
    pub async fn run(self, shutdown: CancellationToken) {
        let start = tokio::time::Instant::now() + self.period;
        let mut ticker = interval_at(start, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = self.period.as_secs(), "User count reporter started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = self.tick() => {}
                    }
                }
            }
        }
        tracing::info!("User count reporter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::{NewUser, User, UserChanges};
    use crate::repositories::InMemoryUserRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Someone".to_string(),
            email: email.to_string(),
            password: "$argon2id$placeholder".to_string(),
            created_at: jiff::Timestamp::now(),
        }
    }

    /// Counts how often `count` is called and always fails.
    #[derive(Default)]
    struct FailingCounter {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl UserRepository for FailingCounter {
        async fn create(&self, new_user: NewUser) -> AppResult<User> {
            Ok(new_user.into_user("unused".to_string()))
        }
        async fn find_by_id(&self, _: &str) -> AppResult<Option<User>> {
            Ok(None)
        }
        async fn find_by_email(&self, _: &str) -> AppResult<Option<User>> {
            Ok(None)
        }
        async fn list_all(&self) -> AppResult<Vec<User>> {
            Ok(Vec::new())
        }
        async fn update(&self, _: &str, _: UserChanges) -> AppResult<()> {
            Ok(())
        }
        async fn delete(&self, _: &str) -> AppResult<()> {
            Ok(())
        }
        async fn count(&self) -> AppResult<i64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::store("count users", anyhow::anyhow!("unreachable store")))
        }
    }

    #[tokio::test]
    async fn test_tick_reports_repository_count() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let reporter = UserCountReporter::new(repo.clone());

        assert_eq!(reporter.tick().await, Some(0));
        repo.create(new_user("a@x.com")).await.unwrap();
        repo.create(new_user("b@x.com")).await.unwrap();
        assert_eq!(reporter.tick().await, Some(repo.count().await.unwrap()));
        assert_eq!(reporter.tick().await, Some(2));
    }

    #[tokio::test]
    async fn test_tick_swallows_count_errors() {
        let reporter = UserCountReporter::new(Arc::new(FailingCounter::default()));
        assert_eq!(reporter.tick().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_each_period_until_cancelled() {
        let repo = Arc::new(FailingCounter::default());
        let reporter = UserCountReporter::with_period(repo.clone(), Duration::from_secs(10));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(reporter.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exits_promptly_on_cancel() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let result = tokio::time::timeout(
            Duration::from_millis(1),
            UserCountReporter::new(repo).run(shutdown),
        )
        .await;
        assert!(result.is_ok());
    }
}
