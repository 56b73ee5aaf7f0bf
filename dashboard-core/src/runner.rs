use futures::future::{BoxFuture, join_all};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{task::JoinError, time::timeout};
use tracing::warn;

use crate::{
    error::{FetchError, FetchResult},
    source::Fetch,
};

/// Deadline applied to every unit of work unless overridden.
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle of one unit of work. A task enters a terminal state exactly
/// once and is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Lifecycle notification emitted by the runner. Events fire in
/// completion order; the batch return value is what carries the
/// submission-order guarantee.
#[derive(Debug, Clone)]
pub struct TaskEvent {
    pub label: String,
    pub status: TaskStatus,
    pub error: Option<FetchError>,
}

/// Receives lifecycle events. The runner holds no UI state; rendering a
/// spinner, a log line or nothing at all is the observer's business.
pub trait TaskObserver: Send + Sync {
    fn on_event(&self, _event: &TaskEvent) {}
}

#[derive(Debug)]
struct NoopObserver;

impl TaskObserver for NoopObserver {}

/// One labelled unit of adapter work, pending until the runner executes it.
pub struct Task<T> {
    label: String,
    work: BoxFuture<'static, FetchResult<T>>,
}

impl<T> Task<T> {
    pub fn new(
        label: impl Into<String>,
        work: impl Future<Output = FetchResult<T>> + Send + 'static,
    ) -> Self {
        Self { label: label.into(), work: Box::pin(work) }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<T> std::fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Executes tasks behind a uniform fault boundary.
///
/// Every unit runs on its own spawned tokio task under a deadline; a
/// panic or timeout inside one unit converts into that unit's error and
/// never reaches its siblings.
pub struct Runner {
    task_timeout: Duration,
    observer: Arc<dyn TaskObserver>,
}

impl Runner {
    pub fn new() -> Self {
        Self { task_timeout: DEFAULT_TASK_TIMEOUT, observer: Arc::new(NoopObserver) }
    }

    #[must_use]
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.task_timeout = limit;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn TaskObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Execute one task on the caller's path, waiting for its result.
    pub async fn run<T: Send + 'static>(&self, task: Task<T>) -> FetchResult<T> {
        self.guarded(task).await
    }

    /// Execute a batch concurrently and gather all results at a single
    /// barrier. The returned sequence is ordered by submission, not by
    /// completion; one unit's failure leaves the others untouched.
    pub async fn run_batch<T: Send + 'static>(&self, tasks: Vec<Task<T>>) -> Vec<FetchResult<T>> {
        let units: Vec<_> = tasks.into_iter().map(|task| self.guarded(task)).collect();
        join_all(units).await
    }

    /// Run a source adapter's canonical lookup through the fault boundary,
    /// labelled with the source id.
    pub async fn run_fetch<F>(&self, source: &F, query: F::Query) -> FetchResult<F::Payload>
    where
        F: Fetch + Clone + 'static,
        F::Query: Send + 'static,
        F::Payload: Send + 'static,
    {
        let source = source.clone();
        let label = source.id().to_string();
        self.run(Task::new(label, async move { source.fetch(&query).await })).await
    }

    async fn guarded<T: Send + 'static>(&self, task: Task<T>) -> FetchResult<T> {
        let Task { label, work } = task;
        let limit = self.task_timeout;

        self.observer.on_event(&TaskEvent {
            label: label.clone(),
            status: TaskStatus::Running,
            error: None,
        });

        let result = match tokio::spawn(timeout(limit, work)).await {
            Ok(Ok(result)) => result,
            Ok(Err(_elapsed)) => Err(FetchError::timeout(limit)),
            Err(join_error) => Err(fault_to_error(join_error)),
        };

        let (status, error) = match &result {
            Ok(_) => (TaskStatus::Succeeded, None),
            Err(error) => {
                warn!(%label, %error, "task failed");
                (TaskStatus::Failed, Some(error.clone()))
            }
        };
        self.observer.on_event(&TaskEvent { label, status, error });

        result
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

fn fault_to_error(join_error: JoinError) -> FetchError {
    if join_error.is_panic() {
        let panic = join_error.into_panic();
        let message = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_string());
        FetchError::unexpected(format!("task panicked: {message}"))
    } else {
        FetchError::unexpected(format!("task aborted: {join_error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<(String, TaskStatus)>>,
    }

    impl TaskObserver for RecordingObserver {
        fn on_event(&self, event: &TaskEvent) {
            self.events.lock().unwrap().push((event.label.clone(), event.status));
        }
    }

    #[test]
    fn only_succeeded_and_failed_are_terminal() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(TaskStatus::Succeeded.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[tokio::test]
    async fn batch_results_follow_submission_order_not_completion_order() {
        // The first task finishes last; its slot must still come first.
        let tasks: Vec<Task<usize>> = (0..4)
            .map(|i| {
                Task::new(format!("task-{i}"), async move {
                    tokio::time::sleep(Duration::from_millis(40 - 10 * i as u64)).await;
                    Ok(i)
                })
            })
            .collect();

        let results = Runner::new().run_batch(tasks).await;

        assert_eq!(results.len(), 4);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(*result.as_ref().unwrap(), i);
        }
    }

    #[tokio::test]
    async fn one_failing_unit_leaves_siblings_untouched() {
        let tasks: Vec<Task<&str>> = vec![
            Task::new("ok-1", async { Ok("first") }),
            Task::new("bad", async { Err(FetchError::transport("connection refused")) }),
            Task::new("ok-2", async { Ok("third") }),
        ];

        let results = Runner::new().run_batch(tasks).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], Ok("first"));
        assert!(matches!(results[1], Err(FetchError::Transport(_))));
        assert_eq!(results[2], Ok("third"));
    }

    #[tokio::test]
    async fn a_panicking_unit_resolves_to_unexpected() {
        let tasks: Vec<Task<&str>> = vec![
            Task::new("panics", async { panic!("boom") }),
            Task::new("survives", async { Ok("fine") }),
        ];

        let results = Runner::new().run_batch(tasks).await;

        match &results[0] {
            Err(FetchError::Unexpected(message)) => assert!(message.contains("boom")),
            other => panic!("expected Unexpected, got {other:?}"),
        }
        assert_eq!(results[1], Ok("fine"));
    }

    #[tokio::test]
    async fn slow_units_hit_the_deadline() {
        let runner = Runner::new().with_timeout(Duration::from_millis(20));

        let result: FetchResult<()> = runner
            .run(Task::new("slow", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn observer_sees_running_then_terminal_per_task() {
        let observer = Arc::new(RecordingObserver::default());
        let runner = Runner::new().with_observer(observer.clone());

        let _ = runner.run(Task::new("profile", async { Ok(1u8) })).await;
        let _ = runner
            .run(Task::new("price", async {
                Err::<u8, _>(FetchError::transport("nope"))
            }))
            .await;

        let events = observer.events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                ("profile".to_string(), TaskStatus::Running),
                ("profile".to_string(), TaskStatus::Succeeded),
                ("price".to_string(), TaskStatus::Running),
                ("price".to_string(), TaskStatus::Failed),
            ]
        );
    }
}
