//! Reflow driver: a single tokio task that owns the [`Coordinator`].
//!
//! # Architecture
//! - All coordinator work happens on this one task, so two passes can never overlap and
//!   the measurement surface has exactly one writer.
//! - Callers talk to it through [`ReflowHandle`], which sends commands over an mpsc channel.
//! - The debounce timer is a `sleep_until` on the coordinator's current deadline. A new resize
//!   signal moves the deadline, and the next loop iteration waits on the new one; that is
//!   the cancel-and-restart.
//! - Initial discovery runs at startup unless the environment is still loading, in which
//!   case it waits for the first content-ready signal.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::errors::{AppError, ReflowError};
use crate::reflow::coordinator::{Coordinator, CoordinatorStatus, TextBlock};
use crate::reflow::environment::{Environment, ReadyState};

const COMMAND_BUFFER: usize = 64;

type CoordinatorJob<E> = Box<dyn FnOnce(&mut Coordinator<E>) + Send>;

enum ReflowCommand<E> {
    Resize,
    ContentReady,
    Register {
        id: String,
        reply: oneshot::Sender<Result<Vec<String>, ReflowError>>,
    },
    Unregister {
        id: String,
        reply: oneshot::Sender<Option<TextBlock>>,
    },
    Blocks {
        reply: oneshot::Sender<Vec<TextBlock>>,
    },
    WithCoordinator(CoordinatorJob<E>),
}

/// Cloneable client for the driver task.
pub struct ReflowHandle<E> {
    tx: mpsc::Sender<ReflowCommand<E>>,
}

impl<E> Clone for ReflowHandle<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E: Environment + 'static> ReflowHandle<E> {
    /// Delivers one viewport resize signal.
    pub async fn resize(&self) -> Result<(), AppError> {
        self.send(ReflowCommand::Resize).await
    }

    /// The one-time "content ready" signal. Later signals are ignored.
    pub async fn content_ready(&self) -> Result<(), AppError> {
        self.send(ReflowCommand::ContentReady).await
    }

    /// Registers the element with `id` as a block; its first pass result is returned.
    pub async fn register(&self, id: impl Into<String>) -> Result<Vec<String>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ReflowCommand::Register {
            id: id.into(),
            reply,
        })
        .await?;
        Ok(Self::recv(rx).await??)
    }

    pub async fn unregister(&self, id: impl Into<String>) -> Result<Option<TextBlock>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ReflowCommand::Unregister {
            id: id.into(),
            reply,
        })
        .await?;
        Self::recv(rx).await
    }

    pub async fn blocks(&self) -> Result<Vec<TextBlock>, AppError> {
        let (reply, rx) = oneshot::channel();
        self.send(ReflowCommand::Blocks { reply }).await?;
        Self::recv(rx).await
    }

    /// Runs `f` against the environment on the driver task, between passes.
    pub async fn with_environment<R, F>(&self, f: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut E) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let job: CoordinatorJob<E> = Box::new(move |coordinator| {
            let _ = reply.send(f(coordinator.environment_mut()));
        });
        self.send(ReflowCommand::WithCoordinator(job)).await?;
        Self::recv(rx).await
    }

    /// Coordinator status plus whatever `f` reads from the environment, taken in one
    /// command so no pass can run in between.
    pub async fn status_with<R, F>(&self, f: F) -> Result<(CoordinatorStatus, R), AppError>
    where
        F: FnOnce(&E) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let job: CoordinatorJob<E> = Box::new(move |coordinator| {
            let _ = reply.send((coordinator.status(), f(coordinator.environment())));
        });
        self.send(ReflowCommand::WithCoordinator(job)).await?;
        Self::recv(rx).await
    }

    async fn send(&self, command: ReflowCommand<E>) -> Result<(), AppError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| AppError::Unavailable)
    }

    async fn recv<T>(rx: oneshot::Receiver<T>) -> Result<T, AppError> {
        rx.await.map_err(|_| AppError::Unavailable)
    }
}

/// Spawns the driver task. It runs until every handle has been dropped.
pub fn spawn_driver<E>(coordinator: Coordinator<E>) -> (ReflowHandle<E>, JoinHandle<()>)
where
    E: Environment + 'static,
{
    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let task = tokio::spawn(run(coordinator, rx));
    (ReflowHandle { tx }, task)
}

async fn run<E: Environment>(
    mut coordinator: Coordinator<E>,
    mut rx: mpsc::Receiver<ReflowCommand<E>>,
) {
    let mut initialised = false;
    if coordinator.environment().ready_state() == ReadyState::Loading {
        info!("Document still loading; waiting for content-ready signal");
    } else {
        coordinator.init();
        initialised = true;
    }

    loop {
        let deadline = coordinator.deadline();

        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    ReflowCommand::Resize => {
                        coordinator.handle_resize(Instant::now());
                    }
                    ReflowCommand::ContentReady => {
                        if initialised {
                            debug!("Content-ready signal ignored; already initialised");
                        } else {
                            coordinator.init();
                            initialised = true;
                        }
                    }
                    ReflowCommand::Register { id, reply } => {
                        let _ = reply.send(coordinator.register_element(&id));
                    }
                    ReflowCommand::Unregister { id, reply } => {
                        let _ = reply.send(coordinator.unregister(&id));
                    }
                    ReflowCommand::Blocks { reply } => {
                        let _ = reply.send(coordinator.registry().values().cloned().collect());
                    }
                    ReflowCommand::WithCoordinator(job) => {
                        job(&mut coordinator);
                    }
                }
            }
            _ = wait_until(deadline) => {
                if let Some(report) = coordinator.fire_if_due(Instant::now()) {
                    info!(
                        reflowed = report.reflowed,
                        stale = report.stale,
                        failed = report.failed,
                        "Resize reflow complete"
                    );
                }
            }
        }
    }

    debug!("Reflow driver stopped");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;
    use crate::layout::FontDescriptor;
    use crate::reflow::document::{Document, ElementSpec, ElementWidth};
    use crate::reflow::test_support::fixed_width_measurement;

    const QUIET: Duration = Duration::from_millis(250);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn document(ready_state: ReadyState) -> Document {
        let mut doc = Document::new(1000.0, ready_state);
        doc.insert(ElementSpec {
            id: "hero".into(),
            source_text: Some("Reflow headlines at any width".into()),
            font: FontDescriptor::new("700", "48px", "Inter"),
            width: ElementWidth::Viewport(0.5),
        });
        doc
    }

    fn spawn(ready_state: ReadyState) -> ReflowHandle<Document> {
        let coordinator = Coordinator::new(document(ready_state), fixed_width_measurement(10.0), QUIET);
        spawn_driver(coordinator).0
    }

    async fn current_status(handle: &ReflowHandle<Document>) -> CoordinatorStatus {
        handle.status_with(|_| ()).await.unwrap().0
    }

    async fn transitions_suppressed(handle: &ReflowHandle<Document>) -> bool {
        handle
            .with_environment(|doc| doc.transitions_suppressed())
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_reflow_runs_when_document_complete() {
        let handle = spawn(ReadyState::Complete);

        let blocks = handle.blocks().await.unwrap();
        assert_eq!(blocks.len(), 1);
        let content = handle
            .with_environment(|doc| doc.content("hero").map(str::to_string))
            .await
            .unwrap()
            .unwrap();
        assert!(content.starts_with("<span class=\"text-line\">"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_document_waits_for_content_ready() {
        let handle = spawn(ReadyState::Loading);
        assert!(handle.blocks().await.unwrap().is_empty());

        handle.content_ready().await.unwrap();
        assert_eq!(handle.blocks().await.unwrap().len(), 1);

        // A second signal does not re-run discovery.
        handle.unregister("hero").await.unwrap();
        handle.content_ready().await.unwrap();
        assert!(handle.blocks().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_burst_runs_exactly_one_pass_after_quiet_period() {
        let handle = spawn(ReadyState::Complete);

        for i in 0..5 {
            if i > 0 {
                sleep(ms(50)).await;
            }
            handle.resize().await.unwrap();
        }
        assert!(transitions_suppressed(&handle).await);
        assert!(current_status(&handle).await.resizing);

        // Last signal at t=200ms; the pass is due at t=450ms.
        sleep(ms(249)).await;
        let status = current_status(&handle).await;
        assert_eq!(status.passes, 0);
        assert!(transitions_suppressed(&handle).await);

        sleep(ms(10)).await;
        let status = current_status(&handle).await;
        assert_eq!(status.passes, 1);
        assert!(!status.resizing);
        assert!(!transitions_suppressed(&handle).await);

        sleep(ms(1000)).await;
        assert_eq!(current_status(&handle).await.passes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_with_reads_resize_state_and_document_together() {
        let handle = spawn(ReadyState::Complete);
        handle.resize().await.unwrap();

        for step in 0..8 {
            let (status, suppressed) = handle
                .status_with(|doc| doc.transitions_suppressed())
                .await
                .unwrap();
            assert_eq!(status.resizing, suppressed, "step {step}");
            sleep(ms(50)).await;
        }

        let (status, suppressed) = handle
            .status_with(|doc| doc.transitions_suppressed())
            .await
            .unwrap();
        assert_eq!(status.passes, 1);
        assert!(!status.resizing);
        assert!(!suppressed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_run_a_pass() {
        let handle = spawn(ReadyState::Complete);

        handle.resize().await.unwrap();
        sleep(ms(300)).await;
        handle.resize().await.unwrap();
        sleep(ms(300)).await;

        assert_eq!(current_status(&handle).await.passes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_pass_uses_new_viewport() {
        let handle = spawn(ReadyState::Complete);

        handle
            .with_environment(|doc| doc.set_viewport_width(200.0))
            .await
            .unwrap();
        handle.resize().await.unwrap();
        sleep(ms(300)).await;

        let blocks = handle.blocks().await.unwrap();
        assert_eq!(blocks[0].container_width_px, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_element_does_not_break_pass() {
        let handle = spawn(ReadyState::Complete);
        handle.with_environment(|doc| doc.remove("hero")).await.unwrap();

        handle.resize().await.unwrap();
        sleep(ms(300)).await;

        let status = current_status(&handle).await;
        let report = status.last_report.unwrap();
        assert_eq!(report.stale, 1);
        assert_eq!(status.registered, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_missing_source_text_is_error() {
        let handle = spawn(ReadyState::Complete);
        handle
            .with_environment(|doc| {
                doc.insert(ElementSpec {
                    id: "plain".into(),
                    source_text: None,
                    font: FontDescriptor::new("400", "16px", "serif"),
                    width: ElementWidth::Fixed(100.0),
                })
            })
            .await
            .unwrap();

        let err = handle.register("plain").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Reflow(ReflowError::MissingSourceText { .. })
        ));
    }

    #[tokio::test]
    async fn test_driver_stops_when_handles_drop() {
        let coordinator = Coordinator::new(
            document(ReadyState::Complete),
            fixed_width_measurement(10.0),
            QUIET,
        );
        let (handle, task) = spawn_driver(coordinator);
        drop(handle);
        task.await.unwrap();
    }
}
