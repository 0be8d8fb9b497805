//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
};

use derive_more::Display;
use futures::{future::LocalBoxFuture, FutureExt as _, TryFutureExt as _};
use tokio::task;
use tracing as log;

#[cfg(doc)]
use crate::Task;

/// Background environment running long-lived [`Task`]s on the current thread.
///
/// Awaiting it drives all the spawned [`Task`]s, and resolves once all of
/// them complete or any of them fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set the [`Task`]s are spawned on.
    set: task::LocalSet,

    /// Spawned [`Task`]s.
    tasks: task::JoinSet<Result<(), Failure>>,
}

impl Background {
    /// Spawns a new [`Task`] under the provided `name`.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        _ = self.tasks.spawn_local_on(
            future.map_err(move |e| Failure {
                task: name,
                source: Box::new(e),
            }),
            &self.set,
        );
    }

    /// Returns the number of the spawned [`Task`]s still running.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Indicates whether there are no [`Task`]s running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Failure>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, mut tasks } = self;
        async move {
            set.run_until(async move {
                while let Some(res) = tasks.join_next().await {
                    match res {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => return Err(e),
                        Err(e) => {
                            log::error!("background task panicked: {e}");
                            return Err(Failure {
                                task: "<unknown>",
                                source: Box::new(e),
                            });
                        }
                    }
                }
                Ok(())
            })
            .await
        }
        .boxed_local()
    }
}

/// Failure of a [`Task`] running in the [`Background`].
#[derive(Debug, Display)]
#[display("`{task}` task failed: {source}")]
pub struct Failure {
    /// Name of the failed [`Task`].
    pub task: &'static str,

    /// Error the [`Task`] failed with.
    pub source: Box<dyn Error>,
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

#[cfg(test)]
mod spec {
    use std::io;

    use super::Background;

    #[tokio::test]
    async fn resolves_once_tasks_complete() {
        let mut bg = Background::default();
        bg.spawn("first", async { Ok::<_, io::Error>(()) });
        bg.spawn("second", async { Ok::<_, io::Error>(()) });
        assert_eq!(bg.len(), 2);

        bg.await.unwrap();
    }

    #[tokio::test]
    async fn reports_failed_task() {
        let mut bg = Background::default();
        bg.spawn("fine", async { Ok::<_, io::Error>(()) });
        bg.spawn("broken", async { Err(io::Error::other("boom")) });

        let err = bg.await.unwrap_err();

        assert_eq!(err.task, "broken");
        assert_eq!(err.to_string(), "`broken` task failed: boom");
    }
}
