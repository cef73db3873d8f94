//! Long-polling loop feeding a bounded pool of message handlers.

use crate::handler::ConverterBot;
use crate::telegram::{BotApi, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

pub struct Poller {
    api: Arc<dyn BotApi>,
    handler: ConverterBot,
    workers: Arc<Semaphore>,
    max_workers: usize,
    poll_timeout: Duration,
    retry_delay: Duration,
}

impl Poller {
    pub fn new(
        api: Arc<dyn BotApi>,
        handler: ConverterBot,
        max_workers: usize,
        poll_timeout: Duration,
    ) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            api,
            handler,
            workers: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            poll_timeout,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Pause between a failed poll and the next attempt.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Poll until `shutdown` is cancelled, then wait for in-flight messages.
    ///
    /// Each message runs on its own task; at most `max_workers` run at once. Polling never waits
    /// for a handler, so a slow conversion does not delay the next `getUpdates`.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            "bot running in concurrent mode with {} workers",
            self.max_workers
        );

        let mut offset: Option<i64> = None;
        let mut tasks = JoinSet::new();

        loop {
            let polled = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                polled = self.api.get_updates(offset, self.poll_timeout) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        if let Some(message) = update.message {
                            self.dispatch(&mut tasks, message);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("polling error: {}", e);
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                log_join_failure(joined);
            }
        }

        if !tasks.is_empty() {
            tracing::info!("waiting for {} in-flight message(s)", tasks.len());
        }
        while let Some(joined) = tasks.join_next().await {
            log_join_failure(joined);
        }
        tracing::info!("polling stopped");
    }

    fn dispatch(&self, tasks: &mut JoinSet<()>, message: Message) {
        let workers = self.workers.clone();
        let handler = self.handler.clone();
        tasks.spawn(async move {
            let Ok(_permit) = workers.acquire_owned().await else {
                return;
            };
            let outcome = handler.process_message(&message).await;
            tracing::debug!("chat {}: {:?}", message.chat.id, outcome);
        });
    }
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!("message handler task failed: {}", e);
    }
}
