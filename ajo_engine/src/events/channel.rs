//! Delivery of ledger events to subscribers.
//!
//! An [`EventHandler`] owns one bounded queue and one async hook. Any number of [`EventProducer`]s feed the queue.
//! Every event is handed to the hook on its own task, so a slow hook never holds up delivery of the next event. A hook
//! that panics is logged and the handler keeps going.
//!
//! The handler stops once the last producer has been dropped and the queue is drained. It returns only after every
//! hook it started has finished.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::mpsc,
    task::{JoinError, JoinSet},
};

/// The async callback run for each event.
pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E> {
    queue: mpsc::Receiver<E>,
    intake: mpsc::Sender<E>,
    hook: Handler<E>,
}

impl<E: Send + 'static> EventHandler<E> {
    /// `buffer_size` is the number of events that may wait in the queue before publishers have to wait.
    pub fn new(buffer_size: usize, hook: Handler<E>) -> Self {
        let (intake, queue) = mpsc::channel(buffer_size.max(1));
        Self { queue, intake, hook }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { intake: self.intake.clone() }
    }

    pub async fn start_handler(self) {
        let Self { mut queue, intake, hook } = self;
        // From here on, only the producers keep the queue open
        drop(intake);
        debug!("📬️ Event handler is listening");
        let mut running = JoinSet::new();
        let mut delivered = 0usize;
        loop {
            tokio::select! {
                Some(finished) = running.join_next(), if !running.is_empty() => log_hook_result(finished),
                next = queue.recv() => match next {
                    Some(event) => {
                        delivered += 1;
                        trace!("📬️ Delivering event #{delivered}");
                        running.spawn((hook)(event));
                    },
                    None => break,
                },
            }
        }
        if !running.is_empty() {
            debug!("📬️ All producers are gone. Waiting for {} hooks to finish", running.len());
        }
        while let Some(finished) = running.join_next().await {
            log_hook_result(finished);
        }
        debug!("📬️ Event handler has shut down after {delivered} events");
    }
}

fn log_hook_result(result: Result<(), JoinError>) {
    match result {
        Ok(()) => trace!("📬️ Event hook finished"),
        Err(e) if e.is_panic() => error!("📬️ An event hook panicked. {e}"),
        Err(e) => warn!("📬️ An event hook was cancelled. {e}"),
    }
}

/// The publishing end of an [`EventHandler`]'s queue.
pub struct EventProducer<E> {
    intake: mpsc::Sender<E>,
}

impl<E> Clone for EventProducer<E> {
    fn clone(&self) -> Self {
        Self { intake: self.intake.clone() }
    }
}

impl<E> EventProducer<E> {
    /// Queues the event, waiting for room if the queue is full. If the handler has already stopped, the event is
    /// dropped and an error is logged.
    pub async fn publish_event(&self, event: E) {
        if self.intake.send(event).await.is_err() {
            error!("📬️ Event dropped. Its handler is no longer running");
        }
    }
}
