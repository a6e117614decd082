use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{ContributionCompletedEvent, CycleRolledEvent, EventHandler, EventProducer, Handler};

/// The publishing ends of all subscribed handlers. Cheap to clone, and handed to every API that emits events.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub contribution_completed_producer: Vec<EventProducer<ContributionCompletedEvent>>,
    pub cycle_rolled_producer: Vec<EventProducer<CycleRolledEvent>>,
}

impl EventProducers {
    pub async fn publish_contribution_completed(&self, event: ContributionCompletedEvent) {
        for producer in &self.contribution_completed_producer {
            trace!("📬️ Notifying contribution completed subscribers");
            producer.publish_event(event.clone()).await;
        }
    }

    pub async fn publish_cycle_rolled(&self, event: CycleRolledEvent) {
        for producer in &self.cycle_rolled_producer {
            trace!("📬️ Notifying cycle rolled subscribers");
            producer.publish_event(event.clone()).await;
        }
    }
}

pub struct EventHandlers {
    pub on_contribution_completed: Option<EventHandler<ContributionCompletedEvent>>,
    pub on_cycle_rolled: Option<EventHandler<CycleRolledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_contribution_completed = hooks.on_contribution_completed.map(|f| EventHandler::new(buffer_size, f));
        let on_cycle_rolled = hooks.on_cycle_rolled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_contribution_completed, on_cycle_rolled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_contribution_completed {
            result.contribution_completed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_cycle_rolled {
            result.cycle_rolled_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_contribution_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_cycle_rolled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_contribution_completed: Option<Handler<ContributionCompletedEvent>>,
    pub on_cycle_rolled: Option<Handler<CycleRolledEvent>>,
}

impl EventHooks {
    pub fn on_contribution_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ContributionCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_contribution_completed = Some(Arc::new(f));
        self
    }

    pub fn on_cycle_rolled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(CycleRolledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_cycle_rolled = Some(Arc::new(f));
        self
    }
}
