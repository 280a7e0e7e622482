use crate::engine::EngineEvent;
use crate::reactor::TokioReactor;
use ferrous_lookup_application::LookupDriver;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Single-threaded reactor loop: feeds engine answers and timer expiries to
/// the driver. Every completion callback runs from inside this loop.
pub struct EventLoop {
    driver: LookupDriver,
    reactor: Arc<TokioReactor>,
    answers: mpsc::UnboundedReceiver<EngineEvent>,
}

impl EventLoop {
    pub fn new(
        driver: LookupDriver,
        reactor: Arc<TokioReactor>,
        answers: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> Self {
        Self {
            driver,
            reactor,
            answers,
        }
    }

    pub fn driver(&self) -> &LookupDriver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut LookupDriver {
        &mut self.driver
    }

    /// Runs until no request is in flight.
    pub async fn run_until_idle(&mut self) {
        let Self {
            driver,
            reactor,
            answers,
        } = self;

        while driver.in_flight() > 0 {
            tokio::select! {
                token = reactor.expired() => {
                    driver.on_timer_fired(token);
                }
                event = answers.recv() => match event {
                    Some(EngineEvent { handle, outcome }) => driver.on_answer(handle, outcome),
                    None => {
                        warn!(in_flight = driver.in_flight(), "Answer channel closed, canceling requests");
                        driver.shutdown();
                    }
                },
            }
        }
        debug!("Event loop idle");
    }

    /// Cancels whatever is still in flight and hands the driver back.
    pub fn into_driver(mut self) -> LookupDriver {
        self.driver.shutdown();
        self.driver
    }
}
