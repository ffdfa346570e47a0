//! Mobility Task Implementation
//!
//! The tick loop: every `step_delay` all UEs are moved once, in route index
//! order. Each move is published through the dispatcher after the state lock
//! is released, so a listener applying backpressure never blocks readers.
//!
//! A UE found off its route, or a failed route replacement, stops the whole
//! loop once the current pass over all UEs is finished. The task then returns
//! an error and the process shuts down.

use std::sync::Arc;

use ransim_common::{Coordinate, UpdateType};
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::engine::MoveOutcome;
use super::MobilityError;
use crate::dispatcher::Event;
use crate::routes::RouteGenerator;
use crate::tasks::SimTaskBase;

/// Counters for one pass over all UEs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Position-only updates
    pub moved: usize,
    /// Tower-changed updates
    pub handovers: usize,
    /// Routes replaced at end of route
    pub routes_replaced: usize,
}

/// Mobility task driving every UE along its route
pub struct MobilityTask {
    /// Task base with shared state and dispatcher
    task_base: SimTaskBase,
    /// Source of replacement routes
    generator: Arc<dyn RouteGenerator>,
}

impl MobilityTask {
    /// Creates a new mobility task
    pub fn new(task_base: SimTaskBase, generator: Arc<dyn RouteGenerator>) -> Self {
        Self {
            task_base,
            generator,
        }
    }

    /// Runs the tick loop until shutdown or a fatal fault.
    pub async fn run(
        &mut self,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> Result<(), MobilityError> {
        let delay = self.task_base.config.routes.step_delay();
        info!("Mobility task started, step delay {:?}", delay);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            match self.tick().await {
                Ok(summary) => debug!(
                    "Tick done: {} moved, {} handovers, {} new routes",
                    summary.moved, summary.handovers, summary.routes_replaced
                ),
                Err(e) => {
                    error!("Stopped driving: {}", e);
                    return Err(e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_rx.changed() => break,
            }
        }

        info!("Mobility task stopped");
        Ok(())
    }

    /// Moves every UE once.
    ///
    /// A fault on one UE does not skip the others; the first fault of the
    /// pass is returned once every UE has been handled.
    pub async fn tick(&self) -> Result<TickSummary, MobilityError> {
        let ue_count = self.task_base.state.read().await.ue_count();
        let mut summary = TickSummary::default();
        let mut fault = None;

        for index in 0..ue_count {
            let outcome = self.task_base.state.write().await.move_ue(index);
            match outcome {
                MoveOutcome::Moved(update) => {
                    match update.update_type {
                        UpdateType::Position => summary.moved += 1,
                        UpdateType::Tower => {
                            summary.handovers += 1;
                            info!(
                                "{} handover: serving {}, candidates {:?}",
                                update.ue.name,
                                update.ue.serving_tower(),
                                update.ue.cells.candidate_names()
                            );
                        }
                    }
                    self.task_base
                        .dispatcher
                        .publish(Event::ue_updated(update.ue, update.update_type))
                        .await;
                }
                MoveOutcome::EndOfRoute { ue, route, finish } => {
                    info!("{} reached the end of {}", ue, route);
                    match self.replace_route(index, &ue, finish).await {
                        Ok(()) => summary.routes_replaced += 1,
                        Err(e) => {
                            error!("{}", e);
                            fault.get_or_insert(e);
                        }
                    }
                }
                MoveOutcome::Fault(reason) => {
                    error!("{}", reason);
                    fault.get_or_insert(MobilityError::RouteConsistency(reason));
                }
            }
        }

        // the pass always covers every UE, a fault ends the loop afterwards
        if let Some(e) = fault {
            return Err(e);
        }
        self.task_base.state.write().await.advance_tick();
        Ok(summary)
    }

    async fn replace_route(
        &self,
        index: usize,
        ue: &str,
        finish: Coordinate,
    ) -> Result<(), MobilityError> {
        let color = self.task_base.state.read().await.color_for_ue(ue);
        let route_index = u32::try_from(index).map_err(|_| {
            MobilityError::RouteConsistency(format!("route index {index} out of range"))
        })?;

        let route = self
            .generator
            .new_route(
                finish,
                route_index,
                &self.task_base.config.routes.api_key,
                &color,
            )
            .await
            .map_err(|source| MobilityError::RouteReplacement {
                ue: ue.to_string(),
                source,
            })?;

        self.task_base
            .state
            .write()
            .await
            .replace_route(index, route.clone())
            .map_err(|source| MobilityError::RouteReplacement {
                ue: ue.to_string(),
                source,
            })?;

        info!(
            "New route {} for {} with {} waypoints",
            route.name,
            ue,
            route.waypoints.len()
        );
        self.task_base
            .dispatcher
            .publish(Event::route_updated(route))
            .await;
        Ok(())
    }
}
