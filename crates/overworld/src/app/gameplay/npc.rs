use std::time::Duration;

use engine::{Direction, EngineBindings};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::grid::GridMapper;
use super::movement::{StepController, StepOutcome, StepProgress, WorldContext};
use super::timer::RepeatTimer;

/// Wander interval as a multiple of the NPC's own step delay.
pub const WANDER_DELAY_FACTOR: u32 = 5;

/// Random-walk NPC: every wander interval it tries one step in a uniformly
/// chosen cardinal direction. Freezing suspends the wander timer.
#[derive(Debug, Clone)]
pub struct NpcController {
    body: StepController,
    wander: RepeatTimer,
    frozen: bool,
}

impl NpcController {
    pub fn new(body: StepController) -> Self {
        let wander = RepeatTimer::armed(wander_interval(body.delay()));
        Self {
            body,
            wander,
            frozen: false,
        }
    }

    pub fn body(&self) -> &StepController {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut StepController {
        &mut self.body
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_wandering(&self) -> bool {
        self.wander.is_armed()
    }

    pub fn tick_step<B: EngineBindings + ?Sized>(
        &mut self,
        dt: Duration,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> StepProgress {
        self.body.tick(dt, ctx, bindings)
    }

    pub fn wander<R, B>(
        &mut self,
        dt: Duration,
        rng: &mut R,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> Option<StepOutcome>
    where
        R: Rng + ?Sized,
        B: EngineBindings + ?Sized,
    {
        if self.frozen || self.wander.tick(dt) == 0 {
            return None;
        }
        let direction = *Direction::ALL.choose(rng)?;
        Some(self.body.try_step(direction, ctx, bindings))
    }

    /// Cancels the wander timer and any step in flight.
    pub fn freeze<B: EngineBindings + ?Sized>(&mut self, mapper: &GridMapper, bindings: &mut B) {
        if self.frozen {
            return;
        }
        self.frozen = true;
        self.wander.cancel();
        self.body.cancel_step(mapper, bindings);
        debug!(entity = %self.body.name(), "npc_frozen");
    }

    /// Arms a fresh wander timer.
    pub fn resume(&mut self) {
        if !self.frozen {
            return;
        }
        self.frozen = false;
        self.wander.arm(wander_interval(self.body.delay()));
        debug!(entity = %self.body.name(), "npc_resumed");
    }
}

fn wander_interval(step_delay: Duration) -> Duration {
    step_delay.saturating_mul(WANDER_DELAY_FACTOR)
}
