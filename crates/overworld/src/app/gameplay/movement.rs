//! Discrete cell-to-cell stepping shared by the player and NPCs.
//!
//! A step commits the logical cell as soon as it is accepted; the sprite
//! catches up through two axis tweens over the entity's step delay.

use std::fmt;
use std::time::Duration;

use engine::{
    character_sheet, still_animation_key, walk_animation_key, AnimationSet, Axis, Direction,
    EngineBindings, SpriteDesc, SpriteHandle, SpriteKeyError, TweenId,
};
use tracing::{debug, warn};

use super::collision::CollisionGrid;
use super::grid::{GridCell, GridMapper, PlayableBounds};
use super::world_build::CHARACTER_DEPTH;

/// Read-only world state a step is validated against.
#[derive(Debug, Clone, Copy)]
pub struct WorldContext<'a> {
    pub mapper: &'a GridMapper,
    pub collision: Option<&'a CollisionGrid>,
    pub bounds: Option<PlayableBounds>,
}

impl<'a> WorldContext<'a> {
    pub fn new(mapper: &'a GridMapper) -> Self {
        Self {
            mapper,
            collision: None,
            bounds: None,
        }
    }

    pub fn with_collision(mut self, collision: &'a CollisionGrid) -> Self {
        self.collision = Some(collision);
        self
    }

    pub fn with_bounds(mut self, bounds: Option<PlayableBounds>) -> Self {
        self.bounds = bounds;
        self
    }

    /// Guards run in order: grid range, collision grid, pixel bounds.
    pub fn check(&self, cell: GridCell) -> Result<(), BlockReason> {
        if !self.mapper.contains(cell) {
            return Err(BlockReason::OutOfGrid);
        }
        if self.collision.is_some_and(|grid| grid.is_blocked(cell)) {
            return Err(BlockReason::Collision);
        }
        if let Some(bounds) = self.bounds {
            if !bounds.contains(self.mapper.to_world(cell)) {
                return Err(BlockReason::OutOfBounds);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    OutOfGrid,
    Collision,
    OutOfBounds,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BlockReason::OutOfGrid => "out_of_grid",
            BlockReason::Collision => "collision",
            BlockReason::OutOfBounds => "out_of_bounds",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Started { from: GridCell, to: GridCell },
    Blocked(BlockReason),
}

impl StepOutcome {
    pub fn started(&self) -> bool {
        matches!(self, StepOutcome::Started { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepProgress {
    Idle,
    Moving,
    Arrived(GridCell),
    /// The destination became blocked mid-step; the entity is back on its
    /// previous cell.
    Aborted(GridCell),
}

#[derive(Debug, Clone, Copy)]
struct ActiveStep {
    from: GridCell,
    to: GridCell,
    elapsed: Duration,
    tweens: [Option<TweenId>; 2],
}

#[derive(Debug, Clone, Copy)]
enum StepState {
    Idle,
    Stepping(ActiveStep),
}

#[derive(Debug, Clone)]
pub struct StepController {
    name: String,
    sprite: SpriteHandle,
    cell: GridCell,
    facing: Direction,
    delay: Duration,
    state: StepState,
}

impl StepController {
    pub fn new(
        name: impl Into<String>,
        sprite: SpriteHandle,
        cell: GridCell,
        facing: Direction,
        delay: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            sprite,
            cell,
            facing,
            delay,
            state: StepState::Idle,
        }
    }

    /// Registers the entity's clips, creates its sprite centered on `cell` and
    /// starts the idle pose.
    pub fn spawn<B: EngineBindings + ?Sized>(
        bindings: &mut B,
        mapper: &GridMapper,
        name: &str,
        cell: GridCell,
        facing: Direction,
        delay: Duration,
    ) -> Result<Self, SpriteKeyError> {
        let animations = AnimationSet::for_entity(name)?;
        animations.register(bindings);
        let sprite = bindings.create_sprite(
            SpriteDesc::new(animations.texture(), mapper.cell_center(cell))
                .with_depth(CHARACTER_DEPTH)
                .with_sheet(character_sheet()),
        );
        let controller = Self::new(name, sprite, cell, facing, delay);
        controller.play_still(bindings);
        Ok(controller)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    /// The committed cell. During a step this is already the destination.
    pub fn cell(&self) -> GridCell {
        self.cell
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, StepState::Idle)
    }

    pub fn is_stepping(&self) -> bool {
        !self.is_idle()
    }

    /// Attempts one step. A step already in flight is completed instantly
    /// first. A rejected step changes nothing else.
    pub fn try_step<B: EngineBindings + ?Sized>(
        &mut self,
        direction: Direction,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> StepOutcome {
        if self.is_stepping() {
            self.cancel_step(ctx.mapper, bindings);
        }

        let from = self.cell;
        let to = from.step(direction);
        if let Err(reason) = ctx.check(to) {
            debug!(
                entity = %self.name,
                col = to.col,
                row = to.row,
                reason = %reason,
                "step_blocked"
            );
            return StepOutcome::Blocked(reason);
        }

        self.cell = to;
        self.facing = direction;
        bindings.play_animation(self.sprite, &walk_animation_key(&self.name, direction));
        let target = ctx.mapper.cell_center(to);
        let tweens = [
            bindings.tween_position(self.sprite, Axis::X, target.x, self.delay),
            bindings.tween_position(self.sprite, Axis::Y, target.y, self.delay),
        ];
        self.state = StepState::Stepping(ActiveStep {
            from,
            to,
            elapsed: Duration::ZERO,
            tweens,
        });
        debug!(entity = %self.name, col = to.col, row = to.row, "step_started");
        StepOutcome::Started { from, to }
    }

    /// Advances an in-flight step, re-validating its destination first.
    pub fn tick<B: EngineBindings + ?Sized>(
        &mut self,
        dt: Duration,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> StepProgress {
        let StepState::Stepping(mut step) = self.state else {
            return StepProgress::Idle;
        };

        if let Err(reason) = ctx.check(step.to) {
            stop_tweens(&step, bindings);
            self.cell = step.from;
            bindings.set_sprite_position(self.sprite, ctx.mapper.cell_center(step.from));
            self.state = StepState::Idle;
            self.play_still(bindings);
            warn!(
                entity = %self.name,
                col = step.to.col,
                row = step.to.row,
                reason = %reason,
                "step_aborted"
            );
            return StepProgress::Aborted(step.from);
        }

        step.elapsed = step.elapsed.saturating_add(dt);
        if step.elapsed < self.delay {
            self.state = StepState::Stepping(step);
            return StepProgress::Moving;
        }

        stop_tweens(&step, bindings);
        bindings.set_sprite_position(self.sprite, ctx.mapper.cell_center(step.to));
        self.state = StepState::Idle;
        self.play_still(bindings);
        StepProgress::Arrived(step.to)
    }

    /// Ends an in-flight step on its committed cell.
    pub fn cancel_step<B: EngineBindings + ?Sized>(&mut self, mapper: &GridMapper, bindings: &mut B) {
        let StepState::Stepping(step) = self.state else {
            return;
        };
        stop_tweens(&step, bindings);
        bindings.set_sprite_position(self.sprite, mapper.cell_center(step.to));
        self.state = StepState::Idle;
        self.play_still(bindings);
    }

    /// Turns in place. Only an idle entity shows the new pose right away.
    pub fn face<B: EngineBindings + ?Sized>(&mut self, direction: Direction, bindings: &mut B) {
        self.facing = direction;
        if self.is_idle() {
            self.play_still(bindings);
        }
    }

    fn play_still<B: EngineBindings + ?Sized>(&self, bindings: &mut B) {
        bindings.play_animation(self.sprite, &still_animation_key(&self.name, self.facing));
    }
}

fn stop_tweens<B: EngineBindings + ?Sized>(step: &ActiveStep, bindings: &mut B) {
    for tween in step.tweens.iter().flatten() {
        bindings.stop_tween(*tween);
    }
}
