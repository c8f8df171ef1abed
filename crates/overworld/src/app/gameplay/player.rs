use std::collections::VecDeque;
use std::time::Duration;

use engine::{Direction, EngineBindings, InputAction, InputSnapshot};

use super::movement::{StepController, StepOutcome, StepProgress, WorldContext};
use super::timer::RepeatTimer;

pub const INPUT_QUEUE_CAPACITY: usize = 4;

/// Press edges are examined in this order within one tick.
const EDGE_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Left,
    Direction::Up,
    Direction::Down,
];

pub fn movement_action(direction: Direction) -> InputAction {
    match direction {
        Direction::Up => InputAction::MoveUp,
        Direction::Down => InputAction::MoveDown,
        Direction::Left => InputAction::MoveLeft,
        Direction::Right => InputAction::MoveRight,
    }
}

pub fn any_direction_held(input: &InputSnapshot) -> bool {
    Direction::ALL
        .iter()
        .any(|direction| input.is_down(movement_action(*direction)))
}

/// Held directions, newest press first. Each direction appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputQueue {
    entries: VecDeque<Direction>,
}

impl InputQueue {
    pub fn push(&mut self, direction: Direction) {
        self.entries.retain(|queued| *queued != direction);
        self.entries.push_front(direction);
        self.entries.truncate(INPUT_QUEUE_CAPACITY);
    }

    pub fn retain_held<F>(&mut self, mut is_held: F)
    where
        F: FnMut(Direction) -> bool,
    {
        self.entries.retain(|direction| is_held(*direction));
    }

    pub fn front(&self) -> Option<Direction> {
        self.entries.front().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.entries.iter().copied()
    }
}

/// Keyboard-driven stepping: one immediate step per press edge, then repeats
/// at the step cadence while the newest held direction stays down.
#[derive(Debug, Clone)]
pub struct PlayerController {
    body: StepController,
    queue: InputQueue,
    repeat: RepeatTimer,
    sustained: Option<Direction>,
}

impl PlayerController {
    pub fn new(body: StepController) -> Self {
        Self {
            body,
            queue: InputQueue::default(),
            repeat: RepeatTimer::default(),
            sustained: None,
        }
    }

    pub fn body(&self) -> &StepController {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut StepController {
        &mut self.body
    }

    pub fn queue(&self) -> &InputQueue {
        &self.queue
    }

    pub fn sustained_direction(&self) -> Option<Direction> {
        self.sustained
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat.is_armed()
    }

    pub fn tick_step<B: EngineBindings + ?Sized>(
        &mut self,
        dt: Duration,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> StepProgress {
        self.body.tick(dt, ctx, bindings)
    }

    /// The first fresh press in edge order cancels the repeat, steps once and
    /// becomes the newest queued direction. Later edges in the same tick are
    /// ignored.
    pub fn handle_press_edges<B: EngineBindings + ?Sized>(
        &mut self,
        input: &InputSnapshot,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> Option<StepOutcome> {
        let direction = EDGE_ORDER
            .into_iter()
            .find(|direction| input.just_pressed(movement_action(*direction)))?;
        self.repeat.cancel();
        self.sustained = None;
        let outcome = self.body.try_step(direction, ctx, bindings);
        self.queue.push(direction);
        Some(outcome)
    }

    /// Drops released directions and repeats the newest held one. A change of
    /// sustained direction re-arms the repeat without stepping this tick.
    pub fn handle_sustained<B: EngineBindings + ?Sized>(
        &mut self,
        dt: Duration,
        input: &InputSnapshot,
        ctx: &WorldContext<'_>,
        bindings: &mut B,
    ) -> Option<StepOutcome> {
        self.queue
            .retain_held(|direction| input.is_down(movement_action(direction)));

        let Some(direction) = self.queue.front() else {
            self.repeat.cancel();
            self.sustained = None;
            return None;
        };

        if self.sustained != Some(direction) {
            self.sustained = Some(direction);
            self.repeat.arm(self.body.delay());
            return None;
        }

        if self.repeat.tick(dt) == 0 {
            return None;
        }
        Some(self.body.try_step(direction, ctx, bindings))
    }
}
