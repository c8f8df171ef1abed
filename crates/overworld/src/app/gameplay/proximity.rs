use engine::{Direction, EngineBindings, InputSnapshot};

use super::grid::{GridCell, GridMapper};
use super::npc::NpcController;
use super::player::{any_direction_held, PlayerController};

/// True when the cells touch, diagonals included.
pub fn is_adjacent(a: GridCell, b: GridCell) -> bool {
    a.chebyshev_distance(b) <= 1
}

/// Direction from `observer` toward `subject`. Columns decide first, then
/// rows; the same cell falls back to `Left`.
pub fn relative_direction(observer: GridCell, subject: GridCell) -> Direction {
    if subject.col < observer.col {
        Direction::Left
    } else if subject.col > observer.col {
        Direction::Right
    } else if subject.row < observer.row {
        Direction::Up
    } else if subject.row > observer.row {
        Direction::Down
    } else {
        Direction::Left
    }
}

/// Freezes an NPC next to the player and turns the two toward each other, or
/// lets it wander again once apart. Returns whether they are adjacent.
///
/// The player only turns while standing still with no direction held, so a
/// walking player keeps its own facing.
pub fn apply_proximity<B: EngineBindings + ?Sized>(
    player: &mut PlayerController,
    npc: &mut NpcController,
    input: &InputSnapshot,
    mapper: &GridMapper,
    bindings: &mut B,
) -> bool {
    let player_cell = player.body().cell();
    let npc_cell = npc.body().cell();
    if !is_adjacent(player_cell, npc_cell) {
        npc.resume();
        return false;
    }

    npc.freeze(mapper, bindings);
    let toward_player = relative_direction(npc_cell, player_cell);
    npc.body_mut().face(toward_player, bindings);
    if player.body().is_idle() && !any_direction_held(input) {
        player
            .body_mut()
            .face(toward_player.opposite(), bindings);
    }
    true
}
