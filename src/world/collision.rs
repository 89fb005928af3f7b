use crate::engine::input::Direction;
use crate::engine::Rect;
use crate::world::Obstacle;

/// Would walking one `step` towards `direction` put the player inside an
/// obstacle?
///
/// Nothing is moved to find out : each obstacle's box is PROJECTED by the
/// world shift the step would cause, then compared with the player's box as
/// it is right now.
///
/// ```text
///   walking Right, step 4        obstacle box seen 4px to the left
///   ┌────────┐ ┌────────┐        ┌────────┐┌────────┐
///   │ player │ │obstacle│   ->   │ player ┌┼───────┐│
///   └────────┘ └────────┘        └────────┼┘       │┘
///                                         └────────┘
/// ```
///
/// Moving the obstacles by the world shift is the same relative motion as
/// moving the player by its travel, so the answer holds whether the camera
/// follows the player or not.
///
/// Obstacles are checked in order and the first hit wins.
pub fn is_blocked(player: &Rect, obstacles: &[Obstacle], direction: Direction, step: f32) -> bool {
    let shift = direction.world_shift(step);
    obstacles
        .iter()
        .any(|obstacle| player.intersects(&obstacle.bounding_box().translated(shift)))
}
