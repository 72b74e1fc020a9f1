use crate::terrain::TerrainMap;
use crate::types::{Intent, Vec2};

/// Resolves one intent against the terrain. Both axes move together; a
/// destination that is off the grid or impassable leaves the actor where it
/// was. Rejection is an ordinary outcome, not an error.
pub fn try_move(terrain: &TerrainMap, from: Vec2, intent: Intent) -> Vec2 {
    let candidate = Vec2::new(from.x + intent.dx, from.y + intent.dy);
    match terrain.is_passable(candidate.x, candidate.y) {
        Ok(true) => candidate,
        _ => from,
    }
}
