use super::*;
use crate::constants::SPAWN_DRAWS_PER_CELL;

/// Places every participant: fixed spawns are checked and reserved first,
/// the rest are sampled in roster order.
pub(super) fn place_roster(
    terrain: &TerrainMap,
    roster: &[ParticipantDescriptor],
    rng: &mut Rng,
) -> Result<Vec<Vec2>, EngineError> {
    let mut taken: Vec<Vec2> = Vec::with_capacity(roster.len());
    for participant in roster {
        let Some(spawn) = participant.spawn else {
            continue;
        };
        if terrain.is_passable(spawn.x, spawn.y) != Ok(true) {
            return Err(EngineError::InvalidRoster(format!(
                "fixed spawn ({}, {}) for '{}' is not a passable cell",
                spawn.x, spawn.y, participant.id
            )));
        }
        taken.push(spawn);
    }

    let mut positions = Vec::with_capacity(roster.len());
    for participant in roster {
        let position = match participant.spawn {
            Some(spawn) => spawn,
            None => {
                let cell = pick_spawn(terrain, &taken, rng);
                taken.push(cell);
                cell
            }
        };
        positions.push(position);
    }
    Ok(positions)
}

/// Draws uniform random cells until one is passable. Cells already taken are
/// skipped while the draw budget lasts; after that any passable cell is fine.
pub(super) fn pick_spawn(terrain: &TerrainMap, taken: &[Vec2], rng: &mut Rng) -> Vec2 {
    let draws = draw_budget(terrain.width(), terrain.height());
    let mut fallback: Option<Vec2> = None;
    for _ in 0..draws {
        let x = rng.int(0, terrain.width() - 1);
        let y = rng.int(0, terrain.height() - 1);
        if terrain.is_passable(x, y) != Ok(true) {
            continue;
        }
        let cell = Vec2::new(x, y);
        if !taken.contains(&cell) {
            return cell;
        }
        fallback.get_or_insert(cell);
    }
    if let Some(cell) = fallback {
        return cell;
    }

    // TerrainMap guarantees at least one passable cell.
    let cells = terrain.passable_cells();
    cells
        .get(rng.pick_index(cells.len()))
        .copied()
        .unwrap_or(Vec2::new(0, 0))
}

fn draw_budget(width: i32, height: i32) -> usize {
    (width.max(0) as usize)
        .saturating_mul(height.max(0) as usize)
        .saturating_mul(SPAWN_DRAWS_PER_CELL)
}
