use crate::rng::Rng;
use crate::types::{ActorView, Intent, Role};

use super::utils::step_toward;

/// Decides the autonomous intent of one actor for this tick.
///
/// Hiders wander: with probability `wander_probability` they pick a random
/// step in `{-1, 0, 1}²`, otherwise they hold still. Seekers pick a random
/// not-yet-found hider every tick and take one greedy step toward it; there
/// is no target memory between ticks.
pub fn behave(
    actor: &ActorView,
    actors: &[ActorView],
    wander_probability: f64,
    rng: &mut Rng,
) -> Intent {
    match actor.role {
        Role::Hider => wander(wander_probability, rng),
        Role::Seeker => pursue(actor, actors, rng),
    }
}

fn wander(wander_probability: f64, rng: &mut Rng) -> Intent {
    if !rng.chance(wander_probability) {
        return Intent::NONE;
    }
    let dx = rng.axis_step();
    let dy = rng.axis_step();
    Intent::new(dx, dy)
}

fn pursue(seeker: &ActorView, actors: &[ActorView], rng: &mut Rng) -> Intent {
    let targets: Vec<&ActorView> = actors
        .iter()
        .filter(|actor| actor.is_hider() && !actor.found)
        .collect();
    if targets.is_empty() {
        return Intent::NONE;
    }
    let target = targets[rng.pick_index(targets.len())];
    step_toward(seeker.position(), target.position())
}
