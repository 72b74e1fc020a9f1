pub const TICK_MS: u64 = 100;

pub const COUNTDOWN_SECONDS: u32 = 5;
pub const GAME_DURATION_SECONDS: u32 = 300;

pub const SEEKER_VIEW_RANGE: f64 = 5.0;
pub const RADAR_RANGE: f64 = 15.0;
pub const RADAR_COOLDOWN_MS: u64 = 5_000;
pub const HIDER_WANDER_PROBABILITY: f64 = 0.05;

pub const SCORE_PER_HIDER: i64 = 100;
pub const SCORE_PER_SECOND: i64 = 10;

// Spawn sampling gives up on "free" cells after this many draws per map cell
// and accepts any passable one.
pub const SPAWN_DRAWS_PER_CELL: usize = 4;

pub const TIMELINE_LIMIT: usize = 24;

pub const MAX_PLAYERS_PER_MATCH: usize = 10;
pub const DEFAULT_BOT_COUNT: usize = 5;
pub const MAX_NAME_LEN: usize = 16;

pub const ACTOR_COLORS: [&str; 10] = [
    "#34D399", "#F87171", "#FB923C", "#FBBF24", "#A78BFA", "#F472B6", "#A3E635", "#F59E0B",
    "#EC4899", "#F97316",
];

pub fn pick_actor_color(index: usize) -> &'static str {
    ACTOR_COLORS[index % ACTOR_COLORS.len()]
}

/// Detection range for a hider, halved when the hider stands in cover.
pub fn effective_view_range(base_view_range: f64, in_cover: bool) -> f64 {
    if in_cover {
        base_view_range / 2.0
    } else {
        base_view_range
    }
}
