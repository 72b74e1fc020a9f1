use serde::{Deserialize, Serialize};

use crate::constants::{
    COUNTDOWN_SECONDS, GAME_DURATION_SECONDS, HIDER_WANDER_PROBABILITY, RADAR_COOLDOWN_MS,
    RADAR_RANGE, SEEKER_VIEW_RANGE, TICK_MS,
};
use crate::error::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Hider,
    Seeker,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hider" => Some(Self::Hider),
            "seeker" => Some(Self::Seeker),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Requested unit displacement for one actor in the upcoming tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Intent {
    pub dx: i32,
    pub dy: i32,
}

impl Intent {
    pub const NONE: Self = Self { dx: 0, dy: 0 };

    /// Any integer pair is reduced to its per-axis sign.
    pub fn new(dx: i32, dy: i32) -> Self {
        Self {
            dx: dx.signum(),
            dy: dy.signum(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Countdown,
    Active,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Timeout,
    AllFound,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    #[serde(rename = "countdownSeconds")]
    pub countdown_seconds: u32,
    #[serde(rename = "gameDurationSeconds")]
    pub game_duration_seconds: u32,
    #[serde(rename = "baseViewRange")]
    pub base_view_range: f64,
    #[serde(rename = "radarRange")]
    pub radar_range: f64,
    #[serde(rename = "radarCooldownMs")]
    pub radar_cooldown_ms: u64,
    #[serde(rename = "tickIntervalMs")]
    pub tick_interval_ms: u64,
    #[serde(rename = "hiderWanderProbability")]
    pub hider_wander_probability: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: COUNTDOWN_SECONDS,
            game_duration_seconds: GAME_DURATION_SECONDS,
            base_view_range: SEEKER_VIEW_RANGE,
            radar_range: RADAR_RANGE,
            radar_cooldown_ms: RADAR_COOLDOWN_MS,
            tick_interval_ms: TICK_MS,
            hider_wander_probability: HIDER_WANDER_PROBABILITY,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.game_duration_seconds == 0 {
            return Err(EngineError::InvalidConfig(
                "gameDurationSeconds must be positive".to_string(),
            ));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms >= 1_000 {
            return Err(EngineError::InvalidConfig(format!(
                "tickIntervalMs must be within 1..1000, got {}",
                self.tick_interval_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.hider_wander_probability) {
            return Err(EngineError::InvalidConfig(format!(
                "hiderWanderProbability must be within [0, 1], got {}",
                self.hider_wander_probability
            )));
        }
        for (name, value) in [
            ("baseViewRange", self.base_view_range),
            ("radarRange", self.radar_range),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// How many simulation ticks fit into one timer second.
    pub fn ticks_per_second(&self) -> u64 {
        (1_000 / self.tick_interval_ms.max(1)).max(1)
    }
}

#[derive(Clone, Debug)]
pub struct ParticipantDescriptor {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub controlled: bool,
    pub color: String,
    pub spawn: Option<Vec2>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ActorView {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub x: i32,
    pub y: i32,
    pub controlled: bool,
    pub found: bool,
    pub color: String,
}

impl ActorView {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn is_hider(&self) -> bool {
        self.role == Role::Hider
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchState {
    pub phase: Phase,
    #[serde(rename = "countdownRemaining")]
    pub countdown_remaining: u32,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: u32,
    #[serde(rename = "lastRadarAtMs")]
    pub last_radar_at_ms: Option<u64>,
    pub tick: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    #[serde(rename = "actorId")]
    pub actor_id: String,
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RadarResult {
    Bearing { angle: f64, distance: f64 },
    NoSignal,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    pub tick: u64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    CountdownTick {
        remaining: u32,
    },
    MatchStarted {
        #[serde(rename = "timeRemaining")]
        time_remaining: u32,
    },
    HiderFound {
        #[serde(rename = "actorId")]
        actor_id: String,
        name: String,
    },
    RadarPinged {
        #[serde(rename = "actorId")]
        actor_id: String,
    },
    MatchEnded {
        reason: GameOverReason,
        score: i64,
        perspective: Role,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct MapInit {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: Phase,
    #[serde(rename = "countdownRemaining")]
    pub countdown_remaining: u32,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: u32,
    #[serde(rename = "hidersTotal")]
    pub hiders_total: usize,
    #[serde(rename = "hidersRemaining")]
    pub hiders_remaining: usize,
    pub actors: Vec<ActorView>,
    pub events: Vec<RuntimeEvent>,
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchSummary {
    pub reason: GameOverReason,
    pub score: i64,
    pub perspective: Role,
    #[serde(rename = "hidersTotal")]
    pub hiders_total: usize,
    #[serde(rename = "hidersFound")]
    pub hiders_found: usize,
    #[serde(rename = "hidersRemaining")]
    pub hiders_remaining: usize,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: u32,
    #[serde(rename = "elapsedSeconds")]
    pub elapsed_seconds: u32,
    pub ticks: u64,
    pub timeline: Vec<TimelineEvent>,
}

/// What one driver call produced: the state after it, the detections it
/// caused, and the summary when it ended the match.
#[derive(Clone, Debug)]
pub struct StepReport {
    pub state: MatchState,
    pub detections: Vec<Detection>,
    pub summary: Option<MatchSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_is_normalized_to_unit_steps() {
        assert_eq!(Intent::new(5, -3), Intent { dx: 1, dy: -1 });
        assert_eq!(Intent::new(0, 0), Intent::NONE);
        assert!(Intent::new(0, 0).is_none());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
        assert_eq!(MatchConfig::default().ticks_per_second(), 10);
    }

    #[test]
    fn config_rejects_slow_ticks_and_bad_probability() {
        let slow = MatchConfig {
            tick_interval_ms: 1_000,
            ..MatchConfig::default()
        };
        assert!(matches!(slow.validate(), Err(EngineError::InvalidConfig(_))));

        let odd = MatchConfig {
            hider_wander_probability: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(odd.validate(), Err(EngineError::InvalidConfig(_))));

        let blind = MatchConfig {
            base_view_range: f64::NAN,
            ..MatchConfig::default()
        };
        assert!(matches!(blind.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn config_overrides_deserialize_with_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"gameDurationSeconds":60,"radarRange":4.5}"#)
                .expect("config should parse");
        assert_eq!(config.game_duration_seconds, 60);
        assert_eq!(config.radar_range, 4.5);
        assert_eq!(config.countdown_seconds, COUNTDOWN_SECONDS);
    }

    #[test]
    fn role_parses_wire_names() {
        assert_eq!(Role::parse("hider"), Some(Role::Hider));
        assert_eq!(Role::parse("seeker"), Some(Role::Seeker));
        assert_eq!(Role::parse("ghost"), None);
    }
}
