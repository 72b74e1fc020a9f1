use std::collections::HashSet;
use std::sync::Arc;

use crate::constants::TIMELINE_LIMIT;
use crate::error::{EngineError, RadarError};
use crate::rng::Rng;
use crate::terrain::TerrainMap;
use crate::types::{
    ActorView, Detection, GameOverReason, Intent, MatchConfig, MatchState, MatchSummary,
    ParticipantDescriptor, Phase, RadarResult, Role, RuntimeEvent, Snapshot, StepReport,
    TimelineEvent, Vec2,
};

mod behavior;
mod clock;
mod movement;
mod radar;
mod spawn_system;
mod utils;
mod visibility;

pub use self::behavior::behave;
pub use self::clock::{derive_score, ClockTransition, MatchClock};
pub use self::movement::try_move;
pub use self::radar::{bearing, RadarAid};
pub use self::visibility::{is_rendered_for, is_within_view, spot, Viewpoint};

use self::spawn_system::place_roster;

#[derive(Clone, Debug)]
struct ActorInternal {
    view: ActorView,
    spawn: Vec2,
    found_at_tick: Option<u64>,
}

/// One match: roster, terrain, clock, radar and the pending controlled
/// intent. Every engine call goes through a value of this type; there is no
/// global match state.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    pub config: MatchConfig,
    pub seed: u32,

    terrain: Arc<TerrainMap>,
    rng: Rng,
    actors: Vec<ActorInternal>,
    controlled_idx: Option<usize>,
    seeker_idx: usize,
    pending_intent: Option<Intent>,
    clock: MatchClock,
    radar: RadarAid,
    events: Vec<RuntimeEvent>,
    timeline: Vec<TimelineEvent>,
    tick_counter: u64,
    summary: Option<MatchSummary>,
}

impl MatchEngine {
    pub fn start(
        roster: Vec<ParticipantDescriptor>,
        terrain: Arc<TerrainMap>,
        config: MatchConfig,
        seed: u32,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let (seeker_idx, controlled_idx) = validate_roster(&roster)?;

        let mut rng = Rng::new(seed);
        let positions = place_roster(&terrain, &roster, &mut rng)?;
        let actors = roster
            .into_iter()
            .zip(positions)
            .map(|(participant, spawn)| ActorInternal {
                view: ActorView {
                    id: participant.id,
                    name: participant.name,
                    role: participant.role,
                    x: spawn.x,
                    y: spawn.y,
                    controlled: participant.controlled,
                    found: false,
                    color: participant.color,
                },
                spawn,
                found_at_tick: None,
            })
            .collect();

        let clock = MatchClock::new(config.countdown_seconds, config.game_duration_seconds);
        let radar = RadarAid::new(config.radar_range, config.radar_cooldown_ms);

        let mut engine = Self {
            config,
            seed,
            terrain,
            rng,
            actors,
            controlled_idx,
            seeker_idx,
            pending_intent: None,
            clock,
            radar,
            events: Vec::new(),
            timeline: Vec::new(),
            tick_counter: 0,
            summary: None,
        };
        log::info!(
            "match created: seed={} actors={} hiders={} countdown={}s duration={}s",
            engine.seed,
            engine.actors.len(),
            engine.hiders_total(),
            engine.config.countdown_seconds,
            engine.config.game_duration_seconds
        );
        if engine.clock.is_active() {
            engine.on_started();
        }
        Ok(engine)
    }

    pub fn terrain(&self) -> &Arc<TerrainMap> {
        &self.terrain
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorView> {
        self.actors.iter().map(|actor| &actor.view)
    }

    pub fn actor(&self, actor_id: &str) -> Option<&ActorView> {
        self.actors().find(|actor| actor.id == actor_id)
    }

    pub fn controlled_actor(&self) -> Option<&ActorView> {
        self.controlled_idx.map(|idx| &self.actors[idx].view)
    }

    pub fn spawn_of(&self, actor_id: &str) -> Option<Vec2> {
        self.actors
            .iter()
            .find(|actor| actor.view.id == actor_id)
            .map(|actor| actor.spawn)
    }

    /// Tick on which a hider was found, if it has been.
    pub fn found_at_tick(&self, actor_id: &str) -> Option<u64> {
        self.actors
            .iter()
            .find(|actor| actor.view.id == actor_id)
            .and_then(|actor| actor.found_at_tick)
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn is_ended(&self) -> bool {
        self.clock.is_ended()
    }

    pub fn summary(&self) -> Option<&MatchSummary> {
        self.summary.as_ref()
    }

    pub fn state(&self) -> MatchState {
        MatchState {
            phase: self.clock.phase(),
            countdown_remaining: self.clock.countdown_remaining(),
            time_remaining: self.clock.time_remaining(),
            last_radar_at_ms: self.radar.last_activation_ms(),
            tick: self.tick_counter,
        }
    }

    pub fn radar_ready_in_ms(&self, now_ms: u64) -> u64 {
        self.radar.ready_in_ms(now_ms)
    }

    /// Radar gauge fill in `[0, 1]`.
    pub fn radar_charge(&self, now_ms: u64) -> f64 {
        self.radar.charge(now_ms)
    }

    pub fn hiders_total(&self) -> usize {
        self.actors.iter().filter(|actor| actor.view.is_hider()).count()
    }

    pub fn hiders_found(&self) -> usize {
        self.actors
            .iter()
            .filter(|actor| actor.view.is_hider() && actor.view.found)
            .count()
    }

    /// Sets the controlled actor's displacement for the next tick; the last
    /// call before the tick wins. Returns false when nothing can use it.
    pub fn submit_intent(&mut self, dx: i32, dy: i32) -> bool {
        if self.controlled_idx.is_none() || self.clock.is_ended() {
            return false;
        }
        self.pending_intent = Some(Intent::new(dx, dy));
        true
    }

    /// One simulation step: controlled move, autonomous moves, detection,
    /// termination check. Does nothing outside the active phase.
    pub fn tick(&mut self) -> StepReport {
        if !self.clock.is_active() {
            return self.report(Vec::new(), None);
        }
        self.tick_counter += 1;

        let intent = self.pending_intent.take().unwrap_or(Intent::NONE);
        if let Some(idx) = self.controlled_idx {
            if !intent.is_none() {
                self.move_actor(idx, intent);
            }
        }
        self.update_autonomous_actors();
        let detections = self.update_visibility();
        let summary = self.check_game_over();
        self.report(detections, summary)
    }

    /// One timer second: countdown step, activation, or active-timer step,
    /// followed by the termination check.
    pub fn advance_second(&mut self) -> StepReport {
        match self.clock.advance_second() {
            Some(ClockTransition::CountdownTick { remaining }) => {
                self.events.push(RuntimeEvent::CountdownTick { remaining });
            }
            Some(ClockTransition::Started { .. }) => {
                self.pending_intent = None;
                self.on_started();
            }
            Some(ClockTransition::Second { .. }) | None => {}
        }
        let summary = self.check_game_over();
        self.report(Vec::new(), summary)
    }

    pub fn activate_radar(&mut self, now_ms: u64) -> Result<RadarResult, RadarError> {
        let Some(idx) = self.controlled_idx else {
            return Err(RadarError::Unavailable);
        };
        if self.actors[idx].view.role != Role::Hider {
            return Err(RadarError::Unavailable);
        }
        if !self.clock.is_active() {
            return Err(RadarError::NotActive);
        }

        let from = self.actors[idx].view.position();
        let seeker = self
            .actors
            .get(self.seeker_idx)
            .map(|actor| actor.view.position());
        let result = self.radar.activate(now_ms, from, seeker)?;
        log::debug!("radar ping by {} at {}ms: {:?}", self.actors[idx].view.id, now_ms, result);
        self.events.push(RuntimeEvent::RadarPinged {
            actor_id: self.actors[idx].view.id.clone(),
        });
        Ok(result)
    }

    /// Drains the events raised since the last drain.
    pub fn take_events(&mut self) -> Vec<RuntimeEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn build_snapshot(&mut self, viewpoint: Viewpoint, include_events: bool) -> Snapshot {
        let viewer = match viewpoint {
            Viewpoint::Omniscient => None,
            Viewpoint::Controlled => self.controlled_idx.map(|idx| &self.actors[idx].view),
        };
        let actors = self
            .actors
            .iter()
            .map(|actor| &actor.view)
            .filter(|actor| is_rendered_for(viewer, actor))
            .cloned()
            .collect();
        let hiders_total = self.hiders_total();
        Snapshot {
            tick: self.tick_counter,
            phase: self.clock.phase(),
            countdown_remaining: self.clock.countdown_remaining(),
            time_remaining: self.clock.time_remaining(),
            hiders_total,
            hiders_remaining: hiders_total - self.hiders_found(),
            actors,
            events: if include_events {
                self.take_events()
            } else {
                Vec::new()
            },
            timeline: self.recent_timeline(),
        }
    }

    fn on_started(&mut self) {
        let time_remaining = self.clock.time_remaining();
        self.events
            .push(RuntimeEvent::MatchStarted { time_remaining });
        self.push_timeline("Match started".to_string());
        log::info!("match active: seed={} time={}s", self.seed, time_remaining);
    }

    fn move_actor(&mut self, idx: usize, intent: Intent) -> bool {
        let from = self.actors[idx].view.position();
        let to = try_move(&self.terrain, from, intent);
        if to == from {
            return false;
        }
        self.actors[idx].view.x = to.x;
        self.actors[idx].view.y = to.y;
        true
    }

    fn update_autonomous_actors(&mut self) {
        // Decisions read the board as it stands after the controlled move;
        // moves are then applied in roster order.
        let views: Vec<ActorView> = self.actors.iter().map(|actor| actor.view.clone()).collect();
        let mut intents = Vec::with_capacity(views.len());
        for (idx, view) in views.iter().enumerate() {
            if view.controlled || view.found {
                continue;
            }
            let intent = behave(
                view,
                &views,
                self.config.hider_wander_probability,
                &mut self.rng,
            );
            if !intent.is_none() {
                intents.push((idx, intent));
            }
        }
        for (idx, intent) in intents {
            self.move_actor(idx, intent);
        }
    }

    fn update_visibility(&mut self) -> Vec<Detection> {
        let seeker = self.actors[self.seeker_idx].view.position();
        let mut detections = Vec::new();
        for idx in 0..self.actors.len() {
            let view = &self.actors[idx].view;
            if !view.is_hider() || view.found {
                continue;
            }
            let Some(distance) = spot(
                &self.terrain,
                seeker,
                view.position(),
                self.config.base_view_range,
            ) else {
                continue;
            };

            self.actors[idx].view.found = true;
            self.actors[idx].found_at_tick = Some(self.tick_counter);
            let view = &self.actors[idx].view;
            log::debug!(
                "hider found: {} at ({}, {}) distance {:.2}",
                view.id,
                view.x,
                view.y,
                distance
            );
            detections.push(Detection {
                actor_id: view.id.clone(),
                name: view.name.clone(),
                x: view.x,
                y: view.y,
                distance,
            });
        }

        for detection in &detections {
            self.events.push(RuntimeEvent::HiderFound {
                actor_id: detection.actor_id.clone(),
                name: detection.name.clone(),
            });
            self.push_timeline(format!("Found {}", detection.name));
        }
        detections
    }

    fn check_game_over(&mut self) -> Option<MatchSummary> {
        let reason = self
            .clock
            .should_end(self.hiders_total(), self.hiders_found())?;
        if !self.clock.finish(reason) {
            return None;
        }

        let perspective = self
            .controlled_actor()
            .map(|actor| actor.role)
            .unwrap_or(Role::Seeker);
        let hiders_total = self.hiders_total();
        let hiders_found = self.hiders_found();
        let hiders_remaining = hiders_total - hiders_found;
        let time_remaining = self.clock.time_remaining();
        let score = derive_score(
            perspective,
            hiders_found,
            hiders_remaining,
            time_remaining,
            self.clock.game_duration_seconds(),
        );

        self.push_timeline(
            match reason {
                GameOverReason::AllFound => "All hiders found",
                GameOverReason::Timeout => "Time is up",
            }
            .to_string(),
        );
        self.events.push(RuntimeEvent::MatchEnded {
            reason,
            score,
            perspective,
        });
        log::info!(
            "match ended: seed={} reason={:?} score={} found={}/{} time_left={}s",
            self.seed,
            reason,
            score,
            hiders_found,
            hiders_total,
            time_remaining
        );

        let summary = MatchSummary {
            reason,
            score,
            perspective,
            hiders_total,
            hiders_found,
            hiders_remaining,
            time_remaining,
            elapsed_seconds: self.clock.elapsed_active_seconds(),
            ticks: self.tick_counter,
            timeline: self.timeline.clone(),
        };
        self.summary = Some(summary.clone());
        Some(summary)
    }

    fn report(&self, detections: Vec<Detection>, summary: Option<MatchSummary>) -> StepReport {
        StepReport {
            state: self.state(),
            detections,
            summary,
        }
    }

    fn push_timeline(&mut self, label: String) {
        self.timeline.push(TimelineEvent {
            tick: self.tick_counter,
            label,
        });
    }

    fn recent_timeline(&self) -> Vec<TimelineEvent> {
        let skip = self.timeline.len().saturating_sub(TIMELINE_LIMIT);
        self.timeline.iter().skip(skip).cloned().collect()
    }
}

/// Checks the roster shape and returns `(seeker index, controlled index)`.
fn validate_roster(
    roster: &[ParticipantDescriptor],
) -> Result<(usize, Option<usize>), EngineError> {
    if roster.is_empty() {
        return Err(EngineError::InvalidRoster("roster is empty".to_string()));
    }

    let mut ids = HashSet::new();
    for participant in roster {
        if !ids.insert(participant.id.as_str()) {
            return Err(EngineError::InvalidRoster(format!(
                "duplicate participant id '{}'",
                participant.id
            )));
        }
    }

    let seekers: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, participant)| participant.role == Role::Seeker)
        .map(|(idx, _)| idx)
        .collect();
    let seeker_idx = match seekers.as_slice() {
        [] => {
            return Err(EngineError::InvalidRoster(
                "roster has no seeker".to_string(),
            ))
        }
        [idx] => *idx,
        _ => {
            return Err(EngineError::InvalidRoster(format!(
                "roster has {} seekers, expected exactly one",
                seekers.len()
            )))
        }
    };

    let controlled: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, participant)| participant.controlled)
        .map(|(idx, _)| idx)
        .collect();
    if controlled.len() > 1 {
        return Err(EngineError::InvalidRoster(format!(
            "roster has {} controlled actors, expected at most one",
            controlled.len()
        )));
    }

    Ok((seeker_idx, controlled.first().copied()))
}
