use crate::constants::{SCORE_PER_HIDER, SCORE_PER_SECOND};
use crate::types::{GameOverReason, Phase, Role};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockPhase {
    Countdown {
        remaining: u32,
    },
    Active {
        time_remaining: u32,
    },
    Ended {
        time_remaining: u32,
        reason: GameOverReason,
    },
}

/// What a one-second advance did to the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTransition {
    CountdownTick { remaining: u32 },
    Started { time_remaining: u32 },
    Second { time_remaining: u32 },
}

/// Countdown, then the active timer, then a terminal state. Phases only move
/// forward and `Ended` absorbs everything.
#[derive(Clone, Debug)]
pub struct MatchClock {
    phase: ClockPhase,
    game_duration_seconds: u32,
}

impl MatchClock {
    pub fn new(countdown_seconds: u32, game_duration_seconds: u32) -> Self {
        let phase = if countdown_seconds == 0 {
            ClockPhase::Active {
                time_remaining: game_duration_seconds,
            }
        } else {
            ClockPhase::Countdown {
                remaining: countdown_seconds,
            }
        };
        Self {
            phase,
            game_duration_seconds,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.phase {
            ClockPhase::Countdown { .. } => Phase::Countdown,
            ClockPhase::Active { .. } => Phase::Active,
            ClockPhase::Ended { .. } => Phase::Ended,
        }
    }

    pub fn game_duration_seconds(&self) -> u32 {
        self.game_duration_seconds
    }

    pub fn countdown_remaining(&self) -> u32 {
        match self.phase {
            ClockPhase::Countdown { remaining } => remaining,
            _ => 0,
        }
    }

    pub fn time_remaining(&self) -> u32 {
        match self.phase {
            ClockPhase::Countdown { .. } => self.game_duration_seconds,
            ClockPhase::Active { time_remaining } | ClockPhase::Ended { time_remaining, .. } => {
                time_remaining
            }
        }
    }

    pub fn elapsed_active_seconds(&self) -> u32 {
        match self.phase {
            ClockPhase::Countdown { .. } => 0,
            _ => self
                .game_duration_seconds
                .saturating_sub(self.time_remaining()),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, ClockPhase::Active { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, ClockPhase::Ended { .. })
    }

    pub fn advance_second(&mut self) -> Option<ClockTransition> {
        match self.phase {
            ClockPhase::Countdown { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.phase = ClockPhase::Active {
                        time_remaining: self.game_duration_seconds,
                    };
                    Some(ClockTransition::Started {
                        time_remaining: self.game_duration_seconds,
                    })
                } else {
                    self.phase = ClockPhase::Countdown { remaining };
                    Some(ClockTransition::CountdownTick { remaining })
                }
            }
            ClockPhase::Active { time_remaining } => {
                let time_remaining = time_remaining.saturating_sub(1);
                self.phase = ClockPhase::Active { time_remaining };
                Some(ClockTransition::Second { time_remaining })
            }
            ClockPhase::Ended { .. } => None,
        }
    }

    /// Termination rule, only meaningful while active. Catching every hider
    /// wins over the timer when both hold at once.
    pub fn should_end(&self, hiders_total: usize, hiders_found: usize) -> Option<GameOverReason> {
        let ClockPhase::Active { time_remaining } = self.phase else {
            return None;
        };
        if hiders_total > 0 && hiders_found >= hiders_total {
            return Some(GameOverReason::AllFound);
        }
        if time_remaining == 0 {
            return Some(GameOverReason::Timeout);
        }
        None
    }

    /// Moves an active clock to `Ended`. Returns false if it was not active.
    pub fn finish(&mut self, reason: GameOverReason) -> bool {
        let ClockPhase::Active { time_remaining } = self.phase else {
            return false;
        };
        self.phase = ClockPhase::Ended {
            time_remaining,
            reason,
        };
        true
    }
}

pub fn derive_score(
    perspective: Role,
    hiders_found: usize,
    hiders_remaining: usize,
    time_remaining: u32,
    game_duration_seconds: u32,
) -> i64 {
    match perspective {
        Role::Hider => {
            hiders_remaining as i64 * SCORE_PER_HIDER + time_remaining as i64 * SCORE_PER_SECOND
        }
        Role::Seeker => {
            let elapsed = game_duration_seconds.saturating_sub(time_remaining) as i64;
            hiders_found as i64 * SCORE_PER_HIDER + elapsed * SCORE_PER_SECOND
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_reaches_active_exactly_once() {
        let mut clock = MatchClock::new(3, 10);
        assert_eq!(clock.phase(), Phase::Countdown);
        assert_eq!(
            clock.advance_second(),
            Some(ClockTransition::CountdownTick { remaining: 2 })
        );
        assert_eq!(
            clock.advance_second(),
            Some(ClockTransition::CountdownTick { remaining: 1 })
        );
        assert_eq!(
            clock.advance_second(),
            Some(ClockTransition::Started { time_remaining: 10 })
        );
        assert_eq!(clock.phase(), Phase::Active);

        let mut started = 0;
        for _ in 0..20 {
            if let Some(ClockTransition::Started { .. }) = clock.advance_second() {
                started += 1;
            }
            assert_ne!(clock.phase(), Phase::Countdown);
        }
        assert_eq!(started, 0);
    }

    #[test]
    fn zero_countdown_starts_active() {
        let clock = MatchClock::new(0, 30);
        assert!(clock.is_active());
        assert_eq!(clock.time_remaining(), 30);
        assert_eq!(clock.countdown_remaining(), 0);
    }

    #[test]
    fn active_timer_is_non_increasing_and_ends_once() {
        let mut clock = MatchClock::new(0, 3);
        let mut last = clock.time_remaining();
        while clock.should_end(2, 0).is_none() {
            clock.advance_second();
            assert!(clock.time_remaining() <= last);
            last = clock.time_remaining();
        }
        assert_eq!(clock.should_end(2, 0), Some(GameOverReason::Timeout));
        assert!(clock.finish(GameOverReason::Timeout));
        assert!(!clock.finish(GameOverReason::Timeout));
        assert_eq!(clock.advance_second(), None);
        assert_eq!(clock.phase(), Phase::Ended);
        assert_eq!(clock.should_end(2, 0), None);
        assert_eq!(clock.elapsed_active_seconds(), 3);
    }

    #[test]
    fn all_found_ends_before_timeout_and_needs_hiders() {
        let clock = MatchClock::new(0, 60);
        assert_eq!(clock.should_end(3, 3), Some(GameOverReason::AllFound));
        assert_eq!(clock.should_end(3, 2), None);
        assert_eq!(clock.should_end(0, 0), None);

        let countdown = MatchClock::new(2, 60);
        assert_eq!(countdown.should_end(1, 1), None);
    }

    #[test]
    fn score_formulas_are_exact() {
        assert_eq!(derive_score(Role::Hider, 1, 2, 45, 300), 650);
        assert_eq!(derive_score(Role::Seeker, 3, 0, 45, 300), 3 * 100 + 255 * 10);
        assert_eq!(derive_score(Role::Hider, 1, 0, 0, 10), 0);
        assert_eq!(derive_score(Role::Seeker, 0, 2, 300, 300), 0);
    }
}
