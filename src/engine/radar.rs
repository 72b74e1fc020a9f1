use crate::error::RadarError;
use crate::types::{RadarResult, Vec2};

use super::utils::euclidean;

/// Cooldown-gated seeker locator for hiders. Each activation is a snapshot of
/// current positions; nothing is tracked between pings.
#[derive(Clone, Debug)]
pub struct RadarAid {
    range: f64,
    cooldown_ms: u64,
    last_activation_ms: Option<u64>,
}

impl RadarAid {
    pub fn new(range: f64, cooldown_ms: u64) -> Self {
        Self {
            range,
            cooldown_ms,
            last_activation_ms: None,
        }
    }

    pub fn last_activation_ms(&self) -> Option<u64> {
        self.last_activation_ms
    }

    pub fn ready_in_ms(&self, now_ms: u64) -> u64 {
        match self.last_activation_ms {
            Some(last) => self
                .cooldown_ms
                .saturating_sub(now_ms.saturating_sub(last)),
            None => 0,
        }
    }

    /// Recharge progress in `[0, 1]`, for the radar gauge.
    pub fn charge(&self, now_ms: u64) -> f64 {
        if self.cooldown_ms == 0 {
            return 1.0;
        }
        let remaining = self.ready_in_ms(now_ms) as f64;
        (1.0 - remaining / self.cooldown_ms as f64).clamp(0.0, 1.0)
    }

    pub fn activate(
        &mut self,
        now_ms: u64,
        from: Vec2,
        seeker: Option<Vec2>,
    ) -> Result<RadarResult, RadarError> {
        let remaining_ms = self.ready_in_ms(now_ms);
        if remaining_ms > 0 {
            return Err(RadarError::OnCooldown { remaining_ms });
        }
        self.last_activation_ms = Some(now_ms);
        Ok(match seeker {
            Some(seeker) => bearing(from, seeker, self.range),
            None => RadarResult::NoSignal,
        })
    }
}

/// Direction (radians, 0 along +x) and distance to `to`, or no signal when it
/// lies beyond `range`.
pub fn bearing(from: Vec2, to: Vec2, range: f64) -> RadarResult {
    let distance = euclidean(from, to);
    if distance > range {
        return RadarResult::NoSignal;
    }
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    RadarResult::Bearing {
        angle: dy.atan2(dx),
        distance,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn second_activation_inside_cooldown_is_rejected_without_state_change() {
        let mut radar = RadarAid::new(10.0, 5_000);
        let here = Vec2::new(0, 0);
        let seeker = Some(Vec2::new(3, 0));

        assert!(radar.activate(1_000, here, seeker).is_ok());
        assert_eq!(radar.last_activation_ms(), Some(1_000));

        assert_eq!(
            radar.activate(3_500, here, seeker),
            Err(RadarError::OnCooldown {
                remaining_ms: 2_500
            })
        );
        assert_eq!(radar.last_activation_ms(), Some(1_000));

        assert!(radar.activate(6_000, here, seeker).is_ok());
        assert_eq!(radar.last_activation_ms(), Some(6_000));
    }

    #[test]
    fn bearing_uses_mathematical_angle_convention() {
        match bearing(Vec2::new(2, 2), Vec2::new(5, 2), 10.0) {
            RadarResult::Bearing { angle, distance } => {
                assert_eq!(angle, 0.0);
                assert_eq!(distance, 3.0);
            }
            other => panic!("expected bearing, got {other:?}"),
        }
        match bearing(Vec2::new(2, 2), Vec2::new(2, 6), 10.0) {
            RadarResult::Bearing { angle, .. } => assert!((angle - FRAC_PI_2).abs() < 1e-12),
            other => panic!("expected bearing, got {other:?}"),
        }
    }

    #[test]
    fn range_edge_is_inclusive_and_beyond_is_silent() {
        assert!(matches!(
            bearing(Vec2::new(0, 0), Vec2::new(3, 4), 5.0),
            RadarResult::Bearing { .. }
        ));
        assert_eq!(
            bearing(Vec2::new(0, 0), Vec2::new(3, 5), 5.0),
            RadarResult::NoSignal
        );
    }

    #[test]
    fn missing_seeker_gives_no_signal_but_still_starts_cooldown() {
        let mut radar = RadarAid::new(10.0, 1_000);
        assert_eq!(
            radar.activate(50, Vec2::new(0, 0), None),
            Ok(RadarResult::NoSignal)
        );
        assert_eq!(radar.ready_in_ms(550), 500);
        assert!((radar.charge(550) - 0.5).abs() < 1e-12);
        assert_eq!(radar.charge(2_000), 1.0);
    }
}
