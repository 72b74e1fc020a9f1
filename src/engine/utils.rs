use crate::types::{Intent, Vec2};

pub(super) fn euclidean(a: Vec2, b: Vec2) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Single greedy step from `from` toward `to` on both axes at once.
pub(super) fn step_toward(from: Vec2, to: Vec2) -> Intent {
    Intent::new(to.x - from.x, to.y - from.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_matches_pythagoras() {
        assert_eq!(euclidean(Vec2::new(0, 0), Vec2::new(3, 4)), 5.0);
        assert_eq!(euclidean(Vec2::new(2, 2), Vec2::new(2, 2)), 0.0);
    }

    #[test]
    fn step_toward_uses_axis_signs() {
        assert_eq!(
            step_toward(Vec2::new(5, 5), Vec2::new(9, 1)),
            Intent { dx: 1, dy: -1 }
        );
        assert_eq!(
            step_toward(Vec2::new(5, 5), Vec2::new(5, 8)),
            Intent { dx: 0, dy: 1 }
        );
        assert_eq!(step_toward(Vec2::new(5, 5), Vec2::new(5, 5)), Intent::NONE);
    }
}
