use crate::constants::effective_view_range;
use crate::terrain::TerrainMap;
use crate::types::{ActorView, Role, Vec2};

use super::utils::euclidean;

/// Whose eyes a snapshot is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Viewpoint {
    /// Everything, e.g. for the simulation harness.
    Omniscient,
    /// The controlled actor, falling back to omniscient when there is none.
    Controlled,
}

pub fn is_within_view(distance: f64, in_cover: bool, base_view_range: f64) -> bool {
    distance < effective_view_range(base_view_range, in_cover)
}

/// Returns the seeker-to-hider distance when the seeker spots the hider.
pub fn spot(
    terrain: &TerrainMap,
    seeker: Vec2,
    hider: Vec2,
    base_view_range: f64,
) -> Option<f64> {
    let distance = euclidean(seeker, hider);
    let in_cover = terrain.provides_cover(hider.x, hider.y).unwrap_or(false);
    is_within_view(distance, in_cover, base_view_range).then_some(distance)
}

/// Presentation rule only; it never feeds back into detection. A hider does
/// not see other hiders still in hiding, and a seeker does not see hiders it
/// has not found yet.
pub fn is_rendered_for(viewer: Option<&ActorView>, actor: &ActorView) -> bool {
    let Some(viewer) = viewer else {
        return true;
    };
    if viewer.id == actor.id || actor.role == Role::Seeker || actor.found {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileKind;

    fn view(id: &str, role: Role, found: bool) -> ActorView {
        ActorView {
            id: id.to_string(),
            name: id.to_string(),
            role,
            x: 0,
            y: 0,
            controlled: false,
            found,
            color: "#F87171".to_string(),
        }
    }

    #[test]
    fn cover_halves_detection_range() {
        assert!(!is_within_view(2.4, true, 5.0));
        assert!(is_within_view(2.4, false, 5.0));
        assert!(!is_within_view(5.0, false, 5.0));
        assert!(!is_within_view(2.5, true, 5.0));
    }

    #[test]
    fn spot_reads_cover_from_the_hider_tile() {
        let map = TerrainMap::filled(6, 6, TileKind::Floor)
            .and_then(|map| map.with_tile(2, 2, TileKind::Tree))
            .and_then(|map| map.with_tile(1, 2, TileKind::Tree))
            .expect("map");
        let seeker = Vec2::new(0, 0);

        // sqrt(8) ~ 2.83: outside the halved range on a tree.
        assert_eq!(spot(&map, seeker, Vec2::new(2, 2), 5.0), None);
        // sqrt(5) ~ 2.24: still inside the halved range.
        assert!(spot(&map, seeker, Vec2::new(1, 2), 5.0).is_some());
        // Same distance as the first case, but on open floor.
        assert!(spot(&map, Vec2::new(5, 5), Vec2::new(3, 3), 5.0).is_some());
        assert!(spot(&map, seeker, Vec2::new(3, 3), 0.0).is_none());
    }

    #[test]
    fn rendering_rules_hide_unfound_hiders() {
        let me_hider = view("me", Role::Hider, false);
        let me_seeker = view("me", Role::Seeker, false);
        let other_hidden = view("other", Role::Hider, false);
        let other_found = view("found", Role::Hider, true);
        let seeker = view("seeker", Role::Seeker, false);

        assert!(is_rendered_for(Some(&me_hider), &me_hider));
        assert!(!is_rendered_for(Some(&me_hider), &other_hidden));
        assert!(is_rendered_for(Some(&me_hider), &other_found));
        assert!(is_rendered_for(Some(&me_hider), &seeker));

        assert!(!is_rendered_for(Some(&me_seeker), &other_hidden));
        assert!(is_rendered_for(Some(&me_seeker), &other_found));

        assert!(is_rendered_for(None, &other_hidden));
    }
}
