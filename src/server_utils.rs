use crate::constants::{pick_actor_color, DEFAULT_BOT_COUNT, MAX_NAME_LEN, MAX_PLAYERS_PER_MATCH};
use crate::types::{ParticipantDescriptor, Role};

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "Player".to_string();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

pub fn normalize_bot_count(value: Option<i64>) -> usize {
    match value {
        None => DEFAULT_BOT_COUNT,
        Some(count) => count.clamp(0, MAX_PLAYERS_PER_MATCH as i64 - 1) as usize,
    }
}

/// Builds a single-player roster: the controlled actor first, then bots.
/// A hider player gets one bot seeker and the remaining bots hide; a seeker
/// player is hunting bots only. A seeker with zero bots still gets one hider.
pub fn build_roster(player_name: &str, role: Role, bots: usize) -> Vec<ParticipantDescriptor> {
    let bots = bots.min(MAX_PLAYERS_PER_MATCH - 1);
    let mut roster = vec![ParticipantDescriptor {
        id: "player".to_string(),
        name: sanitize_name(player_name),
        role,
        controlled: true,
        color: pick_actor_color(0).to_string(),
        spawn: None,
    }];

    let (seeker_bots, hider_bots) = match role {
        Role::Hider => (1, bots.saturating_sub(1)),
        Role::Seeker => (0, bots.max(1)),
    };
    for index in 0..seeker_bots {
        roster.push(bot(index, Role::Seeker, roster.len()));
    }
    for index in 0..hider_bots {
        roster.push(bot(index, Role::Hider, roster.len()));
    }
    roster
}

fn bot(index: usize, role: Role, slot: usize) -> ParticipantDescriptor {
    let (prefix, label) = match role {
        Role::Hider => ("hider", "Hider"),
        Role::Seeker => ("seeker", "Seeker"),
    };
    ParticipantDescriptor {
        id: format!("{prefix}_{}", index + 1),
        name: format!("{label}Bot{}", index + 1),
        role,
        controlled: false,
        color: pick_actor_color(slot).to_string(),
        spawn: None,
    }
}
