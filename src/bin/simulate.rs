use clap::Parser;
use hide_seek_rust_server::constants::pick_actor_color;
use hide_seek_rust_server::engine::{MatchEngine, Viewpoint};
use hide_seek_rust_server::error::EngineError;
use hide_seek_rust_server::server_utils::build_roster;
use hide_seek_rust_server::terrain::TerrainMap;
use hide_seek_rust_server::types::{
    GameOverReason, MatchConfig, ParticipantDescriptor, Role, RuntimeEvent, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    hiders: Option<i32>,
    #[arg(long)]
    minutes: Option<i32>,
    /// Overrides --minutes.
    #[arg(long)]
    seconds: Option<i32>,
    #[arg(long)]
    seed: Option<u64>,
    /// Repeats every scenario with consecutive seeds.
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// ASCII map file; the built-in town is used otherwise.
    #[arg(long)]
    map: Option<PathBuf>,
    /// Adds an idle controlled actor with this role ("hider" or "seeker").
    #[arg(long)]
    controlled: Option<String>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    hiders: usize,
    #[serde(rename = "durationSeconds")]
    duration_seconds: u32,
    controlled: Option<Role>,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    hiders: usize,
    #[serde(rename = "durationSeconds")]
    duration_seconds: u32,
    reason: Option<GameOverReason>,
    score: i64,
    perspective: Role,
    #[serde(rename = "hidersFound")]
    hiders_found: usize,
    #[serde(rename = "timeRemaining")]
    time_remaining: u32,
    #[serde(rename = "elapsedSeconds")]
    elapsed_seconds: u32,
    ticks: u64,
    #[serde(rename = "firstFoundTick")]
    first_found_tick: Option<u64>,
    #[serde(rename = "lastFoundTick")]
    last_found_tick: Option<u64>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageElapsedSeconds")]
    average_elapsed_seconds: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Found hiders freeze in place; positions are tracked to verify that.
type FrozenPositions = HashMap<String, (i32, i32)>;

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));

    let terrain = match load_terrain(cli.map.as_deref()) {
        Ok(terrain) => Arc::new(terrain),
        Err(error) => {
            emit_log(
                "error",
                "map_load_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": cli.map.as_ref().map(|path| path.to_string_lossy().to_string()),
                    "error": error,
                }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_elapsed_seconds = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "hiders": scenario.hiders,
                "durationSeconds": scenario.duration_seconds,
                "controlled": scenario.controlled,
            }),
        );
        let scenario_run = match run_scenario(&scenario, terrain.clone()) {
            Ok(run) => run,
            Err(error) => {
                emit_log(
                    "error",
                    "scenario_rejected",
                    &match_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_elapsed_seconds += u64::from(scenario_run.result.elapsed_seconds);
        *reason_counts
            .entry(game_over_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "score": scenario_run.result.score,
                "hidersFound": scenario_run.result.hiders_found,
                "elapsedSeconds": scenario_run.result.elapsed_seconds,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => emit_log(
                "error",
                "result_serialize_failed",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                None,
                json!({ "error": error.to_string() }),
            ),
        }
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
        total_elapsed_seconds,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageElapsedSeconds": summary.average_elapsed_seconds,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_terrain(path: Option<&Path>) -> Result<TerrainMap, String> {
    let Some(path) = path else {
        return TerrainMap::default_town().map_err(|error| error.to_string());
    };
    let layout = std::fs::read_to_string(path).map_err(|error| error.to_string())?;
    TerrainMap::parse(&layout).map_err(|error| error.to_string())
}

fn scenario_roster(scenario: &Scenario) -> Vec<ParticipantDescriptor> {
    if let Some(role) = scenario.controlled {
        return build_roster("Sim", role, scenario.hiders);
    }

    let mut roster = vec![ParticipantDescriptor {
        id: "seeker".to_string(),
        name: "Seeker".to_string(),
        role: Role::Seeker,
        controlled: false,
        color: pick_actor_color(0).to_string(),
        spawn: None,
    }];
    for idx in 0..scenario.hiders {
        roster.push(ParticipantDescriptor {
            id: format!("hider_{}", idx + 1),
            name: format!("Hider-{:02}", idx + 1),
            role: Role::Hider,
            controlled: false,
            color: pick_actor_color(idx + 1).to_string(),
            spawn: None,
        });
    }
    roster
}

fn run_scenario(
    scenario: &Scenario,
    terrain: Arc<TerrainMap>,
) -> Result<ScenarioRunResult, EngineError> {
    let config = MatchConfig {
        game_duration_seconds: scenario.duration_seconds,
        ..MatchConfig::default()
    };
    let ticks_per_second = config.ticks_per_second();
    let max_seconds = u64::from(config.countdown_seconds + config.game_duration_seconds) + 1;
    let mut engine = MatchEngine::start(
        scenario_roster(scenario),
        terrain.clone(),
        config,
        scenario.seed,
    )?;

    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut frozen: FrozenPositions = HashMap::new();
    let mut first_found_tick = None;
    let mut last_found_tick = None;
    let mut previous: Option<Snapshot> = None;
    let mut seconds = 0u64;

    'outer: while !engine.is_ended() {
        for _ in 0..ticks_per_second {
            engine.tick();
            let snapshot = engine.build_snapshot(Viewpoint::Omniscient, true);
            for event in &snapshot.events {
                if let RuntimeEvent::HiderFound { .. } = event {
                    first_found_tick.get_or_insert(snapshot.tick);
                    last_found_tick = Some(snapshot.tick);
                }
            }
            for message in
                collect_snapshot_anomalies(&terrain, &snapshot, previous.as_ref(), &mut frozen)
            {
                push_anomaly(
                    &mut anomalies,
                    &mut anomaly_records,
                    &mut anomaly_seen,
                    snapshot.tick,
                    message,
                );
            }
            previous = Some(snapshot);
            if engine.is_ended() {
                break 'outer;
            }
        }
        engine.advance_second();
        seconds += 1;
        if seconds > max_seconds {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                engine.state().tick,
                "second safety limit exceeded".to_string(),
            );
            break;
        }
    }

    let state = engine.state();
    let summary = engine.summary().cloned();
    if summary.is_none() {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            state.tick,
            "match finished without a summary".to_string(),
        );
    }

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            hiders: scenario.hiders,
            duration_seconds: scenario.duration_seconds,
            reason: summary.as_ref().map(|summary| summary.reason),
            score: summary.as_ref().map_or(0, |summary| summary.score),
            perspective: summary
                .as_ref()
                .map_or(Role::Seeker, |summary| summary.perspective),
            hiders_found: engine.hiders_found(),
            time_remaining: state.time_remaining,
            elapsed_seconds: summary.as_ref().map_or(0, |summary| summary.elapsed_seconds),
            ticks: state.tick,
            first_found_tick,
            last_found_tick,
            anomalies,
        },
        anomaly_records,
        finished_tick: state.tick,
    })
}

fn collect_snapshot_anomalies(
    terrain: &TerrainMap,
    snapshot: &Snapshot,
    previous: Option<&Snapshot>,
    frozen: &mut FrozenPositions,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.hiders_remaining > snapshot.hiders_total {
        anomalies.push(format!(
            "hiders remaining exceeds total: {}/{}",
            snapshot.hiders_remaining, snapshot.hiders_total
        ));
    }

    for actor in &snapshot.actors {
        if terrain.is_passable(actor.x, actor.y) != Ok(true) {
            anomalies.push(format!(
                "actor on impassable cell: {} ({}, {})",
                actor.id, actor.x, actor.y
            ));
        }
        if !actor.found {
            if frozen.contains_key(&actor.id) {
                anomalies.push(format!("found hider became hidden again: {}", actor.id));
            }
            continue;
        }
        // A found controlled hider may keep walking around.
        if actor.controlled {
            continue;
        }
        let position = (actor.x, actor.y);
        if let Some(found_at) = frozen.insert(actor.id.clone(), position) {
            if found_at != position {
                anomalies.push(format!("found hider moved: {}", actor.id));
            }
        }
    }

    if let Some(previous) = previous {
        if snapshot.time_remaining > previous.time_remaining {
            anomalies.push(format!(
                "time remaining increased: {} -> {}",
                previous.time_remaining, snapshot.time_remaining
            ));
        }
        if snapshot.hiders_remaining > previous.hiders_remaining {
            anomalies.push(format!(
                "hiders remaining increased: {} -> {}",
                previous.hiders_remaining, snapshot.hiders_remaining
            ));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(now_ms));
    let controlled = cli.controlled.as_deref().and_then(Role::parse);
    let runs = cli.runs.max(1);

    let base = if cli.hiders.is_some() || cli.minutes.is_some() || cli.seconds.is_some() {
        let hiders = cli.hiders.unwrap_or(3).clamp(0, 9) as usize;
        let duration_seconds = match cli.seconds {
            Some(seconds) => seconds.clamp(1, 3_600) as u32,
            None => cli.minutes.unwrap_or(1).clamp(1, 10) as u32 * 60,
        };
        vec![Scenario {
            name: format!("custom-h{hiders}"),
            hiders,
            duration_seconds,
            controlled,
            seed,
        }]
    } else {
        vec![
            Scenario {
                name: "quick-check-h3".to_string(),
                hiders: 3,
                duration_seconds: 60,
                controlled,
                seed,
            },
            Scenario {
                name: "full-round-h6".to_string(),
                hiders: 6,
                duration_seconds: 300,
                controlled,
                seed: seed.wrapping_add(1),
            },
        ]
    };

    let mut scenarios = Vec::with_capacity(base.len() * runs as usize);
    for run in 0..runs {
        for scenario in &base {
            let mut scenario = scenario.clone();
            if runs > 1 {
                scenario.name = format!("{}-run{}", scenario.name, run + 1);
                scenario.seed = scenario.seed.wrapping_add(run * 1_000);
            }
            scenarios.push(scenario);
        }
    }
    scenarios
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_elapsed_seconds: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_elapsed_seconds = if scenario_count == 0 {
        0
    } else {
        total_elapsed_seconds / scenario_count as u64
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_elapsed_seconds,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    if let Ok(line) = serde_json::to_string(&log_line) {
        eprintln!("{line}");
    }
}

fn game_over_reason_key(reason: Option<GameOverReason>) -> String {
    match reason {
        Some(GameOverReason::Timeout) => "timeout",
        Some(GameOverReason::AllFound) => "all_found",
        None => "unfinished",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hide_seek_rust_server::terrain::TileKind;
    use hide_seek_rust_server::types::Vec2;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_scenario_result(
        reason: Option<GameOverReason>,
        elapsed_seconds: u32,
    ) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            hiders: 3,
            duration_seconds: 60,
            reason,
            score: 0,
            perspective: Role::Seeker,
            hiders_found: 0,
            time_remaining: 0,
            elapsed_seconds,
            ticks: 0,
            first_found_tick: None,
            last_found_tick: None,
            anomalies: Vec::new(),
        }
    }

    fn scenario(hiders: usize, duration_seconds: u32, controlled: Option<Role>) -> Scenario {
        Scenario {
            name: "test".to_string(),
            hiders,
            duration_seconds,
            controlled,
            seed: 7,
        }
    }

    fn town() -> Arc<TerrainMap> {
        Arc::new(TerrainMap::default_town().expect("default town"))
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_average_elapsed_time() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result(Some(GameOverReason::Timeout), 60),
                make_scenario_result(Some(GameOverReason::AllFound), 90),
            ],
            BTreeMap::from([
                ("timeout".to_string(), 1usize),
                ("all_found".to_string(), 1usize),
            ]),
            1,
            150,
        );
        assert_eq!(summary.average_elapsed_seconds, 75);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = std::env::temp_dir()
            .join(format!("hide-seek-missing-{now}"))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result(Some(GameOverReason::Timeout), 60)],
            BTreeMap::from([("timeout".to_string(), 1usize)]),
            0,
            60,
        );
        let result = write_summary(&target, &summary);
        assert!(result.is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn headless_scenario_finishes_cleanly() {
        let run = run_scenario(&scenario(4, 30, None), town()).expect("scenario runs");
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert!(run.result.reason.is_some());
        assert_eq!(run.result.perspective, Role::Seeker);
        assert!(run.result.elapsed_seconds <= 30);
        if run.result.reason == Some(GameOverReason::Timeout) {
            assert_eq!(run.result.time_remaining, 0);
        }
    }

    #[test]
    fn scenario_with_idle_controlled_hider_scores_as_hider() {
        let run =
            run_scenario(&scenario(2, 20, Some(Role::Hider)), town()).expect("scenario runs");
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert_eq!(run.result.perspective, Role::Hider);
    }

    #[test]
    fn same_seed_produces_identical_results() {
        let a = run_scenario(&scenario(5, 40, None), town()).expect("first run");
        let b = run_scenario(&scenario(5, 40, None), town()).expect("second run");
        assert_eq!(
            serde_json::to_string(&a.result).expect("serialize"),
            serde_json::to_string(&b.result).expect("serialize")
        );
    }

    #[test]
    fn runs_flag_repeats_scenarios_with_distinct_seeds() {
        let cli = Cli::parse_from([
            "simulate",
            "--hiders",
            "2",
            "--seconds",
            "30",
            "--runs",
            "3",
            "--seed",
            "10",
        ]);
        let scenarios = resolve_scenarios(&cli);
        assert_eq!(scenarios.len(), 3);
        let seeds: HashSet<u32> = scenarios.iter().map(|scenario| scenario.seed).collect();
        assert_eq!(seeds.len(), 3);
        assert!(scenarios.iter().all(|scenario| scenario.duration_seconds == 30));
    }

    #[test]
    fn frozen_hider_that_moves_is_reported() {
        let terrain = TerrainMap::filled(5, 5, TileKind::Floor)
            .expect("field");
        let roster = vec![
            ParticipantDescriptor {
                id: "s".to_string(),
                name: "S".to_string(),
                role: Role::Seeker,
                controlled: false,
                color: pick_actor_color(0).to_string(),
                spawn: Some(Vec2::new(0, 0)),
            },
            ParticipantDescriptor {
                id: "h".to_string(),
                name: "H".to_string(),
                role: Role::Hider,
                controlled: false,
                color: pick_actor_color(1).to_string(),
                spawn: Some(Vec2::new(1, 0)),
            },
        ];
        let config = MatchConfig {
            countdown_seconds: 0,
            hider_wander_probability: 0.0,
            ..MatchConfig::default()
        };
        let mut engine =
            MatchEngine::start(roster, Arc::new(terrain.clone()), config, 3).expect("match");
        engine.tick();
        let mut snapshot = engine.build_snapshot(Viewpoint::Omniscient, false);
        let mut frozen = FrozenPositions::new();
        assert!(collect_snapshot_anomalies(&terrain, &snapshot, None, &mut frozen).is_empty());

        let hider = snapshot
            .actors
            .iter_mut()
            .find(|actor| actor.id == "h")
            .expect("hider");
        assert!(hider.found);
        hider.x = 2;
        let anomalies = collect_snapshot_anomalies(&terrain, &snapshot, None, &mut frozen);
        assert_eq!(anomalies, vec!["found hider moved: h".to_string()]);
    }
}
