use serde_json::Value;

use crate::types::{MatchConfig, Role};

#[derive(Debug)]
pub enum ParsedClientMessage {
    Start {
        name: String,
        role: Role,
        bots: Option<i64>,
        config: Option<MatchConfig>,
        seed: Option<u32>,
    },
    Input {
        dx: i32,
        dy: i32,
    },
    Radar,
    Ping {
        t: f64,
    },
}

pub fn parse_client_message(raw: &str) -> Option<ParsedClientMessage> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let object = value.as_object()?;
    let message_type = object.get("type")?.as_str()?;

    match message_type {
        "start" => {
            let name = match object.get("name") {
                None => String::new(),
                Some(value) => value.as_str()?.to_string(),
            };
            let role = match object.get("role") {
                None => Role::Hider,
                Some(value) => Role::parse(value.as_str()?)?,
            };
            let bots = parse_optional_i64(object.get("bots"))?;
            let config = match object.get("config") {
                None | Some(Value::Null) => None,
                Some(value) => Some(serde_json::from_value::<MatchConfig>(value.clone()).ok()?),
            };
            let seed = match parse_optional_i64(object.get("seed"))? {
                None => None,
                Some(seed) => Some(u32::try_from(seed).ok()?),
            };
            Some(ParsedClientMessage::Start {
                name,
                role,
                bots,
                config,
                seed,
            })
        }
        "input" => {
            let dx = parse_axis(object.get("dx"))?;
            let dy = parse_axis(object.get("dy"))?;
            Some(ParsedClientMessage::Input { dx, dy })
        }
        "radar" => Some(ParsedClientMessage::Radar),
        "ping" => {
            let t = object.get("t")?.as_f64()?;
            if !t.is_finite() {
                return None;
            }
            Some(ParsedClientMessage::Ping { t })
        }
        _ => None,
    }
}

/// Missing axes mean "not pressed"; anything else collapses to its sign.
fn parse_axis(value: Option<&Value>) -> Option<i32> {
    Some(parse_optional_i64(value)?.unwrap_or(0).signum() as i32)
}

fn parse_optional_i64(value: Option<&Value>) -> Option<Option<i64>> {
    const MAX_SAFE_INTEGER_F64: f64 = 9_007_199_254_740_991.0;

    let Some(value) = value else {
        return Some(None);
    };
    if let Some(number) = value.as_i64() {
        return Some(Some(number));
    }
    if let Some(number) = value.as_u64() {
        return i64::try_from(number).ok().map(Some);
    }
    if let Some(number) = value.as_f64() {
        if number.is_finite() {
            let truncated = number.trunc();
            if truncated.abs() > MAX_SAFE_INTEGER_F64 {
                return None;
            }
            return Some(Some(truncated as i64));
        }
    }
    None
}
