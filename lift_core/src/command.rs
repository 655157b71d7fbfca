//! Line-oriented command input.
//!
//! Accepts both the plain operator verbs and the JSON event-bus messages the
//! remote side publishes, and turns either into an `Event`.

use serde::Deserialize;
use thiserror::Error;

use crate::status::CommandOrigin;

pub const MOVE_TOPIC: &str = "/event/MoveElevator__e";
pub const MOTION_TOPIC: &str = "/event/MotionDetected__e";

/// Input to the runner loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    GoTo { floor: i64, origin: CommandOrigin },
    RiderApproaching,
    /// Raw (undebounced) sensor level change.
    SensorEdge { channel: u8, level: bool },
    Shutdown,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument for {0}")]
    MissingArgument(&'static str),
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("malformed event json: {0}")]
    Json(String),
    #[error("unknown event topic: {0}")]
    UnknownTopic(String),
}

#[derive(Debug, Deserialize)]
struct BusMessage {
    channel: String,
    #[serde(default)]
    data: Option<BusData>,
}

#[derive(Debug, Deserialize)]
struct BusData {
    #[serde(default)]
    payload: Option<BusPayload>,
}

#[derive(Debug, Deserialize)]
struct BusPayload {
    #[serde(rename = "Floor__c", default)]
    floor: Option<FloorField>,
}

/// The bus sends the floor either as a number or as a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FloorField {
    Num(i64),
    Text(String),
}

impl FloorField {
    fn value(&self) -> Result<i64, ParseError> {
        match self {
            FloorField::Num(n) => Ok(*n),
            FloorField::Text(s) => parse_int(s.trim()),
        }
    }
}

fn parse_int(s: &str) -> Result<i64, ParseError> {
    s.parse::<i64>()
        .map_err(|_| ParseError::InvalidNumber(s.to_string()))
}

/// Parse one input line.
///
/// ```
/// use lift_core::command::{parse_line, Event};
/// use lift_core::CommandOrigin;
///
/// assert_eq!(
///     parse_line("goto 3").unwrap(),
///     Event::GoTo { floor: 3, origin: CommandOrigin::Manual }
/// );
/// ```
pub fn parse_line(line: &str) -> Result<Event, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }
    if line.starts_with('{') {
        return parse_bus_message(line);
    }
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ParseError::Empty)?;
    match verb {
        "goto" | "moveTo" => {
            let arg = words.next().ok_or(ParseError::MissingArgument("goto"))?;
            Ok(Event::GoTo {
                floor: parse_int(arg)?,
                origin: CommandOrigin::Manual,
            })
        }
        "rider" | "riderThisWayCometh" => Ok(Event::RiderApproaching),
        "edge" => {
            let ch = words.next().ok_or(ParseError::MissingArgument("edge"))?;
            let level = words.next().ok_or(ParseError::MissingArgument("edge"))?;
            let channel =
                u8::try_from(parse_int(ch)?).map_err(|_| ParseError::InvalidNumber(ch.into()))?;
            let level = match level {
                "0" => false,
                "1" => true,
                other => return Err(ParseError::InvalidNumber(other.to_string())),
            };
            Ok(Event::SensorEdge { channel, level })
        }
        "quit" | "exit" => Ok(Event::Shutdown),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn parse_bus_message(line: &str) -> Result<Event, ParseError> {
    let msg: BusMessage =
        serde_json::from_str(line).map_err(|e| ParseError::Json(e.to_string()))?;
    match msg.channel.as_str() {
        MOVE_TOPIC => {
            let floor = msg
                .data
                .and_then(|d| d.payload)
                .and_then(|p| p.floor)
                .ok_or(ParseError::MissingArgument("Floor__c"))?;
            Ok(Event::GoTo {
                floor: floor.value()?,
                origin: CommandOrigin::External,
            })
        }
        MOTION_TOPIC => Ok(Event::RiderApproaching),
        other => Err(ParseError::UnknownTopic(other.to_string())),
    }
}
