//! Outbound notifications: always logged, optionally echoed as JSON lines.

use std::io::Write;

use lift_traits::{Notification, Notifier};
use serde_json::{json, Value};

pub fn notification_json(n: &Notification) -> Value {
    match *n {
        Notification::FloorIndicatorChanged { floor, on } => {
            json!({ "event": n.name(), "floor": floor, "on": on })
        }
        Notification::CurrentFloorChanged { floor } => json!({ "event": n.name(), "floor": floor }),
        Notification::RideComplete | Notification::MotionDetected => json!({ "event": n.name() }),
    }
}

/// Logs each notification; with `jsonl` set also writes it to stdout.
pub struct CliNotifier {
    jsonl: bool,
}

impl CliNotifier {
    pub fn new(jsonl: bool) -> Self {
        Self { jsonl }
    }
}

impl Notifier for CliNotifier {
    fn notify(
        &mut self,
        notification: Notification,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match notification {
            Notification::FloorIndicatorChanged { floor, on } => {
                tracing::info!(floor, on, "floor indicator")
            }
            Notification::CurrentFloorChanged { floor } => tracing::info!(floor, "current floor"),
            Notification::RideComplete => tracing::info!("ride complete"),
            Notification::MotionDetected => tracing::info!("motion detected, capture requested"),
        }
        if self.jsonl {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", notification_json(&notification))?;
            out.flush()?;
        }
        Ok(())
    }
}
