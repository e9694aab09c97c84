//! Cron expression utilities

use crate::config::ConfigError;
use chrono::{DateTime, TimeZone};
use cron::Schedule;
use std::str::FromStr;

/// Normalise a cron expression to the seconds-first form the parser expects.
///
/// Classic five-field expressions (`min hour dom month dow`) fire at second 0.
pub fn normalize_expression(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

/// Parse a 5, 6 or 7 field cron expression
pub fn parse_schedule(expression: &str) -> Result<Schedule, ConfigError> {
    let field_count = expression.split_whitespace().count();
    if !(5..=7).contains(&field_count) {
        return Err(ConfigError::InvalidSchedule {
            expression: expression.to_string(),
            reason: format!("expected 5 to 7 fields, found {}", field_count),
        });
    }

    Schedule::from_str(&normalize_expression(expression)).map_err(|e| {
        ConfigError::InvalidSchedule {
            expression: expression.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Next fire time strictly after `after`
pub fn next_fire_after<Tz: TimeZone>(schedule: &Schedule, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    schedule.after(after).next()
}
