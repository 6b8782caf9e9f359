use serde::{Deserialize, Serialize};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};

use crate::error::AppError;

/// Largest magnitude of an epoch-millisecond instant (±100,000,000 days).
const MAX_EPOCH_MS: i64 = 8_640_000_000_000_000;

/// Body of `POST /meals` and `PUT /meals/:id`.
///
/// A `userId` field may still be sent by older clients on create; it is
/// ignored and ownership comes from the session cookie.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealBody {
    pub name: String,
    pub description: String,
    #[serde(alias = "IsOnDiet")]
    pub is_on_diet: bool,
    pub date: MealDate,
}

impl MealBody {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        Ok(())
    }
}

/// A point in time as epoch milliseconds, coerced from whatever the client sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDate")]
pub struct MealDate(pub i64);

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl TryFrom<RawDate> for MealDate {
    type Error = String;

    fn try_from(raw: RawDate) -> Result<Self, Self::Error> {
        let ms = match raw {
            RawDate::Millis(ms) => ms,
            RawDate::Fractional(f) if f.is_finite() && f.abs() <= MAX_EPOCH_MS as f64 => {
                f.trunc() as i64
            }
            RawDate::Fractional(f) => return Err(format!("invalid date: {f}")),
            RawDate::Text(s) => parse_date_text(s.trim())?,
        };
        if ms.abs() > MAX_EPOCH_MS {
            return Err(format!("date out of range: {ms}"));
        }
        Ok(MealDate(ms))
    }
}

fn parse_date_text(s: &str) -> Result<i64, String> {
    if !s.is_empty() && s.trim_start_matches('-').chars().all(|c| c.is_ascii_digit()) {
        return s.parse::<i64>().map_err(|_| format!("invalid date: {s}"));
    }
    if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
        return Ok(to_millis(dt));
    }
    if let Ok(d) = Date::parse(s, format_description!("[year]-[month]-[day]")) {
        return Ok(to_millis(d.midnight().assume_utc()));
    }
    Err(format!("invalid date: {s}"))
}

fn to_millis(dt: OffsetDateTime) -> i64 {
    (dt.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Wraps meal payloads under the key clients already read.
#[derive(Debug, Serialize)]
pub struct MealsEnvelope<T> {
    #[serde(rename = "mealsRoutes")]
    pub meals: T,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub total: i64,
    pub total_meals_off_diet: i64,
    pub total_meals_on_diet: i64,
}
