use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};

const LOCAL_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Four-digit calendar years; later instants leave no room for stay and
/// window arithmetic.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parses a client-supplied check-in instant and normalizes it to a UTC
/// moment truncated to whole seconds. Offsets in the input are honoured; a
/// bare local timestamp without an offset is read as UTC.
pub fn parse_requested_moment(raw: Option<&str>, field: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required.")))?;

    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
                .into_iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|naive| naive.and_utc())
        })
        .filter(|moment| SUPPORTED_YEARS.contains(&moment.year()))
        .map(normalize_moment)
        .ok_or_else(|| AppError::BadRequest(format!("{field} must be an ISO-8601 timestamp.")))
}

pub fn normalize_moment(moment: DateTime<Utc>) -> DateTime<Utc> {
    moment.trunc_subsecs(0)
}

pub fn parse_date(raw: Option<&str>, field: &str) -> AppResult<NaiveDate> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required.")))?;
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("{field} must be an ISO date.")))
}

/// UTC bounds `[start, end)` of a calendar day in the property timezone.
pub fn local_day_bounds(date: NaiveDate, timezone: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_midnight(date, timezone);
    let end = date
        .succ_opt()
        .map(|next| local_midnight(next, timezone))
        .unwrap_or_else(|| window_after(start));
    (start, end)
}

fn window_after(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_add_signed(Duration::days(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn local_midnight(date: NaiveDate, timezone: Tz) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

pub fn format_local(moment: DateTime<Utc>, timezone: Tz) -> String {
    moment
        .with_timezone(&timezone)
        .format(LOCAL_DISPLAY_FORMAT)
        .to_string()
}

#[cfg(test)]
pub fn parse_local(raw: &str, timezone: Tz) -> AppResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), LOCAL_DISPLAY_FORMAT)
        .map_err(|_| AppError::BadRequest("Invalid local timestamp.".to_string()))?;
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| AppError::BadRequest("Local timestamp does not exist.".to_string()))
}
