use chrono::{DateTime, NaiveDate, NaiveTime, SubsecRound, Utc};
use uuid::Uuid;

pub type EntityId = Uuid;

pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

/// Parses a client supplied id. Anything that is not a UUID is `None`.
pub fn parse_entity_id(raw: &str) -> Option<EntityId> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Current instant truncated to milliseconds, the precision every store keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Trims the value and keeps it only when something is left.
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// A calendar day in UTC. Attendance is keyed by the day's canonical instant,
/// 00:00:00 UTC, so two submissions for the same day always collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttendanceDay(NaiveDate);

impl AttendanceDay {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp; the latter is
    /// reduced to its UTC calendar day.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(Self(date));
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|instant| Self(instant.with_timezone(&Utc).date_naive()))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// Start of the following day, `None` for the last day chrono can represent.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.0
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.starts_at() && self.ends_at().is_none_or(|end| instant < end)
    }
}
