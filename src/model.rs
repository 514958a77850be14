use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::engine::RejectionReason;
use crate::limits::MAX_REQUESTER_LEN;

/// Registry-wide booking identifier, starting at 1.
pub type BookingId = u64;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// A category of bookable unit with its own capacity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Bed,
    Ventilator,
    Ultrasound,
    Electrocardiograph,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Bed,
        ResourceType::Ventilator,
        ResourceType::Ultrasound,
        ResourceType::Electrocardiograph,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Bed => "Bed",
            ResourceType::Ventilator => "Ventilator",
            ResourceType::Ultrasound => "Ultrasound",
            ResourceType::Electrocardiograph => "Electrocardiograph",
        }
    }

    /// Position in the front-desk menu (1-based).
    pub fn menu_number(&self) -> u8 {
        match self {
            ResourceType::Bed => 1,
            ResourceType::Ventilator => 2,
            ResourceType::Ultrasound => 3,
            ResourceType::Electrocardiograph => 4,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = RejectionReason;

    /// Accepts the menu number or the name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ResourceType::ALL
            .into_iter()
            .find(|rt| s == rt.menu_number().to_string() || s.eq_ignore_ascii_case(rt.as_str()))
            .ok_or_else(|| RejectionReason::UnknownResource(s.to_string()))
    }
}

/// Half-open time-of-day range `[start, end)`. Deserialization goes through
/// `try_new`, so `start < end` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawSpan {
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawSpan> for Span {
    type Error = RejectionReason;

    fn try_from(raw: RawSpan) -> Result<Self, Self::Error> {
        Span::try_new(raw.start, raw.end)
    }
}

impl Span {
    pub fn try_new(start: NaiveTime, end: NaiveTime) -> Result<Self, RejectionReason> {
        if start >= end {
            return Err(RejectionReason::InvalidInterval(format!(
                "start {} is not before end {}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format(TIME_FORMAT), self.end.format(TIME_FORMAT))
    }
}

/// The part of a date an interval occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    WholeDay,
    Hours(Span),
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::WholeDay => f.write_str("all day"),
            Window::Hours(span) => span.fmt(f),
        }
    }
}

/// A date-scoped slot: either a half-open time range or the whole day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    date: NaiveDate,
    window: Window,
}

impl TimeInterval {
    pub fn whole_day(date: NaiveDate) -> Self {
        Self {
            date,
            window: Window::WholeDay,
        }
    }

    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, RejectionReason> {
        Ok(Self {
            date,
            window: Window::Hours(Span::try_new(start, end)?),
        })
    }

    /// Build from raw `YYYY-MM-DD` and `HH:MM` strings. Both times absent means whole day.
    pub fn parse(date: &str, start: Option<&str>, end: Option<&str>) -> Result<Self, RejectionReason> {
        let date = parse_date(date)?;
        match (start, end) {
            (None, None) => Ok(Self::whole_day(date)),
            (Some(start), Some(end)) => Self::new(date, parse_time(start)?, parse_time(end)?),
            _ => Err(RejectionReason::InvalidInterval(
                "start and end must both be given or both omitted".into(),
            )),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn is_whole_day(&self) -> bool {
        matches!(self.window, Window::WholeDay)
    }

    /// Start time of day; `None` for a whole-day interval.
    pub fn start_time(&self) -> Option<NaiveTime> {
        match self.window {
            Window::WholeDay => None,
            Window::Hours(span) => Some(span.start()),
        }
    }

    /// Intervals on different dates never overlap. A whole-day interval overlaps
    /// everything on its date; touching endpoints do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        if self.date != other.date {
            return false;
        }
        match (&self.window, &other.window) {
            (Window::Hours(a), Window::Hours(b)) => a.overlaps(b),
            _ => true,
        }
    }
}

/// Canonical slot key, e.g. `2024-01-01 09:00 to 10:00`.
impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.window {
            Window::WholeDay => write!(f, "{} all day", self.date.format(DATE_FORMAT)),
            Window::Hours(span) => write!(
                f,
                "{} {} to {}",
                self.date.format(DATE_FORMAT),
                span.start().format(TIME_FORMAT),
                span.end().format(TIME_FORMAT)
            ),
        }
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, RejectionReason> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| RejectionReason::InvalidInterval(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

pub fn parse_time(s: &str) -> Result<NaiveTime, RejectionReason> {
    NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
        .map_err(|_| RejectionReason::InvalidInterval(format!("invalid time '{s}', expected HH:MM")))
}

/// Who holds a booking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Requester {
    pub name: String,
    pub id: String,
}

impl Requester {
    pub fn new(name: &str, id: &str) -> Result<Self, RejectionReason> {
        let name = name.trim();
        let id = id.trim();
        if name.is_empty() {
            return Err(RejectionReason::InvalidRequester("name is empty"));
        }
        if id.is_empty() {
            return Err(RejectionReason::InvalidRequester("id is empty"));
        }
        if name.len() > MAX_REQUESTER_LEN || id.len() > MAX_REQUESTER_LEN {
            return Err(RejectionReason::InvalidRequester("name or id too long"));
        }
        Ok(Self {
            name: name.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A single committed unit reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Booking {
    pub id: BookingId,
    pub requester: Requester,
    pub resource_type: ResourceType,
    pub interval: TimeInterval,
    /// Insertion sequence within the owning ledger.
    pub created_order: u64,
}

/// A typed request, validated once at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingRequest {
    pub resource_type: ResourceType,
    pub requester: Requester,
    pub interval: TimeInterval,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConfirmation {
    pub booking_ids: Vec<BookingId>,
    pub remaining_capacity: u32,
    pub request: BookingRequest,
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub resource_type: ResourceType,
    pub in_use: u32,
    pub capacity: u32,
}

/// Bookings on one date grouped by interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOccupancy {
    pub interval: TimeInterval,
    /// Distinct holders in first-seen order.
    pub holders: Vec<Requester>,
    /// Units booked on this interval (>= holders.len()).
    pub units: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceAvailability {
    pub resource_type: ResourceType,
    pub available: u32,
    pub capacity: u32,
    pub unavailable_slots: Vec<SlotOccupancy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn span_overlap() {
        let a = Span::try_new(t("09:00"), t("10:00")).unwrap();
        let b = Span::try_new(t("09:30"), t("10:30")).unwrap();
        let c = Span::try_new(t("10:00"), t("11:00")).unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn span_rejects_inverted_or_empty() {
        assert!(matches!(
            Span::try_new(t("10:00"), t("09:00")),
            Err(RejectionReason::InvalidInterval(_))
        ));
        assert!(matches!(
            Span::try_new(t("10:00"), t("10:00")),
            Err(RejectionReason::InvalidInterval(_))
        ));
    }

    #[test]
    fn interval_touching_endpoints_compatible() {
        let a = TimeInterval::parse("2024-01-01", Some("09:00"), Some("10:00")).unwrap();
        let b = TimeInterval::parse("2024-01-01", Some("10:00"), Some("11:00")).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn interval_different_dates_never_overlap() {
        let a = TimeInterval::parse("2024-01-01", Some("09:00"), Some("10:00")).unwrap();
        let b = TimeInterval::parse("2024-01-02", Some("09:00"), Some("10:00")).unwrap();
        assert!(!a.overlaps(&b));
        assert!(!TimeInterval::whole_day(d("2024-01-02")).overlaps(&a));
    }

    #[test]
    fn whole_day_overlaps_everything_on_its_date() {
        let day = TimeInterval::whole_day(d("2024-02-01"));
        let afternoon = TimeInterval::parse("2024-02-01", Some("14:00"), Some("15:00")).unwrap();
        assert!(day.overlaps(&afternoon));
        assert!(afternoon.overlaps(&day));
        assert!(day.overlaps(&TimeInterval::whole_day(d("2024-02-01"))));
    }

    #[test]
    fn parse_whole_day_when_times_absent() {
        let i = TimeInterval::parse("2024-02-01", None, None).unwrap();
        assert!(i.is_whole_day());
        assert_eq!(i.start_time(), None);
        assert_eq!(i.to_string(), "2024-02-01 all day");
    }

    #[test]
    fn parse_rejects_bad_input() {
        for (date, start, end) in [
            ("2024-13-01", Some("09:00"), Some("10:00")),
            ("01/01/2024", Some("09:00"), Some("10:00")),
            ("2024-01-01", Some("9am"), Some("10:00")),
            ("2024-01-01", Some("24:00"), Some("10:00")),
            ("2024-01-01", Some("11:00"), Some("10:00")),
            ("2024-01-01", Some("09:00"), None),
        ] {
            let result = TimeInterval::parse(date, start, end);
            assert!(
                matches!(result, Err(RejectionReason::InvalidInterval(_))),
                "{date} {start:?} {end:?} should be invalid, got {result:?}"
            );
        }
    }

    #[test]
    fn slot_key_format() {
        let i = TimeInterval::parse("2024-01-01", Some("09:00"), Some("10:00")).unwrap();
        assert_eq!(i.to_string(), "2024-01-01 09:00 to 10:00");
        assert_eq!(i.window().to_string(), "09:00-10:00");
    }

    #[test]
    fn resource_type_from_menu_number_or_name() {
        assert_eq!("1".parse::<ResourceType>().unwrap(), ResourceType::Bed);
        assert_eq!("4".parse::<ResourceType>().unwrap(), ResourceType::Electrocardiograph);
        assert_eq!("ventilator".parse::<ResourceType>().unwrap(), ResourceType::Ventilator);
        assert_eq!(" Ultrasound ".parse::<ResourceType>().unwrap(), ResourceType::Ultrasound);
        assert!(matches!(
            "5".parse::<ResourceType>(),
            Err(RejectionReason::UnknownResource(_))
        ));
        assert!(matches!(
            "MRI".parse::<ResourceType>(),
            Err(RejectionReason::UnknownResource(_))
        ));
    }

    #[test]
    fn requester_validation() {
        let r = Requester::new("  Ada ", " 42 ").unwrap();
        assert_eq!(r.name, "Ada");
        assert_eq!(r.id, "42");
        assert_eq!(r.to_string(), "Ada (42)");
        assert!(Requester::new("", "42").is_err());
        assert!(Requester::new("Ada", "   ").is_err());
        assert!(Requester::new(&"x".repeat(MAX_REQUESTER_LEN + 1), "42").is_err());
    }

    #[test]
    fn interval_serializes_to_json() {
        let i = TimeInterval::parse("2024-01-01", Some("09:00"), Some("10:00")).unwrap();
        let json = serde_json::to_value(i).unwrap();
        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["window"]["Hours"]["start"], "09:00:00");
        let back: TimeInterval = serde_json::from_value(json).unwrap();
        assert_eq!(back, i);
    }

    #[test]
    fn deserialize_rejects_inverted_window() {
        let inverted = r#"{"date":"2024-01-01","window":{"Hours":{"start":"11:00:00","end":"09:00:00"}}}"#;
        let err = serde_json::from_str::<TimeInterval>(inverted).unwrap_err();
        assert!(err.to_string().contains("invalid interval"), "{err}");

        let empty = r#"{"start":"10:00:00","end":"10:00:00"}"#;
        assert!(serde_json::from_str::<Span>(empty).is_err());

        let whole_day = r#"{"date":"2024-01-01","window":"WholeDay"}"#;
        let day: TimeInterval = serde_json::from_str(whole_day).unwrap();
        assert!(day.is_whole_day());
    }
}
