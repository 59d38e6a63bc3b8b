//! Resolves the clinic's configured timezone.
use std::fmt;

use time::{OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone, Tz};

/// The clinic's timezone, used to decide which calendar day an instant falls on.
///
/// A named timezone is resolved per instant, so dates on either side of a
/// daylight saving change land on the right local day.
#[derive(Clone, Copy)]
pub enum LocalTimezone {
    /// An IANA timezone such as "Pacific/Auckland".
    Named(&'static Tz),
    /// A fixed offset from UTC.
    Fixed(UtcOffset),
}

impl LocalTimezone {
    /// Coordinated Universal Time.
    pub const UTC: Self = Self::Fixed(UtcOffset::UTC);

    /// Look up a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Returns `None` if the name is not a known IANA timezone.
    pub fn from_name(canonical_timezone: &str) -> Option<Self> {
        time_tz::timezones::get_by_name(canonical_timezone).map(Self::Named)
    }

    /// The UTC offset in effect at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        match self {
            Self::Named(tz) => tz.get_offset_utc(&instant).to_utc(),
            Self::Fixed(offset) => *offset,
        }
    }

    /// `instant` as local wall-clock time.
    pub fn to_local(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.offset_at(instant))
    }
}

impl From<UtcOffset> for LocalTimezone {
    fn from(offset: UtcOffset) -> Self {
        Self::Fixed(offset)
    }
}

impl fmt::Debug for LocalTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(tz) => f.debug_tuple("Named").field(&tz.name()).finish(),
            Self::Fixed(offset) => f.debug_tuple("Fixed").field(offset).finish(),
        }
    }
}

/// The current UTC offset of `canonical_timezone`, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known IANA timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    LocalTimezone::from_name(canonical_timezone)
        .map(|timezone| timezone.offset_at(OffsetDateTime::now_utc()))
}

#[cfg(test)]
mod tests {
    use time::{UtcOffset, macros::datetime};

    use super::{LocalTimezone, get_local_offset};

    #[test]
    fn resolves_canonical_names() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
        assert!(get_local_offset("Pacific/Auckland").is_some());
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(get_local_offset("Mars/Olympus_Mons"), None);
        assert!(LocalTimezone::from_name("Mars/Olympus_Mons").is_none());
    }

    #[test]
    fn named_offset_follows_daylight_saving() {
        let auckland = LocalTimezone::from_name("Pacific/Auckland").unwrap();

        assert_eq!(
            auckland.offset_at(datetime!(2024-01-15 0:00 UTC)),
            UtcOffset::from_hms(13, 0, 0).unwrap()
        );
        assert_eq!(
            auckland.offset_at(datetime!(2024-07-15 0:00 UTC)),
            UtcOffset::from_hms(12, 0, 0).unwrap()
        );
    }
}
