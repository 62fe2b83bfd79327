use chrono::{DateTime, Days, Local, NaiveDate, TimeDelta, TimeZone};

use crate::{core::interval::Interval, prelude::*};

/// Which day a sensor reports on, relative to now.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Day {
    Current,
    Next,
}

impl Day {
    pub const ALL: [Self; 2] = [Self::Current, Self::Next];

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Next => "next",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Next => "Next",
        }
    }

    const fn offset(self) -> Days {
        match self {
            Self::Current => Days::new(0),
            Self::Next => Days::new(1),
        }
    }

    /// The moment whose price the sensor should show.
    ///
    /// Calendar days rather than 24 hours, so that the lookup stays on the right date around
    /// the daylight saving switches.
    pub fn lookup_time(self, now: DateTime<Local>) -> Result<DateTime<Local>> {
        match self {
            Self::Current => Ok(now),
            Self::Next => add_calendar_days(&now, self.offset()).context("the lookup time is out of range"),
        }
    }

    /// Local midnight-to-midnight interval of the day, counting from `today`.
    pub fn interval(self, today: NaiveDate) -> Result<Interval> {
        let date = today.checked_add_days(self.offset()).context("the date is out of range")?;
        let start = local_midnight(date)?;
        let end = local_midnight(date.succ_opt().context("the date is out of range")?)?;
        Interval::try_new(start, end)
    }
}

/// Same wall-clock time on a later date.
///
/// A time that is ambiguous on the target date resolves to the earliest instant, and a time
/// skipped by the switch to summer time moves one hour forward.
fn add_calendar_days<Tz: TimeZone>(time: &DateTime<Tz>, days: Days) -> Option<DateTime<Tz>> {
    let naive = time.naive_local().checked_add_days(days)?;
    let timezone = time.timezone();
    timezone.from_local_datetime(&naive).earliest().or_else(|| {
        let shifted = naive.checked_add_signed(TimeDelta::hours(1))?;
        timezone.from_local_datetime(&shifted).earliest()
    })
}

fn local_midnight(date: NaiveDate) -> Result<DateTime<Local>> {
    date.and_hms_opt(0, 0, 0)
        .context("invalid midnight")?
        .and_local_timezone(Local)
        .earliest()
        .with_context(|| format!("midnight of {date} does not exist in the local timezone"))
}
