use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Monday 00:00:00.000 through Sunday 23:59:59.999 of one ISO week, local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekBoundaries {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekBoundaries {
    /// Boundaries of the week containing `reference`.
    pub fn containing(reference: NaiveDateTime) -> Self {
        let date = reference.date();
        // Sunday is day 7, so it closes the week rather than opening the next one.
        let offset = 1 - date.weekday().number_from_monday() as i64;
        let monday = date + Duration::days(offset);
        let sunday = monday + Duration::days(6);

        Self {
            start: monday.and_time(NaiveTime::MIN),
            end: sunday.and_time(end_of_day()),
        }
    }

    /// Boundaries of the week before the one containing `reference`.
    pub fn previous(reference: NaiveDateTime) -> Self {
        Self::containing(reference - Duration::days(7))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

/// Day number within the ISO week: Monday = 1 .. Sunday = 7.
pub fn day_of_week(reference: NaiveDateTime) -> u32 {
    reference.date().weekday().number_from_monday()
}
