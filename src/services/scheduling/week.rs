use chrono::{Datelike, Duration, Local, NaiveDate};

/// Returns the Monday-start 7-day window containing `reference`.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = reference.weekday().num_days_from_monday() as i64;
    let monday = reference - Duration::days(offset);
    (monday, monday + Duration::days(6))
}

/// Tracks the calendar's reference date and derives the visible work window.
///
/// Callers refetch whenever the window changes; the navigator itself performs
/// no I/O.
#[derive(Debug, Clone)]
pub struct WeekNavigator {
    reference: NaiveDate,
}

impl WeekNavigator {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// Starts on the week containing the current local date.
    pub fn starting_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// The inclusive Monday..Sunday range currently in view.
    pub fn window(&self) -> (NaiveDate, NaiveDate) {
        week_bounds(self.reference)
    }

    pub fn week_start(&self) -> NaiveDate {
        self.window().0
    }

    pub fn week_end(&self) -> NaiveDate {
        self.window().1
    }

    /// Moves the reference date back 7 days and returns the new window.
    pub fn previous_week(&mut self) -> (NaiveDate, NaiveDate) {
        self.reference -= Duration::days(7);
        self.window()
    }

    /// Moves the reference date forward 7 days and returns the new window.
    pub fn next_week(&mut self) -> (NaiveDate, NaiveDate) {
        self.reference += Duration::days(7);
        self.window()
    }

    /// Resets the reference date to the current local date.
    pub fn today(&mut self) -> (NaiveDate, NaiveDate) {
        self.reference = Local::now().date_naive();
        self.window()
    }
}

impl Default for WeekNavigator {
    fn default() -> Self {
        Self::starting_today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case::midweek(d(2024, 1, 3), d(2024, 1, 1), d(2024, 1, 7))]
    #[case::monday_is_its_own_start(d(2024, 1, 1), d(2024, 1, 1), d(2024, 1, 7))]
    #[case::sunday_belongs_to_preceding_monday(d(2023, 12, 31), d(2023, 12, 25), d(2023, 12, 31))]
    #[case::window_crosses_year_boundary(d(2024, 12, 31), d(2024, 12, 30), d(2025, 1, 5))]
    #[case::leap_day(d(2024, 2, 29), d(2024, 2, 26), d(2024, 3, 3))]
    fn week_bounds_are_monday_start_inclusive(
        #[case] reference: NaiveDate,
        #[case] expected_start: NaiveDate,
        #[case] expected_end: NaiveDate,
    ) {
        assert_eq!(week_bounds(reference), (expected_start, expected_end));
    }

    #[test]
    fn window_spans_exactly_seven_days() {
        let (start, end) = week_bounds(d(2024, 6, 14));
        assert_eq!((end - start).num_days(), 6);
    }

    #[test]
    fn next_and_previous_offset_by_seven_days() {
        let mut nav = WeekNavigator::new(d(2024, 1, 3));
        assert_eq!(nav.window(), (d(2024, 1, 1), d(2024, 1, 7)));

        assert_eq!(nav.next_week(), (d(2024, 1, 8), d(2024, 1, 14)));
        assert_eq!(nav.next_week(), (d(2024, 1, 15), d(2024, 1, 21)));
        assert_eq!(nav.previous_week(), (d(2024, 1, 8), d(2024, 1, 14)));
    }

    #[test]
    fn previous_crosses_month_boundary() {
        let mut nav = WeekNavigator::new(d(2024, 3, 4));
        assert_eq!(nav.previous_week(), (d(2024, 2, 26), d(2024, 3, 3)));
    }

    #[test]
    fn today_returns_to_current_week() {
        let mut nav = WeekNavigator::new(d(2020, 5, 5));
        nav.next_week();
        let (start, end) = nav.today();
        let expected = week_bounds(Local::now().date_naive());
        assert_eq!((start, end), expected);
    }
}
