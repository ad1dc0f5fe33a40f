//! Query windows and the backward window walk used by the path-addressed API.

use chrono::{Duration, NaiveDate};
use std::fmt;

use crate::error::GieError;

/// Longest span (in days between start and end) a path-addressed request may cover.
pub const MAX_WINDOW_DAYS: i64 = 30;

/// Step between consecutive window starts in the backward walk.
pub const WALK_STEP_DAYS: i64 = 31;

/// Padding added on both sides of the range for the anomaly retry.
pub const ANOMALY_PADDING_DAYS: i64 = 5;

/// Inclusive date range submitted in a single upstream request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl QueryWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GieError> {
        if start > end {
            return Err(GieError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Days between start and end (0 for a single-day window).
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// The same window padded by `days` on each side.
    ///
    /// Fails with [`GieError::DateOutOfRange`] when padding would leave the
    /// representable calendar.
    pub fn widened(&self, days: i64) -> Result<Self, GieError> {
        let pad = Duration::days(days);
        let out_of_range = || GieError::DateOutOfRange {
            start: self.start,
            end: self.end,
            days,
        };
        Ok(Self {
            start: self.start.checked_sub_signed(pad).ok_or_else(out_of_range)?,
            end: self.end.checked_add_signed(pad).ok_or_else(out_of_range)?,
        })
    }

    /// `from`/`till` query parameters.
    pub fn query_params(&self) -> [(String, String); 2] {
        [
            ("from".to_string(), self.start.format("%Y-%m-%d").to_string()),
            ("till".to_string(), self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl fmt::Display for QueryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Split a range into the windows requested from the path-addressed API.
///
/// Ranges spanning at most [`MAX_WINDOW_DAYS`] go out as one request. Longer
/// ranges are walked backwards from `end`: windows `[s, s + 30]` with `s`
/// starting at `end - 30` and stepping back 31 days while `s > start`, then a
/// final window from `start` to the last `s + 30`. Windows are returned in
/// request order, newest first.
pub fn plan_windows(range: QueryWindow) -> Vec<QueryWindow> {
    let span = range.span_days();
    if span <= MAX_WINDOW_DAYS {
        return vec![range];
    }

    // Offsets from `start`; every window bound stays within `[start, end]`.
    let at = |offset: i64| range.start + Duration::days(offset);
    let mut windows = Vec::new();
    let mut cursor = span - MAX_WINDOW_DAYS;
    while cursor > 0 {
        windows.push(QueryWindow {
            start: at(cursor),
            end: at(cursor + MAX_WINDOW_DAYS),
        });
        cursor -= WALK_STEP_DAYS;
    }
    windows.push(QueryWindow {
        start: range.start,
        end: at(cursor + MAX_WINDOW_DAYS),
    });
    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        let err = QueryWindow::new(d(2023, 2, 1), d(2023, 1, 1)).unwrap_err();
        assert!(matches!(err, GieError::InvalidWindow { .. }));
    }

    #[test]
    fn short_range_is_single_window() {
        let range = QueryWindow::new(d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        assert_eq!(range.span_days(), 30);
        assert_eq!(plan_windows(range), vec![range]);
    }

    #[test]
    fn walk_steps_back_31_days_from_end() {
        let range = QueryWindow::new(d(2023, 1, 1), d(2023, 3, 31)).unwrap();
        let windows = plan_windows(range);
        let bounds: Vec<_> = windows.iter().map(|w| (w.start(), w.end())).collect();
        assert_eq!(
            bounds,
            vec![
                (d(2023, 3, 1), d(2023, 3, 31)),
                (d(2023, 1, 29), d(2023, 2, 28)),
                (d(2023, 1, 1), d(2022, 12, 29) + Duration::days(30)),
            ]
        );
        assert_eq!(windows[2].end(), d(2023, 1, 28));
    }

    #[test]
    fn thirty_one_day_span_needs_two_requests() {
        let range = QueryWindow::new(d(2023, 1, 1), d(2023, 2, 1)).unwrap();
        let windows = plan_windows(range);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0], QueryWindow::new(d(2023, 1, 2), d(2023, 2, 1)).unwrap());
        assert_eq!(windows[1], QueryWindow::new(d(2023, 1, 1), d(2023, 1, 1)).unwrap());
    }

    #[test]
    fn widened_pads_both_sides() {
        let range = QueryWindow::new(d(2023, 1, 10), d(2023, 1, 12)).unwrap();
        let wide = range.widened(ANOMALY_PADDING_DAYS).unwrap();
        assert_eq!(wide.start(), d(2023, 1, 5));
        assert_eq!(wide.end(), d(2023, 1, 17));
        assert!(!range.contains(d(2023, 1, 9)));
        assert!(range.contains(d(2023, 1, 12)));
    }

    #[test]
    fn query_params_are_iso_dates() {
        let range = QueryWindow::new(d(2023, 1, 1), d(2023, 1, 3)).unwrap();
        assert_eq!(
            range.query_params(),
            [
                ("from".to_string(), "2023-01-01".to_string()),
                ("till".to_string(), "2023-01-03".to_string()),
            ]
        );
    }

    #[test]
    fn walk_near_calendar_start_does_not_overflow() {
        let start = NaiveDate::MIN;
        let range = QueryWindow::new(start, start + Duration::days(40)).unwrap();
        let windows = plan_windows(range);
        assert_eq!(
            windows,
            vec![
                QueryWindow::new(start + Duration::days(10), start + Duration::days(40)).unwrap(),
                QueryWindow::new(start, start + Duration::days(9)).unwrap(),
            ]
        );
    }

    #[test]
    fn walk_near_calendar_end_stays_inside_range() {
        let end = NaiveDate::MAX;
        let range = QueryWindow::new(end - Duration::days(100), end).unwrap();
        for window in plan_windows(range) {
            assert!(range.contains(window.start()));
            assert!(range.contains(window.end()));
        }
    }

    #[test]
    fn widening_past_calendar_bounds_is_an_error() {
        let last = QueryWindow::new(NaiveDate::MAX, NaiveDate::MAX).unwrap();
        assert!(matches!(
            last.widened(ANOMALY_PADDING_DAYS),
            Err(GieError::DateOutOfRange { days: 5, .. })
        ));
        let first = QueryWindow::new(NaiveDate::MIN, NaiveDate::MIN).unwrap();
        assert!(first.widened(ANOMALY_PADDING_DAYS).is_err());
    }
}
