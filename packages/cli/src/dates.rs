//! Turns `--date` and `--start-date`/`--end-date` arguments into the list
//! of calendar dates a run processes.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Format accepted for every date argument.
pub const ARG_FORMAT: &str = "%Y-%m-%d";

/// Invalid date arguments. All of these abort the run before any request
/// is made.
#[derive(Debug, thiserror::Error)]
pub enum DateArgsError {
    /// A value is not a valid `YYYY-MM-DD` calendar date.
    #[error("Invalid date '{value}' (expected YYYY-MM-DD): {source}")]
    Invalid {
        /// The rejected argument.
        value: String,
        /// Parser error.
        source: chrono::ParseError,
    },
    /// Only one end of the range was given.
    #[error("--start-date and --end-date must be given together")]
    IncompleteRange,
    /// The range starts after it ends.
    #[error("--start-date {start} is after --end-date {end}")]
    InvertedRange {
        /// First day of the range.
        start: NaiveDate,
        /// Last day of the range.
        end: NaiveDate,
    },
    /// Neither single dates nor a range were given.
    #[error("No dates given: use --date or --start-date/--end-date")]
    NoDates,
}

/// Parses one `YYYY-MM-DD` argument.
///
/// # Errors
///
/// Returns [`DateArgsError::Invalid`] if `value` is not a real calendar
/// date.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateArgsError> {
    NaiveDate::parse_from_str(value.trim(), ARG_FORMAT).map_err(|source| DateArgsError::Invalid {
        value: value.to_owned(),
        source,
    })
}

/// Merges single dates with the inclusive `start..=end` range.
///
/// The result is sorted ascending with duplicates removed.
///
/// # Errors
///
/// Returns [`DateArgsError`] if any value fails to parse, only one range
/// bound is present, the range is inverted, or no date is given at all.
pub fn expand_dates(
    dates: &[String],
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Vec<NaiveDate>, DateArgsError> {
    let mut all = dates
        .iter()
        .map(|d| parse_date(d))
        .collect::<Result<BTreeSet<_>, _>>()?;

    match (start, end) {
        (Some(start), Some(end)) => {
            let start = parse_date(start)?;
            let end = parse_date(end)?;
            if start > end {
                return Err(DateArgsError::InvertedRange { start, end });
            }
            all.extend(start.iter_days().take_while(|day| *day <= end));
        }
        (None, None) => {}
        _ => return Err(DateArgsError::IncompleteRange),
    }

    if all.is_empty() {
        return Err(DateArgsError::NoDates);
    }

    Ok(all.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_dates_are_sorted_and_deduplicated() {
        let dates = expand_dates(
            &args(&["2025-03-07", "2025-03-05", "2025-03-07"]),
            None,
            None,
        )
        .unwrap();

        assert_eq!(dates, vec![ymd(2025, 3, 5), ymd(2025, 3, 7)]);
    }

    #[test]
    fn range_is_inclusive_and_crosses_month_ends() {
        let dates = expand_dates(&[], Some("2024-02-28"), Some("2024-03-01")).unwrap();

        assert_eq!(
            dates,
            vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]
        );
    }

    #[test]
    fn single_day_range() {
        let dates = expand_dates(&[], Some("2025-01-10"), Some("2025-01-10")).unwrap();
        assert_eq!(dates, vec![ymd(2025, 1, 10)]);
    }

    #[test]
    fn dates_and_range_merge() {
        let dates = expand_dates(
            &args(&["2025-01-02", "2025-01-20"]),
            Some("2025-01-01"),
            Some("2025-01-03"),
        )
        .unwrap();

        assert_eq!(
            dates,
            vec![
                ymd(2025, 1, 1),
                ymd(2025, 1, 2),
                ymd(2025, 1, 3),
                ymd(2025, 1, 20),
            ]
        );
    }

    #[test]
    fn impossible_date_is_rejected() {
        let err = expand_dates(&args(&["2025-02-30"]), None, None).unwrap_err();

        assert!(matches!(&err, DateArgsError::Invalid { value, .. } if value == "2025-02-30"));
        assert!(err.to_string().starts_with("Invalid date '2025-02-30'"));
    }

    #[test]
    fn day_first_format_is_rejected() {
        assert!(matches!(
            expand_dates(&args(&["05/03/2025"]), None, None),
            Err(DateArgsError::Invalid { .. })
        ));
    }

    #[test]
    fn invalid_range_bound_is_rejected() {
        assert!(matches!(
            expand_dates(&[], Some("2025-13-01"), Some("2025-12-31")),
            Err(DateArgsError::Invalid { .. })
        ));
    }

    #[test]
    fn lone_range_bound_is_rejected() {
        assert!(matches!(
            expand_dates(&[], Some("2025-01-01"), None),
            Err(DateArgsError::IncompleteRange)
        ));
        assert!(matches!(
            expand_dates(&args(&["2025-01-01"]), None, Some("2025-01-05")),
            Err(DateArgsError::IncompleteRange)
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = expand_dates(&[], Some("2025-01-05"), Some("2025-01-01")).unwrap_err();

        assert!(matches!(err, DateArgsError::InvertedRange { .. }));
        assert_eq!(
            err.to_string(),
            "--start-date 2025-01-05 is after --end-date 2025-01-01"
        );
    }

    #[test]
    fn no_dates_is_rejected() {
        assert!(matches!(
            expand_dates(&[], None, None),
            Err(DateArgsError::NoDates)
        ));
    }
}
