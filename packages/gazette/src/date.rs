//! Date formatting for the search endpoint.

use chrono::NaiveDate;

/// `strftime` pattern the endpoint expects for `fInicio`/`fFinal`.
pub const DMY_FORMAT: &str = "%d/%m/%Y";

/// Formats `date` as zero-padded `DD/MM/YYYY`.
///
/// ```
/// use chrono::NaiveDate;
/// use cgr_mirror_gazette::date::format_dmy;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
/// assert_eq!(format_dmy(date), "05/03/2025");
/// ```
#[must_use]
pub fn format_dmy(date: NaiveDate) -> String {
    date.format(DMY_FORMAT).to_string()
}
