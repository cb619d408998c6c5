//! Field parsing for raw transaction rows.

use chrono::NaiveDate;

/// Day-first date layouts accepted in the `Date` column, tried in order.
const DATE_FORMATS: &[&str] = &["%d-%b-%y", "%d-%b-%Y", "%d-%m-%Y", "%d/%m/%Y", "%d/%m/%y"];

/// Parses a day-first date such as `"29-Oct-14"` or `"29/10/2014"`.
#[must_use]
pub fn parse_day_first_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses an amount, tolerating thousands separators and whitespace.
#[must_use]
pub fn parse_amount(s: &str) -> Option<f64> {
    s.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_abbreviated_month() {
        let d = parse_day_first_date("29-Oct-14").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2014, 10, 29).unwrap());
    }

    #[test]
    fn parses_numeric_day_first() {
        let d = parse_day_first_date("05/01/2015").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2015, 1, 5).unwrap());
        let d = parse_day_first_date("05-01-2015").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2015, 1, 5).unwrap());
    }

    #[test]
    fn rejects_invalid_date() {
        assert!(parse_day_first_date("not-a-date").is_none());
        assert!(parse_day_first_date("31/02/2015").is_none());
    }

    #[test]
    fn parses_amounts() {
        assert_eq!(parse_amount(" 82475 "), Some(82475.0));
        assert_eq!(parse_amount("1,234.5"), Some(1234.5));
        assert!(parse_amount("n/a").is_none());
        assert!(parse_amount("NaN").is_none());
    }
}
