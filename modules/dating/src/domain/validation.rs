use chrono::{Months, NaiveDate};

use crate::domain::error::DomainError;

/// Latest birth date that still makes someone `min_age_years` old on `today`.
/// Feb 29 anniversaries clamp to Feb 28 in non-leap years.
pub fn birth_date_cutoff(today: NaiveDate, min_age_years: u32) -> Option<NaiveDate> {
    today.checked_sub_months(Months::new(min_age_years.checked_mul(12)?))
}

/// Parses a strict `YYYY-MM-DD` date and enforces the minimum age.
/// The cutoff day itself is accepted.
pub fn validate_date_of_birth(
    raw: &str,
    today: NaiveDate,
    min_age_years: u32,
) -> Result<NaiveDate, DomainError> {
    let invalid = || DomainError::invalid_date_of_birth(raw);

    if !is_iso_date_shape(raw) {
        return Err(invalid());
    }
    let dob = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let cutoff = birth_date_cutoff(today, min_age_years).ok_or_else(invalid)?;
    if dob > cutoff {
        return Err(invalid());
    }
    Ok(dob)
}

fn is_iso_date_shape(raw: &str) -> bool {
    let b = raw.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

pub fn validate_text_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max} characters (got {len})"),
        ));
    }
    Ok(())
}
