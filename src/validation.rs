//! Field checks run before a form is sent to the backend.
//!
//! Each check returns the message to show under the field when it fails.

use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::currency::find_currency;

/// Cashbox and category names.
pub fn validate_name(name: &str) -> Result<(), String> {
    let length = name.trim().graphemes(true).count();

    if !(3..=20).contains(&length) {
        return Err("Name must be between 3 and 20 characters".to_owned());
    }

    Ok(())
}

pub fn validate_icon(icon: &str) -> Result<(), String> {
    if icon.trim().graphemes(true).count() > 20 {
        return Err("Icon must be at most 20 characters".to_owned());
    }

    Ok(())
}

/// Parse a money amount with at most two decimal places.
fn parse_money(text: &str) -> Option<f64> {
    let text = text.trim();

    if let Some((_, decimals)) = text.split_once('.')
        && decimals.len() > 2
    {
        return None;
    }

    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// A transaction or transfer amount: positive, at most two decimals.
pub fn validate_amount(text: &str) -> Result<f64, String> {
    match parse_money(text) {
        Some(amount) if amount > 0.0 => Ok(amount),
        _ => Err("Amount must be a positive number with at most 2 decimals".to_owned()),
    }
}

/// The currency coefficient: positive, at most two decimals.
pub fn validate_coefficient(value: f64) -> Result<f64, String> {
    let cents = value * 100.0;

    if value > 0.0 && value.is_finite() && (cents - cents.round()).abs() < 1e-6 {
        Ok(value)
    } else {
        Err("Coefficient must be a positive number with at most 2 decimals".to_owned())
    }
}

/// An opening cashbox balance: zero or more, at most two decimals.
pub fn validate_balance(text: &str) -> Result<f64, String> {
    match parse_money(text) {
        Some(balance) if balance >= 0.0 => Ok(balance),
        _ => Err("Balance must be zero or more with at most 2 decimals".to_owned()),
    }
}

pub fn validate_currency(code: &str) -> Result<(), String> {
    match find_currency(code) {
        Some(_) => Ok(()),
        None => Err(format!("Unsupported currency \"{code}\"")),
    }
}

/// Transactions and transfers cannot be recorded in the future.
pub fn validate_date(date: Date, today: Date) -> Result<(), String> {
    if date > today {
        return Err("Date cannot be in the future".to_owned());
    }

    Ok(())
}

/// 4 to 20 characters of letters, digits, '.' and '_', with no leading,
/// trailing or doubled separators.
pub fn validate_login(login: &str) -> Result<(), String> {
    const MESSAGE: &str = "Login must be 4-20 characters of letters, numbers, '.' and '_', \
        and cannot start, end or repeat '.' or '_'";

    let is_separator = |c: char| c == '.' || c == '_';
    let valid_chars = login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_separator(c));
    let no_doubled = !login
        .chars()
        .zip(login.chars().skip(1))
        .any(|(a, b)| is_separator(a) && is_separator(b));

    if (4..=20).contains(&login.len())
        && valid_chars
        && no_doubled
        && !login.starts_with(is_separator)
        && !login.ends_with(is_separator)
    {
        Ok(())
    } else {
        Err(MESSAGE.to_owned())
    }
}

/// 6 to 50 characters of letters, digits and `$ / - _`.
pub fn validate_password(password: &str) -> Result<(), String> {
    let valid_chars = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '/' | '-' | '_'));

    if (6..=50).contains(&password.len()) && valid_chars {
        Ok(())
    } else {
        Err("Password must be 6-50 characters and can only contain letters, numbers, \
            and the special characters $, /, -, _"
            .to_owned())
    }
}

pub fn validate_email(email: &str) -> Result<(), String> {
    let email = email.trim();
    let valid = (5..=50).contains(&email.len())
        && email.matches('@').count() == 1
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            });

    if valid {
        Ok(())
    } else {
        Err("Please enter a valid email address".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn name_length_counts_graphemes() {
        assert!(validate_name("ab").is_err());
        assert!(validate_name("abc").is_ok());
        assert!(validate_name(&"x".repeat(20)).is_ok());
        assert!(validate_name(&"x".repeat(21)).is_err());
        assert!(validate_icon(&"🏳️‍🌈".repeat(20)).is_ok());
        assert!(validate_icon(&"🍕".repeat(21)).is_err());
    }

    #[test]
    fn amounts_need_two_decimals_at_most() {
        assert_eq!(validate_amount("12.5"), Ok(12.5));
        assert_eq!(validate_amount("0.01"), Ok(0.01));
        assert!(validate_amount("0").is_err());
        assert!(validate_amount("-3").is_err());
        assert!(validate_amount("1.234").is_err());
        assert!(validate_amount("abc").is_err());
        assert!(validate_amount("").is_err());
    }

    #[test]
    fn balance_can_be_zero() {
        assert_eq!(validate_balance("0"), Ok(0.0));
        assert!(validate_balance("-0.01").is_err());
    }

    #[test]
    fn coefficient_must_be_positive_cents() {
        assert_eq!(validate_coefficient(41.23), Ok(41.23));
        assert!(validate_coefficient(0.0).is_err());
        assert!(validate_coefficient(1.005).is_err());
    }

    #[test]
    fn future_dates_are_rejected() {
        let today = date!(2025 - 01 - 15);

        assert!(validate_date(today, today).is_ok());
        assert!(validate_date(date!(2025 - 01 - 16), today).is_err());
    }

    #[test]
    fn login_rules() {
        for login in ["john", "john.doe", "j_doe_99", "abcdefghijklmnopqrst"] {
            assert!(validate_login(login).is_ok(), "{login} should be valid");
        }

        for login in ["abc", ".john", "john_", "jo..hn", "jo._hn", "jöhn", "a b c d"] {
            assert!(validate_login(login).is_err(), "{login} should be invalid");
        }
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("abc$/-_123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("has space").is_err());
        assert!(validate_password(&"a".repeat(51)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("ab.co").is_err());
        assert!(validate_email("a@@b.co").is_err());
        assert!(validate_email("a@bco").is_err());
    }
}
