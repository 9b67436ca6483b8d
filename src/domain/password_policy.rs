const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// Whether a password meets the UA account requirements: 8-128 characters
/// with at least one lowercase letter, one uppercase letter and one digit.
pub fn meets_ua_requirements(password: &str) -> bool {
    let len = password.chars().count();

    (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && password.chars().any(|ch| ch.is_lowercase())
        && password.chars().any(|ch| ch.is_uppercase())
        && password.chars().any(|ch| ch.is_ascii_digit())
}
