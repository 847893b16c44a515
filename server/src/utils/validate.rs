use crate::utils::error::{AppError, AppResult};

/// Trims `value` and rejects it when nothing is left.
pub fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::ValidationError(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Rejects addresses that cannot possibly be delivered to.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

pub fn email(value: &str, field: &str) -> AppResult<String> {
    let value = required(value, field)?;
    if !is_plausible_email(&value) {
        return Err(AppError::ValidationError(format!(
            "{field} is not a valid email address"
        )));
    }
    Ok(value)
}
