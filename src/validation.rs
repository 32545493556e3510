//! Account-field validation.
//!
//! Password checks accumulate every unmet rule so a client can render a
//! complete checklist; email and username checks stop at the first failure
//! since they are single-dimension.

const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Validate a password against the account rules. Returns every unmet rule
/// at once; an absent or empty password short-circuits to the single
/// "required" error.
pub fn validate_password(password: Option<&str>) -> Result<(), Vec<String>> {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Err(vec!["Password is required".to_string()]);
    };

    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Use 8 or more characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("One Uppercase character".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("One lowercase character".to_string());
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        errors.push("One special character".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("One number".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate an email address: some non-space, non-@ characters, an `@`,
/// more of the same, a dot, more of the same. Deliberately permissive.
pub fn validate_email(email: Option<&str>) -> Result<(), String> {
    let Some(email) = email.filter(|e| !e.is_empty()) else {
        return Err("Email is required".to_string());
    };

    if !is_valid_email(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    // The domain side needs a dot with at least one character on each side.
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate a username: 3-30 characters from `[A-Za-z0-9_]`.
pub fn validate_username(username: Option<&str>) -> Result<(), String> {
    let Some(username) = username.filter(|u| !u.is_empty()) else {
        return Err("Username is required".to_string());
    };

    let length = username.chars().count();
    if length < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    if length > 30 {
        return Err("Username must be less than 30 characters".to_string());
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}
