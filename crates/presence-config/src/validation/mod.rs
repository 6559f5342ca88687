//! Configuration validation.
//!
//! Checks the limits the presence service enforces on activity payloads
//! and the timing values the session relies on. All errors are collected.

use presence_common::ConfigError;

use crate::schema::{ActivityConfig, PresenceConfig};


pub const MAX_TEXT_LEN: usize = 128;
pub const MAX_BUTTONS: usize = 2;
pub const MAX_BUTTON_LABEL_LEN: usize = 32;
pub const MAX_BUTTON_URL_LEN: usize = 512;
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PresenceConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let id = &config.client.client_id;
    if id.is_empty() || id.len() > 20 || !id.chars().all(|c| c.is_ascii_digit()) {
        errors.push(format!("client.client_id must be a numeric id, got '{id}'"));
    }

    if config.session.refresh_interval_ms < MIN_REFRESH_INTERVAL_MS {
        errors.push(format!(
            "session.refresh_interval_ms must be at least {MIN_REFRESH_INTERVAL_MS}, got {}",
            config.session.refresh_interval_ms
        ));
    }
    if config.session.backoff_step_ms == 0 {
        errors.push("session.backoff_step_ms must be greater than 0".into());
    }
    if config.session.backoff_cap_ms < config.session.backoff_step_ms {
        errors.push(format!(
            "session.backoff_cap_ms ({}) must not be below backoff_step_ms ({})",
            config.session.backoff_cap_ms, config.session.backoff_step_ms
        ));
    }

    validate_activity(&mut errors, &config.activity);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_activity(errors: &mut Vec<String>, activity: &ActivityConfig) {
    validate_len(errors, "activity.details", &activity.details, MAX_TEXT_LEN);
    validate_len(errors, "activity.state", &activity.state, MAX_TEXT_LEN);
    validate_len(errors, "activity.large_image_key", &activity.large_image_key, MAX_TEXT_LEN);
    validate_len(errors, "activity.large_image_text", &activity.large_image_text, MAX_TEXT_LEN);
    validate_len(errors, "activity.small_image_key", &activity.small_image_key, MAX_TEXT_LEN);
    validate_len(errors, "activity.small_image_text", &activity.small_image_text, MAX_TEXT_LEN);

    if activity.buttons.len() > MAX_BUTTONS {
        errors.push(format!(
            "activity.buttons: at most {MAX_BUTTONS} allowed, got {}",
            activity.buttons.len()
        ));
    }

    for (i, button) in activity.buttons.iter().enumerate() {
        let label_len = button.label.chars().count();
        if label_len == 0 || label_len > MAX_BUTTON_LABEL_LEN {
            errors.push(format!(
                "activity.buttons[{i}].label must be 1-{MAX_BUTTON_LABEL_LEN} characters"
            ));
        }
        if !(button.url.starts_with("https://") || button.url.starts_with("http://")) {
            errors.push(format!("activity.buttons[{i}].url must be an http(s) URL"));
        }
        validate_len(errors, "activity.buttons.url", &button.url, MAX_BUTTON_URL_LEN);
    }
}

fn validate_len(errors: &mut Vec<String>, name: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.push(format!("{name} must be at most {max} characters, got {len}"));
    }
}
