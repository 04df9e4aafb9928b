pub mod schema;

use crate::error::{ButtonError, Result};
use crate::http::PRESS_PATHS;
use schema::AppConfig;
use std::collections::HashSet;
use std::path::Path;

/// Load and parse configuration from a TOML file.
///
/// # Errors
/// Returns `ButtonError::ConfigNotFound` if the file doesn't exist,
/// `ButtonError::Io` on read errors, `ButtonError::TomlParse` on syntax errors
/// or missing required fields, or `ButtonError::Config` on validation failures.
pub fn load(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(ButtonError::ConfigNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

/// Parse and validate configuration text.
///
/// # Errors
/// Same as [`load`], minus the file errors.
pub fn parse(content: &str) -> Result<AppConfig> {
    let content = expand_env_vars(content);
    let config: AppConfig = toml::from_str(&content)?;

    validate(&config)?;
    Ok(config)
}

/// Expand `${VAR}` and `$VAR` patterns in the config string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' {
            if chars.peek() == Some(&'{') {
                chars.next(); // consume '{'
                let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                if let Ok(val) = std::env::var(&var_name) {
                    result.push_str(&val);
                } else {
                    // Keep original if env var not found
                    use std::fmt::Write;
                    let _ = write!(result, "${{{var_name}}}");
                }
            } else {
                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    var_name.push(c);
                    chars.next();
                }
                if var_name.is_empty() {
                    result.push('$');
                } else if let Ok(val) = std::env::var(&var_name) {
                    result.push_str(&val);
                } else {
                    result.push('$');
                    result.push_str(&var_name);
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Validate config constraints.
fn validate(config: &AppConfig) -> Result<()> {
    let spotify = &config.spotify;
    if spotify.client_id.is_empty() || spotify.client_secret.is_empty() {
        return Err(ButtonError::Config(
            "spotify client_id and client_secret must be set".to_string(),
        ));
    }
    let callback = spotify.callback_path();
    if callback == "/" {
        return Err(ButtonError::Config(format!(
            "redirect_uri '{}' must end in a path segment",
            spotify.redirect_uri
        )));
    }
    if callback[1..].contains([':', '*', '{', '}', '?', '#']) {
        return Err(ButtonError::Config(format!(
            "redirect_uri path {callback} must be a plain segment"
        )));
    }
    if PRESS_PATHS.contains(&callback.as_str()) {
        return Err(ButtonError::Config(format!(
            "redirect_uri path {callback} clashes with a button route"
        )));
    }

    let pins = config.gpio.pins();
    let distinct: HashSet<u8> = pins.iter().copied().collect();
    if distinct.len() != pins.len() {
        return Err(ButtonError::Config(format!(
            "gpio pins must be distinct, got {pins:?}"
        )));
    }

    let timing = &config.timing;
    if timing.debounce_us == 0 {
        return Err(ButtonError::Config("debounce_us must be > 0".to_string()));
    }
    if timing.short_period_ms == 0 {
        return Err(ButtonError::Config("short_period_ms must be > 0".to_string()));
    }
    if timing.long_period() < timing.short_period() {
        return Err(ButtonError::Config(
            "long_period_secs must not be shorter than short_period_ms".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
[spotify]
client_id = "id"
client_secret = "secret"
redirect_uri = "http://raspberrypi.local:8080/callback"

[http]
port = 8080

[notify]
host = "127.0.0.1"
port = 9999
"#;

    #[test]
    fn env_var_expansion() {
        std::env::set_var("BUTTOND_TEST_VAR", "hello");
        let result = expand_env_vars("secret = \"${BUTTOND_TEST_VAR}/x\"");
        assert_eq!(result, "secret = \"hello/x\"");
        std::env::remove_var("BUTTOND_TEST_VAR");
    }

    #[test]
    fn bare_env_var_keeps_trailing_text() {
        std::env::set_var("BUTTOND_BARE_VAR", "abc");
        let result = expand_env_vars("id = \"$BUTTOND_BARE_VAR\"");
        assert_eq!(result, "id = \"abc\"");
        std::env::remove_var("BUTTOND_BARE_VAR");
    }

    #[test]
    fn env_var_missing_kept() {
        let result = expand_env_vars("id = \"${BUTTOND_NONEXISTENT}\"");
        assert_eq!(result, "id = \"${BUTTOND_NONEXISTENT}\"");
    }

    #[test]
    fn valid_config_parses() {
        let config = parse(BASE).unwrap();
        assert_eq!(config.spotify.client_id, "id");
    }

    #[test]
    fn duplicate_pins_rejected() {
        let text = format!("{BASE}\n[gpio]\nred_button = 25\n");
        assert!(matches!(parse(&text), Err(ButtonError::Config(_))));
    }

    #[test]
    fn redirect_without_segment_rejected() {
        let text = BASE.replace("/callback\"", "/\"");
        assert!(matches!(parse(&text), Err(ButtonError::Config(_))));
    }

    #[test]
    fn redirect_onto_button_route_rejected() {
        let text = BASE.replace("/callback\"", "/red\"");
        assert!(matches!(parse(&text), Err(ButtonError::Config(_))));
    }

    #[test]
    fn redirect_with_route_syntax_rejected() {
        for segment in [":code", "*rest", "{code}", "callback?x=1", "callback#top"] {
            let text = BASE.replace("/callback\"", &format!("/{segment}\""));
            assert!(
                matches!(parse(&text), Err(ButtonError::Config(_))),
                "{segment}"
            );
        }
    }

    #[test]
    fn long_period_shorter_than_short_rejected() {
        let text = format!("{BASE}\n[timing]\nshort_period_ms = 5000\nlong_period_secs = 1\n");
        assert!(matches!(parse(&text), Err(ButtonError::Config(_))));
    }

    #[test]
    fn missing_file_reported() {
        let err = load(Path::new("/nonexistent/buttond.toml")).unwrap_err();
        assert!(matches!(err, ButtonError::ConfigNotFound(_)));
    }

    #[test]
    fn load_example_config() {
        let dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
        let path = std::path::PathBuf::from(dir).join("config.example.toml");
        if path.exists() {
            let config = load(&path).unwrap();
            assert_eq!(config.spotify.callback_path(), "/callback");
        }
    }
}
