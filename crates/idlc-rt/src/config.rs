use std::env;

/// Environment variable name for a config field, e.g. `("idlc", "maxDepth")`
/// becomes `IDLC_MAX_DEPTH`.
pub fn env_key(config: &str, field: &str) -> String {
    format!("{}_{}", to_env_key(config), to_env_key(field))
}

pub fn env_value(config: &str, field: &str) -> Option<String> {
    env::var(env_key(config, field))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn to_env_key(name: &str) -> String {
    let mut out = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
        prev_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
    }
    out
}
