//! Permissive line parser for the vault configuration format.
//!
//! The format is a restricted TOML-like subset:
//! - blank lines and `#` comments are ignored
//! - `[name]` or `[name.subname]` opens a section (one nesting level, split
//!   on the first dot so dotted source names survive)
//! - `key = value` assigns inside the current section
//! - values are typed by precedence: quoted string, `true`/`false`, inline
//!   `[a, b]` list, number, raw string
//!
//! Parsing never fails: unparseable lines are skipped and unknown structure
//! is retained, so a hand-edited config with a typo still yields every
//! mapping that does parse.

use super::model::Config;
use super::types::{ConfigValue, Direction, LinkMode, SyncOverride, SyncSettings};

/// Parse configuration text into a best-effort Config.
pub fn parse(text: &str) -> Config {
    let mut config = Config::default();
    let mut section: Option<String> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = parse_section_header(line) {
            section = Some(name);
            continue;
        }

        let Some((key, value)) = parse_key_value(line) else {
            // Unparseable line: skip, keep going.
            continue;
        };

        match section.as_deref() {
            Some("paths") => config.upsert_path(key, value.into_targets()),
            Some("sync") => apply_sync_key(&mut config.sync, key, value),
            Some(name) => match name.split_once('.') {
                Some(("sync", source)) => {
                    let entry = config.sync.overrides.entry(source.to_string()).or_default();
                    apply_override_key(entry, key, value);
                }
                Some((outer, inner)) => {
                    config
                        .section_mut(outer)
                        .subsections
                        .entry(inner.to_string())
                        .or_default()
                        .insert(key.to_string(), value);
                }
                None => {
                    config
                        .section_mut(name)
                        .values
                        .insert(key.to_string(), value);
                }
            },
            // Key-value lines before any section header have no home.
            None => {}
        }
    }

    config
}

/// Parse `[name]` / `[name.subname]`; returns the inner name.
fn parse_section_header(line: &str) -> Option<String> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let inner = inner.trim();
    if inner.is_empty() || inner.contains('[') || inner.contains(']') {
        return None;
    }
    Some(inner.to_string())
}

/// Parse `key = value`; the key is any non-empty whitespace-free token.
fn parse_key_value(line: &str) -> Option<(&str, ConfigValue)> {
    let (key, raw_value) = line.split_once('=')?;
    let key = key.trim();
    let raw_value = raw_value.trim();

    if key.is_empty() || key.contains(char::is_whitespace) || raw_value.is_empty() {
        return None;
    }

    Some((key, parse_value(raw_value)))
}

/// Type a raw value by the fixed precedence.
fn parse_value(raw: &str) -> ConfigValue {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return ConfigValue::Str(raw[1..raw.len() - 1].to_string());
    }

    if raw == "true" {
        return ConfigValue::Bool(true);
    }
    if raw == "false" {
        return ConfigValue::Bool(false);
    }

    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        let items = inner
            .split(',')
            .map(|item| item.trim().trim_matches('"').to_string())
            .filter(|item| !item.is_empty())
            .collect();
        return ConfigValue::List(items);
    }

    if let Ok(n) = raw.parse::<f64>() {
        return ConfigValue::Number(n);
    }

    ConfigValue::Str(raw.to_string())
}

/// Route a recognized `[sync]` key into its typed field; everything else is
/// retained in `extra`.
fn apply_sync_key(sync: &mut SyncSettings, key: &str, value: ConfigValue) {
    match key {
        "link_mode" => {
            if let Some(mode) = value.as_str().and_then(LinkMode::from_str) {
                sync.link_mode = Some(mode);
                return;
            }
        }
        "provider" => {
            if let Some(provider) = value.as_str() {
                sync.provider = Some(provider.to_string());
                return;
            }
        }
        "direction" => {
            if let Some(direction) = value.as_str().and_then(Direction::from_str) {
                sync.direction = Some(direction);
                return;
            }
        }
        "exclude" => {
            if let Some(patterns) = value.as_list() {
                sync.exclude = patterns.to_vec();
                return;
            }
        }
        "dry_run" => {
            if let Some(flag) = value.as_bool() {
                sync.dry_run = flag;
                return;
            }
        }
        "tool_command" => {
            if let Some(command) = value.as_str() {
                sync.tool_command = Some(command.to_string());
                return;
            }
        }
        _ => {}
    }
    sync.extra.insert(key.to_string(), value);
}

/// Same routing for a `[sync.<source>]` override block.
fn apply_override_key(over: &mut SyncOverride, key: &str, value: ConfigValue) {
    match key {
        "link_mode" => {
            if let Some(mode) = value.as_str().and_then(LinkMode::from_str) {
                over.link_mode = Some(mode);
                return;
            }
        }
        "provider" => {
            if let Some(provider) = value.as_str() {
                over.provider = Some(provider.to_string());
                return;
            }
        }
        "direction" => {
            if let Some(direction) = value.as_str().and_then(Direction::from_str) {
                over.direction = Some(direction);
                return;
            }
        }
        "exclude" => {
            if let Some(patterns) = value.as_list() {
                over.exclude = Some(patterns.to_vec());
                return;
            }
        }
        "dry_run" => {
            if let Some(flag) = value.as_bool() {
                over.dry_run = Some(flag);
                return;
            }
        }
        "tool_command" => {
            if let Some(command) = value.as_str() {
                over.tool_command = Some(command.to_string());
                return;
            }
        }
        _ => {}
    }
    over.extra.insert(key.to_string(), value);
}
