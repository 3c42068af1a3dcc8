//! `key: value` line format used by urlencoded bodies
//!
//! One entry per line. A leading `#` marks the entry inactive. Lines without a
//! `:` are treated as a key with an empty value; blank lines are skipped.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyValueEntry {
    pub key: String,
    pub value: String,
    pub active: bool,
}

pub fn parse_raw_key_value(text: &str) -> Vec<RawKeyValueEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (active, line) = match line.strip_prefix('#') {
                Some(rest) => (false, rest.trim_start()),
                None => (true, line),
            };
            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            RawKeyValueEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
                active,
            }
        })
        .collect()
}

pub fn raw_key_value_to_string(entries: &[RawKeyValueEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let prefix = if entry.active { "" } else { "#" };
            format!("{}{}: {}", prefix, entry.key, entry.value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
