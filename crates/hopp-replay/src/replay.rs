//! Replay of recorded dispatch calls
//!
//! Input is one JSON object per line:
//!
//! ```text
//! {"store": "rest", "dispatcher": "setEndpoint", "payload": {"newEndpoint": "https://api.example.com"}}
//! {"store": "tabs", "dispatcher": "setActiveTab", "payload": {"id": "tab-0"}}
//! ```
//!
//! Calls go through [`Workspace::dispatch_named`], the same path imports use,
//! so REST edits reach the active tab. The first failing call aborts the
//! replay.

use std::io::BufRead;

use anyhow::{Context, Result};
use hopp_session::{StoreKind, Workspace};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct ReplayCall {
    store: String,
    dispatcher: String,
    #[serde(default)]
    payload: Value,
}

/// Apply every call read from `input`; returns how many were applied
pub fn replay(workspace: &mut Workspace, input: impl BufRead) -> Result<usize> {
    let mut applied = 0;
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let call: ReplayCall = serde_json::from_str(&line)
            .with_context(|| format!("Line {} is not a dispatch call", line_no))?;
        let store: StoreKind = call
            .store
            .parse()
            .with_context(|| format!("Line {}: unknown store {:?}", line_no, call.store))?;

        log::debug!("Replay line {}: {}.{}", line_no, store, call.dispatcher);
        workspace
            .dispatch_named(store, &call.dispatcher, call.payload)
            .with_context(|| format!("Line {}: {}.{} failed", line_no, store, call.dispatcher))?;
        applied += 1;
    }

    log::info!("Replayed {} call(s)", applied);
    Ok(applied)
}
