//! Deciding how a saved history is restored.

use crate::error::SessionError;
use crate::meta::is_meta_command;
use core_types::HistoryEntry;

/// One step of a recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Run the submission again, producing fresh output
    Reexecute(String),
    /// Append the entries as they were
    Replay(Vec<HistoryEntry>),
}

/// Splits `history` into recovery steps.
///
/// An input block is the input plus everything up to the next input or
/// recovered mark. A block is re-executed unless it failed, was cancelled,
/// or is a meta-command; those are replayed as recorded. Entries outside any
/// block are replayed.
///
/// # Examples
///
/// ```
/// use core_types::{HistoryEntry, OutputVariant};
/// use orchestrator::{plan_recovery, RecoveryStep};
///
/// let history = vec![
///     HistoryEntry::input("1+1"),
///     HistoryEntry::output(OutputVariant::Info, "2"),
///     HistoryEntry::input(":type Foo"),
///     HistoryEntry::output(OutputVariant::Info, "Foo: class Foo"),
/// ];
///
/// assert_eq!(
///     plan_recovery(&history),
///     vec![
///         RecoveryStep::Reexecute("1+1".to_string()),
///         RecoveryStep::Replay(history[2..].to_vec()),
///     ]
/// );
/// ```
pub fn plan_recovery(history: &[HistoryEntry]) -> Vec<RecoveryStep> {
    let mut steps = Vec::new();
    let mut i = 0;
    while i < history.len() {
        let HistoryEntry::Input { code } = &history[i] else {
            push_replay(&mut steps, history[i].clone());
            i += 1;
            continue;
        };

        let end = history[i + 1..]
            .iter()
            .position(|entry| matches!(entry, HistoryEntry::Input { .. } | HistoryEntry::RecoveredMark))
            .map_or(history.len(), |offset| i + 1 + offset);
        let trailing = &history[i + 1..end];
        let failed = trailing
            .iter()
            .any(|entry| matches!(entry, HistoryEntry::Error { .. }) || entry.is_cancellation());

        if failed || is_meta_command(code) {
            steps.push(RecoveryStep::Replay(history[i..end].to_vec()));
        } else {
            steps.push(RecoveryStep::Reexecute(code.clone()));
        }
        i = end;
    }
    steps
}

fn push_replay(steps: &mut Vec<RecoveryStep>, entry: HistoryEntry) {
    match steps.last_mut() {
        Some(RecoveryStep::Replay(entries)) if !matches!(entries.first(), Some(HistoryEntry::Input { .. })) => {
            entries.push(entry)
        }
        _ => steps.push(RecoveryStep::Replay(vec![entry])),
    }
}

/// Reads a history saved as a JSON array of entries.
pub fn parse_history(json: &str) -> Result<Vec<HistoryEntry>, SessionError> {
    Ok(serde_json::from_str(json)?)
}
