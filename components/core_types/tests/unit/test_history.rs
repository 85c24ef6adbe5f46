//! Unit tests for history entries and sinks

use core_types::{
    ErrorInfo, HistoryEntry, HistorySink, MemoryHistory, OutputVariant, EXECUTION_CANCELLED,
};

#[cfg(test)]
mod history_entry_serde_tests {
    use super::*;

    #[test]
    fn test_input_json_shape() {
        let json = serde_json::to_string(&HistoryEntry::input("1+1")).unwrap();
        assert_eq!(json, r#"{"type":"input","code":"1+1"}"#);
    }

    #[test]
    fn test_error_json_shape() {
        let entry = HistoryEntry::error(&ErrorInfo::new("TypeError", "nope"));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"type":"error","name":"TypeError","message":"nope"}"#);
    }

    #[test]
    fn test_recovered_mark_json_shape() {
        let json = serde_json::to_string(&HistoryEntry::RecoveredMark).unwrap();
        assert_eq!(json, r#"{"type":"recoveredMark"}"#);
    }

    #[test]
    fn test_parse_history_file() {
        let text = r#"[
            {"type":"input","code":"const a = 1"},
            {"type":"input","code":"a + 1"},
            {"type":"output","variant":"info","text":"2"},
            {"type":"output","variant":"warn","text":"careful"}
        ]"#;
        let entries: Vec<HistoryEntry> = serde_json::from_str(text).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0], HistoryEntry::input("const a = 1"));
        assert_eq!(entries[3], HistoryEntry::output(OutputVariant::Warn, "careful"));
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let result: Result<HistoryEntry, _> =
            serde_json::from_str(r#"{"type":"output","variant":"debug","text":"x"}"#);
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod memory_history_tests {
    use super::*;

    #[test]
    fn test_provided_methods_append_entries() {
        let history = MemoryHistory::new();
        history.append_input("x");
        history.append_output(OutputVariant::Error, "bad");
        history.append_error(&ErrorInfo::new("Error", "e"));
        history.append(HistoryEntry::RecoveredMark);

        let entries = history.entries();
        assert_eq!(entries.len(), 4);
        assert!(matches!(entries[1], HistoryEntry::Output { variant: OutputVariant::Error, .. }));
        assert_eq!(entries[3], HistoryEntry::RecoveredMark);
    }

    #[test]
    fn test_take_empties_history() {
        let history = MemoryHistory::new();
        history.append_output(OutputVariant::Info, EXECUTION_CANCELLED);
        let taken = history.take();
        assert_eq!(taken.len(), 1);
        assert!(taken[0].is_cancellation());
        assert!(history.is_empty());
    }

    #[test]
    fn test_sink_is_object_safe_and_shareable() {
        let history = MemoryHistory::new();
        let sink: std::sync::Arc<dyn HistorySink> = std::sync::Arc::new(history.clone());
        let handle = std::thread::spawn(move || sink.append_input("from thread"));
        handle.join().unwrap();
        assert_eq!(history.entries(), vec![HistoryEntry::input("from thread")]);
    }
}
