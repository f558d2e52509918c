//! CLI output formatting tests.
//!
//! These tests verify that CLI output is correctly formatted for both
//! text and JSON output modes.

#[cfg(test)]
mod text_formatter_tests {
    use super::super::text::TextFormatter;
    use wwpoints_core::{AccountId, PointsSnapshot, PollResult, Region};
    use wwpoints_store::AccountState;

    fn id() -> AccountId {
        AccountId::new(Region::Us, "jane@example.com")
    }

    #[test]
    fn test_progress_bar_boundary_values() {
        let formatter = TextFormatter::new(false);

        let test_cases = vec![
            (0.0, "░░░░░░░░░░"),
            (10.0, "█░░░░░░░░░"),
            (25.0, "███░░░░░░░"), // 2.5 rounds to 3 blocks
            (50.0, "█████░░░░░"),
            (100.0, "██████████"),
        ];

        for (percent, expected) in test_cases {
            let bar = formatter.progress_bar(percent);
            assert_eq!(bar, expected, "Failed for {percent}%");
        }
    }

    #[test]
    fn test_progress_bar_with_colors() {
        let formatter = TextFormatter::new(true);

        assert!(formatter.progress_bar(10.0).contains("\x1b[31m"), "Should be red for <20%");
        assert!(formatter.progress_bar(40.0).contains("\x1b[33m"), "Should be yellow for <50%");
        assert!(formatter.progress_bar(80.0).contains("\x1b[32m"), "Should be green for >=50%");
    }

    #[test]
    fn test_format_snapshot_lists_all_metrics() {
        let formatter = TextFormatter::new(false);
        let snapshot = PointsSnapshot::new(12.0, 11.5, 3.0, 30.0);

        let output = formatter.format_snapshot(&id(), &snapshot);

        assert!(output.contains("WeightWatchers (US:jane@example.com)"));
        assert!(output.contains("12 pt"));
        assert!(output.contains("11.5 pt"));
        assert!(output.contains("30 pt"));
        // 12 of 23.5 daily points left
        assert!(output.contains("51% left"));
    }

    #[test]
    fn test_format_result_failure() {
        let formatter = TextFormatter::new(false);
        let result = PollResult::AuthFailure("Authentication failed: bad password".into());

        let output = formatter.format_result(&id(), &result);

        assert!(output.contains("Authentication failure"));
        assert!(output.contains("bad password"));
    }

    #[test]
    fn test_format_state_stale_keeps_values() {
        let formatter = TextFormatter::new(false);
        let mut state = AccountState::default();
        state.apply(PollResult::Success(PointsSnapshot::new(5.0, 18.0, 0.0, 21.0)));
        state.apply(PollResult::TransientFailure("Request timed out".into()));

        let output = formatter.format_state(&id(), &state);

        assert!(output.contains("5 pt"));
        assert!(output.contains("Stale"));
        assert!(output.contains("Request timed out"));
    }

    #[test]
    fn test_format_state_needs_reauth_hides_values() {
        let formatter = TextFormatter::new(false);
        let mut state = AccountState::default();
        state.apply(PollResult::Success(PointsSnapshot::new(5.0, 18.0, 0.0, 21.0)));
        state.apply(PollResult::AuthFailure("rejected".into()));

        let output = formatter.format_state(&id(), &state);

        assert!(!output.contains("5 pt"));
        assert!(output.contains("No data"));
        assert!(output.contains("Needs reauthentication"));
    }

    #[test]
    fn test_format_regions_table() {
        let formatter = TextFormatter::new(false);
        let output = formatter.format_regions();

        assert!(output.starts_with("Code"));
        assert!(output.contains("US     weightwatchers.com"));
        assert_eq!(output.lines().count(), Region::all().len() + 1);
    }

    #[test]
    fn test_format_check() {
        let formatter = TextFormatter::new(false);

        assert!(formatter.format_check(&id(), "ok", None).contains("✓ ok"));
        let failed = formatter.format_check(&id(), "invalid_auth", Some("bad password"));
        assert!(failed.contains("✗ invalid_auth"));
        assert!(failed.contains("bad password"));
    }
}

#[cfg(test)]
mod json_formatter_tests {
    use super::super::json::JsonFormatter;
    use wwpoints_core::{AccountId, PointsSnapshot, PollResult, Region};

    #[test]
    fn test_format_compact_json() {
        let formatter = JsonFormatter::new(false);

        let data = serde_json::json!({"key": "value"});
        let output = formatter.format(&data).unwrap();

        assert_eq!(output, r#"{"key":"value"}"#);
    }

    #[test]
    fn test_cycle_outputs_as_array() {
        let formatter = JsonFormatter::new(true);
        let id = AccountId::new(Region::Uk, "sam");

        let outputs = vec![
            formatter.cycle_output(
                &id,
                &PollResult::Success(PointsSnapshot::new(1.0, 2.0, 3.0, 4.0)),
            ),
            formatter.config_error_output(&id, "No password for UK:sam"),
        ];
        let output = formatter.format(&outputs).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["points"]["weeklyPointsRemaining"], 4.0);
        assert_eq!(items[1]["status"], "config_error");
        assert!(items[1].get("points").is_none());
    }
}
