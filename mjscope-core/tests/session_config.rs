//! End-to-end session runs driven by JSON configs.

use mjscope_core::{
    AnalysisConfig, AnalysisReport, AnalysisSession, MjscopeError, StateDecoder, StateSnapshot,
    RECORD_LEN,
};

fn game(len: usize) -> Vec<Vec<i8>> {
    (0..len)
        .map(|i| {
            let mut r = vec![0i8; RECORD_LEN];
            r[2] = (i % 4) as i8;
            r[5] = 70 - i as i8;
            r[33] = i as i8;
            r[68 + i % 34] = 1;
            r[238 + (i % 4) * 34 + (i * 3) % 34] = 1;
            r[102 + (i % 4) * 34 + 27] = 3;
            r
        })
        .collect()
}

#[test]
fn missing_fields_take_defaults() {
    let config = AnalysisConfig::from_json_str(r#"{"num_threads": 2}"#).unwrap();
    assert_eq!(config.num_threads, Some(2));
    assert_eq!(config.max_records, Some(100));
    assert_eq!(config.top_discarded, 5);
    assert!(config.include_statistics);
}

#[test]
fn zero_top_k_is_invalid() {
    for json in [
        r#"{"top_discarded": 0}"#,
        r#"{"stats_top_discards": 0}"#,
        r#"{"contributor_cap": 0}"#,
    ] {
        assert!(
            matches!(
                AnalysisConfig::from_json_str(json),
                Err(MjscopeError::InvalidConfig { .. })
            ),
            "{json} should be rejected"
        );
    }
}

#[test]
fn default_cap_limits_large_batches() {
    let records = game(120);
    let session = AnalysisSession::new(&records, AnalysisConfig::default()).unwrap();
    assert_eq!(session.len(), 100);
    let report = session.report().unwrap();
    assert_eq!(report.snapshot_count, 100);
    assert_eq!(report.diffs.len(), 99);
}

#[test]
fn report_json_parses_back() {
    let config = AnalysisConfig::from_json_str(r#"{"max_records": null}"#).unwrap();
    let session = AnalysisSession::new(&game(12), config).unwrap();
    let report = session.report().unwrap();
    assert_eq!(report.pov_switches(), 11);

    let stats = report.statistics.as_ref().unwrap();
    assert_eq!(stats.total_games, 12);
    assert_eq!(stats.top_pon[0].label, "East");
    assert_eq!(stats.top_pon[0].occurrences, 12);

    let json = report.to_json_pretty().unwrap();
    let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.basic, report.basic);
    assert_eq!(parsed.diffs, report.diffs);
    assert_eq!(parsed.consolidated, report.consolidated);
    assert_eq!(parsed.statistics.map(|s| s.top_pon), Some(stats.top_pon.clone()));
}

#[test]
fn decode_failure_names_the_record() {
    let mut records = game(5);
    records[3].pop();
    match AnalysisSession::new(&records, AnalysisConfig::default()) {
        Err(MjscopeError::InvalidRecord { index: 3, .. }) => {}
        other => panic!("expected InvalidRecord at 3, got {other:?}"),
    }
}

/// Snapshots as a collaborator would hand them over: decoded, serialized,
/// and read back.
fn transported(records: &[Vec<i8>]) -> Vec<StateSnapshot> {
    let decoded = StateDecoder::decode_batch(records).unwrap();
    let json = serde_json::to_string(&decoded).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[test]
fn snapshot_sessions_apply_the_cap() {
    let snapshots = transported(&game(9));
    let config = AnalysisConfig::from_json_str(r#"{"max_records": 4}"#).unwrap();
    let session = AnalysisSession::from_snapshots(snapshots, config).unwrap();
    assert_eq!(session.len(), 4);
    assert_eq!(session.report().unwrap().diffs.len(), 3);
}

#[test]
fn snapshot_sessions_reject_empty_input() {
    assert!(matches!(
        AnalysisSession::from_snapshots(Vec::new(), AnalysisConfig::default()),
        Err(MjscopeError::EmptyInput)
    ));
    let zero_cap = AnalysisConfig::from_json_str(r#"{"max_records": 0}"#).unwrap();
    assert!(matches!(
        AnalysisSession::from_snapshots(transported(&game(3)), zero_cap),
        Err(MjscopeError::EmptyInput)
    ));
}

#[test]
fn malformed_transported_snapshot_is_skipped_in_report() {
    let snapshots = transported(&game(4));
    let mut value = serde_json::to_value(&snapshots).unwrap();
    // Snapshot 2: a meld tile type past the last tile, and a discard total
    // that disagrees with its entries.
    value[2]["melds"][0]["tiles"] = serde_json::json!([{ "tile_type": 40, "count": 3 }]);
    value[2]["melds"][0]["total"] = serde_json::json!(3);
    value[2]["discards"][2]["total"] = serde_json::json!(99);
    let tampered: Vec<StateSnapshot> = serde_json::from_value(value).unwrap();

    let session = AnalysisSession::from_snapshots(tampered, AnalysisConfig::default()).unwrap();
    let report = session.report().unwrap();
    assert_eq!(report.snapshot_count, 4);
    assert_eq!(report.diffs.len(), 3);

    let stats = report.statistics.unwrap();
    assert_eq!(stats.total_games, 4);
    assert_eq!(stats.skipped_sections, 2);
    // Snapshot 2 keeps its East pon: it sits in player 2's melds, which
    // stayed valid.
    assert_eq!(stats.top_pon[0].label, "East");
    assert_eq!(stats.top_pon[0].occurrences, 4);
    // Player 2's discards in snapshot 2 were dropped.
    assert_eq!(stats.total_discards, 3);
}
