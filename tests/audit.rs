use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use share_audit::{audit_json, AuditConfig, AuditError, AuditReport, Verdict};

fn run(doc: &str) -> AuditReport {
    audit_json(doc, AuditConfig::default()).unwrap()
}

fn error_rates(report: &AuditReport) -> Vec<(u32, u128, u128)> {
    report
        .share_stats
        .iter()
        .map(|s| (s.id, s.total, s.disagreeing))
        .collect()
}

const LINE: &str = r#"{
    "keys": {"n": 3, "k": 3},
    "1": {"base": "10", "value": "5"},
    "2": {"base": "10", "value": "8"},
    "3": {"base": "10", "value": "11"}
}"#;

const ONE_CORRUPTED_OF_FOUR: &str = r#"{
    "keys": {"n": 4, "k": 3},
    "1": {"base": "10", "value": "5"},
    "2": {"base": "10", "value": "8"},
    "3": {"base": "10", "value": "11"},
    "4": {"base": "10", "value": "999"}
}"#;

const ONE_CORRUPTED_OF_FIVE: &str = r#"{
    "keys": {"n": 5, "k": 3},
    "1": {"base": "10", "value": "5"},
    "2": {"base": "10", "value": "8"},
    "3": {"base": "10", "value": "11"},
    "4": {"base": "10", "value": "14"},
    "5": {"base": "16", "value": "3e7"}
}"#;

#[test]
fn single_combination_line() {
    let r = run(LINE);
    assert_eq!(r.total_combinations, 1);
    assert_eq!(r.majority_secret, BigInt::from(2));
    assert_eq!(r.majority_percentage, 100.0);
    assert_eq!(
        r.verdict,
        Verdict::NoShareIdentified {
            majority_secret: BigInt::from(2)
        }
    );
    assert!(r.share_stats.iter().all(|s| s.error_rate == 0.0));
}

#[test]
fn corrupted_fourth_share_is_flagged() {
    let r = run(ONE_CORRUPTED_OF_FOUR);
    assert_eq!(r.total_combinations, 4);
    // every combination reconstructs a different secret; the smallest wins the tie
    assert_eq!(r.distinct_secrets, 4);
    assert_eq!(r.majority_secret, BigInt::from(2));
    assert_eq!(r.majority_percentage, 25.0);
    let ranked: Vec<_> = r.ranking.iter().map(|f| f.secret.clone()).collect();
    assert_eq!(
        ranked,
        vec![
            BigInt::from(2),
            BigInt::from(330),
            BigInt::from(987),
            BigInt::from(2957)
        ]
    );

    assert_eq!(
        error_rates(&r),
        vec![(1, 3, 2), (2, 3, 2), (3, 3, 2), (4, 3, 3)]
    );
    assert_eq!(r.verdict.wrong_share(), Some(4));
    assert_eq!(r.wrong_share().unwrap().raw_value, "999");
}

#[test]
fn corrupted_share_among_five() {
    let r = run(ONE_CORRUPTED_OF_FIVE);
    assert_eq!(r.total_combinations, 10);
    assert_eq!(r.majority_secret, BigInt::from(2));
    assert_eq!(r.majority_count, 4);
    assert_eq!(r.majority_percentage, 40.0);
    assert_eq!(
        error_rates(&r),
        vec![(1, 6, 3), (2, 6, 3), (3, 6, 3), (4, 6, 3), (5, 6, 6)]
    );
    match &r.verdict {
        Verdict::WrongShare {
            share_id,
            error_rate,
            majority_secret,
        } => {
            assert_eq!(*share_id, 5);
            assert_eq!(*error_rate, 100.0);
            assert_eq!(majority_secret, &BigInt::from(2));
        }
        other => panic!("expected a wrong share, got {other:?}"),
    }
}

#[test]
fn higher_threshold_suppresses_verdict() {
    let config = AuditConfig {
        error_threshold_percent: 100.0,
        ..AuditConfig::default()
    };
    let r = audit_json(ONE_CORRUPTED_OF_FIVE, config).unwrap();
    assert_eq!(r.verdict.wrong_share(), None);
}

#[test]
fn mixed_bases_and_sparse_ids() {
    // f(x) = x^2 + 3
    let r = run(r#"{
        "keys": {"n": 4, "k": 3},
        "1": {"base": "10", "value": "4"},
        "2": {"base": "2", "value": "111"},
        "3": {"base": "10", "value": "12"},
        "6": {"base": "4", "value": "213"}
    }"#);
    assert_eq!(r.majority_secret, BigInt::from(3));
    assert_eq!(r.majority_percentage, 100.0);
    assert_eq!(r.distinct_secrets, 1);
    assert!(r.share_stats.iter().all(|s| s.disagreeing == 0 && s.total == 3));
    assert_eq!(r.verdict.wrong_share(), None);
}

#[test]
fn frequency_tie_picks_smaller_secret() {
    let r = run(r#"{
        "keys": {"n": 2, "k": 1},
        "1": {"base": "10", "value": "7"},
        "2": {"base": "10", "value": "3"}
    }"#);
    assert_eq!(r.majority_secret, BigInt::from(3));
    assert_eq!(r.verdict.wrong_share(), Some(1));
}

#[test]
fn k_equals_n_never_flags() {
    let r = run(r#"{
        "keys": {"n": 4, "k": 4},
        "1": {"base": "10", "value": "1"},
        "2": {"base": "10", "value": "100"},
        "3": {"base": "10", "value": "7"},
        "4": {"base": "10", "value": "123456"}
    }"#);
    assert_eq!(r.total_combinations, 1);
    assert_eq!(r.majority_percentage, 100.0);
    assert_eq!(r.verdict.wrong_share(), None);
}

#[test]
fn ranking_is_truncated() {
    let config = AuditConfig {
        ranking_limit: 2,
        ..AuditConfig::default()
    };
    let r = audit_json(ONE_CORRUPTED_OF_FOUR, config).unwrap();
    assert_eq!(r.ranking.len(), 2);
    assert_eq!(r.distinct_secrets, 4);
}

#[test]
fn reports_are_deterministic() {
    let sequential = AuditConfig {
        parallel: false,
        ..AuditConfig::default()
    };
    let a = audit_json(ONE_CORRUPTED_OF_FIVE, AuditConfig::default()).unwrap();
    let b = audit_json(ONE_CORRUPTED_OF_FIVE, AuditConfig::default()).unwrap();
    let c = audit_json(ONE_CORRUPTED_OF_FIVE, sequential).unwrap();
    assert_eq!(a.to_string(), b.to_string());
    assert_eq!(a.to_string(), c.to_string());
    assert_eq!(a.to_json().unwrap(), c.to_json().unwrap());
}

#[test]
fn key_order_does_not_matter() {
    let reordered = r#"{
        "4": {"base": "10", "value": "999"},
        "2": {"base": "10", "value": "8"},
        "keys": {"n": 4, "k": 3},
        "3": {"base": "10", "value": "11"},
        "1": {"base": "10", "value": "5"}
    }"#;
    assert_eq!(run(reordered).to_string(), run(ONE_CORRUPTED_OF_FOUR).to_string());
}

#[test]
fn combination_limit_is_enforced() {
    let config = AuditConfig {
        max_combinations: Some(3),
        ..AuditConfig::default()
    };
    assert_eq!(
        audit_json(ONE_CORRUPTED_OF_FOUR, config).unwrap_err(),
        AuditError::TooManyCombinations { n: 4, k: 3, limit: 3 }
    );
}

#[test]
fn invalid_threshold_is_fatal() {
    let err = audit_json(
        r#"{"keys": {"n": 2, "k": 0},
            "1": {"base": "10", "value": "7"},
            "2": {"base": "10", "value": "3"}}"#,
        AuditConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, AuditError::InvalidThreshold { n: 2, k: 0 });
}
