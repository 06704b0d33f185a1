mod support;

use pesascore_client::commands::score::{
    ScoreComputeOptions, ScoreHistoryOptions, compute_with_options, history_with_options,
};

use support::{envelope_json, temp_home, write_file};

const STRONG_PROFILE: &str = r#"{
    "monthly_income": 150000,
    "average_balance": 120000,
    "transaction_frequency": 60,
    "overdraft_count": 0,
    "payment_history_score": 98,
    "income_consistency": 0.95
}"#;

const WEAK_PROFILE: &str = r#"{
    "monthly_income": 20000,
    "average_balance": 300,
    "transaction_frequency": 2,
    "overdraft_count": 7,
    "payment_history_score": 10,
    "income_consistency": 0.1
}"#;

#[test]
fn compute_appends_and_history_lists_newest_first() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp_dir, home)) = temp {
        let weak_path = temp_dir.path().join("weak.json");
        let strong_path = temp_dir.path().join("strong.json");
        write_file(&weak_path, WEAK_PROFILE);
        write_file(&strong_path, STRONG_PROFILE);

        let first = compute_with_options(ScoreComputeOptions {
            subject_ref: "amina".to_string(),
            profile_path: weak_path.display().to_string(),
            home_override: Some(&home),
        });
        assert!(first.is_ok());
        if let Ok(envelope) = first {
            assert_eq!(envelope.command, "score compute");
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["stored"]["score"], 500);
            assert_eq!(value["data"]["stored"]["rating"], "Poor");
            assert_eq!(value["data"]["stored"]["sequence"], 1);
            assert_eq!(value["data"]["stored"]["factors"]["overdraft_penalty"], -50);
            assert_eq!(
                value["data"]["stored"]["improvement_tips"]
                    .as_array()
                    .map(Vec::len),
                Some(6)
            );
        }

        let second = compute_with_options(ScoreComputeOptions {
            subject_ref: "amina".to_string(),
            profile_path: strong_path.display().to_string(),
            home_override: Some(&home),
        });
        assert!(second.is_ok());

        let history = history_with_options(ScoreHistoryOptions {
            subject_ref: "amina".to_string(),
            home_override: Some(&home),
        });
        assert!(history.is_ok());
        if let Ok(envelope) = history {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["current"]["score"], 900);
            assert_eq!(value["data"]["current"]["rating"], "Excellent");
            assert_eq!(value["data"]["history"][0]["sequence"], 2);
            assert_eq!(value["data"]["history"][1]["sequence"], 1);
            assert_eq!(value["data"]["history"].as_array().map(Vec::len), Some(2));
        }
    }
}

#[test]
fn histories_are_kept_per_subject() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp_dir, home)) = temp {
        let profile_path = temp_dir.path().join("strong.json");
        write_file(&profile_path, STRONG_PROFILE);

        let computed = compute_with_options(ScoreComputeOptions {
            subject_ref: "amina".to_string(),
            profile_path: profile_path.display().to_string(),
            home_override: Some(&home),
        });
        assert!(computed.is_ok());

        let other = history_with_options(ScoreHistoryOptions {
            subject_ref: "baraka".to_string(),
            home_override: Some(&home),
        });
        assert!(other.is_ok());
        if let Ok(envelope) = other {
            let value = envelope_json(&envelope);
            assert!(value["data"]["current"].is_null());
            assert_eq!(value["data"]["history"].as_array().map(Vec::len), Some(0));
        }
    }
}

#[test]
fn invalid_profiles_are_rejected_without_recording() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp_dir, home)) = temp {
        let out_of_range = temp_dir.path().join("out-of-range.json");
        write_file(
            &out_of_range,
            &STRONG_PROFILE.replace("\"payment_history_score\": 98", "\"payment_history_score\": 180"),
        );
        let rejected = compute_with_options(ScoreComputeOptions {
            subject_ref: "amina".to_string(),
            profile_path: out_of_range.display().to_string(),
            home_override: Some(&home),
        });
        assert!(rejected.is_err());
        if let Err(error) = rejected {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("payment_history_score"));
        }

        let malformed = temp_dir.path().join("malformed.json");
        write_file(&malformed, "{\"monthly_income\": \"lots\"}");
        let unreadable = compute_with_options(ScoreComputeOptions {
            subject_ref: "amina".to_string(),
            profile_path: malformed.display().to_string(),
            home_override: Some(&home),
        });
        assert!(unreadable.is_err());
        if let Err(error) = unreadable {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.data.is_some());
        }

        let history = history_with_options(ScoreHistoryOptions {
            subject_ref: "amina".to_string(),
            home_override: Some(&home),
        });
        assert!(history.is_ok());
        if let Ok(envelope) = history {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["history"].as_array().map(Vec::len), Some(0));
        }
    }
}

#[test]
fn blank_subject_is_rejected() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let result = history_with_options(ScoreHistoryOptions {
            subject_ref: "   ".to_string(),
            home_override: Some(&home),
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
        }
    }
}
