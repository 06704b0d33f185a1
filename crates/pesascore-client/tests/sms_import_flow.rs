mod support;

use chrono::NaiveDate;
use pesascore_client::commands::account::{AccountSummaryOptions, summary_with_options};
use pesascore_client::commands::sms::{
    SmsImportOptions, SmsListOptions, import_with_options, list_with_options,
};
use rusqlite::Connection;
use rust_decimal::Decimal;

use support::{
    CHATTER_MESSAGE, DEMO_MESSAGES, decimal_field, envelope_json, json_messages, processed_at,
    temp_home, write_file,
};

fn query_count(connection: &Connection, sql: &str) -> i64 {
    connection
        .query_row(sql, [], |row| row.get::<_, i64>(0))
        .unwrap_or(-1)
}

#[test]
fn import_from_file_persists_parsed_transactions_and_reports_failures() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((temp_dir, home)) = temp {
        let source = temp_dir.path().join("messages.json");
        let mut messages = DEMO_MESSAGES.to_vec();
        messages.push(CHATTER_MESSAGE);
        write_file(&source, &json_messages(&messages));

        let result = import_with_options(SmsImportOptions {
            account_ref: "wallet-main".to_string(),
            phone_number: Some("254712345678".to_string()),
            path: Some(source.display().to_string()),
            home_override: Some(&home),
            stdin_override: None,
            processed_at: Some(processed_at()),
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            assert_eq!(envelope.command, "sms import");
            let value = envelope_json(&envelope);
            assert_eq!(value["ok"], true);
            assert_eq!(value["data"]["source_used"], "file:json_array");
            assert_eq!(value["data"]["summary"]["messages_read"], 6);
            assert_eq!(value["data"]["summary"]["parsed"], 5);
            assert_eq!(value["data"]["summary"]["failed"], 1);
            assert_eq!(value["data"]["summary"]["inserted"], 5);
            assert_eq!(value["data"]["summary"]["duplicates"], 0);
            assert_eq!(value["data"]["stats"]["high_confidence"], 5);
            assert_eq!(value["data"]["failures"][0]["original_text"], CHATTER_MESSAGE);
            assert!(
                value["data"]["import_id"]
                    .as_str()
                    .is_some_and(|id| id.starts_with("imp_"))
            );
            assert!(value["data"]["ledger"]["data_range"]["earliest"].is_string());

            let db_path = home.join("ledger.db");
            let connection = Connection::open(&db_path);
            assert!(connection.is_ok());
            if let Ok(conn) = connection {
                assert_eq!(
                    query_count(&conn, "SELECT COUNT(*) FROM internal_transactions"),
                    5
                );
                assert_eq!(query_count(&conn, "SELECT COUNT(*) FROM internal_import_runs"), 1);
                let phone = conn.query_row(
                    "SELECT phone_number FROM internal_accounts WHERE account_ref = 'wallet-main'",
                    [],
                    |row| row.get::<_, Option<String>>(0),
                );
                assert!(matches!(phone, Ok(Some(ref number)) if number == "254712345678"));
            }
        }
    }
}

#[test]
fn reimport_reports_existing_ledger_duplicates() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let body = json_messages(&DEMO_MESSAGES);
        let import = |stdin: String| {
            import_with_options(SmsImportOptions {
                account_ref: "wallet-main".to_string(),
                home_override: Some(&home),
                stdin_override: Some(stdin),
                processed_at: Some(processed_at()),
                ..SmsImportOptions::default()
            })
        };

        let first = import(body.clone());
        assert!(first.is_ok());

        let second = import(body);
        assert!(second.is_ok());
        if let Ok(envelope) = second {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["summary"]["inserted"], 0);
            assert_eq!(value["data"]["summary"]["duplicates"], 5);
            assert_eq!(value["data"]["duplicate_summary"]["existing_ledger"], 5);
            assert_eq!(value["data"]["duplicate_summary"]["batch"], 0);
            assert_eq!(
                value["data"]["duplicate_rows"][0]["dedupe_reason"],
                "existing_ledger"
            );
            assert!(value["data"]["duplicate_rows"][0]["matched_row_id"].is_string());
            assert_eq!(
                value["data"]["message"],
                "Import finished. Every parsed transaction was already stored."
            );
        }

        let connection = Connection::open(home.join("ledger.db"));
        assert!(connection.is_ok());
        if let Ok(conn) = connection {
            assert_eq!(
                query_count(&conn, "SELECT COUNT(*) FROM internal_transactions"),
                5
            );
            assert_eq!(query_count(&conn, "SELECT COUNT(*) FROM internal_import_runs"), 2);
        }
    }
}

#[test]
fn repeated_message_in_one_batch_is_a_batch_duplicate() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let body = json_messages(&[DEMO_MESSAGES[1], DEMO_MESSAGES[2], DEMO_MESSAGES[1]]);
        let result = import_with_options(SmsImportOptions {
            account_ref: "wallet-main".to_string(),
            home_override: Some(&home),
            stdin_override: Some(body),
            processed_at: Some(processed_at()),
            ..SmsImportOptions::default()
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["summary"]["inserted"], 2);
            assert_eq!(value["data"]["duplicate_summary"]["batch"], 1);
            assert_eq!(value["data"]["duplicate_rows"][0]["message_index"], 3);
            assert_eq!(value["data"]["duplicate_rows"][0]["matched_message_index"], 1);
            assert_eq!(value["data"]["duplicate_rows"][0]["dedupe_reason"], "batch");
        }
    }
}

#[test]
fn empty_input_is_rejected_before_touching_accounts() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let result = import_with_options(SmsImportOptions {
            account_ref: "wallet-main".to_string(),
            home_override: Some(&home),
            stdin_override: Some("[]".to_string()),
            ..SmsImportOptions::default()
        });
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, "invalid_argument");
            assert!(error.message.contains("no messages"));
        }

        let listed = list_with_options(SmsListOptions {
            account_ref: "wallet-main".to_string(),
            home_override: Some(&home),
            ..SmsListOptions::default()
        });
        assert!(listed.is_err());
        if let Err(error) = listed {
            assert_eq!(error.code, "account_not_found");
        }
    }
}

#[test]
fn list_returns_newest_first_and_honors_filters() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let imported = import_with_options(SmsImportOptions {
            account_ref: "wallet-main".to_string(),
            home_override: Some(&home),
            stdin_override: Some(json_messages(&DEMO_MESSAGES)),
            processed_at: Some(processed_at()),
            ..SmsImportOptions::default()
        });
        assert!(imported.is_ok());

        let all = list_with_options(SmsListOptions {
            account_ref: "wallet-main".to_string(),
            home_override: Some(&home),
            ..SmsListOptions::default()
        });
        assert!(all.is_ok());
        if let Ok(envelope) = all {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["returned"], 5);
            assert_eq!(value["data"]["transactions"][0]["transaction_id"], "MPK1234567894");
            assert_eq!(value["data"]["transactions"][4]["transaction_id"], "MPK1234567890");
        }

        let credits = list_with_options(SmsListOptions {
            account_ref: "wallet-main".to_string(),
            transaction_type: Some("credit".to_string()),
            home_override: Some(&home),
            ..SmsListOptions::default()
        });
        assert!(credits.is_ok());
        if let Ok(envelope) = credits {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["returned"], 2);
            assert_eq!(value["data"]["filter"]["transaction_type"], "credit");
        }

        let recent = list_with_options(SmsListOptions {
            account_ref: "wallet-main".to_string(),
            since: Some("2025-07-17".to_string()),
            home_override: Some(&home),
            ..SmsListOptions::default()
        });
        assert!(recent.is_ok());
        if let Ok(envelope) = recent {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["returned"], 2);
        }
    }
}

#[test]
fn account_summary_totals_the_window() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let imported = import_with_options(SmsImportOptions {
            account_ref: "wallet-main".to_string(),
            phone_number: Some("254712345678".to_string()),
            home_override: Some(&home),
            stdin_override: Some(json_messages(&DEMO_MESSAGES)),
            processed_at: Some(processed_at()),
            ..SmsImportOptions::default()
        });
        assert!(imported.is_ok());

        let as_of = NaiveDate::from_ymd_opt(2025, 7, 20).and_then(|day| day.and_hms_opt(0, 0, 0));
        let result = summary_with_options(AccountSummaryOptions {
            account_ref: "wallet-main".to_string(),
            days: Some(30),
            as_of,
            home_override: Some(&home),
        });
        assert!(result.is_ok());
        if let Ok(envelope) = result {
            assert_eq!(envelope.command, "account summary");
            let value = envelope_json(&envelope);
            let data = &value["data"];
            assert_eq!(data["transaction_count"], 5);
            assert_eq!(data["phone_number"], "254712345678");
            assert!(data["last_sync_at"].is_string());
            assert_eq!(
                decimal_field(&data["total_credits"]),
                Some(Decimal::new(5_200_000, 2))
            );
            assert_eq!(
                decimal_field(&data["total_debits"]),
                Some(Decimal::new(570_000, 2))
            );
            assert_eq!(
                decimal_field(&data["net_flow"]),
                Some(Decimal::new(4_630_000, 2))
            );
            assert_eq!(
                decimal_field(&data["current_balance"]),
                Some(Decimal::new(4_876_200, 2))
            );
        }

        let narrow = summary_with_options(AccountSummaryOptions {
            account_ref: "wallet-main".to_string(),
            days: Some(1),
            as_of: NaiveDate::from_ymd_opt(2025, 7, 16).and_then(|day| day.and_hms_opt(0, 0, 0)),
            home_override: Some(&home),
        });
        assert!(narrow.is_ok());
        if let Ok(envelope) = narrow {
            let value = envelope_json(&envelope);
            assert_eq!(value["data"]["transaction_count"], 2);
            assert_eq!(
                decimal_field(&value["data"]["current_balance"]),
                Some(Decimal::new(5_200_000, 2))
            );
        }
    }
}

#[test]
fn account_summary_rejects_zero_days_and_unknown_accounts() {
    let temp = temp_home();
    assert!(temp.is_ok());
    if let Ok((_temp_dir, home)) = temp {
        let zero = summary_with_options(AccountSummaryOptions {
            account_ref: "wallet-main".to_string(),
            days: Some(0),
            home_override: Some(&home),
            ..AccountSummaryOptions::default()
        });
        assert!(zero.is_err());
        if let Err(error) = zero {
            assert_eq!(error.code, "invalid_argument");
        }

        let missing = summary_with_options(AccountSummaryOptions {
            account_ref: "nobody".to_string(),
            home_override: Some(&home),
            ..AccountSummaryOptions::default()
        });
        assert!(missing.is_err());
        if let Err(error) = missing {
            assert_eq!(error.code, "account_not_found");
        }
    }
}
