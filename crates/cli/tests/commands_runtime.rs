use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use shopsense_cli::commands::cart::{self, CartAction};
use shopsense_cli::commands::recommend::{self, RecommendArgs};
use shopsense_cli::commands::{catalog, chat, config, history, migrate, scan};
use tempfile::TempDir;

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "postgres://localhost/shop")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_env_sources() {
    with_env(&[("SHOPSENSE_STORAGE_HISTORY_KEY", "chat_log")], || {
        let output = config::run();

        assert!(output.contains(
            "- storage.history_key = chat_log (source: env (SHOPSENSE_STORAGE_HISTORY_KEY))"
        ));
        assert!(output.contains("- storage.cart_key = cart (source: default)"));
    });
}

#[test]
fn chat_then_history_round_trips_through_the_database() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("SHOPSENSE_DATABASE_URL", url.as_str())], || {
        let result = chat::run("hi");
        assert_eq!(result.exit_code, 0, "expected chat success: {}", result.output);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "chat");
        assert_eq!(payload["details"]["intent"], "fallback");
        assert_eq!(payload["details"]["persistence"]["status"], "persisted");

        let result = history::run();
        assert_eq!(result.exit_code, 0);
        let payload = parse_payload(&result.output);
        let messages = payload["details"].as_array().expect("messages array");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["text"], "hi");
        assert_eq!(messages[1]["role"], "assistant");
    });
}

#[test]
fn clear_removes_persisted_history() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("SHOPSENSE_DATABASE_URL", url.as_str())], || {
        assert_eq!(chat::run("compare these").exit_code, 0);

        let result = history::clear();
        assert_eq!(result.exit_code, 0);
        assert_eq!(parse_payload(&result.output)["command"], "clear");

        let payload = parse_payload(&history::run().output);
        assert_eq!(payload["details"].as_array().map(Vec::len), Some(0));
    });
}

#[test]
fn chat_rejects_blank_messages() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = chat::run("   ");
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "input_rejected");
    });
}

#[test]
fn chat_reads_the_stored_cart() {
    let dir = TempDir::new().expect("tempdir");
    let url = database_url(&dir);

    with_env(&[("SHOPSENSE_DATABASE_URL", url.as_str())], || {
        let added = cart::run(CartAction::Add { product_id: "1".to_string(), quantity: 2 });
        assert_eq!(added.exit_code, 0, "expected cart add success: {}", added.output);
        assert_eq!(parse_payload(&added.output)["message"], "2 items, total $259.98");

        let result = chat::run("checkout please");
        let payload = parse_payload(&result.output);
        assert_eq!(payload["details"]["intent"], "cart");
        assert_eq!(
            payload["message"],
            "You have 2 items in your cart. Would you like to proceed to checkout or continue shopping?"
        );
    });
}

#[test]
fn cart_rejects_unknown_products() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = cart::run(CartAction::Add { product_id: "999".to_string(), quantity: 1 });
        assert_eq!(result.exit_code, 10);
        assert_eq!(parse_payload(&result.output)["error_class"], "unknown_product");
    });
}

#[test]
fn recommend_replays_views_before_ranking() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = recommend::run(RecommendArgs {
            limit: Some(2),
            viewed: vec!["3".to_string(), "3".to_string()],
            searched: Vec::new(),
        });
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let rows = payload["details"].as_array().expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "3");
        assert_eq!(rows[0]["price"], "39.99");
    });
}

#[test]
fn scan_with_seed_is_reproducible() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let first = scan::run(None, Some(5));
        let second = scan::run(None, Some(5));

        assert_eq!(first.exit_code, 0);
        assert_eq!(first.output, second.output);
    });
}

#[test]
fn scan_reports_unreadable_image() {
    with_env(&[("SHOPSENSE_DATABASE_URL", "sqlite::memory:")], || {
        let result = scan::run(Some("/definitely/not/here.png".into()), Some(1));
        assert_eq!(result.exit_code, 9);
        assert_eq!(parse_payload(&result.output)["error_class"], "image_read");
    });
}

#[test]
fn catalog_lists_the_demo_products() {
    let payload = parse_payload(&catalog::run().output);

    assert_eq!(payload["message"], "6 products");
    assert_eq!(payload["details"][0]["name"], "Wireless Bluetooth Headphones");
}

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("shopsense.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SHOPSENSE_DATABASE_URL",
        "SHOPSENSE_DATABASE_MAX_CONNECTIONS",
        "SHOPSENSE_DATABASE_TIMEOUT_SECS",
        "SHOPSENSE_STORAGE_HISTORY_KEY",
        "SHOPSENSE_STORAGE_CART_KEY",
        "SHOPSENSE_ASSISTANT_CHAT_RECOMMENDATION_COUNT",
        "SHOPSENSE_ASSISTANT_DEFAULT_RECOMMENDATION_LIMIT",
        "SHOPSENSE_ASSISTANT_MAX_MESSAGE_CHARS",
        "SHOPSENSE_ASSISTANT_SCAN_CONFIDENCE_THRESHOLD",
        "SHOPSENSE_LOGGING_LEVEL",
        "SHOPSENSE_LOGGING_FORMAT",
        "SHOPSENSE_LOG_LEVEL",
        "SHOPSENSE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
