// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use bankroll::cache::{self, keys};
use bankroll::commands::settings;
use bankroll::config::{self, Config, DEFAULT_API_URL};
use bankroll::db::init_schema;
use bankroll::models::{Balance, User};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    init_schema(&conn).unwrap();
    conn
}

#[test]
fn defaults_then_stored_settings() {
    let conn = conn();
    let cfg = Config::load(&conn).unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.timeout_secs, 15);

    settings::set(&conn, "currency", "usd").unwrap();
    settings::set(&conn, "reset_check_secs", "5").unwrap();
    let cfg = Config::load(&conn).unwrap();
    assert_eq!(cfg.currency, "USD");
    assert_eq!(cfg.reset_check_interval().as_secs(), 5);
}

#[test]
fn invalid_settings_are_rejected_before_storing() {
    let conn = conn();
    assert!(settings::set(&conn, "timeout_secs", "0").is_err());
    assert!(settings::set(&conn, "log_format", "xml").is_err());
    assert!(settings::set(&conn, "session_token", "abc").is_err());
    assert!(config::get_setting(&conn, "timeout_secs").unwrap().is_none());
}

#[test]
fn session_round_trip_and_clear() {
    let conn = conn();
    let user = User {
        id: "7".into(),
        name: "Ana".into(),
        email: "ana@example.com".into(),
    };
    config::store_session(&conn, "tok", &user).unwrap();
    assert_eq!(config::session_token(&conn).unwrap().as_deref(), Some("tok"));
    assert_eq!(config::session_user(&conn).unwrap(), Some(user));

    config::clear_token(&conn).unwrap();
    assert!(config::session_token(&conn).unwrap().is_none());
    assert!(config::session_user(&conn).unwrap().is_some());

    config::clear_session(&conn).unwrap();
    assert!(config::session_user(&conn).unwrap().is_none());
}

#[test]
fn cache_is_per_user() {
    let conn = conn();
    let b = Balance {
        current: Decimal::from(120),
        initial: Decimal::from(100),
    };
    cache::put_json(&conn, "u1", keys::BALANCE, &b).unwrap();
    cache::put_json(&conn, "u2", keys::BALANCE, &Balance::default()).unwrap();
    assert_eq!(cache::get_json::<Balance>(&conn, "u1", keys::BALANCE).unwrap(), Some(b));

    cache::clear_user(&conn, "u1").unwrap();
    assert!(cache::get_json::<Balance>(&conn, "u1", keys::BALANCE).unwrap().is_none());
    assert!(cache::get_json::<Balance>(&conn, "u2", keys::BALANCE).unwrap().is_some());
}

#[test]
fn corrupt_cache_entry_is_an_error() {
    let conn = conn();
    cache::put_raw(&conn, "u1", keys::BALANCE, "{not json").unwrap();
    assert!(cache::get_json::<Balance>(&conn, "u1", keys::BALANCE).is_err());
}
