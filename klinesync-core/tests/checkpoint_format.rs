use chrono::{TimeZone, Utc};
use klinesync_core::{format_checkpoint, parse_checkpoint, Interval, SessionKey};

#[test]
fn round_trips_exactly_to_the_minute() {
    let at = Utc.with_ymd_and_hms(2023, 9, 19, 14, 35, 0).unwrap();
    let text = format_checkpoint(at);
    assert_eq!(text, "2023-09-19 14:35");
    assert_eq!(parse_checkpoint(&text).unwrap(), at);
}

#[test]
fn sub_minute_precision_truncates_through_the_stored_form() {
    // A Binance close time one millisecond before the boundary.
    let at = Utc
        .with_ymd_and_hms(2023, 9, 19, 14, 34, 59)
        .unwrap()
        .checked_add_signed(chrono::TimeDelta::milliseconds(999))
        .unwrap();
    let reparsed = parse_checkpoint(&format_checkpoint(at)).unwrap();
    assert_eq!(reparsed, Utc.with_ymd_and_hms(2023, 9, 19, 14, 34, 0).unwrap());
}

#[test]
fn surrounding_whitespace_is_tolerated() {
    let parsed = parse_checkpoint("2023-01-01 00:00\n").unwrap();
    assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
}

#[test]
fn garbage_is_a_storage_error() {
    assert!(parse_checkpoint("last tuesday").is_err());
    assert!(parse_checkpoint("2023-13-01 00:00").is_err());
    assert!(parse_checkpoint("").is_err());
}

#[test]
fn session_key_display_identifies_provider_symbol_and_interval() {
    let key = SessionKey::new("binance", "BTCUSDT", Interval::M15);
    assert_eq!(key.to_string(), "binance/BTCUSDT-15m");
}
