//! Tests for log line formatting

use super::capture;
use super::*;
use tracing::{error, info};

#[test]
fn test_log_format_parsing() {
    assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
    assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert!("plain".parse::<LogFormat>().is_err());
    assert!("logfmt".parse::<LogFormat>().is_err());
    assert_eq!(LogFormat::default(), LogFormat::Json);
}

#[test]
fn test_json_line_shape() {
    let (logs, _guard) = capture::install(LogFormat::Json);

    info!(
        path = "/healthz",
        method = %"GET",
        remote = %"127.0.0.1:1",
        "Served health check request"
    );

    let lines = logs.lines();
    assert_eq!(lines.len(), 1, "one event should produce one line");

    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    let keys: Vec<&str> = record
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.len(), 4, "unexpected keys: {:?}", keys);
    assert_eq!(record["level"], "info");
    assert_eq!(record["message"], "Served health check request");
    assert_eq!(record["fields"]["path"], "/healthz");
    assert_eq!(record["fields"]["method"], "GET");
    assert_eq!(record["fields"]["remote"], "127.0.0.1:1");
    assert!(record.get("path").is_none(), "fields are nested, not flattened");

    let timestamp = record["timestamp"].as_str().unwrap();
    assert!(
        chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
        "timestamp should be RFC3339: {}",
        timestamp
    );
}

#[test]
fn test_json_line_without_fields() {
    let (logs, _guard) = capture::install(LogFormat::Json);

    error!("Server forced to shutdown");

    let record: serde_json::Value = serde_json::from_str(&logs.lines()[0]).unwrap();
    assert_eq!(record["level"], "error");
    assert_eq!(record["message"], "Server forced to shutdown");
    assert!(record.get("fields").is_none());
}

#[test]
fn test_json_field_types_preserved() {
    let (logs, _guard) = capture::install(LogFormat::Json);

    tracing::warn!(port = 8080u16, draining = true, "Repeated stop request");

    let record: serde_json::Value = serde_json::from_str(&logs.lines()[0]).unwrap();
    assert_eq!(record["level"], "warn");
    assert_eq!(record["fields"]["port"], 8080);
    assert_eq!(record["fields"]["draining"], true);
}

#[test]
fn test_text_line_is_plain() {
    let (logs, _guard) = capture::install(LogFormat::Text);

    info!(port = 8080, "Starting server");

    let lines = logs.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("INFO"));
    assert!(lines[0].contains("Starting server"));
    assert!(lines[0].contains("port=8080"));
    assert!(!lines[0].contains('\u{1b}'), "no ANSI escapes in text output");
    assert!(serde_json::from_str::<serde_json::Value>(&lines[0]).is_err());
}

#[test]
fn test_debug_filtered_by_default() {
    let (logs, _guard) = capture::install(LogFormat::Text);

    tracing::debug!("not shown");
    info!("shown");

    assert_eq!(logs.lines().len(), 1);
}
