use super::*;

use std::{collections::HashMap, io::Write};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_match_catalog_contract() {
    let settings = Settings::default();
    assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(settings.connect_timeout(), Duration::from_secs(15));
    assert_eq!(settings.read_timeout(), Duration::from_secs(10));
    assert_eq!(settings.max_results, 10);
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_overrides_accept_strings_and_integers() {
    let mut settings = Settings::default();
    let raw = r#"
endpoint = "http://127.0.0.1:9000/books"
connect_timeout_ms = 2000
read_timeout_ms = "1500"
unknown_key = "ignored"
"#;
    apply_file_overrides(&mut settings, raw, Path::new("inline.toml")).expect("parse");

    assert_eq!(settings.endpoint, "http://127.0.0.1:9000/books");
    assert_eq!(settings.connect_timeout_ms, 2000);
    assert_eq!(settings.read_timeout_ms, 1500);
    assert_eq!(settings.max_results, 10);
}

#[test]
fn malformed_file_is_reported() {
    let mut settings = Settings::default();
    let err = apply_file_overrides(&mut settings, "endpoint = ", Path::new("broken.toml"))
        .expect_err("must fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn non_numeric_values_are_ignored() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"max_results = "plenty""#,
        Path::new("inline.toml"),
    )
    .expect("parse");
    assert_eq!(settings.max_results, 10);
}

#[test]
fn env_overrides_win_over_defaults() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("BOOK_SEARCH__ENDPOINT", "https://books.example.test/v1/volumes"),
        ("BOOK_SEARCH__MAX_RESULTS", "25"),
    ]);
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(settings.endpoint, "https://books.example.test/v1/volumes");
    assert_eq!(settings.max_results, 25);
    assert_eq!(settings.read_timeout_ms, 10_000);
}

#[test]
fn rejects_bad_endpoints() {
    for endpoint in ["not a url", "ftp://example.com/books", "file:///tmp/books"] {
        let settings = Settings {
            endpoint: endpoint.to_string(),
            ..Settings::default()
        };
        assert!(
            matches!(settings.validate(), Err(ConfigError::InvalidEndpoint { .. })),
            "endpoint {endpoint} should be rejected"
        );
    }
}

#[test]
fn rejects_zero_or_equal_timeouts() {
    for (connect_ms, read_ms) in [(0, 10_000), (15_000, 0), (5_000, 5_000)] {
        let settings = Settings {
            connect_timeout_ms: connect_ms,
            read_timeout_ms: read_ms,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidTimeouts { .. })
        ));
    }
}

#[test]
fn rejects_out_of_range_result_cap() {
    for max_results in [0, MAX_RESULTS_LIMIT + 1] {
        let settings = Settings {
            max_results,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidMaxResults { .. })
        ));
    }
}

#[test]
fn explicit_settings_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "max_results = 5").expect("write");
    writeln!(file, "read_timeout_ms = 4000").expect("write");

    let settings = load_settings_with(Some(file.path()), no_env).expect("load");
    assert_eq!(settings.max_results, 5);
    assert_eq!(settings.read_timeout_ms, 4000);
}

#[test]
fn missing_explicit_settings_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_settings_with(Some(&dir.path().join("absent.toml")), no_env)
        .expect_err("must fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn env_applies_on_top_of_settings_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "max_results = 5").expect("write");

    let settings = load_settings_with(Some(file.path()), |key| {
        (key == "BOOK_SEARCH__MAX_RESULTS").then(|| "20".to_string())
    })
    .expect("load");
    assert_eq!(settings.max_results, 20);
}

#[test]
fn invalid_env_value_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "max_results = 5").expect("write");

    let err = load_settings_with(Some(file.path()), |key| {
        (key == "BOOK_SEARCH__ENDPOINT").then(|| "books.example.test".to_string())
    })
    .expect_err("must fail");
    assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
}
