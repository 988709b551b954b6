// Option validation and config file handling.
use syllabus::config::{Config, OutputFormat};
use syllabus::context::{AppContext, TestContext};
use syllabus::{ParseOptions, SyllabusParser, parse_syllabus};

#[test]
fn test_defaults_are_valid() {
    let resolved = ParseOptions::default().resolve().unwrap();
    assert_eq!(resolved.timezone.name(), "America/New_York");
    assert_eq!(resolved.default_due_time.to_string(), "23:59:00");
    assert_eq!(resolved.semester_start_month, 8);
    assert!(resolved.accept_past_dates);
    assert!(resolved.reference_date.is_none());
}

#[test]
fn test_bad_due_time_fails_fast() {
    for bad in ["25:00", "noon", "", "7"] {
        let options = ParseOptions {
            default_due_time: bad.to_string(),
            ..Default::default()
        };
        let err = parse_syllabus("Quiz 1 Sept 2", &options).unwrap_err();
        assert!(
            err.to_string().contains("default_due_time"),
            "unexpected error for {:?}: {}",
            bad,
            err
        );
    }
}

#[test]
fn test_bad_timezone_fails_fast() {
    let options = ParseOptions {
        timezone: "Mars/Olympus_Mons".to_string(),
        ..Default::default()
    };
    let err = SyllabusParser::new(&options).unwrap_err();
    assert!(err.to_string().contains("Invalid timezone"));
}

#[test]
fn test_semester_month_range() {
    for month in [0, 13] {
        let options = ParseOptions {
            semester_start_month: month,
            ..Default::default()
        };
        assert!(options.resolve().is_err());
    }
    let january = ParseOptions {
        semester_start_month: 1,
        ..Default::default()
    };
    assert!(january.resolve().is_ok());
}

#[test]
fn test_zero_input_cap_rejected() {
    let options = ParseOptions {
        max_input_chars: 0,
        ..Default::default()
    };
    assert!(options.resolve().is_err());
}

#[test]
fn test_input_cap_truncates_instead_of_failing() {
    let options = ParseOptions {
        max_input_chars: 14,
        ..Default::default()
    };
    let records = parse_syllabus("Quiz 1 Sept 2\nQuiz 2 Sept 9", &options).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_lines, vec![0]);
}

#[test]
fn test_partial_options_table() {
    let options: ParseOptions =
        toml::from_str("semester_start_month = 1\naccept_past_dates = false").unwrap();
    assert_eq!(options.semester_start_month, 1);
    assert!(!options.accept_past_dates);
    assert_eq!(options.timezone, "America/New_York");
    assert_eq!(options.default_due_time, "23:59");
    assert_eq!(options.max_input_chars, 100_000);

    let from_json: ParseOptions =
        serde_json::from_str(r#"{"reference_date": "2024-08-20T16:00:00Z"}"#).unwrap();
    assert_eq!(
        from_json.reference_date.unwrap().to_rfc3339(),
        "2024-08-20T16:00:00+00:00"
    );
}

#[test]
fn test_missing_config_file() {
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));
    assert!(err.to_string().contains("Failed to read config file"));
    assert!(err.to_string().contains("config.toml"));

    let config = Config::load_or_default(&ctx).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_roundtrip() {
    let ctx = TestContext::new();
    let mut config = Config::default();
    config.format = OutputFormat::Json;
    config.review_threshold = 0.7;
    config.options.timezone = "Europe/Paris".to_string();
    config.options.assume_academic_year = Some(2025);
    config.save(&ctx).unwrap();

    let loaded = Config::load(&ctx).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_unrelated_errors_are_not_missing_files() {
    assert!(!Config::is_missing_config_error(&anyhow::anyhow!(
        "Config file not found"
    )));
    let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    assert!(!Config::is_missing_config_error(&anyhow::Error::new(denied)));
}

#[test]
fn test_partial_config_file() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    std::fs::write(&path, "format = \"json\"\n\n[options]\ndefault_due_time = \"17:00\"\n").unwrap();

    let config = Config::load(&ctx).unwrap();
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.review_threshold, 0.5);
    assert_eq!(config.options.default_due_time, "17:00");
    assert_eq!(config.options.semester_start_month, 8);
}

#[test]
fn test_malformed_config_is_an_error() {
    let ctx = TestContext::new();
    let path = ctx.get_config_file_path().unwrap();
    std::fs::write(&path, "format = [oops").unwrap();

    let err = Config::load(&ctx).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    assert!(!Config::is_missing_config_error(&err));
    assert!(Config::load_or_default(&ctx).is_err());
}
