use super::*;

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let value = variant
                    .to_possible_value()
                    .expect("every variant has a possible value");
                let parsed: $enum_type = value.get_name().parse().expect("canonical name parses");
                assert_eq!(parsed, *variant);
            }
        }
    };
}

test_enum_completeness!(LogLevel, test_log_level_completeness);
test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(ColorIntent, test_color_intent_completeness);

#[test]
fn test_aliases_parse_case_insensitively() {
    assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warning);
    assert_eq!("verbose".parse::<LogLevel>().unwrap(), LogLevel::Trace);
    assert_eq!("plain".parse::<LogFormat>().unwrap(), LogFormat::Text);
    assert_eq!("human".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    assert_eq!("off".parse::<ColorIntent>().unwrap(), ColorIntent::Never);
    assert_eq!("Force".parse::<ColorIntent>().unwrap(), ColorIntent::Always);
}

#[test]
fn test_unknown_value_reports_reason() {
    let err = "loud".parse::<LogLevel>().unwrap_err();
    match err {
        ConfigError::ParseError { value, reason } => {
            assert_eq!(value, "loud");
            assert_eq!(reason, "invalid log level");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_log_level_from_verbosity() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Warning);
    assert_eq!(LogLevel::from_verbosity(1), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Debug);
    assert_eq!(LogLevel::from_verbosity(3), LogLevel::Trace);
    assert_eq!(LogLevel::from_verbosity(u8::MAX), LogLevel::Trace);
}

#[test]
fn test_log_level_ordering_matches_severity() {
    assert!(LogLevel::Error < LogLevel::Warning);
    assert!(LogLevel::Debug < LogLevel::Trace);
    assert_eq!(LogLevel::Warning.as_filter(), "warn");
}

#[test]
fn test_color_intent_explicit_values_ignore_terminal() {
    assert!(ColorIntent::Always.resolve());
    assert!(!ColorIntent::Never.resolve());
}
