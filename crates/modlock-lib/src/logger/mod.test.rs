use super::*;

#[test]
fn test_default_filter_scopes_levels() {
    let filter = default_filter(LogLevel::Debug);
    assert!(filter.starts_with("modlock=debug,modlock_lib=debug"));
    assert!(filter.contains("reqwest=warn"));
    assert!(filter.contains("hyper_util=warn"));
    assert!(filter.ends_with(",debug"));
}

#[test]
fn test_default_filter_is_valid_env_filter() {
    for level in [LogLevel::Error, LogLevel::Warning, LogLevel::Trace] {
        let filter = default_filter(level);
        assert!(
            EnvFilter::try_new(&filter).is_ok(),
            "filter '{filter}' should parse"
        );
    }
}

#[test]
fn test_second_init_is_rejected() {
    let first = Logger::init(LoggerConfig::default());
    let second = Logger::init(LoggerConfig::default());

    assert!(second.is_err());
    if let Ok(logger) = first {
        assert!(Logger::is_initialized());
        assert_eq!(logger.config().level, LogLevel::Warning);
    }
}
