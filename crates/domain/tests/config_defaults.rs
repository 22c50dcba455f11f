use dp_domain::config::{Config, ConfigSeverity, StoreBackend};

fn has_error(config: &Config, field: &str) -> bool {
    config
        .validate()
        .iter()
        .any(|e| e.severity == ConfigSeverity::Error && e.field == field)
}

#[test]
fn defaults_match_the_lesson_workbook() {
    let config = Config::default();
    assert_eq!(config.posting_start_hour, 4);
    assert_eq!(config.interval_secs, 600);
    assert_eq!(config.feeds.lesson.max_len, 4000);
    assert_eq!(config.feeds.lesson.first_title, "* LESSON 1 *");
    assert_eq!(
        config.feeds.lesson.terminal_pattern.as_deref(),
        Some(r"^\* LESSON ")
    );
    assert_eq!((config.feeds.lesson.epoch_month, config.feeds.lesson.epoch_day), (3, 1));
    assert_eq!(config.store.backend, StoreBackend::Yaml);
}

#[test]
fn feeds_parse_from_toml() {
    let toml_str = r#"
posting_start_hour = 6

[telegram]
token = "123:abc"
log_chat_id = "-100200"

[feeds.lesson]
path = "workbook.txt"
chat_id = "-100300"

[feeds.book_of_days]
path = "abod.txt"
chat_id = "-100400"
pattern_template = '(?s)monthday.*?\n\n\n'
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.posting_start_hour, 6);
    assert_eq!(config.feeds.lesson.chat_id, "-100300");
    assert_eq!(
        config.feeds.lesson.path.as_deref(),
        Some(std::path::Path::new("workbook.txt"))
    );
    assert!(config.is_valid(), "{:?}", config.validate());
}

#[test]
fn start_hour_out_of_range_is_rejected() {
    let config: Config = toml::from_str("posting_start_hour = 24").unwrap();
    assert!(has_error(&config, "posting_start_hour"));
}

#[test]
fn malformed_terminal_pattern_is_rejected() {
    let toml_str = r#"
[feeds.lesson]
terminal_pattern = "(unclosed"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(has_error(&config, "feeds.lesson.terminal_pattern"));
}

#[test]
fn leap_day_epoch_is_rejected() {
    let toml_str = r#"
[feeds.lesson]
epoch_month = 2
epoch_day = 29
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(has_error(&config, "feeds.lesson.epoch_month"));
}

#[test]
fn book_of_days_needs_a_template() {
    let toml_str = r#"
[feeds.book_of_days]
path = "abod.txt"
chat_id = "-1"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(has_error(&config, "feeds.book_of_days.pattern_template"));
}

#[test]
fn lesson_path_without_chat_is_rejected() {
    let toml_str = r#"
[feeds.lesson]
path = "workbook.txt"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(has_error(&config, "feeds.lesson.chat_id"));
}

#[test]
fn kv_backend_requires_namespace() {
    let toml_str = r#"
[store]
backend = "kv"

[store.kv]
account_id = "acct"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert!(has_error(&config, "store.kv.namespace_id"));
}
