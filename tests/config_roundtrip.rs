use toneform::config::{RemoteProvider, StalePolicy};
use toneform::{Tone, ToneConfig};

#[test]
fn save_then_load_preserves_settings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("config.toml");

    let mut config = ToneConfig {
        debounce_ms: 400,
        quarantine_ms: 15_000,
        stale_policy: StalePolicy::IgnoreStale,
        ..ToneConfig::default()
    };
    config.remote.provider = RemoteProvider::Offline;
    config.remote.model = "gemini-test".into();
    config.styles.calm = vec!["serif-light".into()];

    config.save_to_file(&path).expect("save");
    let loaded = ToneConfig::from_file(&path).expect("load");

    assert_eq!(loaded.debounce_ms, 400);
    assert_eq!(loaded.quarantine_ms, 15_000);
    assert_eq!(loaded.stale_policy, StalePolicy::IgnoreStale);
    assert_eq!(loaded.remote.provider, RemoteProvider::Offline);
    assert_eq!(loaded.remote.model, "gemini-test");
    assert_eq!(loaded.styles.pool(Tone::Calm), ["serif-light".to_owned()]);
    assert_eq!(loaded.styles.pool(Tone::Intense), config.styles.pool(Tone::Intense));
    assert!(loaded.validate().is_ok());
}

#[test]
fn hand_written_file_fills_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
min_text_len = 8

[remote]
api_key = "from-file"
"#,
    )
    .expect("write");

    let config = ToneConfig::from_file(&path).expect("load");
    assert_eq!(config.min_text_len, 8);
    assert_eq!(config.debounce_ms, 1_000);
    assert_eq!(config.remote.api_key.as_deref(), Some("from-file"));
    assert_eq!(config.remote.provider, RemoteProvider::Gemini);
    assert_eq!(config.remote.timeout_secs, 30);
}
