/*!
 * Tests for application configuration functionality
 */

use nounph::app_config::{Config, LogLevel, OracleProvider, ProviderConfig};

use crate::common;

fn config_with_key() -> Config {
    let mut config = Config::default();
    config.oracle.active_provider_config_mut().api_key = "test-key".to_string();
    config
}

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.gloss_language, "auto");
    assert_eq!(config.oracle.provider, OracleProvider::Gemini);
    assert_eq!(config.oracle.available_providers.len(), OracleProvider::ALL.len());
    assert_eq!(config.oracle.get_model(), "gemini-2.5-flash");
    assert_eq!(config.session.default_target_score, 7.0);
    assert_eq!(config.session.operation_timeout_secs, 120);
    assert_eq!(config.log_level, LogLevel::Info);

    let ollama = config.oracle.get_provider_config(&OracleProvider::Ollama)
        .expect("Ollama provider config should exist");
    assert_eq!(ollama.endpoint, "http://localhost:11434");
    assert_eq!(ollama.timeout_secs, 60);
}

/// Hosted providers need a key, local ones do not
#[test]
fn test_config_validation_withMissingApiKey_shouldRequireKeyForHostedProviders() {
    let mut config = Config::default();
    assert!(config.validate().is_err());

    config.oracle.provider = OracleProvider::Ollama;
    assert!(config.validate().is_ok());

    config.oracle.provider = OracleProvider::LMStudio;
    assert!(config.validate().is_ok());

    config.oracle.provider = OracleProvider::Anthropic;
    let error = config.validate().unwrap_err().to_string();
    assert!(error.contains("API key is required for Anthropic"));
}

/// Test configuration validation of the numeric settings
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = config_with_key();
    assert!(config.validate().is_ok());

    config.session.default_target_score = 14.5;
    assert!(config.validate().is_err());
    config.session.default_target_score = 1.0;
    assert!(config.validate().is_ok());

    config.session.operation_timeout_secs = 0;
    assert!(config.validate().is_err());
    config.session.operation_timeout_secs = 30;

    config.oracle.common.rewrite_temperature = 2.5;
    assert!(config.validate().is_err());
    config.oracle.common.rewrite_temperature = 0.7;

    config.oracle.common.max_tokens = 0;
    assert!(config.validate().is_err());
    config.oracle.common.max_tokens = 1024;

    config.gloss_language = "  ".to_string();
    assert!(config.validate().is_err());
    config.gloss_language = "English".to_string();

    config.oracle.active_provider_config_mut().endpoint = "not a url".to_string();
    assert!(config.validate().is_err());
}

/// An environment key only fills an empty slot
#[test]
fn test_apply_api_key_fallback_shouldOnlyFillEmptyKey() {
    let mut config = Config::default();
    config.apply_api_key_fallback(Some("from-env".to_string()));
    assert_eq!(config.oracle.get_api_key(), "from-env");

    config.apply_api_key_fallback(Some("other".to_string()));
    assert_eq!(config.oracle.get_api_key(), "from-env");

    let mut config = Config::default();
    config.apply_api_key_fallback(Some("   ".to_string()));
    config.apply_api_key_fallback(None);
    assert_eq!(config.oracle.get_api_key(), "");
}

/// Selecting a provider without an entry creates one with defaults
#[test]
fn test_active_provider_config_mut_withMissingEntry_shouldInsertDefaults() {
    let mut config = Config::default();
    config.oracle.available_providers.clear();
    config.oracle.provider = OracleProvider::OpenAI;

    config.oracle.active_provider_config_mut().model = "gpt-4o".to_string();

    assert_eq!(config.oracle.available_providers.len(), 1);
    assert_eq!(config.oracle.get_model(), "gpt-4o");
    assert_eq!(config.oracle.get_endpoint(), "https://api.openai.com/v1");
}

/// Missing files are created with defaults and read back unchanged
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.oracle.provider, created.oracle.provider);
    assert_eq!(loaded.oracle.available_providers.len(), created.oracle.available_providers.len());
}

/// Partial files fall back to defaults for every missing field
#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "gloss_language": "French",
            "oracle": {
                "provider": "ollama",
                "available_providers": [{ "type": "ollama", "model": "mistral" }]
            },
            "log_level": "debug"
        }"#,
    ).unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.gloss_language, "French");
    assert_eq!(config.oracle.provider, OracleProvider::Ollama);
    assert_eq!(config.oracle.get_model(), "mistral");
    assert_eq!(config.oracle.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.oracle.get_timeout_secs(), 60);
    assert_eq!(config.oracle.common.temperature, 0.2);
    assert_eq!(config.session.operation_timeout_secs, 120);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
}

/// Broken JSON is reported with the file name
#[test]
fn test_from_file_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();

    let error = Config::from_file(&path).unwrap_err();
    assert!(format!("{:#}", error).contains("Failed to parse config file"));
}

/// Provider names round-trip through their lowercase form
#[test]
fn test_provider_fromStr_shouldAcceptLowercaseNames() {
    for provider in OracleProvider::ALL {
        let parsed: OracleProvider = provider.to_lowercase_string().parse().unwrap();
        assert_eq!(parsed, provider);
        assert_eq!(ProviderConfig::new(provider.clone()).provider_type, provider.to_lowercase_string());
    }
    assert!("gpt".parse::<OracleProvider>().is_err());
}
