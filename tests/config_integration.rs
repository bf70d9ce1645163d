use policy_chat::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("POLICY_CHAT_SERVER__PORT");
        env::remove_var("POLICY_CHAT_LLM__MODEL");
        env::remove_var("CONFIG_FILE");
        env::remove_var("OLLAMA_HOST");
        env::remove_var("OLLAMA_MODEL");
        env::remove_var("LLM_API_KEY");
        env::remove_var("PORT");
        env::remove_var("CHAT_ENDPOINT");
        env::remove_var("TIMEOUT_DISABLED");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["policy-chat"]).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.llm.base_url, "http://localhost:11434");
    assert_eq!(config.llm.model, "llama3.2:3b");
    assert_eq!(config.llm.api_key, None);
    assert_eq!(config.widget.endpoint, "http://127.0.0.1:3000/chat");
    assert!(!config.resilience.timeout_disabled);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("POLICY_CHAT_SERVER__PORT", "9090");
        env::set_var("OLLAMA_HOST", "http://ollama.internal:11434");
        env::set_var("OLLAMA_MODEL", "llama3.1:8b");
    }

    let config = AppConfig::load_from_args(["policy-chat"]).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.llm.base_url, "http://ollama.internal:11434");
    assert_eq!(config.llm.model, "llama3.1:8b");

    clear_env_vars();
}

#[test]
#[serial]
fn test_ollama_env_beats_prefixed_env() {
    clear_env_vars();
    unsafe {
        env::set_var("POLICY_CHAT_LLM__MODEL", "from-prefixed");
        env::set_var("OLLAMA_MODEL", "from-ollama");
    }

    let config = AppConfig::load_from_args(["policy-chat"]).expect("Failed to load config");
    assert_eq!(config.llm.model, "from-ollama");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("POLICY_CHAT_SERVER__PORT", "9090");
        env::set_var("OLLAMA_MODEL", "from-env");
    }

    let config = AppConfig::load_from_args([
        "policy-chat",
        "--model",
        "from-cli",
        "serve",
        "--port",
        "8000",
        "--timeout-disabled",
        "true",
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.llm.model, "from-cli");
    assert!(config.resilience.timeout_disabled);

    clear_env_vars();
}

#[test]
#[serial]
fn test_server_env_applies_without_subcommand() {
    clear_env_vars();
    unsafe {
        env::set_var("PORT", "8123");
        env::set_var("TIMEOUT_DISABLED", "true");
    }

    let bare = AppConfig::load_from_args(["policy-chat"]).expect("Failed to load config");
    let serve = AppConfig::load_from_args(["policy-chat", "serve"]).expect("Failed to load config");
    assert_eq!(bare.server.port, 8123);
    assert_eq!(serve.server.port, 8123);
    assert!(bare.resilience.timeout_disabled);
    assert_eq!(bare.llm_settings().timeout, None);

    clear_env_vars();
}

#[test]
#[serial]
fn test_server_flags_without_subcommand() {
    clear_env_vars();

    let config = AppConfig::load_from_args(["policy-chat", "--port", "8200", "--host", "127.0.0.1"])
        .expect("Failed to load config");
    assert_eq!(config.server.port, 8200);
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_chat_endpoint_flag() {
    clear_env_vars();

    let config = AppConfig::load_from_args([
        "policy-chat",
        "chat",
        "--endpoint",
        "http://10.0.0.5:8000/chat",
    ])
    .expect("Failed to load config");
    assert_eq!(config.widget.endpoint, "http://10.0.0.5:8000/chat");
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("Failed to create temp config");
    writeln!(
        file,
        "server:\n  port: 7070\nllm:\n  model: qwen2.5:7b\nwidget:\n  timeout_secs: 5"
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", file.path());
    }

    let config = AppConfig::load_from_args(["policy-chat"]).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.llm.model, "qwen2.5:7b");
    assert_eq!(config.widget.timeout_secs, 5);
    // Untouched keys keep their defaults.
    assert_eq!(config.llm.base_url, "http://localhost:11434");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cwd_config_fallback() {
    clear_env_vars();

    let cwd_path = "config.yaml";
    fs::write(cwd_path, "server:\n  port: 6060\n").expect("Failed to write ./config.yaml");

    let config = AppConfig::load_from_args(["policy-chat"]);

    // Clean up before asserting so a failure does not leave the file behind.
    fs::remove_file(cwd_path).unwrap();

    assert_eq!(config.expect("Failed to load config").server.port, 6060);
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["policy-chat", "--config", "does/not/exist.yaml"]);
    assert!(result.is_err());
}
