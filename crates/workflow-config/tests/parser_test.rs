//! Parser tests against realistic workflow payloads

use workflow_config::{ConfigError, ConfigParser, FailingConfigParser, StaticConfigParser, YamlConfigParser};

const VALID_CONFIG: &str = r#"
modules:
  - name: httpServer
    type: http.server
    config:
      address: ":8080"
  - name: router
    type: http.router
    dependsOn:
      - httpServer
workflows:
  http:
    routes:
      - method: GET
        path: /health
        handler: httpServer
triggers:
  schedule:
    cron: "*/5 * * * *"
"#;

#[test]
fn test_parse_valid_config() {
    let config = YamlConfigParser::new().parse(VALID_CONFIG).unwrap();
    assert_eq!(config.modules.len(), 2);

    let server = config.module("httpServer").unwrap();
    assert_eq!(server.module_type, "http.server");
    assert_eq!(server.config["address"].as_str(), Some(":8080"));

    let router = config.module("router").unwrap();
    assert_eq!(router.depends_on, vec!["httpServer".to_string()]);

    assert!(config.workflows.contains_key("http"));
    assert!(config.triggers.contains_key("schedule"));
    assert!(config.pipelines.is_empty());
}

#[test]
fn test_parse_rejects_malformed_yaml() {
    let err = YamlConfigParser::new().parse("not: valid: yaml: {{").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)), "unexpected error: {err}");
    assert!(err.to_string().starts_with("invalid workflow config YAML"));
}

#[test]
fn test_parse_rejects_undefined_dependency() {
    let payload = "modules:\n  - name: api\n    type: http.server\n    dependsOn: [cache]\n";
    let err = YamlConfigParser::new().parse(payload).unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.0[0].path, "modules[0].dependsOn[0]");
            assert!(errors.0[0].message.contains("\"cache\""));
        }
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn test_parse_rejects_config_without_modules() {
    let err = YamlConfigParser::new().parse("workflows: {}\n").unwrap_err();
    assert_eq!(
        err.to_string(),
        "config validation failed with 1 error(s):\n  - modules: at least one module is required"
    );
}

#[test]
fn test_static_parser_counts_calls() {
    let parser = StaticConfigParser::default();
    assert_eq!(parser.calls(), 0);
    parser.parse("anything").unwrap();
    parser.parse("").unwrap();
    assert_eq!(parser.calls(), 2);
}

#[test]
fn test_failing_parser_reports_message_verbatim() {
    let err = FailingConfigParser::new("engine rejected config").parse("x").unwrap_err();
    assert_eq!(err.to_string(), "engine rejected config");
}
