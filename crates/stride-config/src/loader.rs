use std::path::Path;

use anyhow::Context;
use secrecy::ExposeSecret;

use crate::{Config, LlmProviderType};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// `{{ env.VAR }}` placeholders are expanded before parsing, and the
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot
    /// be resolved, the TOML is malformed, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the configuration can actually run an exchange
    ///
    /// # Errors
    ///
    /// Returns an error naming the first inconsistent setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_llm()?;
        self.validate_chat()?;
        Ok(())
    }

    fn validate_llm(&self) -> anyhow::Result<()> {
        let llm = &self.llm;
        let provider = llm.provider.as_str();

        if llm.api_key.as_ref().is_none_or(|k| k.expose_secret().is_empty()) {
            anyhow::bail!("llm.api_key is required for the {provider} provider");
        }

        if llm.provider == LlmProviderType::Openai {
            if llm.base_url.is_none() {
                anyhow::bail!("llm.base_url is required for the openai provider");
            }
            if llm.model.as_deref().is_none_or(str::is_empty) {
                anyhow::bail!("llm.model is required for the openai provider");
            }
        }

        if llm.max_tokens == 0 {
            anyhow::bail!("llm.max_tokens must be greater than 0");
        }

        Ok(())
    }

    fn validate_chat(&self) -> anyhow::Result<()> {
        let chat = &self.chat;

        if chat.max_tool_rounds == 0 {
            anyhow::bail!("chat.max_tool_rounds must be at least 1");
        }
        if !(0.0..=2.0).contains(&chat.default_temperature) {
            anyhow::bail!("chat.default_temperature must be between 0 and 2");
        }
        if chat.event_buffer == 0 {
            anyhow::bail!("chat.event_buffer must be greater than 0");
        }
        if chat.max_message_length == 0 {
            anyhow::bail!("chat.max_message_length must be greater than 0");
        }

        Ok(())
    }

    /// Model an exchange uses when the client does not choose one
    pub fn default_model(&self) -> &str {
        self.llm.model.as_deref().unwrap_or(&self.chat.default_model)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use crate::{AnyOrList, McpServerConfig};

    use super::*;

    fn load_str(toml: &str) -> anyhow::Result<Config> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        Config::load(file.path())
    }

    #[test]
    fn minimal_anthropic_config_uses_defaults() {
        let config = temp_env::with_var("STRIDE_TEST_ANTHROPIC_KEY", Some("sk-ant"), || {
            load_str(
                r#"
                [llm]
                provider = "anthropic"
                api_key = "{{ env.STRIDE_TEST_ANTHROPIC_KEY }}"
                "#,
            )
        })
        .unwrap();

        assert_eq!(config.llm.provider, LlmProviderType::Anthropic);
        assert_eq!(config.llm.api_key.unwrap().expose_secret(), "sk-ant");
        assert_eq!(config.chat.max_tool_rounds, 5);
        assert_eq!(config.chat.tool_timeout, Duration::from_secs(30));
        assert_eq!(config.chat.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(config.chat.max_message_length, 4000);
        assert!(config.server.health.enabled);
        assert!(config.mcp.servers.is_empty());
    }

    #[test]
    fn full_config_parses() {
        let config = load_str(
            r#"
            [server]
            listen_address = "127.0.0.1:3001"

            [server.cors]
            origins = ["http://localhost:3002"]

            [server.rate_limit]
            messages_per_minute = 10

            [llm]
            provider = "openai-compat"
            api_key = "sk-test"
            base_url = "http://localhost:11434/v1"
            model = "llama3.1"

            [chat]
            tool_timeout = "5s"
            stream_idle_timeout = "1m"
            max_tool_rounds = 3

            [store]
            path = ":memory:"

            [mcp.servers.strava]
            transport = "stdio"
            command = "node"
            args = ["mcp-server/dist/index.js"]
            env = { DUCKDB_PATH = "data/reporting.duckdb" }

            [telemetry]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, LlmProviderType::Openai);
        assert_eq!(config.default_model(), "llama3.1");
        assert_eq!(config.chat.tool_timeout, Duration::from_secs(5));
        assert_eq!(config.chat.stream_idle_timeout, Duration::from_secs(60));
        assert_eq!(config.chat.max_tool_rounds, 3);
        assert!(config.store.is_in_memory());

        let cors = config.server.cors.unwrap();
        assert_eq!(cors.origins, AnyOrList::List(vec!["http://localhost:3002".to_owned()]));

        let limit = config.server.rate_limit.unwrap();
        assert_eq!(limit.messages_per_minute, 10);
        assert_eq!(limit.messages_per_day, 500);

        let Some(McpServerConfig::Stdio(stdio)) = config.mcp.servers.get("strava") else {
            panic!("expected stdio server");
        };
        assert_eq!(stdio.command, "node");
        assert_eq!(stdio.env.get("DUCKDB_PATH").map(String::as_str), Some("data/reporting.duckdb"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = load_str("[llm]\nprovider = \"anthropic\"\n").unwrap_err();
        assert!(err.to_string().contains("llm.api_key"), "{err}");
    }

    #[test]
    fn openai_requires_base_url_and_model() {
        let err = load_str("[llm]\nprovider = \"openai\"\napi_key = \"k\"\nmodel = \"m\"\n").unwrap_err();
        assert!(err.to_string().contains("llm.base_url"), "{err}");

        let err = load_str("[llm]\nprovider = \"openai\"\napi_key = \"k\"\nbase_url = \"http://x/v1\"\n").unwrap_err();
        assert!(err.to_string().contains("llm.model"), "{err}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_str("[llm]\napi_key = \"k\"\nflavour = \"x\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("flavour"), "{err:#}");
    }

    #[test]
    fn bad_duration_is_rejected() {
        let err = load_str("[llm]\napi_key = \"k\"\n[chat]\ntool_timeout = \"soon\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid duration"), "{err:#}");
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let err = load_str("[llm]\napi_key = \"k\"\n[chat]\nmax_tool_rounds = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_tool_rounds"), "{err}");
    }
}
