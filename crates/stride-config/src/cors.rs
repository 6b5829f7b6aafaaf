use std::time::Duration;

use serde::Deserialize;

/// Cross-origin policy for the chat UI
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins, `"*"` or a list
    #[serde(default)]
    pub origins: AnyOrList,
    /// Allowed request headers, `"*"` or a list
    #[serde(default)]
    pub headers: AnyOrList,
    /// Allow cookies and authorization headers
    #[serde(default)]
    pub credentials: bool,
    /// Preflight cache lifetime in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl CorsConfig {
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Wildcard or explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAnyOrList")]
pub enum AnyOrList {
    #[default]
    Any,
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnyOrList {
    One(String),
    Many(Vec<String>),
}

impl From<RawAnyOrList> for AnyOrList {
    fn from(raw: RawAnyOrList) -> Self {
        let values = match raw {
            RawAnyOrList::One(value) => vec![value],
            RawAnyOrList::Many(values) => values,
        };

        if values.iter().any(|v| v == "*") {
            Self::Any
        } else {
            Self::List(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        cors: CorsConfig,
    }

    #[test]
    fn wildcard_and_lists() {
        let parsed: Wrapper = toml::from_str(
            r#"
            [cors]
            origins = ["http://localhost:3002", "https://chat.example.com"]
            headers = "*"
            credentials = true
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.cors.origins,
            AnyOrList::List(vec![
                "http://localhost:3002".to_owned(),
                "https://chat.example.com".to_owned()
            ])
        );
        assert_eq!(parsed.cors.headers, AnyOrList::Any);
        assert!(parsed.cors.credentials);
    }

    #[test]
    fn wildcard_inside_list_means_any() {
        let parsed: Wrapper = toml::from_str("[cors]\norigins = [\"http://a\", \"*\"]").unwrap();
        assert_eq!(parsed.cors.origins, AnyOrList::Any);
    }
}
