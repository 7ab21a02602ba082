use crate::i18n::StoreFailurePolicy;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Sanity content store
    pub sanity_project_id: String,
    pub sanity_dataset: String,
    pub sanity_api_version: String,
    pub sanity_api_token: Option<String>,
    pub sanity_api_url: String,
    pub content_store_max_attempts: u32,

    // Webhook
    pub revalidate_secret: Option<String>,

    // Slug validation
    pub slug_store_failure_policy: StoreFailurePolicy,

    // Site
    pub site_url: String,
    pub port: u16,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let sanity_project_id = std::env::var("SANITY_PROJECT_ID")
            .context("SANITY_PROJECT_ID not set")?;

        let sanity_api_url = optional_var("SANITY_API_URL")
            .unwrap_or_else(|| format!("https://{}.api.sanity.io", sanity_project_id));

        let slug_store_failure_policy = match optional_var("SLUG_STORE_FAILURE_POLICY") {
            Some(value) => value
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid SLUG_STORE_FAILURE_POLICY")?,
            None => StoreFailurePolicy::default(),
        };

        Ok(Self {
            sanity_project_id,
            sanity_dataset: optional_var("SANITY_DATASET")
                .unwrap_or_else(|| "production".to_string()),
            sanity_api_version: optional_var("SANITY_API_VERSION")
                .unwrap_or_else(|| "2024-01-01".to_string()),
            sanity_api_token: optional_var("SANITY_API_TOKEN"),
            sanity_api_url: sanity_api_url.trim_end_matches('/').to_string(),
            content_store_max_attempts: std::env::var("CONTENT_STORE_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n >= 1)
                .unwrap_or(1),

            revalidate_secret: optional_var("SANITY_REVALIDATE_SECRET"),

            slug_store_failure_policy,

            site_url: optional_var("SITE_URL")
                .unwrap_or_else(|| "https://villamorairahuren.nl".to_string())
                .trim_end_matches('/')
                .to_string(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// Endpoint for GROQ queries against the configured dataset.
    pub fn query_url(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.sanity_api_url, self.sanity_api_version, self.sanity_dataset
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 10] = [
        "SANITY_PROJECT_ID",
        "SANITY_DATASET",
        "SANITY_API_VERSION",
        "SANITY_API_TOKEN",
        "SANITY_API_URL",
        "CONTENT_STORE_MAX_ATTEMPTS",
        "SANITY_REVALIDATE_SECRET",
        "SLUG_STORE_FAILURE_POLICY",
        "SITE_URL",
        "PORT",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_project_id() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SANITY_PROJECT_ID"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("SANITY_PROJECT_ID", "abc123");

        let config = Config::from_env().unwrap();
        assert_eq!(config.sanity_dataset, "production");
        assert_eq!(config.sanity_api_version, "2024-01-01");
        assert_eq!(config.sanity_api_url, "https://abc123.api.sanity.io");
        assert!(config.sanity_api_token.is_none());
        assert!(config.revalidate_secret.is_none());
        assert_eq!(config.slug_store_failure_policy, StoreFailurePolicy::Blocking);
        assert_eq!(config.content_store_max_attempts, 1);
        assert_eq!(config.site_url, "https://villamorairahuren.nl");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.query_url(),
            "https://abc123.api.sanity.io/v2024-01-01/data/query/production"
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("SANITY_PROJECT_ID", "abc123");
        std::env::set_var("SANITY_DATASET", "staging");
        std::env::set_var("SANITY_API_URL", "http://localhost:9999/");
        std::env::set_var("SANITY_REVALIDATE_SECRET", "s3cret");
        std::env::set_var("SLUG_STORE_FAILURE_POLICY", "permissive");
        std::env::set_var("CONTENT_STORE_MAX_ATTEMPTS", "3");
        std::env::set_var("SITE_URL", "https://example.test///");
        std::env::set_var("PORT", "3000");

        let config = Config::from_env().unwrap();
        assert_eq!(config.query_url(), "http://localhost:9999/v2024-01-01/data/query/staging");
        assert_eq!(config.revalidate_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.slug_store_failure_policy, StoreFailurePolicy::Permissive);
        assert_eq!(config.content_store_max_attempts, 3);
        assert_eq!(config.site_url, "https://example.test");
        assert_eq!(config.port, 3000);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_secret_counts_as_unset() {
        clear_env();
        std::env::set_var("SANITY_PROJECT_ID", "abc123");
        std::env::set_var("SANITY_REVALIDATE_SECRET", "  ");

        let config = Config::from_env().unwrap();
        assert!(config.revalidate_secret.is_none());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_policy_rejected() {
        clear_env();
        std::env::set_var("SANITY_PROJECT_ID", "abc123");
        std::env::set_var("SLUG_STORE_FAILURE_POLICY", "sometimes");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SLUG_STORE_FAILURE_POLICY"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_attempts_falls_back_to_one() {
        clear_env();
        std::env::set_var("SANITY_PROJECT_ID", "abc123");
        std::env::set_var("CONTENT_STORE_MAX_ATTEMPTS", "0");

        assert_eq!(Config::from_env().unwrap().content_store_max_attempts, 1);

        clear_env();
    }
}
