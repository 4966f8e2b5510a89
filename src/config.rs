use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Auth tenant (Auth0-style). Tokens are verified against
    // https://<auth_domain>/.well-known/jwks.json
    pub auth_domain: String,
    pub auth_audience: String,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            auth_domain: config.get("auth_domain")?,
            auth_audience: config.get("auth_audience")?,
        })
    }

    /// Expected `iss` claim for tokens minted by this tenant.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth_domain)
    }

    /// URL of the tenant's JSON Web Key Set.
    pub fn jwks_url(&self) -> String {
        format!("https://{}/.well-known/jwks.json", self.auth_domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/trivia_test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            auth_domain: "example.auth0.com".to_string(),
            auth_audience: "trivia".to_string(),
        }
    }

    #[test]
    fn issuer_has_trailing_slash() {
        assert_eq!(test_config().issuer(), "https://example.auth0.com/");
    }

    #[test]
    fn jwks_url_is_well_known() {
        assert_eq!(
            test_config().jwks_url(),
            "https://example.auth0.com/.well-known/jwks.json"
        );
    }
}
