use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("authorization header is expected")]
    MissingHeader,

    #[error("authorization header must be a bearer token")]
    MalformedHeader,

    #[error("authorization token must carry a key id")]
    MissingKid,

    #[error("unable to find the appropriate key")]
    UnknownKey,

    #[error("token expired")]
    TokenExpired,

    #[error("incorrect claims, check the audience and issuer")]
    InvalidClaims,

    #[error("unable to parse the authentication token")]
    InvalidToken,

    #[error("permission '{0}' not granted")]
    Forbidden(String),

    #[error("failed to fetch the signing keys: {0}")]
    JwksFetch(String),
}

impl AuthError {
    /// Stable machine-readable code carried in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::MissingKid
            | AuthError::UnknownKey
            | AuthError::InvalidToken => "invalid_header",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::JwksFetch(_) => "jwks_unavailable",
        }
    }
}

/// Claims we read out of a verified access token. Registered claims
/// (exp, aud, iss) are enforced by the validation step itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Claims {
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if self.permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AuthError::Forbidden(permission.to_string()))
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub key_use: Option<String>,
    #[serde(default)]
    pub n: String,
    #[serde(default)]
    pub e: String,
}

impl Jwks {
    /// Selects the RSA key matching the token's key id.
    pub fn find_key(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kty == "RSA" && k.kid == kid)
    }
}

/// Fetches the tenant's key set. Deliberately uncached: every
/// verification refetches, matching the reference flow.
pub async fn fetch_jwks(client: &reqwest::Client, jwks_url: &str) -> Result<Jwks, AuthError> {
    let response = client
        .get(jwks_url)
        .send()
        .await
        .map_err(|e| AuthError::JwksFetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AuthError::JwksFetch(format!(
            "key set endpoint returned {}",
            response.status()
        )));
    }

    response
        .json::<Jwks>()
        .await
        .map_err(|e| AuthError::JwksFetch(e.to_string()))
}

/// Verifies a bearer token end to end: JOSE header, key lookup,
/// RS256 signature, audience and issuer claims.
pub async fn verify(
    client: &reqwest::Client,
    jwks_url: &str,
    issuer: &str,
    audience: &str,
    token: &str,
) -> Result<Claims, AuthError> {
    let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
    let kid = header.kid.ok_or(AuthError::MissingKid)?;

    let jwks = fetch_jwks(client, jwks_url).await?;
    let jwk = jwks.find_key(&kid).ok_or(AuthError::UnknownKey)?;

    let key =
        DecodingKey::from_rsa_components(&jwk.n, &jwk.e).map_err(|_| AuthError::InvalidToken)?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&[audience]);
    validation.set_issuer(&[issuer]);

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
        _ => AuthError::InvalidToken,
    })?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_bearer_accepts_standard_header() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn parse_bearer_is_scheme_case_insensitive() {
        assert_eq!(parse_bearer("bearer token").unwrap(), "token");
        assert_eq!(parse_bearer("BEARER token").unwrap(), "token");
    }

    #[test]
    fn parse_bearer_rejects_other_schemes() {
        assert!(matches!(
            parse_bearer("Basic dXNlcjpwYXNz"),
            Err(AuthError::MalformedHeader)
        ));
    }

    #[test]
    fn parse_bearer_rejects_missing_or_extra_parts() {
        assert!(parse_bearer("Bearer").is_err());
        assert!(parse_bearer("Bearer a b").is_err());
        assert!(parse_bearer("").is_err());
    }

    #[test]
    fn require_passes_when_permission_granted() {
        let claims = Claims {
            sub: "auth0|curator".to_string(),
            permissions: vec!["post:questions".to_string(), "delete:questions".to_string()],
        };
        assert!(claims.require("delete:questions").is_ok());
    }

    #[test]
    fn require_fails_when_permission_missing() {
        let claims = Claims {
            sub: "auth0|player".to_string(),
            permissions: vec!["get:answers".to_string()],
        };
        let err = claims.require("delete:questions").unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(p) if p == "delete:questions"));
    }

    #[test]
    fn require_fails_on_empty_permissions() {
        let claims = Claims {
            sub: "auth0|nobody".to_string(),
            permissions: vec![],
        };
        assert!(claims.require("post:questions").is_err());
    }

    #[test]
    fn find_key_matches_rsa_kid() {
        let jwks = Jwks {
            keys: vec![
                Jwk {
                    kty: "oct".to_string(),
                    kid: "sym".to_string(),
                    key_use: None,
                    n: String::new(),
                    e: String::new(),
                },
                Jwk {
                    kty: "RSA".to_string(),
                    kid: "rsa-1".to_string(),
                    key_use: Some("sig".to_string()),
                    n: "abc".to_string(),
                    e: "AQAB".to_string(),
                },
            ],
        };

        assert_eq!(jwks.find_key("rsa-1").unwrap().n, "abc");
        // A symmetric key never matches, even with the right kid
        assert!(jwks.find_key("sym").is_none());
        assert!(jwks.find_key("missing").is_none());
    }

    fn hs256_token(kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        let claims = json!({
            "sub": "auth0|test",
            "exp": 4_102_444_800u64,
        });
        encode(&header, &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
    }

    #[tokio::test]
    async fn fetch_jwks_parses_key_set() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [
                    { "kty": "RSA", "kid": "key-1", "use": "sig", "n": "abc", "e": "AQAB" }
                ]
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/.well-known/jwks.json", server.uri());
        let jwks = fetch_jwks(&client, &url).await.unwrap();

        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].kid, "key-1");
    }

    #[tokio::test]
    async fn fetch_jwks_maps_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/.well-known/jwks.json", server.uri());
        let err = fetch_jwks(&client, &url).await.unwrap_err();

        assert!(matches!(err, AuthError::JwksFetch(_)));
    }

    #[tokio::test]
    async fn verify_rejects_token_without_kid() {
        // kid is checked before any network call, so no server is needed
        let client = reqwest::Client::new();
        let token = hs256_token(None);
        let err = verify(
            &client,
            "http://127.0.0.1:9/.well-known/jwks.json",
            "https://example.auth0.com/",
            "trivia",
            &token,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AuthError::MissingKid));
    }

    #[tokio::test]
    async fn verify_rejects_unknown_key_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/.well-known/jwks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "keys": [
                    { "kty": "RSA", "kid": "key-1", "use": "sig", "n": "abc", "e": "AQAB" }
                ]
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/.well-known/jwks.json", server.uri());
        let token = hs256_token(Some("key-2"));
        let err = verify(&client, &url, "https://example.auth0.com/", "trivia", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UnknownKey));
    }

    #[tokio::test]
    async fn verify_rejects_garbage_token() {
        let client = reqwest::Client::new();
        let err = verify(
            &client,
            "http://127.0.0.1:9/.well-known/jwks.json",
            "https://example.auth0.com/",
            "trivia",
            "not-a-jwt",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    #[ignore] // Requires a live tenant issuing RS256 tokens
    async fn verify_accepts_real_token() {
        let domain = std::env::var("AUTH_DOMAIN").unwrap();
        let token = std::env::var("AUTH_TEST_TOKEN").unwrap();
        let client = reqwest::Client::new();

        let claims = verify(
            &client,
            &format!("https://{}/.well-known/jwks.json", domain),
            &format!("https://{}/", domain),
            "trivia",
            &token,
        )
        .await
        .unwrap();

        assert!(!claims.sub.is_empty());
    }
}
