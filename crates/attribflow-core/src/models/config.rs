/// Configuration - loaded from environment variables at startup
use crate::constants::{DEFAULT_ALLOWED_ORIGIN_REGEX, DEFAULT_API_VERSION};
use crate::error::AttribflowError;
use regex::Regex;
use url::Url;

/// Externally supplied configuration surface
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Storefront domain, e.g. "my-shop.myshopify.com"
    pub shop_domain: String,
    /// Admin API access token
    pub access_token: String,
    /// Shared secret for webhook signature verification
    pub webhook_secret: String,
    /// Admin API version string
    pub api_version: String,
    /// Origin allowlist pattern for CORS (credentialed requests)
    pub allowed_origin: Regex,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AttribflowError> {
        let shop_domain = std::env::var("SHOPIFY_SHOP_DOMAIN")
            .map_err(|_| AttribflowError::Config("Missing SHOPIFY_SHOP_DOMAIN".to_string()))?;
        let access_token = std::env::var("SHOPIFY_ACCESS_TOKEN")
            .map_err(|_| AttribflowError::Config("Missing SHOPIFY_ACCESS_TOKEN".to_string()))?;
        let webhook_secret = std::env::var("SHOPIFY_WEBHOOK_SECRET")
            .map_err(|_| AttribflowError::Config("Missing SHOPIFY_WEBHOOK_SECRET".to_string()))?;
        let api_version = std::env::var("SHOPIFY_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());
        let origin_pattern = std::env::var("ALLOWED_ORIGIN_REGEX")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGIN_REGEX.to_string());

        Self::new(
            shop_domain,
            access_token,
            webhook_secret,
            api_version,
            &origin_pattern,
        )
    }

    pub fn new(
        shop_domain: String,
        access_token: String,
        webhook_secret: String,
        api_version: String,
        origin_pattern: &str,
    ) -> Result<Self, AttribflowError> {
        let allowed_origin = Regex::new(origin_pattern).map_err(|e| {
            AttribflowError::Config(format!("Invalid ALLOWED_ORIGIN_REGEX: {}", e))
        })?;

        let config = Self {
            shop_domain,
            access_token,
            webhook_secret,
            api_version,
            allowed_origin,
        };
        config.validate()?;

        tracing::info!(shop = %config.shop_domain, "Configuration validated successfully");
        Ok(config)
    }

    fn validate(&self) -> Result<(), AttribflowError> {
        if self.shop_domain.trim().is_empty() {
            return Err(AttribflowError::Config("Empty shop domain".to_string()));
        }
        // The domain must form a valid https base URL for the Admin API
        Url::parse(&format!("https://{}", self.shop_domain))
            .map_err(|e| AttribflowError::Config(format!("Invalid shop domain: {}", e)))?;

        if self.access_token.trim().is_empty() {
            return Err(AttribflowError::Config("Empty access token".to_string()));
        }
        if self.webhook_secret.trim().is_empty() {
            return Err(AttribflowError::Config("Empty webhook secret".to_string()));
        }
        Ok(())
    }

    /// Whether a browser origin is allowed to make credentialed requests
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origin.is_match(origin)
    }
}
