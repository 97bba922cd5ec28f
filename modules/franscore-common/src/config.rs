use anyhow::Result;

/// Application configuration loaded from environment variables.
/// Only secrets and env-specific values live here; scoring weights and
/// moderation guidelines are code, not config.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // AI classifier
    pub openai_api_key: Option<String>,
    pub openai_model: String,

    // Payments
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_claim_price_id: Option<String>,

    // Email
    pub postmark_api_token: Option<String>,
    pub postmark_from_email: String,

    // API
    pub api_host: String,
    pub api_port: u16,
    pub base_url: String,
    pub admin_api_token: Option<String>,

    // Review submission throttle (per author, per 24h)
    pub review_rate_limit_per_day: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")?,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
            stripe_webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            stripe_claim_price_id: std::env::var("STRIPE_BRAND_CLAIM_PRICE_ID").ok(),
            postmark_api_token: std::env::var("POSTMARK_API_TOKEN").ok(),
            postmark_from_email: std::env::var("POSTMARK_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@franscore.com".to_string()),
            api_host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            admin_api_token: std::env::var("ADMIN_API_TOKEN").ok(),
            review_rate_limit_per_day: std::env::var("REVIEW_RATE_LIMIT_PER_DAY")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  OPENAI_API_KEY: {}", preview_opt(&self.openai_api_key));
        tracing::info!("  STRIPE_SECRET_KEY: {}", preview_opt(&self.stripe_secret_key));
        tracing::info!(
            "  STRIPE_WEBHOOK_SECRET: {}",
            preview_opt(&self.stripe_webhook_secret)
        );
        tracing::info!(
            "  POSTMARK_API_TOKEN: {}",
            preview_opt(&self.postmark_api_token)
        );
        tracing::info!("  ADMIN_API_TOKEN: {}", preview_opt(&self.admin_api_token));
    }
}
