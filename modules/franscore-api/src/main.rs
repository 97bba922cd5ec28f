use std::sync::Arc;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use franscore_common::Config;
use franscore_core::classifier::{OpenAiClassifier, UnconfiguredClassifier};
use franscore_core::gateway::{DisabledGateway, StripeCheckout};
use franscore_core::notify::{DisabledNotifier, PostmarkNotifier};
use franscore_core::{Classifier, Notifier, PaymentGateway, ServerDeps};
use postmark_client::PostmarkClient;
use stripe_client::StripeClient;

mod auth;
mod rest;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("franscore=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;

    let classifier: Arc<dyn Classifier> = match config.openai_api_key {
        Some(ref key) => Arc::new(OpenAiClassifier::new(OpenAi::new(
            key.clone(),
            config.openai_model.clone(),
        ))),
        None => {
            error!("OPENAI_API_KEY not configured - reviews will fall back to manual moderation");
            Arc::new(UnconfiguredClassifier)
        }
    };

    let notifier: Arc<dyn Notifier> = match config.postmark_api_token {
        Some(ref token) => Arc::new(PostmarkNotifier::new(
            PostmarkClient::new(token.clone()),
            config.postmark_from_email.clone(),
        )),
        None => {
            error!("POSTMARK_API_TOKEN not configured - email notifications disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let gateway: Arc<dyn PaymentGateway> =
        match (&config.stripe_secret_key, &config.stripe_claim_price_id) {
            (Some(secret), Some(price_id)) => Arc::new(StripeCheckout::new(
                StripeClient::new(secret.clone()),
                price_id.clone(),
            )),
            _ => {
                error!("STRIPE_SECRET_KEY not configured - payment service disabled");
                Arc::new(DisabledGateway)
            }
        };

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let state = Arc::new(ServerDeps::new(pool, classifier, notifier, gateway, config));

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Public REST API
        .route("/api/reviews", post(rest::reviews::submit_review))
        .route("/api/reviews/{id}/respond", post(rest::reviews::respond))
        .route("/api/reviews/{id}/report", post(rest::reviews::report))
        .route("/api/brands/{slug}", get(rest::brands::brand_detail))
        // Claim flow
        .route("/api/claims/checkout", post(rest::claims::create_checkout))
        .route("/api/webhooks/stripe", post(rest::webhook::stripe_webhook))
        // Admin moderation
        .route("/api/admin/reviews", get(rest::admin::moderation_queue))
        .route(
            "/api/admin/reviews/{id}/moderate",
            post(rest::admin::moderate_review),
        )
        .with_state(state)
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    info!("FranScore API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
