mod config;
mod db;
mod envelope;
mod errors;
mod event;
mod extraction;
mod fetcher;
mod models;
mod pipeline;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ModelProvider, StoreBackend};
use crate::db::create_pool;
use crate::extraction::anthropic::AnthropicModel;
use crate::extraction::bedrock::BedrockModel;
use crate::extraction::{ExtractionModel, Extractor};
use crate::fetcher::S3Fetcher;
use crate::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::dynamo::DynamoStore;
use crate::store::postgres::PgStore;
use crate::store::ResultStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration errors stop the process before anything is served
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV extractor v{}", env!("CARGO_PKG_VERSION"));

    let sdk_config = load_aws_config(&config).await;

    // Initialize S3 (or an S3-compatible endpoint)
    let fetcher = Arc::new(S3Fetcher::new(build_s3_client(&sdk_config, &config)));
    info!("S3 client initialized (bucket: {})", config.bucket_name);

    let model = build_model(&sdk_config, &config)?;
    info!(
        "Extraction model initialized ({:?}, model: {})",
        config.model_provider,
        model.model_id()
    );

    let store = build_store(&sdk_config, &config).await?;
    info!(
        "Result store initialized ({:?}, table: {})",
        config.result_store,
        store.table()
    );

    let pipeline = Pipeline::new(
        fetcher,
        Extractor::new(model),
        store,
        config.invocation_timeout,
    )
    .with_expected_bucket(config.bucket_name.clone());

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads AWS settings from the default provider chain, with an optional
/// region override.
async fn load_aws_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &config.aws_region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}

/// Constructs an S3 client for AWS, or for MinIO/LocalStack when
/// `S3_ENDPOINT` is set.
fn build_s3_client(sdk_config: &SdkConfig, config: &Config) -> aws_sdk_s3::Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
    if let Some(endpoint) = &config.s3_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}

fn build_model(sdk_config: &SdkConfig, config: &Config) -> Result<Arc<dyn ExtractionModel>> {
    let model: Arc<dyn ExtractionModel> = match config.model_provider {
        ModelProvider::Bedrock => Arc::new(BedrockModel::new(
            aws_sdk_bedrockruntime::Client::new(sdk_config),
            config.model_id.clone(),
        )),
        ModelProvider::Anthropic => {
            let api_key = config
                .anthropic_api_key
                .as_ref()
                .context("ANTHROPIC_API_KEY is required for the anthropic provider")?;
            Arc::new(AnthropicModel::new(
                api_key.expose().to_string(),
                config.model_id.clone(),
            )?)
        }
    };
    Ok(model)
}

async fn build_store(sdk_config: &SdkConfig, config: &Config) -> Result<Arc<dyn ResultStore>> {
    let store: Arc<dyn ResultStore> = match config.result_store {
        StoreBackend::DynamoDb => Arc::new(DynamoStore::new(
            aws_sdk_dynamodb::Client::new(sdk_config),
            config.table_name.clone(),
        )?),
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_ref()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = create_pool(database_url.expose()).await?;
            Arc::new(PgStore::new(pool, config.table_name.clone())?)
        }
    };
    Ok(store)
}
