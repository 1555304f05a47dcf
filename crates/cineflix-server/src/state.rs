use anyhow::{Context, Result};
use cineflix_config::{Config, KeyStore, PathManager};
use cineflix_core::{Authenticator, JsonReviewStore, JsonUserStore, KeyRing, ReviewService, UserService};
use cineflix_sources::{CategoryFetcher, HttpFetcher, PageFetcher, TmdbScraper, YoutubeClient};
use std::sync::Arc;
use tracing::{info, warn};

/// Overrides every key in keys.toml with a single secret
pub const JWT_SECRET_ENV: &str = "CINEFLIX_JWT_SECRET";

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub reviews: ReviewService,
    pub users: UserService,
    pub auth: Authenticator,
    pub scraper: TmdbScraper,
    pub categories: CategoryFetcher,
    pub youtube: YoutubeClient,
}

impl AppState {
    /// Wire stores, upstream clients and the authenticator from configuration
    pub async fn build(config: &Config, paths: &PathManager) -> Result<Self> {
        let paths = match &config.storage.data_dir {
            Some(dir) => paths.clone().with_data_dir(dir),
            None => paths.clone(),
        };

        let review_store = Arc::new(
            JsonReviewStore::open(paths.reviews_file())
                .await
                .with_context(|| format!("Failed to open review store at {}", paths.reviews_file().display()))?,
        );
        let user_store = Arc::new(
            JsonUserStore::open(paths.users_file())
                .await
                .with_context(|| format!("Failed to open user store at {}", paths.users_file().display()))?,
        );

        let keys = load_key_ring(&paths)?;
        let http = HttpFetcher::from_config(&config.upstream)?;
        let youtube = YoutubeClient::from_config(http.client().clone(), &config.youtube);
        if !youtube.is_configured() {
            warn!("YouTube API key not configured, trailer lookups will fail");
        }
        let fetcher: Arc<dyn PageFetcher> = Arc::new(http);

        info!(data_dir = %paths.data_dir().display(), "Application state ready");
        Ok(Self {
            reviews: ReviewService::new(review_store),
            users: UserService::new(user_store.clone()),
            auth: Authenticator::new(keys, config.auth.token_ttl_minutes, user_store),
            scraper: TmdbScraper::new(fetcher.clone(), config.upstream.tmdb_base_url.clone()),
            categories: CategoryFetcher::from_config(fetcher, &config.upstream),
            youtube,
        })
    }
}

fn load_key_ring(paths: &PathManager) -> Result<KeyRing> {
    if let Ok(secret) = std::env::var(JWT_SECRET_ENV) {
        if !secret.is_empty() {
            info!("Using token signing key from {}", JWT_SECRET_ENV);
            return Ok(KeyRing::new(vec![secret])?);
        }
    }

    let mut store = KeyStore::new(paths.keys_file());
    store.load().context("Failed to read signing keys")?;
    if store.ensure_key() {
        store.save().context("Failed to save generated signing key")?;
        info!(path = %paths.keys_file().display(), "Generated new token signing key");
    }
    Ok(KeyRing::new(store.signing_keys().to_vec())?)
}
