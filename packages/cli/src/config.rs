use anyhow::{anyhow, Result};
use journal_editor::{
    BucketPdfUploader, ImageHostUploader, RestStore, Services, StaticAuth, DEFAULT_BUCKET_API,
    DEFAULT_IMAGE_ENDPOINT,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "journal.config.json";

/// Overrides `imageApiKey` so the key can stay out of the config file
pub const IMAGE_KEY_ENV: &str = "JOURNAL_IMAGE_API_KEY";

/// Journal configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root URL of the realtime database
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Database auth token appended to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_token: Option<String>,

    /// Bucket receiving uploaded PDFs
    #[serde(default)]
    pub storage_bucket: String,

    #[serde(default = "default_storage_api")]
    pub storage_api: String,

    #[serde(default = "default_image_endpoint")]
    pub image_endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_api_key: Option<String>,

    /// Identity submits are made as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub uid: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn default_database_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_storage_api() -> String {
    DEFAULT_BUCKET_API.to_string()
}

fn default_image_endpoint() -> String {
    DEFAULT_IMAGE_ENDPOINT.to_string()
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            debug!(path = %config_path.display(), "Loaded config");
            serde_json::from_str(&content)?
        } else {
            debug!(path = %config_path.display(), "No config file, using defaults");
            Config::default()
        };

        Ok(config.with_image_key(std::env::var(IMAGE_KEY_ENV).ok()))
    }

    fn with_image_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!(var = IMAGE_KEY_ENV, "Image API key taken from environment");
            self.image_api_key = Some(key);
        }
        self
    }

    /// Wire the REST adapters described by this config
    pub fn services(&self) -> Result<Services> {
        debug!(database = %self.database_url, bucket = %self.storage_bucket, "Connecting services");
        let auth = match &self.user {
            Some(user) => StaticAuth::signed_in(user.uid.clone(), user.email.clone()),
            None => StaticAuth::anonymous(),
        };

        Ok(Services {
            store: Arc::new(RestStore::new(&self.database_url, self.database_token.clone())?),
            images: Arc::new(ImageHostUploader::new(
                &self.image_endpoint,
                self.image_api_key.clone().unwrap_or_default(),
            )?),
            pdfs: Arc::new(BucketPdfUploader::new(&self.storage_api, &self.storage_bucket)?),
            auth: Arc::new(auth),
        })
    }

    /// Fail early when uploads are needed but a service is not configured
    pub fn check_uploads(&self, images: usize, pdfs: usize) -> Result<()> {
        if images > 0 && self.image_api_key.is_none() {
            return Err(anyhow!(
                "{} image(s) to upload but no imageApiKey is configured (or set {})",
                images,
                IMAGE_KEY_ENV
            ));
        }

        if pdfs > 0 && self.storage_bucket.trim().is_empty() {
            return Err(anyhow!("a PDF needs uploading but no storageBucket is configured"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_token: None,
            storage_bucket: String::new(),
            storage_api: default_storage_api(),
            image_endpoint: default_image_endpoint(),
            image_api_key: None,
            user: None,
        }
    }
}
