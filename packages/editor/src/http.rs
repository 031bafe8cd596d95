//! # HTTP Adapters
//!
//! REST implementations of the service seams:
//! - [`RestStore`]: realtime-database style JSON store (`{base}/{path}.json`)
//! - [`ImageHostUploader`]: image host taking a multipart `key` + `image` form
//!   and answering `{ "success": bool, "data": { "url": ... } }`
//! - [`BucketPdfUploader`]: object-storage bucket; objects are created with
//!   `POST {base}/{bucket}/o?name=...` and served with `?alt=media&token=...`

use crate::document::PendingFile;
use crate::keys::KeyGenerator;
use crate::services::{DocumentStore, ImageUploader, PdfUploader, StoreError, UploadError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Default image host endpoint
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://api.imgbb.com/1/upload";

/// Default object storage API root
pub const DEFAULT_BUCKET_API: &str = "https://firebasestorage.googleapis.com/v0/b";

fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Document store over the realtime database REST API
pub struct RestStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    keys: KeyGenerator,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Result<Self, StoreError> {
        Ok(Self::with_client(build_client()?, base_url, auth_token))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auth_token,
            keys: KeyGenerator::new(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, StoreError> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }

        let invalid = || StoreError::InvalidPath(path.to_string());
        let mut url = Url::parse(self.base_url.trim_end_matches('/')).map_err(|_| invalid())?;

        // Segments are percent-encoded, so `?` or `#` in a key stays in the path.
        let file = format!("{}.json", path);
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(file.split('/'));

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token);
        }
        Ok(url)
    }

    async fn get(&self, path: &str) -> Result<Value, StoreError> {
        let response = self.client.get(self.url(path)?).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Value::Null),
            status if status.is_success() => Ok(response.json().await?),
            status => Err(StoreError::Rejected {
                method: "GET",
                path: path.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

/// Children of a collection value; the database returns dense integer-keyed
/// collections as arrays with `null` holes.
fn collection_entries(value: Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let value = self.get(path).await?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        debug!(path = %path, "PUT");
        let response = self.client.put(self.url(path)?).json(&value).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                method: "PUT",
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        debug!(path = %path, "DELETE");
        let response = self.client.delete(self.url(path)?).send().await?;

        if !response.status().is_success() {
            return Err(StoreError::Rejected {
                method: "DELETE",
                path: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    // Keys are generated client-side, like the database's own SDKs do.
    async fn new_key(&self, _collection: &str) -> Result<String, StoreError> {
        Ok(self.keys.next_key())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let mut entries = collection_entries(self.get(collection).await?);
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct ImageHostResponse {
    #[serde(default)]
    success: bool,
    data: Option<ImageHostData>,
}

#[derive(Debug, Deserialize)]
struct ImageHostData {
    url: String,
}

impl ImageHostResponse {
    fn into_url(self, name: &str) -> Result<String, UploadError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data.url),
            _ => Err(UploadError::Failed {
                name: name.to_string(),
                message: "image host reported failure".to_string(),
            }),
        }
    }
}

/// Image uploader for an API-key image host
pub struct ImageHostUploader {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ImageHostUploader {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, UploadError> {
        Ok(Self {
            client: build_client()?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ImageUploader for ImageHostUploader {
    async fn upload(&self, file: &PendingFile) -> Result<String, UploadError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)?;
        let form = Form::new().text("key", self.api_key.clone()).part("image", part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                name: file.name.clone(),
                status: response.status().as_u16(),
            });
        }

        let body: ImageHostResponse = response.json().await?;
        body.into_url(&file.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// PDF uploader for an object-storage bucket
pub struct BucketPdfUploader {
    client: Client,
    api_root: String,
    bucket: String,
}

impl BucketPdfUploader {
    pub fn new(api_root: impl Into<String>, bucket: impl Into<String>) -> Result<Self, UploadError> {
        Ok(Self {
            client: build_client()?,
            api_root: api_root.into(),
            bucket: bucket.into(),
        })
    }

    fn objects_url(&self, name: &str) -> Result<Url, UploadError> {
        Url::parse(&format!(
            "{}/{}/o",
            self.api_root.trim_end_matches('/'),
            self.bucket
        ))
        .map_err(|e| UploadError::Failed {
            name: name.to_string(),
            message: format!("bad bucket URL: {}", e),
        })
    }

    /// Public URL of a stored object; `/` in the name is percent-encoded
    fn download_url(&self, name: &str, token: Option<&str>) -> Result<Url, UploadError> {
        let mut url = self.objects_url(name)?;
        url.path_segments_mut()
            .map_err(|_| UploadError::Failed {
                name: name.to_string(),
                message: "bucket URL cannot take path segments".to_string(),
            })?
            .push(name);

        url.query_pairs_mut().append_pair("alt", "media");
        if let Some(token) = token {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }
}

#[async_trait]
impl PdfUploader for BucketPdfUploader {
    async fn upload(&self, file: &PendingFile, namespace: &str) -> Result<String, UploadError> {
        let mut url = self.objects_url(&file.name)?;
        url.query_pairs_mut().append_pair("name", namespace);

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, file.content_type.as_str())
            .body(file.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected {
                name: file.name.clone(),
                status: response.status().as_u16(),
            });
        }

        let object: StoredObject = response.json().await?;
        let token = object
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next());

        Ok(self.download_url(&object.name, token)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_url_with_token() {
        let store = RestStore::with_client(
            Client::new(),
            "https://journal.example.firebaseio.com/",
            Some("secret".to_string()),
        );

        let url = store.url("/research/abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://journal.example.firebaseio.com/research/abc123.json?auth=secret"
        );
    }

    #[test]
    fn test_store_url_keeps_reserved_characters_in_path() {
        let store = RestStore::with_client(Client::new(), "https://db.example/root", None);

        let url = store.url("research/odd?id#frag").unwrap();
        assert_eq!(url.as_str(), "https://db.example/root/research/odd%3Fid%23frag.json");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_store_url_rejects_empty_path() {
        let store = RestStore::with_client(Client::new(), "https://db.example", None);
        assert!(matches!(store.url("/"), Err(StoreError::InvalidPath(_))));
    }

    #[test]
    fn test_collection_entries_from_object_and_array() {
        let from_object = collection_entries(json!({ "b": { "title": "B" }, "a": null }));
        assert_eq!(from_object, vec![("b".to_string(), json!({ "title": "B" }))]);

        let from_array = collection_entries(json!([null, { "title": "one" }]));
        assert_eq!(from_array, vec![("1".to_string(), json!({ "title": "one" }))]);

        assert!(collection_entries(Value::Null).is_empty());
    }

    #[test]
    fn test_image_host_response() {
        let ok: ImageHostResponse =
            serde_json::from_value(json!({ "success": true, "data": { "url": "https://i.example/x.png" } })).unwrap();
        assert_eq!(ok.into_url("x.png").unwrap(), "https://i.example/x.png");

        let failed: ImageHostResponse = serde_json::from_value(json!({ "success": false })).unwrap();
        assert!(matches!(failed.into_url("x.png"), Err(UploadError::Failed { .. })));
    }

    #[test]
    fn test_download_url_encodes_object_name() {
        let uploader = BucketPdfUploader::new(DEFAULT_BUCKET_API, "journal.appspot.com").unwrap();
        let url = uploader
            .download_url("researchPDFs/paper.pdf-1700000000000", Some("tok"))
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://firebasestorage.googleapis.com/v0/b/journal.appspot.com/o/researchPDFs%2Fpaper.pdf-1700000000000?alt=media&token=tok"
        );
    }
}
