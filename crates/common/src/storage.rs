//! Object storage abstraction for photo blobs.
//!
//! Blobs are addressed by an opaque name that is never handed to callers
//! directly; read access goes through time-boxed signed URLs minted by
//! [`SignedUrlIssuer`]. Minting is a local HMAC computation, no network
//! round trip.

use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Storage backend trait for blob operations.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Save blob data under the given name.
    async fn save(&self, name: &str, data: &[u8]) -> AppResult<()>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, name: &str) -> AppResult<()>;

    /// Check whether a blob exists.
    async fn exists(&self, name: &str) -> AppResult<bool>;

    /// Load a blob's contents.
    async fn load(&self, name: &str) -> AppResult<Vec<u8>>;

    /// Canonical (unsigned) URL for a blob.
    fn url(&self, name: &str) -> String;
}

/// Shared handle to the configured storage backend.
pub type StorageService = Arc<dyn StorageBackend>;

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn save(&self, name: &str, data: &[u8]) -> AppResult<()> {
        let path = self.path_for(name);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write blob: {e}")))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        let path = self.path_for(name);
        if path.exists() {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to delete blob: {e}")))?;
        }
        Ok(())
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        Ok(self.path_for(name).exists())
    }

    async fn load(&self, name: &str) -> AppResult<Vec<u8>> {
        tokio::fs::read(self.path_for(name))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read blob: {e}")))
    }

    fn url(&self, name: &str) -> String {
        format!("{}/blobs/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// No-op storage backend for tests or when blob storage is disabled.
#[derive(Clone, Default)]
pub struct NoOpStorage {
    base_url: String,
}

impl NoOpStorage {
    /// Create a new no-op storage backend.
    #[must_use]
    pub const fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait::async_trait]
impl StorageBackend for NoOpStorage {
    async fn save(&self, _name: &str, _data: &[u8]) -> AppResult<()> {
        Ok(())
    }

    async fn delete(&self, _name: &str) -> AppResult<()> {
        Ok(())
    }

    async fn exists(&self, _name: &str) -> AppResult<bool> {
        Ok(false)
    }

    async fn load(&self, name: &str) -> AppResult<Vec<u8>> {
        Err(AppError::Storage(format!("No such blob: {name}")))
    }

    fn url(&self, name: &str) -> String {
        format!("{}/blobs/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// Mints and verifies time-boxed read-only access URLs for blobs.
///
/// A signed URL is the blob's canonical URL plus `se` (unix expiry), `sp=r`
/// and `sig` (HMAC over name and expiry) query parameters.
#[derive(Clone)]
pub struct SignedUrlIssuer {
    key: Vec<u8>,
    ttl_secs: u64,
}

impl SignedUrlIssuer {
    /// Create a new issuer from the storage account key.
    #[must_use]
    pub fn new(account_key: &str, ttl_secs: u64) -> Self {
        Self {
            key: account_key.as_bytes().to_vec(),
            ttl_secs,
        }
    }

    /// Whether a URL already carries an access-token suffix.
    #[must_use]
    pub fn is_signed(url: &str) -> bool {
        url::Url::parse(url)
            .map(|u| u.query_pairs().any(|(k, _)| k == "sig"))
            .unwrap_or(false)
    }

    /// Mint a signed read-only URL for the blob behind `base_url`.
    pub fn mint(&self, base_url: &str, blob_name: &str) -> AppResult<String> {
        let expiry = chrono::Utc::now().timestamp() + self.ttl_secs as i64;
        let sig = self.signature(blob_name, expiry)?;

        let separator = if base_url.contains('?') { '&' } else { '?' };
        Ok(format!("{base_url}{separator}se={expiry}&sp=r&sig={sig}"))
    }

    /// Verify the `se`/`sig` parameters presented for a blob.
    ///
    /// Returns false for missing parameters, a bad signature, or an expired
    /// token.
    #[must_use]
    pub fn verify(&self, blob_name: &str, expiry: i64, sig: &str) -> bool {
        if expiry <= chrono::Utc::now().timestamp() {
            return false;
        }

        let Ok(presented) = URL_SAFE_NO_PAD.decode(sig) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            return false;
        };
        mac.update(Self::payload(blob_name, expiry).as_bytes());
        mac.verify_slice(&presented).is_ok()
    }

    fn payload(blob_name: &str, expiry: i64) -> String {
        format!("{blob_name}\n{expiry}\nr")
    }

    fn signature(&self, blob_name: &str, expiry: i64) -> AppResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::Internal(format!("Invalid signing key: {e}")))?;
        mac.update(Self::payload(blob_name, expiry).as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_appends_token() {
        let issuer = SignedUrlIssuer::new("account-key", 3600);
        let url = issuer
            .mint("https://cdn.example.com/blobs/abc.jpg", "abc.jpg")
            .unwrap();

        assert!(url.starts_with("https://cdn.example.com/blobs/abc.jpg?se="));
        assert!(url.contains("sp=r"));
        assert!(url.contains("sig="));
        assert!(SignedUrlIssuer::is_signed(&url));
    }

    #[test]
    fn test_unsigned_url_detected() {
        assert!(!SignedUrlIssuer::is_signed(
            "https://cdn.example.com/blobs/abc.jpg"
        ));
        assert!(!SignedUrlIssuer::is_signed("not a url"));
    }

    #[test]
    fn test_verify_round_trip() {
        let issuer = SignedUrlIssuer::new("account-key", 3600);
        let expiry = chrono::Utc::now().timestamp() + 3600;
        let sig = issuer.signature("abc.jpg", expiry).unwrap();

        assert!(issuer.verify("abc.jpg", expiry, &sig));
        // Wrong blob
        assert!(!issuer.verify("other.jpg", expiry, &sig));
        // Tampered signature
        assert!(!issuer.verify("abc.jpg", expiry, "AAAA"));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let issuer = SignedUrlIssuer::new("account-key", 3600);
        let expiry = chrono::Utc::now().timestamp() - 10;
        let sig = issuer.signature("abc.jpg", expiry).unwrap();

        assert!(!issuer.verify("abc.jpg", expiry, &sig));
    }

    #[tokio::test]
    async fn test_local_storage_round_trip() {
        let dir = std::env::temp_dir().join(format!("photoshare-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.clone(), "http://localhost:3000".to_string());

        storage.save("a/b.jpg", b"bytes").await.unwrap();
        assert!(storage.exists("a/b.jpg").await.unwrap());
        assert_eq!(storage.load("a/b.jpg").await.unwrap(), b"bytes");
        assert_eq!(
            storage.url("a/b.jpg"),
            "http://localhost:3000/blobs/a/b.jpg"
        );

        storage.delete("a/b.jpg").await.unwrap();
        assert!(!storage.exists("a/b.jpg").await.unwrap());
        // Deleting again is a no-op
        storage.delete("a/b.jpg").await.unwrap();

        tokio::fs::remove_dir_all(dir).await.ok();
    }
}
