//! Media collaborator seam: uploads, deletes, derived-rendition URLs, and
//! signing for direct client uploads, plus an in-memory implementation.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::foundation::error::{EmblemError, EmblemResult};
use crate::render::raster::RasterFormat;

/// Folder new uploads land in unless the caller picks another.
pub const DEFAULT_FOLDER: &str = "logo-maker";

/// Provider record returned by a successful upload.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    /// Provider-side identity used for deletes and URL transforms.
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Provider-detected format tag (`png`, `svg`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub byte_size: u64,
}

/// Derived-rendition request, served by the provider from the original
/// upload without a re-upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Lossy-encoding quality in `1..=100`.
    pub quality: Option<u8>,
    pub format: Option<RasterFormat>,
}

impl TransformOptions {
    /// Rendition bounded to `width x height`.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn format(mut self, format: RasterFormat) -> Self {
        self.format = Some(format);
        self
    }

    fn is_identity(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.quality.is_none()
            && self.format.is_none()
    }
}

/// Parameters a client asks to have signed before uploading straight to the
/// provider.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SignRequest {
    pub folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    pub resource_type: String,
}

impl Default for SignRequest {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER.to_string(),
            public_id: None,
            resource_type: "auto".to_string(),
        }
    }
}

/// Signed parameter set handed back to the client.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SignedUpload {
    /// Unix seconds the signature covers.
    pub timestamp: i64,
    /// Lowercase hex digest over the canonical parameter string.
    pub signature: String,
    /// Exact parameters the signature covers, sorted by key.
    pub params: BTreeMap<String, String>,
}

/// External media storage contract.
///
/// `delete` reports failures like any other call; the best-effort policy
/// (warn and keep going) belongs to the caller that owns the local record.
pub trait MediaStore: Send + Sync {
    /// Short tag naming the backing provider, recorded on asset rows.
    fn backend(&self) -> &'static str;

    /// Store `bytes` under `folder` and return the provider record.
    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        content_type: &str,
        folder: &str,
    ) -> EmblemResult<UploadedMedia>;

    /// Remove an uploaded object from the provider.
    fn delete(&self, provider_id: &str) -> EmblemResult<()>;

    /// URL of a derived rendition of an uploaded object.
    fn transformed_url(
        &self,
        provider_id: &str,
        options: &TransformOptions,
    ) -> EmblemResult<String>;

    /// Sign parameters for a direct client-to-provider upload.
    fn sign_upload(&self, request: &SignRequest) -> EmblemResult<SignedUpload>;
}

/// Lowercase hex SHA-256 over the sorted `key=value` pairs joined with `&`,
/// with the secret appended. Matches the signature scheme hosted providers
/// verify on direct uploads.
pub fn sign_params(params: &BTreeMap<String, String>, secret: &str) -> String {
    let mut canonical = String::new();
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            canonical.push('&');
        }
        let _ = write!(canonical, "{key}={value}");
    }
    canonical.push_str(secret);
    hex_digest(canonical.as_bytes())
}

/// Lowercase hex SHA-256 of `bytes`.
pub(crate) fn hex_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Width/height from a PNG IHDR header, if `bytes` carries one.
fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let be = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    Some((be(16), be(20)))
}

fn format_tag(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/svg+xml" => Some("svg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

#[derive(Clone, Debug)]
struct StoredMedia {
    name: String,
    bytes: Vec<u8>,
    record: UploadedMedia,
}

#[derive(Default)]
struct MediaTable {
    objects: HashMap<String, StoredMedia>,
}

/// In-memory [`MediaStore`] backed by a map of byte blobs.
///
/// Provider ids are content-addressed (folder plus a SHA-256 prefix) and
/// URLs use the `memory://` scheme, so identical inputs always produce
/// identical records. Signing uses a fixed secret, making signatures
/// reproducible across runs.
pub struct MemoryMediaStore {
    secret: String,
    inner: Mutex<MediaTable>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::with_secret("emblem-memory-media")
    }

    /// Store signing with a caller-chosen secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            inner: Mutex::new(MediaTable::default()),
        }
    }

    fn table(&self) -> EmblemResult<MutexGuard<'_, MediaTable>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("media store lock poisoned").into())
    }

    /// Raw bytes of a stored object.
    pub fn fetch_bytes(&self, provider_id: &str) -> EmblemResult<Vec<u8>> {
        let table = self.table()?;
        table
            .objects
            .get(provider_id)
            .map(|stored| stored.bytes.clone())
            .ok_or_else(|| EmblemError::not_found("media object", provider_id))
    }

    /// Upload name recorded for a stored object.
    pub fn object_name(&self, provider_id: &str) -> EmblemResult<String> {
        let table = self.table()?;
        table
            .objects
            .get(provider_id)
            .map(|stored| stored.name.clone())
            .ok_or_else(|| EmblemError::not_found("media object", provider_id))
    }

    pub fn object_count(&self) -> usize {
        self.table().map(|table| table.objects.len()).unwrap_or(0)
    }
}

impl Default for MemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStore for MemoryMediaStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn upload(
        &self,
        bytes: &[u8],
        name: &str,
        content_type: &str,
        folder: &str,
    ) -> EmblemResult<UploadedMedia> {
        if bytes.is_empty() {
            return Err(EmblemError::validation(
                "media.bytes",
                "upload payload is empty",
            ));
        }
        let hash = hex_digest(bytes);
        let provider_id = format!("{folder}/{}", &hash[..16]);
        let format = format_tag(content_type);
        let (width, height) = match png_dimensions(bytes) {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        let record = UploadedMedia {
            url: format!("memory://{provider_id}.{}", format.unwrap_or("bin")),
            provider_id: provider_id.clone(),
            width,
            height,
            format: format.map(str::to_string),
            byte_size: bytes.len() as u64,
        };

        let mut table = self.table()?;
        table.objects.insert(
            provider_id,
            StoredMedia {
                name: name.to_string(),
                bytes: bytes.to_vec(),
                record: record.clone(),
            },
        );
        Ok(record)
    }

    fn delete(&self, provider_id: &str) -> EmblemResult<()> {
        let mut table = self.table()?;
        if table.objects.remove(provider_id).is_none() {
            return Err(EmblemError::media(format!(
                "provider object '{provider_id}' not found"
            )));
        }
        Ok(())
    }

    fn transformed_url(
        &self,
        provider_id: &str,
        options: &TransformOptions,
    ) -> EmblemResult<String> {
        let table = self.table()?;
        let stored = table.objects.get(provider_id).ok_or_else(|| {
            EmblemError::media(format!("provider object '{provider_id}' not found"))
        })?;
        if options.is_identity() {
            return Ok(stored.record.url.clone());
        }
        let mut pairs = Vec::new();
        if let Some(width) = options.width {
            pairs.push(format!("w={width}"));
        }
        if let Some(height) = options.height {
            pairs.push(format!("h={height}"));
        }
        if let Some(quality) = options.quality {
            pairs.push(format!("q={quality}"));
        }
        if let Some(format) = options.format {
            pairs.push(format!("f={}", format.extension()));
        }
        Ok(format!("{}?{}", stored.record.url, pairs.join("&")))
    }

    fn sign_upload(&self, request: &SignRequest) -> EmblemResult<SignedUpload> {
        let timestamp = Utc::now().timestamp();
        let mut params = BTreeMap::new();
        params.insert("timestamp".to_string(), timestamp.to_string());
        if !request.folder.is_empty() {
            params.insert("folder".to_string(), request.folder.clone());
        }
        if let Some(public_id) = &request.public_id {
            params.insert("public_id".to_string(), public_id.clone());
        }
        if !request.resource_type.is_empty() {
            params.insert("resource_type".to_string(), request.resource_type.clone());
        }
        let signature = sign_params(&params, &self.secret);
        Ok(SignedUpload {
            timestamp,
            signature,
            params,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/media.rs"]
mod tests;
