//! Remote shrink service client
//!
//! Uploads source bytes to the shrink endpoint, reads the processed-asset URL
//! from the JSON reply, downloads the result and writes it under the output
//! directory. Every step runs synchronously and the first failure ends the file.

use crate::batch::Compressor;
use crate::constants::{
    DEFAULT_OUTPUT_DIR, DEFAULT_SHRINK_ENDPOINT, PROGRESS_SPINNER_TEMPLATE, SHRINK_AUTH_USER,
};
use crate::error::{Result, SqueezeError};
use crate::kinds::KindRegistry;
use crate::metadata::FileRecord;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reply body of the shrink endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShrinkResponse {
    pub input: Option<ShrinkInput>,
    pub output: Option<ShrinkOutput>,
    pub message: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShrinkInput {
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShrinkOutput {
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub ratio: f64,
    pub url: String,
}

impl ShrinkResponse {
    /// Parses a reply body and returns the result URL, or the provider's reason for failing.
    pub fn interpret(body: &[u8]) -> Result<String> {
        let response: ShrinkResponse = serde_json::from_slice(body)
            .map_err(|e| SqueezeError::remote(format!("malformed response: {}", e)))?;

        if let Some(code) = response.error.as_deref().filter(|code| !code.is_empty()) {
            return Err(SqueezeError::remote(response.reason_or(code)));
        }

        match response.output.as_ref().map(|o| o.url.as_str()) {
            Some(url) if !url.is_empty() => {
                if let (Some(input), Some(output)) = (&response.input, &response.output) {
                    tracing::debug!(
                        before = input.size,
                        after = output.size,
                        ratio = output.ratio,
                        "shrink accepted"
                    );
                }
                Ok(url.to_string())
            }
            _ => Err(SqueezeError::remote(
                response.reason_or("response carried no output URL"),
            )),
        }
    }

    fn reason_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// API key for the shrink service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(***)")
    }
}

/// Network operations the remote compressor needs.
pub trait Transport {
    /// POSTs `body` to `endpoint` with basic auth and returns the reply body
    /// whatever the HTTP status.
    fn upload(&self, endpoint: &str, api_key: &ApiKey, body: File) -> Result<Vec<u8>>;

    /// GETs `url` and returns the body; a non-success status is an error.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Transport`] over a blocking `reqwest` client.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("asset-squeeze/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn upload(&self, endpoint: &str, api_key: &ApiKey, body: File) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(endpoint)
            .basic_auth(SHRINK_AUTH_USER, Some(api_key.expose()))
            .body(reqwest::blocking::Body::from(body))
            .send()?;
        tracing::debug!(status = %response.status(), "shrink upload answered");
        Ok(response.bytes()?.to_vec())
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// `<output_dir>/<base name of path>`
pub fn output_path_for(output_dir: &Path, path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| SqueezeError::UnsupportedType(path.to_path_buf()))?;
    Ok(output_dir.join(name))
}

/// Writes `data` to `path`, creating parent directories and replacing any existing file.
pub fn save_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    file.write_all(data)?;
    if let Err(e) = file.sync_all() {
        tracing::error!(path = %path.display(), error = %e, "failed to flush output file");
        return Err(e.into());
    }
    Ok(())
}

/// Default [`Compressor`]: the remote shrink service.
pub struct RemoteCompressor {
    transport: Box<dyn Transport>,
    endpoint: String,
    api_key: ApiKey,
    output_dir: PathBuf,
    kinds: KindRegistry,
    show_progress: bool,
}

impl RemoteCompressor {
    pub fn new(transport: Box<dyn Transport>, api_key: ApiKey) -> Self {
        Self {
            transport,
            endpoint: DEFAULT_SHRINK_ENDPOINT.to_string(),
            api_key,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            kinds: KindRegistry::default(),
            show_progress: false,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Kinds allowed through to the service; anything else is `UnsupportedType`.
    pub fn with_kinds(mut self, kinds: KindRegistry) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn spinner(&self, path: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(PROGRESS_SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Uploading {}...", path.display()));
        pb
    }
}

impl Compressor for RemoteCompressor {
    fn compress(&self, path: &Path, record: &FileRecord) -> Result<PathBuf> {
        let kind = self
            .kinds
            .classify(path)
            .ok_or_else(|| SqueezeError::UnsupportedType(path.to_path_buf()))?;
        let output = output_path_for(&self.output_dir, path)?;
        tracing::debug!(
            path = %path.display(),
            kind = kind.label(),
            size = record.size,
            md5 = record.md5.as_deref().unwrap_or("-"),
            "shrinking"
        );

        let pb = self.spinner(path);

        let source = File::open(path).map_err(|e| {
            pb.finish_and_clear();
            SqueezeError::Transport(format!("cannot open {}: {}", path.display(), e))
        })?;
        let reply = self
            .transport
            .upload(&self.endpoint, &self.api_key, source)
            .inspect_err(|_| pb.finish_and_clear())?;

        let url = ShrinkResponse::interpret(&reply).inspect_err(|_| pb.finish_and_clear())?;

        pb.set_message(format!("Downloading {}...", record.name));
        let data = self
            .transport
            .fetch(&url)
            .inspect_err(|_| pb.finish_and_clear())?;

        pb.finish_and_clear();
        save_file(&output, &data)?;
        Ok(output)
    }
}
