use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::{
    assets::transport,
    foundation::error::{PanelError, PanelResult},
};

const REMOTE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Decoded target image in the form feature extraction consumes: 8-bit luma.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    luma: image::GrayImage,
}

impl DecodedImage {
    /// Wrap a luma buffer. Zero-sized images are rejected.
    pub fn from_luma(luma: image::GrayImage) -> PanelResult<Self> {
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Err(PanelError::validation("decoded image has zero size"));
        }
        Ok(Self { luma })
    }

    pub fn width(&self) -> u32 {
        self.luma.width()
    }

    pub fn height(&self) -> u32 {
        self.luma.height()
    }

    pub fn luma(&self) -> &image::GrayImage {
        &self.luma
    }

    pub fn byte_len(&self) -> usize {
        self.luma.as_raw().len()
    }
}

/// Ordered, index-aligned set of decoded target images.
///
/// Decoded pixel memory is held only for the duration of a compile; dropping the set releases it.
#[derive(Debug, Default)]
pub struct DecodedImageSet {
    images: Vec<DecodedImage>,
}

impl DecodedImageSet {
    pub fn from_images(images: Vec<DecodedImage>) -> Self {
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[DecodedImage] {
        &self.images
    }

    pub fn byte_len(&self) -> usize {
        self.images.iter().map(DecodedImage::byte_len).sum()
    }
}

impl Drop for DecodedImageSet {
    fn drop(&mut self) {
        if !self.images.is_empty() {
            tracing::debug!(
                images = self.images.len(),
                bytes = self.byte_len(),
                "released decoded target images"
            );
        }
    }
}

/// Decode an encoded image (PNG, JPEG, WebP, ...) into luma.
pub fn decode_image(bytes: &[u8]) -> PanelResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    DecodedImage::from_luma(dyn_img.into_luma8())
}

/// Load every source in order. Any single failure aborts the whole load: the compiler needs a
/// complete, index-aligned set, so no partial results are returned.
#[tracing::instrument(skip(sources, root), fields(count = sources.len()))]
pub fn load_images<S: AsRef<str>>(sources: &[S], root: &Path) -> PanelResult<DecodedImageSet> {
    let mut set = DecodedImageSet::from_images(Vec::with_capacity(sources.len()));
    for source in sources {
        let source = source.as_ref();
        let img = load_one(source, root).map_err(|e| match e {
            e @ PanelError::Load { .. } => e,
            other => PanelError::load(transport::describe_source(source), format!("{other:#}")),
        })?;
        tracing::debug!(
            source = %transport::describe_source(source),
            width = img.width(),
            height = img.height(),
            "decoded target image"
        );
        set.images.push(img);
    }
    Ok(set)
}

fn load_one(source: &str, root: &Path) -> PanelResult<DecodedImage> {
    let bytes = read_source_bytes(source, root)?;
    decode_image(&bytes)
}

/// Resolve a source reference to raw bytes: inline data URIs, `http(s)` URLs or paths relative
/// to `root`.
pub fn read_source_bytes(source: &str, root: &Path) -> PanelResult<Vec<u8>> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(PanelError::load("<empty>", "image source is empty"));
    }
    if transport::is_data_uri(trimmed) {
        return transport::decode_text(trimmed)
            .map_err(|e| PanelError::load(transport::describe_source(trimmed), e.to_string()));
    }
    if is_remote(trimmed) {
        return fetch_remote(trimmed);
    }

    let norm = normalize_rel_path(trimmed)?;
    let path: PathBuf = root.join(Path::new(&norm));
    std::fs::read(&path)
        .with_context(|| format!("read image bytes from '{}'", path.display()))
        .map_err(|e| PanelError::load(trimmed, format!("{e:#}")))
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Blocking GET of a remote image. Transport errors and non-success statuses are load failures.
fn fetch_remote(url: &str) -> PanelResult<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REMOTE_FETCH_TIMEOUT)
        .build()
        .map_err(|e| PanelError::load(url, format!("build HTTP client: {e}")))?;
    let resp = client
        .get(url)
        .send()
        .map_err(|e| PanelError::load(url, format!("fetch: {e}")))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PanelError::load(url, format!("HTTP status {status}")));
    }
    let body = resp
        .bytes()
        .map_err(|e| PanelError::load(url, format!("read response body: {e}")))?;
    tracing::debug!(url, bytes = body.len(), "fetched remote target image");
    Ok(body.to_vec())
}

/// Normalize and validate scene-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PanelResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PanelError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PanelError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PanelError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PanelError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
