//! Target image loading and text-safe payload transport.

/// Ordered, fail-fast loading of target images into decoded luma bitmaps.
pub mod loader;
/// Base64 / data-URI encoding of artifacts and narration payloads.
pub mod transport;
