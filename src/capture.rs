//! Snapshot capture: composite the live video frame with the rendered
//! overlay and export through a platform-specific path.
//!
//! The platform is a descriptor injected once at startup, not sniffed per
//! call, so tests exercise every export path without mocking an
//! environment. Export collaborators are trait seams: a reusable download
//! anchor for the data-URI paths and a share action for Android devices
//! that have one.

use crate::error::Result;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, GenericImage, RgbaImage};
use log::{debug, warn};

/// Platform capability descriptor, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// iOS-family device: data-URI anchor download
    IosLike,
    /// Android with a native share action
    AndroidShare,
    /// Android without share capability: anchor download
    AndroidLegacy,
    /// Desktop and everything else: no export path in this version
    Desktop,
}

impl Platform {
    /// Classify from a user-agent string and share capability, evaluated in
    /// priority order.
    #[must_use]
    pub fn detect(user_agent: &str, can_share: bool) -> Self {
        let is_ios = ["iPad", "iPhone", "iPod"].iter().any(|m| user_agent.contains(m));
        if is_ios {
            return Platform::IosLike;
        }
        let is_android = user_agent.to_lowercase().contains("android");
        if is_android && can_share {
            return Platform::AndroidShare;
        }
        if is_android {
            return Platform::AndroidLegacy;
        }
        Platform::Desktop
    }

    /// Mobile platforms get a gentler smoothing profile.
    #[must_use]
    pub fn is_mobile(self) -> bool {
        !matches!(self, Platform::Desktop)
    }
}

/// A compressed capture ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Actual payload MIME type
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// A named file handed to the platform share action.
#[derive(Debug, Clone, Copy)]
pub struct ShareFile<'a> {
    pub name: &'a str,
    pub mime: &'static str,
    pub bytes: &'a [u8],
    pub title: &'a str,
}

/// The share action was rejected or dismissed. An expected outcome, never a
/// crash: the pipeline logs it and moves on.
#[derive(Debug, thiserror::Error)]
#[error("Share rejected: {0}")]
pub struct ShareRejected(pub String);

/// Live camera frame provider. `None` models the video element being absent
/// from the document.
pub trait VideoSource {
    fn current_frame(&self) -> Option<RgbaImage>;
}

/// The render collaborator's presentable surface.
pub trait RenderTarget {
    /// Render the current scene so the pixels read below are fresh.
    fn render_frame(&mut self);
    fn dimensions(&self) -> (u32, u32);
    fn read_pixels(&self) -> RgbaImage;
}

/// Reusable download trigger (the synthetic anchor element). Created lazily
/// once and retained across captures.
pub trait DownloadAnchor {
    fn download(&mut self, filename: &str, image: &EncodedImage);
}

/// Platform export environment.
pub trait ExportEnv {
    fn create_anchor(&mut self) -> Box<dyn DownloadAnchor>;
    /// Fire-and-forget share action. The result reports the settled state
    /// of the platform's own promise; it must not block the frame loop.
    fn share(&mut self, file: ShareFile<'_>) -> std::result::Result<(), ShareRejected>;
}

/// What a capture invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Artifact handed to a download or share path
    Exported { filename: String },
    /// No video element present; user-visible notice, clean abort
    NoVideo,
    /// Share action rejected or dismissed by the user
    ShareRejected { filename: String },
    /// No export path defined for this platform (known gap)
    Unsupported,
}

/// Capture export settings.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Filename prefix for exported artifacts
    pub prefix: String,
    /// JPEG quality, 0-100
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            prefix: crate::constants::DEFAULT_CAPTURE_PREFIX.to_string(),
            jpeg_quality: crate::constants::DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Composites video + overlay into an offscreen surface and exports the
/// result through the platform path decided at construction.
pub struct CapturePipeline {
    platform: Platform,
    config: CaptureConfig,
    /// Offscreen compositing surface, sized lazily and reallocated only
    /// when the render dimensions change
    canvas: Option<RgbaImage>,
    /// Reusable anchor for the download paths
    anchor: Option<Box<dyn DownloadAnchor>>,
}

impl CapturePipeline {
    #[must_use]
    pub fn new(platform: Platform, config: CaptureConfig) -> Self {
        Self {
            platform,
            config,
            canvas: None,
            anchor: None,
        }
    }

    /// Composite the current video frame and render surface, encode and
    /// export. Only encoding failures are errors; missing video, share
    /// rejection and unsupported platforms are reported as outcomes.
    pub fn capture(
        &mut self,
        video: &dyn VideoSource,
        render: &mut dyn RenderTarget,
        env: &mut dyn ExportEnv,
        timestamp_ms: u64,
    ) -> Result<CaptureOutcome> {
        let Some(frame) = video.current_frame() else {
            warn!("Capture requested but no video element is present");
            return Ok(CaptureOutcome::NoVideo);
        };

        // Make sure the surface we read reflects the current scene.
        render.render_frame();
        let (width, height) = render.dimensions();

        if !matches!(&self.canvas, Some(c) if c.dimensions() == (width, height)) {
            debug!("Allocating {width}x{height} compositing surface");
            self.canvas = Some(RgbaImage::new(width, height));
        }
        let canvas = self.canvas.get_or_insert_with(|| RgbaImage::new(width, height));

        // Video is the background layer, the rendered overlay sits on top.
        if frame.dimensions() == (width, height) {
            canvas.copy_from(&frame, 0, 0)?;
        } else {
            let scaled = imageops::resize(&frame, width, height, imageops::FilterType::Triangle);
            canvas.copy_from(&scaled, 0, 0)?;
        }
        imageops::overlay(canvas, &render.read_pixels(), 0, 0);

        let encoded = encode_jpeg(canvas, self.config.jpeg_quality)?;
        // Shipped filename label stays .png although the payload is JPEG;
        // EncodedImage carries the real MIME type.
        let filename = format!("{}-{}.png", self.config.prefix, timestamp_ms);

        match self.platform {
            Platform::IosLike | Platform::AndroidLegacy => {
                let anchor = self.anchor.get_or_insert_with(|| env.create_anchor());
                anchor.download(&filename, &encoded);
                debug!("Capture exported via download: {filename}");
                Ok(CaptureOutcome::Exported { filename })
            }
            Platform::AndroidShare => {
                let file = ShareFile {
                    name: &filename,
                    mime: encoded.mime,
                    bytes: &encoded.bytes,
                    title: "AR capture",
                };
                match env.share(file) {
                    Ok(()) => {
                        debug!("Capture exported via share: {filename}");
                        Ok(CaptureOutcome::Exported { filename })
                    }
                    Err(err) => {
                        warn!("Share canceled: {err}");
                        Ok(CaptureOutcome::ShareRejected { filename })
                    }
                }
            }
            Platform::Desktop => {
                debug!("No export path for desktop; capture dropped");
                Ok(CaptureOutcome::Unsupported)
            }
        }
    }

    /// Current compositing surface dimensions, if one has been allocated.
    #[must_use]
    pub fn composite_dimensions(&self) -> Option<(u32, u32)> {
        self.canvas.as_ref().map(|c| c.dimensions())
    }

    #[must_use]
    pub fn platform(&self) -> Platform {
        self.platform
    }
}

fn encode_jpeg(canvas: &RgbaImage, quality: u8) -> Result<EncodedImage> {
    // JPEG has no alpha channel; flatten first.
    let rgb = DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();
    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(EncodedImage {
        mime: "image/jpeg",
        bytes,
    })
}

/// Snapshot-in-time of a capture request, for callers that want to log or
/// queue one before dispatch.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub platform: Platform,
    pub timestamp_ms: u64,
}

impl CaptureRequest {
    #[must_use]
    pub fn new(platform: Platform, timestamp_ms: u64) -> Self {
        Self {
            platform,
            timestamp_ms,
        }
    }
}

/// Convenience for demos: a render target backed by a fixed image with the
/// overlay asset drawn from its committed pose.
pub struct StaticRenderTarget {
    pixels: RgbaImage,
}

impl StaticRenderTarget {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Solid-color surface, fully transparent unless alpha is given.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, image::Rgba(rgba)),
        }
    }
}

impl RenderTarget for StaticRenderTarget {
    fn render_frame(&mut self) {}

    fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn read_pixels(&self) -> RgbaImage {
        self.pixels.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection_priority() {
        assert_eq!(
            Platform::detect("Mozilla/5.0 (iPhone; CPU iPhone OS 16_0)", true),
            Platform::IosLike
        );
        assert_eq!(
            Platform::detect("Mozilla/5.0 (Linux; Android 13; Pixel 7)", true),
            Platform::AndroidShare
        );
        assert_eq!(
            Platform::detect("Mozilla/5.0 (Linux; Android 13; Pixel 7)", false),
            Platform::AndroidLegacy
        );
        assert_eq!(Platform::detect("Mozilla/5.0 (X11; Linux x86_64)", true), Platform::Desktop);
    }

    #[test]
    fn test_mobile_classification() {
        assert!(Platform::IosLike.is_mobile());
        assert!(Platform::AndroidShare.is_mobile());
        assert!(Platform::AndroidLegacy.is_mobile());
        assert!(!Platform::Desktop.is_mobile());
    }

    #[test]
    fn test_jpeg_encode_flattens_alpha() {
        let canvas = RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 128]));
        let encoded = encode_jpeg(&canvas, 80).unwrap();
        assert_eq!(encoded.mime, "image/jpeg");
        assert!(!encoded.bytes.is_empty());
        // JPEG magic bytes
        assert_eq!(&encoded.bytes[0..2], &[0xFF, 0xD8]);
    }
}
