//! Ownership of the displayed frame raster and its zoomed copy.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::coords::scaled_length;
use crate::model::InstanceId;

/// One decoded frame of a series. Immutable once created.
#[derive(Debug, Clone)]
pub struct Frame {
    instance_id: InstanceId,
    raster: RgbaImage,
}

impl Frame {
    pub fn new(instance_id: InstanceId, raster: RgbaImage) -> Self {
        Self { instance_id, raster }
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) into a frame.
    pub fn decode(instance_id: InstanceId, bytes: &[u8]) -> Result<Self, image::ImageError> {
        let raster = image::load_from_memory(bytes)?.to_rgba8();
        log::debug!(
            "Decoded frame {}: {}x{} ({} bytes)",
            instance_id,
            raster.width(),
            raster.height(),
            bytes.len()
        );
        Ok(Self::new(instance_id, raster))
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// The frame raster resampled for one zoom factor.
#[derive(Debug, Clone)]
pub struct ScaledImage {
    zoom: f32,
    raster: RgbaImage,
}

impl ScaledImage {
    fn build(frame: &Frame, zoom: f32) -> Self {
        let width = scaled_length(frame.width(), zoom);
        let height = scaled_length(frame.height(), zoom);
        let raster = if (width, height) == (frame.width(), frame.height()) {
            frame.raster().clone()
        } else {
            // Nearest keeps individual pixels visible when magnified
            let filter = if zoom >= 1.0 {
                FilterType::Nearest
            } else {
                FilterType::Triangle
            };
            imageops::resize(frame.raster(), width, height, filter)
        };
        Self { zoom, raster }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Holds the active frame. A new frame replaces the old one outright and
/// drops its scaled copy.
#[derive(Debug, Default)]
pub struct FrameStore {
    frame: Option<Frame>,
    scaled: Option<ScaledImage>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new frame, returning the one it supersedes.
    pub fn replace(&mut self, frame: Frame) -> Option<Frame> {
        log::debug!(
            "Frame store: {} ({}x{})",
            frame.instance_id(),
            frame.width(),
            frame.height()
        );
        self.scaled = None;
        self.frame.replace(frame)
    }

    /// Drop the current frame.
    pub fn clear(&mut self) -> Option<Frame> {
        self.scaled = None;
        self.frame.take()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn instance_id(&self) -> Option<&InstanceId> {
        self.frame.as_ref().map(Frame::instance_id)
    }

    /// Natural size of the current frame.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.frame.as_ref().map(|f| (f.width(), f.height()))
    }

    /// The current frame resampled for `zoom`, rebuilt only when the zoom or
    /// the frame changed since the last call.
    pub fn scaled(&mut self, zoom: f32) -> Option<&ScaledImage> {
        let frame = self.frame.as_ref()?;
        let stale = self.scaled.as_ref().is_none_or(|s| s.zoom != zoom);
        if stale {
            log::debug!("Rescaling {} to zoom {:.1}", frame.instance_id(), zoom);
            self.scaled = Some(ScaledImage::build(frame, zoom));
        }
        self.scaled.as_ref()
    }
}
