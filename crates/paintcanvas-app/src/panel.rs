//! The paint panel: a surface plus the export and upload flow around it.

use crate::upload::Uploader;
use crate::{AppError, AppResult};
use paintcanvas_core::{
    EventBus, HistoryEventKind, KeyEvent, PointerEvent, StrokeColor, Surface, SurfaceConfig,
    SurfaceOptions,
};
use paintcanvas_dpi::ImageFormat;
use paintcanvas_render::PixelRaster;
use serde::Deserialize;
use std::cell::Cell;
use std::rc::Rc;

/// DPI of a raster drawn at scale factor 1.
const BASE_DPI: f64 = 72.0;

/// Panel configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub color: StrokeColor,
    pub background_color: StrokeColor,
    pub stroke_width: f64,
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
    /// Name given to exported files.
    pub file_name: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            color: StrokeColor::new(0x66, 0x66, 0x66, 255),
            background_color: StrokeColor::new(0xf0, 0xf0, 0xf0, 255),
            stroke_width: 3.0,
            width: 600.0,
            height: 240.0,
            scale_factor: 1.0,
            file_name: "paint.png".to_string(),
        }
    }
}

/// An encoded image ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// A drawing surface hosted in an application panel.
pub struct PaintPanel {
    surface: Surface<PixelRaster>,
    file_name: String,
    can_upload: Rc<Cell<bool>>,
}

impl PaintPanel {
    pub fn new(config: PanelConfig) -> Self {
        Self::with_bus(config, EventBus::new())
    }

    /// Create a panel whose notifications also reach `parent`.
    pub fn with_parent_bus(config: PanelConfig, parent: &EventBus) -> Self {
        Self::with_bus(config, parent.child())
    }

    fn with_bus(config: PanelConfig, bus: EventBus) -> Self {
        let surface_config = SurfaceConfig {
            color: config.color,
            background_color: config.background_color,
            stroke_width: config.stroke_width,
            scale_factor: config.scale_factor,
        };
        let mut surface = Surface::with_bus(surface_config, PixelRaster::new(), bus);
        surface.configure(SurfaceOptions::new().with_size(config.width, config.height));

        let can_upload = Rc::new(Cell::new(false));
        let flag = Rc::clone(&can_upload);
        surface
            .bus()
            .subscribe_to(HistoryEventKind::Changed, move |_| flag.set(true));

        Self {
            surface,
            file_name: config.file_name,
            can_upload,
        }
    }

    pub fn surface(&self) -> &Surface<PixelRaster> {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface<PixelRaster> {
        &mut self.surface
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Whether anything has been committed since creation or the last reset.
    pub fn can_upload(&self) -> bool {
        self.can_upload.get()
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> bool {
        self.surface.handle_pointer_event(event)
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        self.surface.handle_key_event(event)
    }

    pub fn undo(&mut self) -> bool {
        self.surface.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.surface.redo()
    }

    /// Wipe the drawing and its history.
    pub fn reset(&mut self) {
        self.surface.reset();
        self.can_upload.set(false);
    }

    /// Density the export is tagged with, from the device scale factor.
    pub fn export_dpi(&self) -> u32 {
        (self.surface.scale_factor() * BASE_DPI).round() as u32
    }

    /// Encode the visible raster as a PNG tagged with the export density.
    pub fn export(&self) -> AppResult<Attachment> {
        let raster = self.surface.raster();
        let (width, height) = (raster.width(), raster.height());
        if width == 0 || height == 0 {
            return Err(AppError::EmptyRaster);
        }

        let png = encode_png(raster.as_rgba_bytes(), width, height)?;
        let dpi = self.export_dpi();
        let bytes = paintcanvas_dpi::change_dpi_as(&png, dpi, ImageFormat::Png)?;
        log::info!(
            "Exported {}x{} PNG at {} dpi ({} bytes)",
            width,
            height,
            dpi,
            bytes.len()
        );

        Ok(Attachment {
            file_name: self.file_name.clone(),
            mime_type: ImageFormat::Png.mime_type().to_string(),
            bytes,
        })
    }

    /// Export and hand the file to `uploader`.
    ///
    /// Fails with [`AppError::NothingToUpload`] until a stroke is committed.
    pub fn upload<U: Uploader + ?Sized>(&self, uploader: &mut U) -> AppResult<()> {
        if !self.can_upload() {
            return Err(AppError::NothingToUpload);
        }
        let attachment = self.export()?;
        uploader.upload(&attachment)?;
        log::info!("Uploaded {}", attachment.file_name);
        Ok(())
    }
}

impl std::fmt::Debug for PaintPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintPanel")
            .field("surface", &self.surface.id())
            .field("file_name", &self.file_name)
            .field("can_upload", &self.can_upload.get())
            .finish()
    }
}

/// Encode RGBA8 pixel data as PNG.
fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, png::EncodingError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    fn stroke(panel: &mut PaintPanel) {
        panel.handle_pointer_event(PointerEvent::down(Point::new(10.0, 10.0)));
        panel.handle_pointer_event(PointerEvent::moved(Point::new(40.0, 30.0)));
        panel.handle_pointer_event(PointerEvent::up(Point::new(80.0, 20.0)));
    }

    #[test]
    fn test_defaults() {
        let panel = PaintPanel::new(PanelConfig::default());
        let surface = panel.surface();
        assert_eq!(surface.color().to_hex(), "#666666");
        assert_eq!(surface.background_color().to_hex(), "#f0f0f0");
        assert_eq!(surface.stroke_width(), 3.0);
        assert_eq!(surface.width(), 600.0);
        assert_eq!(surface.height(), 240.0);
        assert_eq!(panel.file_name(), "paint.png");
        assert!(!panel.can_upload());
    }

    #[test]
    fn test_can_upload_follows_history() {
        let mut panel = PaintPanel::new(PanelConfig::default());
        stroke(&mut panel);
        assert!(panel.can_upload());

        // Undoing does not revoke it, only a reset does.
        panel.undo();
        assert!(panel.can_upload());

        panel.reset();
        assert!(!panel.can_upload());
        assert_eq!(panel.surface().log().len(), 0);
    }

    #[test]
    fn test_upload_requires_a_stroke() {
        let panel = PaintPanel::new(PanelConfig::default());
        let mut uploader = crate::MemoryUploader::new();
        assert!(matches!(
            panel.upload(&mut uploader),
            Err(AppError::NothingToUpload)
        ));
        assert!(uploader.attachments().is_empty());
    }

    #[test]
    fn test_export_dpi_follows_scale() {
        let panel = PaintPanel::new(PanelConfig {
            scale_factor: 2.0,
            ..PanelConfig::default()
        });
        assert_eq!(panel.export_dpi(), 144);
    }

    #[test]
    fn test_export_empty_raster() {
        let panel = PaintPanel::new(PanelConfig {
            width: 0.0,
            ..PanelConfig::default()
        });
        assert!(matches!(panel.export(), Err(AppError::EmptyRaster)));
    }

    #[test]
    fn test_export_attachment() {
        let mut panel = PaintPanel::new(PanelConfig {
            width: 40.0,
            height: 20.0,
            ..PanelConfig::default()
        });
        stroke(&mut panel);

        let attachment = panel.export().unwrap();
        assert_eq!(attachment.file_name, "paint.png");
        assert_eq!(attachment.mime_type, "image/png");
        assert_eq!(ImageFormat::detect(&attachment.bytes), Some(ImageFormat::Png));
        assert_eq!(&attachment.bytes[37..41], b"pHYs");
    }

    #[test]
    fn test_parent_bus_sees_panel_events() {
        let parent = EventBus::new();
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        parent.subscribe(move |_| counter.set(counter.get() + 1));

        let mut panel = PaintPanel::with_parent_bus(PanelConfig::default(), &parent);
        stroke(&mut panel);
        // history-changed and history-step
        assert_eq!(seen.get(), 2);
        assert!(panel.can_upload());
    }
}
