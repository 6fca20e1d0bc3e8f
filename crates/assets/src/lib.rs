//! Texture assets: decoding image files into RGBA8 pixels and loading them
//! off the event-loop thread.
//!
//! Renderers consume [`TextureImage`] values; they never see file paths.
//! The [`TextureLoader`] decodes on a worker thread and hands the result to a
//! completion callback, which is expected to forward it to the event loop
//! (for example through a winit `EventLoopProxy`).

use crossplanes_common::TextureId;
use std::path::{Path, PathBuf};
use std::thread;

/// Decoded texture pixels, RGBA8, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// 1×1 opaque white, bound until the real texture arrives.
    pub fn placeholder() -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![255, 255, 255, 255],
        }
    }

    /// Bytes per row of pixels, or `None` when a row does not fit in `u32`.
    pub fn stride(&self) -> Option<u32> {
        self.width.checked_mul(4)
    }
}

/// Errors from texture operations.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("failed to spawn texture loader thread: {0}")]
    Spawn(std::io::Error),
}

/// Decode an in-memory PNG or JPEG.
pub fn decode_texture(bytes: &[u8]) -> Result<TextureImage, TextureError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    Ok(TextureImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Read and decode an image file.
pub fn load_texture(path: impl AsRef<Path>) -> Result<TextureImage, TextureError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_texture(&bytes)
}

/// Outcome of one background load.
#[derive(Debug)]
pub struct TextureLoad {
    pub id: TextureId,
    pub path: PathBuf,
    pub result: Result<TextureImage, TextureError>,
}

/// Loads textures on worker threads and reports each result through a
/// completion callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextureLoader;

impl TextureLoader {
    pub fn new() -> Self {
        Self
    }

    /// Start loading `path` for slot `id`. `on_load` runs on the worker
    /// thread exactly once, whether decoding succeeded or not.
    pub fn load<F>(&self, id: TextureId, path: PathBuf, on_load: F) -> Result<(), TextureError>
    where
        F: FnOnce(TextureLoad) + Send + 'static,
    {
        tracing::debug!(texture = id.0, path = %path.display(), "loading texture");
        thread::Builder::new()
            .name(format!("texture-loader-{}", id.0))
            .spawn(move || {
                let result = load_texture(&path);
                on_load(TextureLoad { id, path, result });
            })
            .map_err(TextureError::Spawn)?;
        Ok(())
    }
}

pub fn crate_info() -> &'static str {
    "crossplanes-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 128]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn placeholder_is_white() {
        let img = TextureImage::placeholder();
        assert_eq!(img.pixels, vec![255; 4]);
        assert_eq!(img.stride(), Some(4));
    }

    #[test]
    fn oversized_rows_have_no_stride() {
        let img = TextureImage {
            width: u32::MAX / 2,
            height: 1,
            pixels: Vec::new(),
        };
        assert_eq!(img.stride(), None);
    }

    #[test]
    fn decode_png() {
        let img = decode_texture(&png_bytes(3, 2)).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.pixels.len(), 3 * 2 * 4);
        assert_eq!(&img.pixels[..4], &[255, 0, 0, 128]);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(
            decode_texture(b"definitely not an image"),
            Err(TextureError::Decode(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_texture("/nonexistent/texture.png").unwrap_err();
        match err {
            TextureError::Io { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/texture.png")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loader_reports_through_callback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.png");
        std::fs::write(&path, png_bytes(4, 4)).unwrap();

        let (tx, rx) = mpsc::channel();
        let loader = TextureLoader::new();
        loader
            .load(TextureId(1), path.clone(), move |load| {
                tx.send(load).unwrap();
            })
            .unwrap();

        let load = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert_eq!(load.id, TextureId(1));
        assert_eq!(load.path, path);
        assert_eq!(load.result.unwrap().width, 4);
    }

    #[test]
    fn loader_reports_failures_too() {
        let (tx, rx) = mpsc::channel();
        TextureLoader::new()
            .load(TextureId(0), PathBuf::from("/nonexistent/a.png"), move |load| {
                tx.send(load).unwrap();
            })
            .unwrap();
        let load = rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(load.result.is_err());
    }
}
