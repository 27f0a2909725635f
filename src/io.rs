//! Project container format and image import/export.
//!
//! Layered projects use the `.rkl` container: a line-oriented text file
//! holding one block per layer — `BEGIN_LAYER`, the layer name, a `1`/`0`
//! enabled flag, the hex-encoded PNG bytes of the layer raster, then
//! `END_LAYER`.  There is no global header; the canvas size is the size
//! of the decoded layers (which must all agree).  Any other extension is
//! decoded as a single flattened layer with a standard image decoder.
//!
//! Loading never installs partial state: a zero-layer file, a decode
//! failure or a dimension mismatch fails the whole load.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageError, ImageFormat, RgbaImage};

use crate::canvas::{CanvasState, Layer};
use crate::{log_err, log_info};

/// Extension of the layered container format.
pub const PROJECT_EXTENSION: &str = "rkl";

const BEGIN_LAYER: &str = "BEGIN_LAYER";
const END_LAYER: &str = "END_LAYER";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum RklError {
    Io(std::io::Error),
    Codec(String),
    InvalidFormat(String),
}

impl fmt::Display for RklError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RklError::Io(e) => write!(f, "I/O error: {}", e),
            RklError::Codec(e) => write!(f, "Image codec error: {}", e),
            RklError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl std::error::Error for RklError {}

impl From<std::io::Error> for RklError {
    fn from(e: std::io::Error) -> Self {
        RklError::Io(e)
    }
}

impl From<ImageError> for RklError {
    fn from(e: ImageError) -> Self {
        RklError::Codec(e.to_string())
    }
}

// ============================================================================
// HEX ENCODING
// ============================================================================

fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(char::from_digit((b >> 4) as u32, 16).unwrap_or('0'));
        out.push(char::from_digit((b & 0x0f) as u32, 16).unwrap_or('0'));
    }
    out
}

fn decode_hex(text: &str) -> Result<Vec<u8>, RklError> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(RklError::InvalidFormat(
            "Odd-length hex payload".to_string(),
        ));
    }
    let mut out = Vec::with_capacity(text.len() / 2);
    let bytes = text.as_bytes();
    for pair in bytes.chunks_exact(2) {
        let hi = (pair[0] as char).to_digit(16);
        let lo = (pair[1] as char).to_digit(16);
        match (hi, lo) {
            (Some(hi), Some(lo)) => out.push(((hi << 4) | lo) as u8),
            _ => {
                return Err(RklError::InvalidFormat(format!(
                    "Non-hex byte pair '{}{}'",
                    pair[0] as char, pair[1] as char
                )));
            }
        }
    }
    Ok(out)
}

// ============================================================================
// CONTAINER SAVE / LOAD
// ============================================================================

fn encode_layer_png(pixels: &RgbaImage) -> Result<Vec<u8>, RklError> {
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    #[allow(deprecated)]
    encoder.encode(
        pixels.as_raw(),
        pixels.width(),
        pixels.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Write every layer of `state` to `path` as an `.rkl` container.
pub fn save_project(state: &CanvasState, path: &Path) -> Result<(), RklError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for layer in &state.layers {
        let png = encode_layer_png(&layer.pixels)?;
        writeln!(writer, "{}", BEGIN_LAYER)?;
        writeln!(writer, "{}", layer.name)?;
        writeln!(writer, "{}", if layer.enabled { 1 } else { 0 })?;
        writeln!(writer, "{}", encode_hex(&png))?;
        writeln!(writer, "{}", END_LAYER)?;
    }
    writer.flush()?;
    log_info!("Saved project to {:?} ({} layers)", path, state.layers.len());
    Ok(())
}

/// Parse an `.rkl` container into a canvas.  The whole load fails on any
/// malformed block, decode failure, layer dimension mismatch, or when the
/// file yields zero layers.
pub fn load_project(path: &Path) -> Result<CanvasState, RklError> {
    let mut lines = BufReader::new(File::open(path)?).lines();
    let mut layers: Vec<Layer> = Vec::new();

    while let Some(line) = lines.next() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if line.trim() != BEGIN_LAYER {
            return Err(RklError::InvalidFormat(format!(
                "Expected {}, found '{}'",
                BEGIN_LAYER, line
            )));
        }
        let name = next_line(&mut lines, "layer name")?;
        let enabled = match next_line(&mut lines, "enabled flag")?.trim() {
            "1" => true,
            "0" => false,
            other => {
                return Err(RklError::InvalidFormat(format!(
                    "Enabled flag must be 1 or 0, found '{}'",
                    other
                )));
            }
        };
        let payload = next_line(&mut lines, "image payload")?;
        let end = next_line(&mut lines, END_LAYER)?;
        if end.trim() != END_LAYER {
            return Err(RklError::InvalidFormat(format!(
                "Expected {}, found '{}'",
                END_LAYER, end
            )));
        }

        let png = decode_hex(&payload)?;
        let pixels = image::load_from_memory_with_format(&png, ImageFormat::Png)?.to_rgba8();
        if let Some(first) = layers.first()
            && first.pixels.dimensions() != pixels.dimensions()
        {
            return Err(RklError::InvalidFormat(format!(
                "Layer '{}' is {:?}, expected {:?}",
                name,
                pixels.dimensions(),
                first.pixels.dimensions()
            )));
        }
        layers.push(Layer {
            name,
            enabled,
            pixels,
        });
    }

    CanvasState::from_layers(layers)
        .ok_or_else(|| RklError::InvalidFormat("Project contains no layers".to_string()))
}

fn next_line(
    lines: &mut std::io::Lines<BufReader<File>>,
    what: &str,
) -> Result<String, RklError> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => Err(RklError::InvalidFormat(format!(
            "Unexpected end of file, expected {}",
            what
        ))),
    }
}

// ============================================================================
// GENERIC LOAD / EXPORT
// ============================================================================

/// Load any supported file: the `.rkl` container keeps its layers, every
/// other extension decodes as a single flattened layer named after the
/// file stem.
pub fn load_any(path: &Path) -> Result<CanvasState, RklError> {
    let is_container = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION))
        .unwrap_or(false);
    if is_container {
        return load_project(path);
    }
    let pixels = image::open(path)?.to_rgba8();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Background".to_string());
    CanvasState::from_layers(vec![Layer {
        name,
        enabled: true,
        pixels,
    }])
    .ok_or_else(|| RklError::InvalidFormat("Image decoded to zero layers".to_string()))
}

/// Write the flattened composite to `path` in the raster format implied
/// by its extension.  Success/failure is logged, never propagated.
pub fn export_flattened(state: &CanvasState, path: &Path) -> bool {
    let composite = state.composite();
    match composite.save(path) {
        Ok(()) => {
            log_info!("Exported composite to {:?}", path);
            true
        }
        Err(e) => {
            log_err!("Export to {:?} failed: {}", path, e);
            false
        }
    }
}
