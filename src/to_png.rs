#![cfg(feature = "host")]
//! PNG previews of grids and loading grids from PNG images (host only).

use crate::color::Color;
use crate::grid::Grid;
use png::{BitDepth, ColorType, Decoder, Encoder, ScaledFloat, Transformations};
use smart_leds::RGB8;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PREVIEW_INVERSE_GAMMA: f32 = 2.2;
/// Largest accepted `target_max_dimension`, in pixels.
pub const MAX_PREVIEW_DIMENSION: u32 = 1 << 14;
/// Three 16-bit channels.
const BYTES_PER_PIXEL: usize = 6;
/// Unlit pads are drawn faintly so the layout stays visible.
const UNLIT_PAD: RGB8 = RGB8 { r: 24, g: 24, b: 24 };

/// Render a `Grid` into a PNG file sized to the requested maximum dimension.
///
/// Each cell becomes a round LED in its [`Color::to_rgb8`] color.
pub fn write_grid_png(
    grid: &Grid,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
) -> Result<(), Box<dyn Error>> {
    write_grid_png_with_gamma(grid, output_path, target_max_dimension, PREVIEW_INVERSE_GAMMA)
}

/// Render a `Grid` into a PNG file with a custom preview inverse gamma.
pub fn write_grid_png_with_gamma(
    grid: &Grid,
    output_path: impl AsRef<Path>,
    target_max_dimension: u32,
    preview_inverse_gamma: f32,
) -> Result<(), Box<dyn Error>> {
    if preview_inverse_gamma <= 0.0 {
        return Err("preview_inverse_gamma must be positive".into());
    }
    let output_path = output_path.as_ref();
    let columns = u32::try_from(grid.width())?;
    let rows = u32::try_from(grid.height())?;
    let cell_size = select_cell_size(columns, rows, target_max_dimension)?;
    let (width, height, pixels) = panel_pixels(grid, cell_size, preview_inverse_gamma)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(output_path)?;
    let mut encoder = Encoder::new(BufWriter::new(file), width, height);
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Sixteen);
    encoder.set_source_gamma(ScaledFloat::new(1.0));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&pixels)?;
    writer.finish()?;
    println!("wrote PNG to {}", output_path.display());
    Ok(())
}

impl Grid {
    /// Load a grid from a PNG image: one cell per pixel, quantized with
    /// [`Color::from_rgb8`]. Black pixels become [`Color::OFF`]; alpha is ignored.
    pub fn from_png(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let mut decoder = Decoder::new(File::open(path.as_ref())?);
        decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buffer = vec![0_u8; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buffer)?;
        let bytes = &buffer[..info.buffer_size()];
        let pixels: Vec<RGB8> = match info.color_type {
            ColorType::Rgb => bytes
                .chunks_exact(3)
                .map(|px| RGB8::new(px[0], px[1], px[2]))
                .collect(),
            ColorType::Rgba => bytes
                .chunks_exact(4)
                .map(|px| RGB8::new(px[0], px[1], px[2]))
                .collect(),
            ColorType::Grayscale => bytes.chunks_exact(1).map(|px| gray(px[0])).collect(),
            ColorType::GrayscaleAlpha => bytes.chunks_exact(2).map(|px| gray(px[0])).collect(),
            _ => return Err("unsupported PNG color type".into()),
        };
        let width = usize::try_from(info.width)?;
        let height = usize::try_from(info.height)?;
        Ok(Self::from_rgb8(width, height, &pixels)?)
    }
}

const fn gray(level: u8) -> RGB8 {
    RGB8 {
        r: level,
        g: level,
        b: level,
    }
}

fn select_cell_size(
    columns: u32,
    rows: u32,
    target_max_dimension: u32,
) -> Result<u32, Box<dyn Error>> {
    if target_max_dimension > MAX_PREVIEW_DIMENSION {
        return Err("target_max_dimension is too large".into());
    }
    let cells = columns.max(rows).max(1);
    let mut cell_size = target_max_dimension / cells;
    while cell_size > 1 {
        if preview_dimension(cells, cell_size)? <= target_max_dimension {
            break;
        }
        cell_size -= 1;
    }
    if led_radius(cell_size) < 3 {
        return Err("target_max_dimension is too small for this grid".into());
    }
    Ok(cell_size)
}

/// Pixels along an edge holding `cells` LEDs, including the border on both sides.
fn preview_dimension(cells: u32, cell_size: u32) -> Result<u32, Box<dyn Error>> {
    cells
        .checked_mul(cell_size)
        .and_then(|inner| inner.checked_add(led_radius(cell_size) * 2))
        .ok_or_else(|| "preview is too large".into())
}

fn led_radius(cell_size: u32) -> u32 {
    let led_margin = (cell_size / 8).max(1);
    cell_size.saturating_sub(led_margin * 2) / 2
}

fn panel_pixels(
    grid: &Grid,
    cell_size: u32,
    preview_inverse_gamma: f32,
) -> Result<(u32, u32, Vec<u8>), Box<dyn Error>> {
    let led_radius = led_radius(cell_size);
    let fade_width = led_radius / 3;
    let border = led_radius;
    let width = preview_dimension(u32::try_from(grid.width())?, cell_size)?;
    let height = preview_dimension(u32::try_from(grid.height())?, cell_size)?;
    let row_stride = usize::try_from(width)?;
    let byte_len = row_stride
        .checked_mul(usize::try_from(height)?)
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or("preview is too large")?;
    let mut bytes = vec![0_u8; byte_len];
    let center = i64::from(cell_size - 1) / 2;
    let led_radius_f = led_radius as f32;
    let inner_radius_f = (led_radius - fade_width) as f32;
    let radius_sq = i64::from(led_radius) * i64::from(led_radius);

    for (row_index, row) in (0_u32..).zip(grid.rows()) {
        for (column_index, color) in (0_u32..).zip(row) {
            let pixel = led_rgb(*color);
            let cell_origin_x = column_index * cell_size;
            let cell_origin_y = row_index * cell_size;

            for local_y in 0..cell_size {
                let delta_y = i64::from(local_y) - center;
                for local_x in 0..cell_size {
                    let delta_x = i64::from(local_x) - center;
                    let distance_sq = delta_x * delta_x + delta_y * delta_y;
                    if distance_sq > radius_sq {
                        continue;
                    }
                    let distance = (distance_sq as f32).sqrt();
                    let intensity = if distance <= inner_radius_f {
                        1.0
                    } else {
                        let fade_span = led_radius_f - inner_radius_f;
                        (1.0 - (distance - inner_radius_f) / fade_span).max(0.0)
                    };
                    let x = border + cell_origin_x + local_x;
                    let y = border + cell_origin_y + local_y;
                    let pixel_index =
                        (usize::try_from(y)? * row_stride + usize::try_from(x)?) * BYTES_PER_PIXEL;
                    let channels = [pixel.r, pixel.g, pixel.b].map(|channel| {
                        linear_to_u16(inverse_gamma_to_linear(channel, preview_inverse_gamma) * intensity)
                    });
                    for (offset, channel) in channels.into_iter().enumerate() {
                        let [high, low] = channel.to_be_bytes();
                        bytes[pixel_index + offset * 2] = high;
                        bytes[pixel_index + offset * 2 + 1] = low;
                    }
                }
            }
        }
    }

    Ok((width, height, bytes))
}

fn led_rgb(color: Color) -> RGB8 {
    if color.is_off() {
        UNLIT_PAD
    } else {
        color.to_rgb8()
    }
}

fn inverse_gamma_to_linear(channel: u8, preview_inverse_gamma: f32) -> f32 {
    let normalized = f32::from(channel) / 255.0;
    normalized.powf(preview_inverse_gamma)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is clamped to 0..=65535"
)]
fn linear_to_u16(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 65535.0).round() as u16
}
