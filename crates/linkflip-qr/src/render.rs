//! Turning a [`BitMatrix`] into something that can be shown.

use std::io::Cursor;

use base64::Engine as _;
use image::{GrayImage, ImageFormat, Luma};

use crate::error::Result;
use crate::matrix::BitMatrix;

/// One filled square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub side: f64,
}

/// Vector geometry for a code drawn at a given pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    /// Edge length of the whole code.
    pub size: f64,
    /// Edge length of one module.
    pub cell: f64,
    /// One square per dark module.
    pub rects: Vec<Rect>,
    /// The same squares as a single SVG path.
    pub path: String,
}

impl Drawable {
    /// Standalone SVG document with a light background.
    pub fn to_svg(&self, dark: &str, light: &str) -> String {
        let size = fmt_num(self.size);
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" "#,
                r#"viewBox="0 0 {size} {size}" shape-rendering="crispEdges">"#,
                r#"<rect width="100%" height="100%" fill="{light}"/>"#,
                r#"<path d="{path}" fill="{dark}"/></svg>"#
            ),
            size = size,
            light = light,
            dark = dark,
            path = self.path,
        )
    }
}

/// Lay the matrix out over a square of `pixel_size`. The module at
/// `(row, col)` lands at `(col * cell, row * cell)`.
pub fn to_drawable(matrix: &BitMatrix, pixel_size: f64) -> Drawable {
    let cell = pixel_size / matrix.size() as f64;
    let mut rects = Vec::new();
    let mut path = String::new();
    let c = fmt_num(cell);

    for (row, col) in matrix.dark_modules() {
        let x = col as f64 * cell;
        let y = row as f64 * cell;
        rects.push(Rect { x, y, side: cell });
        path.push_str(&format!("M{},{}h{c}v{c}h-{c}Z", fmt_num(x), fmt_num(y)));
    }

    Drawable {
        size: pixel_size,
        cell,
        rects,
        path,
    }
}

/// Shortest decimal form with at most three fractional digits.
fn fmt_num(value: f64) -> String {
    let s = format!("{value:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Greyscale raster, `scale` pixels per module, surrounded by `quiet_zone`
/// light modules.
pub fn to_image(matrix: &BitMatrix, scale: u32, quiet_zone: u32) -> GrayImage {
    let scale = scale.max(1);
    let modules = matrix.size() as u32 + quiet_zone * 2;
    let side = modules * scale;
    GrayImage::from_fn(side, side, |x, y| {
        let col = (x / scale).checked_sub(quiet_zone);
        let row = (y / scale).checked_sub(quiet_zone);
        let dark = match (row, col) {
            (Some(row), Some(col)) => matrix.get(row as usize, col as usize),
            _ => false,
        };
        Luma([if dark { 0 } else { 255 }])
    })
}

/// PNG bytes of [`to_image`].
pub fn to_png(matrix: &BitMatrix, scale: u32, quiet_zone: u32) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    to_image(matrix, scale, quiet_zone).write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// `data:image/png;base64,...` URI for image views that cannot draw vectors.
pub fn to_png_data_uri(matrix: &BitMatrix, scale: u32, quiet_zone: u32) -> Result<String> {
    let png = to_png(matrix, scale, quiet_zone)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

/// Text rendering with half blocks, two module rows per line. Dark modules
/// are drawn as filled cells, so the output suits a light-on-dark terminal
/// only when inverted by the caller.
pub fn to_terminal(matrix: &BitMatrix, quiet_zone: usize) -> String {
    let size = matrix.size() + quiet_zone * 2;
    let dark = |row: usize, col: usize| {
        row >= quiet_zone
            && col >= quiet_zone
            && matrix.get(row - quiet_zone, col - quiet_zone)
    };

    let mut out = String::with_capacity((size + 1) * size.div_ceil(2) * 3);
    for row in (0..size).step_by(2) {
        for col in 0..size {
            let top = dark(row, col);
            let bottom = row + 1 < size && dark(row + 1, col);
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode, ErrorTolerance};

    fn sample() -> BitMatrix {
        encode("https://github.com/octocat", ErrorTolerance::Medium).unwrap()
    }

    #[test]
    fn drawable_places_modules_by_row_and_column() {
        let matrix = sample();
        let drawable = to_drawable(&matrix, 125.0);
        assert_eq!(drawable.cell, 5.0);
        assert_eq!(drawable.rects.len(), matrix.dark_modules().count());

        // Top-left finder corner is dark; so is (row 0, col 6) but not (0, 7).
        assert_eq!(drawable.rects[0], Rect { x: 0.0, y: 0.0, side: 5.0 });
        assert!(drawable.path.starts_with("M0,0h5v5h-5Z"));
        assert!(drawable.path.contains("M30,0h5v5h-5Z"));
        assert!(!drawable.path.contains("M35,0h"));
    }

    #[test]
    fn fractional_cells_are_trimmed() {
        let matrix = sample();
        let drawable = to_drawable(&matrix, 120.0);
        assert!((drawable.cell - 4.8).abs() < 1e-9);
        assert!(drawable.path.contains("h4.8v4.8h-4.8Z"));
        assert!(!drawable.path.contains("0000"));
    }

    #[test]
    fn svg_document() {
        let svg = to_drawable(&sample(), 100.0).to_svg("#000", "#fff");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 100 100""#));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn raster_has_quiet_zone() {
        let matrix = sample();
        let image = to_image(&matrix, 3, 2);
        assert_eq!(image.width(), (25 + 4) * 3);
        assert_eq!(image.get_pixel(0, 0).0[0], 255);
        // First module of the finder, just inside the quiet zone.
        assert_eq!(image.get_pixel(6, 6).0[0], 0);
    }

    #[test]
    fn png_data_uri() {
        let uri = to_png_data_uri(&sample(), 2, 4).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn terminal_lines() {
        let matrix = sample();
        let text = to_terminal(&matrix, 1);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), (25 + 2 + 1) / 2);
        assert!(lines.iter().all(|l| l.chars().count() == 27));
        // Row 0 is quiet zone, row 1 is the finder's top edge.
        assert!(lines[0].chars().nth(1) == Some('▄'));
    }
}
