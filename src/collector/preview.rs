use crate::collector::coords::{PhysicalRect, ScaleFactor};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

pub const OUTLINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const LABEL_BACKING_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
/// Offset of the label backing from the box corner, in physical pixels.
pub const LABEL_OFFSET: u32 = 2;
/// Padding between the backing edge and the glyphs.
pub const LABEL_PADDING: u32 = 2;

const GLYPH_SIZE: u32 = 8;

/// Annotates a native-resolution frame and downsamples it to logical resolution.
pub fn render(frame: &RgbImage, rect: PhysicalRect, label: &str, scale: ScaleFactor) -> RgbImage {
    let mut canvas = frame.clone();
    draw_rect_outline(&mut canvas, rect, scale.outline_width(), OUTLINE_COLOR);

    let glyph_scale = glyph_scale(scale);
    let (text_w, text_h) = measure_text(label, glyph_scale);
    let backing_left = rect.left.saturating_add(LABEL_OFFSET);
    let backing_top = rect.top.saturating_add(LABEL_OFFSET);
    draw_rect_fill(
        &mut canvas,
        PhysicalRect {
            left: backing_left,
            top: backing_top,
            right: backing_left.saturating_add(text_w + LABEL_PADDING * 2),
            bottom: backing_top.saturating_add(text_h + LABEL_PADDING * 2),
        },
        LABEL_BACKING_COLOR,
    );
    draw_text(
        &mut canvas,
        backing_left.saturating_add(LABEL_PADDING),
        backing_top.saturating_add(LABEL_PADDING),
        label,
        glyph_scale,
        LABEL_TEXT_COLOR,
    );

    let (width, height) = scale.to_logical_dims(canvas.width(), canvas.height());
    downsample(&canvas, width, height)
}

pub fn downsample(frame: &RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    imageops::resize(frame, width, height, FilterType::Triangle)
}

fn glyph_scale(scale: ScaleFactor) -> u32 {
    (scale.get().round() as u32).max(1)
}

/// Pixel bounds of `text` rendered with 8x8 glyphs at `glyph_scale`.
pub fn measure_text(text: &str, glyph_scale: u32) -> (u32, u32) {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return (0, 0);
    }
    (
        chars * GLYPH_SIZE * glyph_scale,
        GLYPH_SIZE * glyph_scale,
    )
}

fn put_clipped(img: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, color);
    }
}

/// Inclusive rectangle filled with `color`, clipped to the image.
fn draw_rect_fill(img: &mut RgbImage, rect: PhysicalRect, color: Rgb<u8>) {
    if img.width() == 0 || img.height() == 0 || rect.left > rect.right || rect.top > rect.bottom {
        return;
    }
    let max_x = rect.right.min(img.width() - 1);
    let max_y = rect.bottom.min(img.height() - 1);
    for y in rect.top..=max_y {
        for x in rect.left..=max_x {
            img.put_pixel(x, y, color);
        }
    }
}

/// Outline of `width` pixels drawn inward from the inclusive bounds.
fn draw_rect_outline(img: &mut RgbImage, rect: PhysicalRect, width: u32, color: Rgb<u8>) {
    if rect.left > rect.right || rect.top > rect.bottom {
        return;
    }
    let inner_w = rect.right - rect.left + 1;
    let inner_h = rect.bottom - rect.top + 1;
    if width * 2 >= inner_w || width * 2 >= inner_h {
        draw_rect_fill(img, rect, color);
        return;
    }
    let band = width - 1;
    let bands = [
        PhysicalRect {
            bottom: rect.top + band,
            ..rect
        },
        PhysicalRect {
            top: rect.bottom - band,
            ..rect
        },
        PhysicalRect {
            right: rect.left + band,
            ..rect
        },
        PhysicalRect {
            left: rect.right - band,
            ..rect
        },
    ];
    for edge in bands {
        draw_rect_fill(img, edge, color);
    }
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, glyph_scale: u32, color: Rgb<u8>) {
    let mut cursor_x = x;
    for ch in text.chars() {
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        if let Some(glyph) = glyph {
            for (row_idx, row) in glyph.iter().copied().enumerate() {
                for col_idx in 0..GLYPH_SIZE {
                    if (row >> col_idx) & 1 == 0 {
                        continue;
                    }
                    let px = cursor_x + col_idx * glyph_scale;
                    let py = y + row_idx as u32 * glyph_scale;
                    for sy in 0..glyph_scale {
                        for sx in 0..glyph_scale {
                            put_clipped(img, px + sx, py + sy, color);
                        }
                    }
                }
            }
        }
        cursor_x = cursor_x.saturating_add(GLYPH_SIZE * glyph_scale);
    }
}
