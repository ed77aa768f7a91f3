//! Render text as a square PNG QR code of a requested size, using `qrcodegen`
//! for the matrix and the `image` crate for the canvas.
use image::Luma;

pub use image;
pub use qrcodegen;

/// Width of the white border around the code, in modules.
/// Some readers don't work without it.
pub const QUIET_ZONE: u32 = 4;

/// Largest canvas side [draw_png] accepts, in pixels.
pub const MAX_SIZE: u32 = 4096;

/// Pixels per module so that the code and its quiet zone fit in `size` pixels.
///
/// Never less than one: a code that can't fit is drawn larger than requested rather than unreadable.
pub fn module_scale(qr_size: u32, size: u32) -> u32 {
    (size / (qr_size + 2 * QUIET_ZONE)).max(1)
}

/// Draw a QR code onto a `size`×`size` white canvas, centered.
///
/// The canvas grows to one pixel per module when `size` is too small to hold the code.
/// The canvas is allocated up front, so callers bound `size` themselves; [draw_png] uses [MAX_SIZE].
pub fn draw_canvas(qr: &qrcodegen::QrCode, size: u32) -> image::GrayImage {
    let modules = qr.size() as u32;
    let scale = module_scale(modules, size);
    let drawn = (modules + 2 * QUIET_ZONE) * scale;
    let canvas_size = size.max(drawn);
    let mut canvas = image::GrayImage::from_pixel(canvas_size, canvas_size, Luma([255]));

    let origin = (canvas_size - drawn) / 2 + QUIET_ZONE * scale;
    for x_qr in 0..modules {
        for y_qr in 0..modules {
            if !qr.get_module(x_qr as i32, y_qr as i32) {
                continue;
            }
            let x_start = origin + x_qr * scale;
            let y_start = origin + y_qr * scale;
            for x_img in x_start..x_start + scale {
                for y_img in y_start..y_start + scale {
                    canvas.put_pixel(x_img, y_img, Luma([0]));
                }
            }
        }
    }
    canvas
}

/// Draw text to a PNG QR code of `size` pixels.
///
/// # Errors
///
/// This will return an error in case `size` exceeds [MAX_SIZE], the text is too long to encode
/// into a QR code, or the canvas can't be encoded into a PNG.
pub fn draw_png(text: &str, size: u32) -> Result<Vec<u8>, String> {
    use image::ImageEncoder;

    if size > MAX_SIZE {
        return Err(format!(
            "{} pixels is larger than the {} pixels limit",
            size, MAX_SIZE
        ));
    }

    let code = qrcodegen::QrCode::encode_text(text, qrcodegen::QrCodeEcc::Medium)
        .map_err(|err| err.to_string())?;
    let canvas = draw_canvas(&code, size);
    let (width, height) = canvas.dimensions();

    let mut vec = Vec::new();
    image::codecs::png::PngEncoder::new(&mut vec)
        .write_image(&canvas.into_raw(), width, height, image::ColorType::L8)
        .map_err(|err| err.to_string())?;
    Ok(vec)
}
