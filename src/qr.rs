//! QR code renderers for provisioning URIs.
//!
//! A [QrRenderer] turns text into image bytes; [data_uri] wraps them for embedding in HTML.
//! [TOTP::image_to_data](struct.TOTP.html#method.image_to_data) does both for a secret.

use base64::{engine::general_purpose, Engine as _};

/// Largest image side, in pixels, [data_uri] asks a renderer for.
pub const MAX_SIZE: u32 = 4096;

/// Different ways rendering a QR code failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// The requested image size must be between 1 and [MAX_SIZE].
    InvalidSize(u32),
    /// The renderer could not produce an image.
    Unavailable(String),
}

impl std::error::Error for QrError {}

impl std::fmt::Display for QrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QrError::InvalidSize(size) => write!(
                f,
                "Size must be between 1 and {} pixels, {} is not allowed",
                MAX_SIZE, size
            ),
            QrError::Unavailable(reason) => write!(f, "Unable to render QR code: {}", reason),
        }
    }
}

/// Renders text as a square QR image of `size` pixels.
pub trait QrRenderer {
    fn get_image(&self, text: &str, size: u32) -> Result<Vec<u8>, QrError>;

    fn mime_type(&self) -> &str;
}

impl<T: QrRenderer + ?Sized> QrRenderer for &T {
    fn get_image(&self, text: &str, size: u32) -> Result<Vec<u8>, QrError> {
        (**self).get_image(text, size)
    }

    fn mime_type(&self) -> &str {
        (**self).mime_type()
    }
}

/// Render `text` and wrap it as `data:<mime>;base64,<image>`.
///
/// # Errors
///
/// [QrError::InvalidSize] when `size` is 0 or above [MAX_SIZE], before the renderer is asked for anything.
pub fn data_uri<R: QrRenderer + ?Sized>(
    renderer: &R,
    text: &str,
    size: u32,
) -> Result<String, QrError> {
    if size == 0 || size > MAX_SIZE {
        return Err(QrError::InvalidSize(size));
    }
    let image = renderer.get_image(text, size)?;
    Ok(format!(
        "data:{};base64,{}",
        renderer.mime_type(),
        general_purpose::STANDARD.encode(image)
    ))
}

/// Error correction level of [ChartQrRenderer] images.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum ErrorCorrection {
    /// Recovers 7% of data
    #[default]
    Low,
    /// Recovers 15% of data
    Medium,
    /// Recovers 25% of data
    Quartile,
    /// Recovers 30% of data
    High,
}

impl std::fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCorrection::Low => f.write_str("L"),
            ErrorCorrection::Medium => f.write_str("M"),
            ErrorCorrection::Quartile => f.write_str("Q"),
            ErrorCorrection::High => f.write_str("H"),
        }
    }
}

/// Image URL on the chart service for `text` at `size` pixels.
pub fn chart_url(text: &str, size: u32, error_correction: ErrorCorrection, margin: u32) -> String {
    format!(
        "https://chart.googleapis.com/chart?cht=qr&chs={0}x{0}&chld={1}|{2}&chl={3}",
        size,
        error_correction,
        margin,
        urlencoding::encode(text)
    )
}

#[cfg(feature = "remote")]
pub use chart::ChartQrRenderer;

#[cfg(feature = "remote")]
#[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
mod chart {
    use log::trace;
    use reqwest::blocking::Client;

    use super::{chart_url, ErrorCorrection, QrError, QrRenderer};

    /// Fetches PNG QR codes from a chart rendering web service.
    #[derive(Debug, Clone)]
    pub struct ChartQrRenderer {
        pub error_correction: ErrorCorrection,
        pub margin: u32,
        client: Client,
    }

    impl ChartQrRenderer {
        pub fn new(error_correction: ErrorCorrection, margin: u32) -> Result<ChartQrRenderer, QrError> {
            let client =
                crate::http::client(true).map_err(|e| QrError::Unavailable(e.to_string()))?;
            Ok(ChartQrRenderer {
                error_correction,
                margin,
                client,
            })
        }

        pub fn url(&self, text: &str, size: u32) -> String {
            chart_url(text, size, self.error_correction, self.margin)
        }
    }

    impl QrRenderer for ChartQrRenderer {
        fn get_image(&self, text: &str, size: u32) -> Result<Vec<u8>, QrError> {
            let url = self.url(text, size);
            trace!("fetching {}x{} QR code from chart service", size, size);
            let bytes = self
                .client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map_err(|e| QrError::Unavailable(e.to_string()))?;
            Ok(bytes.to_vec())
        }

        fn mime_type(&self) -> &str {
            "image/png"
        }
    }

}

/// Renders PNG QR codes locally.
#[cfg(feature = "qr")]
#[cfg_attr(docsrs, doc(cfg(feature = "qr")))]
#[derive(Debug, Default, Clone, Copy)]
pub struct PngQrRenderer;

#[cfg(feature = "qr")]
impl QrRenderer for PngQrRenderer {
    fn get_image(&self, text: &str, size: u32) -> Result<Vec<u8>, QrError> {
        tfa_qrcode::draw_png(text, size).map_err(QrError::Unavailable)
    }

    fn mime_type(&self) -> &str {
        "image/png"
    }
}
