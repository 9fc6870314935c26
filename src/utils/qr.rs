use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{render::svg, types::QrError, EcLevel, QrCode};

/// Renders `data` as an SVG QR code wrapped in a `data:` URI, ready for an
/// `<img src>` or a JSON field.
///
/// Fails when `data` is too long to fit the largest QR version.
pub fn svg_data_uri(data: &str, size: u32) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .build();

    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}
