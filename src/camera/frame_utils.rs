//! Frame conversion and transformation utilities.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::{Frame, FrameFormat};

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Handles various camera formats (MJPEG, YUYV, NV12, etc.) by using
/// nokhwa's built-in decode_image which automatically converts from
/// the camera's native format to RGB.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Rgb,
        timestamp: Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = frame.bytes_per_pixel();

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        // Swap pixels from left and right
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Extract a sub-rectangle of a frame.
///
/// The rectangle is clamped to the frame bounds. Returns `None` when the
/// clamped rectangle is empty (origin outside the frame, or zero size).
pub fn crop(frame: &Frame, x: u32, y: u32, width: u32, height: u32) -> Option<Frame> {
    if x >= frame.width || y >= frame.height {
        return None;
    }

    let crop_w = width.min(frame.width - x) as usize;
    let crop_h = height.min(frame.height - y) as usize;
    if crop_w == 0 || crop_h == 0 {
        return None;
    }

    let bpp = frame.bytes_per_pixel();
    let src_stride = frame.width as usize * bpp;
    let mut data = Vec::with_capacity(crop_w * crop_h * bpp);

    for row in 0..crop_h {
        let start = (y as usize + row) * src_stride + x as usize * bpp;
        data.extend_from_slice(&frame.data[start..start + crop_w * bpp]);
    }

    Some(Frame {
        data,
        width: crop_w as u32,
        height: crop_h as u32,
        format: frame.format,
        timestamp: frame.timestamp,
    })
}
