//! Frame type and pixel conversion from device formats to RGB8.

/// A captured camera frame as a packed RGB8 bitmap.
#[derive(Clone)]
pub struct Frame {
    /// RGB pixel data (width * height * 3 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Expected length of `data` for the frame's dimensions, or `None` if
    /// the dimensions do not fit in memory.
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(3)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Convert YUYV (4:2:2) to RGB8 using BT.601 studio-range coefficients.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share U and V.
/// `stride` is the driver's bytes per line; 0 means rows are tightly packed.
pub fn yuyv_to_rgb(
    yuyv: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<Vec<u8>, FrameError> {
    let rows = rows(yuyv, width, height, 2, stride)?;
    let mut rgb = Vec::with_capacity(rgb_len(width, height)?);
    for row in rows {
        for chunk in row.chunks_exact(4) {
            let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
            rgb.extend_from_slice(&ycbcr_to_rgb(y0, u, v));
            rgb.extend_from_slice(&ycbcr_to_rgb(y1, u, v));
        }
    }
    Ok(rgb)
}

/// Expand 8-bit grayscale into RGB8 by replicating the luma channel.
pub fn grey_to_rgb(
    gray: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<Vec<u8>, FrameError> {
    let rows = rows(gray, width, height, 1, stride)?;
    let mut rgb = Vec::with_capacity(rgb_len(width, height)?);
    for row in rows {
        rgb.extend(row.iter().flat_map(|&g| [g, g, g]));
    }
    Ok(rgb)
}

/// Copy an RGB24 buffer, dropping per-row padding and anything past the
/// last row.
pub fn rgb24_to_rgb(
    buf: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<Vec<u8>, FrameError> {
    let rows = rows(buf, width, height, 3, stride)?;
    let mut rgb = Vec::with_capacity(rgb_len(width, height)?);
    for row in rows {
        rgb.extend_from_slice(row);
    }
    Ok(rgb)
}

fn rgb_len(width: u32, height: u32) -> Result<usize, FrameError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(FrameError::TooLarge { width, height })
}

/// Split a device buffer into the pixel bytes of each row.
fn rows(
    buf: &[u8],
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
    stride: usize,
) -> Result<impl Iterator<Item = &[u8]>, FrameError> {
    let too_large = FrameError::TooLarge { width, height };
    let row_len = (width as usize)
        .checked_mul(bytes_per_pixel)
        .ok_or(too_large)?;
    let stride = if stride == 0 { row_len } else { stride };
    if stride < row_len {
        return Err(FrameError::InvalidStride { stride, row_len });
    }

    let height = height as usize;
    let expected = match height {
        0 => 0,
        h => stride
            .checked_mul(h - 1)
            .and_then(|n| n.checked_add(row_len))
            .ok_or(FrameError::TooLarge {
                width,
                height: h as u32,
            })?,
    };
    if buf.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: buf.len(),
        });
    }

    Ok((0..height).map(move |r| &buf[r * stride..r * stride + row_len]))
}

fn ycbcr_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = (298 * c + 409 * e + 128) >> 8;
    let g = (298 * c - 100 * d - 208 * e + 128) >> 8;
    let b = (298 * c + 516 * d + 128) >> 8;

    [
        r.clamp(0, 255) as u8,
        g.clamp(0, 255) as u8,
        b.clamp(0, 255) as u8,
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("line stride {stride} is shorter than a row of {row_len} bytes")]
    InvalidStride { stride: usize, row_len: usize },
    #[error("frame of {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
}
