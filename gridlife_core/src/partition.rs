//! Row partitioning for a round of jobs.

/// Splits `height` rows into `parts` contiguous inclusive bands.
///
/// Bands are near-equal; any remainder rows are appended to the last band.
/// `parts` is clamped to `[1, height]` so a degenerate partition count can
/// never produce an empty or inverted band. The returned bands exactly tile
/// `[0, height)`.
pub fn row_bands(height: usize, parts: usize) -> Vec<(usize, usize)> {
    if height == 0 {
        return Vec::new();
    }
    let parts = parts.clamp(1, height);
    let span = height / parts;
    let remainder = height % parts;
    let mut bands = Vec::with_capacity(parts);
    for i in 0..parts {
        let y1 = i * span;
        let mut y2 = (i + 1) * span - 1;
        if i == parts - 1 {
            y2 += remainder;
        }
        bands.push((y1, y2));
    }
    bands
}
