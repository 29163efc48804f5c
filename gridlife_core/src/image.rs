//! Binary PGM (P5) grid snapshots.
//!
//! The persisted layout is a row-major byte matrix, one byte per cell
//! (0 or 255); filenames encode `<width>x<height>[x<turn>]`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::CoreError;
use crate::grid::Grid;

const MAX_DIMENSION: usize = 1 << 16;

/// Builds the canonical snapshot filename.
pub fn grid_filename(width: usize, height: usize, turn: Option<u32>) -> String {
    match turn {
        Some(turn) => format!("{}x{}x{}.pgm", width, height, turn),
        None => format!("{}x{}.pgm", width, height),
    }
}

/// Reads a grid from a binary PGM file.
pub fn read_grid(path: &Path) -> Result<Grid, CoreError> {
    let mut reader = BufReader::new(File::open(path)?);

    let magic = next_token(&mut reader)?;
    if magic != "P5" {
        return Err(CoreError::format(format!(
            "expected P5 magic, found {:?}",
            magic
        )));
    }
    let width = next_dimension(&mut reader, "width")?;
    let height = next_dimension(&mut reader, "height")?;
    let maxval = next_token(&mut reader)?;
    if maxval != "255" {
        return Err(CoreError::format(format!(
            "expected maxval 255, found {:?}",
            maxval
        )));
    }

    let mut cells = vec![0u8; width * height];
    reader.read_exact(&mut cells)?;
    Grid::from_cells(width, height, cells)
}

/// Writes a grid as a binary PGM file.
pub fn write_grid(path: &Path, grid: &Grid) -> Result<(), CoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let header = format!("P5\n{} {}\n255\n", grid.width(), grid.height());
    writer.write_all(header.as_bytes())?;
    writer.write_all(grid.cells())?;
    writer.flush()?;
    Ok(())
}

fn next_dimension(reader: &mut impl Read, what: &str) -> Result<usize, CoreError> {
    let token = next_token(reader)?;
    let value: usize = token
        .parse()
        .map_err(|_| CoreError::format(format!("bad {}: {:?}", what, token)))?;
    if value == 0 || value > MAX_DIMENSION {
        return Err(CoreError::format(format!("bad {}: {}", what, value)));
    }
    Ok(value)
}

/// Reads one whitespace-delimited header token, skipping `#` comments.
///
/// Consumes the single whitespace byte terminating the token, which for the
/// maxval token is the separator before the raw cell bytes.
fn next_token(reader: &mut impl Read) -> Result<String, CoreError> {
    let mut token = Vec::new();
    let mut in_comment = false;
    loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte)? == 0 {
            if token.is_empty() {
                return Err(CoreError::format("truncated header".to_string()));
            }
            break;
        }
        let byte = byte[0];
        if in_comment {
            if byte == b'\n' {
                in_comment = false;
            }
            continue;
        }
        if byte == b'#' && token.is_empty() {
            in_comment = true;
            continue;
        }
        if byte.is_ascii_whitespace() {
            if token.is_empty() {
                continue;
            }
            break;
        }
        token.push(byte);
    }
    String::from_utf8(token).map_err(|_| CoreError::format("non-ASCII header".to_string()))
}
