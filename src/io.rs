//! Stream file I/O: newline-delimited JSON input and a versioned binary
//! dump.
//!
//! The JSON format holds one stream per line as an array of 2-element
//! arrays, `[[x0,y0],[x1,y1],...]`. The dump format is explicit
//! little-endian regardless of host byte order: the magic bytes `"SWRP"`, a
//! `u32` format version, a `u64` stream count, then per stream a `u64`
//! point count followed by interleaved `f32` coordinates. Coordinates round
//! through `f32` on the way to disk, matching the dump's compact layout.
//!
//! Everything here sits on the collaborator boundary; the alignment core
//! never touches a file descriptor.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use crate::stream::{Point, Stream, StreamCollection};

const MAGIC: [u8; 4] = *b"SWRP";
const VERSION: u32 = 1;

/// Errors for stream file I/O.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Underlying file-system failure.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    /// A line did not parse as an array of 2-element point arrays.
    #[error("line {line}: malformed stream json")]
    MalformedJsonLine {
        /// 1-based line number in the input file.
        line: usize,
        /// Parser failure for that line.
        #[source]
        source: serde_json::Error,
    },
    /// The dump does not start with the expected magic bytes.
    #[error("not a stream dump (magic {found:?})")]
    BadMagic {
        /// The four bytes actually read.
        found: [u8; 4],
    },
    /// The dump was written by an unsupported format version.
    #[error("unsupported dump version {found}, expected {VERSION}")]
    UnsupportedVersion {
        /// The version actually read.
        found: u32,
    },
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Reads a collection from a newline-delimited JSON file, one stream per
/// line. Blank lines are skipped; a malformed line reports its 1-based
/// number.
pub fn read_streams_json(path: impl AsRef<Path>) -> Result<StreamCollection> {
    let reader = BufReader::new(File::open(path)?);
    let mut streams = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let coords: Vec<[f64; 2]> = serde_json::from_str(&line).map_err(|source| {
            Error::MalformedJsonLine {
                line: index + 1,
                source,
            }
        })?;
        streams.push(Stream::new(
            coords.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
        ));
    }
    debug!("read {} streams from json lines", streams.len());
    Ok(StreamCollection::new(streams))
}

/// Writes a collection to the versioned little-endian dump format.
pub fn write_streams_binary(path: impl AsRef<Path>, streams: &StreamCollection) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(streams.len() as u64).to_le_bytes())?;
    for stream in streams.iter() {
        writer.write_all(&(stream.len() as u64).to_le_bytes())?;
        for p in stream.points() {
            writer.write_all(&(p.x as f32).to_le_bytes())?;
            writer.write_all(&(p.y as f32).to_le_bytes())?;
        }
    }
    writer.flush()?;
    debug!("wrote {} streams to binary dump", streams.len());
    Ok(())
}

/// Reads a collection back from the versioned little-endian dump format.
pub fn read_streams_binary(path: impl AsRef<Path>) -> Result<StreamCollection> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::BadMagic { found: magic });
    }
    let version = read_u32(&mut reader)?;
    if version != VERSION {
        return Err(Error::UnsupportedVersion { found: version });
    }
    let n_streams = read_u64(&mut reader)? as usize;
    let mut streams = Vec::new();
    for _ in 0..n_streams {
        let n_points = read_u64(&mut reader)? as usize;
        let mut points = Vec::with_capacity(n_points.min(1 << 20));
        for _ in 0..n_points {
            let x = read_f32(&mut reader)?;
            let y = read_f32(&mut reader)?;
            points.push(Point::new(f64::from(x), f64::from(y)));
        }
        streams.push(Stream::new(points));
    }
    debug!("read {} streams from binary dump", streams.len());
    Ok(StreamCollection::new(streams))
}

fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_f32(reader: &mut impl Read) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
