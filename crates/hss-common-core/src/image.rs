//! Executable image format.
//!
//! Layout (at least 0x30000 bytes):
//! - `[0x00000, 0x10000)`: code segment, one byte per instruction slot
//! - `[0x10000, 0x30000)`: data segment, 65536 big-endian 16-bit words
//!
//! Bytes past 0x30000 are ignored.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layout::{self, Word, CODE_SIZE, DATA_WORDS};

/// Bytes of the data segment in an image file.
pub const DATA_BYTES: usize = DATA_WORDS * 2;
/// Smallest valid image.
pub const MIN_IMAGE_BYTES: usize = CODE_SIZE + DATA_BYTES;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image is {size} bytes, expected at least {} bytes", MIN_IMAGE_BYTES)]
    TooSmall { size: usize },
    #[error("cannot access image {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Code and data segments of a program.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub code: Box<[u8; CODE_SIZE]>,
    pub data: Box<[Word; DATA_WORDS]>,
}

impl Image {
    /// An all-zero image (every instruction is a no-op).
    pub fn new() -> Self {
        Self {
            code: layout::zeroed(),
            data: layout::zeroed(),
        }
    }

    /// Parse an image. Returns the image and the number of ignored trailing bytes.
    pub fn parse(bytes: &[u8]) -> Result<(Self, usize), ImageError> {
        if bytes.len() < MIN_IMAGE_BYTES {
            return Err(ImageError::TooSmall { size: bytes.len() });
        }

        let mut image = Self::new();
        image.code.copy_from_slice(&bytes[..CODE_SIZE]);
        for (word, pair) in image
            .data
            .iter_mut()
            .zip(bytes[CODE_SIZE..MIN_IMAGE_BYTES].chunks_exact(2))
        {
            *word = Word::from_be_bytes([pair[0], pair[1]]);
        }

        Ok((image, bytes.len() - MIN_IMAGE_BYTES))
    }

    /// Read and parse an image file.
    pub fn read(path: &Path) -> Result<(Self, usize), ImageError> {
        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    /// Serialize to exactly [`MIN_IMAGE_BYTES`] bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MIN_IMAGE_BYTES);
        bytes.extend_from_slice(&self.code[..]);
        for word in self.data.iter() {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    pub fn write(&self, path: &Path) -> Result<(), ImageError> {
        std::fs::write(path, self.to_bytes()).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code_used = self.code.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let data_used = self.data.iter().rposition(|&w| w != 0).map_or(0, |i| i + 1);
        f.debug_struct("Image")
            .field("code_used", &code_used)
            .field("data_used", &data_used)
            .finish()
    }
}
