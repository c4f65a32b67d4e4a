use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// An encoded camera frame.
///
/// Bytes are kept opaque; decoding is the classifier's business.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    bytes: Vec<u8>,
}

impl Image {
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        fs::read(path).map(Self::from_bytes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Frames can be megabytes; print the size, not the payload.
impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image").field("len", &self.bytes.len()).finish()
    }
}
