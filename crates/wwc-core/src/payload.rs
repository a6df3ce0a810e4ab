use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PayloadError;

/// Default file name offered when saving the generated infographic.
pub const DOWNLOAD_FILE_NAME: &str = "visa-wwc-infographic.png";

/// Encoded image exactly as the backend returned it, usually a
/// `data:image/png;base64,...` URI. Clones share the same buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload(Arc<str>);

impl ImagePayload {
    pub fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when both handles point at the same buffer.
    pub fn same_as(&self, other: &ImagePayload) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Media type declared by a data URI, if any.
    pub fn media_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split_once(',')?.0;
        let media_type = header.split(';').next().unwrap_or_default();
        (!media_type.is_empty()).then_some(media_type)
    }

    /// Raw image bytes. Accepts a base64 data URI or bare base64.
    pub fn decode(&self) -> Result<Vec<u8>, PayloadError> {
        let encoded = match self.0.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest.split_once(',').ok_or(PayloadError::UnsupportedDataUri)?;
                if !header.ends_with(";base64") {
                    return Err(PayloadError::UnsupportedDataUri);
                }
                data
            }
            None => &self.0,
        };

        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(PayloadError::Empty);
        }

        Ok(STANDARD.decode(encoded)?)
    }

    pub fn decode_rgba(&self) -> Result<RgbaImage, PayloadError> {
        let bytes = self.decode()?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }

    pub fn save(&self, path: &Path) -> Result<(), PayloadError> {
        let bytes = self.decode()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Serialize for ImagePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ImagePayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

// The payload can be megabytes of base64; keep it out of logs.
impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("media_type", &self.media_type())
            .field("len", &self.0.len())
            .finish()
    }
}
