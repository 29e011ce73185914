//! Image sniffing and remote image fetching.

use std::{fmt, time::Duration};

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{StorageError, StorageResult};

/// Image formats accepted as sidecar images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Portable Network Graphics.
    Png,
    /// JPEG.
    Jpeg,
    /// GIF.
    Gif,
    /// WebP.
    WebP,
    /// Windows bitmap.
    Bmp,
}

impl ImageFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// MIME type for transport headers.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Detect the format of `bytes` from their magic number.
pub fn validate_image(bytes: &[u8]) -> StorageResult<ImageFormat> {
    let format = image::guess_format(bytes).map_err(|_| StorageError::UnknownImageType)?;
    match format {
        image::ImageFormat::Png => Ok(ImageFormat::Png),
        image::ImageFormat::Jpeg => Ok(ImageFormat::Jpeg),
        image::ImageFormat::Gif => Ok(ImageFormat::Gif),
        image::ImageFormat::WebP => Ok(ImageFormat::WebP),
        image::ImageFormat::Bmp => Ok(ImageFormat::Bmp),
        _ => Err(StorageError::UnknownImageType),
    }
}

/// Image bytes read back from storage together with their format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Detected format.
    pub format: ImageFormat,
}

/// Source of image bytes for a URL.
pub trait ImageFetcher: Send + Sync {
    /// Download the whole resource at `url`.
    fn download(&self, url: &str) -> StorageResult<Vec<u8>>;
}

/// Blocking HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with a request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| StorageError::Network {
                url: String::new(),
                source: Box::new(err),
            })?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn download(&self, url: &str) -> StorageResult<Vec<u8>> {
        debug!("downloading image from {url}");
        let network = |err: reqwest::Error| StorageError::Network {
            url: url.to_string(),
            source: Box::new(err),
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(network)?;
        let bytes = response.bytes().map_err(network)?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::HashMap, io, sync::Mutex};

    use super::*;

    /// Minimal PNG signature, enough for format sniffing.
    pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    /// Minimal GIF header.
    pub const GIF: &[u8] = b"GIF89a\x01\0\x01\0\0\0\0";

    /// In-memory fetcher keyed by URL that records every request.
    #[derive(Default)]
    pub struct StubFetcher {
        images: HashMap<String, Vec<u8>>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn with(mut self, url: &str, bytes: &[u8]) -> Self {
            self.images.insert(url.to_string(), bytes.to_vec());
            self
        }
    }

    impl ImageFetcher for StubFetcher {
        fn download(&self, url: &str) -> StorageResult<Vec<u8>> {
            self.requests.lock().unwrap().push(url.to_string());
            self.images
                .get(url)
                .cloned()
                .ok_or_else(|| StorageError::Network {
                    url: url.to_string(),
                    source: Box::new(io::Error::new(io::ErrorKind::NotFound, "404")),
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{GIF, PNG};
    use super::*;

    #[test]
    fn recognises_accepted_formats() {
        assert_eq!(validate_image(PNG).unwrap(), ImageFormat::Png);
        assert_eq!(validate_image(GIF).unwrap(), ImageFormat::Gif);
        assert_eq!(
            validate_image(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).unwrap(),
            ImageFormat::Jpeg
        );
        assert_eq!(ImageFormat::Png.mime_type(), "image/png");
    }

    #[test]
    fn rejects_non_images() {
        let err = validate_image(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, StorageError::UnknownImageType));
        assert!(validate_image(&[]).is_err());
    }
}
