use reqwest::Client;
use tracing::debug;

pub const PROFILE_AVATAR_SIZE: u32 = 128;
pub const OWNER_AVATAR_SIZE: u32 = 48;

/// Decoded RGBA8 pixels, ready to be wrapped in a UI image on the event loop thread.
#[derive(Debug, Clone)]
pub struct AvatarPixels {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Asks GitHub's avatar CDN for a `size`-pixel square.
pub fn sized_url(url: &str, size: u32) -> String {
    if url.contains('?') {
        format!("{url}&s={size}")
    } else {
        format!("{url}?s={size}")
    }
}

/// Downloads avatar image bytes and decodes them into raw RGBA pixels.
/// Any failure is logged and yields `None`; the UI keeps a blank image.
pub async fn download(client: &Client, url: &str, size: u32) -> Option<AvatarPixels> {
    let sized = sized_url(url, size);

    let bytes = match client.get(&sized).send().await.and_then(|r| r.error_for_status()) {
        Ok(response) => match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(url = %sized, error = %e, "failed to read avatar body");
                return None;
            }
        },
        Err(e) => {
            debug!(url = %sized, error = %e, "failed to download avatar");
            return None;
        }
    };

    match decode(&bytes, size) {
        Ok(pixels) => Some(pixels),
        Err(e) => {
            debug!(url = %sized, error = %e, "failed to decode avatar");
            None
        }
    }
}

/// Decodes an encoded image and scales it to exactly `size`×`size`.
///
/// GitHub sometimes ignores the size hint for cached avatars, so the result
/// is always resized to keep memory bounded.
pub fn decode(bytes: &[u8], size: u32) -> image::ImageResult<AvatarPixels> {
    let rgba = image::load_from_memory(bytes)?
        .thumbnail_exact(size, size)
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(AvatarPixels {
        rgba: rgba.into_raw(),
        width,
        height,
    })
}
