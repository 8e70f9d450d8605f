use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::{ScreenshotBytes, StoredImage};

/// Holds screenshot bytes behind numeric handles until they are released.
#[derive(Debug, Clone, Default)]
pub struct ImageRegistry {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    images: Mutex<HashMap<u64, Bytes>>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, screenshot: ScreenshotBytes) -> StoredImage {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let bytes = Bytes::from(screenshot.bytes);
        let byte_len = bytes.len() as u64;
        if let Ok(mut images) = self.inner.images.lock() {
            images.insert(id, bytes);
        }
        StoredImage {
            id,
            byte_len,
            content_type: screenshot.content_type,
        }
    }

    /// Returns false when the handle was unknown or already released.
    pub fn release(&self, id: u64) -> bool {
        match self.inner.images.lock() {
            Ok(mut images) => images.remove(&id).is_some(),
            Err(_) => false,
        }
    }

    pub fn get(&self, id: u64) -> Option<Bytes> {
        self.inner
            .images
            .lock()
            .ok()
            .and_then(|images| images.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(len: usize) -> ScreenshotBytes {
        ScreenshotBytes {
            bytes: vec![0x89; len],
            content_type: Some("image/png".to_string()),
        }
    }

    #[test]
    fn handles_are_unique_and_release_once() {
        let registry = ImageRegistry::new();
        let first = registry.register(png(4));
        let second = registry.register(png(8));

        assert_ne!(first.id, second.id);
        assert_eq!(second.byte_len, 8);

        assert!(registry.release(first.id));
        assert!(!registry.release(first.id));
        assert!(registry.get(first.id).is_none());
        assert_eq!(registry.get(second.id).map(|b| b.len()), Some(8));
    }
}
