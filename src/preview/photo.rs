// src/preview/photo.rs
//! Transient object URLs for photos that only exist in memory
//!
//! An uploaded photo has no address until it is persisted, so the preview
//! registers its bytes under a random id and serves them from
//! [`OBJECT_URL_PREFIX`]. Every registration is owned by an [`ObjectUrl`]
//! guard; dropping the guard revokes the URL.

use crate::app_log;
use crate::types::{PhotoFile, PhotoValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

pub const OBJECT_URL_PREFIX: &str = "/api/preview/objects/";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub mime_type: String,
    pub bytes: Arc<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct ObjectUrlStore {
    objects: Mutex<HashMap<Uuid, StoredObject>>,
}

impl ObjectUrlStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<Uuid, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register the file's bytes; the returned guard keeps them reachable
    pub fn create(self: &Arc<Self>, file: &PhotoFile) -> ObjectUrl {
        let id = Uuid::new_v4();
        self.objects().insert(
            id,
            StoredObject {
                mime_type: file.mime_type.clone(),
                bytes: Arc::clone(&file.bytes),
            },
        );
        app_log!(debug, "Created object URL {} for photo {}", id, file.id);

        ObjectUrl {
            id,
            store: Arc::clone(self),
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<StoredObject> {
        self.objects().get(id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.objects().len()
    }

    fn revoke(&self, id: &Uuid) {
        if self.objects().remove(id).is_some() {
            app_log!(debug, "Revoked object URL {}", id);
        }
    }
}

/// Owner of one live object URL
#[derive(Debug)]
pub struct ObjectUrl {
    id: Uuid,
    store: Arc<ObjectUrlStore>,
}

impl ObjectUrl {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> String {
        format!("{}{}", OBJECT_URL_PREFIX, self.id)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.id);
    }
}

/// Displayable address of the personal-info photo for one mounted preview
#[derive(Debug)]
pub struct PhotoPreview {
    store: Arc<ObjectUrlStore>,
    current: Option<(Uuid, ObjectUrl)>,
    src: String,
}

impl PhotoPreview {
    pub fn new(store: Arc<ObjectUrlStore>) -> Self {
        Self {
            store,
            current: None,
            src: String::new(),
        }
    }

    /// Follow a change of the photo field.
    ///
    /// Re-assigning the file that is already displayed keeps its URL. Any other
    /// change releases the previous URL before a new one is created, so at most
    /// one is live at a time.
    pub fn assign(&mut self, photo: Option<&PhotoValue>) {
        match photo {
            Some(PhotoValue::File(file)) => {
                if self
                    .current
                    .as_ref()
                    .is_some_and(|(file_id, _)| *file_id == file.id)
                {
                    return;
                }
                self.release();
                let object_url = self.store.create(file);
                self.src = object_url.url();
                self.current = Some((file.id, object_url));
            }
            Some(PhotoValue::Url { url }) => {
                self.release();
                self.src = url.clone();
            }
            Some(PhotoValue::Cleared) | None => {
                self.release();
                self.src.clear();
            }
        }
    }

    pub fn src(&self) -> Option<&str> {
        if self.src.is_empty() {
            None
        } else {
            Some(&self.src)
        }
    }

    pub fn has_live_url(&self) -> bool {
        self.current.is_some()
    }

    fn release(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> PhotoValue {
        PhotoValue::File(PhotoFile::new("image/png", vec![1, 2, 3]))
    }

    #[test]
    fn test_replacing_twice_keeps_one_live_url() {
        let store = ObjectUrlStore::new();
        let mut preview = PhotoPreview::new(Arc::clone(&store));

        preview.assign(Some(&upload()));
        assert_eq!(store.live_count(), 1);
        let first = preview.src().map(str::to_string);

        preview.assign(Some(&upload()));
        assert_eq!(store.live_count(), 1);
        preview.assign(Some(&upload()));
        assert_eq!(store.live_count(), 1);

        assert_ne!(preview.src().map(str::to_string), first);
    }

    #[test]
    fn test_same_file_keeps_its_url() {
        let store = ObjectUrlStore::new();
        let mut preview = PhotoPreview::new(Arc::clone(&store));
        let photo = upload();

        preview.assign(Some(&photo));
        let src = preview.src().map(str::to_string);
        preview.assign(Some(&photo));

        assert_eq!(preview.src().map(str::to_string), src);
        assert_eq!(store.live_count(), 1);
    }

    #[test]
    fn test_clear_releases_without_new_url() {
        let store = ObjectUrlStore::new();
        let mut preview = PhotoPreview::new(Arc::clone(&store));

        preview.assign(Some(&upload()));
        preview.assign(Some(&PhotoValue::Cleared));

        assert_eq!(preview.src(), None);
        assert_eq!(store.live_count(), 0);
        assert!(!preview.has_live_url());
    }

    #[test]
    fn test_stored_url_is_used_directly() {
        let store = ObjectUrlStore::new();
        let mut preview = PhotoPreview::new(Arc::clone(&store));

        preview.assign(Some(&upload()));
        preview.assign(Some(&PhotoValue::Url {
            url: "https://cdn.example/p.png".to_string(),
        }));

        assert_eq!(preview.src(), Some("https://cdn.example/p.png"));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_teardown_releases() {
        let store = ObjectUrlStore::new();
        {
            let mut preview = PhotoPreview::new(Arc::clone(&store));
            preview.assign(Some(&upload()));
            assert_eq!(store.live_count(), 1);
        }
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_object_is_served_while_live() {
        let store = ObjectUrlStore::new();
        let file = PhotoFile::new("image/webp", vec![9; 16]);
        let object_url = store.create(&file);
        let id = object_url.id();

        let object = store.get(&id).unwrap();
        assert_eq!(object.mime_type, "image/webp");
        assert_eq!(object.bytes.len(), 16);
        assert!(object_url.url().starts_with(OBJECT_URL_PREFIX));

        drop(object_url);
        assert!(store.get(&id).is_none());
    }
}
