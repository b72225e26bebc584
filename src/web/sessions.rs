// src/web/sessions.rs
//! Open preview editors, one photo resolver each

use crate::app_log;
use crate::preview::{ObjectUrlStore, PhotoPreview};
use crate::types::PhotoValue;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Oldest sessions are closed beyond this many
pub const MAX_PREVIEW_SESSIONS: usize = 256;

/// Per signed-in user. All anonymous callers share one allowance.
pub const MAX_SESSIONS_PER_CALLER: usize = 4;

struct PreviewSession {
    /// Opening order
    seq: u64,
    /// User id, `None` for anonymous
    owner: Option<String>,
    photo: PhotoPreview,
    /// Latest photo field value, including uploads that cannot travel as JSON
    photo_value: Option<PhotoValue>,
}

impl PreviewSession {
    fn owned_by(&self, owner: Option<&str>) -> bool {
        self.owner.as_deref() == owner
    }
}

pub struct PreviewSessions {
    store: Arc<ObjectUrlStore>,
    sessions: Mutex<HashMap<Uuid, PreviewSession>>,
    next_seq: AtomicU64,
}

fn oldest<'a, I>(sessions: I) -> Option<Uuid>
where
    I: Iterator<Item = (&'a Uuid, &'a PreviewSession)>,
{
    sessions.min_by_key(|(_, s)| s.seq).map(|(id, _)| *id)
}

impl PreviewSessions {
    pub fn new(store: Arc<ObjectUrlStore>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    pub fn store(&self) -> &Arc<ObjectUrlStore> {
        &self.store
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session for `owner`.
    ///
    /// A caller at its allowance loses its own oldest session. When the whole
    /// table is full, anonymous sessions go before signed-in ones.
    pub fn open(&self, owner: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions();

        let owned = sessions.values().filter(|s| s.owned_by(owner)).count();
        let evict = if owned >= MAX_SESSIONS_PER_CALLER {
            oldest(sessions.iter().filter(|(_, s)| s.owned_by(owner)))
        } else if sessions.len() >= MAX_PREVIEW_SESSIONS {
            oldest(sessions.iter().filter(|(_, s)| s.owner.is_none()))
                .or_else(|| oldest(sessions.iter()))
        } else {
            None
        };
        if let Some(evict) = evict {
            sessions.remove(&evict);
            app_log!(info, "Closed preview session {} to make room", evict);
        }

        sessions.insert(
            id,
            PreviewSession {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                owner: owner.map(str::to_string),
                photo: PhotoPreview::new(Arc::clone(&self.store)),
                photo_value: None,
            },
        );
        id
    }

    /// Tear the session down, releasing its object URL; `false` if unknown
    /// or opened by someone else
    pub fn close(&self, owner: Option<&str>, id: &Uuid) -> bool {
        let mut sessions = self.sessions();
        if !sessions.get(id).is_some_and(|s| s.owned_by(owner)) {
            return false;
        }
        sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a new photo field value and return the resolved src.
    ///
    /// `None` leaves the recorded value as it is: the editor omits the photo
    /// when it has not changed. Sessions of other owners are invisible.
    pub fn resolve_photo(
        &self,
        owner: Option<&str>,
        id: &Uuid,
        photo: Option<PhotoValue>,
    ) -> Option<Option<String>> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(id).filter(|s| s.owned_by(owner))?;

        if photo.is_some() {
            session.photo_value = photo;
        }
        session.photo.assign(session.photo_value.as_ref());
        Some(session.photo.src().map(str::to_string))
    }
}
