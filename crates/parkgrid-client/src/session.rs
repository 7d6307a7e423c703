//! Local session persistence.
//!
//! Persists the bearer token + user to `~/.parkgrid/session.json`. All
//! front-end views read the same file; there is no cross-process
//! synchronization, so two concurrent processes may observe stale session
//! state until they reload.

use std::path::PathBuf;

use parkgrid_core::model::Session;

/// File-backed session store. Absent or corrupt storage yields an empty
/// session, never an error.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    const FILE_NAME: &'static str = "session.json";

    /// Store rooted at `~/.parkgrid/`. `None` when no home directory can be
    /// determined.
    pub fn new() -> Option<Self> {
        dirs::home_dir().map(|home| Self {
            root: home.join(".parkgrid"),
        })
    }

    /// Store rooted at an explicit directory (tests, containers).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self) -> PathBuf {
        self.root.join(Self::FILE_NAME)
    }

    /// Load the persisted session, if any. Corrupt contents read as no
    /// session.
    pub fn get(&self) -> Option<Session> {
        let raw = std::fs::read_to_string(self.path()).ok()?;
        serde_json::from_str(&raw).ok()
    }

    /// Persist a session, replacing any existing one.
    pub fn set(&self, session: &Session) -> parkgrid_core::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(self.path(), json)?;
        Ok(())
    }

    /// Remove the persisted session. Idempotent: clearing an already-empty
    /// store is a no-op.
    pub fn clear(&self) -> parkgrid_core::Result<()> {
        match std::fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// One-shot latch for forced logout.
///
/// An authentication failure must clear the session and navigate to the
/// entry view exactly once; failures from other in-flight requests arriving
/// afterwards must not repeat the redirect.
#[derive(Debug, Default)]
pub struct LogoutLatch {
    fired: bool,
}

impl LogoutLatch {
    pub const fn new() -> Self {
        Self { fired: false }
    }

    /// Returns `true` only for the first call; the caller performs the
    /// clear + redirect when it gets `true`.
    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }

    /// Re-arm after a fresh login.
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parkgrid_core::model::{Role, User};

    fn sample_session() -> Session {
        Session {
            access_token: "t1".into(),
            user: User {
                id: 1,
                name: "Rahim".into(),
                role: Role::Driver,
            },
        }
    }

    #[test]
    fn empty_store_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(dir.path());
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_get_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(dir.path());
        store.set(&sample_session()).unwrap();

        let loaded = store.get().unwrap();
        assert_eq!(loaded.access_token, "t1");
        assert_eq!(loaded.user.id, 1);
        assert_eq!(loaded.user.role, Role::Driver);
    }

    #[test]
    fn clear_removes_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(dir.path());
        store.set(&sample_session()).unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn double_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(dir.path());
        store.set(&sample_session()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn corrupt_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_root(dir.path());
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("session.json"), "{not json").unwrap();
        assert!(store.get().is_none());
    }

    #[test]
    fn logout_latch_fires_once() {
        let mut latch = LogoutLatch::new();
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(!latch.fire());
    }

    #[test]
    fn logout_latch_rearms_after_reset() {
        let mut latch = LogoutLatch::new();
        assert!(latch.fire());
        latch.reset();
        assert!(latch.fire());
    }
}
