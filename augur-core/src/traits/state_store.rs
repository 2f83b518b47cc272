use crate::errors::AugurResult;

/// Opaque snapshot persistence for state-machine state.
///
/// The blob is a versioned byte payload the store must not interpret.
/// Failures are reported but never treated as fatal by the engine; the
/// in-memory state stays authoritative.
pub trait StateStore: Send + Sync {
    fn save(&self, blob: &[u8]) -> AugurResult<()>;
    fn load(&self) -> AugurResult<Option<Vec<u8>>>;
}

/// Store that persists nothing; the default when no collaborator is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStateStore;

impl StateStore for NullStateStore {
    fn save(&self, _blob: &[u8]) -> AugurResult<()> {
        Ok(())
    }

    fn load(&self) -> AugurResult<Option<Vec<u8>>> {
        Ok(None)
    }
}
