//! Binary accessor

use crate::accessor::{Accessor, AccessorRef};
use crate::error::{AccessorError, AccessorResult};
use crate::manager::AccessorHandle;
use crate::medium::ContentMedium;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core_types::AccessKind;

/// Accessor for a byte buffer
pub struct BinaryAccessor {
    medium: Box<dyn ContentMedium>,
    bytes: Vec<u8>,
    dropped: bool,
}

impl BinaryAccessor {
    pub fn new(medium: Box<dyn ContentMedium>) -> Self {
        Self {
            medium,
            bytes: Vec::new(),
            dropped: false,
        }
    }

    pub fn read(&self) -> AccessorResult<Vec<u8>> {
        self.ensure_not_dropped()?;
        Ok(self.bytes.clone())
    }

    pub fn write(&mut self, bytes: &[u8]) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.bytes = bytes.to_vec();
        Ok(())
    }

    /// Returns the buffer encoded with the standard base64 alphabet
    pub fn read_base64(&self) -> AccessorResult<String> {
        self.ensure_not_dropped()?;
        Ok(STANDARD.encode(&self.bytes))
    }

    /// Replaces the buffer with decoded base64 input
    pub fn write_base64(&mut self, encoded: &str) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.bytes = STANDARD.decode(encoded)?;
        Ok(())
    }

    fn ensure_not_dropped(&self) -> AccessorResult<()> {
        if self.dropped {
            return Err(AccessorError::Dropped);
        }
        Ok(())
    }
}

impl Accessor for BinaryAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Binary
    }

    fn exists(&self) -> AccessorResult<bool> {
        self.medium.exists()
    }

    fn create(&mut self) -> AccessorResult<()> {
        self.bytes.clear();
        self.dropped = false;
        Ok(())
    }

    fn load(&mut self) -> AccessorResult<()> {
        self.bytes = self.medium.read()?.unwrap_or_default();
        Ok(())
    }

    fn save(&mut self) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.medium.write(&self.bytes)
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        if self.dropped {
            return Ok(());
        }
        self.medium.remove()?;
        self.dropped = true;
        Ok(())
    }

    fn is_dropped(&self) -> bool {
        self.dropped
    }

    fn is_compatible(&self, _other: &Self) -> bool {
        true
    }

    fn copy_into(&self, target: &mut Self) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        target.ensure_not_dropped()?;
        target.bytes = self.bytes.clone();
        Ok(())
    }

    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Binary(shared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::MemoryStore;

    #[test]
    fn test_base64_round_trip() {
        let mut binary = BinaryAccessor::new(Box::new(MemoryStore::new().content("b")));
        binary.write(&[0, 1, 2, 255]).unwrap();
        assert_eq!(binary.read_base64().unwrap(), "AAEC/w==");

        binary.write_base64("aGVsbG8=").unwrap();
        assert_eq!(binary.read().unwrap(), b"hello".to_vec());
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let mut binary = BinaryAccessor::new(Box::new(MemoryStore::new().content("b")));
        assert!(matches!(
            binary.write_base64("not base64!"),
            Err(AccessorError::Base64(_))
        ));
    }

    #[test]
    fn test_bytes_survive_save_and_load() {
        let store = MemoryStore::new();
        let mut binary = BinaryAccessor::new(Box::new(store.content("b")));
        binary.write(&[9, 8, 7]).unwrap();
        binary.save().unwrap();

        let mut reloaded = BinaryAccessor::new(Box::new(store.content("b")));
        reloaded.load().unwrap();
        assert_eq!(reloaded.read().unwrap(), vec![9, 8, 7]);
    }
}
