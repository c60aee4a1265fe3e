//! Text accessor

use crate::accessor::{Accessor, AccessorRef};
use crate::error::{AccessorError, AccessorResult};
use crate::manager::AccessorHandle;
use crate::medium::ContentMedium;
use core_types::AccessKind;

/// Accessor for a UTF-8 text buffer
pub struct TextAccessor {
    medium: Box<dyn ContentMedium>,
    buffer: String,
    dropped: bool,
}

impl TextAccessor {
    pub fn new(medium: Box<dyn ContentMedium>) -> Self {
        Self {
            medium,
            buffer: String::new(),
            dropped: false,
        }
    }

    pub fn read(&self) -> AccessorResult<String> {
        self.ensure_not_dropped()?;
        Ok(self.buffer.clone())
    }

    /// Replaces the whole buffer
    pub fn write(&mut self, text: &str) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.buffer = text.to_string();
        Ok(())
    }

    pub fn append(&mut self, text: &str) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.buffer.push_str(text);
        Ok(())
    }

    fn ensure_not_dropped(&self) -> AccessorResult<()> {
        if self.dropped {
            return Err(AccessorError::Dropped);
        }
        Ok(())
    }
}

impl Accessor for TextAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Text
    }

    fn exists(&self) -> AccessorResult<bool> {
        self.medium.exists()
    }

    fn create(&mut self) -> AccessorResult<()> {
        self.buffer.clear();
        self.dropped = false;
        Ok(())
    }

    fn load(&mut self) -> AccessorResult<()> {
        self.buffer = match self.medium.read()? {
            Some(bytes) => String::from_utf8(bytes)?,
            None => String::new(),
        };
        Ok(())
    }

    fn save(&mut self) -> AccessorResult<()> {
        self.ensure_not_dropped()?;
        self.medium.write(self.buffer.as_bytes())
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
        target.buffer = self.buffer.clone();
        Ok(())
    }

    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Text(shared)
    }
}
