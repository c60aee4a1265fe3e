//! Plugin-defined accessors
//!
//! A custom kind is registered with a [`CustomAccessEvent`] table. The
//! [`CustomAccessor`] forwards every lifecycle call to that table along with
//! the resource location and the arguments declared in the access tree.

use crate::accessor::{Accessor, AccessorRef};
use crate::error::{AccessorError, AccessorResult};
use crate::manager::AccessorHandle;
use core_types::AccessKind;
use serde_json::Value;
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Opaque plugin resource
pub type CustomState = Box<dyn Any + Send>;

/// Where a custom resource lives and how it was declared
#[derive(Debug, Clone, Copy)]
pub struct CustomContext<'a> {
    /// Filesystem location, `None` for in-memory storage
    pub path: Option<&'a Path>,
    /// Arguments from the `Custom` spec
    pub args: &'a [Value],
}

/// Event table for a custom kind
///
/// `copy`, `move_state` and `is_compatible` are optional. Without `copy`,
/// copying fails; without `move_state`, a move copies and then destroys the
/// source; without `is_compatible`, two resources of the same kind id are
/// always compatible.
pub trait CustomAccessEvent: Send + Sync {
    /// Builds the resource; called once per materialization
    fn init(&self, ctx: CustomContext<'_>) -> AccessorResult<CustomState>;

    fn create(&self, state: &mut CustomState, ctx: CustomContext<'_>) -> AccessorResult<()>;

    fn load(&self, state: &mut CustomState, ctx: CustomContext<'_>) -> AccessorResult<()>;

    fn save(&self, state: &mut CustomState, ctx: CustomContext<'_>) -> AccessorResult<()>;

    fn exists(&self, state: &CustomState, ctx: CustomContext<'_>) -> AccessorResult<bool>;

    fn destroy(&self, state: &mut CustomState, ctx: CustomContext<'_>) -> AccessorResult<()>;

    fn copy(&self, _prev: &CustomState, _next: &mut CustomState) -> AccessorResult<()> {
        Err(AccessorError::Unsupported("copy".to_string()))
    }

    fn move_state(&self, prev: &mut CustomState, next: &mut CustomState) -> AccessorResult<()> {
        self.copy(prev, next)
    }

    fn is_compatible(&self, _a: &CustomState, _b: &CustomState) -> bool {
        true
    }
}

/// Accessor driven by a [`CustomAccessEvent`] table
pub struct CustomAccessor {
    id: String,
    args: Vec<Value>,
    path: Option<PathBuf>,
    state: CustomState,
    events: Arc<dyn CustomAccessEvent>,
    dropped: bool,
}

impl CustomAccessor {
    /// Runs the plugin's `init` event and wraps the resulting state
    pub fn init(
        id: impl Into<String>,
        args: Vec<Value>,
        path: Option<PathBuf>,
        events: Arc<dyn CustomAccessEvent>,
    ) -> AccessorResult<Self> {
        let state = events.init(CustomContext {
            path: path.as_deref(),
            args: &args,
        })?;

        Ok(Self {
            id: id.into(),
            args,
            path,
            state,
            events,
            dropped: false,
        })
    }

    /// Registered kind id
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Plugin state, if it has type `T`
    pub fn state<T: Any>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    pub fn state_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.state.downcast_mut::<T>()
    }
}

impl Accessor for CustomAccessor {
    fn kind(&self) -> AccessKind {
        AccessKind::Custom(self.id.clone())
    }

    fn exists(&self) -> AccessorResult<bool> {
        let ctx = CustomContext {
            path: self.path.as_deref(),
            args: &self.args,
        };
        self.events.exists(&self.state, ctx)
    }

    fn create(&mut self) -> AccessorResult<()> {
        let ctx = CustomContext {
            path: self.path.as_deref(),
            args: &self.args,
        };
        self.events.create(&mut self.state, ctx)
    }

    fn load(&mut self) -> AccessorResult<()> {
        let ctx = CustomContext {
            path: self.path.as_deref(),
            args: &self.args,
        };
        self.events.load(&mut self.state, ctx)
    }

    fn save(&mut self) -> AccessorResult<()> {
        if self.dropped {
            return Err(AccessorError::Dropped);
        }
        let ctx = CustomContext {
            path: self.path.as_deref(),
            args: &self.args,
        };
        self.events.save(&mut self.state, ctx)
    }

    fn destroy(&mut self) -> AccessorResult<()> {
        if self.dropped {
            return Ok(());
        }
        let ctx = CustomContext {
            path: self.path.as_deref(),
            args: &self.args,
        };
        self.events.destroy(&mut self.state, ctx)?;
        self.dropped = true;
        Ok(())
    }

    fn is_dropped(&self) -> bool {
        self.dropped
    }

    fn is_compatible(&self, other: &Self) -> bool {
        self.id == other.id && self.events.is_compatible(&self.state, &other.state)
    }

    fn copy_into(&self, target: &mut Self) -> AccessorResult<()> {
        self.events.copy(&self.state, &mut target.state)
    }

    fn move_into(&mut self, target: &mut Self) -> AccessorResult<()> {
        self.events.move_state(&mut self.state, &mut target.state)
    }

    fn into_handle(shared: AccessorRef<Self>) -> AccessorHandle {
        AccessorHandle::Custom(shared)
    }
}
