//! Orchestrator seam

use access_tree::AccessSpec;
use core_types::Identifier;

use crate::error::AccessError;

/// How the target of an access treats an existing resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Load if it exists, create otherwise
    #[default]
    Access,
    /// Fail if it already exists
    Create,
    /// Fail if it does not exist
    Open,
}

/// Copy keeps the source; move destroys it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Copy,
    Move,
}

/// Callbacks the access controller invokes on the orchestrator
///
/// Hooks are only called after the request was authorized.
pub trait AccessHooks {
    /// Handle produced by a materialization
    type Handle;
    type Error: From<AccessError>;

    /// Materializes the accessor at `identifier`, or returns the live one
    fn on_access(
        &mut self,
        identifier: &Identifier,
        spec: &AccessSpec,
        mode: AccessMode,
    ) -> Result<Self::Handle, Self::Error>;

    /// Records that `child` was reached through `parent`
    fn on_chain_dependency(&mut self, parent: &Identifier, child: &Identifier);

    /// Whether the live accessors at `from` and `to` are compatible
    fn is_compatible(&self, from: &Identifier, to: &Identifier) -> bool;

    /// Transfers content between two live, compatible accessors
    fn on_transfer(
        &mut self,
        from: &Identifier,
        to: &Identifier,
        mode: TransferMode,
    ) -> Result<(), Self::Error>;

    /// Destroys `identifier` and everything depending on it
    ///
    /// `spec` is the registered leaf spec, or a synthesized directory spec.
    fn on_destroy(&mut self, identifier: &Identifier, spec: &AccessSpec) -> Result<(), Self::Error>;
}
