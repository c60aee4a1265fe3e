//! Access controller

use crate::error::AccessError;
use crate::hooks::{AccessHooks, AccessMode, TransferMode};
use access_tree::{AccessSpec, AccessTree, PathError, PathResolver, ResolvedNode};
use core_types::{AccessKind, Identifier};

/// An authorized access, ready to be materialized
#[derive(Debug, Clone, PartialEq)]
pub struct AccessPlan {
    pub target: Identifier,
    /// Spec selected for the requested kind
    pub spec: AccessSpec,
    /// Intermediate directories from the root down, with their synthesized specs
    pub chain: Vec<(Identifier, AccessSpec)>,
}

/// Authorizes requests against the registered tree
#[derive(Debug, Default)]
pub struct StorageAccessControl {
    resolver: PathResolver,
}

impl StorageAccessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the registered tree
    pub fn register(&mut self, tree: AccessTree) -> Result<(), AccessError> {
        tree.validate().map_err(|err| match err {
            PathError::InvalidTree(reason) => AccessError::InvalidTree(reason),
            other => AccessError::InvalidTree(other.to_string()),
        })?;
        self.resolver = PathResolver::new(tree);
        Ok(())
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Kinds available at `identifier`, empty when unregistered
    pub fn access_kinds(&self, identifier: &Identifier) -> Vec<AccessKind> {
        self.resolver.access_kinds(identifier)
    }

    /// Resolves `identifier` and checks that it may be accessed as `kind`
    pub fn authorize(
        &self,
        identifier: &Identifier,
        kind: &AccessKind,
    ) -> Result<AccessPlan, AccessError> {
        let resolution = self
            .resolver
            .resolve(identifier)
            .map_err(|_| AccessError::NotRegistered(identifier.to_string()))?;

        let spec = match resolution.node {
            ResolvedNode::Directory(tree) if kind.is_directory() => {
                AccessSpec::Directory(tree.clone())
            }
            ResolvedNode::Directory(_) => {
                return Err(AccessError::DirectoryAccess(format!(
                    "'{}' is a directory",
                    identifier
                )))
            }
            ResolvedNode::Leaf(_) if kind.is_directory() => {
                return Err(AccessError::DirectoryAccess(format!(
                    "'{}' is not a directory",
                    identifier
                )))
            }
            ResolvedNode::Leaf(spec) => {
                spec.resolve(kind)
                    .cloned()
                    .ok_or_else(|| AccessError::AccessDenied {
                        identifier: identifier.to_string(),
                        kind: kind.clone(),
                    })?
            }
        };

        let chain = resolution
            .directory_chain(identifier)
            .into_iter()
            .map(|(directory, tree)| (directory, AccessSpec::Directory(tree.clone())))
            .collect();

        Ok(AccessPlan {
            target: identifier.clone(),
            spec,
            chain,
        })
    }

    /// Authorizes and materializes `identifier`
    ///
    /// Every intermediate directory is accessed first, in order, and linked to
    /// the previous one; the root is the implicit parent of the first.
    pub fn access<H: AccessHooks>(
        &self,
        hooks: &mut H,
        identifier: &Identifier,
        kind: &AccessKind,
        mode: AccessMode,
    ) -> Result<H::Handle, H::Error> {
        let plan = self.authorize(identifier, kind)?;

        let mut previous = Identifier::root();
        for (directory, spec) in &plan.chain {
            hooks.on_access(directory, spec, AccessMode::Access)?;
            hooks.on_chain_dependency(&previous, directory);
            previous = directory.clone();
        }

        let handle = hooks.on_access(&plan.target, &plan.spec, mode)?;
        if !plan.target.is_root() {
            hooks.on_chain_dependency(&previous, &plan.target);
        }
        Ok(handle)
    }

    /// Copies `from` into `to`, both accessed as `kind`
    pub fn copy_to<H: AccessHooks>(
        &self,
        hooks: &mut H,
        from: &Identifier,
        to: &Identifier,
        kind: &AccessKind,
    ) -> Result<(), H::Error> {
        self.transfer(hooks, from, to, kind, TransferMode::Copy)
    }

    /// Moves `from` into `to`; the target is committed and the source destroyed
    pub fn move_to<H: AccessHooks>(
        &self,
        hooks: &mut H,
        from: &Identifier,
        to: &Identifier,
        kind: &AccessKind,
    ) -> Result<(), H::Error> {
        self.transfer(hooks, from, to, kind, TransferMode::Move)
    }

    fn transfer<H: AccessHooks>(
        &self,
        hooks: &mut H,
        from: &Identifier,
        to: &Identifier,
        kind: &AccessKind,
        mode: TransferMode,
    ) -> Result<(), H::Error> {
        let incompatible = || AccessError::UncompatibleAccessor {
            from: from.to_string(),
            to: to.to_string(),
        };

        let target_kinds = self.access_kinds(to);
        if !target_kinds.is_empty() && !target_kinds.contains(kind) {
            return Err(incompatible().into());
        }

        self.access(hooks, from, kind, AccessMode::Access)?;
        self.access(hooks, to, kind, AccessMode::Access)?;

        if !hooks.is_compatible(from, to) {
            return Err(incompatible().into());
        }

        tracing::debug!(%from, %to, ?mode, "transferring accessor");
        hooks.on_transfer(from, to, mode)
    }

    /// Destroys a leaf
    pub fn destroy<H: AccessHooks>(
        &self,
        hooks: &mut H,
        identifier: &Identifier,
    ) -> Result<(), H::Error> {
        let spec = self.validate_leaf(identifier)?;
        hooks.on_destroy(identifier, &spec)
    }

    /// Destroys a directory and everything below it
    pub fn destroy_dir<H: AccessHooks>(
        &self,
        hooks: &mut H,
        identifier: &Identifier,
    ) -> Result<(), H::Error> {
        let spec = self.validate_directory(identifier)?;
        hooks.on_destroy(identifier, &spec)
    }

    /// Requires `identifier` to be a registered leaf and returns its spec
    pub fn validate_leaf(&self, identifier: &Identifier) -> Result<AccessSpec, AccessError> {
        let resolution = self
            .resolver
            .resolve(identifier)
            .map_err(|_| AccessError::NotRegistered(identifier.to_string()))?;

        match resolution.node {
            ResolvedNode::Leaf(spec) => Ok(spec.clone()),
            ResolvedNode::Directory(_) => Err(AccessError::DirectoryAccess(format!(
                "'{}' is a directory",
                identifier
            ))),
        }
    }

    /// Requires `identifier` to be a registered directory and returns its spec
    pub fn validate_directory(&self, identifier: &Identifier) -> Result<AccessSpec, AccessError> {
        let resolution = self
            .resolver
            .resolve(identifier)
            .map_err(|_| AccessError::NotRegistered(identifier.to_string()))?;

        match resolution.node {
            ResolvedNode::Directory(tree) => Ok(AccessSpec::Directory(tree.clone())),
            ResolvedNode::Leaf(_) => Err(AccessError::NotRegistered(format!(
                "{} is not a directory",
                identifier
            ))),
        }
    }
}
