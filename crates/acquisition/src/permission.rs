//! Location permission gating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};

/// A platform permission relevant to positioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Precise (GPS) location
    FineLocation,
    /// Approximate (network) location
    CoarseLocation,
    /// Location while in background
    BackgroundLocation,
}

/// How the platform grants permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionModel {
    /// Permissions are granted at runtime and must be checked
    Runtime,
    /// Install-time permissions; location access is implied
    Legacy,
}

/// Set of granted permissions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant a permission
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Revoke a permission
    pub fn remove(&mut self, permission: Permission) -> bool {
        self.0.remove(&permission)
    }

    /// Whether the permission is held
    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Whether nothing is granted
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// True iff the set holds fine or coarse location.
pub fn is_authorized(granted: &PermissionSet) -> bool {
    granted.contains(Permission::FineLocation) || granted.contains(Permission::CoarseLocation)
}

/// Permission predicate aware of the platform's permission model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionGate {
    model: PermissionModel,
}

impl PermissionGate {
    /// Create a gate for the given model
    pub fn new(model: PermissionModel) -> Self {
        Self { model }
    }

    /// Legacy platforms always authorize; runtime platforms need fine or coarse.
    pub fn is_authorized(&self, granted: &PermissionSet) -> bool {
        match self.model {
            PermissionModel::Legacy => true,
            PermissionModel::Runtime => is_authorized(granted),
        }
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new(PermissionModel::Runtime)
    }
}

/// Supplies the current granted-permission set.
pub trait PermissionStore: Send + Sync {
    /// Currently granted permissions
    fn granted(&self) -> PermissionSet;

    /// Permission model of the platform
    fn model(&self) -> PermissionModel {
        PermissionModel::Runtime
    }

    /// Evaluate the gate against the current state of the store.
    fn is_authorized(&self) -> bool {
        PermissionGate::new(self.model()).is_authorized(&self.granted())
    }
}

/// In-memory permission store whose grants can change at runtime.
#[derive(Debug)]
pub struct StaticPermissionStore {
    model: PermissionModel,
    granted: RwLock<PermissionSet>,
}

impl StaticPermissionStore {
    /// Runtime-model store with the given grants
    pub fn new(granted: PermissionSet) -> Self {
        Self {
            model: PermissionModel::Runtime,
            granted: RwLock::new(granted),
        }
    }

    /// Store holding fine and coarse location
    pub fn granted_all() -> Self {
        Self::new(
            [Permission::FineLocation, Permission::CoarseLocation]
                .into_iter()
                .collect(),
        )
    }

    /// Runtime-model store with nothing granted
    pub fn denied() -> Self {
        Self::new(PermissionSet::new())
    }

    /// Legacy-model store
    pub fn legacy() -> Self {
        Self {
            model: PermissionModel::Legacy,
            granted: RwLock::new(PermissionSet::new()),
        }
    }

    /// Grant a permission
    pub fn grant(&self, permission: Permission) {
        self.granted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(permission);
    }

    /// Revoke a permission
    pub fn revoke(&self, permission: Permission) {
        self.granted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(permission);
    }
}

impl PermissionStore for StaticPermissionStore {
    fn granted(&self) -> PermissionSet {
        self.granted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn model(&self) -> PermissionModel {
        self.model
    }
}
