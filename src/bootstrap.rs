//! Bootstrap resolution and resolved state
//!
//! Turns a raw package variant name into a validated
//! ([`VariantKind`], [`ManagerKind`]) pair and keeps the result for the rest
//! of the process.
//!
//! # Entry points
//!
//! - [`BootstrapState::resolve_and_store`]: for callers that own the variant
//!   string. Unknown input is a broken local configuration and fails hard.
//! - [`BootstrapState::resolve_from_host`]: for plugin processes reading the
//!   host app's constants. Every failure is logged and absorbed; the state is
//!   simply left as it was.
//!
//! # State
//!
//! The pair is published as one immutable [`ResolvedBootstrap`] behind a
//! single write lock, so a reader never sees a new variant with a stale
//! manager. Most consumers should own a [`BootstrapState`] and pass it down;
//! [`BootstrapState::global`] exists for code that needs ambient access.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{OnceLock, RwLock};
use thiserror::Error;

use crate::host::{HostVariantSource, fetch_host_variant_name};
use crate::types::{CanonicalName, ManagerKind, VariantKind, manager_token_of};

/// Process-wide resolved state
static GLOBAL_STATE: OnceLock<BootstrapState> = OnceLock::new();

/// Errors raised while resolving a package variant name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    /// The variant name matches no registered variant
    #[error("Unsupported package variant \"{}\"", .variant.as_deref().unwrap_or_default())]
    UnsupportedVariant { variant: Option<String> },

    /// The manager token derived from the variant name matches no registered manager
    #[error(
        "Unsupported package manager \"{}\" with variant \"{variant}\"",
        .manager.as_deref().unwrap_or_default()
    )]
    UnsupportedManager {
        manager: Option<String>,
        variant: String,
    },

    /// Two members of one registry share a canonical name
    #[error("Duplicate canonical name \"{name}\" in {registry} registry")]
    DuplicateName {
        registry: &'static str,
        name: &'static str,
    },
}

impl BootstrapError {
    /// Returns true for the unknown-variant failure
    pub fn is_unsupported_variant(&self) -> bool {
        matches!(self, Self::UnsupportedVariant { .. })
    }

    /// Returns true for the unknown-manager failure
    pub fn is_unsupported_manager(&self) -> bool {
        matches!(self, Self::UnsupportedManager { .. })
    }
}

/// A validated (variant, manager) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedBootstrap {
    /// Active package variant
    pub variant: VariantKind,
    /// Package manager owning `variant`
    pub manager: ManagerKind,
}

impl fmt::Display for ResolvedBootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "manager={}, variant={}", self.manager, self.variant)
    }
}

/// Resolve `variant_name` against the built-in registries.
///
/// Pure: nothing is stored. See [`BootstrapState::resolve_and_store`].
///
/// # Errors
///
/// - `UnsupportedVariant` if the name is absent, empty or unknown
/// - `UnsupportedManager` if the prefix before the first `-` is not a manager
pub fn resolve(variant_name: Option<&str>) -> Result<ResolvedBootstrap, BootstrapError> {
    let (variant, manager) = resolve_pair::<VariantKind, ManagerKind>(variant_name)?;
    Ok(ResolvedBootstrap { variant, manager })
}

/// Resolve `variant_name` against an arbitrary pair of registries.
///
/// The variant is looked up first; the manager is then looked up by the
/// substring of the input before its first `-`.
pub fn resolve_pair<V, M>(variant_name: Option<&str>) -> Result<(V, M), BootstrapError>
where
    V: CanonicalName,
    M: CanonicalName,
{
    let unsupported_variant = || BootstrapError::UnsupportedVariant {
        variant: variant_name.map(str::to_owned),
    };

    let name = variant_name
        .filter(|n| !n.is_empty())
        .ok_or_else(unsupported_variant)?;
    let variant = V::from_name(Some(name)).ok_or_else(unsupported_variant)?;

    let token = manager_token_of(name);
    let manager = M::from_name(token).ok_or_else(|| BootstrapError::UnsupportedManager {
        manager: token.map(str::to_owned),
        variant: name.to_owned(),
    })?;

    Ok((variant, manager))
}

/// Check that the built-in taxonomy is self-consistent.
///
/// Run once at startup; a failure means a variant was registered without its
/// manager.
pub fn verify_taxonomy() -> Result<(), BootstrapError> {
    verify_taxonomy_of::<VariantKind, ManagerKind>()
}

/// Check names are unique in both registries and that every variant name
/// resolves to a registered manager.
pub fn verify_taxonomy_of<V, M>() -> Result<(), BootstrapError>
where
    V: CanonicalName,
    M: CanonicalName,
{
    check_unique::<M>("manager")?;
    check_unique::<V>("variant")?;

    for variant in V::ALL {
        resolve_pair::<V, M>(Some(variant.name()))?;
    }

    tracing::debug!(
        managers = M::ALL.len(),
        variants = V::ALL.len(),
        "Package taxonomy verified"
    );
    Ok(())
}

fn check_unique<K: CanonicalName>(registry: &'static str) -> Result<(), BootstrapError> {
    let mut seen = HashSet::with_capacity(K::ALL.len());
    for kind in K::ALL {
        if !seen.insert(kind.name()) {
            return Err(BootstrapError::DuplicateName {
                registry,
                name: kind.name(),
            });
        }
    }
    Ok(())
}

/// Holder for the resolved bootstrap pair.
///
/// Unset until the first successful resolution. Later successful
/// resolutions overwrite the pair; failed ones leave it untouched.
#[derive(Debug, Default)]
pub struct BootstrapState {
    resolved: RwLock<Option<ResolvedBootstrap>>,
}

impl BootstrapState {
    /// Create an unset state.
    pub const fn new() -> Self {
        Self {
            resolved: RwLock::new(None),
        }
    }

    /// Get the process-wide state, creating it unset on first use.
    pub fn global() -> &'static BootstrapState {
        GLOBAL_STATE.get_or_init(BootstrapState::new)
    }

    /// Snapshot of the resolved pair, if resolution has succeeded.
    pub fn get(&self) -> Option<ResolvedBootstrap> {
        // The guarded value is `Copy` and written in one assignment, so a
        // poisoned lock still holds a whole pair.
        match self.resolved.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Resolved package variant, if any.
    pub fn variant(&self) -> Option<VariantKind> {
        self.get().map(|r| r.variant)
    }

    /// Resolved package manager, if any.
    pub fn manager(&self) -> Option<ManagerKind> {
        self.get().map(|r| r.manager)
    }

    /// Returns true once a resolution has succeeded
    pub fn is_resolved(&self) -> bool {
        self.get().is_some()
    }

    /// Resolve `variant_name` and store the result.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`]. On error the stored pair is unchanged. Callers are
    /// expected to treat an error as fatal.
    pub fn resolve_and_store(
        &self,
        variant_name: Option<&str>,
    ) -> Result<ResolvedBootstrap, BootstrapError> {
        let resolved = resolve(variant_name)?;
        tracing::debug!(variant = %resolved.variant, "Set package variant");
        tracing::debug!(manager = %resolved.manager, "Set package manager");

        self.store(resolved);
        Ok(resolved)
    }

    /// Fetch the variant name from the host app and resolve it.
    ///
    /// Never fails: host errors and unsupported names are logged and `None`
    /// is returned, leaving the stored pair as it was.
    pub fn resolve_from_host(&self, source: &dyn HostVariantSource) -> Option<ResolvedBootstrap> {
        let Some(variant_name) = fetch_host_variant_name(source) else {
            tracing::error!(
                host = %source.describe(),
                "Failed to set package variant and manager from the host app"
            );
            return None;
        };

        match self.resolve_and_store(Some(&variant_name)) {
            Ok(resolved) => Some(resolved),
            Err(e) => {
                tracing::error!(
                    host = %source.describe(),
                    error = %e,
                    "Host app reported an unusable package variant"
                );
                None
            }
        }
    }

    fn store(&self, resolved: ResolvedBootstrap) {
        let mut guard = match self.resolved.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(resolved);
    }
}
