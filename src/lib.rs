//! termux-bootstrap
//!
//! Resolves which package manager and package variant a Termux host app was
//! built with, so plugin apps sharing the host's identity can act on the same
//! bootstrap metadata.

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod host;
pub mod types;

// Re-export main types for convenience
pub use bootstrap::{
    BootstrapError, BootstrapState, ResolvedBootstrap, resolve, resolve_pair, verify_taxonomy,
    verify_taxonomy_of,
};
pub use error::{Result, TermuxBootstrapError};
pub use host::{
    BUILD_CONFIG_FIELD_PACKAGE_VARIANT, EnvVariantSource, HostContext, HostError,
    HostVariantSource, fetch_host_variant_name,
};
pub use types::{CanonicalName, ManagerKind, VariantKind, manager_token_of};
