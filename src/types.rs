//! Package manager and package variant taxonomy
//!
//! Both registries are closed enums with an immutable canonical name per
//! member. A variant name embeds its owning manager's name as a prefix:
//!
//! ```text
//! <manager>-<suffix...>
//!    nix   - android-8
//! ```
//!
//! The prefix is everything before the first `-`. Lookups are exact,
//! case-sensitive matches against the canonical names; empty or absent input
//! never matches.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Delimiter between the manager token and the rest of a variant name.
pub const VARIANT_DELIMITER: char = '-';

/// A closed set of kinds that are identified by a canonical name.
///
/// Implemented by [`ManagerKind`] and [`VariantKind`] so the resolver can be
/// written once over any pair of registries.
pub trait CanonicalName: Copy + Sized + 'static {
    /// Every member of the registry.
    const ALL: &'static [Self];

    /// The canonical name token of this member.
    fn name(self) -> &'static str;

    /// Look up a member by its canonical name.
    ///
    /// Returns `None` for absent or empty input, or when nothing matches.
    fn from_name(name: Option<&str>) -> Option<Self> {
        let name = name.filter(|n| !n.is_empty())?;
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

/// Package manager used to build the host app's bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
pub enum ManagerKind {
    /// Nix, a purely functional package manager.
    /// <https://wiki.nixos.org/wiki/Nix>
    #[strum(serialize = "nix")]
    #[serde(rename = "nix")]
    Nix,
}

impl ManagerKind {
    /// Canonical name token, e.g. `"nix"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nix => "nix",
        }
    }

    /// Look up a manager by canonical name.
    pub fn from_name(name: Option<&str>) -> Option<Self> {
        <Self as CanonicalName>::from_name(name)
    }

    /// All variants owned by this manager.
    pub fn variants(self) -> impl Iterator<Item = VariantKind> {
        VariantKind::ALL
            .iter()
            .copied()
            .filter(move |variant| variant.manager() == Some(self))
    }
}

impl CanonicalName for ManagerKind {
    const ALL: &'static [Self] = &[Self::Nix];

    fn name(self) -> &'static str {
        ManagerKind::name(self)
    }
}

/// Build variant of the host app's bootstrap.
///
/// The part of the name before the first `-` must be the name of a
/// [`ManagerKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
pub enum VariantKind {
    /// [`ManagerKind::Nix`] variant for Android 8+.
    #[strum(serialize = "nix-android-8")]
    #[serde(rename = "nix-android-8")]
    NixAndroid8,
}

impl VariantKind {
    /// Canonical name token, e.g. `"nix-android-8"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NixAndroid8 => "nix-android-8",
        }
    }

    /// Look up a variant by canonical name.
    pub fn from_name(name: Option<&str>) -> Option<Self> {
        <Self as CanonicalName>::from_name(name)
    }

    /// The manager token embedded in this variant's name.
    pub fn manager_token(self) -> Option<&'static str> {
        manager_token_of(self.name())
    }

    /// The manager this variant belongs to, derived from the name prefix.
    ///
    /// `None` means the taxonomy is inconsistent; see
    /// [`crate::bootstrap::verify_taxonomy`].
    pub fn manager(self) -> Option<ManagerKind> {
        ManagerKind::from_name(self.manager_token())
    }
}

impl CanonicalName for VariantKind {
    const ALL: &'static [Self] = &[Self::NixAndroid8];

    fn name(self) -> &'static str {
        VariantKind::name(self)
    }
}

/// Substring of `variant_name` before the first `-`.
///
/// Returns `None` when the name contains no delimiter.
pub fn manager_token_of(variant_name: &str) -> Option<&str> {
    variant_name
        .split_once(VARIANT_DELIMITER)
        .map(|(token, _)| token)
}
