//! Screen configuration contract.

use std::fmt::Debug;

use rally_core::SemanticVersion;
use serde::{de::DeserializeOwned, Serialize};

/// An immutable value identifying a screen and the parameters needed to
/// reconstruct it.
///
/// Implementors are closed enums with one variant per reachable screen.
/// Equality is structural, so a restored config compares equal to a freshly
/// constructed one.
pub trait ScreenConfig:
    Clone + Eq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Schema version written into persisted history.
    ///
    /// Bump the major version when a variant changes incompatibly.
    const SCHEMA: SemanticVersion;

    /// Tags of every variant in the closed set.
    const TAGS: &'static [&'static str];

    /// Tag of this value's variant. Must be one of [`Self::TAGS`].
    fn tag(&self) -> &'static str;
}
