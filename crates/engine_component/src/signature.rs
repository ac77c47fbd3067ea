//! Fixed-width component membership bitsets.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::component::ComponentType;

/// Hard ceiling on the number of component kinds, fixed by the width of
/// [`Signature`].
pub const MAX_COMPONENT_TYPES: usize = u64::BITS as usize;

/// A bitset with one bit per registered [`ComponentType`].
///
/// Entities carry a signature describing which components they hold; systems
/// carry a signature describing which components they require.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(u64);

impl Signature {
    /// The empty signature.
    pub const EMPTY: Signature = Signature(0);

    /// Build a signature from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Bit of `ty`; zero for indices past the signature width.
    const fn mask(ty: ComponentType) -> u64 {
        match 1u64.checked_shl(ty.index() as u32) {
            Some(mask) => mask,
            None => 0,
        }
    }

    /// Set or clear the bit of `ty`. Indices past the signature width are
    /// ignored.
    pub fn set(&mut self, ty: ComponentType, value: bool) {
        let mask = Self::mask(ty);
        if value {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    /// Builder form of [`Signature::set`] with `value = true`.
    #[must_use]
    pub fn with(mut self, ty: ComponentType) -> Self {
        self.set(ty, true);
        self
    }

    /// Returns `true` if the bit of `ty` is set.
    #[must_use]
    pub const fn test(self, ty: ComponentType) -> bool {
        self.0 & Self::mask(ty) != 0
    }

    /// Clear every bit.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    #[must_use]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` when every bit of `required` is also set here, i.e.
    /// `(self & required) == required`.
    #[must_use]
    pub const fn contains(self, required: Signature) -> bool {
        self.0 & required.0 == required.0
    }
}

impl BitAnd for Signature {
    type Output = Signature;

    fn bitand(self, rhs: Self) -> Self::Output {
        Signature(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Signature;

    fn bitor(self, rhs: Self) -> Self::Output {
        Signature(self.0 | rhs.0)
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        iter.into_iter().fold(Signature::EMPTY, Signature::with)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}", self.0)
    }
}
