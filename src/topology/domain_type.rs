//! Domain types of mesh entities relative to the zero level of a level set.
//!
//! [`DomainType`] is the classification of a single element or facet.
//! [`CombinedDomainType`] is a closed enumeration over all eight subsets of
//! `{NEG, POS, IF}`, used to query sets of entities ("all elements that have a
//! negative part" is [`CombinedDomainType::HasNeg`]).

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

/// Classification of a single mesh entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum DomainType {
    /// Entirely in `{phi <= 0}`.
    Neg = 0b001,
    /// Entirely in `{phi >= 0}`.
    Pos = 0b010,
    /// Cut by the interface.
    If = 0b100,
}

impl DomainType {
    /// All base types in bit order.
    pub const ALL: [DomainType; 3] = [DomainType::Neg, DomainType::Pos, DomainType::If];

    /// The single bit of this type in a [`CombinedDomainType`] mask.
    #[inline]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// The opposite side; `If` is its own opposite.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            DomainType::Neg => DomainType::Pos,
            DomainType::Pos => DomainType::Neg,
            DomainType::If => DomainType::If,
        }
    }

    /// Whether this is one of the two bulk sides.
    #[inline]
    pub const fn is_side(self) -> bool {
        !matches!(self, DomainType::If)
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DomainType::Neg => "NEG",
            DomainType::Pos => "POS",
            DomainType::If => "IF",
        };
        f.write_str(s)
    }
}

/// A subset of `{NEG, POS, IF}` as a named variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CombinedDomainType {
    No = 0b000,
    Neg = 0b001,
    Pos = 0b010,
    Uncut = 0b011,
    If = 0b100,
    HasNeg = 0b101,
    HasPos = 0b110,
    Any = 0b111,
}

impl CombinedDomainType {
    /// All eight combinations in mask order.
    pub const ALL: [CombinedDomainType; 8] = [
        CombinedDomainType::No,
        CombinedDomainType::Neg,
        CombinedDomainType::Pos,
        CombinedDomainType::Uncut,
        CombinedDomainType::If,
        CombinedDomainType::HasNeg,
        CombinedDomainType::HasPos,
        CombinedDomainType::Any,
    ];

    /// Three-bit mask of this combination.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Builds a combination from the low three bits of `bits`; higher bits are ignored.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => CombinedDomainType::No,
            0b001 => CombinedDomainType::Neg,
            0b010 => CombinedDomainType::Pos,
            0b011 => CombinedDomainType::Uncut,
            0b100 => CombinedDomainType::If,
            0b101 => CombinedDomainType::HasNeg,
            0b110 => CombinedDomainType::HasPos,
            _ => CombinedDomainType::Any,
        }
    }

    /// Whether an entity of type `dt` matches this combination.
    #[inline]
    pub const fn contains(self, dt: DomainType) -> bool {
        self.bits() & dt.bit() != 0
    }

    /// Bitmask subset test.
    #[inline]
    pub const fn is_subset_of(self, other: CombinedDomainType) -> bool {
        self.bits() & !other.bits() == 0
    }

    /// The base types contained in this combination.
    pub fn types(self) -> impl Iterator<Item = DomainType> {
        DomainType::ALL
            .into_iter()
            .filter(move |&dt| self.contains(dt))
    }

    /// The combination containing the given side and the interface, i.e.
    /// `HasNeg` for `Neg` and `HasPos` for `Pos`. `If` maps to `If`.
    pub const fn has(dt: DomainType) -> Self {
        Self::from_bits(dt.bit() | DomainType::If.bit())
    }
}

impl From<DomainType> for CombinedDomainType {
    fn from(dt: DomainType) -> Self {
        CombinedDomainType::from_bits(dt.bit())
    }
}

impl BitOr for CombinedDomainType {
    type Output = CombinedDomainType;
    fn bitor(self, rhs: Self) -> Self::Output {
        CombinedDomainType::from_bits(self.bits() | rhs.bits())
    }
}

impl BitOr<DomainType> for CombinedDomainType {
    type Output = CombinedDomainType;
    fn bitor(self, rhs: DomainType) -> Self::Output {
        CombinedDomainType::from_bits(self.bits() | rhs.bit())
    }
}

impl BitOr for DomainType {
    type Output = CombinedDomainType;
    fn bitor(self, rhs: Self) -> Self::Output {
        CombinedDomainType::from_bits(self.bit() | rhs.bit())
    }
}

impl BitAnd for CombinedDomainType {
    type Output = CombinedDomainType;
    fn bitand(self, rhs: Self) -> Self::Output {
        CombinedDomainType::from_bits(self.bits() & rhs.bits())
    }
}

impl Not for CombinedDomainType {
    type Output = CombinedDomainType;
    fn not(self) -> Self::Output {
        CombinedDomainType::from_bits(!self.bits())
    }
}
