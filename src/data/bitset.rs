//! Fixed-length dense bitset over elements, facets or dofs.
//!
//! Bits are packed into `u64` words; bits past `len()` in the last word are
//! always zero. Binary operators require equal lengths and panic otherwise,
//! like slice operations with mismatched lengths would.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

use serde::{Deserialize, Serialize};

use crate::cut_error::CutError;
use crate::debug_invariants::DebugInvariants;

const WORD: usize = 64;

/// Ordered boolean mask with a fixed length.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitSet {
    len: usize,
    words: Vec<u64>,
}

impl BitSet {
    /// All-clear set of `len` bits.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            words: vec![0; len.div_ceil(WORD)],
        }
    }

    /// All-set set of `len` bits.
    pub fn full(len: usize) -> Self {
        let mut out = Self {
            len,
            words: vec![!0; len.div_ceil(WORD)],
        };
        out.clear_padding();
        out
    }

    /// Set of `len` bits with exactly `indices` set.
    pub fn from_indices<I>(len: usize, indices: I) -> Result<Self, CutError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut out = Self::new(len);
        for i in indices {
            out.try_set(i)?;
        }
        Ok(out)
    }

    /// Set of `bools.len()` bits copied from a boolean slice.
    pub fn from_bools(bools: &[bool]) -> Self {
        let mut out = Self::new(bools.len());
        for (i, _) in bools.iter().enumerate().filter(|(_, b)| **b) {
            out.set(i);
        }
        out
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets bit `i`.
    ///
    /// # Panics
    /// Panics if `i >= len()`.
    #[inline]
    pub fn set(&mut self, i: usize) {
        assert!(i < self.len, "bit {i} out of range for BitSet of len {}", self.len);
        self.words[i / WORD] |= 1u64 << (i % WORD);
    }

    /// Sets bit `i`, failing if it is out of range.
    pub fn try_set(&mut self, i: usize) -> Result<(), CutError> {
        if i >= self.len {
            return Err(CutError::IndexOutOfBounds {
                what: "bit",
                index: i,
                len: self.len,
            });
        }
        self.set(i);
        Ok(())
    }

    /// Clears bit `i`.
    #[inline]
    pub fn unset(&mut self, i: usize) {
        assert!(i < self.len, "bit {i} out of range for BitSet of len {}", self.len);
        self.words[i / WORD] &= !(1u64 << (i % WORD));
    }

    /// Writes `value` into bit `i`.
    #[inline]
    pub fn assign(&mut self, i: usize, value: bool) {
        if value { self.set(i) } else { self.unset(i) }
    }

    /// Reads bit `i`; out-of-range bits read as clear.
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.words[i / WORD] >> (i % WORD)) & 1 == 1
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no bit is set.
    pub fn none(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Whether every bit is set.
    pub fn all(&self) -> bool {
        self.count_ones() == self.len
    }

    /// Indices of set bits in increasing order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &w)| {
            let mut bits = w;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let tz = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(wi * WORD + tz)
            })
        })
    }

    /// Whether every set bit of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &BitSet) -> bool {
        self.len == other.len
            && self
                .words
                .iter()
                .zip(&other.words)
                .all(|(a, b)| a & !b == 0)
    }

    /// Clears all bits.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Fails with `SizeMismatch` unless `self.len() == expected`.
    pub fn expect_len(&self, what: &'static str, expected: usize) -> Result<(), CutError> {
        if self.len != expected {
            return Err(CutError::SizeMismatch {
                what,
                expected,
                found: self.len,
            });
        }
        Ok(())
    }

    fn clear_padding(&mut self) {
        let rem = self.len % WORD;
        if rem != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << rem) - 1;
            }
        }
    }

    fn zip_words(&mut self, other: &BitSet, f: impl Fn(u64, u64) -> u64) {
        assert_eq!(self.len, other.len, "BitSet length mismatch");
        for (a, &b) in self.words.iter_mut().zip(&other.words) {
            *a = f(*a, b);
        }
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet({}/{}: ", self.count_ones(), self.len)?;
        f.debug_list().entries(self.iter_ones()).finish()?;
        write!(f, ")")
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl BitAndAssign<&BitSet> for BitSet {
    fn bitand_assign(&mut self, rhs: &BitSet) {
        self.zip_words(rhs, |a, b| a & b);
    }
}

impl BitOrAssign<&BitSet> for BitSet {
    fn bitor_assign(&mut self, rhs: &BitSet) {
        self.zip_words(rhs, |a, b| a | b);
    }
}

impl BitAnd for &BitSet {
    type Output = BitSet;
    fn bitand(self, rhs: &BitSet) -> BitSet {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl BitOr for &BitSet {
    type Output = BitSet;
    fn bitor(self, rhs: &BitSet) -> BitSet {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl BitXor for &BitSet {
    type Output = BitSet;
    fn bitxor(self, rhs: &BitSet) -> BitSet {
        let mut out = self.clone();
        out.zip_words(rhs, |a, b| a ^ b);
        out
    }
}

impl Not for &BitSet {
    type Output = BitSet;
    fn not(self) -> BitSet {
        let mut out = self.clone();
        out.words.iter_mut().for_each(|w| *w = !*w);
        out.clear_padding();
        out
    }
}

impl DebugInvariants for BitSet {
    fn validate_invariants(&self) -> Result<(), CutError> {
        if self.words.len() != self.len.div_ceil(WORD) {
            return Err(CutError::SizeMismatch {
                what: "bitset words",
                expected: self.len.div_ceil(WORD),
                found: self.words.len(),
            });
        }
        let rem = self.len % WORD;
        if rem != 0 {
            if let Some(&last) = self.words.last() {
                if last >> rem != 0 {
                    return Err(CutError::IndexOutOfBounds {
                        what: "bitset padding bit",
                        index: self.len + (last >> rem).trailing_zeros() as usize,
                        len: self.len,
                    });
                }
            }
        }
        Ok(())
    }
}
