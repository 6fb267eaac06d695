//! Fixed-size overwrite hash table
//!
//! The table holds exactly [`TABLE_SIZE`] optional integers. A value is stored
//! in slot `value mod TABLE_SIZE`, replacing whatever was there before. There
//! is no chaining and no probing, so a collision simply loses the old value.

use std::fmt;

use rand::Rng;

/// Number of slots in every table
pub const TABLE_SIZE: usize = 30;

/// Hash table with one value per slot and overwrite-on-collision semantics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashTable {
    /// Slot contents, `None` for empty
    slots: [Option<i64>; TABLE_SIZE],
}

impl HashTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            slots: [None; TABLE_SIZE],
        }
    }

    /// Slot a value hashes to.
    ///
    /// Uses the Euclidean remainder so negative values still land in
    /// `0..TABLE_SIZE` and keep `value ≡ slot (mod TABLE_SIZE)`.
    pub fn slot_for(value: i64) -> usize {
        value.rem_euclid(TABLE_SIZE as i64) as usize
    }

    /// Store a value in its slot, overwriting any previous occupant.
    ///
    /// Returns the slot index written.
    pub fn insert(&mut self, value: i64) -> usize {
        let index = Self::slot_for(value);
        self.slots[index] = Some(value);
        index
    }

    /// Insert `count` values drawn uniformly from `0..=max`, in order.
    ///
    /// Later values may overwrite earlier ones. Returns every generated value,
    /// including the ones that were overwritten.
    pub fn random_fill<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize, max: i64) -> Vec<i64> {
        let max = max.max(0);
        (0..count)
            .map(|_| {
                let value = rng.gen_range(0..=max);
                self.insert(value);
                value
            })
            .collect()
    }

    /// Value stored at `index`, if any
    pub fn get(&self, index: usize) -> Option<i64> {
        self.slots.get(index).copied().flatten()
    }

    /// All slots in index order
    pub fn slots(&self) -> &[Option<i64>] {
        &self.slots
    }

    /// Number of slots (always [`TABLE_SIZE`])
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no slot is occupied
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Occupied values sorted ascending.
    ///
    /// Recomputed on every call; the table never caches it.
    pub fn sorted_view(&self) -> Vec<i64> {
        let mut sorted: Vec<i64> = self.slots.iter().flatten().copied().collect();
        sorted.sort_unstable();
        sorted
    }

    /// Lowest slot index holding `value`
    pub fn position_of(&self, value: i64) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(value))
    }
}

impl Default for HashTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Some(value) => write!(f, "{}", value)?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "]")
    }
}
