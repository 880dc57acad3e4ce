use crate::error::Error;

/// Smallest accepted value for [`TableConfig::with_max_load_percent`].
pub const MIN_LOAD_PERCENT: u8 = 10;

/// Largest accepted value for [`TableConfig::with_max_load_percent`]. Anything
/// higher lets long clusters form before the table grows.
pub const MAX_LOAD_PERCENT: u8 = 95;

/// What the table does when inserting a new key would push it past its load
/// limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Growth {
    /// Double the slot array and rehash.
    #[default]
    Elastic,
    /// Never reallocate for growth; the insert fails with
    /// [`Error::CapacityExhausted`].
    Fixed,
}

/// How removals vacate a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Deletion {
    /// Shift the following records of the cluster back by one slot. Keeps
    /// the Robin Hood ordering intact and never leaves tombstones behind.
    #[default]
    BackwardShift,
    /// Mark the slot as a tombstone. Tombstones count against the load limit
    /// and are compacted away by an in-place rehash when they crowd it.
    Tombstone,
}

/// Tuning knobs for a [`HashTable`](crate::hash_table::HashTable).
///
/// # Examples
///
/// ```rust
/// use robin_hash::config::Deletion;
/// use robin_hash::config::TableConfig;
///
/// let config = TableConfig::default()
///     .with_min_capacity(64)
///     .with_max_load_percent(80)
///     .with_deletion(Deletion::Tombstone);
/// assert!(config.validate().is_ok());
///
/// assert!(TableConfig::default().with_max_load_percent(100).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub(crate) min_capacity: usize,
    pub(crate) max_load_percent: u8,
    pub(crate) growth: Growth,
    pub(crate) shrink: bool,
    pub(crate) deletion: Deletion,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            min_capacity: 16,
            max_load_percent: 70,
            growth: Growth::Elastic,
            shrink: false,
            deletion: Deletion::BackwardShift,
        }
    }
}

impl TableConfig {
    /// Sets the smallest slot count the table will ever use. Rounded up to a
    /// power of two; zero is treated as one.
    pub fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Sets the load limit as a percentage of the slot count.
    pub fn with_max_load_percent(mut self, percent: u8) -> Self {
        self.max_load_percent = percent;
        self
    }

    /// Selects the growth policy.
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    /// Enables or disables shrinking after removals.
    pub fn with_shrink(mut self, shrink: bool) -> Self {
        self.shrink = shrink;
        self
    }

    /// Selects the deletion policy.
    pub fn with_deletion(mut self, deletion: Deletion) -> Self {
        self.deletion = deletion;
        self
    }

    /// Returns the minimum slot count, rounded to a power of two.
    pub fn min_capacity(&self) -> usize {
        self.min_capacity.max(1).next_power_of_two()
    }

    /// Returns the load limit percentage.
    pub fn max_load_percent(&self) -> u8 {
        self.max_load_percent
    }

    /// Returns the growth policy.
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Returns whether shrinking is enabled.
    pub fn shrink(&self) -> bool {
        self.shrink
    }

    /// Returns the deletion policy.
    pub fn deletion(&self) -> Deletion {
        self.deletion
    }

    /// Checks that every setting is within its accepted range.
    pub fn validate(self) -> Result<Self, Error> {
        if !(MIN_LOAD_PERCENT..=MAX_LOAD_PERCENT).contains(&self.max_load_percent) {
            return Err(Error::InvalidConfig {
                reason: "max_load_percent must be within 10..=95",
            });
        }
        if self.min_capacity.checked_next_power_of_two().is_none() {
            return Err(Error::InvalidConfig {
                reason: "min_capacity is too large",
            });
        }
        Ok(self)
    }

    /// Number of records a table with `capacity` slots may hold.
    #[inline(always)]
    pub(crate) fn max_load(&self, capacity: usize) -> usize {
        ((capacity as u128 * self.max_load_percent as u128) / 100) as usize
    }

    /// Smallest power-of-two slot count, not below `min_capacity`, whose load
    /// limit admits `len` records.
    pub(crate) fn capacity_for(&self, len: usize) -> Option<usize> {
        let raw = (len as u128 * 100).div_ceil(self.max_load_percent as u128);
        let raw = usize::try_from(raw).ok()?;
        let mut capacity = raw.max(self.min_capacity()).checked_next_power_of_two()?;
        while self.max_load(capacity) < len {
            capacity = capacity.checked_mul(2)?;
        }
        Some(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TableConfig::default();
        assert_eq!(config.min_capacity(), 16);
        assert_eq!(config.max_load_percent(), 70);
        assert_eq!(config.growth(), Growth::Elastic);
        assert_eq!(config.deletion(), Deletion::BackwardShift);
        assert!(!config.shrink());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn max_load_rounds_down() {
        let config = TableConfig::default();
        assert_eq!(config.max_load(16), 11);
        assert_eq!(config.max_load(32), 22);
        assert_eq!(config.max_load(1), 0);
    }

    #[test]
    fn capacity_for_respects_floor_and_limit() {
        let config = TableConfig::default();
        assert_eq!(config.capacity_for(0), Some(16));
        assert_eq!(config.capacity_for(11), Some(16));
        assert_eq!(config.capacity_for(12), Some(32));
        assert_eq!(config.capacity_for(1000), Some(2048));
        assert_eq!(config.capacity_for(usize::MAX), None);

        let small = TableConfig::default().with_min_capacity(0);
        assert_eq!(small.min_capacity(), 1);
        assert_eq!(small.capacity_for(1), Some(2));
    }

    #[test]
    fn rejects_out_of_range_load() {
        for percent in [0, 9, 96, 100, 255] {
            assert_eq!(
                TableConfig::default()
                    .with_max_load_percent(percent)
                    .validate(),
                Err(Error::InvalidConfig {
                    reason: "max_load_percent must be within 10..=95",
                })
            );
        }
        assert!(
            TableConfig::default()
                .with_max_load_percent(95)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn rejects_unrepresentable_min_capacity() {
        assert!(
            TableConfig::default()
                .with_min_capacity(usize::MAX)
                .validate()
                .is_err()
        );
    }
}
