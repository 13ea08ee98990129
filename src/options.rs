use crate::Error;

/// Smallest number of slots a table is ever allocated with.
const MIN_CAPACITY: usize = 2;

/// Construction options for [`HashMap`](crate::HashMap) and
/// [`HashTable`](crate::HashTable).
///
/// # Examples
///
/// ```rust
/// use rhh::Options;
///
/// let options = Options::default().with_capacity(1000).with_load_factor(80);
/// assert_eq!(options.slots(), Ok(1024));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Options {
    /// Requested number of slots. Rounded up to the next power of two.
    pub capacity: usize,
    /// Percentage of slots that may be occupied before the table doubles.
    pub load_factor: u8,
}

impl Options {
    /// The default options: 256 slots at a 90% load factor.
    pub const DEFAULT: Options = Options {
        capacity: 256,
        load_factor: 90,
    };

    /// Returns these options with the requested slot count replaced.
    pub const fn with_capacity(self, capacity: usize) -> Self {
        Options { capacity, ..self }
    }

    /// Returns these options with the load factor replaced.
    pub const fn with_load_factor(self, load_factor: u8) -> Self {
        Options {
            load_factor,
            ..self
        }
    }

    /// Checks the options, returning the slot count a table built from them
    /// would allocate.
    ///
    /// ```rust
    /// use rhh::{Error, Options};
    ///
    /// assert_eq!(Options::DEFAULT.with_capacity(3).slots(), Ok(4));
    /// assert_eq!(Options::DEFAULT.with_capacity(0).slots(), Ok(2));
    /// assert_eq!(
    ///     Options::DEFAULT.with_load_factor(100).slots(),
    ///     Err(Error::LoadFactor(100))
    /// );
    /// ```
    pub fn slots(&self) -> Result<usize, Error> {
        if self.load_factor == 0 || self.load_factor >= 100 {
            return Err(Error::LoadFactor(self.load_factor));
        }
        pow2(self.capacity)
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Number of elements a table of `capacity` slots may hold before it must
/// grow.
#[inline(always)]
pub(crate) fn threshold(capacity: usize, load_factor: u8) -> usize {
    ((capacity as u128 * load_factor as u128) / 100) as usize
}

/// Rounds `value` up to a power of two no smaller than [`MIN_CAPACITY`].
pub(crate) fn pow2(value: usize) -> Result<usize, Error> {
    value
        .max(MIN_CAPACITY)
        .checked_next_power_of_two()
        .ok_or(Error::CapacityOverflow(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options, Options::DEFAULT);
        assert_eq!(options.capacity, 256);
        assert_eq!(options.load_factor, 90);
        assert_eq!(options.slots(), Ok(256));
        assert_eq!(threshold(256, options.load_factor), 230);
    }

    #[test]
    fn capacity_rounds_to_power_of_two() {
        assert_eq!(pow2(0), Ok(2));
        assert_eq!(pow2(1), Ok(2));
        assert_eq!(pow2(2), Ok(2));
        assert_eq!(pow2(3), Ok(4));
        assert_eq!(pow2(4), Ok(4));
        assert_eq!(pow2(1000), Ok(1024));
        assert_eq!(pow2(1 << 40), Ok(1 << 40));
    }

    #[test]
    fn capacity_overflow_is_rejected() {
        let too_big = (usize::MAX >> 1) + 2;
        assert_eq!(pow2(too_big), Err(Error::CapacityOverflow(too_big)));
        assert_eq!(
            Options::DEFAULT.with_capacity(usize::MAX).slots(),
            Err(Error::CapacityOverflow(usize::MAX))
        );
    }

    #[test]
    fn load_factor_bounds() {
        for load_factor in [0u8, 100, 101, 255] {
            assert_eq!(
                Options::DEFAULT.with_load_factor(load_factor).slots(),
                Err(Error::LoadFactor(load_factor))
            );
        }
        for load_factor in [1u8, 50, 99] {
            assert!(Options::DEFAULT.with_load_factor(load_factor).slots().is_ok());
        }
    }

    #[test]
    fn threshold_stays_below_capacity() {
        for shift in 1..20 {
            let capacity = 1usize << shift;
            assert!(threshold(capacity, 99) < capacity);
        }
        assert_eq!(threshold(4, 75), 3);
        assert_eq!(threshold(2, 10), 0);
        assert!(threshold(usize::MAX, 99) < usize::MAX);
    }
}
