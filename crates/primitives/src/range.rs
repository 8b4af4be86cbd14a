use crate::EpochNumber;


// Epoch numbers and page bounds travel downstream as signed 64-bit
// statement parameters, so the accepted domain stops at i64::MAX.
const MAX_BOUND: u64 = i64::MAX as u64;


/// A contiguous run of epochs - `[start_epoch, start_epoch + epoch_count - 1]`,
/// both ends inclusive.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpochRange {
    pub start_epoch: EpochNumber,
    pub epoch_count: u64
}


impl EpochRange {
    pub fn new(start_epoch: EpochNumber, epoch_count: u64) -> Result<Self, &'static str> {
        if epoch_count == 0 {
            return Err("epoch range must span at least one epoch")
        }
        start_epoch.checked_add(epoch_count - 1)
            .filter(|end| *end <= MAX_BOUND)
            .ok_or("epoch range end is out of bounds")?;
        Ok(Self {
            start_epoch,
            epoch_count
        })
    }

    pub fn end_epoch(&self) -> EpochNumber {
        self.start_epoch + self.epoch_count - 1
    }
}


/// Offset + size bounds for an ordered list query.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pagination {
    pub offset: u64,
    pub size: u64
}


impl Pagination {
    pub fn new(offset: u64, size: u64) -> Result<Self, &'static str> {
        if size == 0 {
            return Err("page size must be positive")
        }
        if offset > MAX_BOUND || size > MAX_BOUND {
            return Err("page bounds are out of range")
        }
        Ok(Self {
            offset,
            size
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn test_end_epoch_derivation() {
        let range = EpochRange::new(100, 5).unwrap();
        assert_eq!(range.end_epoch(), 104);

        let single = EpochRange::new(7, 1).unwrap();
        assert_eq!(single.end_epoch(), 7);
    }

    #[test]
    fn test_empty_range_is_rejected() {
        assert!(EpochRange::new(100, 0).is_err());
        assert!(Pagination::new(0, 0).is_err());
    }

    #[test]
    fn test_out_of_bounds_range_is_rejected() {
        assert!(EpochRange::new(u64::MAX, 2).is_err());
        assert!(EpochRange::new(u64::MAX, 1).is_err());
        assert!(EpochRange::new(i64::MAX as u64, 2).is_err());
        assert!(EpochRange::new(i64::MAX as u64, 1).is_ok());
        assert!(Pagination::new(u64::MAX, 10).is_err());
        assert!(Pagination::new(0, u64::MAX).is_err());
    }
}
