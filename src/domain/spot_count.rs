use crate::error::{Error, Result};

/// A strictly positive number of spots: an offer's capacity or a
/// reservation's quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpotCount(i32);

impl SpotCount {
    pub fn get(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for SpotCount {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        if value < 1 {
            Err(Error::Validation(format!(
                "Spot count must be at least 1, got {}",
                value
            )))
        } else {
            Ok(Self(value))
        }
    }
}
