use rust_decimal::Decimal;

use crate::error::{Error, Result};

lazy_static::lazy_static! {
    // Largest amount a numeric(10,2) column holds
    static ref MAX_PRICE: Decimal = Decimal::new(99_999_999_99, 2);
}

/// Non-negative unit price, kept to the cent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price(Decimal);

impl Price {
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(Error::Validation("Price cannot be negative".into()));
        }
        if value > *MAX_PRICE {
            return Err(Error::Validation(format!(
                "Price cannot be more than {}",
                *MAX_PRICE
            )));
        }
        if value.normalize().scale() > 2 {
            return Err(Error::Validation(
                "Price cannot have more than two decimal places".into(),
            ));
        }
        Ok(Self(value.normalize()))
    }
}
