use std::collections::HashMap;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

/// vehicle price lookup, consumed once at loan creation
pub trait VehiclePricing {
    fn vehicle_price(&self, vehicle_id: &str) -> Result<Money>;
}

/// fixed in-memory price list for testing
#[derive(Debug, Default)]
pub struct StaticPricing {
    prices: HashMap<String, Money>,
}

impl StaticPricing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, vehicle_id: &str, price: Money) -> Self {
        self.prices.insert(vehicle_id.to_string(), price);
        self
    }
}

impl VehiclePricing for StaticPricing {
    fn vehicle_price(&self, vehicle_id: &str) -> Result<Money> {
        self.prices
            .get(vehicle_id)
            .copied()
            .ok_or_else(|| LedgerError::VehicleNotFound {
                vehicle: vehicle_id.to_string(),
            })
    }
}
