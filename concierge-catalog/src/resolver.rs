use serde::{Deserialize, Serialize};

use crate::item::ItemCategory;
use crate::pricing::{Amount, Headcount, Pricing, DEFAULT_MIN_PAX};

/// Unit recorded on service price ranges.
pub const SERVICE_RANGE_UNIT: &str = "project";

/// Raw pricing fields as entered on the item form.
///
/// Every field is optional and zero is read as "not entered", so an
/// operator-entered price of 0 cannot be told apart from a blank field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingInput {
    pub price: Option<Amount>,
    pub compare_price: Option<Amount>,
    #[serde(alias = "price_min")]
    pub min: Option<Amount>,
    #[serde(alias = "price_max")]
    pub max: Option<Amount>,
    #[serde(alias = "daily_rate")]
    pub daily: Option<Amount>,
    #[serde(alias = "weekly_rate")]
    pub weekly: Option<Amount>,
    #[serde(alias = "monthly_rate")]
    pub monthly: Option<Amount>,
    pub deposit: Option<Amount>,
    #[serde(alias = "weekday_rate")]
    pub weekday: Option<Amount>,
    #[serde(alias = "weekend_rate")]
    pub weekend: Option<Amount>,
    pub min_pax: Option<Headcount>,
}

fn set(value: Option<Amount>) -> Option<Amount> {
    value.filter(|v| *v != 0)
}

/// Build the pricing shape for a category from raw form fields.
///
/// Never fails: missing required amounts become 0 and fields that do not
/// belong to the category are dropped.
pub fn resolve(category: ItemCategory, input: &PricingInput) -> Pricing {
    match category {
        ItemCategory::Product => Pricing::Simple {
            price: input.price.unwrap_or(0),
            compare_price: set(input.compare_price),
        },
        ItemCategory::Service => match (set(input.min), set(input.max)) {
            (Some(min), Some(max)) => Pricing::Range {
                min,
                max,
                unit: Some(SERVICE_RANGE_UNIT.to_string()),
            },
            _ => Pricing::Simple {
                price: input.price.unwrap_or(0),
                compare_price: None,
            },
        },
        ItemCategory::Vehicle => Pricing::Duration {
            daily: input.daily.unwrap_or(0),
            weekly: set(input.weekly),
            monthly: set(input.monthly),
            deposit: set(input.deposit),
        },
        ItemCategory::Room => Pricing::DayType {
            weekday: input.weekday.unwrap_or(0),
            weekend: set(input.weekend),
        },
        ItemCategory::Tour => Pricing::PerHead {
            price: input.price.unwrap_or(0),
            min_pax: Some(input.min_pax.filter(|n| *n > 0).unwrap_or(DEFAULT_MIN_PAX)),
        },
    }
}

// Prefills the edit form from a stored price.
impl From<&Pricing> for PricingInput {
    fn from(pricing: &Pricing) -> Self {
        let mut input = PricingInput::default();

        match pricing {
            Pricing::Simple { price, compare_price } => {
                input.price = Some(*price);
                input.compare_price = *compare_price;
            }
            Pricing::Range { min, max, .. } => {
                input.min = Some(*min);
                input.max = Some(*max);
            }
            Pricing::Duration { daily, weekly, monthly, deposit } => {
                input.daily = Some(*daily);
                input.weekly = *weekly;
                input.monthly = *monthly;
                input.deposit = *deposit;
            }
            Pricing::DayType { weekday, weekend } => {
                input.weekday = Some(*weekday);
                input.weekend = *weekend;
            }
            Pricing::PerHead { price, min_pax } => {
                input.price = Some(*price);
                input.min_pax = *min_pax;
            }
            Pricing::Other(_) => {}
        }

        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_scenario() {
        let input = PricingInput {
            daily: Some(150000),
            weekly: Some(900000),
            ..Default::default()
        };

        assert_eq!(
            resolve(ItemCategory::Vehicle, &input),
            Pricing::Duration { daily: 150000, weekly: Some(900000), monthly: None, deposit: None }
        );
    }

    #[test]
    fn test_service_range_overrides_fixed_price() {
        let input = PricingInput {
            price: Some(2000000),
            min: Some(1500000),
            max: Some(5000000),
            ..Default::default()
        };

        assert_eq!(
            resolve(ItemCategory::Service, &input),
            Pricing::Range { min: 1500000, max: 5000000, unit: Some("project".to_string()) }
        );

        // Only one bound: the fixed price stands.
        let input = PricingInput { price: Some(2000000), min: Some(1500000), ..Default::default() };
        assert_eq!(
            resolve(ItemCategory::Service, &input),
            Pricing::Simple { price: 2000000, compare_price: None }
        );
    }

    #[test]
    fn test_cross_category_fields_are_dropped() {
        let input = PricingInput {
            price: Some(100),
            compare_price: Some(120),
            daily: Some(5),
            weekday: Some(7),
            min_pax: Some(3),
            ..Default::default()
        };

        assert_eq!(
            resolve(ItemCategory::Product, &input),
            Pricing::Simple { price: 100, compare_price: Some(120) }
        );
        assert_eq!(
            resolve(ItemCategory::Room, &input),
            Pricing::DayType { weekday: 7, weekend: None }
        );
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let empty = PricingInput::default();

        assert_eq!(
            resolve(ItemCategory::Product, &empty),
            Pricing::Simple { price: 0, compare_price: None }
        );
        assert_eq!(
            resolve(ItemCategory::Vehicle, &empty),
            Pricing::Duration { daily: 0, weekly: None, monthly: None, deposit: None }
        );
        assert_eq!(
            resolve(ItemCategory::Tour, &empty),
            Pricing::PerHead { price: 0, min_pax: Some(2) }
        );
    }

    #[test]
    fn test_form_field_aliases() {
        let input: PricingInput = serde_json::from_value(serde_json::json!({
            "daily_rate": 150000,
            "weekly_rate": 900000,
            "price_min": 1,
        }))
        .unwrap();

        assert_eq!(input.daily, Some(150000));
        assert_eq!(input.weekly, Some(900000));
        assert_eq!(input.min, Some(1));
    }

    #[test]
    fn test_prefill_resolves_back_to_stored_price() {
        let stored = Pricing::PerHead { price: 500000, min_pax: Some(4) };
        let input = PricingInput::from(&stored);
        assert_eq!(resolve(ItemCategory::Tour, &input), stored);
    }
}
