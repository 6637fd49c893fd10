use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whole currency units. The display currency has no subunit in common use.
pub type Amount = i64;

/// Participant count. Signed because stored rows are not validated.
pub type Headcount = i64;

/// Minimum participants assumed for per-head pricing when none is stored.
pub const DEFAULT_MIN_PAX: Headcount = 2;

/// Item pricing, one shape per item category.
///
/// Persisted as the loose JSON object of the `base_pricing` column. Reading
/// goes through [`From<Value>`], which classifies the object with the same
/// precedence the formatter uses, so hand-edited rows still land in exactly
/// one variant. Anything unrecognizable is kept verbatim in [`Pricing::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Pricing {
    /// Products and fixed-price services
    Simple {
        price: Amount,
        compare_price: Option<Amount>,
    },

    /// Services quoted as a range
    Range {
        min: Amount,
        max: Amount,
        unit: Option<String>,
    },

    /// Vehicle rentals
    Duration {
        daily: Amount,
        weekly: Option<Amount>,
        monthly: Option<Amount>,
        deposit: Option<Amount>,
    },

    /// Rooms
    DayType {
        weekday: Amount,
        weekend: Option<Amount>,
    },

    /// Tours
    PerHead {
        price: Amount,
        min_pax: Option<Headcount>,
    },

    Other(Map<String, Value>),
}

/// Pricing conventions that are reported but never block a save.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingWarning {
    #[error("compare price {compare_price} is below the price {price}")]
    ComparePriceBelowPrice { price: Amount, compare_price: Amount },

    #[error("range minimum {min} is above the maximum {max}")]
    RangeInverted { min: Amount, max: Amount },

    #[error("{0} is not set")]
    MissingAmount(&'static str),

    #[error("minimum participants is {0}")]
    NonPositiveMinPax(Headcount),

    #[error("pricing shape is not recognized")]
    UnrecognizedShape,
}

impl Pricing {
    pub fn kind(&self) -> &'static str {
        match self {
            Pricing::Simple { .. } => "simple",
            Pricing::Range { .. } => "range",
            Pricing::Duration { .. } => "duration",
            Pricing::DayType { .. } => "day_type",
            Pricing::PerHead { .. } => "per_head",
            Pricing::Other(_) => "other",
        }
    }

    /// Weekend rate of a day-type price, falling back to the weekday rate.
    pub fn weekend_rate(&self) -> Option<Amount> {
        match self {
            Pricing::DayType { weekday, weekend } => Some(weekend.unwrap_or(*weekday)),
            _ => None,
        }
    }

    /// Minimum participants of a per-head price, falling back to [`DEFAULT_MIN_PAX`].
    pub fn effective_min_pax(&self) -> Option<Headcount> {
        match self {
            Pricing::PerHead { min_pax, .. } => {
                Some(min_pax.filter(|n| *n > 0).unwrap_or(DEFAULT_MIN_PAX))
            }
            _ => None,
        }
    }

    pub fn warnings(&self) -> Vec<PricingWarning> {
        let mut warnings = Vec::new();

        match self {
            Pricing::Simple { price, compare_price } => {
                if *price == 0 {
                    warnings.push(PricingWarning::MissingAmount("price"));
                }
                if let Some(compare_price) = compare_price {
                    if compare_price < price {
                        warnings.push(PricingWarning::ComparePriceBelowPrice {
                            price: *price,
                            compare_price: *compare_price,
                        });
                    }
                }
            }
            Pricing::Range { min, max, .. } => {
                if min > max {
                    warnings.push(PricingWarning::RangeInverted { min: *min, max: *max });
                }
            }
            Pricing::Duration { daily, .. } => {
                if *daily == 0 {
                    warnings.push(PricingWarning::MissingAmount("daily"));
                }
            }
            Pricing::DayType { weekday, .. } => {
                if *weekday == 0 {
                    warnings.push(PricingWarning::MissingAmount("weekday"));
                }
            }
            Pricing::PerHead { price, min_pax } => {
                if *price == 0 {
                    warnings.push(PricingWarning::MissingAmount("price"));
                }
                if let Some(n) = min_pax.filter(|n| *n <= 0) {
                    warnings.push(PricingWarning::NonPositiveMinPax(n));
                }
            }
            Pricing::Other(_) => warnings.push(PricingWarning::UnrecognizedShape),
        }

        warnings
    }
}

fn amount(obj: &Map<String, Value>, key: &str) -> Option<Amount> {
    match obj.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as Amount)),
        // Hand-edited rows sometimes quote numbers
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as Amount),
        _ => None,
    }
}

// Zero counts as unset for optional fields.
fn truthy_amount(obj: &Map<String, Value>, key: &str) -> Option<Amount> {
    amount(obj, key).filter(|v| *v != 0)
}

impl From<Value> for Pricing {
    fn from(value: Value) -> Self {
        let obj = match value {
            Value::Object(obj) => obj,
            _ => return Pricing::Other(Map::new()),
        };

        if let Some(price) = amount(&obj, "price") {
            let min_pax = truthy_amount(&obj, "min_pax");
            if min_pax.is_some() {
                return Pricing::PerHead { price, min_pax };
            }
            return Pricing::Simple {
                price,
                compare_price: truthy_amount(&obj, "compare_price"),
            };
        }

        if let (Some(min), Some(max)) = (amount(&obj, "min"), amount(&obj, "max")) {
            return Pricing::Range {
                min,
                max,
                unit: obj.get("unit").and_then(Value::as_str).map(String::from),
            };
        }

        if let Some(daily) = amount(&obj, "daily") {
            return Pricing::Duration {
                daily,
                weekly: truthy_amount(&obj, "weekly"),
                monthly: truthy_amount(&obj, "monthly"),
                deposit: truthy_amount(&obj, "deposit"),
            };
        }

        if let Some(weekday) = amount(&obj, "weekday") {
            return Pricing::DayType {
                weekday,
                weekend: truthy_amount(&obj, "weekend"),
            };
        }

        Pricing::Other(obj)
    }
}

impl From<Pricing> for Value {
    fn from(pricing: Pricing) -> Self {
        let mut obj = Map::new();

        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                obj.insert(key.to_string(), value);
            }
        };

        match pricing {
            Pricing::Simple { price, compare_price } => {
                put("price", Some(price.into()));
                put("compare_price", compare_price.map(Value::from));
            }
            Pricing::Range { min, max, unit } => {
                put("min", Some(min.into()));
                put("max", Some(max.into()));
                put("unit", unit.map(Value::from));
            }
            Pricing::Duration { daily, weekly, monthly, deposit } => {
                put("daily", Some(daily.into()));
                put("weekly", weekly.map(Value::from));
                put("monthly", monthly.map(Value::from));
                put("deposit", deposit.map(Value::from));
            }
            Pricing::DayType { weekday, weekend } => {
                put("weekday", Some(weekday.into()));
                put("weekend", weekend.map(Value::from));
            }
            Pricing::PerHead { price, min_pax } => {
                // A zero or missing min_pax would read back as a simple price
                let min_pax = min_pax.filter(|n| *n != 0).unwrap_or(DEFAULT_MIN_PAX);
                put("price", Some(price.into()));
                put("min_pax", Some(min_pax.into()));
            }
            Pricing::Other(map) => return Value::Object(map),
        }

        Value::Object(obj)
    }
}
