use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pricing::{Amount, Pricing};

/// Display settings for rendered prices. Defaults follow the id-ID locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    pub thousands_separator: String,
    pub day_label: String,
    pub night_label: String,
    pub pax_label: String,
    pub was_label: String,
    /// Shown when no price can be rendered
    pub placeholder: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "Rp".to_string(),
            thousands_separator: ".".to_string(),
            day_label: "hari".to_string(),
            night_label: "malam".to_string(),
            pax_label: "pax".to_string(),
            was_label: "was".to_string(),
            placeholder: "-".to_string(),
        }
    }
}

/// Renders prices for list and detail views.
#[derive(Debug, Clone, Default)]
pub struct PriceFormatter {
    config: DisplayConfig,
}

impl PriceFormatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Currency amount with grouped thousands and no decimals, e.g. `Rp 150.000`.
    pub fn currency(&self, amount: Amount) -> String {
        let grouped = group_digits(amount, &self.config.thousands_separator);
        if self.config.currency_symbol.is_empty() {
            grouped
        } else {
            format!("{} {}", self.config.currency_symbol, grouped)
        }
    }

    pub fn format(&self, pricing: &Pricing) -> String {
        let cfg = &self.config;

        match pricing {
            Pricing::PerHead { price, min_pax: Some(min_pax) } if *min_pax != 0 => format!(
                "{}/{} (min {})",
                self.currency(*price),
                cfg.pax_label,
                min_pax
            ),
            Pricing::PerHead { price, .. } => self.currency(*price),
            Pricing::Simple { price, compare_price: Some(compare_price) } if *compare_price != 0 => {
                format!(
                    "{} ({} {})",
                    self.currency(*price),
                    cfg.was_label,
                    self.currency(*compare_price)
                )
            }
            Pricing::Simple { price, .. } => self.currency(*price),
            Pricing::Range { min, max, .. } => {
                format!("{} - {}", self.currency(*min), self.currency(*max))
            }
            Pricing::Duration { daily, .. } => format!("{}/{}", self.currency(*daily), cfg.day_label),
            Pricing::DayType { weekday, .. } => {
                format!("{}/{}", self.currency(*weekday), cfg.night_label)
            }
            Pricing::Other(_) => cfg.placeholder.clone(),
        }
    }

    /// Formats a stored `base_pricing` value of any shape.
    pub fn format_json(&self, value: &Value) -> String {
        self.format(&Pricing::from(value.clone()))
    }
}

fn group_digits(amount: Amount, separator: &str) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len() + 1);

    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCategory;
    use crate::resolver::{resolve, PricingInput};
    use serde_json::json;

    #[test]
    fn test_currency_grouping() {
        let f = PriceFormatter::default();
        assert_eq!(f.currency(0), "Rp 0");
        assert_eq!(f.currency(999), "Rp 999");
        assert_eq!(f.currency(1000), "Rp 1.000");
        assert_eq!(f.currency(150000), "Rp 150.000");
        assert_eq!(f.currency(12500000), "Rp 12.500.000");
        assert_eq!(f.currency(-2500), "Rp -2.500");
    }

    #[test]
    fn test_simple_price() {
        let f = PriceFormatter::default();
        let plain = Pricing::Simple { price: 250000, compare_price: None };
        assert_eq!(f.format(&plain), "Rp 250.000");

        let discounted = Pricing::Simple { price: 250000, compare_price: Some(300000) };
        assert_eq!(f.format(&discounted), "Rp 250.000 (was Rp 300.000)");

        let zero_compare = Pricing::Simple { price: 250000, compare_price: Some(0) };
        assert_eq!(f.format(&zero_compare), "Rp 250.000");
    }

    #[test]
    fn test_range_keeps_order() {
        let f = PriceFormatter::default();
        let pricing = Pricing::Range { min: 1500000, max: 5000000, unit: None };
        assert_eq!(f.format(&pricing), "Rp 1.500.000 - Rp 5.000.000");
    }

    #[test]
    fn test_duration_ignores_longer_tiers() {
        let f = PriceFormatter::default();
        let daily_only = Pricing::Duration { daily: 150000, weekly: None, monthly: None, deposit: None };
        let all_tiers = Pricing::Duration {
            daily: 150000,
            weekly: Some(900000),
            monthly: Some(3000000),
            deposit: Some(500000),
        };

        assert_eq!(f.format(&daily_only), "Rp 150.000/hari");
        assert_eq!(f.format(&all_tiers), "Rp 150.000/hari");
    }

    #[test]
    fn test_day_type_formats_weekday_only() {
        let f = PriceFormatter::default();
        let pricing = Pricing::DayType { weekday: 450000, weekend: None };
        let out = f.format(&pricing);

        assert_eq!(out, "Rp 450.000/malam");
        assert!(!out.contains("550"));
    }

    #[test]
    fn test_scenarios() {
        let f = PriceFormatter::default();

        let vehicle = resolve(
            ItemCategory::Vehicle,
            &PricingInput { daily: Some(150000), weekly: Some(900000), ..Default::default() },
        );
        assert_eq!(f.format(&vehicle), "Rp 150.000/hari");

        let tour = resolve(
            ItemCategory::Tour,
            &PricingInput { price: Some(500000), min_pax: Some(4), ..Default::default() },
        );
        assert_eq!(f.format(&tour), "Rp 500.000/pax (min 4)");
    }

    #[test]
    fn test_stored_json_precedence() {
        let f = PriceFormatter::default();

        assert_eq!(
            f.format_json(&json!({"price": 500000, "compare_price": 600000, "min_pax": 4})),
            "Rp 500.000/pax (min 4)"
        );
        assert_eq!(f.format_json(&json!({"price": 500000, "min_pax": 0})), "Rp 500.000");
        assert_eq!(
            f.format_json(&json!({"price": 500000, "min_pax": -1})),
            "Rp 500.000/pax (min -1)"
        );
        assert_eq!(f.format_json(&json!({"min": 1, "max": 2})), "Rp 1 - Rp 2");
        assert_eq!(f.format_json(&json!({"weekday": 1000, "daily": 2000})), "Rp 2.000/hari");
        assert_eq!(f.format_json(&json!({"color": "red"})), "-");
        assert_eq!(f.format_json(&Value::Null), "-");
    }

    #[test]
    fn test_idempotent() {
        let f = PriceFormatter::default();
        let pricing = Pricing::Simple { price: 99000, compare_price: Some(129000) };
        assert_eq!(f.format(&pricing), f.format(&pricing));
    }

    #[test]
    fn test_every_category_formats_from_empty_input() {
        let f = PriceFormatter::default();
        for category in ItemCategory::ALL {
            let out = f.format(&resolve(category, &PricingInput::default()));
            assert!(out.starts_with("Rp 0"), "{} rendered {}", category, out);
        }
    }

    #[test]
    fn test_custom_labels() {
        let f = PriceFormatter::new(DisplayConfig {
            currency_symbol: "IDR".to_string(),
            thousands_separator: ",".to_string(),
            day_label: "day".to_string(),
            ..DisplayConfig::default()
        });
        let pricing = Pricing::Duration { daily: 150000, weekly: None, monthly: None, deposit: None };
        assert_eq!(f.format(&pricing), "IDR 150,000/day");
    }
}
