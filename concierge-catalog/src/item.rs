use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::format::PriceFormatter;
use crate::pricing::Pricing;
use crate::resolver::{resolve, PricingInput};
use crate::CatalogError;

/// Item categories. Each one carries its own pricing shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Product,
    Service,
    Vehicle,
    Room,
    Tour,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 5] = [
        ItemCategory::Product,
        ItemCategory::Service,
        ItemCategory::Vehicle,
        ItemCategory::Room,
        ItemCategory::Tour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCategory::Product => "product",
            ItemCategory::Service => "service",
            ItemCategory::Vehicle => "vehicle",
            ItemCategory::Room => "room",
            ItemCategory::Tour => "tour",
        }
    }

    /// Knowledge base category that synced articles are filed under.
    pub fn knowledge_category(&self) -> &'static str {
        match self {
            ItemCategory::Service => "services",
            _ => "products",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemCategory {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownCategory(s.to_string()))
    }
}

/// A sellable or bookable unit owned by one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub company_id: String,
    pub category: ItemCategory,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub pricing: Pricing,
    pub is_featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Item fields as submitted by an operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub company_id: String,
    #[serde(alias = "item_type")]
    pub category: ItemCategory,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub pricing: PricingInput,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl ItemDraft {
    pub fn new(company_id: impl Into<String>, category: ItemCategory, name: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            category,
            name: name.into(),
            slug: None,
            description: None,
            short_description: None,
            pricing: PricingInput::default(),
            is_featured: false,
            is_active: true,
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.company_id.trim().is_empty() {
            return Err(CatalogError::MissingField("company_id"));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::MissingField("name"));
        }
        Ok(())
    }

    /// Submitted slug, sanitized, or one derived from the name.
    fn resolved_slug(&self) -> String {
        let given = self.slug.as_deref().map(sanitize_slug).unwrap_or_default();
        if given.is_empty() {
            slugify(&self.name)
        } else {
            given
        }
    }
}

impl Item {
    pub fn create(draft: ItemDraft) -> Result<Self, CatalogError> {
        draft.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            slug: draft.resolved_slug(),
            pricing: resolve(draft.category, &draft.pricing),
            company_id: draft.company_id,
            category: draft.category,
            name: draft.name,
            description: non_empty(draft.description),
            short_description: non_empty(draft.short_description),
            is_featured: draft.is_featured,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the editable fields. The category is fixed at creation.
    pub fn apply(&mut self, draft: ItemDraft) -> Result<(), CatalogError> {
        draft.validate()?;

        if draft.category != self.category {
            return Err(CatalogError::CategoryChanged {
                from: self.category,
                to: draft.category,
            });
        }

        self.slug = draft.resolved_slug();
        self.pricing = resolve(self.category, &draft.pricing);
        self.company_id = draft.company_id;
        self.name = draft.name;
        self.description = non_empty(draft.description);
        self.short_description = non_empty(draft.short_description);
        self.is_featured = draft.is_featured;
        self.is_active = draft.is_active;
        self.updated_at = Utc::now();

        Ok(())
    }

    pub fn display_price(&self, formatter: &PriceFormatter) -> String {
        formatter.format(&self.pricing)
    }

    /// One-line blurb for listings: the short description, else the start of the description.
    pub fn summary(&self) -> Option<String> {
        self.short_description.clone().or_else(|| {
            self.description
                .as_ref()
                .map(|d| d.chars().take(100).collect())
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Lowercase, whitespace runs to `-`, everything outside `[a-z0-9-]` dropped.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;

    for ch in name.trim().to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            out.push(ch);
        }
    }

    out
}

fn sanitize_slug(slug: &str) -> String {
    slug.to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-')
        .collect()
}

/// Counts shown above the item list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStats {
    pub total: usize,
    pub active: usize,
    pub featured: usize,
}

impl ItemStats {
    pub fn from_items(items: &[Item]) -> Self {
        Self {
            total: items.len(),
            active: items.iter().filter(|i| i.is_active).count(),
            featured: items.iter().filter(|i| i.is_featured).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Sepatu Nike Air Max"), "sepatu-nike-air-max");
        assert_eq!(slugify("  Kamar   Deluxe (2 org) "), "kamar-deluxe-2-org");
        assert_eq!(slugify("Paket Bali 3D2N!"), "paket-bali-3d2n");
    }

    #[test]
    fn test_create_resolves_pricing_and_slug() {
        let mut draft = ItemDraft::new("acme", ItemCategory::Tour, "Paket Bali");
        draft.pricing.price = Some(500000);
        draft.pricing.compare_price = Some(750000);

        let item = Item::create(draft).unwrap();
        assert_eq!(item.slug, "paket-bali");
        assert_eq!(item.pricing, Pricing::PerHead { price: 500000, min_pax: Some(2) });
        assert!(item.is_active);
        assert!(!item.is_featured);
    }

    #[test]
    fn test_given_slug_is_sanitized() {
        let mut draft = ItemDraft::new("acme", ItemCategory::Product, "Kaos");
        draft.slug = Some("Kaos Polos_01".to_string());
        assert_eq!(Item::create(draft).unwrap().slug, "kaospolos01");

        let mut draft = ItemDraft::new("acme", ItemCategory::Product, "Kaos Polos");
        draft.slug = Some("  ".to_string());
        assert_eq!(Item::create(draft).unwrap().slug, "kaos-polos");
    }

    #[test]
    fn test_required_fields() {
        let draft = ItemDraft::new("", ItemCategory::Product, "Kaos");
        assert_eq!(Item::create(draft), Err(CatalogError::MissingField("company_id")));

        let draft = ItemDraft::new("acme", ItemCategory::Product, " ");
        assert_eq!(Item::create(draft), Err(CatalogError::MissingField("name")));
    }

    #[test]
    fn test_category_is_fixed_after_creation() {
        let mut item = Item::create(ItemDraft::new("acme", ItemCategory::Room, "Deluxe")).unwrap();

        let err = item
            .apply(ItemDraft::new("acme", ItemCategory::Vehicle, "Deluxe"))
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::CategoryChanged { from: ItemCategory::Room, to: ItemCategory::Vehicle }
        );

        let mut draft = ItemDraft::new("acme", ItemCategory::Room, "Deluxe Suite");
        draft.pricing.weekday = Some(450000);
        item.apply(draft).unwrap();
        assert_eq!(item.name, "Deluxe Suite");
        assert_eq!(item.pricing, Pricing::DayType { weekday: 450000, weekend: None });
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("vehicle".parse::<ItemCategory>().unwrap(), ItemCategory::Vehicle);
        assert!(matches!(
            "boat".parse::<ItemCategory>(),
            Err(CatalogError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_draft_accepts_item_type_field() {
        let draft: ItemDraft = serde_json::from_value(serde_json::json!({
            "company_id": "acme",
            "item_type": "vehicle",
            "name": "Avanza",
            "pricing": {"daily_rate": 350000}
        }))
        .unwrap();

        assert_eq!(draft.category, ItemCategory::Vehicle);
        assert!(draft.is_active);
        assert_eq!(draft.pricing.daily, Some(350000));
    }

    #[test]
    fn test_stats() {
        let mut a = Item::create(ItemDraft::new("acme", ItemCategory::Product, "A")).unwrap();
        a.is_featured = true;
        let mut b = Item::create(ItemDraft::new("acme", ItemCategory::Product, "B")).unwrap();
        b.is_active = false;

        let stats = ItemStats::from_items(&[a, b]);
        assert_eq!(stats, ItemStats { total: 2, active: 1, featured: 1 });
    }
}
