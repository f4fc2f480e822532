//! Core domain types for wiki item records.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Item rarity as shown in a property block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    #[serde(rename = "Very Rare")]
    VeryRare,
    Legendary,
    #[serde(rename = "Story Item")]
    StoryItem,
}

impl Rarity {
    /// All rarities in ascending order.
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::VeryRare,
        Rarity::Legendary,
        Rarity::StoryItem,
    ];

    /// Display name, as written on the wiki and in output tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::VeryRare => "Very Rare",
            Rarity::Legendary => "Legendary",
            Rarity::StoryItem => "Story Item",
        }
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim();
        Rarity::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown rarity: {wanted}"))
    }
}

// ---------------------------------------------------------------------------
// ItemCategory
// ---------------------------------------------------------------------------

/// Kinds of wearable or wieldable equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipmentKind {
    Clothing,
    Armour,
    Shield,
    Weapon,
    Ring,
    Amulet,
    Cloak,
    Footwear,
    Handwear,
    Instrument,
    Headwear,
    Accessory,
    /// Equipment with no more specific kind.
    General,
}

/// Item category from the `category` column.
///
/// A closed set: unknown labels land in [`ItemCategory::Other`] instead of
/// failing the row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemCategory {
    Equipment(EquipmentKind),
    Consumable,
    CampSupplies,
    Writing,
    Other(String),
}

impl ItemCategory {
    /// Classify a free-form category label.
    pub fn parse(label: &str) -> Self {
        let key: String = label
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        let key = key.strip_suffix('s').unwrap_or(&key);

        let kind = match key {
            "equipment" => EquipmentKind::General,
            "consumable" => return ItemCategory::Consumable,
            "campsupplie" | "campsupply" => return ItemCategory::CampSupplies,
            "writing" | "book" | "scroll" => return ItemCategory::Writing,
            "clothing" => EquipmentKind::Clothing,
            "armour" | "armor" => EquipmentKind::Armour,
            "shield" => EquipmentKind::Shield,
            "weapon" => EquipmentKind::Weapon,
            "ring" => EquipmentKind::Ring,
            "amulet" => EquipmentKind::Amulet,
            "cloak" => EquipmentKind::Cloak,
            "footwear" => EquipmentKind::Footwear,
            "handwear" => EquipmentKind::Handwear,
            "instrument" => EquipmentKind::Instrument,
            "headwear" => EquipmentKind::Headwear,
            "accessory" | "accessorie" => EquipmentKind::Accessory,
            _ => return ItemCategory::Other(label.trim().to_string()),
        };
        ItemCategory::Equipment(kind)
    }

    /// Whether items in this category are worn or wielded.
    pub fn is_equipment(&self) -> bool {
        matches!(self, ItemCategory::Equipment(_))
    }
}

// ---------------------------------------------------------------------------
// ItemRecord
// ---------------------------------------------------------------------------

/// One row of the item table: identity columns plus derived columns.
///
/// Derived columns are empty on input and filled in by the batch
/// orchestrator after extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_id: String,
    pub category: String,
    pub sub_category: String,
    pub name: String,
    /// 1-based index of the variation on the item page.
    pub variation: u32,
    pub url: String,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub price_gp: Option<u32>,
    #[serde(default)]
    pub weight_lb: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ItemRecord {
    /// Build a record with identity columns only.
    pub fn new(
        item_id: impl Into<String>,
        category: impl Into<String>,
        sub_category: impl Into<String>,
        name: impl Into<String>,
        variation: u32,
        url: impl Into<String>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            category: category.into(),
            sub_category: sub_category.into(),
            name: name.into(),
            variation,
            url: url.into(),
            rarity: None,
            price_gp: None,
            weight_lb: None,
            description: None,
        }
    }

    /// Parsed category of this record.
    pub fn category_kind(&self) -> ItemCategory {
        ItemCategory::parse(&self.category)
    }
}

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// A discovered (or curated) item page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}
