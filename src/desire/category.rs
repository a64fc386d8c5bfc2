use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DesireError;

/// Spending area a desire belongs to.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Category {
    Housing,
    Transport,
    Food,
    Entertainment,
    Shopping,
    Health,
    Education,
    Investment,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Housing,
        Category::Transport,
        Category::Food,
        Category::Entertainment,
        Category::Shopping,
        Category::Health,
        Category::Education,
        Category::Investment,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Housing => "Housing",
            Category::Transport => "Transport",
            Category::Food => "Food",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Investment => "Investment",
            Category::Other => "Other",
        }
    }

    fn from_legacy_label(value: &str) -> Option<Self> {
        match value {
            "住房" => Some(Category::Housing),
            "交通" => Some(Category::Transport),
            "餐饮" => Some(Category::Food),
            "娱乐" => Some(Category::Entertainment),
            "购物" => Some(Category::Shopping),
            "健康" => Some(Category::Health),
            "教育" => Some(Category::Education),
            "投资" => Some(Category::Investment),
            "其他" => Some(Category::Other),
            _ => None,
        }
    }

    pub fn is_legacy_label(value: &str) -> bool {
        Self::from_legacy_label(value.trim()).is_some()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = DesireError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Some(legacy) = Self::from_legacy_label(trimmed) {
            return Ok(legacy);
        }
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                DesireError::validation("category", format!("unknown category `{}`", trimmed))
            })
    }
}
