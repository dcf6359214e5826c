//! Fixed set of expense categories.

use std::fmt;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Food,
    Housing,
    Transport,
    Clothing,
    Health,
    Entertainment,
    Communication,
    Education,
    Gifts,
    Other,
}

impl Category {
    /// Every category, in the order pickers show them.
    pub const ALL: [Category; 10] = [
        Self::Food,
        Self::Housing,
        Self::Transport,
        Self::Clothing,
        Self::Health,
        Self::Entertainment,
        Self::Communication,
        Self::Education,
        Self::Gifts,
        Self::Other,
    ];

    /// Storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Housing => "housing",
            Self::Transport => "transport",
            Self::Clothing => "clothing",
            Self::Health => "health",
            Self::Entertainment => "entertainment",
            Self::Communication => "communication",
            Self::Education => "education",
            Self::Gifts => "gifts",
            Self::Other => "other",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Housing => "Housing",
            Self::Transport => "Transport",
            Self::Clothing => "Clothing",
            Self::Health => "Health",
            Self::Entertainment => "Entertainment",
            Self::Communication => "Communication",
            Self::Education => "Education",
            Self::Gifts => "Gifts",
            Self::Other => "Other",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Food => "🍔",
            Self::Housing => "🏠",
            Self::Transport => "🚗",
            Self::Clothing => "👕",
            Self::Health => "💊",
            Self::Entertainment => "🎮",
            Self::Communication => "📱",
            Self::Education => "📚",
            Self::Gifts => "🎁",
            Self::Other => "💡",
        }
    }

    /// Button label, e.g. `🍔 Food`.
    pub fn label(self) -> String {
        format!("{} {}", self.emoji(), self.name())
    }

    /// Matches free text against a button label or a category name.
    ///
    /// Exact match only (case-insensitive, surrounding whitespace ignored).
    pub fn from_label(text: &str) -> Option<Category> {
        let text = text.trim();
        Self::ALL.into_iter().find(|category| {
            text.eq_ignore_ascii_case(category.name())
                || text.eq_ignore_ascii_case(&category.label())
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<&str> for Category {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| EngineError::InvalidCategory(format!("unknown category: {value}")))
    }
}
