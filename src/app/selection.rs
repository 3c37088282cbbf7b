use std::fmt;

use serde::Serialize;

/// A country display name; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CountryName(String);

impl CountryName {
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(CountryName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Entered(CountryName),
    Cleared,
}

impl Selection {
    pub fn country(&self) -> Option<&CountryName> {
        match self {
            Selection::Selected(name) => Some(name),
            Selection::Unselected => None,
        }
    }

    /// Applies the outcome of a map click. A hit always (re-)enters
    /// `Selected`, including a repeat click on the current country.
    pub fn apply_click(&mut self, hit: Option<CountryName>) -> Transition {
        match hit {
            Some(name) => {
                *self = Selection::Selected(name.clone());
                Transition::Entered(name)
            }
            None => {
                *self = Selection::Unselected;
                Transition::Cleared
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Selection::Unselected;
    }
}
