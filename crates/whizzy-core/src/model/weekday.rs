use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The seven canonical weekday names groups schedule against.
///
/// Stored documents carry the Spanish name verbatim (`"Miércoles"`), so
/// parsing is exact and accent-sensitive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Weekday {
    #[default]
    #[serde(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl Weekday {
    /// All days in selector order, index 0 first.
    pub const ALL: [Self; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "Lunes",
            Self::Tuesday => "Martes",
            Self::Wednesday => "Miércoles",
            Self::Thursday => "Jueves",
            Self::Friday => "Viernes",
            Self::Saturday => "Sábado",
            Self::Sunday => "Domingo",
        }
    }

    /// Two-letter label used by the weekly day strip.
    #[must_use]
    pub const fn short(self) -> &'static str {
        match self {
            Self::Monday => "Lu",
            Self::Tuesday => "Ma",
            Self::Wednesday => "Mi",
            Self::Thursday => "Ju",
            Self::Friday => "Vi",
            Self::Saturday => "Sá",
            Self::Sunday => "Do",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the canonical weekday names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWeekdayError {
    pub got: String,
}

impl fmt::Display for ParseWeekdayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid weekday: '{}'", self.got)
    }
}

impl std::error::Error for ParseWeekdayError {}

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == trimmed)
            .ok_or_else(|| ParseWeekdayError { got: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::Weekday;
    use std::str::FromStr;

    #[test]
    fn parse_is_accent_sensitive() {
        assert_eq!(Weekday::from_str("Miércoles").unwrap(), Weekday::Wednesday);
        assert_eq!(Weekday::from_str(" Sábado ").unwrap(), Weekday::Saturday);
        assert!(Weekday::from_str("Miercoles").is_err());
        assert!(Weekday::from_str("lunes").is_err());
    }

    #[test]
    fn serde_uses_stored_names() {
        assert_eq!(
            serde_json::to_string(&Weekday::Friday).unwrap(),
            "\"Viernes\""
        );
        assert_eq!(
            serde_json::from_str::<Weekday>("\"Domingo\"").unwrap(),
            Weekday::Sunday
        );
    }

    #[test]
    fn short_labels_are_two_chars() {
        for day in Weekday::ALL {
            assert_eq!(day.short().chars().count(), 2);
        }
    }
}
