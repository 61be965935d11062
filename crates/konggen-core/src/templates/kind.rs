//! Template kinds known to konggen.
//!
//! # Examples
//!
//! ```
//! use konggen_core::templates::TemplateKind;
//! use std::str::FromStr;
//!
//! let template = TemplateKind::from_str("kong").unwrap();
//! assert_eq!(template, TemplateKind::Kong);
//! assert_eq!(template.to_string(), "kong");
//! assert_eq!(TemplateKind::default(), TemplateKind::Kong);
//! ```
//!
//! Template directories are located with [`super::TemplateDir::discover`].

// Internal imports (std, crate)
use std::fmt;
use std::str::FromStr;

/// Supported template kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemplateKind {
    /// Bash script of Kong admin API calls
    #[default]
    Kong,
    /// User supplied template directory
    Custom,
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kong" => Ok(TemplateKind::Kong),
            "custom" => Ok(TemplateKind::Custom),
            _ => Err(format!("Unknown template kind: {}", s)),
        }
    }
}

impl TemplateKind {
    /// Returns the template identifier as a string slice
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kong => "kong",
            Self::Custom => "custom",
        }
    }

    /// Returns an iterator over all available template kinds
    pub fn all() -> impl Iterator<Item = Self> {
        use TemplateKind::*;
        [Kong, Custom].iter().copied()
    }

    /// Whether the binary carries a copy of this template
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Kong)
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("kong".parse::<TemplateKind>().unwrap(), TemplateKind::Kong);
        assert_eq!("KONG".parse::<TemplateKind>().unwrap(), TemplateKind::Kong);
        assert_eq!(
            "custom".parse::<TemplateKind>().unwrap(),
            TemplateKind::Custom
        );
        assert!("rust_axum".parse::<TemplateKind>().is_err());
        assert!("".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn test_all_round_trip_through_display() {
        for kind in TemplateKind::all() {
            assert_eq!(kind.to_string().parse::<TemplateKind>(), Ok(kind));
        }
        assert_eq!(TemplateKind::all().count(), 2);
        assert!(TemplateKind::Kong.is_embedded());
        assert!(!TemplateKind::Custom.is_embedded());
    }
}
