//! Payee model
//!
//! Payees are the counterparties of transactions. A generic payee stands for
//! a kind of counterparty ("Power Company") rather than a specific one.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::PayeeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayeeType {
    Generic,
    #[default]
    Actual,
}

impl PayeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "Generic",
            Self::Actual => "Actual",
        }
    }
}

impl fmt::Display for PayeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayeeType {
    type Err = PayeeValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "actual" => Ok(Self::Actual),
            other => Err(PayeeValidationError::InvalidType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub id: PayeeId,
    pub name: String,
    #[serde(rename = "type")]
    pub payee_type: PayeeType,
    pub created_at: DateTime<Utc>,
}

impl Payee {
    pub fn new(name: impl Into<String>, payee_type: PayeeType) -> Self {
        Self {
            id: PayeeId::new(),
            name: name.into().trim().to_string(),
            payee_type,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), PayeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(PayeeValidationError::EmptyName);
        }
        if self.name.chars().count() > 255 {
            return Err(PayeeValidationError::NameTooLong(self.name.chars().count()));
        }
        Ok(())
    }
}

impl fmt::Display for Payee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A payee together with how often and how recently it was used
#[derive(Debug, Clone, Serialize)]
pub struct PayeeUsage {
    #[serde(flatten)]
    pub payee: Payee,
    pub transaction_count: i64,
    pub last_used: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayeeValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidType(String),
}

impl fmt::Display for PayeeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Payee name is required"),
            Self::NameTooLong(len) => write!(f, "Payee name too long ({} chars, max 255)", len),
            Self::InvalidType(t) => {
                write!(f, "Payee type must be 'Generic' or 'Actual' (got '{}')", t)
            }
        }
    }
}

impl std::error::Error for PayeeValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_type_is_actual() {
        assert_eq!(PayeeType::default(), PayeeType::Actual);
    }

    #[test]
    fn test_type_parsing_is_case_insensitive() {
        assert_eq!("generic".parse::<PayeeType>().unwrap(), PayeeType::Generic);
        assert_eq!("ACTUAL".parse::<PayeeType>().unwrap(), PayeeType::Actual);
        assert!("store".parse::<PayeeType>().is_err());
    }

    #[test]
    fn test_validation() {
        let mut payee = Payee::new(" Netflix ", PayeeType::Actual);
        assert_eq!(payee.name, "Netflix");
        assert!(payee.validate().is_ok());

        payee.name = String::new();
        assert_eq!(payee.validate(), Err(PayeeValidationError::EmptyName));
    }

    #[test]
    fn test_usage_serializes_flat() {
        let usage = PayeeUsage {
            payee: Payee::new("Landlord", PayeeType::Generic),
            transaction_count: 4,
            last_used: NaiveDate::from_ymd_opt(2024, 6, 1),
        };
        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json["name"], "Landlord");
        assert_eq!(json["type"], "Generic");
        assert_eq!(json["transaction_count"], 4);
        assert_eq!(json["last_used"], "2024-06-01");
    }
}
