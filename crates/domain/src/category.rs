use crate::errors::DomainError;
use crate::value_objects::{CategoryId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: Timestamp,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        created_at: Timestamp,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(name.into())?;
        Ok(Self {
            id,
            name,
            created_at,
        })
    }

    pub fn validate_name(name: String) -> Result<String, DomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_argument(
                "category_name",
                "cannot be empty",
            ));
        }
        if trimmed.chars().count() > 50 {
            return Err(DomainError::invalid_argument("category_name", "too long"));
        }
        Ok(trimmed.to_owned())
    }
}
