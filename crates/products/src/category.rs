use serde::{Deserialize, Serialize};

use stockkeep_core::validate::{optional_text, required_text};
use stockkeep_core::{CategoryId, DomainResult, Entity};

/// Product category (catalog grouping).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: String,
}

impl Category {
    pub const NAME_MAX: usize = 50;
    pub const DESCRIPTION_MAX: usize = 200;

    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let description = description.into();
        Self::validate(&name, &description)?;
        Ok(Self {
            id,
            name,
            description,
        })
    }

    pub fn rename(&mut self, name: impl Into<String>, description: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        let description = description.into();
        Self::validate(&name, &description)?;
        self.name = name;
        self.description = description;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn validate(name: &str, description: &str) -> DomainResult<()> {
        required_text("category name", name, Self::NAME_MAX)?;
        optional_text("category description", description, Self::DESCRIPTION_MAX)
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_requires_name() {
        assert!(Category::new(CategoryId::new(), "", "x").is_err());
        let c = Category::new(CategoryId::new(), "Fasteners", "").unwrap();
        assert_eq!(c.name(), "Fasteners");
    }

    #[test]
    fn rename_keeps_old_values_on_failure() {
        let mut c = Category::new(CategoryId::new(), "Tools", "hand tools").unwrap();
        assert!(c.rename("x".repeat(51), "").is_err());
        assert_eq!(c.name(), "Tools");
        assert_eq!(c.description(), "hand tools");
    }
}
