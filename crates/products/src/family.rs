use serde::{Deserialize, Serialize};

use contaerp_core::{DomainResult, Record, Validator};

/// Article family (`familia`), optionally nested under a parent family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub codfamilia: String,
    pub descripcion: String,
    pub madre: Option<String>,
}

impl Family {
    pub fn new(codfamilia: impl Into<String>, descripcion: impl Into<String>) -> Self {
        Self {
            codfamilia: codfamilia.into(),
            descripcion: descripcion.into(),
            madre: None,
        }
    }
}

impl Record for Family {
    type Key = String;

    fn key(&self) -> String {
        self.codfamilia.clone()
    }

    fn validate(&self) -> DomainResult<()> {
        let mut v = Validator::new();
        v.code("codfamilia", &self.codfamilia, 8)
            .text("descripcion", &self.descripcion, 1, 100)
            .optional_code("madre", self.madre.as_deref(), 8)
            .check(
                self.madre.as_deref() != Some(self.codfamilia.as_str()),
                "a family cannot be its own parent",
            );
        v.finish()
    }
}
