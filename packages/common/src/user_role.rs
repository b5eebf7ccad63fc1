#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user account. Only hosts may create hackathons.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")
)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "user"))]
    User,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "host"))]
    Host,
}

impl UserRole {
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Host => "host",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
