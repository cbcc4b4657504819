//! The fixed business-data partitions and their storage mapping.
//!
//! Every category maps to exactly one local storage key, one remote sheet
//! identifier, and one identity field. The enumeration order of
//! [`Category::ALL`] is the order a full sync pass walks the categories.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed business-data partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Config,
    Products,
    Orders,
    Finance,
    Users,
}

impl Category {
    /// All categories, in the fixed order a full sync pass processes them.
    pub const ALL: [Category; 5] = [
        Category::Config,
        Category::Products,
        Category::Orders,
        Category::Finance,
        Category::Users,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Config => "config",
            Category::Products => "products",
            Category::Orders => "orders",
            Category::Finance => "finance",
            Category::Users => "users",
        }
    }

    /// Local storage key holding this category's snapshot.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Category::Config => "POS_OFFICIAL_CONFIG",
            Category::Products => "POS_PRODUCTS_LIST",
            Category::Orders => "POS_ORDERS_HISTORY",
            Category::Finance => "POS_FINANCE_FLUX",
            Category::Users => "POS_USERS_ACCOUNTS",
        }
    }

    /// Remote sheet identifier sent on the wire.
    ///
    /// The remote store addresses tables by the same name as the local
    /// storage key.
    pub fn sheet(&self) -> &'static str {
        self.storage_key()
    }

    /// Local storage key for the last-confirmed-sync watermark.
    pub fn watermark_key(&self) -> String {
        format!("lastSync_{}", self.storage_key())
    }

    /// Local storage key for the pending-operation queue.
    pub fn queue_key(&self) -> String {
        format!("syncQueue_{}", self.storage_key())
    }

    /// Field used to match records of this category across stores.
    pub fn identity_field(&self) -> &'static str {
        match self {
            Category::Config => "company",
            Category::Users => "username",
            Category::Products | Category::Orders | Category::Finance => "id",
        }
    }

    /// Whether this category stores a single record rather than a list.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Category::Config)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "config" => Ok(Category::Config),
            "products" => Ok(Category::Products),
            "orders" => Ok(Category::Orders),
            "finance" => Ok(Category::Finance),
            "users" => Ok(Category::Users),
            other => Err(Error::UnknownCategory(other.to_string())),
        }
    }
}
