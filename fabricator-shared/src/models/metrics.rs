use serde_json::Value;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Record type a count is reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    /// Accounts.
    User,
    /// Shop items.
    Item,
}

impl EntityKind {
    /// Path segment of the count endpoints for this entity.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::Item => "items",
        }
    }

    /// Field carrying the number in the count response body.
    #[must_use]
    pub const fn count_field(self) -> &'static str {
        match self {
            Self::User => "active_users",
            Self::Item => "item_count",
        }
    }
}

/// Which records a count covers.
///
/// `Generated` records come from the bootstrap run (including requests made by
/// generated users); `Defined` records belong to manually registered users.
/// `All` may include records of neither kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CountScope {
    /// Created by the bootstrap run.
    Generated,
    /// Created by registered users.
    Defined,
    /// Every record.
    All,
}

/// One of the six read-only counts shown on the landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountMetric {
    /// Collection counted.
    pub entity: EntityKind,
    /// Subset counted.
    pub scope: CountScope,
}

impl CountMetric {
    /// Metric for `entity` restricted to `scope`.
    pub const fn new(entity: EntityKind, scope: CountScope) -> Self {
        Self { entity, scope }
    }

    /// Every metric, users first.
    pub fn all() -> impl Iterator<Item = Self> {
        EntityKind::iter()
            .flat_map(|entity| CountScope::iter().map(move |scope| Self::new(entity, scope)))
    }

    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub fn path(self) -> String {
        format!("api/{}/count/{}/", self.entity.collection(), self.scope)
    }

    /// Stable label such as `generated_users`.
    #[must_use]
    pub fn label(self) -> String {
        format!("{}_{}", self.scope, self.entity.collection())
    }

    /// Reads the count out of a response body.
    #[must_use]
    pub fn parse_count(self, body: &Value) -> Option<u64> {
        body.get(self.entity.count_field()).and_then(Value::as_u64)
    }
}
