use serde::{Deserialize, Serialize};
use std::fmt;

/// A one-shot data correction: rename `field` values from `from` to `to`.
///
/// Re-running a fix is a no-op once every matching document was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MigrationFix {
    pub collection: String,
    pub field: String,
    pub from: String,
    pub to: String,
}

impl MigrationFix {
    pub fn new(
        collection: impl Into<String>,
        field: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        MigrationFix {
            collection: collection.into(),
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Database shell statement applying this fix.
    ///
    /// Field and values are emitted as JSON strings so quotes in values
    /// cannot break out of the statement.
    pub fn to_script(&self) -> String {
        let field = json_string(&self.field);
        format!(
            "db.getCollection({}).updateMany({{{}: {}}}, {{$set: {{{}: {}}}}})",
            json_string(&self.collection),
            field,
            json_string(&self.from),
            field,
            json_string(&self.to)
        )
    }
}

fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl fmt::Display for MigrationFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}: {} -> {}",
            self.collection, self.field, self.from, self.to
        )
    }
}
