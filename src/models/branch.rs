use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_with_id, RecordId, Resource};

/// Academic branch (department) that users and books belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    #[serde(skip_deserializing)]
    pub id: RecordId,
    #[serde(default, alias = "branchName")]
    pub name: String,
    #[serde(default, alias = "branchCode")]
    pub code: Option<String>,
}

impl Resource for Branch {
    const COLLECTION_KEYS: &'static [&'static str] = &["branches"];
    const RECORD_KEYS: &'static [&'static str] = &["branch"];

    fn from_value(value: &Value) -> Option<Self> {
        let branch: Branch = decode_with_id(value, &["id", "_id", "branchId"], |b: &mut Branch, id| {
            b.id = id
        })?;
        if branch.name.trim().is_empty() {
            return None;
        }
        Some(branch)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBranch {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
