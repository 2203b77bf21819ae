//! Users, admins and teachers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{decode_with_id, RecordId, Reference, Resource};

/// Account role. Unknown values are preserved instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Teacher,
    User,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::User => "user",
            Role::Other(other) => other,
        }
    }

    /// Admins manage staff and branches; teachers only manage books.
    pub fn can_manage_staff(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_upload_books(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "admin" | "administrator" | "superadmin" => Role::Admin,
            "teacher" => Role::Teacher,
            "user" | "student" => Role::User,
            _ => Role::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_deserializing)]
    pub id: RecordId,
    #[serde(default, alias = "fullName")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phoneNumber", alias = "phone_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, alias = "branchId", alias = "branch_id")]
    pub branch: Option<Reference>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

impl Resource for User {
    const COLLECTION_KEYS: &'static [&'static str] = &["users", "admins", "teachers"];
    const RECORD_KEYS: &'static [&'static str] = &["user", "admin", "teacher"];

    fn from_value(value: &Value) -> Option<Self> {
        let user: User = decode_with_id(value, &["id", "_id", "userId", "uuid"], |u: &mut User, id| {
            u.id = id
        })?;
        if user.name.trim().is_empty() {
            return None;
        }
        Some(user)
    }

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Form data for creating an admin or teacher account.
#[derive(Debug, Clone, Serialize)]
pub struct NewStaff {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from("Admin"), Role::Admin);
        assert_eq!(Role::from("teacher"), Role::Teacher);
        assert_eq!(Role::from("student"), Role::User);
        assert_eq!(Role::from("librarian"), Role::Other("librarian".into()));
        assert_eq!(Role::from("librarian").as_str(), "librarian");
        assert!(Role::Admin.can_manage_staff());
        assert!(!Role::Teacher.can_manage_staff());
        assert!(Role::Teacher.can_upload_books());
    }

    #[test]
    fn test_user_from_camel_case_record() {
        let raw = json!({
            "_id": "65f0c",
            "fullName": "Ama Owusu",
            "email": "ama@example.com",
            "phoneNumber": "+233200000000",
            "role": "teacher",
            "branch": { "_id": "b1", "name": "Accra" },
            "createdAt": "2024-03-01T10:00:00Z"
        });
        let user = User::from_value(&raw).unwrap();
        assert_eq!(user.id.as_str(), "65f0c");
        assert_eq!(user.name, "Ama Owusu");
        assert_eq!(user.role, Some(Role::Teacher));
        assert_eq!(user.branch.unwrap().label(), "Accra");
        assert_eq!(user.created_at.as_deref(), Some("2024-03-01T10:00:00Z"));
    }

    #[test]
    fn test_user_without_id_or_name_is_malformed() {
        assert!(User::from_value(&json!({ "name": "No Id" })).is_none());
        assert!(User::from_value(&json!({ "id": 3 })).is_none());
        assert!(User::from_value(&json!("just a string")).is_none());
    }
}
