use serde::Deserialize;

/// Body of both create and partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DepartmentChanges {
    pub name: Option<String>,
}
