use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubjectChanges {
    pub name: Option<String>,
    pub code: Option<String>,
    /// Id of the owning department.
    pub department: Option<String>,
}
