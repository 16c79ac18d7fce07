use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentChanges {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    /// Id of the owning department.
    pub department: Option<String>,
}
