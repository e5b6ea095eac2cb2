use crate::id::string_id;

string_id!(UserID, "user");

/// The signed-in owner of all records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserID,
    pub email: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<UserID>, email: Option<&str>) -> Self {
        Self {
            id: id.into(),
            email: email.map(str::to_string),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(self.id.as_str())
    }
}
