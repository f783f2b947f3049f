use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Free-form profile data kept alongside an account.
///
/// Picture/file storage is an external concern and deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn display_name(&self, email: &str) -> String {
        match &self.full_name {
            Some(name) if !name.trim().is_empty() => format!("{name} ({email})"),
            _ => email.to_string(),
        }
    }
}
