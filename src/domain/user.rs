use serde::{Deserialize, Serialize};

/// Column widths of `users.email` and `users.password`.
pub const MAX_EMAIL_LEN: usize = 120;
pub const MAX_PASSWORD_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub is_active: bool,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none() && self.is_active.is_none()
    }

    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}
