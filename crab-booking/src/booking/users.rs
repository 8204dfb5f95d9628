//! User directory
//!
//! Local copy of account profiles pushed by the account service.

use super::error::{BookingError, BookingResult};
use super::storage::BookingStorage;
use shared::models::{UserProfile, UserUpsert};

#[derive(Debug, Clone)]
pub struct UserDirectory {
    storage: BookingStorage,
}

impl UserDirectory {
    pub fn new(storage: BookingStorage) -> Self {
        Self { storage }
    }

    pub fn get(&self, id: i64) -> BookingResult<UserProfile> {
        self.storage
            .get_user(id)?
            .ok_or(BookingError::UserNotFound(id))
    }

    pub fn upsert(&self, id: i64, payload: UserUpsert) -> BookingResult<UserProfile> {
        if !payload.email.contains('@') {
            return Err(BookingError::validation(format!(
                "Invalid email: {}",
                payload.email
            )));
        }
        if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
            return Err(BookingError::validation(
                "first_name and last_name are required",
            ));
        }

        let existing_role = self.storage.get_user(id)?.map(|u| u.role);
        let user = UserProfile {
            id,
            email: payload.email.trim().to_string(),
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            phone: payload.phone.filter(|p| !p.trim().is_empty()),
            role: payload.role.or(existing_role).unwrap_or_default(),
        };
        self.storage.store_user(&user)?;
        tracing::debug!(user_id = id, role = user.role.as_str(), "User profile stored");
        Ok(user)
    }
}
