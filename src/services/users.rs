//! Consultation des comptes existants.

use std::sync::Arc;

use super::ServiceError;
use crate::db::UserStore;
use crate::models::{UserData, UserID};

pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub fn get_by_id(&self, id: UserID) -> Result<UserData, ServiceError> {
        Ok(self.users.find_by_id(id)?)
    }

    pub fn list(&self) -> Result<Vec<UserData>, ServiceError> {
        Ok(self.users.list()?)
    }
}
