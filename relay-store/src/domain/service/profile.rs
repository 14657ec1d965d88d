//! Profile domain service.

use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use relay_core::Result;
use relay_core::model::Profile;

use crate::domain::repository::ProfileRepository;

pub struct ProfileDomainService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileDomainService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, phone_number: &str) -> Result<Profile> {
        self.repo.get(phone_number).await
    }

    #[instrument(skip(self, avatar))]
    pub async fn create(&self, phone_number: &str, name: &str, avatar: &str) -> Result<Profile> {
        let now = Utc::now();
        let profile = Profile {
            phone_number: phone_number.trim().to_string(),
            name: name.trim().to_string(),
            avatar: avatar.trim().to_string(),
            created_at: now,
            updated_at: now,
        };
        self.repo.create(profile).await
    }

    #[instrument(skip(self, avatar))]
    pub async fn update(&self, phone_number: &str, name: &str, avatar: &str) -> Result<Profile> {
        self.repo
            .update(
                phone_number,
                name.trim().to_string(),
                avatar.trim().to_string(),
            )
            .await
    }
}
