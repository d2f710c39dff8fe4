use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use validator::Validate;

use crate::entities::conversions::{convert_to_data_metadata, convert_to_domain_metadata};
use crate::entities::{BodyProfile, FoodItem, UserMetadata, UserProfile};
use crate::services::catalog::{FoodCatalog, BASE_FOODS};
use crate::services::metrics::compute_targets;
use madhumeh_mitra_data::models::Identity;
use madhumeh_mitra_data::repository::{LogStoreTrait, RepositoryError};

/// Onboarding and profile errors
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Body metrics outside the accepted ranges
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage failure
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Flatten validator output into one readable message
fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let details: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, details.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Validate `body`, derive its targets and mark onboarding complete.
///
/// `metadata` itself is never modified; on success the updated copy is returned.
pub fn complete_onboarding(metadata: &UserMetadata, body: BodyProfile) -> Result<UserMetadata, ProfileError> {
    if !body.height_cm.is_finite() || !body.weight_kg.is_finite() {
        return Err(ProfileError::Validation(
            "Height and weight must be finite numbers".to_string(),
        ));
    }
    body.validate()
        .map_err(|e| ProfileError::Validation(validation_message(&e)))?;

    let targets = compute_targets(&body);
    info!(
        "Onboarding complete: bmi {}, bmr {}, {} kcal, {} glasses",
        targets.bmi, targets.bmr, targets.target_calories, targets.target_water
    );

    Ok(UserMetadata {
        onboarding_completed: true,
        profile: Some(UserProfile { body, targets }),
        custom_foods: metadata.custom_foods.clone(),
    })
}

/// Loads and saves a user's metadata and keeps the food catalog in step with it
pub struct ProfileService {
    store: Arc<dyn LogStoreTrait>,
    identity: Identity,
}

impl ProfileService {
    pub fn new(store: Arc<dyn LogStoreTrait>, identity: Identity) -> Self {
        Self { store, identity }
    }

    /// Load metadata, or defaults if none is stored or the store fails
    pub async fn load(&self) -> UserMetadata {
        match self.store.get_profile(&self.identity).await {
            Ok(Some(record)) => convert_to_domain_metadata(record),
            Ok(None) => UserMetadata::default(),
            Err(e) => {
                warn!("Failed to read profile for {}: {}", self.identity, e);
                UserMetadata::default()
            }
        }
    }

    pub async fn save(&self, metadata: &UserMetadata) -> Result<(), ProfileError> {
        let record = convert_to_data_metadata(metadata);
        self.store
            .put_profile(&self.identity, &record)
            .await
            .map_err(|e| {
                error!("Failed to store profile for {}: {}", self.identity, e);
                ProfileError::from(e)
            })
    }

    /// Run onboarding and persist the result
    pub async fn onboard(&self, metadata: &UserMetadata, body: BodyProfile) -> Result<UserMetadata, ProfileError> {
        let updated = complete_onboarding(metadata, body)?;
        self.save(&updated).await?;
        Ok(updated)
    }

    /// Keep an accepted AI estimate and return the re-merged catalog.
    ///
    /// A food whose name is already saved is not added twice.
    pub async fn remember_custom_food(&self, metadata: &mut UserMetadata, item: FoodItem) -> FoodCatalog {
        if metadata.custom_foods.iter().any(|food| food.name == item.name) {
            info!("Custom food {} already saved", item.name);
        } else {
            metadata.custom_foods.push(item);
            if let Err(e) = self.save(metadata).await {
                warn!("Custom food kept for this session only: {}", e);
            }
        }

        catalog_for(metadata)
    }
}

/// The base foods merged with `metadata`'s custom foods
pub fn catalog_for(metadata: &UserMetadata) -> FoodCatalog {
    FoodCatalog::merge(BASE_FOODS.clone(), metadata.custom_foods.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ActivityLevel, Gender};
    use madhumeh_mitra_data::repository::tests::MockLogStore;

    fn body() -> BodyProfile {
        BodyProfile {
            age: 35,
            gender: Gender::Male,
            height_cm: 170.0,
            weight_kg: 70.0,
            activity_level: ActivityLevel::Light,
        }
    }

    fn makhana() -> FoodItem {
        FoodItem::new("ai_1", "Roasted Makhana", 110.0, 20.0, 4.0, 0.5)
    }

    #[test]
    fn test_complete_onboarding() {
        let before = UserMetadata {
            custom_foods: vec![makhana()],
            ..UserMetadata::default()
        };

        let after = complete_onboarding(&before, body()).unwrap();
        assert!(after.onboarding_completed);
        assert_eq!(after.calorie_target(), 2190);
        assert_eq!(after.custom_foods, before.custom_foods);
    }

    #[test]
    fn test_onboarding_rejects_out_of_range_values() {
        let bad = BodyProfile { age: 0, ..body() };
        match complete_onboarding(&UserMetadata::default(), bad) {
            Err(ProfileError::Validation(msg)) => assert!(msg.contains("Age")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let bad = BodyProfile { weight_kg: f64::NAN, ..body() };
        assert!(matches!(
            complete_onboarding(&UserMetadata::default(), bad),
            Err(ProfileError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_onboard_persists_and_reloads() {
        let store = Arc::new(MockLogStore::new());
        let service = ProfileService::new(store.clone(), Identity::Guest);

        let saved = service.onboard(&UserMetadata::default(), body()).await.unwrap();
        assert_eq!(service.load().await, saved);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_load_defaults_on_failure() {
        let service = ProfileService::new(Arc::new(MockLogStore::new().with_read_failure()), Identity::Guest);
        let metadata = service.load().await;
        assert!(!metadata.onboarding_completed);
        assert_eq!(metadata.calorie_target(), 1800);
    }

    #[tokio::test]
    async fn test_remember_custom_food_dedups_by_name() {
        let store = Arc::new(MockLogStore::new());
        let service = ProfileService::new(store.clone(), Identity::Guest);
        let mut metadata = UserMetadata::default();

        let catalog = service.remember_custom_food(&mut metadata, makhana()).await;
        assert_eq!(catalog.custom().len(), 1);
        assert_eq!(catalog.len(), BASE_FOODS.len() + 1);

        let again = FoodItem {
            id: "ai_2".to_string(),
            ..makhana()
        };
        let catalog = service.remember_custom_food(&mut metadata, again).await;
        assert_eq!(catalog.custom().len(), 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_remember_custom_food_survives_write_failure() {
        let service = ProfileService::new(Arc::new(MockLogStore::new().with_write_failure()), Identity::Guest);
        let mut metadata = UserMetadata::default();

        let catalog = service.remember_custom_food(&mut metadata, makhana()).await;
        assert!(catalog.find("ai_1").is_some());
    }
}
