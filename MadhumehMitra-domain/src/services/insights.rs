use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::{AiError, GeminiClient, GeminiConfig, ResponseFormat, TextGenerator};
use crate::entities::{DailyLog, FoodItem};
use crate::services::daily_log::{DailyLogService, LogChange, PersistOutcome};

pub const NO_CREDENTIALS_INSIGHT: &str = "Stay active and hydrated! (Add API_KEY to env to see AI insights)";
pub const EMPTY_INSIGHT: &str = "Stay active and hydrated!";
pub const FAILED_INSIGHT: &str = "Great job tracking your health today!";

/// Id prefix marking a food as AI-estimated
pub const AI_FOOD_ID_PREFIX: &str = "ai_";

/// Raw estimate as returned by the model
#[derive(Debug, Deserialize)]
struct FoodEstimate {
    name: String,
    calories: f64,
    carbs: f64,
    #[serde(default)]
    protein: Option<f64>,
    #[serde(default)]
    fat: Option<f64>,
}

/// Best-effort AI features. Without a generator every call degrades to a fallback.
#[derive(Clone, Default)]
pub struct AiAssistant {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl AiAssistant {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    /// Gemini-backed assistant, or a disabled one when no key is configured
    pub fn from_config(config: &GeminiConfig) -> Self {
        match GeminiClient::new(config) {
            Ok(client) => Self::new(Some(Arc::new(client))),
            Err(AiError::MissingCredentials) => {
                info!("No AI credentials configured, insights use fallbacks");
                Self::disabled()
            }
            Err(e) => {
                warn!("Failed to build AI client, insights use fallbacks: {}", e);
                Self::disabled()
            }
        }
    }

    /// An assistant with no credentials
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Estimate nutrition for a free-text food, or `None` if no estimate is available
    pub async fn estimate_food(&self, query: &str) -> Option<FoodItem> {
        let generator = self.generator.as_ref()?;
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let raw = match generator.generate(&food_prompt(query), ResponseFormat::Json).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Food estimate for {:?} failed: {}", query, e);
                return None;
            }
        };

        parse_food_estimate(&raw)
    }

    /// A one-sentence encouragement for `log`. Never fails.
    pub async fn generate_insight(&self, log: &DailyLog) -> String {
        let Some(generator) = self.generator.as_ref() else {
            return NO_CREDENTIALS_INSIGHT.to_string();
        };

        match generator.generate(&insight_prompt(log), ResponseFormat::Text).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => EMPTY_INSIGHT.to_string(),
            Err(e) => {
                warn!("Insight generation failed: {}", e);
                FAILED_INSIGHT.to_string()
            }
        }
    }
}

/// Generate an insight for `log`, store it on the log and persist it
pub async fn refresh_insight(
    assistant: &AiAssistant,
    service: &DailyLogService,
    log: DailyLog,
) -> (DailyLog, Option<PersistOutcome>) {
    let insight = assistant.generate_insight(&log).await;
    service.apply(log, LogChange::SetInsight(insight)).await
}

fn food_prompt(query: &str) -> String {
    format!(
        "Analyze the food item: \"{}\".\n\
         Estimate the calories, carbohydrates, protein, and fat for a standard Indian serving size.\n\
         Return ONLY a JSON object with these keys: \"name\" (string), \"calories\" (number), \
         \"carbs\" (number), \"protein\" (number), \"fat\" (number).\n\
         Example: {{\"name\": \"Poha (1 plate)\", \"calories\": 250, \"carbs\": 40, \"protein\": 4, \"fat\": 8}}",
        query
    )
}

fn insight_prompt(log: &DailyLog) -> String {
    let meals = log
        .meals
        .iter()
        .map(|meal| meal.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a kind and knowledgeable health assistant for an Indian adult with Type 2 Diabetes.\n\
         Here is their summary for today:\n\
         - Calories: {}\n\
         - Carbs: {}g\n\
         - Water: {} glasses\n\
         - Activity: {} calories burned\n\
         - Meals: {}\n\n\
         Provide one single, short sentence (max 20 words) of encouraging feedback or advice \
         tailored to Indian diet/lifestyle. Do not use markdown.",
        log.total_calories_in, log.total_carbs, log.water_glasses, log.total_calories_burned, meals
    )
}

/// Drop a surrounding markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Validate a model answer into a catalog entry
fn parse_food_estimate(raw: &str) -> Option<FoodItem> {
    let estimate: FoodEstimate = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(estimate) => estimate,
        Err(e) => {
            warn!("Discarding malformed food estimate: {}", e);
            return None;
        }
    };

    let protein = estimate.protein.unwrap_or(0.0);
    let fat = estimate.fat.unwrap_or(0.0);
    let name = estimate.name.trim();

    if name.is_empty() || ![estimate.calories, estimate.carbs, protein, fat].into_iter().all(non_negative) {
        warn!("Discarding implausible food estimate for {:?}", estimate.name);
        return None;
    }

    debug!("Estimated {}: {} kcal", name, estimate.calories);
    Some(FoodItem::new(
        format!("{}{}", AI_FOOD_ID_PREFIX, Uuid::new_v4().simple()),
        name,
        estimate.calories,
        estimate.carbs,
        protein,
        fat,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockTextGenerator;
    use crate::entities::MealSlot;
    use crate::services::daily_log::{add_water, commit_meals, create_empty};
    use chrono::NaiveDate;
    use mockall::predicate::eq;

    fn assistant(mock: MockTextGenerator) -> AiAssistant {
        AiAssistant::new(Some(Arc::new(mock)))
    }

    fn answering(answer: &'static str) -> AiAssistant {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .with(mockall::predicate::always(), eq(ResponseFormat::Json))
            .returning(move |_, _| Ok(answer.to_string()));
        assistant(mock)
    }

    fn today_log() -> DailyLog {
        let log = create_empty(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        let poha = FoodItem::new("f14", "Poha (1 Bowl)", 250.0, 40.0, 3.0, 8.0);
        add_water(commit_meals(log, &[poha], MealSlot::Breakfast, 0))
    }

    #[test]
    fn test_from_config_without_key_is_disabled() {
        assert!(!AiAssistant::from_config(&GeminiConfig::default()).is_enabled());

        let config = GeminiConfig {
            api_key: Some("key".to_string()),
            ..GeminiConfig::default()
        };
        assert!(AiAssistant::from_config(&config).is_enabled());
    }

    #[tokio::test]
    async fn test_insight_without_credentials() {
        let text = AiAssistant::disabled().generate_insight(&today_log()).await;
        assert_eq!(text, NO_CREDENTIALS_INSIGHT);
    }

    #[tokio::test]
    async fn test_insight_prompt_carries_totals() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|prompt, format| {
                *format == ResponseFormat::Text
                    && prompt.contains("Calories: 250")
                    && prompt.contains("Water: 1 glasses")
                    && prompt.contains("Meals: Poha (1 Bowl)")
            })
            .times(1)
            .returning(|_, _| Ok("  Lovely start with poha, keep sipping water!\n".to_string()));

        let text = assistant(mock).generate_insight(&today_log()).await;
        assert_eq!(text, "Lovely start with poha, keep sipping water!");
    }

    #[tokio::test]
    async fn test_insight_fallbacks() {
        let mut empty = MockTextGenerator::new();
        empty.expect_generate().returning(|_, _| Ok("   ".to_string()));
        assert_eq!(assistant(empty).generate_insight(&today_log()).await, EMPTY_INSIGHT);

        let mut failing = MockTextGenerator::new();
        failing
            .expect_generate()
            .returning(|_, _| Err(AiError::Status { status: 503, message: "unavailable".to_string() }));
        assert_eq!(assistant(failing).generate_insight(&today_log()).await, FAILED_INSIGHT);
    }

    #[tokio::test]
    async fn test_refresh_insight_persists() {
        use madhumeh_mitra_data::models::Identity;
        use madhumeh_mitra_data::repository::tests::MockLogStore;
        use madhumeh_mitra_data::repository::InMemoryStorage;

        let store = Arc::new(MockLogStore::new());
        let service = DailyLogService::new(store.clone(), Arc::new(InMemoryStorage::new()), Identity::Guest);

        let (log, outcome) = refresh_insight(&AiAssistant::disabled(), &service, today_log()).await;
        assert_eq!(log.ai_insight.as_deref(), Some(NO_CREDENTIALS_INSIGHT));
        assert_eq!(outcome, Some(PersistOutcome::Stored));
        assert_eq!(service.load(log.date).await.ai_insight, log.ai_insight);
    }

    #[tokio::test]
    async fn test_estimate_food() {
        let item = answering(r#"{"name": "Masala Dosa", "calories": 350, "carbs": 50, "protein": 7, "fat": 12}"#)
            .estimate_food("masala dosa")
            .await
            .unwrap();

        assert!(item.id.starts_with(AI_FOOD_ID_PREFIX));
        assert_eq!(item.name, "Masala Dosa");
        assert_eq!(item.calories, 350.0);
        assert_eq!(item.fat, 12.0);
    }

    #[tokio::test]
    async fn test_estimate_defaults_protein_and_fat() {
        let item = answering("```json\n{\"name\": \"Sugarcane Juice\", \"calories\": 180, \"carbs\": 45}\n```")
            .estimate_food("ganne ka ras")
            .await
            .unwrap();

        assert_eq!(item.protein, 0.0);
        assert_eq!(item.fat, 0.0);
    }

    #[tokio::test]
    async fn test_estimate_rejects_bad_answers() {
        for answer in [
            "not json at all",
            r#"{"name": "Samosa", "carbs": 30}"#,
            r#"{"calories": 250, "carbs": 30}"#,
            r#"{"name": "Samosa", "calories": -5, "carbs": 30}"#,
            r#"{"name": "", "calories": 250, "carbs": 30}"#,
        ] {
            assert!(answering(answer).estimate_food("samosa").await.is_none(), "{}", answer);
        }
    }

    #[tokio::test]
    async fn test_estimate_without_credentials_or_query() {
        assert!(AiAssistant::disabled().estimate_food("samosa").await.is_none());

        let mut mock = MockTextGenerator::new();
        mock.expect_generate().never();
        assert!(assistant(mock).estimate_food("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_estimate_swallows_errors() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(|_, _| Err(AiError::EmptyResponse));
        assert!(assistant(mock).estimate_food("samosa").await.is_none());
    }
}
