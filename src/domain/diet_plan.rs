use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DietPlan {
    pub id: Uuid,
    pub title: String,
    pub target_audience: TargetAudience,
    pub meals: Vec<Meal>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub duration: String,
    pub notes: Option<String>,
    pub pdf_url: Option<String>,
    pub pdf_storage_id: Option<String>,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    WeightLoss,
    WeightGain,
    MuscleBuilding,
    Maintenance,
    General,
}

impl TargetAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAudience::WeightLoss => "weight_loss",
            TargetAudience::WeightGain => "weight_gain",
            TargetAudience::MuscleBuilding => "muscle_building",
            TargetAudience::Maintenance => "maintenance",
            TargetAudience::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "weight_loss" => Some(TargetAudience::WeightLoss),
            "weight_gain" => Some(TargetAudience::WeightGain),
            "muscle_building" => Some(TargetAudience::MuscleBuilding),
            "maintenance" => Some(TargetAudience::Maintenance),
            "general" => Some(TargetAudience::General),
            _ => None,
        }
    }

    /// Human-readable form used in the rendered PDF header.
    pub fn display(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub time: String,
    pub items: Vec<FoodItem>,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub food: String,
    pub ingredients: String,
    pub quantity: String,
    pub calories: f64,
    pub protein: f64,
}

/// Location of a rendered PDF in object storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPdf {
    pub url: String,
    pub storage_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct DietPlanFilter {
    pub search: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub page: i64,
    pub limit: i64,
}

/// Wire shape for meals: every sub-field optional so a partially filled
/// form can still be saved. Missing values are substituted with
/// documented defaults by [`normalize_meals`] instead of being rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct MealInput {
    pub name: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub items: Vec<FoodItemInput>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodItemInput {
    pub food: Option<String>,
    pub ingredients: Option<String>,
    pub quantity: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
}

/// Validated input for diet-plan creation.
#[derive(Debug, Clone)]
pub struct CreateDietPlan {
    pub title: String,
    pub target_audience: TargetAudience,
    pub meals: Vec<MealInput>,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DietPlanPatch {
    pub title: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub meals: Option<Vec<MealInput>>,
    pub duration: Option<String>,
    pub notes: Option<String>,
}

pub fn normalize_meals(meals: Vec<MealInput>) -> Vec<Meal> {
    meals
        .into_iter()
        .map(|meal| Meal {
            name: meal.name.unwrap_or_else(|| "Meal".to_string()),
            time: meal.time.unwrap_or_default(),
            items: meal
                .items
                .into_iter()
                .map(|item| FoodItem {
                    food: item.food.unwrap_or_else(|| "Food item".to_string()),
                    ingredients: item.ingredients.unwrap_or_default(),
                    quantity: item.quantity.unwrap_or_default(),
                    calories: item.calories.unwrap_or(0.0),
                    protein: item.protein.unwrap_or(0.0),
                })
                .collect(),
            instructions: meal.instructions.unwrap_or_default(),
        })
        .collect()
}

/// Item calories and protein must be non-negative; everything else
/// about the meal structure is left permissive.
pub fn validate_nutrition(meals: &[Meal]) -> crate::error::Result<()> {
    for meal in meals {
        for item in &meal.items {
            if item.calories < 0.0 || item.protein < 0.0 {
                return Err(crate::error::AppError::Validation(
                    "calories and protein must be non-negative".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Sums item calories and protein across all meals. Protein is rounded
/// to one decimal place.
pub fn nutrition_totals(meals: &[Meal]) -> (f64, f64) {
    let mut calories = 0.0;
    let mut protein = 0.0;
    for meal in meals {
        for item in &meal.items {
            calories += item.calories;
            protein += item.protein;
        }
    }
    (calories, (protein * 10.0).round() / 10.0)
}
