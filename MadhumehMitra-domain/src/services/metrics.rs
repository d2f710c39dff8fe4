use crate::entities::profile::{BodyProfile, Gender, HealthTargets};

/// Water target never drops below this many glasses
const MIN_WATER_GLASSES: u32 = 8;

/// Derive BMI, BMR and daily targets from body metrics.
///
/// Uses Mifflin-St Jeor for BMR and the activity multiplier for TDEE; the calorie
/// target is maintenance TDEE computed from the unrounded BMR. Inputs are not
/// validated here: zero or non-finite values give meaningless but non-panicking
/// results, so callers validate first.
pub fn compute_targets(body: &BodyProfile) -> HealthTargets {
    let height_m = body.height_cm / 100.0;
    let bmi = round_to_one_decimal(body.weight_kg / (height_m * height_m));

    let bmr = mifflin_st_jeor(body);
    let tdee = bmr * body.activity_level.multiplier();

    let water_glasses = (body.weight_kg * 2.2 * 0.5 / 8.0).round() as u32;

    HealthTargets {
        bmi,
        bmr: bmr.round() as u32,
        target_calories: tdee.round() as u32,
        target_water: water_glasses.max(MIN_WATER_GLASSES),
    }
}

/// Resting energy expenditure in kcal/day
fn mifflin_st_jeor(body: &BodyProfile) -> f64 {
    let base = 10.0 * body.weight_kg + 6.25 * body.height_cm - 5.0 * f64::from(body.age);
    match body.gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

fn round_to_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
