pub mod admin;
pub mod diet_plan;
pub mod member;
pub mod transformation;

pub use admin::{Admin, OtpChallenge};
pub use diet_plan::{
    normalize_meals, nutrition_totals, validate_nutrition, CreateDietPlan, DietPlan,
    DietPlanFilter, DietPlanPatch, FoodItem, FoodItemInput, Meal, MealInput, StoredPdf,
    TargetAudience,
};
pub use transformation::{
    TransformationEntry, TransformationInput, TransformationSet, GALLERY_CAPACITY,
};
pub use member::{
    derive_membership_fields, ending_date_for, initial_status, DerivedFields, Member, MemberFilter,
    MemberPatch, MemberStatus, NewMember, SortOrder, StatusFilter,
};
