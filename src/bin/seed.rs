use chrono::{Duration, Utc};
use clap::Parser;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use fitdesk::{
    domain::{
        derive_membership_fields, DietPlan, FoodItem, Meal, Member, MemberPatch, TargetAudience,
    },
    repository::{
        AdminRepository, DietPlanRepository, MemberRepository, SqliteAdminRepository,
        SqliteDietPlanRepository, SqliteMemberRepository,
    },
};

#[derive(Parser)]
#[command(about = "Seed the database with sample gym data")]
struct Args {
    /// Number of members to generate
    #[arg(long, default_value_t = 25)]
    members: usize,

    /// Database URL (falls back to DATABASE_URL, then sqlite:fitdesk.db)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    println!("🌱 Starting database seeding...");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:fitdesk.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    let member_repo = SqliteMemberRepository::new(db_pool.clone());
    let admin_repo = SqliteAdminRepository::new(db_pool.clone());
    let diet_plan_repo = SqliteDietPlanRepository::new(db_pool.clone());

    println!("🔑 Creating admin...");
    let admin = admin_repo
        .seed_if_absent("+911234567890", "Gym Admin")
        .await?;
    println!("  ✅ Admin ready (+911234567890)");

    println!("👥 Creating {} members...", args.members);
    let mut rng = rand::thread_rng();
    for _ in 0..args.members {
        let name: String = Name().fake();
        let mobile = format!("+91{}", rng.gen_range(6_000_000_000u64..10_000_000_000u64));
        let month = rng.gen_range(1..=12);
        // Roughly a third of members are unpaid signups.
        let fees = if rng.gen_bool(0.65) {
            (month as f64) * rng.gen_range(500.0..1500.0)
        } else {
            0.0
        };
        let joining_date = Utc::now() - Duration::days(rng.gen_range(0..180));

        let now = Utc::now();
        let patch = MemberPatch {
            joining_date: Some(joining_date),
            month: Some(month),
            fees: Some(fees),
            ..Default::default()
        };
        let derived = derive_membership_fields(None, &patch, now)?;

        member_repo
            .insert(&Member {
                id: Uuid::new_v4(),
                name,
                mobile,
                joining_date: derived.joining_date,
                ending_date: derived.ending_date,
                month: derived.month,
                fees: derived.fees,
                description: None,
                status: derived.status,
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("  ✅ Created {} members", args.members);

    println!("🥗 Creating sample diet plan...");
    let now = Utc::now();
    diet_plan_repo
        .insert(&DietPlan {
            id: Uuid::new_v4(),
            title: "Beginner Weight Loss Plan".to_string(),
            target_audience: TargetAudience::WeightLoss,
            meals: vec![
                Meal {
                    name: "Breakfast".to_string(),
                    time: "8:00 AM".to_string(),
                    items: vec![FoodItem {
                        food: "Oatmeal with fruit".to_string(),
                        ingredients: "Rolled oats, banana, berries".to_string(),
                        quantity: "1 bowl".to_string(),
                        calories: 320.0,
                        protein: 12.0,
                    }],
                    instructions: "Cook oats in water, top with fruit".to_string(),
                },
                Meal {
                    name: "Lunch".to_string(),
                    time: "1:00 PM".to_string(),
                    items: vec![FoodItem {
                        food: "Grilled chicken salad".to_string(),
                        ingredients: "Chicken breast, greens, olive oil".to_string(),
                        quantity: "1 plate".to_string(),
                        calories: 450.0,
                        protein: 38.0,
                    }],
                    instructions: String::new(),
                },
            ],
            total_calories: 770.0,
            total_protein: 50.0,
            duration: "4 weeks".to_string(),
            notes: Some("Drink at least 2 litres of water daily".to_string()),
            pdf_url: None,
            pdf_storage_id: None,
            created_by: admin.id,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await?;
    println!("  ✅ Created sample diet plan");

    println!("🎉 Seeding complete!");
    Ok(())
}
