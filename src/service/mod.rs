pub mod analytics_service;
pub mod diet_plan_service;
pub mod member_service;
pub mod transformation_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::integrations::{
    sms_sender_from_config, HttpImageStore, HttpPdfPublisher, ImageStore, PdfPublisher,
};
use crate::repository::*;

pub use analytics_service::AnalyticsService;
pub use diet_plan_service::DietPlanService;
pub use member_service::MemberService;
pub use transformation_service::TransformationService;

pub struct ServiceContext {
    pub member_service: Arc<MemberService>,
    pub diet_plan_service: Arc<DietPlanService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub transformation_service: Arc<TransformationService>,
    pub auth_service: Arc<AuthService>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(settings: &Settings, db_pool: SqlitePool) -> Self {
        let member_repo: Arc<dyn MemberRepository> =
            Arc::new(SqliteMemberRepository::new(db_pool.clone()));
        let diet_plan_repo: Arc<dyn DietPlanRepository> =
            Arc::new(SqliteDietPlanRepository::new(db_pool.clone()));
        let admin_repo: Arc<dyn AdminRepository> =
            Arc::new(SqliteAdminRepository::new(db_pool.clone()));
        let transformation_repo: Arc<dyn TransformationRepository> =
            Arc::new(SqliteTransformationRepository::new(db_pool.clone()));

        let sms = sms_sender_from_config(settings.sms.clone());
        let pdf_publisher: Option<Arc<dyn PdfPublisher>> =
            HttpPdfPublisher::new(settings.pdf.clone())
                .map(|p| Arc::new(p) as Arc<dyn PdfPublisher>);
        let image_store: Option<Arc<dyn ImageStore>> =
            HttpImageStore::new(settings.images.clone())
                .map(|s| Arc::new(s) as Arc<dyn ImageStore>);

        let portal_url = settings
            .sms
            .as_ref()
            .map(|cfg| cfg.portal_url.clone())
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let member_service = Arc::new(MemberService::new(
            member_repo.clone(),
            sms.clone(),
            portal_url,
        ));
        let diet_plan_service = Arc::new(DietPlanService::new(diet_plan_repo, pdf_publisher));
        let transformation_service = Arc::new(TransformationService::new(
            transformation_repo,
            image_store,
        ));
        let analytics_service = Arc::new(AnalyticsService::new(db_pool.clone(), member_repo));
        let auth_service = Arc::new(AuthService::new(
            admin_repo.clone(),
            sms,
            settings.auth.clone(),
        ));

        Self {
            member_service,
            diet_plan_service,
            analytics_service,
            transformation_service,
            auth_service,
            admin_repo,
            db_pool,
        }
    }
}
