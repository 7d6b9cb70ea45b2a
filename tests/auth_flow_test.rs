use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use fitdesk::{
    auth::AuthService,
    config::AuthConfig,
    domain::OtpChallenge,
    error::AppError,
    integrations::NullSmsSender,
    repository::{AdminRepository, SqliteAdminRepository},
};

const ADMIN_MOBILE: &str = "+919999888877";

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_duration_hours: 24,
        otp_ttl_minutes: 10,
        expose_otp: true,
    }
}

async fn setup() -> anyhow::Result<(AuthService, Arc<SqliteAdminRepository>)> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = Arc::new(SqliteAdminRepository::new(pool));
    repo.seed_if_absent(ADMIN_MOBILE, "Test Admin").await?;

    let service = AuthService::new(repo.clone(), Arc::new(NullSmsSender), auth_config());
    Ok((service, repo))
}

#[tokio::test]
async fn test_otp_login_flow() -> anyhow::Result<()> {
    let (service, _repo) = setup().await?;

    let issued = service.send_otp(ADMIN_MOBILE).await?;
    let code = issued.debug_code.expect("expose_otp returns the code");
    assert_eq!(code.len(), 6);

    let (admin, token) = service.verify_otp(ADMIN_MOBILE, &code).await?;
    assert_eq!(admin.mobile, ADMIN_MOBILE);
    assert!(!token.is_empty());

    let claims = service.decode_token(&token)?;
    assert_eq!(claims.sub, admin.id);
    assert_eq!(claims.mobile, ADMIN_MOBILE);

    let resolved = service.admin_for_token(&token).await?;
    assert_eq!(resolved.id, admin.id);

    // The code is cleared after a successful login
    let result = service.verify_otp(ADMIN_MOBILE, &code).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_unknown_mobile_rejected() -> anyhow::Result<()> {
    let (service, _repo) = setup().await?;

    let result = service.send_otp("+910000000000").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_wrong_code_rejected() -> anyhow::Result<()> {
    let (service, _repo) = setup().await?;

    let issued = service.send_otp(ADMIN_MOBILE).await?;
    let code = issued.debug_code.unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let result = service.verify_otp(ADMIN_MOBILE, wrong).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    // The stored code is still usable after a failed attempt
    let (_, token) = service.verify_otp(ADMIN_MOBILE, &code).await?;
    assert!(!token.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_expired_code_rejected() -> anyhow::Result<()> {
    let (service, repo) = setup().await?;

    let admin = repo.find_by_mobile(ADMIN_MOBILE).await?.unwrap();
    repo.set_otp(
        admin.id,
        &OtpChallenge {
            code: "123456".to_string(),
            expires_at: Utc::now() - Duration::minutes(1),
        },
    )
    .await?;

    let result = service.verify_otp(ADMIN_MOBILE, "123456").await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    Ok(())
}

#[tokio::test]
async fn test_reissue_supersedes_previous_code() -> anyhow::Result<()> {
    let (service, _repo) = setup().await?;

    let first = service.send_otp(ADMIN_MOBILE).await?.debug_code.unwrap();
    let second = service.send_otp(ADMIN_MOBILE).await?.debug_code.unwrap();

    if first != second {
        let result = service.verify_otp(ADMIN_MOBILE, &first).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    let (_, token) = service.verify_otp(ADMIN_MOBILE, &second).await?;
    assert!(!token.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_garbage_token_rejected() -> anyhow::Result<()> {
    let (service, _repo) = setup().await?;

    let result = service.admin_for_token("not-a-token").await;
    assert!(matches!(result, Err(AppError::Unauthorized)));

    Ok(())
}
