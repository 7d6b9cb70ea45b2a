use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;

use fitdesk::{
    domain::{TransformationInput, GALLERY_CAPACITY},
    error::{AppError, Result},
    integrations::ImageStore,
    repository::SqliteTransformationRepository,
    service::TransformationService,
};

/// Hands back a deterministic URL per upload and records every call.
#[derive(Default)]
struct RecordingImageStore {
    uploads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn store(&self, source: &str, folder: &str) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((source.to_string(), folder.to_string()));
        Ok(format!("https://cdn.test/{}/{}.jpg", folder, uploads.len()))
    }
}

async fn setup(
    store: Option<Arc<RecordingImageStore>>,
) -> anyhow::Result<TransformationService> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = Arc::new(SqliteTransformationRepository::new(pool));
    let images = store.map(|s| s as Arc<dyn ImageStore>);
    Ok(TransformationService::new(repo, images))
}

fn entry(name: &str) -> TransformationInput {
    TransformationInput {
        name: Some(name.to_string()),
        duration: Some("3 months".to_string()),
        weight_lost: Some("8 kg".to_string()),
        before_image: Some(format!("data:image/jpeg;base64,{}-before", name)),
        after_image: Some(format!("data:image/jpeg;base64,{}-after", name)),
    }
}

#[tokio::test]
async fn unsaved_gallery_reads_empty() -> anyhow::Result<()> {
    let service = setup(Some(Arc::new(RecordingImageStore::default()))).await?;

    let entries = service.gallery("home").await?;
    assert!(entries.is_empty());
    Ok(())
}

#[tokio::test]
async fn saving_uploads_images_and_persists_entries() -> anyhow::Result<()> {
    let store = Arc::new(RecordingImageStore::default());
    let service = setup(Some(store.clone())).await?;

    let saved = service
        .replace_gallery("home", vec![entry("Asha"), entry("Ravi")])
        .await?;

    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].name, "Asha");
    assert_eq!(saved[0].before_image, "https://cdn.test/transformations/1.jpg");
    assert_eq!(saved[0].after_image, "https://cdn.test/transformations/2.jpg");

    // Both images per entry went through the store, in submission order.
    let uploads = store.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 4);
    assert!(uploads.iter().all(|(_, folder)| folder == "transformations"));
    assert_eq!(uploads[0].0, "data:image/jpeg;base64,Asha-before");

    let read_back = service.gallery("home").await?;
    assert_eq!(read_back.len(), 2);
    assert_eq!(read_back[1].name, "Ravi");
    Ok(())
}

#[tokio::test]
async fn submissions_beyond_capacity_are_dropped() -> anyhow::Result<()> {
    let service = setup(Some(Arc::new(RecordingImageStore::default()))).await?;

    let saved = service
        .replace_gallery(
            "home",
            vec![entry("A"), entry("B"), entry("C"), entry("D")],
        )
        .await?;

    assert_eq!(saved.len(), GALLERY_CAPACITY);
    assert_eq!(saved[2].name, "C");
    Ok(())
}

#[tokio::test]
async fn saving_replaces_the_previous_gallery() -> anyhow::Result<()> {
    let service = setup(Some(Arc::new(RecordingImageStore::default()))).await?;

    service
        .replace_gallery("home", vec![entry("Old"), entry("Older")])
        .await?;
    let saved = service.replace_gallery("home", vec![entry("New")]).await?;

    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "New");

    let read_back = service.gallery("home").await?;
    assert_eq!(read_back.len(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_images_are_rejected() -> anyhow::Result<()> {
    let service = setup(Some(Arc::new(RecordingImageStore::default()))).await?;

    let mut input = entry("Asha");
    input.after_image = None;

    let err = service
        .replace_gallery("home", vec![input])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // Empty strings count as missing too.
    let mut input = entry("Ravi");
    input.before_image = Some(String::new());

    let err = service
        .replace_gallery("home", vec![input])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn unconfigured_store_rejects_saves_but_allows_reads() -> anyhow::Result<()> {
    let service = setup(None).await?;

    let err = service
        .replace_gallery("home", vec![entry("Asha")])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::External(_)));

    assert!(service.gallery("home").await?.is_empty());
    Ok(())
}
