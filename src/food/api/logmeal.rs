use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

use super::traits::NutritionAnalyzer;
use crate::food::analysis::nutrition::normalize_nutrition;
use crate::food::config::LogMealConfig;
use crate::food::error::AnalysisError;
use crate::food::models::{CapturedImage, NutritionRecord};

const UPLOAD_FILE_NAME: &str = "photo.jpg";

/// Client for the LogMeal recognition API. Every `analyze` call is a fresh
/// segmentation upload followed by a nutrition lookup.
#[derive(Debug, Clone)]
pub struct LogMealClient {
    config: LogMealConfig,
    client: Client,
}

impl LogMealClient {
    pub fn new(config: LogMealConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn read_image(&self, image: &CapturedImage) -> Result<Vec<u8>, AnalysisError> {
        let path = image
            .local_path()
            .ok_or_else(|| AnalysisError::InvalidImage(format!("unsupported uri '{}'", image.uri)))?;

        tokio::fs::read(&path)
            .await
            .map_err(|e| AnalysisError::InvalidImage(format!("{}: {}", path.display(), e)))
    }

    /// Step 1: upload the image and return the opaque `imageId`.
    async fn segment(&self, image: &CapturedImage, bytes: Vec<u8>) -> Result<Value, AnalysisError> {
        let part = Part::bytes(bytes)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(&image.mime_type)?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(self.config.segmentation_url())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Segmentation request failed: Status {}, Body: {}", status, body);
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let data: Value = response.json().await?;
        match data.get("imageId") {
            Some(id) if is_usable_id(id) => Ok(id.clone()),
            _ => Err(AnalysisError::NoImageId),
        }
    }

    /// Step 2: fetch the nutrition document for a segmented image.
    async fn nutritional_info(&self, image_id: &Value) -> Result<Value, AnalysisError> {
        let response = self
            .client
            .post(self.config.nutrition_url())
            .bearer_auth(&self.config.api_key)
            .json(&json!({ "imageId": image_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Nutrition request failed: Status {}, Body: {}", status, body);
            return Err(AnalysisError::Status(status.as_u16()));
        }

        Ok(response.json().await?)
    }
}

fn is_usable_id(id: &Value) -> bool {
    match id {
        Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

#[async_trait]
impl NutritionAnalyzer for LogMealClient {
    async fn analyze(&self, image: &CapturedImage) -> Result<NutritionRecord, AnalysisError> {
        let bytes = self.read_image(image).await?;
        info!("Uploading {} ({} bytes) for segmentation", image.uri, bytes.len());

        let image_id = self.segment(image, bytes).await?;
        debug!("Segmentation returned imageId {}", image_id);

        let data = self.nutritional_info(&image_id).await?;
        let record = normalize_nutrition(&data);
        info!("Recognised '{}' ({} kcal)", record.food_name, record.calories);

        Ok(record)
    }
}
