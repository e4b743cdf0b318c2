pub mod dto;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const UNITS_TIMEOUT: Duration = Duration::from_secs(10);
pub const COURSES_TIMEOUT: Duration = Duration::from_secs(8);
pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct PartnerConfig {
    pub base_url: String,
}

impl PartnerConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let base_url = env::var("PARTNER_BASE_URL")
            .map_err(|_| AppError::BadRequest("PARTNER_BASE_URL is not set".to_string()))?;
        Ok(Self { base_url })
    }
}

#[async_trait]
pub trait PartnerClient: Send + Sync {
    async fn units_by_city(
        &self,
        institution: &str,
        state: &str,
        city: &str,
    ) -> Result<Vec<dto::PartnerUnit>, AppError>;

    async fn courses_by_unit(
        &self,
        institution: &str,
        unit_id: i64,
    ) -> Result<Vec<dto::PartnerRow>, AppError>;

    async fn course_detail(
        &self,
        institution: &str,
        sku: &str,
        unit_id: i64,
        admission_form: Option<&str>,
    ) -> Result<Option<dto::PartnerCourseDetail>, AppError>;
}

pub struct PartnerHttpClient {
    client: Client,
    config: PartnerConfig,
}

impl PartnerHttpClient {
    pub fn new(config: PartnerConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::BadRequest(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<Option<T>, AppError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest("partner", &e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Partner API error {}: {}", status, body)));
        }

        let body_text = response.text().await.unwrap_or_default();
        serde_json::from_str::<T>(&body_text)
            .map(Some)
            .map_err(|e| {
                tracing::error!("Failed to parse partner response: {}", e);
                AppError::Upstream(format!("Failed to parse partner response: {}", e))
            })
    }
}

#[async_trait]
impl PartnerClient for PartnerHttpClient {
    async fn units_by_city(
        &self,
        institution: &str,
        state: &str,
        city: &str,
    ) -> Result<Vec<dto::PartnerUnit>, AppError> {
        let query = [
            ("instituicao", institution.to_string()),
            ("uf", state.to_string()),
            ("cidade", city.to_string()),
        ];
        let units = self
            .get_json("vestibular/unidades", &query, UNITS_TIMEOUT)
            .await?
            .unwrap_or_default();
        Ok(units)
    }

    async fn courses_by_unit(
        &self,
        institution: &str,
        unit_id: i64,
    ) -> Result<Vec<dto::PartnerRow>, AppError> {
        let query = [
            ("instituicao", institution.to_string()),
            ("unidade", unit_id.to_string()),
        ];
        let rows = self
            .get_json("vestibular/cursos", &query, COURSES_TIMEOUT)
            .await?
            .unwrap_or_default();
        Ok(rows)
    }

    async fn course_detail(
        &self,
        institution: &str,
        sku: &str,
        unit_id: i64,
        admission_form: Option<&str>,
    ) -> Result<Option<dto::PartnerCourseDetail>, AppError> {
        let mut query = vec![
            ("instituicao", institution.to_string()),
            ("codigoCurso", sku.to_string()),
            ("unidade", unit_id.to_string()),
        ];
        if let Some(form) = admission_form {
            query.push(("formaIngresso", form.to_string()));
        }
        self.get_json("vestibular/curso", &query, DETAIL_TIMEOUT).await
    }
}

pub struct NoopPartnerClient;

#[async_trait]
impl PartnerClient for NoopPartnerClient {
    async fn units_by_city(
        &self,
        _institution: &str,
        _state: &str,
        _city: &str,
    ) -> Result<Vec<dto::PartnerUnit>, AppError> {
        Ok(Vec::new())
    }

    async fn courses_by_unit(
        &self,
        _institution: &str,
        _unit_id: i64,
    ) -> Result<Vec<dto::PartnerRow>, AppError> {
        Ok(Vec::new())
    }

    async fn course_detail(
        &self,
        _institution: &str,
        _sku: &str,
        _unit_id: i64,
        _admission_form: Option<&str>,
    ) -> Result<Option<dto::PartnerCourseDetail>, AppError> {
        Ok(None)
    }
}
