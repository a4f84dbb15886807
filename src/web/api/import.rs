//! Spreadsheet import endpoints
//!
//! Each step takes the same multipart form: `file`, `year` and, for
//! validate and execute, a `mapping` JSON object. The sheet is parsed again
//! on every step so the server keeps no upload state.

use axum::extract::{Multipart, State};

use crate::error::MoneybagsError;
use crate::import::ParsedSheet;
use crate::services::import::{CategoryMapping, ImportSummary, ImportValidation};
use crate::services::ImportService;
use crate::web::response::{ok, ApiError, ApiResult};
use crate::web::AppState;

/// Fields of an import upload
#[derive(Debug, Default)]
pub struct ImportForm {
    pub file: Vec<u8>,
    pub year: i32,
    pub mapping: Option<CategoryMapping>,
}

impl ImportForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let bad_form = |e: String| ApiError(MoneybagsError::Validation(e));

        let mut file = None;
        let mut year = None;
        let mut mapping = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_form(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let bytes = field.bytes().await.map_err(|e| bad_form(e.to_string()))?;
                    file = Some(bytes.to_vec());
                }
                "year" => {
                    let text = field.text().await.map_err(|e| bad_form(e.to_string()))?;
                    let parsed = text
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| bad_form(format!("Invalid year '{}'", text.trim())))?;
                    year = Some(parsed);
                }
                "mapping" => {
                    let text = field.text().await.map_err(|e| bad_form(e.to_string()))?;
                    let parsed: CategoryMapping = serde_json::from_str(&text)
                        .map_err(|e| bad_form(format!("Invalid mapping: {}", e)))?;
                    mapping = Some(parsed);
                }
                _ => {}
            }
        }

        Ok(Self {
            file: file.ok_or_else(|| bad_form("Missing file".into()))?,
            year: year.ok_or_else(|| bad_form("Missing year".into()))?,
            mapping,
        })
    }

    fn mapping(&self) -> Result<&CategoryMapping, ApiError> {
        self.mapping
            .as_ref()
            .ok_or_else(|| ApiError(MoneybagsError::Validation("Missing mapping".into())))
    }
}

pub async fn parse(State(state): State<AppState>, multipart: Multipart) -> ApiResult<ParsedSheet> {
    let form = ImportForm::read(multipart).await?;
    ok(ImportService::new(&state.storage)
        .parse(&form.file, form.year)
        .await?)
}

pub async fn validate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<ImportValidation> {
    let form = ImportForm::read(multipart).await?;
    let service = ImportService::new(&state.storage);
    let parsed = service.parse(&form.file, form.year).await?;
    ok(service.validate(&parsed, form.mapping()?).await?)
}

pub async fn execute(State(state): State<AppState>, multipart: Multipart) -> ApiResult<ImportSummary> {
    let form = ImportForm::read(multipart).await?;
    let service = ImportService::new(&state.storage);
    let parsed = service.parse(&form.file, form.year).await?;
    ok(service.execute(&parsed, form.mapping()?).await?)
}
