//! HTTP request handlers for the dossier API.
//!
//! The route layer owns orchestration: it validates uploads, persists
//! files, generates record ids, and sequences record status around the
//! two-phase service calls (analyze/verify, then render). Backend
//! failures are recorded onto the record as `failed` and returned as 500;
//! only validation errors and unknown ids produce other non-2xx responses.

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::upload::{collect_multipart, save_files, validate_extensions, validate_required};
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use dossier_analysis::{
    AnalysisError, ApplicationAnalysisService, ServiceHandle, TranscriptVerificationService,
};
use dossier_domain::{
    ApplicationRecord, RecordId, UploadType, VerificationRecord, APPLICATION_FILE_KEYS,
    TRANSCRIPT_SEPARATE_KEYS, TRANSCRIPT_SINGLE_KEY,
};
use dossier_store::RecordStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Total request body cap for uploads
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Record store owning every application and verification record
    pub store: RecordStore,
    /// Application-analysis service, or the reason it is unavailable
    pub application_service: Arc<ServiceHandle<ApplicationAnalysisService>>,
    /// Transcript-verification service, or the reason it is unavailable
    pub transcript_service: Arc<ServiceHandle<TranscriptVerificationService>>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

/// GET / - endpoint directory
async fn index() -> Json<Value> {
    Json(json!({
        "message": "Dossier Student Application API",
        "endpoints": {
            "health": "/api/health",
            "student_applications": "/api/student-applications/",
            "upload": "/api/student-applications/upload",
            "analyze": "/api/student-applications/analyze/{id}",
            "template": "/api/student-applications/template",
            "transcript_upload": "/api/student-applications/transcript/upload",
            "transcript_verify": "/api/student-applications/transcript/verify/{id}",
        },
    }))
}

/// GET /api/health - liveness check
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Dossier Student Application API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/student-applications/ - list all applications
async fn list_applications(State(state): State<AppState>) -> Json<Value> {
    let applications = state.store.applications();
    Json(json!({
        "count": applications.len(),
        "applications": applications,
    }))
}

/// POST /api/student-applications/upload - upload application files
///
/// Requires all four application file keys with allowed extensions; on
/// success persists the files, creates an `uploaded` record, and returns
/// 201 with follow-up links.
async fn upload_application(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (files, _form) = collect_multipart(&mut multipart).await?;

    validate_extensions(&APPLICATION_FILE_KEYS, &files)?;
    validate_required(&APPLICATION_FILE_KEYS, &files)?;

    let id = RecordId::new();
    let stored = save_files(&state.config.upload_dir, id, &APPLICATION_FILE_KEYS, files).await?;

    let uploaded_files: Value = stored
        .iter()
        .map(|(key, file)| (key.clone(), Value::String(file.filename.clone())))
        .collect::<serde_json::Map<String, Value>>()
        .into();

    let record = ApplicationRecord::new(id, stored);
    state.store.insert_application(record);
    info!("Created application record {}", id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Files uploaded successfully",
            "application_id": id,
            "uploaded_files": uploaded_files,
            "next_step": {
                "analyze": format!("/api/student-applications/analyze/{}", id),
                "status": format!("/api/student-applications/{}", id),
            },
        })),
    ))
}

/// POST /api/student-applications/analyze/{id} - run the analysis
async fn analyze_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = RecordId::parse(&id).map_err(|_| ApiError::NotFound("Application not found"))?;
    let Some(record) = state.store.application(&id) else {
        return Err(ApiError::NotFound("Application not found"));
    };

    state
        .store
        .update_application(&id, |r| r.begin_analysis())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match state.application_service.analyze_documents(&record.files).await {
        Ok(result) => {
            state
                .store
                .update_application(&id, |r| r.record_analysis(result.clone()))
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            let summary = state.application_service.generate_structured_summary(&result);
            let updated = state
                .store
                .update_application(&id, |r| r.record_summary(summary.clone()))
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            info!("Analysis completed for application {}", id);
            Ok(Json(json!({
                "message": "Analysis completed successfully",
                "application_id": id,
                "status": updated.status,
                "analysis_summary": summary,
            })))
        }
        Err(error) => {
            let (message, document_texts) = match error {
                AnalysisError::Model {
                    message,
                    document_texts,
                } => (message, Some(document_texts)),
                AnalysisError::Unavailable(reason) => (reason, None),
            };

            warn!("Analysis failed for application {}: {}", id, message);
            let _ = state
                .store
                .update_application(&id, |r| r.record_failure(message.clone()));

            Err(ApiError::AnalysisFailed {
                message,
                document_texts,
            })
        }
    }
}

/// GET /api/student-applications/{id} - fetch one application
async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApplicationRecord>, ApiError> {
    let id = RecordId::parse(&id).map_err(|_| ApiError::NotFound("Application not found"))?;
    state
        .store
        .application(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Application not found"))
}

/// GET /api/student-applications/template - the blank information template
async fn get_template() -> Json<Value> {
    Json(json!({ "template": APPLICATION_TEMPLATE }))
}

/// POST /api/student-applications/transcript/upload - upload transcripts
///
/// The `upload_type` form field selects the required file keys: `single`
/// expects one bilingual `transcript`, `separate` expects the
/// `transcript_zh`/`transcript_en` pair.
async fn upload_transcript(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (files, form) = collect_multipart(&mut multipart).await?;

    let upload_type: UploadType = form
        .get("upload_type")
        .map(String::as_str)
        .unwrap_or("single")
        .parse()
        .map_err(|message| ApiError::InvalidUploadType { message })?;

    let required: Vec<&str> = match upload_type {
        UploadType::Single => vec![TRANSCRIPT_SINGLE_KEY],
        UploadType::Separate => TRANSCRIPT_SEPARATE_KEYS.to_vec(),
    };

    validate_extensions(&required, &files)?;
    validate_required(&required, &files)?;

    let id = RecordId::new();
    let stored = save_files(&state.config.upload_dir, id, &required, files).await?;

    let uploaded_files: Value = stored
        .iter()
        .map(|(key, file)| (key.clone(), Value::String(file.filename.clone())))
        .collect::<serde_json::Map<String, Value>>()
        .into();

    let record = VerificationRecord::new(id, stored, upload_type);
    state.store.insert_verification(record);
    info!("Created verification record {} ({})", id, upload_type.as_str());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transcript files uploaded successfully",
            "verification_id": id,
            "upload_type": upload_type,
            "uploaded_files": uploaded_files,
            "next_step": {
                "verify": format!("/api/student-applications/transcript/verify/{}", id),
                "status": format!("/api/student-applications/transcript/{}", id),
            },
        })),
    ))
}

/// POST /api/student-applications/transcript/verify/{id} - run verification
async fn verify_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = RecordId::parse(&id)
        .map_err(|_| ApiError::NotFound("Transcript verification not found"))?;
    let Some(record) = state.store.verification(&id) else {
        return Err(ApiError::NotFound("Transcript verification not found"));
    };

    state
        .store
        .update_verification(&id, |r| r.begin_verification())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match state
        .transcript_service
        .verify_transcript(&record.files, record.upload_type)
        .await
    {
        Ok(result) => {
            state
                .store
                .update_verification(&id, |r| r.record_verification(result.clone()))
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            let report = state.transcript_service.generate_structured_transcript(&result);
            let updated = state
                .store
                .update_verification(&id, |r| r.record_report(report.clone()))
                .map_err(|e| ApiError::Internal(e.to_string()))?;

            info!("Verification completed for transcript {}", id);
            Ok(Json(json!({
                "message": "Transcript verification completed successfully",
                "verification_id": id,
                "status": updated.status,
                "verification_result": result,
                "structured_result": report,
            })))
        }
        Err(error) => {
            let (message, document_texts) = match error {
                AnalysisError::Model {
                    message,
                    document_texts,
                } => (message, Some(document_texts)),
                AnalysisError::Unavailable(reason) => (reason, None),
            };

            warn!("Verification failed for transcript {}: {}", id, message);
            let _ = state
                .store
                .update_verification(&id, |r| r.record_failure(message.clone()));

            Err(ApiError::AnalysisFailed {
                message,
                document_texts,
            })
        }
    }
}

/// GET /api/student-applications/transcript/{id} - fetch one verification
async fn get_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationRecord>, ApiError> {
    let id = RecordId::parse(&id)
        .map_err(|_| ApiError::NotFound("Transcript verification not found"))?;
    state
        .store
        .verification(&id)
        .map(Json)
        .ok_or(ApiError::NotFound("Transcript verification not found"))
}

/// GET /api/student-applications/transcript - list all verifications
async fn list_verifications(State(state): State<AppState>) -> Json<Value> {
    let verifications = state.store.verifications();
    Json(json!({
        "count": verifications.len(),
        "verifications": verifications,
    }))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> Router {
    let applications = Router::new()
        .route("/", get(list_applications))
        .route("/upload", post(upload_application))
        .route("/analyze/:id", post(analyze_application))
        .route("/template", get(get_template))
        .route("/transcript", get(list_verifications))
        .route("/transcript/upload", post(upload_transcript))
        .route("/transcript/verify/:id", post(verify_transcript))
        .route("/transcript/:id", get(get_verification))
        .route("/:id", get(get_application));

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .nest("/api/student-applications", applications)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Blank application-information template returned by the template endpoint
const APPLICATION_TEMPLATE: &str = r#"# 申请信息梳理模板

---

## 一、 申请人信息 (Applicant Information)

### 1. 基本身份与联络信息
- **姓名/性别**: `[请填写]`
- **出生日期**: `[年-月-日]`
- **护照号码 (或身份证号码)**: `[请填写]`
- **护照签发/过期日期**: `[签发日期] / [过期日期]`
- **联系电话**: `[请填写]`
- **申请邮箱**: `[请填写]`
- **密码**: `[请填写]`
- **国内家庭住址**: `[请填写详细地址]` (邮编: `[请填写]`)

### 2. 教育背景
- **所在院校**: `[请填写]`
- **就读专业**: `[请填写]`
- **就读时间**: `[起始年月]` 至 `[结束年月]`
- **预计学位**: `[请填写]`
- **绩点 (GPA)**: `[绩点]` / `[总分]`

### 3. 语言成绩
- **考试类型**: `[如：雅思/托福]`
- **考试日期**: `[请填写]`
- **Reference Number**: `[请填写]`
- **总分**: `[分数]`
  - **听力**: `[分数]`
  - **阅读**: `[分数]`
  - **写作**: `[分数]`
  - **口语**: `[分数]`

### 4. 实习或全职工作信息
- **第一段经历**
  - **公司名称**: `[请填写]`
  - **公司地址**: `[请填写]`
  - **岗位名称**: `[请填写]`
  - **工作时间**: `[起始年月]` 至 `[结束年月]`
  - **工作内容描述**: `[请填写]`

- **第二段经历**
  - **公司名称**: `[请填写]`
  - **公司地址**: `[请填写]`
  - **岗位名称**: `[请填写]`
  - **工作时间**: `[起始年月]` 至 `[结束年月]`
  - **工作内容描述**: `[请填写]`

---

## 二、 推荐人信息 (Recommender Information)

### 推荐人 1
- **姓名**: `[请填写]`
- **职称**: `[请填写]`
- **与申请人关系**: `[请填写]`
- **所在单位**: `[请填写]`
- **单位地址**: `[请填写详细地址]` (邮编: `[请填写]`)
- **邮箱**: `[请填写]`
- **联系电话**: `[请填写]`

### 推荐人 2
- **姓名**: `[请填写]`
- **职称**: `[请填写]`
- **与申请人关系**: `[请填写]`
- **所在单位**: `[请填写]`
- **单位地址**: `[请填写详细地址]` (邮编: `[请填写]`)
- **邮箱**: `[请填写]`
- **联系电话**: `[请填写]`
"#;
