//! Transcript verification service

use crate::documents::{extract_document_texts, truncate_snapshot};
use crate::error::AnalysisError;
use crate::fields::{nested, text_or, NOT_PROVIDED};
use crate::parser::{parse_model_response, ParsedResponse};
use crate::prompt::{prepare_transcript_content, TRANSCRIPT_PROMPT};
use crate::ServiceHandle;
use chrono::Utc;
use dossier_domain::{StoredFile, UploadType};
use dossier_llm::{GenerationConfig, GenerativeClient};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Verifies uploaded academic transcripts with a generative model
///
/// Unlike application analysis, verification walks an ordered list of
/// candidate models, and a successful parse is stamped with a `metadata`
/// object recording how the verification ran.
pub struct TranscriptVerificationService {
    client: Arc<dyn GenerativeClient>,
    models: Vec<String>,
    config: GenerationConfig,
}

impl TranscriptVerificationService {
    /// Create a new service over the given client and candidate models
    pub fn new(client: Arc<dyn GenerativeClient>, models: Vec<String>) -> Self {
        Self {
            client,
            models,
            config: GenerationConfig::transcript(),
        }
    }

    /// Extract transcript text, prompt the model chain, parse, and stamp
    pub async fn verify_transcript(
        &self,
        files: &BTreeMap<String, StoredFile>,
        upload_type: UploadType,
    ) -> Result<Value, AnalysisError> {
        let started = Instant::now();

        info!(
            "Extracting text from {} transcript files ({})",
            files.len(),
            upload_type.as_str()
        );
        let texts = extract_document_texts(files);

        let content = prepare_transcript_content(&texts, upload_type);
        debug!("Prompt content length: {} chars", content.len());

        let generation = self
            .client
            .generate_with_fallback(&self.models, TRANSCRIPT_PROMPT, &content, &self.config)
            .await
            .map_err(|e| AnalysisError::Model {
                message: e.to_string(),
                document_texts: truncate_snapshot(&texts),
            })?;

        let source_files: Vec<String> = files.keys().cloned().collect();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match parse_model_response(&generation.text) {
            ParsedResponse::Structured(Value::Object(mut result)) => {
                result.insert(
                    "metadata".to_string(),
                    json!({
                        "document_type": upload_type.document_type(),
                        "source_files": source_files,
                        "verified_at": Utc::now().to_rfc3339(),
                        "model_used": generation.model,
                        "processing_time_ms": elapsed_ms,
                        "status": "completed",
                    }),
                );
                Ok(Value::Object(result))
            }
            ParsedResponse::Structured(other) => {
                warn!("Model returned JSON that is not an object");
                Ok(json!({
                    "raw_response": other.to_string(),
                    "error": "Failed to parse JSON response",
                    "metadata": {
                        "status": "failed",
                        "error": "response is not a JSON object",
                    },
                }))
            }
            ParsedResponse::Unparsed { mut payload, error } => {
                payload["metadata"] = json!({
                    "status": "failed",
                    "error": error,
                });
                Ok(payload)
            }
        }
    }

    /// Render the verification result as a Markdown report
    pub fn generate_structured_transcript(&self, result: &Value) -> String {
        render_transcript_report(result)
    }
}

impl ServiceHandle<TranscriptVerificationService> {
    /// Verify a transcript, or report the configuration failure
    pub async fn verify_transcript(
        &self,
        files: &BTreeMap<String, StoredFile>,
        upload_type: UploadType,
    ) -> Result<Value, AnalysisError> {
        match self {
            ServiceHandle::Available(service) => {
                service.verify_transcript(files, upload_type).await
            }
            ServiceHandle::Unavailable { reason } => {
                Err(AnalysisError::Unavailable(reason.clone()))
            }
        }
    }

    /// Render a report, or report the configuration failure
    pub fn generate_structured_transcript(&self, result: &Value) -> String {
        match self {
            ServiceHandle::Available(service) => service.generate_structured_transcript(result),
            ServiceHandle::Unavailable { reason } => reason.clone(),
        }
    }
}

/// Render a verification result as an ordered list of Markdown sections
///
/// Pure formatting with a `未提供` default per field; sections for the
/// semesters and metadata only appear when that data is present.
pub fn render_transcript_report(result: &Value) -> String {
    let student = nested(result, "student_info");
    let summary = nested(result, "academic_summary");

    let mut sections = Vec::new();

    sections.push(format!(
        "# 成绩单认证报告

## 一、 学生基本信息
- **中文姓名**: {name_zh}
- **英文姓名**: {name_en}
- **学号**: {student_id}
- **院校**: {university}
- **专业**: {major}
- **学位级别**: {degree_level}
- **预计毕业时间**: {graduation_date}
- **总平均绩点 (GPA)**: {overall_gpa} / {gpa_scale}
",
        name_zh = text_or(student, "name_zh", NOT_PROVIDED),
        name_en = text_or(student, "name_en", NOT_PROVIDED),
        student_id = text_or(student, "student_id", NOT_PROVIDED),
        university = text_or(student, "university", NOT_PROVIDED),
        major = text_or(student, "major", NOT_PROVIDED),
        degree_level = text_or(student, "degree_level", NOT_PROVIDED),
        graduation_date = text_or(student, "graduation_date", NOT_PROVIDED),
        overall_gpa = text_or(student, "overall_gpa", NOT_PROVIDED),
        gpa_scale = text_or(student, "gpa_scale", NOT_PROVIDED),
    ));

    if let Some(semesters) = nested(result, "semesters").as_array() {
        if !semesters.is_empty() {
            sections.push("## 二、 学期课程信息".to_string());
            for (idx, semester) in semesters.iter().enumerate() {
                sections.push(render_semester(idx + 1, semester));
            }
        }
    }

    sections.push(format!(
        "## 三、 学业总览
- **总学分**: {total_credits}
- **总课程数**: {total_courses}
- **学业状态**: {academic_standing}
- **认证备注**: {verification_notes}
",
        total_credits = text_or(summary, "total_credits", "0"),
        total_courses = text_or(summary, "total_courses", "0"),
        academic_standing = text_or(summary, "academic_standing", NOT_PROVIDED),
        verification_notes = text_or(summary, "verification_notes", "无"),
    ));

    let metadata = nested(result, "metadata");
    if metadata.as_object().is_some_and(|m| !m.is_empty()) {
        sections.push(format!(
            "## 四、 认证信息
- **认证时间**: {verified_at}
- **使用模型**: {model_used}
- **文档类型**: {document_type}
- **认证状态**: {status}
",
            verified_at = text_or(metadata, "verified_at", NOT_PROVIDED),
            model_used = text_or(metadata, "model_used", NOT_PROVIDED),
            document_type = text_or(metadata, "document_type", NOT_PROVIDED),
            status = text_or(metadata, "status", NOT_PROVIDED),
        ));
    }

    sections.join("\n\n")
}

fn render_semester(number: usize, semester: &Value) -> String {
    let mut section = format!(
        "### 第{number}学期: {name_zh} ({name_en})
- **学年**: {academic_year}
- **学期类型**: {semester_type}
- **时间**: {start_date} 至 {end_date}
- **学期学分**: {total_credits}
- **学期绩点**: {semester_gpa}

**课程列表**:",
        name_zh = text_or(semester, "name_zh", ""),
        name_en = text_or(semester, "name_en", ""),
        academic_year = text_or(semester, "academic_year", NOT_PROVIDED),
        semester_type = text_or(semester, "type", NOT_PROVIDED),
        start_date = text_or(semester, "start_date", NOT_PROVIDED),
        end_date = text_or(semester, "end_date", NOT_PROVIDED),
        total_credits = text_or(semester, "total_credits", "0"),
        semester_gpa = text_or(semester, "semester_gpa", NOT_PROVIDED),
    );

    if let Some(courses) = nested(semester, "courses").as_array() {
        for (idx, course) in courses.iter().enumerate() {
            let course_type = nested(course, "course_type");
            section.push_str(&format!(
                "
{n}. **{name_zh}** ({name_en})
   - **课程代码**: {code}
   - **课程类型**: {type_zh} ({type_en})
   - **学分**: {credits}
   - **成绩**: {grade}
   - **绩点**: {grade_points}",
                n = idx + 1,
                name_zh = text_or(course, "name_zh", ""),
                name_en = text_or(course, "name_en", ""),
                code = text_or(course, "code", NOT_PROVIDED),
                type_zh = text_or(course_type, "zh", ""),
                type_en = text_or(course_type, "en", ""),
                credits = text_or(course, "credits", "0"),
                grade = text_or(course, "grade", NOT_PROVIDED),
                grade_points = text_or(course, "grade_points", NOT_PROVIDED),
            ));
        }
    }

    section
}
