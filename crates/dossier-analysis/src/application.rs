//! Application-document analysis service

use crate::documents::{extract_document_texts, truncate_snapshot};
use crate::error::AnalysisError;
use crate::fields::{nested, text_or, MISSING};
use crate::parser::parse_model_response;
use crate::prompt::{prepare_analysis_content, APPLICATION_PROMPT};
use crate::ServiceHandle;
use dossier_domain::StoredFile;
use dossier_llm::{GenerationConfig, GenerativeClient};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Analyzes a set of uploaded application documents with a generative model
pub struct ApplicationAnalysisService {
    client: Arc<dyn GenerativeClient>,
    models: Vec<String>,
    config: GenerationConfig,
}

impl ApplicationAnalysisService {
    /// Create a new service over the given client and candidate models
    pub fn new(client: Arc<dyn GenerativeClient>, models: Vec<String>) -> Self {
        Self {
            client,
            models,
            config: GenerationConfig::application(),
        }
    }

    /// Extract text from every document, prompt the model, and parse
    ///
    /// A response that is not valid JSON is absorbed into a
    /// `{raw_response, error}` payload and still returned as success; only
    /// a model call that fails outright produces an error, which carries a
    /// truncated snapshot of the texts extracted so far.
    pub async fn analyze_documents(
        &self,
        files: &BTreeMap<String, StoredFile>,
    ) -> Result<Value, AnalysisError> {
        info!("Extracting text from {} documents", files.len());
        let texts = extract_document_texts(files);

        let content = prepare_analysis_content(&texts);
        debug!("Prompt content length: {} chars", content.len());

        let generation = self
            .client
            .generate_with_fallback(&self.models, APPLICATION_PROMPT, &content, &self.config)
            .await
            .map_err(|e| AnalysisError::Model {
                message: e.to_string(),
                document_texts: truncate_snapshot(&texts),
            })?;

        Ok(parse_model_response(&generation.text).into_value())
    }

    /// Render the analysis result as a human-readable Markdown summary
    pub fn generate_structured_summary(&self, result: &Value) -> String {
        render_summary(result)
    }
}

impl ServiceHandle<ApplicationAnalysisService> {
    /// Analyze documents, or report the configuration failure
    pub async fn analyze_documents(
        &self,
        files: &BTreeMap<String, StoredFile>,
    ) -> Result<Value, AnalysisError> {
        match self {
            ServiceHandle::Available(service) => service.analyze_documents(files).await,
            ServiceHandle::Unavailable { reason } => {
                Err(AnalysisError::Unavailable(reason.clone()))
            }
        }
    }

    /// Render a summary, or report the configuration failure
    pub fn generate_structured_summary(&self, result: &Value) -> String {
        match self {
            ServiceHandle::Available(service) => service.generate_structured_summary(result),
            ServiceHandle::Unavailable { reason } => reason.clone(),
        }
    }
}

/// Fill the fixed application-summary template from an analysis result
///
/// Pure formatting: every field reads with a `信息缺失` default, so any
/// result shape, including an empty object, renders without failing.
pub fn render_summary(result: &Value) -> String {
    let applicant = nested(result, "applicant_info");
    let education = nested(result, "education_background");
    let language = nested(result, "language_test");
    let study_period = nested(education, "study_period");
    let gpa = nested(education, "gpa");
    let test_sections = nested(language, "sections");

    format!(
        "# 申请信息梳理模板

---

## 一、 申请人信息 (Applicant Information)

### 1. 基本身份与联络信息
- **姓名/性别**: {name}/{gender}
- **出生日期**: {birth_date}
- **护照号码 (或身份证号码)**: {passport_number}
- **护照签发/过期日期**: {passport_issue_date} / {passport_expiry_date}
- **联系电话**: {phone}
- **申请邮箱**: {email}
- **密码**: {password}
- **国内家庭住址**: {domestic_address} (邮编: {postal_code})

### 2. 教育背景
- **所在院校**: {university}
- **就读专业**: {major}
- **就读时间**: {study_start} 至 {study_end}
- **预计学位**: {expected_degree}
- **绩点 (GPA)**: {gpa_score} / {gpa_scale}

### 3. 语言成绩
- **考试类型**: {test_type}
- **考试日期**: {test_date}
- **Reference Number**: {reference_number}
- **总分**: {total_score}
  - **听力**: {listening}
  - **阅读**: {reading}
  - **写作**: {writing}
  - **口语**: {speaking}

### 4. 实习或全职工作信息
{work_experience}

---

## 二、 推荐人信息 (Recommender Information)

{recommenders}",
        name = text_or(applicant, "name", MISSING),
        gender = text_or(applicant, "gender", MISSING),
        birth_date = text_or(applicant, "birth_date", MISSING),
        passport_number = text_or(applicant, "passport_number", MISSING),
        passport_issue_date = text_or(applicant, "passport_issue_date", MISSING),
        passport_expiry_date = text_or(applicant, "passport_expiry_date", MISSING),
        phone = text_or(applicant, "phone", MISSING),
        email = text_or(applicant, "email", MISSING),
        password = text_or(applicant, "password", MISSING),
        domestic_address = text_or(applicant, "domestic_address", MISSING),
        postal_code = text_or(applicant, "postal_code", MISSING),
        university = text_or(education, "university", MISSING),
        major = text_or(education, "major", MISSING),
        study_start = text_or(study_period, "start_date", MISSING),
        study_end = text_or(study_period, "end_date", MISSING),
        expected_degree = text_or(education, "expected_degree", MISSING),
        gpa_score = text_or(gpa, "score", MISSING),
        gpa_scale = text_or(gpa, "scale", MISSING),
        test_type = text_or(language, "test_type", MISSING),
        test_date = text_or(language, "test_date", MISSING),
        reference_number = text_or(language, "reference_number", MISSING),
        total_score = text_or(language, "total_score", MISSING),
        listening = text_or(test_sections, "listening", MISSING),
        reading = text_or(test_sections, "reading", MISSING),
        writing = text_or(test_sections, "writing", MISSING),
        speaking = text_or(test_sections, "speaking", MISSING),
        work_experience = render_work_experience(nested(result, "work_experience")),
        recommenders = render_recommenders(nested(result, "recommenders")),
    )
}

fn render_work_experience(work_experience: &Value) -> String {
    let entries = match work_experience.as_array() {
        Some(entries) if !entries.is_empty() => entries,
        _ => return "**暂无工作经历信息**".to_string(),
    };

    let sections: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let period = nested(entry, "work_period");
            format!(
                "- **第{n}段经历**
  - **公司名称**: {company_name}
  - **公司地址**: {company_address}
  - **岗位名称**: {position}
  - **工作时间**: {start_date} 至 {end_date}
  - **工作内容描述**: {job_description}",
                n = idx + 1,
                company_name = text_or(entry, "company_name", MISSING),
                company_address = text_or(entry, "company_address", MISSING),
                position = text_or(entry, "position", MISSING),
                start_date = text_or(period, "start_date", MISSING),
                end_date = text_or(period, "end_date", MISSING),
                job_description = text_or(entry, "job_description", MISSING),
            )
        })
        .collect();

    sections.join("\n\n")
}

fn render_recommenders(recommenders: &Value) -> String {
    let entries = match recommenders.as_array() {
        Some(entries) if !entries.is_empty() => entries,
        _ => return "**暂无推荐人信息**".to_string(),
    };

    let sections: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            format!(
                "### 推荐人 {n}
- **姓名**: {name}
- **职称**: {title}
- **与申请人关系**: {relationship}
- **所在单位**: {organization}
- **单位地址**: {organization_address} (邮编: {postal_code})
- **邮箱**: {email}
- **联系电话**: {phone}",
                n = idx + 1,
                name = text_or(entry, "name", MISSING),
                title = text_or(entry, "title", MISSING),
                relationship = text_or(entry, "relationship", MISSING),
                organization = text_or(entry, "organization", MISSING),
                organization_address = text_or(entry, "organization_address", MISSING),
                postal_code = text_or(entry, "postal_code", MISSING),
                email = text_or(entry, "email", MISSING),
                phone = text_or(entry, "phone", MISSING),
            )
        })
        .collect();

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_llm::MockClient;
    use serde_json::json;
    use std::io::Write;

    fn service_with(client: MockClient) -> ApplicationAnalysisService {
        ApplicationAnalysisService::new(Arc::new(client), vec!["gemini-pro".to_string()])
    }

    fn files_with_transcript(dir: &tempfile::TempDir) -> BTreeMap<String, StoredFile> {
        let path = dir.path().join("transcript.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all("Mathematics A; Physics B".as_bytes()).unwrap();

        let mut files = BTreeMap::new();
        files.insert(
            "transcript".to_string(),
            StoredFile::new("transcript.txt", path, Some("text/plain".to_string())),
        );
        files
    }

    #[tokio::test]
    async fn test_analyze_parses_fenced_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = MockClient::new("unused");
        client.push_response("```json\n{\"applicant_info\": {\"name\": \"Li Hua\"}}\n```");
        let service = service_with(client);

        let result = service
            .analyze_documents(&files_with_transcript(&dir))
            .await
            .unwrap();
        assert_eq!(result["applicant_info"]["name"], "Li Hua");
    }

    #[tokio::test]
    async fn test_analyze_absorbs_parse_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = MockClient::new("unused");
        client.push_response("not json");
        let service = service_with(client);

        let result = service
            .analyze_documents(&files_with_transcript(&dir))
            .await
            .unwrap();
        assert_eq!(result["raw_response"], "not json");
        assert_eq!(result["error"], "Failed to parse JSON response");
    }

    #[tokio::test]
    async fn test_analyze_failure_carries_snapshot() {
        let dir = tempfile::TempDir::new().unwrap();
        let client = MockClient::new("unused");
        client.push_error("model offline");
        let service = service_with(client);

        let err = service
            .analyze_documents(&files_with_transcript(&dir))
            .await
            .unwrap_err();
        match err {
            AnalysisError::Model {
                message,
                document_texts,
            } => {
                assert!(message.contains("model offline"));
                assert!(document_texts["transcript"].starts_with("Mathematics"));
            }
            other => panic!("Expected Model error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unavailable_handle_reports_reason() {
        let handle: ServiceHandle<ApplicationAnalysisService> =
            ServiceHandle::unavailable("Generative AI service not initialized");
        let err = handle.analyze_documents(&BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Unavailable(_)));
        assert_eq!(
            handle.generate_structured_summary(&json!({})),
            "Generative AI service not initialized"
        );
    }

    #[test]
    fn test_summary_of_empty_result_uses_placeholders() {
        let summary = render_summary(&json!({}));
        assert!(summary.contains(MISSING));
        assert!(summary.contains("**暂无工作经历信息**"));
        assert!(summary.contains("**暂无推荐人信息**"));
        assert!(summary.starts_with("# 申请信息梳理模板"));
    }

    #[test]
    fn test_summary_renders_repeated_sections() {
        let result = json!({
            "work_experience": [
                {"company_name": "Acme", "position": "Intern"},
                {"company_name": "Globex"}
            ],
            "recommenders": [
                {"name": "Prof. Zhang", "email": "zhang@example.edu"}
            ]
        });
        let summary = render_summary(&result);
        assert!(summary.contains("第1段经历"));
        assert!(summary.contains("第2段经历"));
        assert!(summary.contains("Acme"));
        assert!(summary.contains("### 推荐人 1"));
        assert!(summary.contains("Prof. Zhang"));
    }

    #[test]
    fn test_summary_fills_nested_fields() {
        let result = json!({
            "applicant_info": {"name": "Li Hua", "gender": "女"},
            "education_background": {
                "university": "Tsinghua University",
                "gpa": {"score": "3.8", "scale": "4.0"},
                "study_period": {"start_date": "2020-09", "end_date": "2024-06"}
            }
        });
        let summary = render_summary(&result);
        assert!(summary.contains("**姓名/性别**: Li Hua/女"));
        assert!(summary.contains("**绩点 (GPA)**: 3.8 / 4.0"));
        assert!(summary.contains("2020-09 至 2024-06"));
    }
}
