//! Inference gateway. Turns resume and job text into task prompts and returns the
//! model's raw reply. Every task is one `generate` call; nothing is cached or retried.

use std::sync::Arc;

use tracing::info;

use crate::analysis::prompts::{grade_prompt, match_prompt, optimize_prompt, parse_job_prompt};
use crate::llm_client::{GenerateRequest, GenerationOptions, InferenceError, ModelBackend};

/// Scoring tasks use a low temperature to keep grades stable between runs.
pub const SCORING_TEMPERATURE: f32 = 0.3;
/// Extraction is stricter still.
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// The analysis tasks the gateway knows how to prompt for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTask {
    Grade,
    Optimize,
    ParseJob,
    Match,
}

impl AnalysisTask {
    pub fn temperature(self) -> f32 {
        match self {
            AnalysisTask::ParseJob => EXTRACTION_TEMPERATURE,
            AnalysisTask::Grade | AnalysisTask::Optimize | AnalysisTask::Match => {
                SCORING_TEMPERATURE
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisTask::Grade => "grade",
            AnalysisTask::Optimize => "optimize",
            AnalysisTask::ParseJob => "parse_job",
            AnalysisTask::Match => "match",
        }
    }
}

/// Holds the model backend and the model name every task runs against.
#[derive(Clone)]
pub struct InferenceGateway {
    backend: Arc<dyn ModelBackend>,
    model: String,
}

impl InferenceGateway {
    pub fn new(backend: Arc<dyn ModelBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn check_connection(&self) -> bool {
        self.backend.check_connection().await
    }

    pub async fn list_models(&self) -> Vec<String> {
        self.backend.list_models().await
    }

    pub async fn grade_resume(
        &self,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<String, InferenceError> {
        self.run(AnalysisTask::Grade, grade_prompt(resume_text, job_description))
            .await
    }

    pub async fn optimize_resume(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, InferenceError> {
        self.run(
            AnalysisTask::Optimize,
            optimize_prompt(resume_text, job_description),
        )
        .await
    }

    pub async fn parse_job_description(
        &self,
        job_description: &str,
    ) -> Result<String, InferenceError> {
        self.run(AnalysisTask::ParseJob, parse_job_prompt(job_description))
            .await
    }

    pub async fn match_resume_to_job(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, InferenceError> {
        self.run(AnalysisTask::Match, match_prompt(resume_text, job_description))
            .await
    }

    async fn run(&self, task: AnalysisTask, prompt: String) -> Result<String, InferenceError> {
        info!(
            task = task.label(),
            model = %self.model,
            prompt_chars = prompt.len(),
            "Running analysis task"
        );

        self.backend
            .generate(GenerateRequest {
                model: self.model.clone(),
                prompt,
                stream: None,
                options: Some(GenerationOptions {
                    temperature: Some(task.temperature()),
                    ..Default::default()
                }),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records every request and answers with a canned reply.
    #[derive(Default)]
    struct RecordingBackend {
        requests: Mutex<Vec<GenerateRequest>>,
    }

    #[async_trait]
    impl ModelBackend for RecordingBackend {
        async fn check_connection(&self) -> bool {
            true
        }

        async fn list_models(&self) -> Vec<String> {
            vec!["llama3.2".to_string()]
        }

        async fn generate(&self, request: GenerateRequest) -> Result<String, InferenceError> {
            self.requests.lock().unwrap().push(request);
            Ok("{}".to_string())
        }
    }

    fn gateway() -> (Arc<RecordingBackend>, InferenceGateway) {
        let backend = Arc::new(RecordingBackend::default());
        let gateway = InferenceGateway::new(backend.clone(), "llama3.2");
        (backend, gateway)
    }

    fn last_temperature(backend: &RecordingBackend) -> f32 {
        backend
            .requests
            .lock()
            .unwrap()
            .last()
            .and_then(|r| r.options.as_ref())
            .and_then(|o| o.temperature)
            .unwrap()
    }

    #[tokio::test]
    async fn test_each_task_uses_its_temperature() {
        let (backend, gateway) = gateway();

        gateway.grade_resume("resume", None).await.unwrap();
        assert_eq!(last_temperature(&backend), 0.3);

        gateway.optimize_resume("resume", "jd").await.unwrap();
        assert_eq!(last_temperature(&backend), 0.3);

        gateway.parse_job_description("jd").await.unwrap();
        assert_eq!(last_temperature(&backend), 0.2);

        gateway.match_resume_to_job("resume", "jd").await.unwrap();
        assert_eq!(last_temperature(&backend), 0.3);
    }

    #[tokio::test]
    async fn test_requests_carry_configured_model_and_prompt() {
        let (backend, gateway) = gateway();

        let reply = gateway
            .match_resume_to_job("Rust, Go, 6 years", "Needs Rust")
            .await
            .unwrap();
        assert_eq!(reply, "{}");

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "llama3.2");
        assert!(requests[0].prompt.contains("Rust, Go, 6 years"));
        assert!(requests[0].prompt.contains("Needs Rust"));
        assert_eq!(requests[0].stream, None);
    }

    #[tokio::test]
    async fn test_gateway_is_stateless_between_calls() {
        let (backend, gateway) = gateway();

        gateway.grade_resume("first resume", None).await.unwrap();
        gateway.grade_resume("second resume", None).await.unwrap();

        let requests = backend.requests.lock().unwrap();
        assert!(!requests[1].prompt.contains("first resume"));
    }

    #[tokio::test]
    async fn test_connection_queries_delegate_to_backend() {
        let (_, gateway) = gateway();
        assert!(gateway.check_connection().await);
        assert_eq!(gateway.list_models().await, vec!["llama3.2".to_string()]);
        assert_eq!(gateway.model(), "llama3.2");
    }
}
