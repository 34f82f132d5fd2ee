use axum::http::StatusCode;
use thiserror::Error;

/// Failures of a fresh AI estimation. None of them are retried here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,
    #[error("AI service rejected the API key: {0}")]
    UpstreamAuth(String),
    #[error("AI service returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("AI service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("AI service returned no content")]
    EmptyResponse,
    #[error("could not parse AI response")]
    Parse,
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::UpstreamAuth(_) => StatusCode::FORBIDDEN,
            AnalysisError::MissingApiKey
            | AnalysisError::Upstream { .. }
            | AnalysisError::Transport(_)
            | AnalysisError::EmptyResponse
            | AnalysisError::Parse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response body for clients. Upstream bodies and transport details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        match self {
            AnalysisError::MissingApiKey => "AI service is not configured",
            AnalysisError::UpstreamAuth(_) => "AI service rejected the API key",
            AnalysisError::Upstream { .. }
            | AnalysisError::Transport(_)
            | AnalysisError::EmptyResponse => "AI service request failed",
            AnalysisError::Parse => "could not parse AI response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            AnalysisError::UpstreamAuth("API_KEY_INVALID".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AnalysisError::MissingApiKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AnalysisError::Upstream { status: 503, body: "overloaded".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_messages_hide_upstream_details() {
        let upstream = AnalysisError::Upstream {
            status: 500,
            body: "internal trace with key=abc".into(),
        };
        assert_eq!(upstream.client_message(), "AI service request failed");
        let auth = AnalysisError::UpstreamAuth("API key abc not valid".into());
        assert!(!auth.client_message().contains("abc"));
        assert_eq!(AnalysisError::Parse.client_message(), "could not parse AI response");
    }
}
