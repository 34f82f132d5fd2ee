use serde::Deserialize;

use crate::nutrition::usda;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsdaConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
    pub usda: Option<UsdaConfig>,
    pub trust_reported_calories: bool,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "mealmacro"),
            audience: env_or("JWT_AUDIENCE", "mealmacro-users"),
        };
        let gemini = GeminiConfig {
            api_key: env_opt("GEMINI_API_KEY"),
            model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
            base_url: env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
        };
        let usda = env_opt("USDA_API_KEY").map(|api_key| UsdaConfig {
            api_key,
            base_url: env_or("USDA_BASE_URL", usda::DEFAULT_BASE_URL),
        });
        let trust_reported_calories = std::env::var("TRUST_REPORTED_CALORIES")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(true);
        Ok(Self {
            database_url,
            jwt,
            gemini,
            usda,
            trust_reported_calories,
        })
    }
}
