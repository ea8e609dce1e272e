use secrecy::SecretString;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub web_server_host: String,
    pub web_server_port: u16,
    pub gemini_api_key: SecretString,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub pool_file: String,
    pub questions_per_round: usize,
    pub pool_cap: usize,
    pub pool_low_water: usize,
    pub feedback_delay_ms: u64,
    pub first_load_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1999),
            gemini_api_key: SecretString::from(
                env::var("GEMINI_API_KEY").unwrap_or_else(|_| String::new()),
            ),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            pool_file: env::var("POOL_FILE").unwrap_or_else(|_| "question_pool.json".to_string()),
            questions_per_round: env::var("QUESTIONS_PER_ROUND")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(4),
            pool_cap: env::var("POOL_CAP")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(200),
            pool_low_water: env::var("POOL_LOW_WATER")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(8),
            feedback_delay_ms: env::var("FEEDBACK_DELAY_MS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(1000),
            first_load_timeout_secs: env::var("FIRST_LOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(8),
        }
    }

    /// Validate that production-critical configuration is set.
    /// Panics if the generator cannot possibly work.
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.gemini_api_key.expose_secret().is_empty() {
            panic!("FATAL: GEMINI_API_KEY is not set! Question generation will always fail.");
        }

        if self.questions_per_round == 0 {
            panic!("FATAL: QUESTIONS_PER_ROUND must be at least 1.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 1999,
            gemini_api_key: SecretString::from("test_api_key".to_string()),
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_base_url: "http://localhost:9".to_string(),
            pool_file: "test_pool.json".to_string(),
            questions_per_round: 4,
            pool_cap: 200,
            pool_low_water: 8,
            feedback_delay_ms: 10,
            first_load_timeout_secs: 1,
        }
    }
}
