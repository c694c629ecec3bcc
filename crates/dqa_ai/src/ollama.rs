use dqa_core::error::AppError;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. Strictly limited to `127.0.0.1`; remote
    /// collaborators are not allowed.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let trimmed = base_url.trim_end_matches('/');

        let rejected = || {
            AppError::new(
                "CONFIG_INVALID",
                "Ollama base URL must be localhost (http://127.0.0.1[:port])",
            )
            .with_details(format!("base_url={base_url}"))
        };

        let rest = trimmed.strip_prefix("http://127.0.0.1").ok_or_else(rejected)?;
        if !rest.is_empty() {
            // Only a valid port suffix is allowed; no paths, no host tricks.
            let port = rest.strip_prefix(':').ok_or_else(rejected)?;
            let port: u32 = port.parse().map_err(|_| rejected())?;
            if port == 0 || port > 65_535 {
                return Err(rejected());
            }
        }

        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url)
            .timeout(std::time::Duration::from_millis(800))
            .call();

        match resp {
            Ok(r) if r.status() == 200 => Ok(()),
            Ok(r) => Err(
                AppError::new("GENERATOR_UNAVAILABLE", "Ollama health check failed")
                    .with_details(format!("status={}", r.status())),
            ),
            Err(e) => Err(AppError::new(
                "GENERATOR_UNAVAILABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }
}
