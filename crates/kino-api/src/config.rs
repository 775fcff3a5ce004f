const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Connection settings for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.into(),
            token: None,
            user_agent: concat!("kino/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

impl ClientConfig {
    /// Read `KINO_API_URL` and `KINO_TOKEN`. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Self {
        let base_url = std::env::var("KINO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let token = std::env::var("KINO_TOKEN").ok().filter(|t| !t.is_empty());
        Self {
            base_url,
            token,
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}
