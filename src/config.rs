use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub posthog_host: String,
    pub posthog_project_id: Option<String>,
    pub posthog_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            jwt_expiration: env::var("JWT_EXPIRATION")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            posthog_host: env::var("POSTHOG_HOST")
                .unwrap_or_else(|_| "https://us.posthog.com".to_string()),
            // Missing credentials are not a boot failure; the fetch path reports
            // ConfigMissing and the dashboard renders a "configuration pending" state.
            posthog_project_id: env::var("POSTHOG_PROJECT_ID").ok().filter(|s| !s.is_empty()),
            posthog_api_key: env::var("POSTHOG_API_KEY").ok().filter(|s| !s.is_empty()),
        })
    }
}
