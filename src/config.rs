use std::env;
use std::time::Duration;

/// Default browser-like user agent sent to the marketplace; scrapes with
/// the stock reqwest UA get served a bot-wall page without prices.
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_FROM_EMAIL: &str = "Price Alert <onboarding@resend.dev>";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Seconds between scheduled check cycles.
    pub check_interval_secs: u64,
    /// Pacing delay between products within one cycle.
    pub item_delay_secs: u64,
    /// Upper bound on a single page fetch.
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    /// Resend API key; alerts are logged but not delivered when unset.
    pub resend_api_key: Option<String>,
    pub alert_from_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let check_interval_secs = env::var("CHECK_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?;
        let item_delay_secs = env::var("ITEM_DELAY_SECS")
            .unwrap_or_else(|_| "2".to_string())
            .parse()?;
        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        let user_agent = env::var("SCRAPER_USER_AGENT")
            .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        let resend_api_key = env::var("RESEND_API_KEY").ok();
        let alert_from_email = env::var("ALERT_FROM_EMAIL")
            .unwrap_or_else(|_| DEFAULT_FROM_EMAIL.to_string());

        Ok(Config {
            database_url,
            server_host,
            server_port,
            check_interval_secs,
            item_delay_secs,
            fetch_timeout_secs,
            user_agent,
            resend_api_key,
            alert_from_email,
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn item_delay(&self) -> Duration {
        Duration::from_secs(self.item_delay_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
