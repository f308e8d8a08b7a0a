use std::env;

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Repository the issue pages and feedback queries point at
#[derive(Debug, Clone, PartialEq)]
pub struct IssuesRepo {
    pub owner: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environment configuration
    pub environment: Environment,

    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Gateway configuration
    pub app_id: String,
    pub gateway_origin: String, // Host only, e.g. serve.onegraph.com
    pub server_side_access_token: Option<String>,
    pub jwt_shared_secret: Option<String>,

    // Feedback and issue pages
    pub feedback_repo_id: Option<String>,
    pub issues_repo: IssuesRepo,

    // Setup wizard has been run against the hosting project
    pub setup_wizard_completed: bool,

    // HTTP client timeout configuration (in seconds)
    pub http_connect_timeout_secs: u64,
    pub http_request_timeout_secs: u64,

    // JWKS cache configuration (in seconds)
    pub jwks_cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = match var("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        // Required variables
        let app_id = var("GATEWAY_APP_ID")
            .ok_or_else(|| anyhow::anyhow!("GATEWAY_APP_ID environment variable is required"))?;

        // Accept either a bare host or a full origin; keep the host part
        let gateway_origin = var("GATEWAY_ORIGIN")
            .map(|origin| normalize_origin(&origin))
            .transpose()?
            .unwrap_or_else(|| "serve.onegraph.com".to_string());

        // Optional variables
        let server_side_access_token = var("GATEWAY_SERVER_SIDE_ACCESS_TOKEN");
        let jwt_shared_secret = var("GATEWAY_JWT_SHARED_SECRET");
        let feedback_repo_id = var("FEEDBACK_REPO_ID");

        let issues_repo = IssuesRepo {
            owner: var("ISSUES_REPO_OWNER").unwrap_or_else(|| "sgrove".to_string()),
            name: var("ISSUES_REPO_NAME")
                .unwrap_or_else(|| "nextjs-auth-guardian-starterkit".to_string()),
        };

        let setup_wizard_completed = var("SETUP_WIZARD_COMPLETED")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let server_host = var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let server_port = var("SERVER_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let http_connect_timeout_secs = var("HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        let http_request_timeout_secs = var("HTTP_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let jwks_cache_ttl_secs = var("JWKS_CACHE_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(3600);

        Ok(Config {
            environment,
            server_host,
            server_port,
            app_id,
            gateway_origin,
            server_side_access_token,
            jwt_shared_secret,
            feedback_repo_id,
            issues_repo,
            setup_wizard_completed,
            http_connect_timeout_secs,
            http_request_timeout_secs,
            jwks_cache_ttl_secs,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get cookie security flags based on environment
    pub fn cookie_secure_flag(&self) -> &str {
        if self.is_production() {
            "; Secure"
        } else {
            ""
        }
    }

    /// Whether pages that read with the server-side token can work at all
    pub fn has_server_side_access_token(&self) -> bool {
        self.server_side_access_token.is_some()
    }

    /// GraphQL endpoint, without the app_id query parameter
    pub fn graphql_url(&self) -> String {
        format!("https://{}/graphql", self.gateway_origin)
    }

    /// JWKS endpoint used to verify RS256 session tokens
    pub fn jwks_url(&self) -> String {
        format!(
            "https://{}/app/{}/.well-known/jwks.json",
            self.gateway_origin, self.app_id
        )
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Reduce `https://host[:port]/...` or `host` to `host[:port]`
fn normalize_origin(origin: &str) -> anyhow::Result<String> {
    let origin = origin.trim().trim_end_matches('/');
    if !origin.contains("://") {
        return Ok(origin.to_string());
    }

    let parsed = url::Url::parse(origin)
        .map_err(|e| anyhow::anyhow!("GATEWAY_ORIGIN is not a valid URL: {}", e))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("GATEWAY_ORIGIN has no host"))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
