use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_seconds: i64,
    pub http_addr: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub kakao: KakaoSettings,
    pub naver: NaverSettings,
}

#[derive(Debug, Clone)]
pub struct KakaoSettings {
    pub rest_api_key: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub link_by_verified_email: bool,
}

#[derive(Debug, Clone)]
pub struct NaverSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub link_by_verified_email: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_max_connections = parse_u32_env("DATABASE_MAX_CONNECTIONS", 10)?;

        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }
        let jwt_ttl_seconds: i64 = std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;

        let kakao = KakaoSettings {
            rest_api_key: get_required("KAKAO_REST_API_KEY")
                .context("KAKAO_REST_API_KEY is required")?,
            client_secret: get_optional("KAKAO_CLIENT_SECRET"),
            redirect_uri: std::env::var("KAKAO_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/auth/kakao/callback".to_string()),
            auth_base_url: std::env::var("KAKAO_AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://kauth.kakao.com".to_string()),
            api_base_url: std::env::var("KAKAO_API_BASE_URL")
                .unwrap_or_else(|_| "https://kapi.kakao.com".to_string()),
            link_by_verified_email: parse_bool_env("KAKAO_LINK_BY_EMAIL", false)?,
        };

        let naver = NaverSettings {
            client_id: get_required("NAVER_CLIENT_ID").context("NAVER_CLIENT_ID is required")?,
            client_secret: get_required("NAVER_CLIENT_SECRET")
                .context("NAVER_CLIENT_SECRET is required")?,
            redirect_uri: std::env::var("NAVER_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:3000/auth/naver/callback".to_string()),
            auth_base_url: std::env::var("NAVER_AUTH_BASE_URL")
                .unwrap_or_else(|_| "https://nid.naver.com".to_string()),
            api_base_url: std::env::var("NAVER_API_BASE_URL")
                .unwrap_or_else(|_| "https://openapi.naver.com".to_string()),
            link_by_verified_email: parse_bool_env("NAVER_LINK_BY_EMAIL", true)?,
        };

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            kakao,
            naver,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u32_env(key: &str, default: u32) -> Result<u32> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u32>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim() {
            "1" | "true" | "TRUE" => Ok(true),
            "0" | "false" | "FALSE" => Ok(false),
            _ => Err(anyhow!("Failed to parse {key}, expecting true/false")),
        },
    }
}
