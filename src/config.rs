#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub recovery_ttl_minutes: i64,
}

/// Public nutrition API (service key auth in the query string).
#[derive(Debug, Clone)]
pub struct FoodApiConfig {
    pub base_url: String,
    pub endpoint: String,
    /// Key as issued in URL-encoded form; sent verbatim.
    pub key_encoded: Option<String>,
    /// Raw key; percent-encoded before sending.
    pub key_decoded: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub food: FoodApiConfig,
    pub attendance_utc_offset_hours: i8,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "health-tracker".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "health-tracker-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60 * 24),
            recovery_ttl_minutes: env_parse("JWT_RECOVERY_TTL_MINUTES").unwrap_or(15),
        };
        let food = FoodApiConfig {
            base_url: std::env::var("FOOD_API_BASE_URL")
                .unwrap_or_else(|_| "https://apis.data.go.kr".into()),
            endpoint: std::env::var("FOOD_API_ENDPOINT")
                .unwrap_or_else(|_| "/1471000/FoodNtrCpntDbInfo02/getFoodNtrCpntDbInq02".into()),
            key_encoded: env_non_blank("FOOD_API_KEY_ENCODED"),
            key_decoded: env_non_blank("FOOD_API_KEY_DECODED"),
        };
        if food.key_encoded.is_none() && food.key_decoded.is_none() {
            anyhow::bail!("FOOD_API_KEY_ENCODED or FOOD_API_KEY_DECODED must be set");
        }
        let attendance_utc_offset_hours = env_parse("ATTENDANCE_UTC_OFFSET_HOURS").unwrap_or(9);
        Ok(Self {
            database_url,
            jwt,
            food,
            attendance_utc_offset_hours,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
