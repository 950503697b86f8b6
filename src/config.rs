use std::env;

/// AppConfig
///
/// Holds the service configuration. Loaded once at startup and immutable afterwards;
/// handlers pull it out of the shared state through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and seed-secret fallbacks.
    pub env: Env,
    // Socket address the HTTP listener binds to.
    pub bind_addr: String,
    // Secret for the seeded `admin` account.
    pub seed_admin_password: String,
    // Secret for the seeded `user` account. The account is skipped when absent.
    pub seed_user_password: Option<String>,
    // Argon2id memory cost in KiB.
    pub hash_memory_kib: u32,
    // Argon2id iteration count.
    pub hash_iterations: u32,
}

/// Env
///
/// Runtime context: local development or a hardened production deployment.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_HASH_MEMORY_KIB: u32 = 19_456;
const DEFAULT_HASH_ITERATIONS: u32 = 2;

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking local configuration for tests. Hashing cost is set to the Argon2
    /// minimum so that suites registering many accounts stay fast.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:0".to_string(),
            seed_admin_password: "adminpass".to_string(),
            seed_user_password: Some("userpass".to_string()),
            hash_memory_kib: 8,
            hash_iterations: 1,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics if `SEED_ADMIN_PASSWORD` is missing in production, or if a numeric
    /// setting cannot be parsed. The process must not start half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("APP_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let hash_memory_kib = parse_u32("HASH_MEMORY_KIB", DEFAULT_HASH_MEMORY_KIB);
        let hash_iterations = parse_u32("HASH_ITERATIONS", DEFAULT_HASH_ITERATIONS);

        match env {
            Env::Local => Self {
                env: Env::Local,
                bind_addr,
                seed_admin_password: env::var("SEED_ADMIN_PASSWORD")
                    .unwrap_or_else(|_| "adminpass".to_string()),
                seed_user_password: Some(
                    env::var("SEED_USER_PASSWORD").unwrap_or_else(|_| "userpass".to_string()),
                ),
                hash_memory_kib,
                hash_iterations,
            },
            Env::Production => Self {
                env: Env::Production,
                bind_addr,
                seed_admin_password: env::var("SEED_ADMIN_PASSWORD")
                    .expect("FATAL: SEED_ADMIN_PASSWORD must be set in production."),
                seed_user_password: env::var("SEED_USER_PASSWORD").ok(),
                hash_memory_kib,
                hash_iterations,
            },
        }
    }
}

fn parse_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("FATAL: {key} must be a non-negative integer, got {raw:?}")),
        Err(_) => default,
    }
}
