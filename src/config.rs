use std::{env, fmt::Display, str::FromStr};

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub public_url: String,
}

impl Config {
    pub fn load() -> Self {
        let port: u16 = try_load("PORT", "5001");
        Self {
            database_url: try_load("DATABASE_URL", "postgresql://localhost/qna_db"),
            public_url: try_load("PUBLIC_URL", &format!("http://localhost:{port}")),
            port,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
