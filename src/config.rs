use crate::constants::*;
use std::env;

pub struct Config {
    pub workers: usize,
    pub bind_address: String,
    pub timeout: u64,
    pub max_payload_size: Option<usize>,
}

fn normalize_bind_address(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.parse::<u16>().is_ok() {
        format!("0.0.0.0:{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            workers: num_cpus::get() * 2,
            bind_address: "0.0.0.0:3000".to_string(),
            timeout: 30,
            max_payload_size: None,
        }
    }

    pub fn from_env() -> Result<Self, String> {
        let workers = env::var(ENV_WORKERS)
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .unwrap_or(0);
        let workers = if workers == 0 { num_cpus::get() * 2 } else { workers };

        let bind_address_raw = env::var(ENV_BIND).unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = normalize_bind_address(&bind_address_raw);

        let timeout = env::var(ENV_TIMEOUT)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let max_payload_size = match env::var(ENV_MAX_PAYLOAD_SIZE) {
            Ok(s) => Some(
                s.parse::<usize>()
                    .map_err(|_| format!("Invalid {}", ENV_MAX_PAYLOAD_SIZE))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            workers,
            bind_address,
            timeout,
            max_payload_size,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
