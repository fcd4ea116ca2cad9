pub const ENV_BIND: &str = "IMGCONVERT_BIND";
pub const ENV_TIMEOUT: &str = "IMGCONVERT_TIMEOUT";
pub const ENV_WORKERS: &str = "IMGCONVERT_WORKERS";
pub const ENV_MAX_PAYLOAD_SIZE: &str = "IMGCONVERT_MAX_PAYLOAD_SIZE";
pub const ENV_LOG_LEVEL: &str = "IMGCONVERT_LOG";
