// Package identity from Cargo metadata

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name/version`, sent as the HTTP User-Agent.
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// MQTT client id used when none is configured.
pub fn default_client_id(host_uuid: &str) -> String {
    format!("{}-{}", NAME, host_uuid)
}
