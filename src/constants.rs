//! Common constants used throughout replica.

/// Supported configuration file names, in lookup order
pub const CONFIG_FILES: [&str; 4] = [".replica", ".replica.json", ".replica.yml", ".replica.yaml"];

/// Name of the configuration file written by `replica init`
pub const DEFAULT_CONFIG_FILE: &str = ".replica.json";

/// Location of the published configuration schema
pub const SCHEMA_URL: &str =
    "https://raw.githubusercontent.com/replica-rs/replica/main/replica.schema.json";

/// JSON schema every configuration file is validated against
pub const CONFIG_SCHEMA: &str = include_str!("../replica.schema.json");

/// Ignore patterns written by `replica init`
pub const DEFAULT_IGNORE_PATTERNS: [&str; 2] = [".git", ".git/**"];

/// `item` qualifier that keeps the natural casing of boolean values
pub const CAPITALIZED: &str = "Capitalized";

/// File name of the alias wallet inside the user configuration directory
pub const WALLET_FILE: &str = "wallet";

/// Environment variable overriding the alias wallet location
pub const WALLET_ENV: &str = "REPLICA_WALLET";
