// Core configuration types
mod core;
mod loader;
mod shared;
mod store;

pub use self::core::{CheckSettings, Configuration};
pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_config, user_config_path,
    LoadedConfig, CONFIG_FILE_NAME,
};
pub use shared::SharedConfig;
pub use store::{ConfigError, ConfigStore};

/// Commented starting point written by `proofcheck init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Proofcheck Configuration

# Language used when the document does not declare one (en, de, fr, es, it, nl, pl, sv, uk)
# default_language = "en"

# Your native language
# mother_tongue = "de"

# Rules to switch off or on (see `proofcheck rules`)
disabled_rules = []
enabled_rules = []

[check]
# Stop waiting for the rule engine after this many seconds (0 = wait forever)
timeout_secs = 0
"#;
