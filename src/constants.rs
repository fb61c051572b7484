//! Global constants used throughout the selfup codebase.
//!
//! Network defaults and environment variable names that are shared by the
//! library, the CLI and the tests.

use std::time::Duration;

/// Root of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default total timeout for release feed requests (30 seconds).
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default for `timeout_secs` in the config file, matching [`DEFAULT_HTTP_TIMEOUT`].
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Time allowed to establish a connection, for any request (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default total timeout for an asset download (10 minutes).
///
/// Archives can be tens of megabytes, so this is separate from the feed
/// timeout and much larger.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Default for `download_timeout_secs` in the config file, matching
/// [`DEFAULT_DOWNLOAD_TIMEOUT`].
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// `User-Agent` sent with every request. GitHub rejects anonymous agents.
pub const USER_AGENT: &str = concat!("selfup/", env!("CARGO_PKG_VERSION"));

/// Release feed used when neither the config file nor `--repo` names one.
pub const DEFAULT_REPOSITORY: &str = "selfup-dev/selfup";

/// Logical asset prefix used when neither the config file nor
/// `--asset-prefix` names one.
pub const DEFAULT_ASSET_PREFIX: &str = "selfup";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "SELFUP_CONFIG";

/// Environment variable that hides progress spinners when set.
pub const NO_PROGRESS_ENV_VAR: &str = "SELFUP_NO_PROGRESS";
