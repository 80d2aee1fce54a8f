//! Configuration for the loader and the demo list server.
//!
//! Every option has a documented default and is checked by `validate()`
//! before it is used.

use crate::error::ConfigError;

/// First page the loader requests. Page 1 is assumed to have been supplied
/// by the caller as the initial items.
pub const DEFAULT_START_PAGE: u32 = 2;

/// How the first activation treats the caller's initial items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialLoadMode {
    /// The first fetched page replaces the collection outright.
    #[default]
    Replace,
    /// The first fetched page is merged into the initial items exactly like
    /// a load-more page.
    Merge,
}

/// Which collection length `totalCount` is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HasMoreRule {
    /// Length before the fetched page is applied.
    #[default]
    PreMerge,
    /// Length after the fetched page is applied.
    PostMerge,
}

/// What happens to the cursor when a fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Move on to the next page; the failed page is skipped for good.
    #[default]
    Advance,
    /// Keep the cursor so the next trigger asks for the same page again.
    Retry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Cursor value for the first fetch. Default: 2.
    pub start_page: u32,
    /// Default: `Replace`.
    pub initial_load: InitialLoadMode,
    /// Default: `PreMerge`.
    pub has_more: HasMoreRule,
    /// Default: `Advance`.
    pub on_failure: FailurePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            start_page: DEFAULT_START_PAGE,
            initial_load: InitialLoadMode::default(),
            has_more: HasMoreRule::default(),
            on_failure: FailurePolicy::default(),
        }
    }
}

impl LoaderConfig {
    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page;
        self
    }

    pub fn with_initial_load(mut self, mode: InitialLoadMode) -> Self {
        self.initial_load = mode;
        self
    }

    pub fn with_has_more(mut self, rule: HasMoreRule) -> Self {
        self.has_more = rule;
        self
    }

    pub fn with_on_failure(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_page == 0 {
            return Err(ConfigError::ZeroStartPage);
        }
        Ok(())
    }
}

/// Settings for the demo list server
///
/// Parsed from command-line flags; anything not given keeps its default.
///
/// # Flags
/// * `--host <addr>` - bind address (default `127.0.0.1`)
/// * `--port <n>` - bind port (default `3000`)
/// * `--items <n>` - number of articles in the demo catalogue (default `95`)
/// * `--page-size <n>` - page size when the request has none (default `10`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub catalogue_size: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            catalogue_size: 95,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl ServerConfig {
    /// Build a config from command-line arguments (program name excluded).
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = ServerConfig::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--host" => config.host = next_value(&mut args, &flag)?,
                "--port" => config.port = parse_flag(&flag, &next_value(&mut args, &flag)?)?,
                "--items" => {
                    config.catalogue_size = parse_flag(&flag, &next_value(&mut args, &flag)?)?
                }
                "--page-size" => {
                    config.default_page_size = parse_flag(&flag, &next_value(&mut args, &flag)?)?
                }
                _ => return Err(ConfigError::UnknownArgument(flag.clone())),
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::PageSize {
                got: self.default_page_size,
                max: self.max_page_size,
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, ConfigError> {
    args.next()
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_flag<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_loader_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.start_page, 2);
        assert_eq!(config.initial_load, InitialLoadMode::Replace);
        assert_eq!(config.has_more, HasMoreRule::PreMerge);
        assert_eq!(config.on_failure, FailurePolicy::Advance);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_loader_rejects_page_zero() {
        let config = LoaderConfig::default().with_start_page(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroStartPage));
    }

    #[test]
    fn test_server_defaults_without_args() {
        let config = ServerConfig::from_args(Vec::new()).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_flags_override_defaults() {
        let config = ServerConfig::from_args(args(&[
            "--host", "0.0.0.0", "--port", "8080", "--items", "40", "--page-size", "5",
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.catalogue_size, 40);
        assert_eq!(config.default_page_size, 5);
    }

    #[test]
    fn test_server_rejects_bad_values() {
        assert_eq!(
            ServerConfig::from_args(args(&["--port", "abc"])),
            Err(ConfigError::InvalidValue {
                flag: "--port".to_string(),
                value: "abc".to_string()
            })
        );
        assert_eq!(
            ServerConfig::from_args(args(&["--port"])),
            Err(ConfigError::MissingValue("--port".to_string()))
        );
        assert_eq!(
            ServerConfig::from_args(args(&["--verbose"])),
            Err(ConfigError::UnknownArgument("--verbose".to_string()))
        );
        assert_eq!(
            ServerConfig::from_args(args(&["--page-size", "500"])),
            Err(ConfigError::PageSize { got: 500, max: 100 })
        );
        assert_eq!(
            ServerConfig::from_args(args(&["--port", "0"])),
            Err(ConfigError::ZeroPort)
        );
    }
}
