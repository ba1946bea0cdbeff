use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the default TOML file and `APP_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads configuration layered as defaults, then `path`, then environment.
    ///
    /// Missing files are skipped, so a bare environment still yields a usable
    /// config. Nested keys use a double underscore: `APP_DATABASE__URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or a value has the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        tracing::debug!(
            "Loaded config: server={}:{}, starting_capital={}",
            config.server.host,
            config.server.port,
            config.simulation.starting_capital
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_apply_without_file() {
        Jail::expect_with(|_jail| {
            let config = ConfigLoader::load_from("missing.toml").expect("defaults");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.simulation.starting_capital, dec!(10000));
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "Config.toml",
                r#"
                [server]
                host = "127.0.0.1"
                port = 9000

                [simulation]
                starting_capital = "25000"
                "#,
            )?;
            jail.set_env("APP_DATABASE__URL", "postgresql://db/journal");

            let config = ConfigLoader::load_from("Config.toml").expect("config");
            assert_eq!(config.server.addr(), "127.0.0.1:9000");
            assert_eq!(config.database.url, "postgresql://db/journal");
            assert_eq!(config.database.max_connections, 10);
            assert_eq!(config.simulation.starting_capital, dec!(25000));
            Ok(())
        });
    }
}
