//! Settings loading

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use std::env;

use dexarb_core::Settings;

/// Prefix of environment overrides, e.g. `DEXARB__NETWORK__IS_LOCAL=true`
pub const ENV_PREFIX: &str = "DEXARB";

/// Read settings from `path` (optional) overlaid with `DEXARB__*` variables.
///
/// A missing `network.api_key` falls back to `ALCHEMY_API_KEY`.
pub fn load_settings(path: &str) -> anyhow::Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let mut settings = build(builder)?;
    if settings.network.api_key.is_none() {
        settings.network.api_key = env::var("ALCHEMY_API_KEY").ok();
    }
    settings.validate()?;
    Ok(settings)
}

fn build(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Settings> {
    Ok(builder.build()?.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use dexarb_core::{ChainId, DexProtocol};
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const TOML: &str = r#"
        chain = "local"
        venue_a = "uniswap"
        venue_b = "sushiswap"

        [network]
        is_local = true

        [exchanges.uniswap]
        router = "0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D"
        factory = "0x5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f"

        [exchanges.sushiswap]
        router = "0xd9e1cE17f2641f24aE83637ab66a2cca9C378B9F"
        factory = "0xC0AEe478e3658e2610c5F7A4A2E1777cE9e4f2Ac"

        [monitor]
        token_a = "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
        token_b = "0x6B175474E89094C44Da98b954EedeAC495271d0F"
        token_c = "0x514910771AF9Ca656af840dff83E8264EcF986CA"
        amount_in = "2.5"
        difference_threshold = "1"
    "#;

    #[test]
    fn test_toml_settings() {
        let settings = build(Config::builder().add_source(File::from_str(TOML, FileFormat::Toml))).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.chain, ChainId::Local);
        assert_eq!(settings.venue_b, DexProtocol::SushiSwap);
        assert_eq!(settings.monitor.amount_in, Decimal::from_str("2.5").unwrap());
        assert_eq!(settings.monitor.difference_threshold, Decimal::ONE);
        assert_eq!(settings.network.endpoint().unwrap(), "http://127.0.0.1:7545");
        assert!(settings.dex(DexProtocol::Uniswap).is_ok());
    }

    #[test]
    fn test_missing_monitor_section_fails() {
        let toml = "venue_a = \"uniswap\"\nvenue_b = \"sushiswap\"\n[exchanges]\n";
        assert!(build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml))).is_err());
    }
}
