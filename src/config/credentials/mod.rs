use super::schema::Config;
use tracing::debug;

macro_rules! define_credentials {
    ($( $name:literal, $env:literal => $($path:ident).+ );* $(;)?) => {
        /// All known credential slot names.
        pub const CREDENTIAL_NAMES: &[&str] = &[$($name),*];

        /// (slot name, env var name) pairs.
        pub const CREDENTIAL_ENV_VARS: &[(&str, &str)] = &[$(($name, $env)),*];

        /// Get the current value of a credential field by slot name.
        pub fn get_credential_value<'a>(config: &'a Config, name: &str) -> Option<&'a str> {
            match name {
                $($name => Some(config.$($path).+.as_str()),)*
                _ => None,
            }
        }

        /// Apply overrides from an arbitrary variable lookup.
        ///
        /// Any variable that resolves to a non-empty value overwrites the
        /// corresponding config field.
        pub fn apply_overrides_from<F>(config: &mut Config, lookup: F)
        where
            F: Fn(&str) -> Option<String>,
        {
            $(
                if let Some(val) = lookup($env) {
                    if !val.is_empty() {
                        debug!("credential {} taken from {}", $name, $env);
                        config.$($path).+ = val;
                    }
                }
            )*
        }
    };
}

define_credentials! {
    "line-channel-secret",     "LINE_BOT_CHANNEL_SECRET" => line.channel_secret;
    "line-channel-token",      "LINE_BOT_CHANNEL_TOKEN"  => line.channel_token;
    "rakuten-application-id",  "RAKUTEN_APPLICATION_ID"  => rakuten.application_id;
    "rakuten-affiliate-id",    "RAKUTEN_AFFILIATE_ID"    => rakuten.affiliate_id;
}

/// Apply process environment overrides, so secrets can be injected without
/// touching the config file.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Credential slots that are still empty, as `(slot, env var)` pairs.
pub fn missing_credentials(config: &Config) -> Vec<(&'static str, &'static str)> {
    CREDENTIAL_ENV_VARS
        .iter()
        .filter(|(name, _)| get_credential_value(config, name).is_some_and(str::is_empty))
        .copied()
        .collect()
}
