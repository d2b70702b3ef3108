//! `check-config`: report what the server would run with, without starting it.

use std::path::Path;

use anyhow::Result;

use crate::config::credentials::missing_credentials;
use crate::config::{Config, read_config, resolve_config_path};


#[derive(Debug)]
enum CheckResult {
    Pass(String),
    Fail(String),
    Skip(String),
}

impl CheckResult {
    fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Fail(_) => "FAIL",
            Self::Skip(_) => "SKIP",
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::Pass(s) | Self::Fail(s) | Self::Skip(s) => s,
        }
    }

    fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("  {:<6} {:<28} {}", result.label(), name, result.detail());
}

fn check_config_file(path: Option<&Path>) -> CheckResult {
    match path {
        None => CheckResult::Skip("none; using defaults and environment".to_string()),
        Some(p) if p.is_file() => CheckResult::Pass(p.display().to_string()),
        Some(p) => CheckResult::Fail(format!("not found at {}", p.display())),
    }
}

fn check_credentials(config: &Config) -> Vec<(&'static str, CheckResult)> {
    let missing = missing_credentials(config);
    crate::config::credentials::CREDENTIAL_ENV_VARS
        .iter()
        .map(|(name, env)| {
            let result = if !missing.iter().any(|(m, _)| m == name) {
                CheckResult::Pass("set".to_string())
            } else if *name == "rakuten-affiliate-id" {
                CheckResult::Skip(format!("not set (optional, {})", env))
            } else {
                CheckResult::Fail(format!("not set ({})", env))
            };
            (*name, result)
        })
        .collect()
}

fn check_validates(config: &Config) -> CheckResult {
    match config.validate() {
        Ok(()) => CheckResult::Pass(format!(
            "listening on {}:{}{}",
            config.gateway.host, config.gateway.port, config.gateway.webhook_path
        )),
        Err(e) => CheckResult::Fail(e.to_string()),
    }
}

pub fn run(config_path: Option<&Path>) -> Result<()> {
    let mut failed = 0;
    let mut record = |name: &str, result: &CheckResult| {
        print_check(name, result);
        if result.is_fail() {
            failed += 1;
        }
    };

    println!("\n  Configuration");
    println!("  {}", "-".repeat(56));

    let path = resolve_config_path(config_path);
    record("Config file", &check_config_file(path.as_deref()));

    let config = match read_config(path.as_deref()) {
        Ok(config) => {
            record("Config parses", &CheckResult::Pass("ok".to_string()));
            config
        }
        Err(e) => {
            record("Config parses", &CheckResult::Fail(format!("{:#}", e)));
            anyhow::bail!("configuration could not be read");
        }
    };

    println!("\n  Credentials");
    println!("  {}", "-".repeat(56));
    for (name, result) in check_credentials(&config) {
        record(name, &result);
    }

    println!("\n  Server");
    println!("  {}", "-".repeat(56));
    record("Config validates", &check_validates(&config));

    if failed > 0 {
        anyhow::bail!("{} check(s) failed", failed);
    }
    println!("\n  All checks passed!");
    Ok(())
}
