//! Value parsers for CLI arguments that clap cannot check on its own.

use std::net::IpAddr;
use std::path::PathBuf;

const MAX_ROLLBACK_STEPS: u32 = 100;
const MAX_HOSTNAME_LEN: usize = 253;

pub fn validate_port(value: &str) -> Result<u16, String> {
    match value.parse::<u16>() {
        Ok(0) => Err("Port 0 is not allowed, use 1-65535".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("Port must be a number between 1 and 65535, got '{value}'")),
    }
}

/// The file must exist and be readable.
pub fn validate_config_file_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("Configuration file does not exist or is not a file: '{value}'"));
    }
    std::fs::File::open(&path)
        .map(|_| path)
        .map_err(|e| format!("Cannot read configuration file '{value}': {e}"))
}

pub fn validate_rollback_steps(value: &str) -> Result<u32, String> {
    let steps: u32 = value
        .parse()
        .map_err(|_| format!("Rollback steps must be a positive number, got '{value}'"))?;
    if !(1..=MAX_ROLLBACK_STEPS).contains(&steps) {
        return Err(format!(
            "Rollback steps must be between 1 and {MAX_ROLLBACK_STEPS}"
        ));
    }
    Ok(steps)
}

/// Accepts IP addresses and RFC 1123 style hostnames.
pub fn validate_host_address(value: &str) -> Result<String, String> {
    let host = value.trim();
    if host.is_empty() {
        return Err("Host address cannot be empty".to_string());
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(host.to_string());
    }
    // Dotted digits that did not parse as an address are a typo, not a name.
    if host.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(format!("Invalid IPv4 address: '{host}'"));
    }
    if host.len() > MAX_HOSTNAME_LEN {
        return Err(format!(
            "Host name is longer than {MAX_HOSTNAME_LEN} characters"
        ));
    }

    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    if host.split('.').all(valid_label) {
        Ok(host.to_string())
    } else {
        Err(format!("Invalid host name: '{host}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ports() {
        for port in ["1", "80", "3000", "65535"] {
            assert!(validate_port(port).is_ok(), "{port} should be valid");
        }
        for port in ["0", "65536", "-1", "abc", ""] {
            assert!(validate_port(port).is_err(), "{port} should be invalid");
        }
    }

    #[test]
    fn test_hosts() {
        for host in ["localhost", "127.0.0.1", "0.0.0.0", "::1", "api.jobhub.local", "my-server"] {
            assert!(validate_host_address(host).is_ok(), "{host} should be valid");
        }
        let long = "x".repeat(300);
        for host in ["", "   ", "host with spaces", "999.1.1.1", "-bad.example", long.as_str()] {
            assert!(validate_host_address(host).is_err(), "'{host}' should be invalid");
        }
    }

    #[test]
    fn test_rollback_steps() {
        assert_eq!(validate_rollback_steps("1"), Ok(1));
        assert_eq!(validate_rollback_steps("100"), Ok(100));
        for steps in ["0", "101", "-1", "abc"] {
            assert!(validate_rollback_steps(steps).is_err(), "{steps} should be invalid");
        }
    }

    #[test]
    fn test_config_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobhub.toml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"[server]\nport = 4000\n")
            .unwrap();

        assert_eq!(
            validate_config_file_path(path.to_str().unwrap()),
            Ok(path.clone())
        );
        assert!(validate_config_file_path(dir.path().to_str().unwrap()).is_err());
        assert!(validate_config_file_path("/nonexistent/jobhub.toml").is_err());
    }
}
