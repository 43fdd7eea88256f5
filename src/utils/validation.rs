use crate::utils::error::{ProvisionError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn debian_package_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Debian policy: lowercase alphanumerics plus `+ - .`, at least two chars.
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9+.-]+$").expect("valid regex"))
}

fn requirement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9][A-Za-z0-9._-]*(\[[A-Za-z0-9._,-]+\])?((==|>=|<=|~=|!=|<|>)[A-Za-z0-9.*+!-]+(,(==|>=|<=|~=|!=|<|>)[A-Za-z0-9.*+!-]+)*)?$",
        )
        .expect("valid regex")
    })
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProvisionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ProvisionError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ProvisionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ProvisionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ProvisionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProvisionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(ProvisionError::ConfigValidationError {
            field: field_name.to_string(),
            message: "List cannot be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_system_packages(field_name: &str, packages: &[String]) -> Result<()> {
    validate_non_empty_list(field_name, packages)?;
    for package in packages {
        if !debian_package_re().is_match(package) {
            return Err(ProvisionError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: package.clone(),
                reason: "Not a valid Debian package name".to_string(),
            });
        }
    }
    Ok(())
}

pub fn validate_requirements(field_name: &str, requirements: &[String]) -> Result<()> {
    validate_non_empty_list(field_name, requirements)?;
    for requirement in requirements {
        if !requirement_re().is_match(requirement) {
            return Err(ProvisionError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: requirement.clone(),
                reason: "Not a valid requirement specifier".to_string(),
            });
        }
    }
    Ok(())
}
