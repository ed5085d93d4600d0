use crate::utils::error::{ProbeError, Result};
use regex::Regex;
use std::sync::LazyLock;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 映像名稱白名單：字母、數字、`.`、`_`、`-`、`/`，可選 `:tag`
static IMAGE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._/-]*(:[-._a-zA-Z0-9]+)?$").expect("image name pattern")
});

static MODULE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").expect("module name pattern")
});

static ENV_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env key pattern"));

static COMMAND_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*$").expect("command name pattern"));

pub fn is_valid_image_name(name: &str) -> bool {
    IMAGE_NAME_RE.is_match(name)
}

pub fn validate_image_name(name: &str) -> Result<()> {
    if is_valid_image_name(name) {
        Ok(())
    } else {
        Err(ProbeError::InvalidImageName {
            name: name.to_string(),
        })
    }
}

pub fn validate_module_name(field_name: &str, module: &str) -> Result<()> {
    if MODULE_NAME_RE.is_match(module) {
        return Ok(());
    }
    Err(ProbeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: module.to_string(),
        reason: "Not a dotted module identifier".to_string(),
    })
}

pub fn validate_env_key(field_name: &str, key: &str) -> Result<()> {
    if ENV_KEY_RE.is_match(key) {
        return Ok(());
    }
    Err(ProbeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: key.to_string(),
        reason: "Environment variable names may only contain letters, digits and '_'".to_string(),
    })
}

pub fn validate_command_name(field_name: &str, command: &str) -> Result<()> {
    if COMMAND_NAME_RE.is_match(command) {
        return Ok(());
    }
    Err(ProbeError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: command.to_string(),
        reason: "Command names must be a bare executable name".to_string(),
    })
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ProbeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
