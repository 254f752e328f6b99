//! Validation of caller-supplied values that end up as AWS CLI arguments.
//!
//! The CLI expands values such as `file://…`, `fileb://…` and (v1)
//! `http(s)://…` into the contents they name, so every value passed as an
//! argument must come from a closed alphabet that cannot spell a scheme.

use thiserror::Error;

/// Maximum key pair name length accepted by EC2.
pub const MAX_KEY_PAIR_LEN: usize = 255;

/// Maximum instance type length (`u-24tb1.112xlarge` is the longest today).
pub const MAX_INSTANCE_TYPE_LEN: usize = 32;

/// Maximum SSM prefix length, leaving room for `/<project>/ami`.
pub const MAX_PARAM_PREFIX_LEN: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterError {
    #[error("instance id '{0}' must look like i-0123456789abcdef0")]
    InstanceId(String),

    #[error("image id '{0}' must look like ami-0123456789abcdef0")]
    ImageId(String),

    #[error("instance type '{0}' may contain only lowercase letters, digits, '.' and '-'")]
    InstanceType(String),

    #[error(
        "key pair '{0}' may contain only ASCII letters, digits, '.', '_' and '-' \
         and must not start with '-'"
    )]
    KeyPair(String),

    #[error("parameter prefix '{0}' must be an absolute path of letters, digits, '.', '_' and '-'")]
    ParamPrefix(String),
}

/// `<prefix>` followed by 8 to 17 lowercase hex digits.
fn is_hex_id(value: &str, prefix: &str) -> bool {
    value.strip_prefix(prefix).is_some_and(|hex| {
        (8..=17).contains(&hex.len())
            && hex.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    })
}

/// Whether `value` is syntactically an EC2 instance id.
pub fn is_instance_id(value: &str) -> bool {
    is_hex_id(value, "i-")
}

pub fn validate_instance_id(value: &str) -> Result<(), ParameterError> {
    if is_instance_id(value) {
        Ok(())
    } else {
        Err(ParameterError::InstanceId(value.to_string()))
    }
}

pub fn validate_image_id(value: &str) -> Result<(), ParameterError> {
    if is_hex_id(value, "ami-") {
        Ok(())
    } else {
        Err(ParameterError::ImageId(value.to_string()))
    }
}

/// `t3.medium`, `m7i-flex.large` and the like.
pub fn validate_instance_type(value: &str) -> Result<(), ParameterError> {
    let ok = !value.is_empty()
        && value.len() <= MAX_INSTANCE_TYPE_LEN
        && value.starts_with(|c: char| c.is_ascii_lowercase())
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(ParameterError::InstanceType(value.to_string()))
    }
}

pub fn validate_key_pair(value: &str) -> Result<(), ParameterError> {
    let ok = !value.is_empty()
        && value.len() <= MAX_KEY_PAIR_LEN
        && !value.starts_with('-')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if ok {
        Ok(())
    } else {
        Err(ParameterError::KeyPair(value.to_string()))
    }
}

/// An SSM path such as `/devbox` or `/team/devbox/`: rooted, no empty segments
/// except a single trailing slash.
pub fn validate_param_prefix(value: &str) -> Result<(), ParameterError> {
    let Some(rest) = value.strip_prefix('/') else {
        return Err(ParameterError::ParamPrefix(value.to_string()));
    };
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let ok = value.len() <= MAX_PARAM_PREFIX_LEN
        && (rest.is_empty()
            || rest.split('/').all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            }));
    if ok {
        Ok(())
    } else {
        Err(ParameterError::ParamPrefix(value.to_string()))
    }
}
