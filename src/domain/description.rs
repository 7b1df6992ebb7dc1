use std::collections::HashSet;
use std::str::FromStr;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};

const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_LOCATION_LEN: usize = 256;

lazy_static::lazy_static! {
    static ref INVALID_CHARS: HashSet<char> = vec!['<', '>', '{', '}', '\\']
        .into_iter()
        .collect();
}

/// Free text a restaurant uses to describe the surplus food
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDescription(String);

impl AsRef<str> for OfferDescription {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for OfferDescription {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        validate_text("Description", value, MAX_DESCRIPTION_LEN).map(Self)
    }
}

/// Where the food is picked up
#[derive(Debug, Clone, PartialEq)]
pub struct Location(String);

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        validate_text("Location", value, MAX_LOCATION_LEN).map(Self)
    }
}

fn validate_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::Validation(format!("{} cannot be empty", field)));
    }
    if value.graphemes(true).count() > max_len {
        return Err(Error::Validation(format!("{} too long", field)));
    }
    // Line breaks and tabs are fine, other control characters (NUL included) are not
    if value
        .chars()
        .any(|c| INVALID_CHARS.contains(&c) || (c.is_control() && !c.is_whitespace()))
    {
        return Err(Error::Validation(format!(
            "{} contains invalid characters",
            field
        )));
    }
    Ok(value.to_string())
}
