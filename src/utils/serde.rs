use serde::{Deserialize, Deserializer};
use std::{fmt::Display, str::FromStr};

/// Deserializer for numbers the explorer sends as strings
///
/// # Example
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(deserialize_with = "ethx_be::utils::serde::from_str")]
///     pub block_number: u64,
/// }
/// ```
pub fn from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    s.trim().parse().map_err(serde::de::Error::custom)
}

/// Like [`from_str`], but an empty string or `null` becomes `None`
/// (the explorer reports contract creations with `"to": ""`)
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// `"1"` -> `true`, anything else -> `false`
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.as_deref() == Some("1"))
}
