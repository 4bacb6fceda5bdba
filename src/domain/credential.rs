use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CredentialError {
    #[error("cookie string is empty")]
    Empty,

    #[error("cookie string has no key=value pairs")]
    NoPairs,
}

/// Session cookies parsed from a browser-style `k1=v1; k2=v2` string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionCookies {
    pairs: Vec<(String, String)>,
}

impl SessionCookies {
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CredentialError::Empty);
        }

        let pairs: Vec<(String, String)> = raw
            .split(';')
            .filter_map(|item| {
                let (key, value) = item.trim().split_once('=')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.trim().to_string()))
            })
            .collect();

        if pairs.is_empty() {
            return Err(CredentialError::NoPairs);
        }
        Ok(Self { pairs })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn count(&self) -> usize {
        self.pairs.len()
    }

    pub fn header_value(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
