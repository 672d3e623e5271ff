use serde::{Serialize, Deserialize, Serializer};
use std::fmt;

/// Contact data (phone, email) that must not show up in log output.
///
/// `Debug` and `Display` print a fixed mask; serialization keeps the real value
/// because the presentation layer needs it.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let email = Masked("contact@boulangerie.fr".to_string());
        assert_eq!(format!("{:?}", email), "********");
        assert_eq!(email.expose(), "contact@boulangerie.fr");
    }

    #[test]
    fn test_serialize_keeps_value() {
        let phone = Masked("0102030405".to_string());
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"0102030405\"");
    }
}
