//! Custom serde helpers for backend wire formats.

/// Accepts a JSON string or integer and yields its decimal string form.
///
/// The backend is inconsistent about numeric fields (`price`, `maxExecutions`,
/// `periods`): some endpoints send strings, others integers.
pub mod string_or_number {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        U64(u64),
        I64(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s,
            Raw::U64(n) => n.to_string(),
            Raw::I64(n) => n.to_string(),
        })
    }
}

/// Optional variant of [`string_or_number`].
pub mod opt_string_or_number {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(deserialize_with = "super::string_or_number::deserialize")] String);

        Option::<Wrapper>::deserialize(deserializer).map(|w| w.map(|Wrapper(s)| s))
    }
}
