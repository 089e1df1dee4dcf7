//! The `success`/`message` envelope shared by every response.

/// Common accessors for a backend response envelope.
pub trait Envelope {
    /// Whether the backend reported success.
    fn success(&self) -> bool;

    /// Error message reported by the backend, if any.
    fn message(&self) -> Option<&str>;
}

macro_rules! impl_envelope {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::Envelope for $ty {
                fn success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref()
                }
            }
        )*
    };
}

impl_envelope!(
    crate::AccountsResponse,
    crate::PoliciesResponse,
    crate::QuotasResponse,
    crate::StorageResponse,
    crate::SystemResponse,
    crate::ServicesResponse,
);

/// Accept either a JSON boolean or a 0/1 integer.
///
/// SQLite-backed consoles report flags such as `is_default` as integers.
pub(crate) fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct Flag;

    impl<'de> Visitor<'de> for Flag {
        type Value = bool;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("a boolean or an integer flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(Flag)
}
