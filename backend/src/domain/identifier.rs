//! UUID-backed identifier newtypes shared by the aggregates.

/// Parse failure for textual identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentifierError {
    /// Input was blank.
    #[error("identifier must not be empty")]
    Empty,
    /// Input was not a canonical UUID.
    #[error("identifier must be a valid UUID")]
    Invalid,
}

/// Declare an opaque UUID identifier with parsing, display and serde support.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Parse an identifier from its textual form.
            pub fn new(id: impl AsRef<str>) -> Result<Self, $crate::domain::IdentifierError> {
                let raw = id.as_ref();
                if raw.trim().is_empty() {
                    return Err($crate::domain::IdentifierError::Empty);
                }
                ::uuid::Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| $crate::domain::IdentifierError::Invalid)
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(uuid: ::uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a fresh random identifier.
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &::uuid::Uuid {
                &self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

pub(crate) use uuid_identifier;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    uuid_identifier! {
        /// Identifier used only by these tests.
        SampleId
    }

    #[rstest]
    #[case("", IdentifierError::Empty)]
    #[case("   ", IdentifierError::Empty)]
    #[case("post-1", IdentifierError::Invalid)]
    fn rejects_malformed_input(#[case] raw: &str, #[case] expected: IdentifierError) {
        assert_eq!(SampleId::new(raw), Err(expected));
    }

    #[rstest]
    fn serialises_as_bare_uuid_string() {
        let id = SampleId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialises");
        assert_eq!(json, "\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"");
    }
}
