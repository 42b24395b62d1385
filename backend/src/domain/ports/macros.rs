//! Builder for driven-port error enums.
//!
//! Capability ports (hashing, signing, notification) list every variant
//! themselves. Storage ports add `storage = "<subject>"` after the enum name
//! and receive the three ways a database round trip fails:
//!
//! - `Connection { message }`: no connection could be checked out;
//! - `Query { message }`: the statement or transaction failed;
//! - `Timeout`: the query deadline elapsed and the work was rolled back.
//!
//! Storage enums also get `storage_error`, which folds those three into the
//! domain taxonomy so services only match on the variants they own.
//!
//! Every variant gets a snake_case constructor taking `impl Into<_>` for
//! each field.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident storage = $subject:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        define_port_error! {
            @emit
            $(#[$outer])*
            $name {
                $(
                    $(#[$variant_meta])*
                    [$message] $variant $( { $($field : $ty),* } )?,
                )*
                #[doc = "No connection could be checked out of the pool."]
                ["{subject} connection failed: {message}", subject = $subject]
                Connection { message: String },
                #[doc = "The statement or its transaction failed."]
                ["{subject} query failed: {message}", subject = $subject]
                Query { message: String },
                #[doc = "The query deadline elapsed; the work was rolled back."]
                ["{subject} operation timed out", subject = $subject]
                Timeout,
            }
        }

        impl $name {
            /// Map connection, timeout and query failures onto the domain
            /// taxonomy; `None` for the port's own variants.
            pub fn storage_error(&self) -> Option<$crate::domain::Error> {
                if let Self::Connection { .. } = self {
                    return Some($crate::domain::Error::service_unavailable(
                        concat!($subject, " unavailable"),
                    ));
                }
                if let Self::Timeout = self {
                    return Some($crate::domain::Error::service_unavailable(
                        concat!($subject, " timed out"),
                    ));
                }
                if let Self::Query { message } = self {
                    return Some($crate::domain::Error::internal(format!(
                        "{} error: {message}",
                        $subject
                    )));
                }
                None
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        define_port_error! {
            @emit
            $(#[$outer])*
            $name {
                $(
                    $(#[$variant_meta])*
                    [$message] $variant $( { $($field : $ty),* } )?,
                )*
            }
        }
    };

    (
        @emit
        $(#[$outer:meta])*
        $name:ident {
            $(
                $(#[$variant_meta:meta])*
                [$($message:tt)+] $variant:ident $( { $($field:ident : $ty:ty),* } )?,
            )*
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($($message)+)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                ::paste::paste! {
                    #[doc = concat!("Build [`", stringify!($name), "::", stringify!($variant), "`].")]
                    pub fn [<$variant:snake>]($( $($field: impl Into<$ty>),* )?) -> Self {
                        Self::$variant { $( $($field: $field.into()),* )? }
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor and classification behaviour of generated port errors.

    use rstest::rstest;

    use crate::domain::ErrorCode;

    define_port_error! {
        pub enum LedgerStoreError storage = "ledger store" {
            Missing => "ledger entry missing",
            Locked { holder: String } => "ledger locked by {holder}",
        }
    }

    define_port_error! {
        pub enum SignerError {
            Rejected { reason: String, attempts: u32 } => "rejected after {attempts}: {reason}",
        }
    }

    #[test]
    fn storage_variants_name_their_subject() {
        assert_eq!(
            LedgerStoreError::connection("refused").to_string(),
            "ledger store connection failed: refused"
        );
        assert_eq!(
            LedgerStoreError::timeout().to_string(),
            "ledger store operation timed out"
        );
    }

    #[test]
    fn port_variants_keep_their_own_messages() {
        assert_eq!(LedgerStoreError::missing(), LedgerStoreError::Missing);
        assert_eq!(
            LedgerStoreError::locked("ada").to_string(),
            "ledger locked by ada"
        );
        assert_eq!(
            SignerError::rejected("bad key", 3_u32).to_string(),
            "rejected after 3: bad key"
        );
    }

    #[rstest]
    #[case::connection(LedgerStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case::timeout(LedgerStoreError::timeout(), ErrorCode::ServiceUnavailable)]
    #[case::query(LedgerStoreError::query("syntax"), ErrorCode::InternalError)]
    fn storage_failures_fold_into_the_domain_taxonomy(
        #[case] error: LedgerStoreError,
        #[case] expected: ErrorCode,
    ) {
        let mapped = error.storage_error().expect("storage failure");
        assert_eq!(mapped.code(), expected);
        assert!(mapped.message().starts_with("ledger store"));
    }

    #[test]
    fn port_variants_are_left_to_the_service() {
        assert!(LedgerStoreError::missing().storage_error().is_none());
        assert!(LedgerStoreError::locked("ada").storage_error().is_none());
    }
}
