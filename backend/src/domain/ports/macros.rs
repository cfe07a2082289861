//! `define_port_error!` builds a `thiserror` enum for a port plus one
//! snake_case constructor per variant taking `impl Into<_>` arguments.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
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
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use crate::domain::ReportStatus;

    define_port_error! {
        pub enum LedgerPortError {
            Offline { message: String } => "ledger offline: {message}",
            Drift { expected: ReportStatus, actual: ReportStatus } =>
                "status drift: expected {expected}, found {actual}",
            Empty => "ledger is empty",
        }
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LedgerPortError::offline("pool exhausted");
        assert_eq!(err.to_string(), "ledger offline: pool exhausted");
    }

    #[test]
    fn typed_fields_keep_their_type() {
        let err = LedgerPortError::drift(ReportStatus::Pending, ReportStatus::Verified);
        assert_eq!(
            err,
            LedgerPortError::Drift {
                expected: ReportStatus::Pending,
                actual: ReportStatus::Verified,
            }
        );
        assert_eq!(err.to_string(), "status drift: expected pending, found verified");
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(LedgerPortError::empty().to_string(), "ledger is empty");
    }
}
