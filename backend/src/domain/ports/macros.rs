//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `#[error(..)]` message and a snake_case constructor
//! whose parameters accept anything convertible into the field type, so
//! adapters can write `CartPersistenceError::query(err.to_string())` or
//! `CartPersistenceError::query("pool closed")` alike.

macro_rules! define_port_error {
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
                ::paste::paste! {
                    #[allow(dead_code)]
                    pub fn [<$variant:snake>]($($($field: impl Into<$ty>),*)?) -> Self {
                        Self::$variant $( { $($field: $field.into()),* } )?
                    }
                }
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum StockPortError {
            Unavailable => "stock service unavailable",
            Query { message: String } => "stock query failed: {message}",
            Short { sku: String, missing: u32 } => "{sku} is short by {missing}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(StockPortError::unavailable(), StockPortError::Unavailable);
        assert_eq!(
            StockPortError::unavailable().to_string(),
            "stock service unavailable"
        );
    }

    #[test]
    fn constructors_convert_string_fields() {
        let err = StockPortError::query("timeout");
        assert_eq!(err.to_string(), "stock query failed: timeout");
    }

    #[test]
    fn constructors_keep_field_order() {
        let err = StockPortError::short("honey", 3_u32);
        assert_eq!(err.to_string(), "honey is short by 3");
    }
}
