//! `define_port_error!` declares a port's `thiserror` enum.
//!
//! Variants either carry nothing or a single `String` detail field. Each one
//! gets a snake_case constructor; detail constructors take `impl Into<String>`
//! so adapters can pass `&str`, `String` or a `Display` rendering.
//!
//! ```ignore
//! define_port_error! {
//!     pub enum WardRepositoryError {
//!         Connection { message } => "ward repository connection failed: {message}",
//!         Full => "ward is full",
//!     }
//! }
//! let err = WardRepositoryError::connection("refused");
//! ```

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };
    (@ctor $variant:ident $field:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($field: impl Into<String>) -> Self {
                Self::$variant { $field: $field.into() }
            }
        }
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $field:ident } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $field: String } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $($field)?);
            )*
        }
    };
}

pub(crate) use define_port_error;
