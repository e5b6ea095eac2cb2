/// Defines a string identifier newtype.
///
/// Identifiers are generated on the client as `<prefix>_<uuid>`. Identifiers of
/// any other shape written by earlier versions are accepted unchanged.
macro_rules! string_id {
    ($name: ident, $prefix: literal) => {
        #[derive(
            derive_more::Deref,
            derive_more::Display,
            Debug,
            Default,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
        )]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            #[must_use]
            pub fn nil() -> Self {
                Self(String::new())
            }

            #[must_use]
            pub fn is_nil(&self) -> bool {
                self.0.is_empty()
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

pub(crate) use string_id;
