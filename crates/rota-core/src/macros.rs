/// Constructors shared by the string newtypes in this crate (item names, image refs, group keys).
#[macro_export]
macro_rules! impl_string_newtype {
    ($name:ty) => {
        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whitespace-only values are treated the same as missing ones.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }
    };
}
