use crate::{Result, SystemTag};

/// Create a [`SystemTag`] from a literal, padded with spaces to four bytes.
///
/// Literals are checked at compile time. Expressions go through [`IntoSystemTag`] and panic on
/// invalid input, so keep those to tests and curated data.
///
/// # Examples
///
/// ```
/// # use ot_lang_table::{systag, SystemTag};
/// assert_eq!(systag!("AKA"), SystemTag::new(b"AKA "));
/// assert_eq!(systag!["ZHS", "ZHT"], [SystemTag::new(b"ZHS "), SystemTag::new(b"ZHT ")]);
/// let name = String::from("IPPH");
/// assert_eq!(systag!(name), SystemTag::new(b"IPPH"));
/// ```
#[macro_export]
macro_rules! systag {
    ($tag:literal) => {
        const { $crate::SystemTag::from_literal($tag) }
    };
    ($tag:expr) => {{
        let tag = $tag;
        match $crate::macros::IntoSystemTag::to_system_tag(&tag) {
            Ok(tag) => tag,
            Err(e) => Err(e).expect(&format!("cannot parse language system tag systag!({tag:?})")),
        }
    }};
    ($($tag:tt),+$(,)?) => {[$($crate::systag!($tag)),+]}
}

/// See [`IntoSystemTag::to_system_tag()`].
pub trait IntoSystemTag {
    /// Turn `self` into a [`SystemTag`].
    ///
    /// This is used by the [`systag!`] macro.
    ///
    /// # Errors
    /// See [`SystemTag::parse()`].
    fn to_system_tag(&self) -> Result<SystemTag>;
}

impl IntoSystemTag for str {
    fn to_system_tag(&self) -> Result<SystemTag> {
        SystemTag::parse(self)
    }
}
impl IntoSystemTag for String {
    fn to_system_tag(&self) -> Result<SystemTag> {
        SystemTag::parse(self)
    }
}
impl IntoSystemTag for &str {
    fn to_system_tag(&self) -> Result<SystemTag> {
        SystemTag::parse(self)
    }
}
