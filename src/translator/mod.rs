pub mod google;

use anyhow::Result;

pub use google::GoogleTranslator;

/// A text-to-text translation capability.
///
/// The production implementation talks to an unofficial web endpoint with no
/// committed interface contract, so everything downstream depends only on
/// this trait and can run against an offline implementation.
pub trait Translator {
    fn translate(&self, text: &str) -> Result<String>;
}

/// Returns its input unchanged. Used for dry runs and tests.
pub struct Identity;

impl Translator for Identity {
    fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}
