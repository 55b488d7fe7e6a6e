//! Built-in string catalogue
//!
//! The English defaults are written inline at every call site; the fallback
//! localizer returns them with `{name}` placeholders filled in.

use modbot_core::traits::Localizer;

/// Localizer that always uses the inline default text
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackLocalizer;

impl Localizer for FallbackLocalizer {
    fn translate(
        &self,
        _key: &str,
        _language: Option<&str>,
        default: &str,
        args: &[(&str, String)],
    ) -> String {
        fill_placeholders(default, args)
    }
}

/// Replace every `{name}` in `template` with its value from `args`.
/// Unknown placeholders are left untouched.
pub fn fill_placeholders(template: &str, args: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}
