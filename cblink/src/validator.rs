/// Address checksum verification, supplied by the caller.
///
/// `strict` asks the implementation to also reject addresses whose network
/// prefix or length it does not recognize.
pub trait Validator {
    fn validate(&self, payload: &str, strict: bool) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str, bool) -> bool,
{
    fn validate(&self, payload: &str, strict: bool) -> bool {
        self(payload, strict)
    }
}

/// Accepts every address. Useful when checksums are verified elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Validator for AcceptAll {
    fn validate(&self, _payload: &str, _strict: bool) -> bool {
        true
    }
}
