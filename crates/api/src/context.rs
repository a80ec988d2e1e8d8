/// Raw bearer credential presented with a request, before decoding.
///
/// `None` when no `Authorization` header was sent. Decoding happens in the
/// gateway so that every failure maps to the same 401 envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BearerToken(Option<String>);

impl BearerToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }

    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}
