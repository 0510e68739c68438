use secrecy::SecretString;

#[derive(Clone)]
pub struct GlobalArgs {
    pub provider_url: String,
    pub provider_secret_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(provider_url: String) -> Self {
        Self {
            provider_url,
            provider_secret_key: SecretString::default(),
        }
    }

    pub fn set_secret_key(&mut self, secret_key: SecretString) {
        self.provider_secret_key = secret_key;
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("provider_url", &self.provider_url)
            .field("provider_secret_key", &"***")
            .finish()
    }
}
