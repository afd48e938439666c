use std::{env, fs};

use secrecy::SecretSlice;
use tracing::{debug, error};

/// Loads the secret `name` as key bytes.
///
/// `{name}_FILE` takes precedence and points at a file holding the secret
/// (trimmed, for mounted container secrets); otherwise `{name}` itself is
/// read. Empty values count as missing.
pub fn load_secret(name: &str) -> Option<SecretSlice<u8>> {
    let file_var = format!("{name}_FILE");

    let value = match env::var(&file_var) {
        Ok(path) => match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(%file_var, "Secret loaded from file");
                content.trim().to_owned()
            }
            Err(e) => {
                error!(%path, ?e, "Error reading secret file");
                return None;
            }
        },
        Err(_) => env::var(name).ok()?,
    };

    (!value.is_empty()).then(|| SecretSlice::from(value.into_bytes()))
}
