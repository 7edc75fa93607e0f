use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::Error, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    TokenData, Validation,
};
use thiserror::Error;

use crate::routes::auth::claims::Claims;

/// Minimum acceptable size for the session secret in bytes.
pub const MIN_SESSION_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected, to reject trivially guessable values.
const MIN_UNIQUE_SECRET_BYTES: usize = 8;

#[derive(Debug, Error)]
pub enum SessionSecretError {
    #[error("SESSION_SECRET must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "SESSION_SECRET must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, SessionSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), SessionSecretError> {
    if secret.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(SessionSecretError::TooShort {
            actual: secret.len(),
            required: MIN_SESSION_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_SECRET_BYTES {
        return Err(SessionSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_SECRET_BYTES,
        });
    }

    Ok(())
}

pub fn create_session_token(claims: &Claims, keys: &JwtKeys) -> Result<String, Error> {
    encode(&Header::default(), claims, keys.encoding_key())
}

pub fn decode_session_token(token: &str, keys: &JwtKeys) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    let data = decode::<Claims>(token, keys.decoding_key(), &validation)?;

    // The default validation allows leeway; sessions expire exactly on time.
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::from(ErrorKind::InvalidToken))?
        .as_secs();

    if (data.claims.exp as u64) <= now {
        return Err(Error::from(ErrorKind::ExpiredSignature));
    }

    Ok(data)
}
