use ed25519_dalek::{Signature, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

#[derive(Debug, Error)]
pub enum PublicKeyError {
    #[error("public key is not valid hex")]
    Hex(#[source] hex::FromHexError),
    #[error("public key must be {PUBLIC_KEY_LENGTH} bytes, got {0}")]
    Length(usize),
    #[error("public key bytes do not form a valid Ed25519 key")]
    Invalid(#[source] ed25519_dalek::SignatureError),
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),
    #[error("signature is not valid hex")]
    MalformedSignature(#[source] hex::FromHexError),
    #[error("signature must be {SIGNATURE_LENGTH} bytes, got {0}")]
    SignatureLength(usize),
    #[error("request signature does not match")]
    Mismatch(#[source] ed25519_dalek::SignatureError),
}

/// Verifies interaction request signatures against the application's public
/// key. Verification runs over the exact raw bytes Discord signed (timestamp
/// concatenated with the unparsed body), so it must happen before any JSON
/// parsing of the payload.
#[derive(Clone, Debug)]
pub struct RequestVerifier {
    key: VerifyingKey,
}

impl RequestVerifier {
    /// Build a verifier from the hex-encoded public key shown on the app's
    /// developer portal page.
    pub fn from_hex(public_key: &str) -> Result<Self, PublicKeyError> {
        let raw = hex::decode(public_key.trim()).map_err(PublicKeyError::Hex)?;
        let raw: [u8; PUBLIC_KEY_LENGTH] =
            raw.as_slice().try_into().map_err(|_| PublicKeyError::Length(raw.len()))?;
        let key = VerifyingKey::from_bytes(&raw).map_err(PublicKeyError::Invalid)?;
        Ok(Self { key })
    }

    pub fn verify(
        &self,
        timestamp: &str,
        body: &[u8],
        signature_hex: &str,
    ) -> Result<(), VerifyError> {
        let raw = hex::decode(signature_hex).map_err(VerifyError::MalformedSignature)?;
        let raw: [u8; SIGNATURE_LENGTH] =
            raw.as_slice().try_into().map_err(|_| VerifyError::SignatureLength(raw.len()))?;
        let signature = Signature::from_bytes(&raw);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key.verify(&message, &signature).map_err(VerifyError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::{PublicKeyError, RequestVerifier, VerifyError};

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn verifier() -> RequestVerifier {
        let key_hex = hex::encode(signing_key().verifying_key().to_bytes());
        RequestVerifier::from_hex(&key_hex).expect("verifier should build")
    }

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key().sign(&message).to_bytes())
    }

    #[test]
    fn accepts_a_signature_over_timestamp_and_body() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        verifier().verify("1700000000", body, &signature).expect("signature should verify");
    }

    #[test]
    fn rejects_a_tampered_body() {
        let signature = sign("1700000000", br#"{"type":1}"#);

        let result = verifier().verify("1700000000", br#"{"type":2}"#, &signature);

        assert!(matches!(result, Err(VerifyError::Mismatch(_))));
    }

    #[test]
    fn rejects_a_replayed_signature_with_a_different_timestamp() {
        let body = br#"{"type":1}"#;
        let signature = sign("1700000000", body);

        let result = verifier().verify("1700009999", body, &signature);

        assert!(matches!(result, Err(VerifyError::Mismatch(_))));
    }

    #[test]
    fn rejects_non_hex_signatures() {
        let result = verifier().verify("1700000000", b"{}", "zz-not-hex");

        assert!(matches!(result, Err(VerifyError::MalformedSignature(_))));
    }

    #[test]
    fn rejects_truncated_signatures() {
        let result = verifier().verify("1700000000", b"{}", "deadbeef");

        assert!(matches!(result, Err(VerifyError::SignatureLength(4))));
    }

    #[test]
    fn rejects_a_public_key_of_the_wrong_length() {
        let result = RequestVerifier::from_hex("deadbeef");

        assert!(matches!(result, Err(PublicKeyError::Length(4))));
    }

    #[test]
    fn rejects_a_non_hex_public_key() {
        let result = RequestVerifier::from_hex("not hex at all");

        assert!(matches!(result, Err(PublicKeyError::Hex(_))));
    }
}
