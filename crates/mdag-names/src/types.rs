//! Signed name records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use mdag_crypto::{Signature, SigningKey, VerifyingKey};

use crate::error::{NameError, Result};

/// One published value of a mutable name.
///
/// The name is the hex public key of the key that signed it, so a record is
/// self-certifying: anyone can check it without a key registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRecord {
    /// The published name (hex public key of the signer).
    pub name: String,
    /// The reference the name currently points at.
    pub value: String,
    /// Monotonic per-name counter. Higher wins.
    pub sequence: u64,
    /// When the record was signed.
    pub published_at: DateTime<Utc>,
    /// After this instant the record no longer resolves.
    pub expires_at: DateTime<Utc>,
    /// Signature over [`NameRecord::signing_bytes`].
    pub signature: Signature,
}

impl NameRecord {
    /// Sign a new record for `value` with `key`.
    pub fn sign(
        key: &SigningKey,
        value: impl Into<String>,
        sequence: u64,
        published_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        let name = key.verifying_key().to_hex();
        let value = value.into();
        let expires_at = published_at + ttl;
        let message = signing_bytes(&name, &value, sequence, &published_at, &expires_at);
        Self {
            name,
            value,
            sequence,
            published_at,
            expires_at,
            signature: key.sign(&message),
        }
    }

    /// The bytes covered by the signature.
    pub fn signing_bytes(&self) -> Vec<u8> {
        signing_bytes(
            &self.name,
            &self.value,
            self.sequence,
            &self.published_at,
            &self.expires_at,
        )
    }

    /// Check the signature against the key encoded in the name.
    pub fn verify(&self) -> Result<()> {
        let bad = || NameError::BadSignature {
            name: self.name.clone(),
        };
        let key = VerifyingKey::from_hex(&self.name).map_err(|_| bad())?;
        key.verify(&self.signing_bytes(), &self.signature)
            .map_err(|_| bad())
    }

    /// Verify the signature and the validity window at `now`.
    pub fn check(&self, now: DateTime<Utc>) -> Result<()> {
        self.verify()?;
        if now >= self.expires_at {
            return Err(NameError::Expired {
                name: self.name.clone(),
                expired_at: self.expires_at.to_rfc3339(),
            });
        }
        Ok(())
    }
}

fn signing_bytes(
    name: &str,
    value: &str,
    sequence: u64,
    published_at: &DateTime<Utc>,
    expires_at: &DateTime<Utc>,
) -> Vec<u8> {
    format!(
        "mdag-name-record-v1\n{name}\n{value}\n{sequence}\n{}\n{}",
        published_at.to_rfc3339(),
        expires_at.to_rfc3339()
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: &str) -> (SigningKey, NameRecord) {
        let key = SigningKey::generate();
        let rec = NameRecord::sign(&key, value, 1, Utc::now(), Duration::hours(1));
        (key, rec)
    }

    #[test]
    fn name_is_signer_public_key() {
        let (key, rec) = record("/dag/abc");
        assert_eq!(rec.name, key.verifying_key().to_hex());
    }

    #[test]
    fn fresh_record_checks_out() {
        let (_, rec) = record("/dag/abc");
        assert!(rec.check(Utc::now()).is_ok());
    }

    #[test]
    fn tampered_value_fails_verification() {
        let (_, mut rec) = record("/dag/abc");
        rec.value = "/dag/def".into();
        assert!(matches!(rec.verify(), Err(NameError::BadSignature { .. })));
    }

    #[test]
    fn tampered_sequence_fails_verification() {
        let (_, mut rec) = record("/dag/abc");
        rec.sequence += 1;
        assert!(rec.verify().is_err());
    }

    #[test]
    fn expired_record_is_rejected() {
        let (_, rec) = record("/dag/abc");
        let later = rec.expires_at + Duration::seconds(1);
        assert!(matches!(rec.check(later), Err(NameError::Expired { .. })));
    }

    #[test]
    fn json_roundtrip_still_verifies() {
        let (_, rec) = record("/dag/abc/x");
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: NameRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rec);
        assert!(parsed.verify().is_ok());
    }
}
