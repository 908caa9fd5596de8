//! The TLS 1.3 key schedule.
//!
//! # References
//!
//! * [RFC 5869] HMAC-based Extract-and-Expand Key Derivation Function (HKDF)
//! * [RFC 8446 Section 7.1](https://datatracker.ietf.org/doc/html/rfc8446#section-7.1)
//!
//! [RFC 5869]: https://datatracker.ietf.org/doc/html/rfc5869
//!
//! ```text
//!             0
//!             |
//!             v
//!   PSK ->  HKDF-Extract = Early Secret
//!             |
//!             +-----> Derive-Secret(., "derived", "")
//!             |
//!             v
//! (EC)DHE -> HKDF-Extract = Handshake Secret
//!             |
//!             +-----> Derive-Secret(., "c hs traffic", CH..SH) = client_handshake_traffic_secret
//!             +-----> Derive-Secret(., "s hs traffic", CH..SH) = server_handshake_traffic_secret
//!             |
//!             +-----> Derive-Secret(., "derived", "")
//!             |
//!             v
//!   0 -> HKDF-Extract = Master Secret
//!             |
//!             +-----> Derive-Secret(., "c ap traffic", CH..SF) = client_application_traffic_secret
//!             +-----> Derive-Secret(., "s ap traffic", CH..SF) = server_application_traffic_secret
//! ```
//!
//! This type only implements the full-handshake, non-PSK path named above:
//! the `0-RTT` branch (`client_early_traffic_secret`, `early_exporter`) and
//! the `resumption_master_secret` branch are out of scope along with 0-RTT
//! and session resumption generally (`spec.md` Non-goals).

use crate::provider::hash::{derive_secret, empty_hash, hkdf_extract, hmac, hmac_finished_key};
use crate::provider::HashAlgorithm;

/// Drives the three extract stages of the TLS 1.3 key schedule and derives
/// the traffic secrets hanging off each one.
///
/// The transcript hash is *not* owned here (unlike the single-hash,
/// client-only predecessor this is generalized from): [`crate::session::Session`]
/// owns the running transcript [`crate::provider::Hash`] and passes in
/// snapshot digests at the points the schedule needs them, since the same
/// transcript also feeds `CertificateVerify` and `Finished` independently of
/// key derivation.
pub(crate) struct KeySchedule {
    hash_alg: HashAlgorithm,
    secret: Vec<u8>,
}

impl KeySchedule {
    /// Starts the schedule at Early Secret with no PSK (`IKM = 0`), then
    /// immediately derives the salt for the next stage, matching
    /// `spec.md` §4.4's "fixed sequence of named stages."
    pub(crate) fn new(hash_alg: HashAlgorithm) -> Self {
        let zeros = vec![0u8; hash_alg.digest_size()];
        let early_secret = hkdf_extract(hash_alg, &zeros, &zeros);
        let secret = derive_secret(hash_alg, &early_secret, b"derived", &empty_hash(hash_alg));
        Self { hash_alg, secret }
    }

    /// Advances Early Secret -> Handshake Secret with the (EC)DHE shared
    /// secret, returning `(client_handshake_traffic_secret,
    /// server_handshake_traffic_secret)`. `transcript_hash` is
    /// `Transcript-Hash(ClientHello .. ServerHello)`.
    pub(crate) fn handshake_secrets(
        &mut self,
        shared_secret: &[u8],
        transcript_hash: &[u8],
    ) -> (Vec<u8>, Vec<u8>) {
        let handshake_secret = hkdf_extract(self.hash_alg, &self.secret, shared_secret);

        let client = derive_secret(self.hash_alg, &handshake_secret, b"c hs traffic", transcript_hash);
        let server = derive_secret(self.hash_alg, &handshake_secret, b"s hs traffic", transcript_hash);

        self.secret = derive_secret(
            self.hash_alg,
            &handshake_secret,
            b"derived",
            &empty_hash(self.hash_alg),
        );
        (client, server)
    }

    /// Advances Handshake Secret -> Master Secret, returning
    /// `(client_application_traffic_secret, server_application_traffic_secret)`.
    /// `transcript_hash` is `Transcript-Hash(ClientHello .. server Finished)`.
    pub(crate) fn application_secrets(&mut self, transcript_hash: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let zeros = vec![0u8; self.hash_alg.digest_size()];
        let master_secret = hkdf_extract(self.hash_alg, &self.secret, &zeros);

        let client = derive_secret(self.hash_alg, &master_secret, b"c ap traffic", transcript_hash);
        let server = derive_secret(self.hash_alg, &master_secret, b"s ap traffic", transcript_hash);
        (client, server)
    }
}

impl Drop for KeySchedule {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret.zeroize();
    }
}

/// `HKDF-Expand-Label(BaseKey, "finished", "", Hash.length)` followed by
/// `HMAC(finished_key, Transcript-Hash(...))` (RFC 8446 §4.4.4).
pub(crate) fn finished_verify_data(alg: HashAlgorithm, traffic_secret: &[u8], transcript_hash: &[u8]) -> Vec<u8> {
    let finished_key = hmac_finished_key(alg, traffic_secret);
    hmac(alg, &finished_key, transcript_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_and_server_traffic_secrets_differ() {
        let mut schedule = KeySchedule::new(HashAlgorithm::Sha256);
        let shared_secret = [0x7Au8; 32];
        let transcript_hash = [0x01u8; 32];
        let (client, server) = schedule.handshake_secrets(&shared_secret, &transcript_hash);
        assert_ne!(client, server);
        assert_eq!(client.len(), HashAlgorithm::Sha256.digest_size());
    }

    #[test]
    fn application_secrets_depend_on_handshake_secrets() {
        let mut a = KeySchedule::new(HashAlgorithm::Sha256);
        let mut b = KeySchedule::new(HashAlgorithm::Sha256);
        let transcript_hash = [0x02u8; 32];

        a.handshake_secrets(&[0x01u8; 32], &transcript_hash);
        b.handshake_secrets(&[0x02u8; 32], &transcript_hash);

        let (a_client, _) = a.application_secrets(&transcript_hash);
        let (b_client, _) = b.application_secrets(&transcript_hash);
        assert_ne!(a_client, b_client);
    }

    #[test]
    fn finished_verify_data_length_tracks_hash() {
        let sha256 = finished_verify_data(HashAlgorithm::Sha256, &[0x03u8; 32], &[0x04u8; 32]);
        let sha384 = finished_verify_data(HashAlgorithm::Sha384, &[0x03u8; 48], &[0x04u8; 48]);
        assert_eq!(sha256.len(), 32);
        assert_eq!(sha384.len(), 48);
    }
}
