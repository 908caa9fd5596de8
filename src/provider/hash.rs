//! Hash context capability.
//!
//! # References
//!
//! * `spec.md` §3 "Hash context": "Mutable streaming hasher with update and
//!   finalize-with-mode operations; modes are {free-after-finalize,
//!   reset-for-reuse, snapshot-without-disturbing-state}."

/// A streaming hash context.
///
/// The three finalize modes named in `spec.md` §3 map onto three distinct
/// methods rather than one method plus a mode enum, since each has a
/// different ownership shape (`finalize` consumes, `finalize_reset` and
/// `finalize_snapshot` do not).
pub trait Hash: Send {
    fn update(&mut self, data: &[u8]);

    /// Free-after-finalize: consumes the context, producing the digest of
    /// everything fed so far.
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Reset-for-reuse: produces the digest and resets the running state
    /// to empty, without dropping the context.
    fn finalize_reset(&mut self) -> Vec<u8>;

    /// Snapshot-without-disturbing-state: produces the digest of
    /// everything fed so far without affecting the running state. Used by
    /// the transcript hash to take interim digests (e.g. after ServerHello)
    /// while continuing to accumulate later messages.
    fn finalize_snapshot(&self) -> Vec<u8>;

    fn digest_size(&self) -> usize;
}

pub(crate) struct Sha256Hash(sha2::Sha256);
pub(crate) struct Sha384Hash(sha2::Sha384);

impl Sha256Hash {
    pub(crate) fn new() -> Self {
        use sha2::Digest;
        Self(sha2::Sha256::new())
    }
}

impl Sha384Hash {
    pub(crate) fn new() -> Self {
        use sha2::Digest;
        Self(sha2::Sha384::new())
    }
}

impl Hash for Sha256Hash {
    fn update(&mut self, data: &[u8]) {
        use sha2::Digest;
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        use sha2::Digest;
        self.0.finalize().to_vec()
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        use sha2::Digest;
        self.0.finalize_reset().to_vec()
    }

    fn finalize_snapshot(&self) -> Vec<u8> {
        use sha2::Digest;
        self.0.clone().finalize().to_vec()
    }

    fn digest_size(&self) -> usize {
        32
    }
}

impl Hash for Sha384Hash {
    fn update(&mut self, data: &[u8]) {
        use sha2::Digest;
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        use sha2::Digest;
        self.0.finalize().to_vec()
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        use sha2::Digest;
        self.0.finalize_reset().to_vec()
    }

    fn finalize_snapshot(&self) -> Vec<u8> {
        use sha2::Digest;
        self.0.clone().finalize().to_vec()
    }

    fn digest_size(&self) -> usize {
        48
    }
}

/// HMAC, modeled as a write-only [`Hash`] whose `finalize*` methods produce
/// a MAC instead of a plain digest. `spec.md` §6's `hmac_create(hash, key,
/// key_size) -> hash_context` reuses the hash-context abstraction this way.
pub(crate) struct HmacSha256(hmac::Hmac<sha2::Sha256>);
pub(crate) struct HmacSha384(hmac::Hmac<sha2::Sha384>);

impl HmacSha256 {
    pub(crate) fn new(key: &[u8]) -> Self {
        use hmac::Mac;
        Self(hmac::Hmac::<sha2::Sha256>::new_from_slice(key).expect("HMAC accepts any key length"))
    }
}

impl HmacSha384 {
    pub(crate) fn new(key: &[u8]) -> Self {
        use hmac::Mac;
        Self(hmac::Hmac::<sha2::Sha384>::new_from_slice(key).expect("HMAC accepts any key length"))
    }
}

impl Hash for HmacSha256 {
    fn update(&mut self, data: &[u8]) {
        use hmac::Mac;
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        use hmac::Mac;
        self.0.finalize().into_bytes().to_vec()
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        use hmac::Mac;
        self.0.finalize_reset().into_bytes().to_vec()
    }

    fn finalize_snapshot(&self) -> Vec<u8> {
        use hmac::Mac;
        self.0.clone().finalize().into_bytes().to_vec()
    }

    fn digest_size(&self) -> usize {
        32
    }
}

impl Hash for HmacSha384 {
    fn update(&mut self, data: &[u8]) {
        use hmac::Mac;
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        use hmac::Mac;
        self.0.finalize().into_bytes().to_vec()
    }

    fn finalize_reset(&mut self) -> Vec<u8> {
        use hmac::Mac;
        self.0.finalize_reset().into_bytes().to_vec()
    }

    fn finalize_snapshot(&self) -> Vec<u8> {
        use hmac::Mac;
        self.0.clone().finalize().into_bytes().to_vec()
    }

    fn digest_size(&self) -> usize {
        48
    }
}

pub(crate) fn new_hash(alg: super::HashAlgorithm) -> Box<dyn Hash> {
    match alg {
        super::HashAlgorithm::Sha256 => Box::new(Sha256Hash::new()),
        super::HashAlgorithm::Sha384 => Box::new(Sha384Hash::new()),
    }
}

pub(crate) fn hmac_create(alg: super::HashAlgorithm, key: &[u8]) -> Box<dyn Hash> {
    match alg {
        super::HashAlgorithm::Sha256 => Box::new(HmacSha256::new(key)),
        super::HashAlgorithm::Sha384 => Box::new(HmacSha384::new(key)),
    }
}

/// `HKDF-Extract(hash, salt, ikm) -> prk`. Output length equals
/// `hash.digest_size()` (`spec.md` §8, invariant 3).
pub(crate) fn hkdf_extract(alg: super::HashAlgorithm, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
    match alg {
        super::HashAlgorithm::Sha256 => {
            let (prk, _) = hkdf::Hkdf::<sha2::Sha256>::extract(Some(salt), ikm);
            prk.to_vec()
        }
        super::HashAlgorithm::Sha384 => {
            let (prk, _) = hkdf::Hkdf::<sha2::Sha384>::extract(Some(salt), ikm);
            prk.to_vec()
        }
    }
}

/// `HKDF-Expand(hash, prk, info, out_len) -> okm`.
pub(crate) fn hkdf_expand(
    alg: super::HashAlgorithm,
    prk: &[u8],
    info: &[u8],
    out_len: usize,
) -> Vec<u8> {
    let mut out = vec![0u8; out_len];
    match alg {
        super::HashAlgorithm::Sha256 => {
            let hkdf = hkdf::Hkdf::<sha2::Sha256>::from_prk(prk).expect("PRK too short");
            hkdf.expand(info, &mut out).expect("okm length is valid");
        }
        super::HashAlgorithm::Sha384 => {
            let hkdf = hkdf::Hkdf::<sha2::Sha384>::from_prk(prk).expect("PRK too short");
            hkdf.expand(info, &mut out).expect("okm length is valid");
        }
    }
    out
}

/// TLS 1.3's labelled wrapper around `HKDF-Expand`.
///
/// # References
///
/// * [RFC 8446 Section 7.1](https://datatracker.ietf.org/doc/html/rfc8446#section-7.1)
///
/// ```text
/// struct {
///     uint16 length = Length;
///     opaque label<7..255> = "tls13 " + Label;
///     opaque context<0..255> = Context;
/// } HkdfLabel;
///
/// HKDF-Expand-Label(Secret, Label, Context, Length) =
///     HKDF-Expand(Secret, HkdfLabel, Length)
/// ```
pub(crate) fn hkdf_expand_label(
    alg: super::HashAlgorithm,
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    out_len: usize,
) -> Vec<u8> {
    let mut full_label = Vec::with_capacity(2 + 1 + 6 + label.len() + 1 + context.len());
    full_label.extend_from_slice(&(out_len as u16).to_be_bytes());
    let labeled_len = (6 + label.len()) as u8;
    full_label.push(labeled_len);
    full_label.extend_from_slice(b"tls13 ");
    full_label.extend_from_slice(label);
    full_label.push(context.len() as u8);
    full_label.extend_from_slice(context);
    hkdf_expand(alg, secret, &full_label, out_len)
}

/// `Derive-Secret(Secret, Label, Messages) = HKDF-Expand-Label(Secret,
/// Label, Transcript-Hash(Messages), Hash.length)`. Callers pass the
/// already-computed transcript digest as `transcript_hash`.
pub(crate) fn derive_secret(
    alg: super::HashAlgorithm,
    secret: &[u8],
    label: &[u8],
    transcript_hash: &[u8],
) -> Vec<u8> {
    hkdf_expand_label(alg, secret, label, transcript_hash, alg.digest_size())
}

/// The hash of a zero-length input, needed by `Derive-Secret(..., "derived",
/// "")` at each key-schedule stage transition.
pub(crate) fn empty_hash(alg: super::HashAlgorithm) -> Vec<u8> {
    new_hash(alg).finalize()
}

pub(crate) fn hmac_finished_key(alg: super::HashAlgorithm, traffic_secret: &[u8]) -> Vec<u8> {
    hkdf_expand_label(alg, traffic_secret, b"finished", &[], alg.digest_size())
}

pub(crate) fn hmac(alg: super::HashAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut ctx = hmac_create(alg, key);
    ctx.update(data);
    ctx.finalize_reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::HashAlgorithm;

    // RFC 5869 Appendix A.1 (SHA-256).
    #[test]
    fn hkdf_extract_matches_rfc5869_test_case_1() {
        let ikm = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let prk = hkdf_extract(HashAlgorithm::Sha256, &salt, &ikm);
        assert_eq!(
            hex::encode(prk),
            "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5"
        );
    }

    // RFC 5869 Appendix A.1 (SHA-256).
    #[test]
    fn hkdf_expand_matches_rfc5869_test_case_1() {
        let prk = hex::decode("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();
        let okm = hkdf_expand(HashAlgorithm::Sha256, &prk, &info, 42);
        assert_eq!(
            hex::encode(okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
    }

    #[test]
    fn hkdf_expand_label_varies_with_label() {
        let secret = [0x42u8; 32];
        let a = hkdf_expand_label(HashAlgorithm::Sha256, &secret, b"c hs traffic", &[], 32);
        let b = hkdf_expand_label(HashAlgorithm::Sha256, &secret, b"s hs traffic", &[], 32);
        assert_ne!(a, b);
    }

    #[test]
    fn derive_secret_is_deterministic() {
        let secret = [0x11u8; 32];
        let transcript_hash = [0x22u8; 32];
        let a = derive_secret(HashAlgorithm::Sha256, &secret, b"derived", &transcript_hash);
        let b = derive_secret(HashAlgorithm::Sha256, &secret, b"derived", &transcript_hash);
        assert_eq!(a, b);
    }
}
