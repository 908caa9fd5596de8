//! End-to-end client/server handshake over an in-memory loopback, plus
//! the application-data exchange that follows it.
//!
//! Certificate validation and signing are host responsibilities
//! (`spec.md` §1): these stubs use an identity-function "signature" so
//! the test exercises the handshake engine itself, not a crypto stack
//! signature scheme.

use microtls::provider::default::DefaultProvider;
use microtls::provider::{AeadAlgorithm, CryptoProvider, HashAlgorithm, KeyExchange};
use microtls::{
    Buffer, CertContext, CertificateResolver, CertificateVerifier, CipherSuite, DeferredSign, DeferredVerify, Error,
    NamedGroup, Progress, Session,
};
use rand_core::OsRng;

/// Wraps a [`DefaultProvider`], restricting the offered cipher suites to a
/// single one. Used to force negotiation away from the default
/// first-preference suite without reimplementing the crypto backend.
struct SingleSuiteProvider<R> {
    inner: DefaultProvider<R>,
    suite: [CipherSuite; 1],
}

impl<R: rand_core::CryptoRng + rand_core::RngCore + Send> SingleSuiteProvider<R> {
    fn new(rng: R, suite: CipherSuite) -> Self {
        Self {
            inner: DefaultProvider::new(rng),
            suite: [suite],
        }
    }
}

impl<R: rand_core::CryptoRng + rand_core::RngCore + Send + Sync> CryptoProvider for SingleSuiteProvider<R> {
    fn cipher_suites(&self) -> &[CipherSuite] {
        &self.suite
    }

    fn supported_groups(&self) -> &[NamedGroup] {
        self.inner.supported_groups()
    }

    fn hash(&self, alg: HashAlgorithm) -> Box<dyn microtls::provider::Hash> {
        self.inner.hash(alg)
    }

    fn aead_state(&self, alg: AeadAlgorithm, key: &[u8]) -> Result<Box<dyn microtls::provider::AeadState>, Error> {
        self.inner.aead_state(alg, key)
    }

    fn key_exchange(&self, group: NamedGroup) -> Result<Box<dyn KeyExchange>, Error> {
        self.inner.key_exchange(group)
    }

    fn random(&self) -> &dyn microtls::provider::RandomSource {
        self.inner.random()
    }
}

struct TestResolver;

impl CertificateResolver for TestResolver {
    fn lookup(
        &self,
        _server_name: Option<&str>,
        signature_schemes: &[microtls::SignatureScheme],
    ) -> Result<(Vec<Vec<u8>>, microtls::SignatureScheme, DeferredSign), Error> {
        let scheme = signature_schemes
            .first()
            .copied()
            .unwrap_or(microtls::SignatureScheme::Ed25519);
        let chain = vec![b"test leaf certificate".to_vec()];
        let sign = DeferredSign::new(|payload| Ok(payload.to_vec()));
        Ok((chain, scheme, sign))
    }
}

struct TestVerifier;

impl CertificateVerifier for TestVerifier {
    fn verify(&self, chain: &[Vec<u8>]) -> Result<DeferredVerify, Error> {
        assert_eq!(chain, &[b"test leaf certificate".to_vec()]);
        Ok(DeferredVerify::new(|payload, signature| {
            if payload == signature {
                Ok(())
            } else {
                Err(Error::unexpected_message())
            }
        }))
    }
}

/// Drives `client` and `server` against each other until both report
/// `Progress::Complete`.
fn run_handshake(client: &mut Session, server: &mut Session) {
    let mut client_out = Buffer::new();
    let mut server_out = Buffer::new();

    let (mut client_progress, _) = client.handshake(&[], &mut client_out).unwrap();
    assert_eq!(client_progress, Progress::InProgress);

    let mut server_progress = Progress::InProgress;
    let mut rounds = 0;
    while client_progress != Progress::Complete || server_progress != Progress::Complete {
        rounds += 1;
        assert!(rounds < 10, "handshake did not converge");

        if !client_out.is_empty() {
            let (progress, consumed) = server.handshake(client_out.as_slice(), &mut server_out).unwrap();
            assert_eq!(consumed, client_out.len());
            server_progress = progress;
            client_out.clear();
        }

        if !server_out.is_empty() {
            let (progress, consumed) = client.handshake(server_out.as_slice(), &mut client_out).unwrap();
            assert_eq!(consumed, server_out.len());
            client_progress = progress;
            server_out.clear();
        }
    }
}

#[test]
fn client_and_server_complete_handshake_and_exchange_application_data() {
    let client_provider = DefaultProvider::new(OsRng);
    let server_provider = DefaultProvider::new(OsRng);
    let verifier = TestVerifier;
    let resolver = TestResolver;

    let mut client = Session::new(
        &client_provider,
        CertContext::Client {
            verifier: &verifier,
            server_name: Some("example.com".to_string()),
        },
    );
    let mut server = Session::new(&server_provider, CertContext::Server { resolver: &resolver });

    run_handshake(&mut client, &mut server);

    let mut app_out = Buffer::new();
    client.send(b"GET /\r\n\r\n", &mut app_out).unwrap();
    let (consumed, plaintext) = server.receive(app_out.as_slice()).unwrap().unwrap();
    assert_eq!(consumed, app_out.len());
    assert_eq!(plaintext, b"GET /\r\n\r\n");
}

#[test]
fn application_data_flows_both_directions() {
    let client_provider = DefaultProvider::new(OsRng);
    let server_provider = DefaultProvider::new(OsRng);
    let verifier = TestVerifier;
    let resolver = TestResolver;

    let mut client = Session::new(
        &client_provider,
        CertContext::Client {
            verifier: &verifier,
            server_name: None,
        },
    );
    let mut server = Session::new(&server_provider, CertContext::Server { resolver: &resolver });

    run_handshake(&mut client, &mut server);

    let mut reply_out = Buffer::new();
    server.send(b"HTTP/1.1 200 OK\r\n\r\n", &mut reply_out).unwrap();
    let (consumed, plaintext) = client.receive(reply_out.as_slice()).unwrap().unwrap();
    assert_eq!(consumed, reply_out.len());
    assert_eq!(plaintext, b"HTTP/1.1 200 OK\r\n\r\n");
}

/// Both peers offer only `TLS_AES_256_GCM_SHA384`, forcing negotiation away
/// from the default first-preference suite and exercising the SHA-384 key
/// schedule (48-byte Finished MAC) end-to-end.
#[test]
fn handshake_negotiates_non_default_cipher_suite() {
    let client_provider = SingleSuiteProvider::new(OsRng, CipherSuite::TLS_AES_256_GCM_SHA384);
    let server_provider = SingleSuiteProvider::new(OsRng, CipherSuite::TLS_AES_256_GCM_SHA384);
    let verifier = TestVerifier;
    let resolver = TestResolver;

    let mut client = Session::new(
        &client_provider,
        CertContext::Client {
            verifier: &verifier,
            server_name: Some("example.com".to_string()),
        },
    );
    let mut server = Session::new(&server_provider, CertContext::Server { resolver: &resolver });

    run_handshake(&mut client, &mut server);

    let mut app_out = Buffer::new();
    client.send(b"ping", &mut app_out).unwrap();
    let (consumed, plaintext) = server.receive(app_out.as_slice()).unwrap().unwrap();
    assert_eq!(consumed, app_out.len());
    assert_eq!(plaintext, b"ping");
}
