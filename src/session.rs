//! The handshake engine: per-role state machine, transcript management,
//! and the external [`Session`] entry points.
//!
//! # References
//!
//! * `spec.md` §4.6 "Handshake engine"
//! * `spec.md` §6 "External interfaces"
//! * `spec.md` §7 "Error handling"
//!
//! Handshake state is modeled as a tagged sum of per-phase states, each
//! carrying only the data live in that phase, rather than one flat struct
//! with fields that are `None` outside their phase (`spec.md` §9). The
//! transcript hash and key schedule are owned here, not by
//! [`crate::key_schedule::KeySchedule`], since the same transcript also
//! feeds `CertificateVerify` independently of key derivation.

use crate::alert::{Alert, AlertDescription};
use crate::buffer::Buffer;
use crate::cipher_suites::CipherSuite;
use crate::error::{Error, InternalError};
use crate::extension::NamedGroup;
use crate::handshake::certificate::{CertificateResolver, CertificateVerifier};
use crate::handshake::{
    certificate, certificate_verify, client_hello, encrypted_extensions, finished, server_hello, HandshakeHeader,
    HandshakeType,
};
use crate::key_schedule::{finished_verify_data, KeySchedule};
use crate::provider::{aead_new, CryptoProvider, Hash, KeyExchange};
use crate::record::{ContentType, ReceiveOutcome, RecordLayer};
use zeroize::Zeroize;

/// Whether a [`Session::handshake`] call completed the handshake or needs
/// to be called again with more input.
///
/// `HANDSHAKE_IN_PROGRESS` (`spec.md` §6) is not an error: it is this
/// enum's `InProgress` variant, carried on `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More handshake messages remain.
    InProgress,
    /// The handshake is complete; `send`/`receive` now exchange
    /// application data.
    Complete,
}

/// The host certificate callback for this session's role, and (for a
/// client) the name it is connecting to.
pub enum CertContext<'a> {
    /// Client role: validates the server's chain and signature.
    Client {
        verifier: &'a dyn CertificateVerifier,
        /// Offered in `ClientHello`'s `server_name` extension, if set.
        server_name: Option<String>,
    },
    /// Server role: supplies a chain and signs `CertificateVerify`.
    Server { resolver: &'a dyn CertificateResolver },
}

struct PendingClientHello {
    key_exchanges: Vec<Box<dyn KeyExchange>>,
    client_hello: Vec<u8>,
}

enum ClientState {
    BuildClientHello,
    ExpectServerHello(PendingClientHello),
    ExpectEncryptedExtensions,
    ExpectCertificate,
    ExpectCertificateVerify { chain: Vec<Vec<u8>> },
    ExpectFinished,
    Connected,
    Failed,
}

enum ServerState {
    ExpectClientHello,
    ExpectClientFinished,
    Connected,
    Failed,
}

enum Role<'a> {
    Client {
        verifier: &'a dyn CertificateVerifier,
        server_name: Option<String>,
        state: ClientState,
    },
    Server {
        resolver: &'a dyn CertificateResolver,
        state: ServerState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ServerExpectClientHello,
    ServerExpectClientFinished,
    ClientExpectServerHello,
    ClientExpectEncryptedExtensions,
    ClientExpectCertificate,
    ClientExpectCertificateVerify,
    ClientExpectFinished,
    Connected,
    Failed,
}

/// A single TLS 1.3 handshake and the record-layer state it installs.
///
/// Holds a non-owning reference to a [`CryptoProvider`]: the provider must
/// outlive every session it backs.
pub struct Session<'a> {
    crypto: &'a dyn CryptoProvider,
    role: Role<'a>,
    cipher_suite: Option<CipherSuite>,
    transcript: Option<Box<dyn Hash>>,
    key_schedule: Option<KeySchedule>,
    record_layer: RecordLayer,
    handshake_buf: Vec<u8>,
    client_hs_secret: Option<Vec<u8>>,
    server_hs_secret: Option<Vec<u8>>,
    pending_client_ap_secret: Option<Vec<u8>>,
}

impl<'a> Session<'a> {
    /// Starts a new session. `free` has no counterpart here: dropping the
    /// session releases (and, for key material, zeroizes) everything it
    /// holds.
    pub fn new(crypto: &'a dyn CryptoProvider, cert: CertContext<'a>) -> Self {
        let role = match cert {
            CertContext::Client { verifier, server_name } => Role::Client {
                verifier,
                server_name,
                state: ClientState::BuildClientHello,
            },
            CertContext::Server { resolver } => Role::Server {
                resolver,
                state: ServerState::ExpectClientHello,
            },
        };
        Self {
            crypto,
            role,
            cipher_suite: None,
            transcript: None,
            key_schedule: None,
            record_layer: RecordLayer::new(),
            handshake_buf: Vec::new(),
            client_hs_secret: None,
            server_hs_secret: None,
            pending_client_ap_secret: None,
        }
    }

    fn phase(&self) -> Phase {
        match &self.role {
            Role::Server { state, .. } => match state {
                ServerState::ExpectClientHello => Phase::ServerExpectClientHello,
                ServerState::ExpectClientFinished => Phase::ServerExpectClientFinished,
                ServerState::Connected => Phase::Connected,
                ServerState::Failed => Phase::Failed,
            },
            Role::Client { state, .. } => match state {
                ClientState::BuildClientHello | ClientState::ExpectServerHello(_) => Phase::ClientExpectServerHello,
                ClientState::ExpectEncryptedExtensions => Phase::ClientExpectEncryptedExtensions,
                ClientState::ExpectCertificate => Phase::ClientExpectCertificate,
                ClientState::ExpectCertificateVerify { .. } => Phase::ClientExpectCertificateVerify,
                ClientState::ExpectFinished => Phase::ClientExpectFinished,
                ClientState::Connected => Phase::Connected,
                ClientState::Failed => Phase::Failed,
            },
        }
    }

    fn is_connected(&self) -> bool {
        self.phase() == Phase::Connected
    }

    /// Drives the handshake with whatever complete records `input` holds.
    ///
    /// Level-triggered and partial-input tolerant (`spec.md` §4.6): consumes
    /// as many complete handshake messages as `input` provides and appends
    /// any reply flight to `out`, returning the number of bytes consumed
    /// alongside [`Progress`]. Call again with the unconsumed remainder
    /// once more input arrives.
    pub fn handshake(&mut self, input: &[u8], out: &mut Buffer) -> Result<(Progress, usize), Error> {
        if let Role::Client {
            state: ClientState::BuildClientHello,
            ..
        } = &self.role
        {
            self.build_client_hello(out)?;
        }

        let mut consumed = 0usize;
        loop {
            match self.phase() {
                Phase::Connected => return Ok((Progress::Complete, consumed)),
                Phase::Failed => return Err(Error::Internal(InternalError::Library)),
                _ => {}
            }

            match self.record_layer.open(&input[consumed..]) {
                Ok(ReceiveOutcome::NeedMore) => return Ok((Progress::InProgress, consumed)),
                Ok(ReceiveOutcome::Ignored { consumed: c }) => consumed += c,
                Ok(ReceiveOutcome::Record(rec)) => {
                    consumed += rec.consumed;
                    if let Err(err) = self.process_record(rec.content_type, rec.plaintext, out) {
                        error!("handshake failed in phase {:?}: {}", self.phase(), err);
                        self.fail(err, out);
                        return Err(err);
                    }
                }
                Err(err) => {
                    error!("record layer rejected input: {}", err);
                    self.fail(err, out);
                    return Err(err);
                }
            }
        }
    }

    /// Encrypts and frames `plaintext` as application data. Fails outside
    /// the `Connected` phase.
    pub fn send(&mut self, plaintext: &[u8], out: &mut Buffer) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::Internal(InternalError::Library));
        }
        self.record_layer.seal(ContentType::ApplicationData, plaintext, out)
    }

    /// Sends a `close_notify`, the RFC 8446 §6.1 graceful-shutdown alert.
    /// Unlike a protocol failure this carries alert level `Warning`, not
    /// `Fatal`: it signals an orderly close, not an error.
    pub fn close(&mut self, out: &mut Buffer) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::Internal(InternalError::Library));
        }
        let alert = Alert::new_warning(AlertDescription::CloseNotify);
        self.record_layer.seal(ContentType::Alert, &alert.ser(), out)
    }

    /// Decrypts a single record from the front of `input`, if a complete
    /// one is present. `Ok(None)` means more input is needed; an
    /// unencrypted `change_cipher_spec` is reported consumed with no
    /// payload. A peer `close_notify` is reported like any other alert —
    /// `Err(Error::Alert { sent: false, .. })` — leaving the decision of
    /// whether to treat it as a normal close to the caller.
    pub fn receive(&mut self, input: &[u8]) -> Result<Option<(usize, Vec<u8>)>, Error> {
        if !self.is_connected() {
            return Err(Error::Internal(InternalError::Library));
        }
        match self.record_layer.open(input)? {
            ReceiveOutcome::NeedMore => Ok(None),
            ReceiveOutcome::Ignored { consumed } => Ok(Some((consumed, Vec::new()))),
            ReceiveOutcome::Record(rec) => match rec.content_type {
                ContentType::ApplicationData => Ok(Some((rec.consumed, rec.plaintext))),
                ContentType::Alert => {
                    let description = decode_peer_alert(&rec.plaintext)?;
                    warn!("received alert: {:?}", description);
                    Err(Error::Alert { sent: false, description })
                }
                ContentType::Handshake | ContentType::ChangeCipherSpec => Err(Error::unexpected_message()),
            },
        }
    }

    fn fail(&mut self, err: Error, out: &mut Buffer) {
        if let Error::Alert { sent: true, description } = err {
            warn!("sending alert: {:?}", description);
            let alert = Alert::new_fatal(description);
            // Best-effort: if the record layer itself is broken there is
            // nothing more useful to do than drop the alert on the floor.
            let _ = self.record_layer.seal(ContentType::Alert, &alert.ser(), out);
        }
        match &mut self.role {
            Role::Server { state, .. } => *state = ServerState::Failed,
            Role::Client { state, .. } => *state = ClientState::Failed,
        }
    }

    fn process_record(&mut self, content_type: ContentType, plaintext: Vec<u8>, out: &mut Buffer) -> Result<(), Error> {
        match content_type {
            ContentType::Handshake => {
                self.handshake_buf.extend_from_slice(&plaintext);
                while let Some((msg_type, msg)) = pop_handshake_message(&mut self.handshake_buf)? {
                    self.process_handshake_message(msg_type, msg, out)?;
                }
                Ok(())
            }
            ContentType::Alert => {
                let description = decode_peer_alert(&plaintext)?;
                warn!("received alert: {:?}", description);
                Err(Error::Alert { sent: false, description })
            }
            ContentType::ApplicationData => Err(Error::unexpected_message()),
            // Already handled unconditionally by RecordLayer::open; nothing
            // ever reaches here with this content type.
            ContentType::ChangeCipherSpec => Ok(()),
        }
    }

    fn process_handshake_message(&mut self, msg_type: HandshakeType, msg: Vec<u8>, out: &mut Buffer) -> Result<(), Error> {
        match (self.phase(), msg_type) {
            (Phase::ServerExpectClientHello, HandshakeType::ClientHello) => self.server_handle_client_hello(msg, out),
            (Phase::ServerExpectClientFinished, HandshakeType::Finished) => self.server_handle_client_finished(&msg),
            (Phase::ClientExpectServerHello, HandshakeType::ServerHello) => self.client_handle_server_hello(msg),
            (Phase::ClientExpectEncryptedExtensions, HandshakeType::EncryptedExtensions) => {
                self.client_handle_encrypted_extensions(msg)
            }
            (Phase::ClientExpectCertificate, HandshakeType::Certificate) => self.client_handle_certificate(msg),
            (Phase::ClientExpectCertificateVerify, HandshakeType::CertificateVerify) => {
                self.client_handle_certificate_verify(msg)
            }
            (Phase::ClientExpectFinished, HandshakeType::Finished) => self.client_handle_finished(&msg, out),
            _ => Err(Error::unexpected_message()),
        }
    }

    fn build_client_hello(&mut self, out: &mut Buffer) -> Result<(), Error> {
        let suites = self.crypto.cipher_suites().to_vec();
        let groups: Vec<NamedGroup> = self.crypto.supported_groups().to_vec();

        let mut key_exchanges: Vec<Box<dyn KeyExchange>> = Vec::with_capacity(groups.len());
        for group in groups {
            key_exchanges.push(self.crypto.key_exchange(group)?);
        }

        let mut random = [0u8; 32];
        self.crypto.random().fill(&mut random)?;

        let server_name = match &self.role {
            Role::Client { server_name, .. } => server_name.clone(),
            Role::Server { .. } => None,
        };

        let client_hello = {
            let key_shares: Vec<(NamedGroup, &[u8])> =
                key_exchanges.iter().map(|kx| (kx.group(), kx.public_key())).collect();
            client_hello::ser(&random, &suites, &key_shares, server_name.as_deref())
        };
        self.record_layer.seal(ContentType::Handshake, &client_hello, out)?;

        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::ExpectServerHello(PendingClientHello {
                key_exchanges,
                client_hello,
            });
        }
        Ok(())
    }

    fn server_handle_client_hello(&mut self, msg: Vec<u8>, out: &mut Buffer) -> Result<(), Error> {
        let parsed = client_hello::deser(&msg[HandshakeHeader::LEN..])?;

        let suite = self
            .crypto
            .cipher_suites()
            .iter()
            .copied()
            .find(|s| parsed.cipher_suites.contains(s))
            .ok_or(Error::Alert { sent: true, description: AlertDescription::HandshakeFailure })?;

        let group = self
            .crypto
            .supported_groups()
            .iter()
            .copied()
            .find(|g| parsed.key_shares.iter().any(|(pg, _)| pg == g))
            .ok_or(Error::Alert { sent: true, description: AlertDescription::HandshakeFailure })?;
        let peer_public = parsed
            .key_shares
            .iter()
            .find(|(g, _)| *g == group)
            .expect("group came from parsed.key_shares")
            .1;

        debug!("negotiated cipher suite {:?}, group {:?}", suite, group);

        let server_name = parsed.server_name.map(str::to_owned);
        let signature_schemes = parsed.signature_schemes.clone();

        let hash_alg = suite.hash();
        let mut transcript = self.crypto.hash(hash_alg);
        transcript.update(&msg);

        let kx = self.crypto.key_exchange(group)?;
        let our_public = kx.public_key().to_vec();
        let shared_secret = kx.exchange(peer_public)?;

        let mut random = [0u8; 32];
        self.crypto.random().fill(&mut random)?;
        let server_hello = server_hello::ser(&random, suite, group, &our_public);
        self.record_layer.seal(ContentType::Handshake, &server_hello, out)?;
        transcript.update(&server_hello);

        let mut key_schedule = KeySchedule::new(hash_alg);
        let (client_hs_secret, server_hs_secret) =
            key_schedule.handshake_secrets(&shared_secret, &transcript.finalize_snapshot());

        self.record_layer.install_send(aead_new(self.crypto, suite, &server_hs_secret)?);
        self.record_layer.install_recv(aead_new(self.crypto, suite, &client_hs_secret)?);

        let encrypted_extensions = encrypted_extensions::ser();
        self.record_layer
            .seal(ContentType::Handshake, &encrypted_extensions, out)?;
        transcript.update(&encrypted_extensions);

        let resolver = match &self.role {
            Role::Server { resolver, .. } => *resolver,
            Role::Client { .. } => return Err(Error::Internal(InternalError::Library)),
        };
        let (chain, scheme, deferred_sign) = resolver.lookup(server_name.as_deref(), &signature_schemes)?;

        let certificate = certificate::ser(&chain);
        self.record_layer.seal(ContentType::Handshake, &certificate, out)?;
        transcript.update(&certificate);

        let signing_payload = certificate_verify::signing_payload(true, &transcript.finalize_snapshot());
        let signature = deferred_sign.run(&signing_payload)?;
        let certificate_verify = certificate_verify::ser(scheme, &signature);
        self.record_layer
            .seal(ContentType::Handshake, &certificate_verify, out)?;
        transcript.update(&certificate_verify);

        let verify_data = finished_verify_data(hash_alg, &server_hs_secret, &transcript.finalize_snapshot());
        let server_finished = finished::ser(&verify_data);
        self.record_layer.seal(ContentType::Handshake, &server_finished, out)?;
        transcript.update(&server_finished);

        let (client_ap_secret, server_ap_secret) = key_schedule.application_secrets(&transcript.finalize_snapshot());
        self.record_layer.install_send(aead_new(self.crypto, suite, &server_ap_secret)?);

        self.cipher_suite = Some(suite);
        self.transcript = Some(transcript);
        self.key_schedule = Some(key_schedule);
        self.client_hs_secret = Some(client_hs_secret);
        self.pending_client_ap_secret = Some(client_ap_secret);

        if let Role::Server { state, .. } = &mut self.role {
            *state = ServerState::ExpectClientFinished;
        }
        Ok(())
    }

    fn server_handle_client_finished(&mut self, msg: &[u8]) -> Result<(), Error> {
        let suite = self.cipher_suite.ok_or(Error::Internal(InternalError::Library))?;
        let transcript_hash = self
            .transcript
            .as_ref()
            .ok_or(Error::Internal(InternalError::Library))?
            .finalize_snapshot();
        let client_hs_secret = self
            .client_hs_secret
            .as_ref()
            .ok_or(Error::Internal(InternalError::Library))?;
        let expected = finished_verify_data(suite.hash(), client_hs_secret, &transcript_hash);
        finished::verify(&msg[HandshakeHeader::LEN..], &expected)?;

        let client_ap_secret = self
            .pending_client_ap_secret
            .take()
            .ok_or(Error::Internal(InternalError::Library))?;
        self.record_layer.install_recv(aead_new(self.crypto, suite, &client_ap_secret)?);

        debug!("server handshake complete");
        if let Role::Server { state, .. } = &mut self.role {
            *state = ServerState::Connected;
        }
        Ok(())
    }

    fn client_handle_server_hello(&mut self, msg: Vec<u8>) -> Result<(), Error> {
        let parsed = server_hello::deser(&msg[HandshakeHeader::LEN..])?;
        let suite = parsed.cipher_suite;
        if !self.crypto.cipher_suites().contains(&suite) {
            return Err(Error::Alert { sent: true, description: AlertDescription::IllegalParameter });
        }

        let pending = match &mut self.role {
            Role::Client { state, .. } => match core::mem::replace(state, ClientState::Failed) {
                ClientState::ExpectServerHello(pending) => pending,
                _ => return Err(Error::unexpected_message()),
            },
            Role::Server { .. } => return Err(Error::Internal(InternalError::Library)),
        };

        let (group, peer_public) = parsed.key_share;
        let mut key_exchanges = pending.key_exchanges;
        let idx = key_exchanges
            .iter()
            .position(|kx| kx.group() == group)
            .ok_or(Error::Alert { sent: true, description: AlertDescription::IllegalParameter })?;
        let shared_secret = key_exchanges.remove(idx).exchange(peer_public)?;

        let hash_alg = suite.hash();
        let mut transcript = self.crypto.hash(hash_alg);
        transcript.update(&pending.client_hello);
        transcript.update(&msg);

        let mut key_schedule = KeySchedule::new(hash_alg);
        let (client_hs_secret, server_hs_secret) =
            key_schedule.handshake_secrets(&shared_secret, &transcript.finalize_snapshot());

        self.record_layer.install_recv(aead_new(self.crypto, suite, &server_hs_secret)?);
        self.record_layer.install_send(aead_new(self.crypto, suite, &client_hs_secret)?);

        self.cipher_suite = Some(suite);
        self.transcript = Some(transcript);
        self.key_schedule = Some(key_schedule);
        self.client_hs_secret = Some(client_hs_secret);
        self.server_hs_secret = Some(server_hs_secret);

        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::ExpectEncryptedExtensions;
        }
        Ok(())
    }

    fn client_handle_encrypted_extensions(&mut self, msg: Vec<u8>) -> Result<(), Error> {
        encrypted_extensions::deser(&msg[HandshakeHeader::LEN..])?;
        self.transcript
            .as_mut()
            .ok_or(Error::Internal(InternalError::Library))?
            .update(&msg);
        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::ExpectCertificate;
        }
        Ok(())
    }

    fn client_handle_certificate(&mut self, msg: Vec<u8>) -> Result<(), Error> {
        let chain = certificate::deser(&msg[HandshakeHeader::LEN..])?;
        self.transcript
            .as_mut()
            .ok_or(Error::Internal(InternalError::Library))?
            .update(&msg);
        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::ExpectCertificateVerify { chain };
        }
        Ok(())
    }

    fn client_handle_certificate_verify(&mut self, msg: Vec<u8>) -> Result<(), Error> {
        let (_scheme, signature) = certificate_verify::deser(&msg[HandshakeHeader::LEN..])?;

        let chain = match &mut self.role {
            Role::Client { state, .. } => match core::mem::replace(state, ClientState::Failed) {
                ClientState::ExpectCertificateVerify { chain } => chain,
                _ => return Err(Error::unexpected_message()),
            },
            Role::Server { .. } => return Err(Error::Internal(InternalError::Library)),
        };
        let verifier = match &self.role {
            Role::Client { verifier, .. } => *verifier,
            Role::Server { .. } => unreachable!("role just matched as Client above"),
        };
        let deferred_verify = verifier.verify(&chain)?;

        let transcript = self.transcript.as_ref().ok_or(Error::Internal(InternalError::Library))?;
        let signing_payload = certificate_verify::signing_payload(true, &transcript.finalize_snapshot());
        deferred_verify.run(&signing_payload, signature)?;

        self.transcript
            .as_mut()
            .ok_or(Error::Internal(InternalError::Library))?
            .update(&msg);
        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::ExpectFinished;
        }
        Ok(())
    }

    fn client_handle_finished(&mut self, msg: &[u8], out: &mut Buffer) -> Result<(), Error> {
        let suite = self.cipher_suite.ok_or(Error::Internal(InternalError::Library))?;
        let hash_alg = suite.hash();

        let server_hs_secret = self
            .server_hs_secret
            .as_ref()
            .ok_or(Error::Internal(InternalError::Library))?;
        let transcript = self.transcript.as_ref().ok_or(Error::Internal(InternalError::Library))?;
        let expected = finished_verify_data(hash_alg, server_hs_secret, &transcript.finalize_snapshot());
        finished::verify(&msg[HandshakeHeader::LEN..], &expected)?;
        self.transcript
            .as_mut()
            .ok_or(Error::Internal(InternalError::Library))?
            .update(msg);

        let transcript_hash = self
            .transcript
            .as_ref()
            .ok_or(Error::Internal(InternalError::Library))?
            .finalize_snapshot();
        let key_schedule = self.key_schedule.as_mut().ok_or(Error::Internal(InternalError::Library))?;
        let (client_ap_secret, server_ap_secret) = key_schedule.application_secrets(&transcript_hash);
        self.record_layer.install_recv(aead_new(self.crypto, suite, &server_ap_secret)?);

        let client_hs_secret = self
            .client_hs_secret
            .as_ref()
            .ok_or(Error::Internal(InternalError::Library))?;
        let verify_data = finished_verify_data(hash_alg, client_hs_secret, &transcript_hash);
        let client_finished = finished::ser(&verify_data);
        self.record_layer.seal(ContentType::Handshake, &client_finished, out)?;
        self.record_layer.install_send(aead_new(self.crypto, suite, &client_ap_secret)?);

        debug!("client handshake complete");
        if let Role::Client { state, .. } = &mut self.role {
            *state = ClientState::Connected;
        }
        Ok(())
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(secret) = self.client_hs_secret.as_mut() {
            secret.zeroize();
        }
        if let Some(secret) = self.server_hs_secret.as_mut() {
            secret.zeroize();
        }
        if let Some(secret) = self.pending_client_ap_secret.as_mut() {
            secret.zeroize();
        }
    }
}

fn decode_peer_alert(plaintext: &[u8]) -> Result<AlertDescription, Error> {
    let bytes: [u8; 2] = plaintext.try_into().map_err(|_| Error::decode_error())?;
    Ok(Alert::deser(bytes)?.description)
}

/// Pops one complete handshake message (header + body) from the front of
/// `buf`, if present, draining it. `buf` accumulates plaintext across
/// records so a message that straddles a record boundary is reassembled
/// transparently (`spec.md` §4.6).
fn pop_handshake_message(buf: &mut Vec<u8>) -> Result<Option<(HandshakeType, Vec<u8>)>, Error> {
    if buf.len() < HandshakeHeader::LEN {
        return Ok(None);
    }
    let mut header_buf = [0u8; HandshakeHeader::LEN];
    header_buf.copy_from_slice(&buf[..HandshakeHeader::LEN]);
    let header = HandshakeHeader::from(header_buf);
    let msg_type = header.msg_type().map_err(|_| Error::unexpected_message())?;

    let total = HandshakeHeader::LEN + header.length() as usize;
    if buf.len() < total {
        return Ok(None);
    }
    let msg: Vec<u8> = buf.drain(..total).collect();
    Ok(Some((msg_type, msg)))
}
