//! At-rest envelope for the store file
//!
//! Layout: 4-byte magic, 1-byte format version, 32-byte blake3 checksum of
//! the plaintext payload, then the payload XORed with a blake3-XOF keystream
//! derived from the passphrase. The XOR layer is obfuscation, not
//! encryption: it keeps the ledger from being a grep-able plaintext file and
//! nothing more. The checksum is what detects tampering, truncation, and a
//! wrong passphrase, since any of those scramble the recovered plaintext.

pub(crate) const MAGIC: &[u8; 4] = b"SPND";
pub(crate) const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1 + blake3::OUT_LEN;
const KEYSTREAM_CONTEXT: &str = "spendsight-store 2025 at-rest obfuscation v1";

#[derive(Debug, thiserror::Error)]
pub(crate) enum CodecError {
    #[error("file too short to hold the envelope header")]
    TooShort,
    #[error("magic bytes do not match the store format")]
    BadMagic,
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),
    #[error("payload checksum mismatch")]
    ChecksumMismatch,
}

/// Wrap a plaintext payload in the envelope
pub(crate) fn encode(payload: &[u8], passphrase: &str) -> Vec<u8> {
    let checksum = blake3::hash(payload);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(checksum.as_bytes());

    let mut body = payload.to_vec();
    apply_keystream(&mut body, passphrase);
    out.extend_from_slice(&body);
    out
}

/// Unwrap an envelope back into its plaintext payload
pub(crate) fn decode(bytes: &[u8], passphrase: &str) -> Result<Vec<u8>, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TooShort);
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }

    let mut stored = [0u8; blake3::OUT_LEN];
    stored.copy_from_slice(&bytes[MAGIC.len() + 1..HEADER_LEN]);
    let stored = blake3::Hash::from(stored);

    let mut payload = bytes[HEADER_LEN..].to_vec();
    apply_keystream(&mut payload, passphrase);

    if blake3::hash(&payload) != stored {
        return Err(CodecError::ChecksumMismatch);
    }
    Ok(payload)
}

/// XOR `body` with a keystream derived from the passphrase. Symmetric, so
/// encoding and decoding share it.
fn apply_keystream(body: &mut [u8], passphrase: &str) {
    let mut hasher = blake3::Hasher::new_derive_key(KEYSTREAM_CONTEXT);
    hasher.update(passphrase.as_bytes());

    let mut keystream = vec![0u8; body.len()];
    hasher.finalize_xof().fill(&mut keystream);

    for (byte, key) in body.iter_mut().zip(keystream.iter()) {
        *byte ^= key;
    }
}
