//! Golden interoperability vectors.
//!
//! Keys and signatures must be byte-identical to what `ssh-keygen` writes,
//! and anything `ssh-keygen` writes must be accepted.

use scribe::core::{signer, sshsig::HashAlgorithm, SshSignature};
use scribe::{canonicalize, ContentHash, KeyPair, PublicKey};
use scribe_testkit::vectors::{all_vectors, verify_vector};

/// `ssh-keygen -Y sign -n file -O hashalg=sha256` for the 0x42 key over "Hello\n".
const SSH_KEYGEN_SHA256: &str = "-----BEGIN SSH SIGNATURE-----
U1NIU0lHAAAAAQAAADMAAAALc3NoLWVkMjU1MTkAAAAgIVL40Zt5HSRFMkLhXy6rbLfP+n
tqXtMAl5YOBpiB2xIAAAAEZmlsZQAAAAAAAAAGc2hhMjU2AAAAUwAAAAtzc2gtZWQyNTUx
OQAAAECBFqLCDLwRVGdS7IwbyqBaV0kHFbxGMbbmy2ZlzhghjjQlu5sALWq5yFmY9XI3/5
+sspWbf1E9egWeLeAoVVIL
-----END SSH SIGNATURE-----
";

/// `ssh-keygen -Y sign -n email` for the same key and content.
const SSH_KEYGEN_EMAIL: &str = "-----BEGIN SSH SIGNATURE-----
U1NIU0lHAAAAAQAAADMAAAALc3NoLWVkMjU1MTkAAAAgIVL40Zt5HSRFMkLhXy6rbLfP+n
tqXtMAl5YOBpiB2xIAAAAFZW1haWwAAAAAAAAABnNoYTUxMgAAAFMAAAALc3NoLWVkMjU1
MTkAAABAae2EX4JdFuc/Mjr2+Yc6PYM3ASSCBm3l2FIdYPInMtT+qH71eQ5UdMUP4cpnOI
PQANrHkBHSuknioyHRO/RECg==
-----END SSH SIGNATURE-----
";

#[test]
fn test_golden_vectors() {
    for vector in all_vectors() {
        if let Err(e) = verify_vector(&vector) {
            panic!("{e}");
        }
    }
}

#[test]
fn test_golden_signature_via_string_api() {
    let vector = &all_vectors()[0];
    let signature = signer::sign(vector.content.as_bytes(), &vector.private_key_pem).unwrap();
    assert_eq!(signature, vector.signature_pem);
    assert!(signer::verify(vector.content.as_bytes(), &vector.public_key, &signature).unwrap());
}

#[test]
fn test_ssh_keygen_sha256_signature_accepted() {
    let vector = &all_vectors()[0];
    let parsed = SshSignature::from_pem(SSH_KEYGEN_SHA256).unwrap();
    assert_eq!(parsed.hash_algorithm, HashAlgorithm::Sha256);
    assert!(signer::verify(b"Hello\n", &vector.public_key, SSH_KEYGEN_SHA256).unwrap());
}

#[test]
fn test_ssh_keygen_other_namespace_rejected() {
    let vector = &all_vectors()[0];
    let parsed = SshSignature::from_pem(SSH_KEYGEN_EMAIL).unwrap();
    assert_eq!(parsed.namespace, "email");
    assert!(!signer::verify(b"Hello\n", &vector.public_key, SSH_KEYGEN_EMAIL).unwrap());
}

#[test]
fn test_golden_hash_of_canonicalized_input() {
    let content = canonicalize("\r\n\r\nHello   \r\n\r\n");
    assert_eq!(
        content.content_hash().to_string(),
        "sha256:66a045b452102c59d840ec097d59d9467e13a3f34f6494e539ffd32c1bb35f18"
    );
    assert_eq!(content.content_hash(), ContentHash::of(b"Hello\n"));
}

#[test]
fn test_public_key_with_comment_still_matches() {
    let vector = &all_vectors()[1];
    let line = format!("{} author@example.org", vector.public_key);
    let parsed = PublicKey::from_openssh(&line).unwrap();
    let keypair = KeyPair::from_openssh(&vector.private_key_pem).unwrap();
    assert_eq!(parsed, keypair.public_key());
}
