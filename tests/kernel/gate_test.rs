//! Authentication gate tests.

use std::sync::Arc;

use proptest::prelude::*;

use genesis_kernel::{
    derive_auth_key, AuditArchive, AuditSink, AuthorizationError, GenesisKernel, KeyDerivationError,
    SecretProvider, StaticSecret,
};
use genesis_kernel::config::KernelConfig;

fn sink() -> Arc<dyn AuditSink> {
    Arc::new(AuditArchive::new())
}

#[test]
fn derived_key_authenticates() {
    let key = derive_auth_key("test").expect("derive");
    let kernel = GenesisKernel::new("test", key.expose(), sink()).expect("should authenticate");
    assert_eq!(kernel.identifier(), "test");
}

#[test]
fn key_for_other_identifier_is_rejected() {
    let key = derive_auth_key("mallory").expect("derive");
    let result = GenesisKernel::new("test", key.expose(), sink());
    assert!(matches!(
        result,
        Err(AuthorizationError::InvalidKey { ref identifier }) if identifier == "test"
    ));
}

#[test]
fn truncated_and_empty_keys_are_rejected() {
    let key = derive_auth_key("test").expect("derive");
    assert!(GenesisKernel::new("test", &key.expose()[..31], sink()).is_err());
    assert!(GenesisKernel::new("test", &[], sink()).is_err());
}

#[test]
fn empty_identifier_cannot_authenticate() {
    assert_eq!(derive_auth_key("").map(|_| ()), Err(KeyDerivationError::EmptyIdentifier));
    assert!(matches!(
        GenesisKernel::new("", &[0u8; 32], sink()),
        Err(AuthorizationError::EmptyIdentifier)
    ));
}

#[test]
fn custom_provider_keys_do_not_cross_over() {
    let rotated = StaticSecret::new("rotated-secret");
    let rotated_key = rotated.derive_key("test").expect("derive");

    let accepted = GenesisKernel::with_provider(
        "test",
        rotated_key.expose(),
        &rotated,
        sink(),
        KernelConfig::default(),
    );
    assert!(accepted.is_ok());

    // The default secret does not recognise keys from the rotated one.
    assert!(GenesisKernel::new("test", rotated_key.expose(), sink()).is_err());
}

proptest! {
    #[test]
    fn every_identifier_accepts_its_own_key(id in "[a-zA-Z0-9 _-]{1,32}") {
        let key = derive_auth_key(&id).expect("non-empty identifier");
        prop_assert!(GenesisKernel::new(&id, key.expose(), sink()).is_ok());
    }

    #[test]
    fn random_keys_are_rejected(id in "[a-z]{1,16}", bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let key = derive_auth_key(&id).expect("non-empty identifier");
        prop_assume!(bytes.as_slice() != key.expose());
        prop_assert!(GenesisKernel::new(&id, &bytes, sink()).is_err());
    }
}
