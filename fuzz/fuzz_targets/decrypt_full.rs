#![no_main]

use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;
use openk_crypto::{aead, Ciphertext, CryptoError};
use zeroize::Zeroizing;

static KEY: Lazy<Zeroizing<[u8; 32]>> = Lazy::new(|| aead::generate_key().unwrap());

fuzz_target!(|data: &[u8]| {
    if data.len() < 12 + 16 {
        return;
    }

    let (nonce, rest) = data.split_at(12);
    let (body, tag) = rest.split_at(rest.len() - 16);

    let ct = Ciphertext::new(nonce, body, tag).unwrap();
    assert_eq!(aead::decrypt(&KEY[..], &ct), Err(CryptoError::Decryption));
});
