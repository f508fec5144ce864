#![no_main]

use libfuzzer_sys::fuzz_target;
use openk_crypto::Ciphertext;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let a = (data[0] as usize) % (data.len() + 1);
    let b = (data[1] as usize) % (data.len() + 1);
    let (i, j) = if a <= b { (a, b) } else { (b, a) };

    if let Ok(ct) = Ciphertext::new(&data[..i], &data[i..j], &data[j..]) {
        assert_eq!(ct.nonce().len(), 12);
        assert_eq!(ct.tag().len(), 16);
        assert_eq!(ct.data(), &data[i..j]);
    }

    let _ = serde_json::from_slice::<Ciphertext>(data);
});
