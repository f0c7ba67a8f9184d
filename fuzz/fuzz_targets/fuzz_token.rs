#![no_main]

use libfuzzer_sys::fuzz_target;
use movedex::round::RoundToken;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must decode or fail cleanly.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = RoundToken::decode(text);
    }

    // Arbitrary payloads behind valid hex must do the same.
    if let Ok(token) = RoundToken::decode(&hex_of(data)) {
        let encoded = token.encode().expect("decoded token re-encodes");
        assert_eq!(RoundToken::decode(&encoded).expect("round trip"), token);
    }
});

fn hex_of(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}
