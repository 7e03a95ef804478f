//! Wire fuzz target: feed arbitrary bytes to the fixed-layout decoders and the string decoder.
//! None of them may panic; short buffers must come back as size errors.
//! Build with: cargo fuzz run wire_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    use linkam::envelope::{decode_string, RawVariant};
    use linkam::structs::{CommsInfo, HeaterDetails, RhUnit, Running, WireStruct};
    use linkam::VariantTag;
    use strum::IntoEnumIterator;

    let _ = decode_string(data);
    let _ = HeaterDetails::decode(data);
    let _ = RhUnit::decode(data);
    let _ = Running::decode(data);
    let _ = CommsInfo::decode(data);

    if data.len() >= 8 {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&data[..8]);
        let raw = RawVariant::from_bytes(bytes);
        for tag in VariantTag::iter() {
            let _ = raw.decode(tag);
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run wire_fuzz");
}
