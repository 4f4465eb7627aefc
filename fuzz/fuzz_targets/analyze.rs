#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = elfscope::AnalyzerConfig::default();
    let _ = elfscope::analyze_bytes(data, &cfg);
});
