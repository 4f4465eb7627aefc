#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let cfg = elfscope::AnalyzerConfig {
        strtab_policy: elfscope::config::StrtabPolicy::NameOnly,
        ..Default::default()
    };
    if let Ok(report) = elfscope::analyze_bytes(data, &cfg) {
        let _ = report.to_string();
        let _ = report.to_json_string();
    }
});
