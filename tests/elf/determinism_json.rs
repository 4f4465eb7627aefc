use crate::common::*;
use elfscope::{analyze_bytes, AnalyzerConfig};
use serde_json::Value;

#[test]
fn json_output_is_deterministic() {
    let elf = minimal_object();
    let config = AnalyzerConfig::default();
    let runs: Vec<String> = (0..5)
        .map(|_| {
            analyze_bytes(&elf.bytes, &config)
                .unwrap()
                .to_json_string()
                .unwrap()
        })
        .collect();
    for json in &runs[1..] {
        assert_eq!(json, &runs[0]);
    }
}

#[test]
fn json_shape() {
    let elf = minimal_object();
    let report = analyze_bytes(&elf.bytes, &AnalyzerConfig::default()).unwrap();
    let v: Value = serde_json::from_str(&report.to_json_string().unwrap()).unwrap();

    for key in ["header", "sections", "segments", "symbols", "relocations"] {
        assert!(v.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(v["header"]["section_count"], 6);
    assert_eq!(v["sections"][1]["name"], ".text");
    assert_eq!(v["segments"][0]["type_name"], "LOAD");
    assert_eq!(v["symbols"]["status"], "present");
    assert_eq!(v["symbols"]["value"][0]["name"], "foo");
    assert_eq!(v["relocations"]["value"][0]["section_name"], ".rela.text");
    assert_eq!(v["relocations"]["value"][0]["entries"][0]["addend"], -4);
}

#[test]
fn missing_tables_serialize_their_condition() {
    let mut b = ElfBuilder::new();
    b.section(".text", SHT_PROGBITS, vec![0; 4]);
    let report = analyze_bytes(&b.build().bytes, &AnalyzerConfig::default()).unwrap();
    let v: Value = serde_json::from_str(&report.to_json_string().unwrap()).unwrap();
    assert_eq!(v["symbols"]["status"], "missing");
    assert_eq!(v["symbols"]["value"], "symbol_table");
    assert_eq!(v["relocations"]["value"], "symbol_table");
}
