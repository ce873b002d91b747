use std::path::PathBuf;

use divan::Bencher;
use fiscal_xml_validator::{Config, LibXml2Wrapper, Pipeline};

fn main() {
    divan::main();
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn read_fixture(name: &str) -> Vec<u8> {
    std::fs::read(fixtures_dir().join("xml").join(name)).expect("Failed to read fixture")
}

fn fixture_pipeline() -> Pipeline {
    let mut config = Config::default();
    config.schemas.base_dir = fixtures_dir().join("schemas");
    let pipeline = Pipeline::from_config(&config);
    pipeline.schemas().preload().expect("Failed to load schemas");
    pipeline
}

#[divan::bench]
fn compile_schema(bencher: Bencher) {
    let wrapper = LibXml2Wrapper::new();
    let path = fixtures_dir().join("schemas/CT-e/cte_v4.00.xsd");

    bencher.bench_local(move || {
        wrapper
            .parse_schema_from_file(&path)
            .expect("Failed to parse schema")
    });
}

#[divan::bench]
fn validate_valid_document(bencher: Bencher) {
    let pipeline = fixture_pipeline();
    let content = read_fixture("cte-valid.xml");

    bencher.bench_local(move || pipeline.validate(&content).expect("Validation failed"));
}

#[divan::bench]
fn validate_invalid_document(bencher: Bencher) {
    let pipeline = fixture_pipeline();
    let content = read_fixture("nfe-repeated-det.xml");

    bencher.bench_local(move || pipeline.validate(&content).expect("Validation failed"));
}

#[divan::bench]
fn reject_malformed_document(bencher: Bencher) {
    let pipeline = fixture_pipeline();
    let content = read_fixture("malformed.xml");

    bencher.bench_local(move || pipeline.validate(&content).unwrap_err());
}
