use dossier::RawDocument;
use std::path::PathBuf;

#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/agents")
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(format!("{}.md", name))
}

/// Reads a fixture the way the loader hands documents to the parser.
#[allow(dead_code)]
pub fn fixture(name: &str) -> RawDocument {
    let path = fixture_path(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e));
    RawDocument::new(text, format!("{}.md", name))
}

#[allow(dead_code)]
pub fn fixtures(names: &[&str]) -> Vec<RawDocument> {
    names.iter().map(|name| fixture(name)).collect()
}

#[allow(dead_code)]
pub fn dossier_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dossier"))
}
