use std::path::PathBuf;

use fiscal_xml_validator::{Config, MessageLanguage, Pipeline};

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self { fixtures_dir }
    }

    pub fn schemas_dir(&self) -> PathBuf {
        self.fixtures_dir.join("schemas")
    }

    pub fn xml(&self, name: &str) -> PathBuf {
        self.fixtures_dir.join("xml").join(name)
    }

    pub fn read_xml(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.xml(name)).unwrap()
    }

    pub fn cte_valid(&self) -> PathBuf {
        self.xml("cte-valid.xml")
    }

    pub fn cte_missing_nct(&self) -> PathBuf {
        self.xml("cte-missing-nct.xml")
    }

    pub fn cte_invalid_uf(&self) -> PathBuf {
        self.xml("cte-invalid-uf.xml")
    }

    pub fn cte_valid_utf16(&self) -> PathBuf {
        self.xml("cte-valid-utf16.xml")
    }

    pub fn cte_long_name_latin1(&self) -> PathBuf {
        self.xml("cte-long-name-latin1.xml")
    }

    pub fn nfe_valid(&self) -> PathBuf {
        self.xml("nfe-valid.xml")
    }

    pub fn nfe_repeated_det(&self) -> PathBuf {
        self.xml("nfe-repeated-det.xml")
    }

    pub fn malformed(&self) -> PathBuf {
        self.xml("malformed.xml")
    }

    pub fn unknown_namespace(&self) -> PathBuf {
        self.xml("unknown-namespace.xml")
    }

    pub fn blank(&self) -> PathBuf {
        self.xml("blank.xml")
    }
}

/// Default configuration pointed at the fixture schemas
pub fn fixture_config() -> Config {
    let mut config = Config::default();
    config.schemas.base_dir = TestFixtures::new().schemas_dir();
    config
}

pub fn fixture_config_in(language: MessageLanguage) -> Config {
    let mut config = fixture_config();
    config.reporting.language = language;
    config
}

pub fn fixture_pipeline() -> Pipeline {
    Pipeline::from_config(&fixture_config())
}
