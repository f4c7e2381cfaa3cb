use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Failed to read discovery document {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse discovery document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Local description of the remote annotation service. The endpoint URL is
/// composed from it rather than hard-coded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    root_url: String,
    service_path: String,
    resources: Resources,
}

#[derive(Debug, Clone, Deserialize)]
struct Resources {
    images: ImagesResource,
}

#[derive(Debug, Clone, Deserialize)]
struct ImagesResource {
    methods: ImageMethods,
}

#[derive(Debug, Clone, Deserialize)]
struct ImageMethods {
    annotate: AnnotateMethod,
}

#[derive(Debug, Clone, Deserialize)]
struct AnnotateMethod {
    path: String,
}

impl DiscoveryDocument {
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let raw = fs::read_to_string(path).map_err(|source| DiscoveryError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, DiscoveryError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn annotate_endpoint(&self) -> String {
        format!(
            "{}{}{}",
            self.root_url, self.service_path, self.resources.images.methods.annotate.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "rootUrl": "https://vision.example.com/",
        "servicePath": "v1/",
        "resources": {
            "images": {
                "methods": {
                    "annotate": {
                        "path": "images:annotate",
                        "httpMethod": "POST"
                    }
                }
            }
        }
    }"#;

    #[test]
    fn endpoint_is_composed_from_the_document() {
        let document = DiscoveryDocument::parse(DOCUMENT).unwrap();
        assert_eq!(
            document.annotate_endpoint(),
            "https://vision.example.com/v1/images:annotate"
        );
    }

    #[test]
    fn document_without_an_annotate_method_is_malformed() {
        let err = DiscoveryDocument::parse(r#"{"rootUrl": "https://x/", "servicePath": "v1/"}"#)
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Malformed(_)));
    }

    #[test]
    fn missing_document_is_unreadable() {
        let err = DiscoveryDocument::load(Path::new("no-such-discovery.json")).unwrap_err();
        assert!(matches!(err, DiscoveryError::Unreadable { .. }));
    }
}
