//! Image encoding and result interpretation for animal-threat detection.

use crate::error::{Error, Result};
use crate::models::DetectionResult;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

/// Same cap the upload form advertises.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

pub const CONNECTIVITY_MESSAGE: &str =
    "Failed to connect to backend. Make sure the server is running on port 5000.";

pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Reads an image file and returns it as a `data:` URL.
pub fn encode_image_file(path: &Path) -> Result<String> {
    let image_error = |reason: String| Error::Image {
        path: path.to_path_buf(),
        reason,
    };

    let mime = mime_for(path).ok_or_else(|| image_error("not a PNG, JPG, GIF, WEBP or BMP file".to_string()))?;
    let meta = std::fs::metadata(path).map_err(|e| image_error(e.to_string()))?;
    if meta.len() > MAX_IMAGE_BYTES {
        return Err(image_error(format!("{} bytes exceeds the 10MB limit", meta.len())));
    }
    let bytes = std::fs::read(path).map_err(|e| image_error(e.to_string()))?;
    Ok(to_data_url(mime, &bytes))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Threat {
        animal: String,
        confidence: Option<String>,
        message: String,
    },
    Clear {
        message: String,
    },
    Failed {
        message: String,
    },
}

impl Outcome {
    pub fn headline(&self) -> &'static str {
        match self {
            Outcome::Threat { .. } => "Threat Detected!",
            Outcome::Clear { .. } => "All Clear",
            Outcome::Failed { .. } => "Error",
        }
    }
}

/// The backend already rounds confidence, so it is shown as sent.
pub fn confidence_label(value: f64) -> String {
    format!("{}%", value)
}

pub fn interpret(result: &DetectionResult) -> Outcome {
    let text = result
        .message
        .clone()
        .or_else(|| result.error.clone())
        .unwrap_or_default();

    if !result.success {
        return Outcome::Failed { message: text };
    }
    if result.threat_detected {
        return Outcome::Threat {
            animal: result
                .animal_type
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            confidence: result.confidence.map(confidence_label),
            message: text,
        };
    }
    Outcome::Clear {
        message: if text.is_empty() {
            "No threats detected".to_string()
        } else {
            text
        },
    }
}

/// Maps a request failure to what the page shows.
pub fn failure(err: &Error) -> Outcome {
    let message = if err.is_connectivity() {
        CONNECTIVITY_MESSAGE.to_string()
    } else {
        err.to_string()
    };
    Outcome::Failed { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn encodes_png_as_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.PNG");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0x89, b'P', b'N', b'G'])
            .unwrap();
        let url = encode_image_file(&path).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        assert!(matches!(encode_image_file(&path), Err(Error::Image { .. })));
    }

    #[test]
    fn threat_outcome_carries_animal_and_percent() {
        let result = DetectionResult {
            success: true,
            threat_detected: true,
            animal_type: Some("cow".to_string()),
            confidence: Some(92.0),
            ..DetectionResult::default()
        };
        match interpret(&result) {
            Outcome::Threat {
                animal, confidence, ..
            } => {
                assert_eq!(animal, "cow");
                assert_eq!(confidence.as_deref(), Some("92%"));
            }
            other => panic!("expected threat, got {:?}", other),
        }
    }

    #[test]
    fn confidence_keeps_backend_precision() {
        assert_eq!(confidence_label(87.53), "87.53%");
        assert_eq!(confidence_label(92.0), "92%");
        assert_eq!(confidence_label(70.5), "70.5%");
    }

    #[test]
    fn backend_error_is_failed_with_its_text() {
        let result = DetectionResult {
            success: false,
            error: Some("No image provided".to_string()),
            ..DetectionResult::default()
        };
        assert_eq!(
            interpret(&result),
            Outcome::Failed {
                message: "No image provided".to_string()
            }
        );
    }

    #[test]
    fn network_failure_uses_connectivity_message() {
        let outcome = failure(&Error::Network("connection refused".into()));
        assert_eq!(
            outcome,
            Outcome::Failed {
                message: CONNECTIVITY_MESSAGE.to_string()
            }
        );
    }
}
