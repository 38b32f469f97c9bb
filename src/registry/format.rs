//! Binary layout of artifact files.
//!
//! ```text
//! +--------+---------+----------+---------------------------+
//! | "ODSA" | version | crc32    | bincode { model, metadata }|
//! | 4 B    | u16 LE  | u32 LE   | ...                        |
//! +--------+---------+----------+---------------------------+
//! ```
//!
//! Files without the magic prefix are read as a legacy bincode-encoded bare
//! [`Pipeline`] and get [`Metadata::legacy`].

use serde::{Deserialize, Serialize};

use crate::error::{OdsError, Result};
use crate::ml::pipeline::Pipeline;
use crate::registry::Metadata;

/// File magic.
pub const MAGIC: &[u8; 4] = b"ODSA";

/// Current layout version.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2 + 4;

#[derive(Serialize)]
struct BundleRef<'a> {
    model: &'a Pipeline,
    metadata: &'a Metadata,
}

#[derive(Deserialize)]
struct Bundle {
    model: Pipeline,
    metadata: Metadata,
}

/// Encode a pipeline and its metadata with header and checksum.
pub fn encode(pipeline: &Pipeline, metadata: &Metadata) -> Result<Vec<u8>> {
    let bundle = BundleRef {
        model: pipeline,
        metadata,
    };
    let payload = bincode::serde::encode_to_vec(&bundle, bincode::config::standard())
        .map_err(|e| OdsError::serialization(format!("Failed to encode artifact: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Encode a bare pipeline in the legacy headerless layout.
pub fn encode_legacy(pipeline: &Pipeline) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(pipeline, bincode::config::standard())
        .map_err(|e| OdsError::serialization(format!("Failed to encode pipeline: {e}")))
}

/// Decode an artifact file; `origin` names the file in errors.
pub fn decode(bytes: &[u8], origin: &str) -> Result<(Pipeline, Metadata)> {
    let Some(rest) = bytes.strip_prefix(MAGIC.as_slice()) else {
        return decode_legacy(bytes, origin);
    };
    if bytes.len() < HEADER_LEN {
        return Err(OdsError::corrupt_artifact(origin, "truncated header"));
    }

    let version = u16::from_le_bytes([rest[0], rest[1]]);
    if version != FORMAT_VERSION {
        return Err(OdsError::corrupt_artifact(
            origin,
            format!("unsupported format version {version}"),
        ));
    }
    let checksum = u32::from_le_bytes([rest[2], rest[3], rest[4], rest[5]]);
    let payload = &rest[6..];
    if crc32fast::hash(payload) != checksum {
        return Err(OdsError::corrupt_artifact(origin, "checksum mismatch"));
    }

    let (bundle, read): (Bundle, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(|e| OdsError::corrupt_artifact(origin, e.to_string()))?;
    if read != payload.len() {
        return Err(OdsError::corrupt_artifact(origin, "trailing bytes after payload"));
    }
    Ok((bundle.model, bundle.metadata))
}

fn decode_legacy(bytes: &[u8], origin: &str) -> Result<(Pipeline, Metadata)> {
    let (pipeline, read): (Pipeline, usize) =
        bincode::serde::decode_from_slice(bytes, bincode::config::standard()).map_err(|e| {
            OdsError::corrupt_artifact(origin, format!("not an artifact or legacy pipeline: {e}"))
        })?;
    if read != bytes.len() {
        return Err(OdsError::corrupt_artifact(
            origin,
            "not an artifact or legacy pipeline: trailing bytes",
        ));
    }
    tracing::debug!(origin, "decoded legacy bare pipeline");
    Ok((pipeline, Metadata::legacy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::pipeline::PipelineFactory;
    use crate::registry::SampleCounts;

    fn fitted() -> Pipeline {
        let texts: Vec<String> = [
            "agua potable rural",
            "agua potable urbana",
            "salud hospital rural",
            "salud hospital urbano",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut pipeline = PipelineFactory::default().with_min_df(1).build(1.0);
        pipeline.fit(&texts, &[6, 6, 3, 3]).unwrap();
        pipeline
    }

    #[test]
    fn test_encode_decode() {
        let pipeline = fitted();
        let metadata = Metadata {
            samples: Some(SampleCounts::new(4, 0)),
            cv_f1_macro: Some(0.75),
            ..Metadata::default()
        };
        let bytes = encode(&pipeline, &metadata).unwrap();
        assert!(bytes.starts_with(MAGIC));

        let (decoded, decoded_metadata) = decode(&bytes, "test").unwrap();
        assert_eq!(decoded_metadata, metadata);
        let sample = vec!["agua potable".to_string()];
        assert_eq!(
            decoded.predict_proba(&sample).unwrap(),
            pipeline.predict_proba(&sample).unwrap()
        );
    }

    #[test]
    fn test_legacy_layout() {
        let pipeline = fitted();
        let bytes = encode_legacy(&pipeline).unwrap();
        let (decoded, metadata) = decode(&bytes, "legacy").unwrap();
        assert!(metadata.is_legacy());
        assert_eq!(decoded.classes().unwrap(), &[3, 6]);
    }

    #[test]
    fn test_corruption_detected() {
        let mut bytes = encode(&fitted(), &Metadata::default()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            decode(&bytes, "x"),
            Err(OdsError::CorruptArtifact { .. })
        ));

        assert!(matches!(
            decode(b"ODSA\x01", "x"),
            Err(OdsError::CorruptArtifact { .. })
        ));
        assert!(matches!(
            decode(b"garbage", "x"),
            Err(OdsError::CorruptArtifact { .. })
        ));
    }
}
