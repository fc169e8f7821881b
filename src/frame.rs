use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("frame is {got} bytes, expected {expected}")]
pub struct FramingError {
    pub expected: usize,
    pub got: usize,
}

/// Decodes one fixed-width piano-roll record: a float64 timestamp followed
/// by `n_notes` float32 activations, native byte order, no padding.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    n_notes: usize,
}

impl FrameCodec {
    pub fn new(n_notes: usize) -> Self {
        Self { n_notes }
    }

    pub fn n_notes(&self) -> usize {
        self.n_notes
    }

    /// Byte length of one frame: 8 + 4 * n_notes.
    pub fn frame_size(&self) -> usize {
        8 + 4 * self.n_notes
    }

    fn check_len(&self, bytes: &[u8]) -> Result<(), FramingError> {
        if bytes.len() != self.frame_size() {
            return Err(FramingError {
                expected: self.frame_size(),
                got: bytes.len(),
            });
        }
        Ok(())
    }

    /// Parse only the leading timestamp. Cheap enough to run on every frame
    /// for the late-discard check without touching the activations.
    pub fn peek_timestamp(&self, bytes: &[u8]) -> Result<f64, FramingError> {
        self.check_len(bytes)?;
        let ts = f64::from_ne_bytes(bytes[..8].try_into().unwrap());
        Ok(ts)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<(f64, Vec<f32>), FramingError> {
        self.check_len(bytes)?;
        let ts = f64::from_ne_bytes(bytes[..8].try_into().unwrap());
        let activations = bytes[8..]
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        Ok((ts, activations))
    }

    /// Inverse of `decode`, used by frame producers and tests.
    pub fn encode(&self, timestamp: f64, activations: &[f32]) -> Vec<u8> {
        debug_assert_eq!(activations.len(), self.n_notes);
        let mut bytes = Vec::with_capacity(self.frame_size());
        bytes.extend_from_slice(&timestamp.to_ne_bytes());
        for a in activations {
            bytes.extend_from_slice(&a.to_ne_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_size_matches_layout() {
        assert_eq!(FrameCodec::new(88).frame_size(), 8 + 4 * 88);
        assert_eq!(FrameCodec::new(1).frame_size(), 12);
    }

    #[test]
    fn decode_recovers_timestamp_and_activations() {
        let codec = FrameCodec::new(3);
        let bytes = codec.encode(1.5, &[0.0, 0.75, 1.0]);
        let (ts, act) = codec.decode(&bytes).unwrap();
        assert_eq!(ts, 1.5);
        assert_eq!(act, vec![0.0, 0.75, 1.0]);
    }

    #[test]
    fn peek_reads_only_the_timestamp() {
        let codec = FrameCodec::new(88);
        let bytes = codec.encode(42.25, &[0.0; 88]);
        assert_eq!(codec.peek_timestamp(&bytes).unwrap(), 42.25);
    }

    #[test]
    fn wrong_length_is_a_framing_error() {
        let codec = FrameCodec::new(88);
        let err = codec.decode(&[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            FramingError {
                expected: 8 + 4 * 88,
                got: 16
            }
        );
        assert!(codec.peek_timestamp(&[0u8; 7]).is_err());
    }
}
