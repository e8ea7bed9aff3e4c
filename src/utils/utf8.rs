//! Incremental UTF-8 decoding for byte streams.

/// Decodes UTF-8 text from arbitrarily split byte chunks.
///
/// A multi-byte sequence cut by a chunk boundary is held back until the rest
/// of it arrives, so no U+FFFD replacement characters are introduced.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bytes` and returns the longest decodable prefix.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure when the bytes contain an
    /// invalid (not merely incomplete) sequence.
    pub fn push(&mut self, bytes: &[u8]) -> Result<String, String> {
        self.pending.extend_from_slice(bytes);

        match std::str::from_utf8(&self.pending) {
            Ok(valid) => {
                let out = valid.to_string();
                self.pending.clear();
                Ok(out)
            }
            Err(e) => {
                if e.error_len().is_some() {
                    self.pending.clear();
                    return Err(format!("invalid UTF-8 sequence: {e}"));
                }
                // Incomplete trailing sequence; keep it for the next chunk.
                let valid_up_to = e.valid_up_to();
                let out = String::from_utf8_lossy(&self.pending[..valid_up_to]).into_owned();
                self.pending.drain(..valid_up_to);
                Ok(out)
            }
        }
    }

    /// Returns `true` when a partial sequence is still buffered.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Ends the input.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure when the input stopped in the
    /// middle of a multi-byte sequence.
    pub fn finish(&mut self) -> Result<(), String> {
        if self.has_pending() {
            let dangling = std::mem::take(&mut self.pending);
            return Err(format!(
                "input ended inside a UTF-8 sequence ({} byte(s) left)",
                dangling.len()
            ));
        }
        Ok(())
    }
}
