use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use super::BudgetError;

/// The fixed encoding every token count in this crate is measured in.
pub const ENCODING_NAME: &str = "cl100k_base";

/// Token identifiers in encoding order.
pub type TokenIds = Vec<u32>;

/// Deterministic BPE tokenizer over [`ENCODING_NAME`].
///
/// Cheap to clone; the merge tables are shared.
#[derive(Clone)]
pub struct Tokenizer {
    bpe: Arc<CoreBPE>,
}

impl Tokenizer {
    pub fn cl100k() -> Result<Self, BudgetError> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| BudgetError::TokenizerUnavailable(e.to_string()))?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    pub fn encode(&self, text: &str) -> TokenIds {
        if text.is_empty() {
            return Vec::new();
        }
        self.bpe.encode_ordinary(text)
    }

    /// Encodes raw bytes, rejecting anything that is not valid UTF-8.
    pub fn encode_bytes(&self, bytes: &[u8]) -> Result<TokenIds, BudgetError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.encode(text))
    }

    pub fn count(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    /// Decodes a token sequence back to text.
    ///
    /// A prefix cut can end inside a multi-byte character. Those trailing
    /// tokens are dropped until the bytes form valid UTF-8.
    pub fn decode(&self, ids: &[u32]) -> String {
        let mut end = ids.len();
        while end > 0 {
            match self.bpe.decode(ids[..end].to_vec()) {
                Ok(text) => return text,
                Err(_) => end -= 1,
            }
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::cl100k().unwrap()
    }

    #[test]
    fn test_empty_text() {
        let tok = tokenizer();
        assert!(tok.encode("").is_empty());
        assert_eq!(tok.count(""), 0);
        assert_eq!(tok.decode(&[]), "");
    }

    #[test]
    fn test_known_encoding() {
        let tok = tokenizer();
        assert_eq!(tok.encode("hello world"), vec![15339, 1917]);
    }

    #[test]
    fn test_deterministic() {
        let tok = tokenizer();
        let text = "Contributions welcome! See CONTRIBUTING.md for details.";
        assert_eq!(tok.encode(text), tok.encode(text));
        assert_eq!(tok.encode(text), tokenizer().encode(text));
    }

    #[test]
    fn test_roundtrip_unicode() {
        let tok = tokenizer();
        let text = "Überprüfung — 日本語のドキュメント 🚀";
        assert_eq!(tok.decode(&tok.encode(text)), text);
    }

    #[test]
    fn test_decode_split_multibyte_char() {
        let tok = tokenizer();
        let ids = tok.encode("🚀🚀🚀");
        // Any prefix must decode without panicking and be a prefix of the source
        for n in 0..=ids.len() {
            let decoded = tok.decode(&ids[..n]);
            assert!("🚀🚀🚀".starts_with(&decoded));
        }
    }

    #[test]
    fn test_encode_bytes_rejects_invalid_utf8() {
        let tok = tokenizer();
        let err = tok.encode_bytes(&[0x66, 0x6f, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, BudgetError::InvalidEncoding(_)));
    }

    #[test]
    fn test_load_error_is_typed() {
        let err = BudgetError::TokenizerUnavailable("bad merge table".into());
        assert_eq!(
            err.to_string(),
            "failed to load cl100k_base tokenizer: bad merge table"
        );
    }

    #[test]
    fn test_encode_bytes_valid() {
        let tok = tokenizer();
        assert_eq!(tok.encode_bytes(b"hello world").unwrap(), vec![15339, 1917]);
    }
}
