use std::io;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Resolves `tokenizer.json` from a model directory or an explicit tokenizer path.
pub fn tokenizer_path(model_path: &Path) -> io::Result<PathBuf> {
    if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new(TOKENIZER_FILENAME))
    {
        Ok(model_path.to_path_buf())
    } else if model_path.is_dir() {
        Ok(model_path.join(TOKENIZER_FILENAME))
    } else {
        Ok(model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join(TOKENIZER_FILENAME))
    }
}

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    Tokenizer::from_file(tokenizer_path(model_path)?).map_err(io::Error::other)
}

/// Loads the first tokenizer found among `dirs` (in order).
///
/// Used by the generator: an adapter directory may ship its own tokenizer, otherwise the
/// base model's is used.
pub fn load_first_tokenizer(dirs: &[&Path]) -> io::Result<Tokenizer> {
    for dir in dirs {
        let path = tokenizer_path(dir)?;
        if path.exists() {
            return Tokenizer::from_file(&path).map_err(io::Error::other);
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no {} found in {:?}", TOKENIZER_FILENAME, dirs),
    ))
}

/// Loads a tokenizer with truncation enabled for a maximum sequence length.
pub fn load_tokenizer_with_truncation(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let mut tokenizer = load_tokenizer(model_path)?;
    with_truncation(&mut tokenizer, max_len)?;
    Ok(tokenizer)
}

/// Enables truncation on an already-loaded tokenizer.
pub fn with_truncation(tokenizer: &mut Tokenizer, max_len: usize) -> io::Result<()> {
    use tokenizers::TruncationParams;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_path_explicit_file() {
        let path = tokenizer_path(Path::new("/models/minilm/tokenizer.json")).unwrap();
        assert_eq!(path, PathBuf::from("/models/minilm/tokenizer.json"));
    }

    #[test]
    fn test_tokenizer_path_from_sibling_file() {
        let path = tokenizer_path(Path::new("/models/minilm/model.safetensors")).unwrap();
        assert_eq!(path, PathBuf::from("/models/minilm/tokenizer.json"));
    }

    #[test]
    fn test_tokenizer_path_from_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = tokenizer_path(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("tokenizer.json"));
    }

    #[test]
    fn test_load_first_tokenizer_reports_missing() {
        let a = tempfile::TempDir::new().unwrap();
        let b = tempfile::TempDir::new().unwrap();
        let err = load_first_tokenizer(&[a.path(), b.path()]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
