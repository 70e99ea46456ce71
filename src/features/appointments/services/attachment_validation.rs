//! Checks run on contact form attachments before anything is stored.

use thiserror::Error;

use crate::shared::forms::UploadedFile;

/// Limits applied to one batch of uploads
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_files: usize,
    /// Bytes per file
    pub max_file_size: u64,
    /// Lowercase, dot included
    pub allowed_extensions: &'static [&'static str],
}

pub const CONTACT_UPLOAD_POLICY: UploadPolicy = UploadPolicy {
    max_files: 5,
    max_file_size: 10 * 1024 * 1024,
    allowed_extensions: &[
        ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".jpg", ".jpeg", ".png", ".gif",
    ],
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("You can attach at most {max} files.")]
    TooManyFiles { max: usize },

    #[error("File type \"{extension}\" is not allowed.")]
    UnsupportedFileType { extension: String },

    #[error("\"{file_name}\" is larger than {} MB.", .max_bytes / (1024 * 1024))]
    FileTooLarge { file_name: String, max_bytes: u64 },
}

/// Accepts the batch unchanged or names the first problem found.
///
/// The file count is checked first. Files are then checked one at a time,
/// extension before size.
pub fn validate_attachments(
    files: Vec<UploadedFile>,
    policy: &UploadPolicy,
) -> Result<Vec<UploadedFile>, UploadError> {
    if files.len() > policy.max_files {
        return Err(UploadError::TooManyFiles {
            max: policy.max_files,
        });
    }

    for file in &files {
        let extension = file.extension();
        let allowed = extension
            .as_deref()
            .map(|ext| policy.allowed_extensions.contains(&ext))
            .unwrap_or(false);
        if !allowed {
            return Err(UploadError::UnsupportedFileType {
                extension: extension.unwrap_or_else(|| "(unknown)".to_string()),
            });
        }

        if file.size() as u64 > policy.max_file_size {
            return Err(UploadError::FileTooLarge {
                file_name: file.file_name.clone(),
                max_bytes: policy.max_file_size,
            });
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, "application/octet-stream", vec![0u8; size])
    }

    #[test]
    fn test_valid_batch_is_returned_in_order() {
        let files = vec![file("a.PDF", 10), file("b.docx", 1), file("c.png", 0)];

        let accepted = validate_attachments(files, &CONTACT_UPLOAD_POLICY).unwrap();

        let names: Vec<_> = accepted.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.PDF", "b.docx", "c.png"]);
    }

    #[test]
    fn test_too_many_files_wins_over_content() {
        let files = (0..6).map(|i| file(&format!("{}.exe", i), 1)).collect();

        assert_eq!(
            validate_attachments(files, &CONTACT_UPLOAD_POLICY).unwrap_err(),
            UploadError::TooManyFiles { max: 5 }
        );
    }

    #[test]
    fn test_empty_batch_is_valid() {
        let accepted = validate_attachments(Vec::new(), &CONTACT_UPLOAD_POLICY).unwrap();
        assert!(accepted.is_empty());
    }

    #[test]
    fn test_unsupported_extension() {
        let files = vec![file("ok.pdf", 1), file("script.SH", 1)];

        assert_eq!(
            validate_attachments(files, &CONTACT_UPLOAD_POLICY).unwrap_err(),
            UploadError::UnsupportedFileType {
                extension: ".sh".to_string()
            }
        );
    }

    #[test]
    fn test_missing_extension_is_unknown() {
        for name in ["README", ".bashrc", "file."] {
            assert_eq!(
                validate_attachments(vec![file(name, 1)], &CONTACT_UPLOAD_POLICY).unwrap_err(),
                UploadError::UnsupportedFileType {
                    extension: "(unknown)".to_string()
                }
            );
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let limit = CONTACT_UPLOAD_POLICY.max_file_size as usize;
        assert_eq!(limit, 10_485_760);

        assert!(validate_attachments(vec![file("max.pdf", limit)], &CONTACT_UPLOAD_POLICY).is_ok());

        let error = validate_attachments(vec![file("big.pdf", limit + 1)], &CONTACT_UPLOAD_POLICY)
            .unwrap_err();
        assert_eq!(
            error,
            UploadError::FileTooLarge {
                file_name: "big.pdf".to_string(),
                max_bytes: 10_485_760
            }
        );
        assert_eq!(error.to_string(), "\"big.pdf\" is larger than 10 MB.");
    }

    #[test]
    fn test_checks_run_file_by_file() {
        // The oversized first file is reported before the bad extension of the second
        let limit = CONTACT_UPLOAD_POLICY.max_file_size as usize;
        let files = vec![file("big.pdf", limit + 1), file("virus.exe", 1)];

        assert!(matches!(
            validate_attachments(files, &CONTACT_UPLOAD_POLICY),
            Err(UploadError::FileTooLarge { .. })
        ));
    }
}
