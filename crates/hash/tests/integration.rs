//! Integration tests for hash crate

#[cfg(test)]
mod tests {
    use cbnode_errors::{Error, IntegrityError};
    use cbnode_hash::*;
    use cbnode_types::ChecksumType;
    use tempfile::tempdir;
    use tokio::fs;

    #[tokio::test]
    async fn test_verify_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("couchbase-server.rpm");

        let data = b"verify this content";
        fs::write(&file_path, data).await.unwrap();

        let expected = Checksum::from_data(ChecksumType::Md5, data).to_hex();
        let verified = verify_file(&file_path, &expected, ChecksumType::Md5)
            .await
            .unwrap();
        assert_eq!(verified.algorithm(), ChecksumType::Md5);

        let wrong = Checksum::from_data(ChecksumType::Md5, b"different content").to_hex();
        let err = verify_file(&file_path, &wrong, ChecksumType::Md5)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Integrity(IntegrityError::ChecksumMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_artifact_is_unreadable() {
        let dir = tempdir().unwrap();
        let expected = Checksum::from_data(ChecksumType::Sha256, b"").to_hex();

        let err = verify_file(&dir.path().join("absent.deb"), &expected, ChecksumType::Sha256)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Integrity(IntegrityError::UnreadableArtifact { .. })
        ));
    }

    #[test]
    fn test_checksum_from_hex_errors() {
        // Too short
        assert!(Checksum::from_hex(ChecksumType::Md5, "1234").is_err());

        // sha256 length given as md5
        assert!(Checksum::from_hex(ChecksumType::Md5, &"a".repeat(64)).is_err());

        // Invalid hex
        assert!(Checksum::from_hex(ChecksumType::Md5, &"xy".repeat(16)).is_err());
    }
}
