//! Base64 MD5 digests for `Content-MD5`

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};

const READ_BUF_SIZE: usize = 64 * 1024;

/// Digest of an in-memory body
pub fn base64_md5_str(s: &str) -> String {
    STANDARD.encode(Md5::digest(s.as_bytes()))
}

/// Digest of everything `reader` yields until EOF
pub async fn base64_md5_reader<R>(reader: &mut R) -> std::io::Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut hasher = Md5::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(STANDARD.encode(hasher.finalize()))
}
