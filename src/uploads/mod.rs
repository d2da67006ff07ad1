//! Upload handling (multipart, chunked, streamed bodies)

pub mod chunked;
pub mod multipart;
pub mod pipe;

pub use chunked::{body_with_trailers, is_chunked_encoding, once_stream, stream_reader, ByteStream};
pub use multipart::{FormBodyBuilder, FormField, MultipartBody};
pub use pipe::{pipe, PipeReader, PipeWriter};
