// Shared helpers for buffer access and text decoding

pub mod encoding;
pub mod io;

pub use encoding::Utf16LeDecoder;
pub use io::ByteCursor;
