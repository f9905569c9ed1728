use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::hex::to_hex;
use crate::{HashAlgorithm, HashError};

/// Read size used when digesting streams.
pub const CHUNK_SIZE: usize = 64 * 1024;

enum HasherInner {
    Md5(md5::Md5),
    Sha1(Box<sha1_checked::Sha1>),
    Sha224(sha2::Sha224),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
}

/// Streaming digest computation.
///
/// Wraps every supported algorithm behind a single interface. Data can be
/// fed incrementally with [`update`](Hasher::update) or through the
/// [`std::io::Write`] implementation, then finalised into a lowercase hex
/// string.
pub struct Hasher {
    inner: HasherInner,
}

impl Hasher {
    /// Create a new hasher for the given algorithm.
    pub fn new(algo: HashAlgorithm) -> Self {
        use digest::Digest;
        let inner = match algo {
            HashAlgorithm::Md5 => HasherInner::Md5(md5::Md5::new()),
            HashAlgorithm::Sha1 => HasherInner::Sha1(Box::new(sha1_checked::Sha1::new())),
            HashAlgorithm::Sha224 => HasherInner::Sha224(sha2::Sha224::new()),
            HashAlgorithm::Sha256 => HasherInner::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Sha384 => HasherInner::Sha384(sha2::Sha384::new()),
            HashAlgorithm::Sha512 => HasherInner::Sha512(sha2::Sha512::new()),
        };
        Self { inner }
    }

    /// Feed data into the hasher.
    pub fn update(&mut self, data: &[u8]) {
        use digest::Digest;
        match &mut self.inner {
            HasherInner::Md5(h) => h.update(data),
            HasherInner::Sha1(h) => h.update(data),
            HasherInner::Sha224(h) => h.update(data),
            HasherInner::Sha256(h) => h.update(data),
            HasherInner::Sha384(h) => h.update(data),
            HasherInner::Sha512(h) => h.update(data),
        }
    }

    /// Finalize and return the lowercase hex digest.
    ///
    /// Returns an error if SHA-1 collision detection fires.
    pub fn finalize(self) -> Result<String, HashError> {
        use digest::Digest;
        let hex = match self.inner {
            HasherInner::Md5(h) => to_hex(&h.finalize()),
            HasherInner::Sha1(h) => {
                let result = h.try_finalize();
                if result.has_collision() {
                    return Err(HashError::Sha1Collision);
                }
                to_hex(result.hash().as_slice())
            }
            HasherInner::Sha224(h) => to_hex(&h.finalize()),
            HasherInner::Sha256(h) => to_hex(&h.finalize()),
            HasherInner::Sha384(h) => to_hex(&h.finalize()),
            HasherInner::Sha512(h) => to_hex(&h.finalize()),
        };
        Ok(hex)
    }

    /// Convenience: hash data in one call.
    pub fn digest(algo: HashAlgorithm, data: &[u8]) -> Result<String, HashError> {
        let mut h = Self::new(algo);
        h.update(data);
        h.finalize()
    }
}

impl std::io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Digest everything `reader` yields, [`CHUNK_SIZE`] bytes at a time.
pub fn digest_reader<R: Read>(algo: HashAlgorithm, mut reader: R) -> Result<String, HashError> {
    let mut hasher = Hasher::new(algo);
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::Io(e)),
        };
        hasher.update(&buf[..n]);
    }
    hasher.finalize()
}

/// Digest the file at `path`.
///
/// Open and read failures are reported as [`HashError::Read`] with the path
/// attached.
pub fn digest_file(algo: HashAlgorithm, path: &Path) -> Result<String, HashError> {
    let file = File::open(path).map_err(|source| HashError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    digest_reader(algo, file).map_err(|e| match e {
        HashError::Io(source) => HashError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}
