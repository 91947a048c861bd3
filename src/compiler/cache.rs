// Compilation Cache: Cache compiled programs to avoid recompilation
//
// Cache key is a SHA-256 fingerprint of (source text, variant selector, include flags).
// Two requests with the same key are compiled once, whatever kernel name they carry.

use crate::compiler::backend::Backend;
use crate::compiler::options::CompileRequest;
use crate::compiler::program::CompiledProgram;
use crate::core::error::Result;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key for compiled programs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    fingerprint: [u8; 32],
}

impl CacheKey {
    /// Create a cache key from a compile request
    pub fn from_request(request: &CompileRequest<'_>) -> Self {
        let mut hasher = Sha256::new();

        // Length prefixes keep field boundaries unambiguous
        hasher.update((request.source.len() as u64).to_le_bytes());
        hasher.update(request.source.as_bytes());
        hasher.update(request.variant.to_le_bytes());
        for flag in request.include_flags {
            hasher.update((flag.len() as u64).to_le_bytes());
            hasher.update(flag.as_bytes());
        }

        let result = hasher.finalize();
        let mut fingerprint = [0u8; 32];
        fingerprint.copy_from_slice(&result);
        Self { fingerprint }
    }

    /// SHA-256 digest of the request
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    /// Hex form of the fingerprint, for logging
    pub fn to_hex(&self) -> String {
        self.fingerprint.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// Compiled program with usage metadata
#[derive(Clone)]
pub struct CachedProgram {
    /// The compiled program
    pub program: Arc<CompiledProgram>,
    /// Number of times this program has been requested
    pub use_count: usize,
    /// Approximate size in bytes (for eviction)
    pub size_bytes: usize,
}

/// Per-context compilation cache with least-used eviction
pub struct CompilationCache {
    /// Map from cache key to compiled program
    entries: HashMap<CacheKey, CachedProgram>,
    /// Maximum cache size in bytes
    max_size_bytes: usize,
    /// Current cache size in bytes
    current_size: usize,
    hits: u64,
    misses: u64,
}

impl CompilationCache {
    /// Create a new compilation cache
    ///
    /// # Arguments
    /// * `max_size_mb` - Maximum cache size in megabytes
    pub fn new(max_size_mb: usize) -> Self {
        Self::with_max_bytes(max_size_mb.saturating_mul(1024 * 1024))
    }

    /// Create a cache with a byte budget
    pub fn with_max_bytes(max_size_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_size_bytes,
            current_size: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Try to get a compiled program from the cache
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<CompiledProgram>> {
        let entry = self.entries.get_mut(key)?;
        entry.use_count += 1;
        Some(entry.program.clone())
    }

    /// Return the cached program for `request`, compiling it with `backend` on a miss
    ///
    /// A failed compilation leaves the cache unchanged.
    pub fn get_or_compile(
        &mut self,
        request: &CompileRequest<'_>,
        backend: &dyn Backend,
    ) -> Result<Arc<CompiledProgram>> {
        let key = CacheKey::from_request(request);

        if let Some(program) = self.get(&key) {
            self.hits += 1;
            log::debug!("Cache hit for kernel '{}' ({})", request.name, &key.to_hex()[..12]);
            return Ok(program);
        }

        self.misses += 1;
        log::debug!(
            "Cache miss for kernel '{}', compiling with {} backend",
            request.name,
            backend.name()
        );

        let program = backend.compile(request)?;
        Ok(self.insert(key, program))
    }

    /// Insert a compiled program into the cache
    pub fn insert(&mut self, key: CacheKey, program: CompiledProgram) -> Arc<CompiledProgram> {
        let size_bytes = program.size_bytes();
        let program = program.with_fingerprint(key.fingerprint);

        // Evict if necessary
        while self.current_size.saturating_add(size_bytes) > self.max_size_bytes
            && !self.entries.is_empty()
        {
            self.evict_least_used();
        }

        let program = Arc::new(program);
        let entry = CachedProgram {
            program: program.clone(),
            use_count: 1,
            size_bytes,
        };

        if let Some(old) = self.entries.insert(key, entry) {
            self.current_size = self.current_size.saturating_sub(old.size_bytes);
        }
        self.current_size += size_bytes;
        program
    }

    fn evict_least_used(&mut self) {
        // Find entry with lowest use count
        if let Some((key_to_remove, size_to_remove)) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.use_count)
            .map(|(k, entry)| (k.clone(), entry.size_bytes))
        {
            log::trace!("Evicting cached program {}", &key_to_remove.to_hex()[..12]);
            self.entries.remove(&key_to_remove);
            self.current_size = self.current_size.saturating_sub(size_to_remove);
        }
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_size = 0;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            num_entries: self.entries.len(),
            size_bytes: self.current_size,
            max_size_bytes: self.max_size_bytes,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub num_entries: usize,
    pub size_bytes: usize,
    pub max_size_bytes: usize,
    pub hits: u64,
    pub misses: u64,
}

impl Default for CompilationCache {
    fn default() -> Self {
        // Default to 100 MB cache
        Self::new(crate::compiler::options::DEFAULT_CACHE_SIZE_MB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SpoofError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoBackend {
        calls: AtomicUsize,
    }

    impl Backend for EchoBackend {
        fn compile(&self, request: &CompileRequest<'_>) -> Result<CompiledProgram> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.source.contains("#error") {
                return Err(SpoofError::CompilationFailed {
                    name: request.name.to_string(),
                    log: "#error directive".to_string(),
                });
            }
            Ok(CompiledProgram::new(request.source, request.device_id, request.variant))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn request<'a>(name: &'a str, source: &'a str, flags: &'a [String]) -> CompileRequest<'a> {
        CompileRequest {
            name,
            source,
            variant: 0,
            include_flags: flags,
            device_id: 0,
        }
    }

    #[test]
    fn test_cache_key_generation() {
        let flags = vec!["-I/a".to_string()];
        let key = CacheKey::from_request(&request("x", "src", &flags));

        // Hash should be deterministic and ignore the kernel name
        let key2 = CacheKey::from_request(&request("y", "src", &flags));
        assert_eq!(key, key2);
        assert_eq!(key.to_hex().len(), 64);
    }

    #[test]
    fn test_different_requests_different_keys() {
        let flags = vec!["-I/a".to_string()];
        let other_flags = vec!["-I/b".to_string()];
        let base = CacheKey::from_request(&request("k", "src", &flags));

        assert_ne!(base, CacheKey::from_request(&request("k", "src2", &flags)));
        assert_ne!(base, CacheKey::from_request(&request("k", "src", &other_flags)));

        let mut variant = request("k", "src", &flags);
        variant.variant = 1;
        assert_ne!(base, CacheKey::from_request(&variant));
    }

    #[test]
    fn test_identical_requests_compile_once() {
        let backend = EchoBackend { calls: AtomicUsize::new(0) };
        let mut cache = CompilationCache::new(1);
        let flags: Vec<String> = Vec::new();

        let first = cache.get_or_compile(&request("a", "kernel", &flags), &backend).unwrap();
        let second = cache.get_or_compile(&request("b", "kernel", &flags), &backend).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.num_entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size_bytes, "kernel".len());
    }

    #[test]
    fn test_failed_compile_is_not_cached() {
        let backend = EchoBackend { calls: AtomicUsize::new(0) };
        let mut cache = CompilationCache::new(1);
        let flags: Vec<String> = Vec::new();

        assert!(cache.get_or_compile(&request("bad", "#error", &flags), &backend).is_err());
        assert!(cache.get_or_compile(&request("bad", "#error", &flags), &backend).is_err());

        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().num_entries, 0);
    }

    #[test]
    fn test_huge_budget_saturates() {
        let cache = CompilationCache::new(usize::MAX);
        assert_eq!(cache.stats().max_size_bytes, usize::MAX);
    }

    #[test]
    fn test_program_carries_fingerprint() {
        let backend = EchoBackend { calls: AtomicUsize::new(0) };
        let mut cache = CompilationCache::new(1);
        let flags = vec!["-I/a".to_string()];
        let req = request("k", "kernel", &flags);

        let program = cache.get_or_compile(&req, &backend).unwrap();
        assert_eq!(program.fingerprint(), Some(CacheKey::from_request(&req).fingerprint()));
    }

    #[test]
    fn test_eviction_respects_budget() {
        let backend = EchoBackend { calls: AtomicUsize::new(0) };
        let mut cache = CompilationCache::with_max_bytes(10);
        let flags: Vec<String> = Vec::new();

        // "aaaaaa" is used twice, so "bbbb" is evicted when "cccc" arrives
        cache.get_or_compile(&request("a", "aaaaaa", &flags), &backend).unwrap();
        cache.get_or_compile(&request("a", "aaaaaa", &flags), &backend).unwrap();
        cache.get_or_compile(&request("b", "bbbb", &flags), &backend).unwrap();
        cache.get_or_compile(&request("c", "cccc", &flags), &backend).unwrap();

        let stats = cache.stats();
        assert!(stats.size_bytes <= 10);
        assert_eq!(stats.num_entries, 2);
        let key_a = CacheKey::from_request(&request("a", "aaaaaa", &flags));
        assert!(cache.get(&key_a).is_some());
    }
}
