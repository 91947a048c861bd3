// Compiled Program: the artifact a backend produces for one kernel source

/// Compiled kernel program, tagged with the device it was built for
///
/// Immutable. The cache and every operator built from the same source share
/// one instance through Arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
    ptx: String,
    device_id: u32,
    variant: u32,
    fingerprint: Option<[u8; 32]>,
}

impl CompiledProgram {
    pub fn new(ptx: impl Into<String>, device_id: u32, variant: u32) -> Self {
        Self {
            ptx: ptx.into(),
            device_id,
            variant,
            fingerprint: None,
        }
    }

    /// Tag the program with the cache fingerprint of its request
    pub fn with_fingerprint(self, fingerprint: [u8; 32]) -> Self {
        Self {
            fingerprint: Some(fingerprint),
            ..self
        }
    }

    /// PTX assembly emitted by the compiler
    pub fn ptx(&self) -> &str {
        &self.ptx
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Kernel variant selector the program was compiled with
    pub fn variant(&self) -> u32 {
        self.variant
    }

    /// Cache fingerprint; None until the program has passed through a cache
    pub fn fingerprint(&self) -> Option<&[u8; 32]> {
        self.fingerprint.as_ref()
    }

    /// Approximate size in bytes (for cache budgeting)
    pub fn size_bytes(&self) -> usize {
        self.ptx.len()
    }
}
