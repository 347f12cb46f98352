use crate::error::Error;
use tracing::debug;
use wasmtime::{Engine, MemoryType, SharedMemory};

/// The size of a WebAssembly linear memory page.
pub const WASM_PAGE_SIZE: u32 = 64 * 1024;

/// The largest page count a 32-bit linear memory can address.
pub const WASM_MAX_PAGES: u32 = 65536;

/// Geometry of the shared memory block an application boots against.
///
/// Each value is a count of WebAssembly pages. Memories built from a spec are
/// always created shared, so that the environment library and the application
/// instantiate against the same buffer rather than private copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemorySpec {
    /// Pages mapped when the block is created. (default 256)
    pub initial_pages: u32,
    /// Pages the block may ever occupy. (default 256)
    pub maximum_pages: u32,
}

impl MemorySpec {
    pub const fn default() -> MemorySpec {
        MemorySpec {
            initial_pages: 256,
            maximum_pages: 256,
        }
    }

    pub const fn with_initial_pages(mut self, initial_pages: u32) -> Self {
        self.initial_pages = initial_pages;
        self
    }

    pub const fn with_maximum_pages(mut self, maximum_pages: u32) -> Self {
        self.maximum_pages = maximum_pages;
        self
    }

    /// Set initial and maximum to the same page count, fixing the block's size
    /// for the lifetime of the boot.
    pub const fn with_fixed_pages(mut self, pages: u32) -> Self {
        self.initial_pages = pages;
        self.maximum_pages = pages;
        self
    }

    pub fn total_bytes(&self) -> u64 {
        (self.maximum_pages as u64)
            .checked_mul(WASM_PAGE_SIZE as u64)
            .expect("total_bytes doesn't overflow")
    }

    /// Validate that the geometry describes a usable fixed block.
    pub fn validate(&self) -> Result<(), Error> {
        if self.initial_pages == 0 {
            return Err(Error::InvalidArgument(
                "initial memory size must be greater than 0",
            ));
        }
        if self.maximum_pages < self.initial_pages {
            return Err(Error::InvalidArgument(
                "maximum memory size must be at least as large as initial size",
            ));
        }
        if self.maximum_pages > WASM_MAX_PAGES {
            return Err(Error::InvalidArgument(
                "maximum memory size must fit in a 32-bit address space",
            ));
        }
        Ok(())
    }

    /// Create the shared memory block this spec describes.
    ///
    /// Clones of the returned handle alias one buffer, which is what lets the
    /// same block be handed to the environment factory and bound to the
    /// application's memory import.
    pub fn build(&self, engine: &Engine) -> Result<SharedMemory, Error> {
        self.validate()?;
        // MemoryType::shared panics rather than erroring on page counts the
        // 32-bit index type cannot hold; validate() has already bounded them
        let ty = MemoryType::shared(self.initial_pages, self.maximum_pages);
        let memory = SharedMemory::new(engine, ty).map_err(Error::MemoryError)?;
        debug!(
            "created shared memory: {} initial pages, {} maximum pages",
            self.initial_pages, self.maximum_pages
        );
        Ok(memory)
    }
}
