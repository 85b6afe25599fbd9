/*!
# Galaxy 3D Instancing

Instanced static-mesh partitioning and spatial grid bucketing for the
Galaxy 3D engine.

Renderer-agnostic: batches and template actors are reached through traits
implemented by the host, so the crate runs without a GPU.

## Architecture

- **IsmPartition**: Shares instanced batches between many clients, one batch
  per distinct `InstanceDescriptor`
- **InstanceBatch / BatchFactory**: Host-side instanced mesh batches
- **FoliageIsmActor**: Foliage client rendering an actor template through a
  partition
- **SquareGridHelper**: Power-of-two grid hierarchy used to place actor
  clusters into streaming cells
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod math;
pub mod instancing;
pub mod grid;
pub mod foliage;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (global logger)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger};
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Instance partition sub-module
    pub mod instancing {
        pub use crate::instancing::*;
    }

    // Spatial grid sub-module
    pub mod grid {
        pub use crate::grid::*;
    }

    // Foliage sub-module
    pub mod foliage {
        pub use crate::foliage::*;
    }
}

// Re-export math library at crate root
pub use glam;
