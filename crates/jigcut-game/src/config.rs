/// Thresholds of the grid-snap session, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    /// A piece closer than this to its solved position snaps onto it and counts as
    /// placed.
    pub snap_threshold: f64,
    /// A piece within this distance of its solved position on both axes is considered
    /// already snapped, which suppresses a repeated snap event.
    pub snapped_tolerance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 40.0,
            snapped_tolerance: 1.0,
        }
    }
}

/// Thresholds of the connection-group board, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupConfig {
    /// Maximum gap along the joining axis for two neighbors to connect.
    pub connection_threshold: f64,
    /// Maximum offset across the joining axis for two neighbors to connect.
    pub alignment_threshold: f64,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            connection_threshold: 20.0,
            alignment_threshold: 10.0,
        }
    }
}
