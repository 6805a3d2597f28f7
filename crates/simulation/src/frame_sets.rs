//! Per-frame ordering via `SystemSet` phases.
//!
//! Everything that touches animation or shader state runs in `Update`,
//! inside one of these sets:
//!
//! ```text
//! Feed  →  Route  →  Clock  →  Broadcast  →  Upload  →  Animate
//! ```
//!
//! * **Feed** – External inputs enter: sensor feed ticks, panel edits.
//!   Anything that sends `ParameterBatch`/`LiveParameterBatch` runs here.
//! * **Route** – Batches are applied to the registry, tree targets and the
//!   wind signal, so changes are visible before the clock ticks.
//! * **Clock** – The animation clock advances exactly once.
//! * **Broadcast** – The clock snapshot is copied into every fog uniform set.
//! * **Upload** – The rendering layer copies uniform sets onto material assets.
//! * **Animate** – Tree growth advances one frame.
//!
//! Rendering extracts after `Update`, so every frame is drawn with the
//! values uploaded in the same frame.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Feed,
    Route,
    Clock,
    Broadcast,
    Upload,
    Animate,
}

impl FrameSet {
    pub fn configure(app: &mut App) {
        app.configure_sets(
            Update,
            (
                FrameSet::Feed,
                FrameSet::Route,
                FrameSet::Clock,
                FrameSet::Broadcast,
                FrameSet::Upload,
                FrameSet::Animate,
            )
                .chain(),
        );
    }
}
