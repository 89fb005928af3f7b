// TABLE:
// ┌──────────────────────────────────────────────────────────────────────────┐
// │                      Directory Structure Analogy                         │
// ├───────────────────┬──────────────────────────────────────────────────────┤
// │ Code Directory    │          Photoshop Equivalent                        │
// ├───────────────────┼──────────────────────────────────────────────────────┤
// │ src/              │ Project Root                                         │
// │ ├── lib.rs        │ Project Manager/Asset Organization                   │
// │ ├── game.rs       │ Main Composition Where Animations Are Used           │
// │ ├── world/        │ Background + collision layers                        │
// │ └── sprite/       │ Character Asset Library                              │
// │     ├── mod.rs    │ Library index                                        │
// │     ├── animated  │ One frame strip (a single Timeline)                  │
// │     └── player    │ Four strips, one per facing (Layer Comps)            │
// └───────────────────┴──────────────────────────────────────────────────────┘
pub mod animated;
pub mod player;

pub use self::animated::AnimatedSprite;
pub use self::player::{FacingImages, Player};

// walk cycle timing, 4 poses at 10 fps
pub const WALK_FRAMES: u8 = 4;
pub const WALK_FRAME_DELAY_MS: f64 = 100.0;
