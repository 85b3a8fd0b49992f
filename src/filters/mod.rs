//! Intensity filters for the adjustment engine.
//!
//! ## Image Format
//!
//! | Format | Shape | Samples |
//! |--------|-------|---------|
//! | Grayscale | (H, W, 1) | f32, nominally 0-255 |
//! | RGB | (H, W, 3) | f32, nominally 0-255, channels treated alike |
//!
//! All filters are pure: they read one image and return a new one of the
//! same shape. Per-sample work runs on the rayon thread pool.
//!
//! ## Filters
//!
//! - **Pixel-wise**: gamma, contrast, brightness (`adjust`)
//! - **Distribution-based**: histogram equalization (`adjust`)
//! - **Statistics**: 256-bin histogram (`histogram`)

pub mod adjust;
pub mod histogram;
