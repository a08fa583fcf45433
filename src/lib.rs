//! Gameplay core for small arcade games: a vertical shooter with enemy
//! waves and a boss, and a side-scrolling obstacle dodger.
//!
//! The core owns the simulation only.  A front-end reports overlaps and
//! input each frame, calls [`session::Session::update`], and carries out
//! the returned [`intent::Intent`]s.

pub mod boss;
pub mod collision;
pub mod config;
pub mod entities;
pub mod error;
pub mod intent;
pub mod registry;
pub mod session;
pub mod spawner;
pub mod status;
pub mod stub;
pub mod timer;
