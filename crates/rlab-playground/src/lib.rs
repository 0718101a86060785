#![forbid(unsafe_code)]

//! Render Lab playgrounds.
//!
//! Three screens, each demonstrating one render optimization against its
//! unoptimized twin:
//!
//! - `memo`: a memoized child component vs. a plain one.
//! - `callback`: a stable callback reference vs. a fresh closure per render.
//! - `use-memo`: a cached filter computation vs. recomputing every render.
//!
//! A `home` overview lists the three with a short description each.

pub mod app;
pub mod chrome;
pub mod cli;
pub mod screens;
pub mod theme;
