//! blogx - a small blogging backend
//!
//! Users register and log in, write blog posts, and list their own posts.
//! The library exposes every layer so the binary and the tests wire the
//! same pieces.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
