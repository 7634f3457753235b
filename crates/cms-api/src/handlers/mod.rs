//! HTTP handlers

pub mod auth;
pub mod health;
pub mod menu;
pub mod menu_items;
pub mod modules;
pub mod permissions;
pub mod roles;
pub mod users;
