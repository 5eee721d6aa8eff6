//! Stridekit locomotion library
//!
//! A first-person character controller on top of Rapier: ground and
//! overhead sensing, a rule-based motion state machine with timed
//! geometry transitions, and fixed-rate force actuation.

pub mod config;
pub mod game;
