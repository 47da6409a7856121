//! Core types and operations of a fixed-height authenticated binary tree.
//!
//! This crate defines the tree schema, authentication paths and single-leaf update verification
//! in a storage-agnostic manner. Everything here is a pure function of its inputs, so it can be
//! run by the party holding a committed root, by an auditor, or inside a proof system.
//!
//! The types and verification routines of this crate do not require the standard library, but
//! do require Rust's alloc crate.

#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

pub mod digest;
pub mod error;
pub mod hasher;
pub mod index;
pub mod trie;
pub mod update;
pub mod witness;

pub use digest::Digest;
pub use error::Error;
pub use trie::{EmptyDigests, EMPTY_LEAF, MAX_HEIGHT};
pub use witness::{PathStep, Witness};
