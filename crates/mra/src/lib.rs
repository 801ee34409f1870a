//! Reading MRA arcade descriptors.
//!
//! An MRA document describes how to assemble one arcade game: the core
//! release it was written against (`<mameversion>`), the hardware core it runs
//! on (`<rbf>`) and the ROM archives it needs (`<rom zip="...">`). This crate
//! reduces a document to an [`ArcadeDescriptor`] and finds descriptors on disk
//! in the order the database builder must process them.

mod descriptor;
mod discover;
pub mod error;
mod read;

pub use crate::descriptor::ArcadeDescriptor;
pub use crate::discover::{discover, find_all, is_alternative, processing_order};
pub use crate::read::{parse, read};
