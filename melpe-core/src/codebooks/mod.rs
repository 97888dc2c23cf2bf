//! Constant codebook tables shared by the quantizers (STANAG 4591 §2
//! "Codebooks", §9 `CodebookSelector`).
//!
//! Every codebook here is read-only, lives for the life of the process, and
//! is safe to share across sessions without locking (§5). Table *shapes*
//! (stage counts, entry counts, bit widths) come from `spec.md`; the table
//! *values* are deterministically generated placeholders (see [`gen`]) since
//! the STANAG-registered constants are not present in the retrieved
//! sources — swap a table's body for the registered values to get
//! bit-exact interoperability, the shapes and selection logic do not change.

pub(crate) mod gen;

pub mod msvq;

pub mod lsf2400;
pub mod fourier2400;

pub mod lsf1200;
pub mod voicing1200;

pub mod lsf600;
pub mod gain600;
pub mod pitch600;
pub mod voicing600;
pub mod bitorder600;
